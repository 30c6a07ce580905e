use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use rust_slideshow::{
    config::Configuration,
    error::Error,
    scan,
    session::{Session, SessionSettings},
    tasks,
};

#[derive(Debug, Parser)]
#[command(
    name = "slideshow",
    version,
    about = "fullscreen slideshow of a photo folder"
)]
struct Args {
    /// Path to YAML config (defaults are used if it does not exist)
    #[arg(value_name = "CONFIG", default_value = "slideshow.yaml")]
    config: PathBuf,
    /// Override slide-seconds from the config file
    #[arg(long = "slide-seconds", value_name = "SECONDS")]
    slide_seconds: Option<i64>,
    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    // RUST_LOG wins; -v only picks the fallback level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},winit=warn,calloop=warn")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let Args {
        config,
        slide_seconds,
        verbose,
    } = Args::parse();
    init_tracing(verbose);

    let mut cfg = Configuration::load(&config)
        .with_context(|| format!("failed to load configuration from {}", config.display()))?
        .validated()
        .context("invalid configuration values")?;
    if let Some(seconds) = slide_seconds {
        cfg.slide_seconds = seconds;
    }
    tracing::info!("Loaded configuration:\n{:#?}", cfg);

    let root = std::path::absolute(&cfg.photo_library_path).with_context(|| {
        format!(
            "failed to resolve photo library {}",
            cfg.photo_library_path.display()
        )
    })?;
    let settings = SessionSettings::from(&cfg);
    let images = scan::scan(&root, &settings.scan);
    if images.is_empty() {
        let err = Error::EmptyScan(root);
        tracing::error!("{err}; nothing to show");
        eprintln!("slideshow: {err}");
        return Ok(ExitCode::FAILURE);
    }
    tracing::info!(count = images.len(), root = %root.display(), "initial scan complete");

    let event_loop = tasks::viewer::build_event_loop()?;
    let signal = tasks::viewer::rescan_signal(&event_loop);
    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            tracing::info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    let watch_task = tokio::spawn({
        let root = root.clone();
        let signal = signal.clone();
        let debounce = cfg.rescan_debounce;
        let cancel = cancel.clone();
        async move {
            tasks::watcher::run(root, signal, debounce, cancel)
                .await
                .context("watch task failed")
        }
    });

    // Blocks the main thread until the window closes or cancellation occurs.
    let session = Session::new(root, images, settings, Instant::now());
    if let Err(e) = tasks::viewer::run_windowed(event_loop, session, signal, &cfg, cancel.clone())
        .context("viewer failed")
    {
        tracing::error!("{e:?}");
    }
    cancel.cancel();

    // The watcher must be gone before the process tears down.
    match watch_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("task error: {e:?}"),
        Err(e) => tracing::error!("join error: {e}"),
    }

    Ok(ExitCode::SUCCESS)
}
