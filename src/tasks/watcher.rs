use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecursiveMode, Watcher, recommended_watcher};
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::events::RescanSignal;

/// Create/remove/rename of files or directories. Content, metadata and access
/// events never change the image set. Unclassified events count, since a
/// backend that cannot tell may be hiding a rename.
#[must_use]
pub fn is_structural_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Remove(_)
            | EventKind::Modify(ModifyKind::Name(_))
            | EventKind::Any
            | EventKind::Other
    )
}

/// Watch `root` recursively and post `signal` on structural changes until
/// `cancel` fires.
///
/// If the watch cannot be set up the task logs and returns `Ok(())`; the
/// slideshow keeps its last scan.
#[instrument(skip(root, signal, cancel), fields(root = %root.display()))]
pub async fn run(
    root: PathBuf,
    signal: Arc<RescanSignal>,
    debounce: Duration,
    cancel: CancellationToken,
) -> Result<()> {
    // Bridge notify callback -> async channel. Only structural events are
    // queued, so a full queue already guarantees a later rescan and dropping
    // the overflow loses nothing. Backend errors are logged here.
    let (watch_tx, mut watch_rx) = mpsc::channel::<Event>(64);
    let mut watcher = match recommended_watcher(move |res: notify::Result<Event>| {
        forward(&watch_tx, res);
    }) {
        Ok(watcher) => watcher,
        Err(err) => {
            warn!(error = %err, "failed to create directory watcher; live updates disabled");
            return Ok(());
        }
    };
    if let Err(err) = watcher.watch(&root, RecursiveMode::Recursive) {
        warn!(error = %err, "failed to watch photo folder; live updates disabled");
        return Ok(());
    }
    info!("directory watcher initialized (recursive)");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("cancel received; exiting watch task");
                break;
            }
            res = watch_rx.recv() => match res {
                Some(event) => {
                    debug!(kind = ?event.kind, paths = ?event.paths, "fs: structural change");
                    if !debounce.is_zero() && !settle(&mut watch_rx, debounce, &cancel).await {
                        info!("cancel received while debouncing; exiting watch task");
                        break;
                    }
                    if signal.post() {
                        debug!("rescan requested");
                    }
                }
                None => {
                    warn!("watch channel closed; exiting watch task");
                    break;
                }
            }
        }
    }
    Ok(())
}

/// Body of the notify callback.
fn forward(tx: &Sender<Event>, res: notify::Result<Event>) {
    match res {
        Ok(event) if is_structural_change(&event.kind) => {
            let _ = tx.try_send(event);
        }
        Ok(_) => {}
        Err(err) => warn!("watch error: {err}"),
    }
}

/// Swallow further events until `quiet` passes without one.
/// Returns `false` if cancelled meanwhile.
async fn settle(
    rx: &mut Receiver<Event>,
    quiet: Duration,
    cancel: &CancellationToken,
) -> bool {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return false,
            _ = tokio::time::sleep(quiet) => return true,
            more = rx.recv() => {
                if more.is_none() {
                    return true;
                }
            }
        }
    }
}
