use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use softbuffer::{Context as SoftContext, Surface};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Fullscreen, Window, WindowId},
};

use crate::{
    config::Configuration,
    events::{RescanSignal, SessionEvent, ViewerEvent},
    navigation::Direction,
    render::compositor::{Compositor, FrameOutcome},
    session::Session,
};

type WindowHandle = Arc<Window>;

/// Build the main-thread event loop that carries [`ViewerEvent`]s.
pub fn build_event_loop() -> Result<EventLoop<ViewerEvent>> {
    EventLoop::<ViewerEvent>::with_user_event()
        .build()
        .context("failed to build viewer event loop")
}

/// Rescan flag whose wake-up is a [`ViewerEvent::RescanRequested`] on `event_loop`.
pub fn rescan_signal(event_loop: &EventLoop<ViewerEvent>) -> Arc<RescanSignal> {
    let proxy = event_loop.create_proxy();
    RescanSignal::new(move || {
        // Closed only once the loop has exited; nothing left to rescan then.
        let _ = proxy.send_event(ViewerEvent::RescanRequested);
    })
}

struct ViewerApp {
    fullscreen: bool,
    session: Session,
    compositor: Compositor,
    signal: Arc<RescanSignal>,
    cancel: CancellationToken,
    window: Option<WindowHandle>,
    context: Option<SoftContext<WindowHandle>>,
    surface: Option<Surface<WindowHandle, WindowHandle>>,
    surface_size: Option<(u32, u32)>,
    needs_redraw: bool,
}

impl ViewerApp {
    fn new(
        cfg: &Configuration,
        session: Session,
        signal: Arc<RescanSignal>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            fullscreen: cfg.fullscreen,
            session,
            compositor: Compositor::with_background(cfg.background),
            signal,
            cancel,
            window: None,
            context: None,
            surface: None,
            surface_size: None,
            needs_redraw: true,
        }
    }

    fn ensure_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        if self.window.is_some() {
            return Ok(());
        }

        let mut attrs = Window::default_attributes().with_title("Slideshow");
        attrs = if self.fullscreen {
            attrs
                .with_decorations(false)
                .with_fullscreen(Some(Fullscreen::Borderless(None)))
        } else {
            attrs.with_maximized(true)
        };
        let window = WindowHandle::new(
            event_loop
                .create_window(attrs)
                .context("failed to create viewer window")?,
        );
        if self.fullscreen {
            window.set_cursor_visible(false);
        }

        let context = SoftContext::new(window.clone())
            .map_err(|err| anyhow!("failed to create softbuffer context: {err:?}"))?;
        let surface = Surface::new(&context, window.clone())
            .map_err(|err| anyhow!("failed to create softbuffer surface: {err:?}"))?;

        let size = window.inner_size();
        info!(
            width = size.width,
            height = size.height,
            fullscreen = self.fullscreen,
            "viewer window created"
        );
        self.context = Some(context);
        self.surface = Some(surface);
        self.surface_size = None;
        self.window = Some(window);
        Ok(())
    }

    fn request_redraw(&mut self) {
        self.needs_redraw = true;
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn apply(&mut self, event: SessionEvent) {
        if self.session.handle(event, Instant::now()) {
            self.slide_changed();
        }
    }

    /// The cursor moved or the set changed; the file may differ from the
    /// cached frame even under the same path.
    fn slide_changed(&mut self) {
        self.compositor.invalidate();
        self.request_redraw();
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        let pressed = event.state == ElementState::Pressed;
        let direction = match event.logical_key.as_ref() {
            Key::Named(NamedKey::Escape) if pressed => {
                info!("escape pressed; exiting");
                event_loop.exit();
                return;
            }
            Key::Named(NamedKey::ArrowRight) => Direction::Forward,
            Key::Named(NamedKey::ArrowLeft) => Direction::Backward,
            _ => return,
        };
        // The key-repeat timer paces held keys; OS auto-repeat would double-step.
        if pressed && event.repeat {
            return;
        }
        self.apply(SessionEvent::Key { direction, pressed });
    }

    /// Consume the pending redraw for a surface of `size`. Returns `None` for
    /// a zero-sized (minimised) surface; the next `Resized` asks again.
    fn take_redraw(&mut self, size: PhysicalSize<u32>) -> Option<(NonZeroU32, NonZeroU32)> {
        self.needs_redraw = false;
        let extent = NonZeroU32::new(size.width).zip(NonZeroU32::new(size.height));
        if extent.is_none() {
            trace!("viewer surface has zero size; skipping draw");
        }
        extent
    }

    fn draw(&mut self) {
        let Some(size) = self.window.as_ref().map(|window| window.inner_size()) else {
            return;
        };
        let Some((w, h)) = self.take_redraw(size) else {
            return;
        };
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let PhysicalSize { width, height } = size;
        if self.surface_size != Some((width, height)) {
            if let Err(err) = surface.resize(w, h) {
                error!("softbuffer resize error: {err:?}");
                return;
            }
            self.surface_size = Some((width, height));
        }

        let outcome = self.compositor.render(self.session.current(), width, height);
        match outcome {
            FrameOutcome::Image(fit) => trace!(?fit, "presenting image frame"),
            FrameOutcome::Blank => trace!("presenting blank frame"),
            FrameOutcome::DecodeFailed => trace!("presenting background after decode failure"),
        }

        match surface.buffer_mut() {
            Ok(mut buffer) => {
                let frame = self.compositor.frame().pixels();
                let len = buffer.len().min(frame.len());
                buffer[..len].copy_from_slice(&frame[..len]);
                if let Err(err) = buffer.present() {
                    error!("softbuffer present error: {err:?}");
                }
            }
            Err(err) => error!("softbuffer buffer access error: {err:?}"),
        }
    }
}

impl ApplicationHandler<ViewerEvent> for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.cancel.is_cancelled() {
            event_loop.exit();
            return;
        }
        if let Err(err) = self.ensure_window(event_loop) {
            error!(error = ?err, "failed to initialize viewer window");
            event_loop.exit();
            return;
        }
        self.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                info!("viewer window close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                debug!(width = size.width, height = size.height, "viewer resized");
                self.request_redraw();
            }
            WindowEvent::RedrawRequested => self.draw(),
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event_loop, &event),
            _ => {}
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::RescanRequested => {
                if self.signal.take() {
                    self.apply(SessionEvent::RescanRequested);
                }
            }
            ViewerEvent::Cancelled => {
                info!("viewer received cancellation event");
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.fire_due(Instant::now()) {
            self.slide_changed();
        } else if self.needs_redraw {
            self.request_redraw();
        }
        match self.session.next_deadline() {
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Surface before context before window.
        self.surface = None;
        self.context = None;
        if self.window.take().is_some() {
            debug!("viewer window released");
        }
    }
}

/// Run the slideshow window on the calling (main) thread until it closes or
/// `cancel` fires.
pub fn run_windowed(
    event_loop: EventLoop<ViewerEvent>,
    session: Session,
    signal: Arc<RescanSignal>,
    cfg: &Configuration,
    cancel: CancellationToken,
) -> Result<()> {
    let proxy = event_loop.create_proxy();
    let cancel_task = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            cancel.cancelled().await;
            let _ = proxy.send_event(ViewerEvent::Cancelled);
        })
    };

    if session.navigator().is_empty() {
        warn!("starting viewer with an empty image set");
    }
    let mut app = ViewerApp::new(cfg, session, signal, cancel);
    let run_result = event_loop.run_app(&mut app);
    cancel_task.abort();

    run_result.context("viewer event loop failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionSettings;
    use std::path::PathBuf;

    fn headless_app() -> ViewerApp {
        let cfg = Configuration::default();
        let session = Session::new(
            PathBuf::from("/fake"),
            vec![PathBuf::from("/fake/a.jpg")],
            SessionSettings::from(&cfg),
            Instant::now(),
        );
        ViewerApp::new(&cfg, session, RescanSignal::new(|| {}), CancellationToken::new())
    }

    #[test]
    fn minimised_surface_clears_pending_redraw() {
        let mut app = headless_app();
        assert!(app.needs_redraw);
        assert_eq!(app.take_redraw(PhysicalSize::new(0, 0)), None);
        assert!(!app.needs_redraw);

        app.request_redraw();
        assert_eq!(app.take_redraw(PhysicalSize::new(1280, 0)), None);
        assert!(!app.needs_redraw);
    }

    #[test]
    fn visible_surface_yields_extent() {
        let mut app = headless_app();
        let (w, h) = app.take_redraw(PhysicalSize::new(800, 600)).unwrap();
        assert_eq!((w.get(), h.get()), (800, 600));
        assert!(!app.needs_redraw);
    }
}
