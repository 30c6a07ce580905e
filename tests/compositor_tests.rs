use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{Rgba, RgbaImage};
use rust_slideshow::error::Error;
use rust_slideshow::processing::layout::ViewportFit;
use rust_slideshow::render::compositor::{Compositor, FrameOutcome, pack_rgb};
use rust_slideshow::render::loader::ImageDecoder;
use tempfile::tempdir;

const RED: u32 = 0x00ff_0000;

struct CountingDecoder {
    calls: Arc<AtomicUsize>,
}

impl ImageDecoder for CountingDecoder {
    fn decode(&self, _path: &Path) -> Result<RgbaImage, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(RgbaImage::from_pixel(4, 2, Rgba([0, 0, 255, 255])))
    }
}

/// Fails on the first call, like a file that is still being written.
struct HalfWrittenDecoder {
    calls: Arc<AtomicUsize>,
}

impl ImageDecoder for HalfWrittenDecoder {
    fn decode(&self, path: &Path) -> Result<RgbaImage, Error> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("{} is truncated", path.display()),
            )));
        }
        Ok(RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255])))
    }
}

#[test]
fn wide_image_is_letterboxed_on_background() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("wide.png");
    RgbaImage::from_pixel(200, 100, Rgba([255, 0, 0, 255]))
        .save(&path)
        .unwrap();

    let mut compositor = Compositor::with_background([0, 0, 0]);
    let outcome = compositor.render(Some(&path), 100, 100);
    assert_eq!(
        outcome,
        FrameOutcome::Image(ViewportFit {
            x: 0,
            y: 25,
            width: 100,
            height: 50
        })
    );

    let frame = compositor.frame();
    assert_eq!((frame.width(), frame.height()), (100, 100));
    assert_eq!(frame.pixels().len(), 100 * 100);
    assert_eq!(frame.pixel(50, 10), Some(0));
    assert_eq!(frame.pixel(50, 90), Some(0));
    assert_eq!(frame.pixel(50, 50), Some(RED));
    assert_eq!(frame.pixel(0, 25), Some(RED));
    assert_eq!(frame.pixel(99, 74), Some(RED));
}

#[test]
fn undecodable_file_leaves_background_only() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("broken.png");
    fs::write(&path, b"not really a png").unwrap();

    let mut compositor = Compositor::with_background([10, 20, 30]);
    assert_eq!(
        compositor.render(Some(&path), 8, 6),
        FrameOutcome::DecodeFailed
    );
    let bg = pack_rgb([10, 20, 30]);
    assert!(compositor.frame().pixels().iter().all(|&px| px == bg));

    let missing = tmp.path().join("gone.jpg");
    assert_eq!(
        compositor.render(Some(&missing), 8, 6),
        FrameOutcome::DecodeFailed
    );
}

#[test]
fn empty_set_and_zero_viewport_render_blank() {
    let mut compositor = Compositor::with_background([1, 2, 3]);
    assert_eq!(compositor.render(None, 4, 4), FrameOutcome::Blank);
    assert!(
        compositor
            .frame()
            .pixels()
            .iter()
            .all(|&px| px == pack_rgb([1, 2, 3]))
    );

    let tmp = tempdir().unwrap();
    let path = tmp.path().join("a.png");
    RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]))
        .save(&path)
        .unwrap();
    assert_eq!(compositor.render(Some(&path), 0, 10), FrameOutcome::Blank);
    assert!(compositor.frame().pixels().is_empty());
}

#[test]
fn unchanged_frame_is_reused_until_invalidated() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut compositor = Compositor::new(
        CountingDecoder {
            calls: calls.clone(),
        },
        [0, 0, 0],
    );
    let a = Path::new("/virtual/a.jpg");
    let b = Path::new("/virtual/b.jpg");

    let first = compositor.render(Some(a), 40, 40);
    assert_eq!(compositor.render(Some(a), 40, 40), first);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    compositor.render(Some(a), 40, 30);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    compositor.render(Some(b), 40, 30);
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    compositor.invalidate();
    compositor.render(Some(b), 40, 30);
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn switching_images_clears_previous_frame() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut compositor = Compositor::new(CountingDecoder { calls }, [0, 0, 0]);
    // 4x2 source fills a 40x20 viewport exactly.
    compositor.render(Some(Path::new("/virtual/a.jpg")), 40, 20);
    assert_eq!(compositor.frame().pixel(0, 0), Some(0x0000_00ff));

    compositor.render(None, 40, 20);
    assert!(compositor.frame().pixels().iter().all(|&px| px == 0));
}

#[test]
fn decode_failure_is_retried_on_next_render() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut compositor = Compositor::new(
        HalfWrittenDecoder {
            calls: calls.clone(),
        },
        [0, 0, 0],
    );
    let path = Path::new("/virtual/partial.jpg");

    assert_eq!(
        compositor.render(Some(path), 8, 8),
        FrameOutcome::DecodeFailed
    );
    assert!(matches!(
        compositor.render(Some(path), 8, 8),
        FrameOutcome::Image(_)
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(compositor.frame().pixel(4, 4), Some(RED));

    // The successful frame is now reused.
    compositor.render(Some(path), 8, 8);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
