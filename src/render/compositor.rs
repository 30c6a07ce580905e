//! Off-screen composition of the current slide.
//!
//! Every frame is built completely in a [`FrameBuffer`] (background fill, then
//! the scaled image) and only then handed to the window surface in a single
//! copy, so rapid navigation never shows a half-drawn frame.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use fast_image_resize as fir;
use image::RgbaImage;
use tracing::{debug, warn};

use crate::processing::layout::ViewportFit;
use crate::render::loader::{ImageCrateDecoder, ImageDecoder};

/// Pack an RGB triple into the `0x00RRGGBB` layout used by the window surface.
#[must_use]
pub const fn pack_rgb(rgb: [u8; 3]) -> u32 {
    ((rgb[0] as u32) << 16) | ((rgb[1] as u32) << 8) | rgb[2] as u32
}

/// CPU-side frame in `0x00RRGGBB` pixels, row-major.
#[derive(Debug, Clone, Default)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl FrameBuffer {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let mut frame = Self::default();
        frame.resize(width, height);
        frame
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.resize(width as usize * height as usize, 0);
    }

    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Copy `src` with its top-left corner at (`x`, `y`), blending alpha over
    /// what is already there. Parts outside the frame are clipped.
    pub fn blit_rgba(&mut self, src: &RgbaImage, x: u32, y: u32) {
        let stride = self.width as usize;
        for (sx, sy, px) in src.enumerate_pixels() {
            let (dx, dy) = (x + sx, y + sy);
            if dx >= self.width || dy >= self.height {
                continue;
            }
            let dst = &mut self.pixels[dy as usize * stride + dx as usize];
            *dst = blend(*dst, px.0);
        }
    }
}

fn blend(dst: u32, [r, g, b, a]: [u8; 4]) -> u32 {
    if a == 255 {
        return pack_rgb([r, g, b]);
    }
    let a = u32::from(a);
    let inv = 255 - a;
    let mix = |src: u8, shift: u32| (u32::from(src) * a + ((dst >> shift) & 0xff) * inv) / 255;
    (mix(r, 16) << 16) | (mix(g, 8) << 8) | mix(b, 0)
}

/// What the last [`Compositor::render`] put on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The image was drawn into this rectangle.
    Image(ViewportFit),
    /// Nothing to show (empty set or zero-sized viewport); background only.
    Blank,
    /// Decoding failed; background only, playback continues.
    DecodeFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FrameKey {
    path: Option<PathBuf>,
    width: u32,
    height: u32,
}

pub struct Compositor<D = ImageCrateDecoder> {
    decoder: D,
    background: u32,
    frame: FrameBuffer,
    resizer: fir::Resizer,
    composed: Option<(FrameKey, FrameOutcome)>,
}

impl Compositor<ImageCrateDecoder> {
    #[must_use]
    pub fn with_background(background: [u8; 3]) -> Self {
        Self::new(ImageCrateDecoder, background)
    }
}

impl<D: ImageDecoder> Compositor<D> {
    pub fn new(decoder: D, background: [u8; 3]) -> Self {
        Self {
            decoder,
            background: pack_rgb(background),
            frame: FrameBuffer::default(),
            resizer: fir::Resizer::new(),
            composed: None,
        }
    }

    /// The finished off-screen frame, ready to be presented.
    #[must_use]
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Forget the cached frame; the next render decodes again.
    pub fn invalidate(&mut self) {
        self.composed = None;
    }

    /// Compose `current` into a `viewport_w` x `viewport_h` frame.
    ///
    /// An unchanged (path, size) pair reuses the previous frame if it showed
    /// the image. Decode failures leave a background-only frame, are reported
    /// and are retried on the next render.
    pub fn render(
        &mut self,
        current: Option<&Path>,
        viewport_w: u32,
        viewport_h: u32,
    ) -> FrameOutcome {
        let key = FrameKey {
            path: current.map(Path::to_path_buf),
            width: viewport_w,
            height: viewport_h,
        };
        if let Some((cached, outcome)) = &self.composed
            && *cached == key
        {
            return *outcome;
        }

        self.frame.resize(viewport_w, viewport_h);
        self.frame.fill(self.background);
        let outcome = match current {
            Some(path) if viewport_w > 0 && viewport_h > 0 => self.draw_image(path),
            _ => FrameOutcome::Blank,
        };
        self.composed = matches!(outcome, FrameOutcome::Image(_)).then_some((key, outcome));
        outcome
    }

    fn draw_image(&mut self, path: &Path) -> FrameOutcome {
        // `decoded` is dropped on every return path below.
        let decoded = match self.decoder.decode(path) {
            Ok(img) => img,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping undecodable image");
                return FrameOutcome::DecodeFailed;
            }
        };
        let Some(fit) = ViewportFit::contain(
            decoded.width(),
            decoded.height(),
            self.frame.width(),
            self.frame.height(),
        ) else {
            return FrameOutcome::Blank;
        };
        let scaled = match resize_rgba(&mut self.resizer, &decoded, fit.width, fit.height) {
            Ok(scaled) => scaled,
            Err(err) => {
                warn!(path = %path.display(), error = ?err, "failed to scale image");
                return FrameOutcome::DecodeFailed;
            }
        };
        self.frame.blit_rgba(&scaled, fit.x, fit.y);
        debug!(
            path = %path.display(),
            src_w = decoded.width(),
            src_h = decoded.height(),
            x = fit.x,
            y = fit.y,
            w = fit.width,
            h = fit.height,
            "composed frame"
        );
        FrameOutcome::Image(fit)
    }
}

fn resize_rgba(
    resizer: &mut fir::Resizer,
    source: &RgbaImage,
    target_w: u32,
    target_h: u32,
) -> Result<RgbaImage> {
    if source.width() == target_w && source.height() == target_h {
        return Ok(source.clone());
    }
    let src_view = fir::images::ImageRef::new(
        source.width(),
        source.height(),
        source.as_raw(),
        fir::PixelType::U8x4,
    )
    .context("failed to create source view for resize")?;
    let mut dst_image = fir::images::Image::new(target_w, target_h, fir::PixelType::U8x4);
    let options =
        fir::ResizeOptions::new().resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::Bilinear));
    resizer
        .resize(&src_view, &mut dst_image, Some(&options))
        .context("resize failed")?;
    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| anyhow!("failed to construct resized RGBA image"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_rgb_layout() {
        assert_eq!(pack_rgb([0x12, 0x34, 0x56]), 0x0012_3456);
        assert_eq!(pack_rgb([0, 0, 0]), 0);
    }

    #[test]
    fn blend_respects_alpha() {
        let white = pack_rgb([255, 255, 255]);
        assert_eq!(blend(white, [0, 0, 0, 255]), 0);
        assert_eq!(blend(white, [0, 0, 0, 0]), white);
        assert_eq!(blend(0, [255, 255, 255, 51]), pack_rgb([51, 51, 51]));
    }

    #[test]
    fn blit_clips_to_frame() {
        let mut frame = FrameBuffer::new(4, 4);
        let src = RgbaImage::from_pixel(3, 3, image::Rgba([255, 0, 0, 255]));
        frame.blit_rgba(&src, 2, 2);
        assert_eq!(frame.pixel(3, 3), Some(0x00ff_0000));
        assert_eq!(frame.pixel(1, 1), Some(0));
        assert_eq!(frame.pixel(4, 0), None);
    }
}
