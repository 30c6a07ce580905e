//! Image decoding for the compositor.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::RgbaImage;
use tracing::trace;

use crate::error::Error;

/// Decodes a file into an owned RGBA8 image.
///
/// The returned buffer is the decode handle: dropping it releases it.
pub trait ImageDecoder {
    fn decode(&self, path: &Path) -> Result<RgbaImage, Error>;
}

/// Decoder backed by the `image` crate, with EXIF orientation applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, path: &Path) -> Result<RgbaImage, Error> {
        let img = image::ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|source| Error::Decode {
                path: path.to_path_buf(),
                source,
            })?;
        let img = img.to_rgba8();
        Ok(apply_orientation(img, read_orientation(path).unwrap_or(1)))
    }
}

/// Map an EXIF orientation tag onto the upright image. Unknown values pass through.
pub fn apply_orientation(img: RgbaImage, orientation: u16) -> RgbaImage {
    use image::imageops::{flip_horizontal, flip_vertical, rotate90, rotate180, rotate270};
    match orientation {
        2 => flip_horizontal(&img),
        3 => rotate180(&img),
        4 => flip_vertical(&img),
        5 => flip_horizontal(&rotate90(&img)),
        6 => rotate90(&img),
        7 => flip_horizontal(&rotate270(&img)),
        8 => rotate270(&img),
        _ => img,
    }
}

fn read_orientation(path: &Path) -> Option<u16> {
    let file = File::open(path).ok()?;
    let mut buf = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut buf).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    let o = u16::try_from(field.value.get_uint(0)?).ok()?;
    trace!(orientation = o, path = %path.display(), "exif orientation");
    Some(o)
}
