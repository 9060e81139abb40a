//! Decoding and encoding at the edges of the transforms.
//!
//! The transforms in [`canvas`](crate::canvas) and [`cropper`](crate::cropper)
//! work on decoded images only. This module turns bytes and files into
//! [`DynamicImage`]s and back, including the JPEG-specific flattening of
//! transparent pixels onto white.

use std::fmt;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageFormat, ImageReader, Rgb, RgbImage};
use log::warn;

use crate::error::{Error, Result};

/// JPEG quality used for every JPEG output.
pub const JPEG_QUALITY: u8 = 95;

/// Output encodings the tool can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Lossless PNG, keeps alpha.
    Png,
    /// JPEG at [`JPEG_QUALITY`]; alpha is flattened onto white.
    Jpeg,
    /// Lossless WebP, keeps alpha.
    WebP,
}

impl OutputFormat {
    /// File extension written for this format, without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Parse a format name, falling back to PNG for names that are not recognized.
    ///
    /// Use this where a format name comes from loose input and any name
    /// should still produce an image, e.g. `demos/round_trip.rs`. The fallback
    /// is logged at warn level. Callers that want a hard error, like the CLI's
    /// `--format`, parse with [`FromStr`] instead.
    #[must_use]
    pub fn resolve(name: &str) -> Self {
        name.parse().unwrap_or_else(|e| {
            warn!("{e}, falling back to PNG");
            Self::Png
        })
    }

    /// Format to keep when no override is requested, chosen from the input extension.
    ///
    /// PNG, JPEG and WebP inputs keep their format; anything else becomes PNG.
    #[must_use]
    pub fn for_input(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        match ext.as_deref() {
            Some("jpg" | "jpeg") => Self::Jpeg,
            Some("webp") => Self::WebP,
            _ => Self::Png,
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::WebP => ImageFormat::WebP,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "PNG" => Ok(Self::Png),
            "JPG" | "JPEG" => Ok(Self::Jpeg),
            "WEBP" => Ok(Self::WebP),
            _ => Err(Error::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::WebP => "WEBP",
        };
        f.write_str(name)
    }
}

fn non_empty(image: DynamicImage) -> Result<DynamicImage> {
    if image.width() == 0 || image.height() == 0 {
        return Err(Error::InvalidDimension {
            width: image.width().into(),
            height: image.height().into(),
        });
    }
    Ok(image)
}

/// Decode an image from memory, sniffing the format from its contents.
///
/// # Errors
///
/// Returns [`Error::Decode`] for corrupt or unsupported data and
/// [`Error::InvalidDimension`] if the decoded image has no pixels.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes)
        .map_err(Error::Decode)
        .and_then(non_empty)
}

/// Open and decode an image file, sniffing the format from its contents.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, otherwise as [`decode`].
pub fn open_image(path: &Path) -> Result<DynamicImage> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    reader.decode().map_err(Error::Decode).and_then(non_empty)
}

/// Composite an image over opaque white, dropping alpha.
///
/// Each channel becomes `c * a + 255 * (1 - a)`, rounded.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let px = rgba.get_pixel(x, y);
        let alpha = u32::from(px[3]);
        let blend = |c: u8| ((u32::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(px[0]), blend(px[1]), blend(px[2])])
    })
}

/// Encode an image into `format`.
///
/// PNG keeps 8- and 16-bit images as they are; float images are written at
/// 16 bits. JPEG output is flattened onto white first when the image carries
/// alpha. WebP output is lossless and written from 8-bit RGB or RGBA.
///
/// # Errors
///
/// Returns [`Error::Image`] if the encoder fails.
pub fn encode(image: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    match format {
        OutputFormat::Png => {
            let mut cursor = Cursor::new(&mut buf);
            match image {
                DynamicImage::ImageRgb32F(_) => DynamicImage::ImageRgb16(image.to_rgb16())
                    .write_to(&mut cursor, format.image_format())?,
                DynamicImage::ImageRgba32F(_) => DynamicImage::ImageRgba16(image.to_rgba16())
                    .write_to(&mut cursor, format.image_format())?,
                _ => image.write_to(&mut cursor, format.image_format())?,
            }
        }
        OutputFormat::Jpeg => {
            let rgb = if image.color().has_alpha() {
                flatten_onto_white(image)
            } else {
                image.to_rgb8()
            };
            let mut encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
            encoder.encode_image(&rgb)?;
        }
        OutputFormat::WebP => {
            let eight_bit = if image.color().has_alpha() {
                DynamicImage::ImageRgba8(image.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(image.to_rgb8())
            };
            eight_bit.write_with_encoder(WebPEncoder::new_lossless(&mut buf))?;
        }
    }
    Ok(buf)
}

/// Encode an image and write it to `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn save_image(image: &DynamicImage, path: &Path, format: OutputFormat) -> Result<()> {
    let bytes = encode(image, format)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, bytes)?;
    Ok(())
}
