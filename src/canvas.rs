//! Canvas compositing: paste an image onto a larger white canvas.

use image::{imageops, DynamicImage, ImageBuffer, Pixel, Rgb, Rgba};
use log::debug;

use crate::dimensions::{expanded_size, MarginRatio};
use crate::error::Result;

/// Opaque white fill for images without alpha.
pub const BACKGROUND_RGB: Rgb<u8> = Rgb([255, 255, 255]);

/// Opaque white fill for images with alpha.
pub const BACKGROUND_RGBA: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Opaque white at 16 bits per channel.
const WHITE_RGB16: Rgb<u16> = Rgb([u16::MAX; 3]);
const WHITE_RGBA16: Rgba<u16> = Rgba([u16::MAX; 4]);

/// Opaque white for floating-point images.
const WHITE_RGB32F: Rgb<f32> = Rgb([1.0; 3]);
const WHITE_RGBA32F: Rgba<f32> = Rgba([1.0; 4]);

/// Expand an image by adding a white margin to the right and bottom.
///
/// The new canvas is `expanded_size(width, height, ratio)`. Sources with an
/// alpha channel produce an RGBA canvas, everything else (including
/// grayscale) produces RGB. The channel depth of the source is kept: 16-bit
/// sources give 16-bit canvases and float sources give float canvases. The
/// source is copied verbatim to the origin, alpha included, so the region
/// `(0, 0)..(width, height)` is identical to the source and everything else
/// is background.
///
/// # Errors
///
/// Returns [`Error::InvalidDimension`](crate::Error::InvalidDimension) for
/// zero-sized sources or canvases that would not fit in a `u32`.
pub fn expand(image: &DynamicImage, ratio: MarginRatio) -> Result<DynamicImage> {
    let (width, height) = (image.width(), image.height());
    let (w, h) = expanded_size(width, height, ratio)?;
    debug!("expand {width}x{height} -> {w}x{h} (ratio {ratio})");

    let expanded = match image {
        DynamicImage::ImageLuma16(_) | DynamicImage::ImageRgb16(_) => {
            DynamicImage::ImageRgb16(paste_at_origin(&image.to_rgb16(), w, h, WHITE_RGB16))
        }
        DynamicImage::ImageLumaA16(_) | DynamicImage::ImageRgba16(_) => {
            DynamicImage::ImageRgba16(paste_at_origin(&image.to_rgba16(), w, h, WHITE_RGBA16))
        }
        DynamicImage::ImageRgb32F(_) => {
            DynamicImage::ImageRgb32F(paste_at_origin(&image.to_rgb32f(), w, h, WHITE_RGB32F))
        }
        DynamicImage::ImageRgba32F(_) => {
            DynamicImage::ImageRgba32F(paste_at_origin(&image.to_rgba32f(), w, h, WHITE_RGBA32F))
        }
        _ if image.color().has_alpha() => {
            DynamicImage::ImageRgba8(paste_at_origin(&image.to_rgba8(), w, h, BACKGROUND_RGBA))
        }
        _ => DynamicImage::ImageRgb8(paste_at_origin(&image.to_rgb8(), w, h, BACKGROUND_RGB)),
    };
    Ok(expanded)
}

/// Allocate a `width`x`height` buffer filled with `fill` and copy `src` to `(0, 0)`.
fn paste_at_origin<P>(
    src: &ImageBuffer<P, Vec<P::Subpixel>>,
    width: u32,
    height: u32,
    fill: P,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel,
{
    let mut canvas = ImageBuffer::from_pixel(width, height, fill);
    imageops::replace(&mut canvas, src, 0, 0);
    canvas
}
