//! Cropping an expanded image back to its original size.

use image::DynamicImage;
use log::debug;

use crate::dimensions::{restored_size, MarginRatio};
use crate::error::Result;

/// Remove the margin that [`expand`](crate::expand) added.
///
/// The original size is reconstructed with [`restored_size`] and the region
/// `(0, 0)..(width, height)` is copied out without resampling. The pixel
/// format of the input is kept as-is, alpha included.
///
/// # Errors
///
/// Returns [`Error::InvalidDimension`](crate::Error::InvalidDimension) when
/// the image is too small to have been expanded with `ratio`.
pub fn crop(image: &DynamicImage, ratio: MarginRatio) -> Result<DynamicImage> {
    let (width, height) = (image.width(), image.height());
    let (orig_w, orig_h) = restored_size(width, height, ratio)?;
    debug!("crop {width}x{height} -> {orig_w}x{orig_h} (ratio {ratio})");

    Ok(image.crop_imm(0, 0, orig_w, orig_h))
}
