//! Dimension arithmetic for expanding and restoring images.
//!
//! Expansion adds `floor(side * ratio)` to each side. Restoration divides the
//! padded side by `1 + ratio` and rounds half away from zero. Because the two
//! directions use different rounding, a round trip recovers each side to
//! within one pixel rather than exactly:
//!
//! ```
//! use ai_watermark_fighter::dimensions::{expanded_size, restored_size, MarginRatio};
//!
//! let ratio = MarginRatio::default();
//! assert_eq!(expanded_size(1000, 800, ratio).unwrap(), (1100, 880));
//! assert_eq!(restored_size(1100, 880, ratio).unwrap(), (1000, 800));
//!
//! // 777 -> 854 -> 776: off by one, still within bounds.
//! assert_eq!(expanded_size(777, 555, ratio).unwrap(), (854, 610));
//! assert_eq!(restored_size(854, 610, ratio).unwrap(), (776, 555));
//! ```

use std::fmt;

use crate::error::{Error, Result};

/// Fraction of each side added as margin.
///
/// The same ratio must be used to restore an image that was used to expand it.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct MarginRatio(f64);

impl MarginRatio {
    /// The reference margin: 10% of each side.
    pub const DEFAULT: Self = Self(0.1);

    /// Create a ratio, rejecting values that are not finite and positive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRatio`] for `NaN`, infinities, zero and negatives.
    pub fn new(ratio: f64) -> Result<Self> {
        if ratio.is_finite() && ratio > 0.0 {
            Ok(Self(ratio))
        } else {
            Err(Error::InvalidRatio(ratio))
        }
    }

    /// The raw fraction.
    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }

    /// Margin added to one side of length `side`, truncated toward zero.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn margin(self, side: u32) -> u64 {
        (f64::from(side) * self.0).floor() as u64
    }

    /// Side length before expansion, rounded half away from zero.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn unscale(self, side: u32) -> u64 {
        (f64::from(side) / (1.0 + self.0)).round() as u64
    }
}

impl Default for MarginRatio {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for MarginRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for MarginRatio {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

fn positive_u32(width: u64, height: u64) -> Result<(u32, u32)> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok((w, h)),
        _ => Err(Error::InvalidDimension { width, height }),
    }
}

/// Canvas size after adding the margin to the right and bottom.
///
/// `w2 = w + floor(w * ratio)` and likewise for the height. The margin is
/// never negative, so the canvas is never smaller than the source.
///
/// # Errors
///
/// Returns [`Error::InvalidDimension`] if either side is zero or the result
/// does not fit in a `u32`.
pub fn expanded_size(width: u32, height: u32, ratio: MarginRatio) -> Result<(u32, u32)> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimension {
            width: width.into(),
            height: height.into(),
        });
    }
    positive_u32(
        u64::from(width) + ratio.margin(width),
        u64::from(height) + ratio.margin(height),
    )
}

/// Size an expanded image had before its margin was added.
///
/// `w = round(w2 / (1 + ratio))`, rounding half away from zero.
///
/// # Errors
///
/// Returns [`Error::InvalidDimension`] if either reconstructed side is zero,
/// which happens for degenerate inputs that cannot have been expanded.
pub fn restored_size(width: u32, height: u32, ratio: MarginRatio) -> Result<(u32, u32)> {
    positive_u32(ratio.unscale(width), ratio.unscale(height))
}
