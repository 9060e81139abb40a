//! Error types for the ai-watermark-fighter crate.

/// Errors that can occur while expanding, restoring, decoding or encoding images.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A computed or reconstructed dimension is not a positive `u32`.
    #[error("invalid dimension {width}x{height}: image too small or too large for this margin")]
    InvalidDimension {
        /// Computed width in pixels (0 when it collapsed).
        width: u64,
        /// Computed height in pixels (0 when it collapsed).
        height: u64,
    },

    /// The margin ratio is not a finite number greater than zero.
    #[error("invalid margin ratio {0}: must be a finite number > 0")]
    InvalidRatio(f64),

    /// Input bytes are not a valid or supported image.
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// The requested output format name is not recognized.
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error occurred while encoding an image.
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
