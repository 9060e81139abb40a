//! Move image content away from corner watermarks, then put it back.
//!
//! Watermarks are usually stamped into a fixed corner of an image. Expanding
//! the image with a white margin on the right and bottom before the watermark
//! is applied means the mark lands on the margin instead of the content.
//! Restoring crops the margin (and the mark with it) back off.
//!
//! Both transforms are pure functions over decoded images and use a single
//! [`MarginRatio`] (10% by default). Restoring reconstructs each side to
//! within one pixel of the original; pixels that survive are bit-identical.
//!
//! # Quick Start
//!
//! ```no_run
//! use ai_watermark_fighter::{crop, expand, MarginRatio};
//!
//! let ratio = MarginRatio::default();
//! let img = image::open("photo.png").unwrap();
//! let padded = expand(&img, ratio).unwrap();
//! padded.save("photo-enlarge.png").unwrap();
//!
//! let restored = crop(&padded, ratio).unwrap();
//! restored.save("photo-restore.png").unwrap();
//! ```
//!
//! # Batch processing
//!
//! [`Transformer`] loads, transforms and saves files, turning every failure
//! into a [`ProcessResult`] so a batch can continue past bad inputs.
//!
//! ```no_run
//! use ai_watermark_fighter::{collect_image_paths, Operation, ProcessOptions, Transformer};
//!
//! let inputs = collect_image_paths("shots/");
//! let opts = ProcessOptions {
//!     operation: Operation::Enlarge,
//!     ..ProcessOptions::default()
//! };
//! for result in Transformer::default().process_all(&inputs, &opts) {
//!     println!("{}: {}", result.path.display(), result.message);
//! }
//! ```

#![deny(missing_docs)]

pub mod batch;
pub mod canvas;
pub mod codec;
pub mod cropper;
pub mod dimensions;
pub mod error;

pub use batch::{
    collect_image_paths, is_supported_image, output_path, Operation, ProcessOptions,
    ProcessResult, Summary, Transformer,
};
pub use canvas::expand;
pub use codec::{decode, encode, open_image, save_image, OutputFormat};
pub use cropper::crop;
pub use dimensions::{expanded_size, restored_size, MarginRatio};
pub use error::{Error, Result};
