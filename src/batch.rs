//! Batch processing of image files.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use log::debug;
use walkdir::WalkDir;

use crate::canvas;
use crate::codec::{self, OutputFormat};
use crate::cropper;
use crate::dimensions::MarginRatio;
use crate::error::Result;

/// Extensions picked up when scanning a directory.
const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "bmp", "tiff", "tif", "webp"];

/// Which transform to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Add the white margin.
    Enlarge,
    /// Crop the margin back off.
    Restore,
}

impl Operation {
    /// Suffix appended to the file stem of outputs.
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Enlarge => "-enlarge",
            Self::Restore => "-restore",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Enlarge => "enlarge",
            Self::Restore => "restore",
        })
    }
}

/// Options controlling batch processing.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Transform to apply to every input.
    pub operation: Operation,
    /// Directory for outputs; `None` writes next to each input.
    pub output_dir: Option<PathBuf>,
    /// Output format override; `None` keeps the input's format where possible.
    pub format: Option<OutputFormat>,
    /// Enable verbose output.
    pub verbose: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            operation: Operation::Enlarge,
            output_dir: None,
            format: None,
            verbose: false,
            quiet: false,
        }
    }
}

/// Result of processing a single image file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the input file.
    pub path: PathBuf,
    /// Path written on success.
    pub output: Option<PathBuf>,
    /// Whether processing succeeded.
    pub success: bool,
    /// Human-readable status message.
    pub message: String,
}

impl ProcessResult {
    fn failed(path: &Path, message: String) -> Self {
        Self {
            path: path.to_path_buf(),
            output: None,
            success: false,
            message,
        }
    }
}

/// Success and failure counts over a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Files written.
    pub succeeded: usize,
    /// Files that failed to load, transform or save.
    pub failed: usize,
}

impl Summary {
    /// Count the outcomes in `results`.
    #[must_use]
    pub fn from_results(results: &[ProcessResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            succeeded,
            failed: results.len() - succeeded,
        }
    }

    /// Number of files attempted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Whether every file succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Applies expand or crop with a fixed margin ratio.
///
/// Holds no image state, so one transformer can serve any number of files,
/// from any number of threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transformer {
    ratio: MarginRatio,
}

impl Transformer {
    /// Create a transformer using `ratio` for both directions.
    #[must_use]
    pub fn new(ratio: MarginRatio) -> Self {
        Self { ratio }
    }

    /// The margin ratio in use.
    #[must_use]
    pub fn ratio(&self) -> MarginRatio {
        self.ratio
    }

    /// Add the white margin to `image`.
    ///
    /// # Errors
    ///
    /// See [`canvas::expand`].
    pub fn expand(&self, image: &DynamicImage) -> Result<DynamicImage> {
        canvas::expand(image, self.ratio)
    }

    /// Crop the margin off `image`.
    ///
    /// # Errors
    ///
    /// See [`cropper::crop`].
    pub fn restore(&self, image: &DynamicImage) -> Result<DynamicImage> {
        cropper::crop(image, self.ratio)
    }

    /// Apply `operation` to `image`.
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying transform.
    pub fn apply(&self, image: &DynamicImage, operation: Operation) -> Result<DynamicImage> {
        match operation {
            Operation::Enlarge => self.expand(image),
            Operation::Restore => self.restore(image),
        }
    }

    /// Process a single image file: load, transform, save.
    ///
    /// Failures are reported in the returned [`ProcessResult`], never as a
    /// panic, so a batch can continue past bad files.
    #[must_use]
    pub fn process_file(&self, input: &Path, opts: &ProcessOptions) -> ProcessResult {
        let img = match codec::open_image(input) {
            Ok(img) => img,
            Err(e) => return ProcessResult::failed(input, format!("Failed to load: {e}")),
        };

        let transformed = match self.apply(&img, opts.operation) {
            Ok(out) => out,
            Err(e) => {
                let message = format!("Failed to {}: {e}", opts.operation);
                return ProcessResult::failed(input, message);
            }
        };

        let (output, format) = planned_output(input, opts);
        debug!("{} -> {} as {format}", input.display(), output.display());

        match codec::save_image(&transformed, &output, format) {
            Ok(()) => ProcessResult {
                path: input.to_path_buf(),
                message: format!(
                    "{}x{} written as {format}",
                    transformed.width(),
                    transformed.height()
                ),
                output: Some(output),
                success: true,
            },
            Err(e) => ProcessResult::failed(input, format!("Failed to save: {e}")),
        }
    }

    /// Process every file in `inputs` independently.
    ///
    /// Inputs whose output path was already claimed by an earlier input (for
    /// example `photo.png` and `photo.bmp`, which both write
    /// `photo-enlarge.png`) are not processed and come back as failures, so
    /// no output is overwritten. Uses parallel iteration when the `cli`
    /// feature is enabled (via rayon). Results are returned in input order.
    #[must_use]
    pub fn process_all(&self, inputs: &[PathBuf], opts: &ProcessOptions) -> Vec<ProcessResult> {
        let collisions = find_collisions(inputs, opts);
        let run = |input: &PathBuf, collision: Option<&str>| match collision {
            Some(message) => ProcessResult::failed(input, message.to_string()),
            None => self.process_file(input, opts),
        };

        #[cfg(feature = "cli")]
        {
            use rayon::prelude::*;
            inputs
                .par_iter()
                .zip(collisions.par_iter())
                .map(|(input, collision)| run(input, collision.as_deref()))
                .collect()
        }

        #[cfg(not(feature = "cli"))]
        {
            inputs
                .iter()
                .zip(&collisions)
                .map(|(input, collision)| run(input, collision.as_deref()))
                .collect()
        }
    }
}

/// Where `input` will be written and in which format.
fn planned_output(input: &Path, opts: &ProcessOptions) -> (PathBuf, OutputFormat) {
    let format = opts.format.unwrap_or_else(|| OutputFormat::for_input(input));
    let output = output_path(input, opts.operation, opts.output_dir.as_deref(), format);
    (output, format)
}

/// For each input, a failure message if an earlier input claims the same output path.
fn find_collisions(inputs: &[PathBuf], opts: &ProcessOptions) -> Vec<Option<String>> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::with_capacity(inputs.len());
    inputs
        .iter()
        .map(|input| match claimed.entry(planned_output(input, opts).0) {
            Entry::Occupied(e) => Some(format!(
                "Output path {} collides with {}",
                e.key().display(),
                e.get().display()
            )),
            Entry::Vacant(e) => {
                e.insert(input);
                None
            }
        })
        .collect()
}

/// Check if a file has an extension picked up by directory scans.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}

/// Expand one input argument into image paths.
///
/// An existing file is returned as-is, whatever its extension. A directory
/// is walked recursively for supported images, sorted by path. Anything else
/// is treated as a glob pattern; an invalid pattern matches nothing.
#[must_use]
pub fn collect_image_paths(spec: &str) -> Vec<PathBuf> {
    let path = Path::new(spec);
    if path.is_file() {
        return vec![path.to_path_buf()];
    }

    if path.is_dir() {
        let mut found: Vec<PathBuf> = WalkDir::new(path)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(|p| is_supported_image(p))
            .collect();
        found.sort();
        return found;
    }

    match glob::glob(spec) {
        Ok(paths) => paths
            .filter_map(std::result::Result::ok)
            .filter(|p| p.is_file())
            .collect(),
        Err(e) => {
            debug!("invalid glob pattern {spec:?}: {e}");
            Vec::new()
        }
    }
}

/// Output path for `input`: `<dir>/<stem><suffix>.<ext>`.
///
/// `dir` defaults to the input's own directory.
///
/// Example: `"shots/photo.jpeg"` enlarged as JPEG becomes `"shots/photo-enlarge.jpg"`.
#[must_use]
pub fn output_path(
    input: &Path,
    operation: Operation,
    output_dir: Option<&Path>,
    format: OutputFormat,
) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let dir = output_dir.unwrap_or_else(|| input.parent().unwrap_or(Path::new("")));
    dir.join(format!("{stem}{}.{}", operation.suffix(), format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use image::{Rgb, RgbImage};

    fn write_png(path: &Path, width: u32, height: u32) {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 10, 10])));
        codec::save_image(&img, path, OutputFormat::Png).unwrap();
    }

    #[test]
    fn operation_suffixes() {
        assert_eq!(Operation::Enlarge.suffix(), "-enlarge");
        assert_eq!(Operation::Restore.suffix(), "-restore");
        assert_eq!(Operation::Restore.to_string(), "restore");
    }

    #[test]
    fn output_path_uses_suffix_and_format_extension() {
        let p = output_path(
            Path::new("/tmp/photo.jpeg"),
            Operation::Enlarge,
            None,
            OutputFormat::Jpeg,
        );
        assert_eq!(p, PathBuf::from("/tmp/photo-enlarge.jpg"));

        let p = output_path(
            Path::new("image.bmp"),
            Operation::Restore,
            Some(Path::new("out")),
            OutputFormat::Png,
        );
        assert_eq!(p, PathBuf::from("out/image-restore.png"));
    }

    #[test]
    fn is_supported_image_accepts_common_formats() {
        assert!(is_supported_image(Path::new("photo.jpg")));
        assert!(is_supported_image(Path::new("photo.JPEG")));
        assert!(is_supported_image(Path::new("photo.png")));
        assert!(is_supported_image(Path::new("photo.webp")));
        assert!(is_supported_image(Path::new("photo.tif")));
        assert!(is_supported_image(Path::new("photo.bmp")));
    }

    #[test]
    fn is_supported_image_rejects_unsupported_formats() {
        assert!(!is_supported_image(Path::new("photo.gif")));
        assert!(!is_supported_image(Path::new("photo.txt")));
        assert!(!is_supported_image(Path::new("photo")));
    }

    #[test]
    fn collect_walks_directories_recursively() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.png"), b"x").unwrap();
        fs::write(dir.path().join("sub/a.JPG"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let found = collect_image_paths(dir.path().to_str().unwrap());
        assert_eq!(
            found,
            vec![dir.path().join("b.png"), dir.path().join("sub/a.JPG")]
        );
    }

    #[test]
    fn collect_accepts_files_and_globs() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("one.png");
        fs::write(&file, b"x").unwrap();
        fs::write(dir.path().join("two.png"), b"x").unwrap();

        assert_eq!(collect_image_paths(file.to_str().unwrap()), vec![file]);

        let pattern = format!("{}/*.png", dir.path().display());
        assert_eq!(collect_image_paths(&pattern).len(), 2);

        let nothing = format!("{}/*.jpg", dir.path().display());
        assert!(collect_image_paths(&nothing).is_empty());
        assert!(collect_image_paths("[").is_empty());
    }

    #[test]
    fn process_file_enlarges_and_names_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("pic.png");
        write_png(&input, 100, 50);

        let opts = ProcessOptions::default();
        let result = Transformer::default().process_file(&input, &opts);
        assert!(result.success, "{}", result.message);

        let output = result.output.unwrap();
        assert_eq!(output, dir.path().join("pic-enlarge.png"));
        let img = codec::open_image(&output).unwrap();
        assert_eq!((img.width(), img.height()), (110, 55));
    }

    #[test]
    fn process_file_reports_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.png");
        fs::write(&input, b"definitely not a png").unwrap();

        let result = Transformer::default().process_file(&input, &ProcessOptions::default());
        assert!(!result.success);
        assert!(result.output.is_none());
        assert!(result.message.starts_with("Failed to load"));
    }

    #[test]
    fn process_file_reports_degenerate_restore() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("dot.png");
        write_png(&input, 1, 1);

        let opts = ProcessOptions {
            operation: Operation::Restore,
            ..ProcessOptions::default()
        };
        let transformer = Transformer::new(MarginRatio::new(1.5).unwrap());
        let result = transformer.process_file(&input, &opts);
        assert!(!result.success);
        assert!(result.message.starts_with("Failed to restore"));
        assert!(!dir.path().join("dot-restore.png").exists());
    }

    #[test]
    fn process_all_fails_inputs_sharing_an_output() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("photo.png");
        let bmp = dir.path().join("photo.bmp");
        write_png(&png, 20, 10);
        DynamicImage::ImageRgb8(RgbImage::from_pixel(30, 30, Rgb([1, 2, 3])))
            .save(&bmp)
            .unwrap();

        let opts = ProcessOptions::default();
        let results = Transformer::default().process_all(&[png, bmp], &opts);
        assert!(results[0].success, "{}", results[0].message);
        assert!(!results[1].success);
        assert!(results[1].output.is_none());
        assert!(results[1].message.contains("collides with"));
        let summary = Summary::from_results(&results);
        assert_eq!(summary, Summary { succeeded: 1, failed: 1 });

        // The surviving output belongs to the first input.
        let written = codec::open_image(&dir.path().join("photo-enlarge.png")).unwrap();
        assert_eq!((written.width(), written.height()), (22, 11));
    }

    #[test]
    fn process_all_detects_collisions_across_directories() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a/x.png");
        let second = dir.path().join("b/x.png");
        write_png(&first, 10, 10);
        write_png(&second, 10, 10);

        let out_dir = dir.path().join("out");
        let opts = ProcessOptions {
            output_dir: Some(out_dir.clone()),
            ..ProcessOptions::default()
        };
        let results = Transformer::default().process_all(&[first, second], &opts);
        assert_eq!(results[0].output, Some(out_dir.join("x-enlarge.png")));
        assert!(!results[1].success);

        // Without an output directory the two land in different places.
        let results = Transformer::default().process_all(
            &[dir.path().join("a/x.png"), dir.path().join("b/x.png")],
            &ProcessOptions::default(),
        );
        assert!(results.iter().all(|r| r.success));
    }

    #[test]
    fn process_all_keeps_order_and_counts() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        let bad = dir.path().join("bad.png");
        write_png(&good, 20, 20);
        fs::write(&bad, b"nope").unwrap();

        let out_dir = dir.path().join("out");
        let opts = ProcessOptions {
            output_dir: Some(out_dir.clone()),
            format: Some(OutputFormat::WebP),
            ..ProcessOptions::default()
        };
        let results = Transformer::default().process_all(&[good.clone(), bad.clone()], &opts);
        assert_eq!(results[0].path, good);
        assert_eq!(results[1].path, bad);
        assert_eq!(results[0].output, Some(out_dir.join("good-enlarge.webp")));

        let summary = Summary::from_results(&results);
        assert_eq!(summary, Summary { succeeded: 1, failed: 1 });
        assert_eq!(summary.total(), 2);
        assert!(!summary.all_succeeded());
    }
}
