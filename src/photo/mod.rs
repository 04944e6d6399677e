/// Gallery photo pipeline module
///
/// This module handles:
/// - Reading upload sources from disk or memory
/// - Downscaling to the gallery dimension caps (never upscaling)
/// - Re-encoding to JPEG under a byte-size budget with fixed fallback tiers
/// - Reporting progress over the 0-50 range (upload owns 50-100)

pub mod compressor;
pub mod options;
pub mod progress;

pub use compressor::{compress, CompressedImage, ImageSource};
pub use options::CompressionOptions;
pub use progress::ProgressReporter;
