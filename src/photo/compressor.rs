/// Gallery photo compression
///
/// Takes a raw upload (file or in-memory bytes), downscales it to the
/// gallery dimension caps and re-encodes it as a base64 JPEG data-URL that
/// fits the storage byte budget. Enforcement is a fixed two-tier fallback
/// ladder, not a search: drop quality first, then shrink dimensions once.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage, RgbImage};
use std::path::PathBuf;
use tracing::warn;

use super::options::CompressionOptions;
use super::progress::ProgressReporter;
use crate::error::CompressError;

/// Quality used by both escalation tiers
const TIER_QUALITY: f32 = 0.4;
/// Dimension multiplier for the second escalation tier
const TIER_SHRINK: f32 = 0.6;
/// Lower clamp for caller-supplied quality
const MIN_QUALITY: f32 = 0.05;
/// Edge length of the last-resort square crop
const LAST_RESORT_EDGE: u32 = 600;
/// Quality of the last-resort square crop
const LAST_RESORT_QUALITY: f32 = 0.3;

// Progress markers for the pipeline's half of the bar (0-50)
const PROGRESS_SOURCE_BRANCH: u8 = 5;
const PROGRESS_BYTES_READY: u8 = 20;
const PROGRESS_DECODED: u8 = 30;
const PROGRESS_FIRST_ENCODE: u8 = 40;
const PROGRESS_TIER_ONE: u8 = 45;
const PROGRESS_TIER_TWO: u8 = 48;

/// Where the upload bytes come from
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Upload staged on disk
    Path(PathBuf),
    /// Upload already in memory
    Bytes(Vec<u8>),
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        ImageSource::Bytes(bytes)
    }
}

/// Final re-encoded image
///
/// `data_url` is the value handed to object storage
/// (`data:image/jpeg;base64,...`); the byte budget in
/// [`CompressionOptions`] applies to its length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub data_url: String,
    pub width: u32,
    pub height: u32,
}

impl CompressedImage {
    /// Length of the encoded data-URL in bytes
    pub fn len(&self) -> usize {
        self.data_url.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data_url.is_empty()
    }
}

/// Compress an upload for gallery storage.
///
/// Progress is reported through `on_progress` as a strictly increasing
/// sequence ending at exactly 50 on success; the 50-100 range is left for
/// the caller's upload phase. One call is fully independent of any other;
/// concurrent calls are safe.
///
/// # Errors
/// * [`CompressError::Read`] - the source could not be read
/// * [`CompressError::Decode`] - the bytes are not a decodable image
/// * [`CompressError::Compression`] - every fallback tier failed
pub async fn compress<F>(
    source: ImageSource,
    options: CompressionOptions,
    on_progress: F,
) -> Result<CompressedImage, CompressError>
where
    F: FnMut(u8) + Send + 'static,
{
    let mut progress = ProgressReporter::new(on_progress);
    let bytes = read_source(source, &options, &mut progress).await?;

    // The decode/resize/encode chain is CPU-bound
    tokio::task::spawn_blocking(move || compress_blocking(bytes, options, progress)).await?
}

/// Read the raw upload bytes.
///
/// Large files go through the blocking pool rather than the async file
/// API; the branch only changes how bytes reach memory, the pipeline
/// downstream is identical.
async fn read_source(
    source: ImageSource,
    options: &CompressionOptions,
    progress: &mut ProgressReporter,
) -> Result<Vec<u8>, CompressError> {
    match source {
        ImageSource::Bytes(bytes) => {
            progress.emit(PROGRESS_SOURCE_BRANCH);
            progress.emit(PROGRESS_BYTES_READY);
            Ok(bytes)
        }
        ImageSource::Path(path) => {
            let size = tokio::fs::metadata(&path).await?.len();
            progress.emit(PROGRESS_SOURCE_BRANCH);

            let bytes = if size > options.large_file_threshold {
                tokio::task::spawn_blocking(move || std::fs::read(&path)).await??
            } else {
                tokio::fs::read(&path).await?
            };

            progress.emit(PROGRESS_BYTES_READY);
            Ok(bytes)
        }
    }
}

/// Blocking half of the pipeline: decode, downscale, flatten, encode.
fn compress_blocking(
    bytes: Vec<u8>,
    options: CompressionOptions,
    mut progress: ProgressReporter,
) -> Result<CompressedImage, CompressError> {
    // A failed decode is terminal: none of the fallback tiers can run
    // without a bitmap
    let image = image::load_from_memory(&bytes).map_err(CompressError::Decode)?;
    drop(bytes);
    progress.emit(PROGRESS_DECODED);

    let result = match encode_within_budget(&image, &options, &mut progress) {
        Ok(encoded) => encoded,
        Err(err) => {
            warn!(error = %err, "re-encode pipeline failed, trying square-crop fallback");
            last_resort_square(&image).map_err(|_| CompressError::Compression)?
        }
    };

    progress.finish();
    Ok(result)
}

/// Encode at the requested quality, then walk the fixed escalation ladder
/// until the output fits the byte budget.
///
/// If even the final tier is over budget the smallest attempted encoding
/// is returned; the budget is best-effort, not guaranteed.
fn encode_within_budget(
    image: &DynamicImage,
    options: &CompressionOptions,
    progress: &mut ProgressReporter,
) -> Result<CompressedImage, image::ImageError> {
    let (width, height) = target_dimensions(image.width(), image.height(), options);
    let quality = options.quality.clamp(MIN_QUALITY, 1.0);

    let first = flatten_and_encode(image, width, height, quality)?;
    progress.emit(PROGRESS_FIRST_ENCODE);
    if first.len() <= options.max_output_bytes {
        return Ok(first);
    }

    // Tier 1: same dimensions, fixed lower quality
    let second = flatten_and_encode(image, width, height, TIER_QUALITY)?;
    progress.emit(PROGRESS_TIER_ONE);
    if second.len() <= options.max_output_bytes {
        return Ok(second);
    }

    // Tier 2: shrink both dimensions and re-encode once more
    let third = flatten_and_encode(image, shrink(width), shrink(height), TIER_QUALITY)?;
    progress.emit(PROGRESS_TIER_TWO);
    if third.len() <= options.max_output_bytes {
        return Ok(third);
    }

    // Still over budget: hand back the smallest attempt
    let mut best = first;
    for attempt in [second, third] {
        if attempt.len() < best.len() {
            best = attempt;
        }
    }
    Ok(best)
}

/// Target dimensions preserving aspect ratio: the longer side is clamped
/// to the matching cap, and images already inside the caps are untouched.
fn target_dimensions(width: u32, height: u32, options: &CompressionOptions) -> (u32, u32) {
    let (long_side, cap) = if width >= height {
        (width, options.max_width)
    } else {
        (height, options.max_height)
    };

    if long_side <= cap {
        return (width, height);
    }

    let scale = cap as f32 / long_side as f32;
    (scale_dimension(width, scale), scale_dimension(height, scale))
}

fn scale_dimension(dimension: u32, factor: f32) -> u32 {
    ((dimension as f32 * factor).round() as u32).max(1)
}

fn shrink(dimension: u32) -> u32 {
    scale_dimension(dimension, TIER_SHRINK)
}

/// Resize, flatten transparency against an opaque white background and
/// encode to a JPEG data-URL. Flattening to white is gallery policy:
/// transparent uploads render on white cards in the UI.
fn flatten_and_encode(
    image: &DynamicImage,
    width: u32,
    height: u32,
    quality: f32,
) -> Result<CompressedImage, image::ImageError> {
    let resized = image.resize_exact(width, height, FilterType::Lanczos3);

    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    imageops::overlay(&mut canvas, &resized.to_rgba8(), 0, 0);
    let flattened = DynamicImage::ImageRgba8(canvas).to_rgb8();

    let jpeg = encode_jpeg(&flattened, quality)?;
    Ok(CompressedImage {
        data_url: to_data_url(&jpeg),
        width,
        height,
    })
}

fn encode_jpeg(image: &RgbImage, quality: f32) -> Result<Vec<u8>, image::ImageError> {
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, (quality * 100.0).round() as u8);
    image.write_with_encoder(encoder)?;
    Ok(buffer)
}

fn to_data_url(jpeg: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg))
}

/// Last resort when the normal pipeline fails after a successful decode:
/// a fixed 600x600 centered square crop at low quality.
fn last_resort_square(image: &DynamicImage) -> Result<CompressedImage, image::ImageError> {
    let edge = image.width().min(image.height());
    let x = (image.width() - edge) / 2;
    let y = (image.height() - edge) / 2;

    let cropped = image.crop_imm(x, y, edge, edge);
    flatten_and_encode(&cropped, LAST_RESORT_EDGE, LAST_RESORT_EDGE, LAST_RESORT_QUALITY)
}
