/// Tunable parameters for the photo compression pipeline
///
/// These are supplied by the caller (typically from app configuration)
/// and every field has a sensible default, so `CompressionOptions::default()`
/// is always a valid starting point.

use serde::{Deserialize, Serialize};

/// Parameters controlling one compression call
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct CompressionOptions {
    /// Maximum output width in pixels
    /// - Applied to the longer side when the image is landscape
    /// - Images are never upscaled to reach it
    pub max_width: u32,

    /// Maximum output height in pixels
    /// - Applied to the longer side when the image is portrait
    /// - Images are never upscaled to reach it
    pub max_height: u32,

    /// Initial JPEG quality in (0.0, 1.0]
    /// - Values outside the range are clamped, not rejected
    /// - 0.6 is the gallery default
    pub quality: f32,

    /// Byte budget for the encoded data-URL output
    /// - Enforced best-effort through the fallback tiers
    pub max_output_bytes: usize,

    /// Sources larger than this (in bytes) are read on the blocking
    /// thread pool instead of through the async file API
    pub large_file_threshold: u64,
}

impl Default for CompressionOptions {
    /// Gallery defaults: fits a 4000x3000 phone photo comfortably
    /// under the document-storage field limit
    fn default() -> Self {
        Self {
            max_width: 1000,
            max_height: 1000,
            quality: 0.6,
            max_output_bytes: 900_000,
            large_file_threshold: 5 * 1024 * 1024,
        }
    }
}

impl CompressionOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert to JSON string for storage alongside app settings
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from a JSON settings string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
