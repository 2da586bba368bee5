//! Picks the prefix of a document used for language detection.
//!
//! Classification only needs a representative head of the file, so the window is a
//! percentage of the document bounded on both ends. Lengths are counted in chars.

use serde::{Deserialize, Serialize};

pub const DEFAULT_SAMPLE_RATIO: f64 = 10.0;
pub const DEFAULT_SAMPLE_MIN: usize = 512;
pub const DEFAULT_SAMPLE_MAX: usize = 2048;

/// Bounds for the classification sample window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    /// Percentage of the document to sample (10 means 10%).
    pub ratio: f64,
    pub min: usize,
    pub max: usize,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            ratio: DEFAULT_SAMPLE_RATIO,
            min: DEFAULT_SAMPLE_MIN,
            max: DEFAULT_SAMPLE_MAX,
        }
    }
}

impl SampleConfig {
    /// Window size for a document of `length` chars.
    /// `max` is applied before `min`, and the result never exceeds `length`.
    pub fn sample_size(&self, length: usize) -> usize {
        let scaled = (length as f64 * self.ratio / 100.0).round();
        let scaled = if scaled.is_finite() && scaled > 0.0 {
            scaled as usize
        } else {
            0
        };
        scaled.min(self.max).max(self.min).min(length)
    }

    /// The leading `sample_size` chars of `document`, cut on a char boundary.
    pub fn sample<'a>(&self, document: &'a str) -> &'a str {
        let size = self.sample_size(document.chars().count());
        match document.char_indices().nth(size) {
            Some((byte_idx, _)) => &document[..byte_idx],
            None => document,
        }
    }
}
