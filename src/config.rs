//! Markup configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::consts::DEFAULT_JPEG_QUALITY;
use crate::error::MarkupError;
use crate::snapshot::SnapshotFormat;

pub const DEFAULT_HISTORY_LIMIT: usize = 100;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupConfig {
    /// Maximum undo entries kept; the oldest are dropped first.
    pub history_limit: usize,
    /// Whether object creation pushes an undo entry.
    pub record_creations: bool,
    /// Whether pinch zoom keeps the pinch midpoint fixed on screen.
    pub anchor_pinch: bool,
    /// Output encoding for flattened snapshots.
    pub snapshot_format: SnapshotFormat,
    pub fetch_timeout_secs: u64,
    /// TrueType/OpenType font for text and box labels; `None` uses the
    /// bundled font.
    pub font_path: Option<PathBuf>,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            record_creations: true,
            anchor_pinch: false,
            snapshot_format: SnapshotFormat::Jpeg { quality: DEFAULT_JPEG_QUALITY },
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            font_path: None,
        }
    }
}

impl MarkupConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `MARKUP_HISTORY_LIMIT`: default 100
    /// - `MARKUP_RECORD_CREATIONS`: default true
    /// - `MARKUP_ANCHOR_PINCH`: default false
    /// - `MARKUP_SNAPSHOT_FORMAT`: `jpeg` (default) or `png`
    /// - `MARKUP_JPEG_QUALITY`: default 95, clamped to 1..=100
    /// - `MARKUP_FETCH_TIMEOUT_SECS`: default 30
    /// - `MARKUP_FONT_PATH`: no default
    ///
    /// Malformed numbers and booleans fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns `Config` for an unrecognized snapshot format.
    pub fn from_env() -> Result<Self, MarkupError> {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Some(value),
            Err(_) => None,
        })
    }

    /// Same as [`Self::from_env`] with a caller-supplied variable source.
    ///
    /// # Errors
    ///
    /// Returns `Config` for an unrecognized snapshot format.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, MarkupError> {
        let defaults = Self::default();
        let quality = parse_or(lookup("MARKUP_JPEG_QUALITY").as_deref(), DEFAULT_JPEG_QUALITY).clamp(1, 100);
        let snapshot_format = match lookup("MARKUP_SNAPSHOT_FORMAT").as_deref() {
            None => SnapshotFormat::Jpeg { quality },
            Some(raw) => SnapshotFormat::from_str(raw)?.with_quality(quality),
        };

        Ok(Self {
            history_limit: parse_or(lookup("MARKUP_HISTORY_LIMIT").as_deref(), defaults.history_limit).max(1),
            record_creations: parse_or(lookup("MARKUP_RECORD_CREATIONS").as_deref(), defaults.record_creations),
            anchor_pinch: parse_or(lookup("MARKUP_ANCHOR_PINCH").as_deref(), defaults.anchor_pinch),
            snapshot_format,
            fetch_timeout_secs: parse_or(lookup("MARKUP_FETCH_TIMEOUT_SECS").as_deref(), defaults.fetch_timeout_secs),
            font_path: lookup("MARKUP_FONT_PATH").filter(|p| !p.trim().is_empty()).map(PathBuf::from),
        })
    }

    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn parse_or<T>(raw: Option<&str>, default: T) -> T
where
    T: FromStr + Copy,
{
    match raw.map(|v| v.trim().parse::<T>()) {
        Some(Ok(value)) => value,
        _ => default,
    }
}
