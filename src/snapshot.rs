//! Snapshot pipeline: load the source image, flatten markup onto it, encode.
//!
//! This is the only module that performs I/O. Loading failures never reach
//! the caller of [`render_snapshot`]; they are logged and the result is
//! `None`.

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ab_glyph::FontArc;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, RgbaImage};
use tracing::{info, warn};

use crate::config::{DEFAULT_FETCH_TIMEOUT_SECS, MarkupConfig};
use crate::consts::DEFAULT_JPEG_QUALITY;
use crate::doc::MarkupObject;
use crate::error::MarkupError;
use crate::glyphs::font_from_bytes;
use crate::render::rasterize;

/// Where the blueprint image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    Url(String),
    Bytes(Vec<u8>),
}

impl ImageSource {
    /// Interpret a command-line style reference: `http(s)://` is a URL,
    /// anything else a file path.
    #[must_use]
    pub fn parse(reference: &str) -> Self {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            Self::Url(reference.to_owned())
        } else {
            Self::Path(PathBuf::from(reference))
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Url(u) => f.write_str(u),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

/// Output encoding for a flattened snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Jpeg { quality: u8 },
    Png,
}

impl Default for SnapshotFormat {
    fn default() -> Self {
        Self::Jpeg { quality: DEFAULT_JPEG_QUALITY }
    }
}

impl SnapshotFormat {
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Same format with the JPEG quality replaced (clamped to 1..=100).
    #[must_use]
    pub fn with_quality(self, quality: u8) -> Self {
        match self {
            Self::Jpeg { .. } => Self::Jpeg { quality: quality.clamp(1, 100) },
            Self::Png => Self::Png,
        }
    }
}

impl FromStr for SnapshotFormat {
    type Err = MarkupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::default()),
            "png" => Ok(Self::Png),
            other => Err(MarkupError::Config(format!("unknown snapshot format: {other}"))),
        }
    }
}

/// A flattened, encoded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub width: u32,
    pub height: u32,
}

impl Snapshot {
    /// `data:<mime>;base64,...` form suitable for embedding.
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64.encode(&self.bytes))
    }
}

/// Everything `render_snapshot` needs besides the image and the objects.
#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    pub format: SnapshotFormat,
    /// Zero disables the timeout.
    pub fetch_timeout: Duration,
    /// `None` draws text with the bundled font.
    pub font: Option<FontArc>,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self { format: SnapshotFormat::default(), fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS), font: None }
    }
}

impl SnapshotOptions {
    /// Options from config, loading the configured font if any.
    ///
    /// # Errors
    ///
    /// Returns `Io` or `Font` if the configured font cannot be loaded.
    pub async fn from_config(config: &MarkupConfig) -> Result<Self, MarkupError> {
        let font = match &config.font_path {
            Some(path) => Some(load_font(path).await?),
            None => None,
        };
        Ok(Self { format: config.snapshot_format, fetch_timeout: config.fetch_timeout(), font })
    }
}

/// Read and parse a font file.
///
/// # Errors
///
/// Returns `Io` if the file cannot be read and `Font` if it is not a font.
pub async fn load_font(path: &Path) -> Result<FontArc, MarkupError> {
    let bytes = tokio::fs::read(path).await?;
    font_from_bytes(bytes)
}

/// Fetch and decode the source image.
///
/// # Errors
///
/// Returns `Io`, `Fetch`, `FetchStatus`, or `ImageDecode` depending on where
/// loading failed, and `EmptyImage` for a zero-sized image.
pub async fn load_source(source: &ImageSource, fetch_timeout: Duration) -> Result<RgbaImage, MarkupError> {
    let bytes = match source {
        ImageSource::Path(path) => tokio::fs::read(path).await?,
        ImageSource::Url(url) => fetch(url, fetch_timeout).await?,
        ImageSource::Bytes(bytes) => bytes.clone(),
    };
    let image = image::load_from_memory(&bytes).map_err(MarkupError::ImageDecode)?.to_rgba8();
    if image.width() == 0 || image.height() == 0 {
        return Err(MarkupError::EmptyImage);
    }
    Ok(image)
}

async fn fetch(url: &str, timeout: Duration) -> Result<Vec<u8>, MarkupError> {
    let mut builder = reqwest::Client::builder();
    if !timeout.is_zero() {
        builder = builder.timeout(timeout);
    }
    let response = builder.build()?.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(MarkupError::FetchStatus(status.as_u16()));
    }
    Ok(response.bytes().await?.to_vec())
}

/// Encode a flattened image.
///
/// # Errors
///
/// Returns `ImageEncode` if the encoder fails.
pub fn encode(image: &RgbaImage, format: SnapshotFormat) -> Result<Vec<u8>, MarkupError> {
    let mut bytes = Vec::new();
    match format {
        SnapshotFormat::Jpeg { quality } => {
            // JPEG has no alpha channel.
            let rgb = DynamicImage::ImageRgba8(image.clone()).into_rgb8();
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100)))
                .map_err(MarkupError::ImageEncode)?;
        }
        SnapshotFormat::Png => {
            image.write_with_encoder(PngEncoder::new(&mut bytes)).map_err(MarkupError::ImageEncode)?;
        }
    }
    Ok(bytes)
}

/// Rasterize and encode an already loaded image.
///
/// # Errors
///
/// Propagates rasterization and encoding failures.
pub fn flatten(image: &RgbaImage, objects: &[MarkupObject], options: &SnapshotOptions) -> Result<Snapshot, MarkupError> {
    let flattened = rasterize(image, objects, options.font.as_ref())?;
    let bytes = encode(&flattened, options.format)?;
    Ok(Snapshot { bytes, mime: options.format.mime(), width: flattened.width(), height: flattened.height() })
}

/// Produce the flattened snapshot for `source` with `objects` painted on top.
///
/// Returns `None` if the image cannot be loaded or decoded, has zero
/// dimensions, or cannot be encoded; the reason is logged at warn.
///
/// Concurrent calls share no state, but nothing orders their completion: a
/// caller that issues several renders must not assume the last one issued
/// finishes last.
pub async fn render_snapshot(source: &ImageSource, objects: &[MarkupObject], options: &SnapshotOptions) -> Option<Snapshot> {
    let image = match load_source(source, options.fetch_timeout).await {
        Ok(image) => image,
        Err(e) => {
            warn!(source = %source, error = %e, code = e.error_code(), "snapshot source unavailable");
            return None;
        }
    };
    match flatten(&image, objects, options) {
        Ok(snapshot) => {
            info!(
                width = snapshot.width,
                height = snapshot.height,
                objects = objects.len(),
                bytes = snapshot.bytes.len(),
                mime = snapshot.mime,
                "snapshot rendered"
            );
            Some(snapshot)
        }
        Err(e) => {
            warn!(error = %e, code = e.error_code(), "snapshot flatten failed");
            None
        }
    }
}
