//! Error taxonomy for the fallible boundaries of the crate.
//!
//! Gesture handlers never fail: degenerate input degrades to "no effect".
//! Errors only surface where data crosses the crate boundary (markup payloads,
//! tool names, image bytes, configuration).

#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("invalid color: {0}")]
    InvalidColor(String),
    #[error("invalid markup: {0}")]
    InvalidMarkup(String),
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("image decode failed: {0}")]
    ImageDecode(#[source] image::ImageError),
    #[error("image encode failed: {0}")]
    ImageEncode(#[source] image::ImageError),
    #[error("image has zero dimensions")]
    EmptyImage,
    #[error("image fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("image fetch returned HTTP {0}")]
    FetchStatus(u16),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot allocate {width}x{height} raster surface")]
    Surface { width: u32, height: u32 },
    #[error("invalid font: {0}")]
    Font(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl MarkupError {
    /// Stable machine-readable code for hosts that surface errors to users.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownTool(_) => "E_UNKNOWN_TOOL",
            Self::InvalidColor(_) => "E_INVALID_COLOR",
            Self::InvalidMarkup(_) => "E_INVALID_MARKUP",
            Self::Json(_) => "E_JSON",
            Self::ImageDecode(_) => "E_IMAGE_DECODE",
            Self::ImageEncode(_) => "E_IMAGE_ENCODE",
            Self::EmptyImage => "E_EMPTY_IMAGE",
            Self::Fetch(_) | Self::FetchStatus(_) => "E_FETCH",
            Self::Io(_) => "E_IO",
            Self::Surface { .. } => "E_SURFACE",
            Self::Font(_) => "E_FONT",
            Self::Config(_) => "E_CONFIG",
        }
    }
}
