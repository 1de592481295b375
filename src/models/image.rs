//! Image generation parameters and data URI helpers

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::ExplorerError;

/// Output encoding requested from the image service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Jpeg,
    Png,
}

impl ImageFormat {
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }

    #[must_use]
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/png" => Some(ImageFormat::Png),
            _ => None,
        }
    }
}

/// Aspect ratios accepted by the image service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    /// 16:9 widescreen, used for location shots
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "4:3")]
    Standard,
    #[serde(rename = "3:4")]
    StandardPortrait,
}

impl AspectRatio {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
            Self::Standard => "4:3",
            Self::StandardPortrait => "3:4",
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fixed parameters of every image request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageOptions {
    pub count: u32,
    pub output_format: ImageFormat,
    pub aspect_ratio: AspectRatio,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            count: 1,
            output_format: ImageFormat::Jpeg,
            aspect_ratio: AspectRatio::Landscape,
        }
    }
}

/// Build an inline `data:` URI from already base64-encoded bytes.
#[must_use]
pub fn data_uri(mime_type: &str, base64_bytes: &str) -> String {
    format!("data:{mime_type};base64,{base64_bytes}")
}

/// Split a base64 `data:` URI into its MIME type and payload.
#[must_use]
pub fn split_data_uri(uri: &str) -> Option<(&str, &str)> {
    let rest = uri.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(";base64,")?;
    Some((mime, payload))
}

/// Decode the bytes embedded in a base64 `data:` URI.
pub fn decode_data_uri(uri: &str) -> Result<(ImageFormat, Vec<u8>), ExplorerError> {
    let (mime, payload) = split_data_uri(uri)
        .ok_or_else(|| ExplorerError::Decode("not a base64 data URI".to_string()))?;
    let format = ImageFormat::from_mime_type(mime)
        .ok_or_else(|| ExplorerError::Decode(format!("unsupported image type {mime}")))?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| ExplorerError::Decode(e.to_string()))?;
    Ok((format, bytes))
}
