//! Source image format detection from identifiers

use crate::error::{ResolverError, ResolverResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source formats the serving pipeline knows how to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpg,
    Png,
    Gif,
    Tif,
    Jp2,
    Webp,
    Pdf,
}

impl ImageFormat {
    /// Map a file extension (without the dot) to a format
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "tif" | "tiff" => Some(Self::Tif),
            "jp2" => Some(Self::Jp2),
            "webp" => Some(Self::Webp),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Canonical extension
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Tif => "tif",
            Self::Jp2 => "jp2",
            Self::Webp => "webp",
            Self::Pdf => "pdf",
        }
    }

    /// Derive the format from the identifier's trailing extension, else `default`
    pub fn from_ident(decoded_ident: &str, default: Option<Self>) -> ResolverResult<Self> {
        let file_name = decoded_ident.rsplit('/').next().unwrap_or(decoded_ident);
        let detected = file_name
            .rsplit_once('.')
            .filter(|(stem, _)| !stem.is_empty())
            .and_then(|(_, ext)| Self::from_extension(ext));

        detected
            .or(default)
            .ok_or_else(|| ResolverError::UnknownFormat {
                ident: decoded_ident.to_string(),
            })
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim_start_matches('.'))
            .ok_or_else(|| format!("unsupported image format: {}", s))
    }
}
