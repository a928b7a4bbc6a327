#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse classification of an uploaded file, derived from its declared MIME type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "image"))]
    Image,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "video"))]
    Video,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "audio"))]
    Audio,
}

impl MediaKind {
    pub const ALL: &'static [MediaKind] = &[Self::Image, Self::Video, Self::Audio];

    /// Classify a declared content type. Anything outside `image/*`,
    /// `video/*` and `audio/*` (including a missing type) is rejected.
    pub fn from_content_type(content_type: Option<&str>) -> Option<Self> {
        let ct = content_type?.trim().to_ascii_lowercase();
        if ct.starts_with("image/") {
            Some(Self::Image)
        } else if ct.starts_with("video/") {
            Some(Self::Video)
        } else if ct.starts_with("audio/") {
            Some(Self::Audio)
        } else {
            None
        }
    }

    /// Extension used when the original filename carries none.
    pub fn default_extension(&self) -> &'static str {
        match self {
            Self::Image => ".jpg",
            Self::Video => ".mp4",
            Self::Audio => ".mp3",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMediaKindError {
    invalid: String,
}

impl fmt::Display for ParseMediaKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid media kind '{}'", self.invalid)
    }
}

impl std::error::Error for ParseMediaKindError {}

impl FromStr for MediaKind {
    type Err = ParseMediaKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            _ => Err(ParseMediaKindError {
                invalid: s.to_string(),
            }),
        }
    }
}
