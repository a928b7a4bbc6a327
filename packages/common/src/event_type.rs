#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of event; selects the card template family.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    #[default]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "wedding"))]
    Wedding,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "birthday"))]
    Birthday,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "corporate"))]
    Corporate,
}

impl EventType {
    pub const ALL: &'static [EventType] = &[Self::Wedding, Self::Birthday, Self::Corporate];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wedding => "wedding",
            Self::Birthday => "birthday",
            Self::Corporate => "corporate",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEventTypeError {
    invalid: String,
}

impl fmt::Display for ParseEventTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid event type '{}'. Valid values: wedding, birthday, corporate",
            self.invalid
        )
    }
}

impl std::error::Error for ParseEventTypeError {}

impl FromStr for EventType {
    type Err = ParseEventTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wedding" => Ok(Self::Wedding),
            "birthday" => Ok(Self::Birthday),
            "corporate" => Ok(Self::Corporate),
            _ => Err(ParseEventTypeError {
                invalid: s.to_string(),
            }),
        }
    }
}
