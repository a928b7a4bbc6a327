#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payment lifecycle of an event.
///
/// Transitions only move forward: `Unpaid` -> `AwaitingApproval` -> `Approved`.
/// An organizer can only ever claim payment (`AwaitingApproval`); `Approved` is
/// reachable exclusively through the admin approval path.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Freshly created event, nothing submitted.
    #[default]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "unpaid"))]
    Unpaid,
    /// Organizer submitted payment details; waiting on an admin.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "awaiting_approval"))]
    AwaitingApproval,
    /// Admin accepted the payment. Terminal.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "approved"))]
    Approved,
}

impl PaymentStatus {
    pub const ALL: &'static [PaymentStatus] =
        &[Self::Unpaid, Self::AwaitingApproval, Self::Approved];

    /// The `is_paid` flag that must accompany this status.
    pub fn is_paid(&self) -> bool {
        matches!(self, Self::Approved)
    }

    /// Returns true if `next` is a legal forward transition from `self`.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (Self::Unpaid, Self::AwaitingApproval)
                | (Self::AwaitingApproval, Self::AwaitingApproval)
                | (Self::Unpaid, Self::Approved)
                | (Self::AwaitingApproval, Self::Approved)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::AwaitingApproval => "awaiting_approval",
            Self::Approved => "approved",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid payment status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePaymentStatusError {
    invalid: String,
}

impl fmt::Display for ParsePaymentStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid payment status '{}'. Valid values: {}",
            self.invalid,
            PaymentStatus::ALL
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParsePaymentStatusError {}

impl FromStr for PaymentStatus {
    type Err = ParsePaymentStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(Self::Unpaid),
            "awaiting_approval" => Ok(Self::AwaitingApproval),
            "approved" => Ok(Self::Approved),
            _ => Err(ParsePaymentStatusError {
                invalid: s.to_string(),
            }),
        }
    }
}
