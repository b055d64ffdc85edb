//! Payout records as stored in the `payouts` table.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::DecodeError;

/// Table holding payout records.
pub const PAYOUTS_TABLE: &str = "payouts";

/// Primary key of a payout. PostgREST may return it as a number or a string
/// (e.g. UUID keys).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayoutId {
    Int(i64),
    Text(String),
}

impl PayoutId {
    /// Read the `id` column of a raw row, if it has a usable one.
    pub fn from_row(row: &Value) -> Option<Self> {
        row.get("id")
            .and_then(|id| serde_json::from_value(id.clone()).ok())
    }
}

impl fmt::Display for PayoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

/// Lifecycle status column of a payout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayoutStatus {
    Queued,
    Other(String),
}

impl PayoutStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for PayoutStatus {
    fn from(s: String) -> Self {
        if s == "queued" {
            Self::Queued
        } else {
            Self::Other(s)
        }
    }
}

/// A row of the `payouts` table.
///
/// Only `id` is required to be well formed. Every other column is read
/// leniently so that one odd value produces an odd page, not a failed row.
#[derive(Debug, Clone, Deserialize)]
pub struct Payout {
    pub id: PayoutId,
    /// Integer or numeric string; `None` when absent or null.
    #[serde(default, deserialize_with = "optional_numeric")]
    pub sale_id: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub recipient_role: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub recipient_id: Option<String>,
    /// Share of the sale, e.g. `0.1`. NaN when the column held a
    /// non-numeric value.
    #[serde(default = "missing_numeric", deserialize_with = "numeric")]
    pub pct: f64,
    #[serde(default = "missing_numeric", deserialize_with = "numeric")]
    pub amount: f64,
    #[serde(default = "missing_status", deserialize_with = "lenient_status")]
    pub status: PayoutStatus,
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub notion_sync: bool,
    #[serde(default, deserialize_with = "lenient_text")]
    pub notion_page_url: Option<String>,
}

impl Payout {
    /// Narrow one untyped row.
    pub fn from_json(value: Value) -> Result<Self, DecodeError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn is_pending_sync(&self) -> bool {
        self.status == PayoutStatus::Queued && !self.notion_sync
    }
}

fn missing_numeric() -> f64 {
    f64::NAN
}

fn missing_status() -> PayoutStatus {
    PayoutStatus::Other(String::new())
}

fn optional_numeric<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        other => Some(coerce_numeric(&other)),
    })
}

/// Strings pass through; numbers and booleans are rendered as text; null
/// reads as absent.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(text_of(value))
}

fn lenient_status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PayoutStatus, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(PayoutStatus::from(text_of(value).unwrap_or_default()))
}

fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    })
}

fn text_of(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Accept a JSON number or a numeric string. Postgres `numeric` columns
/// are commonly serialized as strings to keep precision.
///
/// `null` and blank strings read as zero; anything else unparsable is NaN.
fn numeric<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_numeric(&value))
}

pub fn coerce_numeric(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse().unwrap_or(f64::NAN)
            }
        }
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}
