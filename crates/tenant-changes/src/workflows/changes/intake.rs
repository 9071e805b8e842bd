//! Boundary between loosely typed form/JSON payloads and the typed domain.
//!
//! Browsers post the item list either as a JSON array or, for multipart forms,
//! as a JSON-encoded string field. Both are accepted here and nothing untyped is
//! passed further in.

use serde::Deserialize;
use serde_json::Value;

use super::domain::{ChangeItem, ChangeRequest};

/// Failure to interpret a submitted payload.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("items must be a list or a JSON-encoded list")]
    UnsupportedItems,
    #[error("items could not be decoded: {0}")]
    MalformedItems(#[from] serde_json::Error),
}

/// Interprets the `items` field of a payload. A missing, `null` or empty value
/// means no items.
pub fn items_from_value(value: Value) -> Result<Vec<ChangeItem>, IntakeError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        Value::String(encoded) if encoded.trim().is_empty() => Ok(Vec::new()),
        Value::String(encoded) => Ok(serde_json::from_str(&encoded)?),
        _ => Err(IntakeError::UnsupportedItems),
    }
}

/// Body of an estimate preview request.
#[derive(Debug, Default, Deserialize)]
pub struct EstimatePayload {
    #[serde(default)]
    pub items: Value,
}

impl EstimatePayload {
    pub fn into_items(self) -> Result<Vec<ChangeItem>, IntakeError> {
        items_from_value(self.items)
    }
}

/// Change request form as posted by the buyer.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRequestPayload {
    #[serde(default)]
    pub buyer_name: Option<String>,
    #[serde(default)]
    pub unit_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address_street: Option<String>,
    #[serde(default)]
    pub address_zip: Option<String>,
    #[serde(default)]
    pub address_city: Option<String>,
    #[serde(default)]
    pub items: Value,
    #[serde(default)]
    pub attachments: Option<Vec<String>>,
}

/// Builds a typed change request, defaulting every missing text field to "".
pub fn to_request(payload: ChangeRequestPayload) -> Result<ChangeRequest, IntakeError> {
    let items = items_from_value(payload.items)?;

    Ok(ChangeRequest {
        buyer_name: payload.buyer_name.unwrap_or_default(),
        unit_number: payload.unit_number.unwrap_or_default(),
        email: payload.email.unwrap_or_default(),
        phone: payload.phone.unwrap_or_default(),
        address_street: payload.address_street.unwrap_or_default(),
        address_zip: payload.address_zip.unwrap_or_default(),
        address_city: payload.address_city.unwrap_or_default(),
        items,
        attachments: payload.attachments.unwrap_or_default(),
    })
}
