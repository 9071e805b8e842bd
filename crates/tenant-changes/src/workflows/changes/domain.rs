use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::catalog::Unit;
use super::estimation::Estimate;

/// Requested quantity, always a whole number of at least one.
///
/// Buyers type quantities into a free-form field, so the wire value may be a
/// number, a numeric string, `null` or garbage. Every shape is accepted: the
/// value is floored and anything below one (or not a number at all) becomes one.
/// There is no upper limit short of `u64::MAX`, where the float conversion saturates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quantity(u64);

impl Quantity {
    pub const ONE: Quantity = Quantity(1);

    pub fn new(value: u64) -> Self {
        Self(value.max(1))
    }

    pub fn from_number(value: f64) -> Self {
        if !value.is_finite() {
            return Self::ONE;
        }
        let floored = value.floor();
        if floored < 1.0 {
            Self::ONE
        } else {
            Self(floored as u64)
        }
    }

    pub fn from_text(raw: &str) -> Self {
        raw.trim()
            .parse::<f64>()
            .map(Self::from_number)
            .unwrap_or(Self::ONE)
    }

    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(number) => number.as_f64().map(Self::from_number).unwrap_or(Self::ONE),
            Value::String(raw) => Self::from_text(raw),
            _ => Self::ONE,
        }
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// One requested modification line as submitted by the buyer or edited by the
/// technical department.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub room: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub branch: String,
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "lenient_unit",
        skip_serializing_if = "Option::is_none"
    )]
    pub unit: Option<Unit>,
    #[serde(default)]
    pub qty: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub technical_analysis: Option<String>,
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub comment: Option<String>,
}

impl ChangeItem {
    pub fn new(
        room: impl Into<String>,
        branch: impl Into<String>,
        description: impl Into<String>,
        qty: Quantity,
    ) -> Self {
        Self {
            room: room.into(),
            branch: branch.into(),
            description: description.into(),
            qty,
            ..Self::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }
}

/// Buyer details and the requested change list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRequest {
    pub buyer_name: String,
    pub unit_number: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address_street: String,
    #[serde(default)]
    pub address_zip: String,
    #[serde(default)]
    pub address_city: String,
    #[serde(default)]
    pub items: Vec<ChangeItem>,
    #[serde(default)]
    pub attachments: Vec<String>,
}

/// Identifier of a stored change request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub String);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Review state of a change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    #[serde(rename = "nowy")]
    New,
    #[serde(rename = "w trakcie")]
    InProgress,
    #[serde(rename = "zaakceptowany")]
    Accepted,
    #[serde(rename = "odrzucony")]
    Rejected,
    #[serde(rename = "oczekuje na akceptację klienta")]
    AwaitingClientAcceptance,
    #[serde(rename = "wymaga doprecyzowania")]
    NeedsClarification,
}

impl RequestStatus {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::New,
            Self::InProgress,
            Self::Accepted,
            Self::Rejected,
            Self::AwaitingClientAcceptance,
            Self::NeedsClarification,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "nowy",
            Self::InProgress => "w trakcie",
            Self::Accepted => "zaakceptowany",
            Self::Rejected => "odrzucony",
            Self::AwaitingClientAcceptance => "oczekuje na akceptację klienta",
            Self::NeedsClarification => "wymaga doprecyzowania",
        }
    }
}

/// Party that wrote a message in the request thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageAuthor {
    Client,
    TechnicalDepartment,
}

impl MessageAuthor {
    pub const fn counterpart(self) -> Self {
        match self {
            Self::Client => Self::TechnicalDepartment,
            Self::TechnicalDepartment => Self::Client,
        }
    }
}

/// Entry of the correspondence thread attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub author: MessageAuthor,
    pub author_name: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

/// A persisted change request with its review metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRequest {
    pub id: RequestId,
    #[serde(flatten)]
    pub request: ChangeRequest,
    pub status: RequestStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Full estimate, rows included, as priced when the items were last saved.
    pub estimated_cost: Option<Estimate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_sent_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_accepted_at: Option<DateTime<Utc>>,
}

impl SavedRequest {
    pub fn unread_from(&self, author: MessageAuthor) -> usize {
        self.messages
            .iter()
            .filter(|message| message.author == author && !message.read)
            .count()
    }
}

fn null_as_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|raw| !raw.trim().is_empty()))
}

fn lenient_unit<'de, D>(deserializer: D) -> Result<Option<Unit>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().and_then(Unit::parse))
}
