use serde::{Deserialize, Serialize};

use super::domain::{MessageAuthor, RequestId, RequestStatus, SavedRequest};
use super::estimation::EstimateSummary;

/// Storage abstraction so the service can run against any backing store.
pub trait ChangeRequestRepository: Send + Sync {
    fn insert(&self, record: SavedRequest) -> Result<SavedRequest, RepositoryError>;
    fn update(&self, record: SavedRequest) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &RequestId) -> Result<Option<SavedRequest>, RepositoryError>;
    fn fetch_by_token(&self, token: &str) -> Result<Option<SavedRequest>, RepositoryError>;
    /// All requests, newest submission first.
    fn all(&self) -> Result<Vec<SavedRequest>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound e-mail hook.
pub trait RequestNotifier: Send + Sync {
    fn notify(&self, notification: RequestNotification) -> Result<(), NotificationError>;
}

/// Messages sent to buyers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequestNotification {
    /// Invitation to fill in or follow up on a request through the client link.
    Invitation {
        to: String,
        buyer_name: String,
        unit_number: String,
        link: String,
    },
    /// The technical department priced the request and awaits acceptance.
    QuoteReady {
        request_id: RequestId,
        to: String,
        buyer_name: String,
        unit_number: String,
        link: String,
        estimate: EstimateSummary,
    },
}

impl RequestNotification {
    pub fn recipient(&self) -> &str {
        match self {
            Self::Invitation { to, .. } | Self::QuoteReady { to, .. } => to,
        }
    }

    pub fn subject(&self) -> String {
        match self {
            Self::Invitation { unit_number, .. } => format!(
                "Zaproszenie do wypełnienia wniosku o zmiany lokatorskie - {unit_number}"
            ),
            Self::QuoteReady { unit_number, .. } => {
                format!("Kosztorys zmian lokatorskich - {unit_number}")
            }
        }
    }
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Dashboard counters across all stored requests. Wire keys follow the
/// dashboard's Polish status names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStats {
    pub total: usize,
    #[serde(rename = "nowy")]
    pub new: usize,
    #[serde(rename = "wTrakcie")]
    pub in_progress: usize,
    #[serde(rename = "zaakceptowany")]
    pub accepted: usize,
    #[serde(rename = "odrzucony")]
    pub rejected: usize,
    #[serde(rename = "oczekujeNaAkceptacje")]
    pub awaiting_client_acceptance: usize,
    #[serde(rename = "wymagaDoprecyzowania")]
    pub needs_clarification: usize,
    pub unread_messages: usize,
}

impl RequestStats {
    pub fn tally(records: &[SavedRequest]) -> Self {
        let mut stats = Self {
            total: records.len(),
            ..Self::default()
        };

        for record in records {
            let counter = match record.status {
                RequestStatus::New => &mut stats.new,
                RequestStatus::InProgress => &mut stats.in_progress,
                RequestStatus::Accepted => &mut stats.accepted,
                RequestStatus::Rejected => &mut stats.rejected,
                RequestStatus::AwaitingClientAcceptance => &mut stats.awaiting_client_acceptance,
                RequestStatus::NeedsClarification => &mut stats.needs_clarification,
            };
            *counter += 1;
            stats.unread_messages += record.unread_from(MessageAuthor::Client);
        }

        stats
    }
}
