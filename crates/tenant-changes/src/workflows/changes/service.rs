use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use super::catalog::{lookup_price_list, PriceListEntry};
use super::domain::{
    ChangeItem, ChangeRequest, Message, MessageAuthor, RequestId, RequestStatus, SavedRequest,
};
use super::estimation::{Estimate, EstimationEngine};
use super::intake::IntakeError;
use super::repository::{
    ChangeRequestRepository, NotificationError, RepositoryError, RequestNotification,
    RequestNotifier, RequestStats,
};

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn random_base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect()
}

fn next_request_id() -> RequestId {
    RequestId(format!(
        "{}-{}",
        Utc::now().timestamp_millis(),
        random_base36(9)
    ))
}

/// A stored request together with an estimate computed from its current items.
#[derive(Debug, Clone, Serialize)]
pub struct RequestDetail {
    pub request: SavedRequest,
    pub estimate: Estimate,
}

/// Token granting the buyer access to their request without logging in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientAccess {
    pub request_id: RequestId,
    pub token: String,
    pub link: String,
}

/// Service composing the estimation engine, the repository and outbound notifications.
pub struct ChangeRequestService<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
    engine: EstimationEngine,
    public_base_url: String,
}

impl<R, N> ChangeRequestService<R, N>
where
    R: ChangeRequestRepository + 'static,
    N: RequestNotifier + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>, public_base_url: impl Into<String>) -> Self {
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        Self {
            repository,
            notifier,
            engine: EstimationEngine::default(),
            public_base_url,
        }
    }

    /// Prices a list of items without touching storage.
    pub fn estimate(&self, items: &[ChangeItem]) -> Estimate {
        let estimate = self.engine.estimate(items);
        debug!(
            items = items.len(),
            manual = estimate.manual_count,
            subtotal = %estimate.subtotal,
            "estimate computed"
        );
        estimate
    }

    pub fn price_list(&self, branch: &str) -> Vec<PriceListEntry> {
        lookup_price_list(branch)
    }

    /// Stores a new request together with the estimate snapshot taken at submission.
    pub fn submit(&self, request: ChangeRequest) -> Result<RequestDetail, ChangeRequestServiceError> {
        let estimate = self.estimate(&request.items);
        let record = SavedRequest {
            id: next_request_id(),
            request,
            status: RequestStatus::New,
            submitted_at: Utc::now(),
            updated_at: None,
            estimated_cost: Some(estimate.clone()),
            notes: None,
            messages: Vec::new(),
            client_token: None,
            quote_sent_at: None,
            quote_accepted_at: None,
        };

        let stored = self.repository.insert(record)?;
        info!(
            request_id = %stored.id,
            unit = %stored.request.unit_number,
            items = stored.request.items.len(),
            manual = estimate.manual_count,
            "change request submitted"
        );

        Ok(RequestDetail {
            request: stored,
            estimate,
        })
    }

    pub fn list(&self) -> Result<Vec<SavedRequest>, ChangeRequestServiceError> {
        Ok(self.repository.all()?)
    }

    pub fn stats(&self) -> Result<RequestStats, ChangeRequestServiceError> {
        let records = self.repository.all()?;
        Ok(RequestStats::tally(&records))
    }

    /// Fetches a request and re-prices its current items.
    pub fn get(&self, id: &RequestId) -> Result<RequestDetail, ChangeRequestServiceError> {
        let record = self.load(id)?;
        Ok(self.detail(record))
    }

    pub fn update_status(
        &self,
        id: &RequestId,
        status: RequestStatus,
        notes: Option<String>,
    ) -> Result<SavedRequest, ChangeRequestServiceError> {
        let mut record = self.load(id)?;
        record.status = status;
        if let Some(notes) = notes {
            record.notes = Some(notes);
        }
        record.updated_at = Some(Utc::now());

        self.repository.update(record.clone())?;
        info!(request_id = %id, status = status.label(), "request status updated");
        Ok(record)
    }

    /// Replaces the item list after back-office edits and stores the new estimate snapshot.
    pub fn update_items(
        &self,
        id: &RequestId,
        items: Vec<ChangeItem>,
    ) -> Result<RequestDetail, ChangeRequestServiceError> {
        let mut record = self.load(id)?;
        let estimate = self.estimate(&items);
        record.request.items = items;
        record.estimated_cost = Some(estimate.clone());
        record.updated_at = Some(Utc::now());

        self.repository.update(record.clone())?;
        info!(
            request_id = %id,
            total = %estimate.total,
            manual = estimate.manual_count,
            "request items updated"
        );

        Ok(RequestDetail {
            request: record,
            estimate,
        })
    }

    pub fn add_message(
        &self,
        id: &RequestId,
        author: MessageAuthor,
        author_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<SavedRequest, ChangeRequestServiceError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(ChangeRequestServiceError::EmptyMessage);
        }

        let mut record = self.load(id)?;
        let now = Utc::now();
        record.messages.push(Message {
            id: format!("{}-{}", now.timestamp_millis(), random_base36(9)),
            author,
            author_name: author_name.into(),
            content,
            timestamp: now,
            read: false,
        });
        record.updated_at = Some(now);

        self.repository.update(record.clone())?;
        debug!(request_id = %id, ?author, "message added");
        Ok(record)
    }

    /// Marks every unread message written by the other party as read.
    pub fn mark_messages_read(
        &self,
        id: &RequestId,
        reader: MessageAuthor,
    ) -> Result<SavedRequest, ChangeRequestServiceError> {
        let mut record = self.load(id)?;
        let counterpart = reader.counterpart();
        for message in record
            .messages
            .iter_mut()
            .filter(|message| message.author == counterpart)
        {
            message.read = true;
        }

        self.repository.update(record.clone())?;
        Ok(record)
    }

    /// Issues a fresh client token. With `invite` set the buyer is e-mailed the link.
    pub fn issue_client_token(
        &self,
        id: &RequestId,
        invite: bool,
    ) -> Result<ClientAccess, ChangeRequestServiceError> {
        let mut record = self.load(id)?;
        let access = self.grant_access(&mut record);
        self.repository.update(record.clone())?;

        if invite {
            self.notifier.notify(RequestNotification::Invitation {
                to: record.request.email.clone(),
                buyer_name: record.request.buyer_name.clone(),
                unit_number: record.request.unit_number.clone(),
                link: access.link.clone(),
            })?;
        }

        info!(request_id = %id, invite, "client token issued");
        Ok(access)
    }

    pub fn get_by_token(&self, token: &str) -> Result<RequestDetail, ChangeRequestServiceError> {
        let record = self.load_by_token(token)?;
        Ok(self.detail(record))
    }

    /// Adds a message from the buyer, signed with the buyer's name.
    pub fn post_client_message(
        &self,
        token: &str,
        content: impl Into<String>,
    ) -> Result<SavedRequest, ChangeRequestServiceError> {
        let record = self.load_by_token(token)?;
        self.add_message(
            &record.id,
            MessageAuthor::Client,
            record.request.buyer_name.clone(),
            content,
        )
    }

    /// Sends the current quote to the buyer and waits for their acceptance.
    pub fn send_quote(&self, id: &RequestId) -> Result<RequestDetail, ChangeRequestServiceError> {
        let mut record = self.load(id)?;
        let access = match record.client_token.clone() {
            Some(token) => ClientAccess {
                request_id: record.id.clone(),
                link: self.client_link(&token),
                token,
            },
            None => self.grant_access(&mut record),
        };

        let estimate = self.estimate(&record.request.items);
        let now = Utc::now();
        record.estimated_cost = Some(estimate.clone());
        record.quote_sent_at = Some(now);
        record.status = RequestStatus::AwaitingClientAcceptance;
        record.updated_at = Some(now);
        self.repository.update(record.clone())?;

        self.notifier.notify(RequestNotification::QuoteReady {
            request_id: record.id.clone(),
            to: record.request.email.clone(),
            buyer_name: record.request.buyer_name.clone(),
            unit_number: record.request.unit_number.clone(),
            link: access.link,
            estimate: estimate.summary(),
        })?;

        info!(request_id = %id, total = %estimate.total, "quote sent to buyer");
        Ok(RequestDetail {
            request: record,
            estimate,
        })
    }

    /// Records the buyer's acceptance of a previously sent quote.
    pub fn accept_quote(&self, token: &str) -> Result<SavedRequest, ChangeRequestServiceError> {
        let mut record = self.load_by_token(token)?;
        if record.quote_sent_at.is_none() {
            return Err(ChangeRequestServiceError::QuoteNotSent(record.id));
        }

        let now = Utc::now();
        record.quote_accepted_at = Some(now);
        record.status = RequestStatus::Accepted;
        record.updated_at = Some(now);
        self.repository.update(record.clone())?;

        info!(request_id = %record.id, "quote accepted by buyer");
        Ok(record)
    }

    pub fn client_link(&self, token: &str) -> String {
        format!("{}/klient/{token}", self.public_base_url)
    }

    fn grant_access(&self, record: &mut SavedRequest) -> ClientAccess {
        let token = random_base36(26);
        record.client_token = Some(token.clone());
        ClientAccess {
            request_id: record.id.clone(),
            link: self.client_link(&token),
            token,
        }
    }

    fn detail(&self, record: SavedRequest) -> RequestDetail {
        let estimate = self.estimate(&record.request.items);
        RequestDetail {
            request: record,
            estimate,
        }
    }

    fn load(&self, id: &RequestId) -> Result<SavedRequest, ChangeRequestServiceError> {
        Ok(self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    fn load_by_token(&self, token: &str) -> Result<SavedRequest, ChangeRequestServiceError> {
        Ok(self
            .repository
            .fetch_by_token(token)?
            .ok_or(RepositoryError::NotFound)?)
    }
}

/// Error raised by the change request service.
#[derive(Debug, thiserror::Error)]
pub enum ChangeRequestServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
    #[error("message content must not be empty")]
    EmptyMessage,
    #[error("no quote has been sent for request {0}")]
    QuoteNotSent(RequestId),
}
