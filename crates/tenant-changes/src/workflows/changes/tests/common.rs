use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::body::to_bytes;
use axum::response::Response;
use serde_json::Value;

use crate::workflows::changes::domain::{ChangeItem, ChangeRequest, Quantity, RequestId, SavedRequest};
use crate::workflows::changes::repository::{
    ChangeRequestRepository, NotificationError, RepositoryError, RequestNotification,
    RequestNotifier,
};
use crate::workflows::changes::service::ChangeRequestService;

pub(super) const BASE_URL: &str = "https://zmiany.example.pl/";

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    records: Arc<Mutex<BTreeMap<RequestId, SavedRequest>>>,
}

impl ChangeRequestRepository for MemoryRepository {
    fn insert(&self, record: SavedRequest) -> Result<SavedRequest, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: SavedRequest) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        match guard.get_mut(&record.id) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &RequestId) -> Result<Option<SavedRequest>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn fetch_by_token(&self, token: &str) -> Result<Option<SavedRequest>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .find(|record| record.client_token.as_deref() == Some(token))
            .cloned())
    }

    fn all(&self) -> Result<Vec<SavedRequest>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<SavedRequest> = guard.values().cloned().collect();
        records.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(records)
    }
}

pub(super) struct UnavailableRepository;

impl ChangeRequestRepository for UnavailableRepository {
    fn insert(&self, _record: SavedRequest) -> Result<SavedRequest, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: SavedRequest) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &RequestId) -> Result<Option<SavedRequest>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_by_token(&self, _token: &str) -> Result<Option<SavedRequest>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<SavedRequest>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    events: Arc<Mutex<Vec<RequestNotification>>>,
}

impl RequestNotifier for MemoryNotifier {
    fn notify(&self, notification: RequestNotification) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
        Ok(())
    }
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<RequestNotification> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

pub(super) struct FailingNotifier;

impl RequestNotifier for FailingNotifier {
    fn notify(&self, _notification: RequestNotification) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp refused connection".to_string()))
    }
}

pub(super) type TestService = ChangeRequestService<MemoryRepository, MemoryNotifier>;

pub(super) fn service() -> (Arc<TestService>, MemoryRepository, MemoryNotifier) {
    let repository = MemoryRepository::default();
    let notifier = MemoryNotifier::default();
    let service = ChangeRequestService::new(
        Arc::new(repository.clone()),
        Arc::new(notifier.clone()),
        BASE_URL,
    );
    (Arc::new(service), repository, notifier)
}

pub(super) fn outlet_item() -> ChangeItem {
    ChangeItem::new(
        "Kuchnia",
        "Instalacje elektryczne i teletechniczne",
        "Dodatkowe gniazdo nad blatem",
        Quantity::new(3),
    )
    .with_code("EL-003")
}

pub(super) fn manual_item() -> ChangeItem {
    ChangeItem::new("Pokój", "Architektura", "Malowanie ścian na grafit", Quantity::ONE)
}

pub(super) fn change_request() -> ChangeRequest {
    ChangeRequest {
        buyer_name: "Anna Nowak".to_string(),
        unit_number: "B2/14".to_string(),
        email: "anna.nowak@example.pl".to_string(),
        phone: "600100200".to_string(),
        address_street: "Ogrodowa 5".to_string(),
        address_zip: "61-001".to_string(),
        address_city: "Poznań".to_string(),
        items: vec![outlet_item(), manual_item()],
        attachments: vec!["rzut-kuchnia.pdf".to_string()],
    }
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body collects");
    serde_json::from_slice(&bytes).expect("json body")
}
