use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tenant_changes::workflows::changes::{
    ChangeRequestRepository, NotificationError, RepositoryError, RequestId, RequestNotification,
    RequestNotifier, SavedRequest,
};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryChangeRequestRepository {
    records: Arc<Mutex<HashMap<RequestId, SavedRequest>>>,
}

impl ChangeRequestRepository for InMemoryChangeRequestRepository {
    fn insert(&self, record: SavedRequest) -> Result<SavedRequest, RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: SavedRequest) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &RequestId) -> Result<Option<SavedRequest>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        Ok(guard.get(id).cloned())
    }

    fn fetch_by_token(&self, token: &str) -> Result<Option<SavedRequest>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        Ok(guard
            .values()
            .find(|record| record.client_token.as_deref() == Some(token))
            .cloned())
    }

    fn all(&self) -> Result<Vec<SavedRequest>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        let mut records: Vec<SavedRequest> = guard.values().cloned().collect();
        records.sort_by(|a, b| {
            b.submitted_at
                .cmp(&a.submitted_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(records)
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> RepositoryError {
    RepositoryError::Unavailable("repository mutex poisoned".to_string())
}

/// Logs outgoing e-mails in place of a mail transport.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LoggingNotifier;

impl RequestNotifier for LoggingNotifier {
    fn notify(&self, notification: RequestNotification) -> Result<(), NotificationError> {
        info!(
            to = notification.recipient(),
            subject = %notification.subject(),
            "buyer notification dispatched"
        );
        Ok(())
    }
}
