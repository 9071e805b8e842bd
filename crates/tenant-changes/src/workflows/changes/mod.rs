//! Tenant change requests: pricing against the price list, buyer intake, and the
//! back-office review loop (status, item edits, correspondence, quotes).

pub mod catalog;
pub mod domain;
pub mod estimation;
pub mod intake;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use catalog::{
    lookup_price_list, Branch, PriceCatalog, PriceCode, PriceListEntry, PriceListItem, Unit,
};
pub use domain::{
    ChangeItem, ChangeRequest, Message, MessageAuthor, Quantity, RequestId, RequestStatus,
    SavedRequest,
};
pub use estimation::{estimate, Estimate, EstimateSummary, EstimationEngine, PricedRow};
pub use intake::{to_request, ChangeRequestPayload, EstimatePayload, IntakeError};
pub use repository::{
    ChangeRequestRepository, NotificationError, RepositoryError, RequestNotification,
    RequestNotifier, RequestStats,
};
pub use router::change_router;
pub use service::{ChangeRequestService, ChangeRequestServiceError, ClientAccess, RequestDetail};
