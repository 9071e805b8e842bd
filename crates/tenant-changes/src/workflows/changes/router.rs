use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::domain::{MessageAuthor, RequestId, RequestStatus};
use super::intake::{self, ChangeRequestPayload, EstimatePayload};
use super::repository::{ChangeRequestRepository, RepositoryError, RequestNotifier};
use super::service::{ChangeRequestService, ChangeRequestServiceError};

/// Signature used for back-office messages when the form leaves the name blank.
pub const TECHNICAL_DEPARTMENT: &str = "Dział Techniczny";

type SharedService<R, N> = Arc<ChangeRequestService<R, N>>;

/// Router builder exposing estimation, intake, dashboard and client endpoints.
pub fn change_router<R, N>(service: SharedService<R, N>) -> Router
where
    R: ChangeRequestRepository + 'static,
    N: RequestNotifier + 'static,
{
    Router::new()
        .route("/api/estimate", post(estimate_handler::<R, N>))
        .route("/api/price-list/:branch", get(price_list_handler::<R, N>))
        .route("/api/requests", post(submit_handler::<R, N>))
        .route("/api/dashboard/requests", get(list_handler::<R, N>))
        .route("/api/dashboard/stats", get(stats_handler::<R, N>))
        .route("/api/dashboard/requests/:id", get(detail_handler::<R, N>))
        .route(
            "/api/dashboard/requests/:id/status",
            post(status_handler::<R, N>),
        )
        .route(
            "/api/dashboard/requests/:id/items",
            post(items_handler::<R, N>),
        )
        .route(
            "/api/dashboard/requests/:id/send-quote",
            post(send_quote_handler::<R, N>),
        )
        .route(
            "/api/dashboard/requests/:id/messages",
            post(department_message_handler::<R, N>),
        )
        .route(
            "/api/dashboard/requests/:id/messages/read",
            post(department_read_handler::<R, N>),
        )
        .route(
            "/api/dashboard/requests/:id/client-token",
            post(client_token_handler::<R, N>),
        )
        .route("/api/client/:token", get(client_view_handler::<R, N>))
        .route(
            "/api/client/:token/messages",
            post(client_message_handler::<R, N>),
        )
        .route(
            "/api/client/:token/messages/read",
            post(client_read_handler::<R, N>),
        )
        .route("/api/client/:token/accept", post(accept_quote_handler::<R, N>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusUpdate {
    pub(crate) status: RequestStatus,
    #[serde(default)]
    pub(crate) notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MessagePayload {
    #[serde(default)]
    pub(crate) author_name: Option<String>,
    pub(crate) content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClientTokenRequest {
    #[serde(default)]
    pub(crate) invite: bool,
}

pub(crate) fn error_response(error: ChangeRequestServiceError) -> Response {
    let status = match &error {
        ChangeRequestServiceError::Intake(_) | ChangeRequestServiceError::EmptyMessage => {
            StatusCode::BAD_REQUEST
        }
        ChangeRequestServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ChangeRequestServiceError::Repository(RepositoryError::Conflict)
        | ChangeRequestServiceError::QuoteNotSent(_) => StatusCode::CONFLICT,
        ChangeRequestServiceError::Repository(RepositoryError::Unavailable(_))
        | ChangeRequestServiceError::Notification(_) => {
            warn!(%error, "change request operation failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(
    status: StatusCode,
    result: Result<T, ChangeRequestServiceError>,
) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn estimate_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Json(payload): Json<EstimatePayload>,
) -> Response
where
    R: ChangeRequestRepository + 'static,
    N: RequestNotifier + 'static,
{
    let result = payload
        .into_items()
        .map(|items| service.estimate(&items))
        .map_err(ChangeRequestServiceError::from);
    respond(StatusCode::OK, result)
}

pub(crate) async fn price_list_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(branch): Path<String>,
) -> Response
where
    R: ChangeRequestRepository + 'static,
    N: RequestNotifier + 'static,
{
    (StatusCode::OK, Json(service.price_list(&branch))).into_response()
}

pub(crate) async fn submit_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Json(payload): Json<ChangeRequestPayload>,
) -> Response
where
    R: ChangeRequestRepository + 'static,
    N: RequestNotifier + 'static,
{
    let result = intake::to_request(payload)
        .map_err(ChangeRequestServiceError::from)
        .and_then(|request| service.submit(request));
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn list_handler<R, N>(State(service): State<SharedService<R, N>>) -> Response
where
    R: ChangeRequestRepository + 'static,
    N: RequestNotifier + 'static,
{
    respond(StatusCode::OK, service.list())
}

pub(crate) async fn stats_handler<R, N>(State(service): State<SharedService<R, N>>) -> Response
where
    R: ChangeRequestRepository + 'static,
    N: RequestNotifier + 'static,
{
    respond(StatusCode::OK, service.stats())
}

pub(crate) async fn detail_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(id): Path<String>,
) -> Response
where
    R: ChangeRequestRepository + 'static,
    N: RequestNotifier + 'static,
{
    respond(StatusCode::OK, service.get(&RequestId(id)))
}

pub(crate) async fn status_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Response
where
    R: ChangeRequestRepository + 'static,
    N: RequestNotifier + 'static,
{
    let result = service.update_status(&RequestId(id), update.status, update.notes);
    respond(StatusCode::OK, result)
}

pub(crate) async fn items_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(id): Path<String>,
    Json(payload): Json<EstimatePayload>,
) -> Response
where
    R: ChangeRequestRepository + 'static,
    N: RequestNotifier + 'static,
{
    let result = payload
        .into_items()
        .map_err(ChangeRequestServiceError::from)
        .and_then(|items| service.update_items(&RequestId(id), items));
    respond(StatusCode::OK, result)
}

pub(crate) async fn send_quote_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(id): Path<String>,
) -> Response
where
    R: ChangeRequestRepository + 'static,
    N: RequestNotifier + 'static,
{
    respond(StatusCode::OK, service.send_quote(&RequestId(id)))
}

pub(crate) async fn department_message_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(id): Path<String>,
    Json(payload): Json<MessagePayload>,
) -> Response
where
    R: ChangeRequestRepository + 'static,
    N: RequestNotifier + 'static,
{
    let author_name = payload
        .author_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| TECHNICAL_DEPARTMENT.to_string());
    let result = service.add_message(
        &RequestId(id),
        MessageAuthor::TechnicalDepartment,
        author_name,
        payload.content,
    );
    respond(StatusCode::OK, result)
}

pub(crate) async fn department_read_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(id): Path<String>,
) -> Response
where
    R: ChangeRequestRepository + 'static,
    N: RequestNotifier + 'static,
{
    let result = service.mark_messages_read(&RequestId(id), MessageAuthor::TechnicalDepartment);
    respond(StatusCode::OK, result)
}

pub(crate) async fn client_token_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(id): Path<String>,
    body: Option<Json<ClientTokenRequest>>,
) -> Response
where
    R: ChangeRequestRepository + 'static,
    N: RequestNotifier + 'static,
{
    let invite = body.map(|Json(request)| request.invite).unwrap_or(false);
    respond(
        StatusCode::OK,
        service.issue_client_token(&RequestId(id), invite),
    )
}

pub(crate) async fn client_view_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(token): Path<String>,
) -> Response
where
    R: ChangeRequestRepository + 'static,
    N: RequestNotifier + 'static,
{
    respond(StatusCode::OK, service.get_by_token(&token))
}

pub(crate) async fn client_message_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(token): Path<String>,
    Json(payload): Json<MessagePayload>,
) -> Response
where
    R: ChangeRequestRepository + 'static,
    N: RequestNotifier + 'static,
{
    respond(
        StatusCode::OK,
        service.post_client_message(&token, payload.content),
    )
}

pub(crate) async fn client_read_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(token): Path<String>,
) -> Response
where
    R: ChangeRequestRepository + 'static,
    N: RequestNotifier + 'static,
{
    let result = service
        .get_by_token(&token)
        .and_then(|detail| service.mark_messages_read(&detail.request.id, MessageAuthor::Client));
    respond(StatusCode::OK, result)
}

pub(crate) async fn accept_quote_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(token): Path<String>,
) -> Response
where
    R: ChangeRequestRepository + 'static,
    N: RequestNotifier + 'static,
{
    respond(StatusCode::OK, service.accept_quote(&token))
}
