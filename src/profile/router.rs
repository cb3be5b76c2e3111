use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::domain::{NewVendor, RequestId, ReviewAction, ReviewerId, VendorId};
use super::permissions::ChangeSetError;
use super::repository::{NotificationSender, RecordStore, StoreError};
use super::service::{ProfileChangeError, ProfileChangeService};

/// Router builder exposing the vendor- and admin-facing endpoints of the
/// profile change arbitration engine.
pub fn profile_router<S, N>(service: Arc<ProfileChangeService<S, N>>) -> Router
where
    S: RecordStore + 'static,
    N: NotificationSender + 'static,
{
    Router::new()
        .route("/api/v1/vendors", post(register_handler::<S, N>))
        .route("/api/v1/vendors/:vendor_id", get(vendor_handler::<S, N>))
        .route(
            "/api/v1/vendors/:vendor_id/profile-changes",
            post(submit_changes_handler::<S, N>).get(history_handler::<S, N>),
        )
        .route(
            "/api/v1/vendors/:vendor_id/profile-changes/pending",
            get(pending_handler::<S, N>),
        )
        .route(
            "/api/v1/admin/profile-changes",
            get(queue_handler::<S, N>),
        )
        .route(
            "/api/v1/admin/profile-changes/:request_id/review",
            post(review_handler::<S, N>),
        )
        .with_state(service)
}

/// Body for a vendor profile change submission. Field names are classified
/// server-side, so the payload stays a raw map at the boundary.
#[derive(Debug, Deserialize)]
pub struct SubmitProfileChanges {
    pub requested_changes: Map<String, Value>,
}

/// Body for an admin review decision.
#[derive(Debug, Deserialize)]
pub struct ReviewProfileChange {
    pub action: ReviewAction,
    pub reviewer_id: String,
    #[serde(default)]
    pub review_notes: Option<String>,
}

pub(crate) async fn register_handler<S, N>(
    State(service): State<Arc<ProfileChangeService<S, N>>>,
    axum::Json(vendor): axum::Json<NewVendor>,
) -> Response
where
    S: RecordStore + 'static,
    N: NotificationSender + 'static,
{
    match service.register(vendor) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn vendor_handler<S, N>(
    State(service): State<Arc<ProfileChangeService<S, N>>>,
    Path(vendor_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
    N: NotificationSender + 'static,
{
    match service.vendor(&VendorId(vendor_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submit_changes_handler<S, N>(
    State(service): State<Arc<ProfileChangeService<S, N>>>,
    Path(vendor_id): Path<String>,
    axum::Json(body): axum::Json<SubmitProfileChanges>,
) -> Response
where
    S: RecordStore + 'static,
    N: NotificationSender + 'static,
{
    match service.submit_changes(&VendorId(vendor_id), &body.requested_changes) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn pending_handler<S, N>(
    State(service): State<Arc<ProfileChangeService<S, N>>>,
    Path(vendor_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
    N: NotificationSender + 'static,
{
    match service.pending_request(&VendorId(vendor_id)) {
        Ok(request) => (StatusCode::OK, axum::Json(request)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn history_handler<S, N>(
    State(service): State<Arc<ProfileChangeService<S, N>>>,
    Path(vendor_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
    N: NotificationSender + 'static,
{
    match service.change_history(&VendorId(vendor_id)) {
        Ok(history) => (StatusCode::OK, axum::Json(history)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn queue_handler<S, N>(
    State(service): State<Arc<ProfileChangeService<S, N>>>,
) -> Response
where
    S: RecordStore + 'static,
    N: NotificationSender + 'static,
{
    match service.pending_queue() {
        Ok(queue) => (StatusCode::OK, axum::Json(queue)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn review_handler<S, N>(
    State(service): State<Arc<ProfileChangeService<S, N>>>,
    Path(request_id): Path<String>,
    axum::Json(body): axum::Json<ReviewProfileChange>,
) -> Response
where
    S: RecordStore + 'static,
    N: NotificationSender + 'static,
{
    match service.review(
        &RequestId(request_id),
        body.action,
        &ReviewerId(body.reviewer_id),
        body.review_notes,
    ) {
        Ok(request) => (StatusCode::OK, axum::Json(request)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: ProfileChangeError) -> Response {
    let status = match &err {
        ProfileChangeError::ChangeSet(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ProfileChangeError::VendorNotFound(_) | ProfileChangeError::RequestNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        ProfileChangeError::InvalidState(_) | ProfileChangeError::NotApproved(_) => {
            StatusCode::CONFLICT
        }
        ProfileChangeError::ApplyFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ProfileChangeError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
        ProfileChangeError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        ProfileChangeError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = match &err {
        ProfileChangeError::ChangeSet(ChangeSetError::ReadOnlyFields(fields)) => json!({
            "error": err.to_string(),
            "read_only_fields": fields,
        }),
        _ => json!({ "error": err.to_string() }),
    };

    (status, axum::Json(payload)).into_response()
}
