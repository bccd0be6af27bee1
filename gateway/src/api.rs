//! JSON intake routes — submission, status updates, resolution, engagement.
//!
//! Image bytes travel base64-encoded; the upload/storage service that owns
//! the originals is a separate system, these routes only carry what the
//! verification gates need.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use civica_node::{NodeError, SubmitOutcome};
use civica_types::{
    Coordinate, ImageRef, ReportDraft, ReportId, ReportStatus, ResolutionAttempt, Timestamp,
};

use crate::server::GatewayState;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub latitude: f64,
    pub longitude: f64,
    pub reporter_id: String,
    #[serde(default)]
    pub evidence_images: Vec<String>,
    #[serde(default)]
    pub follow_up_of: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub new_status: ReportStatus,
    pub changed_by: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub evidence_image: String,
    pub evidence_b64: String,
    pub admin_selfie: String,
    pub selfie_b64: String,
    pub admin_id: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpvoteRequest {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub author_id: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub requester: String,
}

/// `POST /reports` — run the duplicate gate and persist on pass.
pub async fn submit_report(
    State(state): State<Arc<GatewayState>>,
    Json(req): Json<SubmitRequest>,
) -> Response {
    let location = match Coordinate::new(req.latitude, req.longitude) {
        Ok(location) => location,
        Err(e) => {
            return error_body(StatusCode::BAD_REQUEST, "invalid_coordinate", &e.to_string())
        }
    };

    let draft = ReportDraft {
        title: req.title,
        description: req.description,
        category: req.category,
        location,
        reporter_id: req.reporter_id,
        evidence_images: req.evidence_images.into_iter().map(ImageRef).collect(),
        follow_up_of: req.follow_up_of.map(ReportId),
    };

    match state.pipeline.submit(draft) {
        Ok(SubmitOutcome::Created(report)) => {
            (StatusCode::CREATED, Json(report)).into_response()
        }
        Ok(SubmitOutcome::Duplicate {
            existing,
            distance_meters,
        }) => (
            StatusCode::CONFLICT,
            Json(json!({
                "duplicate": true,
                "existing_report_id": existing,
                "distance_meters": distance_meters,
                "message": "this issue has already been reported nearby",
            })),
        )
            .into_response(),
        Err(err) => node_error_response(err),
    }
}

/// `POST /reports/:id/status` — forward-only admin ladder.
pub async fn update_status(
    State(state): State<Arc<GatewayState>>,
    Path(id): Path<u64>,
    Json(req): Json<StatusRequest>,
) -> Response {
    match state
        .coordinator
        .update_status(ReportId(id), req.new_status, &req.changed_by, req.notes)
        .await
    {
        Ok(Some(event)) => Json(event).into_response(),
        Ok(None) => (
            StatusCode::OK,
            Json(json!({ "message": "status unchanged" })),
        )
            .into_response(),
        Err(err) => node_error_response(err),
    }
}

/// `POST /reports/:id/resolve` — the multi-proof gate.
pub async fn resolve_report(
    State(state): State<Arc<GatewayState>>,
    Path(id): Path<u64>,
    Json(req): Json<ResolveRequest>,
) -> Response {
    let evidence_bytes = match BASE64.decode(&req.evidence_b64) {
        Ok(bytes) => bytes,
        Err(_) => {
            return error_body(
                StatusCode::BAD_REQUEST,
                "invalid_encoding",
                "evidence_b64 is not valid base64",
            )
        }
    };
    let selfie_bytes = match BASE64.decode(&req.selfie_b64) {
        Ok(bytes) => bytes,
        Err(_) => {
            return error_body(
                StatusCode::BAD_REQUEST,
                "invalid_encoding",
                "selfie_b64 is not valid base64",
            )
        }
    };

    let attempt = ResolutionAttempt {
        report_id: ReportId(id),
        evidence_image: ImageRef(req.evidence_image),
        evidence_bytes,
        admin_selfie: ImageRef(req.admin_selfie),
        selfie_bytes,
        admin_id: req.admin_id,
        notes: req.notes,
        created_at: Timestamp::now(),
    };

    match state.coordinator.resolve(attempt).await {
        Ok(outcome) => Json(json!({
            "report_id": outcome.report_id,
            "distance_meters": outcome.distance_meters,
            "identity_verified": outcome.identity_verified,
            "sequence": outcome.sequence,
        }))
        .into_response(),
        Err(err) => node_error_response(err),
    }
}

/// `POST /reports/:id/upvote` — toggle.
pub async fn toggle_upvote(
    State(state): State<Arc<GatewayState>>,
    Path(id): Path<u64>,
    Json(req): Json<UpvoteRequest>,
) -> Response {
    match state
        .coordinator
        .toggle_upvote(ReportId(id), &req.user_id)
        .await
    {
        Ok(outcome) => Json(json!({
            "total_upvotes": outcome.total_upvotes,
            "action": outcome.action,
        }))
        .into_response(),
        Err(err) => node_error_response(err),
    }
}

/// `POST /reports/:id/comments`.
pub async fn add_comment(
    State(state): State<Arc<GatewayState>>,
    Path(id): Path<u64>,
    Json(req): Json<CommentRequest>,
) -> Response {
    match state
        .coordinator
        .add_comment(ReportId(id), &req.author_id, req.body)
        .await
    {
        Ok(comment) => (StatusCode::CREATED, Json(comment)).into_response(),
        Err(err) => node_error_response(err),
    }
}

/// `POST /reports/:id/delete` — reporter-only soft delete.
pub async fn delete_report(
    State(state): State<Arc<GatewayState>>,
    Path(id): Path<u64>,
    Json(req): Json<DeleteRequest>,
) -> Response {
    match state.coordinator.delete(ReportId(id), &req.requester).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => node_error_response(err),
    }
}

/// Map engine errors to status codes plus a structured body the client can
/// render as actionable guidance.
fn node_error_response(err: NodeError) -> Response {
    use civica_evidence::EvidenceError;

    let (status, code, extra) = match &err {
        NodeError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", json!({})),
        NodeError::AlreadyResolved(_) => (StatusCode::CONFLICT, "already_resolved", json!({})),
        NodeError::ReportDeleted(_) => (StatusCode::GONE, "report_deleted", json!({})),
        NodeError::Evidence(EvidenceError::MissingLocation) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "missing_location",
            json!({ "missing_field": "gps_metadata" }),
        ),
        NodeError::Evidence(EvidenceError::OutOfRadius {
            distance_meters,
            max_meters,
        }) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "out_of_radius",
            json!({ "distance_meters": distance_meters, "max_meters": max_meters }),
        ),
        NodeError::VerificationTimeout { timeout_secs } => (
            StatusCode::GATEWAY_TIMEOUT,
            "verification_timeout",
            json!({ "timeout_secs": timeout_secs, "retryable": true }),
        ),
        NodeError::VerificationUnavailable(_) => (
            StatusCode::BAD_GATEWAY,
            "verification_unavailable",
            json!({ "retryable": true }),
        ),
        NodeError::IdentityRejected { detail } => (
            StatusCode::FORBIDDEN,
            "identity_rejected",
            json!({ "detail": detail }),
        ),
        NodeError::InvalidTransition { from, to } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_transition",
            json!({ "from": from, "to": to }),
        ),
        NodeError::NotReporter { .. } => (StatusCode::FORBIDDEN, "not_reporter", json!({})),
        NodeError::FollowUpNotFound(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "follow_up_not_found",
            json!({}),
        ),
        NodeError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage", json!({})),
    };

    let mut body = json!({ "error": code, "message": err.to_string() });
    if let (Some(obj), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            obj.insert(k.clone(), v.clone());
        }
    }
    (status, Json(body)).into_response()
}

fn error_body(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({ "error": code, "message": message }))).into_response()
}
