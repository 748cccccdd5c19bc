use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rsvp_protocol::SERVICE_NAME;
use rsvp_protocol::wire::{
    ErrorResponse, HealthResponse, ListResponse, SubmitResponse, WhatsAppStatus,
};
use serde_json::Value;

use crate::AppState;
use crate::submission::{SubmitOutcome, list_rsvps, submit_rsvp};

const STORE_FAILED: &str = "Could not store RSVP.";
const LOAD_FAILED: &str = "Could not load RSVPs.";
const BAD_JSON: &str = "Request body must be valid JSON.";

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        service: SERVICE_NAME.to_string(),
        whatsapp: WhatsAppStatus::from_configured(state.notifier.is_configured()),
    })
}

pub(crate) async fn submit(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!("Unreadable RSVP body: {rejection}");
            return error_response(StatusCode::BAD_REQUEST, BAD_JSON);
        }
    };

    match submit_rsvp(&state, &body).await {
        SubmitOutcome::Rejected(err) => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
        SubmitOutcome::StorageFailed => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, STORE_FAILED)
        }
        SubmitOutcome::Created {
            rsvp_id,
            notification,
        } => (
            StatusCode::CREATED,
            Json(SubmitResponse {
                ok: true,
                rsvp_id,
                whatsapp_sent: notification.sent(),
                whatsapp_error: notification.error().map(str::to_string),
            }),
        )
            .into_response(),
    }
}

pub(crate) async fn list(State(state): State<AppState>) -> Response {
    match list_rsvps(&state.store).await {
        Ok(items) => Json(ListResponse {
            ok: true,
            total: items.len(),
            items,
        })
        .into_response(),
        Err(e) => {
            tracing::error!("Failed to load RSVPs: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, LOAD_FAILED)
        }
    }
}
