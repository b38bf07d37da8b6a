//! Push entry points for external game services.
//!
//! Both endpoints acknowledge as soon as the event is handed to the
//! announcer; delivery to Discord happens on a spawned task and its
//! outcome never changes the HTTP response. The body is parsed by hand
//! so that every failure, malformed JSON included, answers with the
//! `500 {"error": ...}` shape the callers expect.

use crate::state::AppState;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use herald_core::events::GameEvent;
use herald_sdk::objects::{NewPoolAnnouncement, WebhookAck, WinnerAnnouncement};
use serde_json::json;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/webhook/winner", post(announce_winner))
        .route("/webhook/new_pool", post(announce_new_pool))
}

#[derive(Debug, thiserror::Error)]
enum WebhookError {
    #[error("{0}")]
    InvalidPayload(#[from] serde_json::Error),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "webhook payload rejected");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

fn dispatch(state: &AppState, event: GameEvent) -> (StatusCode, Json<WebhookAck>) {
    let announcer = state.announcer.clone();
    tokio::spawn(async move {
        if let Err(err) = announcer.announce(&event).await {
            tracing::error!(error = %err, "webhook announcement failed");
        }
    });
    (
        StatusCode::OK,
        Json(WebhookAck {
            status: "success".to_owned(),
        }),
    )
}

async fn announce_winner(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<WebhookAck>), WebhookError> {
    let body: WinnerAnnouncement = serde_json::from_slice(&body)?;
    tracing::info!(game_id = %body.game_id, "winner announcement received");
    Ok(dispatch(&state, body.into()))
}

async fn announce_new_pool(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<WebhookAck>), WebhookError> {
    let body: NewPoolAnnouncement = serde_json::from_slice(&body)?;
    tracing::info!(game_id = %body.game_id, "new pool announcement received");
    Ok(dispatch(&state, body.into()))
}
