//! HTTP surface of the relay.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use tourney_common::conversation::ConversationId;
use tourney_common::message::{Message, MessageKind};
use tourney_common::wallet::WalletId;

use crate::error::ChatError;
use crate::roster::RosterGateway;
use crate::service::{AvailablePeer, ChatService};

// ─── API types ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct AvailableUsersResponse {
    users: Vec<AvailablePeer>,
    count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConversationResponse {
    conversation_id: ConversationId,
    messages: Vec<Message>,
    participants: [WalletId; 2],
}

/// Every field is optional here so that a missing one is reported as a
/// validation error rather than a decoding failure.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendRequest {
    from: Option<String>,
    to: Option<String>,
    message: Option<String>,
    message_type: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendResponse {
    message: &'static str,
    message_data: Message,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UnreadResponse {
    unread_count: usize,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code(),
        };
        (self.status(), Json(body)).into_response()
    }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

type AppState<R> = Arc<ChatService<R>>;

async fn available_users_handler<R: RosterGateway + 'static>(
    State(service): State<AppState<R>>,
    Path(wallet): Path<String>,
) -> Result<Json<AvailableUsersResponse>, ChatError> {
    let users = service.list_available_peers(&wallet).await?;
    Ok(Json(AvailableUsersResponse {
        count: users.len(),
        users,
    }))
}

async fn conversation_handler<R: RosterGateway + 'static>(
    State(service): State<AppState<R>>,
    Path((viewer, other)): Path<(String, String)>,
) -> Result<Json<ConversationResponse>, ChatError> {
    let view = service.get_conversation(&viewer, &other).await?;
    Ok(Json(ConversationResponse {
        conversation_id: view.conversation_id,
        messages: view.messages,
        participants: view.participants,
    }))
}

async fn send_handler<R: RosterGateway + 'static>(
    State(service): State<AppState<R>>,
    body: Result<Json<SendRequest>, JsonRejection>,
) -> Result<Json<SendResponse>, ChatError> {
    let Json(req) = body.map_err(|e| ChatError::validation(e.body_text()))?;

    let kind = match req.message_type.as_deref() {
        None => MessageKind::Text,
        Some(raw) => MessageKind::parse(raw)
            .ok_or_else(|| ChatError::validation(format!("unsupported messageType: {}", raw)))?,
    };

    let message = service
        .send_message(
            req.from.as_deref().unwrap_or_default(),
            req.to.as_deref().unwrap_or_default(),
            req.message.as_deref().unwrap_or_default(),
            kind,
        )
        .await?;

    Ok(Json(SendResponse {
        message: "Message sent successfully",
        message_data: message,
    }))
}

async fn unread_handler<R: RosterGateway + 'static>(
    State(service): State<AppState<R>>,
    Path(wallet): Path<String>,
) -> Result<Json<UnreadResponse>, ChatError> {
    let unread_count = service.get_unread_count(&wallet).await?;
    Ok(Json(UnreadResponse { unread_count }))
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: Utc::now(),
    })
}

/// Build the relay's router around a chat service.
pub fn router<R: RosterGateway + 'static>(service: AppState<R>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route(
            "/chat/available-users/{wallet}",
            get(available_users_handler::<R>),
        )
        .route(
            "/chat/conversation/{viewer}/{other}",
            get(conversation_handler::<R>),
        )
        .route("/chat/send", post(send_handler::<R>))
        .route("/chat/unread/{wallet}", get(unread_handler::<R>))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
