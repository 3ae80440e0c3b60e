/// Message queue endpoints (Basic Auth)
///
/// - `POST /message` - Queue a message for the contact with `local_id`
/// - `POST /send` - Same, addressed by `to_local_id`
/// - `GET /message` - Return and delete every message queued for the caller

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    outcome::Outcome,
};
use axum::{extract::State, Extension, Form, Json};
use courier_shared::models::{Contact, Message, PendingMessage, User};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

/// `POST /message` form
#[derive(Debug, Deserialize, Validate)]
pub struct PostMessageRequest {
    #[validate(length(max = 4096, message = "Message body must be at most 4096 characters"))]
    pub message_body: String,

    pub local_id: i64,
}

/// `POST /send` form
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    pub to_local_id: i64,

    #[validate(length(max = 4096, message = "Message body must be at most 4096 characters"))]
    pub message_body: String,
}

/// Drained messages
///
/// ```json
/// { "messages": [ { "body": "hello", "local_id": 123 } ] }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<PendingMessage>,
}

/// Queues `body` under the caller's contact with `local_id`
///
/// An unknown local id is a 400 and stores nothing.
async fn enqueue(state: &AppState, user: &User, local_id: i64, body: &str) -> ApiResult<Outcome> {
    let Some(contact) = Contact::find_by_local_id(&state.db, user.id, local_id).await? else {
        debug!(user_id = user.id, local_id, "Message to unknown contact");
        return Err(ApiError::BadRequest(format!(
            "No contact with local_id {}",
            local_id
        )));
    };

    let message = Message::create(&state.db, contact.id, body).await?;

    info!(
        user_id = user.id,
        contact_id = contact.id,
        message_id = message.id,
        "Message queued"
    );
    Ok(Outcome::Ok)
}

pub async fn post_message(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Form(req): Form<PostMessageRequest>,
) -> ApiResult<Outcome> {
    req.validate()?;
    enqueue(&state, &user, req.local_id, &req.message_body).await
}

pub async fn send_message(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Form(req): Form<SendMessageRequest>,
) -> ApiResult<Outcome> {
    req.validate()?;
    enqueue(&state, &user, req.to_local_id, &req.message_body).await
}

/// Drains every message queued under the caller's contacts
///
/// Each item carries the parent contact's `local_id`. Destructive: an
/// immediate second call returns an empty list.
pub async fn drain_messages(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<Json<MessagesResponse>> {
    let messages = Message::drain_for_user(&state.db, user.id).await?;

    info!(user_id = user.id, count = messages.len(), "Delivered messages");
    Ok(Json(MessagesResponse { messages }))
}
