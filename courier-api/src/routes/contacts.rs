/// Contact queue endpoints (Basic Auth)
///
/// - `GET /contacts` - Return and delete the caller's contacts
/// - `POST /contacts` - Upload a contact list

use crate::{app::AppState, error::ApiResult, outcome::Outcome};
use axum::{extract::State, Extension, Form, Json};
use courier_shared::models::{
    contact::{parse_contact_list, Contact},
    User,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Contact list keyed by stringified local id
#[derive(Debug, Serialize, Deserialize)]
pub struct ContactListResponse {
    pub contact_list: BTreeMap<String, String>,
}

/// Upload request (form-encoded); `contact_list` is itself a JSON string
#[derive(Debug, Deserialize)]
pub struct UploadContactsRequest {
    pub contact_list: String,
}

/// Drains the caller's contact queue
///
/// ```json
/// { "contact_list": { "123": "Jess" } }
/// ```
///
/// Destructive: an immediate second call returns an empty map.
pub async fn drain_contacts(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<Json<ContactListResponse>> {
    let contacts = Contact::drain(&state.db, user.id).await?;

    info!(user_id = user.id, count = contacts.len(), "Delivered contacts");

    let contact_list = contacts
        .into_iter()
        .map(|c| (c.local_id.to_string(), c.name))
        .collect();

    Ok(Json(ContactListResponse { contact_list }))
}

/// Upserts the uploaded contacts for the caller
///
/// ```text
/// POST /contacts
///
/// contact_list={"123": "Jess"}
/// ```
///
/// # Errors
///
/// - `404 Not Found`: `contact_list` is not a JSON object of integer keys to names
pub async fn upload_contacts(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Form(req): Form<UploadContactsRequest>,
) -> ApiResult<Outcome> {
    let contacts = parse_contact_list(&req.contact_list)?;
    let written = Contact::upsert_many(&state.db, user.id, &contacts).await?;

    info!(user_id = user.id, count = written, "Stored contacts");
    Ok(Outcome::Ok)
}
