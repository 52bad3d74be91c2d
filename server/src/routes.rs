use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, registration::register_member, state::AppState};

#[derive(Debug, Deserialize)]
pub struct RegistrationPayload {
    pub full_name: String,
    pub email: String,
    pub category: String,
    pub region: String,
}

#[derive(Serialize)]
pub struct RegistrationResponse {
    pub membership_id: String,
    pub serial: u64,
}

pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegistrationPayload>,
) -> Result<impl IntoResponse, AppError> {
    if payload.full_name.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(AppError::MalformedPayload);
    }

    let record = register_member(
        &state.tables,
        &state.allocator,
        state.members.as_ref(),
        payload,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            membership_id: record.membership_id,
            serial: record.serial,
        }),
    ))
}

// Membership identifiers contain slashes (GNC/PM/01/0007), so the route
// captures the rest of the path rather than a single segment.
pub async fn member_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let record = state
        .members
        .fetch(&id)
        .await?
        .ok_or(AppError::MemberNotFound)?;

    Ok(Json(record))
}
