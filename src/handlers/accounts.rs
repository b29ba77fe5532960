use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::db::AccountProfile;
use crate::middleware::ApiJson;
use crate::{ChatGateError, router::AppState};

/// Missing fields deserialize as empty so the service reports them uniformly.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub password: String,
}

/// POST /accounts -> 201 with the public profile.
pub async fn create_account(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountProfile>), ChatGateError> {
    let profile = state
        .accounts
        .create_account(&req.username, &req.fullname, &req.password)
        .await?;
    Ok((StatusCode::CREATED, Json(profile)))
}
