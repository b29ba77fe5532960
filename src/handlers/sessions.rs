use axum::{Json, extract::State};
use serde::Deserialize;

use crate::db::AccountProfile;
use crate::middleware::ApiJson;
use crate::{ChatGateError, router::AppState};

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /sessions -> 200 with the public profile, 401 on bad credentials.
pub async fn create_session(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateSessionRequest>,
) -> Result<Json<AccountProfile>, ChatGateError> {
    let profile = state
        .accounts
        .authenticate(&req.username, &req.password)
        .await?;
    Ok(Json(profile))
}
