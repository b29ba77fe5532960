use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::middleware::ApiJson;
use crate::{ChatGateError, router::AppState};

pub const ACTION_GET_INIT_KEY: &str = "getInitKey";
pub const ACTION_GET_SESSION_TOKEN: &str = "getSessionToken";

#[derive(Debug, Serialize, Deserialize)]
pub struct VendorAuthRequest {
    #[serde(default)]
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum VendorAuthResponse {
    InitKey {
        #[serde(rename = "initKey")]
        init_key: String,
    },
    Token {
        token: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterVendorUserRequest {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub name: String,
}

/// POST /vendor-auth, dispatched on `action`.
pub async fn vendor_auth(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<VendorAuthRequest>,
) -> Result<Json<VendorAuthResponse>, ChatGateError> {
    debug!(action = %req.action, "vendor auth request");
    match (req.action.as_str(), req.uid.as_deref()) {
        (ACTION_GET_INIT_KEY, _) => Ok(Json(VendorAuthResponse::InitKey {
            init_key: state.bridge.get_init_key(),
        })),
        (ACTION_GET_SESSION_TOKEN, Some(uid)) if !uid.trim().is_empty() => {
            let token = state.bridge.get_session_token(uid).await?;
            Ok(Json(VendorAuthResponse::Token { token }))
        }
        _ => Err(ChatGateError::InvalidAction),
    }
}

/// POST /vendor-users -> vendor response body passed through.
pub async fn register_vendor_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterVendorUserRequest>,
) -> Result<Json<Value>, ChatGateError> {
    let body = state.bridge.register_user(&req.uid, &req.name).await?;
    Ok(Json(body))
}
