use crate::db::AccountProfile;
use crate::error::{ApiErrorBody, ChatGateError};
use crate::handlers::vendor::{
    ACTION_GET_INIT_KEY, ACTION_GET_SESSION_TOKEN, VendorAuthRequest, VendorAuthResponse,
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

/// HTTP client for this service's own endpoints.
#[derive(Clone)]
pub struct AppApiClient {
    http_client: reqwest::Client,
    base: Url,
}

impl AppApiClient {
    pub fn new(base: Url) -> Result<Self, ChatGateError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("chat-gate-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http_client, base })
    }

    pub async fn create_account(
        &self,
        username: &str,
        fullname: &str,
        password: &str,
    ) -> Result<AccountProfile, ChatGateError> {
        self.post_json(
            "accounts",
            &json!({ "username": username, "fullname": fullname, "password": password }),
        )
        .await
    }

    pub async fn create_session(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AccountProfile, ChatGateError> {
        self.post_json(
            "sessions",
            &json!({ "username": username, "password": password }),
        )
        .await
    }

    pub async fn get_init_key(&self) -> Result<String, ChatGateError> {
        let req = VendorAuthRequest {
            action: ACTION_GET_INIT_KEY.to_string(),
            uid: None,
        };
        match self.post_json("vendor-auth", &req).await? {
            VendorAuthResponse::InitKey { init_key } => Ok(init_key),
            VendorAuthResponse::Token { .. } => Err(ChatGateError::Internal(
                "vendor-auth answered getInitKey with a token".to_string(),
            )),
        }
    }

    pub async fn get_session_token(&self, uid: &str) -> Result<String, ChatGateError> {
        let req = VendorAuthRequest {
            action: ACTION_GET_SESSION_TOKEN.to_string(),
            uid: Some(uid.to_string()),
        };
        match self.post_json("vendor-auth", &req).await? {
            VendorAuthResponse::Token { token } => Ok(token),
            VendorAuthResponse::InitKey { .. } => Err(ChatGateError::Internal(
                "vendor-auth answered getSessionToken with an init key".to_string(),
            )),
        }
    }

    pub async fn register_vendor_user(&self, uid: &str, name: &str) -> Result<Value, ChatGateError> {
        self.post_json("vendor-users", &json!({ "uid": uid, "name": name }))
            .await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ChatGateError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        debug!(url = %url, "POST");
        let resp = self.http_client.post(url).json(body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<ApiErrorBody>()
                .await
                .map(|b| b.message)
                .unwrap_or_else(|_| format!("Request failed with status {}", status.as_u16()));
            return Err(ChatGateError::Api { status, message });
        }
        Ok(resp.json::<T>().await?)
    }

    fn url(&self, path: &str) -> Result<Url, ChatGateError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ChatGateError::Config(format!("bad API base url: {}", self.base)))?
            .pop_if_empty()
            .push(path);
        Ok(url)
    }
}
