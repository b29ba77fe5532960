use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tracing::info;

use crate::config::Config;
use crate::db::{AccountsStorage, connect_lazy};
use crate::error::ChatGateError;
use crate::handlers::{
    accounts::create_account,
    health::healthz,
    sessions::create_session,
    vendor::{register_vendor_user, vendor_auth},
};
use crate::service::accounts::AccountService;
use crate::vendor::VendorBridge;

/// Request bodies above this size are answered with 413.
pub const BODY_LIMIT: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub bridge: VendorBridge,
}

impl AppState {
    pub fn new(accounts: AccountService, bridge: VendorBridge) -> Self {
        Self { accounts, bridge }
    }

    /// Build the shared pool, ensure the schema, and wire the services.
    pub async fn from_config(cfg: &Config) -> Result<Self, ChatGateError> {
        let pool = connect_lazy(&cfg.database_url)?;
        let storage = AccountsStorage::new(pool);
        storage.init_schema().await?;
        info!("account storage ready");

        let accounts = AccountService::new(storage, cfg.bcrypt_cost);
        let bridge = VendorBridge::new(cfg)?;
        Ok(Self::new(accounts, bridge))
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/accounts", post(create_account))
        .route("/sessions", post(create_session))
        .route("/vendor-auth", post(vendor_auth))
        .route("/vendor-users", post(register_vendor_user))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}
