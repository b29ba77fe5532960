pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;
pub mod vendor;

pub use error::ChatGateError;
pub use router::{AppState, app_router};
pub use service::accounts::AccountService;
pub use vendor::VendorBridge;
