//! Browser-side half of the application: the auth forms, the explicit
//! local session, and the vendor chat widget host.
//!
//! Everything here talks to the server only through [`api::AppApiClient`];
//! the vendor SDK is reached through the [`widget::ChatWidget`] trait.

pub mod api;
pub mod auth_ui;
pub mod session;
pub mod widget;

pub use api::AppApiClient;
pub use auth_ui::{AuthUi, FlashMessage, FormKind, MessageKind};
pub use session::LocalSession;
pub use widget::{ChatWidget, LaunchOptions, WidgetHostHandle, WidgetState};
