use crate::db::AccountProfile;
use serde::{Deserialize, Serialize};

/// The signed-in visitor, owned by the auth UI and handed to the widget host.
///
/// Serializable so an embedding page may persist it; nothing in this crate
/// reads it back from ambient storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSession {
    user: Option<AccountProfile>,
}

impl LocalSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(user: AccountProfile) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&AccountProfile> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn set(&mut self, user: AccountProfile) {
        self.user = Some(user);
    }

    pub fn clear(&mut self) {
        self.user = None;
    }
}
