use crate::db::{AccountProfile, AccountsStorage, NewAccount};
use crate::error::ChatGateError;
use crate::service::password::{hash_password, verify_dummy, verify_password};
use tracing::{info, warn};

/// Account operations over the credential store.
#[derive(Clone)]
pub struct AccountService {
    storage: AccountsStorage,
    bcrypt_cost: u32,
}

impl AccountService {
    pub fn new(storage: AccountsStorage, bcrypt_cost: u32) -> Self {
        Self {
            storage,
            bcrypt_cost,
        }
    }

    pub fn storage(&self) -> &AccountsStorage {
        &self.storage
    }

    /// Validate, hash and insert one account.
    pub async fn create_account(
        &self,
        username: &str,
        fullname: &str,
        password: &str,
    ) -> Result<AccountProfile, ChatGateError> {
        let username = username.trim();
        let fullname = fullname.trim();
        if username.is_empty() || fullname.is_empty() || password.is_empty() {
            return Err(ChatGateError::validation("All fields are required"));
        }

        // fail fast before paying for a hash
        if self.storage.find_by_username(username).await?.is_some() {
            return Err(ChatGateError::DuplicateUser);
        }

        let password_hash = hash_password(password, self.bcrypt_cost).await?;
        let profile = self
            .storage
            .insert(NewAccount {
                username: username.to_string(),
                fullname: fullname.to_string(),
                password_hash,
            })
            .await?;
        info!(username = %profile.username, "account created");
        Ok(profile)
    }

    /// Returns the stored profile when the password matches.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AccountProfile, ChatGateError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ChatGateError::validation(
                "Username and password are required",
            ));
        }

        let Some(account) = self.storage.find_by_username(username).await? else {
            verify_dummy(password).await;
            warn!("login rejected");
            return Err(ChatGateError::Auth);
        };

        if !verify_password(password, &account.password_hash).await? {
            warn!("login rejected");
            return Err(ChatGateError::Auth);
        }

        info!(username = %account.username, "login accepted");
        Ok(account.into())
    }
}
