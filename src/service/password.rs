//! bcrypt hashing, run off the async executor.

use crate::error::ChatGateError;
use bcrypt::{hash, verify};

/// bcrypt only reads the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Valid bcrypt hash used when the username is unknown, so a miss costs one verify too.
const DUMMY_HASH: &str = "$2b$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy";

pub async fn hash_password(password: &str, cost: u32) -> Result<String, ChatGateError> {
    ensure_length(password)?;
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        hash(password, cost).map_err(|e| ChatGateError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| ChatGateError::Hashing(format!("task join error: {e}")))?
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash is unreadable.
pub async fn verify_password(password: &str, hashed: &str) -> Result<bool, ChatGateError> {
    let password = password.to_string();
    let hashed = hashed.to_string();
    tokio::task::spawn_blocking(move || {
        verify(password, &hashed).map_err(|e| ChatGateError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| ChatGateError::Hashing(format!("task join error: {e}")))?
}

/// Burn one verification for an unknown user. Result is ignored.
pub async fn verify_dummy(password: &str) {
    let _ = verify_password(password, DUMMY_HASH).await;
}

fn ensure_length(password: &str) -> Result<(), ChatGateError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ChatGateError::validation(format!(
            "Password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    Ok(())
}
