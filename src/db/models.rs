use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the `accounts` table.
#[derive(Debug, Clone, PartialEq)]
pub struct DbAccount {
    pub username: String,
    pub fullname: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub fullname: String,
    pub password_hash: String,
}

/// Public view of an account. Never carries the hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub username: String,
    pub fullname: String,
}

impl From<DbAccount> for AccountProfile {
    fn from(d: DbAccount) -> Self {
        Self {
            username: d.username,
            fullname: d.fullname,
        }
    }
}

impl From<&NewAccount> for AccountProfile {
    fn from(n: &NewAccount) -> Self {
        Self {
            username: n.username.clone(),
            fullname: n.fullname.clone(),
        }
    }
}
