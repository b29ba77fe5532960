use crate::db::models::{AccountProfile, DbAccount, NewAccount};
use crate::db::schema::SQLITE_INIT;
use crate::error::ChatGateError;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use tracing::debug;

pub type SqlitePool = Pool<Sqlite>;

/// Build the process-wide pool. No connection is opened until the first query.
pub fn connect_lazy(database_url: &str) -> Result<SqlitePool, ChatGateError> {
    let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    Ok(SqlitePoolOptions::new().connect_lazy_with(connect_opts))
}

#[derive(Clone)]
pub struct AccountsStorage {
    pool: SqlitePool,
}

impl AccountsStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), ChatGateError> {
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Plain insert. An existing username is reported as `DuplicateUser` and left untouched.
    pub async fn insert(&self, account: NewAccount) -> Result<AccountProfile, ChatGateError> {
        let created_at = Utc::now().to_rfc3339();
        let res = sqlx::query(
            r#"INSERT INTO accounts (username, fullname, password_hash, created_at)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(&account.username)
        .bind(&account.fullname)
        .bind(&account.password_hash)
        .bind(created_at)
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => {
                debug!(username = %account.username, "account row inserted");
                Ok(AccountProfile::from(&account))
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(ChatGateError::DuplicateUser)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<DbAccount>, ChatGateError> {
        let row = sqlx::query(
            r#"SELECT username, fullname, password_hash, created_at
               FROM accounts WHERE username = ?"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_model).transpose()
    }

    pub async fn count(&self) -> Result<i64, ChatGateError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    fn row_to_model(row: SqliteRow) -> Result<DbAccount, ChatGateError> {
        let username: String = row.try_get("username")?;
        let fullname: String = row.try_get("fullname")?;
        let password_hash: String = row.try_get("password_hash")?;
        let created_at_str: String = row.try_get("created_at")?;

        let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
            .with_timezone(&Utc);

        Ok(DbAccount {
            username,
            fullname,
            password_hash,
            created_at,
        })
    }
}
