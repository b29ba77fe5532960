use crate::client::widget::ConversationType;
use crate::error::ChatGateError;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Lowest bcrypt cost accepted from the environment.
pub const MIN_BCRYPT_COST: u32 = 10;

/// Environment keys read by [`Config::from_env`].
const ENV_KEYS: &[&str] = &[
    "vendor_app_id",
    "vendor_region",
    "vendor_widget_id",
    "vendor_api_secret",
    "vendor_widget_auth_key",
    "vendor_api_base",
    "vendor_default_conversation",
    "database_url",
    "listen_addr",
    "bcrypt_cost",
    "loglevel",
];

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    pub vendor_app_id: String,
    pub vendor_region: String,
    pub vendor_widget_id: String,
    /// REST API secret. Server only; never serialized into responses or logs.
    pub vendor_api_secret: String,
    /// Widget-safe key issued by the vendor dashboard. Derived from the secret when unset.
    pub vendor_widget_auth_key: Option<String>,
    pub vendor_api_base: Option<Url>,
    /// Conversation the widget opens on launch, as `<type>:<id>` (e.g. `group:lobby`).
    pub vendor_default_conversation: Option<String>,
    pub database_url: String,
    pub listen_addr: String,
    pub bcrypt_cost: u32,
    pub loglevel: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vendor_app_id: String::new(),
            vendor_region: String::new(),
            vendor_widget_id: String::new(),
            vendor_api_secret: String::new(),
            vendor_widget_auth_key: None,
            vendor_api_base: None,
            vendor_default_conversation: None,
            database_url: "sqlite://chat_gate.db".to_string(),
            listen_addr: "0.0.0.0:8000".to_string(),
            bcrypt_cost: MIN_BCRYPT_COST,
            loglevel: "info".to_string(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("vendor_app_id", &self.vendor_app_id)
            .field("vendor_region", &self.vendor_region)
            .field("vendor_widget_id", &self.vendor_widget_id)
            .field("vendor_api_secret", &"<redacted>")
            .field(
                "vendor_widget_auth_key",
                &self.vendor_widget_auth_key.as_ref().map(|_| "<redacted>"),
            )
            .field("vendor_api_base", &self.vendor_api_base)
            .field(
                "vendor_default_conversation",
                &self.vendor_default_conversation,
            )
            .field("database_url", &self.database_url)
            .field("listen_addr", &self.listen_addr)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("loglevel", &self.loglevel)
            .finish()
    }
}

/// Public widget settings, safe to hand to the browser side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSettings {
    pub app_id: String,
    pub region: String,
    pub widget_id: String,
}

impl Config {
    /// Load defaults, then overlay process environment (after `.env` was applied by the caller).
    pub fn from_env() -> Result<Self, ChatGateError> {
        Self::from_figment(
            Figment::from(Serialized::defaults(Config::default())).merge(Env::raw().only(ENV_KEYS)),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ChatGateError> {
        let cfg: Config = figment
            .extract()
            .map_err(|e| ChatGateError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ChatGateError> {
        let required = [
            ("VENDOR_APP_ID", &self.vendor_app_id),
            ("VENDOR_REGION", &self.vendor_region),
            ("VENDOR_WIDGET_ID", &self.vendor_widget_id),
            ("VENDOR_API_SECRET", &self.vendor_api_secret),
            ("DATABASE_URL", &self.database_url),
        ];
        if let Some((name, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ChatGateError::Config(format!("{name} must be set")));
        }
        if !(MIN_BCRYPT_COST..=31).contains(&self.bcrypt_cost) {
            return Err(ChatGateError::Config(format!(
                "BCRYPT_COST must be between {MIN_BCRYPT_COST} and 31"
            )));
        }
        if self.vendor_widget_auth_key.as_deref() == Some(self.vendor_api_secret.as_str()) {
            return Err(ChatGateError::Config(
                "VENDOR_WIDGET_AUTH_KEY must differ from VENDOR_API_SECRET".to_string(),
            ));
        }
        self.default_conversation()?;
        Ok(())
    }

    /// Parsed `VENDOR_DEFAULT_CONVERSATION`; unset or blank means none.
    pub fn default_conversation(
        &self,
    ) -> Result<Option<(ConversationType, String)>, ChatGateError> {
        let Some(raw) = self
            .vendor_default_conversation
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            return Ok(None);
        };
        let invalid = || {
            ChatGateError::Config(format!(
                "VENDOR_DEFAULT_CONVERSATION must look like group:<id> or user:<id>, got {raw:?}"
            ))
        };
        let (kind, id) = raw.split_once(':').ok_or_else(invalid)?;
        let kind: ConversationType = kind.parse().map_err(|_| invalid())?;
        if id.trim().is_empty() {
            return Err(invalid());
        }
        Ok(Some((kind, id.trim().to_string())))
    }

    /// Vendor REST root, e.g. `https://<app>.api-<region>.cometchat.io/v3`.
    pub fn vendor_api_base(&self) -> Result<Url, ChatGateError> {
        match &self.vendor_api_base {
            Some(url) => Ok(url.clone()),
            None => Ok(Url::parse(&format!(
                "https://{}.api-{}.cometchat.io/v3",
                self.vendor_app_id, self.vendor_region
            ))?),
        }
    }

    pub fn widget_settings(&self) -> WidgetSettings {
        WidgetSettings {
            app_id: self.vendor_app_id.clone(),
            region: self.vendor_region.clone(),
            widget_id: self.vendor_widget_id.clone(),
        }
    }
}
