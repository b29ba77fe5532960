use crate::client::api::AppApiClient;
use crate::config::{Config, WidgetSettings};
use crate::db::AccountProfile;
use crate::error::ChatGateError;

use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Seam to the vendor's client library. Every call resolves when the SDK's
/// own promise settles.
#[ractor::async_trait]
pub trait ChatWidget: Send + Sync + 'static {
    /// Resolves on the script-load callback.
    async fn load_script(&self) -> Result<(), ChatGateError>;
    async fn init(&self, settings: &WidgetSettings, init_key: &str) -> Result<(), ChatGateError>;
    async fn login(&self, session_token: &str) -> Result<(), ChatGateError>;
    async fn launch(&self, options: &LaunchOptions) -> Result<(), ChatGateError>;
    async fn logout(&self) -> Result<(), ChatGateError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationType {
    User,
    Group,
}

impl FromStr for ConversationType {
    type Err = ChatGateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "group" => Ok(Self::Group),
            other => Err(ChatGateError::validation(format!(
                "unknown conversation type: {other}"
            ))),
        }
    }
}

/// Where and how the widget is mounted once logged in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchOptions {
    #[serde(rename = "widgetID")]
    pub widget_id: String,
    pub target: String,
    pub rounded_corners: bool,
    pub height: String,
    pub width: String,
    #[serde(rename = "defaultID", skip_serializing_if = "Option::is_none")]
    pub default_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_type: Option<ConversationType>,
}

impl LaunchOptions {
    pub fn for_widget(widget_id: impl Into<String>) -> Self {
        Self {
            widget_id: widget_id.into(),
            target: "#chat".to_string(),
            rounded_corners: true,
            height: "600px".to_string(),
            width: "100%".to_string(),
            default_id: None,
            default_type: None,
        }
    }

    /// Launch options for the configured widget and default conversation.
    pub fn from_config(cfg: &Config) -> Result<Self, ChatGateError> {
        let opts = Self::for_widget(cfg.vendor_widget_id.clone());
        Ok(match cfg.default_conversation()? {
            Some((kind, id)) => opts.with_default_conversation(id, kind),
            None => opts,
        })
    }

    pub fn with_default_conversation(mut self, id: impl Into<String>, kind: ConversationType) -> Self {
        self.default_id = Some(id.into());
        self.default_type = Some(kind);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetState {
    Uninitialized,
    ScriptLoading,
    /// Loading or initialization failed; only a page reload retries.
    ScriptFailed(String),
    Initialized,
    LoggedOut,
    LoggedIn { uid: String },
}

impl WidgetState {
    fn is_ready(&self) -> bool {
        matches!(
            self,
            Self::Initialized | Self::LoggedOut | Self::LoggedIn { .. }
        )
    }
}

/// Transient vendor artifacts held only while the host lives.
#[derive(Debug, Clone, Default)]
struct SessionArtifact {
    init_key: Option<String>,
    user_token: Option<String>,
}

/// Messages handled by the widget host actor. One at a time, in order.
#[derive(Debug)]
pub enum WidgetHostMessage {
    /// Load the script, initialize, then log in `session` if one was passed.
    Mount(
        Option<AccountProfile>,
        RpcReplyPort<Result<WidgetState, ChatGateError>>,
    ),
    Login(AccountProfile, RpcReplyPort<Result<(), ChatGateError>>),
    /// Best-effort vendor logout; local state is always cleared.
    Logout(RpcReplyPort<()>),
    GetState(RpcReplyPort<WidgetState>),
}

/// Handle for interacting with the widget host actor.
#[derive(Clone)]
pub struct WidgetHostHandle {
    actor: ActorRef<WidgetHostMessage>,
}

impl WidgetHostHandle {
    pub async fn mount(
        &self,
        session: Option<AccountProfile>,
    ) -> Result<WidgetState, ChatGateError> {
        ractor::call!(self.actor, WidgetHostMessage::Mount, session)
            .map_err(|e| ChatGateError::Actor(format!("Mount RPC failed: {e}")))?
    }

    pub async fn login(&self, user: AccountProfile) -> Result<(), ChatGateError> {
        ractor::call!(self.actor, WidgetHostMessage::Login, user)
            .map_err(|e| ChatGateError::Actor(format!("Login RPC failed: {e}")))?
    }

    pub async fn logout(&self) -> Result<(), ChatGateError> {
        ractor::call!(self.actor, WidgetHostMessage::Logout)
            .map_err(|e| ChatGateError::Actor(format!("Logout RPC failed: {e}")))
    }

    pub async fn state(&self) -> Result<WidgetState, ChatGateError> {
        ractor::call!(self.actor, WidgetHostMessage::GetState)
            .map_err(|e| ChatGateError::Actor(format!("GetState RPC failed: {e}")))
    }

    pub fn stop(&self) {
        self.actor.stop(None);
    }
}

pub struct WidgetHostArgs {
    pub widget: Arc<dyn ChatWidget>,
    pub api: AppApiClient,
    pub settings: WidgetSettings,
    pub launch: LaunchOptions,
}

struct WidgetHostState {
    widget: Arc<dyn ChatWidget>,
    api: AppApiClient,
    settings: WidgetSettings,
    launch: LaunchOptions,
    artifact: SessionArtifact,
    state: WidgetState,
}

impl WidgetHostState {
    fn transition(&mut self, next: WidgetState) {
        debug!(from = ?self.state, to = ?next, "widget state");
        self.state = next;
    }
}

struct WidgetHost;

#[ractor::async_trait]
impl Actor for WidgetHost {
    type Msg = WidgetHostMessage;
    type State = WidgetHostState;
    type Arguments = WidgetHostArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        Ok(WidgetHostState {
            widget: args.widget,
            api: args.api,
            settings: args.settings,
            launch: args.launch,
            artifact: SessionArtifact::default(),
            state: WidgetState::Uninitialized,
        })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            WidgetHostMessage::Mount(session, rp) => {
                let res = self.handle_mount(state, session).await;
                let _ = rp.send(res);
            }
            WidgetHostMessage::Login(user, rp) => {
                let res = self.handle_login(state, user).await;
                let _ = rp.send(res);
            }
            WidgetHostMessage::Logout(rp) => {
                self.handle_logout(state).await;
                let _ = rp.send(());
            }
            WidgetHostMessage::GetState(rp) => {
                let _ = rp.send(state.state.clone());
            }
        }
        Ok(())
    }
}

impl WidgetHost {
    async fn handle_mount(
        &self,
        state: &mut WidgetHostState,
        session: Option<AccountProfile>,
    ) -> Result<WidgetState, ChatGateError> {
        if state.state != WidgetState::Uninitialized {
            debug!(state = ?state.state, "already mounted; ignoring");
            return Ok(state.state.clone());
        }

        state.transition(WidgetState::ScriptLoading);
        if let Err(e) = self.load_and_init(state).await {
            error!(error = %e, "chat initialization failed");
            state.transition(WidgetState::ScriptFailed(e.to_string()));
            return Err(e);
        }
        state.transition(WidgetState::Initialized);
        info!("chat widget initialized");

        // login only ever runs as the continuation of a completed init
        match session {
            Some(user) => {
                self.login_and_launch(state, &user).await?;
            }
            None => state.transition(WidgetState::LoggedOut),
        }
        Ok(state.state.clone())
    }

    async fn load_and_init(&self, state: &mut WidgetHostState) -> Result<(), ChatGateError> {
        state.widget.load_script().await?;
        let init_key = state.api.get_init_key().await?;
        state.widget.init(&state.settings, &init_key).await?;
        state.artifact.init_key = Some(init_key);
        Ok(())
    }

    async fn handle_login(
        &self,
        state: &mut WidgetHostState,
        user: AccountProfile,
    ) -> Result<(), ChatGateError> {
        match &state.state {
            WidgetState::LoggedIn { uid } if *uid == user.username => return Ok(()),
            WidgetState::LoggedIn { uid } => {
                return Err(ChatGateError::Widget(format!(
                    "{uid} is still logged in; log out first"
                )));
            }
            s if !s.is_ready() => return Err(ChatGateError::WidgetNotReady),
            _ => {}
        }
        self.login_and_launch(state, &user).await
    }

    /// On any failure the host ends in `LoggedOut` and the error is returned.
    async fn login_and_launch(
        &self,
        state: &mut WidgetHostState,
        user: &AccountProfile,
    ) -> Result<(), ChatGateError> {
        let mut vendor_logged_in = false;
        let res = async {
            let token = state.api.get_session_token(&user.username).await?;
            state.widget.login(&token).await?;
            vendor_logged_in = true;
            state.artifact.user_token = Some(token);
            state.widget.launch(&state.launch).await
        }
        .await;

        match res {
            Ok(()) => {
                info!(uid = %user.username, "chat session launched");
                state.transition(WidgetState::LoggedIn {
                    uid: user.username.clone(),
                });
                Ok(())
            }
            Err(e) => {
                warn!(uid = %user.username, error = %e, "chat login failed");
                if vendor_logged_in {
                    // launch failed after login; don't leave the vendor session open
                    if let Err(le) = state.widget.logout().await {
                        warn!(uid = %user.username, error = %le, "vendor logout after failed launch");
                    }
                }
                state.artifact.user_token = None;
                state.transition(WidgetState::LoggedOut);
                Err(e)
            }
        }
    }

    async fn handle_logout(&self, state: &mut WidgetHostState) {
        if let WidgetState::LoggedIn { uid } = &state.state {
            match state.widget.logout().await {
                Ok(()) => info!(uid = %uid, "chat logout completed"),
                Err(e) => warn!(uid = %uid, error = %e, "vendor logout failed; clearing anyway"),
            }
        }
        state.artifact.user_token = None;
        if state.state.is_ready() {
            state.transition(WidgetState::LoggedOut);
        }
    }
}

/// Spawn a widget host for one page lifetime.
pub async fn spawn(args: WidgetHostArgs) -> Result<WidgetHostHandle, ChatGateError> {
    let (actor, _jh) = Actor::spawn(None, WidgetHost, args)
        .await
        .map_err(|e| ChatGateError::Actor(format!("failed to spawn WidgetHost: {e}")))?;
    Ok(WidgetHostHandle { actor })
}
