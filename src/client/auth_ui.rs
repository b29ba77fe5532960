use crate::client::api::AppApiClient;
use crate::client::session::LocalSession;
use crate::client::widget::{WidgetHostHandle, WidgetState};
use crate::db::AccountProfile;
use crate::error::ChatGateError;

use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// Success and error messages disappear after this long.
pub const MESSAGE_TTL: Duration = Duration::from_secs(5);

const INIT_FAILED: &str = "Failed to initialize chat. Please try again later.";
const CHAT_LOGIN_FAILED: &str = "Failed to login to chat. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Login,
    Signup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Progress text; stays until replaced.
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct FlashMessage {
    pub text: String,
    pub kind: MessageKind,
    shown_at: Instant,
}

impl FlashMessage {
    fn new(text: impl Into<String>, kind: MessageKind) -> Self {
        Self {
            text: text.into(),
            kind,
            shown_at: Instant::now(),
        }
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        match self.kind {
            MessageKind::Info => true,
            MessageKind::Success | MessageKind::Error => {
                now.saturating_duration_since(self.shown_at) < MESSAGE_TTL
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub username: String,
    pub fullname: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Login/signup view: form state, flash messages, and the local session.
pub struct AuthUi {
    api: AppApiClient,
    widget: WidgetHostHandle,
    session: LocalSession,
    active: FormKind,
    pub signup_form: SignupForm,
    pub login_form: LoginForm,
    login_message: Option<FlashMessage>,
    signup_message: Option<FlashMessage>,
}

impl AuthUi {
    pub fn new(api: AppApiClient, widget: WidgetHostHandle, session: LocalSession) -> Self {
        Self {
            api,
            widget,
            session,
            active: FormKind::Login,
            signup_form: SignupForm::default(),
            login_form: LoginForm::default(),
            login_message: None,
            signup_message: None,
        }
    }

    pub fn session(&self) -> &LocalSession {
        &self.session
    }

    pub fn active_form(&self) -> FormKind {
        self.active
    }

    pub fn toggle_form(&mut self) {
        self.active = match self.active {
            FormKind::Login => FormKind::Signup,
            FormKind::Signup => FormKind::Login,
        };
    }

    /// Currently visible message for `form`, if any.
    pub fn message(&self, form: FormKind) -> Option<&FlashMessage> {
        let now = Instant::now();
        self.slot(form).as_ref().filter(|m| m.is_visible_at(now))
    }

    /// Start the widget host, handing it the session we already hold.
    pub async fn mount(&mut self) -> Result<WidgetState, ChatGateError> {
        let had_session = self.session.is_logged_in();
        match self.widget.mount(self.session.user().cloned()).await {
            Ok(state) => Ok(state),
            Err(e) => {
                match self.widget.state().await {
                    Ok(WidgetState::LoggedOut) if had_session => {
                        self.session.clear();
                        self.show(FormKind::Login, CHAT_LOGIN_FAILED, MessageKind::Error);
                    }
                    _ => self.show(FormKind::Login, INIT_FAILED, MessageKind::Error),
                }
                Err(e)
            }
        }
    }

    pub async fn submit_signup(&mut self) -> Result<AccountProfile, ChatGateError> {
        let SignupForm {
            username,
            fullname,
            password,
        } = self.signup_form.clone();
        if username.is_empty() || fullname.is_empty() || password.is_empty() {
            self.show(FormKind::Signup, "All fields are required", MessageKind::Error);
            return Err(ChatGateError::validation("All fields are required"));
        }

        self.show(FormKind::Signup, "Creating your account...", MessageKind::Info);
        // vendor user first; a taken uid is accepted, so retries complete
        let res = async {
            self.api
                .register_vendor_user(username.trim(), fullname.trim())
                .await?;
            self.api
                .create_account(&username, &fullname, &password)
                .await
        }
        .await;

        match res {
            Ok(profile) => {
                info!(username = %profile.username, "signup completed");
                self.show(
                    FormKind::Signup,
                    "Sign up successful! You can now login.",
                    MessageKind::Success,
                );
                self.signup_form = SignupForm::default();
                self.active = FormKind::Login;
                Ok(profile)
            }
            Err(e) => {
                self.show(
                    FormKind::Signup,
                    format!("Failed to create user: {}", e.public_message()),
                    MessageKind::Error,
                );
                Err(e)
            }
        }
    }

    pub async fn submit_login(&mut self) -> Result<AccountProfile, ChatGateError> {
        let LoginForm { username, password } = self.login_form.clone();
        if username.is_empty() || password.is_empty() {
            self.show(
                FormKind::Login,
                "Username and password are required",
                MessageKind::Error,
            );
            return Err(ChatGateError::validation(
                "Username and password are required",
            ));
        }

        let profile = match self.api.create_session(&username, &password).await {
            Ok(profile) => profile,
            Err(e) => {
                self.show(FormKind::Login, e.public_message(), MessageKind::Error);
                return Err(e);
            }
        };

        self.show(FormKind::Login, "Logging in...", MessageKind::Info);
        self.session.set(profile.clone());
        match self.widget.login(profile.clone()).await {
            Ok(()) => {
                self.login_form = LoginForm::default();
                self.login_message = None;
                Ok(profile)
            }
            Err(e) => {
                self.session.clear();
                let text = match &e {
                    ChatGateError::WidgetNotReady => e.public_message(),
                    _ => CHAT_LOGIN_FAILED.to_string(),
                };
                self.show(FormKind::Login, text, MessageKind::Error);
                Err(e)
            }
        }
    }

    /// Always ends signed out locally, whatever the vendor says.
    pub async fn logout(&mut self) {
        if let Err(e) = self.widget.logout().await {
            warn!(error = %e, "widget host unreachable during logout");
        }
        self.session.clear();
    }

    fn slot(&self, form: FormKind) -> &Option<FlashMessage> {
        match form {
            FormKind::Login => &self.login_message,
            FormKind::Signup => &self.signup_message,
        }
    }

    fn show(&mut self, form: FormKind, text: impl Into<String>, kind: MessageKind) {
        let msg = Some(FlashMessage::new(text, kind));
        match form {
            FormKind::Login => self.login_message = msg,
            FormKind::Signup => self.signup_message = msg,
        }
    }
}
