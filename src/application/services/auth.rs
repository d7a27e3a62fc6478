//! Authentication service
//!
//! Register/login store the issued tokens in the session; `restore` revalidates
//! a stored session against `/auth/me`.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::application::api::ApiClient;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::validation::{validate_login, validate_registration};
use crate::domain::{Session, UserInfo};

/// Response of `/auth/register` and `/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub email: String,
    pub user_id: i64,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

pub struct AuthService {
    api: Arc<ApiClient>,
}

impl AuthService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    #[instrument(skip(self, password, confirm))]
    pub fn register(&self, email: &str, password: &str, confirm: &str) -> ApplicationResult<UserInfo> {
        let email = email.trim();
        validate_registration(email, password, confirm)?;
        let response: AuthResponse = self
            .api
            .post_public("/auth/register", &json!({ "email": email, "password": password }))?;
        info!("registered {}", response.email);
        self.store_login(response)
    }

    #[instrument(skip(self, password))]
    pub fn login(&self, email: &str, password: &str) -> ApplicationResult<UserInfo> {
        let email = email.trim();
        validate_login(email, password)?;
        let response: AuthResponse = self
            .api
            .post_public("/auth/login", &json!({ "email": email, "password": password }))?;
        info!("logged in as {}", response.email);
        self.store_login(response)
    }

    /// Exchange the stored refresh token for a new pair.
    pub fn refresh(&self) -> ApplicationResult<Session> {
        let session = self.api.session()?;
        let refresh_token = session
            .refresh_token
            .clone()
            .ok_or(ApplicationError::NotLoggedIn)?;
        let tokens = self.api.refresh_tokens(&refresh_token)?;
        self.api
            .update_session(|s| s.set_tokens(tokens.access_token, tokens.refresh_token))
    }

    /// Fetch the current user and remember it in the session.
    pub fn me(&self) -> ApplicationResult<UserInfo> {
        if !self.api.session()?.has_credentials() {
            return Err(ApplicationError::NotLoggedIn);
        }
        let user: UserInfo = self.api.get("/auth/me")?;
        let stored = user.clone();
        self.api.update_session(|s| s.user = Some(stored))?;
        Ok(user)
    }

    /// Revalidate a stored session.
    ///
    /// Without tokens this is a no-op. With only a refresh token the pair is
    /// refreshed first. Any failure logs the session out.
    #[instrument(skip(self))]
    pub fn restore(&self) -> ApplicationResult<Option<UserInfo>> {
        let session = self.api.session()?;
        if !session.has_credentials() {
            debug!("restore: no stored credentials");
            return Ok(None);
        }

        let result = if session.access_token.is_none() {
            self.refresh().and_then(|_| self.me())
        } else {
            self.me()
        };

        match result {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!("restore failed, logging out: {}", e);
                self.logout()?;
                Ok(None)
            }
        }
    }

    pub fn logout(&self) -> ApplicationResult<()> {
        self.api.clear_session()?;
        info!("logged out");
        Ok(())
    }

    pub fn session(&self) -> ApplicationResult<Session> {
        self.api.session()
    }

    fn store_login(&self, response: AuthResponse) -> ApplicationResult<UserInfo> {
        let user = UserInfo {
            email: response.email,
            id: response.user_id,
        };
        let stored = user.clone();
        self.api.update_session(|s| {
            // tree selection belongs to the previous account
            if s.user.as_ref().map(|u| u.id) != Some(stored.id) {
                s.current_tree = None;
            }
            s.set_tokens(response.access_token, response.refresh_token);
            s.user = Some(stored);
        })?;
        Ok(user)
    }
}
