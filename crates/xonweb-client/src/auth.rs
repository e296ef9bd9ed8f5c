//! Login, logout and session restore
//!
//! The token is the only persisted piece of session state. The user profile
//! is always fetched from the server.

use xonweb_core::models::{GoogleAuthRequest, LoginRequest, RegisterRequest};
use xonweb_core::{MessageResponse, User};

use crate::api::ApiClient;
use crate::error::ClientResult;

pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Re-establish the session from the stored token
    ///
    /// Without a token no request is made. A token the server does not accept
    /// is removed and `None` returned.
    pub async fn restore(&self) -> ClientResult<Option<User>> {
        if self.api.session().token().await.is_none() {
            log::debug!(target: "xonweb::auth", "no stored session");
            return Ok(None);
        }

        match self.api.me().await {
            Ok(user) => {
                log::info!(target: "xonweb::auth", "session restored for {}", user.email);
                Ok(Some(user))
            }
            Err(e) => {
                log::warn!(target: "xonweb::auth", "stored session is not usable: {}", e);
                self.api.session().clear_token().await?;
                Ok(None)
            }
        }
    }

    /// Log in with email or username
    pub async fn login(&self, identifier: &str, password: &str) -> ClientResult<User> {
        let request = LoginRequest {
            email: identifier.trim().to_string(),
            password: password.to_string(),
        };
        let response = self.api.login(&request).await?;
        self.api.session().set_token(&response.session_token).await?;
        log::info!(target: "xonweb::auth", "logged in as {}", response.user.email);
        Ok(response.user)
    }

    /// Exchange an external identity provider session for our own
    pub async fn login_with_google(&self, session_id: &str) -> ClientResult<User> {
        let request = GoogleAuthRequest {
            session_id: session_id.to_string(),
        };
        let response = self.api.google_login(&request).await?;
        self.api.session().set_token(&response.session_token).await?;
        Ok(response.user)
    }

    /// Self-registration; the server may refuse it outright
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<MessageResponse> {
        self.api.register(request).await
    }

    /// End the session; the local token is cleared whatever the server says
    pub async fn logout(&self) -> ClientResult<()> {
        if let Err(e) = self.api.logout().await {
            log::debug!(target: "xonweb::auth", "logout request failed: {}", e);
        }
        self.api.session().clear_token().await?;
        log::info!(target: "xonweb::auth", "logged out");
        Ok(())
    }
}
