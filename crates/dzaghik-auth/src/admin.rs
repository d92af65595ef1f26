//! Admin token session.
//!
//! Tokens and the admin profile are persisted under the same keys the web
//! console uses, so a login survives restarts. Every authenticated call goes
//! through [`AdminSession::send`], which refreshes the access token at most
//! once per call.

use crate::user::AdminProfile;
use crate::AuthError;
use dzaghik_cache::Cache;
use dzaghik_data::{FetchClient, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

pub const ACCESS_TOKEN_KEY: &str = "admin_access_token";
pub const REFRESH_TOKEN_KEY: &str = "admin_refresh_token";
pub const ADMIN_USER_KEY: &str = "admin_user";

const LOGIN_PATH: &str = "/api/admin/login/";
const REFRESH_PATH: &str = "/api/admin/token/refresh/";

/// Shown when the backend rejects a login without saying why.
pub const GENERIC_LOGIN_ERROR: &str = "Invalid username or password";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    access: String,
    refresh: String,
    user: AdminProfile,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

/// A logged-in (or not yet logged-in) admin.
#[derive(Debug, Clone)]
pub struct AdminSession {
    client: FetchClient,
    cache: Cache,
}

impl AdminSession {
    pub fn new(client: FetchClient, cache: Cache) -> Self {
        Self { client, cache }
    }

    pub fn client(&self) -> &FetchClient {
        &self.client
    }

    /// Log in with username and password.
    ///
    /// On success the tokens and profile are stored. On rejection the
    /// backend's `detail` or `error` message is returned, or a generic one.
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<AdminProfile, AuthError> {
        if username.trim().is_empty() {
            return Err(AuthError::MissingField("username"));
        }

        let body = LoginRequest {
            username: username.trim(),
            password: password.expose_secret(),
        };
        let response = self.client.post(LOGIN_PATH).json(&body)?.send().await?;

        if !response.is_success() {
            tracing::info!(status = response.status, "admin login rejected");
            return Err(AuthError::InvalidCredentials(login_error_message(&response)));
        }

        let login: LoginResponse = response.json()?;
        self.cache.set(ACCESS_TOKEN_KEY, &login.access)?;
        self.cache.set(REFRESH_TOKEN_KEY, &login.refresh)?;
        self.cache.set(ADMIN_USER_KEY, &login.user)?;

        tracing::info!(username = %login.user.username, "admin logged in");
        Ok(login.user)
    }

    /// Remove tokens and profile.
    pub fn logout(&self) -> Result<(), AuthError> {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, ADMIN_USER_KEY] {
            self.cache.delete(key)?;
        }
        Ok(())
    }

    /// True only when both a profile and an access token are stored.
    pub fn is_admin(&self) -> bool {
        matches!(self.profile(), Ok(Some(_))) && matches!(self.access_token(), Ok(Some(_)))
    }

    pub fn profile(&self) -> Result<Option<AdminProfile>, AuthError> {
        Ok(self.cache.get(ADMIN_USER_KEY)?)
    }

    fn access_token(&self) -> Result<Option<SecretString>, AuthError> {
        let token: Option<String> = self.cache.get(ACCESS_TOKEN_KEY)?;
        Ok(token.map(SecretString::from))
    }

    fn refresh_token(&self) -> Result<Option<SecretString>, AuthError> {
        let token: Option<String> = self.cache.get(REFRESH_TOKEN_KEY)?;
        Ok(token.map(SecretString::from))
    }

    /// Send a request with the stored access token.
    ///
    /// A `401` triggers one token refresh and one retry. If the refresh fails
    /// or the retry is rejected again, the session is cleared and
    /// [`AuthError::SessionExpired`] is returned. Any other status is handed
    /// back to the caller untouched.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, AuthError> {
        let token = self.access_token()?.ok_or(AuthError::NotLoggedIn)?;
        let response = self
            .client
            .execute(request.clone().bearer_auth(token.expose_secret()))
            .await?;

        if response.status != 401 {
            return Ok(response);
        }

        tracing::debug!("access token rejected, refreshing");
        let Some(token) = self.refresh().await? else {
            self.expire()?;
            return Err(AuthError::SessionExpired);
        };

        let retried = self
            .client
            .execute(request.bearer_auth(token.expose_secret()))
            .await?;
        if retried.status == 401 {
            self.expire()?;
            return Err(AuthError::SessionExpired);
        }
        Ok(retried)
    }

    /// Exchange the refresh token for a new access token. `None` when there
    /// is no refresh token or the backend refused it.
    async fn refresh(&self) -> Result<Option<SecretString>, AuthError> {
        let Some(refresh) = self.refresh_token()? else {
            return Ok(None);
        };

        let body = RefreshRequest {
            refresh: refresh.expose_secret(),
        };
        let response = match self.client.post(REFRESH_PATH).json(&body)?.send().await {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                tracing::warn!(status = response.status, "token refresh rejected");
                return Ok(None);
            }
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed");
                return Ok(None);
            }
        };

        let Ok(RefreshResponse { access }) = response.json() else {
            tracing::warn!("token refresh returned an unreadable body");
            return Ok(None);
        };
        self.cache.set(ACCESS_TOKEN_KEY, &access)?;
        Ok(Some(SecretString::from(access)))
    }

    fn expire(&self) -> Result<(), AuthError> {
        tracing::info!("admin session expired");
        self.logout()
    }
}

fn login_error_message(response: &Response) -> String {
    let body: serde_json::Value = response.json().unwrap_or_default();
    ["detail", "error"]
        .into_iter()
        .find_map(|key| body.get(key).and_then(|v| v.as_str()).map(str::to_string))
        .unwrap_or_else(|| GENERIC_LOGIN_ERROR.to_string())
}
