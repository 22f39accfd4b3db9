use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Unix timestamp in seconds.
pub type UnixSeconds = u64;

/// Profile data returned by the provider's `me` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(rename = "applicationId", skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostAuthError {
    #[error("invalid base address {address:?}: {reason}")]
    InvalidBaseAddress { address: String, reason: String },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Performs the HTTP calls the SDK only addresses.
pub trait SessionTransport: Send + Sync {
    fn fetch_user_info(&self, url: &Url) -> Result<UserInfo, HostAuthError>;
    fn refresh_token(&self, url: &Url) -> Result<(), HostAuthError>;
    /// Expiry of the current access token, if the application holds one.
    fn access_token_expires_at(&self) -> Option<UnixSeconds>;
}

/// The embedding application's navigation and timer primitives.
pub trait HostEnvironment: Send + Sync {
    fn navigate(&self, url: &Url);
    fn schedule_refresh(&self, after: Duration);
}

/// Authentication state and action triggers surfaced to application code.
pub trait ProviderContext: Send + Sync {
    fn is_logged_in(&self) -> bool;
    fn user_info(&self) -> Option<UserInfo>;
    /// Fetches user info from the `me` endpoint.
    fn fetch_user_info(&self) -> Result<Option<UserInfo>, HostAuthError>;
    fn is_fetching_user_info(&self) -> bool;
    /// Message of the last failed user info fetch.
    fn error(&self) -> Option<String>;
    /// Starts the login flow. `state` is echoed back on redirect.
    fn start_login(&self, state: Option<&str>);
    /// Starts the registration flow. `state` is echoed back on redirect.
    fn start_register(&self, state: Option<&str>);
    fn start_logout(&self);
    /// Refreshes the access token a single time.
    fn refresh_token(&self) -> Result<(), HostAuthError>;
    fn init_auto_refresh(&self);
}

/// Context used before a provider is installed. Every trigger is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultContext;

impl ProviderContext for DefaultContext {
    fn is_logged_in(&self) -> bool {
        false
    }

    fn user_info(&self) -> Option<UserInfo> {
        None
    }

    fn fetch_user_info(&self) -> Result<Option<UserInfo>, HostAuthError> {
        Ok(Some(UserInfo::default()))
    }

    fn is_fetching_user_info(&self) -> bool {
        false
    }

    fn error(&self) -> Option<String> {
        None
    }

    fn start_login(&self, _state: Option<&str>) {}

    fn start_register(&self, _state: Option<&str>) {}

    fn start_logout(&self) {}

    fn refresh_token(&self) -> Result<(), HostAuthError> {
        Ok(())
    }

    fn init_auto_refresh(&self) {}
}
