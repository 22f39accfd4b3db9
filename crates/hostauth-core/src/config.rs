//! SDK-wide configuration and its loaders.

use std::fs;
use std::path::{Path, PathBuf};

use hostauth_api::HostAuthError;
use serde::{Deserialize, Serialize};

use crate::url_helper::UrlHelper;

pub const CONFIG_FILE_NAME: &str = "sdk.toml";

const DEFAULT_REFRESH_SECONDS_BEFORE_EXPIRY: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkConfig {
    pub server_url: String,
    pub client_id: String,
    pub redirect_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logout_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_path: Option<String>,
    #[serde(default)]
    pub should_auto_fetch_user_info: bool,
    #[serde(default)]
    pub should_auto_refresh: bool,
    #[serde(default = "default_refresh_seconds_before_expiry")]
    pub auto_refresh_seconds_before_expiry: u64,
}

fn default_refresh_seconds_before_expiry() -> u64 {
    DEFAULT_REFRESH_SECONDS_BEFORE_EXPIRY
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            client_id: String::new(),
            redirect_uri: String::new(),
            profile_path: None,
            login_path: None,
            register_path: None,
            logout_path: None,
            refresh_path: None,
            should_auto_fetch_user_info: false,
            should_auto_refresh: false,
            auto_refresh_seconds_before_expiry: DEFAULT_REFRESH_SECONDS_BEFORE_EXPIRY,
        }
    }
}

impl SdkConfig {
    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `HOSTAUTH_SERVER_URL`, `HOSTAUTH_CLIENT_ID`, `HOSTAUTH_REDIRECT_URI` (required)
    /// - `HOSTAUTH_PROFILE_PATH`, `HOSTAUTH_LOGIN_PATH`, `HOSTAUTH_REGISTER_PATH`,
    ///   `HOSTAUTH_LOGOUT_PATH`, `HOSTAUTH_REFRESH_PATH` (optional)
    /// - `HOSTAUTH_AUTO_FETCH_USER_INFO`, `HOSTAUTH_AUTO_REFRESH`: `true` or `1`
    /// - `HOSTAUTH_REFRESH_SECONDS_BEFORE_EXPIRY` (default: 10)
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or the result fails
    /// [`validate_config`].
    pub fn from_env() -> Result<Self, HostAuthError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SdkConfig::from_env`], reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`SdkConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HostAuthError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .ok_or_else(|| HostAuthError::Validation(format!("missing environment variable {key}")))
        };
        let flag = |key: &str| lookup(key).is_some_and(|v| v == "true" || v == "1");

        let auto_refresh_seconds_before_expiry =
            match lookup("HOSTAUTH_REFRESH_SECONDS_BEFORE_EXPIRY") {
                Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                    HostAuthError::Validation(format!(
                        "invalid HOSTAUTH_REFRESH_SECONDS_BEFORE_EXPIRY {raw:?}: {e}"
                    ))
                })?,
                None => DEFAULT_REFRESH_SECONDS_BEFORE_EXPIRY,
            };

        let config = Self {
            server_url: required("HOSTAUTH_SERVER_URL")?,
            client_id: required("HOSTAUTH_CLIENT_ID")?,
            redirect_uri: required("HOSTAUTH_REDIRECT_URI")?,
            profile_path: lookup("HOSTAUTH_PROFILE_PATH"),
            login_path: lookup("HOSTAUTH_LOGIN_PATH"),
            register_path: lookup("HOSTAUTH_REGISTER_PATH"),
            logout_path: lookup("HOSTAUTH_LOGOUT_PATH"),
            refresh_path: lookup("HOSTAUTH_REFRESH_PATH"),
            should_auto_fetch_user_info: flag("HOSTAUTH_AUTO_FETCH_USER_INFO"),
            should_auto_refresh: flag("HOSTAUTH_AUTO_REFRESH"),
            auto_refresh_seconds_before_expiry,
        };

        validate_config(&config)?;
        Ok(config)
    }
}

pub fn validate_config(config: &SdkConfig) -> Result<(), HostAuthError> {
    if config.client_id.trim().is_empty() {
        return Err(HostAuthError::Validation(
            "client_id must not be empty".to_string(),
        ));
    }
    if config.redirect_uri.trim().is_empty() {
        return Err(HostAuthError::Validation(
            "redirect_uri must not be empty".to_string(),
        ));
    }
    UrlHelper::from_sdk_config(config)?;
    Ok(())
}

pub fn default_config_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config").join("hostauth")
    } else {
        PathBuf::from(".hostauth")
    }
}

pub fn load_config_from_dir(dir: &Path) -> Result<SdkConfig, HostAuthError> {
    load_config_from_file(&dir.join(CONFIG_FILE_NAME))
}

pub fn load_config_from_file(path: &Path) -> Result<SdkConfig, HostAuthError> {
    let content = fs::read_to_string(path)
        .map_err(|e| HostAuthError::NotFound(format!("failed to read {}: {e}", path.display())))?;
    let config: SdkConfig = toml::from_str(&content).map_err(|e| {
        HostAuthError::Validation(format!("invalid TOML in {}: {e}", path.display()))
    })?;

    validate_config(&config)?;
    tracing::debug!(path = %path.display(), server_url = %config.server_url, "loaded sdk config");
    Ok(config)
}

/// Write the commented `sdk.toml` template into `dir`, keeping any existing file.
pub fn write_default_config_file(dir: &Path) -> Result<PathBuf, HostAuthError> {
    fs::create_dir_all(dir).map_err(|e| {
        HostAuthError::Internal(format!("failed to create {}: {e}", dir.display()))
    })?;

    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        fs::write(&path, include_str!("../../../docs/hostauth/sdk.toml.example")).map_err(|e| {
            HostAuthError::Internal(format!("failed to write {}: {e}", path.display()))
        })?;
    }

    Ok(path)
}
