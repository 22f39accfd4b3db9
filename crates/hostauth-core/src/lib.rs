//! hostauth-core
//!
//! Builds the URLs an application needs to talk to a hosted identity provider:
//! login, registration, logout, token refresh and the `me` profile endpoint.
//!
//! The URL builder is `UrlHelper`. It is constructed once from a
//! `UrlHelperConfig` (or projected out of an `SdkConfig`) and is immutable
//! afterwards. Building a URL never fails; only construction can, when the
//! server address is not an absolute URL.
//!
//! ## Quick start
//! ```
//! use hostauth_core::{UrlHelper, UrlHelperConfig};
//!
//! # fn demo() -> Result<(), hostauth_api::HostAuthError> {
//! let urls = UrlHelper::new(UrlHelperConfig {
//!     server_url: "https://auth.example.com".to_string(),
//!     client_id: "abc123".to_string(),
//!     redirect_uri: "https://app.example.com/cb".to_string(),
//!     ..Default::default()
//! })?;
//!
//! assert_eq!(
//!     urls.login_url(Some("xyz")).as_str(),
//!     "https://auth.example.com/app/login?client_id=abc123&redirect_uri=https%3A%2F%2Fapp.example.com%2Fcb&state=xyz",
//! );
//! # Ok(()) }
//! # demo().unwrap();
//! ```

#![forbid(unsafe_code)]

mod config;
mod url_helper;

pub use config::{
    CONFIG_FILE_NAME, SdkConfig, default_config_dir, load_config_from_dir, load_config_from_file,
    validate_config, write_default_config_file,
};
pub use url_helper::{
    DEFAULT_LOGIN_PATH, DEFAULT_LOGOUT_PATH, DEFAULT_PROFILE_PATH, DEFAULT_REFRESH_PATH,
    DEFAULT_REGISTER_PATH, UrlHelper, UrlHelperConfig,
};
