//! Provider URL construction.

use hostauth_api::HostAuthError;
use url::{Url, form_urlencoded};

use crate::config::SdkConfig;

pub const DEFAULT_PROFILE_PATH: &str = "/app/me";
pub const DEFAULT_LOGIN_PATH: &str = "/app/login";
pub const DEFAULT_REGISTER_PATH: &str = "/app/register";
pub const DEFAULT_LOGOUT_PATH: &str = "/app/logout";
pub const DEFAULT_REFRESH_PATH: &str = "/app/refresh";

/// Inputs for a `UrlHelper`. Paths left as `None` fall back to the `DEFAULT_*` paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlHelperConfig {
    /// Absolute base URL of the identity provider.
    pub server_url: String,
    pub client_id: String,
    /// Where the provider sends the browser back after login and logout.
    pub redirect_uri: String,
    pub profile_path: Option<String>,
    pub login_path: Option<String>,
    pub register_path: Option<String>,
    pub logout_path: Option<String>,
    pub refresh_path: Option<String>,
}

impl From<&SdkConfig> for UrlHelperConfig {
    fn from(config: &SdkConfig) -> Self {
        Self {
            server_url: config.server_url.clone(),
            client_id: config.client_id.clone(),
            redirect_uri: config.redirect_uri.clone(),
            profile_path: config.profile_path.clone(),
            login_path: config.login_path.clone(),
            register_path: config.register_path.clone(),
            logout_path: config.logout_path.clone(),
            refresh_path: config.refresh_path.clone(),
        }
    }
}

type QueryParams<'a> = [(&'static str, Option<&'a str>)];

/// Generates the URLs SDK consumers navigate to or call.
///
/// The configuration is resolved once in [`UrlHelper::new`] and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlHelper {
    server_url: Url,
    client_id: String,
    redirect_uri: String,
    profile_path: String,
    login_path: String,
    register_path: String,
    logout_path: String,
    refresh_path: String,
}

impl UrlHelper {
    /// Resolve `config` into a helper.
    ///
    /// # Errors
    ///
    /// Returns [`HostAuthError::InvalidBaseAddress`] if `server_url` is not an
    /// absolute URL that can carry a path.
    pub fn new(config: UrlHelperConfig) -> Result<Self, HostAuthError> {
        let server_url = parse_base_address(&config.server_url)?;
        tracing::debug!(%server_url, client_id = %config.client_id, "url helper configured");

        Ok(Self {
            server_url,
            client_id: config.client_id,
            redirect_uri: config.redirect_uri,
            profile_path: config
                .profile_path
                .unwrap_or_else(|| DEFAULT_PROFILE_PATH.to_string()),
            login_path: config
                .login_path
                .unwrap_or_else(|| DEFAULT_LOGIN_PATH.to_string()),
            register_path: config
                .register_path
                .unwrap_or_else(|| DEFAULT_REGISTER_PATH.to_string()),
            logout_path: config
                .logout_path
                .unwrap_or_else(|| DEFAULT_LOGOUT_PATH.to_string()),
            refresh_path: config
                .refresh_path
                .unwrap_or_else(|| DEFAULT_REFRESH_PATH.to_string()),
        })
    }

    /// Convenience constructor that picks the endpoint fields off an `SdkConfig`.
    ///
    /// # Errors
    ///
    /// Same as [`UrlHelper::new`].
    pub fn from_sdk_config(config: &SdkConfig) -> Result<Self, HostAuthError> {
        Self::new(UrlHelperConfig::from(config))
    }

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub fn profile_path(&self) -> &str {
        &self.profile_path
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn register_path(&self) -> &str {
        &self.register_path
    }

    pub fn logout_path(&self) -> &str {
        &self.logout_path
    }

    pub fn refresh_path(&self) -> &str {
        &self.refresh_path
    }

    /// URL of the `me` endpoint. Carries no query parameters.
    pub fn profile_url(&self) -> Url {
        self.generate_url(&self.profile_path)
    }

    pub fn login_url(&self, state: Option<&str>) -> Url {
        self.generate_url_with_query(
            &self.login_path,
            &[
                ("client_id", Some(self.client_id.as_str())),
                ("redirect_uri", Some(self.redirect_uri.as_str())),
                ("state", state),
            ],
        )
    }

    pub fn register_url(&self, state: Option<&str>) -> Url {
        self.generate_url_with_query(
            &self.register_path,
            &[
                ("client_id", Some(self.client_id.as_str())),
                ("redirect_uri", Some(self.redirect_uri.as_str())),
                ("state", state),
            ],
        )
    }

    pub fn logout_url(&self) -> Url {
        self.generate_url_with_query(
            &self.logout_path,
            &[
                ("client_id", Some(self.client_id.as_str())),
                ("post_logout_redirect_uri", Some(self.redirect_uri.as_str())),
            ],
        )
    }

    pub fn refresh_url(&self) -> Url {
        self.generate_url_with_query(
            &self.refresh_path,
            &[("client_id", Some(self.client_id.as_str()))],
        )
    }

    /// Base address with `path` swapped in. The base address query is left untouched.
    fn generate_url(&self, path: &str) -> Url {
        let mut url = self.server_url.clone();
        url.set_path(path);
        url
    }

    fn generate_url_with_query(&self, path: &str, params: &QueryParams<'_>) -> Url {
        let mut url = self.generate_url(path);
        let query = encode_query(params);
        url.set_query((!query.is_empty()).then_some(query.as_str()));
        url
    }
}

/// Form-encode `params` in order, dropping entries that are `None` or empty.
fn encode_query(params: &QueryParams<'_>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for &(key, value) in params {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            serializer.append_pair(key, value);
        }
    }
    serializer.finish()
}

fn parse_base_address(address: &str) -> Result<Url, HostAuthError> {
    let url = Url::parse(address).map_err(|e| HostAuthError::InvalidBaseAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })?;

    if url.cannot_be_a_base() {
        return Err(HostAuthError::InvalidBaseAddress {
            address: address.to_string(),
            reason: "URL cannot carry a path".to_string(),
        });
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> UrlHelperConfig {
        UrlHelperConfig {
            server_url: "https://auth.example.com".to_string(),
            client_id: "abc123".to_string(),
            redirect_uri: "https://app.example.com/cb".to_string(),
            ..Default::default()
        }
    }

    fn helper() -> UrlHelper {
        UrlHelper::new(config()).unwrap()
    }

    #[test]
    fn defaults_applied_at_construction() {
        let h = helper();
        assert_eq!(h.profile_path(), "/app/me");
        assert_eq!(h.login_path(), "/app/login");
        assert_eq!(h.register_path(), "/app/register");
        assert_eq!(h.logout_path(), "/app/logout");
        assert_eq!(h.refresh_path(), "/app/refresh");
        assert_eq!(h.client_id(), "abc123");
        assert_eq!(h.redirect_uri(), "https://app.example.com/cb");
    }

    #[test]
    fn login_url_without_state() {
        assert_eq!(
            helper().login_url(None).as_str(),
            "https://auth.example.com/app/login?client_id=abc123&redirect_uri=https%3A%2F%2Fapp.example.com%2Fcb"
        );
    }

    #[test]
    fn login_url_with_state() {
        assert_eq!(
            helper().login_url(Some("xyz")).as_str(),
            "https://auth.example.com/app/login?client_id=abc123&redirect_uri=https%3A%2F%2Fapp.example.com%2Fcb&state=xyz"
        );
    }

    #[test]
    fn empty_state_is_dropped() {
        let h = helper();
        assert_eq!(h.login_url(Some("")), h.login_url(None));
        assert_eq!(h.register_url(Some("")), h.register_url(None));
        assert!(!h.login_url(Some("")).as_str().contains("state="));
    }

    #[test]
    fn zero_state_is_kept() {
        assert!(helper().login_url(Some("0")).as_str().ends_with("&state=0"));
    }

    #[test]
    fn state_is_form_encoded() {
        let url = helper().register_url(Some("a b&c"));
        assert!(url.as_str().ends_with("&state=a+b%26c"));
        let state = url
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned());
        assert_eq!(state.as_deref(), Some("a b&c"));
    }

    #[test]
    fn register_url_uses_register_path() {
        assert_eq!(
            helper().register_url(Some("xyz")).as_str(),
            "https://auth.example.com/app/register?client_id=abc123&redirect_uri=https%3A%2F%2Fapp.example.com%2Fcb&state=xyz"
        );
    }

    #[test]
    fn logout_url() {
        assert_eq!(
            helper().logout_url().as_str(),
            "https://auth.example.com/app/logout?client_id=abc123&post_logout_redirect_uri=https%3A%2F%2Fapp.example.com%2Fcb"
        );
    }

    #[test]
    fn refresh_url() {
        assert_eq!(
            helper().refresh_url().as_str(),
            "https://auth.example.com/app/refresh?client_id=abc123"
        );
    }

    #[test]
    fn profile_url_has_no_query() {
        let url = helper().profile_url();
        assert_eq!(url.as_str(), "https://auth.example.com/app/me");
        assert!(url.query().is_none());
    }

    #[test]
    fn all_params_empty_leaves_no_query() {
        let h = UrlHelper::new(UrlHelperConfig {
            client_id: String::new(),
            ..config()
        })
        .unwrap();
        assert_eq!(h.refresh_url().as_str(), "https://auth.example.com/app/refresh");
        assert!(h.refresh_url().query().is_none());
    }

    #[test]
    fn custom_login_path_only_affects_login() {
        let h = UrlHelper::new(UrlHelperConfig {
            login_path: Some("/custom/login".to_string()),
            ..config()
        })
        .unwrap();
        assert_eq!(h.login_url(None).path(), "/custom/login");
        assert_eq!(h.register_url(None).path(), "/app/register");
        assert_eq!(h.logout_url().path(), "/app/logout");
        assert_eq!(h.refresh_url().path(), "/app/refresh");
        assert_eq!(h.profile_url().path(), "/app/me");
    }

    #[test]
    fn path_replaces_base_path() {
        let h = UrlHelper::new(UrlHelperConfig {
            server_url: "https://auth.example.com/tenant/ignored".to_string(),
            ..config()
        })
        .unwrap();
        assert_eq!(h.profile_url().as_str(), "https://auth.example.com/app/me");
    }

    #[test]
    fn every_url_keeps_the_server_origin() {
        let h = UrlHelper::new(UrlHelperConfig {
            server_url: "http://localhost:9011".to_string(),
            logout_path: Some("elsewhere/logout".to_string()),
            ..config()
        })
        .unwrap();
        let origin = h.server_url().origin();
        for url in [
            h.profile_url(),
            h.login_url(Some("s")),
            h.register_url(None),
            h.logout_url(),
            h.refresh_url(),
        ] {
            assert_eq!(url.origin(), origin, "{url}");
        }
        assert_eq!(h.logout_url().path(), "/elsewhere/logout");
    }

    #[test]
    fn relative_server_url_is_rejected() {
        let err = UrlHelper::new(UrlHelperConfig {
            server_url: "not-a-url".to_string(),
            ..config()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            HostAuthError::InvalidBaseAddress { ref address, .. } if address == "not-a-url"
        ));
    }

    #[test]
    fn cannot_be_a_base_server_url_is_rejected() {
        let err = UrlHelper::new(UrlHelperConfig {
            server_url: "mailto:admin@example.com".to_string(),
            ..config()
        })
        .unwrap_err();
        assert!(matches!(err, HostAuthError::InvalidBaseAddress { .. }));
    }

    #[test]
    fn projected_from_sdk_config() {
        let sdk = SdkConfig {
            server_url: "https://auth.example.com".to_string(),
            client_id: "abc123".to_string(),
            redirect_uri: "https://app.example.com/cb".to_string(),
            refresh_path: Some("/custom/refresh".to_string()),
            should_auto_refresh: true,
            ..Default::default()
        };
        let h = UrlHelper::from_sdk_config(&sdk).unwrap();
        assert_eq!(
            h.refresh_url().as_str(),
            "https://auth.example.com/custom/refresh?client_id=abc123"
        );
        assert_eq!(h.profile_path(), DEFAULT_PROFILE_PATH);
    }
}
