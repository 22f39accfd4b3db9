use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use hostauth_api::{
    HostAuthError, HostEnvironment, ProviderContext, SessionTransport, UnixSeconds, UserInfo,
};
use hostauth_core::{SdkConfig, UrlHelper};

#[derive(Debug, Default)]
struct ProviderState {
    user_info: Option<UserInfo>,
    fetching_user_info: bool,
    error: Option<String>,
    auto_refresh_armed: bool,
}

/// `ProviderContext` backed by a `UrlHelper`.
///
/// Network calls go through the `SessionTransport`, navigation and timers
/// through the `HostEnvironment`. The state lock is never held across either.
pub struct AuthProvider {
    urls: UrlHelper,
    should_auto_fetch_user_info: bool,
    should_auto_refresh: bool,
    refresh_before_expiry: Duration,
    transport: Arc<dyn SessionTransport>,
    host: Arc<dyn HostEnvironment>,
    state: RwLock<ProviderState>,
}

impl AuthProvider {
    /// # Errors
    ///
    /// Returns [`HostAuthError::InvalidBaseAddress`] if the configured server URL is unusable.
    pub fn new(
        config: &SdkConfig,
        transport: Arc<dyn SessionTransport>,
        host: Arc<dyn HostEnvironment>,
    ) -> Result<Self, HostAuthError> {
        Ok(Self {
            urls: UrlHelper::from_sdk_config(config)?,
            should_auto_fetch_user_info: config.should_auto_fetch_user_info,
            should_auto_refresh: config.should_auto_refresh,
            refresh_before_expiry: Duration::from_secs(config.auto_refresh_seconds_before_expiry),
            transport,
            host,
            state: RwLock::new(ProviderState::default()),
        })
    }

    pub fn urls(&self) -> &UrlHelper {
        &self.urls
    }

    /// Run the configured start-up behaviour: fetch the profile for an existing
    /// session and arm the automatic refresh.
    pub fn initialize(&self) {
        if self.should_auto_fetch_user_info && self.is_logged_in() {
            if let Err(e) = self.fetch_user_info() {
                tracing::debug!(error = %e, "initial user info fetch failed");
            }
        }
        if self.should_auto_refresh {
            self.init_auto_refresh();
        }
    }

    /// Delay until the next automatic refresh should fire, or `None` without a token.
    pub fn next_refresh_in(&self) -> Option<Duration> {
        let expires_at = self.transport.access_token_expires_at()?;
        let remaining = Duration::from_secs(expires_at.saturating_sub(now_secs()));
        Some(remaining.saturating_sub(self.refresh_before_expiry))
    }

    pub fn auto_refresh_armed(&self) -> bool {
        self.read_state().is_ok_and(|s| s.auto_refresh_armed)
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, ProviderState>, HostAuthError> {
        self.state
            .read()
            .map_err(|_| HostAuthError::Internal("provider state poisoned".to_string()))
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, ProviderState>, HostAuthError> {
        self.state
            .write()
            .map_err(|_| HostAuthError::Internal("provider state poisoned".to_string()))
    }

    fn update(&self, f: impl FnOnce(&mut ProviderState)) {
        match self.write_state() {
            Ok(mut guard) => f(&mut guard),
            Err(e) => tracing::warn!(error = %e, "provider state update skipped"),
        }
    }
}

impl ProviderContext for AuthProvider {
    fn is_logged_in(&self) -> bool {
        self.transport
            .access_token_expires_at()
            .is_some_and(|expires_at| expires_at > now_secs())
    }

    fn user_info(&self) -> Option<UserInfo> {
        self.read_state().ok().and_then(|s| s.user_info.clone())
    }

    fn fetch_user_info(&self) -> Result<Option<UserInfo>, HostAuthError> {
        {
            let mut guard = self.write_state()?;
            guard.fetching_user_info = true;
            guard.error = None;
        }

        let url = self.urls.profile_url();
        let result = self.transport.fetch_user_info(&url);

        let mut guard = self.write_state()?;
        guard.fetching_user_info = false;
        match result {
            Ok(info) => {
                tracing::debug!(%url, sub = ?info.sub, "fetched user info");
                guard.user_info = Some(info.clone());
                Ok(Some(info))
            }
            Err(e) => {
                tracing::warn!(error = %e, %url, "failed to fetch user info");
                guard.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn is_fetching_user_info(&self) -> bool {
        self.read_state().is_ok_and(|s| s.fetching_user_info)
    }

    fn error(&self) -> Option<String> {
        self.read_state().ok().and_then(|s| s.error.clone())
    }

    fn start_login(&self, state: Option<&str>) {
        let url = self.urls.login_url(state);
        tracing::debug!(%url, "starting login");
        self.host.navigate(&url);
    }

    fn start_register(&self, state: Option<&str>) {
        let url = self.urls.register_url(state);
        tracing::debug!(%url, "starting registration");
        self.host.navigate(&url);
    }

    fn start_logout(&self) {
        self.update(|s| s.user_info = None);
        let url = self.urls.logout_url();
        tracing::debug!(%url, "starting logout");
        self.host.navigate(&url);
    }

    fn refresh_token(&self) -> Result<(), HostAuthError> {
        let url = self.urls.refresh_url();
        self.transport.refresh_token(&url).inspect_err(|e| {
            tracing::warn!(error = %e, %url, "token refresh failed");
        })
    }

    /// Schedules a single refresh ahead of the current token's expiry. The host
    /// is expected to call `refresh_token` and then this method again when it fires.
    fn init_auto_refresh(&self) {
        let Some(delay) = self.next_refresh_in() else {
            tracing::debug!("no access token, auto refresh not armed");
            return;
        };
        tracing::debug!(delay_secs = delay.as_secs(), "scheduling token refresh");
        self.host.schedule_refresh(delay);
        self.update(|s| s.auto_refresh_armed = true);
    }
}

fn now_secs() -> UnixSeconds {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}
