//! Client configuration: identity headers and endpoint table.
//!
//! Defaults match the production web client. Every field can be overridden
//! so tests can point at a local server and pin deterministic versions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://api.fixr-app.com/api/v2/app";
pub const DEFAULT_CARD_URL: &str = "https://api.stripe.com/v1/tokens";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/51.0.2704.103 Safari/537.36";
pub const DEFAULT_PLATFORM: &str = "web";
pub const DEFAULT_PLATFORM_VERSION: &str = "Chrome/51.0.2704.103";
pub const DEFAULT_APP_VERSION: &str = "1.34.0";

/// Where requests go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Base for every FIXR API path. A trailing slash is ignored.
    pub api_base: String,
    /// Card tokenization endpoint. Requests to it are form encoded.
    pub card_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            card_url: DEFAULT_CARD_URL.to_string(),
        }
    }
}

impl Endpoints {
    fn base(&self) -> &str {
        self.api_base.trim_end_matches('/')
    }

    pub fn login(&self) -> String {
        format!("{}/user/authenticate/with-email", self.base())
    }

    pub fn event(&self, id: u64) -> String {
        format!("{}/event/{id}", self.base())
    }

    pub fn promo(&self, ticket_id: u64, code: &str) -> String {
        format!("{}/promo_code/{ticket_id}/{code}", self.base())
    }

    pub fn booking(&self) -> String {
        format!("{}/booking", self.base())
    }

    pub fn me(&self) -> String {
        format!("{}/user/me", self.base())
    }

    pub fn stripe_token(&self) -> String {
        format!("{}/stripe", self.base())
    }
}

/// Values sent with every request, plus transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub user_agent: String,
    /// Sent as `FIXR-Platform`.
    pub platform: String,
    /// Sent as `FIXR-Platform-Version`.
    pub platform_version: String,
    /// Sent as `FIXR-App-Version`.
    pub app_version: String,
    /// Transport timeout in seconds.
    pub timeout_secs: u64,
    pub endpoints: Endpoints,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            platform: DEFAULT_PLATFORM.to_string(),
            platform_version: DEFAULT_PLATFORM_VERSION.to_string(),
            app_version: DEFAULT_APP_VERSION.to_string(),
            timeout_secs: 30,
            endpoints: Endpoints::default(),
        }
    }
}

impl ClientConfig {
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.endpoints.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_card_url(mut self, card_url: &str) -> Self {
        self.endpoints.card_url = card_url.to_string();
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn with_platform_version(mut self, platform_version: &str) -> Self {
        self.platform_version = platform_version.to_string();
        self
    }

    pub fn with_app_version(mut self, app_version: &str) -> Self {
        self.app_version = app_version.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
