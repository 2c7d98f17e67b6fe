// Runtime settings. Nothing is read from disk; the two environment
// variables only exist to point the client at another endpoint.

use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.zenfolio.com/api/1.8/zfapi.asmx";

/// Video files can be large, so the timeout covers a whole upload.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Client settings. A plain run uses the defaults; `ZENFOLIO_API_URL` and
/// `ZENFOLIO_USER_AGENT` are optional overrides meant for testing only,
/// e.g. to point the client at a local stand-in for the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_url: DEFAULT_API_URL.into(),
            user_agent: default_user_agent(),
            timeout: REQUEST_TIMEOUT,
        }
    }
}

impl Settings {
    /// Apply the optional test overrides from the environment. Unset or
    /// blank variables leave the public endpoint and the crate's own agent
    /// string in place.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Settings::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Settings {
            api_url: non_empty("ZENFOLIO_API_URL").unwrap_or(defaults.api_url),
            user_agent: non_empty("ZENFOLIO_USER_AGENT").unwrap_or(defaults.user_agent),
            timeout: defaults.timeout,
        }
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
