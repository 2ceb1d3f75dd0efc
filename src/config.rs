//! Backend credentials and transport configuration.
//!
//! The dispatcher never owns credentials. It holds a [`CredentialsProvider`]
//! and asks it on every call, so a key rotated at the source is used by the
//! next call without rebuilding anything.

use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;

pub const DEFAULT_URL_VAR: &str = "SUPABASE_URL";
pub const DEFAULT_KEY_VAR: &str = "SUPABASE_ANON_KEY";

/// Backend target: project base URL and API key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub base_url: String,
    pub api_key: String,
}

impl Credentials {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Both fields present and non-blank.
    pub fn is_complete(&self) -> bool {
        !self.base_url.trim().is_empty() && !self.api_key.trim().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Source of backend credentials, read once per dispatched call.
pub trait CredentialsProvider: Send + Sync {
    /// Current credentials, or `None` when the deployment has none.
    fn credentials(&self) -> Option<Arc<Credentials>>;
}

/// In-process credentials that can be replaced atomically at runtime.
#[derive(Default)]
pub struct SharedCredentials {
    current: ArcSwapOption<Credentials>,
}

impl SharedCredentials {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            current: ArcSwapOption::from_pointee(credentials),
        }
    }

    /// No credentials at all; every call short-circuits as unconfigured.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace the credentials seen by subsequent calls.
    pub fn store(&self, credentials: Credentials) {
        self.current.store(Some(Arc::new(credentials)));
    }

    pub fn clear(&self) {
        self.current.store(None);
    }
}

impl CredentialsProvider for SharedCredentials {
    fn credentials(&self) -> Option<Arc<Credentials>> {
        self.current.load_full()
    }
}

/// Credentials read from environment variables on every call.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    url_var: String,
    key_var: String,
}

impl EnvCredentials {
    /// `SUPABASE_URL` / `SUPABASE_ANON_KEY`.
    pub fn supabase() -> Self {
        Self::with_vars(DEFAULT_URL_VAR, DEFAULT_KEY_VAR)
    }

    pub fn with_vars(url_var: impl Into<String>, key_var: impl Into<String>) -> Self {
        Self {
            url_var: url_var.into(),
            key_var: key_var.into(),
        }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::supabase()
    }
}

impl CredentialsProvider for EnvCredentials {
    fn credentials(&self) -> Option<Arc<Credentials>> {
        let base_url = env::var(&self.url_var).ok()?;
        let api_key = env::var(&self.key_var).ok()?;
        Some(Arc::new(Credentials::new(base_url, api_key)))
    }
}

/// HTTP client knobs. Every request is bounded by `timeout`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
}

impl TransportConfig {
    pub const MIN_TIMEOUT: Duration = Duration::from_secs(1);

    /// Defaults, overridable via:
    /// - `VOICE_DISPATCH_HTTP_TIMEOUT_SECS` (default 15)
    /// - `VOICE_DISPATCH_CONNECT_TIMEOUT_SECS` (default 5)
    pub fn from_env() -> Self {
        let secs = |var: &str| env::var(var).ok().and_then(|s| s.parse::<u64>().ok());
        let defaults = Self::default();
        Self {
            timeout: secs("VOICE_DISPATCH_HTTP_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            connect_timeout: secs("VOICE_DISPATCH_CONNECT_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            ..defaults
        }
        .bounded()
    }

    /// Clamp timeouts so a hung backend can never stall a turn forever
    /// and a zero value never disables the bound.
    pub fn bounded(mut self) -> Self {
        self.timeout = self.timeout.max(Self::MIN_TIMEOUT);
        self.connect_timeout = self.connect_timeout.max(Self::MIN_TIMEOUT).min(self.timeout);
        self
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            connect_timeout: Duration::from_secs(5),
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}
