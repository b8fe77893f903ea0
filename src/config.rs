//! Engine configuration and crate-wide defaults.
//!
//! `Config` is a plain record: every pluggable field is optional, and the
//! defaults are filled in once at [`Engine::new`](crate::Engine::new). There
//! is no process-wide mutable state.

use std::sync::Arc;
use std::time::Duration;

use crate::handlers::{ErrorHandler, ResponseHandler};
use crate::pipeline::RequestBuilder;
use crate::redirect::RedirectPolicy;

/// Default number of parallel workers.
pub const DEFAULT_WORKER_COUNT: usize = 10;

/// Queue capacity multiplier: the dispatcher may run at most this many URLs
/// per worker ahead of the pool. The bounded queue is the sole backpressure
/// mechanism.
pub const QUEUE_DEPTH_FACTOR: usize = 2;

/// Maximum redirect hops allowed by the default redirect policy.
pub const DEFAULT_MAX_REDIRECTS: usize = 3;

/// Timeout for the one-shot user-agent lookup at engine construction.
pub const UA_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Endpoint serving the latest browser user-agent as plain text.
pub const UA_ENDPOINT: &str = "https://api.sansec.io/v1/useragent/latest";

/// Fallback User-Agent used when no explicit value is configured and the
/// identity lookup fails.
///
/// Mimics a current Chrome on macOS. Update the version periodically to keep
/// the impersonation plausible.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/144.0.0.0 Safari/537.36";

/// Fallback Chrome major version for the `Sec-Ch-Ua` derivation when the
/// user-agent carries no `Chrome/<n>.` token.
pub const FALLBACK_CHROME_MAJOR: &str = "144";

/// Configuration for [`Engine`](crate::Engine) construction.
///
/// Immutable after construction: the engine fills in defaults for every
/// unset field and never mutates the record afterwards.
#[derive(Clone, Default)]
pub struct Config {
    /// Number of parallel workers. `0` selects [`DEFAULT_WORKER_COUNT`].
    pub worker_count: usize,

    /// Builds the request for each URL. `None` selects
    /// [`DefaultRequestBuilder`](crate::DefaultRequestBuilder) (a plain GET).
    pub request_builder: Option<Arc<dyn RequestBuilder>>,

    /// Receives each delivered response. `None` selects
    /// [`StatusPrinter`](crate::StatusPrinter).
    pub response_handler: Option<Arc<dyn ResponseHandler>>,

    /// Receives every non-fatal per-URL failure. `None` selects
    /// [`NoopErrorHandler`](crate::NoopErrorHandler), which discards them.
    pub error_handler: Option<Arc<dyn ErrorHandler>>,

    /// Explicit User-Agent. `None` (or an empty string) triggers the
    /// one-shot identity lookup at engine construction.
    pub user_agent: Option<String>,

    /// Redirect policy installed on the engine-built client. `None` selects
    /// [`MaxHops`](crate::MaxHops) with [`DEFAULT_MAX_REDIRECTS`].
    pub redirect_policy: Option<Arc<dyn RedirectPolicy>>,

    /// Caller-supplied HTTP client, used as-is. When `None`, the engine
    /// builds its own client with the redirect policy installed and TLS
    /// certificate verification disabled (see the crate-level docs).
    pub client: Option<reqwest::Client>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_leaves_everything_unset() {
        let config = Config::default();
        assert_eq!(config.worker_count, 0);
        assert!(config.request_builder.is_none());
        assert!(config.response_handler.is_none());
        assert!(config.error_handler.is_none());
        assert!(config.user_agent.is_none());
        assert!(config.redirect_policy.is_none());
        assert!(config.client.is_none());
    }

    #[test]
    fn test_fallback_user_agent_contains_chrome_token() {
        assert!(DEFAULT_USER_AGENT.contains("Chrome/"));
        assert!(DEFAULT_USER_AGENT.contains(FALLBACK_CHROME_MAJOR));
    }
}
