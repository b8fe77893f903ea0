//! Error types for engine construction and per-URL processing.

use thiserror::Error;

/// Errors raised while constructing an [`Engine`](crate::Engine).
#[derive(Error, Debug)]
pub enum EngineError {
    /// The underlying HTTP client could not be built.
    #[error("HTTP client initialization error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Fatal outcome of one [`Engine::run`](crate::Engine::run) call.
///
/// Per-URL failures never surface here; they are routed to the configured
/// [`ErrorHandler`](crate::ErrorHandler) and the run continues. Cancellation
/// is the only fatal condition.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RunError {
    /// The caller's cancellation token fired before the URL source was
    /// exhausted.
    #[error("run cancelled before the URL source was exhausted")]
    Cancelled,
}

/// A failure processing one URL, routed to the
/// [`ErrorHandler`](crate::ErrorHandler).
///
/// All variants are non-fatal to the engine: the worker reports the failure
/// and moves on to the next URL. A redirect-policy veto is not an error and
/// never appears here; the last received response is delivered as-is.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request builder could not produce a request; nothing was sent
    /// for this URL.
    #[error("request build failed: {0}")]
    Build(#[source] anyhow::Error),

    /// DNS, connect, TLS, timeout, or protocol failure while sending.
    #[error("transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response handler reported a failure after a successful delivery.
    #[error("response handler failed: {0}")]
    Handler(#[source] anyhow::Error),
}
