//! fetchpool: a bounded-concurrency HTTP fetch engine.
//!
//! Given a lazily produced sequence of URLs, the engine dispatches requests
//! across a fixed pool of concurrent workers, applies browser-impersonation
//! headers and a configurable redirect policy, and routes each outcome to
//! pluggable response/error callbacks. It is a library primitive for site
//! checkers, bulk fetchers, and response archivers; there is no URL
//! deduplication, politeness scheduling, or crawl-state persistence.
//!
//! # Example
//!
//! ```no_run
//! use fetchpool::{Config, Engine};
//! use futures::stream;
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = Engine::new(Config {
//!     worker_count: 3,
//!     ..Config::default()
//! })
//! .await?;
//!
//! let urls = stream::iter(vec![
//!     "https://example.com".to_string(),
//!     "https://example.org".to_string(),
//! ]);
//! engine.run(urls, CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # TLS
//!
//! Engine-built clients accept invalid and self-signed certificates by
//! design: the engine is pointed at hostile and misconfigured hosts whose
//! responses are still worth delivering. Supply [`Config::client`] to opt
//! back into verification.

#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod handlers;
mod identity;
mod pipeline;
mod redirect;
mod source;

pub mod logging;

// Re-export public API
pub use config::{Config, DEFAULT_MAX_REDIRECTS, DEFAULT_USER_AGENT, DEFAULT_WORKER_COUNT};
pub use engine::Engine;
pub use error::{EngineError, FetchError, RunError};
pub use handlers::{
    ErrorHandler, HashedBodySaver, HostBodySaver, NoopErrorHandler, ResponseHandler,
    StatusPrinter, StderrErrorLogger,
};
pub use identity::{generate_sec_ch_ua, Identity};
pub use pipeline::{DefaultRequestBuilder, RequestBuilder};
pub use redirect::{MaxHops, RedirectDecision, RedirectPolicy, SameRegistrableDomain};
pub use source::file_urls;
