//! Response and error sinks, and the stock adapters.
//!
//! The engine routes every delivered response to a [`ResponseHandler`] and
//! every non-fatal failure to an [`ErrorHandler`]. Handlers run on multiple
//! workers concurrently; implementations that mutate shared state are
//! responsible for their own synchronization.

use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Response;
use sha2::{Digest, Sha256};

use crate::error::FetchError;

/// Receives each successfully delivered response.
#[async_trait]
pub trait ResponseHandler: Send + Sync {
    /// Processes one delivered response.
    ///
    /// A returned error is routed to the [`ErrorHandler`]; it is neither
    /// retried nor re-raised. The response body is released when this method
    /// returns, whether or not it was consumed.
    async fn handle(&self, url: &str, response: Response) -> anyhow::Result<()>;
}

/// Receives every non-fatal per-URL failure.
pub trait ErrorHandler: Send + Sync {
    /// Reports one failure. Has no return value and cannot abort the run.
    fn handle(&self, url: &str, error: &FetchError);
}

/// Default response handler: prints `url -> status` to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusPrinter;

#[async_trait]
impl ResponseHandler for StatusPrinter {
    async fn handle(&self, url: &str, response: Response) -> anyhow::Result<()> {
        println!("{} -> {}", url, response.status());
        Ok(())
    }
}

/// Default error handler: silently discards every failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopErrorHandler;

impl ErrorHandler for NoopErrorHandler {
    fn handle(&self, _url: &str, _error: &FetchError) {}
}

/// Writes one formatted line per failure to standard error.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrErrorLogger;

impl ErrorHandler for StderrErrorLogger {
    fn handle(&self, url: &str, error: &FetchError) {
        eprintln!("ERROR: {url} -> {error}");
    }
}

/// Saves response bodies to `<dir>/<hostname>`.
///
/// One file per host, overwritten on revisit. The directory is created on
/// first use.
#[derive(Debug, Clone)]
pub struct HostBodySaver {
    dir: PathBuf,
}

impl HostBodySaver {
    /// Creates a saver rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        HostBodySaver { dir: dir.into() }
    }
}

#[async_trait]
impl ResponseHandler for HostBodySaver {
    async fn handle(&self, url: &str, response: Response) -> anyhow::Result<()> {
        let parsed =
            url::Url::parse(url).with_context(|| format!("failed to parse URL {url}"))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("URL '{url}' has no host component"))?
            .to_string();

        let status = response.status();
        let body = response.bytes().await?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create directory {}", self.dir.display()))?;
        let path = self.dir.join(&host);
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("failed to write response to {}", path.display()))?;

        println!("{} {}", status.as_u16(), host);
        Ok(())
    }
}

/// Saves response bodies to `<dir>/<first 8 bytes of sha256(url)>.html`.
///
/// Hash-derived names are stable across runs and safe for URLs whose host
/// or path would make a poor filename.
#[derive(Debug, Clone)]
pub struct HashedBodySaver {
    dir: PathBuf,
}

impl HashedBodySaver {
    /// Creates a saver rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        HashedBodySaver { dir: dir.into() }
    }

    fn filename_for(url: &str) -> String {
        let digest = Sha256::digest(url.as_bytes());
        format!("{}.html", hex::encode(&digest[..8]))
    }
}

#[async_trait]
impl ResponseHandler for HashedBodySaver {
    async fn handle(&self, url: &str, response: Response) -> anyhow::Result<()> {
        let status = response.status();
        let body = response.bytes().await?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create directory {}", self.dir.display()))?;
        let path = self.dir.join(Self::filename_for(url));
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("failed to write response to {}", path.display()))?;

        println!("{} -> {} (saved to {})", url, status, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashed_filename_is_deterministic() {
        let a = HashedBodySaver::filename_for("https://example.com");
        let b = HashedBodySaver::filename_for("https://example.com");
        assert_eq!(a, b);
        assert!(a.ends_with(".html"));
        // 8 bytes hex-encoded plus the extension
        assert_eq!(a.len(), 16 + ".html".len());
    }

    #[test]
    fn test_hashed_filename_differs_per_url() {
        let a = HashedBodySaver::filename_for("https://example.com");
        let b = HashedBodySaver::filename_for("https://example.org");
        assert_ne!(a, b);
    }

    #[test]
    fn test_noop_error_handler_accepts_all_classes() {
        let handler = NoopErrorHandler;
        handler.handle("https://example.com", &FetchError::Build(anyhow::anyhow!("x")));
        handler.handle(
            "https://example.com",
            &FetchError::Handler(anyhow::anyhow!("y")),
        );
    }
}
