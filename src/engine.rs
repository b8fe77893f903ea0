//! The fetch engine: dispatcher, worker pool, and run lifecycle.
//!
//! One dispatcher task pulls URLs from the producer stream into a bounded
//! queue; a fixed pool of worker tasks drains the queue, each processing
//! one URL end-to-end (build, send, handle, route failures). A
//! `CancellationToken` stops the dispatcher before its next placement and
//! every worker after its in-flight URL.

use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::{pin_mut, Stream, StreamExt};
use log::{debug, warn};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::config::{Config, DEFAULT_WORKER_COUNT, QUEUE_DEPTH_FACTOR};
use crate::error::{EngineError, FetchError, RunError};
use crate::handlers::{ErrorHandler, NoopErrorHandler, ResponseHandler, StatusPrinter};
use crate::identity::Identity;
use crate::pipeline::{apply_browser_headers, DefaultRequestBuilder, RequestBuilder};
use crate::redirect::{into_reqwest_policy, MaxHops, RedirectPolicy};

/// Everything a worker needs; read-only after engine construction, so it is
/// shared without locking.
struct Shared {
    client: reqwest::Client,
    identity: Identity,
    request_builder: Arc<dyn RequestBuilder>,
    response_handler: Arc<dyn ResponseHandler>,
    error_handler: Arc<dyn ErrorHandler>,
}

/// A bounded-concurrency HTTP fetch engine.
///
/// Constructed once per session: the browser identity is resolved (at most
/// one external lookup) and the transport is configured with the redirect
/// policy. [`run`](Engine::run) may be called repeatedly; each call creates
/// a fresh dispatcher and worker set over the same identity and transport.
pub struct Engine {
    shared: Arc<Shared>,
    worker_count: usize,
}

impl Engine {
    /// Builds an engine from `config`, filling in defaults for every unset
    /// field.
    ///
    /// When no client is supplied, the engine builds one with the redirect
    /// policy installed and with TLS certificate verification disabled.
    /// The bypass is deliberate: this engine targets hostile and
    /// misconfigured hosts whose responses are still worth delivering.
    /// Supply [`Config::client`] to opt back into verification; a supplied
    /// client is used as-is and the configured redirect policy does not
    /// apply to it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::HttpClient`] if the engine-built client
    /// cannot be constructed.
    pub async fn new(config: Config) -> Result<Engine, EngineError> {
        let worker_count = if config.worker_count == 0 {
            DEFAULT_WORKER_COUNT
        } else {
            config.worker_count
        };

        let redirect_policy: Arc<dyn RedirectPolicy> = config
            .redirect_policy
            .unwrap_or_else(|| Arc::new(MaxHops::default()));

        let client = match config.client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .redirect(into_reqwest_policy(redirect_policy))
                .danger_accept_invalid_certs(true)
                .build()?,
        };

        let identity = Identity::resolve(config.user_agent.as_deref()).await;
        debug!("Resolved engine identity: {}", identity.user_agent);

        let shared = Arc::new(Shared {
            client,
            identity,
            request_builder: config
                .request_builder
                .unwrap_or_else(|| Arc::new(DefaultRequestBuilder)),
            response_handler: config
                .response_handler
                .unwrap_or_else(|| Arc::new(StatusPrinter)),
            error_handler: config
                .error_handler
                .unwrap_or_else(|| Arc::new(NoopErrorHandler)),
        });

        Ok(Engine {
            shared,
            worker_count,
        })
    }

    /// The User-Agent every request from this engine carries.
    pub fn user_agent(&self) -> &str {
        &self.shared.identity.user_agent
    }

    /// The derived `Sec-Ch-Ua` client-hint value.
    pub fn sec_ch_ua(&self) -> &str {
        &self.shared.identity.sec_ch_ua
    }

    /// Fetches every URL yielded by `urls` across the worker pool.
    ///
    /// The source is consumed exactly once and may be infinite. The
    /// dispatcher feeds a queue of depth `2 × worker_count`; a full queue
    /// is the only backpressure. Delivery order across URLs is unspecified
    /// once more than one worker is running; within one URL, build, send,
    /// handle, and error routing happen strictly in that order.
    ///
    /// Cancelling `cancel` stops the dispatcher before its next placement
    /// and each worker after its in-flight URL completes.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Cancelled`] if and only if the token fired
    /// before the source was exhausted. Per-URL failures are routed to the
    /// error handler and never surface here.
    pub async fn run<S>(&self, urls: S, cancel: CancellationToken) -> Result<(), RunError>
    where
        S: Stream<Item = String> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<String>(self.worker_count * QUEUE_DEPTH_FACTOR);
        let rx = Arc::new(Mutex::new(rx));

        let mut workers = FuturesUnordered::new();
        for id in 0..self.worker_count {
            workers.push(tokio::spawn(worker_loop(
                id,
                Arc::clone(&self.shared),
                Arc::clone(&rx),
                cancel.clone(),
            )));
        }

        let dispatcher = tokio::spawn(dispatch(urls, tx, cancel.clone()));

        while let Some(joined) = workers.next().await {
            if let Err(e) = joined {
                warn!("Worker task panicked: {e}");
            }
        }
        if let Err(e) = dispatcher.await {
            warn!("Dispatcher task panicked: {e}");
        }

        if cancel.is_cancelled() {
            Err(RunError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Pulls URLs from the source and feeds the bounded queue.
///
/// Cancellation is checked before every placement; once observed, the
/// pending item is dropped and no further URLs are pulled. The pull
/// itself also races the token: a producer that stalls forever cannot
/// keep a cancelled run alive. Dropping the sender on exit closes the
/// queue, which is the only termination signal workers rely on.
async fn dispatch<S>(urls: S, tx: mpsc::Sender<String>, cancel: CancellationToken)
where
    S: Stream<Item = String> + Send + 'static,
{
    pin_mut!(urls);
    loop {
        if cancel.is_cancelled() {
            debug!("Dispatcher observed cancellation, closing the queue");
            break;
        }
        let next = tokio::select! {
            _ = cancel.cancelled() => break,
            url = urls.next() => url,
        };
        let Some(url) = next else {
            break;
        };
        tokio::select! {
            _ = cancel.cancelled() => break,
            sent = tx.send(url) => {
                if sent.is_err() {
                    // Every worker is gone; nothing left to feed.
                    break;
                }
            }
        }
    }
}

/// Receives URLs one at a time until the queue closes or cancellation is
/// observed, whichever comes first.
async fn worker_loop(
    id: usize,
    shared: Arc<Shared>,
    rx: Arc<Mutex<mpsc::Receiver<String>>>,
    cancel: CancellationToken,
) {
    loop {
        // The lock is held only while waiting for the next URL, never
        // across a network call.
        let next = {
            let mut rx = rx.lock().await;
            tokio::select! {
                _ = cancel.cancelled() => None,
                url = rx.recv() => url,
            }
        };
        let Some(url) = next else {
            break;
        };
        process_url(&shared, &url).await;
    }
    debug!("Worker {id} exited");
}

/// Processes one URL end-to-end: build, inject headers, send, handle.
///
/// Every failure class here is non-fatal: it is reported to the error
/// handler and the worker moves on to the next URL.
async fn process_url(shared: &Shared, url: &str) {
    let mut request = match shared.request_builder.build(url).await {
        Ok(request) => request,
        Err(e) => {
            shared.error_handler.handle(url, &FetchError::Build(e));
            return;
        }
    };

    if let Err(e) = apply_browser_headers(&mut request, &shared.identity) {
        shared.error_handler.handle(url, &FetchError::Build(e));
        return;
    }

    let response = match shared.client.execute(request).await {
        Ok(response) => response,
        Err(e) => {
            shared.error_handler.handle(url, &FetchError::Transport(e));
            return;
        }
    };

    // The handler consumes the response; the body is released when it
    // returns regardless of outcome.
    if let Err(e) = shared.response_handler.handle(url, response).await {
        shared.error_handler.handle(url, &FetchError::Handler(e));
    }
}
