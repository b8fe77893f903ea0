//! Browser identity resolution.
//!
//! Resolves the User-Agent an engine instance presents (explicit value, or
//! one best-effort network lookup with a hardcoded fallback) and derives the
//! `Sec-Ch-Ua` client-hint header from it. Resolution happens once per
//! engine construction, never per request.

use std::sync::OnceLock;

use regex::Regex;

use crate::config::{DEFAULT_USER_AGENT, FALLBACK_CHROME_MAJOR, UA_ENDPOINT, UA_FETCH_TIMEOUT};

/// The resolved browser identity shared read-only by every worker.
#[derive(Debug, Clone)]
pub struct Identity {
    /// The User-Agent applied unconditionally to every outgoing request.
    pub user_agent: String,
    /// The `Sec-Ch-Ua` client-hint value derived from `user_agent`.
    pub sec_ch_ua: String,
}

impl Identity {
    /// Resolves the identity for one engine instance.
    ///
    /// A non-empty explicit user-agent is used unchanged and no network call
    /// occurs. Otherwise one lookup is attempted against [`UA_ENDPOINT`]
    /// (bounded by [`UA_FETCH_TIMEOUT`]); on any failure the hardcoded
    /// [`DEFAULT_USER_AGENT`] is used instead.
    pub async fn resolve(explicit: Option<&str>) -> Identity {
        let user_agent = match explicit {
            Some(ua) if !ua.is_empty() => ua.to_string(),
            _ => fetch_user_agent().await,
        };
        let sec_ch_ua = generate_sec_ch_ua(&user_agent);
        Identity {
            user_agent,
            sec_ch_ua,
        }
    }
}

/// Fetches the latest user-agent from the identity endpoint, falling back to
/// [`DEFAULT_USER_AGENT`] on any failure.
async fn fetch_user_agent() -> String {
    match try_fetch_user_agent().await {
        Ok(ua) => {
            log::debug!("Fetched user-agent from {}: {}", UA_ENDPOINT, ua);
            ua
        }
        Err(e) => {
            log::debug!("User-agent lookup failed ({e}), using fallback");
            DEFAULT_USER_AGENT.to_string()
        }
    }
}

async fn try_fetch_user_agent() -> Result<String, anyhow::Error> {
    let client = reqwest::Client::builder()
        .timeout(UA_FETCH_TIMEOUT)
        .build()?;

    let response = client.get(UA_ENDPOINT).send().await?;
    if !response.status().is_success() {
        return Err(anyhow::anyhow!("HTTP {}", response.status()));
    }

    let body = response.text().await?;
    let ua = body.trim();
    if ua.is_empty() {
        return Err(anyhow::anyhow!("empty response body"));
    }
    // A user-agent we cannot place in a header is useless to us.
    if reqwest::header::HeaderValue::from_str(ua).is_err() {
        return Err(anyhow::anyhow!("response is not a valid header value"));
    }

    Ok(ua.to_string())
}

fn chrome_major_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Chrome/(\d+)\.").expect("hardcoded regex is valid"))
}

/// Extracts the Chrome major version from a user-agent string.
///
/// `Chrome/144.0.0.0` yields `144`; a string without a `Chrome/<n>.` token
/// yields [`FALLBACK_CHROME_MAJOR`].
fn extract_chrome_major(user_agent: &str) -> &str {
    chrome_major_re()
        .captures(user_agent)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(FALLBACK_CHROME_MAJOR)
}

/// Derives the `Sec-Ch-Ua` client-hint value from a user-agent string.
///
/// Pure and deterministic: the same user-agent always yields the same
/// header value.
pub fn generate_sec_ch_ua(user_agent: &str) -> String {
    let major = extract_chrome_major(user_agent);
    format!(r#""Chromium";v="{major}", "Google Chrome";v="{major}", "Not_A Brand";v="99""#)
}
