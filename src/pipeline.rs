//! Request construction and browser-header injection.
//!
//! The pipeline obtains a request from the configured builder, then
//! overwrites `User-Agent` with the engine identity and fills in a fixed
//! set of browser-realistic headers wherever the builder left them unset.

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Method, Request, Url};

use crate::identity::Identity;

/// Builds the HTTP request for one URL.
///
/// A build failure is reported to the configured
/// [`ErrorHandler`](crate::ErrorHandler) with the original URL string, and
/// processing of that URL stops immediately; nothing is sent.
#[async_trait]
pub trait RequestBuilder: Send + Sync {
    /// Produces the request to send for `url`.
    async fn build(&self, url: &str) -> anyhow::Result<Request>;
}

/// The stock builder: a plain GET with no body.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRequestBuilder;

#[async_trait]
impl RequestBuilder for DefaultRequestBuilder {
    async fn build(&self, url: &str) -> anyhow::Result<Request> {
        let url = Url::parse(url)?;
        Ok(Request::new(Method::GET, url))
    }
}

/// Browser-realistic headers injected only when the builder left them unset.
///
/// `User-Agent` is handled separately (always overwritten) and `Sec-Ch-Ua`
/// is derived per engine instance, so neither appears in this list.
const BROWSER_HEADERS: &[(&str, &str)] = &[
    ("accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7"),
    ("accept-language", "en-GB,en-US;q=0.9,en;q=0.8,nl;q=0.7,sv;q=0.6"),
    ("cache-control", "no-cache"),
    ("pragma", "no-cache"),
    ("priority", "u=0, i"),
    ("referer", "https://www.google.com/"),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", "\"macOS\""),
    ("sec-fetch-dest", "document"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-site", "same-origin"),
    ("sec-fetch-user", "?1"),
    ("upgrade-insecure-requests", "1"),
];

/// Applies the engine identity and browser headers to a built request.
///
/// `User-Agent` is always overwritten with the resolved identity; builder
/// values for it are discarded. Every other header is filled in only if the
/// builder did not already set a non-empty value for that exact name.
pub(crate) fn apply_browser_headers(
    request: &mut Request,
    identity: &Identity,
) -> anyhow::Result<()> {
    let user_agent = HeaderValue::from_str(&identity.user_agent)?;
    request.headers_mut().insert(USER_AGENT, user_agent);

    set_if_absent(request, "sec-ch-ua", &identity.sec_ch_ua)?;
    for (name, value) in BROWSER_HEADERS {
        set_if_absent(request, name, value)?;
    }
    Ok(())
}

fn set_if_absent(request: &mut Request, name: &'static str, value: &str) -> anyhow::Result<()> {
    let name = HeaderName::from_static(name);
    let already_set = request
        .headers()
        .get(&name)
        .is_some_and(|v| !v.is_empty());
    if !already_set {
        request
            .headers_mut()
            .insert(name, HeaderValue::from_str(value)?);
    }
    Ok(())
}
