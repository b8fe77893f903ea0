//! Redirect policies.
//!
//! A policy is consulted by the transport before every redirect hop and may
//! veto further hops. A veto is not an error: the transport stops following
//! and the last received response is delivered to the worker as-is.

use std::sync::Arc;

use psl::Psl;
use reqwest::redirect::Policy;
use url::Url;

use crate::config::DEFAULT_MAX_REDIRECTS;

/// Outcome of consulting a [`RedirectPolicy`] for one pending hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectDecision {
    /// Take the hop.
    Follow,
    /// Stop following; the last received response is delivered unchanged.
    Stop,
}

/// Decides whether to follow a pending redirect hop.
///
/// `next` is the URL the transport is about to request; `via` is the
/// ordered chain of prior requests for this logical fetch, starting with
/// the original request. The chain grows by exactly one per hop.
pub trait RedirectPolicy: Send + Sync {
    /// Evaluates one pending hop. Must be pure: no state beyond `via`.
    fn evaluate(&self, next: &Url, via: &[Url]) -> RedirectDecision;
}

/// Allows up to a fixed number of redirect hops.
#[derive(Debug, Clone, Copy)]
pub struct MaxHops {
    limit: usize,
}

impl MaxHops {
    /// Creates a policy allowing at most `limit` hops.
    pub fn new(limit: usize) -> Self {
        MaxHops { limit }
    }
}

impl Default for MaxHops {
    fn default() -> Self {
        MaxHops::new(DEFAULT_MAX_REDIRECTS)
    }
}

impl RedirectPolicy for MaxHops {
    fn evaluate(&self, _next: &Url, via: &[Url]) -> RedirectDecision {
        if via.len() < self.limit {
            RedirectDecision::Follow
        } else {
            RedirectDecision::Stop
        }
    }
}

/// Hop cap for [`SameRegistrableDomain`].
const SAME_DOMAIN_MAX_HOPS: usize = 3;

/// Allows up to three hops, and only within the registrable domain of the
/// original request.
///
/// `example.com` and `www.example.com` share a registrable domain;
/// `example.com` and `other.com` do not. The comparison is anchored to the
/// first request in the chain, not the previous hop. A host without a
/// registrable domain (an IP address, or an unlisted suffix) vetoes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SameRegistrableDomain;

impl RedirectPolicy for SameRegistrableDomain {
    fn evaluate(&self, next: &Url, via: &[Url]) -> RedirectDecision {
        if via.len() >= SAME_DOMAIN_MAX_HOPS {
            return RedirectDecision::Stop;
        }
        let Some(first) = via.first() else {
            // Nothing to anchor against yet.
            return RedirectDecision::Follow;
        };
        match (registrable_domain(first), registrable_domain(next)) {
            (Some(origin), Some(current)) if origin == current => RedirectDecision::Follow,
            _ => RedirectDecision::Stop,
        }
    }
}

/// Extracts the registrable domain (eTLD+1) of a URL's host using the
/// Public Suffix List.
fn registrable_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let domain = psl::List.domain(host.as_bytes())?;
    Some(String::from_utf8_lossy(domain.as_bytes()).into_owned())
}

/// Adapts a [`RedirectPolicy`] into reqwest's redirect hook.
///
/// `Attempt::previous()` is exactly the prior-request chain the policy
/// contract expects; `Attempt::stop()` delivers the redirect response
/// as-is, which keeps vetoes out of the error path.
pub(crate) fn into_reqwest_policy(policy: Arc<dyn RedirectPolicy>) -> Policy {
    Policy::custom(move |attempt| {
        match policy.evaluate(attempt.url(), attempt.previous()) {
            RedirectDecision::Follow => attempt.follow(),
            RedirectDecision::Stop => attempt.stop(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(hosts: &[&str]) -> Vec<Url> {
        hosts
            .iter()
            .map(|h| Url::parse(&format!("https://{h}/")).unwrap())
            .collect()
    }

    #[test]
    fn test_max_hops_allows_below_limit() {
        let policy = MaxHops::new(3);
        let next = Url::parse("https://example.com/next").unwrap();
        let via = urls(&["example.com", "example.com"]);
        assert_eq!(policy.evaluate(&next, &via), RedirectDecision::Follow);
    }

    #[test]
    fn test_max_hops_vetoes_at_limit() {
        let policy = MaxHops::new(3);
        let next = Url::parse("https://example.com/next").unwrap();
        let via = urls(&["example.com", "example.com", "example.com"]);
        assert_eq!(policy.evaluate(&next, &via), RedirectDecision::Stop);
    }

    #[test]
    fn test_same_domain_allows_subdomain_hop() {
        let policy = SameRegistrableDomain;
        let next = Url::parse("https://www.example.com/").unwrap();
        let via = urls(&["example.com"]);
        assert_eq!(policy.evaluate(&next, &via), RedirectDecision::Follow);
    }

    #[test]
    fn test_same_domain_vetoes_cross_domain_hop() {
        let policy = SameRegistrableDomain;
        let next = Url::parse("https://other.com/").unwrap();
        let via = urls(&["example.com"]);
        assert_eq!(policy.evaluate(&next, &via), RedirectDecision::Stop);
    }

    #[test]
    fn test_same_domain_anchors_to_first_request() {
        // The anchor is the original request, not the previous hop.
        let policy = SameRegistrableDomain;
        let next = Url::parse("https://sub.other.com/").unwrap();
        let via = urls(&["example.com", "other.com"]);
        assert_eq!(policy.evaluate(&next, &via), RedirectDecision::Stop);
    }

    #[test]
    fn test_same_domain_vetoes_at_hop_cap_even_when_matching() {
        let policy = SameRegistrableDomain;
        let next = Url::parse("https://example.com/").unwrap();
        let via = urls(&["example.com", "a.example.com", "b.example.com"]);
        assert_eq!(policy.evaluate(&next, &via), RedirectDecision::Stop);
    }

    #[test]
    fn test_same_domain_vetoes_unparseable_host() {
        // IP addresses have no registrable domain.
        let policy = SameRegistrableDomain;
        let next = Url::parse("https://192.168.1.1/").unwrap();
        let via = urls(&["example.com"]);
        assert_eq!(policy.evaluate(&next, &via), RedirectDecision::Stop);
    }

    #[test]
    fn test_registrable_domain_handles_multi_part_suffix() {
        let url = Url::parse("https://www.example.co.uk/path").unwrap();
        assert_eq!(registrable_domain(&url), Some("example.co.uk".to_string()));
    }
}
