//! Response header policies.
//!
//! Each policy looks at the request's [`PathClass`] and the environment and
//! returns the headers it wants set. Policies cannot reject or redirect a
//! request; the worst they can do is fail, which the pipeline treats as
//! "contribute nothing".

use axum::http::header::{
    InvalidHeaderValue, CACHE_CONTROL, LINK, X_CONTENT_TYPE_OPTIONS, X_DNS_PREFETCH_CONTROL,
};
use axum::http::{HeaderName, HeaderValue};
use std::fmt;
use thiserror::Error;

use crate::config::EnvConfig;
use crate::edge::classifier::PathClass;

pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";
pub const CDN_CACHE_CONTROL: &str = "public, max-age=3600";
/// Session-bearing and admin responses.
pub const PRIVATE_CACHE_CONTROL: &str = "private, no-store";

/// Not in the `http` crate's constant set.
pub const TIMING_ALLOW_ORIGIN: HeaderName = HeaderName::from_static("timing-allow-origin");

/// Errors a policy can raise while building its headers.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("invalid value for header {header}: {source}")]
    InvalidValue {
        header: HeaderName,
        #[source]
        source: InvalidHeaderValue,
    },
}

/// Ordered set of header writes produced by one policy.
///
/// A name appears at most once; setting it again replaces the earlier value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMutations {
    entries: Vec<(HeaderName, HeaderValue)>,
}

impl HeaderMutations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: HeaderName, value: HeaderValue) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &HeaderName) -> Option<&HeaderValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(HeaderName, HeaderValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for HeaderMutations {
    type Item = (HeaderName, HeaderValue);
    type IntoIter = std::vec::IntoIter<(HeaderName, HeaderValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// What a policy gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct PolicyInput<'a> {
    pub class: PathClass,
    pub env: &'a EnvConfig,
}

/// A header policy.
pub trait HeaderPolicy: Send + Sync + fmt::Debug {
    /// Stable name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Headers this policy wants on the response.
    fn evaluate(&self, input: &PolicyInput<'_>) -> Result<HeaderMutations, PolicyError>;
}

/// Long-term caching for assets that never change under the same URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmutableCachePolicy;

impl HeaderPolicy for ImmutableCachePolicy {
    fn name(&self) -> &'static str {
        "immutable_cache"
    }

    fn evaluate(&self, input: &PolicyInput<'_>) -> Result<HeaderMutations, PolicyError> {
        let mut headers = HeaderMutations::new();
        if input.class.is_immutable() {
            headers.set(CACHE_CONTROL, HeaderValue::from_static(IMMUTABLE_CACHE_CONTROL));
        }
        Ok(headers)
    }
}

/// Shared-cache friendly defaults for every response.
#[derive(Debug, Clone, Copy, Default)]
pub struct CdnPolicy;

impl HeaderPolicy for CdnPolicy {
    fn name(&self) -> &'static str {
        "cdn"
    }

    fn evaluate(&self, _input: &PolicyInput<'_>) -> Result<HeaderMutations, PolicyError> {
        let mut headers = HeaderMutations::new();
        headers.set(CACHE_CONTROL, HeaderValue::from_static(CDN_CACHE_CONTROL));
        headers.set(TIMING_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.set(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
        Ok(headers)
    }
}

/// DNS prefetch and preconnect hints.
#[derive(Debug, Clone)]
pub struct Http2HintPolicy {
    primary_preconnect: String,
}

impl Http2HintPolicy {
    pub fn new(primary_preconnect: impl Into<String>) -> Self {
        Self {
            primary_preconnect: primary_preconnect.into(),
        }
    }

    /// `Link` value for the primary origin plus the CDN, if configured.
    /// Blank targets are skipped; `None` when nothing is left.
    pub fn link_value(&self, env: &EnvConfig) -> Option<String> {
        join_entries(self.link_entries(env))
    }

    fn link_entries(&self, env: &EnvConfig) -> Vec<String> {
        [Some(self.primary_preconnect.as_str()), env.cdn_url.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|target| !target.is_empty())
            .map(|target| format!("<{}>; rel=preconnect", target))
            .collect()
    }
}

fn join_entries(entries: Vec<String>) -> Option<String> {
    if entries.is_empty() {
        None
    } else {
        Some(entries.join(", "))
    }
}

impl HeaderPolicy for Http2HintPolicy {
    fn name(&self) -> &'static str {
        "http2_hints"
    }

    /// An entry that cannot be sent as a header value is dropped on its own;
    /// the remaining entries and `X-DNS-Prefetch-Control` still apply.
    fn evaluate(&self, input: &PolicyInput<'_>) -> Result<HeaderMutations, PolicyError> {
        let mut headers = HeaderMutations::new();
        headers.set(X_DNS_PREFETCH_CONTROL, HeaderValue::from_static("on"));

        let entries = self
            .link_entries(input.env)
            .into_iter()
            .filter(|entry| {
                let usable = HeaderValue::from_str(entry).is_ok();
                if !usable {
                    tracing::warn!(
                        policy = self.name(),
                        "Skipping preconnect target that is not a valid header value"
                    );
                }
                usable
            })
            .collect();

        if let Some(link) = join_entries(entries) {
            let value = HeaderValue::from_str(&link).map_err(|source| PolicyError::InvalidValue {
                header: LINK,
                source,
            })?;
            headers.set(LINK, value);
        }
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with_cdn(cdn: Option<&str>) -> EnvConfig {
        let cdn = cdn.map(str::to_string);
        EnvConfig::from_lookup(move |key| {
            if key == crate::config::env::CDN_URL {
                cdn.clone()
            } else {
                None
            }
        })
    }

    fn input(class: PathClass, env: &EnvConfig) -> PolicyInput<'_> {
        PolicyInput { class, env }
    }

    #[test]
    fn test_mutations_set_replaces() {
        let mut m = HeaderMutations::new();
        m.set(CACHE_CONTROL, HeaderValue::from_static("a"));
        m.set(CACHE_CONTROL, HeaderValue::from_static("b"));
        assert_eq!(m.len(), 1);
        assert_eq!(m.get(&CACHE_CONTROL).unwrap(), "b");
    }

    #[test]
    fn test_immutable_policy_only_for_assets() {
        let env = EnvConfig::default();
        for class in [PathClass::StaticAsset, PathClass::ApiStatic, PathClass::TemplateAsset] {
            let headers = ImmutableCachePolicy.evaluate(&input(class, &env)).unwrap();
            assert_eq!(headers.get(&CACHE_CONTROL).unwrap(), IMMUTABLE_CACHE_CONTROL);
        }
        let headers = ImmutableCachePolicy.evaluate(&input(PathClass::Other, &env)).unwrap();
        assert!(headers.is_empty());
    }

    #[test]
    fn test_cdn_policy_is_unconditional() {
        let env = EnvConfig::default();
        let headers = CdnPolicy.evaluate(&input(PathClass::StaticAsset, &env)).unwrap();
        assert_eq!(headers.get(&CACHE_CONTROL).unwrap(), CDN_CACHE_CONTROL);
        assert_eq!(headers.get(&TIMING_ALLOW_ORIGIN).unwrap(), "*");
        assert_eq!(headers.get(&X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
    }

    #[test]
    fn test_link_without_cdn() {
        let env = env_with_cdn(None);
        let policy = Http2HintPolicy::new("https://fonts.gstatic.com");
        let headers = policy.evaluate(&input(PathClass::Other, &env)).unwrap();

        assert_eq!(headers.get(&X_DNS_PREFETCH_CONTROL).unwrap(), "on");
        assert_eq!(
            headers.get(&LINK).unwrap(),
            "<https://fonts.gstatic.com>; rel=preconnect"
        );
    }

    #[test]
    fn test_unencodable_cdn_entry_is_skipped() {
        let env = env_with_cdn(Some("https://cdn.example.com/a\nb"));
        assert!(env.cdn_url.is_some(), "newlines are stripped by the URL parser, so this validates");

        let policy = Http2HintPolicy::new("https://fonts.gstatic.com");
        let headers = policy.evaluate(&input(PathClass::Other, &env)).unwrap();

        assert_eq!(headers.get(&X_DNS_PREFETCH_CONTROL).unwrap(), "on");
        assert_eq!(
            headers.get(&LINK).unwrap(),
            "<https://fonts.gstatic.com>; rel=preconnect"
        );
    }

    #[test]
    fn test_link_with_cdn() {
        let env = env_with_cdn(Some("https://cdn.example.com"));
        let policy = Http2HintPolicy::new("https://fonts.gstatic.com");
        let link = policy.link_value(&env).unwrap();

        assert_eq!(
            link,
            "<https://fonts.gstatic.com>; rel=preconnect, <https://cdn.example.com>; rel=preconnect"
        );
        assert_eq!(link.matches("cdn.example.com").count(), 1);
    }

    #[test]
    fn test_empty_entries_omitted() {
        let env = env_with_cdn(Some("https://cdn.example.com"));
        let policy = Http2HintPolicy::new("");
        assert_eq!(
            policy.link_value(&env).unwrap(),
            "<https://cdn.example.com>; rel=preconnect"
        );

        let headers = policy.evaluate(&input(PathClass::Other, &env_with_cdn(None))).unwrap();
        assert!(headers.get(&LINK).is_none());
        assert!(headers.get(&X_DNS_PREFETCH_CONTROL).is_some());
    }

    #[test]
    fn test_unencodable_primary_keeps_dns_prefetch() {
        let env = env_with_cdn(Some("https://cdn.example.com"));
        let policy = Http2HintPolicy::new("https://bad\nhost");
        let headers = policy.evaluate(&input(PathClass::Other, &env)).unwrap();

        assert_eq!(headers.get(&X_DNS_PREFETCH_CONTROL).unwrap(), "on");
        assert_eq!(headers.get(&LINK).unwrap(), "<https://cdn.example.com>; rel=preconnect");

        let headers = policy.evaluate(&input(PathClass::Other, &EnvConfig::default())).unwrap();
        assert!(headers.get(&LINK).is_none());
        assert_eq!(headers.len(), 1);
    }
}
