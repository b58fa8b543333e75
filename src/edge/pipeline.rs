//! Header policy composition.
//!
//! # Application order
//! ```text
//! Http2HintPolicy → CdnPolicy → ImmutableCachePolicy
//! ```
//! Later policies overwrite earlier ones on shared keys. `CdnPolicy` and
//! `ImmutableCachePolicy` both write `Cache-Control`; running the immutable
//! policy last means classified assets always end up with
//! `public, max-age=31536000, immutable` and everything else with the CDN
//! default.
//!
//! A failing policy is logged and skipped. Headers from the other policies
//! are still applied and the request always proceeds.
//!
//! # Private responses
//! After the merge, `Cache-Control` is replaced with `private, no-store` on
//! any response that sets a cookie or carries the [`PrivateResponse`]
//! marker. The admin guard marks everything it handles and the admin and
//! operational routes mark their own responses. The other composed headers
//! are kept.

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{CACHE_CONTROL, SET_COOKIE},
        HeaderMap, HeaderValue, Request,
    },
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

use crate::config::{EnvConfig, HintsConfig};
use crate::edge::classifier::PathClass;
use crate::edge::policy::{
    CdnPolicy, HeaderPolicy, Http2HintPolicy, ImmutableCachePolicy, PolicyInput, PRIVATE_CACHE_CONTROL,
};
use crate::observability::metrics;

/// Ordered list of header policies plus the environment they read.
#[derive(Debug)]
pub struct EdgePipeline {
    policies: Vec<Box<dyn HeaderPolicy>>,
    env: Arc<EnvConfig>,
}

impl EdgePipeline {
    /// Pipeline with the standard policies in the canonical order.
    pub fn new(env: Arc<EnvConfig>, hints: &HintsConfig) -> Self {
        Self::with_policies(
            env,
            vec![
                Box::new(Http2HintPolicy::new(hints.primary_preconnect.clone())),
                Box::new(CdnPolicy),
                Box::new(ImmutableCachePolicy),
            ],
        )
    }

    /// Pipeline with a custom policy list, applied in the given order.
    pub fn with_policies(env: Arc<EnvConfig>, policies: Vec<Box<dyn HeaderPolicy>>) -> Self {
        Self { policies, env }
    }

    pub fn policy_names(&self) -> Vec<&'static str> {
        self.policies.iter().map(|p| p.name()).collect()
    }

    /// Run every policy for `class` and merge their headers, last writer wins.
    pub fn compose(&self, class: PathClass) -> HeaderMap {
        let input = PolicyInput {
            class,
            env: &self.env,
        };
        let mut headers = HeaderMap::new();

        for policy in &self.policies {
            match policy.evaluate(&input) {
                Ok(mutations) => {
                    for (name, value) in mutations {
                        headers.insert(name, value);
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        policy = policy.name(),
                        class = %class,
                        error = %e,
                        "Header policy failed, continuing without it"
                    );
                    metrics::record_policy_failure(policy.name());
                }
            }
        }

        headers
    }
}

/// Response extension: never let shared caches store this response.
#[derive(Debug, Clone, Copy)]
pub struct PrivateResponse;

pub fn mark_private(response: &mut Response) {
    response.extensions_mut().insert(PrivateResponse);
}

/// [`mark_private`] as a `map_response` layer function.
pub async fn private_responses(mut response: Response) -> Response {
    mark_private(&mut response);
    response
}

fn is_private(response: &Response) -> bool {
    response.extensions().get::<PrivateResponse>().is_some() || response.headers().contains_key(SET_COOKIE)
}

/// Classify the request, let the rest of the stack answer it, then stamp the
/// composed headers onto the response.
pub async fn edge_headers_middleware(
    State(pipeline): State<Arc<EdgePipeline>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let class = PathClass::classify(request.uri().path());
    let headers = pipeline.compose(class);

    tracing::trace!(path = %request.uri().path(), class = %class, "Classified request");

    let mut response = next.run(request).await;
    let target = response.headers_mut();
    for (name, value) in headers.iter() {
        target.insert(name.clone(), value.clone());
    }
    if is_private(&response) {
        response
            .headers_mut()
            .insert(CACHE_CONTROL, HeaderValue::from_static(PRIVATE_CACHE_CONTROL));
    }

    metrics::record_request(class.as_str(), response.status().as_u16(), start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::policy::{
        HeaderMutations, PolicyError, CDN_CACHE_CONTROL, IMMUTABLE_CACHE_CONTROL, TIMING_ALLOW_ORIGIN,
    };
    use axum::http::header::{CACHE_CONTROL, LINK, X_CONTENT_TYPE_OPTIONS, X_DNS_PREFETCH_CONTROL};
    use axum::http::HeaderValue;

    /// Always fails, as an encoding error would.
    #[derive(Debug)]
    struct BrokenPolicy;

    impl HeaderPolicy for BrokenPolicy {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn evaluate(&self, _input: &PolicyInput<'_>) -> Result<HeaderMutations, PolicyError> {
            let source = HeaderValue::from_str("bad\nvalue").unwrap_err();
            Err(PolicyError::InvalidValue {
                header: LINK,
                source,
            })
        }
    }

    fn pipeline() -> EdgePipeline {
        EdgePipeline::new(Arc::new(EnvConfig::default()), &HintsConfig::default())
    }

    #[test]
    fn test_canonical_order() {
        assert_eq!(pipeline().policy_names(), vec!["http2_hints", "cdn", "immutable_cache"]);
    }

    #[test]
    fn test_assets_keep_immutable_cache_control() {
        let pipeline = pipeline();
        for path in ["/app.js", "/api/static/logo", "/templates/report.pdf"] {
            let headers = pipeline.compose(PathClass::classify(path));
            assert_eq!(headers[CACHE_CONTROL], IMMUTABLE_CACHE_CONTROL, "{}", path);
            assert_eq!(headers[&TIMING_ALLOW_ORIGIN], "*");
        }
    }

    #[test]
    fn test_pages_get_cdn_cache_control() {
        let headers = pipeline().compose(PathClass::Other);
        assert_eq!(headers[CACHE_CONTROL], CDN_CACHE_CONTROL);
        assert_eq!(headers[X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[X_DNS_PREFETCH_CONTROL], "on");
        assert!(headers.contains_key(LINK));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let pipeline = pipeline();
        let first = pipeline.compose(PathClass::StaticAsset);
        for _ in 0..10 {
            assert_eq!(pipeline.compose(PathClass::StaticAsset), first);
        }
    }

    #[test]
    fn test_last_policy_wins() {
        let reversed = EdgePipeline::with_policies(
            Arc::new(EnvConfig::default()),
            vec![Box::new(ImmutableCachePolicy), Box::new(CdnPolicy)],
        );
        let headers = reversed.compose(PathClass::StaticAsset);
        assert_eq!(headers[CACHE_CONTROL], CDN_CACHE_CONTROL);
    }

    #[test]
    fn test_failing_policy_is_skipped() {
        let pipeline = EdgePipeline::with_policies(
            Arc::new(EnvConfig::default()),
            vec![Box::new(CdnPolicy), Box::new(BrokenPolicy), Box::new(ImmutableCachePolicy)],
        );
        let headers = pipeline.compose(PathClass::StaticAsset);

        assert_eq!(headers[CACHE_CONTROL], IMMUTABLE_CACHE_CONTROL);
        assert_eq!(headers[X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert!(!headers.contains_key(LINK));
    }
}
