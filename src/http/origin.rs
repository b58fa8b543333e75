//! Forwarding to the rendering origin.
//!
//! One attempt per request, no retries and no balancing. The origin is a
//! single upstream that renders whatever the edge layer does not answer
//! itself.

use axum::{
    body::Body,
    http::{header::CACHE_CONTROL, uri::InvalidUri, HeaderValue, Request, Uri, Version},
    response::Response,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum OriginError {
    #[error("invalid origin URL: {0}")]
    InvalidBase(String),

    #[error("invalid upstream URI: {0}")]
    Uri(#[from] InvalidUri),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
}

/// HTTP client bound to one origin.
#[derive(Clone)]
pub struct OriginClient {
    scheme: String,
    authority: String,
    client: Client<HttpConnector, Body>,
}

impl std::fmt::Debug for OriginClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OriginClient")
            .field("scheme", &self.scheme)
            .field("authority", &self.authority)
            .finish()
    }
}

impl OriginClient {
    /// Create a client for `base_url`. Only scheme, host and port are used.
    pub fn new(base_url: &str) -> Result<Self, OriginError> {
        let url = Url::parse(base_url).map_err(|e| OriginError::InvalidBase(e.to_string()))?;
        if url.scheme() != "http" {
            return Err(OriginError::InvalidBase(format!(
                "scheme '{}' not supported, origin must be plain http",
                url.scheme()
            )));
        }
        let host = url
            .host_str()
            .ok_or_else(|| OriginError::InvalidBase("missing host".to_string()))?;
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self {
            scheme: url.scheme().to_string(),
            authority,
            client,
        })
    }

    /// Upstream URI for a request path and query.
    pub fn upstream_uri(&self, path_and_query: &str) -> Result<Uri, OriginError> {
        Ok(format!("{}://{}{}", self.scheme, self.authority, path_and_query).parse()?)
    }

    /// Forward `request`. With `revalidate`, the origin is told to bypass
    /// its cache for this response.
    pub async fn forward(&self, request: Request<Body>, revalidate: bool) -> Result<Response, OriginError> {
        let (mut parts, body) = request.into_parts();

        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        parts.uri = self.upstream_uri(path_and_query)?;
        parts.version = Version::HTTP_11;

        if revalidate {
            parts.headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        }

        let response = self.client.request(Request::from_parts(parts, body)).await?;
        let (parts, body) = response.into_parts();
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}
