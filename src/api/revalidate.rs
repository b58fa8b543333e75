//! On-demand cache invalidation.
//!
//! An admin marks a path; the next request for that path forwarded to the
//! origin carries `Cache-Control: no-cache`, telling the rendering layer to
//! drop its cached copy. The mark is consumed by that request.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::admin::AdminSession;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Paths awaiting revalidation, with the time (unix ms) they were marked.
#[derive(Debug, Clone, Default)]
pub struct RevalidationLog {
    inner: Arc<DashMap<String, u64>>,
}

impl RevalidationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `path`. Marking again only refreshes the timestamp.
    pub fn mark(&self, path: &str, at_ms: u64) {
        self.inner.insert(path.to_string(), at_ms);
    }

    /// Consume the mark for `path`, if any.
    pub fn take(&self, path: &str) -> Option<u64> {
        self.inner.remove(path).map(|(_, at)| at)
    }

    /// Put back a mark consumed by a request that never reached the origin.
    /// A newer mark set in the meantime is kept.
    pub fn restore(&self, path: &str, at_ms: u64) {
        self.inner.entry(path.to_string()).or_insert(at_ms);
    }

    pub fn is_pending(&self, path: &str) -> bool {
        self.inner.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[derive(Debug, Deserialize)]
pub struct RevalidateQuery {
    pub path: Option<String>,
}

pub async fn revalidate(
    _session: AdminSession,
    State(state): State<AppState>,
    Query(query): Query<RevalidateQuery>,
) -> Response {
    let Some(path) = query.path.filter(|p| p.starts_with('/')) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "revalidated": false, "error": "path must be an absolute path" })),
        )
            .into_response();
    };

    let now = unix_millis();
    state.revalidations.mark(&path, now);
    metrics::record_revalidation();
    tracing::info!(path = %path, "Revalidation requested");

    Json(serde_json::json!({ "revalidated": true, "path": path, "now": now })).into_response()
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
