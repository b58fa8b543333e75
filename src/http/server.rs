//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with edge endpoints and the origin fallback
//! - Wire up middleware (request ID, tracing, timeout, edge headers,
//!   admin session guard)
//! - Bind server to listener and shut down gracefully
//!
//! # Layer order (outermost first)
//! ```text
//! SetRequestId → Trace → PropagateRequestId → Timeout
//!     → edge_headers_middleware → admin_session_middleware → handlers
//! ```

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin::{admin_session_middleware, setup_admin_router, GuardError, SessionGuard};
use crate::api::{setup_api_router, RevalidationLog};
use crate::config::{EdgeConfig, EnvConfig};
use crate::edge::{edge_headers_middleware, EdgePipeline};
use crate::http::origin::{OriginClient, OriginError};
use crate::http::request::{propagate_request_id_layer, request_span, set_request_id_layer};

/// Failures while assembling the server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error(transparent)]
    Origin(#[from] OriginError),
}

/// Application state injected into handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub env: Arc<EnvConfig>,
    pub config: Arc<EdgeConfig>,
    pub guard: Arc<SessionGuard>,
    pub pipeline: Arc<EdgePipeline>,
    pub revalidations: RevalidationLog,
    pub origin: Option<OriginClient>,
}

impl AppState {
    /// Build shared state. Fails without a signing secret.
    pub fn new(config: EdgeConfig, env: EnvConfig) -> Result<Self, StartupError> {
        let env = Arc::new(env);
        let guard = SessionGuard::from_env(&env, &config.session)?;
        let pipeline = EdgePipeline::new(env.clone(), &config.hints);
        let origin = config.origin.url.as_deref().map(OriginClient::new).transpose()?;

        Ok(Self {
            env,
            config: Arc::new(config),
            guard: Arc::new(guard),
            pipeline: Arc::new(pipeline),
            revalidations: RevalidationLog::new(),
            origin,
        })
    }
}

/// HTTP server for the edge layer.
pub struct EdgeServer {
    router: Router,
    state: AppState,
}

impl EdgeServer {
    /// Create a new server with the given configuration and environment.
    pub fn new(config: EdgeConfig, env: EnvConfig) -> Result<Self, StartupError> {
        Ok(Self::from_state(AppState::new(config, env)?))
    }

    pub fn from_state(state: AppState) -> Self {
        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(state: AppState) -> Router {
        let timeout = Duration::from_secs(state.config.timeouts.request_secs);

        Router::new()
            .merge(setup_admin_router())
            .merge(setup_api_router())
            .fallback(origin_fallback)
            .layer(middleware::from_fn_with_state(state.clone(), admin_session_middleware))
            .layer(middleware::from_fn_with_state(state.pipeline.clone(), edge_headers_middleware))
            .with_state(state)
            .layer(TimeoutLayer::new(timeout))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(set_request_id_layer())
    }

    /// A clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight requests.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Hand everything the edge layer does not answer itself to the origin.
async fn origin_fallback(State(state): State<AppState>, request: Request<Body>) -> Response {
    let Some(origin) = state.origin.as_ref() else {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    };

    let path = request.uri().path().to_string();
    let pending = state.revalidations.take(&path);

    match origin.forward(request, pending.is_some()).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(path = %path, error = %e, "Origin request failed");
            if let Some(marked_at) = pending {
                state.revalidations.restore(&path, marked_at);
            }
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
