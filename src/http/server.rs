//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Compile configuration into an immutable `Snapshot`
//! - Create Axum Router with the placeholder middleware and responder
//! - Build one `Replacer` per request over the current snapshot
//! - Swap snapshots atomically on configuration updates
//! - Bind server to listener and shut down gracefully

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::{Extension, State},
    http::{HeaderValue, Request},
    middleware::{self, Next},
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{AppConfig, ValidationError};
use crate::http::request::{RequestVars, X_REQUEST_ID};
use crate::http::response::ResponseTemplate;
use crate::ipmap::IpMap;
use crate::observability::metrics;
use crate::placeholder::Replacer;

/// Everything a request needs, compiled from one configuration.
#[derive(Debug)]
pub struct Snapshot {
    vars: BTreeMap<String, String>,
    ipmaps: Vec<Arc<IpMap>>,
    respond: ResponseTemplate,
}

impl Snapshot {
    pub fn from_config(config: &AppConfig) -> Result<Self, ValidationError> {
        let ipmaps = config
            .ipmaps
            .iter()
            .enumerate()
            .map(|(map, c)| {
                IpMap::from_config(c).map(Arc::new).map_err(|error| ValidationError::InMap {
                    map,
                    error: Box::new(error),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            vars: config.vars.clone(),
            ipmaps,
            respond: ResponseTemplate::from_config(&config.respond)?,
        })
    }

    /// A replacer for `req`: static vars, then request placeholders, then ip maps.
    pub fn replacer<B>(&self, req: &Request<B>) -> Replacer {
        let mut repl = Replacer::new();
        for (key, value) in &self.vars {
            repl.set(key.clone(), value.clone());
        }
        repl.map(Arc::new(RequestVars::from_request(req)));
        for map in &self.ipmaps {
            repl.map(map.clone());
        }
        repl
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub snapshot: Arc<ArcSwap<Snapshot>>,
}

/// HTTP server for the ip map service.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig) -> Result<Self, ValidationError> {
        let snapshot = Snapshot::from_config(&config)?;
        let state = AppState {
            snapshot: Arc::new(ArcSwap::from_pointee(snapshot)),
        };
        let router = Self::build_router(&config, state.clone());
        Ok(Self { router, state })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(respond_handler))
            .route("/{*path}", any(respond_handler))
            .layer(middleware::from_fn_with_state(state, placeholder_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for serving or driving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, applying configuration updates
    /// as they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<AppConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            ipmaps = self.state.snapshot.load().ipmaps.len(),
            "HTTP server starting"
        );

        tokio::spawn(apply_updates(self.state.clone(), config_updates));

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Swap in each update that compiles; keep the current snapshot otherwise.
async fn apply_updates(state: AppState, mut updates: mpsc::UnboundedReceiver<AppConfig>) {
    while let Some(config) = updates.recv().await {
        match Snapshot::from_config(&config) {
            Ok(snapshot) => {
                state.snapshot.store(Arc::new(snapshot));
                metrics::record_reload("applied");
                tracing::info!(ipmaps = config.ipmaps.len(), "Configuration reloaded");
            }
            Err(e) => {
                metrics::record_reload("rejected");
                tracing::error!(error = %e, "Rejected configuration update");
            }
        }
    }
}

/// Attach a replacer bound to the current snapshot, and make sure the
/// response carries a request ID.
async fn placeholder_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // One load per request: every placeholder sees the same snapshot.
    let snapshot = state.snapshot.load_full();
    let repl = Arc::new(snapshot.replacer(&req));

    req.extensions_mut().insert(snapshot);
    req.extensions_mut().insert(repl.clone());

    let mut response = next.run(req).await;

    if !response.headers().contains_key(X_REQUEST_ID) {
        let id = match repl.replace_all("{http.request.header.x-request-id}") {
            id if id.is_empty() => repl.replace_all("{http.request.uuid}"),
            id => id,
        };
        if let Ok(value) = HeaderValue::from_str(&id) {
            response.headers_mut().insert(X_REQUEST_ID, value);
        }
    }
    response
}

/// Render the configured response.
async fn respond_handler(
    Extension(snapshot): Extension<Arc<Snapshot>>,
    Extension(repl): Extension<Arc<Replacer>>,
) -> Response {
    snapshot.respond.render(&repl)
}
