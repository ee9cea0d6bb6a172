//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum Router whose fallback is the route-table dispatcher
//! - Wire up middleware (tracing, request ID, timeout)
//! - Bind server to listener and serve until shutdown
//! - Dispatch requests to the first route that accepts them

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use percent_encoding::percent_decode_str;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{RoutingConfig, ServerConfig};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::observability::tracing::RequestSpan;
use crate::routing::{Outcome, RouteRequest, RouteTable};

/// Application state injected into the dispatcher.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub routing: RoutingConfig,
}

/// HTTP front for a route table.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server serving `routes`.
    pub fn new(config: ServerConfig, routes: RouteTable) -> Self {
        let state = AppState {
            routes: Arc::new(routes),
            routing: config.routing.clone(),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(RequestSpan))
            .layer(set_request_id_layer())
    }

    /// The router, for serving or for driving with `tower::ServiceExt`.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Route-table dispatcher.
///
/// Offers the request to each matching route in order until a handler answers.
/// Routes are matched against the percent-decoded path.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let path = match percent_decode_str(request.uri().path()).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => {
            tracing::warn!(path = %request.uri().path(), "Path is not valid UTF-8 once decoded");
            metrics::record_request("none", 404, start_time);
            return (StatusCode::NOT_FOUND, "Not Found").into_response();
        }
    };
    let mut request = request;
    let mut next = 0;

    loop {
        let (index, view, label, route_name, params) = {
            let Some(m) = state.routes.resolve_from(&path, next) else {
                break;
            };
            (
                m.index,
                m.route.view().clone(),
                m.route.pattern().as_str().to_string(),
                m.route_name().map(str::to_string),
                m.params,
            )
        };

        tracing::debug!(route = %label, view = %view.name(), "Route matched");

        let route_request = RouteRequest {
            request,
            params,
            route_name,
        };
        match view.call(route_request).await {
            Outcome::Respond(response) => {
                metrics::record_request(&label, response.status().as_u16(), start_time);
                return response;
            }
            Outcome::Defer(returned) => {
                tracing::debug!(route = %label, "Handler deferred");
                request = returned;
                next = index + 1;
            }
        }
    }

    if let Some(location) = slash_redirect(&state, &request, &path) {
        tracing::debug!(path = %path, location = %location, "Appending slash");
        metrics::record_request("none", 301, start_time);
        return (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response();
    }

    tracing::warn!(path = %path, "No route matched");
    metrics::record_request("none", 404, start_time);
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

/// Location to redirect to when `path/` resolves but `path` did not.
///
/// `decoded` is the request path after percent-decoding; the location keeps
/// the raw form.
fn slash_redirect(state: &AppState, request: &Request<Body>, decoded: &str) -> Option<String> {
    if !state.routing.append_slash {
        return None;
    }
    if request.method() != Method::GET && request.method() != Method::HEAD {
        return None;
    }

    let path = request.uri().path();
    if path.ends_with('/') {
        return None;
    }
    state.routes.resolve(&format!("{decoded}/"))?;
    let with_slash = format!("{path}/");

    Some(match request.uri().query() {
        Some(query) => format!("{with_slash}?{query}"),
        None => with_slash,
    })
}
