//! Handler capability consumed by the dispatcher.
//!
//! A handler receives the matched request and either answers it or defers,
//! handing the request back to the dispatcher so a later route may take it.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};

use crate::routing::matcher::PathParams;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Result of invoking a handler.
#[derive(Debug)]
pub enum Outcome {
    /// The handler answered the request.
    Respond(Response),
    /// The handler declined and returned the request; the dispatcher keeps looking.
    Defer(Request<Body>),
}

impl Outcome {
    pub fn respond(response: impl IntoResponse) -> Self {
        Outcome::Respond(response.into_response())
    }
}

/// A request that matched a route, with its captured parameters.
#[derive(Debug)]
pub struct RouteRequest {
    pub request: Request<Body>,
    pub params: PathParams,
    /// Name of the matched route, if it has one.
    pub route_name: Option<String>,
}

impl RouteRequest {
    /// Decline the request, giving it back to the dispatcher.
    pub fn defer(self) -> Outcome {
        Outcome::Defer(self.request)
    }
}

/// Something that can handle a matched request.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, request: RouteRequest) -> BoxFuture<Outcome>;
}

impl<F, Fut> Handler for F
where
    F: Fn(RouteRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    fn call(&self, request: RouteRequest) -> BoxFuture<Outcome> {
        Box::pin(self(request))
    }
}

/// A named reference to a handler.
#[derive(Clone)]
pub struct View {
    name: String,
    handler: Arc<dyn Handler>,
}

impl View {
    pub fn new(name: impl Into<String>, handler: impl Handler) -> Self {
        Self {
            name: name.into(),
            handler: Arc::new(handler),
        }
    }

    /// Name the handler was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, request: RouteRequest) -> BoxFuture<Outcome> {
        self.handler.call(request)
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    async fn echo_param(req: RouteRequest) -> Outcome {
        match req.params.get("id") {
            Some(id) => Outcome::respond(id.to_string()),
            None => req.defer(),
        }
    }

    #[tokio::test]
    async fn test_async_fn_is_a_handler() {
        let view = View::new("echo_param", echo_param);
        assert_eq!(view.name(), "echo_param");

        let req = RouteRequest {
            request: Request::builder().body(Body::empty()).unwrap(),
            params: PathParams::default(),
            route_name: None,
        };
        assert!(matches!(view.call(req).await, Outcome::Defer(_)));
    }

    #[tokio::test]
    async fn test_closure_is_a_handler() {
        let view = View::new("teapot", |_req: RouteRequest| async {
            Outcome::respond(StatusCode::IM_A_TEAPOT)
        });

        let req = RouteRequest {
            request: Request::builder().body(Body::empty()).unwrap(),
            params: PathParams::default(),
            route_name: Some("teapot".into()),
        };
        match view.call(req).await {
            Outcome::Respond(res) => assert_eq!(res.status(), StatusCode::IM_A_TEAPOT),
            Outcome::Defer(_) => panic!("expected a response"),
        }
    }
}
