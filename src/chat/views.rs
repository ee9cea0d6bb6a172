//! Chat views.

use axum::response::Html;

use crate::routing::{Outcome, RouteRequest};

const ROOM_PAGE: &str = "<!DOCTYPE html>
<html>
<head><meta charset=\"utf-8\"><title>Chat Room</title></head>
<body><h1>Chat Room</h1></body>
</html>
";

/// Chat room page.
///
/// Serves a static placeholder page.
pub async fn room(req: RouteRequest) -> Outcome {
    tracing::debug!(route = ?req.route_name, "Rendering chat room");
    Outcome::respond(Html(ROOM_PAGE))
}
