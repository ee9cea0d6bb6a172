//! End-to-end dispatch tests.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chat_router::chat;
use chat_router::config::ServerConfig;
use chat_router::http::{HttpServer, X_REQUEST_ID};
use chat_router::routing::{path, Outcome, RouteRequest, RouteTable, View};
use tower::ServiceExt;

mod common;

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_chat_serves_room_over_http() {
    let server = common::start_server(ServerConfig::default(), chat::url_patterns().unwrap()).await;
    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    let res = client.get(server.url("/chat/")).send().await.expect("server unreachable");
    assert_eq!(res.status(), 200);
    let request_id = res
        .headers()
        .get(X_REQUEST_ID)
        .expect("response should carry a request id")
        .to_str()
        .unwrap()
        .to_string();
    assert!(uuid::Uuid::parse_str(&request_id).is_ok());
    assert!(res.text().await.unwrap().contains("Chat Room"));

    for p in ["/chatroom/", "/chat/extra", "/chat", "/"] {
        let res = client.get(server.url(p)).send().await.unwrap();
        assert_eq!(res.status(), 404, "{p} should not match");
    }

    server.shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server should stop after shutdown")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_client_request_id_is_kept() {
    let server = common::start_server(ServerConfig::default(), chat::url_patterns().unwrap()).await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let res = client
        .get(server.url("/chat/"))
        .header(X_REQUEST_ID, "req-42")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()[X_REQUEST_ID], "req-42");

    server.shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server should stop after shutdown")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_deferred_request_falls_through() {
    let routes = RouteTable::new(vec![
        path(
            "rooms/<slug:room>/",
            View::new("private_room", |req: RouteRequest| async move {
                if req.params.get("room") == Some("staff") {
                    Outcome::respond("private")
                } else {
                    req.defer()
                }
            }),
            Some("private-room"),
        )
        .unwrap(),
        path(
            "rooms/<str:room>/",
            View::new("public_room", |req: RouteRequest| async move {
                Outcome::respond(format!("public {}", req.params.get("room").unwrap_or("")))
            }),
            Some("public-room"),
        )
        .unwrap(),
    ])
    .unwrap();
    let app = HttpServer::new(ServerConfig::default(), routes).router();

    let res = app.clone().oneshot(get("/rooms/staff/")).await.unwrap();
    assert_eq!(body_text(res).await, "private");

    let res = app.clone().oneshot(get("/rooms/lobby/")).await.unwrap();
    assert_eq!(body_text(res).await, "public lobby");
}

#[tokio::test]
async fn test_every_handler_deferring_is_not_found() {
    let routes = RouteTable::new(vec![path(
        "chat/",
        View::new("shy", |req: RouteRequest| async move { req.defer() }),
        None,
    )
    .unwrap()])
    .unwrap();
    let app = HttpServer::new(ServerConfig::default(), routes).router();

    let res = app.oneshot(get("/chat/")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_append_slash_redirect() {
    let mut config = ServerConfig::default();
    config.routing.append_slash = true;
    let app = HttpServer::new(config, chat::url_patterns().unwrap()).router();

    let res = app.clone().oneshot(get("/chat?tab=recent")).await.unwrap();
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers()[header::LOCATION], "/chat/?tab=recent");

    // Only safe methods are redirected.
    let post = Request::builder()
        .method("POST")
        .uri("/chat")
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(post).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Nothing to redirect to.
    let res = app.oneshot(get("/lobby")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_append_slash_off_by_default() {
    let app = HttpServer::new(ServerConfig::default(), chat::url_patterns().unwrap()).router();

    let res = app.oneshot(get("/chat")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_encoded_path_is_decoded_before_matching() {
    let app = HttpServer::new(ServerConfig::default(), chat::url_patterns().unwrap()).router();

    let res = app.clone().oneshot(get("/ch%61t/")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("Chat Room"));

    // Invalid UTF-8 after decoding.
    let res = app.oneshot(get("/chat/%FF")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_captured_values_are_decoded() {
    let routes = RouteTable::new(vec![path(
        "rooms/<room>/",
        View::new("room_title", |req: RouteRequest| async move {
            Outcome::respond(req.params.get("room").unwrap_or("").to_string())
        }),
        Some("room-title"),
    )
    .unwrap()])
    .unwrap();
    let url = routes.reverse("room-title", &[("room", "hello world")]).unwrap();
    assert_eq!(url, "/rooms/hello%20world/");

    let app = HttpServer::new(ServerConfig::default(), routes).router();
    let res = app.oneshot(get(&url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_text(res).await, "hello world");
}

#[tokio::test]
async fn test_slow_handler_times_out() {
    let mut config = ServerConfig::default();
    config.timeouts.request_secs = 1;
    let routes = RouteTable::new(vec![path(
        "chat/",
        View::new("slow_room", |_req: RouteRequest| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Outcome::respond("too late")
        }),
        Some("room"),
    )
    .unwrap()])
    .unwrap();
    let app = HttpServer::new(config, routes).router();

    let res = tokio::time::timeout(Duration::from_secs(3), app.oneshot(get("/chat/")))
        .await
        .expect("timeout layer should answer first")
        .unwrap();
    assert_eq!(res.status(), StatusCode::REQUEST_TIMEOUT);
}
