//! Chat application URL routing.
//!
//! Declares the chat route table (`chat/` → `room`) and the small dispatcher
//! that serves it over HTTP.

pub mod chat;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::RouteTable;
