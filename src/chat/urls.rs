//! URL routes of the chat application.

use crate::chat::views;
use crate::routing::{path, RouteTable, RouteTableError, View};

/// Build the chat route table.
///
/// Called once at startup; the result is handed to the dispatcher.
pub fn url_patterns() -> Result<RouteTable, RouteTableError> {
    RouteTable::new(vec![
        path("chat/", View::new("room", views::room), Some("room"))?,
    ])
}
