//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route registration (at startup):
//!     path(pattern, view, name)
//!     → matcher.rs (parse pattern into literal/parameter segments)
//!     → router.rs (check uniqueness, freeze as immutable RouteTable)
//!
//! Incoming request path:
//!     → router.rs (scan routes in declaration order)
//!     → matcher.rs (match whole path, capture parameters)
//!     → Return: RouteMatch or None
//!
//! Dispatch:
//!     RouteMatch → handler.rs (View::call) → Respond | Defer
//! ```
//!
//! # Design Decisions
//! - Routes parsed at startup, immutable at runtime
//! - No regex in the hot path
//! - Deterministic: same input always matches same route
//! - First match wins (declaration order)

pub mod handler;
pub mod matcher;
pub mod router;

pub use handler::{Handler, Outcome, RouteRequest, View};
pub use matcher::{Converter, PathParams, PathPattern, PatternError};
pub use router::{path, ReverseError, Route, RouteMatch, RouteTable, RouteTableError};
