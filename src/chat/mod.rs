//! The chat application: its route table and views.

pub mod urls;
pub mod views;

pub use urls::url_patterns;
