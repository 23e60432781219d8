pub mod models;
pub mod connection;
pub mod migrations;
pub mod query;

pub use models::*;
pub use connection::*;
pub use migrations::*;
pub use query::{like_pattern, non_empty, Condition, ListQuery, Page, PageWindow, Paginator};
