//! Content catalog client module for fetching book records

pub mod api;
pub mod models;

pub use api::*;
pub use models::*;
