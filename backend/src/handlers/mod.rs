//! HTTP handlers

pub mod health;
pub mod overrides;

pub use health::health_check;
pub use overrides::{create_override, delete_override, get_override};
