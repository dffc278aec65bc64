//! Shared types and models for the weather override platform
//!
//! This crate contains types and pure logic shared between the backend, the
//! client cache, and the browser bindings (via WASM).

pub mod forecast;
pub mod merge;
pub mod models;
pub mod types;
pub mod validation;

pub use forecast::*;
pub use merge::*;
pub use models::*;
pub use types::*;
pub use validation::*;
