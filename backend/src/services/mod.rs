//! Business logic services for the weather override platform

pub mod override_store;

pub use override_store::{OverrideStore, OverrideStoreError};
