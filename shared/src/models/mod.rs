//! Domain models for weather snapshots and overrides

mod override_record;
mod weather;

pub use override_record::*;
pub use weather::*;
