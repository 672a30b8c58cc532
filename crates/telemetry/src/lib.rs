//! Internal telemetry for the lead engine: structured logging setup,
//! in-memory metrics, and component health.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
