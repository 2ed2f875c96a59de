//! # Observability
//!
//! - `logging`: tracing subscriber setup (text or JSON)
//! - `metrics`: Prometheus metrics served on `/metrics`

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::Metrics;
