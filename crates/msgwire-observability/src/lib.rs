//! # msgwire-observability
//!
//! OpenTelemetry-based observability for msgwire.
//!
//! ## Built-in metrics
//! - `msgwire.records_encoded`   — counter, tagged with codec
//! - `msgwire.records_dropped`   — counter, tagged with codec + error_type
//! - `msgwire.oversized_topics`  — counter
//! - `msgwire.batch_bytes`       — histogram of encoded batch sizes
//!
//! ## Structured logging
//! Text or JSON logs through `tracing-subscriber`, with per-component levels.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::EncoderMetrics;
pub use tracing_setup::{init_tracing, LogConfig};
