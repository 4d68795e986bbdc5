//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Controller, probe, ownership client:
//!     → logging.rs (structured log events, the primary operator interface)
//!     → metrics.rs (counters and gauges, exported only on request)
//! ```

pub mod logging;
pub mod metrics;
