//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Configuration (pipe-delimited URLs + optional Host override)
//!     → endpoints.rs (EndpointSet, parsed once at startup)
//!     → probe.rs (GET each URL, short-circuit on first failure)
//!     → bool consumed by the failover controller
//! ```
//!
//! # Design Decisions
//! - No hysteresis: every cycle evaluates health from scratch
//! - Probe failures are logged, never raised
//! - The same probe serves the self check and the peer check

pub mod endpoints;
pub mod probe;

pub use endpoints::{EndpointError, EndpointSet};
pub use probe::{HealthProbe, HttpProbe};
