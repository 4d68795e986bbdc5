//! Failover decision engine.
//!
//! # Data Flow
//! ```text
//! ControllerConfig (validated once)
//!     → controller.rs (cycle every poll interval)
//!         → health probe (self, then peer when standby)
//!         → ownership client (query, then acquire)
//!         → watchdog kick (progress signal)
//! ```
//!
//! # Design Decisions
//! - Main is the preferred holder and reclaims without looking at the peer
//! - Standby acquires only when it is healthy, does not hold the resource,
//!   and the main fails its check
//! - No hysteresis: a single failed peer check triggers a takeover

pub mod controller;

pub use controller::{ControllerError, ControllerState, CycleOutcome, FailoverController};
