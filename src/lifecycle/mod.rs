//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Watchdog (watchdog.rs):
//!     Controller kicks once per cycle
//!     → deadline missed → fatal callback (process exit)
//!
//! Shutdown (shutdown.rs):
//!     Signal received → controller leaves its loop → watchdog stopped → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - The watchdog is owned by the controller, not a process-wide singleton
//! - A stalled controller is never asked to recover; the watchdog ends the
//!   process and external supervision restarts it

pub mod shutdown;
pub mod signals;
pub mod watchdog;

pub use shutdown::Shutdown;
pub use watchdog::{TripCallback, Watchdog, WatchdogError, WatchdogState};
