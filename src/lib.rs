//! Floating IP failover controller library.

pub mod config;
pub mod failover;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod ownership;

pub use config::schema::ControllerConfig;
pub use failover::FailoverController;
pub use lifecycle::{Shutdown, Watchdog};
