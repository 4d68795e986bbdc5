//! Shared resource ownership subsystem.
//!
//! # Data Flow
//! ```text
//! Failover controller
//!     → types.rs (OwnershipClient contract)
//!     → digitalocean.rs (metadata service for identity,
//!                        public API for query and assign)
//! ```
//!
//! # Design Decisions
//! - The controller only sees the trait, so tests drive it with fakes
//! - Identity lookup failures are reported as `AuthorityUnreachable`
//! - `acquire` is idempotent from the caller's point of view

pub mod digitalocean;
pub mod types;

pub use digitalocean::DigitalOceanClient;
pub use types::{OwnershipClient, OwnershipError, OwnershipResult};
