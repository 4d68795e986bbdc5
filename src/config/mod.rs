//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional config file (TOML)
//!     → loader.rs (parse & deserialize into FailoverSettings)
//!     → args.rs (flags / environment variables overlay)
//!     → validation.rs (semantic checks, all errors collected)
//!     → Validated::Disabled | Validated::Enabled(RuntimeConfig)
//!     → ControllerConfig handed to the controller, never mutated
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; there is no reload
//! - All raw fields are optional so validation can report every omission
//! - A standby without peer URLs is rejected before any cycle runs

pub mod args;
pub mod loader;
pub mod schema;
pub mod validation;

pub use args::ConfigArgs;
pub use loader::ConfigError;
pub use schema::{
    AuthorityConfig, ControllerConfig, FailoverSettings, Role, RoleConfig, RuntimeConfig,
    TimingConfig, Validated,
};
pub use validation::ValidationError;
