//! Route table configuration.
//!
//! # Data Flow
//! ```text
//! routes.toml
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks, every rule compiles)
//!     → RouterConfig (validated, immutable)
//!     → Router::from_config
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → new RouterConfig sent to the owner, who swaps the router
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation reports every problem, not just the first
//! - A bad edit never replaces a working table

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{RouteConfig, RouterConfig};
pub use validation::ValidationError;
pub use watcher::ConfigWatcher;
