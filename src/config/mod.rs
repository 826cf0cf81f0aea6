//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → route sources, cache backend, listeners built from it at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; route changes go through a cache rebuild
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::AdminConfig;
pub use schema::CacheConfig;
pub use schema::RouterConfig;
pub use schema::RoutingConfig;
