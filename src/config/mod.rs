//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → BalancerConfig (validated, immutable)
//!     → shared by value to all subsystems at construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload path
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::AdminConfig;
pub use schema::BackendConfig;
pub use schema::BalancerConfig;
pub use schema::CacheConfig;
pub use schema::HealthCheckConfig;
pub use schema::ListenerConfig;
pub use schema::RateLimitConfig;
pub use schema::TimeoutConfig;
