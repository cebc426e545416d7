//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML/JSON)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (destinations, rule inputs, shape, host settings)
//!     → AppConfig (validated)
//!     → compiled into an immutable http::server::Snapshot
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → sent to the server, which swaps its ArcSwap<Snapshot>
//!     → new requests observe the new snapshot; in-flight ones keep the old
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::AppConfig;
pub use schema::IpMapConfig;
pub use schema::ListenerConfig;
pub use schema::MappingConfig;
pub use validation::ValidationError;
