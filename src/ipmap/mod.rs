//! IP map subsystem.
//!
//! # Data Flow
//! ```text
//! IpMapConfig (source, destinations, mappings, defaults)
//!     → config::validation (normalize destinations, check shape)
//!     → table.rs (compile rule inputs, stringify outputs)
//!     → engine.rs IpMap (immutable, shared via Arc)
//!
//! Per request, on first dereference of {destination}:
//!     Replacer → IpMap::resolve
//!         → source expression → candidate address
//!         → MappingTable::lookup (first present, matching rule)
//!         → else default → else handled-empty
//! ```
//!
//! # Design Decisions
//! - Pull-based: nothing is computed for destinations nobody reads
//! - Configured order is the only tie-breaker between overlapping rules
//! - A missing output (`null`) is distinct from an empty string

pub mod engine;
pub mod matcher;
pub mod table;

pub use engine::IpMap;
pub use matcher::{RuleInput, ZonedAddr};
pub use table::{MappingTable, Rule};
