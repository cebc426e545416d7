//! Placeholder substitution subsystem.
//!
//! # Data Flow
//! ```text
//! Template "region={region}"
//!     → replacer.rs (scan for {name})
//!     → static values, then providers in order
//!         → http::request::RequestVars  (http.request.*)
//!         → ipmap::IpMap                (configured destinations)
//!     → expanded string
//! ```
//!
//! Providers receive an `Evaluator` so their own outputs can contain
//! placeholders that expand against the same request.

pub mod replacer;

pub use replacer::{Evaluator, Lookup, Provider, Replacer};
