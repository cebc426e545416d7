//! Lazy resolution of ip map destinations.
//!
//! # Responsibilities
//! - Recognize configured destination names
//! - Evaluate the source expression and classify it against the table
//! - Fall back to per-destination defaults
//!
//! # Design Decisions
//! - Runs only when a placeholder is actually dereferenced
//! - Foreign names return `Unhandled` before touching the source
//! - A source that is not an address degrades to the default, never an error
//! - No memoization; each call rescans the (small) table

use crate::config::schema::IpMapConfig;
use crate::config::validation::{normalize_destinations, validate_ipmap, ValidationError};
use crate::ipmap::matcher::{parse_candidate, ZonedAddr};
use crate::ipmap::table::MappingTable;
use crate::observability::metrics;
use crate::placeholder::{Evaluator, Lookup, Provider};

/// A compiled ip map, registered with a request's replacer as a provider.
#[derive(Debug, Clone)]
pub struct IpMap {
    source: String,
    destinations: Vec<String>,
    defaults: Vec<String>,
    table: MappingTable,
}

impl IpMap {
    /// Normalize, validate and compile one configured map.
    pub fn from_config(config: &IpMapConfig) -> Result<Self, ValidationError> {
        let destinations = normalize_destinations(&config.destinations)?;
        validate_ipmap(&destinations, &config.defaults, &config.mappings)?;

        let table = MappingTable::from_config(&config.mappings)?;

        Ok(Self {
            source: config.source.clone(),
            destinations,
            defaults: config.defaults.clone(),
            table,
        })
    }

    /// Destination names without braces, in configured order.
    pub fn destinations(&self) -> &[String] {
        &self.destinations
    }

    /// Resolve `key` for the current request.
    pub fn resolve(&self, key: &str, eval: &Evaluator<'_>) -> Lookup {
        let Some(index) = self.destinations.iter().position(|d| d == key) else {
            return Lookup::Unhandled;
        };

        let input = eval.replace_all(&self.source);
        if let Some(output) = self.classify(&input, index) {
            metrics::record_lookup("matched");
            return Lookup::Handled(Some(eval.replace_all(output)));
        }

        match self.defaults.get(index) {
            Some(default) => {
                metrics::record_lookup("default");
                Lookup::Handled(Some(eval.replace_all(default)))
            }
            None => {
                metrics::record_lookup("empty");
                Lookup::Handled(None)
            }
        }
    }

    fn classify(&self, input: &str, index: usize) -> Option<&str> {
        let candidate: ZonedAddr = match parse_candidate(input) {
            Ok(ip) => ip,
            Err(e) => {
                tracing::debug!(
                    source = %self.source,
                    value = %input,
                    error = %e,
                    "Source is not an IP address, treating as no match"
                );
                metrics::record_invalid_source();
                return None;
            }
        };
        self.table.lookup(&candidate, index)
    }
}

impl Provider for IpMap {
    fn lookup(&self, key: &str, eval: &Evaluator<'_>) -> Lookup {
        self.resolve(key, eval)
    }
}
