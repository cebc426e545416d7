//! Configuration validation.
//!
//! # Responsibilities
//! - Normalize ip map destinations (`{name}` → `name`)
//! - Check shape: defaults and outputs line up with destinations
//! - Check every rule input is an address or subnet, and unique
//! - Check host settings (listener address, response status, header names)
//!
//! # Design Decisions
//! - Per map validation is fail-fast: first problem wins
//! - `validate_config` still reports one error per broken map, plus host errors
//! - Runs before config is accepted into the system, never per request

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::http::{HeaderName, StatusCode};
use thiserror::Error;

use crate::config::schema::{AppConfig, MappingConfig};
use crate::ipmap::matcher::RuleInput;

/// A configuration problem, located by index and offending value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("destination {index} ('{value}') must be a placeholder and only a placeholder")]
    InvalidDestinationSyntax { index: usize, value: String },

    #[error("destination {index} ('{name}') duplicates destination {previous}")]
    DuplicateDestination {
        index: usize,
        name: String,
        previous: usize,
    },

    #[error("{destinations} destinations != {defaults} defaults")]
    DefaultCountMismatch { destinations: usize, defaults: usize },

    #[error("mapping {index} has an invalid input '{input}'; it doesn't look like an IP or subnet")]
    InvalidRuleInput { index: usize, input: String },

    #[error("mapping {index} has a duplicate input '{input}' previously used with mapping {previous}")]
    DuplicateRuleInput {
        index: usize,
        input: String,
        previous: usize,
    },

    #[error("mapping {index} has {outputs} outputs but there are {destinations} destinations defined")]
    OutputCountMismatch {
        index: usize,
        outputs: usize,
        destinations: usize,
    },

    #[error("ipmap {map}: {error}")]
    InMap {
        map: usize,
        #[source]
        error: Box<ValidationError>,
    },

    #[error("invalid listener address '{0}'")]
    InvalidListenerAddress(String),

    #[error("invalid response status {0}")]
    InvalidStatus(u16),

    #[error("invalid response header name '{0}'")]
    InvalidHeaderName(String),
}

/// Strip the `{}` wrapper from each destination.
///
/// A destination must start with its only `{`. Trailing `}` are trimmed.
pub fn normalize_destinations(destinations: &[String]) -> Result<Vec<String>, ValidationError> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(destinations.len());

    for (index, dest) in destinations.iter().enumerate() {
        let invalid = || ValidationError::InvalidDestinationSyntax {
            index,
            value: dest.clone(),
        };
        if dest.matches('{').count() != 1 || !dest.starts_with('{') {
            return Err(invalid());
        }
        let name = dest.trim_matches(['{', '}']);
        if name.is_empty() || name.contains('}') {
            return Err(invalid());
        }
        if let Some(&previous) = seen.get(name) {
            return Err(ValidationError::DuplicateDestination {
                index,
                name: name.to_string(),
                previous,
            });
        }
        seen.insert(name.to_string(), index);
        names.push(name.to_string());
    }

    Ok(names)
}

/// Check defaults and mappings against the normalized destinations.
pub fn validate_ipmap(
    destinations: &[String],
    defaults: &[String],
    mappings: &[MappingConfig],
) -> Result<(), ValidationError> {
    let n_dest = destinations.len();
    if !defaults.is_empty() && defaults.len() != n_dest {
        return Err(ValidationError::DefaultCountMismatch {
            destinations: n_dest,
            defaults: defaults.len(),
        });
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (index, mapping) in mappings.iter().enumerate() {
        let input = mapping.input.as_str();
        if RuleInput::parse(input).is_err() {
            return Err(ValidationError::InvalidRuleInput {
                index,
                input: input.to_string(),
            });
        }
        if let Some(&previous) = seen.get(input) {
            return Err(ValidationError::DuplicateRuleInput {
                index,
                input: input.to_string(),
                previous,
            });
        }
        seen.insert(input, index);

        if mapping.outputs.len() != n_dest {
            return Err(ValidationError::OutputCountMismatch {
                index,
                outputs: mapping.outputs.len(),
                destinations: n_dest,
            });
        }
    }

    Ok(())
}

/// Validate a whole configuration, collecting every error found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidListenerAddress(
            config.listener.bind_address.clone(),
        ));
    }

    for (map, ipmap) in config.ipmaps.iter().enumerate() {
        let result = normalize_destinations(&ipmap.destinations)
            .and_then(|dests| validate_ipmap(&dests, &ipmap.defaults, &ipmap.mappings));
        if let Err(error) = result {
            errors.push(ValidationError::InMap {
                map,
                error: Box::new(error),
            });
        }
    }

    if StatusCode::from_u16(config.respond.status).is_err() {
        errors.push(ValidationError::InvalidStatus(config.respond.status));
    }

    for header in &config.respond.headers {
        if HeaderName::from_bytes(header.name.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeaderName(header.name.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
