//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Static placeholder values, available to every template.
    pub vars: BTreeMap<String, String>,

    /// IP maps, registered as placeholder providers in this order.
    pub ipmaps: Vec<IpMapConfig>,

    /// Response rendered for every request.
    pub respond: RespondConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// One IP map: classifies a source address into destination placeholders.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IpMapConfig {
    /// Expression yielding the address to classify.
    pub source: String,

    /// Placeholders to define, each written as `{name}`.
    pub destinations: Vec<String>,

    /// Rules, checked in order. The first matching non-null output wins.
    pub mappings: Vec<MappingConfig>,

    /// Fallback per destination when nothing matches (optional).
    pub defaults: Vec<String>,
}

impl Default for IpMapConfig {
    fn default() -> Self {
        Self {
            source: "{http.request.remote.host}".to_string(),
            destinations: Vec::new(),
            mappings: Vec::new(),
            defaults: Vec::new(),
        }
    }
}

/// A single rule: an address or subnet and one output per destination.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MappingConfig {
    /// IP address or CIDR subnet. Must be distinct from other mappings.
    pub input: String,

    /// Positionally correlated with the destinations. `null` leaves a
    /// destination unmapped by this rule.
    #[serde(default)]
    pub outputs: Vec<Option<Value>>,
}

/// Response returned for every request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RespondConfig {
    /// HTTP status code.
    pub status: u16,

    /// Body template.
    pub body: String,

    /// Header templates.
    pub headers: Vec<HeaderTemplate>,
}

impl Default for RespondConfig {
    fn default() -> Self {
        Self {
            status: 200,
            body: String::new(),
            headers: Vec::new(),
        }
    }
}

/// A response header whose value is a placeholder template.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HeaderTemplate {
    pub name: String,
    pub value: String,
}
