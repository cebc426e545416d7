//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a configuration without validating it.
///
/// Files ending in `.json` are read as JSON, anything else as TOML.
pub fn parse_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let config = if is_json {
        serde_json::from_str(&content)?
    } else {
        toml::from_str(&content)?
    };
    Ok(config)
}

/// Load and validate configuration from a TOML or JSON file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = parse_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_toml() {
        let file = write_config(
            ".toml",
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [vars]
            site = "edge-1"

            [[ipmaps]]
            source = "{http.request.header.x-real-ip}"
            destinations = ["{region}", "{tier}"]
            defaults = ["unknown", "free"]

            [[ipmaps.mappings]]
            input = "10.0.0.0/8"
            outputs = ["internal", 3]

            [respond]
            status = 204
            body = "{region}"

            [[respond.headers]]
            name = "x-region"
            value = "{region}"
            "#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.vars["site"], "edge-1");
        assert_eq!(config.ipmaps.len(), 1);
        assert_eq!(config.ipmaps[0].mappings[0].outputs.len(), 2);
        assert_eq!(config.respond.status, 204);
        assert_eq!(config.respond.headers[0].name, "x-region");
        // Unset sections fall back to defaults.
        assert_eq!(config.timeouts.request_secs, 30);
    }

    #[test]
    fn test_load_json_with_nulls() {
        let file = write_config(
            ".json",
            r#"{
                "ipmaps": [{
                    "destinations": ["{a}", "{b}"],
                    "mappings": [{ "input": "::1", "outputs": [null, "b"] }]
                }]
            }"#,
        );

        let config = load_config(file.path()).unwrap();
        let map = &config.ipmaps[0];
        assert_eq!(map.source, "{http.request.remote.host}");
        assert_eq!(map.mappings[0].outputs[0], None);
        assert!(map.mappings[0].outputs[1].is_some());
    }

    #[test]
    fn test_validation_errors_reported() {
        let file = write_config(
            ".toml",
            r#"
            [[ipmaps]]
            destinations = ["{a}", "{b}"]
            defaults = ["only-one"]
            "#,
        );

        match load_config(file.path()) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(
                    errors[0].to_string(),
                    "ipmap 0: 2 destinations != 1 defaults"
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_error() {
        let file = write_config(".toml", "[[ipmaps]\n");
        assert!(matches!(load_config(file.path()), Err(ConfigError::Toml(_))));

        let file = write_config(".json", "{");
        assert!(matches!(load_config(file.path()), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/ipmap.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
