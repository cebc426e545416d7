//! Shared helpers for integration tests.

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use ipmap_proxy::config::schema::{HeaderTemplate, IpMapConfig, MappingConfig};
use ipmap_proxy::AppConfig;
use serde_json::Value;
use tower::ServiceExt;

pub const SOURCE: &str = "{http.request.header.x-test-input}";

#[allow(dead_code)]
/// A config with one map over `x-test-input` whose response body is `body`.
pub fn config_with_map(
    destinations: &[&str],
    mappings: Vec<(&str, Vec<Option<Value>>)>,
    defaults: &[&str],
    body: &str,
) -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.ipmaps.push(IpMapConfig {
        source: SOURCE.into(),
        destinations: destinations.iter().map(|s| s.to_string()).collect(),
        mappings: mappings
            .into_iter()
            .map(|(input, outputs)| MappingConfig {
                input: input.into(),
                outputs,
            })
            .collect(),
        defaults: defaults.iter().map(|s| s.to_string()).collect(),
    });
    config.respond.body = body.into();
    config
}

#[allow(dead_code)]
pub fn header(name: &str, value: &str) -> HeaderTemplate {
    HeaderTemplate {
        name: name.into(),
        value: value.into(),
    }
}

#[allow(dead_code)]
/// Send one GET through the router, with `x-test-input` set when given.
pub async fn get(router: Router, input: Option<&str>) -> (StatusCode, HeaderMap, String) {
    let mut builder = Request::builder().uri("/");
    if let Some(input) = input {
        builder = builder.header("x-test-input", input);
    }
    let response = router
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}
