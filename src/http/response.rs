//! Response rendering.
//!
//! # Responsibilities
//! - Compile the configured response (status, header names) once per snapshot
//! - Expand body and header templates against the request's replacer
//!
//! # Design Decisions
//! - Only templates present in the response are expanded, so only the
//!   placeholders they reference are ever resolved
//! - A header whose expanded value is not a legal header value is skipped

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::Response;

use crate::config::schema::RespondConfig;
use crate::config::validation::ValidationError;
use crate::placeholder::Replacer;

/// A validated response template.
#[derive(Debug, Clone)]
pub struct ResponseTemplate {
    status: StatusCode,
    body: String,
    headers: Vec<(HeaderName, String)>,
}

impl ResponseTemplate {
    pub fn from_config(config: &RespondConfig) -> Result<Self, ValidationError> {
        let status = StatusCode::from_u16(config.status)
            .map_err(|_| ValidationError::InvalidStatus(config.status))?;
        let headers = config
            .headers
            .iter()
            .map(|h| {
                HeaderName::from_bytes(h.name.as_bytes())
                    .map(|name| (name, h.value.clone()))
                    .map_err(|_| ValidationError::InvalidHeaderName(h.name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            status,
            body: config.body.clone(),
            headers,
        })
    }

    /// Expand the templates for one request.
    pub fn render(&self, repl: &Replacer) -> Response {
        let mut response = Response::new(Body::from(repl.replace_all(&self.body)));
        *response.status_mut() = self.status;

        for (name, template) in &self.headers {
            let value = repl.replace_all(template);
            match HeaderValue::from_str(&value) {
                Ok(v) => {
                    response.headers_mut().append(name.clone(), v);
                }
                Err(_) => {
                    tracing::warn!(header = %name, value = %value, "Skipping invalid header value");
                }
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::HeaderTemplate;

    fn config(status: u16, body: &str, headers: &[(&str, &str)]) -> RespondConfig {
        RespondConfig {
            status,
            body: body.into(),
            headers: headers
                .iter()
                .map(|(n, v)| HeaderTemplate {
                    name: n.to_string(),
                    value: v.to_string(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_render() {
        let template =
            ResponseTemplate::from_config(&config(201, "hi {name}", &[("x-name", "{name}")]))
                .unwrap();
        let mut repl = Replacer::new();
        repl.set("name", "there");

        let response = template.render(&repl);
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["x-name"], "there");

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"hi there");
    }

    #[test]
    fn test_invalid_header_value_skipped() {
        let template =
            ResponseTemplate::from_config(&config(200, "", &[("x-bad", "{v}"), ("x-ok", "ok")]))
                .unwrap();
        let mut repl = Replacer::new();
        repl.set("v", "line\nbreak");

        let response = template.render(&repl);
        assert!(response.headers().get("x-bad").is_none());
        assert_eq!(response.headers()["x-ok"], "ok");
    }

    #[test]
    fn test_invalid_config() {
        assert_eq!(
            ResponseTemplate::from_config(&config(1000, "", &[])).unwrap_err(),
            ValidationError::InvalidStatus(1000)
        );
        assert_eq!(
            ResponseTemplate::from_config(&config(200, "", &[("bad name", "")])).unwrap_err(),
            ValidationError::InvalidHeaderName("bad name".into())
        );
    }
}
