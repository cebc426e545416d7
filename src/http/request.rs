//! Request placeholders.
//!
//! # Responsibilities
//! - Expose `http.request.*` values of the current request as placeholders
//! - Generate the request UUID on first use
//!
//! # Design Decisions
//! - Captured once per request from the request head; the body is never read
//! - Header names are case-insensitive; repeated headers join with ","
//! - A recognized but missing value is "handled, empty", not unhandled
//! - IPv4-mapped peers from dual-stack listeners are reported as IPv4

use std::net::SocketAddr;
use std::sync::OnceLock;

use axum::extract::ConnectInfo;
use axum::http::{header, HeaderMap, Method, Request, Uri};

use crate::placeholder::{Evaluator, Lookup, Provider};

pub const X_REQUEST_ID: &str = "x-request-id";

const PREFIX: &str = "http.request.";

/// Placeholder provider over one request's head.
#[derive(Debug)]
pub struct RequestVars {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    remote: Option<SocketAddr>,
    uuid: OnceLock<String>,
}

impl RequestVars {
    pub fn from_request<B>(req: &Request<B>) -> Self {
        Self {
            method: req.method().clone(),
            uri: req.uri().clone(),
            headers: req.headers().clone(),
            remote: req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr),
            uuid: OnceLock::new(),
        }
    }

    /// The request UUID, generated on first call.
    pub fn uuid(&self) -> &str {
        self.uuid.get_or_init(|| uuid::Uuid::new_v4().to_string())
    }

    fn hostport(&self) -> Option<&str> {
        self.headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .or_else(|| self.uri.authority().map(|a| a.as_str()))
    }

    fn header(&self, name: &str) -> Option<String> {
        let values: Vec<&str> = self
            .headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        (!values.is_empty()).then(|| values.join(","))
    }

    fn field(&self, key: &str) -> Lookup {
        let value = match key {
            "method" => Some(self.method.to_string()),
            "host" => self.hostport().map(|hp| strip_port(hp).to_string()),
            "hostport" => self.hostport().map(str::to_string),
            "uri" => self.uri.path_and_query().map(|pq| pq.to_string()),
            "uri.path" => Some(self.uri.path().to_string()),
            "uri.query" => self.uri.query().map(str::to_string),
            "remote.host" => self.remote.map(|a| a.ip().to_canonical().to_string()),
            "remote.port" => self.remote.map(|a| a.port().to_string()),
            "uuid" => Some(self.uuid().to_string()),
            _ => return Lookup::Unhandled,
        };
        Lookup::Handled(value)
    }
}

/// Drop a trailing `:port`, keeping bracketed IPv6 hosts intact.
fn strip_port(hostport: &str) -> &str {
    if let Some(rest) = hostport.strip_prefix('[') {
        return rest.split_once(']').map_or(hostport, |(host, _)| host);
    }
    match hostport.rsplit_once(':') {
        Some((host, port)) if port.bytes().all(|b| b.is_ascii_digit()) => host,
        _ => hostport,
    }
}

impl Provider for RequestVars {
    fn lookup(&self, key: &str, _eval: &Evaluator<'_>) -> Lookup {
        let Some(key) = key.strip_prefix(PREFIX) else {
            return Lookup::Unhandled;
        };
        if let Some(name) = key.strip_prefix("header.") {
            return Lookup::Handled(self.header(name));
        }
        self.field(key)
    }
}
