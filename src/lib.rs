//! IP map placeholder service library.

pub mod config;
pub mod http;
pub mod ipmap;
pub mod lifecycle;
pub mod observability;
pub mod placeholder;

pub use config::schema::AppConfig;
pub use http::HttpServer;
pub use ipmap::IpMap;
pub use lifecycle::Shutdown;
pub use placeholder::{Lookup, Replacer};
