//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, load current Snapshot)
//!     → request.rs (RequestVars: http.request.* placeholders)
//!     → Replacer = vars + RequestVars + ip maps (nothing resolved yet)
//!     → response.rs (expand body/header templates; resolves on demand)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestVars, X_REQUEST_ID};
pub use response::ResponseTemplate;
pub use server::{AppState, HttpServer, Snapshot};
