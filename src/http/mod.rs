//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (assign request ID)
//!     → routing engine (method + path → ResolvedRoute)
//!     → dispatch.rs (hand resolved route to a Dispatcher)
//!     → response.rs (routing failures → JSON errors)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod request;
pub mod response;
pub mod server;

pub use dispatch::{DescribeDispatcher, DispatchRequest, Dispatcher};
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::HttpServer;
