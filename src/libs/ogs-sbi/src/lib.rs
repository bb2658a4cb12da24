//! NextGCore SBI (Service Based Interface) Library
//!
//! This crate provides the HTTP/2 SBI server side used by 5G core network
//! functions: request/response messages, RFC 7807 problem details and a
//! hyper-based server that hands each request to an application handler.
//!
//! # Modules
//!
//! - [`constants`] - HTTP status codes, methods, headers, resource names
//! - [`message`] - SBI message structures (request, response, headers)
//! - [`server`] - HTTP/2 server implementation
//! - [`error`] - Error types

pub mod constants;
pub mod error;
pub mod message;
pub mod server;

// Re-export commonly used types
pub use error::{SbiError, SbiResult};
pub use message::{
    InvalidParam, ProblemDetails, SbiHeader, SbiHttpMessage, SbiRequest, SbiResponse,
};
pub use server::{
    send_bad_request, send_error, send_forbidden, send_internal_error, send_method_not_allowed,
    send_not_found, send_not_implemented, SbiRequestHandler, SbiServer, SbiServerConfig,
    OGS_SBI_MAX_BODY_SIZE,
};
