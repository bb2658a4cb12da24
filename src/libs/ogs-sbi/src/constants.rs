//! SBI Constants
//!
//! HTTP status codes, methods, content types, and resource names used
//! on the Nudm interfaces.

/// HTTP Status Codes
pub mod status {
    pub const OK: u16 = 200;
    pub const BAD_REQUEST: u16 = 400;
    pub const FORBIDDEN: u16 = 403;
    pub const NOT_FOUND: u16 = 404;
    pub const METHOD_NOT_ALLOWED: u16 = 405;
    pub const PAYLOAD_TOO_LARGE: u16 = 413;
    pub const INTERNAL_SERVER_ERROR: u16 = 500;
    pub const NOT_IMPLEMENTED: u16 = 501;
}

/// HTTP Methods
pub mod method {
    pub const DELETE: &str = "DELETE";
    pub const GET: &str = "GET";
    pub const PATCH: &str = "PATCH";
    pub const POST: &str = "POST";
    pub const PUT: &str = "PUT";
}

/// API Versions
pub mod api {
    pub const V1: &str = "v1";
}

/// Service Names
pub mod service {
    pub const NUDM_UEAU: &str = "nudm-ueau";
}

/// Resource Names
pub mod resource {
    pub const SECURITY_INFORMATION: &str = "security-information";
    pub const GENERATE_AUTH_DATA: &str = "generate-auth-data";
}

/// HTTP Headers
pub mod header {
    pub const ACCEPT: &str = "Accept";
    pub const CONTENT_TYPE: &str = "Content-Type";
}

/// Content Types
pub mod content_type {
    pub const APPLICATION_JSON: &str = "application/json";
    pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";
}

/// ProblemDetails causes (TS 29.503 6.3.7.3, TS 29.500 5.2.7.2)
pub mod cause {
    pub const MANDATORY_IE_INCORRECT: &str = "MANDATORY_IE_INCORRECT";
    pub const USER_NOT_FOUND: &str = "USER_NOT_FOUND";
    pub const AUTHENTICATION_REJECTED: &str = "AUTHENTICATION_REJECTED";
    pub const UNSUPPORTED_AUTH_METHOD: &str = "UNSUPPORTED_AUTH_METHOD";
    pub const SYSTEM_FAILURE: &str = "SYSTEM_FAILURE";
    pub const NOT_IMPLEMENTED: &str = "NOT_IMPLEMENTED";
    pub const RESOURCE_URI_STRUCTURE_NOT_FOUND: &str = "RESOURCE_URI_STRUCTURE_NOT_FOUND";
    pub const METHOD_NOT_ALLOWED: &str = "METHOD_NOT_ALLOWED";
}
