//! SBI Message Structures
//!
//! Request/response containers exchanged between the HTTP/2 server and
//! the application handlers, plus the RFC 7807 `ProblemDetails` body.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::{content_type, header, method};
use crate::error::SbiResult;

/// Request line of an SBI message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SbiHeader {
    pub method: String,
    pub uri: String,
}

impl SbiHeader {
    pub fn with_method_uri(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
        }
    }

    /// Path of the URI without the query string
    pub fn path(&self) -> &str {
        self.uri.split('?').next().unwrap_or(&self.uri)
    }

    /// Non-empty path segments, e.g.
    /// `["nudm-ueau", "v1", "imsi-...", "security-information", "generate-auth-data"]`
    pub fn resource_components(&self) -> Vec<&str> {
        self.path().split('/').filter(|s| !s.is_empty()).collect()
    }
}

/// Headers, query parameters and body of an SBI message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SbiHttpMessage {
    pub headers: HashMap<String, String>,
    pub params: HashMap<String, String>,
    pub content: Option<String>,
}

impl SbiHttpMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(key.into(), value.into());
    }

    /// Header lookup, case-insensitive on the name
    pub fn get_header(&self, key: &str) -> Option<&String> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn get_param(&self, key: &str) -> Option<&String> {
        self.params.get(key)
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = Some(content.into());
    }
}

/// Incoming SBI request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SbiRequest {
    pub header: SbiHeader,
    pub http: SbiHttpMessage,
}

impl SbiRequest {
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            header: SbiHeader::with_method_uri(method, uri),
            http: SbiHttpMessage::new(),
        }
    }

    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(method::GET, uri)
    }

    pub fn post(uri: impl Into<String>) -> Self {
        Self::new(method::POST, uri)
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.http.set_header(key, value);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.http.set_param(key, value);
        self
    }

    pub fn with_body(mut self, content: impl Into<String>, content_type: &str) -> Self {
        self.http.set_header(header::CONTENT_TYPE, content_type);
        self.http.set_content(content);
        self
    }

    /// Serialize `body` as the JSON payload of the request
    pub fn with_json_body<T: Serialize>(self, body: &T) -> SbiResult<Self> {
        let content = serde_json::to_string(body)?;
        Ok(self.with_body(content, content_type::APPLICATION_JSON))
    }
}

/// Outgoing SBI response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SbiResponse {
    pub status: u16,
    pub http: SbiHttpMessage,
}

impl SbiResponse {
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            http: SbiHttpMessage::new(),
        }
    }

    pub fn ok() -> Self {
        Self::with_status(200)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.http.set_header(key, value);
        self
    }

    pub fn with_body(mut self, content: impl Into<String>, content_type: &str) -> Self {
        self.http.set_header(header::CONTENT_TYPE, content_type);
        self.http.set_content(content);
        self
    }

    /// Serialize `body` as the JSON payload of the response
    pub fn with_json_body<T: Serialize>(self, body: &T) -> SbiResult<Self> {
        let content = serde_json::to_string(body)?;
        Ok(self.with_body(content, content_type::APPLICATION_JSON))
    }
}

/// Invalid parameter entry of a ProblemDetails body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidParam {
    pub param: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// RFC 7807 problem details (TS 29.571 ProblemDetails)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub problem_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_params: Option<Vec<InvalidParam>>,
}

impl ProblemDetails {
    pub fn with_status(status: i32) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn with_invalid_param(mut self, param: impl Into<String>, reason: Option<String>) -> Self {
        self.invalid_params
            .get_or_insert_with(Vec::new)
            .push(InvalidParam {
                param: param.into(),
                reason,
            });
        self
    }
}
