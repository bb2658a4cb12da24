//! UDM Error Types
//!
//! Every failure of the generate-auth-data procedure is a [`UdmError`]; the
//! variant decides the HTTP status and the ProblemDetails cause.

use ogs_dbi::DbiError;
use ogs_sbi::constants::{cause, status};
use ogs_sbi::{send_error, SbiResponse};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UdmError {
    /// Malformed or missing request input
    #[error("{0}")]
    InvalidInput(String),

    #[error("Subscriber not found: {0}")]
    SubscriberNotFound(String),

    /// Stored credentials absent or malformed
    #[error("Incomplete credentials: {0}")]
    IncompleteCredentials(String),

    /// AUTS failed MAC-S verification
    #[error("AUTS validation failed")]
    SyncFailure,

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Not supported Auth Method [{0}]")]
    UnsupportedAuthMethod(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type UdmResult<T> = Result<T, UdmError>;

impl From<DbiError> for UdmError {
    fn from(err: DbiError) -> Self {
        match err {
            DbiError::SubscriberNotFound(supi) => UdmError::SubscriberNotFound(supi),
            DbiError::InvalidSupi(supi) => UdmError::InvalidInput(format!("Invalid SUPI [{}]", supi)),
            DbiError::FieldNotFound(field) => UdmError::IncompleteCredentials(format!("No {}", field)),
            other => UdmError::Storage(other.to_string()),
        }
    }
}

impl UdmError {
    /// HTTP status code for this error
    pub fn status(&self) -> u16 {
        match self {
            UdmError::InvalidInput(_) => status::BAD_REQUEST,
            UdmError::SubscriberNotFound(_) => status::NOT_FOUND,
            UdmError::IncompleteCredentials(_) | UdmError::Storage(_) => {
                status::INTERNAL_SERVER_ERROR
            }
            UdmError::SyncFailure | UdmError::UnsupportedAuthMethod(_) => status::FORBIDDEN,
            UdmError::NotImplemented(_) => status::NOT_IMPLEMENTED,
        }
    }

    /// ProblemDetails cause for this error
    pub fn cause(&self) -> &'static str {
        match self {
            UdmError::InvalidInput(_) => cause::MANDATORY_IE_INCORRECT,
            UdmError::SubscriberNotFound(_) => cause::USER_NOT_FOUND,
            UdmError::IncompleteCredentials(_) | UdmError::Storage(_) => cause::SYSTEM_FAILURE,
            UdmError::SyncFailure => cause::AUTHENTICATION_REJECTED,
            UdmError::NotImplemented(_) => cause::NOT_IMPLEMENTED,
            UdmError::UnsupportedAuthMethod(_) => cause::UNSUPPORTED_AUTH_METHOD,
        }
    }

    fn title(&self) -> &'static str {
        match self.status() {
            status::BAD_REQUEST => "Bad Request",
            status::NOT_FOUND => "Not Found",
            status::FORBIDDEN => "Forbidden",
            status::NOT_IMPLEMENTED => "Not Implemented",
            _ => "Internal Server Error",
        }
    }

    /// Build the ProblemDetails response for this error
    pub fn to_response(&self) -> SbiResponse {
        send_error(self.status(), self.title(), &self.to_string(), Some(self.cause()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogs_sbi::ProblemDetails;

    #[test]
    fn test_status_mapping() {
        assert_eq!(UdmError::InvalidInput("No servingNetworkName".into()).status(), 400);
        assert_eq!(UdmError::SubscriberNotFound("imsi-1".into()).status(), 404);
        assert_eq!(UdmError::IncompleteCredentials("No K".into()).status(), 500);
        assert_eq!(UdmError::Storage("down".into()).status(), 500);
        assert_eq!(UdmError::SyncFailure.status(), 403);
        assert_eq!(UdmError::UnsupportedAuthMethod("EAP_AKA_PRIME".into()).status(), 403);
        assert_eq!(UdmError::NotImplemented("SUCI".into()).status(), 501);
    }

    #[test]
    fn test_sync_failure_is_distinct() {
        assert_eq!(UdmError::SyncFailure.cause(), "AUTHENTICATION_REJECTED");
        assert_ne!(
            UdmError::SyncFailure.cause(),
            UdmError::UnsupportedAuthMethod("x".into()).cause()
        );
    }

    #[test]
    fn test_from_dbi_error() {
        let err: UdmError = DbiError::SubscriberNotFound("imsi-1".into()).into();
        assert!(matches!(err, UdmError::SubscriberNotFound(_)));
        let err: UdmError = DbiError::FieldNotFound("security".into()).into();
        assert!(matches!(err, UdmError::IncompleteCredentials(_)));
        let err: UdmError = DbiError::NoDbUri.into();
        assert!(matches!(err, UdmError::Storage(_)));
    }

    #[test]
    fn test_to_response() {
        let response = UdmError::SubscriberNotFound("imsi-001010000000001".into()).to_response();
        assert_eq!(response.status, 404);
        let problem: ProblemDetails =
            serde_json::from_str(response.http.content.as_deref().unwrap()).unwrap();
        assert_eq!(problem.cause.as_deref(), Some("USER_NOT_FOUND"));
        assert_eq!(problem.title.as_deref(), Some("Not Found"));
    }
}
