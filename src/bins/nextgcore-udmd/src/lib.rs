//! NextGCore UDM (Unified Data Management) Library
//!
//! Authentication credential processing of the UDM: 5G HE AKA vector
//! generation over Milenage, AUTS resynchronization and the per-subscriber
//! sequence number authority, served on Nudm-ueau.

pub mod config;
pub mod context;
pub mod error;
pub mod nudm_handler;
pub mod sbi_path;
pub mod sqn;
pub mod ueau;

#[cfg(test)]
mod property_tests;

// Re-export commonly used types
pub use config::{ConfigError, UdmConfig};
pub use context::{SqnAuthority, UdmContext};
pub use error::{UdmError, UdmResult};
pub use nudm_handler::{
    udm_nudm_ueau_handle_get, AuthenticationInfoRequest, AuthenticationInfoResult,
    ResynchronizationInfo,
};
pub use sbi_path::{udm_sbi_close, udm_sbi_open, udm_sbi_request_handler};
pub use ueau::{AuthCredentials, AuthenticationVector, SubscriberKeys};
