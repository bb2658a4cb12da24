//! NextGCore Database Interface Library
//!
//! This crate provides access to the authentication subscription of each
//! subscriber: MongoDB for deployments and an in-memory store for
//! configuration-seeded and test setups.

pub mod types;
pub mod mongoc;
pub mod subscription;

#[cfg(test)]
mod property_tests;

// Re-export commonly used types
pub use types::*;
pub use mongoc::{DbiError, DbiResult, MongoDbi};
pub use subscription::{AuthSubscriptionStore, MemoryDbi};
