//! Domain entities and business logic
//!
//! This module contains the core domain types for federated shares:
//! - Newtypes for type-safe identifiers and validated domain types
//! - The share record entity and its lifecycle state
//! - The mount point naming resolver
//! - Domain-specific error types

pub mod errors;
pub mod naming;
pub mod newtypes;
pub mod share;

// Re-export commonly used types
pub use errors::DomainError;
pub use naming::MountPointResolver;
pub use newtypes::*;
pub use share::{NewShareRecord, ShareRecord, ShareState};
