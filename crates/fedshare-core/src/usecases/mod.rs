//! Use cases (interactors) for federated shares
//!
//! This module contains the application use cases that orchestrate
//! domain entities and port interfaces. Use cases are thin coordinators
//! that delegate business rules to domain methods and I/O to ports.
//!
//! ## Use Cases
//!
//! - [`ShareManager`] - Add, list, accept, decline and remove shares of a user

pub mod error;
pub mod manage_shares;

pub use error::ShareError;
pub use manage_shares::{NewShare, ShareManager};
