//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IShareRepository`] - Persistent storage for share records
//! - [`IMountRegistry`] - Turns accepted shares into live mounts
//! - [`IRemoteTransport`] - Reachability checks against remote endpoints

pub mod mount_registry;
pub mod remote_transport;
pub mod share_repository;

pub use mount_registry::{IMountRegistry, MountRequest};
pub use remote_transport::{IRemoteTransport, RemoteStatus};
pub use share_repository::{IShareRepository, ShareFilter};
