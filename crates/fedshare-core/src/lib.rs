//! fedshare Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `ShareRecord`, `ShareName`, `MountPoint`, `UserId`
//! - **Naming** - `MountPointResolver`, placeholder and `-N` suffix generation
//! - **Use cases** - `ShareManager` (add, list, accept, decline, remove)
//! - **Port definitions** - Traits for adapters: `IShareRepository`, `IMountRegistry`, `IRemoteTransport`
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure business logic with no I/O.
//! Ports define trait interfaces that adapter crates implement.
//! Use cases orchestrate domain entities through port interfaces.

pub mod config;
pub mod domain;
pub mod logging;
pub mod ports;
pub mod usecases;
