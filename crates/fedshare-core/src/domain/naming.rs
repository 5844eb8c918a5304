//! Mount point naming for incoming shares
//!
//! Generates collision-free mount point names per user. Open shares get a
//! placeholder form such as `{{TemporaryMountPointName#/SharedFolder}}`;
//! accepted shares use the bare folder name. Collisions are resolved by
//! appending `-1`, `-2`, ... to the base candidate.

use std::collections::HashSet;

use tracing::debug;

use super::newtypes::{MountPoint, ShareName};

/// Opening marker of a placeholder mount point
pub const PLACEHOLDER_PREFIX: &str = "{{TemporaryMountPointName#";

/// Closing marker of a placeholder mount point
pub const PLACEHOLDER_SUFFIX: &str = "}}";

/// Resolves unique mount point names
pub struct MountPointResolver;

impl MountPointResolver {
    /// Wraps a folder name in the placeholder marker
    ///
    /// Given "/SharedFolder", produces
    /// "{{TemporaryMountPointName#/SharedFolder}}"
    pub fn placeholder(name: &ShareName) -> String {
        format!("{PLACEHOLDER_PREFIX}{name}{PLACEHOLDER_SUFFIX}")
    }

    /// Returns true if the mount point is a placeholder, with or without a suffix
    pub fn is_placeholder(mount_point: &MountPoint) -> bool {
        mount_point.as_str().starts_with(PLACEHOLDER_PREFIX)
    }

    /// First candidate probed for a share in the given acceptance state
    pub fn base_candidate(name: &ShareName, accepted: bool) -> String {
        if accepted {
            name.as_str().to_string()
        } else {
            Self::placeholder(name)
        }
    }

    /// Returns `base` if unused, otherwise the first unused `base-N` for N = 1, 2, ...
    ///
    /// Terminates as long as `exists` reports a finite set of names.
    pub fn generate_unique<F>(base: &str, mut exists: F) -> MountPoint
    where
        F: FnMut(&str) -> bool,
    {
        if !exists(base) {
            return MountPoint::from_resolved(base.to_string());
        }

        let mut suffix: u64 = 1;
        loop {
            let candidate = format!("{base}-{suffix}");
            if !exists(&candidate) {
                debug!(base, candidate = %candidate, probes = suffix, "Resolved mount point collision");
                return MountPoint::from_resolved(candidate);
            }
            suffix += 1;
        }
    }

    /// Resolves a mount point for `name` against the names already used by one user
    pub fn resolve(name: &ShareName, accepted: bool, used: &HashSet<String>) -> MountPoint {
        let base = Self::base_candidate(name, accepted);
        Self::generate_unique(&base, |candidate| used.contains(candidate))
    }
}
