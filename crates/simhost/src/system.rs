//! The two-hook system ABI.
//!
//! A system is a plugin the host drives once per tick. It declares which
//! hooks it implements through its [`SystemDeclaration`]; the runner only
//! calls the hooks a declaration advertises.
//!
//! # Hooks
//!
//! - `pre_update`: runs before physics with read-write store access. Used to
//!   react to newly created entities and write components back.
//! - `update`: runs after the host's kinematics, read-write.
//! - `post_update`: runs after physics with read-only store access. Used to
//!   read results, publish data, and react to removals.
//!
//! Hooks of one system are never called concurrently with each other.
//!
//! # Example
//!
//! ```
//! use simhost::store::EntityStore;
//! use simhost::system::{Capabilities, System, SystemAlias, SystemDeclaration, UpdateInfo};
//!
//! struct Counter {
//!     declaration: SystemDeclaration,
//!     ticks: u64,
//! }
//!
//! impl System for Counter {
//!     fn declaration(&self) -> &SystemDeclaration {
//!         &self.declaration
//!     }
//!
//!     fn post_update(&mut self, info: &UpdateInfo, _store: &dyn EntityStore) {
//!         if !info.paused {
//!             self.ticks += 1;
//!         }
//!     }
//! }
//!
//! let counter = Counter {
//!     declaration: SystemDeclaration::new(
//!         SystemAlias::from_static("example::Counter"),
//!         Capabilities::POST_UPDATE,
//!     ),
//!     ticks: 0,
//! };
//! assert!(counter.declaration().runs(Capabilities::POST_UPDATE));
//! assert!(!counter.declaration().runs(Capabilities::PRE_UPDATE));
//! ```

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use crate::store::EntityStore;

bitflags! {
    /// Hooks a system implements.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Runs before physics, read-write.
        const PRE_UPDATE = 0b001;
        /// Runs after kinematics, read-write.
        const UPDATE = 0b010;
        /// Runs after physics, read-only.
        const POST_UPDATE = 0b100;
    }
}

// =============================================================================
// System Alias
// =============================================================================

/// Stable string name a system is registered and loaded under.
///
/// Aliases can be created from static strings at compile time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SystemAlias(Cow<'static, str>);

impl SystemAlias {
    /// Creates an alias from an owned or borrowed string.
    #[must_use]
    pub fn new(alias: impl Into<String>) -> Self {
        Self(Cow::Owned(alias.into()))
    }

    /// Creates an alias from a static string, usable in `const` context.
    #[must_use]
    pub const fn from_static(alias: &'static str) -> Self {
        Self(Cow::Borrowed(alias))
    }

    /// Returns the alias as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SystemAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&'static str> for SystemAlias {
    fn from(alias: &'static str) -> Self {
        Self::from_static(alias)
    }
}

impl From<String> for SystemAlias {
    fn from(alias: String) -> Self {
        Self(Cow::Owned(alias))
    }
}

// =============================================================================
// Declaration and tick info
// =============================================================================

/// What a system is called and which hooks it implements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemDeclaration {
    /// Registered alias.
    pub alias: SystemAlias,
    /// Implemented hooks.
    pub capabilities: Capabilities,
}

impl SystemDeclaration {
    /// Creates a declaration.
    #[must_use]
    pub const fn new(alias: SystemAlias, capabilities: Capabilities) -> Self {
        Self {
            alias,
            capabilities,
        }
    }

    /// Returns `true` if the system implements every hook in `hooks`.
    #[must_use]
    pub fn runs(&self, hooks: Capabilities) -> bool {
        self.capabilities.contains(hooks)
    }
}

/// Per-tick information passed to every hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateInfo {
    /// Number of non-paused steps taken, including the current one.
    pub iterations: u64,
    /// Simulation time at the end of the current step.
    pub sim_time: Duration,
    /// Step size of the current step; zero while paused.
    pub dt: Duration,
    /// Whether the simulation is paused.
    pub paused: bool,
}

// =============================================================================
// System Trait
// =============================================================================

/// A plugin driven by the host once per tick.
///
/// Systems must be `Send`: the runner fans post-update hooks of different
/// systems out across threads. A single system still sees its hooks called
/// serially.
pub trait System: Send {
    /// Returns the system's declaration.
    fn declaration(&self) -> &SystemDeclaration;

    /// Pre-physics hook with read-write store access.
    fn pre_update(&mut self, _info: &UpdateInfo, _store: &mut dyn EntityStore) {}

    /// Post-kinematics hook with read-write store access.
    fn update(&mut self, _info: &UpdateInfo, _store: &mut dyn EntityStore) {}

    /// Post-physics hook with read-only store access.
    fn post_update(&mut self, _info: &UpdateInfo, _store: &dyn EntityStore) {}
}
