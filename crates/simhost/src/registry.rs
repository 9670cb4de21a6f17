//! Alias-keyed system registry.
//!
//! Plugins make themselves discoverable by registering a constructor under a
//! stable alias. The host later instantiates systems by alias, typically from
//! a scenario or command line, without linking against the plugin's types.
//!
//! A registry can be used locally, or installed once as the process-wide
//! registry with [`install_global`].
//!
//! # Example
//!
//! ```
//! use simhost::registry::{HostContext, SystemRegistry};
//! use simhost::system::{Capabilities, System, SystemAlias, SystemDeclaration};
//! use simhost::transport::Transport;
//!
//! struct Noop(SystemDeclaration);
//!
//! impl System for Noop {
//!     fn declaration(&self) -> &SystemDeclaration {
//!         &self.0
//!     }
//! }
//!
//! const ALIAS: SystemAlias = SystemAlias::from_static("example::Noop");
//!
//! let mut registry = SystemRegistry::new();
//! registry
//!     .register(ALIAS, |_ctx| {
//!         Box::new(Noop(SystemDeclaration::new(ALIAS, Capabilities::empty())))
//!     })
//!     .unwrap();
//!
//! let ctx = HostContext::new(Transport::new());
//! let system = registry.instantiate("example::Noop", &ctx).unwrap();
//! assert_eq!(system.declaration().alias.as_str(), "example::Noop");
//! ```

use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::system::{System, SystemAlias};
use crate::transport::Transport;

/// Handles the host passes to system constructors.
#[derive(Debug, Clone, Default)]
pub struct HostContext {
    /// Transport systems create their nodes on.
    pub transport: Transport,
}

impl HostContext {
    /// Creates a context around `transport`.
    #[must_use]
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }
}

/// Builds a fresh system instance.
pub type SystemConstructor = fn(&HostContext) -> Box<dyn System>;

/// Errors from registering or instantiating systems.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A constructor is already registered under this alias.
    #[error("system alias '{0}' is already registered")]
    DuplicateAlias(SystemAlias),
    /// No constructor is registered under this alias.
    #[error("unknown system alias '{0}'")]
    UnknownAlias(String),
    /// The process-wide registry was already installed.
    #[error("global system registry is already installed")]
    AlreadyInstalled,
}

/// Maps aliases to system constructors.
#[derive(Debug, Default, Clone)]
pub struct SystemRegistry {
    constructors: BTreeMap<SystemAlias, SystemConstructor>,
}

impl SystemRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `constructor` under `alias`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateAlias`] if the alias is taken. The
    /// existing registration is left in place.
    pub fn register(
        &mut self,
        alias: impl Into<SystemAlias>,
        constructor: SystemConstructor,
    ) -> Result<(), RegistryError> {
        let alias = alias.into();
        if self.constructors.contains_key(&alias) {
            return Err(RegistryError::DuplicateAlias(alias));
        }
        tracing::debug!(alias = %alias, "registered system");
        self.constructors.insert(alias, constructor);
        Ok(())
    }

    /// Creates a new instance of the system registered under `alias`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownAlias`] if nothing is registered
    /// under `alias`.
    pub fn instantiate(&self, alias: &str, ctx: &HostContext) -> Result<Box<dyn System>, RegistryError> {
        self.constructors
            .get(&SystemAlias::new(alias))
            .map(|constructor| constructor(ctx))
            .ok_or_else(|| RegistryError::UnknownAlias(alias.to_string()))
    }

    /// Returns `true` if `alias` is registered.
    #[must_use]
    pub fn contains(&self, alias: &str) -> bool {
        self.constructors.contains_key(&SystemAlias::new(alias))
    }

    /// Registered aliases in sorted order.
    pub fn aliases(&self) -> impl Iterator<Item = &SystemAlias> {
        self.constructors.keys()
    }

    /// Number of registered systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

// =============================================================================
// Process-wide registry
// =============================================================================

static GLOBAL: OnceLock<SystemRegistry> = OnceLock::new();

/// Installs `registry` as the process-wide registry.
///
/// # Errors
///
/// Returns [`RegistryError::AlreadyInstalled`] on every call after the first.
pub fn install_global(registry: SystemRegistry) -> Result<(), RegistryError> {
    GLOBAL.set(registry).map_err(|_| RegistryError::AlreadyInstalled)
}

/// The process-wide registry, if one was installed.
#[must_use]
pub fn global() -> Option<&'static SystemRegistry> {
    GLOBAL.get()
}
