//! # Dummy Sensor
//!
//! A minimal RFID-like sensor plugin for the simulation host.
//!
//! The plugin has two parts:
//!
//! - [`DummySensor`]: one sensor instance. It publishes a constant string,
//!   stamped with simulation time and a sequence number, on its own topic.
//! - [`DummySensorSystem`]: the system that creates a sensor for every
//!   custom sensor entity of kind `rfid`, updates them each tick while the
//!   simulation runs, and destroys them when their entities go away.
//!
//! ## Usage
//!
//! ```
//! use simhost::registry::SystemRegistry;
//!
//! let mut registry = SystemRegistry::new();
//! dummysensor::register(&mut registry).unwrap();
//! assert!(registry.contains("dummysensor::DummySensorSystem"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod sensor;
pub mod system;

#[cfg(test)]
mod tests;

use simhost::registry::{RegistryError, SystemRegistry};
use simhost::system::SystemAlias;

pub use error::SensorError;
pub use sensor::{DummySensor, KIND, PAYLOAD};
pub use system::{Diagnostics, DummySensorSystem};

/// Alias the system is registered under.
pub const ALIAS: SystemAlias = SystemAlias::from_static("dummysensor::DummySensorSystem");

/// Registers [`DummySensorSystem`] under [`ALIAS`].
///
/// # Errors
///
/// Returns [`RegistryError::DuplicateAlias`] if the alias is already taken.
pub fn register(registry: &mut SystemRegistry) -> Result<(), RegistryError> {
    registry.register(ALIAS, DummySensorSystem::construct)
}
