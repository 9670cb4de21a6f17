//! # Simhost
//!
//! In-process simulation host surface for sensor plugins.
//!
//! This crate provides everything a sensor plugin needs from its host: an
//! entity/component store with per-tick change sets, a topic transport,
//! noise models, sensor configuration, and the system plugin ABI with an
//! alias-keyed registry.
//!
//! ## Architecture
//!
//! - **World**: entities carrying typed components, with deferred removal
//! - **Systems**: plugins with pre-update, update and post-update hooks
//! - **Transport**: named topics, typed publishers and subscribers
//! - **Sensors**: configuration, noise and a shared [`sensor::Sensor`] trait
//!
//! ## Usage
//!
//! ```rust,ignore
//! use simhost::{Scenario, Simulation, SystemRegistry};
//!
//! let scenario = Scenario::from_path("world.json")?;
//! let mut sim = Simulation::new(scenario.step_size());
//! scenario.spawn(sim.world_mut())?;
//! sim.load_system(&registry, "dummysensor::DummySensorSystem")?;
//! sim.run(100);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

// Entities and storage
pub mod entity;
pub mod store;
pub mod world;

// Plugin ABI
pub mod registry;
pub mod simulation;
pub mod system;

// Sensors and messaging
pub mod config;
pub mod msgs;
pub mod noise;
pub mod sensor;
pub mod transport;

// Utilities
pub mod scenario;
pub mod util;

pub use config::{SensorConfig, SensorElement};
pub use entity::{Component, ComponentKind, EntityId, Pose};
pub use msgs::{Header, HeaderData, Message, StringMsg, Time};
pub use noise::{NoiseConfig, NoiseError, NoiseModel};
pub use registry::{HostContext, RegistryError, SystemRegistry};
pub use scenario::{Scenario, ScenarioError};
pub use sensor::{Sensor, SensorBase};
pub use simulation::Simulation;
pub use store::EntityStore;
pub use system::{Capabilities, System, SystemAlias, SystemDeclaration, UpdateInfo};
pub use transport::{Node, Publisher, Subscriber, Transport, TransportError};
pub use world::World;
