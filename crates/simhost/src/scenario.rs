//! JSON scenario files.
//!
//! A scenario describes a world of models, their links, and the custom
//! sensors attached to those links. [`Scenario::spawn`] turns it into
//! entities in a [`World`] with the same hierarchy a loaded world file
//! would produce: world, then model, then link, then sensor.
//!
//! # Example
//!
//! ```
//! use simhost::scenario::Scenario;
//! use simhost::world::World;
//!
//! let scenario = Scenario::from_json_str(r#"{
//!     "world": "default",
//!     "step_size_ms": 1,
//!     "models": [{
//!         "name": "box",
//!         "links": [{
//!             "name": "base",
//!             "sensors": [{ "name": "tag", "kind": "rfid" }]
//!         }]
//!     }]
//! }"#).unwrap();
//!
//! let mut world = World::new();
//! let spawned = scenario.spawn(&mut world).unwrap();
//! assert_eq!(spawned.sensors.len(), 1);
//! ```

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::config::SensorConfig;
use crate::entity::{Component, EntityId, Pose};
use crate::world::World;

const fn default_step_size_ms() -> u64 {
    1
}

fn default_world_name() -> String {
    "default".to_string()
}

/// Errors from loading or spawning a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The scenario file could not be read.
    #[error("failed to read scenario '{path}': {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The scenario is not valid JSON or does not match the schema.
    #[error("invalid scenario: {0}")]
    Json(#[from] serde_json::Error),
    /// Two models share a name.
    #[error("duplicate model name '{0}'")]
    DuplicateModel(String),
    /// The step size is zero.
    #[error("step size must be positive")]
    ZeroStepSize,
}

/// A world description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// World name.
    #[serde(default = "default_world_name")]
    pub world: String,
    /// Simulation step size in milliseconds.
    #[serde(default = "default_step_size_ms")]
    pub step_size_ms: u64,
    /// Top-level models.
    #[serde(default)]
    pub models: Vec<ModelSpec>,
}

/// A model in a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Model name, unique within the world.
    pub name: String,
    /// Pose relative to the world.
    #[serde(default)]
    pub pose: Pose,
    /// Constant linear velocity, integrated by the host each tick.
    #[serde(default)]
    pub velocity: Option<DVec3>,
    /// Links of the model.
    #[serde(default)]
    pub links: Vec<LinkSpec>,
}

/// A link in a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSpec {
    /// Link name.
    pub name: String,
    /// Pose relative to the model.
    #[serde(default)]
    pub pose: Pose,
    /// Custom sensors attached to the link.
    #[serde(default)]
    pub sensors: Vec<SensorConfig>,
}

/// Entities created by [`Scenario::spawn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnedScenario {
    /// The world entity.
    pub world: EntityId,
    /// Model entities by name.
    pub models: BTreeMap<String, EntityId>,
    /// Sensor entities in declaration order.
    pub sensors: Vec<EntityId>,
}

impl Scenario {
    /// Parses a scenario from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Json`] if the text does not parse.
    pub fn from_json_str(json: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a scenario file.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Io`] if the file cannot be read, or
    /// [`ScenarioError::Json`] if it does not parse.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Step size as a duration.
    #[must_use]
    pub fn step_size(&self) -> Duration {
        Duration::from_millis(self.step_size_ms)
    }

    /// Creates the scenario's entities in `world`.
    ///
    /// Nothing is spawned if validation fails.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::DuplicateModel`] if two models share a name,
    /// or [`ScenarioError::ZeroStepSize`] for a zero step size.
    pub fn spawn(&self, world: &mut World) -> Result<SpawnedScenario, ScenarioError> {
        if self.step_size_ms == 0 {
            return Err(ScenarioError::ZeroStepSize);
        }
        let mut seen = BTreeMap::new();
        for model in &self.models {
            if seen.insert(model.name.as_str(), ()).is_some() {
                return Err(ScenarioError::DuplicateModel(model.name.clone()));
            }
        }

        let world_entity = world.spawn([Component::World, Component::Name(self.world.clone())]);
        let mut models = BTreeMap::new();
        let mut sensors = Vec::new();

        for model in &self.models {
            let mut components = vec![
                Component::Model,
                Component::Name(model.name.clone()),
                Component::ParentEntity(world_entity),
                Component::Pose(model.pose),
            ];
            if let Some(velocity) = model.velocity {
                components.push(Component::LinearVelocity(velocity));
            }
            let model_entity = world.spawn(components);
            models.insert(model.name.clone(), model_entity);

            for link in &model.links {
                let link_entity = world.spawn([
                    Component::Link,
                    Component::Name(link.name.clone()),
                    Component::ParentEntity(model_entity),
                    Component::Pose(link.pose),
                ]);

                for sensor in &link.sensors {
                    sensors.push(world.spawn([
                        Component::Name(sensor.name.clone()),
                        Component::ParentEntity(link_entity),
                        Component::Pose(Pose::IDENTITY),
                        Component::CustomSensor(sensor.clone()),
                    ]));
                }
            }
        }

        tracing::debug!(
            world = %self.world,
            models = models.len(),
            sensors = sensors.len(),
            "spawned scenario"
        );

        Ok(SpawnedScenario {
            world: world_entity,
            models,
            sensors,
        })
    }
}
