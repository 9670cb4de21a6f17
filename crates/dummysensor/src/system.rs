//! The system that binds dummy sensors to sensor entities.
//!
//! [`DummySensorSystem`] watches the host for entities carrying a custom
//! sensor marker and keeps exactly one [`DummySensor`] per such entity.
//!
//! # Tick behaviour
//!
//! - **Pre-update**: every newly created entity with a
//!   [`ComponentKind::CustomSensor`] and a [`ComponentKind::ParentEntity`]
//!   gets a sensor. The sensor is named after the entity's scoped name minus
//!   the world scope, and publishes on the configured topic or, when that is
//!   empty, on `<prefixed scoped name>/rfid`. The chosen topic is written
//!   back as a [`Component::SensorTopic`].
//! - **Post-update**: unless paused, every tracked sensor receives its
//!   entity's world position and is updated with the current simulation
//!   time. Then, paused or not, sensors whose entities lost the marker are
//!   destroyed.
//!
//! Failures are logged and counted in [`Diagnostics`]; one sensor failing
//! never stops the others from being processed.

use std::collections::HashMap;

use simhost::config::SensorConfig;
use simhost::entity::{Component, ComponentKind, EntityId};
use simhost::registry::HostContext;
use simhost::sensor::{create_sensor, Sensor};
use simhost::store::EntityStore;
use simhost::system::{Capabilities, System, SystemDeclaration, UpdateInfo};
use simhost::transport::Node;
use simhost::util::{remove_parent_scope, scoped_name, world_pose};
use tracing::{debug, error, warn};

use crate::sensor::{DummySensor, KIND};
use crate::ALIAS;

/// Failure counters kept by a [`DummySensorSystem`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Sensor entities whose sensor could not be created.
    pub load_failures: u64,
    /// Sensor updates that failed.
    pub update_failures: u64,
    /// Insertions of tracked entities and removals of untracked ones.
    pub consistency_errors: u64,
}

/// Keeps one [`DummySensor`] per live sensor entity.
#[derive(Debug)]
pub struct DummySensorSystem {
    declaration: SystemDeclaration,
    node: Node,
    sensors: HashMap<EntityId, DummySensor>,
    diagnostics: Diagnostics,
}

impl DummySensorSystem {
    /// Creates a system whose sensors publish through `node`.
    #[must_use]
    pub fn new(node: Node) -> Self {
        Self {
            declaration: SystemDeclaration::new(
                ALIAS,
                Capabilities::PRE_UPDATE | Capabilities::POST_UPDATE,
            ),
            node,
            sensors: HashMap::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    /// Constructor registered under [`ALIAS`].
    #[must_use]
    pub fn construct(ctx: &HostContext) -> Box<dyn System> {
        Box::new(Self::new(ctx.transport.node()))
    }

    /// The sensor bound to `entity`, if tracked.
    #[must_use]
    pub fn sensor(&self, entity: EntityId) -> Option<&DummySensor> {
        self.sensors.get(&entity)
    }

    /// Tracked entities in ascending order.
    #[must_use]
    pub fn tracked(&self) -> Vec<EntityId> {
        let mut entities: Vec<_> = self.sensors.keys().copied().collect();
        entities.sort_unstable();
        entities
    }

    /// Number of tracked sensors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    /// Returns `true` if no sensor is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Failure counters since construction.
    #[must_use]
    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics
    }

    fn create_sensor(&mut self, entity: EntityId, store: &mut dyn EntityStore) {
        let Some(Component::CustomSensor(custom)) = store.component(entity, ComponentKind::CustomSensor) else {
            return;
        };

        let mut config: SensorConfig = custom.clone();
        config.name = remove_parent_scope(&scoped_name(store, entity, "::", false), "::");
        if config.topic.is_empty() {
            config.topic = format!("{}/{KIND}", scoped_name(store, entity, "/", true));
        }

        let mut sensor: DummySensor = match create_sensor(&self.node, &config) {
            Ok(sensor) => sensor,
            Err(err) => {
                error!(%entity, sensor = %config.name, %err, "Failed to create sensor");
                self.diagnostics.load_failures += 1;
                return;
            }
        };

        match store.parent(entity).and_then(|parent| store.name(parent)) {
            Some(parent_name) => sensor.set_parent(parent_name),
            None => warn!(%entity, sensor = %config.name, "Sensor parent has no name"),
        }

        store.set_component(entity, Component::SensorTopic(sensor.topic().to_owned()));
        debug!(%entity, sensor = %sensor.name(), topic = %sensor.topic(), "created sensor");
        self.sensors.insert(entity, sensor);
    }

    fn remove_sensor_entities(&mut self, removed: &[EntityId]) {
        for entity in removed {
            match self.sensors.remove(entity) {
                Some(sensor) => {
                    debug!(entity = %entity, sensor = %sensor.name(), "removed sensor");
                    sensor.close();
                }
                None => {
                    error!(entity = %entity, "Internal error, missing dummy sensor");
                    self.diagnostics.consistency_errors += 1;
                }
            }
        }
    }
}

impl System for DummySensorSystem {
    fn declaration(&self) -> &SystemDeclaration {
        &self.declaration
    }

    fn pre_update(&mut self, _info: &UpdateInfo, store: &mut dyn EntityStore) {
        for entity in store.each_new(&[ComponentKind::CustomSensor, ComponentKind::ParentEntity]) {
            if let Some(existing) = self.sensors.get(&entity) {
                error!(
                    %entity,
                    sensor = %existing.name(),
                    "Internal error, entity already has a dummy sensor"
                );
                self.diagnostics.consistency_errors += 1;
                continue;
            }
            self.create_sensor(entity, store);
        }
    }

    fn post_update(&mut self, info: &UpdateInfo, store: &dyn EntityStore) {
        let removed = store.each_removed(ComponentKind::CustomSensor);

        if !info.paused {
            // Entities on their way out are still readable but no longer live.
            let live = self
                .sensors
                .iter_mut()
                .filter(|(entity, _)| removed.binary_search(entity).is_err());
            for (entity, sensor) in live {
                sensor.set_position(world_pose(store, *entity).position);
                if let Err(err) = sensor.update(info.sim_time) {
                    error!(entity = %entity, sensor = %sensor.name(), %err, "Failed to update sensor");
                    self.diagnostics.update_failures += 1;
                }
            }
        }

        self.remove_sensor_entities(&removed);
    }
}
