//! Test setup utilities.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use simhost::config::SensorConfig;
use simhost::entity::{Component, ComponentKind, EntityId};
use simhost::msgs::StringMsg;
use simhost::store::EntityStore;
use simhost::system::{System, UpdateInfo};
use simhost::transport::{Subscriber, Transport};
use simhost::world::World;

use crate::sensor::KIND;
use crate::system::DummySensorSystem;

/// Step size used by every rig.
pub const STEP: Duration = Duration::from_millis(1);

/// Installs a test-writer subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// An rfid sensor configuration with an optional explicit topic.
pub fn rfid(name: &str, topic: &str) -> SensorConfig {
    SensorConfig::new(name, KIND).with_topic(topic)
}

// =============================================================================
// Rig
// =============================================================================

/// A world, a transport and a system ticked by hand.
///
/// Keeps the system inspectable, unlike a system boxed inside a simulation.
pub struct Rig {
    pub world: World,
    pub transport: Transport,
    pub system: DummySensorSystem,
    pub link: EntityId,
    pub model: EntityId,
    info: UpdateInfo,
}

impl Rig {
    /// `default / box / base`, with sensors spawned under `base`.
    pub fn new() -> Self {
        init_tracing();
        let transport = Transport::new();
        let mut world = World::new();
        let root = world.spawn([Component::World, Component::Name("default".into())]);
        let model = world.spawn([
            Component::Model,
            Component::Name("box".into()),
            Component::ParentEntity(root),
        ]);
        let link = world.spawn([
            Component::Link,
            Component::Name("base".into()),
            Component::ParentEntity(model),
        ]);
        // The scaffold itself is not interesting to the system
        world.clear_changes();

        Self {
            system: DummySensorSystem::new(transport.node()),
            world,
            transport,
            link,
            model,
            info: UpdateInfo::default(),
        }
    }

    /// Spawns a sensor entity under the link.
    pub fn spawn_sensor(&mut self, config: SensorConfig) -> EntityId {
        self.world.spawn([
            Component::Name(config.name.clone()),
            Component::ParentEntity(self.link),
            Component::CustomSensor(config),
        ])
    }

    /// Runs one tick: pre-update, post-update, then clears changes.
    pub fn tick(&mut self, paused: bool) {
        self.info.paused = paused;
        if paused {
            self.info.dt = Duration::ZERO;
        } else {
            self.info.iterations += 1;
            self.info.sim_time += STEP;
            self.info.dt = STEP;
        }
        self.system.pre_update(&self.info, &mut self.world);
        self.system.post_update(&self.info, &self.world);
        self.world.clear_changes();
    }

    /// Subscribes to `topic`.
    pub fn subscribe(&self, topic: &str) -> Subscriber<StringMsg> {
        self.transport.node().subscribe(topic).expect("subscribe")
    }

    /// Topic recorded on `entity`, if any.
    pub fn topic_of(&self, entity: EntityId) -> Option<String> {
        match self.world.component(entity, ComponentKind::SensorTopic) {
            Some(Component::SensorTopic(topic)) => Some(topic.clone()),
            _ => None,
        }
    }
}

// =============================================================================
// Mock store
// =============================================================================

/// Store whose change sets are scripted by the test.
///
/// Unlike [`World`], it can report removals of entities that never existed.
#[derive(Debug, Default)]
pub struct MockStore {
    components: BTreeMap<EntityId, BTreeMap<ComponentKind, Component>>,
    new: BTreeSet<EntityId>,
    removed: BTreeSet<EntityId>,
}

impl MockStore {
    pub fn insert(&mut self, entity: EntityId, components: impl IntoIterator<Item = Component>) {
        self.components
            .insert(entity, components.into_iter().map(|c| (c.kind(), c)).collect());
        self.new.insert(entity);
    }

    pub fn report_removed(&mut self, entity: EntityId) {
        self.removed.insert(entity);
    }

    pub fn clear(&mut self) {
        for entity in std::mem::take(&mut self.removed) {
            self.components.remove(&entity);
        }
        self.new.clear();
    }
}

impl EntityStore for MockStore {
    fn each_new(&self, kinds: &[ComponentKind]) -> Vec<EntityId> {
        self.new
            .iter()
            .copied()
            .filter(|entity| kinds.iter().all(|kind| self.has_component(*entity, *kind)))
            .collect()
    }

    fn each_removed(&self, _kind: ComponentKind) -> Vec<EntityId> {
        self.removed.iter().copied().collect()
    }

    fn component(&self, entity: EntityId, kind: ComponentKind) -> Option<&Component> {
        self.components.get(&entity)?.get(&kind)
    }

    fn set_component(&mut self, entity: EntityId, component: Component) -> bool {
        match self.components.get_mut(&entity) {
            Some(components) => {
                components.insert(component.kind(), component);
                true
            }
            None => false,
        }
    }

    fn has_entity(&self, entity: EntityId) -> bool {
        self.components.contains_key(&entity)
    }
}
