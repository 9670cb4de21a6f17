//! In-memory entity store with per-tick change tracking.
//!
//! [`World`] is the host's storage. It implements
//! [`EntityStore`](crate::store::EntityStore) for systems and adds the
//! lifecycle operations only the host performs: spawning, removal requests
//! and the end-of-tick [`clear_changes`](World::clear_changes).
//!
//! # Removal is deferred
//!
//! [`remove_entity`](World::remove_entity) only marks an entity. It stays
//! readable (so post-update systems can still inspect what is going away)
//! and is reported by `each_removed` for every component kind it carries.
//! The entity is erased by the next `clear_changes`.
//!
//! # Example
//!
//! ```
//! use simhost::entity::{Component, ComponentKind};
//! use simhost::store::EntityStore;
//! use simhost::world::World;
//!
//! let mut world = World::new();
//! let root = world.spawn([Component::Name("default".into()), Component::World]);
//! assert_eq!(world.each_new(&[ComponentKind::World]), vec![root]);
//!
//! world.clear_changes();
//! assert!(world.each_new(&[ComponentKind::World]).is_empty());
//!
//! world.remove_entity(root, true);
//! assert_eq!(world.each_removed(ComponentKind::Name), vec![root]);
//! world.clear_changes();
//! assert!(!world.has_entity(root));
//! ```

use std::collections::{BTreeMap, BTreeSet};

use crate::entity::{Component, ComponentKind, EntityId};
use crate::store::EntityStore;

/// Components attached to one entity, keyed by kind.
type Components = BTreeMap<ComponentKind, Component>;

/// The host's entity/component storage.
#[derive(Debug, Clone, Default)]
pub struct World {
    /// Monotonically increasing id counter. Ids are never reused.
    next_id: u64,
    /// Entity storage with deterministic iteration order.
    entities: BTreeMap<EntityId, Components>,
    /// Entities created since the last clear.
    created: BTreeSet<EntityId>,
    /// Entities marked for removal; erased by the next clear.
    pending_removal: BTreeSet<EntityId>,
    /// Component kinds removed from surviving entities since the last clear.
    removed_components: BTreeMap<EntityId, BTreeSet<ComponentKind>>,
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an entity carrying `components` and returns its id.
    ///
    /// Later components replace earlier ones of the same kind.
    pub fn spawn(&mut self, components: impl IntoIterator<Item = Component>) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;

        let components = components
            .into_iter()
            .map(|component| (component.kind(), component))
            .collect();
        self.entities.insert(id, components);
        self.created.insert(id);
        id
    }

    /// Marks `entity` for removal, together with all of its descendants when
    /// `recursive` is set.
    ///
    /// Returns `false` if the entity does not exist.
    pub fn remove_entity(&mut self, entity: EntityId, recursive: bool) -> bool {
        if !self.entities.contains_key(&entity) {
            return false;
        }
        self.pending_removal.insert(entity);
        if recursive {
            let mut stack = self.children(entity);
            while let Some(child) = stack.pop() {
                if self.pending_removal.insert(child) {
                    stack.extend(self.children(child));
                }
            }
        }
        true
    }

    /// Removes one component from a surviving entity and returns it.
    pub fn remove_component(&mut self, entity: EntityId, kind: ComponentKind) -> Option<Component> {
        let removed = self.entities.get_mut(&entity)?.remove(&kind)?;
        self.removed_components.entry(entity).or_default().insert(kind);
        Some(removed)
    }

    /// Mutable access to a component.
    #[must_use]
    pub fn component_mut(&mut self, entity: EntityId, kind: ComponentKind) -> Option<&mut Component> {
        self.entities.get_mut(&entity)?.get_mut(&kind)
    }

    /// Erases entities pending removal and resets the change sets.
    ///
    /// The host calls this once per tick, after post-update.
    pub fn clear_changes(&mut self) {
        for entity in std::mem::take(&mut self.pending_removal) {
            self.entities.remove(&entity);
        }
        self.created.clear();
        self.removed_components.clear();
    }

    /// Returns `true` if `entity` has been marked for removal.
    #[must_use]
    pub fn is_pending_removal(&self, entity: EntityId) -> bool {
        self.pending_removal.contains(&entity)
    }

    /// Direct children of `entity`, ascending.
    #[must_use]
    pub fn children(&self, entity: EntityId) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, components)| {
                matches!(
                    components.get(&ComponentKind::ParentEntity),
                    Some(Component::ParentEntity(parent)) if *parent == entity
                )
            })
            .map(|(id, _)| *id)
            .collect()
    }

    /// Finds a direct child of `parent` by name.
    #[must_use]
    pub fn child_by_name(&self, parent: EntityId, name: &str) -> Option<EntityId> {
        self.children(parent)
            .into_iter()
            .find(|child| self.name(*child) == Some(name))
    }

    /// Entities carrying a component of `kind`, ascending.
    #[must_use]
    pub fn entities_with(&self, kind: ComponentKind) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, components)| components.contains_key(&kind))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Number of entities, including those pending removal.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if the world has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl EntityStore for World {
    fn each_new(&self, kinds: &[ComponentKind]) -> Vec<EntityId> {
        self.created
            .iter()
            .copied()
            .filter(|id| {
                self.entities
                    .get(id)
                    .is_some_and(|components| kinds.iter().all(|kind| components.contains_key(kind)))
            })
            .collect()
    }

    fn each_removed(&self, kind: ComponentKind) -> Vec<EntityId> {
        let removed_entities = self.pending_removal.iter().copied().filter(|id| {
            self.entities
                .get(id)
                .is_some_and(|components| components.contains_key(&kind))
        });
        let removed_components = self
            .removed_components
            .iter()
            .filter(|(_, kinds)| kinds.contains(&kind))
            .map(|(id, _)| *id);

        removed_entities
            .chain(removed_components)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn component(&self, entity: EntityId, kind: ComponentKind) -> Option<&Component> {
        self.entities.get(&entity)?.get(&kind)
    }

    fn set_component(&mut self, entity: EntityId, component: Component) -> bool {
        match self.entities.get_mut(&entity) {
            Some(components) => {
                components.insert(component.kind(), component);
                true
            }
            None => false,
        }
    }

    fn has_entity(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }
}
