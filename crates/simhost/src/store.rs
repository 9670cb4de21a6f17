//! The entity/component store capability handed to systems.
//!
//! Systems never see the host's storage directly. They receive a
//! `&mut dyn EntityStore` during pre-update and a `&dyn EntityStore` during
//! post-update, and go through this narrow interface: change-set iteration,
//! component reads, and component writes.
//!
//! # Change sets
//!
//! The store tracks two sets between clears:
//! - entities created since the last clear ([`each_new`](EntityStore::each_new))
//! - entities that lost a component kind since the last clear, either
//!   because the entity is being removed or because the component was
//!   ([`each_removed`](EntityStore::each_removed))
//!
//! Both return ids in ascending order.

use crate::entity::{Component, ComponentKind, EntityId, Pose};

/// Read/write access to the host's entities and components.
pub trait EntityStore: Send + Sync {
    /// Entities created since the last change-set clear that carry every kind
    /// in `kinds`.
    fn each_new(&self, kinds: &[ComponentKind]) -> Vec<EntityId>;

    /// Entities that lost `kind` since the last change-set clear.
    fn each_removed(&self, kind: ComponentKind) -> Vec<EntityId>;

    /// Returns the component of `kind` on `entity`, if present.
    fn component(&self, entity: EntityId, kind: ComponentKind) -> Option<&Component>;

    /// Creates or replaces a component on `entity`.
    ///
    /// Returns `false` if the entity does not exist.
    fn set_component(&mut self, entity: EntityId, component: Component) -> bool;

    /// Returns `true` if `entity` exists (including entities pending removal).
    fn has_entity(&self, entity: EntityId) -> bool;

    /// Display name of `entity`.
    fn name(&self, entity: EntityId) -> Option<&str> {
        match self.component(entity, ComponentKind::Name) {
            Some(Component::Name(name)) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Owner of `entity`.
    fn parent(&self, entity: EntityId) -> Option<EntityId> {
        match self.component(entity, ComponentKind::ParentEntity) {
            Some(Component::ParentEntity(parent)) => Some(*parent),
            _ => None,
        }
    }

    /// Pose of `entity` relative to its parent.
    fn pose(&self, entity: EntityId) -> Option<Pose> {
        match self.component(entity, ComponentKind::Pose) {
            Some(Component::Pose(pose)) => Some(*pose),
            _ => None,
        }
    }

    /// Returns `true` if `entity` carries a component of `kind`.
    fn has_component(&self, entity: EntityId, kind: ComponentKind) -> bool {
        self.component(entity, kind).is_some()
    }
}
