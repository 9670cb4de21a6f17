//! Naming and pose helpers shared by systems.

use std::collections::BTreeSet;

use crate::entity::{ComponentKind, EntityId, Pose};
use crate::store::EntityStore;

/// Type prefix used for `entity` in prefixed scoped names.
fn scope_prefix(store: &dyn EntityStore, entity: EntityId) -> Option<&'static str> {
    [
        (ComponentKind::World, "world"),
        (ComponentKind::Model, "model"),
        (ComponentKind::Link, "link"),
        (ComponentKind::CustomSensor, "sensor"),
    ]
    .into_iter()
    .find(|(kind, _)| store.has_component(entity, *kind))
    .map(|(_, prefix)| prefix)
}

/// Ancestors of `entity`, starting with `entity` itself and ending at the
/// root. Stops early if the parent chain loops.
fn lineage(store: &dyn EntityStore, entity: EntityId) -> Vec<EntityId> {
    let mut seen = BTreeSet::new();
    let mut chain = Vec::new();
    let mut current = Some(entity);
    while let Some(id) = current {
        if !seen.insert(id) {
            break;
        }
        chain.push(id);
        current = store.parent(id);
    }
    chain
}

/// Builds the scoped name of `entity` by joining the names of its ancestors
/// from the root down, separated by `delim`.
///
/// With `include_prefix`, every segment is preceded by its type (`world`,
/// `model`, `link`, `sensor`). Entities without a name are skipped.
///
/// ```
/// use simhost::entity::Component;
/// use simhost::util::scoped_name;
/// use simhost::world::World;
///
/// let mut world = World::new();
/// let root = world.spawn([Component::Name("default".into()), Component::World]);
/// let model = world.spawn([
///     Component::Name("box".into()),
///     Component::Model,
///     Component::ParentEntity(root),
/// ]);
///
/// assert_eq!(scoped_name(&world, model, "::", false), "default::box");
/// assert_eq!(scoped_name(&world, model, "/", true), "world/default/model/box");
/// ```
#[must_use]
pub fn scoped_name(
    store: &dyn EntityStore,
    entity: EntityId,
    delim: &str,
    include_prefix: bool,
) -> String {
    let mut segments = Vec::new();
    for id in lineage(store, entity).into_iter().rev() {
        let Some(name) = store.name(id) else {
            continue;
        };
        if include_prefix {
            if let Some(prefix) = scope_prefix(store, id) {
                segments.push(prefix);
            }
        }
        segments.push(name);
    }
    segments.join(delim)
}

/// Strips the outermost scope from a scoped name.
///
/// Returns the name unchanged if it contains no `delim`.
///
/// ```
/// use simhost::util::remove_parent_scope;
///
/// assert_eq!(remove_parent_scope("default::box::tag", "::"), "box::tag");
/// assert_eq!(remove_parent_scope("tag", "::"), "tag");
/// ```
#[must_use]
pub fn remove_parent_scope(name: &str, delim: &str) -> String {
    if delim.is_empty() {
        return name.to_owned();
    }
    name.split_once(delim)
        .map_or(name, |(_, rest)| rest)
        .to_owned()
}

/// Pose of `entity` in the world frame, composed from the root down.
///
/// Entities without a pose contribute the identity.
#[must_use]
pub fn world_pose(store: &dyn EntityStore, entity: EntityId) -> Pose {
    lineage(store, entity)
        .into_iter()
        .rev()
        .fold(Pose::IDENTITY, |acc, id| {
            acc.compose(&store.pose(id).unwrap_or_default())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SensorConfig;
    use crate::entity::Component;
    use crate::world::World;
    use glam::{DQuat, DVec3};
    use std::f64::consts::FRAC_PI_2;

    fn named(name: &str) -> Component {
        Component::Name(name.to_owned())
    }

    /// default / box / base / tag
    fn tree() -> (World, EntityId, EntityId, EntityId) {
        let mut world = World::new();
        let root = world.spawn([named("default"), Component::World]);
        let model = world.spawn([
            named("box"),
            Component::Model,
            Component::ParentEntity(root),
            Component::Pose(Pose {
                position: DVec3::new(1.0, 0.0, 0.0),
                rotation: DQuat::from_rotation_z(FRAC_PI_2),
            }),
        ]);
        let link = world.spawn([
            named("base"),
            Component::Link,
            Component::ParentEntity(model),
            Component::Pose(Pose::from_position(DVec3::new(2.0, 0.0, 0.0))),
        ]);
        let sensor = world.spawn([
            named("tag"),
            Component::ParentEntity(link),
            Component::CustomSensor(SensorConfig::new("tag", "rfid")),
        ]);
        (world, model, link, sensor)
    }

    #[test]
    fn scoped_name_without_prefix() {
        let (world, _, _, sensor) = tree();
        assert_eq!(scoped_name(&world, sensor, "::", false), "default::box::base::tag");
    }

    #[test]
    fn scoped_name_with_prefix() {
        let (world, _, _, sensor) = tree();
        assert_eq!(
            scoped_name(&world, sensor, "/", true),
            "world/default/model/box/link/base/sensor/tag"
        );
    }

    #[test]
    fn scoped_name_skips_unnamed_entities() {
        let mut world = World::new();
        let anonymous = world.spawn([Component::Model]);
        let child = world.spawn([named("leaf"), Component::ParentEntity(anonymous)]);
        assert_eq!(scoped_name(&world, child, "::", false), "leaf");
    }

    #[test]
    fn scoped_name_survives_parent_cycles() {
        let mut world = World::new();
        let a = world.spawn([named("a")]);
        let b = world.spawn([named("b"), Component::ParentEntity(a)]);
        world.set_component(a, Component::ParentEntity(b));
        assert_eq!(scoped_name(&world, b, "::", false), "a::b");
    }

    #[test]
    fn remove_parent_scope_strips_first_segment_only() {
        assert_eq!(remove_parent_scope("default::box::base::tag", "::"), "box::base::tag");
        assert_eq!(remove_parent_scope("a/b", "/"), "b");
        assert_eq!(remove_parent_scope("plain", "::"), "plain");
        assert_eq!(remove_parent_scope("plain", ""), "plain");
    }

    #[test]
    fn world_pose_composes_the_chain() {
        let (world, model, link, sensor) = tree();
        assert!((world_pose(&world, model).position - DVec3::new(1.0, 0.0, 0.0)).length() < 1e-9);
        // The link offset is rotated by the model's quarter turn.
        assert!((world_pose(&world, link).position - DVec3::new(1.0, 2.0, 0.0)).length() < 1e-9);
        // The sensor has no pose of its own.
        assert!((world_pose(&world, sensor).position - DVec3::new(1.0, 2.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn world_pose_of_unknown_entity_is_identity() {
        let world = World::new();
        assert_eq!(world_pose(&world, EntityId::new(5)), Pose::IDENTITY);
    }
}
