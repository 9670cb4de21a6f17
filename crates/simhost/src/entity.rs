//! Entity identifiers and typed components.
//!
//! The host assigns every simulated object an [`EntityId`] and attaches
//! typed [`Component`] values to it. A component's [`ComponentKind`] is its
//! key: an entity carries at most one component of each kind.
//!
//! # Example
//!
//! ```
//! use simhost::entity::{Component, ComponentKind, EntityId};
//!
//! let name = Component::Name("base_link".into());
//! assert_eq!(name.kind(), ComponentKind::Name);
//! assert_eq!(EntityId::new(7).as_u64(), 7);
//! ```

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::SensorConfig;

// =============================================================================
// Entity Id
// =============================================================================

/// Unique identifier for an entity.
///
/// `EntityId` is a newtype wrapper around `u64`. Ids are opaque to plugins;
/// the only guarantee is uniqueness among live entities.
///
/// # Ordering
///
/// Ids are ordered by their numeric value, which the in-memory store uses
/// for deterministic iteration.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

// =============================================================================
// Pose
// =============================================================================

/// Position and orientation of an entity relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Translation in the parent frame.
    pub position: DVec3,
    /// Rotation relative to the parent frame.
    pub rotation: DQuat,
}

impl Pose {
    /// The identity pose.
    pub const IDENTITY: Self = Self {
        position: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
    };

    /// Creates a pose with the given translation and no rotation.
    #[must_use]
    pub const fn from_position(position: DVec3) -> Self {
        Self {
            position,
            rotation: DQuat::IDENTITY,
        }
    }

    /// Composes `self` (the parent frame) with `child`, returning the child's
    /// pose expressed in the frame `self` is expressed in.
    #[must_use]
    pub fn compose(&self, child: &Pose) -> Pose {
        Pose {
            position: self.position + self.rotation * child.position,
            rotation: (self.rotation * child.rotation).normalize(),
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// =============================================================================
// Component Kind
// =============================================================================

/// Component type identifiers.
///
/// Used as the lookup key in [`EntityStore`](crate::store::EntityStore)
/// queries and change-set iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Display name of the entity.
    Name,
    /// Marks the root world entity.
    World,
    /// Marks a model entity.
    Model,
    /// Marks a link entity.
    Link,
    /// Relationship to the owning entity.
    ParentEntity,
    /// Pose relative to the parent.
    Pose,
    /// Linear velocity applied by the host's kinematics step.
    LinearVelocity,
    /// Marks a custom sensor and carries its configuration.
    CustomSensor,
    /// Topic a sensor publishes on, written back by the sensor system.
    SensorTopic,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "Name"),
            Self::World => write!(f, "World"),
            Self::Model => write!(f, "Model"),
            Self::Link => write!(f, "Link"),
            Self::ParentEntity => write!(f, "ParentEntity"),
            Self::Pose => write!(f, "Pose"),
            Self::LinearVelocity => write!(f, "LinearVelocity"),
            Self::CustomSensor => write!(f, "CustomSensor"),
            Self::SensorTopic => write!(f, "SensorTopic"),
        }
    }
}

// =============================================================================
// Component
// =============================================================================

/// A component value attached to an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Component {
    /// Display name.
    Name(String),
    /// Root world marker.
    World,
    /// Model marker.
    Model,
    /// Link marker.
    Link,
    /// Owning entity.
    ParentEntity(EntityId),
    /// Pose relative to the parent.
    Pose(Pose),
    /// Linear velocity in the parent frame, metres per second.
    LinearVelocity(DVec3),
    /// Custom sensor marker with its parsed configuration.
    CustomSensor(SensorConfig),
    /// Topic the sensor publishes on.
    SensorTopic(String),
}

impl Component {
    /// Returns the kind of this component.
    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        match self {
            Self::Name(_) => ComponentKind::Name,
            Self::World => ComponentKind::World,
            Self::Model => ComponentKind::Model,
            Self::Link => ComponentKind::Link,
            Self::ParentEntity(_) => ComponentKind::ParentEntity,
            Self::Pose(_) => ComponentKind::Pose,
            Self::LinearVelocity(_) => ComponentKind::LinearVelocity,
            Self::CustomSensor(_) => ComponentKind::CustomSensor,
            Self::SensorTopic(_) => ComponentKind::SensorTopic,
        }
    }
}
