//! Fixed-step simulation runner.
//!
//! [`Simulation`] owns the [`World`], the [`Transport`] and the loaded
//! systems, and drives them through one tick at a time.
//!
//! # Tick phases
//!
//! 1. **CLOCK**: unless paused, the iteration counter and simulation time
//!    advance by one step.
//! 2. **PRE-UPDATE**: systems with [`Capabilities::PRE_UPDATE`] run serially,
//!    in load order, with read-write store access.
//! 3. **KINEMATICS**: unless paused, every entity with a linear velocity has
//!    its pose integrated over the step.
//! 4. **UPDATE**: systems with [`Capabilities::UPDATE`] run serially.
//! 5. **POST-UPDATE**: systems with [`Capabilities::POST_UPDATE`] run in
//!    parallel against a read-only view of the world.
//! 6. **CLEAR**: pending removals are erased and change sets reset.
//!
//! Post-update hooks of different systems may run on different threads. A
//! single system never runs two hooks at once.

use rayon::prelude::*;
use std::time::Duration;

use crate::entity::{Component, ComponentKind};
use crate::registry::{HostContext, RegistryError, SystemRegistry};
use crate::store::EntityStore;
use crate::system::{Capabilities, System, UpdateInfo};
use crate::transport::Transport;
use crate::world::World;

/// Owns the world and drives systems through ticks.
pub struct Simulation {
    world: World,
    transport: Transport,
    systems: Vec<Box<dyn System>>,
    step_size: Duration,
    info: UpdateInfo,
}

impl Simulation {
    /// Creates an empty, running simulation with the given step size.
    #[must_use]
    pub fn new(step_size: Duration) -> Self {
        Self {
            world: World::new(),
            transport: Transport::new(),
            systems: Vec::new(),
            step_size,
            info: UpdateInfo::default(),
        }
    }

    /// Replaces the world, keeping systems and transport.
    #[must_use]
    pub fn with_world(mut self, world: World) -> Self {
        self.world = world;
        self
    }

    /// Adds a system. Systems run in the order they were added.
    pub fn add_system(&mut self, system: Box<dyn System>) {
        tracing::info!(alias = %system.declaration().alias, "loaded system");
        self.systems.push(system);
    }

    /// Instantiates the system registered under `alias` and adds it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownAlias`] if `alias` is not registered.
    pub fn load_system(&mut self, registry: &SystemRegistry, alias: &str) -> Result<(), RegistryError> {
        let ctx = HostContext::new(self.transport.clone());
        let system = registry.instantiate(alias, &ctx)?;
        self.add_system(system);
        Ok(())
    }

    /// Advances the simulation by one tick.
    pub fn step(&mut self) {
        // PHASE 1: CLOCK
        if self.info.paused {
            self.info.dt = Duration::ZERO;
        } else {
            self.info.iterations += 1;
            self.info.sim_time += self.step_size;
            self.info.dt = self.step_size;
        }
        let info = self.info;
        tracing::trace!(iterations = info.iterations, paused = info.paused, "step");

        // PHASE 2: PRE-UPDATE
        for system in &mut self.systems {
            if system.declaration().runs(Capabilities::PRE_UPDATE) {
                system.pre_update(&info, &mut self.world);
            }
        }

        // PHASE 3: KINEMATICS
        if !info.paused {
            self.integrate_velocities(info.dt);
        }

        // PHASE 4: UPDATE
        for system in &mut self.systems {
            if system.declaration().runs(Capabilities::UPDATE) {
                system.update(&info, &mut self.world);
            }
        }

        // PHASE 5: POST-UPDATE
        let world: &dyn EntityStore = &self.world;
        self.systems
            .par_iter_mut()
            .filter(|system| system.declaration().runs(Capabilities::POST_UPDATE))
            .for_each(|system| system.post_update(&info, world));

        // PHASE 6: CLEAR
        self.world.clear_changes();
    }

    /// Runs `ticks` steps.
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    fn integrate_velocities(&mut self, dt: Duration) {
        let seconds = dt.as_secs_f64();
        for entity in self.world.entities_with(ComponentKind::LinearVelocity) {
            let Some(Component::LinearVelocity(velocity)) =
                self.world.component(entity, ComponentKind::LinearVelocity).cloned()
            else {
                continue;
            };
            if let Some(Component::Pose(pose)) = self.world.component_mut(entity, ComponentKind::Pose) {
                pose.position += velocity * seconds;
            }
        }
    }

    /// Pauses or resumes the simulation clock.
    pub fn set_paused(&mut self, paused: bool) {
        if self.info.paused != paused {
            tracing::info!(paused, "simulation pause state changed");
        }
        self.info.paused = paused;
    }

    /// Returns `true` if the simulation is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.info.paused
    }

    /// Current simulation time.
    #[must_use]
    pub fn sim_time(&self) -> Duration {
        self.info.sim_time
    }

    /// Info passed to hooks on the most recent step.
    #[must_use]
    pub fn info(&self) -> UpdateInfo {
        self.info
    }

    /// Configured step size.
    #[must_use]
    pub fn step_size(&self) -> Duration {
        self.step_size
    }

    /// The world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the world, for spawning and removing entities
    /// between ticks.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The transport systems publish on.
    #[must_use]
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Number of loaded systems.
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("info", &self.info)
            .field("step_size", &self.step_size)
            .field("entities", &self.world.entity_count())
            .field("systems", &self.systems.len())
            .finish_non_exhaustive()
    }
}
