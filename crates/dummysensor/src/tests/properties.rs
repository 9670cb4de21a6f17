//! Property-based tests for the entity to sensor table.

use proptest::prelude::*;
use simhost::config::SensorConfig;
use simhost::entity::{Component, ComponentKind, EntityId};
use simhost::store::EntityStore;

use super::helpers::{rfid, Rig};
use crate::sensor::KIND;

// =============================================================================
// Strategies
// =============================================================================

#[derive(Debug, Clone)]
enum Op {
    /// Spawn a sensor entity; `valid` picks between an rfid and a camera.
    Insert { valid: bool },
    /// Remove one of the live sensor entities, chosen by index.
    Remove(usize),
    /// Run one tick.
    Tick { paused: bool },
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<bool>().prop_map(|valid| Op::Insert { valid }),
        2 => any::<usize>().prop_map(Op::Remove),
        4 => any::<bool>().prop_map(|paused| Op::Tick { paused }),
    ]
}

/// Sensor entities that are neither gone nor on their way out.
fn live_sensors(rig: &Rig) -> Vec<EntityId> {
    rig.world
        .entities_with(ComponentKind::CustomSensor)
        .into_iter()
        .filter(|entity| !rig.world.is_pending_removal(*entity))
        .collect()
}

fn is_rfid(rig: &Rig, entity: EntityId) -> bool {
    matches!(
        rig.world.component(entity, ComponentKind::CustomSensor),
        Some(Component::CustomSensor(config)) if config.kind == KIND
    )
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// After every tick the table holds exactly the live, loadable sensor
    /// entities.
    #[test]
    fn table_matches_live_entities(ops in prop::collection::vec(arb_op(), 1..40)) {
        let mut rig = Rig::new();
        let mut spawned = 0usize;
        let mut failed_removals = 0u64;

        for op in ops {
            match op {
                Op::Insert { valid } => {
                    let name = format!("s{spawned}");
                    spawned += 1;
                    let config = if valid {
                        rfid(&name, "")
                    } else {
                        SensorConfig::new(name, "camera")
                    };
                    rig.spawn_sensor(config);
                }
                Op::Remove(index) => {
                    let live = live_sensors(&rig);
                    if !live.is_empty() {
                        let entity = live[index % live.len()];
                        // A sensor that never loaded is missing from the table
                        if !is_rfid(&rig, entity) {
                            failed_removals += 1;
                        }
                        rig.world.remove_entity(entity, false);
                    }
                }
                Op::Tick { paused } => {
                    rig.tick(paused);
                    let expected: Vec<_> = live_sensors(&rig)
                        .into_iter()
                        .filter(|entity| is_rfid(&rig, *entity))
                        .collect();
                    prop_assert_eq!(rig.system.tracked(), expected);
                }
            }
        }

        rig.tick(false);
        let expected: Vec<_> = live_sensors(&rig)
            .into_iter()
            .filter(|entity| is_rfid(&rig, *entity))
            .collect();
        prop_assert_eq!(rig.system.tracked(), expected);
        prop_assert_eq!(rig.system.diagnostics().update_failures, 0);
        prop_assert_eq!(rig.system.diagnostics().consistency_errors, failed_removals);
    }

    /// Each running tick publishes once per tracked sensor; paused ticks
    /// publish nothing.
    #[test]
    fn publishes_track_running_ticks(
        sensors in 1usize..6,
        ticks in prop::collection::vec(any::<bool>(), 1..20),
    ) {
        let mut rig = Rig::new();
        for i in 0..sensors {
            rig.spawn_sensor(rfid(&format!("s{i}"), &format!("/s{i}")));
        }

        let mut running = 0u64;
        for paused in ticks {
            rig.tick(paused);
            if !paused {
                running += 1;
            }
            for i in 0..sensors {
                prop_assert_eq!(rig.transport.published(&format!("/s{i}")), running);
            }
        }
    }
}
