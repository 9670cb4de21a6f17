use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dummysensor::DummySensorSystem;
use simhost::config::SensorConfig;
use simhost::entity::{Component, EntityId};
use simhost::simulation::Simulation;
use simhost::transport::Transport;
use std::time::Duration;

/// One model with one link carrying `sensors` rfid sensors.
fn populated(sensors: usize) -> (Simulation, EntityId) {
    let mut sim = Simulation::new(Duration::from_millis(1));
    let world = sim.world_mut();
    let root = world.spawn([Component::World, Component::Name("default".into())]);
    let model = world.spawn([
        Component::Model,
        Component::Name("rack".into()),
        Component::ParentEntity(root),
    ]);
    let link = world.spawn([
        Component::Link,
        Component::Name("shelf".into()),
        Component::ParentEntity(model),
    ]);
    for i in 0..sensors {
        let name = format!("tag_{i}");
        world.spawn([
            Component::Name(name.clone()),
            Component::ParentEntity(link),
            Component::CustomSensor(SensorConfig::new(name, dummysensor::KIND)),
        ]);
    }

    let node = sim.transport().node();
    sim.add_system(Box::new(DummySensorSystem::new(node)));
    // Creation happens on the first tick
    sim.step();
    (sim, link)
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    for sensors in [1, 16, 256] {
        let (mut sim, _) = populated(sensors);
        group.bench_with_input(BenchmarkId::from_parameter(sensors), &sensors, |b, _| {
            b.iter(|| sim.step());
        });
    }
    group.finish();
}

fn bench_paused_tick(c: &mut Criterion) {
    let (mut sim, _) = populated(256);
    sim.set_paused(true);

    c.bench_function("paused_tick_256", |b| b.iter(|| sim.step()));
}

fn bench_insert_remove(c: &mut Criterion) {
    let (mut sim, link) = populated(0);

    c.bench_function("insert_remove_cycle", |b| {
        b.iter(|| {
            let entity = sim.world_mut().spawn([
                Component::Name("churn".into()),
                Component::ParentEntity(link),
                Component::CustomSensor(SensorConfig::new("churn", dummysensor::KIND)),
            ]);
            sim.step();
            sim.world_mut().remove_entity(black_box(entity), false);
            sim.step();
        });
    });
}

fn bench_publish(c: &mut Criterion) {
    use simhost::sensor::{create_sensor, Sensor};

    let transport = Transport::new();
    let node = transport.node();
    let config = SensorConfig::new("bench::tag", dummysensor::KIND).with_topic("/bench");
    let Ok(mut sensor) = create_sensor::<dummysensor::DummySensor>(&node, &config) else {
        return;
    };

    c.bench_function("sensor_update", |b| {
        b.iter(|| sensor.update(black_box(Duration::from_millis(5))))
    });
}

criterion_group!(benches, bench_tick, bench_paused_tick, bench_insert_remove, bench_publish);
criterion_main!(benches);
