//! Loading the scenario fixtures under `scenarios/`.

use std::path::{Path, PathBuf};

use concourse_config::{ConfigError, ParseErrorKind};
use concourse_world::{Entity, WorldError, load_world};

fn scenario_dir(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(name)
}

fn count(world: &concourse_world::World, id: &str) -> usize {
    world.entities().filter(|(_, e)| e.entity_id() == id).count()
}

#[test]
fn terminal_json_with_registry_config() {
    let world = load_world(&scenario_dir("terminal")).unwrap();
    assert_eq!((world.width(), world.height()), (40, 30));
    assert_eq!(world.len(), 6);
    assert_eq!(count(&world, "door"), 2);
    assert_eq!(count(&world, "gate"), 2);

    let capacities: Vec<i16> = world
        .entities()
        .filter_map(|(_, e)| match e {
            Entity::Gate(g) => Some(g.capacity),
            _ => None,
        })
        .collect();
    assert_eq!(capacities, vec![200, 180]);

    let spawner = world
        .entities()
        .find_map(|(_, e)| match e {
            Entity::PassengerSpawner(s) => Some(s),
            _ => None,
        })
        .unwrap();
    assert_eq!(spawner.rate, 2.0);
    assert_eq!(spawner.burst, 3);
    assert_eq!(spawner.destinations, vec!["B7", "B8"]);
}

#[test]
fn pier_ron() {
    let world = load_world(&scenario_dir("pier")).unwrap();
    assert_eq!(world.len(), 3);
    let names: Vec<&str> = world
        .entities()
        .filter_map(|(_, e)| match e {
            Entity::Gate(g) => Some(g.name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["Pier 1", "Pier 2"]);
}

#[test]
fn annex_toml() {
    let world = load_world(&scenario_dir("annex")).unwrap();
    assert_eq!(world.len(), 2);
    let wall = world
        .entities()
        .find_map(|(_, e)| match e {
            Entity::Wall(w) => Some(w),
            _ => None,
        })
        .unwrap();
    assert_eq!((wall.position.x, wall.position.y), (8, 0));
    assert_eq!(wall.height, 16);
}

#[test]
fn broken_scenario_names_failing_entity() {
    let err = load_world(&scenario_dir("broken")).unwrap_err();
    assert_eq!(err.entity_index(), Some(2));
    match &err {
        WorldError::Entity { id, source: ConfigError::Parse(e), .. } => {
            assert_eq!(id, "passenger_spawner");
            assert!(matches!(e.kind(), ParseErrorKind::OutOfRange { .. }));
            assert_eq!(e.location(), "PassengerSpawner.burst");
        }
        other => panic!("expected entity parse error, got: {other:?}"),
    }
    let msg = err.to_string();
    assert!(msg.starts_with("entity 2 (passenger_spawner)"), "got: {msg}");
}

#[test]
fn registry_config_limits_depth() {
    let err = load_world(&scenario_dir("shallow")).unwrap_err();
    match err {
        WorldError::Entity { source: ConfigError::Parse(e), .. } => {
            assert_eq!(e.kind(), &ParseErrorKind::DepthExceeded { limit: 1 });
            assert_eq!(e.location(), "Door.position.x");
        }
        other => panic!("expected depth error, got: {other:?}"),
    }
}

#[test]
fn missing_scenario_file() {
    let err = load_world(&scenario_dir("does-not-exist")).unwrap_err();
    assert!(matches!(err, WorldError::DataLoad { .. }));
}
