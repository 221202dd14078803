//! End-to-end registry behavior against nested fixture schemas.

use std::sync::Arc;

use concourse_config::test_utils::*;
use concourse_config::{
    ConfigError, ConfigType, ConfigValue, FormatError, ParseErrorKind, PathSegment,
    RegistryBuilder,
};
use serde_json::json;

// -----------------------------------------------------------------------
// Successful parses
// -----------------------------------------------------------------------

#[test]
fn nested_document_round_trips_field_values() {
    let reg = fixture_registry();
    let level: Level = reg
        .parse(
            &level_type(),
            &json!({
                "number": 3,
                "corridors": [
                    {"name": "east", "length": 40, "doors": [{"width": 90}, {"width": 120, "locked": true}]},
                    {"name": "west"}
                ],
                "tags": ["departures", "secure"]
            }),
        )
        .unwrap();

    assert_eq!(level.number, 3);
    assert_eq!(level.tags, vec!["departures", "secure"]);
    assert_eq!(level.corridors.len(), 2);

    let east = &level.corridors[0];
    assert_eq!(east.name, "east");
    assert_eq!(east.length, 40.0);
    assert_eq!(
        east.doors,
        vec![
            Door { width: 90, locked: false },
            Door { width: 120, locked: true },
        ]
    );

    let west = &level.corridors[1];
    assert_eq!(west.length, 10.0);
    assert!(west.doors.is_empty());
}

#[test]
fn generated_document_parses() {
    let reg = fixture_registry();
    let level: Level = reg.parse(&level_type(), &level_document(5, 4)).unwrap();
    assert_eq!(level.corridors.len(), 5);
    assert!(level.corridors.iter().all(|c| c.doors.len() == 4));
    assert_eq!(level.corridors[4].doors[3].width, 83);
}

#[test]
fn untyped_parse_yields_object_value() {
    let reg = fixture_registry();
    let value = reg
        .parse_value(&door_type(), &json!({"width": 7}))
        .unwrap();
    match value {
        ConfigValue::Object(obj) => {
            assert_eq!(obj.type_name(), "Door");
            assert_eq!(obj.downcast_ref::<Door>(), Some(&Door { width: 7, locked: false }));
        }
        other => panic!("expected object, got: {other:?}"),
    }
}

// -----------------------------------------------------------------------
// Error locations
// -----------------------------------------------------------------------

#[test]
fn deep_failure_carries_full_path() {
    let reg = fixture_registry();
    let err = reg
        .parse::<Level>(
            &level_type(),
            &json!({
                "number": 1,
                "corridors": [
                    {"name": "a"},
                    {"name": "b", "doors": [{"width": 1}, {"width": 2.5}]}
                ]
            }),
        )
        .unwrap_err();

    let err = err.as_parse().expect("parse error");
    assert!(matches!(err.kind(), ParseErrorKind::NotAnInteger { .. }));
    assert_eq!(err.location(), "Level.corridors[1].doors[1].width");
    assert_eq!(err.indices(), vec![1, 1]);

    let types: Vec<&str> = err
        .path()
        .filter_map(|s| match s {
            PathSegment::Type(name) => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(types, vec!["Level", "Corridor", "Door"]);
}

#[test]
fn missing_key_in_nested_object() {
    let reg = fixture_registry();
    let err = reg
        .parse::<Level>(&level_type(), &json!({"number": 1, "corridors": [{"length": 3}]}))
        .unwrap_err();
    let err = err.as_parse().unwrap();
    assert_eq!(
        err.kind(),
        &ParseErrorKind::MissingKey {
            type_name: "Corridor".into(),
            key: "name".into()
        }
    );
    assert_eq!(err.location(), "Level.corridors[0]");
}

#[test]
fn first_failing_element_wins() {
    let reg = fixture_registry();
    let err = reg
        .parse_array::<Door>(
            &ConfigType::array_of(door_type()),
            &json!([{"width": 1}, {"width": "x"}, {"width": "y"}]),
        )
        .unwrap_err();
    assert_eq!(err.as_parse().unwrap().indices(), vec![1]);
}

#[test]
fn violation_choice_is_deterministic() {
    let reg = fixture_registry();
    let doc = json!({"corridors": "nope", "zz": 1, "number": 500, "aa": 2});
    for _ in 0..10 {
        let err = reg.parse::<Level>(&level_type(), &doc).unwrap_err();
        assert_eq!(
            err.as_parse().unwrap().kind(),
            &ParseErrorKind::UnknownKey {
                type_name: "Level".into(),
                key: "aa".into()
            }
        );
    }

    // Without unknown keys, declaration order decides: "number" precedes "corridors".
    let doc = json!({"corridors": "nope", "number": 500});
    let err = reg.parse::<Level>(&level_type(), &doc).unwrap_err();
    assert!(matches!(
        err.as_parse().unwrap().kind(),
        ParseErrorKind::OutOfRange { .. }
    ));
}

// -----------------------------------------------------------------------
// Entities
// -----------------------------------------------------------------------

#[test]
fn entity_dispatch_by_id() {
    let reg = fixture_registry();
    assert!(reg.is_entity_id_registered("level"));
    let obj = reg
        .parse_entity("level", &level_document(1, 1))
        .unwrap();
    assert!(obj.is::<Level>());
    let direct: Level = reg.parse(&level_type(), &level_document(1, 1)).unwrap();
    assert_eq!(obj.downcast::<Level>().unwrap(), direct);
}

#[test]
fn entity_parse_errors_match_direct_parse() {
    let reg = fixture_registry();
    let node = json!({"width": 1, "hinge": "left"});
    let via_entity = reg.parse_entity("door", &node).unwrap_err();
    let direct = reg.parse::<Door>(&door_type(), &node).unwrap_err();
    assert_eq!(via_entity.as_parse(), direct.as_parse());
}

#[test]
fn unknown_entity_id() {
    let reg = fixture_registry();
    let err = reg.parse_entity("escalator", &json!({})).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Format(FormatError::UnknownEntityId { .. })
    ));
}

// -----------------------------------------------------------------------
// Registration
// -----------------------------------------------------------------------

#[test]
fn fixtures_register_idempotently() {
    let mut builder = RegistryBuilder::new();
    register_door(&mut builder);
    register_door(&mut builder);
    let reg = builder.build().unwrap();
    assert_eq!(reg.object_types(), vec!["Door"]);
}

#[test]
fn introspection_lists_everything() {
    let reg = fixture_registry();
    assert_eq!(reg.object_types(), vec!["Corridor", "Door", "Level"]);
    assert_eq!(reg.entity_ids(), vec!["door", "level"]);
    assert!(reg.is_resolvable(&ConfigType::array_of(ConfigType::array_of(door_type()))));
    assert!(!reg.is_resolvable(&ConfigType::object("Gate")));
}

// -----------------------------------------------------------------------
// Concurrency
// -----------------------------------------------------------------------

#[test]
fn concurrent_parsing_shares_one_registry() {
    let reg = Arc::new(fixture_registry());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let reg = Arc::clone(&reg);
            std::thread::spawn(move || {
                let doc = level_document(i + 1, 3);
                let level: Level = reg.parse(&level_type(), &doc).unwrap();
                level.corridors.len()
            })
        })
        .collect();

    let counts: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(counts, (1..=8).collect::<Vec<_>>());
}

// -----------------------------------------------------------------------
// Other document formats
// -----------------------------------------------------------------------

#[test]
fn ron_document_parses_through_value_tree() {
    let reg = fixture_registry();
    let doc: serde_json::Value = ron::from_str(
        r#"{
            "number": -4,
            "corridors": [ { "name": "pier", "doors": [ { "width": 75 } ] } ],
        }"#,
    )
    .unwrap();
    let level: Level = reg.parse(&level_type(), &doc).unwrap();
    assert_eq!(level.number, -4);
    assert_eq!(level.corridors[0].doors[0].width, 75);
}
