//! Shared fixtures for unit tests, integration tests, and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use serde_json::{Value, json};

use crate::attribute::Attribute;
use crate::registry::{RegistryBuilder, TypeRegistry};
use crate::types::ConfigType;
use crate::value::{ConfigObject, ConfigValue};

// ===========================================================================
// Fixture types
// ===========================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Door {
    pub width: i32,
    pub locked: bool,
}

impl ConfigObject for Door {}

#[derive(Debug, Clone, PartialEq)]
pub struct Corridor {
    pub name: String,
    pub length: f64,
    pub doors: Vec<Door>,
}

impl ConfigObject for Corridor {}

#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub number: i8,
    pub corridors: Vec<Corridor>,
    pub tags: Vec<String>,
}

impl ConfigObject for Level {}

pub fn door_type() -> ConfigType {
    ConfigType::object("Door")
}

pub fn corridor_type() -> ConfigType {
    ConfigType::object("Corridor")
}

pub fn level_type() -> ConfigType {
    ConfigType::object("Level")
}

// ===========================================================================
// Registration
// ===========================================================================

pub fn register_door(builder: &mut RegistryBuilder) {
    builder
        .register_object(
            door_type(),
            vec![
                Attribute::required("width", ConfigType::I32),
                Attribute::optional("locked", ConfigType::BOOL, false),
            ],
            |mut args| {
                Ok(Door {
                    width: args.take("width")?,
                    locked: args.take("locked")?,
                })
            },
        )
        .unwrap();
}

/// Registers `Door`, `Corridor` and `Level`, plus the entity IDs `door`
/// and `level`.
pub fn register_fixtures(builder: &mut RegistryBuilder) {
    register_door(builder);
    builder
        .register_object(
            corridor_type(),
            vec![
                Attribute::required("name", ConfigType::STRING),
                Attribute::optional("length", ConfigType::F64, 10.0),
                Attribute::optional(
                    "doors",
                    ConfigType::array_of(door_type()),
                    ConfigValue::Array(Vec::new()),
                ),
            ],
            |mut args| {
                Ok(Corridor {
                    name: args.take("name")?,
                    length: args.take("length")?,
                    doors: args.take("doors")?,
                })
            },
        )
        .unwrap();
    builder
        .register_object(
            level_type(),
            vec![
                Attribute::required("number", ConfigType::I8),
                Attribute::required("corridors", ConfigType::array_of(corridor_type())),
                Attribute::optional(
                    "tags",
                    ConfigType::array_of(ConfigType::STRING),
                    Vec::<String>::new(),
                ),
            ],
            |mut args| {
                Ok(Level {
                    number: args.take("number")?,
                    corridors: args.take("corridors")?,
                    tags: args.take("tags")?,
                })
            },
        )
        .unwrap();
    builder.register_entity_id("door", door_type()).unwrap();
    builder.register_entity_id("level", level_type()).unwrap();
}

pub fn fixture_registry() -> TypeRegistry {
    let mut builder = RegistryBuilder::new();
    register_fixtures(&mut builder);
    builder.build().unwrap()
}

// ===========================================================================
// Documents
// ===========================================================================

/// A `Level` document with `corridors` corridors of `doors` doors each.
pub fn level_document(corridors: usize, doors: usize) -> Value {
    let corridors: Vec<Value> = (0..corridors)
        .map(|c| {
            let doors: Vec<Value> = (0..doors)
                .map(|d| json!({"width": 80 + d as i64, "locked": d % 2 == 0}))
                .collect();
            json!({"name": format!("corridor-{c}"), "length": 12.5, "doors": doors})
        })
        .collect();
    json!({"number": 1, "corridors": corridors, "tags": ["fixture"]})
}
