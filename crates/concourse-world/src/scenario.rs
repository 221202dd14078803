//! Scenario loading: a world size plus a list of entity declarations.
//!
//! A scenario document looks like
//!
//! ```json
//! {
//!   "width": 40, "height": 30,
//!   "entities": [
//!     { "type": "door", "config": { "position": { "x": 3, "y": 0 }, "width": 120 } }
//!   ]
//! }
//! ```
//!
//! Each `type` is an entity ID; its `config` is parsed by the registry.

use std::path::Path;

use concourse_config::{RegistryConfig, TypeRegistry};
use concourse_data::{DataLoadError, deserialize_file, find_data_file, load_document, require_data_file};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::entity::{Entity, airport_registry};
use crate::error::WorldError;
use crate::world::World;

/// Base name of the scenario document inside a scenario directory.
pub const SCENARIO_FILE: &str = "scenario";

/// Base name of the optional registry configuration.
pub const REGISTRY_FILE: &str = "registry";

/// The outer structure of a scenario document. Unknown keys are rejected so
/// a misspelled `entities` does not silently load an empty world.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioData {
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub entities: Vec<EntitySpec>,
}

/// One entity declaration. `config` stays untyped until the registry sees it.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntitySpec {
    #[serde(rename = "type")]
    pub id: String,
    #[serde(default = "empty_config")]
    pub config: Value,
}

fn empty_config() -> Value {
    Value::Object(Map::new())
}

/// Build a world from a scenario document.
///
/// Fails on the first entity (in document order) that does not parse, naming
/// its index and entity ID. Placement is checked once every entity has
/// parsed, and the first one off the grid is reported the same way.
pub fn load_scenario(doc: &Value, registry: &TypeRegistry) -> Result<World, WorldError> {
    // A sequence would otherwise deserialize positionally into the struct.
    if !doc.is_object() {
        return Err(WorldError::Scenario {
            detail: format!("expected a map at the top level, got {}", kind_of(doc)),
        });
    }
    let data = ScenarioData::deserialize(doc).map_err(|e| WorldError::Scenario {
        detail: e.to_string(),
    })?;
    let mut world = World::new(data.width, data.height)?;
    let entities = parse_entities(&data.entities, registry)?;
    for (index, entity) in entities.into_iter().enumerate() {
        let id = entity.entity_id();
        world.add(entity).map_err(|e| match e {
            WorldError::OutOfBounds {
                position,
                width,
                height,
            } => WorldError::EntityOutOfBounds {
                index,
                id: id.to_string(),
                position,
                width,
                height,
            },
            other => other,
        })?;
    }
    info!(
        width = world.width(),
        height = world.height(),
        entities = world.len(),
        "loaded scenario"
    );
    Ok(world)
}

/// Load `scenario.{ron,toml,json}` from `dir`, building the registry from
/// `registry.{ron,toml,json}` when present.
pub fn load_world(dir: &Path) -> Result<World, WorldError> {
    let data_error = |source: DataLoadError| WorldError::DataLoad {
        dir: dir.to_path_buf(),
        source,
    };

    let config = match find_data_file(dir, REGISTRY_FILE).map_err(data_error)? {
        Some(path) => {
            debug!(file = %path.display(), "applying registry configuration");
            deserialize_file::<RegistryConfig>(&path).map_err(data_error)?
        }
        None => RegistryConfig::default(),
    };
    let registry = airport_registry(config)?;

    let path = require_data_file(dir, SCENARIO_FILE).map_err(data_error)?;
    let doc = load_document(&path).map_err(data_error)?;
    load_scenario(&doc, &registry)
}

fn kind_of(node: &Value) -> &'static str {
    match node {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a map",
    }
}

fn parse_entity(index: usize, spec: &EntitySpec, registry: &TypeRegistry) -> Result<Entity, WorldError> {
    let wrap = |source| WorldError::Entity {
        index,
        id: spec.id.clone(),
        source,
    };
    let object = registry.parse_entity(&spec.id, &spec.config).map_err(wrap)?;
    Entity::from_object(object).map_err(|e| match e {
        WorldError::Config(source) => wrap(source),
        other => other,
    })
}

#[cfg(not(feature = "parallel"))]
fn parse_entities(specs: &[EntitySpec], registry: &TypeRegistry) -> Result<Vec<Entity>, WorldError> {
    specs
        .iter()
        .enumerate()
        .map(|(index, spec)| parse_entity(index, spec, registry))
        .collect()
}

#[cfg(feature = "parallel")]
fn parse_entities(specs: &[EntitySpec], registry: &TypeRegistry) -> Result<Vec<Entity>, WorldError> {
    use rayon::prelude::*;

    // Collect every result first so the reported failure is the first in
    // document order, not the first to finish.
    let results: Vec<Result<Entity, WorldError>> = specs
        .par_iter()
        .enumerate()
        .map(|(index, spec)| parse_entity(index, spec, registry))
        .collect();
    results.into_iter().collect()
}

// ===========================================================================
// Tests
// ===========================================================================
