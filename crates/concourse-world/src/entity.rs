//! Airport entity types and their configuration schemas.
//!
//! Every entity carries a [`Position`]. Scenario documents select an entity
//! type by its entity ID (`door`, `wall`, `gate`, `passenger_spawner`) and
//! supply its configuration as a nested object.

use std::fmt;

use concourse_config::{
    Attribute, ConfigError, ConfigObject, ConfigType, ObjectValue, RegistryBuilder,
    RegistryConfig, TypeRegistry,
};
use tracing::debug;

use crate::error::WorldError;

// ===========================================================================
// Entity types
// ===========================================================================

/// A cell on the world grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl ConfigObject for Position {}

impl Position {
    pub const TYPE_NAME: &'static str = "Position";

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Door {
    pub position: Position,
    pub width: i32,
    pub locked: bool,
}

impl ConfigObject for Door {}

impl Door {
    pub const TYPE_NAME: &'static str = "Door";
    pub const ENTITY_ID: &'static str = "door";
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    pub position: Position,
    pub width: i32,
    pub height: i32,
}

impl ConfigObject for Wall {}

impl Wall {
    pub const TYPE_NAME: &'static str = "Wall";
    pub const ENTITY_ID: &'static str = "wall";
}

/// A boarding gate. `capacity` is the number of seated passengers.
#[derive(Debug, Clone, PartialEq)]
pub struct Gate {
    pub position: Position,
    pub name: String,
    pub capacity: i16,
}

impl ConfigObject for Gate {}

impl Gate {
    pub const TYPE_NAME: &'static str = "Gate";
    pub const ENTITY_ID: &'static str = "gate";
    pub const DEFAULT_CAPACITY: i16 = 200;
}

/// Emits `burst` passengers at `rate` bursts per tick, each heading for one
/// of `destinations` (any gate when empty).
#[derive(Debug, Clone, PartialEq)]
pub struct PassengerSpawner {
    pub position: Position,
    pub rate: f32,
    pub destinations: Vec<String>,
    pub burst: i8,
}

impl ConfigObject for PassengerSpawner {}

impl PassengerSpawner {
    pub const TYPE_NAME: &'static str = "PassengerSpawner";
    pub const ENTITY_ID: &'static str = "passenger_spawner";
}

// ===========================================================================
// Entity
// ===========================================================================

/// Anything that can be placed in a [`World`](crate::World).
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Door(Door),
    Wall(Wall),
    Gate(Gate),
    PassengerSpawner(PassengerSpawner),
}

impl Entity {
    pub fn position(&self) -> Position {
        match self {
            Entity::Door(e) => e.position,
            Entity::Wall(e) => e.position,
            Entity::Gate(e) => e.position,
            Entity::PassengerSpawner(e) => e.position,
        }
    }

    /// The entity ID scenario documents use for this variant.
    pub fn entity_id(&self) -> &'static str {
        match self {
            Entity::Door(_) => Door::ENTITY_ID,
            Entity::Wall(_) => Wall::ENTITY_ID,
            Entity::Gate(_) => Gate::ENTITY_ID,
            Entity::PassengerSpawner(_) => PassengerSpawner::ENTITY_ID,
        }
    }

    /// Convert a registry-constructed object into its variant, dispatching
    /// on the schema name.
    pub fn from_object(object: ObjectValue) -> Result<Self, WorldError> {
        let type_name = object.type_name().to_string();
        let entity = match type_name.as_str() {
            Door::TYPE_NAME => Entity::Door(object.downcast().map_err(ConfigError::from)?),
            Wall::TYPE_NAME => Entity::Wall(object.downcast().map_err(ConfigError::from)?),
            Gate::TYPE_NAME => Entity::Gate(object.downcast().map_err(ConfigError::from)?),
            PassengerSpawner::TYPE_NAME => {
                Entity::PassengerSpawner(object.downcast().map_err(ConfigError::from)?)
            }
            _ => {
                return Err(WorldError::UnmappedEntityType {
                    type_name: type_name.clone(),
                });
            }
        };
        Ok(entity)
    }
}

impl From<Door> for Entity {
    fn from(e: Door) -> Self {
        Entity::Door(e)
    }
}

impl From<Wall> for Entity {
    fn from(e: Wall) -> Self {
        Entity::Wall(e)
    }
}

impl From<Gate> for Entity {
    fn from(e: Gate) -> Self {
        Entity::Gate(e)
    }
}

impl From<PassengerSpawner> for Entity {
    fn from(e: PassengerSpawner) -> Self {
        Entity::PassengerSpawner(e)
    }
}

// ===========================================================================
// Registration
// ===========================================================================

fn position_type() -> ConfigType {
    ConfigType::object(Position::TYPE_NAME)
}

fn positive(type_name: &str, key: &str, value: i32) -> Result<i32, ConfigError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(ConfigError::construct(
            type_name,
            format!("{key} must be positive, got {value}"),
        ))
    }
}

/// Register every airport type and bind the entity IDs.
pub fn register_airport_types(builder: &mut RegistryBuilder) -> Result<(), ConfigError> {
    builder.register_object(
        position_type(),
        vec![
            Attribute::required("x", ConfigType::I32),
            Attribute::required("y", ConfigType::I32),
        ],
        |mut args| {
            Ok(Position {
                x: args.take("x")?,
                y: args.take("y")?,
            })
        },
    )?;

    builder.register_object(
        ConfigType::object(Door::TYPE_NAME),
        vec![
            Attribute::required("position", position_type()),
            Attribute::required("width", ConfigType::I32),
            Attribute::optional("locked", ConfigType::BOOL, false),
        ],
        |mut args| {
            Ok(Door {
                position: args.take("position")?,
                width: positive(Door::TYPE_NAME, "width", args.take("width")?)?,
                locked: args.take("locked")?,
            })
        },
    )?;

    builder.register_object(
        ConfigType::object(Wall::TYPE_NAME),
        vec![
            Attribute::required("position", position_type()),
            Attribute::required("width", ConfigType::I32),
            Attribute::required("height", ConfigType::I32),
        ],
        |mut args| {
            Ok(Wall {
                position: args.take("position")?,
                width: positive(Wall::TYPE_NAME, "width", args.take("width")?)?,
                height: positive(Wall::TYPE_NAME, "height", args.take("height")?)?,
            })
        },
    )?;

    builder.register_object(
        ConfigType::object(Gate::TYPE_NAME),
        vec![
            Attribute::required("position", position_type()),
            Attribute::required("name", ConfigType::STRING),
            Attribute::optional("capacity", ConfigType::I16, Gate::DEFAULT_CAPACITY),
        ],
        |mut args| {
            let position = args.take("position")?;
            let name: String = args.take("name")?;
            if name.trim().is_empty() {
                return Err(ConfigError::construct(Gate::TYPE_NAME, "name must not be blank"));
            }
            let capacity: i16 = args.take("capacity")?;
            if capacity < 0 {
                return Err(ConfigError::construct(
                    Gate::TYPE_NAME,
                    format!("capacity must not be negative, got {capacity}"),
                ));
            }
            Ok(Gate {
                position,
                name,
                capacity,
            })
        },
    )?;

    builder.register_object(
        ConfigType::object(PassengerSpawner::TYPE_NAME),
        vec![
            Attribute::required("position", position_type()),
            Attribute::required("rate", ConfigType::F32),
            Attribute::optional(
                "destinations",
                ConfigType::array_of(ConfigType::STRING),
                Vec::<String>::new(),
            ),
            Attribute::optional("burst", ConfigType::I8, 1i8),
        ],
        |mut args| {
            let position = args.take("position")?;
            let rate: f32 = args.take("rate")?;
            if !rate.is_finite() || rate < 0.0 {
                return Err(ConfigError::construct(
                    PassengerSpawner::TYPE_NAME,
                    format!("rate must be a non-negative number, got {rate}"),
                ));
            }
            let destinations = args.take("destinations")?;
            let burst: i8 = args.take("burst")?;
            if burst < 1 {
                return Err(ConfigError::construct(
                    PassengerSpawner::TYPE_NAME,
                    format!("burst must be at least 1, got {burst}"),
                ));
            }
            Ok(PassengerSpawner {
                position,
                rate,
                destinations,
                burst,
            })
        },
    )?;

    for (id, type_name) in [
        (Door::ENTITY_ID, Door::TYPE_NAME),
        (Wall::ENTITY_ID, Wall::TYPE_NAME),
        (Gate::ENTITY_ID, Gate::TYPE_NAME),
        (PassengerSpawner::ENTITY_ID, PassengerSpawner::TYPE_NAME),
    ] {
        builder.register_entity_id(id, ConfigType::object(type_name))?;
    }

    debug!("registered airport types");
    Ok(())
}

/// A sealed registry holding the airport types.
pub fn airport_registry(config: RegistryConfig) -> Result<TypeRegistry, ConfigError> {
    let mut builder = RegistryBuilder::new().with_config(config);
    register_airport_types(&mut builder)?;
    builder.build()
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use concourse_config::{FormatError, ParseErrorKind};
    use serde_json::json;

    fn registry() -> TypeRegistry {
        airport_registry(RegistryConfig::default()).unwrap()
    }

    fn entity(id: &str, config: serde_json::Value) -> Result<Entity, WorldError> {
        let object = registry().parse_entity(id, &config)?;
        Entity::from_object(object)
    }

    #[test]
    fn registry_lists_entity_ids() {
        let reg = registry();
        assert_eq!(reg.entity_ids(), vec!["door", "gate", "passenger_spawner", "wall"]);
        assert_eq!(
            reg.object_types(),
            vec!["Door", "Gate", "PassengerSpawner", "Position", "Wall"]
        );
    }

    #[test]
    fn door_defaults_to_unlocked() {
        let e = entity("door", json!({"position": {"x": 1, "y": 2}, "width": 120})).unwrap();
        assert_eq!(
            e,
            Entity::Door(Door {
                position: Position::new(1, 2),
                width: 120,
                locked: false
            })
        );
        assert_eq!(e.entity_id(), "door");
    }

    #[test]
    fn gate_capacity_default_and_range() {
        let e = entity("gate", json!({"position": {"x": 0, "y": 0}, "name": "B7"})).unwrap();
        match e {
            Entity::Gate(g) => assert_eq!(g.capacity, Gate::DEFAULT_CAPACITY),
            other => panic!("expected gate, got: {other:?}"),
        }

        let err = entity(
            "gate",
            json!({"position": {"x": 0, "y": 0}, "name": "B7", "capacity": 40_000}),
        )
        .unwrap_err();
        match err {
            WorldError::Config(ConfigError::Parse(e)) => {
                assert!(matches!(e.kind(), ParseErrorKind::OutOfRange { .. }));
                assert_eq!(e.location(), "Gate.capacity");
            }
            other => panic!("expected out of range, got: {other:?}"),
        }
    }

    #[test]
    fn spawner_takes_whole_number_rate() {
        let e = entity(
            "passenger_spawner",
            json!({"position": {"x": 3, "y": 4}, "rate": 2, "destinations": ["B7", "C1"]}),
        )
        .unwrap();
        match e {
            Entity::PassengerSpawner(s) => {
                assert_eq!(s.rate, 2.0);
                assert_eq!(s.destinations, vec!["B7", "C1"]);
                assert_eq!(s.burst, 1);
            }
            other => panic!("expected spawner, got: {other:?}"),
        }
    }

    #[test]
    fn nested_position_errors_are_located() {
        let err = entity("wall", json!({"position": {"x": 1}, "width": 1, "height": 1}))
            .unwrap_err();
        match err {
            WorldError::Config(ConfigError::Parse(e)) => {
                assert_eq!(
                    e.kind(),
                    &ParseErrorKind::MissingKey {
                        type_name: "Position".into(),
                        key: "y".into()
                    }
                );
                assert_eq!(e.location(), "Wall.position");
            }
            other => panic!("expected missing key, got: {other:?}"),
        }
    }

    #[test]
    fn constructors_reject_invalid_values() {
        let err = entity("wall", json!({"position": {"x": 1, "y": 1}, "width": 0, "height": 3}))
            .unwrap_err();
        assert!(matches!(
            err,
            WorldError::Config(ConfigError::Construct { .. })
        ));

        let err = entity(
            "passenger_spawner",
            json!({"position": {"x": 0, "y": 0}, "rate": 1.5, "burst": 0}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("burst"), "got: {err}");

        let err = entity("gate", json!({"position": {"x": 0, "y": 0}, "name": "  "})).unwrap_err();
        assert!(matches!(
            err,
            WorldError::Config(ConfigError::Construct { .. })
        ));
    }

    #[test]
    fn registering_twice_fails_on_entity_ids() {
        let mut builder = RegistryBuilder::new();
        register_airport_types(&mut builder).unwrap();
        let err = register_airport_types(&mut builder).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Format(FormatError::DuplicateEntityId { .. })
        ));
    }

    #[test]
    fn unmapped_object_type() {
        #[derive(Debug, Clone, PartialEq)]
        struct Kiosk;
        impl ConfigObject for Kiosk {}

        let err = Entity::from_object(ObjectValue::new("Kiosk", Kiosk)).unwrap_err();
        assert!(matches!(err, WorldError::UnmappedEntityType { .. }));
    }

    #[test]
    fn mismatched_rust_type_is_format_error() {
        let err = Entity::from_object(ObjectValue::new(Door::TYPE_NAME, Position::new(0, 0)))
            .unwrap_err();
        assert!(matches!(
            err,
            WorldError::Config(ConfigError::Format(FormatError::TypeMismatch { .. }))
        ));
    }
}
