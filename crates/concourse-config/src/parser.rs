//! Recursive conversion of a generic value tree into registered types.
//!
//! Descent follows the schema graph: arrays recurse per element in order,
//! leaves go through shape checks and numeric coercion, objects match keys
//! against their attributes and fill defaults. The first violation wins and
//! unwinds with its location attached.

use serde_json::{Map, Value};
use tracing::trace;

use crate::coerce::coerce_number;
use crate::error::{ConfigError, FormatError, ParseError, ParseErrorKind};
use crate::registry::{ObjectSchema, Schema, TypeRegistry};
use crate::types::{ConfigType, LeafKind};
use crate::value::{ConfigObject, ConfigValue, FromConfigValue, ObjectValue};

impl TypeRegistry {
    /// Parse `node` into an instance of the object type `ty`.
    pub fn parse<T: ConfigObject>(&self, ty: &ConfigType, node: &Value) -> Result<T, ConfigError> {
        match ty {
            ConfigType::Array(_) => {
                return Err(FormatError::ArrayTarget {
                    type_name: ty.to_string(),
                }
                .into());
            }
            _ if self.object_schema(ty).is_none() => {
                return Err(FormatError::UnknownType {
                    type_name: ty.to_string(),
                }
                .into());
            }
            _ => {}
        }
        let value = self.parse_node(ty, node, 0)?;
        Ok(downcast_value(ty, value)?)
    }

    /// Parse `node` into the array type `ty`, element by element.
    pub fn parse_array<T: FromConfigValue>(
        &self,
        ty: &ConfigType,
        node: &Value,
    ) -> Result<Vec<T>, ConfigError> {
        if !ty.is_array() {
            return Err(FormatError::NotAnArray {
                type_name: ty.to_string(),
            }
            .into());
        }
        let value = self.parse_value(ty, node)?;
        Ok(downcast_value(ty, value)?)
    }

    /// Parse `node` against any resolvable type without committing to a
    /// Rust type.
    pub fn parse_value(&self, ty: &ConfigType, node: &Value) -> Result<ConfigValue, ConfigError> {
        if !self.is_resolvable(ty) {
            return Err(FormatError::UnknownType {
                type_name: ty.base().to_string(),
            }
            .into());
        }
        self.parse_node(ty, node, 0)
            .map_err(|e| e.map_parse(|e| e.rooted_in(&ty.base().to_string())))
    }

    /// Parse `node` as the object type bound to the entity ID `id`.
    pub fn parse_entity(&self, id: &str, node: &Value) -> Result<ObjectValue, ConfigError> {
        let ty = self
            .entity_type(id)
            .ok_or_else(|| FormatError::UnknownEntityId { id: id.to_string() })?;
        trace!(entity_id = id, type_name = %ty, "parsing entity");
        let value = self.parse_node(ty, node, 0)?;
        Ok(downcast_value(ty, value)?)
    }

    fn parse_node(&self, ty: &ConfigType, node: &Value, depth: usize) -> Result<ConfigValue, ConfigError> {
        if depth > self.config.max_depth {
            return Err(ParseError::new(ParseErrorKind::DepthExceeded {
                limit: self.config.max_depth,
            })
            .into());
        }

        match ty {
            ConfigType::Array(element) => {
                let Value::Array(items) = node else {
                    return Err(unexpected(format!("array ({ty})"), node).into());
                };
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        self.parse_node(element, item, depth + 1)
                            .map_err(|e| e.map_parse(|e| e.at_index(i)))
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(ConfigValue::Array)
            }
            ConfigType::Leaf(kind) => Ok(parse_leaf(*kind, node)?),
            ConfigType::Object(name) => {
                let Some(Schema::Object(schema)) = self.schemas.get(ty) else {
                    return Err(FormatError::UnknownType {
                        type_name: name.clone(),
                    }
                    .into());
                };
                let Value::Object(map) = node else {
                    return Err(unexpected(format!("object ({name})"), node).into());
                };
                self.parse_object(schema, map, depth).map(ConfigValue::Object)
            }
        }
    }

    /// Unknown keys are reported first (smallest key wins), then attributes
    /// in declaration order. Map iteration order never affects the outcome.
    fn parse_object(
        &self,
        schema: &ObjectSchema,
        map: &Map<String, Value>,
        depth: usize,
    ) -> Result<ObjectValue, ConfigError> {
        let type_name = schema.type_name();

        if let Some(key) = map.keys().filter(|k| schema.index_of(k).is_none()).min() {
            return Err(ParseError::new(ParseErrorKind::UnknownKey {
                type_name: type_name.to_string(),
                key: key.clone(),
            })
            .into());
        }

        let mut values = Vec::with_capacity(schema.attributes().len());
        for attribute in schema.attributes() {
            let value = match (map.get(attribute.key()), attribute.default()) {
                (Some(node), _) => self
                    .parse_node(attribute.ty(), node, depth + 1)
                    .map_err(|e| e.map_parse(|e| e.at_key(attribute.key()).within(type_name)))?,
                (None, Some(default)) => {
                    trace!(type_name, key = attribute.key(), "using default");
                    default.clone()
                }
                (None, None) => {
                    return Err(ParseError::new(ParseErrorKind::MissingKey {
                        type_name: type_name.to_string(),
                        key: attribute.key().to_string(),
                    })
                    .into());
                }
            };
            values.push(value);
        }

        schema.construct(values)
    }
}

fn parse_leaf(kind: LeafKind, node: &Value) -> Result<ConfigValue, ParseError> {
    match (kind, node) {
        (LeafKind::Bool, Value::Bool(b)) => Ok(ConfigValue::Bool(*b)),
        (LeafKind::Str, Value::String(s)) => Ok(ConfigValue::Str(s.clone())),
        (kind, Value::Number(n)) if kind.is_numeric() => coerce_number(n, kind),
        (kind, other) => Err(unexpected(kind.name().to_string(), other)),
    }
}

fn unexpected(expected: String, node: &Value) -> ParseError {
    ParseError::new(ParseErrorKind::UnexpectedShape {
        expected,
        found: node_kind(node),
    })
}

fn node_kind(node: &Value) -> &'static str {
    match node {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn downcast_value<T: FromConfigValue>(ty: &ConfigType, value: ConfigValue) -> Result<T, FormatError> {
    T::from_config_value(value).map_err(|_| FormatError::TypeMismatch {
        type_name: ty.to_string(),
        expected: std::any::type_name::<T>(),
    })
}
