//! Schema registry with a two-phase lifecycle.
//!
//! [`RegistryBuilder`] collects object schemas and entity IDs during startup;
//! [`RegistryBuilder::build`] validates cross-references and seals everything
//! into an immutable [`TypeRegistry`], the only type that can parse
//! documents. Registration after parsing has begun is therefore impossible
//! rather than merely forbidden.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attribute::{Arguments, Attribute};
use crate::error::{ConfigError, FormatError};
use crate::types::{ConfigType, LeafKind};
use crate::value::{ConfigObject, ConfigValue, ObjectValue};

/// Nesting levels below the document root the parser will descend.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Tunables applied to every parse call of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub max_depth: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

type Constructor = Box<dyn Fn(Arguments<'_>) -> Result<ObjectValue, ConfigError> + Send + Sync>;

/// A registered composite type: its ordered attributes and the function
/// that builds an instance from them.
pub struct ObjectSchema {
    type_name: String,
    attributes: Vec<Attribute>,
    index: HashMap<String, usize>,
    rust_type: TypeId,
    rust_type_name: &'static str,
    construct: Constructor,
}

impl ObjectSchema {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Attributes in declaration order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn attribute(&self, key: &str) -> Option<&Attribute> {
        self.index_of(key).map(|i| &self.attributes[i])
    }

    /// The Rust type the constructor produces.
    pub fn rust_type_name(&self) -> &'static str {
        self.rust_type_name
    }

    pub(crate) fn construct(&self, values: Vec<ConfigValue>) -> Result<ObjectValue, ConfigError> {
        (self.construct)(Arguments::new(self, values))
    }

    fn same_definition(&self, other: &ObjectSchema) -> bool {
        self.rust_type == other.rust_type
            && self.attributes.len() == other.attributes.len()
            && self
                .attributes
                .iter()
                .zip(&other.attributes)
                .all(|(a, b)| a.same_as(b))
    }
}

impl fmt::Debug for ObjectSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectSchema")
            .field("type_name", &self.type_name)
            .field("attributes", &self.attributes)
            .field("rust_type", &self.rust_type_name)
            .finish_non_exhaustive()
    }
}

/// A registered schema.
#[derive(Debug)]
pub enum Schema {
    Leaf(LeafKind),
    Object(ObjectSchema),
}

/// Collects schemas and entity IDs. Single-threaded; seal with [`build`].
///
/// [`build`]: RegistryBuilder::build
#[derive(Debug)]
pub struct RegistryBuilder {
    schemas: HashMap<ConfigType, Schema>,
    entities: HashMap<String, ConfigType>,
    config: RegistryConfig,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryBuilder {
    /// A builder holding only the built-in leaf schemas.
    pub fn new() -> Self {
        let mut builder = Self {
            schemas: HashMap::new(),
            entities: HashMap::new(),
            config: RegistryConfig::default(),
        };
        builder.register_leaf_types();
        builder
    }

    pub fn with_config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn register_leaf_types(&mut self) {
        for kind in LeafKind::ALL {
            self.schemas.insert(ConfigType::Leaf(kind), Schema::Leaf(kind));
        }
    }

    /// Register the object type `ty`, built by `construct` from `attributes`.
    ///
    /// Registering the same definition twice is a no-op; a differing
    /// definition under a known name fails.
    pub fn register_object<T, F>(
        &mut self,
        ty: ConfigType,
        attributes: Vec<Attribute>,
        construct: F,
    ) -> Result<(), ConfigError>
    where
        T: ConfigObject,
        F: Fn(Arguments<'_>) -> Result<T, ConfigError> + Send + Sync + 'static,
    {
        let type_name = match &ty {
            ConfigType::Object(name) => name.clone(),
            ConfigType::Array(_) => {
                return Err(FormatError::ArrayRegistration {
                    type_name: ty.to_string(),
                }
                .into());
            }
            ConfigType::Leaf(_) => {
                return Err(FormatError::Redefinition {
                    type_name: ty.to_string(),
                }
                .into());
            }
        };

        let mut index = HashMap::with_capacity(attributes.len());
        for (i, attribute) in attributes.iter().enumerate() {
            if index.insert(attribute.key().to_string(), i).is_some() {
                return Err(FormatError::DuplicateKey {
                    type_name,
                    key: attribute.key().to_string(),
                }
                .into());
            }
            if let Some(default) = attribute.default() {
                if !default.conforms_to(attribute.ty()) {
                    return Err(FormatError::DefaultMismatch {
                        type_name,
                        key: attribute.key().to_string(),
                        expected: attribute.ty().to_string(),
                        found: default.describe(),
                    }
                    .into());
                }
            }
        }

        let constructed_name = type_name.clone();
        let schema = ObjectSchema {
            type_name: type_name.clone(),
            attributes,
            index,
            rust_type: TypeId::of::<T>(),
            rust_type_name: std::any::type_name::<T>(),
            construct: Box::new(move |args| {
                construct(args).map(|value| ObjectValue::new(constructed_name.clone(), value))
            }),
        };

        if let Some(existing) = self.schemas.get(&ty) {
            return match existing {
                Schema::Object(existing) if existing.same_definition(&schema) => {
                    debug!(type_name = %type_name, "identical re-registration ignored");
                    Ok(())
                }
                _ => Err(FormatError::Redefinition { type_name }.into()),
            };
        }

        debug!(
            type_name = %type_name,
            attributes = schema.attributes.len(),
            rust_type = schema.rust_type_name,
            "registered configuration type"
        );
        self.schemas.insert(ty, Schema::Object(schema));
        Ok(())
    }

    /// Bind the entity ID `id` to the object type `ty`.
    ///
    /// Whether `ty` is registered is checked by [`build`], so IDs may be
    /// bound before their types.
    ///
    /// [`build`]: RegistryBuilder::build
    pub fn register_entity_id(
        &mut self,
        id: impl Into<String>,
        ty: ConfigType,
    ) -> Result<(), ConfigError> {
        let id = id.into();
        if self.entities.contains_key(&id) {
            return Err(FormatError::DuplicateEntityId { id }.into());
        }
        if !matches!(ty, ConfigType::Object(_)) {
            return Err(FormatError::EntityNotObject {
                id,
                type_name: ty.to_string(),
            }
            .into());
        }
        debug!(entity_id = %id, type_name = %ty, "registered entity id");
        self.entities.insert(id, ty);
        Ok(())
    }

    pub fn is_entity_id_registered(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    pub fn is_registered(&self, ty: &ConfigType) -> bool {
        self.schemas.contains_key(ty)
    }

    /// Validate every cross-reference and seal the registry.
    ///
    /// Schemas and entity IDs are checked in name order so the reported
    /// violation does not depend on hash order.
    pub fn build(self) -> Result<TypeRegistry, ConfigError> {
        let mut object_names: Vec<&ConfigType> = self
            .schemas
            .iter()
            .filter(|(_, schema)| matches!(schema, Schema::Object(_)))
            .map(|(ty, _)| ty)
            .collect();
        object_names.sort_by_key(|ty| ty.to_string());

        for ty in object_names {
            let Some(Schema::Object(schema)) = self.schemas.get(ty) else {
                continue;
            };
            for attribute in &schema.attributes {
                let base = attribute.ty().base();
                if !is_object_or_leaf(&self.schemas, base) {
                    return Err(FormatError::UnresolvedReference {
                        type_name: schema.type_name.clone(),
                        key: attribute.key().to_string(),
                        referenced: base.to_string(),
                    }
                    .into());
                }
            }
        }

        let mut entity_ids: Vec<&String> = self.entities.keys().collect();
        entity_ids.sort();
        for id in entity_ids {
            let ty = &self.entities[id];
            if !matches!(self.schemas.get(ty), Some(Schema::Object(_))) {
                return Err(FormatError::UnknownEntityType {
                    id: id.clone(),
                    type_name: ty.to_string(),
                }
                .into());
            }
        }

        debug!(
            object_types = self.schemas.len() - LeafKind::ALL.len(),
            entity_ids = self.entities.len(),
            max_depth = self.config.max_depth,
            "type registry built"
        );

        Ok(TypeRegistry {
            schemas: self.schemas,
            entities: self.entities,
            config: self.config,
        })
    }
}

fn is_object_or_leaf(schemas: &HashMap<ConfigType, Schema>, ty: &ConfigType) -> bool {
    match ty {
        ConfigType::Leaf(_) => true,
        ConfigType::Object(_) => matches!(schemas.get(ty), Some(Schema::Object(_))),
        ConfigType::Array(element) => is_object_or_leaf(schemas, element),
    }
}

/// Immutable registry. Parsing only reads it, so it can be shared across
/// threads behind an `Arc`.
#[derive(Debug)]
pub struct TypeRegistry {
    pub(crate) schemas: HashMap<ConfigType, Schema>,
    pub(crate) entities: HashMap<String, ConfigType>,
    pub(crate) config: RegistryConfig,
}

impl TypeRegistry {
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn schema(&self, ty: &ConfigType) -> Option<&Schema> {
        self.schemas.get(ty)
    }

    pub fn object_schema(&self, ty: &ConfigType) -> Option<&ObjectSchema> {
        match self.schemas.get(ty) {
            Some(Schema::Object(schema)) => Some(schema),
            _ => None,
        }
    }

    /// Names of all registered object types, sorted.
    pub fn object_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .schemas
            .values()
            .filter_map(|schema| match schema {
                Schema::Object(schema) => Some(schema.type_name()),
                Schema::Leaf(_) => None,
            })
            .collect();
        names.sort_unstable();
        names
    }

    /// All entity IDs, sorted.
    pub fn entity_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entities.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn entity_type(&self, id: &str) -> Option<&ConfigType> {
        self.entities.get(id)
    }

    pub fn is_entity_id_registered(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    /// Whether `ty` (or, for arrays, its innermost element) can be parsed.
    pub fn is_resolvable(&self, ty: &ConfigType) -> bool {
        is_object_or_leaf(&self.schemas, ty)
    }
}
