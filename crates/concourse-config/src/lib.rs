//! Concourse Config -- schema-driven conversion of generic documents into
//! typed configuration objects.
//!
//! Application types are described once, at startup, as ordered lists of
//! attributes plus a constructor. The registry then turns any JSON-style
//! value tree into a fully validated instance, or a single error that
//! pinpoints where the document went wrong.
//!
//! # Lifecycle
//!
//! ```rust,ignore
//! let mut builder = RegistryBuilder::new();          // leaf types seeded
//! builder.register_object(
//!     ConfigType::object("Door"),
//!     vec![
//!         Attribute::required("width", ConfigType::I32),
//!         Attribute::optional("locked", ConfigType::BOOL, false),
//!     ],
//!     |mut args| Ok(Door { width: args.take("width")?, locked: args.take("locked")? }),
//! )?;
//! builder.register_entity_id("door", ConfigType::object("Door"))?;
//! let registry = builder.build()?;                   // sealed, Send + Sync
//!
//! let door: Door = registry.parse(&ConfigType::object("Door"), &json!({"width": 120}))?;
//! ```
//!
//! # Key Types
//!
//! - [`registry::RegistryBuilder`] -- Registration phase; validates on [`build`].
//! - [`registry::TypeRegistry`] -- Immutable registry; all parse operations.
//! - [`types::ConfigType`] -- Type token: leaf, named object, or array.
//! - [`attribute::Attribute`] -- One configuration key of an object schema.
//! - [`value::ConfigValue`] -- Validated intermediate value handed to constructors.
//! - [`error::ConfigError`] -- `Format` (schema problem) or `Parse` (document problem).
//!
//! [`build`]: registry::RegistryBuilder::build

pub mod attribute;
pub mod coerce;
pub mod error;
mod parser;
pub mod registry;
pub mod types;
pub mod value;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use attribute::{Arguments, Attribute};
pub use error::{ConfigError, FormatError, ParseError, ParseErrorKind, PathSegment};
pub use registry::{ObjectSchema, RegistryBuilder, RegistryConfig, Schema, TypeRegistry};
pub use types::{ConfigType, LeafKind};
pub use value::{ConfigObject, ConfigValue, FromConfigValue, Mismatch, ObjectValue};
