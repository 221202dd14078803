//! Typed values produced by the parser and consumed by constructors.

use std::any::Any;
use std::fmt;

use crate::error::FormatError;
use crate::types::{ConfigType, LeafKind};

/// Marker for application types the registry can construct.
///
/// Implement it with an empty `impl ConfigObject for Door {}`; the bounds
/// let constructed instances be cloned and compared when they serve as
/// attribute defaults.
pub trait ConfigObject: Any + Clone + PartialEq + fmt::Debug + Send + Sync {}

/// Object-safe view of a [`ConfigObject`].
trait DynObject: Any + fmt::Debug + Send + Sync {
    fn clone_box(&self) -> Box<dyn DynObject>;
    fn eq_dyn(&self, other: &dyn Any) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: ConfigObject> DynObject for T {
    fn clone_box(&self) -> Box<dyn DynObject> {
        Box::new(self.clone())
    }

    fn eq_dyn(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<T>().is_some_and(|other| self == other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A constructed instance of a registered object type, with its concrete
/// Rust type erased.
pub struct ObjectValue {
    type_name: String,
    inner: Box<dyn DynObject>,
}

impl ObjectValue {
    pub fn new<T: ConfigObject>(type_name: impl Into<String>, value: T) -> Self {
        Self {
            type_name: type_name.into(),
            inner: Box::new(value),
        }
    }

    /// Name of the schema that produced this instance.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn is<T: ConfigObject>(&self) -> bool {
        self.inner.as_any().is::<T>()
    }

    pub fn downcast_ref<T: ConfigObject>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref::<T>()
    }

    /// Take the concrete instance out.
    pub fn downcast<T: ConfigObject>(self) -> Result<T, FormatError> {
        self.into_inner::<T>()
            .map_err(|type_name| FormatError::TypeMismatch {
                type_name,
                expected: std::any::type_name::<T>(),
            })
    }

    /// On mismatch only the schema name survives.
    fn into_inner<T: ConfigObject>(self) -> Result<T, String> {
        let ObjectValue { type_name, inner } = self;
        inner
            .into_any()
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| type_name)
    }
}

impl Clone for ObjectValue {
    fn clone(&self) -> Self {
        Self {
            type_name: self.type_name.clone(),
            inner: self.inner.clone_box(),
        }
    }
}

impl PartialEq for ObjectValue {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name && self.inner.eq_dyn(other.inner.as_any())
    }
}

impl fmt::Debug for ObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectValue")
            .field("type_name", &self.type_name)
            .field("value", &self.inner)
            .finish()
    }
}

/// A fully validated value, one variant per leaf kind plus arrays and
/// constructed objects.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Str(String),
    Array(Vec<ConfigValue>),
    Object(ObjectValue),
}

impl ConfigValue {
    pub fn object<T: ConfigObject>(type_name: impl Into<String>, value: T) -> Self {
        ConfigValue::Object(ObjectValue::new(type_name, value))
    }

    pub fn leaf_kind(&self) -> Option<LeafKind> {
        Some(match self {
            ConfigValue::Bool(_) => LeafKind::Bool,
            ConfigValue::I8(_) => LeafKind::I8,
            ConfigValue::I16(_) => LeafKind::I16,
            ConfigValue::I32(_) => LeafKind::I32,
            ConfigValue::I64(_) => LeafKind::I64,
            ConfigValue::F32(_) => LeafKind::F32,
            ConfigValue::F64(_) => LeafKind::F64,
            ConfigValue::Str(_) => LeafKind::Str,
            ConfigValue::Array(_) | ConfigValue::Object(_) => return None,
        })
    }

    /// Short description used in error messages: the leaf name, the object's
    /// schema name, or `X[]` for arrays (`[]` when empty).
    pub fn describe(&self) -> String {
        match self {
            ConfigValue::Array(items) => match items.first() {
                Some(first) => format!("{}[]", first.describe()),
                None => "[]".to_string(),
            },
            ConfigValue::Object(obj) => obj.type_name().to_string(),
            leaf => leaf
                .leaf_kind()
                .map(|k| k.name().to_string())
                .unwrap_or_default(),
        }
    }

    /// Structural equality where floats compare by bit pattern, so a NaN
    /// default is identical to itself.
    pub(crate) fn same_as(&self, other: &ConfigValue) -> bool {
        match (self, other) {
            (ConfigValue::F32(a), ConfigValue::F32(b)) => a.to_bits() == b.to_bits(),
            (ConfigValue::F64(a), ConfigValue::F64(b)) => a.to_bits() == b.to_bits(),
            (ConfigValue::Array(a), ConfigValue::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.same_as(b))
            }
            (a, b) => a == b,
        }
    }

    /// Whether this value could have been produced by parsing against `ty`.
    pub fn conforms_to(&self, ty: &ConfigType) -> bool {
        match (self, ty) {
            (ConfigValue::Array(items), ConfigType::Array(element)) => {
                items.iter().all(|item| item.conforms_to(element))
            }
            (ConfigValue::Object(obj), ConfigType::Object(name)) => obj.type_name() == name,
            (value, ConfigType::Leaf(kind)) => value.leaf_kind() == Some(*kind),
            _ => false,
        }
    }
}

/// What a failed [`FromConfigValue`] conversion was handed instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    found: String,
}

impl Mismatch {
    pub fn of(value: &ConfigValue) -> Self {
        Self {
            found: value.describe(),
        }
    }

    /// Description of the offending value, as in [`ConfigValue::describe`].
    pub fn found(&self) -> &str {
        &self.found
    }
}

/// Conversion out of a [`ConfigValue`] into a native Rust value.
pub trait FromConfigValue: Sized {
    fn from_config_value(value: ConfigValue) -> Result<Self, Mismatch>;
}

macro_rules! leaf_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromConfigValue for $ty {
                fn from_config_value(value: ConfigValue) -> Result<Self, Mismatch> {
                    match value {
                        ConfigValue::$variant(v) => Ok(v),
                        other => Err(Mismatch::of(&other)),
                    }
                }
            }

            impl From<$ty> for ConfigValue {
                fn from(v: $ty) -> Self {
                    ConfigValue::$variant(v)
                }
            }
        )*
    };
}

leaf_conversions! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    String => Str,
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::Str(v.to_string())
    }
}

impl From<ObjectValue> for ConfigValue {
    fn from(v: ObjectValue) -> Self {
        ConfigValue::Object(v)
    }
}

impl<T: Into<ConfigValue>> From<Vec<T>> for ConfigValue {
    fn from(items: Vec<T>) -> Self {
        ConfigValue::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: FromConfigValue> FromConfigValue for Vec<T> {
    fn from_config_value(value: ConfigValue) -> Result<Self, Mismatch> {
        match value {
            ConfigValue::Array(items) => items.into_iter().map(T::from_config_value).collect(),
            other => Err(Mismatch::of(&other)),
        }
    }
}

impl FromConfigValue for ConfigValue {
    fn from_config_value(value: ConfigValue) -> Result<Self, Mismatch> {
        Ok(value)
    }
}

impl FromConfigValue for ObjectValue {
    fn from_config_value(value: ConfigValue) -> Result<Self, Mismatch> {
        match value {
            ConfigValue::Object(obj) => Ok(obj),
            other => Err(Mismatch::of(&other)),
        }
    }
}

impl<T: ConfigObject> FromConfigValue for T {
    fn from_config_value(value: ConfigValue) -> Result<Self, Mismatch> {
        match value {
            ConfigValue::Object(obj) => obj.into_inner::<T>().map_err(|found| Mismatch { found }),
            other => Err(Mismatch::of(&other)),
        }
    }
}
