use crate::error::{ConfigError, FormatError};
use crate::registry::ObjectSchema;
use crate::types::ConfigType;
use crate::value::{ConfigValue, FromConfigValue};

/// One named, typed slot of an object schema.
///
/// An attribute is required exactly when it carries no default.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    key: String,
    ty: ConfigType,
    default: Option<ConfigValue>,
}

impl Attribute {
    pub fn required(key: impl Into<String>, ty: ConfigType) -> Self {
        Self {
            key: key.into(),
            ty,
            default: None,
        }
    }

    pub fn optional(key: impl Into<String>, ty: ConfigType, default: impl Into<ConfigValue>) -> Self {
        Self {
            key: key.into(),
            ty,
            default: Some(default.into()),
        }
    }

    /// The configuration key as it appears in documents.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn ty(&self) -> &ConfigType {
        &self.ty
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    pub fn default(&self) -> Option<&ConfigValue> {
        self.default.as_ref()
    }

    /// Descriptor identity for re-registration. Unlike `==`, a float default
    /// matches itself bit for bit, NaN included.
    pub(crate) fn same_as(&self, other: &Attribute) -> bool {
        self.key == other.key
            && self.ty == other.ty
            && match (&self.default, &other.default) {
                (Some(a), Some(b)) => a.same_as(b),
                (None, None) => true,
                _ => false,
            }
    }
}

/// The ordered, fully populated parameter list handed to a constructor.
///
/// Each slot can be taken once, by key or by position. Asking for a slot
/// that does not exist, was already taken, or holds a different type means
/// the constructor disagrees with its own schema, which is a
/// [`FormatError`].
#[derive(Debug)]
pub struct Arguments<'a> {
    schema: &'a ObjectSchema,
    values: Vec<Option<ConfigValue>>,
}

impl<'a> Arguments<'a> {
    pub(crate) fn new(schema: &'a ObjectSchema, values: Vec<ConfigValue>) -> Self {
        Self {
            schema,
            values: values.into_iter().map(Some).collect(),
        }
    }

    /// Name of the schema being constructed.
    pub fn type_name(&self) -> &str {
        self.schema.type_name()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Take the value for `key`.
    pub fn take<T: FromConfigValue>(&mut self, key: &str) -> Result<T, ConfigError> {
        let index = self
            .schema
            .index_of(key)
            .ok_or_else(|| self.mismatch(key, "no such configuration key".to_string()))?;
        self.take_at(index)
    }

    /// Take the value at `index` in declaration order.
    pub fn take_at<T: FromConfigValue>(&mut self, index: usize) -> Result<T, ConfigError> {
        let schema = self.schema;
        let key = match schema.attributes().get(index) {
            Some(attribute) => attribute.key(),
            None => {
                return Err(self.mismatch(&format!("#{index}"), "index out of bounds".to_string()));
            }
        };
        let value = self.values[index]
            .take()
            .ok_or_else(|| self.mismatch(key, "already taken".to_string()))?;
        T::from_config_value(value).map_err(|found| {
            self.mismatch(
                key,
                format!(
                    "expected {}, got {}",
                    std::any::type_name::<T>(),
                    found.found()
                ),
            )
        })
    }

    fn mismatch(&self, key: &str, detail: String) -> ConfigError {
        FormatError::Argument {
            type_name: self.schema.type_name().to_string(),
            key: key.to_string(),
            detail,
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_and_optional() {
        let width = Attribute::required("width", ConfigType::I32);
        assert!(width.is_required());
        assert_eq!(width.default(), None);

        let locked = Attribute::optional("locked", ConfigType::BOOL, false);
        assert!(!locked.is_required());
        assert_eq!(locked.default(), Some(&ConfigValue::Bool(false)));
        assert_eq!(locked.key(), "locked");
        assert_eq!(locked.ty(), &ConfigType::BOOL);
    }

    #[test]
    fn equality_covers_every_field() {
        let a = Attribute::optional("locked", ConfigType::BOOL, false);
        assert_eq!(a, Attribute::optional("locked", ConfigType::BOOL, false));
        assert_ne!(a, Attribute::optional("locked", ConfigType::BOOL, true));
        assert_ne!(a, Attribute::required("locked", ConfigType::BOOL));
        assert_ne!(a, Attribute::optional("open", ConfigType::BOOL, false));
    }
}
