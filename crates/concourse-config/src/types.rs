use std::fmt;

/// The built-in scalar kinds. Seeded into every registry at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Str,
}

impl LeafKind {
    /// Every leaf kind, in registration order.
    pub const ALL: [LeafKind; 8] = [
        LeafKind::Bool,
        LeafKind::I8,
        LeafKind::I16,
        LeafKind::I32,
        LeafKind::I64,
        LeafKind::F32,
        LeafKind::F64,
        LeafKind::Str,
    ];

    /// Returns true for the six numeric kinds.
    pub fn is_numeric(self) -> bool {
        self.is_integral() || self.is_float()
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            LeafKind::I8 | LeafKind::I16 | LeafKind::I32 | LeafKind::I64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, LeafKind::F32 | LeafKind::F64)
    }

    pub fn name(self) -> &'static str {
        match self {
            LeafKind::Bool => "bool",
            LeafKind::I8 => "int8",
            LeafKind::I16 => "int16",
            LeafKind::I32 => "int32",
            LeafKind::I64 => "int64",
            LeafKind::F32 => "float32",
            LeafKind::F64 => "float64",
            LeafKind::Str => "string",
        }
    }
}

impl fmt::Display for LeafKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifies a target type: a built-in leaf, a registered object schema
/// (by name), or an array of either.
///
/// Arrays are never registered on their own; they only appear as the
/// declared type of an attribute or as a top-level array parse target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConfigType {
    Leaf(LeafKind),
    Object(String),
    Array(Box<ConfigType>),
}

impl ConfigType {
    pub const BOOL: ConfigType = ConfigType::Leaf(LeafKind::Bool);
    pub const I8: ConfigType = ConfigType::Leaf(LeafKind::I8);
    pub const I16: ConfigType = ConfigType::Leaf(LeafKind::I16);
    pub const I32: ConfigType = ConfigType::Leaf(LeafKind::I32);
    pub const I64: ConfigType = ConfigType::Leaf(LeafKind::I64);
    pub const F32: ConfigType = ConfigType::Leaf(LeafKind::F32);
    pub const F64: ConfigType = ConfigType::Leaf(LeafKind::F64);
    pub const STRING: ConfigType = ConfigType::Leaf(LeafKind::Str);

    /// An object type identified by `name`.
    pub fn object(name: impl Into<String>) -> Self {
        ConfigType::Object(name.into())
    }

    /// "Array of `element`".
    pub fn array_of(element: ConfigType) -> Self {
        ConfigType::Array(Box::new(element))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, ConfigType::Array(_))
    }

    /// The element type if this is an array type.
    pub fn element(&self) -> Option<&ConfigType> {
        match self {
            ConfigType::Array(element) => Some(element),
            _ => None,
        }
    }

    /// The innermost non-array type (`Door` for `Door[][]`).
    pub fn base(&self) -> &ConfigType {
        let mut ty = self;
        while let ConfigType::Array(element) = ty {
            ty = element;
        }
        ty
    }
}

impl From<LeafKind> for ConfigType {
    fn from(kind: LeafKind) -> Self {
        ConfigType::Leaf(kind)
    }
}

impl fmt::Display for ConfigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigType::Leaf(kind) => write!(f, "{kind}"),
            ConfigType::Object(name) => f.write_str(name),
            ConfigType::Array(element) => write!(f, "{element}[]"),
        }
    }
}
