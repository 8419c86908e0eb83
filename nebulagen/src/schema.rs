use std::fmt;

/// Whether a schema declares a vertex type (nGQL `TAG`) or an edge type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaCategory {
    Tag,
    Edge,
}

impl SchemaCategory {
    pub fn keyword(self) -> &'static str {
        match self {
            SchemaCategory::Tag => "TAG",
            SchemaCategory::Edge => "EDGE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    String,
    Int,
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKind::String => f.write_str("string"),
            PropertyKind::Int => f.write_str("int"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,
    pub nullable: bool,
}

impl PropertyDef {
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PropertyKind::String,
            nullable: false,
        }
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PropertyKind::Int,
            nullable: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// Ordered property list of one vertex or edge type.
///
/// The order is the positional contract between `CREATE` declarations and
/// every `INSERT` rendered for the type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSchema {
    pub name: String,
    pub category: SchemaCategory,
    pub properties: Vec<PropertyDef>,
}

impl TypeSchema {
    pub fn tag(name: impl Into<String>, properties: Vec<PropertyDef>) -> Self {
        Self {
            name: name.into(),
            category: SchemaCategory::Tag,
            properties,
        }
    }

    pub fn edge(name: impl Into<String>, properties: Vec<PropertyDef>) -> Self {
        Self {
            name: name.into(),
            category: SchemaCategory::Edge,
            properties,
        }
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|prop| prop.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// A single property value in a vertex or edge tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Int(i64),
    Null,
}

impl Value {
    pub fn kind(&self) -> Option<PropertyKind> {
        match self {
            Value::Str(_) => Some(PropertyKind::String),
            Value::Int(_) => Some(PropertyKind::Int),
            Value::Null => None,
        }
    }

    /// Text used for tabular exports: the raw string, the number, or empty for null.
    pub fn as_cell(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            Value::Int(i) => i.to_string(),
            Value::Null => String::new(),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
