//! Schema types and structures

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

use crate::kind::Kind;
use crate::registry::closest_match;

/// Category of a schema field, fixed when the schema is declared
#[derive(Debug, Clone)]
pub enum FieldSpec {
    /// Primitive value with a kind-specific default and coercion
    Leaf(Kind),
    /// Value governed by another schema
    Nested(Schema),
    /// Growable list of instances of one element schema
    Collection(Schema),
}

impl FieldSpec {
    /// The leaf kind, if this is a leaf field
    pub fn kind(&self) -> Option<Kind> {
        match self {
            FieldSpec::Leaf(kind) => Some(*kind),
            _ => None,
        }
    }

    /// The referenced schema for nested and collection fields
    pub fn schema(&self) -> Option<&Schema> {
        match self {
            FieldSpec::Leaf(_) => None,
            FieldSpec::Nested(schema) | FieldSpec::Collection(schema) => Some(schema),
        }
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSpec::Leaf(kind) => write!(f, "{kind}"),
            FieldSpec::Nested(schema) => write!(f, "schema {}", schema.name()),
            FieldSpec::Collection(schema) => write!(f, "collection of {}", schema.name()),
        }
    }
}

#[derive(Debug)]
struct SchemaDef {
    name: String,
    fields: IndexMap<String, FieldSpec>,
}

/// An immutable, named field map
///
/// `Schema` is a cheap handle: clones share one definition, and identity is
/// handle identity. Two separately declared schemas with the same fields are
/// still different schemas.
#[derive(Debug, Clone)]
pub struct Schema(Arc<SchemaDef>);

impl Schema {
    /// Declare a schema with a builder closure
    pub fn build(
        name: impl Into<String>,
        declare: impl FnOnce(SchemaBuilder) -> SchemaBuilder,
    ) -> Self {
        declare(SchemaBuilder::new(name)).build()
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Look up a field's spec
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.0.fields.get(name)
    }

    /// Fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.0.fields.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.0.fields.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.0.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.fields.is_empty()
    }

    /// Whether both handles refer to the same declaration
    pub fn same_as(&self, other: &Schema) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Element schema when this schema is exactly one collection field
    pub fn single_collection(&self) -> Option<&Schema> {
        match (self.0.fields.len(), self.0.fields.first()) {
            (1, Some((_, FieldSpec::Collection(element)))) => Some(element),
            _ => None,
        }
    }

    /// Closest declared field name, for diagnostics on unknown fields
    pub fn closest_field(&self, name: &str) -> Option<&str> {
        closest_match(name, self.0.fields.keys().map(String::as_str))
    }
}

/// Fluent field declaration for a [`Schema`]
///
/// Declaring a field name twice replaces the earlier spec and keeps its position.
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    fields: IndexMap<String, FieldSpec>,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.insert(name.into(), spec);
        self
    }

    pub fn leaf(self, name: impl Into<String>, kind: Kind) -> Self {
        self.field(name, FieldSpec::Leaf(kind))
    }

    pub fn text(self, name: impl Into<String>) -> Self {
        self.leaf(name, Kind::Text)
    }

    pub fn number(self, name: impl Into<String>) -> Self {
        self.leaf(name, Kind::Number)
    }

    pub fn boolean(self, name: impl Into<String>) -> Self {
        self.leaf(name, Kind::Boolean)
    }

    pub fn map(self, name: impl Into<String>) -> Self {
        self.leaf(name, Kind::Map)
    }

    pub fn list(self, name: impl Into<String>) -> Self {
        self.leaf(name, Kind::List)
    }

    pub fn nested(self, name: impl Into<String>, schema: &Schema) -> Self {
        self.field(name, FieldSpec::Nested(schema.clone()))
    }

    pub fn collection(self, name: impl Into<String>, element: &Schema) -> Self {
        self.field(name, FieldSpec::Collection(element.clone()))
    }

    pub fn build(self) -> Schema {
        Schema(Arc::new(SchemaDef {
            name: self.name,
            fields: self.fields,
        }))
    }
}
