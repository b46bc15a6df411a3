//! Instances: a schema paired with a mutable data tree
//!
//! Every write is re-validated against the schema. Reads of nested fields
//! return live views that share storage with the parent, so
//!
//! ```
//! use familiar_records::{Instance, Schema};
//!
//! let address = Schema::build("address", |s| s.text("city"));
//! let order = Schema::build("order", |s| s.number("total").nested("ship_to", &address));
//!
//! let o = Instance::create(&order);
//! let ship_to = o.get_property("ship_to").into_record().unwrap();
//! ship_to.set_property("city", "Springfield").unwrap();
//!
//! assert_eq!(o.get_data()["ship_to"]["city"], "Springfield");
//! ```
//!
//! fills in the parent in place.

use serde_json::Value;
use tracing::{debug, warn};

use crate::collection::Collection;
use crate::error::{Result, SchemaError};
use crate::kind::json_type_name;
use crate::schema::{FieldSpec, Schema};
use crate::tree::{DataTree, Slot};

/// Value accepted by [`Instance::set_property`]
#[derive(Debug, Clone)]
pub enum Input {
    Value(Value),
    Collection(Collection),
}

impl From<Value> for Input {
    fn from(value: Value) -> Self {
        Input::Value(value)
    }
}

impl From<Collection> for Input {
    fn from(collection: Collection) -> Self {
        Input::Collection(collection)
    }
}

impl From<&Collection> for Input {
    fn from(collection: &Collection) -> Self {
        Input::Collection(collection.clone())
    }
}

macro_rules! input_from_scalar {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Input {
                fn from(value: $ty) -> Self {
                    Input::Value(Value::from(value))
                }
            }
        )*
    };
}

input_from_scalar!(&str, String, bool, i32, i64, u32, u64, f64);

/// Result of [`Instance::get_property`]
#[derive(Debug, Clone)]
pub enum Property {
    /// Coerced leaf value
    Value(Value),
    /// Live view of a nested field
    Record(Instance),
    /// Shared handle to a collection field
    Collection(Collection),
    /// The schema has no such field
    Missing,
}

impl Property {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Property::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Property::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<Instance> {
        match self {
            Property::Record(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn into_collection(self) -> Option<Collection> {
        match self {
            Property::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Property::Missing)
    }
}

/// Export behavior for [`Instance::export`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Export a schema made of exactly one collection field as the bare item list
    pub unwrap_single_collection: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            unwrap_single_collection: true,
        }
    }
}

/// A schema paired with a data tree conforming to it
///
/// Cloning an `Instance` yields another view of the same storage; use
/// [`Instance::detached`] for an independent copy.
#[derive(Debug, Clone)]
pub struct Instance {
    schema: Schema,
    data: DataTree,
}

impl Instance {
    /// New instance holding the schema's all-defaults tree
    pub fn create(schema: &Schema) -> Self {
        Self {
            schema: schema.clone(),
            data: DataTree::instantiate(schema),
        }
    }

    pub(crate) fn view(schema: Schema, data: DataTree) -> Self {
        Self { schema, data }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn data(&self) -> &DataTree {
        &self.data
    }

    /// Write a field.
    ///
    /// Leaf values are coerced to the field's kind; on `TypeMismatch` nothing
    /// changes. Unknown fields, nested fields, plain values on collection fields
    /// and collections of another schema are ignored. A collection field takes
    /// copies of the given collection's items.
    pub fn set_property(&self, field: &str, value: impl Into<Input>) -> Result<()> {
        let value = value.into();
        let Some(spec) = self.schema.field(field) else {
            warn!(
                schema = self.schema.name(),
                field,
                suggestion = ?self.schema.closest_field(field),
                "ignoring write to unknown field"
            );
            return Ok(());
        };

        match (spec, value) {
            (FieldSpec::Leaf(kind), Input::Value(raw)) => {
                let coerced = kind.coerce(&raw).map_err(|mismatch| SchemaError::TypeMismatch {
                    field: field.to_string(),
                    expected: mismatch.expected,
                    actual: mismatch.actual,
                })?;
                self.data.set_leaf(field, coerced);
                Ok(())
            }
            (FieldSpec::Leaf(kind), Input::Collection(_)) => Err(SchemaError::TypeMismatch {
                field: field.to_string(),
                expected: kind.as_str(),
                actual: "collection",
            }),
            (FieldSpec::Nested(sub), _) => {
                debug!(
                    schema = self.schema.name(),
                    field,
                    nested = sub.name(),
                    "ignoring direct write to nested field"
                );
                Ok(())
            }
            (FieldSpec::Collection(element), Input::Collection(source)) => {
                if let Some(Slot::Collection(stored)) = self.data.slot(field) {
                    if !stored.assign_from(&source) {
                        warn!(
                            schema = self.schema.name(),
                            field,
                            element = element.name(),
                            given = source.element_schema().name(),
                            "ignoring collection assignment with mismatched schema"
                        );
                    }
                }
                Ok(())
            }
            (FieldSpec::Collection(element), Input::Value(raw)) => {
                warn!(
                    schema = self.schema.name(),
                    field,
                    element = element.name(),
                    given = json_type_name(&raw),
                    "ignoring non-collection write to collection field"
                );
                Ok(())
            }
        }
    }

    /// Read a field: leaf value, live nested view, or shared collection handle
    pub fn get_property(&self, field: &str) -> Property {
        match (self.schema.field(field), self.data.slot(field)) {
            (Some(FieldSpec::Nested(sub)), Some(Slot::Nested(tree))) => {
                Property::Record(Instance::view(sub.clone(), tree))
            }
            (Some(_), Some(Slot::Leaf(value))) => Property::Value(value),
            (Some(_), Some(Slot::Collection(collection))) => Property::Collection(collection),
            _ => Property::Missing,
        }
    }

    /// Plain, schema-free copy of the data.
    ///
    /// A schema made of exactly one collection field exports as the bare item list.
    pub fn get_data(&self) -> Value {
        self.export(&ExportOptions::default())
    }

    pub fn export(&self, options: &ExportOptions) -> Value {
        if options.unwrap_single_collection && self.schema.single_collection().is_some() {
            let only = self.schema.fields().next().map(|(name, _)| self.get_property(name));
            if let Some(Property::Collection(collection)) = only {
                return collection.to_plain();
            }
        }
        self.data.to_plain()
    }

    /// Whether the data still mirrors the schema at every depth
    pub fn conforms(&self) -> bool {
        self.data.conforms_to(&self.schema)
    }

    /// Independent copy with the same schema
    pub fn detached(&self) -> Self {
        Self {
            schema: self.schema.clone(),
            data: self.data.deep_copy(),
        }
    }

    /// Whether both instances view the same storage
    pub fn shares_storage_with(&self, other: &Instance) -> bool {
        self.data.same_storage(&other.data)
    }
}
