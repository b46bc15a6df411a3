//! Data trees and default instantiation
//!
//! A [`DataTree`] mirrors its schema's field names at every depth. Handles are
//! shallow: cloning a `DataTree` yields another view of the same storage, which
//! is how nested-field views propagate writes to their parent. Use
//! [`DataTree::deep_copy`] for independent storage.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::rc::Rc;

use crate::collection::Collection;
use crate::schema::{FieldSpec, Schema};

/// Stored value of one field
#[derive(Debug, Clone)]
pub enum Slot {
    Leaf(Value),
    Nested(DataTree),
    Collection(Collection),
}

impl Slot {
    fn deep_copy(&self) -> Slot {
        match self {
            Slot::Leaf(value) => Slot::Leaf(value.clone()),
            Slot::Nested(tree) => Slot::Nested(tree.deep_copy()),
            Slot::Collection(collection) => Slot::Collection(collection.deep_copy()),
        }
    }

    fn to_plain(&self) -> Value {
        match self {
            Slot::Leaf(value) => value.clone(),
            Slot::Nested(tree) => tree.to_plain(),
            Slot::Collection(collection) => collection.to_plain(),
        }
    }
}

/// Shared, mutable field storage for one schema level
#[derive(Debug, Clone, Default)]
pub struct DataTree(Rc<RefCell<IndexMap<String, Slot>>>);

impl DataTree {
    /// Build the all-defaults tree for a schema
    pub fn instantiate(schema: &Schema) -> Self {
        let fields = schema
            .fields()
            .map(|(name, spec)| {
                let slot = match spec {
                    FieldSpec::Leaf(kind) => Slot::Leaf(kind.default_value()),
                    FieldSpec::Nested(sub) => Slot::Nested(DataTree::instantiate(sub)),
                    FieldSpec::Collection(element) => Slot::Collection(Collection::new(element)),
                };
                (name.to_string(), slot)
            })
            .collect();

        DataTree(Rc::new(RefCell::new(fields)))
    }

    /// Independent copy of the whole tree, collections included
    pub fn deep_copy(&self) -> Self {
        let fields = self
            .0
            .borrow()
            .iter()
            .map(|(name, slot)| (name.clone(), slot.deep_copy()))
            .collect();

        DataTree(Rc::new(RefCell::new(fields)))
    }

    /// Schema-free export: objects, arrays and scalars only
    pub fn to_plain(&self) -> Value {
        let fields: Map<String, Value> = self
            .0
            .borrow()
            .iter()
            .map(|(name, slot)| (name.clone(), slot.to_plain()))
            .collect();

        Value::Object(fields)
    }

    /// Field names in storage order
    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().keys().cloned().collect()
    }

    /// Whether both handles view the same storage
    pub fn same_storage(&self, other: &DataTree) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Check the shape invariant against a schema, recursively
    pub fn conforms_to(&self, schema: &Schema) -> bool {
        let fields = self.0.borrow();
        fields.len() == schema.len()
            && schema.fields().all(|(name, spec)| match (spec, fields.get(name)) {
                (FieldSpec::Leaf(kind), Some(Slot::Leaf(value))) => kind.holds(value),
                (FieldSpec::Nested(sub), Some(Slot::Nested(tree))) => tree.conforms_to(sub),
                (FieldSpec::Collection(element), Some(Slot::Collection(collection))) => {
                    collection.conforms_to(element)
                }
                _ => false,
            })
    }

    /// Clone of a field's slot; nested and collection slots come back as shared handles
    pub(crate) fn slot(&self, field: &str) -> Option<Slot> {
        self.0.borrow().get(field).cloned()
    }

    pub(crate) fn set_leaf(&self, field: &str, value: Value) {
        if let Some(slot) = self.0.borrow_mut().get_mut(field) {
            *slot = Slot::Leaf(value);
        }
    }
}

/// Build the all-defaults tree for a schema
pub fn instantiate(schema: &Schema) -> DataTree {
    DataTree::instantiate(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn address() -> Schema {
        Schema::build("address", |s| s.text("address_1").text("address_2").text("city"))
    }

    fn customer(address: &Schema) -> Schema {
        Schema::build("customer", |s| {
            s.text("name")
                .number("age")
                .boolean("is_verified")
                .map("attributes")
                .list("tags")
                .nested("billing", address)
                .collection("shipping", address)
        })
    }

    #[test]
    fn test_instantiate_defaults() {
        let tree = instantiate(&address());
        assert_eq!(
            tree.to_plain(),
            json!({"address_1": "", "address_2": "", "city": ""})
        );
    }

    #[test]
    fn test_instantiate_nested_and_collections() {
        let addr = address();
        let tree = instantiate(&customer(&addr));

        assert_eq!(
            tree.to_plain(),
            json!({
                "name": "",
                "age": 0,
                "is_verified": 0,
                "attributes": {},
                "tags": [],
                "billing": {"address_1": "", "address_2": "", "city": ""},
                "shipping": []
            })
        );
        assert_eq!(
            tree.keys(),
            vec!["name", "age", "is_verified", "attributes", "tags", "billing", "shipping"]
        );
    }

    #[test]
    fn test_shape_invariant_holds_after_instantiate() {
        let addr = address();
        let schema = customer(&addr);
        assert!(instantiate(&schema).conforms_to(&schema));
        assert!(!instantiate(&addr).conforms_to(&schema));
    }

    #[test]
    fn test_instantiate_is_deterministic_and_independent() {
        let addr = address();
        let schema = customer(&addr);
        let first = instantiate(&schema);
        let second = instantiate(&schema);

        assert_eq!(first.to_plain(), second.to_plain());
        assert!(!first.same_storage(&second));

        first.set_leaf("name", json!("Ada"));
        assert_eq!(second.to_plain()["name"], json!(""));
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let addr = address();
        let tree = instantiate(&customer(&addr));
        let copy = tree.deep_copy();

        let Some(Slot::Nested(billing)) = tree.slot("billing") else {
            panic!("billing should be nested");
        };
        billing.set_leaf("city", json!("Springfield"));

        assert_eq!(tree.to_plain()["billing"]["city"], json!("Springfield"));
        assert_eq!(copy.to_plain()["billing"]["city"], json!(""));
    }

    #[test]
    fn test_set_leaf_ignores_unknown_field() {
        let tree = instantiate(&address());
        tree.set_leaf("kitties", json!("Meow"));
        assert_eq!(tree.keys(), vec!["address_1", "address_2", "city"]);
    }
}
