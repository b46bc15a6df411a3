//! Homogeneous collections ("hashsets")
//!
//! A [`Collection`] holds deep copies of instances that all share one element
//! schema. The handle is shared: every clone, and every `get_property` on the
//! owning field, sees the same item list.

use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;

use crate::error::{Result, SchemaError};
use crate::instance::Instance;
use crate::schema::Schema;
use crate::tree::DataTree;

#[derive(Debug)]
struct CollectionState {
    element: Schema,
    items: Vec<DataTree>,
}

/// Growable list of instances of one element schema
#[derive(Debug, Clone)]
pub struct Collection(Rc<RefCell<CollectionState>>);

impl Collection {
    /// Empty collection of `element` instances
    pub fn new(element: &Schema) -> Self {
        Collection(Rc::new(RefCell::new(CollectionState {
            element: element.clone(),
            items: Vec::new(),
        })))
    }

    pub fn element_schema(&self) -> Schema {
        self.0.borrow().element.clone()
    }

    /// Append a deep copy of `instance`'s data.
    ///
    /// Instances of any other schema are ignored; returns whether the item was appended.
    pub fn add(&self, instance: &Instance) -> bool {
        if !instance.schema().same_as(&self.0.borrow().element) {
            warn!(
                element = self.0.borrow().element.name(),
                given = instance.schema().name(),
                "ignoring collection append with mismatched schema"
            );
            return false;
        }

        let copy = instance.data().deep_copy();
        self.0.borrow_mut().items.push(copy);
        true
    }

    /// Number of stored items
    pub fn size(&self) -> usize {
        self.0.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn clear(&self) {
        self.0.borrow_mut().items.clear();
    }

    /// View of the item at `index`; writes through it change the stored item
    pub fn get(&self, index: usize) -> Result<Instance> {
        let state = self.0.borrow();
        let item = state.items.get(index).ok_or(SchemaError::IndexOutOfRange {
            index,
            len: state.items.len(),
        })?;
        Ok(Instance::view(state.element.clone(), item.clone()))
    }

    /// Views of all items, in insertion order
    pub fn iter(&self) -> std::vec::IntoIter<Instance> {
        let state = self.0.borrow();
        let views: Vec<Instance> = state
            .items
            .iter()
            .map(|item| Instance::view(state.element.clone(), item.clone()))
            .collect();
        views.into_iter()
    }

    /// Items exported as an array of plain objects
    pub fn to_plain(&self) -> Value {
        Value::Array(self.0.borrow().items.iter().map(DataTree::to_plain).collect())
    }

    /// Whether both handles share one item list
    pub fn same_as(&self, other: &Collection) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Replace the items with deep copies of `source`'s items.
    ///
    /// Returns false, leaving the items untouched, when the element schemas differ.
    pub(crate) fn assign_from(&self, source: &Collection) -> bool {
        if self.same_as(source) {
            return true;
        }
        if !source.0.borrow().element.same_as(&self.0.borrow().element) {
            return false;
        }

        let items: Vec<DataTree> = source
            .0
            .borrow()
            .items
            .iter()
            .map(DataTree::deep_copy)
            .collect();
        self.0.borrow_mut().items = items;
        true
    }

    pub(crate) fn deep_copy(&self) -> Collection {
        let state = self.0.borrow();
        Collection(Rc::new(RefCell::new(CollectionState {
            element: state.element.clone(),
            items: state.items.iter().map(DataTree::deep_copy).collect(),
        })))
    }

    pub(crate) fn conforms_to(&self, element: &Schema) -> bool {
        let state = self.0.borrow();
        state.element.same_as(element) && state.items.iter().all(|item| item.conforms_to(element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn address() -> Schema {
        Schema::build("address", |s| s.text("address_1").text("address_2").text("city"))
    }

    #[test]
    fn test_add_size_clear() {
        let addr = address();
        let addresses = Collection::new(&addr);
        assert!(addresses.is_empty());

        assert!(addresses.add(&Instance::create(&addr)));
        assert!(addresses.add(&Instance::create(&addr)));
        assert_eq!(addresses.size(), 2);
        assert_eq!(addresses.to_plain().as_array().map(Vec::len), Some(2));

        addresses.clear();
        assert_eq!(addresses.size(), 0);
        assert_eq!(addresses.to_plain(), json!([]));
    }

    #[test]
    fn test_add_rejects_other_schema() {
        let addr = address();
        let lookalike = address();
        let addresses = Collection::new(&addr);

        assert!(!addresses.add(&Instance::create(&lookalike)));
        assert_eq!(addresses.size(), 0);
    }

    #[test]
    fn test_add_copies_the_instance() {
        let addr = address();
        let addresses = Collection::new(&addr);
        let home = Instance::create(&addr);
        home.set_property("city", "Springfield").unwrap();

        addresses.add(&home);
        home.set_property("city", "Shelbyville").unwrap();

        let stored = addresses.get(0).unwrap();
        assert_eq!(stored.get_property("city").as_value(), Some(&json!("Springfield")));
    }

    #[test]
    fn test_get_returns_live_view() {
        let addr = address();
        let addresses = Collection::new(&addr);
        addresses.add(&Instance::create(&addr));

        let first = addresses.get(0).unwrap();
        assert!(first.schema().same_as(&addr));
        first.set_property("address_1", "300 Test St.").unwrap();

        assert_eq!(addresses.to_plain()[0]["address_1"], json!("300 Test St."));
    }

    #[test]
    fn test_get_out_of_range() {
        let addr = address();
        let addresses = Collection::new(&addr);
        addresses.add(&Instance::create(&addr));

        match addresses.get(1) {
            Err(SchemaError::IndexOutOfRange { index, len }) => {
                assert_eq!(index, 1);
                assert_eq!(len, 1);
            }
            other => panic!("Expected IndexOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_iter_in_insertion_order() {
        let addr = address();
        let addresses = Collection::new(&addr);
        for city in ["Springfield", "Shelbyville"] {
            let entry = Instance::create(&addr);
            entry.set_property("city", city).unwrap();
            addresses.add(&entry);
        }

        let cities: Vec<_> = addresses
            .iter()
            .filter_map(|entry| entry.get_property("city").into_value())
            .collect();
        assert_eq!(cities, vec![json!("Springfield"), json!("Shelbyville")]);
    }

    #[test]
    fn test_assign_from_copies_items() {
        let addr = address();
        let source = Collection::new(&addr);
        source.add(&Instance::create(&addr));
        let target = Collection::new(&addr);

        assert!(target.assign_from(&source));
        assert_eq!(target.size(), 1);

        source.clear();
        assert_eq!(target.size(), 1);

        let other = Collection::new(&address());
        assert!(!target.assign_from(&other));
        assert_eq!(target.size(), 1);
        assert!(target.assign_from(&target.clone()));
    }

    #[test]
    fn test_re_adding_a_stored_item() {
        let addr = address();
        let addresses = Collection::new(&addr);
        addresses.add(&Instance::create(&addr));

        let first = addresses.get(0).unwrap();
        assert!(addresses.add(&first));
        assert_eq!(addresses.size(), 2);
        assert!(addresses.conforms_to(&addr));
    }
}
