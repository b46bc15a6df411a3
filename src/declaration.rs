//! Schema declaration documents
//!
//! Schemas can be declared as data instead of code:
//!
//! ```json
//! {
//!   "schemas": {
//!     "address": { "address_1": "text", "city": "text" },
//!     "order": {
//!       "total": "number",
//!       "ship_to": { "schema": "address" },
//!       "addresses": { "collection": "address" }
//!     }
//!   }
//! }
//! ```
//!
//! or the equivalent TOML. References may point forward within a document or
//! at schemas already in the target registry; they are resolved in dependency
//! order, and reference cycles are rejected.

use indexmap::IndexMap;
use petgraph::algo::{kosaraju_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::kind::Kind;
use crate::registry::{closest_match, SchemaRegistry};
use crate::schema::{FieldSpec, Schema, SchemaBuilder};

/// Declared category of one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldDecl {
    Leaf(Kind),
    Nested { schema: String },
    Collection { collection: String },
}

impl FieldDecl {
    fn reference(&self) -> Option<&str> {
        match self {
            FieldDecl::Leaf(_) => None,
            FieldDecl::Nested { schema } => Some(schema),
            FieldDecl::Collection { collection } => Some(collection),
        }
    }
}

/// A document of schema declarations, keyed by schema name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declarations {
    #[serde(default)]
    pub schemas: IndexMap<String, IndexMap<String, FieldDecl>>,
}

impl Declarations {
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a `.json` or `.toml` declaration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "json" => Self::from_json_str(&fs::read_to_string(path)?),
            "toml" => Self::from_toml_str(&fs::read_to_string(path)?),
            _ => Err(SchemaError::InvalidFormat(format!(
                "{}: expected a .json or .toml file",
                path.display()
            ))),
        }
    }

    /// Build every declared schema and register it.
    ///
    /// All-or-nothing: on error the registry is left untouched. Returns the
    /// schemas in document order.
    pub fn register_into(&self, registry: &mut SchemaRegistry) -> Result<Vec<Schema>> {
        if let Some(name) = self.schemas.keys().find(|name| registry.contains(name)) {
            return Err(SchemaError::AlreadyExists { name: name.clone() });
        }

        let order = self.dependency_order(registry)?;
        debug!(order = ?order, "resolved declaration order");

        let mut built: HashMap<&str, Schema> = HashMap::new();
        for name in order {
            let fields = &self.schemas[name];
            let mut builder = SchemaBuilder::new(name);
            for (field, decl) in fields {
                let spec = match decl {
                    FieldDecl::Leaf(kind) => FieldSpec::Leaf(*kind),
                    FieldDecl::Nested { schema } => {
                        FieldSpec::Nested(resolve(schema, &built, registry)?)
                    }
                    FieldDecl::Collection { collection } => {
                        FieldSpec::Collection(resolve(collection, &built, registry)?)
                    }
                };
                builder = builder.field(field.as_str(), spec);
            }
            built.insert(name, builder.build());
        }

        let mut registered = Vec::with_capacity(self.schemas.len());
        for name in self.schemas.keys() {
            if let Some(schema) = built.remove(name.as_str()) {
                registered.push(registry.register(schema)?);
            }
        }
        Ok(registered)
    }

    /// Declared schema names, dependencies before dependents
    fn dependency_order(&self, registry: &SchemaRegistry) -> Result<Vec<&str>> {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let nodes: HashMap<&str, NodeIndex> = self
            .schemas
            .keys()
            .map(|name| (name.as_str(), graph.add_node(name.as_str())))
            .collect();

        for (name, fields) in &self.schemas {
            for reference in fields.values().filter_map(FieldDecl::reference) {
                if let Some(&dependency) = nodes.get(reference) {
                    graph.add_edge(dependency, nodes[name.as_str()], ());
                } else if !registry.contains(reference) {
                    let candidates = self
                        .schemas
                        .keys()
                        .map(String::as_str)
                        .chain(registry.names());
                    let suggestion = closest_match(reference, candidates).map(String::from);
                    return Err(SchemaError::not_found(reference, suggestion));
                }
            }
        }

        toposort(&graph, None)
            .map(|sorted| sorted.into_iter().map(|index| graph[index]).collect())
            .map_err(|cycle| {
                let start = cycle.node_id();
                let members = kosaraju_scc(&graph)
                    .into_iter()
                    .find(|scc| scc.contains(&start))
                    .unwrap_or_else(|| vec![start]);
                let mut names: Vec<&str> = members.into_iter().map(|index| graph[index]).collect();
                names.sort_unstable();
                SchemaError::CyclicReference(names.join(", "))
            })
    }
}

fn resolve(
    name: &str,
    built: &HashMap<&str, Schema>,
    registry: &SchemaRegistry,
) -> Result<Schema> {
    match built.get(name) {
        Some(schema) => Ok(schema.clone()),
        None => registry.require(name).cloned(),
    }
}

impl SchemaRegistry {
    /// New registry holding every schema of a declaration document
    pub fn from_declarations(declarations: &Declarations) -> Result<Self> {
        let mut registry = SchemaRegistry::new();
        declarations.register_into(&mut registry)?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ORDERS: &str = r#"{
        "schemas": {
            "order": {
                "id": "text",
                "total": "number",
                "ship_to": { "schema": "address" },
                "addresses": { "collection": "address" }
            },
            "address": { "address_1": "text", "address_2": "text", "city": "text" }
        }
    }"#;

    #[test]
    fn test_parse_field_decls() {
        let decls = Declarations::from_json_str(ORDERS).unwrap();
        let order = &decls.schemas["order"];
        assert_eq!(order["total"], FieldDecl::Leaf(Kind::Number));
        assert_eq!(
            order["ship_to"],
            FieldDecl::Nested { schema: "address".to_string() }
        );
        assert_eq!(
            order["addresses"],
            FieldDecl::Collection { collection: "address".to_string() }
        );
    }

    #[test]
    fn test_forward_references_resolve() {
        let decls = Declarations::from_json_str(ORDERS).unwrap();
        let registry = SchemaRegistry::from_declarations(&decls).unwrap();
        assert_eq!(registry.names(), vec!["order", "address"]);

        let order = registry.create("order").unwrap();
        assert_eq!(
            order.get_data(),
            json!({
                "id": "",
                "total": 0,
                "ship_to": {"address_1": "", "address_2": "", "city": ""},
                "addresses": []
            })
        );

        let address = registry.get("address").unwrap();
        let ship_to = order.get_property("ship_to").into_record().unwrap();
        assert!(ship_to.schema().same_as(address));
    }

    #[test]
    fn test_toml_declarations() {
        let decls = Declarations::from_toml_str(
            r#"
            [schemas.address]
            city = "text"

            [schemas.customer]
            name = "text"
            is_verified = "bool"
            home = { schema = "address" }
            "#,
        )
        .unwrap();
        let registry = SchemaRegistry::from_declarations(&decls).unwrap();
        let customer = registry.get("customer").unwrap();
        assert_eq!(customer.field_names(), vec!["name", "is_verified", "home"]);
    }

    #[test]
    fn test_references_into_existing_registry() {
        let mut registry = SchemaRegistry::new();
        registry.define("address", |s| s.text("city")).unwrap();

        let decls = Declarations::from_json_str(
            r#"{"schemas": {"customer": {"home": {"schema": "address"}}}}"#,
        )
        .unwrap();
        let added = decls.register_into(&mut registry).unwrap();
        assert_eq!(added.len(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unknown_reference() {
        let decls = Declarations::from_json_str(
            r#"{"schemas": {
                "address": {"city": "text"},
                "customer": {"home": {"schema": "adress"}}
            }}"#,
        )
        .unwrap();
        let mut registry = SchemaRegistry::new();

        match decls.register_into(&mut registry) {
            Err(SchemaError::NotFound { name, suggestion }) => {
                assert_eq!(name, "adress");
                assert_eq!(suggestion.as_deref(), Some("address"));
            }
            other => panic!("Expected NotFound, got {:?}", other),
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_cycles_are_rejected() {
        let decls = Declarations::from_json_str(
            r#"{"schemas": {
                "a": {"b": {"schema": "b"}},
                "b": {"items": {"collection": "a"}},
                "c": {"name": "text"}
            }}"#,
        )
        .unwrap();
        let mut registry = SchemaRegistry::new();

        match decls.register_into(&mut registry) {
            Err(SchemaError::CyclicReference(members)) => assert_eq!(members, "a, b"),
            other => panic!("Expected CyclicReference, got {:?}", other),
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let decls = Declarations::from_json_str(
            r#"{"schemas": {"node": {"children": {"collection": "node"}}}}"#,
        )
        .unwrap();
        let result = SchemaRegistry::from_declarations(&decls);
        assert!(matches!(result, Err(SchemaError::CyclicReference(ref m)) if m == "node"));
    }

    #[test]
    fn test_already_registered_name() {
        let mut registry = SchemaRegistry::new();
        registry.define("address", |s| s.text("city")).unwrap();
        let decls = Declarations::from_json_str(
            r#"{"schemas": {"note": {"body": "text"}, "address": {"city": "text"}}}"#,
        )
        .unwrap();

        assert!(matches!(
            decls.register_into(&mut registry),
            Err(SchemaError::AlreadyExists { .. })
        ));
        assert_eq!(registry.names(), vec!["address"]);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result = Declarations::from_json_str(r#"{"schemas": {"a": {"x": "decimal"}}}"#);
        assert!(matches!(result, Err(SchemaError::Json(_))));
    }

    #[test]
    fn test_from_path_rejects_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schemas.yaml");
        std::fs::write(&path, "schemas: {}").unwrap();
        assert!(matches!(
            Declarations::from_path(&path),
            Err(SchemaError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_from_path_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.json");
        std::fs::write(&path, ORDERS).unwrap();
        let decls = Declarations::from_path(&path).unwrap();
        assert_eq!(decls.schemas.len(), 2);
    }
}
