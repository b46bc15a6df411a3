//! Familiar Records
//!
//! Schema-shaped records for untyped, dynamically keyed data. A schema
//! declares once which fields an object has and what kind of value each holds;
//! every instance created from it exposes exactly those fields, starts with
//! typed defaults, and rejects writes that violate a field's kind.
//!
//! ## Features
//!
//! - **Leaf kinds**: text, number, boolean (stored as `0`/`1`), map, list
//! - **Nesting**: fields governed by other schemas, read back as live views
//! - **Collections**: homogeneous, schema-checked lists of instances
//! - **Declarations**: schemas declared in JSON or TOML documents
//!
//! ## Example
//!
//! ```
//! use familiar_records::{Collection, Instance, SchemaRegistry};
//! use serde_json::json;
//!
//! let mut registry = SchemaRegistry::new();
//! let address = registry
//!     .define("address", |s| s.text("address_1").text("address_2").text("city"))
//!     .unwrap();
//!
//! let home = Instance::create(&address);
//! home.set_property("address_1", "300 Test St.").unwrap();
//! home.set_property("kitties", "Meow").unwrap(); // unknown fields are ignored
//! assert_eq!(
//!     home.get_data(),
//!     json!({"address_1": "300 Test St.", "address_2": "", "city": ""})
//! );
//!
//! let book = Collection::new(&address);
//! book.add(&home);
//! assert_eq!(book.size(), 1);
//! ```
//!
//! Instances are single-threaded; schemas are `Send + Sync` and can be shared freely.

pub mod collection;
pub mod config;
pub mod declaration;
pub mod error;
pub mod instance;
pub mod kind;
pub mod registry;
pub mod schema;
pub mod tree;

pub use collection::Collection;
pub use config::{OutputFormat, RecordsConfig};
pub use declaration::{Declarations, FieldDecl};
pub use error::{Result, SchemaError};
pub use instance::{ExportOptions, Input, Instance, Property};
pub use kind::Kind;
pub use registry::SchemaRegistry;
pub use schema::{FieldSpec, Schema, SchemaBuilder};
pub use tree::{instantiate, DataTree, Slot};
