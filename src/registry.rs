//! Schema Registry
//!
//! An explicitly constructed, append-only set of named schemas. Registries are
//! plain values, so several can coexist (one per domain, one per test).

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use indexmap::IndexMap;
use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::instance::Instance;
use crate::schema::{Schema, SchemaBuilder};

/// Named schemas, in registration order
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: IndexMap<String, Schema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare and register a schema under `name`
    ///
    /// Registered schemas are immutable; redefining a name fails with `AlreadyExists`.
    pub fn define(
        &mut self,
        name: &str,
        declare: impl FnOnce(SchemaBuilder) -> SchemaBuilder,
    ) -> Result<Schema> {
        if self.schemas.contains_key(name) {
            return Err(SchemaError::AlreadyExists {
                name: name.to_string(),
            });
        }
        self.register(Schema::build(name, declare))
    }

    /// Register an already built schema under its own name
    pub fn register(&mut self, schema: Schema) -> Result<Schema> {
        if self.schemas.contains_key(schema.name()) {
            return Err(SchemaError::AlreadyExists {
                name: schema.name().to_string(),
            });
        }

        debug!(schema = schema.name(), fields = schema.len(), "registered schema");
        self.schemas.insert(schema.name().to_string(), schema.clone());
        Ok(schema)
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Like [`get`](Self::get), but a missing name is a `NotFound` with a suggestion
    pub fn require(&self, name: &str) -> Result<&Schema> {
        self.schemas
            .get(name)
            .ok_or_else(|| SchemaError::not_found(name, self.suggest(name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }

    pub fn schemas(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.values()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// New default instance of the named schema
    pub fn create(&self, name: &str) -> Result<Instance> {
        self.require(name).map(Instance::create)
    }

    /// Search schema names (fuzzy), best match first
    pub fn search(&self, query: &str, limit: usize) -> Vec<&Schema> {
        let matcher = SkimMatcherV2::default();
        let mut results: Vec<(i64, &Schema)> = self
            .schemas
            .values()
            .filter_map(|schema| {
                matcher
                    .fuzzy_match(schema.name(), query)
                    .map(|score| (score, schema))
            })
            .collect();

        // Sort by score descending
        results.sort_by(|a, b| b.0.cmp(&a.0));

        results.into_iter().take(limit).map(|(_, schema)| schema).collect()
    }

    /// Closest registered name to `name`, if any is close
    pub fn suggest(&self, name: &str) -> Option<String> {
        closest_match(name, self.schemas.keys().map(String::as_str)).map(String::from)
    }
}

/// Best fuzzy match for `query` among `candidates`, in either direction
pub(crate) fn closest_match<'a>(
    query: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Option<&'a str> {
    let matcher = SkimMatcherV2::default();
    candidates
        .into_iter()
        .filter_map(|candidate| {
            let forward = matcher.fuzzy_match(candidate, query);
            let backward = matcher.fuzzy_match(query, candidate);
            forward.max(backward).map(|score| (score, candidate))
        })
        .max_by_key(|(score, _)| *score)
        .map(|(_, candidate)| candidate)
}
