//! scalar name mapping
//!
//! maps graphql named types to target-language type names through an explicit
//! lookup table. unmapped names resolve to a configurable fallback.

use std::collections::HashMap;

/// lookup table from graphql type names to target type names
#[derive(Debug, Clone)]
pub struct TypeNameMapper {
    table: HashMap<String, String>,
    fallback: String,
}

impl TypeNameMapper {
    /// create an empty mapper with the given fallback
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            table: HashMap::new(),
            fallback: fallback.into(),
        }
    }

    /// add or replace a mapping
    pub fn with_mapping(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.table.insert(name.into(), target.into());
        self
    }

    /// replace the fallback used for unmapped names
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// the explicit mapping for `name`, if any
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.table.get(name).map(String::as_str)
    }

    /// the mapping for `name`, or the fallback
    pub fn map(&self, name: &str) -> &str {
        self.lookup(name).unwrap_or(&self.fallback)
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }
}

impl Default for TypeNameMapper {
    /// builtin graphql scalars mapped to rust primitives
    fn default() -> Self {
        Self::new("String")
            .with_mapping("ID", "String")
            .with_mapping("String", "String")
            .with_mapping("Int", "i64")
            .with_mapping("Float", "f64")
            .with_mapping("Boolean", "bool")
    }
}
