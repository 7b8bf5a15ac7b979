//! generation pipeline
//!
//! ties the pieces together: a [`Schema`] and the merged operation documents
//! go in, a [`Generation`] comes out. the bundle is self-contained: the
//! schema, every flattened operation with its canonical request text, and the
//! set of named types the emitted code needs.
//!
//! flattening drops `... on T` conditions, so the flattened tree only drives
//! struct shape. the request text is the operation as written plus the
//! fragments it spreads, which a server can still validate.

use crate::builder::SchemaBuilder;
use crate::config::GeneratorConfig;
use crate::document::{ExecutableDocument, OperationDefinition, Selection, SelectionSet};
use crate::error::Result;
use crate::inline::SelectionInliner;
use crate::introspection::IntrospectionSchema;
use crate::printer::Printer;
use crate::schema::{DefinitionKind, Schema};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// a flattened operation and its request text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOperation {
    /// fragment-free tree, used for response shapes
    pub operation: OperationDefinition,
    /// the operation as written, followed by every fragment it uses
    pub text: String,
}

/// everything the code emitter needs, in one place
#[derive(Debug, Clone)]
pub struct Generation {
    pub schema: Schema,
    /// canonical sdl of the whole schema
    pub schema_text: String,
    pub operations: Vec<RenderedOperation>,
    /// non-builtin type names to emit, sorted
    pub referenced: BTreeSet<String>,
}

/// runs the pipeline with one [`GeneratorConfig`]
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// schema builder configured like this generator
    pub fn schema_builder(&self) -> SchemaBuilder {
        SchemaBuilder::from_config(&self.config)
    }

    pub fn schema_from_sdl(&self, source: &str) -> Result<Schema> {
        self.schema_builder().build_from_sdl(source)
    }

    pub fn schema_from_introspection(&self, payload: IntrospectionSchema) -> Result<Schema> {
        self.schema_builder().build(payload)
    }

    /// parse each source on its own and merge them, in order
    pub fn parse_documents<I, S>(&self, sources: I) -> Result<ExecutableDocument>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let documents = sources
            .into_iter()
            .map(|source| ExecutableDocument::parse(source.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(ExecutableDocument::merge(documents))
    }

    /// validate, flatten, and print every operation of `document`
    pub fn generate(&self, schema: Schema, document: &ExecutableDocument) -> Result<Generation> {
        document.validate(&schema)?;

        let table = document.fragment_table()?;
        let mut inliner = SelectionInliner::new(&table);
        let mut operations = Vec::with_capacity(document.operations.len());
        for op in &document.operations {
            let operation = inliner.inline_operation(op)?;
            let mut printer = Printer::from_config(&self.config);
            printer.print_operation(op);
            for fragment in table.used_by(op)? {
                printer.print_fragment(fragment);
            }
            let text = printer.finish();
            debug!(
                operation = operation.name.as_deref().unwrap_or("<anonymous>"),
                bytes = text.len(),
                "rendered operation"
            );
            operations.push(RenderedOperation { operation, text });
        }

        let referenced = if self.config.include_full_schema {
            schema
                .types
                .values()
                .filter(|def| !def.builtin)
                .map(|def| def.name.clone())
                .collect()
        } else {
            let ops: Vec<&OperationDefinition> =
                operations.iter().map(|rendered| &rendered.operation).collect();
            referenced_types(&schema, &ops)
        };

        let mut printer = Printer::from_config(&self.config);
        printer.print_schema(&schema);
        let schema_text = printer.finish();

        info!(
            operations = operations.len(),
            types = referenced.len(),
            "generation ready"
        );
        Ok(Generation {
            schema,
            schema_text,
            operations,
            referenced,
        })
    }
}

/// named types reachable from flattened operations
///
/// selected field types and variable types are collected; input objects pull
/// in their field types transitively. builtin scalars are left out.
pub fn referenced_types(schema: &Schema, operations: &[&OperationDefinition]) -> BTreeSet<String> {
    let mut seen = BTreeSet::new();
    for op in operations {
        for variable in &op.variables {
            add_type(schema, variable.var_type.base_name(), &mut seen);
        }
        if let Some(root) = schema.root_name(op.operation) {
            collect_selection(schema, root, &op.selection_set, &mut seen);
        }
    }
    seen.retain(|name| schema.get(name).is_some_and(|def| !def.builtin));
    seen
}

fn collect_selection(schema: &Schema, parent: &str, set: &SelectionSet, seen: &mut BTreeSet<String>) {
    for item in set.iter() {
        match item {
            Selection::Field(field) => {
                let Some(def) = schema.find_field(parent, &field.name) else {
                    continue;
                };
                let base = def.field_type.base_name();
                add_type(schema, base, seen);
                collect_selection(schema, base, &field.selection_set, seen);
            }
            Selection::FragmentSpread(_) => {}
            Selection::InlineFragment(inline) => {
                let scope = inline.type_condition.as_deref().unwrap_or(parent);
                collect_selection(schema, scope, &inline.selection_set, seen);
            }
        }
    }
}

fn add_type(schema: &Schema, name: &str, seen: &mut BTreeSet<String>) {
    if !seen.insert(name.to_string()) {
        return;
    }
    let Some(def) = schema.get(name) else {
        return;
    };
    if def.kind == DefinitionKind::InputObject {
        for field in &def.fields {
            add_type(schema, field.field_type.base_name(), seen);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    const SDL: &str = r#"
        scalar DateTime
        type Query { users(filter: UserFilter): [User!]! node(id: ID!): Node }
        interface Node { id: ID! }
        type User implements Node { id: ID! role: Role joined: DateTime manager: User }
        type Unused { x: Int }
        enum Role { ADMIN USER }
        enum Unrelated { A }
        input UserFilter { role: Role nested: RangeFilter }
        input RangeFilter { from: DateTime }
    "#;

    fn generator(full: bool) -> Generator {
        Generator::new(GeneratorConfig::default().with_full_schema(full))
    }

    #[test]
    fn test_generate_collects_referenced_types() {
        let generator = generator(false);
        let schema = generator.schema_from_sdl(SDL).unwrap();
        let doc = generator
            .parse_documents([
                "query Users($f: UserFilter) { users(filter: $f) { ...bits } }",
                "fragment bits on User { id role manager { id } }",
            ])
            .unwrap();
        let generation = generator.generate(schema, &doc).unwrap();

        let referenced: Vec<&str> = generation.referenced.iter().map(String::as_str).collect();
        assert_eq!(
            referenced,
            vec!["DateTime", "RangeFilter", "Role", "User", "UserFilter"]
        );

        let op = &generation.operations[0];
        assert!(op.operation.selection_set.is_flat());
        assert!(op.text.starts_with("query Users($f: UserFilter) {"));
        assert!(generation.schema_text.contains("type Unused {"));
    }

    #[test]
    fn test_full_schema_references_everything() {
        let generator = generator(true);
        let schema = generator.schema_from_sdl(SDL).unwrap();
        let doc = generator.parse_documents(["query Q { node(id: 1) { id } }"]).unwrap();
        let generation = generator.generate(schema, &doc).unwrap();
        assert!(generation.referenced.contains("Unused"));
        assert!(generation.referenced.contains("Unrelated"));
        assert!(!generation.referenced.contains("String"));
    }

    #[test]
    fn test_cross_document_fragments_resolve() {
        let generator = generator(false);
        let schema = generator.schema_from_sdl(SDL).unwrap();
        let doc = generator
            .parse_documents(["query A { node(id: 1) { ...f } }", "fragment f on Node { id }"])
            .unwrap();
        assert_eq!(generator.generate(schema, &doc).unwrap().operations.len(), 1);
    }

    #[test]
    fn test_request_text_keeps_type_conditions() {
        let generator = generator(false);
        let schema = generator
            .schema_from_sdl(
                "type Query { search(term: String!): [Hit!]! } union Hit = User | Bot
                 type User { id: ID! login: String! } type Bot { id: ID! model: String }",
            )
            .unwrap();
        let doc = generator
            .parse_documents([
                "query Search($term: String!) {
                   search(term: $term) { __typename ... on User { ...login } ... on Bot { model } }
                 }",
                "fragment login on User { id login }",
            ])
            .unwrap();
        let generation = generator.generate(schema.clone(), &doc).unwrap();
        let rendered = &generation.operations[0];

        assert!(rendered.operation.selection_set.is_flat());
        assert_eq!(
            rendered.text,
            indoc! {"
                query Search($term: String!) {
                  search(term: $term) {
                    __typename
                    ... on User {
                      ...login
                    }
                    ... on Bot {
                      model
                    }
                  }
                }

                fragment login on User {
                  id
                  login
                }
            "}
        );

        // the request must stand on its own against strict field lookup
        let request = ExecutableDocument::parse(&rendered.text).unwrap();
        request.validate(&schema).unwrap();
    }

    #[test]
    fn test_invalid_document_stops_the_run() {
        let generator = generator(false);
        let schema = generator.schema_from_sdl(SDL).unwrap();
        let doc = generator.parse_documents(["query { users { nope } }"]).unwrap();
        let err = generator.generate(schema, &doc).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = generator.parse_documents(["query {"]).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
