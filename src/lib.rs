//! graphql code generation core
//!
//! this crate turns a graphql schema (pulled from a live endpoint through
//! introspection, or read from sdl) and a set of operation documents into
//! canonical graphql text and typed rust declarations.
//!
//! the pipeline is:
//! [`SchemaBuilder`] builds a [`Schema`], [`ExecutableDocument`]s are parsed,
//! merged, and validated against it, [`SelectionInliner`] flattens fragments
//! away, [`Printer`] renders schema and operations, and [`codegen::emit`]
//! writes the rust side. [`Generator`] runs all of it with one
//! [`GeneratorConfig`].
//!
//! ## quick start
//!
//! ```no_run
//! use gqlcodegen::{codegen, Generator, GeneratorConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GeneratorConfig::default();
//! let generator = Generator::new(config.clone());
//! let schema = generator.schema_from_sdl("type Query { hello(name: String): String }")?;
//! let document = generator.parse_documents(["query Hello { hello(name: \"you\") }"])?;
//! let generation = generator.generate(schema, &document)?;
//! println!("{}", codegen::emit(&generation, &config)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## remote schemas
//!
//! [`Client::introspect`] posts the standard introspection query and returns
//! the `__schema` payload for [`Generator::schema_from_introspection`].

mod builder;
mod client;
pub mod codegen;
mod config;
mod document;
mod error;
mod generate;
mod graphql;
mod inline;
pub mod introspection;
mod mapper;
mod operation;
mod printer;
pub mod schema;

pub use builder::SchemaBuilder;
pub use client::Client;
pub use config::{ClientConfig, GeneratorConfig};
pub use document::{
    ExecutableDocument, Field, FragmentDefinition, FragmentSpread, FragmentTable, InlineFragment,
    OperationDefinition, Selection, SelectionSet, VariableDefinition,
};
pub use error::{Error, Result};
pub use generate::{referenced_types, Generation, Generator, RenderedOperation};
pub use graphql::{GraphQlError, GraphQlLocation, GraphQlResponse};
pub use inline::{inline_document, inline_selection_set, SelectionInliner};
pub use introspection::{decode, ScalarNullability, TypeRef};
pub use mapper::TypeNameMapper;
pub use operation::Operation;
pub use printer::{print_operation, print_schema, Printer};
pub use schema::{Definition, DefinitionKind, OperationType, Schema, TypeNode};
