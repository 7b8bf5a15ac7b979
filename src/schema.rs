//! schema model
//!
//! the in-memory schema shared by the builder, printer, and emitter. the
//! schema owns every [`Definition`]; definitions refer to each other only by
//! name and are resolved through [`Schema`] lookups at use time.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// names of the scalars every schema provides
pub const BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

/// names of the directives every schema provides
pub const BUILTIN_DIRECTIVES: [&str; 5] = ["skip", "include", "deprecated", "specifiedBy", "oneOf"];

/// a type expression: a named type or a list, each optionally non-null
///
/// `non_null` applies only to this level, so `[String!]` and `[String]!` are
/// distinct values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeNode {
    pub kind: TypeNodeKind,
    pub non_null: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeNodeKind {
    Named(String),
    List(Box<TypeNode>),
}

impl TypeNode {
    /// a nullable named type
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            kind: TypeNodeKind::Named(name.into()),
            non_null: false,
        }
    }

    /// a nullable list of `element`
    pub fn list(element: TypeNode) -> Self {
        Self {
            kind: TypeNodeKind::List(Box::new(element)),
            non_null: false,
        }
    }

    /// the same node marked non-null
    pub fn non_null(mut self) -> Self {
        self.non_null = true;
        self
    }

    /// the innermost named type
    pub fn base_name(&self) -> &str {
        match &self.kind {
            TypeNodeKind::Named(name) => name,
            TypeNodeKind::List(element) => element.base_name(),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.kind, TypeNodeKind::List(_))
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeNodeKind::Named(name) => write!(f, "{name}")?,
            TypeNodeKind::List(element) => write!(f, "[{element}]")?,
        }
        if self.non_null {
            write!(f, "!")?;
        }
        Ok(())
    }
}

/// kind of a named type definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefinitionKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
}

impl DefinitionKind {
    /// sdl keyword introducing a definition of this kind
    pub fn keyword(self) -> &'static str {
        match self {
            DefinitionKind::Scalar => "scalar",
            DefinitionKind::Object => "type",
            DefinitionKind::Interface => "interface",
            DefinitionKind::Union => "union",
            DefinitionKind::Enum => "enum",
            DefinitionKind::InputObject => "input",
        }
    }

    /// true for kinds whose values carry a selection set
    pub fn is_composite(self) -> bool {
        matches!(
            self,
            DefinitionKind::Object | DefinitionKind::Interface | DefinitionKind::Union
        )
    }
}

/// an argument passed to an applied directive or a field, as literal text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    pub value: String,
}

/// an applied directive, e.g. `@deprecated(reason: "gone")`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub name: String,
    pub arguments: Vec<Argument>,
}

impl Directive {
    /// `@deprecated`, with a reason argument when one is given
    pub fn deprecated(reason: Option<&str>) -> Self {
        let arguments = reason
            .map(|reason| {
                vec![Argument {
                    name: "reason".to_string(),
                    value: quote_string(reason),
                }]
            })
            .unwrap_or_default();
        Self {
            name: "deprecated".to_string(),
            arguments,
        }
    }
}

/// argument or input field declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentDefinition {
    pub name: String,
    pub description: Option<String>,
    /// raw literal text, untyped
    pub default_value: Option<String>,
    pub value_type: TypeNode,
    pub directives: Vec<Directive>,
}

/// field of an object, interface, or input object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub name: String,
    pub description: Option<String>,
    pub arguments: Vec<ArgumentDefinition>,
    /// raw literal text, only set for input object fields
    pub default_value: Option<String>,
    pub field_type: TypeNode,
    pub directives: Vec<Directive>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValueDefinition {
    pub name: String,
    pub description: Option<String>,
    pub directives: Vec<Directive>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveDefinition {
    pub name: String,
    pub description: Option<String>,
    pub arguments: Vec<ArgumentDefinition>,
    pub repeatable: bool,
    pub locations: Vec<String>,
    pub builtin: bool,
}

/// a named type definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub kind: DefinitionKind,
    pub name: String,
    pub description: Option<String>,
    /// implemented interfaces, by name
    pub interfaces: Vec<String>,
    /// union members, by name
    pub types: Vec<String>,
    pub fields: Vec<FieldDefinition>,
    pub enum_values: Vec<EnumValueDefinition>,
    pub directives: Vec<Directive>,
    pub builtin: bool,
}

impl Definition {
    /// an empty definition of the given kind
    pub fn new(kind: DefinitionKind, name: impl Into<String>) -> Self {
        let name = name.into();
        let builtin = is_builtin_type_name(&name);
        Self {
            kind,
            name,
            description: None,
            interfaces: Vec::new(),
            types: Vec::new(),
            fields: Vec::new(),
            enum_values: Vec::new(),
            directives: Vec::new(),
            builtin,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// operation kind, used to pick a root type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl OperationType {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationType::Query => "query",
            OperationType::Mutation => "mutation",
            OperationType::Subscription => "subscription",
        }
    }

    /// the root type name used when the schema does not name one
    pub fn default_root(self) -> &'static str {
        match self {
            OperationType::Query => "Query",
            OperationType::Mutation => "Mutation",
            OperationType::Subscription => "Subscription",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// a built schema
///
/// `types` and `directives` have no meaningful iteration order; anything that
/// renders them sorts by name first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub types: HashMap<String, Definition>,
    pub directives: HashMap<String, DirectiveDefinition>,
    pub query_type: Option<String>,
    pub mutation_type: Option<String>,
    pub subscription_type: Option<String>,
    /// interface/union name (or object name) to the names of its possible types
    pub possible_types: HashMap<String, Vec<String>>,
}

impl Schema {
    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.types.get(name)
    }

    pub fn query(&self) -> Option<&Definition> {
        self.root(OperationType::Query)
    }

    pub fn mutation(&self) -> Option<&Definition> {
        self.root(OperationType::Mutation)
    }

    pub fn subscription(&self) -> Option<&Definition> {
        self.root(OperationType::Subscription)
    }

    /// the root definition for an operation type
    pub fn root(&self, operation: OperationType) -> Option<&Definition> {
        self.root_name(operation).and_then(|name| self.get(name))
    }

    pub fn root_name(&self, operation: OperationType) -> Option<&str> {
        match operation {
            OperationType::Query => self.query_type.as_deref(),
            OperationType::Mutation => self.mutation_type.as_deref(),
            OperationType::Subscription => self.subscription_type.as_deref(),
        }
    }

    /// definitions that can stand in for `name` at runtime
    pub fn possible_types(&self, name: &str) -> Vec<&Definition> {
        self.possible_types
            .get(name)
            .map(|names| names.iter().filter_map(|n| self.get(n)).collect())
            .unwrap_or_default()
    }

    /// record `possible` as a possible type of `name`
    pub fn add_possible_type(&mut self, name: &str, possible: &str) {
        let entry = self.possible_types.entry(name.to_string()).or_default();
        if !entry.iter().any(|existing| existing == possible) {
            entry.push(possible.to_string());
        }
    }

    /// find a field on `type_name`, falling back to its possible types
    ///
    /// flattened selections lose their inline-fragment type conditions, so a
    /// field selected on a union or interface may live on a member type.
    pub fn find_field(&self, type_name: &str, field_name: &str) -> Option<&FieldDefinition> {
        if let Some(field) = self.get(type_name).and_then(|def| def.field(field_name)) {
            return Some(field);
        }
        self.possible_types(type_name)
            .into_iter()
            .find_map(|def| def.field(field_name))
    }

    /// definitions sorted by name
    pub fn sorted_types(&self) -> Vec<&Definition> {
        let mut defs: Vec<&Definition> = self.types.values().collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// directive definitions sorted by name
    pub fn sorted_directives(&self) -> Vec<&DirectiveDefinition> {
        let mut defs: Vec<&DirectiveDefinition> = self.directives.values().collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }
}

/// true for introspection meta types and the builtin scalars
pub fn is_builtin_type_name(name: &str) -> bool {
    name.starts_with("__") || BUILTIN_SCALARS.contains(&name)
}

pub fn is_builtin_directive_name(name: &str) -> bool {
    BUILTIN_DIRECTIVES.contains(&name)
}

/// graphql string literal for `value`
pub(crate) fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
