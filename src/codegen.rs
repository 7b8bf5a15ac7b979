//! rust emission
//!
//! turns a [`Generation`] into one rust source file: scalar aliases, enums,
//! input objects, optionally the full object model, and for every operation a
//! `Variables` struct, a `Response` struct tree, and an [`Operation`] impl.
//!
//! the inliner keeps repeated fields, so two fragments selecting `id` leave
//! two `id` entries. a struct cannot hold both, so entries sharing a response
//! key are merged here and nowhere else.
//!
//! every item name is claimed once. an operation named like a schema type
//! takes its kind as a suffix (`query Role` becomes `RoleQuery`); any other
//! clash is a validation error rather than code that does not compile.
//!
//! [`Operation`]: crate::Operation

use crate::config::GeneratorConfig;
use crate::document::{Field, Selection, SelectionSet};
use crate::error::{Error, Result};
use crate::generate::{Generation, RenderedOperation};
use crate::schema::{Definition, DefinitionKind, OperationType, Schema, TypeNode, TypeNodeKind};
use std::collections::HashMap;
use tracing::debug;

const HEADER: &str = "//! generated by gqlcodegen, do not edit\n\n\
#![allow(dead_code, unused_imports, non_camel_case_types, non_snake_case, clippy::all)]\n\n\
use serde::{Deserialize, Serialize};\n\n";

/// render the whole bundle as rust source
pub fn emit(generation: &Generation, config: &GeneratorConfig) -> Result<String> {
    let emitter = Emitter {
        schema: &generation.schema,
        config,
    };
    let defs: Vec<&Definition> = generation
        .referenced
        .iter()
        .filter_map(|name| generation.schema.get(name))
        .collect();

    let mut names = ItemNames::default();
    let mut out = String::from(HEADER);
    for def in defs.iter().filter(|def| def.kind == DefinitionKind::Scalar) {
        names.claim_type(def)?;
        emitter.render_scalar(&mut out, def);
    }
    for def in defs.iter().filter(|def| def.kind == DefinitionKind::Enum) {
        names.claim_type(def)?;
        emitter.render_enum(&mut out, def);
    }
    for def in defs.iter().filter(|def| def.kind == DefinitionKind::InputObject) {
        names.claim_type(def)?;
        emitter.render_input(&mut out, def);
    }
    if config.include_full_schema {
        for def in &defs {
            match def.kind {
                DefinitionKind::Object if !emitter.is_root(&def.name) => {
                    names.claim_type(def)?;
                    emitter.render_object(&mut out, def)
                }
                DefinitionKind::Interface | DefinitionKind::Union => {
                    names.claim_type(def)?;
                    render_doc(&mut out, def.description.as_deref(), "");
                    out.push_str("#[derive(Debug, Clone, Serialize, Deserialize)]\n");
                    out.push_str(&format!(
                        "pub struct {}(pub serde_json::Value);\n\n",
                        to_rust_ident(&def.name)
                    ));
                }
                _ => {}
            }
        }
    }
    for rendered in &generation.operations {
        out.push_str(&emitter.render_operation(rendered, &mut names)?);
    }
    Ok(out)
}

/// rust item names handed out so far, with the graphql item behind each
#[derive(Debug, Default)]
struct ItemNames {
    taken: HashMap<String, String>,
}

impl ItemNames {
    fn contains(&self, ident: &str) -> bool {
        self.taken.contains_key(ident)
    }

    fn claim(&mut self, ident: &str, owner: &str) -> Result<()> {
        if let Some(previous) = self.taken.get(ident) {
            return Err(Error::Validation(format!(
                "{owner} and {previous} both generate the rust item {ident}"
            )));
        }
        self.taken.insert(ident.to_string(), owner.to_string());
        Ok(())
    }

    fn claim_type(&mut self, def: &Definition) -> Result<()> {
        self.claim(&to_rust_ident(&def.name), &format!("type {}", def.name))
    }
}

struct Emitter<'a> {
    schema: &'a Schema,
    config: &'a GeneratorConfig,
}

impl<'a> Emitter<'a> {
    fn is_root(&self, name: &str) -> bool {
        [
            OperationType::Query,
            OperationType::Mutation,
            OperationType::Subscription,
        ]
        .into_iter()
        .any(|op| self.schema.root_name(op) == Some(name))
    }

    /// rust spelling of a named graphql type
    fn named_type(&self, name: &str) -> String {
        match self.schema.get(name) {
            Some(def) if def.kind == DefinitionKind::Scalar && def.builtin => {
                self.config.type_map.map(name).to_string()
            }
            Some(def) => to_rust_ident(&def.name),
            None => "serde_json::Value".to_string(),
        }
    }

    fn is_kind(&self, name: &str, kind: DefinitionKind) -> bool {
        self.schema.get(name).is_some_and(|def| def.kind == kind)
    }

    fn render_scalar(&self, out: &mut String, def: &Definition) {
        render_doc(out, def.description.as_deref(), "");
        out.push_str(&format!(
            "pub type {} = {};\n\n",
            to_rust_ident(&def.name),
            self.config.type_map.map(&def.name)
        ));
    }

    fn render_enum(&self, out: &mut String, def: &Definition) {
        render_doc(out, def.description.as_deref(), "");
        out.push_str("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]\n");
        out.push_str(&format!("pub enum {} {{\n", to_rust_ident(&def.name)));
        for value in &def.enum_values {
            render_doc(out, value.description.as_deref(), "    ");
            let variant = to_variant_ident(&value.name);
            if variant != value.name {
                out.push_str(&format!("    #[serde(rename = \"{}\")]\n", value.name));
            }
            out.push_str(&format!("    {},\n", variant));
        }
        out.push_str("}\n\n");
    }

    fn render_input(&self, out: &mut String, def: &Definition) {
        render_doc(out, def.description.as_deref(), "");
        out.push_str("#[derive(Debug, Clone, Serialize, Deserialize)]\n");
        out.push_str(&format!("pub struct {} {{\n", to_rust_ident(&def.name)));
        for field in &def.fields {
            let base = field.field_type.base_name();
            let boxed = self.is_kind(base, DefinitionKind::InputObject);
            let ty = rust_type(&field.field_type, &self.named_type(base), boxed);
            render_doc(out, field.description.as_deref(), "    ");
            push_field(out, &field.name, &ty, !field.field_type.non_null);
        }
        out.push_str("}\n\n");
    }

    fn render_object(&self, out: &mut String, def: &Definition) {
        render_doc(out, def.description.as_deref(), "");
        out.push_str("#[derive(Debug, Clone, Serialize, Deserialize)]\n");
        out.push_str(&format!("pub struct {} {{\n", to_rust_ident(&def.name)));
        for field in def.fields.iter().filter(|field| !field.name.starts_with("__")) {
            let base = field.field_type.base_name();
            let boxed = self.is_kind(base, DefinitionKind::Object);
            let ty = rust_type(&field.field_type, &self.named_type(base), boxed);
            render_doc(out, field.description.as_deref(), "    ");
            push_field(out, &field.name, &ty, false);
        }
        out.push_str("}\n\n");
    }

    fn render_operation(
        &self,
        rendered: &RenderedOperation,
        names: &mut ItemNames,
    ) -> Result<String> {
        let op = &rendered.operation;
        let name = op.name.as_deref().ok_or_else(|| {
            Error::Validation(format!(
                "anonymous {} cannot be emitted, give it a name",
                op.operation
            ))
        })?;
        let root = self.schema.root_name(op.operation).ok_or_else(|| {
            Error::Validation(format!("schema has no {} root type", op.operation))
        })?;
        let owner = format!("{} {name}", op.operation);
        let mut ident = to_rust_ident(name);
        if names.contains(&ident) {
            ident.push_str(&to_rust_ident(op.operation.as_str()));
        }
        names.claim(&ident, &owner)?;
        names.claim(&format!("{ident}Variables"), &owner)?;
        let mut out = String::new();

        out.push_str("#[derive(Debug, Clone, Serialize, Deserialize)]\n");
        out.push_str(&format!("pub struct {ident}Variables {{\n"));
        for variable in &op.variables {
            let ty = rust_type(
                &variable.var_type,
                &self.named_type(variable.var_type.base_name()),
                false,
            );
            push_field(&mut out, &variable.name, &ty, !variable.var_type.non_null);
        }
        out.push_str("}\n\n");

        let response = format!("{ident}Response");
        let mut structs = Vec::new();
        self.render_selection(&response, root, &op.selection_set, &mut structs, names, &owner)?;
        for body in structs {
            out.push_str(&body);
        }

        out.push_str(&format!("pub struct {ident};\n\n"));
        out.push_str(&format!("impl gqlcodegen::Operation for {ident} {{\n"));
        out.push_str(&format!(
            "    const QUERY: &'static str = {};\n",
            raw_string(&rendered.text)
        ));
        out.push_str(&format!("    const NAME: &'static str = \"{name}\";\n"));
        out.push_str(&format!("    type Variables = {ident}Variables;\n"));
        out.push_str(&format!("    type Response = {response};\n"));
        out.push_str("}\n\n");

        debug!(operation = name, structs = %response, "emitted operation");
        Ok(out)
    }

    /// one struct for `set` selected on `parent`, plus one per nested selection
    fn render_selection(
        &self,
        struct_name: &str,
        parent: &str,
        set: &SelectionSet,
        structs: &mut Vec<String>,
        names: &mut ItemNames,
        owner: &str,
    ) -> Result<()> {
        names.claim(struct_name, owner)?;
        let slot = structs.len();
        structs.push(String::new());

        let mut body = String::new();
        body.push_str("#[derive(Debug, Clone, Serialize, Deserialize)]\n");
        body.push_str(&format!("pub struct {struct_name} {{\n"));
        for field in merge_response_keys(set)? {
            let key = field.response_key();
            let ty = if field.name == "__typename" {
                "String".to_string()
            } else {
                let def = self.schema.find_field(parent, &field.name).ok_or_else(|| {
                    Error::Validation(format!("unknown field {} on type {parent}", field.name))
                })?;
                let base = def.field_type.base_name();
                let leaf = if field.selection_set.is_empty() {
                    self.named_type(base)
                } else {
                    let nested = format!("{struct_name}{}", to_rust_ident(key));
                    self.render_selection(
                        &nested,
                        base,
                        &field.selection_set,
                        structs,
                        names,
                        owner,
                    )?;
                    nested
                };
                // a field found only on a possible type is absent for the others
                let mut field_type = def.field_type.clone();
                if self.schema.get(parent).and_then(|ty| ty.field(&field.name)).is_none() {
                    field_type.non_null = false;
                }
                rust_type(&field_type, &leaf, false)
            };
            push_field(&mut body, key, &ty, false);
        }
        body.push_str("}\n\n");

        structs[slot] = body;
        Ok(())
    }
}

/// fields of a flattened set, one per response key
///
/// repeated keys must select the same field with the same arguments; their
/// sub-selections are concatenated.
fn merge_response_keys(set: &SelectionSet) -> Result<Vec<Field>> {
    let mut merged: Vec<Field> = Vec::with_capacity(set.len());
    for item in set.iter() {
        let Selection::Field(field) = item else {
            return Err(Error::Validation(
                "fragments must be inlined before emission".to_string(),
            ));
        };
        let key = field.response_key();
        match merged.iter_mut().find(|existing| existing.response_key() == key) {
            Some(existing) => {
                if existing.name != field.name || existing.arguments != field.arguments {
                    return Err(Error::Validation(format!(
                        "response key {key} selects conflicting fields"
                    )));
                }
                debug!(key, "merged repeated response key");
                existing
                    .selection_set
                    .items
                    .extend(field.selection_set.items.iter().cloned());
            }
            None => merged.push(field.clone()),
        }
    }
    Ok(merged)
}

fn rust_type(ty: &TypeNode, leaf: &str, boxed: bool) -> String {
    let core = match &ty.kind {
        TypeNodeKind::Named(_) if boxed => format!("Box<{leaf}>"),
        TypeNodeKind::Named(_) => leaf.to_string(),
        TypeNodeKind::List(inner) => format!("Vec<{}>", rust_type(inner, leaf, false)),
    };
    if ty.non_null {
        core
    } else {
        format!("Option<{core}>")
    }
}

fn push_field(out: &mut String, graphql_name: &str, ty: &str, skip_none: bool) {
    let rust_name = to_rust_field(graphql_name);
    if rust_name != graphql_name {
        out.push_str(&format!("    #[serde(rename = \"{}\")]\n", graphql_name));
    }
    if skip_none {
        out.push_str("    #[serde(skip_serializing_if = \"Option::is_none\")]\n");
    }
    out.push_str(&format!("    pub {}: {},\n", rust_name, ty));
}

fn render_doc(out: &mut String, description: Option<&str>, indent: &str) {
    let Some(description) = description else {
        return;
    };
    for line in description.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            out.push_str(&format!("{indent}///\n"));
        } else {
            out.push_str(&format!("{indent}/// {line}\n"));
        }
    }
}

/// shortest raw string literal that can hold `text`
fn raw_string(text: &str) -> String {
    let mut hashes = 1;
    while text.contains(&format!("\"{}", "#".repeat(hashes))) {
        hashes += 1;
    }
    let fence = "#".repeat(hashes);
    format!("r{fence}\"{text}\"{fence}")
}

fn to_rust_ident(name: &str) -> String {
    let mut out = String::new();
    let mut upper = true;
    for ch in name.chars() {
        if ch == '_' || ch == '-' {
            upper = true;
            continue;
        }
        if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    match out.as_str() {
        "" => "Unnamed".to_string(),
        "Self" | "Type" | "Box" | "Option" | "Result" | "String" | "Vec" => format!("{}Type", out),
        _ => out,
    }
}

/// `ADMIN_USER` and `adminUser` both become `AdminUser`
fn to_variant_ident(name: &str) -> String {
    if name.chars().any(|ch| ch.is_lowercase()) {
        to_rust_ident(name)
    } else {
        to_rust_ident(&name.to_lowercase())
    }
}

fn to_rust_field(name: &str) -> String {
    let trimmed = name.trim_start_matches('_');
    let mut out = String::new();
    let mut prev_lower = false;
    for ch in trimmed.chars() {
        if ch.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
            prev_lower = false;
        } else {
            out.push(ch);
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }

    if out.is_empty() || out.starts_with(|ch: char| ch.is_ascii_digit()) {
        format!("field_{out}")
    } else if is_rust_keyword(&out) {
        format!("r#{}", out)
    } else {
        out
    }
}

fn is_rust_keyword(name: &str) -> bool {
    matches!(
        name,
        "as" | "break"
            | "const"
            | "continue"
            | "crate"
            | "else"
            | "enum"
            | "extern"
            | "false"
            | "fn"
            | "for"
            | "if"
            | "impl"
            | "in"
            | "let"
            | "loop"
            | "match"
            | "mod"
            | "move"
            | "mut"
            | "pub"
            | "ref"
            | "return"
            | "static"
            | "struct"
            | "super"
            | "trait"
            | "true"
            | "type"
            | "unsafe"
            | "use"
            | "where"
            | "while"
            | "async"
            | "await"
            | "dyn"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::Generator;
    use crate::mapper::TypeNameMapper;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    const SDL: &str = r#"
        scalar DateTime
        type Query { node(id: ID!): Node users(filter: UserFilter, first: Int): [User!]! }
        interface Node { id: ID! }
        "a person"
        type User implements Node { id: ID! userName: String role: Role! joined: DateTime friends: [User!] }
        enum Role { ADMIN SUPER_USER }
        input UserFilter { role: Role, type: String, parent: UserFilter, ids: [UserFilter!] }
    "#;

    fn emit_for(config: GeneratorConfig, sources: &[&str]) -> Result<String> {
        let generator = Generator::new(config.clone());
        let schema = generator.schema_from_sdl(SDL)?;
        let doc = generator.parse_documents(sources)?;
        let generation = generator.generate(schema, &doc)?;
        emit(&generation, &config)
    }

    #[test]
    fn test_naming_helpers() {
        assert_eq!(to_rust_ident("user_filter"), "UserFilter");
        assert_eq!(to_rust_ident("Type"), "TypeType");
        assert_eq!(to_variant_ident("SUPER_USER"), "SuperUser");
        assert_eq!(to_variant_ident("inProgress"), "InProgress");
        assert_eq!(to_rust_field("userName"), "user_name");
        assert_eq!(to_rust_field("userID"), "user_id");
        assert_eq!(to_rust_field("__typename"), "typename");
        assert_eq!(to_rust_field("type"), "r#type");
        assert_eq!(to_rust_field("3d"), "field_3d");
    }

    #[test]
    fn test_raw_string_fence() {
        assert_eq!(raw_string("a"), "r#\"a\"#");
        assert_eq!(raw_string("say \"#hi\""), "r##\"say \"#hi\"\"##");
    }

    #[test]
    fn test_emit_operation() {
        let out = emit_for(
            GeneratorConfig::default(),
            &["query Get($id: ID!) { node(id: $id) { __typename ...bits } }
               fragment bits on User { id userName }"],
        )
        .unwrap();

        let expected = indoc! {r##"
            #[derive(Debug, Clone, Serialize, Deserialize)]
            pub struct GetVariables {
                pub id: String,
            }

            #[derive(Debug, Clone, Serialize, Deserialize)]
            pub struct GetResponse {
                pub node: Option<GetResponseNode>,
            }

            #[derive(Debug, Clone, Serialize, Deserialize)]
            pub struct GetResponseNode {
                #[serde(rename = "__typename")]
                pub typename: String,
                pub id: String,
                #[serde(rename = "userName")]
                pub user_name: Option<String>,
            }

            pub struct Get;

            impl gqlcodegen::Operation for Get {
                const QUERY: &'static str = r#"query Get($id: ID!) {
              node(id: $id) {
                __typename
                ...bits
              }
            }

            fragment bits on User {
              id
              userName
            }
            "#;
                const NAME: &'static str = "Get";
                type Variables = GetVariables;
                type Response = GetResponse;
            }
        "##};
        assert!(out.starts_with(HEADER));
        assert_eq!(&out[HEADER.len()..], format!("{expected}\n"));
    }

    #[test]
    fn test_emit_referenced_types() {
        let out = emit_for(
            GeneratorConfig::default()
                .with_type_map(TypeNameMapper::default().with_mapping("DateTime", "chrono::DateTime<chrono::Utc>")),
            &["query Users($filter: UserFilter) { users(filter: $filter) { role joined friends { id } } }"],
        )
        .unwrap();

        assert!(out.contains("pub type DateTime = chrono::DateTime<chrono::Utc>;\n"));
        assert!(out.contains(indoc! {r#"
            pub enum Role {
                #[serde(rename = "ADMIN")]
                Admin,
                #[serde(rename = "SUPER_USER")]
                SuperUser,
            }
        "#}));
        assert!(out.contains("    pub parent: Option<Box<UserFilter>>,\n"));
        assert!(out.contains("    pub ids: Option<Vec<UserFilter>>,\n"));
        assert!(out.contains("    #[serde(rename = \"type\")]\n    #[serde(skip_serializing_if = \"Option::is_none\")]\n    pub r#type: Option<String>,\n"));
        assert!(out.contains("    pub users: Vec<UsersResponseUsers>,\n"));
        assert!(out.contains("    pub role: Role,\n"));
        assert!(out.contains("    pub joined: Option<DateTime>,\n"));
        assert!(out.contains("    pub friends: Option<Vec<UsersResponseUsersFriends>>,\n"));
        assert!(!out.contains("pub struct User {"));
    }

    #[test]
    fn test_repeated_keys_merge_at_emission() {
        let out = emit_for(
            GeneratorConfig::default(),
            &["query Q { users { ...a ...b } }
               fragment a on User { id friends { id } }
               fragment b on User { id friends { userName } }"],
        )
        .unwrap();
        let friends = indoc! {r#"
            pub struct QResponseUsersFriends {
                pub id: String,
                #[serde(rename = "userName")]
                pub user_name: Option<String>,
            }
        "#};
        assert!(out.contains(friends));
        assert_eq!(out.matches("    pub id: String,\n").count(), 2);
    }

    #[test]
    fn test_conflicting_keys_are_rejected() {
        let err = emit_for(
            GeneratorConfig::default(),
            &["query Q { users { x: id x: userName } }"],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_anonymous_operation_cannot_be_emitted() {
        let err = emit_for(GeneratorConfig::default(), &["{ users { id } }"]).unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg.contains("anonymous")));
    }

    #[test]
    fn test_operation_named_like_a_type_gets_a_suffix() {
        let out = emit_for(GeneratorConfig::default(), &["query Role { users { role } }"]).unwrap();
        assert_eq!(out.matches("pub enum Role {").count(), 1);
        assert!(!out.contains("pub struct Role;"));
        assert!(out.contains("pub struct RoleQueryVariables {\n}\n"));
        assert!(out.contains("    pub users: Vec<RoleQueryResponseUsers>,\n"));
        assert!(out.contains("pub struct RoleQuery;\n\nimpl gqlcodegen::Operation for RoleQuery {\n"));
        assert!(out.contains("    const NAME: &'static str = \"Role\";\n"));
    }

    #[test]
    fn test_colliding_item_names_are_rejected() {
        let err = emit_for(
            GeneratorConfig::default(),
            &["query Q { users { a_b: friends { id } aB: friends { id } } }"],
        )
        .unwrap_err();
        assert!(
            matches!(err, Error::Validation(ref msg) if msg.contains("QResponseUsersAB")),
            "{err}"
        );

        let err = emit_for(
            GeneratorConfig::default(),
            &["query AQuery { users { id } } query A { users { id } } query a { users { id } }"],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg.ends_with("rust item AQuery")), "{err}");
    }

    #[test]
    fn test_full_schema_objects() {
        let out = emit_for(
            GeneratorConfig::default().with_full_schema(true),
            &["query Q { users { id } }"],
        )
        .unwrap();
        assert!(out.contains("/// a person\n#[derive(Debug, Clone, Serialize, Deserialize)]\npub struct User {\n"));
        assert!(out.contains("    pub friends: Option<Vec<User>>,\n"));
        assert!(out.contains("pub struct Node(pub serde_json::Value);\n"));
        assert!(!out.contains("pub struct Query {"));
    }
}
