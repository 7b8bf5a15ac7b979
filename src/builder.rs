//! schema building
//!
//! [`SchemaBuilder`] assembles a [`Schema`] either from an introspection
//! payload or from a schema document parsed by `graphql-parser`. both paths
//! index possible types and check every type reference before returning.

use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use crate::graphql::GraphQlResponse;
use crate::introspection::{
    decode, FieldRecord, FullType, InputValueRecord, IntrospectionData, IntrospectionDirective,
    IntrospectionSchema, ScalarNullability, TypeKind,
};
use crate::schema::{
    is_builtin_directive_name, Argument, ArgumentDefinition, Definition, DefinitionKind,
    Directive, DirectiveDefinition, EnumValueDefinition, FieldDefinition, OperationType, Schema,
    TypeNode, BUILTIN_SCALARS,
};
use graphql_parser::schema as sdl;
use tracing::{debug, warn};

/// builds a [`Schema`] from introspection or sdl input
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    include_builtins: bool,
    scalar_nullability: ScalarNullability,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// builder configured from generator options
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            include_builtins: config.include_builtins,
            scalar_nullability: config.scalar_nullability,
        }
    }

    /// keep `__`-prefixed introspection types
    pub fn with_builtins(mut self, include: bool) -> Self {
        self.include_builtins = include;
        self
    }

    pub fn with_scalar_nullability(mut self, policy: ScalarNullability) -> Self {
        self.scalar_nullability = policy;
        self
    }

    /// build from a full introspection response body (`{data, errors}`)
    pub fn build_from_json(&self, json: &str) -> Result<Schema> {
        let response: GraphQlResponse<IntrospectionData> = serde_json::from_str(json)?;
        if response.has_errors() {
            return Err(Error::GraphQl {
                status: None,
                message: response.error_summary(),
                errors: response.errors,
                body: json.to_string(),
            });
        }
        let payload = response
            .data
            .and_then(|data| data.schema)
            .ok_or(Error::IncompleteIntrospection)?;
        self.build(payload)
    }

    /// build from a decoded `__schema` node
    pub fn build(&self, payload: IntrospectionSchema) -> Result<Schema> {
        let mut schema = Schema {
            query_type: payload.query_type.map(|root| root.name),
            mutation_type: payload.mutation_type.map(|root| root.name),
            subscription_type: payload.subscription_type.map(|root| root.name),
            ..Schema::default()
        };

        for full_type in payload.types.into_iter().flatten() {
            if !self.include_builtins && full_type.name.starts_with("__") {
                continue;
            }
            let Some(def) = self.definition_from_introspection(full_type) else {
                continue;
            };
            if schema.types.contains_key(&def.name) {
                warn!(name = %def.name, "duplicate type in introspection payload, keeping last");
            }
            schema.types.insert(def.name.clone(), def);
        }

        for directive in payload.directives {
            let def = self.directive_from_introspection(directive);
            schema.directives.insert(def.name.clone(), def);
        }

        debug!(
            types = schema.types.len(),
            directives = schema.directives.len(),
            "decoded introspection payload"
        );
        finish(schema)
    }

    /// build from schema definition language text
    pub fn build_from_sdl(&self, source: &str) -> Result<Schema> {
        let document =
            sdl::parse_schema::<String>(source).map_err(|err| Error::Parse(err.to_string()))?;

        let mut schema = Schema::default();
        for name in BUILTIN_SCALARS {
            schema
                .types
                .insert(name.to_string(), Definition::new(DefinitionKind::Scalar, name));
        }

        let mut explicit_roots = false;
        let mut extensions = Vec::new();
        for definition in &document.definitions {
            match definition {
                sdl::Definition::SchemaDefinition(def) => {
                    explicit_roots = true;
                    schema.query_type = def.query.clone();
                    schema.mutation_type = def.mutation.clone();
                    schema.subscription_type = def.subscription.clone();
                }
                sdl::Definition::TypeDefinition(ty) => {
                    let def = definition_from_sdl(ty);
                    schema.types.insert(def.name.clone(), def);
                }
                sdl::Definition::TypeExtension(ext) => extensions.push(ext),
                sdl::Definition::DirectiveDefinition(def) => {
                    let def = directive_from_sdl(def);
                    schema.directives.insert(def.name.clone(), def);
                }
            }
        }

        for ext in extensions {
            apply_extension(&mut schema, ext)?;
        }

        if !explicit_roots {
            for operation in [
                OperationType::Query,
                OperationType::Mutation,
                OperationType::Subscription,
            ] {
                let name = operation.default_root();
                if schema.types.contains_key(name) {
                    let slot = match operation {
                        OperationType::Query => &mut schema.query_type,
                        OperationType::Mutation => &mut schema.mutation_type,
                        OperationType::Subscription => &mut schema.subscription_type,
                    };
                    *slot = Some(name.to_string());
                }
            }
        }

        debug!(
            types = schema.types.len(),
            directives = schema.directives.len(),
            "parsed schema document"
        );
        finish(schema)
    }

    fn definition_from_introspection(&self, full_type: FullType) -> Option<Definition> {
        let kind = match full_type.kind {
            TypeKind::Scalar => DefinitionKind::Scalar,
            TypeKind::Object => DefinitionKind::Object,
            TypeKind::Interface => DefinitionKind::Interface,
            TypeKind::Union => DefinitionKind::Union,
            TypeKind::Enum => DefinitionKind::Enum,
            TypeKind::InputObject => DefinitionKind::InputObject,
            TypeKind::List | TypeKind::NonNull | TypeKind::Unknown => {
                warn!(name = %full_type.name, kind = ?full_type.kind, "skipping type with non-definition kind");
                return None;
            }
        };

        let mut def = Definition::new(kind, full_type.name);
        def.description = non_empty(full_type.description);
        def.interfaces = full_type
            .interfaces
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .filter_map(|iface| iface.name)
            .collect();

        match kind {
            DefinitionKind::Object | DefinitionKind::Interface => {
                for field in full_type.fields.unwrap_or_default() {
                    if let Some(field) = self.field_from_introspection(&def.name, field) {
                        def.fields.push(field);
                    }
                }
            }
            DefinitionKind::InputObject => {
                for input in full_type.input_fields.unwrap_or_default() {
                    if let Some(arg) = self.argument_from_introspection(&def.name, input) {
                        def.fields.push(FieldDefinition {
                            name: arg.name,
                            description: arg.description,
                            arguments: Vec::new(),
                            default_value: arg.default_value,
                            field_type: arg.value_type,
                            directives: Vec::new(),
                        });
                    }
                }
            }
            DefinitionKind::Enum => {
                for value in full_type.enum_values.unwrap_or_default() {
                    let mut directives = Vec::new();
                    if value.is_deprecated {
                        directives.push(Directive::deprecated(value.deprecation_reason.as_deref()));
                    }
                    def.enum_values.push(EnumValueDefinition {
                        name: value.name,
                        description: non_empty(value.description),
                        directives,
                    });
                }
            }
            DefinitionKind::Union => {
                def.types = full_type
                    .possible_types
                    .unwrap_or_default()
                    .into_iter()
                    .flatten()
                    .filter_map(|member| member.name)
                    .collect();
            }
            DefinitionKind::Scalar => {}
        }

        Some(def)
    }

    fn field_from_introspection(&self, owner: &str, field: FieldRecord) -> Option<FieldDefinition> {
        let Some(field_type) = decode(field.field_type.as_ref(), self.scalar_nullability) else {
            warn!(owner, field = %field.name, "dropping field with undecodable type");
            return None;
        };
        let arguments = field
            .args
            .into_iter()
            .filter_map(|arg| self.argument_from_introspection(owner, arg))
            .collect();
        let mut directives = Vec::new();
        if field.is_deprecated {
            directives.push(Directive::deprecated(field.deprecation_reason.as_deref()));
        }
        Some(FieldDefinition {
            name: field.name,
            description: non_empty(field.description),
            arguments,
            default_value: None,
            field_type,
            directives,
        })
    }

    fn argument_from_introspection(
        &self,
        owner: &str,
        value: InputValueRecord,
    ) -> Option<ArgumentDefinition> {
        let Some(value_type) = decode(value.value_type.as_ref(), self.scalar_nullability) else {
            warn!(owner, input = %value.name, "dropping input value with undecodable type");
            return None;
        };
        Some(ArgumentDefinition {
            name: value.name,
            description: non_empty(value.description),
            default_value: value.default_value,
            value_type,
            directives: Vec::new(),
        })
    }

    fn directive_from_introspection(&self, directive: IntrospectionDirective) -> DirectiveDefinition {
        let arguments = directive
            .args
            .into_iter()
            .filter_map(|arg| self.argument_from_introspection(&directive.name, arg))
            .collect();
        DirectiveDefinition {
            builtin: is_builtin_directive_name(&directive.name),
            name: directive.name,
            description: non_empty(directive.description),
            arguments,
            repeatable: directive.is_repeatable,
            locations: directive.locations,
        }
    }
}

/// index possible types and check references
fn finish(mut schema: Schema) -> Result<Schema> {
    index_possible_types(&mut schema);
    check_references(&schema)?;
    Ok(schema)
}

fn index_possible_types(schema: &mut Schema) {
    let mut pairs = Vec::new();
    for def in schema.sorted_types() {
        match def.kind {
            DefinitionKind::Object => {
                pairs.push((def.name.clone(), def.name.clone()));
                for iface in &def.interfaces {
                    pairs.push((iface.clone(), def.name.clone()));
                }
            }
            DefinitionKind::Union => {
                for member in &def.types {
                    pairs.push((def.name.clone(), member.clone()));
                }
            }
            _ => {}
        }
    }
    for (name, possible) in pairs {
        schema.add_possible_type(&name, &possible);
    }
}

fn check_references(schema: &Schema) -> Result<()> {
    for operation in [
        OperationType::Query,
        OperationType::Mutation,
        OperationType::Subscription,
    ] {
        if let Some(name) = schema.root_name(operation) {
            require(schema, &format!("schema.{operation}"), name)?;
        }
    }

    for def in schema.sorted_types() {
        for iface in &def.interfaces {
            require(schema, &def.name, iface)?;
        }
        for member in &def.types {
            require(schema, &def.name, member)?;
        }
        for field in &def.fields {
            require(schema, &def.name, field.field_type.base_name())?;
            for arg in &field.arguments {
                require(schema, &def.name, arg.value_type.base_name())?;
            }
        }
    }

    for directive in schema.sorted_directives() {
        for arg in &directive.arguments {
            require(schema, &format!("@{}", directive.name), arg.value_type.base_name())?;
        }
    }

    Ok(())
}

fn require(schema: &Schema, owner: &str, reference: &str) -> Result<()> {
    if schema.types.contains_key(reference) {
        return Ok(());
    }
    Err(Error::MalformedType {
        definition: owner.to_string(),
        reference: reference.to_string(),
    })
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|text| !text.trim().is_empty())
}

pub(crate) fn convert_type(ty: &sdl::Type<'_, String>) -> TypeNode {
    match ty {
        sdl::Type::NamedType(name) => TypeNode::named(name.clone()),
        sdl::Type::ListType(inner) => TypeNode::list(convert_type(inner)),
        sdl::Type::NonNullType(inner) => convert_type(inner).non_null(),
    }
}

pub(crate) fn convert_directives(directives: &[sdl::Directive<'_, String>]) -> Vec<Directive> {
    directives
        .iter()
        .map(|directive| Directive {
            name: directive.name.clone(),
            arguments: directive
                .arguments
                .iter()
                .map(|(name, value)| Argument {
                    name: name.clone(),
                    value: value.to_string(),
                })
                .collect(),
        })
        .collect()
}

fn argument_from_sdl(value: &sdl::InputValue<'_, String>) -> ArgumentDefinition {
    ArgumentDefinition {
        name: value.name.clone(),
        description: non_empty(value.description.clone()),
        default_value: value.default_value.as_ref().map(|v| v.to_string()),
        value_type: convert_type(&value.value_type),
        directives: convert_directives(&value.directives),
    }
}

fn field_from_sdl(field: &sdl::Field<'_, String>) -> FieldDefinition {
    FieldDefinition {
        name: field.name.clone(),
        description: non_empty(field.description.clone()),
        arguments: field.arguments.iter().map(argument_from_sdl).collect(),
        default_value: None,
        field_type: convert_type(&field.field_type),
        directives: convert_directives(&field.directives),
    }
}

fn input_field_from_sdl(value: &sdl::InputValue<'_, String>) -> FieldDefinition {
    let arg = argument_from_sdl(value);
    FieldDefinition {
        name: arg.name,
        description: arg.description,
        arguments: Vec::new(),
        default_value: arg.default_value,
        field_type: arg.value_type,
        directives: arg.directives,
    }
}

fn enum_value_from_sdl(value: &sdl::EnumValue<'_, String>) -> EnumValueDefinition {
    EnumValueDefinition {
        name: value.name.clone(),
        description: non_empty(value.description.clone()),
        directives: convert_directives(&value.directives),
    }
}

fn definition_from_sdl(ty: &sdl::TypeDefinition<'_, String>) -> Definition {
    match ty {
        sdl::TypeDefinition::Scalar(scalar) => {
            let mut def = Definition::new(DefinitionKind::Scalar, scalar.name.clone());
            def.description = non_empty(scalar.description.clone());
            def.directives = convert_directives(&scalar.directives);
            def
        }
        sdl::TypeDefinition::Object(obj) => {
            let mut def = Definition::new(DefinitionKind::Object, obj.name.clone());
            def.description = non_empty(obj.description.clone());
            def.interfaces = obj.implements_interfaces.clone();
            def.directives = convert_directives(&obj.directives);
            def.fields = obj.fields.iter().map(field_from_sdl).collect();
            def
        }
        sdl::TypeDefinition::Interface(iface) => {
            let mut def = Definition::new(DefinitionKind::Interface, iface.name.clone());
            def.description = non_empty(iface.description.clone());
            def.interfaces = iface.implements_interfaces.clone();
            def.directives = convert_directives(&iface.directives);
            def.fields = iface.fields.iter().map(field_from_sdl).collect();
            def
        }
        sdl::TypeDefinition::Union(union_ty) => {
            let mut def = Definition::new(DefinitionKind::Union, union_ty.name.clone());
            def.description = non_empty(union_ty.description.clone());
            def.directives = convert_directives(&union_ty.directives);
            def.types = union_ty.types.clone();
            def
        }
        sdl::TypeDefinition::Enum(enum_ty) => {
            let mut def = Definition::new(DefinitionKind::Enum, enum_ty.name.clone());
            def.description = non_empty(enum_ty.description.clone());
            def.directives = convert_directives(&enum_ty.directives);
            def.enum_values = enum_ty.values.iter().map(enum_value_from_sdl).collect();
            def
        }
        sdl::TypeDefinition::InputObject(input) => {
            let mut def = Definition::new(DefinitionKind::InputObject, input.name.clone());
            def.description = non_empty(input.description.clone());
            def.directives = convert_directives(&input.directives);
            def.fields = input.fields.iter().map(input_field_from_sdl).collect();
            def
        }
    }
}

fn directive_from_sdl(def: &sdl::DirectiveDefinition<'_, String>) -> DirectiveDefinition {
    DirectiveDefinition {
        name: def.name.clone(),
        description: non_empty(def.description.clone()),
        arguments: def.arguments.iter().map(argument_from_sdl).collect(),
        repeatable: def.repeatable,
        locations: def
            .locations
            .iter()
            .map(|location| location.as_str().to_string())
            .collect(),
        builtin: is_builtin_directive_name(&def.name),
    }
}

fn apply_extension(schema: &mut Schema, ext: &sdl::TypeExtension<'_, String>) -> Result<()> {
    let name = match ext {
        sdl::TypeExtension::Scalar(ext) => &ext.name,
        sdl::TypeExtension::Object(ext) => &ext.name,
        sdl::TypeExtension::Interface(ext) => &ext.name,
        sdl::TypeExtension::Union(ext) => &ext.name,
        sdl::TypeExtension::Enum(ext) => &ext.name,
        sdl::TypeExtension::InputObject(ext) => &ext.name,
    };
    let def = schema
        .types
        .get_mut(name)
        .ok_or_else(|| Error::MalformedType {
            definition: format!("extend {name}"),
            reference: name.clone(),
        })?;

    match ext {
        sdl::TypeExtension::Scalar(ext) => {
            def.directives.extend(convert_directives(&ext.directives));
        }
        sdl::TypeExtension::Object(ext) => {
            def.interfaces.extend(ext.implements_interfaces.iter().cloned());
            def.directives.extend(convert_directives(&ext.directives));
            def.fields.extend(ext.fields.iter().map(field_from_sdl));
        }
        sdl::TypeExtension::Interface(ext) => {
            def.interfaces.extend(ext.implements_interfaces.iter().cloned());
            def.directives.extend(convert_directives(&ext.directives));
            def.fields.extend(ext.fields.iter().map(field_from_sdl));
        }
        sdl::TypeExtension::Union(ext) => {
            def.directives.extend(convert_directives(&ext.directives));
            def.types.extend(ext.types.iter().cloned());
        }
        sdl::TypeExtension::Enum(ext) => {
            def.directives.extend(convert_directives(&ext.directives));
            def.enum_values.extend(ext.values.iter().map(enum_value_from_sdl));
        }
        sdl::TypeExtension::InputObject(ext) => {
            def.directives.extend(convert_directives(&ext.directives));
            def.fields.extend(ext.fields.iter().map(input_field_from_sdl));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "data": {
            "__schema": {
                "queryType": {"name": "Query"},
                "mutationType": null,
                "subscriptionType": null,
                "types": [
                    {
                        "kind": "OBJECT",
                        "name": "Query",
                        "description": "",
                        "fields": [
                            {
                                "name": "users",
                                "description": "all users",
                                "args": [
                                    {
                                        "name": "limit",
                                        "description": null,
                                        "type": {"kind": "SCALAR", "name": "Int", "ofType": null},
                                        "defaultValue": "10"
                                    }
                                ],
                                "type": {"kind": "NON_NULL", "name": null, "ofType": {
                                    "kind": "LIST", "name": null, "ofType": {
                                        "kind": "NON_NULL", "name": null, "ofType": {
                                            "kind": "OBJECT", "name": "User", "ofType": null}}}},
                                "isDeprecated": false,
                                "deprecationReason": null
                            }
                        ],
                        "inputFields": null,
                        "interfaces": [],
                        "enumValues": null,
                        "possibleTypes": null
                    },
                    {
                        "kind": "OBJECT",
                        "name": "User",
                        "fields": [
                            {"name": "id", "args": [], "type": {"kind": "NON_NULL", "ofType": {"kind": "SCALAR", "name": "ID"}}},
                            {"name": "login", "args": [], "type": {"kind": "SCALAR", "name": "String"},
                             "isDeprecated": true, "deprecationReason": "use handle"},
                            {"name": "broken", "args": [], "type": null}
                        ],
                        "interfaces": [{"kind": "INTERFACE", "name": "Node", "ofType": null}]
                    },
                    {
                        "kind": "INTERFACE",
                        "name": "Node",
                        "fields": [
                            {"name": "id", "args": [], "type": {"kind": "NON_NULL", "ofType": {"kind": "SCALAR", "name": "ID"}}}
                        ],
                        "possibleTypes": [{"kind": "OBJECT", "name": "User", "ofType": null}]
                    },
                    {
                        "kind": "ENUM",
                        "name": "Role",
                        "enumValues": [
                            {"name": "ADMIN", "isDeprecated": false},
                            {"name": "GUEST", "isDeprecated": true, "deprecationReason": null}
                        ]
                    },
                    {
                        "kind": "INPUT_OBJECT",
                        "name": "UserFilter",
                        "inputFields": [
                            {"name": "role", "type": {"kind": "ENUM", "name": "Role"}, "defaultValue": "ADMIN"}
                        ]
                    },
                    {"kind": "SCALAR", "name": "ID"},
                    {"kind": "SCALAR", "name": "Int"},
                    {"kind": "SCALAR", "name": "String"},
                    {"kind": "SCALAR", "name": "Boolean"},
                    {"kind": "OBJECT", "name": "__Type", "fields": [
                        {"name": "name", "args": [], "type": {"kind": "SCALAR", "name": "String"}}
                    ]}
                ],
                "directives": [
                    {"name": "include", "locations": ["FIELD"], "args": [
                        {"name": "if", "type": {"kind": "NON_NULL", "ofType": {"kind": "SCALAR", "name": "Boolean"}}}
                    ]}
                ]
            }
        }
    }"#;

    #[test]
    fn test_build_from_introspection() {
        let schema = SchemaBuilder::new().build_from_json(PAYLOAD).unwrap();

        assert_eq!(schema.query().unwrap().name, "Query");
        assert!(schema.get("__Type").is_none());

        let users = schema.find_field("Query", "users").unwrap();
        assert_eq!(users.field_type.to_string(), "[User!]!");
        assert_eq!(users.description.as_deref(), Some("all users"));
        assert_eq!(users.arguments[0].default_value.as_deref(), Some("10"));
        assert!(schema.query().unwrap().description.is_none());

        let user = schema.get("User").unwrap();
        assert_eq!(user.interfaces, vec!["Node".to_string()]);
        assert!(user.field("broken").is_none());
        assert_eq!(user.field("login").unwrap().directives[0].name, "deprecated");

        let role = schema.get("Role").unwrap();
        assert_eq!(role.enum_values.len(), 2);
        assert!(role.enum_values[1].directives[0].arguments.is_empty());

        let filter = schema.get("UserFilter").unwrap();
        assert_eq!(filter.fields[0].default_value.as_deref(), Some("ADMIN"));

        assert!(schema.get("String").unwrap().builtin);
        assert!(schema.directives["include"].builtin);
        // payloads without `isRepeatable` read as not repeatable
        assert!(!schema.directives["include"].repeatable);
    }

    #[test]
    fn test_possible_types_index() {
        let schema = SchemaBuilder::new().build_from_json(PAYLOAD).unwrap();
        let names: Vec<&str> = schema
            .possible_types("Node")
            .into_iter()
            .map(|def| def.name.as_str())
            .collect();
        assert_eq!(names, vec!["User"]);
        assert_eq!(schema.find_field("Node", "id").unwrap().field_type.to_string(), "ID!");
    }

    #[test]
    fn test_include_builtins() {
        let schema = SchemaBuilder::new()
            .with_builtins(true)
            .build_from_json(PAYLOAD)
            .unwrap();
        assert!(schema.get("__Type").unwrap().builtin);
    }

    #[test]
    fn test_scalar_policy_applies_to_fields() {
        let schema = SchemaBuilder::new()
            .with_scalar_nullability(ScalarNullability::NonNull)
            .build_from_json(PAYLOAD)
            .unwrap();
        let login = schema.find_field("User", "login").unwrap();
        assert_eq!(login.field_type.to_string(), "String!");
    }

    #[test]
    fn test_missing_schema_node() {
        let err = SchemaBuilder::new()
            .build_from_json(r#"{"data": {"other": 1}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::IncompleteIntrospection));
    }

    #[test]
    fn test_errors_array_is_fatal() {
        let err = SchemaBuilder::new()
            .build_from_json(r#"{"data": {"__schema": {"types": []}}, "errors": [{"message": "denied"}]}"#)
            .unwrap_err();
        assert!(matches!(err, Error::GraphQl { ref message, .. } if message == "denied"));
    }

    #[test]
    fn test_dangling_reference() {
        let json = r#"{"data": {"__schema": {
            "queryType": {"name": "Query"},
            "types": [
                {"kind": "OBJECT", "name": "Query", "fields": [
                    {"name": "ghost", "args": [], "type": {"kind": "OBJECT", "name": "Ghost"}}
                ]}
            ]
        }}}"#;
        let err = SchemaBuilder::new().build_from_json(json).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedType { ref definition, ref reference }
                if definition == "Query" && reference == "Ghost"
        ));
    }

    #[test]
    fn test_missing_root_type() {
        let json = r#"{"data": {"__schema": {"queryType": {"name": "Root"}, "types": []}}}"#;
        let err = SchemaBuilder::new().build_from_json(json).unwrap_err();
        assert!(matches!(err, Error::MalformedType { ref reference, .. } if reference == "Root"));
    }

    #[test]
    fn test_build_from_sdl() {
        let sdl = r#"
            schema { query: RootQuery }

            "a user"
            type User implements Node @key(fields: "id") {
              id: ID!
              tags(first: Int = 5): [String!]
            }

            interface Node { id: ID! }

            union Actor = User

            enum Role { ADMIN GUEST @deprecated(reason: "gone") }

            input UserFilter { role: Role = ADMIN }

            type RootQuery { node(id: ID!): Node }

            extend type User { role: Role }

            directive @key(fields: String!) repeatable on OBJECT | INTERFACE
        "#;
        let schema = SchemaBuilder::new().build_from_sdl(sdl).unwrap();

        assert_eq!(schema.query_type.as_deref(), Some("RootQuery"));
        assert!(schema.mutation_type.is_none());

        let user = schema.get("User").unwrap();
        assert_eq!(user.description.as_deref(), Some("a user"));
        assert_eq!(user.fields.len(), 3);
        assert_eq!(user.directives[0].arguments[0].value, "\"id\"");
        let tags = user.field("tags").unwrap();
        assert_eq!(tags.field_type.to_string(), "[String!]");
        assert_eq!(tags.arguments[0].default_value.as_deref(), Some("5"));

        let key = &schema.directives["key"];
        assert!(key.repeatable);
        assert!(!key.builtin);
        assert_eq!(key.locations, vec!["OBJECT".to_string(), "INTERFACE".to_string()]);

        assert_eq!(schema.possible_types("Actor").len(), 1);
        assert!(schema.get("Int").unwrap().builtin);
    }

    #[test]
    fn test_sdl_default_roots() {
        let schema = SchemaBuilder::new()
            .build_from_sdl("type Query { a: Int } type Mutation { b: Int }")
            .unwrap();
        assert_eq!(schema.query_type.as_deref(), Some("Query"));
        assert_eq!(schema.mutation_type.as_deref(), Some("Mutation"));
        assert!(schema.subscription_type.is_none());
    }

    #[test]
    fn test_sdl_errors() {
        let err = SchemaBuilder::new().build_from_sdl("type {").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));

        let err = SchemaBuilder::new()
            .build_from_sdl("type Query { a: Int } extend type Missing { b: Int }")
            .unwrap_err();
        assert!(matches!(err, Error::MalformedType { .. }));

        let err = SchemaBuilder::new()
            .build_from_sdl("type Query { a: Missing }")
            .unwrap_err();
        assert!(matches!(err, Error::MalformedType { .. }));
    }
}
