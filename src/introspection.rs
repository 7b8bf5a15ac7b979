//! introspection wire format
//!
//! serde records for the `__schema` payload, the fixed introspection query,
//! and [`decode`], which turns a nested wrapper chain into a [`TypeNode`].

use crate::schema::TypeNode;
use serde::Deserialize;

/// query sent to the endpoint; wrapper chains are fetched seven levels deep
pub const INTROSPECTION_QUERY: &str = r#"query IntrospectionQuery {
  __schema {
    queryType { name }
    mutationType { name }
    subscriptionType { name }
    types {
      ...FullType
    }
    directives {
      name
      description
      isRepeatable
      locations
      args {
        ...InputValue
      }
    }
  }
}

fragment FullType on __Type {
  kind
  name
  description
  fields(includeDeprecated: true) {
    name
    description
    args {
      ...InputValue
    }
    type {
      ...TypeRef
    }
    isDeprecated
    deprecationReason
  }
  inputFields {
    ...InputValue
  }
  interfaces {
    ...TypeRef
  }
  enumValues(includeDeprecated: true) {
    name
    description
    isDeprecated
    deprecationReason
  }
  possibleTypes {
    ...TypeRef
  }
}

fragment InputValue on __InputValue {
  name
  description
  type {
    ...TypeRef
  }
  defaultValue
}

fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
        ofType {
          kind
          name
          ofType {
            kind
            name
            ofType {
              kind
              name
            }
          }
        }
      }
    }
  }
}
"#;

/// `__TypeKind` as sent on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
    #[serde(other)]
    Unknown,
}

/// one level of a wrapped type reference
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    pub kind: TypeKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub of_type: Option<Box<TypeRef>>,
}

impl TypeRef {
    pub fn named(kind: TypeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: Some(name.into()),
            of_type: None,
        }
    }

    pub fn wrap(kind: TypeKind, inner: TypeRef) -> Self {
        Self {
            kind,
            name: None,
            of_type: Some(Box::new(inner)),
        }
    }
}

/// `data` member of the introspection response
#[derive(Debug, Clone, Deserialize)]
pub struct IntrospectionData {
    #[serde(rename = "__schema", default)]
    pub schema: Option<IntrospectionSchema>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionSchema {
    #[serde(default)]
    pub query_type: Option<RootTypeRef>,
    #[serde(default)]
    pub mutation_type: Option<RootTypeRef>,
    #[serde(default)]
    pub subscription_type: Option<RootTypeRef>,
    #[serde(default)]
    pub types: Vec<Option<FullType>>,
    #[serde(default)]
    pub directives: Vec<IntrospectionDirective>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RootTypeRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullType {
    pub kind: TypeKind,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Option<Vec<FieldRecord>>,
    #[serde(default)]
    pub input_fields: Option<Vec<InputValueRecord>>,
    #[serde(default)]
    pub interfaces: Option<Vec<Option<TypeRef>>>,
    #[serde(default)]
    pub enum_values: Option<Vec<EnumValueRecord>>,
    #[serde(default)]
    pub possible_types: Option<Vec<Option<TypeRef>>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRecord {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub args: Vec<InputValueRecord>,
    #[serde(rename = "type", default)]
    pub field_type: Option<TypeRef>,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub deprecation_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputValueRecord {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub value_type: Option<TypeRef>,
    #[serde(default)]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumValueRecord {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub deprecation_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionDirective {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// absent in snapshots taken before `repeatable` existed
    #[serde(default)]
    pub is_repeatable: bool,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub args: Vec<InputValueRecord>,
}

/// nullability given to a `SCALAR` leaf that has no `NON_NULL` wrapper
///
/// schema snapshots disagree here, so the choice is explicit. the default
/// follows graphql semantics: an unwrapped scalar is nullable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScalarNullability {
    #[default]
    Nullable,
    NonNull,
}

/// decode a wrapper chain into a type expression
///
/// returns `None` for a missing reference, an unknown kind, or a chain that
/// ends without a name. callers treat that as a data-quality problem.
pub fn decode(type_ref: Option<&TypeRef>, scalars: ScalarNullability) -> Option<TypeNode> {
    let type_ref = type_ref?;
    match type_ref.kind {
        TypeKind::NonNull => match type_ref.of_type.as_deref() {
            None => type_ref.name.as_deref().map(|name| TypeNode::named(name).non_null()),
            Some(inner) => decode(Some(inner), scalars).map(TypeNode::non_null),
        },
        TypeKind::Object
        | TypeKind::Interface
        | TypeKind::Union
        | TypeKind::Enum
        | TypeKind::InputObject => match type_ref.of_type.as_deref() {
            None => type_ref.name.as_deref().map(TypeNode::named),
            Some(inner) => decode(Some(inner), scalars)
                .or_else(|| type_ref.name.as_deref().map(TypeNode::named)),
        },
        TypeKind::List => {
            let element = decode(type_ref.of_type.as_deref(), scalars)?;
            Some(TypeNode::list(element))
        }
        TypeKind::Scalar => {
            let node = TypeNode::named(type_ref.name.as_deref()?);
            Some(match scalars {
                ScalarNullability::Nullable => node,
                ScalarNullability::NonNull => node.non_null(),
            })
        }
        TypeKind::Unknown => None,
    }
}
