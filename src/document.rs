//! operation documents
//!
//! owned model of executable graphql documents. source text is parsed with
//! `graphql-parser`, converted into these types, merged across files, and
//! checked against a [`Schema`] before flattening.

use crate::builder::{convert_directives, convert_type};
use crate::error::{Error, Result};
use crate::schema::{Argument, Directive, OperationType, Schema, TypeNode};
use graphql_parser::query as q;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    pub items: Vec<Selection>,
}

impl SelectionSet {
    pub fn new(items: Vec<Selection>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Selection> {
        self.items.iter()
    }

    /// true when no fragment spread or inline fragment remains at any depth
    pub fn is_flat(&self) -> bool {
        self.items.iter().all(|item| match item {
            Selection::Field(field) => field.selection_set.is_flat(),
            Selection::FragmentSpread(_) | Selection::InlineFragment(_) => false,
        })
    }
}

/// one entry of a selection set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Field(Field),
    FragmentSpread(FragmentSpread),
    InlineFragment(InlineFragment),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub alias: Option<String>,
    pub name: String,
    pub arguments: Vec<Argument>,
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
}

impl Field {
    /// a bare field with no alias, arguments, or selections
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            alias: None,
            name: name.into(),
            arguments: Vec::new(),
            directives: Vec::new(),
            selection_set: SelectionSet::default(),
        }
    }

    /// the key this field occupies in a response object
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentSpread {
    pub name: String,
    pub directives: Vec<Directive>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineFragment {
    pub type_condition: Option<String>,
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDefinition {
    pub name: String,
    pub var_type: TypeNode,
    /// raw literal text
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDefinition {
    pub operation: OperationType,
    pub name: Option<String>,
    pub variables: Vec<VariableDefinition>,
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentDefinition {
    pub name: String,
    pub type_condition: String,
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
}

/// operations and fragments of one or more source files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutableDocument {
    pub operations: Vec<OperationDefinition>,
    pub fragments: Vec<FragmentDefinition>,
}

/// fragment definitions by name, borrowed from their document
#[derive(Debug, Clone, Default)]
pub struct FragmentTable<'a> {
    fragments: HashMap<&'a str, &'a FragmentDefinition>,
}

impl<'a> FragmentTable<'a> {
    pub fn get(&self, name: &str) -> Option<&'a FragmentDefinition> {
        self.fragments.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// fragments `op` spreads, directly or through other fragments, in first-use order
    pub fn used_by(&self, op: &OperationDefinition) -> Result<Vec<&'a FragmentDefinition>> {
        let mut used: Vec<&'a FragmentDefinition> = Vec::new();
        let mut pending = Vec::new();
        collect_spreads(&op.selection_set, &mut pending);
        pending.reverse();
        while let Some(name) = pending.pop() {
            if used.iter().any(|fragment| fragment.name == name) {
                continue;
            }
            let fragment = self
                .get(name)
                .ok_or_else(|| Error::UnresolvedFragment(name.to_string()))?;
            used.push(fragment);
            let mut nested = Vec::new();
            collect_spreads(&fragment.selection_set, &mut nested);
            pending.extend(nested.into_iter().rev());
        }
        Ok(used)
    }
}

impl ExecutableDocument {
    /// parse one executable document
    pub fn parse(source: &str) -> Result<Self> {
        let document =
            q::parse_query::<String>(source).map_err(|err| Error::Parse(err.to_string()))?;

        let mut out = ExecutableDocument::default();
        for definition in &document.definitions {
            match definition {
                q::Definition::Operation(op) => out.operations.push(convert_operation(op)),
                q::Definition::Fragment(fragment) => {
                    let q::TypeCondition::On(type_condition) = &fragment.type_condition;
                    out.fragments.push(FragmentDefinition {
                        name: fragment.name.clone(),
                        type_condition: type_condition.clone(),
                        directives: convert_directives(&fragment.directives),
                        selection_set: convert_selection_set(&fragment.selection_set),
                    });
                }
            }
        }
        Ok(out)
    }

    /// concatenate operations and fragments of several documents, in order
    pub fn merge(documents: impl IntoIterator<Item = ExecutableDocument>) -> Self {
        let mut merged = ExecutableDocument::default();
        for document in documents {
            merged.operations.extend(document.operations);
            merged.fragments.extend(document.fragments);
        }
        merged
    }

    /// index fragments by name; names must be unique
    pub fn fragment_table(&self) -> Result<FragmentTable<'_>> {
        let mut fragments = HashMap::with_capacity(self.fragments.len());
        for fragment in &self.fragments {
            if fragments.insert(fragment.name.as_str(), fragment).is_some() {
                return Err(Error::Validation(format!(
                    "fragment {} is defined more than once",
                    fragment.name
                )));
            }
        }
        Ok(FragmentTable { fragments })
    }

    /// check the document against a schema
    ///
    /// covers unique names, root types, field existence, leaf/composite
    /// selections, spread targets, and fragment cycles. it is not a full
    /// implementation of graphql validation.
    pub fn validate(&self, schema: &Schema) -> Result<()> {
        let table = self.fragment_table()?;

        let mut names = HashSet::new();
        for op in &self.operations {
            if let Some(name) = &op.name {
                if !names.insert(name.as_str()) {
                    return Err(Error::Validation(format!(
                        "operation {name} is defined more than once"
                    )));
                }
            }
        }

        for fragment in &self.fragments {
            let def = schema.get(&fragment.type_condition).ok_or_else(|| {
                Error::Validation(format!(
                    "fragment {} is on unknown type {}",
                    fragment.name, fragment.type_condition
                ))
            })?;
            if !def.kind.is_composite() {
                return Err(Error::Validation(format!(
                    "fragment {} is on non-composite type {}",
                    fragment.name, fragment.type_condition
                )));
            }
            validate_selection_set(schema, &table, &fragment.type_condition, &fragment.selection_set)?;
        }
        check_fragment_cycles(&self.fragments, &table)?;

        for op in &self.operations {
            let root = schema.root(op.operation).ok_or_else(|| {
                Error::Validation(format!("schema has no {} root type", op.operation))
            })?;
            for variable in &op.variables {
                if schema.get(variable.var_type.base_name()).is_none() {
                    return Err(Error::Validation(format!(
                        "variable ${} has unknown type {}",
                        variable.name, variable.var_type
                    )));
                }
            }
            validate_selection_set(schema, &table, &root.name, &op.selection_set)?;
        }

        Ok(())
    }
}

fn validate_selection_set(
    schema: &Schema,
    table: &FragmentTable<'_>,
    parent: &str,
    set: &SelectionSet,
) -> Result<()> {
    for item in set.iter() {
        match item {
            Selection::Field(field) => {
                if field.name == "__typename" {
                    if !field.selection_set.is_empty() {
                        return Err(Error::Validation(
                            "__typename cannot have a selection set".to_string(),
                        ));
                    }
                    continue;
                }
                if field.name.starts_with("__") {
                    // meta fields such as __schema are not part of the built schema
                    continue;
                }
                // strict lookup: a member's field needs a `... on Member` scope
                let def = schema
                    .get(parent)
                    .and_then(|ty| ty.field(&field.name))
                    .ok_or_else(|| {
                        Error::Validation(format!("unknown field {} on type {parent}", field.name))
                    })?;
                let field_type = def.field_type.base_name();
                let composite = schema
                    .get(field_type)
                    .map(|ty| ty.kind.is_composite())
                    .unwrap_or(false);
                match (composite, field.selection_set.is_empty()) {
                    (true, true) => {
                        return Err(Error::Validation(format!(
                            "field {parent}.{} of type {field_type} needs a selection set",
                            field.name
                        )))
                    }
                    (false, false) => {
                        return Err(Error::Validation(format!(
                            "field {parent}.{} of type {field_type} cannot have a selection set",
                            field.name
                        )))
                    }
                    _ => {}
                }
                validate_selection_set(schema, table, field_type, &field.selection_set)?;
            }
            Selection::FragmentSpread(spread) => {
                if table.get(&spread.name).is_none() {
                    return Err(Error::UnresolvedFragment(spread.name.clone()));
                }
            }
            Selection::InlineFragment(inline) => {
                let scope = match &inline.type_condition {
                    Some(condition) => {
                        match schema.get(condition) {
                            None => {
                                return Err(Error::Validation(format!(
                                    "inline fragment on unknown type {condition}"
                                )))
                            }
                            Some(def) if !def.kind.is_composite() => {
                                return Err(Error::Validation(format!(
                                    "inline fragment on non-composite type {condition}"
                                )))
                            }
                            Some(_) => {}
                        }
                        condition.as_str()
                    }
                    None => parent,
                };
                validate_selection_set(schema, table, scope, &inline.selection_set)?;
            }
        }
    }
    Ok(())
}

fn check_fragment_cycles(fragments: &[FragmentDefinition], table: &FragmentTable<'_>) -> Result<()> {
    fn visit<'a>(
        fragment: &'a FragmentDefinition,
        table: &FragmentTable<'a>,
        path: &mut Vec<&'a str>,
        done: &mut HashSet<&'a str>,
    ) -> Result<()> {
        if done.contains(fragment.name.as_str()) {
            return Ok(());
        }
        if path.contains(&fragment.name.as_str()) {
            path.push(&fragment.name);
            return Err(Error::CyclicFragment(path.join(" -> ")));
        }
        path.push(&fragment.name);
        let mut spreads = Vec::new();
        collect_spreads(&fragment.selection_set, &mut spreads);
        for name in spreads {
            if let Some(next) = table.get(name) {
                visit(next, table, path, done)?;
            }
        }
        path.pop();
        done.insert(&fragment.name);
        Ok(())
    }

    let mut done = HashSet::new();
    for fragment in fragments {
        visit(fragment, table, &mut Vec::new(), &mut done)?;
    }
    Ok(())
}

fn collect_spreads<'a>(set: &'a SelectionSet, out: &mut Vec<&'a str>) {
    for item in set.iter() {
        match item {
            Selection::Field(field) => collect_spreads(&field.selection_set, out),
            Selection::FragmentSpread(spread) => out.push(&spread.name),
            Selection::InlineFragment(inline) => collect_spreads(&inline.selection_set, out),
        }
    }
}

fn convert_operation(op: &q::OperationDefinition<'_, String>) -> OperationDefinition {
    let (operation, name, variables, directives, selection_set) = match op {
        q::OperationDefinition::SelectionSet(set) => {
            (OperationType::Query, None, &[][..], &[][..], set)
        }
        q::OperationDefinition::Query(query) => (
            OperationType::Query,
            query.name.clone(),
            &query.variable_definitions[..],
            &query.directives[..],
            &query.selection_set,
        ),
        q::OperationDefinition::Mutation(mutation) => (
            OperationType::Mutation,
            mutation.name.clone(),
            &mutation.variable_definitions[..],
            &mutation.directives[..],
            &mutation.selection_set,
        ),
        q::OperationDefinition::Subscription(subscription) => (
            OperationType::Subscription,
            subscription.name.clone(),
            &subscription.variable_definitions[..],
            &subscription.directives[..],
            &subscription.selection_set,
        ),
    };

    OperationDefinition {
        operation,
        name,
        variables: variables
            .iter()
            .map(|variable| VariableDefinition {
                name: variable.name.clone(),
                var_type: convert_type(&variable.var_type),
                default_value: variable.default_value.as_ref().map(|v| v.to_string()),
            })
            .collect(),
        directives: convert_directives(directives),
        selection_set: convert_selection_set(selection_set),
    }
}

fn convert_selection_set(set: &q::SelectionSet<'_, String>) -> SelectionSet {
    let items = set
        .items
        .iter()
        .map(|item| match item {
            q::Selection::Field(field) => Selection::Field(Field {
                alias: field.alias.clone(),
                name: field.name.clone(),
                arguments: field
                    .arguments
                    .iter()
                    .map(|(name, value)| Argument {
                        name: name.clone(),
                        value: value.to_string(),
                    })
                    .collect(),
                directives: convert_directives(&field.directives),
                selection_set: convert_selection_set(&field.selection_set),
            }),
            q::Selection::FragmentSpread(spread) => Selection::FragmentSpread(FragmentSpread {
                name: spread.fragment_name.clone(),
                directives: convert_directives(&spread.directives),
            }),
            q::Selection::InlineFragment(inline) => Selection::InlineFragment(InlineFragment {
                type_condition: inline.type_condition.as_ref().map(|condition| match condition {
                    q::TypeCondition::On(name) => name.clone(),
                }),
                directives: convert_directives(&inline.directives),
                selection_set: convert_selection_set(&inline.selection_set),
            }),
        })
        .collect();
    SelectionSet { items }
}
