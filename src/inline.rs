//! selection flattening
//!
//! replaces fragment spreads and inline fragments with the fields they
//! select, at every depth. the result keeps declaration order and does not
//! merge repeated fields: two fragments selecting `id` yield two `id` fields.
//! directives and type conditions on fragments are dropped with them.

use crate::document::{
    ExecutableDocument, FragmentTable, OperationDefinition, Selection, SelectionSet,
};
use crate::error::{Error, Result};
use tracing::debug;

/// flattens selection sets against a fragment table
///
/// spreads currently being expanded are tracked, so a cyclic fragment yields
/// [`Error::CyclicFragment`] instead of unbounded recursion.
pub struct SelectionInliner<'a> {
    fragments: &'a FragmentTable<'a>,
    active: Vec<&'a str>,
}

impl<'a> SelectionInliner<'a> {
    pub fn new(fragments: &'a FragmentTable<'a>) -> Self {
        Self {
            fragments,
            active: Vec::new(),
        }
    }

    /// flatten one selection set
    pub fn inline(&mut self, set: &SelectionSet) -> Result<SelectionSet> {
        let mut items = Vec::with_capacity(set.len());
        for selection in set.iter() {
            match selection {
                Selection::Field(field) if field.selection_set.is_empty() => {
                    items.push(Selection::Field(field.clone()));
                }
                Selection::Field(field) => {
                    let mut field = field.clone();
                    field.selection_set = self.inline(&field.selection_set)?;
                    items.push(Selection::Field(field));
                }
                Selection::FragmentSpread(spread) => {
                    let fragment = self
                        .fragments
                        .get(&spread.name)
                        .ok_or_else(|| Error::UnresolvedFragment(spread.name.clone()))?;
                    if self.active.contains(&fragment.name.as_str()) {
                        let mut path: Vec<&str> = self.active.clone();
                        path.push(&fragment.name);
                        return Err(Error::CyclicFragment(path.join(" -> ")));
                    }
                    self.active.push(&fragment.name);
                    let spliced = self.inline(&fragment.selection_set);
                    self.active.pop();
                    items.extend(spliced?.items);
                }
                Selection::InlineFragment(inline) => {
                    items.extend(self.inline(&inline.selection_set)?.items);
                }
            }
        }
        Ok(SelectionSet { items })
    }

    /// flatten the selection set of an operation
    pub fn inline_operation(&mut self, op: &OperationDefinition) -> Result<OperationDefinition> {
        let mut flattened = op.clone();
        flattened.selection_set = self.inline(&op.selection_set)?;
        Ok(flattened)
    }
}

/// flatten a selection set against `fragments`
pub fn inline_selection_set(set: &SelectionSet, fragments: &FragmentTable<'_>) -> Result<SelectionSet> {
    SelectionInliner::new(fragments).inline(set)
}

/// flatten every operation of a document against its own fragments
pub fn inline_document(document: &ExecutableDocument) -> Result<Vec<OperationDefinition>> {
    let table = document.fragment_table()?;
    let mut inliner = SelectionInliner::new(&table);
    let mut operations = Vec::with_capacity(document.operations.len());
    for op in &document.operations {
        let flattened = inliner.inline_operation(op)?;
        debug!(
            operation = op.name.as_deref().unwrap_or("<anonymous>"),
            fields = flattened.selection_set.len(),
            "inlined operation"
        );
        operations.push(flattened);
    }
    Ok(operations)
}
