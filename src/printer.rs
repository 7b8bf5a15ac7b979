//! canonical graphql printer
//!
//! a token-level pretty printer over a `String` buffer. every token goes
//! through [`Printer::word`] or [`Printer::raw`], which decide whether a
//! separating space is needed; punctuation toggles that decision with
//! [`Printer::no_pad`] and [`Printer::need_pad`].
//!
//! schema mappings are unordered, so directives and types are sorted by name
//! before rendering and the same schema always prints the same text.

use crate::config::GeneratorConfig;
use crate::document::{
    ExecutableDocument, Field, FragmentDefinition, FragmentSpread, InlineFragment,
    OperationDefinition, Selection, SelectionSet, VariableDefinition,
};
use crate::schema::{
    Argument, ArgumentDefinition, Definition, DefinitionKind, Directive, DirectiveDefinition,
    EnumValueDefinition, FieldDefinition, OperationType, Schema, TypeNode,
};

const BLOCK_QUOTE: &str = "\"\"\"";

/// streaming graphql formatter
#[derive(Debug, Clone)]
pub struct Printer {
    out: String,
    indent_unit: String,
    indent_level: usize,
    at_line_start: bool,
    pending_space: bool,
    emit_builtins: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self {
            out: String::new(),
            indent_unit: "  ".to_string(),
            indent_level: 0,
            at_line_start: true,
            pending_space: false,
            emit_builtins: false,
        }
    }
}

impl Printer {
    pub fn new() -> Self {
        Self::default()
    }

    /// printer honouring the generator's indent unit and builtin policy
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new()
            .with_indent_unit(config.indent.clone())
            .with_emit_builtins(config.emit_builtins)
    }

    pub fn with_indent_unit(mut self, unit: impl Into<String>) -> Self {
        self.indent_unit = unit.into();
        self
    }

    /// also print builtin scalars, builtin directives, and `__` types/fields
    pub fn with_emit_builtins(mut self, emit: bool) -> Self {
        self.emit_builtins = emit;
        self
    }

    /// text rendered so far
    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// consume the printer and return its text
    pub fn finish(self) -> String {
        self.out
    }

    fn emit_indent(&mut self) {
        if self.at_line_start {
            for _ in 0..self.indent_level {
                self.out.push_str(&self.indent_unit);
            }
        }
        self.at_line_start = false;
        self.pending_space = false;
    }

    /// write a space-separated token
    fn word(&mut self, word: &str) -> &mut Self {
        if self.at_line_start {
            self.emit_indent();
        }
        if self.pending_space {
            self.out.push(' ');
        }
        self.out.push_str(word.trim());
        self.pending_space = true;
        self
    }

    /// write `text` verbatim; the next token binds to it unless padding is requested
    fn raw(&mut self, text: &str) -> &mut Self {
        if self.at_line_start {
            self.emit_indent();
        }
        if self.pending_space {
            self.out.push(' ');
        }
        self.out.push_str(text);
        self.pending_space = false;
        self
    }

    fn newline(&mut self) -> &mut Self {
        self.out.push('\n');
        self.at_line_start = true;
        self.pending_space = false;
        self
    }

    fn no_pad(&mut self) -> &mut Self {
        self.pending_space = false;
        self
    }

    fn need_pad(&mut self) -> &mut Self {
        self.pending_space = true;
        self
    }

    /// run `body` one indentation level deeper
    fn nested(&mut self, body: impl FnOnce(&mut Self)) {
        self.indent_level += 1;
        body(self);
        self.indent_level -= 1;
    }

    /// blank line between top-level definitions
    fn separate(&mut self) {
        if !self.out.is_empty() {
            self.newline();
        }
    }

    fn colon(&mut self) -> &mut Self {
        self.no_pad().raw(":").need_pad()
    }

    fn description(&mut self, description: Option<&str>) {
        let Some(text) = description.filter(|text| !text.is_empty()) else {
            return;
        };
        self.raw(BLOCK_QUOTE).newline();
        for line in text.lines() {
            if !line.is_empty() {
                self.raw(&line.replace(BLOCK_QUOTE, "\\\"\"\""));
            }
            self.newline();
        }
        self.raw(BLOCK_QUOTE).newline();
    }

    fn type_ref(&mut self, ty: &TypeNode) {
        self.word(&ty.to_string());
    }

    fn default_value(&mut self, value: Option<&str>) {
        if let Some(value) = value {
            self.word("=").raw(value);
        }
    }

    /// render a whole schema: root block, directive definitions, then types
    pub fn print_schema(&mut self, schema: &Schema) {
        self.schema_block(schema);
        for directive in schema.sorted_directives() {
            self.print_directive_definition(directive);
        }
        for def in schema.sorted_types() {
            self.print_definition(def);
        }
    }

    /// `schema { ... }`, only when a root type has a non-default name
    fn schema_block(&mut self, schema: &Schema) {
        let roots: Vec<(OperationType, &str)> = [
            OperationType::Query,
            OperationType::Mutation,
            OperationType::Subscription,
        ]
        .into_iter()
        .filter_map(|op| schema.root_name(op).map(|name| (op, name)))
        .collect();

        if roots.iter().all(|(op, name)| *name == op.default_root()) {
            return;
        }

        self.separate();
        self.word("schema").raw("{").newline();
        self.nested(|p| {
            for (op, name) in &roots {
                p.word(op.as_str()).colon().word(name).newline();
            }
        });
        self.raw("}").newline();
    }

    pub fn print_directive_definition(&mut self, def: &DirectiveDefinition) {
        if def.builtin && !self.emit_builtins {
            return;
        }
        self.separate();
        self.description(def.description.as_deref());
        self.word("directive").raw("@").word(&def.name);
        if !def.arguments.is_empty() {
            self.no_pad();
            self.argument_definitions(&def.arguments);
        }
        if def.repeatable {
            self.word("repeatable");
        }
        for (idx, location) in def.locations.iter().enumerate() {
            self.word(if idx == 0 { "on" } else { "|" });
            self.word(location);
        }
        self.newline();
    }

    /// render one named type definition
    pub fn print_definition(&mut self, def: &Definition) {
        if !self.emit_builtins && (def.builtin || def.name.starts_with("__")) {
            return;
        }
        self.separate();
        self.description(def.description.as_deref());
        self.word(def.kind.keyword()).word(&def.name);

        for (idx, interface) in def.interfaces.iter().enumerate() {
            self.word(if idx == 0 { "implements" } else { "&" });
            self.word(interface);
        }

        self.print_directives(&def.directives);

        if def.kind == DefinitionKind::Union {
            for (idx, member) in def.types.iter().enumerate() {
                self.word(if idx == 0 { "=" } else { "|" });
                self.word(member);
            }
        }

        match def.kind {
            DefinitionKind::Enum => self.enum_values(&def.enum_values),
            _ => self.field_definitions(&def.fields),
        }

        self.newline();
    }

    fn field_definitions(&mut self, fields: &[FieldDefinition]) {
        let emit_builtins = self.emit_builtins;
        let visible: Vec<&FieldDefinition> = fields
            .iter()
            .filter(|field| emit_builtins || !field.name.starts_with("__"))
            .collect();
        if visible.is_empty() {
            return;
        }

        self.raw("{").newline();
        self.nested(|p| {
            for field in visible {
                p.print_field_definition(field);
            }
        });
        self.raw("}");
    }

    /// `name(args): Type = default @directives`, then a line break
    pub fn print_field_definition(&mut self, field: &FieldDefinition) {
        self.description(field.description.as_deref());
        self.word(&field.name).no_pad();
        self.argument_definitions(&field.arguments);
        self.colon();
        self.type_ref(&field.field_type);
        self.default_value(field.default_value.as_deref());
        self.print_directives(&field.directives);
        self.newline();
    }

    fn argument_definitions(&mut self, arguments: &[ArgumentDefinition]) {
        if arguments.is_empty() {
            return;
        }
        // a described argument opens an indented block; later arguments
        // stay comma-separated on its last line and `)` closes on its own line
        let mut block = false;
        self.raw("(");
        for (idx, argument) in arguments.iter().enumerate() {
            if idx > 0 {
                self.no_pad().word(",");
            }
            let described = argument
                .description
                .as_deref()
                .is_some_and(|text| !text.is_empty());
            if described {
                block = true;
                self.newline();
                self.nested(|p| {
                    p.description(argument.description.as_deref());
                    p.argument_definition(argument);
                });
            } else {
                self.argument_definition(argument);
            }
        }
        if block {
            self.newline();
        }
        self.no_pad().raw(")").need_pad();
    }

    fn argument_definition(&mut self, argument: &ArgumentDefinition) {
        self.word(&argument.name).colon();
        self.type_ref(&argument.value_type);
        self.default_value(argument.default_value.as_deref());
        self.print_directives(&argument.directives);
    }

    fn enum_values(&mut self, values: &[EnumValueDefinition]) {
        if values.is_empty() {
            return;
        }
        self.raw("{").newline();
        self.nested(|p| {
            for value in values {
                p.description(value.description.as_deref());
                p.word(&value.name);
                p.print_directives(&value.directives);
                p.newline();
            }
        });
        self.raw("}");
    }

    /// ` @name(args)` for each directive
    pub fn print_directives(&mut self, directives: &[Directive]) {
        for directive in directives {
            self.need_pad().raw("@").word(&directive.name);
            self.arguments(&directive.arguments);
        }
    }

    fn arguments(&mut self, arguments: &[Argument]) {
        if arguments.is_empty() {
            return;
        }
        self.no_pad().raw("(");
        for (idx, argument) in arguments.iter().enumerate() {
            if idx > 0 {
                self.no_pad().word(",");
            }
            self.word(&argument.name).colon().raw(&argument.value);
        }
        self.no_pad().raw(")").need_pad();
    }

    /// render operations, then fragments, in document order
    pub fn print_document(&mut self, document: &ExecutableDocument) {
        for op in &document.operations {
            self.print_operation(op);
        }
        for fragment in &document.fragments {
            self.print_fragment(fragment);
        }
    }

    /// `query Name($var: Type) @directives { ... }`
    pub fn print_operation(&mut self, op: &OperationDefinition) {
        self.separate();
        self.word(op.operation.as_str());
        if let Some(name) = &op.name {
            self.word(name).no_pad();
        }
        self.variable_definitions(&op.variables);
        self.print_directives(&op.directives);
        if !op.selection_set.is_empty() {
            self.need_pad();
            self.print_selection_set(&op.selection_set);
        }
        self.newline();
    }

    fn variable_definitions(&mut self, variables: &[VariableDefinition]) {
        if variables.is_empty() {
            return;
        }
        self.raw("(");
        for (idx, variable) in variables.iter().enumerate() {
            if idx > 0 {
                self.no_pad().word(",");
            }
            self.raw("$").word(&variable.name).colon();
            self.type_ref(&variable.var_type);
            self.default_value(variable.default_value.as_deref());
        }
        self.no_pad().raw(")").need_pad();
    }

    /// `fragment Name on Type @directives { ... }`
    pub fn print_fragment(&mut self, fragment: &FragmentDefinition) {
        self.separate();
        self.word("fragment").word(&fragment.name);
        self.word("on").word(&fragment.type_condition);
        self.print_directives(&fragment.directives);
        if !fragment.selection_set.is_empty() {
            self.print_selection_set(&fragment.selection_set);
        }
        self.newline();
    }

    /// `{`, one selection per line, `}`; nothing at all for an empty set
    pub fn print_selection_set(&mut self, set: &SelectionSet) {
        if set.is_empty() {
            return;
        }
        self.need_pad().raw("{").newline();
        self.nested(|p| {
            for selection in set.iter() {
                p.print_selection(selection);
                p.newline();
            }
        });
        self.raw("}");
    }

    pub fn print_selection(&mut self, selection: &Selection) {
        match selection {
            Selection::Field(field) => self.field(field),
            Selection::FragmentSpread(spread) => self.fragment_spread(spread),
            Selection::InlineFragment(inline) => self.inline_fragment(inline),
        }
    }

    fn field(&mut self, field: &Field) {
        if let Some(alias) = field.alias.as_deref().filter(|alias| *alias != field.name) {
            self.word(alias).colon();
        }
        self.word(&field.name);
        self.arguments(&field.arguments);
        self.print_directives(&field.directives);
        self.print_selection_set(&field.selection_set);
    }

    fn fragment_spread(&mut self, spread: &FragmentSpread) {
        self.raw("...").word(&spread.name);
        self.print_directives(&spread.directives);
    }

    fn inline_fragment(&mut self, inline: &InlineFragment) {
        self.word("...");
        if let Some(condition) = &inline.type_condition {
            self.word("on").word(condition);
        }
        self.print_directives(&inline.directives);
        self.print_selection_set(&inline.selection_set);
    }
}

/// canonical sdl for `schema`
pub fn print_schema(schema: &Schema, emit_builtins: bool) -> String {
    let mut printer = Printer::new().with_emit_builtins(emit_builtins);
    printer.print_schema(schema);
    printer.finish()
}

/// canonical text of a single operation
pub fn print_operation(op: &OperationDefinition) -> String {
    let mut printer = Printer::new();
    printer.print_operation(op);
    printer.finish()
}
