//! Control-command generation
//!
//! [`CommandGenerator`] is the seam between the sync engine and whatever
//! knows the engine's command syntax. [`CslCommandGenerator`] is a pure
//! implementation for Kusto-style `.create-or-alter` / `.drop` commands.
//! Output is deterministic: the same definition always renders to the same
//! bytes, which is what makes repeated pushes idempotent on disk.

use crate::model::{FunctionDefinition, ObjectKind, Parameter, SchemaObject, TableDefinition};

/// Renders schema objects into command text.
pub trait CommandGenerator: Send + Sync {
    /// Render the command that creates the object or replaces its definition.
    ///
    /// `use_legacy` selects the conservative form: every identifier is
    /// bracket-quoted and function bodies skip server-side validation.
    fn create_or_alter(&self, object: &SchemaObject, use_legacy: bool) -> String;

    /// Render the command that drops the named object.
    fn drop_command(&self, kind: ObjectKind, name: &str) -> String;
}

/// Kusto control-command generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct CslCommandGenerator;

impl CslCommandGenerator {
    pub fn new() -> Self {
        Self
    }

    fn table_command(&self, table: &TableDefinition, use_legacy: bool) -> String {
        let columns = table
            .columns
            .iter()
            .map(|c| format!("{}:{}", quote_identifier(&c.name, use_legacy), c.data_type))
            .collect::<Vec<_>>()
            .join(", ");

        let mut command = format!(
            ".create-merge table {} ({})",
            quote_identifier(&table.name, use_legacy),
            columns
        );

        let properties = with_properties(&table.folder, &table.docstring, false);
        if !properties.is_empty() {
            command.push_str(&format!(" with ({})", properties));
        }
        command
    }

    fn function_command(&self, function: &FunctionDefinition, use_legacy: bool) -> String {
        let mut command = String::from(".create-or-alter function");

        let properties = with_properties(&function.folder, &function.docstring, use_legacy);
        if !properties.is_empty() {
            command.push_str(&format!(" with ({})", properties));
        }

        let parameters = function
            .parameters
            .iter()
            .map(|p| render_parameter(p, use_legacy))
            .collect::<Vec<_>>()
            .join(", ");

        command.push_str(&format!(
            " {}({}) {{\n{}\n}}",
            quote_identifier(&function.name, use_legacy),
            parameters,
            function.body.trim()
        ));
        command
    }
}

impl CommandGenerator for CslCommandGenerator {
    fn create_or_alter(&self, object: &SchemaObject, use_legacy: bool) -> String {
        match object {
            SchemaObject::Table(table) => self.table_command(table, use_legacy),
            SchemaObject::Function(function) => self.function_command(function, use_legacy),
        }
    }

    fn drop_command(&self, kind: ObjectKind, name: &str) -> String {
        format!(
            ".drop {} {} ifexists",
            kind.keyword(),
            quote_identifier(name, false)
        )
    }
}

fn render_parameter(parameter: &Parameter, use_legacy: bool) -> String {
    let mut rendered = format!(
        "{}:{}",
        quote_identifier(&parameter.name, use_legacy),
        parameter.data_type
    );
    if let Some(default) = &parameter.default {
        rendered.push_str(&format!(" = {}", default));
    }
    rendered
}

fn with_properties(folder: &str, docstring: &str, skip_validation: bool) -> String {
    let mut properties = Vec::new();
    if !folder.is_empty() {
        properties.push(format!("folder = {}", quote_string(folder)));
    }
    if !docstring.is_empty() {
        properties.push(format!("docstring = {}", quote_string(docstring)));
    }
    if skip_validation {
        properties.push("skipvalidation = \"true\"".to_string());
    }
    properties.join(", ")
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Quote an identifier as `['name']` when required (or always, in legacy form).
fn quote_identifier(name: &str, always: bool) -> String {
    if !always && is_plain_identifier(name) {
        return name.to_string();
    }
    let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
    format!("['{}']", escaped)
}

fn quote_string(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}
