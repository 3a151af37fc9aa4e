//! Schema object data model
//!
//! A [`SchemaObject`] is rebuilt on every sync pass from whichever side is
//! the source of truth. It carries no identity beyond its name: a rename is
//! a delete of the old name plus a create of the new one.

use std::fmt;
use std::str::FromStr;

use csl_fs::SchemaDir;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The kind of a schema object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Table,
    Function,
}

impl ObjectKind {
    /// Every kind, in the order definition trees are scanned.
    pub const ALL: [ObjectKind; 2] = [ObjectKind::Table, ObjectKind::Function];

    /// The top-level directory holding definitions of this kind.
    pub fn schema_dir(&self) -> SchemaDir {
        match self {
            ObjectKind::Table => SchemaDir::Tables,
            ObjectKind::Function => SchemaDir::Functions,
        }
    }

    /// The keyword used in control commands (`table`, `function`).
    pub fn keyword(&self) -> &'static str {
        match self {
            ObjectKind::Table => "table",
            ObjectKind::Function => "function",
        }
    }
}

impl FromStr for ObjectKind {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "tables" => Ok(ObjectKind::Table),
            "function" | "functions" => Ok(ObjectKind::Function),
            _ => Err(Error::UnknownKind {
                kind: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A single table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Engine type name, e.g. `string`, `long`, `datetime`
    pub data_type: String,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// A table definition.
///
/// The column list is opaque to the sync engine; it only flows through to
/// the command generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub docstring: String,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            folder: String::new(),
            docstring: String::new(),
            columns: Vec::new(),
        }
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = docstring.into();
        self
    }

    pub fn with_column(mut self, name: impl Into<String>, data_type: impl Into<String>) -> Self {
        self.columns.push(Column::new(name, data_type));
        self
    }
}

/// A function parameter, e.g. `since:datetime = ago(1d)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// Scalar type name or tabular schema such as `(*)`
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// A stored function definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub docstring: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Query text, opaque to the sync engine
    pub body: String,
}

impl FunctionDefinition {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            folder: String::new(),
            docstring: String::new(),
            parameters: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = docstring.into();
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }
}

/// A table or function, as seen by the sync engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SchemaObject {
    Table(TableDefinition),
    Function(FunctionDefinition),
}

impl SchemaObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            SchemaObject::Table(_) => ObjectKind::Table,
            SchemaObject::Function(_) => ObjectKind::Function,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SchemaObject::Table(t) => &t.name,
            SchemaObject::Function(f) => &f.name,
        }
    }

    /// The logical folder, possibly empty and possibly containing characters
    /// that are invalid in a path.
    pub fn folder(&self) -> &str {
        match self {
            SchemaObject::Table(t) => &t.folder,
            SchemaObject::Function(f) => &f.folder,
        }
    }
}

impl From<TableDefinition> for SchemaObject {
    fn from(table: TableDefinition) -> Self {
        SchemaObject::Table(table)
    }
}

impl From<FunctionDefinition> for SchemaObject {
    fn from(function: FunctionDefinition) -> Self {
        SchemaObject::Function(function)
    }
}
