//! Constants and enums for definition tree paths.

/// File extension used for every definition file.
pub const DEFINITION_EXTENSION: &str = "csl";

/// Top-level directories of a definition tree, one per object kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SchemaDir {
    /// The `Tables` directory
    Tables,
    /// The `Functions` directory
    Functions,
}

impl SchemaDir {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tables => "Tables",
            Self::Functions => "Functions",
        }
    }
}

impl std::fmt::Display for SchemaDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
