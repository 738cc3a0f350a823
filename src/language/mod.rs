//! Language handles
//!
//! A [`Language`] pairs a name with an immutable parse table. It is the
//! stable handle a host binding holds on to: cheap to clone, `Send + Sync`,
//! and every tree records the language it was parsed with.

pub mod registry;

use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::error::Result;
use crate::parser::SyntaxKind;
use crate::table::{FieldId, ParseTable, TABLE_FORMAT_VERSION};

#[derive(Clone)]
pub struct Language {
    name: SmolStr,
    table: Arc<ParseTable>,
}

impl Language {
    pub fn new(name: impl Into<SmolStr>, table: ParseTable) -> Self {
        Self::from_shared(name, Arc::new(table))
    }

    pub fn from_shared(name: impl Into<SmolStr>, table: Arc<ParseTable>) -> Self {
        Self {
            name: name.into(),
            table,
        }
    }

    /// Load a language from a table artifact, named after its grammar
    pub fn from_artifact(bytes: &[u8]) -> Result<Self> {
        let table = ParseTable::from_bytes(bytes)?;
        Ok(Self::new(table.name().to_owned(), table))
    }

    /// Human-readable name, e.g. `"thorn"`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version of the table format this language was built for
    pub fn version(&self) -> u16 {
        TABLE_FORMAT_VERSION
    }

    pub fn table(&self) -> &Arc<ParseTable> {
        &self.table
    }

    pub fn state_count(&self) -> u32 {
        self.table.state_count()
    }

    pub fn field_count(&self) -> usize {
        self.table.field_count()
    }

    pub fn field_id(&self, name: &str) -> Option<FieldId> {
        self.table.field_id(name)
    }

    pub fn field_name(&self, id: FieldId) -> Option<&str> {
        self.table.field_name(id)
    }

    pub fn kind_name(&self, kind: SyntaxKind) -> &'static str {
        kind.name()
    }

    /// Serialize the table into an artifact [`Language::from_artifact`] reads back
    pub fn to_artifact(&self) -> Vec<u8> {
        self.table.to_bytes()
    }
}

impl PartialEq for Language {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && (Arc::ptr_eq(&self.table, &other.table) || self.table == other.table)
    }
}

impl Eq for Language {}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("name", &self.name)
            .field("version", &self.version())
            .field("states", &self.table.state_count())
            .finish()
    }
}
