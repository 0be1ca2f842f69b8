use std::collections::HashSet;

/// Column data type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    /// Short variable-length text
    Varchar,
    /// Free text (Redshift `text`, an alias of `varchar(256)`)
    Text,
    /// Unbounded text (Redshift `varchar(max)`)
    LongText,
    /// Fixed-width text
    Char(u16),
    Timestamp,
    /// System-generated monotonic surrogate key
    Identity,
}

/// Column definition
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub col_type: ColumnType,
    pub nullable: bool,
}

impl Column {
    /// Create an optional (nullable) column
    pub const fn new(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: true,
        }
    }

    /// Create a required (non-nullable) column
    pub const fn required(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: false,
        }
    }
}

/// Where a relation sits in the warehouse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRole {
    /// Unconstrained landing table filled by bulk copy
    Staging,
    Fact,
    Dimension,
}

impl std::fmt::Display for TableRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableRole::Staging => write!(f, "staging"),
            TableRole::Fact => write!(f, "fact"),
            TableRole::Dimension => write!(f, "dimension"),
        }
    }
}

/// Table schema definition
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    pub role: TableRole,
    pub columns: &'static [Column],
    /// Staging tables never carry a key
    pub primary_key: Option<&'static str>,
    /// Relations this table is populated from
    pub sources: &'static [&'static str],
}

impl TableSchema {
    /// Get all tables this table reads from when populated
    pub fn dependencies(&self) -> HashSet<&'static str> {
        self.sources.iter().copied().collect()
    }

    /// Columns a bulk load or insert-select writes (everything but identity keys)
    pub fn insertable_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| c.col_type != ColumnType::Identity)
            .collect()
    }
}
