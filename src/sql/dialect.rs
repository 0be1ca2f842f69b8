use crate::schema::ColumnType;
use std::str::FromStr;

/// SQL flavor statements are rendered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Production warehouse
    #[default]
    Redshift,
    /// Local single-file warehouse
    Sqlite,
}

impl Dialect {
    /// Column type as it appears in CREATE TABLE
    pub fn column_type(&self, col_type: ColumnType) -> String {
        match self {
            Dialect::Redshift => match col_type {
                ColumnType::Integer => "int".to_string(),
                ColumnType::Real => "float".to_string(),
                ColumnType::Varchar => "varchar".to_string(),
                ColumnType::Text => "text".to_string(),
                ColumnType::LongText => "varchar(max)".to_string(),
                ColumnType::Char(width) => format!("char({})", width),
                ColumnType::Timestamp => "timestamp".to_string(),
                ColumnType::Identity => "INT IDENTITY(1, 1)".to_string(),
            },
            Dialect::Sqlite => match col_type {
                ColumnType::Integer | ColumnType::Identity => "INTEGER".to_string(),
                ColumnType::Real => "REAL".to_string(),
                ColumnType::Varchar
                | ColumnType::Text
                | ColumnType::LongText
                | ColumnType::Char(_)
                | ColumnType::Timestamp => "TEXT".to_string(),
            },
        }
    }

    /// Expression turning the raw epoch-millisecond `ts` token into a timestamp
    pub fn epoch_millis_to_timestamp(&self, expr: &str) -> String {
        match self {
            Dialect::Redshift => format!(
                "TIMESTAMP 'epoch' + CAST({} AS BIGINT) * INTERVAL '0.001 second'",
                expr
            ),
            Dialect::Sqlite => format!(
                "strftime('%Y-%m-%d %H:%M:%f', CAST({} AS INTEGER) / 1000.0, 'unixepoch')",
                expr
            ),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::Redshift => write!(f, "redshift"),
            Dialect::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redshift" => Ok(Dialect::Redshift),
            "sqlite" => Ok(Dialect::Sqlite),
            other => Err(format!("Unknown dialect: {}", other)),
        }
    }
}

/// Quote a value as a SQL string literal
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_types() {
        assert_eq!(
            Dialect::Redshift.column_type(ColumnType::LongText),
            "varchar(max)"
        );
        assert_eq!(Dialect::Redshift.column_type(ColumnType::Char(1)), "char(1)");
        assert_eq!(Dialect::Sqlite.column_type(ColumnType::Timestamp), "TEXT");
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("s3://bucket/log_data"), "'s3://bucket/log_data'");
        assert_eq!(quote_literal("it's"), "'it''s'");
    }

    #[test]
    fn test_parse_dialect() {
        assert_eq!("Redshift".parse::<Dialect>().unwrap(), Dialect::Redshift);
        assert_eq!("sqlite".parse::<Dialect>().unwrap(), Dialect::Sqlite);
        assert!("oracle".parse::<Dialect>().is_err());
    }
}
