use serde_json::Value;
use std::borrow::Cow;

use super::jsonpath::ColumnPath;
use crate::schema::{Column, ColumnType, TableSchema};

/// A parsed row ready for insertion, one value per insertable column
pub struct ParsedRow {
    pub values: Vec<SqlValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    pub fn bind_to(&self, idx: usize, stmt: &mut rusqlite::Statement) -> rusqlite::Result<()> {
        match self {
            SqlValue::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null)?,
            SqlValue::Integer(i) => stmt.raw_bind_parameter(idx, i)?,
            SqlValue::Real(f) => stmt.raw_bind_parameter(idx, f)?,
            SqlValue::Text(s) => stmt.raw_bind_parameter(idx, s.as_str())?,
        }
        Ok(())
    }
}

/// How a JSON record is mapped onto the table's columns
pub enum RecordMapper {
    /// The i-th path fills the i-th column
    JsonPaths(Vec<ColumnPath>),
    /// Top-level keys named like the columns
    Auto { ignore_case: bool },
}

impl RecordMapper {
    /// Check the mapper fits the table before any record is read
    pub fn check(&self, schema: &TableSchema) -> Result<(), String> {
        if let RecordMapper::JsonPaths(paths) = self {
            let expected = schema.insertable_columns().len();
            if paths.len() != expected {
                return Err(format!(
                    "JSONPaths descriptor has {} paths but {} has {} columns",
                    paths.len(),
                    schema.name,
                    expected
                ));
            }
        }
        Ok(())
    }

    fn lookup<'a>(
        &self,
        record: &'a Value,
        index: usize,
        column: &Column,
    ) -> Option<Cow<'a, Value>> {
        match self {
            RecordMapper::JsonPaths(paths) => paths
                .get(index)
                .and_then(|p| p.resolve(record))
                .map(Cow::Owned),
            RecordMapper::Auto { ignore_case: false } => record.get(column.name).map(Cow::Borrowed),
            RecordMapper::Auto { ignore_case: true } => record
                .as_object()?
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(column.name))
                .map(|(_, value)| Cow::Borrowed(value)),
        }
    }
}

/// Map one JSON record onto a row for the given table schema
pub fn parse_record(
    record: &Value,
    schema: &TableSchema,
    mapper: &RecordMapper,
) -> Result<ParsedRow, String> {
    if !record.is_object() {
        return Err("record is not a JSON object".to_string());
    }

    let values = schema
        .insertable_columns()
        .into_iter()
        .enumerate()
        .map(|(index, column)| {
            let raw = mapper.lookup(record, index, column);
            extract_value(raw.as_deref(), column.col_type)
                .map_err(|e| format!("column {}: {}", column.name, e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ParsedRow { values })
}

/// Coerce a JSON value to a column type the way a warehouse COPY does:
/// numbers load into text columns, numeric strings into numeric columns,
/// and empty strings into numeric columns become NULL.
fn extract_value(val: Option<&Value>, col_type: ColumnType) -> Result<SqlValue, String> {
    let v = match val {
        None | Some(Value::Null) => return Ok(SqlValue::Null),
        Some(v) => v,
    };

    match col_type {
        ColumnType::Integer | ColumnType::Identity => match v {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .map(SqlValue::Integer)
                .ok_or_else(|| format!("{} is not an integer", n)),
            Value::String(s) if s.trim().is_empty() => Ok(SqlValue::Null),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(SqlValue::Integer)
                .map_err(|_| format!("'{}' is not an integer", s)),
            other => Err(format!("{} is not an integer", other)),
        },
        ColumnType::Real => match v {
            Value::Number(n) => n
                .as_f64()
                .map(SqlValue::Real)
                .ok_or_else(|| format!("{} is not a number", n)),
            Value::String(s) if s.trim().is_empty() => Ok(SqlValue::Null),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(SqlValue::Real)
                .map_err(|_| format!("'{}' is not a number", s)),
            other => Err(format!("{} is not a number", other)),
        },
        ColumnType::Char(width) => {
            let text = text_of(v);
            if text.chars().count() > width as usize {
                return Err(format!("'{}' is wider than char({})", text, width));
            }
            Ok(SqlValue::Text(text))
        }
        ColumnType::Varchar | ColumnType::Text | ColumnType::LongText | ColumnType::Timestamp => {
            Ok(SqlValue::Text(text_of(v)))
        }
    }
}

fn text_of(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{STAGING_EVENTS, STAGING_SONGS};
    use serde_json::json;

    #[test]
    fn test_auto_ignore_case() {
        let record = json!({
            "Song_ID": "SOUPIRU12A6D4FA1E1",
            "title": "Der Kleine Dompfaff",
            "year": 0,
            "duration": 152.92036,
            "artist_latitude": null
        });
        let row = parse_record(&record, &STAGING_SONGS, &RecordMapper::Auto { ignore_case: true })
            .unwrap();
        let names: Vec<_> = STAGING_SONGS.columns.iter().map(|c| c.name).collect();
        let song_id = names.iter().position(|&n| n == "song_id").unwrap();

        assert_eq!(row.values[song_id], SqlValue::Text("SOUPIRU12A6D4FA1E1".to_string()));
        assert_eq!(row.values.len(), names.len());

        let strict = parse_record(&record, &STAGING_SONGS, &RecordMapper::Auto { ignore_case: false })
            .unwrap();
        assert_eq!(strict.values[song_id], SqlValue::Null);
    }

    #[test]
    fn test_event_coercion() {
        assert_eq!(
            extract_value(Some(&json!(1541903636796u64)), ColumnType::Varchar).unwrap(),
            SqlValue::Text("1541903636796".to_string())
        );
        assert_eq!(
            extract_value(Some(&json!("")), ColumnType::Integer).unwrap(),
            SqlValue::Null
        );
        assert_eq!(
            extract_value(Some(&json!("39")), ColumnType::Integer).unwrap(),
            SqlValue::Integer(39)
        );
        assert_eq!(
            extract_value(Some(&json!(200)), ColumnType::Real).unwrap(),
            SqlValue::Real(200.0)
        );
    }

    #[test]
    fn test_bad_values_fail() {
        assert!(extract_value(Some(&json!("abc")), ColumnType::Integer).is_err());
        assert!(extract_value(Some(&json!(1.5)), ColumnType::Integer).is_err());
        assert!(extract_value(Some(&json!("MF")), ColumnType::Char(1)).is_err());
        assert!(parse_record(&json!([1, 2]), &STAGING_EVENTS, &RecordMapper::Auto { ignore_case: true }).is_err());
    }

    #[test]
    fn test_jsonpaths_count_must_match() {
        let mapper = RecordMapper::JsonPaths(vec![ColumnPath::parse("$.artist").unwrap()]);
        assert!(mapper.check(&STAGING_EVENTS).is_err());
    }
}
