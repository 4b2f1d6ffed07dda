//! Result set domain types

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A typed result row, one value per column
pub type Row = Vec<Value>;

/// A result row as read from the raw CSV output, one string per field
pub type RawRow = Vec<String>;

/// Column schema entry reported alongside result rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "Type")]
    pub column_type: String,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
        }
    }
}

/// One page of results from the query service's paging API
///
/// Fields are kept as the service's string representation; `None` marks a
/// field the service left without a value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultPage {
    pub rows: Vec<Vec<Option<String>>>,
    pub columns: Vec<ColumnInfo>,
    pub next_token: Option<String>,
}

/// A typed scalar coerced from the service's string representation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::String(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.f")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(Value::String("hello".into()).to_string(), "hello");

        let date = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();
        assert_eq!(Value::Date(date).to_string(), "2001-01-01");
    }

    #[test]
    fn test_value_serializes_untagged() {
        let row: Row = vec![Value::Null, Value::Integer(1), Value::String("a".into())];
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"[null,1,"a"]"#);
    }
}
