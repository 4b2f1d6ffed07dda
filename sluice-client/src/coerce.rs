//! Type coercion for paginated result values
//!
//! The query service returns every field as a string and describes each
//! column with a declared type name. Coercion maps the pair onto a [`Value`].

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use sluice_core::domain::results::{ColumnInfo, Row, Value};

use crate::error::{ClientError, Result};

/// Date-time layouts tried in order after RFC 3339
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f", // 2001-01-01 00:00:00.001
    "%Y-%m-%dT%H:%M:%S%.f", // 2001-01-01T00:00:00.001
    "%Y-%m-%d %H:%M",       // 2001-01-01 00:00
    "%Y-%m-%dT%H:%M",       // 2001-01-01T00:00
    "%Y/%m/%d %H:%M:%S%.f", // 2001/01/01 00:00:00
];

/// Date-time layouts carrying an offset; parsed values are normalized to UTC
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f %z", // 2001-01-01 00:00:00.001 +0200
    "%Y-%m-%d %H:%M:%S%.f%:z", // 2001-01-01 00:00:00.001+02:00
];

/// Date-only layouts; parsed values land at midnight
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", // 2001-01-01
    "%Y/%m/%d", // 2001/01/01
    "%m/%d/%Y", // 01/31/2001
];

/// Coerces a whole row against its column schema
pub fn coerce_row(values: &[Option<String>], columns: &[ColumnInfo]) -> Result<Row> {
    if values.len() != columns.len() {
        return Err(ClientError::ParseError(format!(
            "Row has {} fields but the result set has {} columns",
            values.len(),
            columns.len()
        )));
    }

    values
        .iter()
        .zip(columns)
        .map(|(value, column)| coerce_value(value.as_deref(), column))
        .collect()
}

/// Coerces a single field according to its column's declared type
///
/// Absent and empty values are `Null` for every type. Unknown types pass the
/// string through unchanged.
pub fn coerce_value(value: Option<&str>, column: &ColumnInfo) -> Result<Value> {
    let raw = match value {
        None | Some("") => return Ok(Value::Null),
        Some(raw) => raw,
    };

    let invalid = || ClientError::InvalidValue {
        column: column.name.clone(),
        column_type: column.column_type.clone(),
        value: raw.to_string(),
    };

    let value = match column.column_type.to_ascii_lowercase().as_str() {
        "boolean" => Value::Boolean(raw == "true"),
        "tinyint" | "smallint" | "int" | "integer" | "bigint" => {
            Value::Integer(raw.trim().parse::<i64>().map_err(|_| invalid())?)
        }
        "double" | "real" | "decimal" => {
            Value::Float(raw.trim().parse::<f64>().map_err(|_| invalid())?)
        }
        "char" | "varchar" | "string" => Value::String(raw.to_string()),
        "date" => Value::Date(parse_date(raw).ok_or_else(invalid)?),
        "timestamp" => Value::Timestamp(parse_datetime(raw).ok_or_else(invalid)?),
        _ => Value::String(raw.to_string()),
    };

    Ok(value)
}

/// A parsed value both as written and normalized to UTC
///
/// The two differ only when the input carried an offset.
#[derive(Debug, Clone, Copy)]
struct ParsedDateTime {
    local: NaiveDateTime,
    utc: NaiveDateTime,
}

impl ParsedDateTime {
    fn naive(datetime: NaiveDateTime) -> Self {
        Self {
            local: datetime,
            utc: datetime,
        }
    }

    fn zoned(datetime: DateTime<FixedOffset>) -> Self {
        Self {
            local: datetime.naive_local(),
            utc: datetime.naive_utc(),
        }
    }
}

fn parse_flexible(input: &str) -> Option<ParsedDateTime> {
    let input = input.trim();

    if let Ok(datetime) = DateTime::parse_from_rfc3339(input) {
        return Some(ParsedDateTime::zoned(datetime));
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(input, format) {
            return Some(ParsedDateTime::naive(datetime));
        }
    }

    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(datetime) = DateTime::parse_from_str(input, format) {
            return Some(ParsedDateTime::zoned(datetime));
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(ParsedDateTime::naive)
}

/// Parses a date or date-time written in any of the common layouts
///
/// Values carrying an offset are normalized to UTC.
pub fn parse_datetime(input: &str) -> Option<NaiveDateTime> {
    parse_flexible(input).map(|parsed| parsed.utc)
}

/// Parses the calendar date of a date or date-time
///
/// The date is the one written in the input, even when an offset is present.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    parse_flexible(input).map(|parsed| parsed.local.date())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TYPES: &[&str] = &[
        "boolean",
        "tinyint",
        "smallint",
        "int",
        "integer",
        "bigint",
        "double",
        "real",
        "decimal",
        "char",
        "varchar",
        "string",
        "date",
        "timestamp",
    ];

    fn coerce(column_type: &str, value: &str) -> Value {
        coerce_value(Some(value), &ColumnInfo::new("column_name", column_type)).unwrap()
    }

    #[test]
    fn test_null_for_every_type() {
        for column_type in ALL_TYPES {
            let column = ColumnInfo::new("column_name", *column_type);
            assert_eq!(coerce_value(None, &column).unwrap(), Value::Null, "{}", column_type);
            assert_eq!(coerce_value(Some(""), &column).unwrap(), Value::Null, "{}", column_type);
        }
    }

    #[test]
    fn test_boolean() {
        assert_eq!(coerce("boolean", "true"), Value::Boolean(true));
        assert_eq!(coerce("boolean", "false"), Value::Boolean(false));
        assert_eq!(coerce("boolean", "TRUE"), Value::Boolean(false));
        assert_eq!(coerce("boolean", "yes"), Value::Boolean(false));
    }

    #[test]
    fn test_integer_family() {
        for column_type in ["tinyint", "smallint", "int", "integer", "bigint"] {
            assert_eq!(coerce(column_type, "1"), Value::Integer(1));
        }
        assert_eq!(coerce("bigint", "-9007199254740993"), Value::Integer(-9007199254740993));
    }

    #[test]
    fn test_real_family() {
        assert_eq!(coerce("double", "1.0"), Value::Float(1.0));
        assert_eq!(coerce("real", "1.0"), Value::Float(1.0));
        assert_eq!(coerce("decimal", "1.0"), Value::Float(1.0));
        assert_eq!(coerce("decimal", "1.00"), Value::Float(1.0));
    }

    #[test]
    fn test_string_family_and_unknown_types() {
        for column_type in ["char", "varchar", "string", "array<int>", "map"] {
            assert_eq!(coerce(column_type, "hello"), Value::String("hello".into()));
        }
    }

    #[test]
    fn test_date() {
        let expected = Value::Date(NaiveDate::from_ymd_opt(2001, 1, 1).unwrap());
        assert_eq!(coerce("date", "2001-01-01"), expected);
        assert_eq!(coerce("date", "2001-01-01 13:45:00"), expected);
    }

    #[test]
    fn test_date_keeps_written_day_with_offset() {
        let expected = Value::Date(NaiveDate::from_ymd_opt(2001, 1, 1).unwrap());
        assert_eq!(coerce("date", "2001-01-01T23:30:00-05:00"), expected);
        assert_eq!(coerce("date", "2001-01-01T00:30:00+02:00"), expected);
        assert_eq!(coerce("date", "2001-01-01 23:30:00 -0500"), expected);
    }

    #[test]
    fn test_timestamp_with_offset_is_utc() {
        let expected = NaiveDate::from_ymd_opt(2001, 1, 2)
            .unwrap()
            .and_hms_opt(4, 30, 0)
            .unwrap();
        assert_eq!(
            coerce("timestamp", "2001-01-01T23:30:00-05:00"),
            Value::Timestamp(expected)
        );
    }

    #[test]
    fn test_timestamp() {
        let expected = NaiveDate::from_ymd_opt(2001, 1, 1)
            .unwrap()
            .and_hms_milli_opt(0, 0, 0, 1)
            .unwrap();
        assert_eq!(
            coerce("timestamp", "2001-01-01 00:00:00.001"),
            Value::Timestamp(expected)
        );
    }

    #[test]
    fn test_type_names_are_case_insensitive() {
        assert_eq!(coerce("BIGINT", "7"), Value::Integer(7));
    }

    #[test]
    fn test_invalid_integer() {
        let err = coerce_value(Some("abc"), &ColumnInfo::new("n", "integer")).unwrap_err();
        assert!(matches!(err, ClientError::InvalidValue { .. }));
    }

    #[test]
    fn test_parse_datetime_layouts() {
        let midnight = NaiveDate::from_ymd_opt(2001, 1, 31)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_datetime("2001-01-31"), Some(midnight));
        assert_eq!(parse_datetime("2001/01/31"), Some(midnight));
        assert_eq!(parse_datetime("01/31/2001"), Some(midnight));
        assert_eq!(parse_datetime("2001-01-31T00:00:00Z"), Some(midnight));
        assert_eq!(parse_datetime("2001-01-31T02:00:00+02:00"), Some(midnight));
        assert_eq!(parse_datetime("2001-01-31 00:00"), Some(midnight));
        assert_eq!(parse_datetime("not a date"), None);
    }

    #[test]
    fn test_coerce_row_arity_mismatch() {
        let columns = vec![ColumnInfo::new("a", "integer")];
        let values = vec![Some("1".to_string()), Some("2".to_string())];
        assert!(coerce_row(&values, &columns).is_err());
    }
}
