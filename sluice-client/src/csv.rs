//! Minimal CSV reading and writing for raw query output
//!
//! The query service writes every non-null column as a string, separated by
//! commas, quoting fields that contain commas, quotes or line breaks and
//! doubling embedded quotes.

use sluice_core::domain::results::RawRow;

use crate::error::{ClientError, Result};

/// Parses CSV text into records
///
/// Records end at `\n`, `\r\n` or a lone `\r` outside quotes. Blank lines
/// are skipped rather than returned as empty records, so the result holds
/// only rows the service actually wrote.
pub fn parse_records(input: &str) -> Result<Vec<RawRow>> {
    let mut records = Vec::new();
    let mut record: RawRow = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    // Set once the current line holds anything, so blank lines are skipped
    let mut dirty = false;

    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => {
                in_quotes = true;
                dirty = true;
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                dirty = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\r' | '\n' => {
                if dirty {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                    dirty = false;
                }
            }
            _ => {
                field.push(c);
                dirty = true;
            }
        }
    }

    if in_quotes {
        return Err(ClientError::ParseError(
            "Unterminated quoted field in CSV output".to_string(),
        ));
    }

    if dirty {
        record.push(field);
        records.push(record);
    }

    Ok(records)
}

/// Formats one record as a CSV line, without the trailing newline
pub fn format_record<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| format_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Quote a field if it contains a separator, quote or line break
fn format_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r')
    {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
