//! CanvasL line records
//!
//! A CanvasL stream carries one JSON object per line. Lines that fail to
//! decode (comments, formatting lines, truncated writes) are dropped
//! silently; an empty or fully malformed stream simply yields no records.

use serde::Serialize;
use serde_json::{Map, Value};
use std::str::Lines;
use tracing::trace;

/// One decoded line of a CanvasL stream
///
/// No schema is enforced. The fields the projector relies on are exposed
/// through typed accessors; everything else stays reachable via [`Record::get`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Wrap an already-decoded JSON object
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Decode a single line, returning `None` unless it is a JSON object
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(fields)) => Some(Self { fields }),
            Ok(other) => {
                trace!(kind = value_kind(&other), "Dropping non-object line");
                None
            }
            Err(e) => {
                trace!(error = %e, "Dropping undecodable line");
                None
            }
        }
    }

    /// Raw field access; `null` reads as absent
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    /// Whether the field is present and not `null`
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Record identifier
    pub fn id(&self) -> Option<String> {
        self.identifier("id")
    }

    /// Declared record type ("node", "edge", "subgraph", ...)
    pub fn record_type(&self) -> Option<&str> {
        self.get("type").and_then(Value::as_str)
    }

    /// Display label
    pub fn label(&self) -> Option<&str> {
        self.get("label").and_then(Value::as_str)
    }

    /// Raw color value, parsed by [`crate::color::parse_color`]
    pub fn color(&self) -> Option<&Value> {
        self.get("color")
    }

    /// Canvas x coordinate
    pub fn x(&self) -> Option<f64> {
        self.get("x").and_then(Value::as_f64)
    }

    /// Canvas y coordinate
    pub fn y(&self) -> Option<f64> {
        self.get("y").and_then(Value::as_f64)
    }

    /// Edge source identifier
    pub fn from(&self) -> Option<String> {
        self.identifier("from")
    }

    /// Edge target identifier
    pub fn to(&self) -> Option<String> {
        self.identifier("to")
    }

    /// Underlying JSON object
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    fn identifier(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Lazy iterator over the records of a CanvasL text blob
///
/// Restartable only by calling [`parse_records`] again.
pub struct Records<'a> {
    lines: Lines<'a>,
    dropped: usize,
}

impl Records<'_> {
    /// Number of non-blank lines dropped so far
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl Iterator for Records<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        for line in self.lines.by_ref() {
            if line.trim().is_empty() {
                continue;
            }
            match Record::parse_line(line) {
                Some(record) => return Some(record),
                None => self.dropped += 1,
            }
        }
        None
    }
}

/// Split `text` into records, one per decodable line
pub fn parse_records(text: &str) -> Records<'_> {
    Records {
        lines: text.lines(),
        dropped: 0,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_records() {
        let text = "{\"id\":\"a\",\"x\":1}\n{\"from\":\"a\",\"to\":\"b\"}\n";
        let records: Vec<_> = parse_records(text).collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id().as_deref(), Some("a"));
        assert_eq!(records[1].from().as_deref(), Some("a"));
        assert_eq!(records[1].to().as_deref(), Some("b"));
    }

    #[test]
    fn test_malformed_lines_are_dropped() {
        let text = "# a comment\n{\"id\":\"a\"}\n{not json\n[1,2]\n42\n\n   \n{\"id\":\"b\"}";
        let mut records = parse_records(text);
        let ids: Vec<_> = records.by_ref().filter_map(|r| r.id()).collect();

        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(records.dropped(), 4);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_records("").count(), 0);
        assert_eq!(parse_records("\n\n").count(), 0);
        assert_eq!(parse_records("garbage\nmore garbage").count(), 0);
    }

    #[test]
    fn test_crlf_lines() {
        let records: Vec<_> = parse_records("{\"id\":\"a\"}\r\n{\"id\":\"b\"}\r\n").collect();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_null_fields_read_as_absent() {
        let record = Record::parse_line("{\"id\":null,\"x\":null,\"from\":\"n\"}").unwrap();
        assert!(record.id().is_none());
        assert!(record.x().is_none());
        assert!(!record.has("id"));
        assert!(record.has("from"));
    }

    #[test]
    fn test_numeric_identifiers() {
        let record = Record::parse_line("{\"id\":7,\"from\":1.5}").unwrap();
        assert_eq!(record.id().as_deref(), Some("7"));
        assert_eq!(record.from().as_deref(), Some("1.5"));
    }

    #[test]
    fn test_non_numeric_coordinates() {
        let record = Record::parse_line("{\"x\":\"30\",\"y\":20}").unwrap();
        assert!(record.x().is_none());
        assert_eq!(record.y(), Some(20.0));
    }
}
