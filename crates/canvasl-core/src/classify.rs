//! Record classification
//!
//! CanvasL has no mandatory discriminant, so intent is read from field
//! presence. Precedence is Node first: a record that carries an `id` is a
//! node even when it also has `from` or declares itself a subgraph.

use crate::record::Record;
use serde::{Deserialize, Serialize};

/// What a record turns into in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Rendered as a sphere
    Node,
    /// Rendered as a line segment
    Edge,
    /// Metadata; produces nothing
    Ignored,
}

impl RecordKind {
    /// Whether this kind produces a scene entity
    pub fn is_renderable(self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// Classify a single record. Total and side-effect free.
pub fn classify(record: &Record) -> RecordKind {
    if record.record_type() == Some("node") || record.has("id") {
        RecordKind::Node
    } else if record.record_type() == Some("edge") || record.has("from") {
        RecordKind::Edge
    } else {
        RecordKind::Ignored
    }
}

/// Pair each record with its kind, preserving arrival order
pub fn classify_all<I>(records: I) -> impl Iterator<Item = (Record, RecordKind)>
where
    I: IntoIterator<Item = Record>,
{
    records.into_iter().map(|record| {
        let kind = classify(&record);
        (record, kind)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(line: &str) -> RecordKind {
        classify(&Record::parse_line(line).unwrap())
    }

    #[test]
    fn test_node_by_type() {
        assert_eq!(kind_of(r#"{"type":"node"}"#), RecordKind::Node);
    }

    #[test]
    fn test_node_by_id() {
        assert_eq!(kind_of(r#"{"id":"x"}"#), RecordKind::Node);
        assert_eq!(
            kind_of(r#"{"id":"use-cases","type":"subgraph","label":"Use Cases"}"#),
            RecordKind::Node
        );
    }

    #[test]
    fn test_id_wins_over_edge_fields() {
        assert_eq!(kind_of(r#"{"id":"e1","from":"a","to":"b"}"#), RecordKind::Node);
        assert_eq!(kind_of(r#"{"id":"e1","type":"edge"}"#), RecordKind::Node);
    }

    #[test]
    fn test_edge_by_type_or_from() {
        assert_eq!(kind_of(r#"{"type":"edge"}"#), RecordKind::Edge);
        assert_eq!(kind_of(r#"{"from":"a"}"#), RecordKind::Edge);
        assert_eq!(kind_of(r#"{"from":"a","to":"b","type":"link"}"#), RecordKind::Edge);
    }

    #[test]
    fn test_ignored() {
        assert_eq!(kind_of(r#"{}"#), RecordKind::Ignored);
        assert_eq!(kind_of(r#"{"type":"subgraph","label":"x"}"#), RecordKind::Ignored);
        assert_eq!(kind_of(r#"{"to":"b"}"#), RecordKind::Ignored);
        assert_eq!(kind_of(r#"{"id":null,"from":null}"#), RecordKind::Ignored);
    }

    #[test]
    fn test_classify_all_preserves_order() {
        let text = "{\"from\":\"a\"}\n{\"id\":\"a\"}\n{}\n";
        let kinds: Vec<_> = classify_all(crate::parse_records(text))
            .map(|(_, kind)| kind)
            .collect();
        assert_eq!(
            kinds,
            vec![RecordKind::Edge, RecordKind::Node, RecordKind::Ignored]
        );
        assert!(!RecordKind::Ignored.is_renderable());
    }
}
