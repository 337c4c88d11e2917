//! Edge types - relationships between nodes (`edge` table)
//!
//! The most common ones:
//! - `Member`: parent → child in a name hierarchy
//! - `Call`: function → function
//! - `Usage`, `TypeUsage`: symbol → symbol
//! - `Inheritance`, `Override`: type → type, method → method
//! - `Include`, `Import`: file or module → file or module

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of a reference. The discriminant is the value stored in `edge.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    Undefined = 0,
    Member = 1 << 0,
    TypeUsage = 1 << 1,
    Usage = 1 << 2,
    Call = 1 << 3,
    Inheritance = 1 << 4,
    Override = 1 << 5,
    TypeArgument = 1 << 6,
    TemplateSpecialization = 1 << 7,
    Include = 1 << 8,
    Import = 1 << 9,
    BundledEdges = 1 << 10,
    MacroUsage = 1 << 11,
    AnnotationUsage = 1 << 12,
}

impl EdgeType {
    /// Get the integer stored in the database
    pub fn code(&self) -> i64 {
        *self as i64
    }

    /// Get the edge type stored as `code`
    pub fn from_code(code: i64) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.code() == code)
            .ok_or(Error::UnknownCode { kind: "edge type", code })
    }

    /// Get the string representation of the edge type
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Undefined => "undefined",
            EdgeType::Member => "member",
            EdgeType::TypeUsage => "type_usage",
            EdgeType::Usage => "usage",
            EdgeType::Call => "call",
            EdgeType::Inheritance => "inheritance",
            EdgeType::Override => "override",
            EdgeType::TypeArgument => "type_argument",
            EdgeType::TemplateSpecialization => "template_specialization",
            EdgeType::Include => "include",
            EdgeType::Import => "import",
            EdgeType::BundledEdges => "bundled_edges",
            EdgeType::MacroUsage => "macro_usage",
            EdgeType::AnnotationUsage => "annotation_usage",
        }
    }

    /// Get all edge types
    pub fn all() -> &'static [EdgeType] {
        &[
            EdgeType::Undefined,
            EdgeType::Member,
            EdgeType::TypeUsage,
            EdgeType::Usage,
            EdgeType::Call,
            EdgeType::Inheritance,
            EdgeType::Override,
            EdgeType::TypeArgument,
            EdgeType::TemplateSpecialization,
            EdgeType::Include,
            EdgeType::Import,
            EdgeType::BundledEdges,
            EdgeType::MacroUsage,
            EdgeType::AnnotationUsage,
        ]
    }
}

impl FromStr for EdgeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "calls" => return Ok(EdgeType::Call),
            "inherits" | "extends" => return Ok(EdgeType::Inheritance),
            _ => {}
        }
        EdgeType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| Error::UnknownName { kind: "edge type", name: s.to_string() })
    }
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A row of the `edge` table.
///
/// The id is shared with the `element` table, so an edge can own source
/// locations and element components like any other element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: i64,
    pub kind: EdgeType,
    pub source_node_id: i64,
    pub target_node_id: i64,
    pub color: Option<String>,
    pub hover_display: Option<String>,
}

impl Edge {
    pub fn new(id: i64, kind: EdgeType, source_node_id: i64, target_node_id: i64) -> Self {
        Self {
            id,
            kind,
            source_node_id,
            target_node_id,
            color: None,
            hover_display: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_type_roundtrip() {
        for kind in EdgeType::all() {
            let parsed: EdgeType = kind.as_str().parse().unwrap();
            assert_eq!(*kind, parsed);
            assert_eq!(EdgeType::from_code(kind.code()).unwrap(), *kind);
        }
    }

    #[test]
    fn test_edge_type_codes() {
        assert_eq!(EdgeType::Undefined.code(), 0);
        assert_eq!(EdgeType::Member.code(), 1);
        assert_eq!(EdgeType::Call.code(), 8);
        assert_eq!(EdgeType::AnnotationUsage.code(), 4096);
        assert!(EdgeType::from_code(3).is_err());
    }

    #[test]
    fn test_edge_type_aliases() {
        assert_eq!(EdgeType::from_str("calls").unwrap(), EdgeType::Call);
        assert_eq!(EdgeType::from_str("type usage").unwrap(), EdgeType::TypeUsage);
        assert!(EdgeType::from_str("friendship").is_err());
    }
}
