//! Source locations - where elements appear in the indexed files
//!
//! A location is a `source_location` row; the `occurrence` table links it
//! to the element (node, edge, local symbol or error) found there.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// What a source location marks. The discriminant is `source_location.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceLocationType {
    /// The name of a symbol or reference
    Token = 0,
    /// The body of a symbol
    Scope = 1,
    Qualifier = 2,
    LocalSymbol = 3,
    Signature = 4,
    AtomicRange = 5,
    IndexerError = 6,
    FulltextSearch = 7,
    ScreenSearch = 8,
    Unsolved = 9,
}

impl SourceLocationType {
    pub fn code(&self) -> i64 {
        *self as i64
    }

    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(SourceLocationType::Token),
            1 => Ok(SourceLocationType::Scope),
            2 => Ok(SourceLocationType::Qualifier),
            3 => Ok(SourceLocationType::LocalSymbol),
            4 => Ok(SourceLocationType::Signature),
            5 => Ok(SourceLocationType::AtomicRange),
            6 => Ok(SourceLocationType::IndexerError),
            7 => Ok(SourceLocationType::FulltextSearch),
            8 => Ok(SourceLocationType::ScreenSearch),
            9 => Ok(SourceLocationType::Unsolved),
            _ => Err(Error::UnknownCode { kind: "source location type", code }),
        }
    }
}

/// A range of text inside a recorded file.
///
/// Lines and columns are 1-indexed and the end is inclusive, as Sourcetrail
/// expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRange {
    /// Id of the file node returned by `record_file`
    pub file_id: i64,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl SourceRange {
    pub fn new(file_id: i64, start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            file_id,
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// Range on a single line
    pub fn on_line(file_id: i64, line: u32, start_column: u32, end_column: u32) -> Self {
        Self::new(file_id, line, start_column, line, end_column)
    }
}

/// A row of the `source_location` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub id: i64,
    pub range: SourceRange,
    pub kind: SourceLocationType,
}

/// A row of the `occurrence` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occurrence {
    pub element_id: i64,
    pub source_location_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_type_codes() {
        for code in 0..=9 {
            assert_eq!(SourceLocationType::from_code(code).unwrap().code(), code);
        }
        assert!(SourceLocationType::from_code(10).is_err());
    }

    #[test]
    fn test_range_on_line() {
        let range = SourceRange::on_line(7, 3, 5, 9);
        assert_eq!(range.start_line, 3);
        assert_eq!(range.end_line, 3);
        assert_eq!(range.end_column, 9);
    }
}
