//! Element rows that are neither nodes nor edges
//!
//! - `element_component`: flags attached to an element (ambiguity)
//! - `local_symbol`: variables only visible inside a function body
//! - `component_access`: visibility of a node
//! - `error`: indexer errors shown in the error view
//! - `custom_command`: command run from a node's context menu

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// The discriminant is `element_component.type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementComponentType {
    #[default]
    None = 0,
    IsAmbiguous = 1,
}

impl ElementComponentType {
    pub fn code(&self) -> i64 {
        *self as i64
    }

    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(ElementComponentType::None),
            1 => Ok(ElementComponentType::IsAmbiguous),
            _ => Err(Error::UnknownCode { kind: "element component type", code }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementComponent {
    pub id: i64,
    pub element_id: i64,
    pub kind: ElementComponentType,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSymbol {
    pub id: i64,
    pub name: String,
}

/// Visibility of a node. The discriminant is `component_access.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    #[default]
    None = 0,
    Public = 1,
    Protected = 2,
    Private = 3,
    Default = 4,
    TemplateParameter = 5,
    TypeParameter = 6,
}

impl AccessKind {
    pub fn code(&self) -> i64 {
        *self as i64
    }

    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(AccessKind::None),
            1 => Ok(AccessKind::Public),
            2 => Ok(AccessKind::Protected),
            3 => Ok(AccessKind::Private),
            4 => Ok(AccessKind::Default),
            5 => Ok(AccessKind::TemplateParameter),
            6 => Ok(AccessKind::TypeParameter),
            _ => Err(Error::UnknownCode { kind: "access kind", code }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentAccess {
    pub node_id: i64,
    pub kind: AccessKind,
}

/// A row of the `error` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerError {
    pub id: i64,
    pub message: String,
    /// The indexer stopped on this error
    pub fatal: bool,
    pub indexed: bool,
    pub translation_unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomCommand {
    pub node_id: i64,
    pub command: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_codes() {
        for code in 0..=6 {
            assert_eq!(AccessKind::from_code(code).unwrap().code(), code);
        }
        assert!(AccessKind::from_code(7).is_err());
    }

    #[test]
    fn test_component_codes() {
        assert_eq!(ElementComponentType::IsAmbiguous.code(), 1);
        assert!(ElementComponentType::from_code(2).is_err());
    }
}
