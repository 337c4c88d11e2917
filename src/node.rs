//! Node types - rows of the `node`, `node_type` and `symbol` tables
//!
//! Every named entity shown by Sourcetrail is a node:
//! - files, modules, namespaces, packages
//! - classes, structs, interfaces, unions, enums
//! - functions, methods, fields, variables, macros

use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::OnceLock;

/// Kind of a node. The discriminant is the value stored in `node.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Symbol = 1 << 0,
    Type = 1 << 1,
    BuiltinType = 1 << 2,
    Module = 1 << 3,
    Namespace = 1 << 4,
    Package = 1 << 5,
    Struct = 1 << 6,
    Class = 1 << 7,
    Interface = 1 << 8,
    Annotation = 1 << 9,
    GlobalVariable = 1 << 10,
    Field = 1 << 11,
    Function = 1 << 12,
    Method = 1 << 13,
    Enum = 1 << 14,
    EnumConstant = 1 << 15,
    Typedef = 1 << 16,
    TypeParameter = 1 << 17,
    File = 1 << 18,
    Macro = 1 << 19,
    Union = 1 << 20,
}

impl NodeType {
    /// Get the integer stored in the database
    pub fn code(&self) -> i64 {
        *self as i64
    }

    /// Get the node type stored as `code`
    pub fn from_code(code: i64) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.code() == code)
            .ok_or(Error::UnknownCode { kind: "node type", code })
    }

    /// Get the string representation of the node type
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Symbol => "symbol",
            NodeType::Type => "type",
            NodeType::BuiltinType => "builtin_type",
            NodeType::Module => "module",
            NodeType::Namespace => "namespace",
            NodeType::Package => "package",
            NodeType::Struct => "struct",
            NodeType::Class => "class",
            NodeType::Interface => "interface",
            NodeType::Annotation => "annotation",
            NodeType::GlobalVariable => "global_variable",
            NodeType::Field => "field",
            NodeType::Function => "function",
            NodeType::Method => "method",
            NodeType::Enum => "enum",
            NodeType::EnumConstant => "enum_constant",
            NodeType::Typedef => "typedef",
            NodeType::TypeParameter => "type_parameter",
            NodeType::File => "file",
            NodeType::Macro => "macro",
            NodeType::Union => "union",
        }
    }

    /// Get all node types, in code order
    pub fn all() -> &'static [NodeType] {
        &[
            NodeType::Symbol,
            NodeType::Type,
            NodeType::BuiltinType,
            NodeType::Module,
            NodeType::Namespace,
            NodeType::Package,
            NodeType::Struct,
            NodeType::Class,
            NodeType::Interface,
            NodeType::Annotation,
            NodeType::GlobalVariable,
            NodeType::Field,
            NodeType::Function,
            NodeType::Method,
            NodeType::Enum,
            NodeType::EnumConstant,
            NodeType::Typedef,
            NodeType::TypeParameter,
            NodeType::File,
            NodeType::Macro,
            NodeType::Union,
        ]
    }

    /// Labels Sourcetrail uses for this type: (graph group, hover text)
    pub fn default_display(&self) -> (&'static str, &'static str) {
        match self {
            NodeType::Symbol => ("Symbols", "symbol"),
            NodeType::Type => ("Types", "type"),
            NodeType::BuiltinType => ("", "built-in type"),
            NodeType::Module => ("Modules", "module"),
            NodeType::Namespace => ("Namespaces", "namespace"),
            NodeType::Package => ("Packages", "package"),
            NodeType::Struct => ("Structs", "struct"),
            NodeType::Class => ("Classes", "class"),
            NodeType::Interface => ("Interfaces", "interface"),
            NodeType::Annotation => ("Annotations", "annotation"),
            NodeType::GlobalVariable => ("Global variables", "global variable"),
            NodeType::Field => ("", "field"),
            NodeType::Function => ("Functions", "function"),
            NodeType::Method => ("", "method"),
            NodeType::Enum => ("Enums", "enum"),
            NodeType::EnumConstant => ("", "enum constant"),
            NodeType::Typedef => ("Typedefs", "typedef"),
            NodeType::TypeParameter => ("Type parameters", "type parameter"),
            NodeType::File => ("Files", "file"),
            NodeType::Macro => ("Macros", "macro"),
            NodeType::Union => ("Unions", "union"),
        }
    }
}

impl FromStr for NodeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "builtin" | "built_in_type" => return Ok(NodeType::BuiltinType),
            "global" | "variable" => return Ok(NodeType::GlobalVariable),
            "fn" => return Ok(NodeType::Function),
            _ => {}
        }
        NodeType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| Error::UnknownName { kind: "node type", name: s.to_string() })
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a symbol was seen by the indexer (`symbol.definition_kind`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    #[default]
    None = 0,
    /// Referenced but never defined in the indexed sources
    Implicit = 1,
    /// Defined in the indexed sources
    Explicit = 2,
}

impl DefinitionKind {
    pub fn code(&self) -> i64 {
        *self as i64
    }

    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(DefinitionKind::None),
            1 => Ok(DefinitionKind::Implicit),
            2 => Ok(DefinitionKind::Explicit),
            _ => Err(Error::UnknownCode { kind: "definition kind", code }),
        }
    }
}

/// A row of the `node` table.
///
/// The id is shared with the `element` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: i64,
    pub kind: NodeType,
    /// Encoded `NameHierarchy`
    pub serialized_name: String,
    /// JSON encoded `NodeColor`, if the node was recoloured
    pub color: Option<String>,
    pub hover_display: Option<String>,
}

impl Node {
    pub fn new(id: i64, kind: NodeType, serialized_name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            serialized_name: serialized_name.into(),
            color: None,
            hover_display: None,
        }
    }

    /// Decode the colour stored on this node
    pub fn node_color(&self) -> Result<Option<NodeColor>> {
        match &self.color {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }
}

/// A row of the `node_type` table: how Sourcetrail labels a node type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDisplay {
    pub kind: NodeType,
    /// Group title in the graph view (empty means no group)
    pub graph_display: String,
    /// Type name shown when hovering a node
    pub hover_display: String,
}

impl NodeDisplay {
    pub fn new(kind: NodeType, graph_display: impl Into<String>, hover_display: impl Into<String>) -> Self {
        Self {
            kind,
            graph_display: graph_display.into(),
            hover_display: hover_display.into(),
        }
    }

    /// Labels Sourcetrail ships with
    pub fn default_for(kind: NodeType) -> Self {
        let (graph, hover) = kind.default_display();
        Self::new(kind, graph, hover)
    }
}

fn color_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(#([0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})|[a-zA-Z]+)$")
            .expect("valid color regex")
    })
}

/// Check that `color` is `#rgb`, `#rrggbb`, `#rrggbbaa` or a colour name
pub fn validate_color(color: &str) -> Result<()> {
    if color_pattern().is_match(color) {
        Ok(())
    } else {
        Err(Error::InvalidColor(color.to_string()))
    }
}

/// Custom appearance of a node in the graph view.
///
/// Unset fields keep Sourcetrail's default appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeColor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Path to an icon drawn next to the node name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl NodeColor {
    pub fn with_fill(mut self, color: impl Into<String>) -> Self {
        self.fill = Some(color.into());
        self
    }

    pub fn with_border(mut self, color: impl Into<String>) -> Self {
        self.border = Some(color.into());
        self
    }

    pub fn with_text(mut self, color: impl Into<String>) -> Self {
        self.text = Some(color.into());
        self
    }

    pub fn with_icon(mut self, path: impl Into<String>) -> Self {
        self.icon = Some(path.into());
        self
    }

    /// Check every colour field
    pub fn validate(&self) -> Result<()> {
        for color in [&self.fill, &self.border, &self.text].into_iter().flatten() {
            validate_color(color)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_code_roundtrip() {
        for kind in NodeType::all() {
            assert_eq!(NodeType::from_code(kind.code()).unwrap(), *kind);
        }
        assert!(NodeType::from_code(3).is_err());
    }

    #[test]
    fn test_node_type_codes() {
        assert_eq!(NodeType::Symbol.code(), 1);
        assert_eq!(NodeType::Class.code(), 128);
        assert_eq!(NodeType::File.code(), 262144);
        assert_eq!(NodeType::Union.code(), 1048576);
    }

    #[test]
    fn test_node_type_parse() {
        assert_eq!(NodeType::from_str("class").unwrap(), NodeType::Class);
        assert_eq!(NodeType::from_str("Global Variable").unwrap(), NodeType::GlobalVariable);
        assert_eq!(NodeType::from_str("enum-constant").unwrap(), NodeType::EnumConstant);
        assert_eq!(NodeType::from_str("fn").unwrap(), NodeType::Function);
        assert!(NodeType::from_str("widget").is_err());
    }

    #[test]
    fn test_colors() {
        assert!(validate_color("#fff").is_ok());
        assert!(validate_color("#a0b1c2").is_ok());
        assert!(validate_color("#a0b1c2ff").is_ok());
        assert!(validate_color("red").is_ok());
        assert!(validate_color("#12345").is_err());
        assert!(validate_color("rgb(1,2,3)").is_err());
        assert!(validate_color("").is_err());
    }

    #[test]
    fn test_node_color_json() {
        let color = NodeColor::default().with_fill("#ff0000").with_text("white");
        color.validate().unwrap();

        let mut node = Node::new(1, NodeType::Class, ".\tmA\ts\tp");
        node.color = Some(serde_json::to_string(&color).unwrap());
        assert_eq!(node.node_color().unwrap(), Some(color));
    }

    #[test]
    fn test_invalid_node_color() {
        let color = NodeColor::default().with_border("not a color");
        assert!(matches!(color.validate(), Err(Error::InvalidColor(_))));
    }
}
