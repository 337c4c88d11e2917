//! # srctrl - Sourcetrail database writer
//!
//! Create and edit the SQLite databases read by the Sourcetrail code
//! navigation tool.
//!
//! srctrl provides:
//! - Name hierarchy encoding for the `node.serialized_name` column
//! - Typed rows for every table of the Sourcetrail schema (storage version 25)
//! - A SQLite data-access layer with explicit transactions
//! - A record API (`SourcetrailDb`) for symbols, references, files and locations
//! - Display customisation: node colours, node type labels, custom commands

pub mod name;
pub mod node;
pub mod edge;
pub mod element;
pub mod file;
pub mod location;
pub mod storage;
pub mod project;
pub mod db;
pub mod output;
pub mod config;
pub mod ui;

use std::path::PathBuf;

// Re-exports for convenient access
pub use name::{NameDelimiter, NameElement, NameHierarchy};
pub use node::{DefinitionKind, Node, NodeColor, NodeDisplay, NodeType};
pub use edge::{Edge, EdgeType};
pub use location::{SourceLocationType, SourceRange};
pub use element::AccessKind;
pub use db::{NodeSpec, SourcetrailDb};
pub use storage::{DbStats, SqliteStore};

/// Result type alias for srctrl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for srctrl operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot serialize name hierarchy: {0}")]
    Serialize(String),

    #[error("Cannot deserialize name hierarchy: {0}")]
    Deserialize(String),

    #[error("Database already exists: {}", .0.display())]
    DatabaseExists(PathBuf),

    #[error("Database not found: {}", .0.display())]
    DatabaseNotFound(PathBuf),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Node not found: {0}")]
    NodeNotFound(i64),

    #[error("No {table} element with id {id}")]
    ElementNotFound { table: &'static str, id: i64 },

    #[error("A node named {0:?} already exists")]
    DuplicateNode(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Unknown {kind} code: {code}")]
    UnknownCode { kind: &'static str, code: i64 },

    #[error("Unknown {kind}: {name}")]
    UnknownName { kind: &'static str, name: String },
}
