//! Storage Layer - SQLite-backed persistence
//!
//! The schema is Sourcetrail's (storage version 25):
//! - element, node, edge, symbol, node_type
//! - file, filecontent, source_location, occurrence
//! - local_symbol, element_component, component_access, error, meta
//!
//! plus the extension tables node_file and custom_command and the
//! color/hover_display columns on node and edge.

pub mod schema;
pub mod sqlite;

pub use sqlite::{DbStats, SqliteStore};
