//! SQLite storage implementation

use std::path::Path;
use rusqlite::{Connection, params, OptionalExtension};
use rusqlite::types::Type;
use crate::{Result, Error};
use crate::edge::{Edge, EdgeType};
use crate::element::{AccessKind, CustomCommand, ElementComponent, ElementComponentType, IndexerError, LocalSymbol};
use crate::file::{File, NodeFile};
use crate::location::{Occurrence, SourceLocation, SourceLocationType, SourceRange};
use crate::node::{DefinitionKind, Node, NodeDisplay, NodeType};
use super::schema;

const NODE_COLUMNS: &str = "id, type, serialized_name, color, hover_display";
const EDGE_COLUMNS: &str = "id, type, source_node_id, target_node_id, color, hover_display";
const FILE_COLUMNS: &str = "id, path, language, modification_time, indexed, complete, line_count";
const LOCATION_COLUMNS: &str = "id, file_node_id, start_line, start_column, end_line, end_column, type";

/// Typed access to the tables of a Sourcetrail database
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist) and bring its schema
    /// up to date
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.upgrade_schema()?;
        Ok(store)
    }

    /// Close the connection, reporting errors that a drop would swallow
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| e.into())
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.create_schema()?;
        Ok(store)
    }

    /// Create every table that is missing and seed `node_type`
    pub fn create_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        self.conn.execute(&schema::default_node_types_statement(), [])?;
        Ok(())
    }

    /// Add the extension columns and tables to a database written by stock
    /// Sourcetrail. Safe to run on an up-to-date database.
    pub fn upgrade_schema(&self) -> Result<()> {
        self.create_schema()?;
        for (table, column, sql_type) in schema::EXTENSION_COLUMNS {
            if !self.has_column(table, column)? {
                tracing::debug!("Adding column {}.{}", table, column);
                self.conn.execute(&format!("ALTER TABLE {table} ADD COLUMN {column} {sql_type}"), [])?;
            }
        }
        Ok(())
    }

    fn has_column(&self, table: &str, column: &str) -> Result<bool> {
        let mut stmt = self.conn.prepare(&format!("PRAGMA table_info({table})"))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names.iter().any(|name| name == column))
    }

    fn count_rows(&self, table: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ========== Element Operations ==========

    /// Allocate a new element id
    pub fn insert_element(&self) -> Result<i64> {
        self.conn.execute("INSERT INTO element (id) VALUES (NULL)", [])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn element_exists(&self, id: i64) -> Result<bool> {
        let found: Option<i64> = self.conn
            .query_row("SELECT id FROM element WHERE id = ?1", [id], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    pub fn count_elements(&self) -> Result<usize> {
        self.count_rows("element")
    }

    // ========== Element Component Operations ==========

    pub fn insert_element_component(&self, element_id: i64, kind: ElementComponentType, data: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO element_component (id, element_id, type, data) VALUES (NULL, ?1, ?2, ?3)",
            params![element_id, kind.code(), data],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get the components attached to an element
    pub fn get_element_components(&self, element_id: i64) -> Result<Vec<ElementComponent>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, element_id, type, data FROM element_component WHERE element_id = ?1 ORDER BY id"
        )?;
        let components = stmt
            .query_map([element_id], |row| {
                let code: i64 = row.get(2)?;
                let kind = ElementComponentType::from_code(code).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(2, Type::Integer, Box::new(e))
                })?;
                Ok(ElementComponent {
                    id: row.get(0)?,
                    element_id: row.get(1)?,
                    kind,
                    data: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(components)
    }

    // ========== Node Operations ==========

    /// Insert a node whose element already exists.
    ///
    /// Serialized names are unique: a second node with the same name is
    /// rejected with `Error::DuplicateNode`.
    pub fn insert_node(&self, node: &Node) -> Result<()> {
        if self.find_node_by_name(&node.serialized_name)?.is_some() {
            return Err(Error::DuplicateNode(node.serialized_name.clone()));
        }
        self.conn.execute(
            &format!("INSERT INTO node ({NODE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
            params![
                node.id,
                node.kind.code(),
                node.serialized_name,
                node.color,
                node.hover_display,
            ],
        )?;
        Ok(())
    }

    /// Get a node by id
    pub fn get_node(&self, id: i64) -> Result<Option<Node>> {
        self.conn
            .query_row(
                &format!("SELECT {NODE_COLUMNS} FROM node WHERE id = ?1"),
                [id],
                |row| self.row_to_node(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Find the node with the given serialized name
    pub fn find_node_by_name(&self, serialized_name: &str) -> Result<Option<Node>> {
        self.conn
            .query_row(
                &format!("SELECT {NODE_COLUMNS} FROM node WHERE serialized_name = ?1 LIMIT 1"),
                [serialized_name],
                |row| self.row_to_node(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Overwrite every column of an existing node
    pub fn update_node(&self, node: &Node) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE node SET type = ?2, serialized_name = ?3, color = ?4, hover_display = ?5 WHERE id = ?1",
            params![
                node.id,
                node.kind.code(),
                node.serialized_name,
                node.color,
                node.hover_display,
            ],
        )?;
        if changed == 0 {
            return Err(Error::ElementNotFound { table: "node", id: node.id });
        }
        Ok(())
    }

    /// List all nodes, in insertion order
    pub fn list_nodes(&self) -> Result<Vec<Node>> {
        let mut stmt = self.conn.prepare(&format!("SELECT {NODE_COLUMNS} FROM node ORDER BY id"))?;
        let nodes = stmt
            .query_map([], |row| self.row_to_node(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(nodes)
    }

    /// List the nodes of one type
    pub fn list_nodes_by_type(&self, kind: NodeType) -> Result<Vec<Node>> {
        let mut stmt = self.conn.prepare(
            &format!("SELECT {NODE_COLUMNS} FROM node WHERE type = ?1 ORDER BY id")
        )?;
        let nodes = stmt
            .query_map([kind.code()], |row| self.row_to_node(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(nodes)
    }

    pub fn count_nodes(&self) -> Result<usize> {
        self.count_rows("node")
    }

    /// Helper to convert a row to a Node
    fn row_to_node(&self, row: &rusqlite::Row) -> rusqlite::Result<Node> {
        let code: i64 = row.get(1)?;
        let kind = NodeType::from_code(code).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, Type::Integer, Box::new(e))
        })?;

        Ok(Node {
            id: row.get(0)?,
            kind,
            serialized_name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            color: row.get(3)?,
            hover_display: row.get(4)?,
        })
    }

    // ========== Node Type Operations ==========

    /// Get the labels Sourcetrail shows for a node type
    pub fn get_node_display(&self, kind: NodeType) -> Result<Option<NodeDisplay>> {
        self.conn
            .query_row(
                "SELECT graph_display, hover_display FROM node_type WHERE id = ?1",
                [kind.code()],
                |row| {
                    Ok(NodeDisplay {
                        kind,
                        graph_display: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                        hover_display: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Insert or replace the labels of a node type
    pub fn set_node_display(&self, display: &NodeDisplay) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO node_type (id, graph_display, hover_display) VALUES (?1, ?2, ?3)",
            params![display.kind.code(), display.graph_display, display.hover_display],
        )?;
        Ok(())
    }

    /// Restore the labels Sourcetrail ships with
    pub fn reset_node_displays(&self) -> Result<()> {
        self.conn.execute("DELETE FROM node_type", [])?;
        self.conn.execute(&schema::default_node_types_statement(), [])?;
        Ok(())
    }

    // ========== Symbol Operations ==========

    /// Insert or update the definition kind of a node
    pub fn set_definition_kind(&self, id: i64, kind: DefinitionKind) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO symbol (id, definition_kind) VALUES (?1, ?2)
            ON CONFLICT(id) DO UPDATE SET definition_kind = excluded.definition_kind
            "#,
            params![id, kind.code()],
        )?;
        Ok(())
    }

    /// Get the definition kind of a node, if it has one
    pub fn get_definition_kind(&self, id: i64) -> Result<Option<DefinitionKind>> {
        let code: Option<i64> = self.conn
            .query_row("SELECT definition_kind FROM symbol WHERE id = ?1", [id], |row| row.get(0))
            .optional()?;
        code.map(DefinitionKind::from_code).transpose()
    }

    pub fn count_symbols(&self) -> Result<usize> {
        self.count_rows("symbol")
    }

    // ========== Edge Operations ==========

    /// Insert an edge whose element already exists
    pub fn insert_edge(&self, edge: &Edge) -> Result<()> {
        self.conn.execute(
            &format!("INSERT INTO edge ({EDGE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            params![
                edge.id,
                edge.kind.code(),
                edge.source_node_id,
                edge.target_node_id,
                edge.color,
                edge.hover_display,
            ],
        )?;
        Ok(())
    }

    /// Get an edge by id
    pub fn get_edge(&self, id: i64) -> Result<Option<Edge>> {
        self.conn
            .query_row(
                &format!("SELECT {EDGE_COLUMNS} FROM edge WHERE id = ?1"),
                [id],
                |row| self.row_to_edge(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Overwrite every column of an existing edge
    pub fn update_edge(&self, edge: &Edge) -> Result<()> {
        let changed = self.conn.execute(
            r#"
            UPDATE edge SET type = ?2, source_node_id = ?3, target_node_id = ?4, color = ?5, hover_display = ?6
            WHERE id = ?1
            "#,
            params![
                edge.id,
                edge.kind.code(),
                edge.source_node_id,
                edge.target_node_id,
                edge.color,
                edge.hover_display,
            ],
        )?;
        if changed == 0 {
            return Err(Error::ElementNotFound { table: "edge", id: edge.id });
        }
        Ok(())
    }

    /// List all edges, in insertion order
    pub fn list_edges(&self) -> Result<Vec<Edge>> {
        let mut stmt = self.conn.prepare(&format!("SELECT {EDGE_COLUMNS} FROM edge ORDER BY id"))?;
        let edges = stmt
            .query_map([], |row| self.row_to_edge(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(edges)
    }

    /// Get edges leaving a node
    pub fn get_edges_from(&self, node_id: i64) -> Result<Vec<Edge>> {
        let mut stmt = self.conn.prepare(
            &format!("SELECT {EDGE_COLUMNS} FROM edge WHERE source_node_id = ?1 ORDER BY id")
        )?;
        let edges = stmt
            .query_map([node_id], |row| self.row_to_edge(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(edges)
    }

    /// Get edges pointing at a node (reverse lookup)
    pub fn get_edges_to(&self, node_id: i64) -> Result<Vec<Edge>> {
        let mut stmt = self.conn.prepare(
            &format!("SELECT {EDGE_COLUMNS} FROM edge WHERE target_node_id = ?1 ORDER BY id")
        )?;
        let edges = stmt
            .query_map([node_id], |row| self.row_to_edge(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(edges)
    }

    pub fn count_edges(&self) -> Result<usize> {
        self.count_rows("edge")
    }

    /// Helper to convert a row to an Edge
    fn row_to_edge(&self, row: &rusqlite::Row) -> rusqlite::Result<Edge> {
        let code: i64 = row.get(1)?;
        let kind = EdgeType::from_code(code).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, Type::Integer, Box::new(e))
        })?;

        Ok(Edge {
            id: row.get(0)?,
            kind,
            source_node_id: row.get(2)?,
            target_node_id: row.get(3)?,
            color: row.get(4)?,
            hover_display: row.get(5)?,
        })
    }

    // ========== File Operations ==========

    /// Insert a file row for an existing file node
    pub fn insert_file(&self, file: &File) -> Result<()> {
        self.conn.execute(
            &format!("INSERT INTO file ({FILE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            params![
                file.id,
                file.path,
                file.language,
                file.modification_time,
                file.indexed,
                file.complete,
                file.line_count,
            ],
        )?;
        Ok(())
    }

    /// Get a file by node id
    pub fn get_file(&self, id: i64) -> Result<Option<File>> {
        self.conn
            .query_row(
                &format!("SELECT {FILE_COLUMNS} FROM file WHERE id = ?1"),
                [id],
                |row| self.row_to_file(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Overwrite every column of an existing file row
    pub fn update_file(&self, file: &File) -> Result<()> {
        let changed = self.conn.execute(
            r#"
            UPDATE file SET path = ?2, language = ?3, modification_time = ?4, indexed = ?5, complete = ?6, line_count = ?7
            WHERE id = ?1
            "#,
            params![
                file.id,
                file.path,
                file.language,
                file.modification_time,
                file.indexed,
                file.complete,
                file.line_count,
            ],
        )?;
        if changed == 0 {
            return Err(Error::ElementNotFound { table: "file", id: file.id });
        }
        Ok(())
    }

    pub fn list_files(&self) -> Result<Vec<File>> {
        let mut stmt = self.conn.prepare(&format!("SELECT {FILE_COLUMNS} FROM file ORDER BY id"))?;
        let files = stmt
            .query_map([], |row| self.row_to_file(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(files)
    }

    pub fn count_files(&self) -> Result<usize> {
        self.count_rows("file")
    }

    /// Insert or replace the stored content of a file
    pub fn set_file_content(&self, id: i64, content: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO filecontent (id, content) VALUES (?1, ?2)",
            params![id, content],
        )?;
        Ok(())
    }

    pub fn get_file_content(&self, id: i64) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT content FROM filecontent WHERE id = ?1", [id], |row| row.get(0))
            .optional()
            .map_err(Into::into)
    }

    pub fn delete_file_content(&self, id: i64) -> Result<()> {
        self.conn.execute("DELETE FROM filecontent WHERE id = ?1", [id])?;
        Ok(())
    }

    fn row_to_file(&self, row: &rusqlite::Row) -> rusqlite::Result<File> {
        Ok(File {
            id: row.get(0)?,
            path: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            language: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            modification_time: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            indexed: row.get(4)?,
            complete: row.get(5)?,
            line_count: row.get(6)?,
        })
    }

    // ========== Local Symbol Operations ==========

    /// Insert a local symbol whose element already exists
    pub fn insert_local_symbol(&self, symbol: &LocalSymbol) -> Result<()> {
        self.conn.execute(
            "INSERT INTO local_symbol (id, name) VALUES (?1, ?2)",
            params![symbol.id, symbol.name],
        )?;
        Ok(())
    }

    pub fn find_local_symbol(&self, name: &str) -> Result<Option<LocalSymbol>> {
        self.conn
            .query_row(
                "SELECT id, name FROM local_symbol WHERE name = ?1 LIMIT 1",
                [name],
                |row| Ok(LocalSymbol { id: row.get(0)?, name: row.get(1)? }),
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn count_local_symbols(&self) -> Result<usize> {
        self.count_rows("local_symbol")
    }

    // ========== Source Location Operations ==========

    pub fn insert_source_location(&self, range: &SourceRange, kind: SourceLocationType) -> Result<i64> {
        self.conn.execute(
            &format!("INSERT INTO source_location ({LOCATION_COLUMNS}) VALUES (NULL, ?1, ?2, ?3, ?4, ?5, ?6)"),
            params![
                range.file_id,
                range.start_line,
                range.start_column,
                range.end_line,
                range.end_column,
                kind.code(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get every location recorded in a file
    pub fn get_locations_in_file(&self, file_id: i64) -> Result<Vec<SourceLocation>> {
        let mut stmt = self.conn.prepare(
            &format!("SELECT {LOCATION_COLUMNS} FROM source_location WHERE file_node_id = ?1 ORDER BY start_line, start_column")
        )?;
        let locations = stmt
            .query_map([file_id], |row| self.row_to_location(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(locations)
    }

    pub fn count_source_locations(&self) -> Result<usize> {
        self.count_rows("source_location")
    }

    fn row_to_location(&self, row: &rusqlite::Row) -> rusqlite::Result<SourceLocation> {
        let code: i64 = row.get(6)?;
        let kind = SourceLocationType::from_code(code).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, Type::Integer, Box::new(e))
        })?;

        Ok(SourceLocation {
            id: row.get(0)?,
            range: SourceRange {
                file_id: row.get(1)?,
                start_line: row.get(2)?,
                start_column: row.get(3)?,
                end_line: row.get(4)?,
                end_column: row.get(5)?,
            },
            kind,
        })
    }

    // ========== Occurrence Operations ==========

    /// Link an element to a source location. Linking twice is a no-op.
    pub fn insert_occurrence(&self, occurrence: &Occurrence) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO occurrence (element_id, source_location_id) VALUES (?1, ?2)",
            params![occurrence.element_id, occurrence.source_location_id],
        )?;
        Ok(())
    }

    /// Get the locations where an element occurs
    pub fn get_occurrences(&self, element_id: i64) -> Result<Vec<SourceLocation>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT l.id, l.file_node_id, l.start_line, l.start_column, l.end_line, l.end_column, l.type
            FROM occurrence o JOIN source_location l ON l.id = o.source_location_id
            WHERE o.element_id = ?1
            ORDER BY l.id
            "#,
        )?;
        let locations = stmt
            .query_map([element_id], |row| self.row_to_location(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(locations)
    }

    pub fn count_occurrences(&self) -> Result<usize> {
        self.count_rows("occurrence")
    }

    // ========== Component Access Operations ==========

    pub fn set_component_access(&self, node_id: i64, kind: AccessKind) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO component_access (node_id, type) VALUES (?1, ?2)",
            params![node_id, kind.code()],
        )?;
        Ok(())
    }

    pub fn get_component_access(&self, node_id: i64) -> Result<Option<AccessKind>> {
        let code: Option<i64> = self.conn
            .query_row("SELECT type FROM component_access WHERE node_id = ?1", [node_id], |row| row.get(0))
            .optional()?;
        code.map(AccessKind::from_code).transpose()
    }

    // ========== Error Operations ==========

    /// Insert an indexer error whose element already exists
    pub fn insert_error(&self, error: &IndexerError) -> Result<()> {
        self.conn.execute(
            "INSERT INTO error (id, message, fatal, indexed, translation_unit) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![error.id, error.message, error.fatal, error.indexed, error.translation_unit],
        )?;
        Ok(())
    }

    pub fn list_errors(&self) -> Result<Vec<IndexerError>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, message, fatal, indexed, translation_unit FROM error ORDER BY id"
        )?;
        let errors = stmt
            .query_map([], |row| {
                Ok(IndexerError {
                    id: row.get(0)?,
                    message: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    fatal: row.get(2)?,
                    indexed: row.get(3)?,
                    translation_unit: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(errors)
    }

    pub fn count_errors(&self) -> Result<usize> {
        self.count_rows("error")
    }

    // ========== Meta Operations ==========

    /// Set a meta value, replacing the previous one for `key`
    pub fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        let changed = self.conn.execute("UPDATE meta SET value = ?2 WHERE key = ?1", params![key, value])?;
        if changed == 0 {
            self.conn.execute("INSERT INTO meta (id, key, value) VALUES (NULL, ?1, ?2)", params![key, value])?;
        }
        Ok(())
    }

    pub fn get_meta(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM meta WHERE key = ?1 LIMIT 1", [key], |row| row.get(0))
            .optional()
            .map_err(Into::into)
    }

    // ========== Node File Operations ==========

    pub fn insert_node_file(&self, node_id: i64, file_name: &str, display_content: bool) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO node_file (id, node_id, file_name, display_content) VALUES (NULL, ?1, ?2, ?3)",
            params![node_id, file_name, display_content],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get the files attached to a node
    pub fn get_node_files(&self, node_id: i64) -> Result<Vec<NodeFile>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, node_id, file_name, display_content FROM node_file WHERE node_id = ?1 ORDER BY id"
        )?;
        let files = stmt
            .query_map([node_id], |row| {
                Ok(NodeFile {
                    id: row.get(0)?,
                    node_id: row.get(1)?,
                    file_name: row.get(2)?,
                    display_content: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(files)
    }

    pub fn count_node_files(&self) -> Result<usize> {
        self.count_rows("node_file")
    }

    // ========== Custom Command Operations ==========

    /// Insert or replace the custom command of a node
    pub fn set_custom_command(&self, command: &CustomCommand) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO custom_command (node_id, command, description) VALUES (?1, ?2, ?3)",
            params![command.node_id, command.command, command.description],
        )?;
        Ok(())
    }

    pub fn get_custom_command(&self, node_id: i64) -> Result<Option<CustomCommand>> {
        self.conn
            .query_row(
                "SELECT node_id, command, description FROM custom_command WHERE node_id = ?1",
                [node_id],
                |row| {
                    Ok(CustomCommand {
                        node_id: row.get(0)?,
                        command: row.get(1)?,
                        description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn count_custom_commands(&self) -> Result<usize> {
        self.count_rows("custom_command")
    }

    // ========== Bulk Operations ==========

    /// Begin a transaction for bulk operations
    pub fn begin_transaction(&self) -> Result<()> {
        self.conn.execute("BEGIN TRANSACTION", [])?;
        Ok(())
    }

    /// Commit a transaction
    pub fn commit(&self) -> Result<()> {
        self.conn.execute("COMMIT", [])?;
        Ok(())
    }

    /// Rollback a transaction
    pub fn rollback(&self) -> Result<()> {
        self.conn.execute("ROLLBACK", [])?;
        Ok(())
    }

    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    /// Delete every record (nodes, edges, files, locations...). `meta` is
    /// kept and `node_type` goes back to its default labels.
    pub fn clear_all(&self) -> Result<()> {
        for table in schema::RECORD_TABLES {
            self.conn.execute(&format!("DELETE FROM {table}"), [])?;
        }
        self.reset_node_displays()
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            nodes: self.count_nodes()?,
            edges: self.count_edges()?,
            symbols: self.count_symbols()?,
            files: self.count_files()?,
            local_symbols: self.count_local_symbols()?,
            source_locations: self.count_source_locations()?,
            occurrences: self.count_occurrences()?,
            errors: self.count_errors()?,
            node_files: self.count_node_files()?,
            custom_commands: self.count_custom_commands()?,
        })
    }
}

/// Database statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct DbStats {
    pub nodes: usize,
    pub edges: usize,
    pub symbols: usize,
    pub files: usize,
    pub local_symbols: usize,
    pub source_locations: usize,
    pub occurrences: usize,
    pub errors: usize,
    pub node_files: usize,
    pub custom_commands: usize,
}

impl DbStats {
    /// (label, count) pairs in display order
    pub fn rows(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("Nodes", self.nodes),
            ("Edges", self.edges),
            ("Symbols", self.symbols),
            ("Files", self.files),
            ("Local symbols", self.local_symbols),
            ("Source locations", self.source_locations),
            ("Occurrences", self.occurrences),
            ("Errors", self.errors),
            ("Attached files", self.node_files),
            ("Custom commands", self.custom_commands),
        ]
    }
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        for (label, count) in self.rows() {
            writeln!(f, "  {}: {}", label, count)?;
        }
        Ok(())
    }
}
