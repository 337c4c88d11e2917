//! Database schema definitions (Sourcetrail storage version 25)
//!
//! Foreign keys are declared but not enforced: Sourcetrail writes elements
//! before the rows that reference them and never turns `foreign_keys` on.

use crate::node::NodeType;

pub const CREATE_ELEMENT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS element (
    id INTEGER,
    PRIMARY KEY(id)
)
"#;

pub const CREATE_ELEMENT_COMPONENT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS element_component (
    id INTEGER,
    element_id INTEGER,
    type INTEGER,
    data TEXT,
    PRIMARY KEY(id),
    FOREIGN KEY(element_id) REFERENCES element(id) ON DELETE CASCADE
)
"#;

/// `color` and `hover_display` are extensions read by patched Sourcetrail builds
pub const CREATE_EDGE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS edge (
    id INTEGER NOT NULL,
    type INTEGER NOT NULL,
    source_node_id INTEGER NOT NULL,
    target_node_id INTEGER NOT NULL,
    color TEXT,
    hover_display TEXT,
    PRIMARY KEY(id),
    FOREIGN KEY(id) REFERENCES element(id) ON DELETE CASCADE,
    FOREIGN KEY(source_node_id) REFERENCES node(id) ON DELETE CASCADE,
    FOREIGN KEY(target_node_id) REFERENCES node(id) ON DELETE CASCADE
)
"#;

pub const CREATE_NODE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS node (
    id INTEGER NOT NULL,
    type INTEGER NOT NULL,
    serialized_name TEXT,
    color TEXT,
    hover_display TEXT,
    PRIMARY KEY(id),
    FOREIGN KEY(id) REFERENCES element(id) ON DELETE CASCADE
)
"#;

pub const CREATE_NODE_TYPE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS node_type (
    id INTEGER NOT NULL,
    graph_display TEXT,
    hover_display TEXT,
    PRIMARY KEY(id)
)
"#;

pub const CREATE_SYMBOL_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS symbol (
    id INTEGER NOT NULL,
    definition_kind INTEGER NOT NULL,
    PRIMARY KEY(id),
    FOREIGN KEY(id) REFERENCES node(id) ON DELETE CASCADE
)
"#;

pub const CREATE_FILE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS file (
    id INTEGER NOT NULL,
    path TEXT,
    language TEXT,
    modification_time TEXT,
    indexed INTEGER,
    complete INTEGER,
    line_count INTEGER,
    PRIMARY KEY(id),
    FOREIGN KEY(id) REFERENCES node(id) ON DELETE CASCADE
)
"#;

pub const CREATE_FILECONTENT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS filecontent (
    id INTEGER,
    content TEXT,
    PRIMARY KEY(id),
    FOREIGN KEY(id) REFERENCES file(id) ON DELETE CASCADE ON UPDATE CASCADE
)
"#;

pub const CREATE_LOCAL_SYMBOL_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS local_symbol (
    id INTEGER NOT NULL,
    name TEXT,
    PRIMARY KEY(id),
    FOREIGN KEY(id) REFERENCES element(id) ON DELETE CASCADE
)
"#;

pub const CREATE_SOURCE_LOCATION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS source_location (
    id INTEGER NOT NULL,
    file_node_id INTEGER,
    start_line INTEGER,
    start_column INTEGER,
    end_line INTEGER,
    end_column INTEGER,
    type INTEGER,
    PRIMARY KEY(id),
    FOREIGN KEY(file_node_id) REFERENCES node(id) ON DELETE CASCADE
)
"#;

pub const CREATE_OCCURRENCE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS occurrence (
    element_id INTEGER NOT NULL,
    source_location_id INTEGER NOT NULL,
    PRIMARY KEY(element_id, source_location_id),
    FOREIGN KEY(element_id) REFERENCES element(id) ON DELETE CASCADE,
    FOREIGN KEY(source_location_id) REFERENCES source_location(id) ON DELETE CASCADE
)
"#;

pub const CREATE_COMPONENT_ACCESS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS component_access (
    node_id INTEGER NOT NULL,
    type INTEGER NOT NULL,
    PRIMARY KEY(node_id),
    FOREIGN KEY(node_id) REFERENCES node(id) ON DELETE CASCADE
)
"#;

pub const CREATE_ERROR_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS error (
    id INTEGER NOT NULL,
    message TEXT,
    fatal INTEGER NOT NULL,
    indexed INTEGER NOT NULL,
    translation_unit TEXT,
    PRIMARY KEY(id),
    FOREIGN KEY(id) REFERENCES element(id) ON DELETE CASCADE
)
"#;

pub const CREATE_META_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS meta (
    id INTEGER,
    key TEXT,
    value TEXT,
    PRIMARY KEY(id)
)
"#;

/// Files copied next to the database and attached to a node
pub const CREATE_NODE_FILE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS node_file (
    id INTEGER,
    node_id INTEGER NOT NULL,
    file_name TEXT NOT NULL,
    display_content INTEGER NOT NULL,
    PRIMARY KEY(id),
    FOREIGN KEY(node_id) REFERENCES node(id) ON DELETE CASCADE
)
"#;

pub const CREATE_CUSTOM_COMMAND_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS custom_command (
    node_id INTEGER NOT NULL,
    command TEXT NOT NULL,
    description TEXT,
    PRIMARY KEY(node_id),
    FOREIGN KEY(node_id) REFERENCES node(id) ON DELETE CASCADE
)
"#;

pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_node_serialized_name ON node(serialized_name)",
    "CREATE INDEX IF NOT EXISTS idx_local_symbol_name ON local_symbol(name)",
];

/// Columns added to tables created by stock Sourcetrail: (table, column, type)
pub const EXTENSION_COLUMNS: &[(&str, &str, &str)] = &[
    ("node", "color", "TEXT"),
    ("node", "hover_display", "TEXT"),
    ("edge", "color", "TEXT"),
    ("edge", "hover_display", "TEXT"),
];

/// Tables emptied by a clear, in deletion order. `meta` and `node_type` are
/// not record tables.
pub const RECORD_TABLES: &[&str] = &[
    "occurrence",
    "source_location",
    "element_component",
    "component_access",
    "custom_command",
    "node_file",
    "filecontent",
    "file",
    "symbol",
    "local_symbol",
    "error",
    "edge",
    "node",
    "element",
];

/// SQL seeding `node_type` with the labels Sourcetrail ships with
pub fn default_node_types_statement() -> String {
    let rows: Vec<String> = NodeType::all()
        .iter()
        .map(|kind| {
            let (graph, hover) = kind.default_display();
            format!("({}, '{}', '{}')", kind.code(), graph, hover)
        })
        .collect();
    format!(
        "INSERT OR IGNORE INTO node_type (id, graph_display, hover_display) VALUES {}",
        rows.join(", ")
    )
}

/// All table creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_ELEMENT_TABLE,
        CREATE_ELEMENT_COMPONENT_TABLE,
        CREATE_EDGE_TABLE,
        CREATE_NODE_TABLE,
        CREATE_NODE_TYPE_TABLE,
        CREATE_SYMBOL_TABLE,
        CREATE_FILE_TABLE,
        CREATE_FILECONTENT_TABLE,
        CREATE_LOCAL_SYMBOL_TABLE,
        CREATE_SOURCE_LOCATION_TABLE,
        CREATE_OCCURRENCE_TABLE,
        CREATE_COMPONENT_ACCESS_TABLE,
        CREATE_ERROR_TABLE,
        CREATE_META_TABLE,
        CREATE_NODE_FILE_TABLE,
        CREATE_CUSTOM_COMMAND_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_node_types_statement() {
        let sql = default_node_types_statement();
        assert!(sql.contains("(1, 'Symbols', 'symbol')"));
        assert!(sql.contains("(4, '', 'built-in type')"));
        assert!(sql.contains("(1048576, 'Unions', 'union')"));
    }
}
