//! Source files - rows of the `file`, `filecontent` and `node_file` tables

use serde::{Deserialize, Serialize};

/// Format of `file.modification_time`
pub const MODIFICATION_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A row of the `file` table. The id is the id of the file node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub id: i64,
    /// Absolute path of the source file
    pub path: String,
    /// Language name, empty until `record_file_language` is called
    pub language: String,
    pub modification_time: String,
    pub indexed: bool,
    pub complete: bool,
    pub line_count: u32,
}

/// A row of the `node_file` table: a file copied next to the database and
/// attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFile {
    pub id: i64,
    pub node_id: i64,
    /// Path of the copy, relative to the database directory
    pub file_name: String,
    /// Show the file content in the code view
    pub display_content: bool,
}

/// Number of lines of `content`, counting a last line without newline
pub fn count_lines(content: &str) -> u32 {
    content.lines().count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_lines() {
        assert_eq!(count_lines(""), 0);
        assert_eq!(count_lines("a"), 1);
        assert_eq!(count_lines("a\n"), 1);
        assert_eq!(count_lines("a\nb"), 2);
        assert_eq!(count_lines("a\n\n"), 2);
    }
}
