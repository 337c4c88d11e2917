use tabled::{settings::Style, Table, Tabled};
use crate::storage::DbStats;

#[derive(Tabled)]
pub struct StatRow {
    #[tabled(rename = "Table")]
    pub label: String,
    #[tabled(rename = "Rows")]
    pub count: String,
}

#[derive(Tabled)]
pub struct NodeRow {
    #[tabled(rename = "Id")]
    pub id: i64,
    #[tabled(rename = "Type")]
    pub kind: String,
    #[tabled(rename = "Name")]
    pub name: String,
}

/// Two-column table of labelled counts
pub struct TableBuilder {
    rows: Vec<StatRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(StatRow {
            label: label.to_string(),
            count: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }
        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn stats_table(stats: &DbStats) -> String {
    let mut builder = TableBuilder::new();
    for (label, count) in stats.rows() {
        builder.add_row(label, &count.to_string());
    }
    builder.build()
}

pub fn nodes_table(rows: Vec<NodeRow>) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_table() {
        let stats = DbStats {
            nodes: 3,
            edges: 2,
            ..DbStats::default()
        };
        let table = stats_table(&stats);
        assert!(table.contains("Nodes"));
        assert!(table.contains("Custom commands"));
        assert!(table.contains('3'));
    }

    #[test]
    fn test_empty_tables() {
        assert!(TableBuilder::new().build().is_empty());
        assert!(nodes_table(Vec::new()).is_empty());
    }
}
