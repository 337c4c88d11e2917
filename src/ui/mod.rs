pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{block, error, header, info, kind, muted, success, warn};
pub use table::{nodes_table, stats_table, NodeRow, TableBuilder};
pub use theme::{theme, Theme};
