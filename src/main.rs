//! srctrl CLI - create, inspect and edit Sourcetrail databases

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use srctrl::config::{self, SrctrlConfig};
use srctrl::ui::{self, Icons, NodeRow};
use srctrl::{NameDelimiter, NameElement, NameHierarchy, Node, NodeType, SourcetrailDb};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "srctrl")]
#[command(version = "0.1.0")]
#[command(about = "Create and edit Sourcetrail symbol databases")]
#[command(long_about = r#"
srctrl writes the .srctrldb/.srctrlprj pair read by the Sourcetrail code
navigation tool.

Example usage:
  srctrl create --database demo
  srctrl add-file src/main.c --language c
  srctrl symbol app::Main::run --kind method
  srctrl nodes --kind class --format json
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a srctrl.toml in the current directory
    Init {
        /// Database recorded in the config
        #[arg(short, long)]
        database: Option<String>,

        /// Delimiter for symbols recorded with `srctrl symbol` (file, cxx, java, unknown)
        #[arg(long)]
        delimiter: Option<NameDelimiter>,

        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Create a new database and its project file
    Create {
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Show row counts per table
    Stats {
        #[arg(short, long)]
        database: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List recorded nodes with their qualified names
    Nodes {
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Only list nodes of this type
        #[arg(short, long)]
        kind: Option<String>,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Record a source file
    AddFile {
        /// Source file to record
        file: PathBuf,

        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Language shown by Sourcetrail
        #[arg(short, long)]
        language: Option<String>,

        /// Record the file without storing its content
        #[arg(long)]
        no_index: bool,
    },

    /// Record a symbol from its qualified name, e.g. `app::Main::run`
    Symbol {
        /// Qualified name, split on the configured delimiter
        name: String,

        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Node type of the innermost element
        #[arg(short, long, default_value = "symbol")]
        kind: String,

        /// Delimiter, overriding the config
        #[arg(long)]
        delimiter: Option<NameDelimiter>,
    },

    /// Change the labels Sourcetrail shows for a node type
    NodeType {
        /// Node type to relabel
        kind: String,

        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Group title in the graph view
        #[arg(long)]
        graph: String,

        /// Type name shown on hover
        #[arg(long)]
        hover: String,
    },

    /// Delete every recorded element
    Clear {
        #[arg(short, long)]
        database: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct NodeListing {
    id: i64,
    kind: NodeType,
    name: String,
    serialized_name: String,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(e) = run(cli.command) {
        ui::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    let config = config::load_config(None)?.unwrap_or_default();

    match command {
        Commands::Init { database, delimiter, force } => {
            let path = config::default_config_path();
            let new_config = SrctrlConfig { database, delimiter };
            config::write_config(&path, &new_config, force)?;
            ui::success(&format!("Wrote {}", path.display()));
        }

        Commands::Create { database } => {
            let database = config.resolve_database(database.as_deref());
            config::ensure_db_dir(&database)?;
            let db = SourcetrailDb::create(&database)?;
            ui::header(Icons::DATABASE, &format!("Created {}", db.path().display()));
            db.close()?;
        }

        Commands::Stats { database, format } => {
            let db = open_existing(&config, database.as_deref())?;
            let stats = db.stats()?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
                OutputFormat::Text => {
                    ui::header(Icons::STATS, &format!("Statistics ({})", db.path().display()));
                    ui::block(&ui::stats_table(&stats));
                }
            }
            db.close()?;
        }

        Commands::Nodes { database, kind, format } => {
            let db = open_existing(&config, database.as_deref())?;
            let nodes = match kind {
                Some(k) => db.nodes_of_type(NodeType::from_str(&k)?)?,
                None => db.nodes()?,
            };
            let listings: Vec<NodeListing> = nodes.into_iter().map(listing).collect();

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listings)?),
                OutputFormat::Text if listings.is_empty() => ui::warn("No nodes recorded"),
                OutputFormat::Text => {
                    let rows = listings
                        .into_iter()
                        .map(|l| NodeRow {
                            id: l.id,
                            kind: ui::kind(l.kind.as_str()),
                            name: l.name,
                        })
                        .collect();
                    ui::block(&ui::nodes_table(rows));
                }
            }
            db.close()?;
        }

        Commands::AddFile { file, database, language, no_index } => {
            let mut db = open_existing(&config, database.as_deref())?;
            let id = db.record_file(&file, !no_index)?;
            if let Some(language) = language {
                db.record_file_language(id, &language)?;
            }
            db.commit()?;
            ui::info(&format!("{} File", Icons::FILE), &format!("{} (node {})", file.display(), id));
            db.close()?;
        }

        Commands::Symbol { name, database, kind, delimiter } => {
            let delimiter = delimiter.or(config.delimiter).unwrap_or_default();
            let kind = NodeType::from_str(&kind)?;
            let elements: Vec<NameElement> = name
                .split(delimiter.as_str())
                .filter(|part| !part.is_empty())
                .map(NameElement::named)
                .collect();
            if elements.is_empty() {
                anyhow::bail!("empty symbol name: {name:?}");
            }

            let mut db = open_existing(&config, database.as_deref())?;
            let id = db.record_symbol(&NameHierarchy::new(delimiter, elements))?;
            db.record_symbol_kind(id, kind)?;
            db.commit()?;
            ui::success(&format!("Recorded {} {} (node {})", kind, name, id));
            db.close()?;
        }

        Commands::NodeType { kind, database, graph, hover } => {
            let kind = NodeType::from_str(&kind)?;
            let mut db = open_existing(&config, database.as_deref())?;
            db.set_node_type(kind, &graph, &hover)?;
            db.commit()?;
            ui::success(&format!("Relabelled {} as {:?} / {:?}", kind, graph, hover));
            db.close()?;
        }

        Commands::Clear { database } => {
            let mut db = open_existing(&config, database.as_deref())?;
            db.clear()?;
            db.commit()?;
            ui::header(Icons::WRENCH, &format!("Cleared {}", db.path().display()));
            db.close()?;
        }
    }

    Ok(())
}

fn open_existing(config: &SrctrlConfig, database: Option<&Path>) -> anyhow::Result<SourcetrailDb> {
    let database = config.resolve_database(database);
    tracing::debug!("Using database {}", database.display());
    Ok(SourcetrailDb::open(&database, false)?)
}

fn listing(node: Node) -> NodeListing {
    let name = match NameHierarchy::deserialize_name(&node.serialized_name) {
        Ok(hierarchy) => hierarchy.qualified_name(),
        Err(e) => {
            tracing::warn!("Node {} has an unreadable name: {}", node.id, e);
            node.serialized_name.clone()
        }
    };
    NodeListing {
        id: node.id,
        kind: node.kind,
        name,
        serialized_name: node.serialized_name,
    }
}
