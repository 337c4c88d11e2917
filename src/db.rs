//! Record API - write symbols, references and files into a Sourcetrail database
//!
//! `SourcetrailDb` wraps a `SqliteStore` and keeps a cache of the serialized
//! names it has seen so that recording the same symbol twice returns the same
//! node. Every change happens inside a transaction: `commit` makes the work
//! durable, `close` drops what was not committed.
//!
//! ```no_run
//! use srctrl::{NodeSpec, SourcetrailDb};
//!
//! let mut db = SourcetrailDb::create("demo")?;
//! let class_id = db.record_class(NodeSpec::new("Main"))?;
//! let method_id = db.record_method(NodeSpec::new("run").with_parent(class_id))?;
//! db.record_ref_call(method_id, class_id)?;
//! db.commit()?;
//! db.close()?;
//! # Ok::<(), srctrl::Error>(())
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Local};
use crate::{Error, Result};
use crate::edge::{Edge, EdgeType};
use crate::element::{AccessKind, CustomCommand, ElementComponentType, IndexerError, LocalSymbol};
use crate::file::{count_lines, File, MODIFICATION_TIME_FORMAT};
use crate::location::{Occurrence, SourceLocationType, SourceRange};
use crate::name::{NameDelimiter, NameElement, NameHierarchy};
use crate::node::{validate_color, DefinitionKind, Node, NodeColor, NodeDisplay, NodeType};
use crate::project::{self, PROJECT_XML, STORAGE_VERSION};
use crate::storage::{DbStats, SqliteStore};

/// Name of the node every unsolved reference points at
const UNSOLVED_SYMBOL_NAME: &str = "unsolved symbol";

/// Describes a node to record: its name element, where it lives and how it
/// was seen by the indexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    pub name: String,
    pub prefix: String,
    pub postfix: String,
    /// Ignored when `parent_id` is set: the parent's delimiter is used
    pub delimiter: NameDelimiter,
    pub parent_id: Option<i64>,
    /// Record an explicit definition for the node
    pub is_indexed: bool,
    pub hover_display: Option<String>,
}

impl Default for NodeSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            prefix: String::new(),
            postfix: String::new(),
            delimiter: NameDelimiter::default(),
            parent_id: None,
            is_indexed: true,
            hover_display: None,
        }
    }
}

impl NodeSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_postfix(mut self, postfix: impl Into<String>) -> Self {
        self.postfix = postfix.into();
        self
    }

    pub fn with_delimiter(mut self, delimiter: NameDelimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_hover_display(mut self, text: impl Into<String>) -> Self {
        self.hover_display = Some(text.into());
        self
    }

    /// Mark the node as referenced but not defined in the indexed sources
    pub fn not_indexed(mut self) -> Self {
        self.is_indexed = false;
        self
    }

    fn name_element(&self) -> NameElement {
        NameElement::new(self.prefix.clone(), self.name.clone(), self.postfix.clone())
    }
}

/// An open Sourcetrail database
pub struct SourcetrailDb {
    store: SqliteStore,
    path: PathBuf,
    /// serialized name -> node id
    name_cache: HashMap<String, i64>,
}

impl SourcetrailDb {
    // ========== Database Operations ==========

    /// Check whether a database exists at `path` (the extension is added if
    /// missing)
    pub fn exists(path: impl AsRef<Path>) -> bool {
        project::normalize_db_path(path.as_ref())
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    /// Open an existing database.
    ///
    /// With `clear` set, a missing database is created and an existing one is
    /// emptied.
    pub fn open(path: impl AsRef<Path>, clear: bool) -> Result<Self> {
        let path = project::normalize_db_path(path.as_ref())?;
        if !path.is_file() {
            if clear {
                return Self::create(&path);
            }
            return Err(Error::DatabaseNotFound(path));
        }

        let store = SqliteStore::open(&path)?;
        store.begin_transaction()?;
        let mut db = Self {
            store,
            path,
            name_cache: HashMap::new(),
        };
        tracing::info!("Opened database {}", db.path.display());

        if clear {
            db.clear()?;
        }
        Ok(db)
    }

    /// Create a new database and its project file
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = project::normalize_db_path(path.as_ref())?;
        if path.exists() {
            return Err(Error::DatabaseExists(path));
        }

        let project_path = project::project_file_path(&path);
        let mut created = vec![path.clone()];
        if !project_path.exists() {
            created.push(project_path);
        }

        match Self::initialize(&path) {
            Ok(db) => {
                tracing::info!("Created database {}", path.display());
                Ok(db)
            }
            Err(e) => {
                for leftover in created.iter().filter(|p| p.is_file()) {
                    if let Err(remove_err) = fs::remove_file(leftover) {
                        tracing::warn!("Failed to remove {}: {}", leftover.display(), remove_err);
                    }
                }
                Err(e)
            }
        }
    }

    fn initialize(path: &Path) -> Result<Self> {
        let store = SqliteStore::open(path)?;
        store.begin_transaction()?;
        store.set_meta("storage_version", &STORAGE_VERSION.to_string())?;
        store.set_meta("project_settings", PROJECT_XML)?;
        project::write_project_file(path)?;
        store.commit()?;
        store.begin_transaction()?;

        Ok(Self {
            store,
            path: path.to_path_buf(),
            name_cache: HashMap::new(),
        })
    }

    /// Make every change since the last commit durable
    pub fn commit(&mut self) -> Result<()> {
        self.store.commit()?;
        self.store.begin_transaction()?;
        tracing::debug!("Committed {}", self.path.display());
        Ok(())
    }

    /// Delete every recorded element. Display settings go back to their
    /// defaults; the project metadata is kept.
    pub fn clear(&mut self) -> Result<()> {
        self.store.clear_all()?;
        self.name_cache.clear();
        tracing::info!("Cleared database {}", self.path.display());
        Ok(())
    }

    /// Close the database. Changes that were not committed are lost.
    pub fn close(self) -> Result<()> {
        if self.store.in_transaction() {
            self.store.rollback()?;
        }
        tracing::info!("Closed database {}", self.path.display());
        self.store.close()
    }

    /// Absolute path of the `.srctrldb` file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Underlying data-access layer. Not public: rows changed behind the
    /// name cache would leave it pointing at missing nodes.
    #[cfg(test)]
    pub(crate) fn store(&self) -> &SqliteStore {
        &self.store
    }

    // ========== Symbol Operations ==========

    /// Get the node named `serialized_name`, creating it with `kind` if needed.
    /// Returns the node id and whether it was created.
    fn add_if_not_existing(&mut self, serialized_name: String, kind: NodeType) -> Result<(i64, bool)> {
        if let Some(&id) = self.name_cache.get(&serialized_name) {
            return Ok((id, false));
        }
        if let Some(node) = self.store.find_node_by_name(&serialized_name)? {
            self.name_cache.insert(serialized_name, node.id);
            return Ok((node.id, false));
        }

        let id = self.store.insert_element()?;
        self.store.insert_node(&Node::new(id, kind, serialized_name.clone()))?;
        tracing::debug!("Inserted {} node {}: {:?}", kind, id, serialized_name);
        self.name_cache.insert(serialized_name, id);
        Ok((id, true))
    }

    /// Record a node for every level of `hierarchy` and a member edge from
    /// each new node to its parent. Returns the id of the innermost node.
    pub fn record_symbol(&mut self, hierarchy: &NameHierarchy) -> Result<i64> {
        if hierarchy.is_empty() {
            return Err(Error::Serialize("name hierarchy has no element".to_string()));
        }

        let mut parent: Option<i64> = None;
        for end in 1..=hierarchy.size() {
            let serialized = hierarchy.serialize_range(0, end)?;
            let (id, inserted) = self.add_if_not_existing(serialized, NodeType::Symbol)?;
            if let (true, Some(parent_id)) = (inserted, parent) {
                self.insert_edge(EdgeType::Member, parent_id, id)?;
            }
            parent = Some(id);
        }
        parent.ok_or_else(|| Error::Serialize("name hierarchy has no element".to_string()))
    }

    /// Get the id of an already recorded symbol
    pub fn get_symbol(&self, hierarchy: &NameHierarchy) -> Result<Option<i64>> {
        let serialized = hierarchy.serialize_name()?;
        if let Some(&id) = self.name_cache.get(&serialized) {
            return Ok(Some(id));
        }
        Ok(self.store.find_node_by_name(&serialized)?.map(|node| node.id))
    }

    /// Record `element` as a child of an existing node
    pub fn record_symbol_child(&mut self, parent_id: i64, element: NameElement) -> Result<i64> {
        let mut hierarchy = self.hierarchy_of(parent_id)?;
        hierarchy.extend(element);
        self.record_symbol(&hierarchy)
    }

    /// Set the type of a node
    pub fn record_symbol_kind(&mut self, id: i64, kind: NodeType) -> Result<()> {
        let mut node = self.require_node(id)?;
        if node.kind != kind {
            node.kind = kind;
            self.store.update_node(&node)?;
        }
        Ok(())
    }

    pub fn record_symbol_definition_kind(&mut self, id: i64, kind: DefinitionKind) -> Result<()> {
        self.require_node(id)?;
        self.store.set_definition_kind(id, kind)
    }

    /// Record a node of the given type. Every `record_<type>` method is a
    /// shorthand for this one.
    pub fn record_node(&mut self, kind: NodeType, spec: NodeSpec) -> Result<i64> {
        let element = spec.name_element();
        let hierarchy = match spec.parent_id {
            Some(parent_id) => {
                let mut hierarchy = self.hierarchy_of(parent_id)?;
                hierarchy.extend(element);
                hierarchy
            }
            None => NameHierarchy::single(spec.delimiter, element),
        };

        let id = self.record_symbol(&hierarchy)?;
        self.record_symbol_kind(id, kind)?;
        if spec.is_indexed {
            self.record_symbol_definition_kind(id, DefinitionKind::Explicit)?;
        }
        if let Some(text) = spec.hover_display {
            self.change_node_hover_display(id, &text)?;
        }
        Ok(id)
    }

    fn require_node(&self, id: i64) -> Result<Node> {
        self.store.get_node(id)?.ok_or(Error::NodeNotFound(id))
    }

    fn hierarchy_of(&self, id: i64) -> Result<NameHierarchy> {
        let node = self.require_node(id)?;
        NameHierarchy::deserialize_name(&node.serialized_name)
    }

    // ========== Reference Operations ==========

    fn insert_edge(&mut self, kind: EdgeType, source_id: i64, dest_id: i64) -> Result<i64> {
        let id = self.store.insert_element()?;
        self.store.insert_edge(&Edge::new(id, kind, source_id, dest_id))?;
        tracing::debug!("Inserted {} edge {}: {} -> {}", kind, id, source_id, dest_id);
        Ok(id)
    }

    /// Record a reference between two nodes. Returns the edge id.
    pub fn record_reference(&mut self, source_id: i64, dest_id: i64, kind: EdgeType) -> Result<i64> {
        self.require_node(source_id)?;
        self.require_node(dest_id)?;
        self.insert_edge(kind, source_id, dest_id)
    }

    /// Record a reference whose target could not be resolved. The edge
    /// points at the shared "unsolved symbol" node and gets an unsolved
    /// location at `range`.
    pub fn record_reference_to_unsolved_symbol(
        &mut self,
        symbol_id: i64,
        kind: EdgeType,
        range: &SourceRange,
    ) -> Result<i64> {
        let hierarchy = NameHierarchy::single(NameDelimiter::Unknown, NameElement::named(UNSOLVED_SYMBOL_NAME));
        let unsolved_id = self.record_symbol(&hierarchy)?;
        let reference_id = self.record_reference(symbol_id, unsolved_id, kind)?;
        self.record_source_location(reference_id, range, SourceLocationType::Unsolved)?;
        Ok(reference_id)
    }

    /// Mark a reference as ambiguous
    pub fn record_reference_is_ambiguous(&mut self, reference_id: i64) -> Result<()> {
        if self.store.get_edge(reference_id)?.is_none() {
            return Err(Error::ElementNotFound { table: "edge", id: reference_id });
        }
        self.store.insert_element_component(reference_id, ElementComponentType::IsAmbiguous, "")?;
        Ok(())
    }

    // ========== Source File Operations ==========

    /// Record a source file. The file must exist; when `indexed` is set its
    /// content is stored so Sourcetrail can display it.
    ///
    /// Recording the same file again refreshes its modification time, line
    /// count and content.
    pub fn record_file(&mut self, path: impl AsRef<Path>, indexed: bool) -> Result<i64> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let absolute = std::path::absolute(path)?;
        let path_str = absolute.to_string_lossy().into_owned();

        let modified: DateTime<Local> = fs::metadata(&absolute)?.modified()?.into();
        let content = if indexed {
            Some(fs::read_to_string(&absolute)?)
        } else {
            None
        };

        let hierarchy = NameHierarchy::single(NameDelimiter::File, NameElement::named(path_str.clone()));
        let (id, inserted) = self.add_if_not_existing(hierarchy.serialize_name()?, NodeType::File)?;
        if !inserted {
            self.record_symbol_kind(id, NodeType::File)?;
        }

        let mut file = File {
            id,
            path: path_str,
            language: String::new(),
            modification_time: modified.format(MODIFICATION_TIME_FORMAT).to_string(),
            indexed,
            complete: true,
            line_count: content.as_deref().map(count_lines).unwrap_or(0),
        };
        match self.store.get_file(id)? {
            Some(existing) => {
                file.language = existing.language;
                self.store.update_file(&file)?;
            }
            None => self.store.insert_file(&file)?,
        }

        match &content {
            Some(content) => self.store.set_file_content(id, content)?,
            None => self.store.delete_file_content(id)?,
        }
        tracing::debug!("Recorded file {} ({} lines)", file.path, file.line_count);
        Ok(id)
    }

    /// Set the language of a recorded file
    pub fn record_file_language(&mut self, id: i64, language: &str) -> Result<()> {
        let mut file = self
            .store
            .get_file(id)?
            .ok_or(Error::ElementNotFound { table: "file", id })?;
        file.language = language.to_string();
        self.store.update_file(&file)
    }

    // ========== Source Location Operations ==========

    fn record_source_location(&mut self, element_id: i64, range: &SourceRange, kind: SourceLocationType) -> Result<i64> {
        if !self.store.element_exists(element_id)? {
            return Err(Error::ElementNotFound { table: "element", id: element_id });
        }
        if self.store.get_file(range.file_id)?.is_none() {
            return Err(Error::ElementNotFound { table: "file", id: range.file_id });
        }
        let location_id = self.store.insert_source_location(range, kind)?;
        self.store.insert_occurrence(&Occurrence {
            element_id,
            source_location_id: location_id,
        })?;
        Ok(location_id)
    }

    /// Record where the name of a symbol appears
    pub fn record_symbol_location(&mut self, symbol_id: i64, range: &SourceRange) -> Result<()> {
        self.record_source_location(symbol_id, range, SourceLocationType::Token)?;
        Ok(())
    }

    /// Record the body of a symbol
    pub fn record_symbol_scope_location(&mut self, symbol_id: i64, range: &SourceRange) -> Result<()> {
        self.record_source_location(symbol_id, range, SourceLocationType::Scope)?;
        Ok(())
    }

    pub fn record_symbol_signature_location(&mut self, symbol_id: i64, range: &SourceRange) -> Result<()> {
        self.record_source_location(symbol_id, range, SourceLocationType::Signature)?;
        Ok(())
    }

    /// Record where a reference appears
    pub fn record_reference_location(&mut self, reference_id: i64, range: &SourceRange) -> Result<()> {
        self.record_source_location(reference_id, range, SourceLocationType::Token)?;
        Ok(())
    }

    /// Record a qualifier, e.g. `std` in `std::vector`
    pub fn record_qualifier_location(&mut self, symbol_id: i64, range: &SourceRange) -> Result<()> {
        self.record_source_location(symbol_id, range, SourceLocationType::Qualifier)?;
        Ok(())
    }

    pub fn record_local_symbol_location(&mut self, local_symbol_id: i64, range: &SourceRange) -> Result<()> {
        self.record_source_location(local_symbol_id, range, SourceLocationType::LocalSymbol)?;
        Ok(())
    }

    /// Record a range Sourcetrail must not split when highlighting
    pub fn record_atomic_source_range(&mut self, symbol_id: i64, range: &SourceRange) -> Result<()> {
        self.record_source_location(symbol_id, range, SourceLocationType::AtomicRange)?;
        Ok(())
    }

    /// Record a local symbol, reusing the one with the same name if any
    pub fn record_local_symbol(&mut self, name: &str) -> Result<i64> {
        if let Some(existing) = self.store.find_local_symbol(name)? {
            return Ok(existing.id);
        }
        let id = self.store.insert_element()?;
        self.store.insert_local_symbol(&LocalSymbol {
            id,
            name: name.to_string(),
        })?;
        Ok(id)
    }

    /// Record an indexer error at `range`
    pub fn record_error(&mut self, message: &str, fatal: bool, range: &SourceRange) -> Result<i64> {
        let id = self.store.insert_element()?;
        self.store.insert_error(&IndexerError {
            id,
            message: message.to_string(),
            fatal,
            indexed: true,
            translation_unit: String::new(),
        })?;
        self.record_source_location(id, range, SourceLocationType::IndexerError)?;
        if fatal {
            tracing::warn!("Recorded fatal indexer error: {}", message);
        }
        Ok(id)
    }

    /// Set the visibility of a node
    pub fn record_component_access(&mut self, node_id: i64, kind: AccessKind) -> Result<()> {
        self.require_node(node_id)?;
        self.store.set_component_access(node_id, kind)
    }

    // ========== Display Operations ==========

    /// Change how Sourcetrail labels a node type
    pub fn set_node_type(&mut self, kind: NodeType, graph_display: &str, hover_display: &str) -> Result<()> {
        self.store
            .set_node_display(&NodeDisplay::new(kind, graph_display, hover_display))
    }

    pub fn node_display(&self, kind: NodeType) -> Result<NodeDisplay> {
        Ok(self
            .store
            .get_node_display(kind)?
            .unwrap_or_else(|| NodeDisplay::default_for(kind)))
    }

    pub fn change_node_color(&mut self, node_id: i64, color: &NodeColor) -> Result<()> {
        color.validate()?;
        let mut node = self.require_node(node_id)?;
        node.color = Some(serde_json::to_string(color)?);
        self.store.update_node(&node)
    }

    pub fn change_edge_color(&mut self, edge_id: i64, color: &str) -> Result<()> {
        validate_color(color)?;
        let mut edge = self.require_edge(edge_id)?;
        edge.color = Some(color.to_string());
        self.store.update_edge(&edge)
    }

    pub fn change_node_hover_display(&mut self, node_id: i64, text: &str) -> Result<()> {
        let mut node = self.require_node(node_id)?;
        node.hover_display = Some(text.to_string());
        self.store.update_node(&node)
    }

    pub fn change_edge_hover_display(&mut self, edge_id: i64, text: &str) -> Result<()> {
        let mut edge = self.require_edge(edge_id)?;
        edge.hover_display = Some(text.to_string());
        self.store.update_edge(&edge)
    }

    /// Attach a command to the context menu of a node, replacing any previous one
    pub fn set_custom_command(&mut self, node_id: i64, command: &str, description: &str) -> Result<()> {
        self.require_node(node_id)?;
        self.store.set_custom_command(&CustomCommand {
            node_id,
            command: command.to_string(),
            description: description.to_string(),
        })
    }

    /// Copy `path` next to the database and attach it to a node. Returns the
    /// id of the `node_file` row.
    pub fn associate_file_to_node(&mut self, node_id: i64, path: impl AsRef<Path>, display_content: bool) -> Result<i64> {
        let path = path.as_ref();
        self.require_node(node_id)?;
        let file_name = match path.file_name() {
            Some(name) if path.is_file() => name.to_string_lossy().into_owned(),
            _ => return Err(Error::FileNotFound(path.to_path_buf())),
        };

        let dir = project::attached_files_dir(&self.path);
        fs::create_dir_all(&dir)?;
        let target_name = format!("{node_id}_{file_name}");
        fs::copy(path, dir.join(&target_name))?;

        let dir_name = dir
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let relative = format!("{dir_name}/{target_name}");
        let id = self.store.insert_node_file(node_id, &relative, display_content)?;
        tracing::debug!("Attached {} to node {}", relative, node_id);
        Ok(id)
    }

    fn require_edge(&self, id: i64) -> Result<Edge> {
        self.store
            .get_edge(id)?
            .ok_or(Error::ElementNotFound { table: "edge", id })
    }

    // ========== Inspection ==========

    pub fn node(&self, id: i64) -> Result<Option<Node>> {
        self.store.get_node(id)
    }

    pub fn nodes(&self) -> Result<Vec<Node>> {
        self.store.list_nodes()
    }

    /// Nodes of a single type
    pub fn nodes_of_type(&self, kind: NodeType) -> Result<Vec<Node>> {
        self.store.list_nodes_by_type(kind)
    }

    pub fn edges(&self) -> Result<Vec<Edge>> {
        self.store.list_edges()
    }

    pub fn files(&self) -> Result<Vec<File>> {
        self.store.list_files()
    }

    pub fn stats(&self) -> Result<DbStats> {
        self.store.stats()
    }
}

macro_rules! node_recorders {
    ($($(#[$doc:meta])* $method:ident => $kind:ident),* $(,)?) => {
        impl SourcetrailDb {
            $(
                $(#[$doc])*
                pub fn $method(&mut self, spec: NodeSpec) -> Result<i64> {
                    self.record_node(NodeType::$kind, spec)
                }
            )*
        }
    };
}

node_recorders! {
    record_symbol_node => Symbol,
    record_type_node => Type,
    /// Record a language built-in type such as `int`
    record_builtin_type_node => BuiltinType,
    record_module => Module,
    record_namespace => Namespace,
    record_package => Package,
    record_struct => Struct,
    record_class => Class,
    record_interface => Interface,
    record_annotation => Annotation,
    record_global_variable => GlobalVariable,
    record_field => Field,
    record_function => Function,
    record_method => Method,
    record_enum => Enum,
    record_enum_constant => EnumConstant,
    record_typedef_node => Typedef,
    record_type_parameter_node => TypeParameter,
    record_macro => Macro,
    record_union => Union,
}

macro_rules! reference_recorders {
    ($($method:ident => $kind:ident),* $(,)?) => {
        impl SourcetrailDb {
            $(
                pub fn $method(&mut self, source_id: i64, dest_id: i64) -> Result<i64> {
                    self.record_reference(source_id, dest_id, EdgeType::$kind)
                }
            )*
        }
    };
}

reference_recorders! {
    record_ref_member => Member,
    record_ref_type_usage => TypeUsage,
    record_ref_usage => Usage,
    record_ref_call => Call,
    record_ref_inheritance => Inheritance,
    record_ref_override => Override,
    record_ref_type_argument => TypeArgument,
    record_ref_template_specialization => TemplateSpecialization,
    record_ref_include => Include,
    record_ref_import => Import,
    record_ref_bundled_edges => BundledEdges,
    record_ref_macro_usage => MacroUsage,
    record_ref_annotation_usage => AnnotationUsage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_db() -> (TempDir, SourcetrailDb) {
        let dir = tempfile::tempdir().unwrap();
        let db = SourcetrailDb::create(dir.path().join("test")).unwrap();
        (dir, db)
    }

    fn write_source(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_create_writes_layout() {
        let (dir, db) = new_db();
        assert_eq!(db.path(), dir.path().join("test.srctrldb"));
        assert!(SourcetrailDb::exists(dir.path().join("test")));

        let project = fs::read_to_string(dir.path().join("test.srctrlprj")).unwrap();
        assert_eq!(project, PROJECT_XML);
        assert_eq!(db.store().get_meta("storage_version").unwrap().as_deref(), Some("25"));
        assert_eq!(db.store().get_meta("project_settings").unwrap().as_deref(), Some(PROJECT_XML));
        db.close().unwrap();
    }

    #[test]
    fn test_create_existing_fails() {
        let (dir, db) = new_db();
        db.close().unwrap();
        let result = SourcetrailDb::create(dir.path().join("test.srctrldb"));
        assert!(matches!(result, Err(Error::DatabaseExists(_))));
    }

    #[test]
    fn test_create_in_missing_directory_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("nope").join("sub").join("p");

        let result = SourcetrailDb::create(&base);
        assert!(matches!(result, Err(Error::Storage(_))));
        assert!(!dir.path().join("nope/sub/p.srctrldb").exists());
        assert!(!dir.path().join("nope/sub/p.srctrlprj").exists());
    }

    #[test]
    fn test_create_failure_removes_database_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in place of the project file makes writing it fail
        fs::create_dir(dir.path().join("p.srctrlprj")).unwrap();

        let result = SourcetrailDb::create(dir.path().join("p"));
        assert!(matches!(result, Err(Error::Io(_))));
        assert!(!dir.path().join("p.srctrldb").exists());
        assert!(dir.path().join("p.srctrlprj").is_dir());
    }

    #[test]
    fn test_record_after_clear_returns_live_id() {
        let (_dir, mut db) = new_db();
        let first = db.record_class(NodeSpec::new("A")).unwrap();
        assert_eq!(db.record_class(NodeSpec::new("A")).unwrap(), first);

        db.clear().unwrap();
        let second = db.record_class(NodeSpec::new("A")).unwrap();
        assert!(db.node(second).unwrap().is_some());

        let classes = db.nodes_of_type(NodeType::Class).unwrap();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].id, second);
        assert!(db.nodes_of_type(NodeType::Method).unwrap().is_empty());
    }

    #[test]
    fn test_location_requires_known_ids() {
        let (dir, mut db) = new_db();
        let source = write_source(&dir, "a.c", "int a;\n");
        let file_id = db.record_file(&source, true).unwrap();
        let symbol_id = db.record_global_variable(NodeSpec::new("a")).unwrap();

        let result = db.record_symbol_location(999, &SourceRange::on_line(file_id, 1, 5, 5));
        assert!(matches!(result, Err(Error::ElementNotFound { table: "element", id: 999 })));

        // a symbol is not a file
        let result = db.record_symbol_location(symbol_id, &SourceRange::on_line(symbol_id, 1, 5, 5));
        assert!(matches!(result, Err(Error::ElementNotFound { table: "file", .. })));
        assert_eq!(db.store().count_source_locations().unwrap(), 0);

        db.record_symbol_location(symbol_id, &SourceRange::on_line(file_id, 1, 5, 5)).unwrap();
        assert_eq!(db.store().count_source_locations().unwrap(), 1);
    }

    #[test]
    fn test_open_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = SourcetrailDb::open(dir.path().join("missing"), false);
        assert!(matches!(result, Err(Error::DatabaseNotFound(_))));

        let db = SourcetrailDb::open(dir.path().join("missing"), true).unwrap();
        assert!(db.path().is_file());
        db.close().unwrap();
    }

    #[test]
    fn test_commit_and_close() {
        let (dir, mut db) = new_db();
        db.record_class(NodeSpec::new("Kept")).unwrap();
        db.commit().unwrap();
        db.record_class(NodeSpec::new("Lost")).unwrap();
        db.close().unwrap();

        let db = SourcetrailDb::open(dir.path().join("test"), false).unwrap();
        let nodes = db.nodes().unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].serialized_name, "::\tmKept\ts\tp");
        db.close().unwrap();
    }

    #[test]
    fn test_open_with_clear() {
        let (dir, mut db) = new_db();
        db.record_class(NodeSpec::new("A")).unwrap();
        db.commit().unwrap();
        db.close().unwrap();

        let db = SourcetrailDb::open(dir.path().join("test"), true).unwrap();
        assert_eq!(db.stats().unwrap(), DbStats::default());
        assert_eq!(db.store().get_meta("storage_version").unwrap().as_deref(), Some("25"));
        db.close().unwrap();
    }

    #[test]
    fn test_record_symbol_twice() {
        let (_dir, mut db) = new_db();
        let hierarchy = NameHierarchy::new(
            NameDelimiter::Java,
            vec![NameElement::named("pkg"), NameElement::named("Main")],
        );

        let first = db.record_symbol(&hierarchy).unwrap();
        let second = db.record_symbol(&hierarchy).unwrap();
        assert_eq!(first, second);
        assert_eq!(db.get_symbol(&hierarchy).unwrap(), Some(first));

        let nodes = db.nodes().unwrap();
        assert_eq!(nodes.len(), 2);
        assert!(nodes.iter().all(|n| n.kind == NodeType::Symbol));

        let edges = db.edges().unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].kind, EdgeType::Member);
        assert_eq!(edges[0].source_node_id, nodes[0].id);
        assert_eq!(edges[0].target_node_id, first);
    }

    #[test]
    fn test_record_empty_symbol() {
        let (_dir, mut db) = new_db();
        let hierarchy = NameHierarchy::new(NameDelimiter::Cxx, Vec::new());
        assert!(matches!(db.record_symbol(&hierarchy), Err(Error::Serialize(_))));
    }

    #[test]
    fn test_record_node_with_parent() {
        let (_dir, mut db) = new_db();
        let class_id = db
            .record_class(NodeSpec::new("Main").with_delimiter(NameDelimiter::Java))
            .unwrap();
        let method_id = db
            .record_method(
                NodeSpec::new("run")
                    .with_prefix("void")
                    .with_postfix("()")
                    .with_parent(class_id),
            )
            .unwrap();

        let method = db.node(method_id).unwrap().unwrap();
        assert_eq!(method.kind, NodeType::Method);
        assert_eq!(method.serialized_name, ".\tmMain\ts\tp\tnrun\tsvoid\tp()");
        assert_eq!(
            db.store().get_definition_kind(method_id).unwrap(),
            Some(DefinitionKind::Explicit)
        );

        let members = db.store().get_edges_from(class_id).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].target_node_id, method_id);
    }

    #[test]
    fn test_record_node_missing_parent() {
        let (_dir, mut db) = new_db();
        let result = db.record_field(NodeSpec::new("x").with_parent(999));
        assert!(matches!(result, Err(Error::NodeNotFound(999))));
    }

    #[test]
    fn test_record_node_not_indexed() {
        let (_dir, mut db) = new_db();
        let id = db
            .record_function(NodeSpec::new("printf").not_indexed().with_hover_display("libc"))
            .unwrap();
        assert_eq!(db.store().get_definition_kind(id).unwrap(), None);
        assert_eq!(db.node(id).unwrap().unwrap().hover_display.as_deref(), Some("libc"));
    }

    #[test]
    fn test_symbol_child() {
        let (_dir, mut db) = new_db();
        let ns = db.record_namespace(NodeSpec::new("std")).unwrap();
        let child = db.record_symbol_child(ns, NameElement::named("vector")).unwrap();
        assert_eq!(db.node(child).unwrap().unwrap().serialized_name, "::\tmstd\ts\tp\tnvector\ts\tp");
    }

    #[test]
    fn test_reopen_does_not_duplicate() {
        let (dir, mut db) = new_db();
        let id = db.record_class(NodeSpec::new("A")).unwrap();
        db.commit().unwrap();
        db.close().unwrap();

        let mut db = SourcetrailDb::open(dir.path().join("test"), false).unwrap();
        assert_eq!(db.record_class(NodeSpec::new("A")).unwrap(), id);
        assert_eq!(db.nodes().unwrap().len(), 1);
        db.close().unwrap();
    }

    #[test]
    fn test_references() {
        let (_dir, mut db) = new_db();
        let caller = db.record_function(NodeSpec::new("caller")).unwrap();
        let callee = db.record_function(NodeSpec::new("callee")).unwrap();

        let edge_id = db.record_ref_call(caller, callee).unwrap();
        let edge = db.store().get_edge(edge_id).unwrap().unwrap();
        assert_eq!(edge.kind, EdgeType::Call);
        assert_eq!(edge.source_node_id, caller);

        assert!(matches!(db.record_ref_usage(caller, 12345), Err(Error::NodeNotFound(12345))));
    }

    #[test]
    fn test_unsolved_and_ambiguous_references() {
        let (dir, mut db) = new_db();
        let source = write_source(&dir, "main.c", "int main() { foo(); }\n");
        let file_id = db.record_file(&source, true).unwrap();
        let main_id = db.record_function(NodeSpec::new("main")).unwrap();

        let range = SourceRange::on_line(file_id, 1, 14, 16);
        let edge_id = db
            .record_reference_to_unsolved_symbol(main_id, EdgeType::Call, &range)
            .unwrap();

        let edge = db.store().get_edge(edge_id).unwrap().unwrap();
        let unsolved = db.node(edge.target_node_id).unwrap().unwrap();
        assert_eq!(unsolved.serialized_name, "@\tmunsolved symbol\ts\tp");

        let locations = db.store().get_occurrences(edge_id).unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].kind, SourceLocationType::Unsolved);

        db.record_reference_is_ambiguous(edge_id).unwrap();
        let components = db.store().get_element_components(edge_id).unwrap();
        assert_eq!(components[0].kind, ElementComponentType::IsAmbiguous);

        assert!(matches!(
            db.record_reference_is_ambiguous(main_id),
            Err(Error::ElementNotFound { table: "edge", .. })
        ));
    }

    #[test]
    fn test_record_file() {
        let (dir, mut db) = new_db();
        let source = write_source(&dir, "lib.rs", "fn a() {}\nfn b() {}\nfn c() {}");

        let id = db.record_file(&source, true).unwrap();
        let file = db.store().get_file(id).unwrap().unwrap();
        assert_eq!(file.line_count, 3);
        assert!(file.indexed && file.complete);
        assert_eq!(file.language, "");
        assert_eq!(file.modification_time.len(), "2024-01-01 00:00:00".len());
        assert_eq!(
            db.store().get_file_content(id).unwrap().as_deref(),
            Some("fn a() {}\nfn b() {}\nfn c() {}")
        );

        let node = db.node(id).unwrap().unwrap();
        assert_eq!(node.kind, NodeType::File);
        assert!(node.serialized_name.starts_with("/\tm/"));

        db.record_file_language(id, "rust").unwrap();
        assert_eq!(db.record_file(&source, true).unwrap(), id);
        assert_eq!(db.files().unwrap().len(), 1);
        assert_eq!(db.store().get_file(id).unwrap().unwrap().language, "rust");
    }

    #[test]
    fn test_record_file_not_indexed() {
        let (dir, mut db) = new_db();
        let source = write_source(&dir, "big.c", "a\nb\n");
        let id = db.record_file(&source, false).unwrap();

        let file = db.store().get_file(id).unwrap().unwrap();
        assert_eq!(file.line_count, 0);
        assert!(!file.indexed);
        assert_eq!(db.store().get_file_content(id).unwrap(), None);
    }

    #[test]
    fn test_record_file_missing() {
        let (dir, mut db) = new_db();
        let result = db.record_file(dir.path().join("nope.c"), true);
        assert!(matches!(result, Err(Error::FileNotFound(_))));
        assert!(matches!(
            db.record_file_language(4242, "c"),
            Err(Error::ElementNotFound { table: "file", id: 4242 })
        ));
    }

    #[test]
    fn test_locations() {
        let (dir, mut db) = new_db();
        let source = write_source(&dir, "a.py", "class A:\n    pass\n");
        let file_id = db.record_file(&source, true).unwrap();
        let class_id = db.record_class(NodeSpec::new("A").with_delimiter(NameDelimiter::Java)).unwrap();

        db.record_symbol_location(class_id, &SourceRange::on_line(file_id, 1, 7, 7)).unwrap();
        db.record_symbol_scope_location(class_id, &SourceRange::new(file_id, 1, 1, 2, 8)).unwrap();
        db.record_symbol_signature_location(class_id, &SourceRange::on_line(file_id, 1, 1, 8)).unwrap();
        db.record_qualifier_location(class_id, &SourceRange::on_line(file_id, 1, 7, 7)).unwrap();
        db.record_atomic_source_range(class_id, &SourceRange::new(file_id, 1, 1, 2, 8)).unwrap();

        let kinds: Vec<_> = db
            .store()
            .get_occurrences(class_id)
            .unwrap()
            .into_iter()
            .map(|l| l.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                SourceLocationType::Token,
                SourceLocationType::Scope,
                SourceLocationType::Signature,
                SourceLocationType::Qualifier,
                SourceLocationType::AtomicRange,
            ]
        );
        assert_eq!(db.store().get_locations_in_file(file_id).unwrap().len(), 5);
    }

    #[test]
    fn test_local_symbols() {
        let (dir, mut db) = new_db();
        let source = write_source(&dir, "a.c", "int x = 0;\n");
        let file_id = db.record_file(&source, true).unwrap();

        let first = db.record_local_symbol("a.c<1:5>").unwrap();
        assert_eq!(db.record_local_symbol("a.c<1:5>").unwrap(), first);
        db.record_local_symbol_location(first, &SourceRange::on_line(file_id, 1, 5, 5)).unwrap();

        let locations = db.store().get_occurrences(first).unwrap();
        assert_eq!(locations[0].kind, SourceLocationType::LocalSymbol);
        assert_eq!(db.stats().unwrap().local_symbols, 1);
    }

    #[test]
    fn test_record_error() {
        let (dir, mut db) = new_db();
        let source = write_source(&dir, "bad.c", "int main( {\n");
        let file_id = db.record_file(&source, true).unwrap();

        let id = db
            .record_error("expected ')'", true, &SourceRange::on_line(file_id, 1, 10, 10))
            .unwrap();
        let errors = db.store().list_errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].id, id);
        assert!(errors[0].fatal && errors[0].indexed);
        assert_eq!(errors[0].translation_unit, "");
        assert_eq!(
            db.store().get_occurrences(id).unwrap()[0].kind,
            SourceLocationType::IndexerError
        );
    }

    #[test]
    fn test_component_access() {
        let (_dir, mut db) = new_db();
        let class_id = db.record_class(NodeSpec::new("A")).unwrap();
        let field_id = db.record_field(NodeSpec::new("x").with_parent(class_id)).unwrap();
        db.record_component_access(field_id, AccessKind::Private).unwrap();
        assert_eq!(db.store().get_component_access(field_id).unwrap(), Some(AccessKind::Private));
    }

    #[test]
    fn test_node_type_display() {
        let (_dir, mut db) = new_db();
        db.set_node_type(NodeType::Class, "Components", "component").unwrap();
        let display = db.node_display(NodeType::Class).unwrap();
        assert_eq!(display.graph_display, "Components");
        assert_eq!(display.hover_display, "component");
    }

    #[test]
    fn test_colors() {
        let (_dir, mut db) = new_db();
        let a = db.record_class(NodeSpec::new("A")).unwrap();
        let b = db.record_class(NodeSpec::new("B")).unwrap();
        let edge_id = db.record_ref_inheritance(b, a).unwrap();

        let color = NodeColor::default().with_fill("#336699").with_border("black");
        db.change_node_color(a, &color).unwrap();
        assert_eq!(db.node(a).unwrap().unwrap().node_color().unwrap(), Some(color));

        db.change_edge_color(edge_id, "#f00").unwrap();
        db.change_edge_hover_display(edge_id, "extends").unwrap();
        let edge = db.store().get_edge(edge_id).unwrap().unwrap();
        assert_eq!(edge.color.as_deref(), Some("#f00"));
        assert_eq!(edge.hover_display.as_deref(), Some("extends"));

        let bad = NodeColor::default().with_fill("#zzz");
        assert!(matches!(db.change_node_color(a, &bad), Err(Error::InvalidColor(_))));
        assert!(matches!(db.change_edge_color(edge_id, "12px"), Err(Error::InvalidColor(_))));
        assert!(matches!(db.change_node_color(999, &NodeColor::default()), Err(Error::NodeNotFound(999))));
    }

    #[test]
    fn test_custom_command() {
        let (_dir, mut db) = new_db();
        let id = db.record_function(NodeSpec::new("main")).unwrap();
        db.set_custom_command(id, "code -g main.c:1", "Open in editor").unwrap();
        db.set_custom_command(id, "vim main.c", "Open in vim").unwrap();

        let command = db.store().get_custom_command(id).unwrap().unwrap();
        assert_eq!(command.command, "vim main.c");
        assert_eq!(db.stats().unwrap().custom_commands, 1);
    }

    #[test]
    fn test_associate_file_to_node() {
        let (dir, mut db) = new_db();
        let id = db.record_class(NodeSpec::new("A")).unwrap();
        let notes = write_source(&dir, "notes.md", "# A\n");

        db.associate_file_to_node(id, &notes, true).unwrap();
        let attached = db.store().get_node_files(id).unwrap();
        assert_eq!(attached.len(), 1);
        assert_eq!(attached[0].file_name, format!("test_files/{id}_notes.md"));
        assert!(dir.path().join(&attached[0].file_name).is_file());

        let result = db.associate_file_to_node(id, dir.path().join("missing.md"), false);
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_clear_resets_cache() {
        let (_dir, mut db) = new_db();
        db.record_class(NodeSpec::new("A")).unwrap();
        db.clear().unwrap();
        assert_eq!(db.nodes().unwrap().len(), 0);

        let id = db.record_class(NodeSpec::new("A")).unwrap();
        assert!(db.node(id).unwrap().is_some());
        assert_eq!(db.nodes().unwrap().len(), 1);
    }
}
