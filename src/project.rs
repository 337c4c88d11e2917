//! On-disk layout of a Sourcetrail project
//!
//! A project is a `.srctrldb` SQLite file with a `.srctrlprj` XML file next
//! to it. Files attached to nodes are copied into `<stem>_files/`.

use std::fs;
use std::path::{Path, PathBuf};
use crate::Result;

pub const SOURCETRAIL_DB_EXT: &str = "srctrldb";
pub const SOURCETRAIL_PROJECT_EXT: &str = "srctrlprj";

/// Database format understood by Sourcetrail 2021.4
pub const STORAGE_VERSION: u32 = 25;

/// Content of a freshly created `.srctrlprj` file
pub const PROJECT_XML: &str =
    "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n<config>\n   <version>0</version>\n</config>";

/// Force the `.srctrldb` extension and make the path absolute
pub fn normalize_db_path(path: &Path) -> Result<PathBuf> {
    let path = if path.extension().is_some_and(|ext| ext == SOURCETRAIL_DB_EXT) {
        path.to_path_buf()
    } else {
        path.with_extension(SOURCETRAIL_DB_EXT)
    };
    Ok(std::path::absolute(path)?)
}

/// `.srctrlprj` file sitting next to a database
pub fn project_file_path(db_path: &Path) -> PathBuf {
    db_path.with_extension(SOURCETRAIL_PROJECT_EXT)
}

/// Directory holding the files attached to nodes
pub fn attached_files_dir(db_path: &Path) -> PathBuf {
    let stem = db_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent = db_path.parent().unwrap_or_else(|| Path::new("."));
    parent.join(format!("{stem}_files"))
}

/// Write the project file, replacing any previous one
pub fn write_project_file(db_path: &Path) -> Result<PathBuf> {
    let path = project_file_path(db_path);
    fs::write(&path, PROJECT_XML)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_adds_extension() {
        let path = normalize_db_path(Path::new("/tmp/project")).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/project.srctrldb"));

        let path = normalize_db_path(Path::new("/tmp/project.sqlite")).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/project.srctrldb"));

        let path = normalize_db_path(Path::new("/tmp/project.srctrldb")).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/project.srctrldb"));
    }

    #[test]
    fn test_normalize_makes_absolute() {
        let path = normalize_db_path(Path::new("relative")).unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("relative.srctrldb"));
    }

    #[test]
    fn test_sibling_paths() {
        let db = Path::new("/work/demo.srctrldb");
        assert_eq!(project_file_path(db), PathBuf::from("/work/demo.srctrlprj"));
        assert_eq!(attached_files_dir(db), PathBuf::from("/work/demo_files"));
    }

    #[test]
    fn test_write_project_file() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("demo.srctrldb");
        let written = write_project_file(&db).unwrap();
        assert_eq!(fs::read_to_string(written).unwrap(), PROJECT_XML);
    }
}
