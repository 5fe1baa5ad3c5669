//! Workspace discovery and structure
//!
//! A workspace is any directory holding a `.pqc/` folder with the
//! database, workspace config and the CLI session file.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

const WORKSPACE_DIR: &str = ".pqc";
const DATABASE_FILE: &str = "plasticqc.db";
const SESSION_FILE: &str = "session.yaml";
const CONFIG_FILE: &str = "config.yaml";

/// A PlasticQC workspace
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Directory containing `.pqc/`
    root: PathBuf,
}

impl Workspace {
    /// Find the workspace by walking up from the current directory
    pub fn discover() -> Result<Self, WorkspaceError> {
        let current = std::env::current_dir().map_err(|e| WorkspaceError::Io(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find the workspace by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, WorkspaceError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| WorkspaceError::Io(e.to_string()))?;

        loop {
            if current.join(WORKSPACE_DIR).is_dir() {
                return Ok(Self { root: current });
            }
            if !current.pop() {
                return Err(WorkspaceError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new workspace at the given path
    pub fn init(path: &Path) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if root.join(WORKSPACE_DIR).exists() {
            return Err(WorkspaceError::AlreadyExists(root));
        }
        Self::create(root)
    }

    /// Initialize even if `.pqc/` exists; the database is kept
    pub fn init_force(path: &Path) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::create(root)
    }

    fn create(root: PathBuf) -> Result<Self, WorkspaceError> {
        let dir = root.join(WORKSPACE_DIR);
        std::fs::create_dir_all(&dir).map_err(|e| WorkspaceError::Io(e.to_string()))?;
        std::fs::write(dir.join(CONFIG_FILE), Self::default_config())
            .map_err(|e| WorkspaceError::Io(e.to_string()))?;
        std::fs::write(dir.join(".gitignore"), "plasticqc.db\nsession.yaml\n")
            .map_err(|e| WorkspaceError::Io(e.to_string()))?;
        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# PlasticQC workspace configuration

# Directory for exported PDF/XLSX/CSV files (default: current directory)
# export_dir: ""

# Quantity per cycle pre-filled for new standards
# default_quantity_per_cycle: 18

# Default output format (auto, yaml, tsv, json, csv, md, id)
# default_format: auto
"#
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `.pqc` directory
    pub fn pqc_dir(&self) -> PathBuf {
        self.root.join(WORKSPACE_DIR)
    }

    pub fn database_path(&self) -> PathBuf {
        self.pqc_dir().join(DATABASE_FILE)
    }

    pub fn session_path(&self) -> PathBuf {
        self.pqc_dir().join(SESSION_FILE)
    }

    pub fn config_path(&self) -> PathBuf {
        self.pqc_dir().join(CONFIG_FILE)
    }
}

/// Errors that can occur during workspace operations
#[derive(Debug, Error, Diagnostic)]
pub enum WorkspaceError {
    #[error("not a PlasticQC workspace (searched from {searched_from:?})")]
    #[diagnostic(code(pqc::workspace::not_found), help("run `pqc init` to create one"))]
    NotFound { searched_from: PathBuf },

    #[error("PlasticQC workspace already exists at {0:?}")]
    #[diagnostic(code(pqc::workspace::exists), help("use --force to reinitialize"))]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    #[diagnostic(code(pqc::workspace::io))]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();

        assert!(ws.pqc_dir().is_dir());
        assert!(ws.config_path().exists());
        assert!(ws.pqc_dir().join(".gitignore").exists());
        assert!(!ws.database_path().exists());
    }

    #[test]
    fn test_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path()).unwrap();

        let err = Workspace::init(tmp.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::AlreadyExists(_)));
        assert!(Workspace::init_force(tmp.path()).is_ok());
    }

    #[test]
    fn test_discover_from_nested_dir() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path()).unwrap();

        let nested = tmp.path().join("exports/2024/march");
        std::fs::create_dir_all(&nested).unwrap();

        let ws = Workspace::discover_from(&nested).unwrap();
        assert_eq!(
            ws.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_discover_fails_without_workspace() {
        let tmp = tempdir().unwrap();
        let err = Workspace::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::NotFound { .. }));
    }
}
