//! Per-invocation command context
//!
//! Resolves the workspace, opens its database and restores the persisted
//! session. Every command except `init` and `completions` starts here.

use clap::ValueEnum;
use miette::Result;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, Session, Store, Workspace};

pub struct Context {
    pub workspace: Workspace,
    pub store: Store,
    pub session: Session,
    pub config: Config,
}

impl Context {
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let workspace = match &global.workspace {
            Some(path) => Workspace::discover_from(path)?,
            None => Workspace::discover()?,
        };
        let store = Store::open(&workspace.database_path())?;
        let session = Session::restore(&workspace, &store)?;
        let config = Config::load(Some(&workspace));
        tracing::debug!(
            root = %workspace.root().display(),
            logged_in = session.is_logged_in(),
            "opened workspace"
        );
        Ok(Self {
            workspace,
            store,
            session,
            config,
        })
    }

    /// Output format after applying `default_format` from config
    pub fn format(&self, global: &GlobalOpts) -> OutputFormat {
        if global.format != OutputFormat::Auto {
            return global.format;
        }
        match self.config.default_format.as_deref() {
            Some(name) => OutputFormat::from_str(name, true).unwrap_or_else(|_| {
                tracing::warn!(value = name, "ignoring unknown default_format");
                OutputFormat::Auto
            }),
            None => OutputFormat::Auto,
        }
    }

    pub fn save_session(&self) -> Result<()> {
        self.session.persist(&self.workspace)?;
        Ok(())
    }
}
