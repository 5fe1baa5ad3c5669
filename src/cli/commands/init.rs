//! `pqc init` command - Initialize a new PlasticQC workspace

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::password::verify_password;
use crate::core::store::{Store, BOOTSTRAP_PASSWORD};
use crate::core::workspace::{Workspace, WorkspaceError};
use crate::entities::user::BOOTSTRAP_USERNAME;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Rewrite .pqc/ configuration even if it exists (the database is kept)
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let workspace = if args.force {
        Workspace::init_force(&path)
    } else {
        Workspace::init(&path)
    };

    match workspace {
        Ok(workspace) => {
            let store = Store::open(&workspace.database_path())?;
            let stock_password = store
                .get_user_by_username(BOOTSTRAP_USERNAME)?
                .is_some_and(|u| verify_password(BOOTSTRAP_PASSWORD, &u.password_hash));

            println!(
                "{} Initialized PlasticQC workspace at {}",
                style("✓").green(),
                style(workspace.root().display()).cyan()
            );
            if stock_password {
                println!();
                println!(
                    "Default administrator: {} / {}",
                    style(BOOTSTRAP_USERNAME).cyan(),
                    style(BOOTSTRAP_PASSWORD).cyan()
                );
                println!("Change this password after logging in.");
            }
            println!();
            println!("Next steps:");
            println!("  {} Log in", style("pqc login -u admin").yellow());
            println!("  {} Add a product", style("pqc product new").yellow());
            println!(
                "  {} Define a machine standard",
                style("pqc standard new").yellow()
            );
            Ok(())
        }
        Err(WorkspaceError::AlreadyExists(path)) => {
            println!(
                "{} PlasticQC workspace already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!(
                "Use {} to reinitialize",
                style("pqc init --force").yellow()
            );
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
