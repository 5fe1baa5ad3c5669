//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    auth::LoginArgs, compare::CompareArgs, completions::CompletionsArgs, entry::EntryArgs,
    init::InitArgs, product::ProductCommands, record::RecordCommands,
    standard::StandardCommands, user::UserCommands,
};

#[derive(Parser)]
#[command(name = "pqc")]
#[command(author, version, about = "PlasticQC - production quality control for plastics lines")]
#[command(long_about = "Record per-item measurements of moulded products against per-machine \
tolerance standards, review out-of-spec counts and export records as PDF, Excel or CSV.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Workspace root (default: auto-detect by finding .pqc/)
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new PlasticQC workspace
    Init(InitArgs),

    /// Log in as a user
    Login(LoginArgs),

    /// Log out the current user
    Logout,

    /// Show the logged-in user
    Whoami,

    /// User management (admin)
    #[command(subcommand)]
    User(UserCommands),

    /// Product management
    #[command(subcommand)]
    Product(ProductCommands),

    /// Per-machine tolerance standards of a product
    #[command(subcommand)]
    Standard(StandardCommands),

    /// Enter a new production record
    Entry(EntryArgs),

    /// Review, export and delete production records (admin)
    #[command(subcommand)]
    Record(RecordCommands),

    /// Compare out-of-spec rates for a product over a date range (admin)
    Compare(CompareArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (pretty for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
