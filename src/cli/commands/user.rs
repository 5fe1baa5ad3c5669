//! `pqc user` command - user administration

use chrono::Local;
use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Password};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::confirm;
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{Context, GlobalOpts, OutputFormat};
use crate::core::accounts::{self, UserForm};
use crate::core::session::Session;
use crate::entities::user::User;

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// List users
    List,

    /// Create a user
    New(NewArgs),

    /// Change a user's name, password or role
    Edit(EditArgs),

    /// Delete a user
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Login name (case-sensitive)
    #[arg(long, short = 'u')]
    pub username: String,

    /// Full name shown on records
    #[arg(long, short = 'n')]
    pub full_name: String,

    /// Password (prompted when omitted)
    #[arg(long, short = 'p')]
    pub password: Option<String>,

    /// Grant administrator rights
    #[arg(long)]
    pub admin: bool,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Username or numeric id
    pub user: String,

    /// New login name
    #[arg(long)]
    pub username: Option<String>,

    /// New full name
    #[arg(long, short = 'n')]
    pub full_name: Option<String>,

    /// New password
    #[arg(long, short = 'p', conflicts_with = "change_password")]
    pub password: Option<String>,

    /// Prompt for a new password
    #[arg(long)]
    pub change_password: bool,

    /// Grant administrator rights
    #[arg(long, conflicts_with = "operator")]
    pub admin: bool,

    /// Revoke administrator rights
    #[arg(long)]
    pub operator: bool,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Username or numeric id
    pub user: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

const USER_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("username", "USERNAME", 20),
    ColumnDef::new("full_name", "FULL NAME", 30),
    ColumnDef::new("role", "ROLE", 10),
    ColumnDef::new("created", "CREATED", 18),
];

pub fn run(cmd: UserCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        UserCommands::List => run_list(global),
        UserCommands::New(args) => run_new(args, global),
        UserCommands::Edit(args) => run_edit(args, global),
        UserCommands::Delete(args) => run_delete(args, global),
    }
}

fn prompt_password() -> Result<String> {
    Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .into_diagnostic()
}

fn user_row(user: &User) -> TableRow {
    TableRow::new(user.id.map_or(0, |id| id.get()))
        .cell("id", CellValue::Id(user.id.map_or(0, |id| id.get())))
        .cell("username", CellValue::Text(user.username.clone()))
        .cell("full_name", CellValue::Text(user.full_name.clone()))
        .cell("role", CellValue::Type(user.role_label().to_string()))
        .cell(
            "created",
            CellValue::DateTime(user.created_at.with_timezone(&Local).naive_local()),
        )
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    let users = accounts::list_users(&ctx.store, &ctx.session)?;

    let format = match ctx.format(global) {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&users).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&users).into_diagnostic()?);
        }
        _ => {
            let formatter = TableFormatter::new(USER_COLUMNS, "user");
            let formatter = if global.quiet {
                formatter.without_summary()
            } else {
                formatter
            };
            formatter.output(users.iter().map(user_row), format);
        }
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    // Gate before the password prompt
    ctx.session.require_admin()?;

    let password = match args.password {
        Some(p) => p,
        None => prompt_password()?,
    };
    let form = UserForm {
        username: args.username,
        full_name: args.full_name,
        password: Some(password),
        is_admin: args.admin,
    };
    let id = accounts::create_user(&ctx.store, &ctx.session, &form)?;

    if matches!(global.format, OutputFormat::Id) {
        println!("{}", id);
    } else if !global.quiet {
        println!(
            "{} Created user {} (id {})",
            style("✓").green(),
            style(form.username.trim()).cyan(),
            id
        );
    }
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    ctx.session.require_admin()?;

    let current = accounts::find_user(&ctx.store, &args.user)?;
    let id = current
        .id
        .ok_or_else(|| miette::miette!("user '{}' has not been saved", current.username))?;

    let password = if args.change_password {
        Some(prompt_password()?)
    } else {
        args.password
    };
    let is_admin = if args.admin {
        true
    } else if args.operator {
        false
    } else {
        current.is_admin
    };
    let form = UserForm {
        username: args.username.unwrap_or_else(|| current.username.clone()),
        full_name: args.full_name.unwrap_or_else(|| current.full_name.clone()),
        password,
        is_admin,
    };

    let updated = accounts::update_user(&ctx.store, &ctx.session, id, &form)?;
    // Keep the session valid when admins edit their own account
    if ctx.session.user_id() == Some(id) {
        ctx.session = Session::LoggedIn(updated.clone());
        ctx.save_session()?;
    }
    if !global.quiet {
        println!(
            "{} Updated user {}",
            style("✓").green(),
            style(&updated.username).cyan()
        );
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    ctx.session.require_admin()?;

    let user = accounts::find_user(&ctx.store, &args.user)?;
    let id = user
        .id
        .ok_or_else(|| miette::miette!("user '{}' has not been saved", user.username))?;

    let prompt = format!("Delete user '{}' ({})?", user.username, user.full_name);
    if !confirm(&prompt, args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    let deleted = accounts::delete_user(&ctx.store, &ctx.session, id)?;
    if !global.quiet {
        println!(
            "{} Deleted user {}",
            style("✓").green(),
            style(&deleted.username).cyan()
        );
    }
    Ok(())
}
