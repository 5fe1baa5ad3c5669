//! `pqc login`, `pqc logout` and `pqc whoami`

use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Password};
use miette::{IntoDiagnostic, Result};

use crate::cli::{Context, GlobalOpts, OutputFormat};

#[derive(clap::Args, Debug)]
pub struct LoginArgs {
    /// Username (prompted when omitted)
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Password (prompted without echo when omitted)
    #[arg(long, short = 'p', env = "PQC_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

pub fn run_login(args: LoginArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;

    let username = match args.username {
        Some(u) => u,
        None => Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Username")
            .interact_text()
            .into_diagnostic()?,
    };
    let password = match args.password {
        Some(p) => p,
        None => Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Password")
            .interact()
            .into_diagnostic()?,
    };

    let user = ctx.session.login(&ctx.store, &username, &password)?.clone();
    ctx.save_session()?;

    if !global.quiet {
        println!(
            "{} Logged in as {} ({})",
            style("✓").green(),
            style(&user.full_name).cyan(),
            user.role_label()
        );
    }
    Ok(())
}

pub fn run_logout(global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    let was_logged_in = ctx.session.is_logged_in();
    ctx.session.logout();
    ctx.save_session()?;

    if !global.quiet {
        if was_logged_in {
            println!("{} Logged out", style("✓").green());
        } else {
            println!("Not logged in.");
        }
    }
    Ok(())
}

pub fn run_whoami(global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    let user = ctx.session.require_user()?;

    match ctx.format(global) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(user).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(user).into_diagnostic()?);
        }
        OutputFormat::Id => {
            println!("{}", user.username);
        }
        _ => {
            println!(
                "{} ({}, {})",
                style(&user.username).cyan(),
                user.full_name,
                user.role_label()
            );
        }
    }
    Ok(())
}
