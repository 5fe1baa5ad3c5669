use clap::Parser;
use miette::Result;
use plasticqc::cli::{commands, logging, Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE so piping into `head` ends quietly instead of panicking
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    logging::init(&global);

    match cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Login(args) => commands::auth::run_login(args, &global),
        Commands::Logout => commands::auth::run_logout(&global),
        Commands::Whoami => commands::auth::run_whoami(&global),
        Commands::User(cmd) => commands::user::run(cmd, &global),
        Commands::Product(cmd) => commands::product::run(cmd, &global),
        Commands::Standard(cmd) => commands::standard::run(cmd, &global),
        Commands::Entry(args) => commands::entry::run(args, &global),
        Commands::Record(cmd) => commands::record::run(cmd, &global),
        Commands::Compare(args) => commands::compare::run(args, &global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
