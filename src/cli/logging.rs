//! Diagnostic logging to stderr
//!
//! `PQC_LOG` takes an `EnvFilter` directive (e.g. `plasticqc=debug`). Without
//! it the level follows the global flags: `-v` debug, `-q` error, else warn.

use tracing_subscriber::EnvFilter;

use crate::cli::GlobalOpts;

pub const LOG_ENV: &str = "PQC_LOG";

fn default_level(global: &GlobalOpts) -> &'static str {
    if global.verbose {
        "debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    }
}

pub fn init(global: &GlobalOpts) {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level(global)));
    // A second init (e.g. in tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    fn opts(quiet: bool, verbose: bool) -> GlobalOpts {
        GlobalOpts {
            format: OutputFormat::Auto,
            quiet,
            verbose,
            workspace: None,
        }
    }

    #[test]
    fn test_level_from_flags() {
        assert_eq!(default_level(&opts(false, false)), "warn");
        assert_eq!(default_level(&opts(true, false)), "error");
        assert_eq!(default_level(&opts(false, true)), "debug");
        assert_eq!(default_level(&opts(true, true)), "debug");
    }
}
