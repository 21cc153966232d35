//! # mentions
//!
//! Terminal composer with `@`-mention autocomplete, plus a CLI mode that
//! completes lines from stdin.

use clap::Parser;
use mentions::{Args, cli, logging, tui};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = args.resolve_config()?;

    // Determine if we should run in CLI mode:
    // --cli flag, piped stdin, or --text
    if args.wants_cli(atty_check()) {
        logging::init_stderr(&config.log);
        cli::run(&args, &config).await?;
    } else {
        let _guard = logging::init_file(&config.log)?;
        tui::run(&config).await?;
    }

    Ok(())
}

/// Check if stdin is NOT a terminal (i.e. input is piped).
fn atty_check() -> bool {
    use std::io::IsTerminal;
    !std::io::stdin().is_terminal()
}
