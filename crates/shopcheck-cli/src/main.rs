//! shopcheck CLI: storefront end-to-end runs
//!
//! ## Usage
//!
//! ```bash
//! shopcheck run --suite smoke --headless       # Critical paths
//! shopcheck run --suite all -j 4 -m "not slow"  # Everything but timings
//! shopcheck list --show-markers                 # Marker meanings
//! shopcheck setup-data                          # JSON data templates
//! ```

use clap::Parser;
use shopcheck_cli::{handlers, Cli, CliResult, Commands, ProgressReporter};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let mut output = ProgressReporter::new(cli.color.enabled(), cli.quiet);

    match cli.command {
        Commands::Run(ref args) => handlers::execute_run(&cli.config, args, cli.verbose, &mut output),
        Commands::List(ref args) => handlers::execute_list(args),
        Commands::Clean => handlers::execute_clean(&cli.config, &output),
        Commands::SetupData => handlers::execute_setup_data(&cli.config, &output),
        Commands::Config(ref args) => handlers::execute_config(&cli.config, args),
    }
}
