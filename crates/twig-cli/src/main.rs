//! twig CLI - a single-user local version-control system.

use std::io;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;

use commands::{Cli, Commands};
use error::CliError;

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "TWIG_LOG";

fn main() {
    let cli = Cli::parse();
    output::set_quiet(cli.quiet);
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Add { file } => commands::stage::run_add(&file),
        Commands::Commit { message } => commands::commit::run(&message),
        Commands::Rm { file } => commands::stage::run_rm(&file),
        Commands::Log { json } => commands::log::run(json),
        Commands::GlobalLog => commands::log::run_global(),
        Commands::Find { message } => commands::log::run_find(&message),
        Commands::Status { json } => commands::status::run(json),
        Commands::Checkout { target, files } => {
            commands::checkout::run(target.as_deref(), &files)
        }
        Commands::Branch { name } => commands::branch::run_create(&name),
        Commands::RmBranch { name } => commands::branch::run_remove(&name),
        Commands::Reset { commit } => commands::checkout::run_reset(&commit),
        Commands::Merge { branch } => commands::merge::run(&branch),
        Commands::AddRemote { name, address } => commands::remote::run_add(&name, &address),
        Commands::RmRemote { name } => commands::remote::run_remove(&name),
        Commands::Push { remote, branch } => commands::remote::run_push(&remote, &branch),
        Commands::Fetch { remote, branch } => commands::remote::run_fetch(&remote, &branch),
        Commands::Pull { remote, branch } => commands::remote::run_pull(&remote, &branch),
        Commands::Completions { shell } => commands::completions::run(shell),
        Commands::External(args) => Err(CliError::UnknownCommand(
            args.into_iter().next().unwrap_or_default(),
        )
        .into()),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Send `tracing` events to stderr. `TWIG_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
