//! Packmind CLI - workspace synchronization for coding standards
//!
//! Distributes packages of commands, standards and skills from a Packmind
//! organization into local workspaces, keeps them in sync, and turns local
//! edits into change proposals.

use clap::Parser;

mod auth;
mod cli;
mod commands;
mod config;
mod diff;
mod domain;
mod error;
mod gateway;
mod git;
mod orchestrator;
mod submit;
mod sync;
#[cfg(test)]
mod test_support;
mod ui;

use cli::{Cli, Commands};
use error::Result;

fn dispatch(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Install(args) => commands::install::run(args),
        Commands::Uninstall(args) => commands::uninstall::run(args),
        Commands::Diff(args) => commands::diff::run(args),
        Commands::Status => commands::status::run(),
        Commands::List => commands::list::run(),
        Commands::Show(args) => commands::show::run(args),
        Commands::Completions(args) => commands::completions::run(args),
    }
}

fn main() {
    let cli = Cli::parse();

    let code = match dispatch(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            1
        }
    };

    std::process::exit(code);
}
