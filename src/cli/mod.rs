//! CLI definitions using clap derive API

use clap::builder::{styling::AnsiColor, Styles};
use clap::{Parser, Subcommand};

/// Packmind CLI - workspace synchronization for coding standards
#[derive(Parser, Debug)]
#[command(
    name = "packmind-cli",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Distribute Packmind packages into your workspace",
    long_about = "Packmind CLI installs commands, standards and skills from your Packmind \
                  organization into the workspace, keeps them in sync, and turns local edits \
                  into change proposals.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  packmind-cli install backend\n    \
                  packmind-cli install -r\n    \
                  packmind-cli diff --submit\n    \
                  packmind-cli uninstall backend\n    \
                  packmind-cli status\n\n\
                  \x1b[1m\x1b[32mAuthentication:\x1b[0m\n    \
                  Set PACKMIND_API_KEY to the API key from your Packmind organization."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install packages into the current directory
    Install(InstallArgs),

    /// Remove installed packages
    #[command(alias = "remove")]
    Uninstall(UninstallArgs),

    /// Compare local artifacts against the server
    Diff(DiffArgs),

    /// Overview of packmind.json files in the workspace
    Status,

    /// List available packages in your organization
    List,

    /// Show package details
    Show(ShowArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the install command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Install one package:\n    packmind-cli install backend\n\n\
                  Install several packages:\n    packmind-cli install backend frontend\n\n\
                  Refresh what packmind.json declares:\n    packmind-cli install\n\n\
                  Refresh every packmind.json in the repository:\n    packmind-cli install -r")]
pub struct InstallArgs {
    /// Package slugs to install. Without slugs, installs what packmind.json declares
    pub packages: Vec<String>,

    /// Process every packmind.json in the repository
    #[arg(long, short = 'r')]
    pub recursive: bool,
}

/// Arguments for the uninstall command
#[derive(Parser, Debug)]
pub struct UninstallArgs {
    /// Package slugs to remove
    pub packages: Vec<String>,
}

/// Arguments for the diff command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show local changes:\n    packmind-cli diff\n\n\
                  Submit them as change proposals:\n    packmind-cli diff --submit\n\n\
                  Include proposals already on the server:\n    packmind-cli diff --include-submitted")]
pub struct DiffArgs {
    /// Submit the changes as change proposals
    #[arg(long)]
    pub submit: bool,

    /// Also display changes already submitted
    #[arg(long)]
    pub include_submitted: bool,

    /// Message attached to submitted proposals
    #[arg(long, short = 'm', requires = "submit")]
    pub message: Option<String>,
}

/// Arguments for the show command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Package slug
    pub slug: String,
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}
