//! Install command implementation
//!
//! Installs packages into the current directory, or with `-r` refreshes
//! every managed directory in the repository. Configuration and CLI slugs
//! merge; new slugs are persisted into `packmind.json` after a successful
//! sync.

use std::path::Path;

use crate::cli::InstallArgs;
use crate::commands::helpers;
use crate::config::{self, PackmindConfig};
use crate::error::Result;
use crate::orchestrator;
use crate::sync::{notify, SyncEngine};
use crate::ui;

pub fn run(args: InstallArgs) -> Result<i32> {
    let cwd = helpers::current_dir()?;
    if args.recursive {
        return run_recursive(&cwd);
    }
    run_single(&cwd, &args.packages)
}

fn run_single(cwd: &Path, slugs: &[String]) -> Result<i32> {
    let config_exists = config::exists(cwd);
    let config = match config::read(cwd) {
        Ok(config) => config,
        Err(err) => {
            ui::error("Failed to parse packmind.json");
            ui::error(&err.to_string());
            eprintln!("\nPlease fix the packmind.json file or delete it to continue.");
            return Ok(1);
        }
    };

    let mut config = config.unwrap_or_default();
    if config.has_pinned_versions() {
        ui::warn("Package versions are not supported yet, getting the latest version");
    }

    let previous = config.package_slugs();
    let mut all_packages = previous.clone();
    for slug in slugs {
        if !all_packages.contains(slug) {
            all_packages.push(slug.clone());
        }
    }

    if all_packages.is_empty() {
        if config_exists {
            ui::warn("config packmind.json is empty, no packages to install");
        } else {
            ui::warn("config packmind.json not found");
        }
        println!("Usage: packmind-cli install <package-slug> [package-slug...]");
        println!();
        println!("Examples:");
        println!("  packmind-cli install backend");
        println!("  packmind-cli install backend frontend");
        println!();
        println!("Install commands, standards and skills from the specified packages.");
        return Ok(0);
    }

    if !config_exists && !slugs.is_empty() {
        ui::info("initializing packmind.json");
    }

    let gateway = helpers::gateway()?;
    let engine = SyncEngine::new(&gateway);

    let word = helpers::pluralize(all_packages.len(), "package", "packages");
    let spinner = ui::fetch_spinner(&format!(
        "Fetching {} {word}: {}...",
        all_packages.len(),
        all_packages.join(", ")
    ));
    let result = engine.sync(cwd, &all_packages, &previous, config.agent_ids());
    spinner.finish();

    let result = match result {
        Ok(result) => result,
        Err(err) => {
            ui::error("Failed to install content:");
            ui::error(&err.to_string());
            return Ok(1);
        }
    };

    println!("Installing {}...", helpers::installing_parts(&result));
    println!(
        "\nadded {} files, changed {} files, removed {} files",
        result.files_created,
        result.files_updated,
        result.total_deleted()
    );

    if !result.errors.is_empty() {
        ui::warn("Errors encountered:");
        for error in &result.errors {
            println!("   - {error}");
        }
        return Ok(1);
    }

    for slug in slugs {
        config
            .packages
            .entry(slug.clone())
            .or_insert_with(|| "*".to_string());
    }
    if !slugs.is_empty() {
        config::write(cwd, &config)?;
    }

    if notify::notify_distribution(&gateway, cwd, &all_packages, &result).is_ok() {
        println!("Successfully notified Packmind of the new distribution");
    }

    Ok(0)
}

fn run_recursive(cwd: &Path) -> Result<i32> {
    let gateway = helpers::gateway()?;
    let (entries, report) = orchestrator::recursive_install(&gateway, cwd)?;

    if entries.is_empty() {
        println!("No packmind.json files found in this repository.");
        println!();
        println!("Usage: packmind-cli install -r");
        println!();
        println!("This command requires at least one packmind.json file in the repository.");
        println!("Create a packmind.json file first:");
        println!();
        println!("  packmind-cli install <package-slug>");
        return Ok(0);
    }

    println!("Found {} packmind.json file(s) to process\n", entries.len());

    for install in &report.directories {
        println!("Installing in {}...", install.display_path);
        if !install.skipped && !install.packages.is_empty() {
            let word = helpers::pluralize(install.packages.len(), "package", "packages");
            println!(
                "  Fetching {} {word}: {}...",
                install.packages.len(),
                install.packages.join(", ")
            );
            println!("  Installing {}...", helpers::installing_parts(&install.result));
            println!(
                "  added {} files, changed {} files, removed {} files",
                install.result.files_created,
                install.result.files_updated,
                install.result.total_deleted()
            );
        }
        if let Some(message) = &install.error_message {
            ui::error(&format!("  Error: {message}"));
        }
        println!();
    }

    let dir_word = helpers::pluralize(report.directories_processed, "directory", "directories");
    println!(
        "Summary: {} {dir_word} processed, {} files added, {} changed, {} removed",
        report.directories_processed,
        report.total_files_created,
        report.total_files_updated,
        report.total_files_deleted
    );

    if report.total_notifications > 0 {
        let dist_word =
            helpers::pluralize(report.total_notifications, "distribution", "distributions");
        println!(
            "Notified Packmind of {} {dist_word}",
            report.total_notifications
        );
    }

    let errors = report.errors();
    if !errors.is_empty() {
        println!();
        ui::warn(&format!("{} error(s) encountered:", errors.len()));
        for (directory, message) in errors {
            println!("   - {directory}: {message}");
        }
        return Ok(1);
    }

    Ok(0)
}
