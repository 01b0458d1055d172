//! Uninstall command implementation
//!
//! Removes packages by syncing the directory to the remaining set; the
//! server computes the deletions. Removing the last package is a full
//! cleanup sync against an empty desired set.

use crate::cli::UninstallArgs;
use crate::commands::helpers;
use crate::config;
use crate::error::Result;
use crate::sync::{notify, SyncEngine};
use crate::ui;

pub fn run(args: UninstallArgs) -> Result<i32> {
    let cwd = helpers::current_dir()?;

    if args.packages.is_empty() {
        ui::error("No packages specified.");
        println!();
        println!("Usage: packmind-cli uninstall <package-slug> [package-slug...]");
        println!("       packmind-cli remove <package-slug> [package-slug...]");
        println!();
        println!("Examples:");
        println!("  packmind-cli uninstall backend");
        println!("  packmind-cli remove backend frontend");
        return Ok(1);
    }

    let config_exists = config::exists(&cwd);
    let config = match config::read(&cwd) {
        Ok(config) => config,
        Err(err) => {
            ui::error("Failed to read packmind.json");
            ui::error(&err.to_string());
            eprintln!("\nPlease fix the packmind.json file or delete it to continue.");
            return Ok(1);
        }
    };

    let mut config = config.unwrap_or_default();
    if config.packages.is_empty() {
        if config_exists {
            ui::error("packmind.json is empty.");
        } else {
            ui::error("No packmind.json found in current directory.");
        }
        println!();
        println!("There are no packages to uninstall.");
        println!("To install packages, run: packmind-cli install <package-slug>");
        return Ok(1);
    }

    let previous = config.package_slugs();
    let to_uninstall: Vec<String> = args
        .packages
        .iter()
        .filter(|slug| config.packages.contains_key(*slug))
        .cloned()
        .collect();
    let not_installed: Vec<&String> = args
        .packages
        .iter()
        .filter(|slug| !config.packages.contains_key(*slug))
        .collect();

    if !not_installed.is_empty() {
        let word = helpers::pluralize(not_installed.len(), "package is", "packages are");
        ui::warn(&format!("The following {word} not installed:"));
        for slug in &not_installed {
            println!("   - {slug}");
        }
        println!();
    }

    if to_uninstall.is_empty() {
        ui::error("No packages to uninstall.");
        return Ok(1);
    }

    let word = helpers::pluralize(to_uninstall.len(), "package", "packages");
    println!(
        "Uninstalling {} {word}: {}...",
        to_uninstall.len(),
        to_uninstall.join(", ")
    );

    let remaining: Vec<String> = previous
        .iter()
        .filter(|slug| !to_uninstall.contains(slug))
        .cloned()
        .collect();

    let gateway = helpers::gateway()?;
    let engine = SyncEngine::new(&gateway);

    if remaining.is_empty() {
        println!("Removing all packages and cleaning up...");
    }

    let result = match engine.sync(&cwd, &remaining, &previous, config.agent_ids()) {
        Ok(result) => result,
        Err(err) => {
            ui::error("Failed to uninstall packages:");
            ui::error(&err.to_string());
            return Ok(1);
        }
    };

    if !remaining.is_empty() && (result.recipes_count > 0 || result.standards_count > 0) {
        println!(
            "Removing {} commands and {} standards...",
            result.recipes_count, result.standards_count
        );
    }

    println!("\nremoved {} files", result.total_deleted());

    if !result.errors.is_empty() {
        ui::warn("Errors encountered:");
        for error in &result.errors {
            println!("   - {error}");
        }
        return Ok(1);
    }

    config.packages.retain(|slug, _| remaining.contains(slug));
    config::write(&cwd, &config)?;

    // Remaining set lets the server detect the removals
    let _ = notify::notify_distribution(&gateway, &cwd, &remaining, &result);

    println!();
    if to_uninstall.len() == 1 {
        ui::success(&format!("Package '{}' has been uninstalled.", to_uninstall[0]));
    } else {
        ui::success(&format!(
            "{} packages have been uninstalled.",
            to_uninstall.len()
        ));
    }

    if remaining.is_empty() {
        println!();
        println!("All packages have been uninstalled.");
        println!("Your packmind.json still exists but contains no packages.");
    }

    Ok(0)
}
