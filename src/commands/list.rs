//! List command implementation

use crate::commands::helpers;
use crate::error::Result;
use crate::gateway::RemoteGateway;
use crate::ui;

pub fn run() -> Result<i32> {
    let gateway = helpers::gateway()?;

    println!("Fetching available packages...\n");
    let mut packages = match gateway.list_packages() {
        Ok(packages) => packages,
        Err(err) => {
            ui::error("Failed to list packages:");
            ui::error(&err.to_string());
            return Ok(1);
        }
    };

    if packages.is_empty() {
        println!("No packages found.");
        return Ok(0);
    }

    packages.sort_by(|a, b| a.slug.cmp(&b.slug));

    println!("Available packages:\n");
    for (index, package) in packages.iter().enumerate() {
        println!("- {}", ui::file_path(&package.slug));
        println!("    {} {}", ui::bold("Name:"), package.name);
        if let Some(description) = &package.description {
            let mut lines = description
                .trim()
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty());
            if let Some(first) = lines.next() {
                println!("    {} {first}", ui::bold("Description:"));
                for line in lines {
                    println!("                 {line}");
                }
            }
        }
        if index < packages.len() - 1 {
            println!();
        }
    }

    println!("\nHow to install a package:\n");
    println!(
        "  $ packmind-cli install {}",
        ui::file_path(&packages[0].slug)
    );

    Ok(0)
}
