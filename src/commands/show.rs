//! Show command implementation

use crate::cli::ShowArgs;
use crate::commands::helpers;
use crate::error::Result;
use crate::gateway::{RemoteGateway, SummarizedArtifact};
use crate::ui;

pub fn run(args: ShowArgs) -> Result<i32> {
    let gateway = helpers::gateway()?;

    println!("Fetching package details for '{}'...\n", args.slug);
    let package = match gateway.package_details(&args.slug) {
        Ok(package) => package,
        Err(err) => {
            ui::error("Failed to fetch package details:");
            ui::error(&err.to_string());
            return Ok(1);
        }
    };

    println!("{} ({}):\n", ui::bold(&package.name), package.slug);

    if let Some(description) = &package.description {
        println!("{description}\n");
    }

    print_section("Standards:", &package.standards);
    print_section("Commands:", &package.commands);

    Ok(0)
}

fn print_section(title: &str, artifacts: &[SummarizedArtifact]) {
    if artifacts.is_empty() {
        return;
    }
    println!("{}", ui::bold(title));
    for artifact in artifacts {
        match &artifact.summary {
            Some(summary) => println!("  - {}: {summary}", artifact.name),
            None => println!("  - {}", artifact.name),
        }
    }
    println!();
}
