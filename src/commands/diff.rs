//! Diff command implementation
//!
//! Compares local artifact files against their canonical remote rendering,
//! reports the divergences grouped by artifact, and optionally submits them
//! as change proposals. Proposals the server already holds are filtered out
//! so re-running the command never duplicates them.

use crate::cli::DiffArgs;
use crate::commands::helpers;
use crate::config;
use crate::diff::grouping::{group_by_artifact, sub_group_by_change};
use crate::diff::DiffEngine;
use crate::domain::{ArtefactDiff, Change};
use crate::error::Result;
use crate::git;
use crate::submit::{check_diffs, submit_diffs, DiffExistence};
use crate::ui;

pub fn run(args: DiffArgs) -> Result<i32> {
    let cwd = helpers::current_dir()?;

    let config = match config::read(&cwd) {
        Ok(config) => config,
        Err(err) => {
            ui::error("Failed to parse packmind.json");
            ui::error(&err.to_string());
            eprintln!("\nPlease fix the packmind.json file or delete it to continue.");
            return Ok(1);
        }
    };

    let config = config.unwrap_or_default();
    let packages = config.package_slugs();
    if packages.is_empty() {
        println!("Usage: packmind-cli diff");
        println!();
        println!("Compare local artifact files against the server.");
        println!("Configure packages in packmind.json first.");
        return Ok(0);
    }

    let Ok(git_context) = git::context_for(&cwd) else {
        ui::error(
            "Could not determine git repository info. The diff command requires a git \
             repository with a remote configured.",
        );
        return Ok(1);
    };

    let word = helpers::pluralize(packages.len(), "package", "packages");
    ui::info(&format!(
        "Comparing {} {word}: {}...",
        packages.len(),
        packages.join(", ")
    ));

    let gateway = helpers::gateway()?;
    let engine = DiffEngine::new(&gateway);
    let diffs = match engine.compute(&cwd, &packages, config.agent_ids(), git_context) {
        Ok(diffs) => diffs,
        Err(err) => {
            ui::error("Failed to diff:");
            ui::error(&err.to_string());
            return Ok(1);
        }
    };

    if diffs.is_empty() {
        println!("No changes found.");
        if args.submit {
            ui::info("No changes to submit.");
        }
        return Ok(0);
    }

    let grouped = group_by_artifact(&diffs);
    let checked = check_diffs(&gateway, &grouped)?;

    let submitted: Vec<&DiffExistence> = checked.iter().filter(|item| item.exists).collect();
    let unsubmitted: Vec<ArtefactDiff> = checked
        .iter()
        .filter(|item| !item.exists)
        .map(|item| item.diff.clone())
        .collect();

    let to_display: Vec<ArtefactDiff> = if args.include_submitted {
        diffs.clone()
    } else {
        unsubmitted.clone()
    };

    if to_display.is_empty() {
        println!("No new changes found.");
        if !submitted.is_empty() {
            for line in submitted_footer(&submitted) {
                ui::info(&line);
            }
        }
        if args.submit {
            ui::info("All changes already submitted.");
        }
        return Ok(0);
    }

    println!("{}", ui::header("\nChanges found:\n"));

    let display_groups = group_by_artifact(&to_display);
    for group in &display_groups {
        let first = &group[0];
        println!(
            "{}",
            ui::bold(&format!(
                "{} \"{}\"",
                first.artifact_type.label(),
                first.artifact_name
            ))
        );

        for sub_group in sub_group_by_change(group) {
            for diff in &sub_group {
                println!("  {}", ui::file_path(&diff.file_path));
            }

            let lead = &sub_group[0];
            let existence = checked.iter().find(|item| item.diff == *lead);
            let submitted_at = existence
                .filter(|item| args.include_submitted && item.exists)
                .and_then(|item| item.created_at.as_deref());
            match submitted_at {
                Some(date) => println!(
                    "  - {} {}",
                    lead.change.label(),
                    ui::dim(&format!("[already submitted on {}]", format_date(date)))
                ),
                None => println!("  - {}", lead.change.label()),
            }

            print_payload(&lead.change);
        }
        println!();
    }

    let change_word = helpers::pluralize(to_display.len(), "change", "changes");
    let mut artefacts: Vec<(crate::domain::ArtifactType, String)> = display_groups
        .iter()
        .map(|group| group[0].artifact_key())
        .collect();
    artefacts.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| a.1.to_lowercase().cmp(&b.1.to_lowercase()))
    });

    let artefact_word = helpers::pluralize(artefacts.len(), "artefact", "artefacts");
    ui::warn(&format!(
        "Summary: {} {change_word} found on {} {artefact_word}:",
        to_display.len(),
        artefacts.len()
    ));
    for (artifact_type, name) in &artefacts {
        ui::warn(&format!("* {} \"{name}\"", artifact_type.label()));
    }

    if !args.include_submitted && !submitted.is_empty() {
        for line in submitted_footer(&submitted) {
            ui::info(&line);
        }
    }

    if args.submit {
        if unsubmitted.is_empty() {
            ui::info("All changes already submitted.");
        } else {
            let groups = group_by_artifact(&unsubmitted);
            let message = args.message.as_deref().unwrap_or_default();
            let outcome = submit_diffs(&gateway, &groups, message)?;

            for error in &outcome.errors {
                if error.is_payload_mismatch() {
                    let kind = error
                        .artifact_type
                        .map_or("artifact", |artifact_type| artifact_type.as_str());
                    ui::error(&format!(
                        "Failed to submit \"{}\": {kind} is outdated, please run \
                         `packmind-cli install` to update it",
                        error.name
                    ));
                } else {
                    ui::error(&format!(
                        "Failed to submit \"{}\": {}",
                        error.name, error.message
                    ));
                }
            }

            let mut parts = Vec::new();
            if outcome.submitted > 0 {
                parts.push(format!("{} submitted", outcome.submitted));
            }
            if outcome.already_submitted > 0 {
                parts.push(format!("{} already submitted", outcome.already_submitted));
            }
            if !outcome.errors.is_empty() {
                let error_word = helpers::pluralize(outcome.errors.len(), "error", "errors");
                parts.push(format!("{} {error_word}", outcome.errors.len()));
            }

            if !parts.is_empty() {
                let summary = format!("Summary: {}", parts.join(", "));
                if outcome.errors.is_empty() && outcome.already_submitted == 0 {
                    ui::success(&summary);
                } else if outcome.submitted > 0 || outcome.already_submitted > 0 {
                    ui::warn(&summary);
                } else {
                    ui::error(&summary);
                }
            }
        }
    }

    Ok(0)
}

const MAX_DELETED_LINES: usize = 3;

/// Render the content preview below a change label
fn print_payload(change: &Change) {
    match change {
        Change::AddSkillFile(payload) => {
            if payload.item.is_base64 {
                println!("{}", ui::added_line("[binary file]"));
            } else {
                for line in payload.item.content.lines() {
                    println!("{}", ui::added_line(line));
                }
            }
        }
        Change::DeleteSkillFile(payload) => {
            if payload.item.is_base64 {
                println!("{}", ui::removed_line("[binary file]"));
            } else {
                let lines: Vec<&str> = payload.item.content.lines().collect();
                for line in lines.iter().take(MAX_DELETED_LINES) {
                    println!("{}", ui::removed_line(line));
                }
                if lines.len() > MAX_DELETED_LINES {
                    println!(
                        "{}",
                        ui::removed_line(&format!(
                            "... and {} more lines deleted",
                            lines.len() - MAX_DELETED_LINES
                        ))
                    );
                }
            }
        }
        Change::UpdateSkillFileContent(payload) if payload.is_base64 => {
            println!("{}", ui::added_line("~ [binary content changed]"));
        }
        Change::UpdateSkillFileContent(payload) => {
            for line in ui::content_diff_lines(&payload.old_value, &payload.new_value) {
                println!("{line}");
            }
        }
        Change::UpdateSkillFilePermissions(payload) => {
            for line in ui::content_diff_lines(&payload.old_value, &payload.new_value) {
                println!("{line}");
            }
        }
        Change::UpdateCommandDescription(payload)
        | Change::UpdateStandardDescription(payload)
        | Change::UpdateSkillName(payload)
        | Change::UpdateSkillDescription(payload)
        | Change::UpdateSkillPrompt(payload)
        | Change::UpdateSkillMetadata(payload)
        | Change::UpdateSkillLicense(payload)
        | Change::UpdateSkillCompatibility(payload)
        | Change::UpdateSkillAllowedTools(payload) => {
            for line in ui::content_diff_lines(&payload.old_value, &payload.new_value) {
                println!("{line}");
            }
        }
    }
}

/// Footer summarizing proposals the server already holds
fn submitted_footer(submitted: &[&DiffExistence]) -> Vec<String> {
    let mut by_artifact: Vec<(String, Vec<&'static str>)> = Vec::new();
    for item in submitted {
        let key = format!(
            "{} \"{}\"",
            item.diff.artifact_type.label(),
            item.diff.artifact_name
        );
        match by_artifact.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, labels)) => labels.push(item.diff.change.label()),
            None => by_artifact.push((key, vec![item.diff.change.label()])),
        }
    }

    let proposal_word = helpers::pluralize(submitted.len(), "change proposal", "change proposals");
    let artefact_word = helpers::pluralize(by_artifact.len(), "artifact", "artifacts");
    let mut lines = vec![format!(
        "{} {proposal_word} already submitted for {} {artefact_word}, run \
         \"packmind-cli diff --include-submitted\" to see details",
        submitted.len(),
        by_artifact.len()
    )];

    for (key, labels) in by_artifact {
        let mut counted: Vec<(&str, usize)> = Vec::new();
        for label in labels {
            match counted.iter_mut().find(|(existing, _)| *existing == label) {
                Some((_, count)) => *count += 1,
                None => counted.push((label, 1)),
            }
        }
        let parts: Vec<String> = counted
            .into_iter()
            .map(|(label, count)| {
                if count > 1 {
                    format!("{label} ({count})")
                } else {
                    label.to_string()
                }
            })
            .collect();
        lines.push(format!("  {key}: {}", parts.join(", ")));
    }

    lines
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// `2026-01-15T10:00:00Z` becomes `Jan 15, 2026`; anything unparseable
/// passes through unchanged
fn format_date(iso: &str) -> String {
    let date = iso.split('T').next().unwrap_or(iso);
    let mut parts = date.split('-');
    let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next()) else {
        return iso.to_string();
    };
    let Ok(month_index) = month.parse::<usize>() else {
        return iso.to_string();
    };
    if month_index == 0 || month_index > 12 {
        return iso.to_string();
    }
    let day = day.trim_start_matches('0');
    format!("{} {day}, {year}", MONTHS[month_index - 1])
}
