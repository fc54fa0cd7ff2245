//! Per-example documentation page rendering.

use crate::deploy_plan::render_arg;
use crate::docgen::{escape_cell, extract_pitfalls};
use crate::registry::{ExampleRecord, Registry};
use crate::scanner::ProjectLayout;
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Renders one example's full documentation page.
///
/// Layout, top to bottom: metadata header, "why this example" paragraph,
/// quick-start command, dependency list, deploy-plan table, embedded
/// contract and test sources, pitfalls. Optional sections are omitted
/// entirely rather than rendered empty.
pub fn render(record: &ExampleRecord, registry: &Registry, layout: &ProjectLayout) -> Result<String> {
    let mut page = String::new();

    writeln!(page, "# {}", record.title)?;
    writeln!(page)?;
    write!(
        page,
        "**Category:** {} · **Difficulty:** {}",
        record.category, record.difficulty
    )?;
    if !record.chapters.is_empty() {
        write!(page, " · **Chapters:** {}", record.chapters.join(", "))?;
    }
    writeln!(page)?;
    writeln!(page)?;
    writeln!(page, "> {}", record.concept)?;

    writeln!(page)?;
    writeln!(page, "## Why this example")?;
    writeln!(page)?;
    writeln!(
        page,
        "{}. The contract below is paired with its Hardhat test so the \
         pattern can be read, run, and reused in isolation.",
        record.concept.trim_end_matches('.')
    )?;

    writeln!(page)?;
    writeln!(page, "## Quick start")?;
    writeln!(page)?;
    writeln!(page, "```bash")?;
    writeln!(page, "{}", quick_start_command(record, layout))?;
    writeln!(page, "```")?;

    if !record.depends_on.is_empty() {
        writeln!(page)?;
        writeln!(page, "## Dependencies")?;
        writeln!(page)?;
        for name in &record.depends_on {
            writeln!(page, "- {}", dependency_entry(name, record, registry))?;
        }
    }

    if let Some(plan) = &record.deploy_plan {
        if !plan.is_empty() {
            writeln!(page)?;
            writeln!(page, "## Deploy plan")?;
            writeln!(page)?;
            writeln!(page, "| Step | Contract | Arguments | Saved as |")?;
            writeln!(page, "| --- | --- | --- | --- |")?;
            for (idx, step) in plan.iter().enumerate() {
                let args = if step.args.is_empty() {
                    "—".to_string()
                } else {
                    escape_cell(
                        &step
                            .args
                            .iter()
                            .map(render_arg)
                            .collect::<Vec<_>>()
                            .join(", "),
                    )
                };
                let saved = step.save_as.as_deref().unwrap_or("—");
                writeln!(page, "| {} | {} | {} | {} |", idx + 1, step.contract, args, saved)?;
            }
        }
    }

    writeln!(page)?;
    writeln!(page, "## Contract")?;
    writeln!(page)?;
    writeln!(page, "```solidity")?;
    let contract_source = fs::read_to_string(&record.contract_file)
        .with_context(|| format!("Failed to read {}", record.contract_file.display()))?;
    writeln!(page, "{}", contract_source.trim_end())?;
    writeln!(page, "```")?;

    if let Some(test_file) = &record.test_file {
        let test_source = fs::read_to_string(test_file)
            .with_context(|| format!("Failed to read {}", test_file.display()))?;
        writeln!(page)?;
        writeln!(page, "## Tests")?;
        writeln!(page)?;
        writeln!(page, "```typescript")?;
        writeln!(page, "{}", test_source.trim_end())?;
        writeln!(page, "```")?;

        let pitfalls = extract_pitfalls(&test_source);
        if !pitfalls.is_empty() {
            writeln!(page)?;
            writeln!(page, "## Pitfalls")?;
            writeln!(page)?;
            for pitfall in pitfalls {
                writeln!(page, "- {}", pitfall)?;
            }
        }
    }

    Ok(page)
}

/// The command a reader runs to exercise the example: its test file's
/// repository-relative path, or a generic invocation when no test exists.
pub fn quick_start_command(record: &ExampleRecord, layout: &ProjectLayout) -> String {
    match &record.test_file {
        Some(test_file) => {
            let relative = test_file
                .strip_prefix(layout.root())
                .unwrap_or(test_file.as_path());
            format!("npx hardhat test {}", path_display(relative))
        }
        None => "npx hardhat test".to_string(),
    }
}

/// Renders one dependency entry, cross-linked when the name belongs to a
/// known example.
fn dependency_entry(name: &str, record: &ExampleRecord, registry: &Registry) -> String {
    match registry.slug_for_contract(name).and_then(|slug| registry.get(slug)) {
        Some(target) if target.slug != record.slug => {
            format!("[{}](../{}/{}.md)", name, target.category, target.doc_name)
        }
        _ => name.to_string(),
    }
}

/// Forward-slash rendering of a relative path, for command lines and links.
fn path_display(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
