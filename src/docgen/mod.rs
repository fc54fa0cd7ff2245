//! Documentation tree generator.
//!
//! Emits a GitBook-style Markdown tree as a pure function of the
//! [`Registry`](crate::registry::Registry): one page per example, one index
//! per category, one page per chapter tag, a pitfalls aggregation, a
//! learning-path page, and a root index. Re-running against an unchanged
//! registry produces byte-identical output; every ordering in the rendered
//! pages is keyed on slugs or names, never on directory-walk order.
//!
//! Navigation (`SUMMARY.md`) is deliberately *not* produced here — see
//! [`summary`](crate::summary), which scans the emitted tree instead so
//! hand-authored pages can coexist with generated ones.

pub mod example_page;
pub mod indexes;

use crate::registry::{ExampleRecord, Registry};
use crate::scanner::ProjectLayout;
use crate::serializer::write_to_file;
use crate::tags::title_case_stem;
use anyhow::{Context, Result};
use log::{debug, info};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// A hand-authored page copied verbatim into the docs root.
#[derive(Debug, Clone)]
pub struct StaticPage {
    /// Output file name (e.g. `getting-started.md`)
    pub file_name: String,
    /// Navigation title: first `# ` heading, else title-cased file stem
    pub title: String,
}

/// Generates the complete documentation tree under `out_dir`.
pub fn generate_docs(registry: &Registry, layout: &ProjectLayout, out_dir: &Path) -> Result<()> {
    info!(
        "Generating documentation for {} examples into {}",
        registry.examples.len(),
        out_dir.display()
    );

    for record in &registry.examples {
        generate_example_page(record, registry, layout, out_dir)?;
    }

    for category in registry.categories.keys() {
        let page = indexes::render_category_index(registry, category);
        write_to_file(&page, &out_dir.join(category).join("README.md"))?;
    }

    let chapter_tags = registry.chapter_tags();
    for tag in &chapter_tags {
        let page = indexes::render_chapter_page(registry, tag);
        write_to_file(&page, &out_dir.join("chapters").join(format!("{}.md", tag)))?;
    }
    if !chapter_tags.is_empty() {
        let page = indexes::render_chapters_index(&chapter_tags);
        write_to_file(&page, &out_dir.join("chapters").join("README.md"))?;
    }

    let static_pages = copy_static_pages(layout, out_dir)?;

    write_to_file(
        &indexes::render_root_index(registry, &static_pages),
        &out_dir.join("README.md"),
    )?;
    write_to_file(&indexes::render_pitfalls_page(registry), &out_dir.join("pitfalls.md"))?;
    write_to_file(
        &indexes::render_learning_paths(registry),
        &out_dir.join("learning-paths.md"),
    )?;

    info!("Documentation written to {}", out_dir.display());
    Ok(())
}

/// Renders and writes a single example's page; returns the written path.
pub fn generate_example_page(
    record: &ExampleRecord,
    registry: &Registry,
    layout: &ProjectLayout,
    out_dir: &Path,
) -> Result<PathBuf> {
    let page = example_page::render(record, registry, layout)?;
    let path = out_dir.join(doc_path(record));
    write_to_file(&page, &path)?;
    debug!("wrote {}", path.display());
    Ok(path)
}

/// The example's page path relative to the docs root.
pub fn doc_path(record: &ExampleRecord) -> String {
    format!("{}/{}.md", record.category, record.doc_name)
}

/// Copies hand-authored pages into the docs root, verbatim.
fn copy_static_pages(layout: &ProjectLayout, out_dir: &Path) -> Result<Vec<StaticPage>> {
    let source_dir = layout.static_pages_dir();
    let mut pages = Vec::new();
    if !source_dir.is_dir() {
        return Ok(pages);
    }

    let mut entries: Vec<PathBuf> = fs::read_dir(&source_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("md"))
        .collect();
    entries.sort();

    for path in entries {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read static page {}", path.display()))?;
        write_to_file(&content, &out_dir.join(&file_name))?;

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        pages.push(StaticPage {
            file_name,
            title: page_title(&content).unwrap_or_else(|| title_case_stem(&stem)),
        });
    }
    Ok(pages)
}

/// Extracts a page's first-level heading.
pub fn page_title(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        line.strip_prefix("# ")
            .map(|rest| rest.trim().to_string())
            .filter(|t| !t.is_empty())
    })
}

/// Extracts pitfall descriptions from a test source.
///
/// A pitfall is any test-case title containing "pitfall" (case-insensitive).
/// Duplicates collapse; the literal "(pitfall)" marker is stripped from the
/// displayed text.
pub fn extract_pitfalls(test_source: &str) -> Vec<String> {
    let re = Regex::new(r#"it\s*\(\s*(?:"([^"]*)"|'([^']*)')"#).expect("test title pattern");
    let marker = Regex::new(r"(?i)\(pitfall\)").expect("pitfall marker pattern");

    let mut seen = std::collections::BTreeSet::new();
    let mut pitfalls = Vec::new();
    for caps in re.captures_iter(test_source) {
        let title = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        if !title.to_lowercase().contains("pitfall") {
            continue;
        }
        let cleaned = marker.replace_all(title, "").trim().to_string();
        if !cleaned.is_empty() && seen.insert(cleaned.clone()) {
            pitfalls.push(cleaned);
        }
    }
    pitfalls
}

/// Escapes text for use inside a Markdown table cell.
pub fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
