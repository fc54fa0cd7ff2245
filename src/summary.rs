//! Navigation manifest (`SUMMARY.md`) generation.
//!
//! Deliberately decoupled from the registry: navigation is derived by
//! scanning the *emitted* documentation directory, so hand-authored pages
//! dropped into the tree appear in navigation without any registry change.

use crate::docgen::page_title;
use crate::serializer::write_to_file;
use crate::tags::title_case_stem;
use anyhow::{Context, Result};
use log::info;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Subdirectories with a fixed role, listed after the category sections.
const RESERVED_DIRS: [&str; 2] = ["chapters", "api"];

/// Files at the docs root that are not ordinary content pages.
const SPECIAL_FILES: [&str; 2] = ["SUMMARY.md", "README.md"];

/// Scans `docs_dir` and writes its `SUMMARY.md`; returns the written path.
pub fn generate_summary(docs_dir: &Path) -> Result<PathBuf> {
    let summary = render_summary(docs_dir)?;
    let path = docs_dir.join("SUMMARY.md");
    write_to_file(&summary, &path)?;
    info!("Navigation written to {}", path.display());
    Ok(path)
}

/// Renders the navigation manifest for an on-disk documentation tree.
pub fn render_summary(docs_dir: &Path) -> Result<String> {
    let mut out = String::new();
    let _ = writeln!(out, "# Table of contents");
    let _ = writeln!(out);

    // Root index first, then the remaining top-level pages.
    let readme = docs_dir.join("README.md");
    if readme.is_file() {
        let _ = writeln!(out, "* [{}](README.md)", title_of(&readme)?);
    }
    for page in top_level_pages(docs_dir)? {
        let name = file_name(&page);
        let _ = writeln!(out, "* [{}]({})", title_of(&page)?, name);
    }

    let (categories, reserved) = classify_dirs(docs_dir)?;

    if !categories.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Categories");
        let _ = writeln!(out);
        for dir in &categories {
            render_dir(&mut out, dir)?;
        }
    }

    for dir in &reserved {
        let _ = writeln!(out);
        let _ = writeln!(out, "## {}", title_case_stem(&file_name(dir)));
        let _ = writeln!(out);
        render_dir(&mut out, dir)?;
    }

    Ok(out)
}

/// Renders one subdirectory: its `README.md` as the section entry, its
/// other pages nested beneath.
fn render_dir(out: &mut String, dir: &Path) -> Result<()> {
    let dir_name = file_name(dir);
    let readme = dir.join("README.md");

    if readme.is_file() {
        let _ = writeln!(out, "* [{}]({}/README.md)", title_of(&readme)?, dir_name);
    } else {
        let _ = writeln!(out, "* {}", title_case_stem(&dir_name));
    }

    let mut pages: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension().and_then(|s| s.to_str()) == Some("md")
                && file_name(p) != "README.md"
        })
        .collect();
    pages.sort();

    for page in pages {
        let _ = writeln!(
            out,
            "  * [{}]({}/{})",
            title_of(&page)?,
            dir_name,
            file_name(&page)
        );
    }
    Ok(())
}

/// Top-level content pages, sorted by file name.
fn top_level_pages(docs_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pages: Vec<PathBuf> = fs::read_dir(docs_dir)
        .with_context(|| format!("Failed to read docs directory {}", docs_dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension().and_then(|s| s.to_str()) == Some("md")
                && !SPECIAL_FILES.contains(&file_name(p).as_str())
        })
        .collect();
    pages.sort();
    Ok(pages)
}

/// Splits subdirectories into (categories, reserved), each sorted.
fn classify_dirs(docs_dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut categories = Vec::new();
    let mut reserved = Vec::new();
    for entry in fs::read_dir(docs_dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = file_name(&path);
        if !path.is_dir() || name.starts_with('.') {
            continue;
        }
        if RESERVED_DIRS.contains(&name.as_str()) {
            reserved.push(path);
        } else {
            categories.push(path);
        }
    }
    categories.sort();
    reserved.sort();
    Ok((categories, reserved))
}

/// A page's navigation title: its first heading, else its file stem.
fn title_of(page: &Path) -> Result<String> {
    let content = fs::read_to_string(page)
        .with_context(|| format!("Failed to read {}", page.display()))?;
    let stem = page
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(page_title(&content).unwrap_or_else(|| title_case_stem(&stem)))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_docs_tree(files: Vec<(&str, &str)>) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        for (path, content) in files {
            let file_path = temp_dir.path().join(path);
            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&file_path, content).unwrap();
        }
        temp_dir
    }

    #[test]
    fn test_summary_reflects_on_disk_structure() {
        let docs = create_docs_tree(vec![
            ("README.md", "# FHEVM Examples"),
            ("learning-paths.md", "# Learning paths"),
            ("token/README.md", "# Token"),
            ("token/Transfer.md", "# Confidential transfer"),
            ("chapters/README.md", "# Chapters"),
            ("chapters/access-control.md", "# Access Control"),
        ]);

        let summary = render_summary(docs.path()).unwrap();

        assert!(summary.starts_with("# Table of contents\n"));
        assert!(summary.contains("* [FHEVM Examples](README.md)"));
        assert!(summary.contains("* [Learning paths](learning-paths.md)"));
        assert!(summary.contains("* [Token](token/README.md)"));
        assert!(summary.contains("  * [Confidential transfer](token/Transfer.md)"));
        // Reserved dirs come after the categories section
        let categories_at = summary.find("## Categories").unwrap();
        let chapters_at = summary.find("## Chapters").unwrap();
        assert!(categories_at < chapters_at);
    }

    #[test]
    fn test_hand_authored_page_appears_without_registry() {
        let docs = create_docs_tree(vec![
            ("README.md", "# Docs"),
            ("hand-written.md", "# My Extra Notes"),
        ]);

        let summary = render_summary(docs.path()).unwrap();
        assert!(summary.contains("* [My Extra Notes](hand-written.md)"));
    }

    #[test]
    fn test_title_falls_back_to_file_name() {
        let docs = create_docs_tree(vec![
            ("README.md", "# Docs"),
            ("getting-started.md", "no heading here"),
        ]);

        let summary = render_summary(docs.path()).unwrap();
        assert!(summary.contains("* [Getting Started](getting-started.md)"));
    }

    #[test]
    fn test_summary_excludes_itself() {
        let docs = create_docs_tree(vec![
            ("README.md", "# Docs"),
            ("SUMMARY.md", "# Table of contents"),
        ]);

        let summary = render_summary(docs.path()).unwrap();
        assert!(!summary.contains("SUMMARY.md"));
    }

    #[test]
    fn test_generate_summary_writes_file() {
        let docs = create_docs_tree(vec![("README.md", "# Docs")]);

        let path = generate_summary(docs.path()).unwrap();
        assert!(path.ends_with("SUMMARY.md"));
        assert!(fs::read_to_string(path).unwrap().contains("* [Docs](README.md)"));
    }
}
