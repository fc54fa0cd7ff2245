//! Annotation linting and end-to-end scaffold validation.

use crate::registry::Registry;
use crate::scaffold::{scaffold_example, ScaffoldOptions};
use crate::scanner::{category_dirs, ProjectLayout, SolScanner};
use crate::tags::extract_tag;
use crate::template::run_command;
use anyhow::{Context, Result};
use log::{info, warn};
use std::fs;
use std::path::PathBuf;

/// Tags every example contract must carry.
///
/// Category is inferrable from the directory and chapters/depends-on are
/// genuinely optional, so only the documentation-bearing tags are required.
pub const REQUIRED_TAGS: [&str; 4] = ["title", "notice", "custom:concept", "custom:difficulty"];

/// One file failing the required-tag check.
#[derive(Debug)]
pub struct TagViolation {
    pub file: PathBuf,
    pub missing: Vec<String>,
}

impl std::fmt::Display for TagViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}: missing @{}", self.file.display(), self.missing.join(", @"))
    }
}

/// Checks every primary example contract for the required tags.
///
/// Violations are collected and reported together rather than failing on
/// the first file; helpers and mocks are dependency-only and exempt.
pub fn check_tags(layout: &ProjectLayout) -> Result<Vec<TagViolation>> {
    let contracts_root = layout.contracts_root();
    let scan = SolScanner::new(contracts_root.clone())
        .scan()
        .with_context(|| format!("Failed to scan {}", contracts_root.display()))?;

    let mut violations = Vec::new();
    for (_category, category_dir) in category_dirs(&contracts_root)? {
        for file in scan.sol_files.iter().filter(|f| f.starts_with(&category_dir)) {
            if file.components().any(|c| {
                let name = c.as_os_str().to_string_lossy();
                name == "helpers" || name == "mocks"
            }) {
                continue;
            }
            let source = fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let missing: Vec<String> = REQUIRED_TAGS
                .iter()
                .filter(|tag| extract_tag(&source, tag).is_none())
                .map(|tag| tag.to_string())
                .collect();
            if !missing.is_empty() {
                violations.push(TagViolation {
                    file: file.clone(),
                    missing,
                });
            }
        }
    }
    Ok(violations)
}

/// Scaffolds each selected example into a scratch directory, installs its
/// dependencies, and runs its tests.
///
/// # Errors
///
/// The first non-zero child-process exit aborts the remainder of the run;
/// the failing scaffold is left on disk for inspection.
pub fn validate_examples(
    registry: &Registry,
    layout: &ProjectLayout,
    slugs: &[String],
    opts: &ScaffoldOptions,
) -> Result<()> {
    for slug in slugs {
        let record = registry
            .get(slug)
            .with_context(|| format!("No example with slug {}", slug))?;

        let scratch = std::env::temp_dir().join(format!(
            "fhevm-validate-{}-{}",
            std::process::id(),
            slug
        ));
        if scratch.exists() {
            fs::remove_dir_all(&scratch)?;
        }

        info!("Validating {} in {}", slug, scratch.display());
        scaffold_example(record, layout, &scratch, opts)?;
        run_command("npm", &["install"], &scratch)
            .with_context(|| format!("npm install failed for {}", slug))?;
        run_command("npx", &["hardhat", "test"], &scratch)
            .with_context(|| format!("tests failed for {}", slug))?;

        if let Err(e) = fs::remove_dir_all(&scratch) {
            warn!("Could not clean up {}: {}", scratch.display(), e);
        }
        info!("{} validated", slug);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_corpus(files: Vec<(&str, &str)>) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        for (path, content) in files {
            let file = temp_dir.path().join(path);
            fs::create_dir_all(file.parent().unwrap()).unwrap();
            fs::write(file, content).unwrap();
        }
        temp_dir
    }

    const COMPLETE: &str = "/// @title T\n/// @notice N\n/// @custom:concept C\n/// @custom:difficulty beginner\ncontract Good {}";

    #[test]
    fn test_check_tags_reports_exactly_the_offenders() {
        let repo = create_corpus(vec![
            ("contracts/token/Good.sol", COMPLETE),
            ("contracts/token/NoTitle.sol", "/// @notice N\n/// @custom:concept C\n/// @custom:difficulty easy\ncontract A {}"),
            ("contracts/auction/Bare.sol", "contract B {}"),
        ]);
        let layout = ProjectLayout::new(repo.path().to_path_buf());

        let violations = check_tags(&layout).unwrap();
        assert_eq!(violations.len(), 2);

        let files: Vec<String> = violations
            .iter()
            .map(|v| v.file.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert!(files.contains(&"NoTitle.sol".to_string()));
        assert!(files.contains(&"Bare.sol".to_string()));

        let no_title = violations
            .iter()
            .find(|v| v.file.ends_with("NoTitle.sol"))
            .unwrap();
        assert_eq!(no_title.missing, vec!["title"]);
        let bare = violations.iter().find(|v| v.file.ends_with("Bare.sol")).unwrap();
        assert_eq!(bare.missing.len(), REQUIRED_TAGS.len());
    }

    #[test]
    fn test_check_tags_clean_corpus_is_empty() {
        let repo = create_corpus(vec![("contracts/token/Good.sol", COMPLETE)]);
        let layout = ProjectLayout::new(repo.path().to_path_buf());

        assert!(check_tags(&layout).unwrap().is_empty());
    }

    #[test]
    fn test_check_tags_exempts_helpers_and_mocks() {
        let repo = create_corpus(vec![
            ("contracts/token/Good.sol", COMPLETE),
            ("contracts/token/helpers/Untagged.sol", "contract H {}"),
            ("contracts/token/mocks/AlsoUntagged.sol", "contract M {}"),
        ]);
        let layout = ProjectLayout::new(repo.path().to_path_buf());

        assert!(check_tags(&layout).unwrap().is_empty());
    }

    #[test]
    fn test_violation_display_names_file_and_tags() {
        let violation = TagViolation {
            file: PathBuf::from("contracts/token/Bad.sol"),
            missing: vec!["title".to_string(), "notice".to_string()],
        };
        let rendered = violation.to_string();
        assert!(rendered.contains("Bad.sol"));
        assert!(rendered.contains("@title"));
        assert!(rendered.contains("@notice"));
    }
}
