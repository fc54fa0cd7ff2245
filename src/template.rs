//! Shared scaffold template location and lazy materialization.
//!
//! Scaffolds start from a copy of a Hardhat template project. The template
//! is found through a fallback chain: an explicit override path, then the
//! conventional local folders, then any template path declared in the
//! repository's `.gitmodules`. If nothing exists on disk yet, the chain
//! tries to materialize one (submodule init, then a clone of the public
//! template repository) before giving up with remediation guidance.

use crate::error::Error;
use crate::scanner::ProjectLayout;
use anyhow::{bail, Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Repository cloned as a last resort when no local template exists.
const FALLBACK_TEMPLATE_REPO: &str = "https://github.com/zama-ai/fhevm-hardhat-template.git";

/// Conventional template locations relative to the repository root.
const CONVENTIONAL_DIRS: [&str; 2] = ["scaffold-template", "templates/base"];

/// Locates the scaffold template directory.
///
/// # Errors
///
/// Fails if an explicit override does not exist, if a materialization
/// attempt's child process exits non-zero, or with
/// [`Error::TemplateNotFound`] when the whole chain is exhausted.
pub fn locate_template(layout: &ProjectLayout, override_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        if path.is_dir() {
            return Ok(path.to_path_buf());
        }
        bail!("Template override {} does not exist or is not a directory", path.display());
    }

    let mut searched: Vec<PathBuf> = Vec::new();

    if let Some(found) = existing_candidate(layout, &mut searched) {
        return Ok(found);
    }

    // Nothing on disk yet; try to materialize one.
    if layout.root().join(".gitmodules").is_file() {
        info!("Template not found locally; initializing git submodules");
        run_command("git", &["submodule", "update", "--init", "--recursive"], layout.root())?;
        if let Some(found) = existing_candidate(layout, &mut Vec::new()) {
            return Ok(found);
        }
    } else {
        let clone_target = layout.root().join(CONVENTIONAL_DIRS[0]);
        let clone_target_str = clone_target.to_string_lossy();
        info!("Template not found locally; cloning {}", FALLBACK_TEMPLATE_REPO);
        run_command(
            "git",
            &["clone", "--depth", "1", FALLBACK_TEMPLATE_REPO, &*clone_target_str],
            layout.root(),
        )?;
        if clone_target.is_dir() {
            return Ok(clone_target);
        }
    }

    Err(Error::TemplateNotFound { searched }.into())
}

/// Checks the conventional folders and `.gitmodules` declarations for an
/// existing template, recording every candidate tried.
fn existing_candidate(layout: &ProjectLayout, searched: &mut Vec<PathBuf>) -> Option<PathBuf> {
    for dir in CONVENTIONAL_DIRS {
        let candidate = layout.root().join(dir);
        if is_populated_dir(&candidate) {
            return Some(candidate);
        }
        searched.push(candidate);
    }
    for path in gitmodule_paths(layout.root()) {
        let candidate = layout.root().join(&path);
        if is_populated_dir(&candidate) {
            return Some(candidate);
        }
        searched.push(candidate);
    }
    None
}

/// A directory counts as a usable template only if it has content;
/// an uninitialized submodule leaves an empty directory behind.
fn is_populated_dir(path: &Path) -> bool {
    path.is_dir()
        && fs::read_dir(path)
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false)
}

/// Template-looking `path = ...` entries from `.gitmodules`.
fn gitmodule_paths(root: &Path) -> Vec<String> {
    let Ok(content) = fs::read_to_string(root.join(".gitmodules")) else {
        return Vec::new();
    };
    content
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            trimmed
                .strip_prefix("path")
                .map(|rest| rest.trim_start_matches([' ', '=']).trim().to_string())
        })
        .filter(|path| !path.is_empty() && path.to_lowercase().contains("template"))
        .collect()
}

/// Runs a blocking child process with inherited standard streams.
///
/// # Errors
///
/// A non-zero exit status is fatal, matching the pipeline's policy for
/// external process invocations.
pub fn run_command(program: &str, args: &[&str], cwd: &Path) -> Result<()> {
    info!("Running: {} {}", program, args.join(" "));
    let status = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .status()
        .with_context(|| format!("Failed to run {}", program))?;
    if !status.success() {
        bail!("{} {} exited with {}", program, args.join(" "), status);
    }
    Ok(())
}

/// Copies a template tree into `target`, excluding version-control
/// metadata. `target` is created if needed.
pub fn copy_template(template: &Path, target: &Path) -> Result<()> {
    for entry in walkdir::WalkDir::new(template).into_iter().filter_entry(|e| {
        e.file_name().to_string_lossy() != ".git"
    }) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(template)
            .expect("walk stays under the template root");
        if relative.as_os_str().is_empty() {
            continue;
        }
        let dest = target.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)
                .with_context(|| format!("Failed to create {}", dest.display()))?;
        } else {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &dest).with_context(|| {
                format!("Failed to copy {} to {}", entry.path().display(), dest.display())
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_override_path_wins() {
        let temp_dir = TempDir::new().unwrap();
        let template = temp_dir.path().join("my-template");
        fs::create_dir(&template).unwrap();
        let layout = ProjectLayout::new(temp_dir.path().to_path_buf());

        let found = locate_template(&layout, Some(&template)).unwrap();
        assert_eq!(found, template);
    }

    #[test]
    fn test_missing_override_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let layout = ProjectLayout::new(temp_dir.path().to_path_buf());

        let result = locate_template(&layout, Some(Path::new("/nonexistent/template")));
        assert!(result.is_err());
    }

    #[test]
    fn test_conventional_dir_is_found() {
        let temp_dir = TempDir::new().unwrap();
        let template = temp_dir.path().join("scaffold-template");
        fs::create_dir(&template).unwrap();
        fs::write(template.join("package.json"), "{}").unwrap();
        let layout = ProjectLayout::new(temp_dir.path().to_path_buf());

        let found = locate_template(&layout, None).unwrap();
        assert_eq!(found, template);
    }

    #[test]
    fn test_empty_conventional_dir_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        // Present but empty, like an uninitialized submodule
        fs::create_dir(temp_dir.path().join("scaffold-template")).unwrap();
        let populated = temp_dir.path().join("templates/base");
        fs::create_dir_all(&populated).unwrap();
        fs::write(populated.join("package.json"), "{}").unwrap();
        let layout = ProjectLayout::new(temp_dir.path().to_path_buf());

        let found = locate_template(&layout, None).unwrap();
        assert_eq!(found, populated);
    }

    #[test]
    fn test_gitmodule_paths_parsing() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(".gitmodules"),
            "[submodule \"tpl\"]\n\tpath = vendor/hardhat-template\n\turl = https://example.com/tpl.git\n",
        )
        .unwrap();

        let paths = gitmodule_paths(temp_dir.path());
        assert_eq!(paths, vec!["vendor/hardhat-template"]);
    }

    #[test]
    fn test_copy_template_excludes_git_dir() {
        let temp_dir = TempDir::new().unwrap();
        let template = temp_dir.path().join("template");
        fs::create_dir_all(template.join(".git")).unwrap();
        fs::create_dir_all(template.join("contracts")).unwrap();
        fs::write(template.join(".git/config"), "ref").unwrap();
        fs::write(template.join("package.json"), "{}").unwrap();
        fs::write(template.join("contracts/Placeholder.sol"), "contract P {}").unwrap();

        let target = temp_dir.path().join("out");
        copy_template(&template, &target).unwrap();

        assert!(target.join("package.json").is_file());
        assert!(target.join("contracts/Placeholder.sol").is_file());
        assert!(!target.join(".git").exists());
    }
}
