use log::debug;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Import statement resolution for dependency discovery.
///
/// Scans raw source text for `import` specifiers and classifies each one:
/// relative specifiers (leading `.`) resolve to files on disk next to the
/// importing file, everything else is an external package whose name feeds
/// the scaffolds' dependency manifests. No module loading happens here;
/// this is purely static classification.
///
/// Both Solidity forms (`import "./Helper.sol";`,
/// `import {Helper} from "./Helper.sol";`) and the TypeScript form used by
/// the Hardhat tests (`import { expect } from "chai";`) are covered by the
/// same specifier pattern.

/// Extracts the quoted specifier of every import statement in `source`.
pub fn extract_imports(source: &str) -> Vec<String> {
    let re = Regex::new(r#"(?m)^\s*import\s+(?:[^"';]*?\bfrom\s+)?["']([^"']+)["']"#)
        .expect("import pattern is valid");
    re.captures_iter(source)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Resolves a relative import specifier against the importing file's
/// directory.
///
/// Specifiers without an extension get `.sol` inferred. Returns `None` for
/// non-relative specifiers and for targets that do not exist on disk
/// (missing files are a soft failure, excluded rather than reported).
pub fn resolve_local(spec: &str, importing_file: &Path) -> Option<PathBuf> {
    if !spec.starts_with('.') {
        return None;
    }
    let base = importing_file.parent()?;
    let mut candidate = base.join(spec);
    if candidate.extension().is_none() {
        candidate.set_extension("sol");
    }
    match normalize(&candidate) {
        Some(resolved) if resolved.is_file() => Some(resolved),
        _ => {
            debug!(
                "import \"{}\" from {} does not resolve to a file",
                spec,
                importing_file.display()
            );
            None
        }
    }
}

/// Classifies a non-relative import specifier as an external package name.
///
/// Scoped packages (`@scope/name/...`) keep their first two path segments,
/// unscoped packages keep the first. Relative specifiers yield `None`.
pub fn external_package(spec: &str) -> Option<String> {
    if spec.starts_with('.') {
        return None;
    }
    let segments: Vec<&str> = spec.split('/').collect();
    if spec.starts_with('@') {
        if segments.len() >= 2 {
            Some(format!("{}/{}", segments[0], segments[1]))
        } else {
            None
        }
    } else {
        segments.first().map(|s| s.to_string())
    }
}

/// Collapses `.` and `..` components without touching the filesystem,
/// so resolution works the same for paths that do not exist yet.
fn normalize(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                if !out.pop() {
                    return None;
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    Some(out)
}
