use anyhow::Result;
use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Filesystem layout of the consumed example repository.
///
/// Everything the pipeline reads lives under one root: the annotated
/// contracts, their Hardhat tests, hand-authored documentation pages, and
/// the root package manifest used for dependency version lookups.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    /// Creates a layout rooted at the consumed repository's directory.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The repository root itself.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Category-partitioned contract sources: `contracts/<category>/...`.
    pub fn contracts_root(&self) -> PathBuf {
        self.root.join("contracts")
    }

    /// Hardhat tests: `test/<category>/<Name>.test.ts`.
    pub fn tests_root(&self) -> PathBuf {
        self.root.join("test")
    }

    /// Hand-authored pages copied verbatim into the generated docs tree.
    pub fn static_pages_dir(&self) -> PathBuf {
        self.root.join("doc-pages")
    }

    /// The consumed repository's own package manifest.
    pub fn root_manifest(&self) -> PathBuf {
        self.root.join("package.json")
    }

    /// Default output directory for generated documentation.
    pub fn docs_dir(&self) -> PathBuf {
        self.root.join("docs")
    }
}

/// Directory scanner for Solidity sources.
///
/// Recursively walks a contract tree collecting `.sol` files in
/// lexicographic order. The explicit ordering is what makes first-seen-wins
/// name resolution reproducible across filesystems. Hidden directories and
/// Hardhat build output (`node_modules`, `artifacts`, `cache`) are skipped.
pub struct SolScanner {
    root_path: PathBuf,
}

/// Result of a directory scan.
pub struct ScanResult {
    /// All discovered `.sol` files, lexicographically ordered
    pub sol_files: Vec<PathBuf>,
    /// Warning messages for paths that could not be accessed
    pub warnings: Vec<String>,
}

impl SolScanner {
    /// Creates a new scanner for the specified root directory.
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Scans the directory tree and collects all `.sol` files.
    ///
    /// Inaccessible paths produce warnings, not errors; scanning continues.
    ///
    /// # Errors
    ///
    /// Returns an error only if the root directory itself cannot be walked.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut sol_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.path() == self.root_path {
                    return true;
                }
                let file_name = e.file_name().to_string_lossy();
                let is_hidden = file_name.starts_with('.');
                let is_build_dir = e.file_type().is_dir()
                    && matches!(file_name.as_ref(), "node_modules" | "artifacts" | "cache");
                !is_hidden && !is_build_dir
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("sol") {
                        sol_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        Ok(ScanResult { sol_files, warnings })
    }
}

/// Enumerates the category subdirectories directly under the contracts
/// root, lexicographically ordered.
pub fn category_dirs(contracts_root: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut dirs = Vec::new();
    if !contracts_root.is_dir() {
        return Ok(dirs);
    }
    for entry in std::fs::read_dir(contracts_root)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();
        if path.is_dir() && !name.starts_with('.') {
            dirs.push((name, path));
        }
    }
    dirs.sort();
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_collects_sol_files_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir(root.join("token")).unwrap();
        fs::create_dir(root.join("auction")).unwrap();
        fs::write(root.join("token/Transfer.sol"), "contract Transfer {}").unwrap();
        fs::write(root.join("auction/Blind.sol"), "contract Blind {}").unwrap();
        fs::write(root.join("README.md"), "# not solidity").unwrap();

        let scanner = SolScanner::new(root.to_path_buf());
        let result = scanner.scan().unwrap();

        assert_eq!(result.sol_files.len(), 2);
        assert!(result.warnings.is_empty());
        // Lexicographic: auction before token
        assert!(result.sol_files[0].ends_with("auction/Blind.sol"));
        assert!(result.sol_files[1].ends_with("token/Transfer.sol"));
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = SolScanner::new(temp_dir.path().to_path_buf());
        let result = scanner.scan().unwrap();

        assert_eq!(result.sol_files.len(), 0);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_skips_build_and_hidden_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir(root.join("node_modules")).unwrap();
        fs::create_dir(root.join("artifacts")).unwrap();
        fs::create_dir(root.join(".git")).unwrap();
        fs::write(root.join("node_modules/Dep.sol"), "contract Dep {}").unwrap();
        fs::write(root.join("artifacts/Built.sol"), "contract Built {}").unwrap();
        fs::write(root.join(".git/Hidden.sol"), "contract Hidden {}").unwrap();
        fs::write(root.join("Example.sol"), "contract Example {}").unwrap();

        let scanner = SolScanner::new(root.to_path_buf());
        let result = scanner.scan().unwrap();

        assert_eq!(result.sol_files.len(), 1);
        assert!(result.sol_files[0].ends_with("Example.sol"));
    }

    #[test]
    fn test_scan_finds_nested_helpers() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("token/helpers")).unwrap();
        fs::create_dir_all(root.join("token/mocks")).unwrap();
        fs::write(root.join("token/Example.sol"), "contract Example {}").unwrap();
        fs::write(root.join("token/helpers/Registry.sol"), "contract Registry {}").unwrap();
        fs::write(root.join("token/mocks/MockToken.sol"), "contract MockToken {}").unwrap();

        let scanner = SolScanner::new(root.to_path_buf());
        let result = scanner.scan().unwrap();

        assert_eq!(result.sol_files.len(), 3);
    }

    #[test]
    fn test_category_dirs_lexicographic() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir(root.join("token")).unwrap();
        fs::create_dir(root.join("access-control")).unwrap();
        fs::create_dir(root.join(".hidden")).unwrap();
        fs::write(root.join("stray.sol"), "").unwrap();

        let dirs = category_dirs(root).unwrap();
        let names: Vec<&str> = dirs.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["access-control", "token"]);
    }

    #[test]
    fn test_category_dirs_missing_root_is_empty() {
        let dirs = category_dirs(Path::new("/nonexistent/contracts")).unwrap();
        assert!(dirs.is_empty());
    }
}
