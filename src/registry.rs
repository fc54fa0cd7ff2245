use crate::deploy_plan::{parse_deploy_plan, DeployStep};
use crate::imports::{extract_imports, external_package, resolve_local};
use crate::scanner::{category_dirs, ProjectLayout, SolScanner};
use crate::tags::{chapter_list, extract_custom_tag, extract_tag, kebab_case, split_list, title_case_stem};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

/// Concept text used when a contract carries neither `@custom:concept` nor
/// `@notice`.
const DEFAULT_CONCEPT: &str = "Demonstrates an FHEVM pattern";

/// Difficulty tier of an example.
///
/// Normalized from free-text annotations by case-insensitive prefix match;
/// anything that is not clearly "beginner" or "advanced" lands in the
/// middle tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Normalizes a `@custom:difficulty` value.
    pub fn from_annotation(value: Option<&str>) -> Self {
        match value {
            Some(raw) => {
                let lower = raw.trim().to_lowercase();
                if lower.starts_with("begin") {
                    Difficulty::Beginner
                } else if lower.starts_with("adv") {
                    Difficulty::Advanced
                } else {
                    Difficulty::Intermediate
                }
            }
            None => Difficulty::Intermediate,
        }
    }

    /// The display label for the tier.
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }

    /// All tiers in learning order.
    pub fn all() -> [Difficulty; 3] {
        [Difficulty::Beginner, Difficulty::Intermediate, Difficulty::Advanced]
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One discovered example contract with everything the generators need.
#[derive(Debug, Clone)]
pub struct ExampleRecord {
    /// Unique kebab-case identifier derived from the file name
    pub slug: String,
    /// Human-readable title (`@title`, else derived from the file name)
    pub title: String,
    /// One-line teaching concept (`@custom:concept` → `@notice` → default)
    pub concept: String,
    /// The `@notice` annotation, if present
    pub notice: Option<String>,
    /// Logical grouping (`@custom:category`, else the containing directory)
    pub category: String,
    /// Normalized difficulty tier
    pub difficulty: Difficulty,
    /// Kebab-cased topic tags (`@custom:chapter`)
    pub chapters: Vec<String>,
    /// First `contract` declaration in the source
    pub contract_name: String,
    /// File stem with original casing, used for doc file naming
    pub doc_name: String,
    /// Absolute path to the primary source file
    pub contract_file: PathBuf,
    /// Associated test file, if one could be resolved
    pub test_file: Option<PathBuf>,
    /// Declared dependency contract names (`@custom:depends-on`)
    pub depends_on: Vec<String>,
    /// Resolved dependency files living under a `helpers/` directory
    pub helper_files: Vec<PathBuf>,
    /// Resolved dependency files living under a `mocks/` directory
    pub mock_files: Vec<PathBuf>,
    /// Resolved dependency files outside the helper/mock conventions
    pub extra_contract_files: Vec<PathBuf>,
    /// Normalized deploy plan (`@custom:deploy-plan`)
    pub deploy_plan: Option<Vec<DeployStep>>,
    /// External packages imported by the contract sources
    pub package_dependencies: Vec<String>,
    /// External packages imported only by the test file
    pub package_dev_dependencies: Vec<String>,
}

impl ExampleRecord {
    /// All resolved source files belonging to this example, primary first.
    pub fn all_source_files(&self) -> Vec<&PathBuf> {
        std::iter::once(&self.contract_file)
            .chain(self.extra_contract_files.iter())
            .chain(self.helper_files.iter())
            .chain(self.mock_files.iter())
            .collect()
    }
}

/// The single shared intermediate representation.
///
/// Rebuilt from scratch on every invocation by a full directory walk; all
/// downstream generators are pure functions of its contents.
#[derive(Debug, Default)]
pub struct Registry {
    /// All examples, sorted by slug
    pub examples: Vec<ExampleRecord>,
    by_slug: BTreeMap<String, usize>,
    /// Category name → slugs in that category, sorted
    pub categories: BTreeMap<String, Vec<String>>,
    by_contract_name: BTreeMap<String, String>,
}

impl Registry {
    /// Looks up an example by slug.
    pub fn get(&self, slug: &str) -> Option<&ExampleRecord> {
        self.by_slug.get(slug).map(|&idx| &self.examples[idx])
    }

    /// Looks up the slug of the example that declares `contract_name`.
    pub fn slug_for_contract(&self, contract_name: &str) -> Option<&str> {
        self.by_contract_name.get(contract_name).map(String::as_str)
    }

    /// All slugs, sorted.
    pub fn slugs(&self) -> Vec<&str> {
        self.examples.iter().map(|e| e.slug.as_str()).collect()
    }

    /// The examples of one category, in slug order.
    pub fn category_examples(&self, category: &str) -> Vec<&ExampleRecord> {
        self.categories
            .get(category)
            .map(|slugs| slugs.iter().filter_map(|s| self.get(s)).collect())
            .unwrap_or_default()
    }

    /// All chapter tags used anywhere, sorted and deduplicated.
    pub fn chapter_tags(&self) -> Vec<String> {
        let tags: BTreeSet<String> = self
            .examples
            .iter()
            .flat_map(|e| e.chapters.iter().cloned())
            .collect();
        tags.into_iter().collect()
    }
}

/// Builds the registry from the consumed repository.
///
/// Walks the contract tree twice: once to index every contract name
/// (helpers and mocks included, so dependency declarations can point into
/// those folders), then once over the primary example files only.
///
/// # Errors
///
/// Only structural authoring bugs abort the build: a malformed or
/// forward-referencing deploy plan. Missing optional data (tests,
/// dependency files, chapters) degrades to empty fields.
pub fn build_registry(layout: &ProjectLayout) -> Result<Registry> {
    let contracts_root = layout.contracts_root();
    info!("Building example registry from {}", contracts_root.display());

    let scan = SolScanner::new(contracts_root.clone())
        .scan()
        .with_context(|| format!("Failed to scan {}", contracts_root.display()))?;

    let name_index = build_name_index(&scan.sol_files)?;
    debug!("Indexed {} contract names", name_index.len());

    let mut examples: Vec<ExampleRecord> = Vec::new();
    let mut seen_slugs: BTreeSet<String> = BTreeSet::new();

    for (category_name, category_dir) in category_dirs(&contracts_root)? {
        for file in primary_files(&scan.sol_files, &category_dir) {
            match build_record(&file, &category_name, layout, &name_index)? {
                Some(mut record) => {
                    // Base file names are expected to be unique across the
                    // tree; if two categories reuse one, the later record
                    // gets a category-qualified slug to keep the invariant.
                    if !seen_slugs.insert(record.slug.clone()) {
                        let qualified = format!("{}-{}", record.category, record.slug);
                        warn!(
                            "Duplicate slug \"{}\" ({}); using \"{}\"",
                            record.slug,
                            file.display(),
                            qualified
                        );
                        record.slug = qualified;
                        seen_slugs.insert(record.slug.clone());
                    }
                    examples.push(record);
                }
                None => {
                    debug!("Skipping {}: no contract declaration", file.display());
                }
            }
        }
    }

    examples.sort_by(|a, b| a.slug.cmp(&b.slug));

    let mut by_slug = BTreeMap::new();
    let mut categories: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut by_contract_name = BTreeMap::new();
    for (idx, example) in examples.iter().enumerate() {
        by_slug.insert(example.slug.clone(), idx);
        categories
            .entry(example.category.clone())
            .or_default()
            .push(example.slug.clone());
        by_contract_name
            .entry(example.contract_name.clone())
            .or_insert_with(|| example.slug.clone());
    }

    info!(
        "Registry built: {} examples in {} categories",
        examples.len(),
        categories.len()
    );

    Ok(Registry {
        examples,
        by_slug,
        categories,
        by_contract_name,
    })
}

/// Extracts the primary contract name from source text: the first
/// `contract X` declaration found.
pub fn extract_contract_name(source: &str) -> Option<String> {
    let re = Regex::new(r"(?m)^\s*(?:abstract\s+)?contract\s+([A-Za-z_][A-Za-z0-9_]*)")
        .expect("contract pattern is valid");
    re.captures(source).map(|caps| caps[1].to_string())
}

/// Derives the human-facing slug from a file stem.
///
/// Trailing `ExampleFactory` / `Example` teaching suffixes are stripped so
/// paired implementation/factory files produce a clean slug.
pub fn derive_slug(doc_name: &str) -> String {
    let stripped = doc_name
        .strip_suffix("ExampleFactory")
        .or_else(|| doc_name.strip_suffix("Example"))
        .filter(|s| !s.is_empty())
        .unwrap_or(doc_name);
    kebab_case(stripped)
}

/// Maps every contract name in the tree to its defining file.
///
/// Lexicographic scan order, first-seen-wins; a collision is reported
/// rather than silently resolved.
fn build_name_index(sol_files: &[PathBuf]) -> Result<BTreeMap<String, PathBuf>> {
    let mut index: BTreeMap<String, PathBuf> = BTreeMap::new();
    for file in sol_files {
        let source = fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        if let Some(name) = extract_contract_name(&source) {
            if let Some(existing) = index.get(&name) {
                warn!(
                    "Contract name \"{}\" declared in both {} and {}; keeping the first",
                    name,
                    existing.display(),
                    file.display()
                );
            } else {
                index.insert(name, file.clone());
            }
        }
    }
    Ok(index)
}

/// The primary example files of one category: every `.sol` file in its
/// subtree except those under `helpers/` or `mocks/` (dependency-only).
fn primary_files(sol_files: &[PathBuf], category_dir: &Path) -> Vec<PathBuf> {
    sol_files
        .iter()
        .filter(|f| f.starts_with(category_dir))
        .filter(|f| {
            !f.components().any(|c| {
                let name = c.as_os_str().to_string_lossy();
                name == "helpers" || name == "mocks"
            })
        })
        .cloned()
        .collect()
}

fn build_record(
    file: &Path,
    default_category: &str,
    layout: &ProjectLayout,
    name_index: &BTreeMap<String, PathBuf>,
) -> Result<Option<ExampleRecord>> {
    let source =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;

    let Some(contract_name) = extract_contract_name(&source) else {
        return Ok(None);
    };

    let doc_name = file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| contract_name.clone());
    let slug = derive_slug(&doc_name);

    let notice = extract_tag(&source, "notice");
    let title = extract_tag(&source, "title")
        .unwrap_or_else(|| title_case_stem(&kebab_case(&doc_name)));
    let concept = extract_custom_tag(&source, "concept")
        .or_else(|| notice.clone())
        .unwrap_or_else(|| DEFAULT_CONCEPT.to_string());
    let category = extract_custom_tag(&source, "category")
        .unwrap_or_else(|| default_category.to_string());
    let difficulty =
        Difficulty::from_annotation(extract_custom_tag(&source, "difficulty").as_deref());
    let chapters = chapter_list(extract_custom_tag(&source, "chapter").as_deref());
    let depends_on = split_list(extract_custom_tag(&source, "depends-on").as_deref());

    let deploy_plan = match extract_custom_tag(&source, "deploy-plan") {
        Some(raw) => Some(parse_deploy_plan(&raw, file)?),
        None => None,
    };

    let dependency_files = resolve_dependency_files(file, &source, &depends_on, name_index);
    let (helper_files, mock_files, extra_contract_files) = partition_files(dependency_files);

    let test_file = resolve_test_file(
        layout,
        &category,
        &doc_name,
        extract_custom_tag(&source, "test").as_deref(),
        !depends_on.is_empty(),
    );

    let (package_dependencies, package_dev_dependencies) = infer_packages(
        &source,
        helper_files
            .iter()
            .chain(mock_files.iter())
            .chain(extra_contract_files.iter()),
        test_file.as_deref(),
    );

    Ok(Some(ExampleRecord {
        slug,
        title,
        concept,
        notice,
        category,
        difficulty,
        chapters,
        contract_name,
        doc_name,
        contract_file: file.to_path_buf(),
        test_file,
        depends_on,
        helper_files,
        mock_files,
        extra_contract_files,
        deploy_plan,
        package_dependencies,
        package_dev_dependencies,
    }))
}

/// Resolves the full set of files an example depends on: declared
/// `depends-on` names plus the transitive closure of local imports.
fn resolve_dependency_files(
    primary: &Path,
    primary_source: &str,
    depends_on: &[String],
    name_index: &BTreeMap<String, PathBuf>,
) -> BTreeSet<PathBuf> {
    let mut resolved: BTreeSet<PathBuf> = BTreeSet::new();
    let mut queue: VecDeque<PathBuf> = VecDeque::new();

    for spec in extract_imports(primary_source) {
        if let Some(path) = resolve_local(&spec, primary) {
            queue.push_back(path);
        }
    }
    for name in depends_on {
        match name_index.get(name) {
            Some(path) if path != primary => queue.push_back(path.clone()),
            Some(_) => {}
            None => {
                // Soft-fail: a missing dependency may be an intentionally
                // partial example.
                debug!("depends-on \"{}\" does not resolve to any contract", name);
            }
        }
    }

    while let Some(path) = queue.pop_front() {
        if path == primary || !resolved.insert(path.clone()) {
            continue;
        }
        if let Ok(source) = fs::read_to_string(&path) {
            for spec in extract_imports(&source) {
                if let Some(nested) = resolve_local(&spec, &path) {
                    if nested != primary && !resolved.contains(&nested) {
                        queue.push_back(nested);
                    }
                }
            }
        }
    }

    resolved
}

/// Partitions resolved files by directory convention into
/// (helpers, mocks, extra). Each path lands in exactly one set.
fn partition_files(files: BTreeSet<PathBuf>) -> (Vec<PathBuf>, Vec<PathBuf>, Vec<PathBuf>) {
    let mut helpers = Vec::new();
    let mut mocks = Vec::new();
    let mut extra = Vec::new();
    for file in files {
        let parent_name = file
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        match parent_name.as_str() {
            "helpers" => helpers.push(file),
            "mocks" => mocks.push(file),
            _ => extra.push(file),
        }
    }
    (helpers, mocks, extra)
}

/// Resolves the test file: explicit override → conventional path → shared
/// FullFlow fallback (only for examples with dependencies) → none.
fn resolve_test_file(
    layout: &ProjectLayout,
    category: &str,
    doc_name: &str,
    override_name: Option<&str>,
    has_dependencies: bool,
) -> Option<PathBuf> {
    let test_dir = layout.tests_root().join(category);

    if let Some(name) = override_name {
        let candidate = test_dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        warn!(
            "@custom:test override \"{}\" not found under {}",
            name,
            test_dir.display()
        );
    }

    let conventional = test_dir.join(format!("{}.test.ts", doc_name));
    if conventional.is_file() {
        return Some(conventional);
    }

    if has_dependencies {
        let full_flow = test_dir.join("FullFlow.test.ts");
        if full_flow.is_file() {
            return Some(full_flow);
        }
    }

    None
}

/// Infers external package sets: runtime packages from all contract
/// sources, dev packages from the test file alone (minus runtime).
fn infer_packages<'a>(
    primary_source: &str,
    dependency_files: impl Iterator<Item = &'a PathBuf>,
    test_file: Option<&Path>,
) -> (Vec<String>, Vec<String>) {
    let mut runtime: BTreeSet<String> = BTreeSet::new();

    for spec in extract_imports(primary_source) {
        if let Some(pkg) = external_package(&spec) {
            runtime.insert(pkg);
        }
    }
    for file in dependency_files {
        if let Ok(source) = fs::read_to_string(file) {
            for spec in extract_imports(&source) {
                if let Some(pkg) = external_package(&spec) {
                    runtime.insert(pkg);
                }
            }
        }
    }

    let mut dev: BTreeSet<String> = BTreeSet::new();
    if let Some(test) = test_file {
        if let Ok(source) = fs::read_to_string(test) {
            for spec in extract_imports(&source) {
                if let Some(pkg) = external_package(&spec) {
                    if !runtime.contains(&pkg) {
                        dev.insert(pkg);
                    }
                }
            }
        }
    }

    (runtime.into_iter().collect(), dev.into_iter().collect())
}
