//! Standalone project scaffolding.
//!
//! Turns one registry record (or a whole category) into a self-contained
//! Hardhat project: the shared template, the example's resolved sources,
//! and a synthesized manifest, configs, README, and deploy script. The
//! target directory must be empty before anything is written; that check
//! is the one scaffold invariant that never degrades.

use crate::deploy_plan::{DeployArg, DeployStep};
use crate::error::Error;
use crate::registry::ExampleRecord;
use crate::scanner::ProjectLayout;
use crate::serializer::write_to_file;
use crate::template::{copy_template, locate_template};
use anyhow::{bail, Context, Result};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Policy for source files that are referenced but missing on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingFilePolicy {
    /// Warn and skip the file; the scaffold continues best-effort.
    #[default]
    BestEffort,
    /// Treat a missing file as a hard failure.
    Strict,
}

/// Scaffolding options shared by the single-example and category variants.
#[derive(Debug, Clone, Default)]
pub struct ScaffoldOptions {
    /// Explicit template directory, bypassing the fallback chain
    pub template_override: Option<PathBuf>,
    /// Missing-source-file policy
    pub policy: MissingFilePolicy,
}

/// Dev tooling every scaffold carries regardless of what the example
/// itself imports.
const BASELINE_DEV_PACKAGES: [&str; 10] = [
    "@nomicfoundation/hardhat-toolbox",
    "@types/chai",
    "@types/mocha",
    "@types/node",
    "chai",
    "ethers",
    "hardhat",
    "mocha",
    "ts-node",
    "typescript",
];

/// Scaffolds a single example into `out_dir`.
///
/// # Errors
///
/// Fails with [`Error::OutputDirNotEmpty`] before any write if the target
/// contains files, with [`Error::TemplateNotFound`] if no template can be
/// located or materialized, and under [`MissingFilePolicy::Strict`] if a
/// referenced source file is missing.
pub fn scaffold_example(
    record: &ExampleRecord,
    layout: &ProjectLayout,
    out_dir: &Path,
    opts: &ScaffoldOptions,
) -> Result<()> {
    ensure_empty_target(out_dir)?;
    info!("Scaffolding {} into {}", record.slug, out_dir.display());

    let template = locate_template(layout, opts.template_override.as_deref())?;
    copy_template(&template, out_dir)?;

    // The template ships its own placeholder example; drop it so names
    // can't collide with the injected sources.
    for placeholder in ["contracts", "test", "deploy"] {
        let dir = out_dir.join(placeholder);
        if dir.is_dir() {
            fs::remove_dir_all(&dir)
                .with_context(|| format!("Failed to remove {}", dir.display()))?;
        }
    }
    for fresh in ["contracts", "test", "deploy", ".vscode", ".husky"] {
        fs::create_dir_all(out_dir.join(fresh))?;
    }

    copy_example_sources(record, out_dir, opts.policy)?;

    let root_manifest = read_root_manifest(layout);
    write_to_file(
        &render_package_manifest(record, &root_manifest)?,
        &out_dir.join("package.json"),
    )?;
    write_to_file(HARDHAT_CONFIG, &out_dir.join("hardhat.config.ts"))?;
    write_to_file(TSCONFIG, &out_dir.join("tsconfig.json"))?;
    write_to_file(GITIGNORE, &out_dir.join(".gitignore"))?;
    write_to_file(PRETTIER_CONFIG, &out_dir.join(".prettierrc.yml"))?;
    write_to_file(SOLHINT_CONFIG, &out_dir.join(".solhint.json"))?;
    write_to_file(PRE_COMMIT_HOOK, &out_dir.join(".husky").join("pre-commit"))?;
    write_to_file(VSCODE_SETTINGS, &out_dir.join(".vscode").join("settings.json"))?;
    write_to_file(&render_readme(record), &out_dir.join("README.md"))?;
    write_to_file(&render_deploy_script(record), &out_dir.join("deploy").join("deploy.ts"))?;

    info!("Scaffold for {} complete", record.slug);
    Ok(())
}

/// Scaffolds every example of a category under a shared parent directory,
/// plus a category README and navigation manifest.
pub fn scaffold_category(
    category: &str,
    records: &[&ExampleRecord],
    layout: &ProjectLayout,
    out_dir: &Path,
    opts: &ScaffoldOptions,
) -> Result<()> {
    ensure_empty_target(out_dir)?;
    info!(
        "Scaffolding category {} ({} examples) into {}",
        category,
        records.len(),
        out_dir.display()
    );

    for record in records {
        scaffold_example(record, layout, &out_dir.join(&record.slug), opts)?;
    }

    write_to_file(&render_category_readme(category, records), &out_dir.join("README.md"))?;
    write_to_file(&render_category_summary(category, records), &out_dir.join("SUMMARY.md"))?;
    Ok(())
}

/// Verifies the scaffold target is absent or empty, before any write.
pub fn ensure_empty_target(out_dir: &Path) -> Result<()> {
    if out_dir.exists() {
        let mut entries = fs::read_dir(out_dir)
            .with_context(|| format!("Failed to read {}", out_dir.display()))?;
        if entries.next().is_some() {
            return Err(Error::OutputDirNotEmpty(out_dir.to_path_buf()).into());
        }
    }
    Ok(())
}

/// Copies the example's resolved sources into the scaffold tree.
fn copy_example_sources(
    record: &ExampleRecord,
    out_dir: &Path,
    policy: MissingFilePolicy,
) -> Result<()> {
    let contracts = out_dir.join("contracts");

    copy_source(&record.contract_file, &contracts, policy)?;
    for file in &record.extra_contract_files {
        copy_source(file, &contracts, policy)?;
    }
    for file in &record.helper_files {
        copy_source(file, &contracts.join("helpers"), policy)?;
    }
    for file in &record.mock_files {
        copy_source(file, &contracts.join("mocks"), policy)?;
    }

    match &record.test_file {
        Some(test_file) => copy_source(test_file, &out_dir.join("test"), policy)?,
        None => warn!("{} has no test file; scaffold will ship without tests", record.slug),
    }
    Ok(())
}

/// Copies one source file, honoring the missing-file policy.
fn copy_source(source: &Path, target_dir: &Path, policy: MissingFilePolicy) -> Result<()> {
    let Some(file_name) = source.file_name() else {
        bail!("Source path {} has no file name", source.display());
    };
    if !source.is_file() {
        match policy {
            MissingFilePolicy::BestEffort => {
                warn!("Skipping missing source file {}", source.display());
                return Ok(());
            }
            MissingFilePolicy::Strict => {
                bail!("Referenced source file {} does not exist", source.display())
            }
        }
    }
    fs::create_dir_all(target_dir)?;
    fs::copy(source, target_dir.join(file_name))
        .with_context(|| format!("Failed to copy {}", source.display()))?;
    Ok(())
}

/// Loads the consumed repository's manifest for version lookups; absence
/// just means every version falls back to a wildcard.
fn read_root_manifest(layout: &ProjectLayout) -> serde_json::Value {
    fs::read_to_string(layout.root_manifest())
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok())
        .unwrap_or(serde_json::Value::Null)
}

/// Synthesizes the scaffold's `package.json`.
///
/// Dependency sets come from the record's inferred packages plus the fixed
/// tooling baseline; versions are looked up in the root manifest and
/// default to `"*"` when unknown there.
pub fn render_package_manifest(
    record: &ExampleRecord,
    root_manifest: &serde_json::Value,
) -> Result<String> {
    let mut dependencies = serde_json::Map::new();
    for package in &record.package_dependencies {
        dependencies.insert(
            package.clone(),
            serde_json::Value::String(lookup_version(root_manifest, package)),
        );
    }

    let mut dev_dependencies = serde_json::Map::new();
    for package in BASELINE_DEV_PACKAGES
        .iter()
        .map(|s| s.to_string())
        .chain(record.package_dev_dependencies.iter().cloned())
    {
        if record.package_dependencies.contains(&package) {
            continue;
        }
        dev_dependencies
            .insert(package.clone(), serde_json::Value::String(lookup_version(root_manifest, &package)));
    }

    let manifest = serde_json::json!({
        "name": format!("fhevm-example-{}", record.slug),
        "version": "1.0.0",
        "private": true,
        "description": record.concept,
        "scripts": {
            "compile": "hardhat compile",
            "test": "hardhat test",
            "deploy": "hardhat run deploy/deploy.ts",
            "lint": "solhint 'contracts/**/*.sol'",
        },
        "dependencies": dependencies,
        "devDependencies": dev_dependencies,
    });

    crate::serializer::serialize_json(&manifest)
}

/// Finds a package's version in the root manifest's dependency tables.
fn lookup_version(root_manifest: &serde_json::Value, package: &str) -> String {
    for table in ["dependencies", "devDependencies"] {
        if let Some(version) = root_manifest
            .get(table)
            .and_then(|t| t.get(package))
            .and_then(|v| v.as_str())
        {
            return version.to_string();
        }
    }
    "*".to_string()
}

/// Synthesizes the scaffold README from the record's metadata.
pub fn render_readme(record: &ExampleRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", record.title));
    out.push_str(&format!("> {}\n\n", record.concept));
    out.push_str(&format!(
        "**Category:** {} · **Difficulty:** {}\n\n",
        record.category, record.difficulty
    ));
    out.push_str("## Usage\n\n");
    out.push_str("```bash\nnpm install\nnpx hardhat test\n```\n\n");
    out.push_str("Deploy locally:\n\n");
    out.push_str("```bash\nnpx hardhat run deploy/deploy.ts\n```\n");
    out
}

/// Synthesizes the deploy script from the record's deploy plan.
///
/// Each step becomes a sequential contract-factory deploy call; `@ref`
/// arguments wire to the local variable of the referenced step,
/// `$deployer` to the first signer, `#expr` passes through verbatim.
/// Without a plan the script deploys the primary contract with no
/// arguments.
pub fn render_deploy_script(record: &ExampleRecord) -> String {
    let default_plan;
    let steps: &[DeployStep] = match &record.deploy_plan {
        Some(plan) if !plan.is_empty() => plan,
        _ => {
            default_plan = [DeployStep {
                contract: record.contract_name.clone(),
                args: Vec::new(),
                save_as: None,
                after_deploy: Vec::new(),
            }];
            &default_plan
        }
    };

    let mut out = String::new();
    out.push_str("import { ethers } from \"hardhat\";\n\n");
    out.push_str("async function main() {\n");
    out.push_str("  const [deployer] = await ethers.getSigners();\n");

    // Reference name (save-name or contract name) → local variable.
    let mut variables: std::collections::HashMap<String, String> = std::collections::HashMap::new();

    for step in steps {
        let var = variable_name(step);
        variables.insert(step.contract.clone(), var.clone());
        if let Some(save_as) = &step.save_as {
            variables.insert(save_as.clone(), var.clone());
        }
        out.push('\n');
        out.push_str(&format!(
            "  const {}Factory = await ethers.getContractFactory(\"{}\");\n",
            var, step.contract
        ));
        let args: Vec<String> = step
            .args
            .iter()
            .map(|arg| render_script_arg(arg, &variables))
            .collect();
        out.push_str(&format!(
            "  const {} = await {}Factory.deploy({});\n",
            var,
            var,
            args.join(", ")
        ));
        out.push_str(&format!("  await {}.waitForDeployment();\n", var));
        out.push_str(&format!(
            "  console.log(\"{} deployed to:\", await {}.getAddress());\n",
            step.contract, var
        ));
        for statement in &step.after_deploy {
            out.push_str(&format!("  {}\n", statement));
        }
    }

    out.push_str("}\n\n");
    out.push_str("main().catch((error) => {\n");
    out.push_str("  console.error(error);\n");
    out.push_str("  process.exitCode = 1;\n");
    out.push_str("});\n");
    out
}

/// The local variable a step's deployment binds to.
fn variable_name(step: &DeployStep) -> String {
    match &step.save_as {
        Some(name) => name.clone(),
        None => {
            let mut chars = step.contract.chars();
            match chars.next() {
                Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
                None => "contract".to_string(),
            }
        }
    }
}

fn render_script_arg(arg: &DeployArg, variables: &std::collections::HashMap<String, String>) -> String {
    match arg {
        DeployArg::Ref(name) => {
            let var = variables.get(name).cloned().unwrap_or_else(|| name.clone());
            format!("await {}.getAddress()", var)
        }
        DeployArg::Signer(name) => format!("{}.address", name),
        DeployArg::Expr(code) => code.clone(),
        DeployArg::Str(s) => serde_json::to_string(s).unwrap_or_else(|_| s.clone()),
        DeployArg::Num(n) => n.to_string(),
    }
}

fn render_category_readme(category: &str, records: &[&ExampleRecord]) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {} examples\n\n", crate::tags::title_case_stem(category)));
    out.push_str("| Example | Concept | Difficulty |\n");
    out.push_str("| --- | --- | --- |\n");
    for record in records {
        out.push_str(&format!(
            "| [{}]({}/README.md) | {} | {} |\n",
            record.title,
            record.slug,
            crate::docgen::escape_cell(&record.concept),
            record.difficulty
        ));
    }
    out
}

fn render_category_summary(category: &str, records: &[&ExampleRecord]) -> String {
    let mut out = String::new();
    out.push_str("# Table of contents\n\n");
    out.push_str(&format!("* [{}](README.md)\n", crate::tags::title_case_stem(category)));
    for record in records {
        out.push_str(&format!("* [{}]({}/README.md)\n", record.title, record.slug));
    }
    out
}

const HARDHAT_CONFIG: &str = r#"import "@nomicfoundation/hardhat-toolbox";
import type { HardhatUserConfig } from "hardhat/config";

const config: HardhatUserConfig = {
  solidity: {
    version: "0.8.24",
    settings: {
      optimizer: { enabled: true, runs: 800 },
      evmVersion: "cancun",
    },
  },
  paths: {
    sources: "./contracts",
    tests: "./test",
  },
};

export default config;
"#;

const TSCONFIG: &str = r#"{
  "compilerOptions": {
    "target": "es2022",
    "module": "commonjs",
    "moduleResolution": "node",
    "esModuleInterop": true,
    "strict": true,
    "skipLibCheck": true,
    "resolveJsonModule": true,
    "outDir": "dist"
  },
  "include": ["./deploy", "./test", "./types"],
  "files": ["./hardhat.config.ts"]
}
"#;

const GITIGNORE: &str = r#"node_modules
artifacts
cache
coverage
dist
types
.env
"#;

const PRETTIER_CONFIG: &str = r#"printWidth: 100
singleQuote: false
trailingComma: all
overrides:
  - files: "*.sol"
    options:
      tabWidth: 4
"#;

const SOLHINT_CONFIG: &str = r#"{
  "extends": "solhint:recommended",
  "rules": {
    "compiler-version": ["error", "^0.8.24"],
    "func-visibility": ["warn", { "ignoreConstructors": true }]
  }
}
"#;

const PRE_COMMIT_HOOK: &str = r#"#!/bin/sh
npx lint-staged
"#;

const VSCODE_SETTINGS: &str = r#"{
  "editor.formatOnSave": true,
  "[solidity]": {
    "editor.defaultFormatter": "esbenp.prettier-vscode"
  }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::build_registry;
    use std::fs;
    use tempfile::TempDir;

    /// A consumed repo plus a minimal template, ready to scaffold from.
    fn fixture() -> (TempDir, ProjectLayout) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for (path, content) in [
            (
                "contracts/token/VaultExample.sol",
                "/// @title Encrypted vault\n/// @notice Stores encrypted deposits\n/// @custom:depends-on AccessList\n/// @custom:deploy-plan [{\"contract\":\"AccessList\",\"saveAs\":\"acl\"},{\"contract\":\"VaultExample\",\"args\":[\"@acl\",100,\"$deployer\"]}]\nimport \"@fhevm/solidity/lib/FHE.sol\";\ncontract VaultExample {}",
            ),
            ("contracts/token/helpers/AccessList.sol", "contract AccessList {}"),
            ("test/token/VaultExample.test.ts", "import { expect } from \"chai\";\nit(\"works\", () => {});"),
            ("scaffold-template/package.json", "{ \"name\": \"template\" }"),
            ("scaffold-template/contracts/Placeholder.sol", "contract Placeholder {}"),
            ("scaffold-template/test/Placeholder.test.ts", "// placeholder"),
            (
                "package.json",
                r#"{ "devDependencies": { "hardhat": "^2.24.0", "chai": "^4.5.0" }, "dependencies": { "@fhevm/solidity": "^0.7.0" } }"#,
            ),
        ] {
            let file = root.join(path);
            fs::create_dir_all(file.parent().unwrap()).unwrap();
            fs::write(file, content).unwrap();
        }
        let layout = ProjectLayout::new(root.to_path_buf());
        (temp_dir, layout)
    }

    #[test]
    fn test_scaffold_refuses_non_empty_target() {
        let (_guard, layout) = fixture();
        let registry = build_registry(&layout).unwrap();
        let record = registry.get("vault").unwrap();

        let out = TempDir::new().unwrap();
        fs::write(out.path().join("keep.txt"), "do not touch").unwrap();

        let err = scaffold_example(record, &layout, out.path(), &ScaffoldOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("not empty"));

        // Nothing may have been written next to the existing file
        let entries: Vec<_> = fs::read_dir(out.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_scaffold_example_produces_complete_project() {
        let (_guard, layout) = fixture();
        let registry = build_registry(&layout).unwrap();
        let record = registry.get("vault").unwrap();

        let parent = TempDir::new().unwrap();
        let out = parent.path().join("vault");
        scaffold_example(record, &layout, &out, &ScaffoldOptions::default()).unwrap();

        assert!(out.join("contracts/VaultExample.sol").is_file());
        assert!(out.join("contracts/helpers/AccessList.sol").is_file());
        assert!(out.join("test/VaultExample.test.ts").is_file());
        assert!(out.join("hardhat.config.ts").is_file());
        assert!(out.join("tsconfig.json").is_file());
        assert!(out.join(".husky/pre-commit").is_file());
        assert!(out.join("deploy/deploy.ts").is_file());
        // Template placeholder must be gone
        assert!(!out.join("contracts/Placeholder.sol").exists());
        assert!(!out.join("test/Placeholder.test.ts").exists());

        let manifest: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join("package.json")).unwrap()).unwrap();
        assert_eq!(manifest["name"], "fhevm-example-vault");
        // Version resolved from the root manifest
        assert_eq!(manifest["dependencies"]["@fhevm/solidity"], "^0.7.0");
        assert_eq!(manifest["devDependencies"]["hardhat"], "^2.24.0");
        // Unknown packages fall back to a wildcard
        assert_eq!(manifest["devDependencies"]["typescript"], "*");
    }

    #[test]
    fn test_deploy_script_wires_references() {
        let (_guard, layout) = fixture();
        let registry = build_registry(&layout).unwrap();
        let record = registry.get("vault").unwrap();

        let script = render_deploy_script(record);
        assert!(script.contains("const aclFactory = await ethers.getContractFactory(\"AccessList\");"));
        assert!(script.contains("const acl = await aclFactory.deploy();"));
        assert!(script.contains(
            "await vaultExampleFactory.deploy(await acl.getAddress(), 100, deployer.address)"
        ));
        assert!(script.contains("main().catch"));
    }

    #[test]
    fn test_deploy_script_ref_by_contract_name_uses_variable() {
        let (_guard, layout) = fixture();
        let mut record = build_registry(&layout).unwrap().get("vault").unwrap().clone();
        record.deploy_plan = Some(
            crate::deploy_plan::parse_deploy_plan(
                r#"[{"contract":"Registry"},{"contract":"Token","args":["@Registry"]}]"#,
                &record.contract_file,
            )
            .unwrap(),
        );

        let script = render_deploy_script(&record);
        // The reference names the contract, the call uses its variable
        assert!(script.contains("const registry = await registryFactory.deploy();"));
        assert!(script.contains("await tokenFactory.deploy(await registry.getAddress())"));
    }

    #[test]
    fn test_deploy_script_without_plan_deploys_primary() {
        let (_guard, layout) = fixture();
        let mut record = build_registry(&layout).unwrap().get("vault").unwrap().clone();
        record.deploy_plan = None;

        let script = render_deploy_script(&record);
        assert!(script.contains("getContractFactory(\"VaultExample\")"));
        assert!(script.contains(".deploy();"));
    }

    #[test]
    fn test_strict_policy_fails_on_missing_source() {
        let (_guard, layout) = fixture();
        let registry = build_registry(&layout).unwrap();
        let mut record = registry.get("vault").unwrap().clone();
        record.extra_contract_files = vec![layout.root().join("contracts/token/Gone.sol")];

        let parent = TempDir::new().unwrap();
        let out = parent.path().join("vault");
        let opts = ScaffoldOptions {
            policy: MissingFilePolicy::Strict,
            ..ScaffoldOptions::default()
        };
        assert!(scaffold_example(&record, &layout, &out, &opts).is_err());
    }

    #[test]
    fn test_best_effort_policy_skips_missing_source() {
        let (_guard, layout) = fixture();
        let registry = build_registry(&layout).unwrap();
        let mut record = registry.get("vault").unwrap().clone();
        record.extra_contract_files = vec![layout.root().join("contracts/token/Gone.sol")];

        let parent = TempDir::new().unwrap();
        let out = parent.path().join("vault");
        scaffold_example(&record, &layout, &out, &ScaffoldOptions::default()).unwrap();
        assert!(out.join("contracts/VaultExample.sol").is_file());
        assert!(!out.join("contracts/Gone.sol").exists());
    }

    #[test]
    fn test_scaffold_category_bundle() {
        let (_guard, layout) = fixture();
        let registry = build_registry(&layout).unwrap();
        let records = registry.category_examples("token");

        let parent = TempDir::new().unwrap();
        let out = parent.path().join("token-bundle");
        scaffold_category("token", &records, &layout, &out, &ScaffoldOptions::default()).unwrap();

        assert!(out.join("vault/package.json").is_file());
        let readme = fs::read_to_string(out.join("README.md")).unwrap();
        assert!(readme.contains("[Encrypted vault](vault/README.md)"));
        let summary = fs::read_to_string(out.join("SUMMARY.md")).unwrap();
        assert!(summary.contains("* [Encrypted vault](vault/README.md)"));
    }
}
