use crate::catalog::build_catalog;
use crate::docgen::{generate_docs, generate_example_page};
use crate::error::Error;
use crate::registry::{build_registry, Registry};
use crate::scaffold::{scaffold_category, scaffold_example, MissingFilePolicy, ScaffoldOptions};
use crate::scanner::ProjectLayout;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use crate::summary::generate_summary;
use crate::validate::{check_tags, validate_examples};
use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

/// FHEVM example catalog - documentation and scaffolding pipeline for
/// annotated example contracts
#[derive(Parser, Debug)]
#[command(name = "fhevm-catalog")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the examples repository root
    #[arg(long = "root", value_name = "DIR", default_value = ".", global = true)]
    pub root: PathBuf,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of the pipeline.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scaffold a standalone project for one example
    CreateExample {
        /// Example slug (see `list examples`)
        slug: String,
        /// Output directory; must not exist or be empty
        #[arg(short = 'o', long = "output", value_name = "DIR")]
        output: PathBuf,
        /// Explicit template directory, bypassing the fallback chain
        #[arg(long = "template", value_name = "DIR")]
        template: Option<PathBuf>,
        /// Fail on missing source files instead of skipping them
        #[arg(long = "strict")]
        strict: bool,
    },
    /// Scaffold standalone projects for every example of a category
    CreateCategory {
        /// Category name (see `list categories`)
        category: String,
        /// Output directory; must not exist or be empty
        #[arg(short = 'o', long = "output", value_name = "DIR")]
        output: PathBuf,
        /// Explicit template directory, bypassing the fallback chain
        #[arg(long = "template", value_name = "DIR")]
        template: Option<PathBuf>,
        /// Fail on missing source files instead of skipping them
        #[arg(long = "strict")]
        strict: bool,
    },
    /// Generate the documentation tree (all pages, or one example's page)
    Docs {
        /// Regenerate a single example's page only
        #[arg(long = "example", value_name = "SLUG")]
        example: Option<String>,
        /// Documentation output directory (default: <root>/docs)
        #[arg(short = 'o', long = "output", value_name = "DIR")]
        output: Option<PathBuf>,
    },
    /// Regenerate SUMMARY.md from the emitted documentation tree
    Summary {
        /// Documentation directory to scan (default: <root>/docs)
        #[arg(short = 'd', long = "docs", value_name = "DIR")]
        docs: Option<PathBuf>,
    },
    /// Emit the machine-readable catalog
    Catalog {
        /// Output format
        #[arg(short = 'f', long = "format", value_enum, default_value = "json")]
        format: OutputFormat,
        /// Output file path (stdout if not specified)
        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// List known examples or categories
    List {
        /// What to list
        #[arg(value_enum, default_value = "examples")]
        target: ListTarget,
    },
    /// Check that every example carries the required annotation tags
    CheckTags,
    /// Scaffold, install, and test examples end to end
    Validate {
        /// Validate a single example (default: all)
        #[arg(long = "example", value_name = "SLUG")]
        example: Option<String>,
        /// Explicit template directory, bypassing the fallback chain
        #[arg(long = "template", value_name = "DIR")]
        template: Option<PathBuf>,
        /// Fail on missing source files instead of skipping them
        #[arg(long = "strict")]
        strict: bool,
    },
}

/// Catalog output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
}

/// Listing targets
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListTarget {
    /// Example slugs
    Examples,
    /// Category names
    Categories,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    // Validate repository root exists
    if !args.root.exists() {
        bail!("Repository root does not exist: {}", args.root.display());
    }
    if !args.root.is_dir() {
        bail!("Repository root is not a directory: {}", args.root.display());
    }

    info!("Repository root: {}", args.root.display());
    Ok(args)
}

/// Run the selected subcommand
pub fn run(args: CliArgs) -> Result<()> {
    let layout = ProjectLayout::new(args.root.clone());

    match args.command {
        Command::CreateExample {
            slug,
            output,
            template,
            strict,
        } => {
            let registry = build_registry(&layout)?;
            let record = find_example(&registry, &slug)?;
            let opts = scaffold_options(template, strict);
            scaffold_example(record, &layout, &output, &opts)?;
            println!("Scaffolded {} into {}", slug, output.display());
        }
        Command::CreateCategory {
            category,
            output,
            template,
            strict,
        } => {
            let registry = build_registry(&layout)?;
            if !registry.categories.contains_key(&category) {
                return Err(Error::UnknownIdentifier {
                    kind: "category",
                    name: category,
                    valid: registry.categories.keys().cloned().collect(),
                }
                .into());
            }
            let records = registry.category_examples(&category);
            let opts = scaffold_options(template, strict);
            scaffold_category(&category, &records, &layout, &output, &opts)?;
            println!(
                "Scaffolded {} examples of {} into {}",
                records.len(),
                category,
                output.display()
            );
        }
        Command::Docs { example, output } => {
            let registry = build_registry(&layout)?;
            let out_dir = output.unwrap_or_else(|| layout.docs_dir());
            match example {
                Some(slug) => {
                    let record = find_example(&registry, &slug)?;
                    let path = generate_example_page(record, &registry, &layout, &out_dir)?;
                    println!("Wrote {}", path.display());
                }
                None => {
                    generate_docs(&registry, &layout, &out_dir)?;
                    generate_summary(&out_dir)?;
                    println!(
                        "Generated documentation for {} examples in {}",
                        registry.examples.len(),
                        out_dir.display()
                    );
                }
            }
        }
        Command::Summary { docs } => {
            let docs_dir = docs.unwrap_or_else(|| layout.docs_dir());
            let path = generate_summary(&docs_dir)?;
            println!("Wrote {}", path.display());
        }
        Command::Catalog { format, output } => {
            let registry = build_registry(&layout)?;
            let catalog = build_catalog(&registry);
            let content = match format {
                OutputFormat::Json => serialize_json(&catalog)?,
                OutputFormat::Yaml => serialize_yaml(&catalog)?,
            };
            match output {
                Some(path) => {
                    write_to_file(&content, &path)?;
                    println!("Wrote {}", path.display());
                }
                None => println!("{}", content),
            }
        }
        Command::List { target } => {
            let registry = build_registry(&layout)?;
            match target {
                ListTarget::Examples => {
                    for example in &registry.examples {
                        println!(
                            "{}  [{} / {}]  {}",
                            example.slug, example.category, example.difficulty, example.title
                        );
                    }
                }
                ListTarget::Categories => {
                    for (category, slugs) in &registry.categories {
                        println!("{}  ({} examples)", category, slugs.len());
                    }
                }
            }
        }
        Command::CheckTags => {
            let violations = check_tags(&layout)?;
            if violations.is_empty() {
                println!("All example contracts carry the required annotation tags");
            } else {
                for violation in &violations {
                    println!("{}", violation);
                }
                bail!("{} file(s) missing required annotation tags", violations.len());
            }
        }
        Command::Validate {
            example,
            template,
            strict,
        } => {
            let registry = build_registry(&layout)?;
            let slugs: Vec<String> = match example {
                Some(slug) => {
                    find_example(&registry, &slug)?;
                    vec![slug]
                }
                None => registry.slugs().iter().map(|s| s.to_string()).collect(),
            };
            let opts = scaffold_options(template, strict);
            validate_examples(&registry, &layout, &slugs, &opts)?;
            println!("Validated {} example(s)", slugs.len());
        }
    }

    Ok(())
}

/// Looks up an example by slug, failing with the list of valid choices.
fn find_example<'a>(
    registry: &'a Registry,
    slug: &str,
) -> Result<&'a crate::registry::ExampleRecord> {
    registry.get(slug).ok_or_else(|| {
        Error::UnknownIdentifier {
            kind: "example",
            name: slug.to_string(),
            valid: registry.slugs().iter().map(|s| s.to_string()).collect(),
        }
        .into()
    })
}

fn scaffold_options(template: Option<PathBuf>, strict: bool) -> ScaffoldOptions {
    ScaffoldOptions {
        template_override: template,
        policy: if strict {
            MissingFilePolicy::Strict
        } else {
            MissingFilePolicy::BestEffort
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_nonexistent_root_is_rejected() {
        let args = CliArgs::parse_from([
            "fhevm-catalog",
            "--root",
            "/nonexistent/repo",
            "list",
        ]);
        assert!(parse_args_from_parsed(args).is_err());
    }

    #[test]
    fn test_unknown_slug_lists_valid_choices() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("contracts/token")).unwrap();
        fs::write(
            temp_dir.path().join("contracts/token/RealExample.sol"),
            "/// @title R\ncontract RealExample {}",
        )
        .unwrap();
        let layout = ProjectLayout::new(temp_dir.path().to_path_buf());
        let registry = build_registry(&layout).unwrap();

        let err = find_example(&registry, "missing").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Unknown example"));
        assert!(message.contains("real"));
    }

    #[test]
    fn test_list_command_parses() {
        let args = CliArgs::parse_from(["fhevm-catalog", "list", "categories"]);
        assert!(matches!(
            args.command,
            Command::List {
                target: ListTarget::Categories
            }
        ));
    }

    #[test]
    fn test_create_example_command_parses() {
        let args = CliArgs::parse_from([
            "fhevm-catalog",
            "create-example",
            "confidential-transfer",
            "-o",
            "/tmp/out",
            "--strict",
        ]);
        match args.command {
            Command::CreateExample { slug, output, strict, .. } => {
                assert_eq!(slug, "confidential-transfer");
                assert_eq!(output, PathBuf::from("/tmp/out"));
                assert!(strict);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
