//! FHEVM Example Catalog - documentation and scaffolding pipeline for
//! annotated example contracts.
//!
//! This library turns a repository of short, pedagogical FHEVM smart-contract
//! examples into browsable documentation and standalone runnable projects.
//! Contracts carry their metadata as single-line annotation tags (`@title`,
//! `@custom:category`, `@custom:deploy-plan`, ...) which are extracted by
//! static text scanning - no Solidity parsing - and assembled into a
//! registry that every generator consumes.
//!
//! # Architecture
//!
//! The library is organized into modules that form a single data flow:
//!
//! 1. [`scanner`] - Walks the category-partitioned contract tree
//! 2. [`tags`] - Extracts annotation tags from raw source text
//! 3. [`imports`] - Resolves import statements to local files and packages
//! 4. [`deploy_plan`] - Normalizes the deploy-plan JSON mini-language
//! 5. [`registry`] - Builds the shared in-memory example registry
//! 6. [`docgen`] - Emits the Markdown documentation tree
//! 7. [`summary`] - Derives navigation from the emitted docs tree
//! 8. [`catalog`] - Emits the machine-readable catalog (JSON/YAML)
//! 9. [`scaffold`] - Synthesizes standalone Hardhat projects
//! 10. [`template`] - Locates and materializes the shared scaffold template
//! 11. [`validate`] - Annotation linting and end-to-end validation
//!
//! # Example Usage
//!
//! ```no_run
//! use fhevm_catalog::{
//!     docgen::generate_docs,
//!     registry::build_registry,
//!     scanner::ProjectLayout,
//!     summary::generate_summary,
//! };
//! use std::path::PathBuf;
//!
//! let layout = ProjectLayout::new(PathBuf::from("./fhevm-examples"));
//! let registry = build_registry(&layout).unwrap();
//! println!("{} examples discovered", registry.examples.len());
//!
//! let docs_dir = layout.docs_dir();
//! generate_docs(&registry, &layout, &docs_dir).unwrap();
//! generate_summary(&docs_dir).unwrap();
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides the
//! complete CLI application.

pub mod catalog;
pub mod cli;
pub mod deploy_plan;
pub mod docgen;
pub mod error;
pub mod imports;
pub mod registry;
pub mod scaffold;
pub mod scanner;
pub mod serializer;
pub mod summary;
pub mod tags;
pub mod template;
pub mod validate;
