//! Machine-readable catalog of the registry.
//!
//! A JSON (or YAML) summary of categories and examples for downstream
//! tooling. The document is stamped with the latest modification time among
//! all contributing source files rather than the wall clock, so an
//! unchanged corpus reproduces an identical catalog.

use crate::docgen::doc_path;
use crate::registry::{Difficulty, Registry};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::SystemTime;

/// The complete catalog document.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    /// RFC 3339 timestamp of the newest contributing source file
    pub generated_at: String,
    pub categories: Vec<CatalogCategory>,
}

/// One category and its examples.
#[derive(Debug, Serialize)]
pub struct CatalogCategory {
    pub name: String,
    pub examples: Vec<CatalogEntry>,
}

/// One example's summary line.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub slug: String,
    pub title: String,
    pub concept: String,
    pub difficulty: Difficulty,
    /// Doc page path relative to the documentation root
    pub doc_path: String,
}

/// Builds the catalog document from a registry.
pub fn build_catalog(registry: &Registry) -> Catalog {
    let mut latest: Option<SystemTime> = None;
    for example in &registry.examples {
        for file in example
            .all_source_files()
            .into_iter()
            .chain(example.test_file.as_ref())
        {
            if let Ok(modified) = std::fs::metadata(file).and_then(|m| m.modified()) {
                latest = Some(match latest {
                    Some(current) => current.max(modified),
                    None => modified,
                });
            }
        }
    }

    let generated_at: DateTime<Utc> = latest.unwrap_or(SystemTime::UNIX_EPOCH).into();

    let categories = registry
        .categories
        .keys()
        .map(|name| CatalogCategory {
            name: name.clone(),
            examples: registry
                .category_examples(name)
                .into_iter()
                .map(|example| CatalogEntry {
                    slug: example.slug.clone(),
                    title: example.title.clone(),
                    concept: example.concept.clone(),
                    difficulty: example.difficulty,
                    doc_path: doc_path(example),
                })
                .collect(),
        })
        .collect();

    Catalog {
        generated_at: generated_at.to_rfc3339(),
        categories,
    }
}
