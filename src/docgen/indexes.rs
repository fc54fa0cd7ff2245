//! Category, chapter, root, pitfalls, and learning-path index pages.

use crate::docgen::{doc_path, escape_cell, extract_pitfalls, StaticPage};
use crate::registry::{Difficulty, ExampleRecord, Registry};
use crate::tags::title_case_stem;
use std::fmt::Write as _;
use std::fs;

/// Renders a category's `README.md`: its examples grouped by difficulty
/// tier, empty tiers omitted.
pub fn render_category_index(registry: &Registry, category: &str) -> String {
    let examples = registry.category_examples(category);
    let mut page = String::new();

    let _ = writeln!(page, "# {}", title_case_stem(category));
    let _ = writeln!(page);
    let _ = writeln!(
        page,
        "{} example{} in this category.",
        examples.len(),
        if examples.len() == 1 { "" } else { "s" }
    );

    for tier in Difficulty::all() {
        let in_tier: Vec<&&ExampleRecord> =
            examples.iter().filter(|e| e.difficulty == tier).collect();
        if in_tier.is_empty() {
            continue;
        }
        let _ = writeln!(page);
        let _ = writeln!(page, "## {}", tier);
        let _ = writeln!(page);
        for example in in_tier {
            let _ = writeln!(
                page,
                "- [{}]({}.md) — {}",
                example.title, example.doc_name, example.concept
            );
        }
    }
    page
}

/// Renders one chapter page: every example carrying the tag, cross-linked.
pub fn render_chapter_page(registry: &Registry, tag: &str) -> String {
    let mut page = String::new();
    let _ = writeln!(page, "# {}", title_case_stem(tag));
    let _ = writeln!(page);
    let _ = writeln!(page, "Examples touching this topic:");
    let _ = writeln!(page);
    for example in &registry.examples {
        if example.chapters.iter().any(|c| c == tag) {
            let _ = writeln!(
                page,
                "- [{}](../{}) — {}",
                example.title,
                doc_path(example),
                example.concept
            );
        }
    }
    page
}

/// Renders the chapters index page.
pub fn render_chapters_index(tags: &[String]) -> String {
    let mut page = String::new();
    let _ = writeln!(page, "# Chapters");
    let _ = writeln!(page);
    let _ = writeln!(page, "Cross-cutting topics, each linking every example that uses it.");
    let _ = writeln!(page);
    for tag in tags {
        let _ = writeln!(page, "- [{}]({}.md)", title_case_stem(tag), tag);
    }
    page
}

/// Renders the root `README.md`: per-category example tables plus links to
/// the hand-authored pages.
pub fn render_root_index(registry: &Registry, static_pages: &[StaticPage]) -> String {
    let mut page = String::new();
    let _ = writeln!(page, "# FHEVM Examples");
    let _ = writeln!(page);
    let _ = writeln!(
        page,
        "A catalog of short, self-contained smart-contract examples \
         demonstrating fully homomorphic encryption patterns on-chain."
    );
    let _ = writeln!(page);
    let _ = writeln!(page, "- [Learning paths](learning-paths.md)");
    let _ = writeln!(page, "- [Common pitfalls](pitfalls.md)");
    if !registry.chapter_tags().is_empty() {
        let _ = writeln!(page, "- [Chapters](chapters/README.md)");
    }

    for (category, _slugs) in &registry.categories {
        let _ = writeln!(page);
        let _ = writeln!(page, "## {}", title_case_stem(category));
        let _ = writeln!(page);
        let _ = writeln!(page, "| Example | Concept | Difficulty |");
        let _ = writeln!(page, "| --- | --- | --- |");
        for example in registry.category_examples(category) {
            let _ = writeln!(
                page,
                "| [{}]({}) | {} | {} |",
                escape_cell(&example.title),
                doc_path(example),
                escape_cell(&example.concept),
                example.difficulty
            );
        }
    }

    if !static_pages.is_empty() {
        let _ = writeln!(page);
        let _ = writeln!(page, "## Guides");
        let _ = writeln!(page);
        for static_page in static_pages {
            let _ = writeln!(page, "- [{}]({})", static_page.title, static_page.file_name);
        }
    }
    page
}

/// Renders the pitfalls aggregation page.
///
/// Examples with no extracted pitfalls are omitted entirely, not rendered
/// as "none".
pub fn render_pitfalls_page(registry: &Registry) -> String {
    let mut page = String::new();
    let _ = writeln!(page, "# Common pitfalls");
    let _ = writeln!(page);
    let _ = writeln!(
        page,
        "Mistakes the example tests demonstrate on purpose, collected from \
         every test case marked as a pitfall."
    );

    for example in &registry.examples {
        let Some(test_file) = &example.test_file else {
            continue;
        };
        let Ok(test_source) = fs::read_to_string(test_file) else {
            continue;
        };
        let pitfalls = extract_pitfalls(&test_source);
        if pitfalls.is_empty() {
            continue;
        }
        let _ = writeln!(page);
        let _ = writeln!(page, "## [{}]({})", example.title, doc_path(example));
        let _ = writeln!(page);
        for pitfall in pitfalls {
            let _ = writeln!(page, "- {}", pitfall);
        }
    }
    page
}

/// Renders the learning-path page: all examples in a fixed
/// Beginner → Intermediate → Advanced order, alphabetical within tiers.
pub fn render_learning_paths(registry: &Registry) -> String {
    let mut page = String::new();
    let _ = writeln!(page, "# Learning paths");
    let _ = writeln!(page);
    let _ = writeln!(
        page,
        "Work through the tiers in order; each example is self-contained."
    );

    for tier in Difficulty::all() {
        let in_tier: Vec<&ExampleRecord> = registry
            .examples
            .iter()
            .filter(|e| e.difficulty == tier)
            .collect();
        if in_tier.is_empty() {
            continue;
        }
        let _ = writeln!(page);
        let _ = writeln!(page, "## {}", tier);
        let _ = writeln!(page);
        for (idx, example) in in_tier.iter().enumerate() {
            let _ = writeln!(
                page,
                "{}. [{}]({}) — {}",
                idx + 1,
                example.title,
                doc_path(example),
                example.concept
            );
        }
    }
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::build_registry;
    use crate::scanner::ProjectLayout;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, ProjectLayout) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for (path, content) in [
            (
                "contracts/token/AddExample.sol",
                "/// @title Encrypted add\n/// @custom:difficulty beginner\n/// @custom:chapter arithmetic\ncontract AddExample {}",
            ),
            (
                "contracts/token/MulExample.sol",
                "/// @title Encrypted mul\n/// @custom:difficulty advanced\n/// @custom:chapter arithmetic\ncontract MulExample {}",
            ),
            (
                "contracts/auction/BlindBid.sol",
                "/// @title Blind bid\ncontract BlindBid {}",
            ),
            (
                "test/token/AddExample.test.ts",
                "it(\"forgets allow (pitfall)\", () => {});",
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
    fn test_category_index_groups_by_tier_and_omits_empty() {
        let (_guard, layout) = fixture();
        let registry = build_registry(&layout).unwrap();

        let page = render_category_index(&registry, "token");
        assert!(page.contains("## Beginner"));
        assert!(page.contains("## Advanced"));
        assert!(!page.contains("## Intermediate"), "empty tier must be omitted");
        assert!(page.contains("[Encrypted add](AddExample.md)"));
    }

    #[test]
    fn test_chapter_page_lists_tagged_examples() {
        let (_guard, layout) = fixture();
        let registry = build_registry(&layout).unwrap();

        let page = render_chapter_page(&registry, "arithmetic");
        assert!(page.contains("[Encrypted add](../token/AddExample.md)"));
        assert!(page.contains("[Encrypted mul](../token/MulExample.md)"));
        assert!(!page.contains("Blind bid"));
    }

    #[test]
    fn test_root_index_tables_per_category() {
        let (_guard, layout) = fixture();
        let registry = build_registry(&layout).unwrap();

        let page = render_root_index(&registry, &[]);
        assert!(page.contains("## Auction"));
        assert!(page.contains("## Token"));
        assert!(page.contains("| [Encrypted add](token/AddExample.md) |"));
        assert!(page.contains("| Beginner |"));
        assert!(!page.contains("## Guides"));
    }

    #[test]
    fn test_root_index_links_static_pages() {
        let (_guard, layout) = fixture();
        let registry = build_registry(&layout).unwrap();
        let static_pages = vec![StaticPage {
            file_name: "getting-started.md".to_string(),
            title: "Getting Started".to_string(),
        }];

        let page = render_root_index(&registry, &static_pages);
        assert!(page.contains("- [Getting Started](getting-started.md)"));
    }

    #[test]
    fn test_pitfalls_page_omits_clean_examples() {
        let (_guard, layout) = fixture();
        let registry = build_registry(&layout).unwrap();

        let page = render_pitfalls_page(&registry);
        assert!(page.contains("## [Encrypted add](token/AddExample.md)"));
        assert!(page.contains("- forgets allow"));
        assert!(!page.contains("Encrypted mul"));
        assert!(!page.contains("Blind bid"));
    }

    #[test]
    fn test_learning_paths_fixed_tier_order() {
        let (_guard, layout) = fixture();
        let registry = build_registry(&layout).unwrap();

        let page = render_learning_paths(&registry);
        let beginner = page.find("## Beginner").unwrap();
        let intermediate = page.find("## Intermediate").unwrap();
        let advanced = page.find("## Advanced").unwrap();
        assert!(beginner < intermediate && intermediate < advanced);
        assert!(page.contains("1. [Blind bid](auction/BlindBid.md)"));
    }
}
