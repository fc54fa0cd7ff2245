use regex::Regex;

/// Annotation tag extraction from raw source text.
///
/// Example contracts carry their metadata as single-line NatSpec-style tags
/// (`@title`, `@notice`, `@custom:category`, ...). Extraction is a
/// line-scoped regex match over the raw text; no language parsing happens
/// here, so the same extractor serves Solidity contracts and TypeScript
/// tests alike.
///
/// # Example
///
/// ```
/// use fhevm_catalog::tags::extract_tag;
///
/// let source = "/// @title Confidential counter\ncontract Counter {}";
/// assert_eq!(extract_tag(source, "title").as_deref(), Some("Confidential counter"));
/// ```
///
/// A value line ending in a single `\` continues onto the next comment
/// line; the continuation's leading comment decoration is stripped and the
/// pieces are joined with one space. Everything else is single-line: the
/// value runs to end-of-line, stopping before a block-comment closer.
pub fn extract_tag(source: &str, name: &str) -> Option<String> {
    let pattern = format!(r"@{}\s+(.*)", regex::escape(name));
    let re = Regex::new(&pattern).expect("tag pattern is valid");

    let mut lines = source.lines();
    while let Some(line) = lines.next() {
        let Some(caps) = re.captures(line) else {
            continue;
        };
        let mut value = clean_value(&caps[1]);

        // Explicit continuation marker: trailing backslash pulls in the
        // next comment line.
        while value.ends_with('\\') {
            value.pop();
            let Some(next) = lines.next() else { break };
            let piece = clean_value(strip_comment_decoration(next));
            value = format!("{} {}", value.trim_end(), piece);
        }

        let value = value.trim().to_string();
        return if value.is_empty() { None } else { Some(value) };
    }
    None
}

/// Extracts a `@custom:<name>` tag.
///
/// Custom tags are a plain specialization of [`extract_tag`] using the
/// `custom:` prefix, mirroring Solidity's NatSpec custom-tag namespace.
pub fn extract_custom_tag(source: &str, name: &str) -> Option<String> {
    extract_tag(source, &format!("custom:{}", name))
}

/// Trims a raw tag value, cutting it off before a block-comment closer.
fn clean_value(raw: &str) -> String {
    let cut = match raw.find("*/") {
        Some(idx) => &raw[..idx],
        None => raw,
    };
    cut.trim().to_string()
}

/// Strips leading comment decoration (`*`, `///`, `//`) from a
/// continuation line.
fn strip_comment_decoration(line: &str) -> &str {
    let trimmed = line.trim_start();
    for prefix in ["///", "//", "*"] {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            return rest;
        }
    }
    trimmed
}

/// Splits a comma-separated annotation value into trimmed, non-empty tokens.
///
/// Absent or empty input yields an empty list, never an error.
pub fn split_list(value: Option<&str>) -> Vec<String> {
    match value {
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    }
}

/// Splits a chapter annotation into kebab-cased topic tags.
pub fn chapter_list(value: Option<&str>) -> Vec<String> {
    split_list(value)
        .iter()
        .map(|token| kebab_case(token))
        .collect()
}

/// Converts an identifier or free-text token to kebab-case.
///
/// Handles CamelCase boundaries (including acronym runs: `FHEAdd` becomes
/// `fhe-add`), spaces, and underscores.
pub fn kebab_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' || c == '_' || c == '-' {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            continue;
        }
        if c.is_ascii_uppercase() {
            let prev = if i > 0 { Some(chars[i - 1]) } else { None };
            let next = chars.get(i + 1);
            let after_lower_or_digit =
                prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit());
            // An uppercase run ends where the next letter is lowercase.
            let acronym_end = prev.is_some_and(|p| p.is_ascii_uppercase())
                && next.is_some_and(|n| n.is_ascii_lowercase());
            if !out.is_empty() && !out.ends_with('-') && (after_lower_or_digit || acronym_end) {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }

    out.trim_matches('-').to_string()
}

/// Derives a human-readable title from a file stem.
///
/// `getting-started` becomes `Getting Started`. Used wherever a page has no
/// extractable first-level heading.
pub fn title_case_stem(stem: &str) -> String {
    stem.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
