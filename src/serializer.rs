//! Serialization helpers for catalog output and generated files.
//!
//! Provides functions to serialize catalog documents into standard formats
//! and write generated content to files, creating parent directories as
//! needed.

use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Serializes a document to YAML format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml<T: Serialize>(doc: &T) -> Result<String> {
    debug!("Serializing document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize document to YAML")
}

/// Serializes a document to JSON format with pretty printing.
///
/// The output is formatted with indentation for readability, making it
/// suitable for human review and version control.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json<T: Serialize>(doc: &T) -> Result<String> {
    debug!("Serializing document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize document to JSON")
}

/// Writes string content to a file.
///
/// Creates the file if it doesn't exist, or overwrites it if it does.
/// Parent directories are created automatically.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Serialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    fn sample() -> Sample {
        Sample {
            name: "catalog".to_string(),
            count: 3,
        }
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&sample()).unwrap();
        assert!(yaml.contains("name: catalog"));
        assert!(yaml.contains("count: 3"));
    }

    #[test]
    fn test_serialize_json_pretty_format() {
        let json = serialize_json(&sample()).unwrap();
        assert!(json.contains("\"name\": \"catalog\""));
        // Pretty printed JSON spans multiple lines
        assert!(json.lines().count() > 2);
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("docs").join("token").join("page.md");

        write_to_file("# Page", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "# Page");
    }

    #[test]
    fn test_write_to_file_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("page.md");

        write_to_file("first", &file_path).unwrap();
        write_to_file("second", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "second");
    }
}
