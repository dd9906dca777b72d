//! Utility functions and helpers.

pub mod report;

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::Content;

/// Read a JSON file as structured content.
pub fn load_content(path: &Path) -> Result<Content> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::validation(format!("Cannot read {}: {e}", path.display())))?;
    Content::from_json_str(&text)
        .map_err(|e| AppError::validation(format!("{} is not valid JSON: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("page.json");
        std::fs::write(&path, r#"{"title": "Hello", "items": [1, 2]}"#).unwrap();

        let content = load_content(&path).unwrap();
        assert_eq!(content.get("title"), Some(&Content::from("Hello")));
    }

    #[test]
    fn test_load_content_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.json");
        std::fs::write(&path, "{").unwrap();

        assert!(matches!(load_content(&path), Err(AppError::Validation(_))));
        assert!(load_content(&tmp.path().join("missing.json")).is_err());
    }
}
