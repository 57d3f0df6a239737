//! Article content source
//!
//! Reads the markdown body from disk and validates the resulting article.
//! Content is forwarded to the platforms verbatim; no rendering happens here.

use crate::core::error::PublishError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// One article to publish, immutable once handed to the orchestrator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub title: String,

    /// Markdown body, forwarded verbatim
    #[serde(rename = "bodyMarkdown")]
    pub body_markdown: String,

    #[serde(rename = "canonicalUrl", skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
}

impl Article {
    /// Create an article, validating that title and body are non-empty
    pub fn new(
        title: impl Into<String>,
        body_markdown: impl Into<String>,
        canonical_url: Option<String>,
    ) -> Result<Self, PublishError> {
        let title = title.into();
        let body_markdown = body_markdown.into();

        if title.trim().is_empty() {
            return Err(PublishError::InvalidArticle(
                "タイトルが空です".to_string(),
            ));
        }
        if body_markdown.trim().is_empty() {
            return Err(PublishError::InvalidArticle("本文が空です".to_string()));
        }

        Ok(Self {
            title,
            body_markdown,
            canonical_url: canonical_url.filter(|url| !url.trim().is_empty()),
        })
    }

    /// Read the markdown body from a file and build the article
    pub async fn from_file(
        path: impl AsRef<Path>,
        title: impl Into<String>,
        canonical_url: Option<String>,
    ) -> Result<Self, PublishError> {
        let path = path.as_ref();

        let body = fs::read_to_string(path)
            .await
            .map_err(|e| PublishError::ContentSource(format!("{}: {}", path.display(), e)))?;

        if body.trim().is_empty() {
            return Err(PublishError::ContentSource(format!(
                "ファイルが空です: {}",
                path.display()
            )));
        }

        Self::new(title, body, canonical_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_new_article() {
        let article = Article::new("Title", "# Body\n\nText.", None).unwrap();

        assert_eq!(article.title, "Title");
        assert!(article.canonical_url.is_none());
    }

    #[test]
    fn test_empty_title_rejected() {
        let result = Article::new("   ", "body", None);

        assert!(matches!(result, Err(PublishError::InvalidArticle(_))));
    }

    #[test]
    fn test_empty_body_rejected() {
        let result = Article::new("Title", "\n\n", None);

        assert!(matches!(result, Err(PublishError::InvalidArticle(_))));
    }

    #[test]
    fn test_blank_canonical_url_dropped() {
        let article = Article::new("Title", "body", Some("  ".to_string())).unwrap();
        assert!(article.canonical_url.is_none());

        let article =
            Article::new("Title", "body", Some("https://example.com/a".to_string())).unwrap();
        assert_eq!(
            article.canonical_url.as_deref(),
            Some("https://example.com/a")
        );
    }

    #[tokio::test]
    async fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("article.md");
        let mut file = std::fs::File::create(&file_path).unwrap();
        writeln!(file, "# Hello\n\nA paragraph.").unwrap();

        let article = Article::from_file(&file_path, "Hello", None).await.unwrap();

        assert!(article.body_markdown.contains("A paragraph."));
    }

    #[tokio::test]
    async fn test_from_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("missing.md");

        let result = Article::from_file(&file_path, "Hello", None).await;

        assert!(matches!(result, Err(PublishError::ContentSource(_))));
    }

    #[tokio::test]
    async fn test_from_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("empty.md");
        std::fs::File::create(&file_path).unwrap();

        let result = Article::from_file(&file_path, "Hello", None).await;

        assert!(matches!(result, Err(PublishError::ContentSource(_))));
    }
}
