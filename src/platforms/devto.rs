//! Dev.to client - single-call REST publishing
//!
//! Dev.to needs no resolution step: one `POST /api/articles` with an
//! `api-key` header publishes the article.

use crate::core::article::Article;
use crate::core::error::PublishError;
use crate::core::traits::{
    DevtoTarget, Platform, PlatformClient, PublishTargets, PublishedPost,
};
use crate::platforms::http::ApiClient;
use async_trait::async_trait;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const DEVTO_API_BASE: &str = "https://dev.to/api";

/// Response of `POST /api/articles`; parsed leniently because a 2xx status
/// alone already means the article was created
#[derive(Debug, Deserialize, Default)]
struct ArticleResponse {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    url: Option<String>,
}

/// Dev.to platform client
pub struct DevtoClient {
    api: ApiClient,
}

impl DevtoClient {
    pub fn new(timeout: Duration) -> Result<Self, PublishError> {
        Ok(Self {
            api: ApiClient::new(Platform::Devto, timeout)?,
        })
    }

    /// Build the article payload; canonical_url is omitted when unset
    fn publish_payload(article: &Article, target: &DevtoTarget) -> serde_json::Value {
        let mut inner = json!({
            "title": article.title,
            "published": target.published,
            "body_markdown": article.body_markdown,
            "tags": target.tags,
        });

        if let Some(ref canonical_url) = article.canonical_url {
            inner["canonical_url"] = json!(canonical_url);
        }

        json!({ "article": inner })
    }
}

#[async_trait]
impl PlatformClient for DevtoClient {
    fn platform(&self) -> Platform {
        Platform::Devto
    }

    async fn publish(
        &self,
        token: &SecretString,
        article: &Article,
        targets: &PublishTargets,
    ) -> Result<PublishedPost, PublishError> {
        let operation = "記事の投稿";
        let request = self
            .api
            .request(Method::POST, &format!("{}/articles", DEVTO_API_BASE))
            .header("api-key", token.expose_secret())
            .json(&Self::publish_payload(article, &targets.devto));

        let value = self.api.execute(operation, request).await?;

        let response: ArticleResponse = serde_json::from_value(value).unwrap_or_default();

        Ok(PublishedPost {
            id: response.id.map(|id| id.to_string()),
            url: response.url,
        })
    }

    async fn check_auth(&self, token: &SecretString) -> Result<(), PublishError> {
        let operation = "認証の確認";
        let request = self
            .api
            .request(Method::GET, &format!("{}/articles/me", DEVTO_API_BASE))
            .header("api-key", token.expose_secret());

        self.api.execute(operation, request).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_payload_shape() {
        let article = Article::new("My Post", "Body text.", None).unwrap();
        let target = DevtoTarget {
            tags: vec!["rust".to_string(), "cli".to_string()],
            published: true,
        };

        let payload = DevtoClient::publish_payload(&article, &target);

        assert_eq!(payload["article"]["title"], "My Post");
        assert_eq!(payload["article"]["published"], true);
        assert_eq!(payload["article"]["body_markdown"], "Body text.");
        assert_eq!(payload["article"]["tags"][1], "cli");
        assert!(payload["article"].get("canonical_url").is_none());
    }

    #[test]
    fn test_publish_payload_with_canonical_url() {
        let article = Article::new(
            "My Post",
            "Body.",
            Some("https://blog.example.com/my-post".to_string()),
        )
        .unwrap();
        let target = DevtoTarget {
            tags: Vec::new(),
            published: false,
        };

        let payload = DevtoClient::publish_payload(&article, &target);

        assert_eq!(
            payload["article"]["canonical_url"],
            "https://blog.example.com/my-post"
        );
        assert_eq!(payload["article"]["published"], false);
    }

    #[test]
    fn test_article_response_is_lenient() {
        let response: ArticleResponse = serde_json::from_str(r#"{"type_of": "article"}"#).unwrap();
        assert!(response.id.is_none());

        let response: ArticleResponse = serde_json::from_str(
            r#"{"id": 12345, "url": "https://dev.to/a/my-post-1a2b"}"#,
        )
        .unwrap();
        assert_eq!(response.id, Some(12345));
        assert_eq!(response.url.as_deref(), Some("https://dev.to/a/my-post-1a2b"));
    }
}
