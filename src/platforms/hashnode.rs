//! Hashnode client - GraphQL publishing with tag and publication resolution
//!
//! The publish chain runs three steps in strict sequence: resolve the
//! configured tag slugs (a nested concurrent fan-out), resolve the
//! publication id for the configured host, then send the `PublishPost`
//! mutation. The publish proceeds with whatever subset of tags resolved;
//! zero resolved tags aborts the chain before the mutation.
//!
//! Hashnode reports failures inside 2xx responses via a GraphQL `errors`
//! array, which is treated as a failure regardless of the HTTP status.

use crate::core::article::Article;
use crate::core::error::PublishError;
use crate::core::traits::{Platform, PlatformClient, PublishTargets, PublishedPost};
use crate::platforms::http::ApiClient;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

const HASHNODE_GQL_ENDPOINT: &str = "https://gql.hashnode.com";

const TAG_QUERY: &str = "\
query Tag($slug: String!) {
  tag(slug: $slug) {
    id
    name
    slug
  }
}";

const PUBLICATION_QUERY: &str = "\
query Publication($host: String!) {
  publication(host: $host) {
    id
    title
  }
}";

const PUBLISH_MUTATION: &str = "\
mutation PublishPost($input: PublishPostInput!) {
  publishPost(input: $input) {
    post {
      id
      title
      slug
      url
    }
  }
}";

const ME_QUERY: &str = "\
query {
  me {
    id
    username
  }
}";

/// Tag identity resolved from a slug, sent verbatim in the publish mutation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedTag {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// Result of one tag-slug lookup inside the nested fan-out
#[derive(Debug)]
enum TagLookup {
    Resolved(ResolvedTag),
    NotFound(String),
    Failed(String),
}

#[derive(Debug, Deserialize)]
struct TagData {
    tag: Option<TagFields>,
}

#[derive(Debug, Deserialize)]
struct TagFields {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct PublicationData {
    publication: Option<PublicationFields>,
}

#[derive(Debug, Deserialize)]
struct PublicationFields {
    id: String,
}

#[derive(Debug, Deserialize, Default)]
struct PublishPostData {
    #[serde(rename = "publishPost")]
    publish_post: Option<PublishPostFields>,
}

#[derive(Debug, Deserialize)]
struct PublishPostFields {
    post: Option<PostFields>,
}

#[derive(Debug, Deserialize)]
struct PostFields {
    id: Option<String>,
    url: Option<String>,
}

/// Hashnode platform client
#[derive(Clone)]
pub struct HashnodeClient {
    api: ApiClient,
}

impl HashnodeClient {
    pub fn new(timeout: Duration) -> Result<Self, PublishError> {
        Ok(Self {
            api: ApiClient::new(Platform::Hashnode, timeout)?,
        })
    }

    /// Normalize a tag name for lookup (comparison is case-insensitive)
    pub fn normalize_slug(tag: &str) -> String {
        tag.trim().to_lowercase()
    }

    /// Send one GraphQL request and unwrap the response envelope
    ///
    /// A 2xx response carrying an `errors` array is a failure; the error
    /// list is forwarded verbatim.
    async fn execute_gql(
        &self,
        token: &SecretString,
        operation: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<serde_json::Value, PublishError> {
        let body = json!({
            "query": query,
            "variables": variables,
        });

        let request = self
            .api
            .request(Method::POST, HASHNODE_GQL_ENDPOINT)
            .header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()))
            .json(&body);

        let value = self.api.execute(operation, request).await?;

        if let Some(errors) = value.get("errors").filter(|e| !e.is_null()) {
            if errors.as_array().map_or(true, |a| !a.is_empty()) {
                return Err(PublishError::PlatformReported {
                    platform: Platform::Hashnode,
                    errors: errors.to_string(),
                });
            }
        }

        value
            .get("data")
            .filter(|data| !data.is_null())
            .cloned()
            .ok_or_else(|| {
                PublishError::malformed(Platform::Hashnode, operation, "dataフィールドを含むGraphQL応答")
            })
    }

    /// Resolution call: look up one tag by slug; `None` when unknown
    async fn resolve_tag(
        &self,
        token: &SecretString,
        slug: String,
    ) -> Result<Option<ResolvedTag>, PublishError> {
        let operation = "タグの解決";
        let data = self
            .execute_gql(token, operation, TAG_QUERY, json!({ "slug": slug }))
            .await?;

        let data: TagData = self.api.decode(operation, "tagフィールドを含むJSON", data)?;

        Ok(data.tag.map(|tag| ResolvedTag {
            id: tag.id,
            name: tag.name,
            slug,
        }))
    }

    /// Nested fan-out: resolve every configured tag slug concurrently
    ///
    /// The publish proceeds with the subset that resolved; if a non-empty
    /// tag list yields zero resolved tags, the chain aborts.
    async fn resolve_tags(
        &self,
        token: &SecretString,
        tags: &[String],
    ) -> Result<Vec<ResolvedTag>, PublishError> {
        if tags.is_empty() {
            return Ok(Vec::new());
        }

        let mut handles = Vec::new();
        for tag in tags {
            let client = self.clone();
            let token = token.clone();
            let slug = Self::normalize_slug(tag);
            handles.push(tokio::spawn(async move {
                match client.resolve_tag(&token, slug.clone()).await {
                    Ok(Some(resolved)) => TagLookup::Resolved(resolved),
                    Ok(None) => TagLookup::NotFound(slug),
                    Err(e) => TagLookup::Failed(e.to_string()),
                }
            }));
        }

        let mut lookups = Vec::new();
        for handle in handles {
            lookups.push(match handle.await {
                Ok(lookup) => lookup,
                Err(e) => TagLookup::Failed(format!("タスクが異常終了しました: {}", e)),
            });
        }

        Self::collect_resolved(lookups)
    }

    /// Keep the resolved subset; zero resolved tags is a resolution failure
    fn collect_resolved(lookups: Vec<TagLookup>) -> Result<Vec<ResolvedTag>, PublishError> {
        let mut resolved = Vec::new();
        let mut reasons = Vec::new();

        for lookup in lookups {
            match lookup {
                TagLookup::Resolved(tag) => resolved.push(tag),
                TagLookup::NotFound(slug) => {
                    reasons.push(format!("タグが見つかりません: {}", slug))
                }
                TagLookup::Failed(reason) => reasons.push(reason),
            }
        }

        if resolved.is_empty() {
            return Err(PublishError::resolution(
                Platform::Hashnode,
                "タグID",
                reasons.join(" / "),
            ));
        }

        Ok(resolved)
    }

    /// Resolution call: fetch the publication id for the configured host
    async fn resolve_publication_id(
        &self,
        token: &SecretString,
        host: &str,
    ) -> Result<String, PublishError> {
        let operation = "出版物IDの取得";
        let data = self
            .execute_gql(token, operation, PUBLICATION_QUERY, json!({ "host": host }))
            .await?;

        let data: PublicationData =
            self.api
                .decode(operation, "publicationフィールドを含むJSON", data)?;

        data.publication.map(|p| p.id).ok_or_else(|| {
            PublishError::malformed(
                Platform::Hashnode,
                operation,
                "publication.idを含むJSON（ホスト名を確認してください）",
            )
        })
    }
}

#[async_trait]
impl PlatformClient for HashnodeClient {
    fn platform(&self) -> Platform {
        Platform::Hashnode
    }

    async fn publish(
        &self,
        token: &SecretString,
        article: &Article,
        targets: &PublishTargets,
    ) -> Result<PublishedPost, PublishError> {
        let target = &targets.hashnode;

        let tags = self.resolve_tags(token, &target.tags).await?;

        let publication_id = self
            .resolve_publication_id(token, &target.host)
            .await
            .map_err(|e| {
                PublishError::resolution(Platform::Hashnode, "出版物ID", e.to_string())
            })?;

        let operation = "記事の投稿";
        let variables = json!({
            "input": {
                "title": article.title,
                "publicationId": publication_id,
                "contentMarkdown": article.body_markdown,
                "tags": tags,
            }
        });

        let data = self
            .execute_gql(token, operation, PUBLISH_MUTATION, variables)
            .await?;

        let data: PublishPostData = serde_json::from_value(data).unwrap_or_default();
        let post = data
            .publish_post
            .and_then(|p| p.post)
            .map_or_else(PublishedPost::default, |post| PublishedPost {
                id: post.id,
                url: post.url,
            });

        Ok(post)
    }

    async fn check_auth(&self, token: &SecretString) -> Result<(), PublishError> {
        self.execute_gql(token, "認証の確認", ME_QUERY, json!({}))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(slug: &str) -> ResolvedTag {
        ResolvedTag {
            id: format!("id-{}", slug),
            name: slug.to_string(),
            slug: slug.to_string(),
        }
    }

    #[test]
    fn test_normalize_slug() {
        assert_eq!(HashnodeClient::normalize_slug("Rust"), "rust");
        assert_eq!(HashnodeClient::normalize_slug("  WebDev "), "webdev");
    }

    #[test]
    fn test_collect_resolved_keeps_partial_subset() {
        let lookups = vec![
            TagLookup::Resolved(resolved("rust")),
            TagLookup::NotFound("nonexistent".to_string()),
            TagLookup::Resolved(resolved("cli")),
        ];

        let tags = HashnodeClient::collect_resolved(lookups).unwrap();

        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].slug, "rust");
        assert_eq!(tags[1].slug, "cli");
    }

    #[test]
    fn test_collect_resolved_none_is_resolution_failure() {
        let lookups = vec![
            TagLookup::NotFound("a".to_string()),
            TagLookup::Failed("HTTP 500".to_string()),
            TagLookup::NotFound("b".to_string()),
        ];

        let error = HashnodeClient::collect_resolved(lookups).unwrap_err();

        assert!(error.is_resolution_failure());
        let display = error.to_string();
        assert!(display.contains("a"));
        assert!(display.contains("HTTP 500"));
    }

    #[test]
    fn test_resolved_tag_serializes_to_wire_shape() {
        let tag = ResolvedTag {
            id: "t1".to_string(),
            name: "Rust".to_string(),
            slug: "rust".to_string(),
        };

        let json = serde_json::to_value(&tag).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"id": "t1", "name": "Rust", "slug": "rust"})
        );
    }

    #[test]
    fn test_tag_data_parsing() {
        let data: TagData =
            serde_json::from_str(r#"{"tag": {"id": "t1", "name": "Rust", "slug": "rust"}}"#)
                .unwrap();
        assert_eq!(data.tag.unwrap().id, "t1");

        // Unknown slugs come back as an explicit null
        let data: TagData = serde_json::from_str(r#"{"tag": null}"#).unwrap();
        assert!(data.tag.is_none());
    }

    #[test]
    fn test_publication_data_parsing() {
        let data: PublicationData = serde_json::from_str(
            r#"{"publication": {"id": "p1", "title": "My Blog"}}"#,
        )
        .unwrap();

        assert_eq!(data.publication.unwrap().id, "p1");
    }

    #[test]
    fn test_publish_post_data_parsing() {
        let data: PublishPostData = serde_json::from_str(
            r#"{"publishPost": {"post": {"id": "post1", "title": "T", "slug": "t", "url": "https://blog.example.dev/t"}}}"#,
        )
        .unwrap();

        let post = data.publish_post.unwrap().post.unwrap();
        assert_eq!(post.url.as_deref(), Some("https://blog.example.dev/t"));
    }

    #[test]
    fn test_queries_use_variables() {
        // Host and slug travel in the variables object, never interpolated
        // into the query text
        assert!(TAG_QUERY.contains("$slug"));
        assert!(PUBLICATION_QUERY.contains("$host"));
        assert!(PUBLISH_MUTATION.contains("$input"));
    }
}
