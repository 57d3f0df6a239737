//! Medium client - REST publishing with author-id resolution
//!
//! Publishing to Medium is a two-step chain: `GET /v1/me` resolves the
//! author id, then `POST /v1/users/{authorId}/posts` creates the post. A
//! failed resolution short-circuits the chain and the post is never sent.

use crate::core::article::Article;
use crate::core::error::PublishError;
use crate::core::traits::{
    MediumTarget, Platform, PlatformClient, PublishTargets, PublishedPost,
};
use crate::platforms::http::ApiClient;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const MEDIUM_API_BASE: &str = "https://api.medium.com/v1";

/// Envelope of `GET /v1/me`
#[derive(Debug, Deserialize)]
struct UserEnvelope {
    data: UserData,
}

#[derive(Debug, Deserialize)]
struct UserData {
    id: String,
}

/// Envelope of `POST /v1/users/{id}/posts`; every field is optional because
/// a 2xx status alone already means the post was created
#[derive(Debug, Deserialize, Default)]
struct PostEnvelope {
    #[serde(default)]
    data: Option<PostData>,
}

#[derive(Debug, Deserialize)]
struct PostData {
    id: Option<String>,
    url: Option<String>,
}

/// Medium platform client
pub struct MediumClient {
    api: ApiClient,
}

impl MediumClient {
    pub fn new(timeout: Duration) -> Result<Self, PublishError> {
        Ok(Self {
            api: ApiClient::new(Platform::Medium, timeout)?,
        })
    }

    fn bearer(token: &SecretString) -> String {
        format!("Bearer {}", token.expose_secret())
    }

    /// Build the post payload; canonicalUrl is omitted when unset
    fn publish_payload(article: &Article, target: &MediumTarget) -> serde_json::Value {
        let mut payload = json!({
            "title": article.title,
            "contentFormat": "markdown",
            "content": article.body_markdown,
            "publishStatus": target.publish_status.as_str(),
        });

        if let Some(ref canonical_url) = article.canonical_url {
            payload["canonicalUrl"] = json!(canonical_url);
        }

        payload
    }

    /// Resolution call: fetch the author id of the token owner
    async fn resolve_author_id(&self, token: &SecretString) -> Result<String, PublishError> {
        let operation = "著者IDの取得";
        let request = self
            .api
            .request(Method::GET, &format!("{}/me", MEDIUM_API_BASE))
            .header(AUTHORIZATION, Self::bearer(token));

        let value = self.api.execute(operation, request).await?;
        let envelope: UserEnvelope = self.api.decode(operation, "data.idを含むJSON", value)?;

        Ok(envelope.data.id)
    }
}

#[async_trait]
impl PlatformClient for MediumClient {
    fn platform(&self) -> Platform {
        Platform::Medium
    }

    async fn publish(
        &self,
        token: &SecretString,
        article: &Article,
        targets: &PublishTargets,
    ) -> Result<PublishedPost, PublishError> {
        let author_id = self
            .resolve_author_id(token)
            .await
            .map_err(|e| PublishError::resolution(Platform::Medium, "著者ID", e.to_string()))?;

        let operation = "記事の投稿";
        let url = format!("{}/users/{}/posts", MEDIUM_API_BASE, author_id);
        let request = self
            .api
            .request(Method::POST, &url)
            .header(AUTHORIZATION, Self::bearer(token))
            .json(&Self::publish_payload(article, &targets.medium));

        let value = self.api.execute(operation, request).await?;

        // 2xx means created; the post url is extracted when present
        let envelope: PostEnvelope = serde_json::from_value(value).unwrap_or_default();
        let post = envelope.data.map_or_else(PublishedPost::default, |data| {
            PublishedPost {
                id: data.id,
                url: data.url,
            }
        });

        Ok(post)
    }

    async fn check_auth(&self, token: &SecretString) -> Result<(), PublishError> {
        self.resolve_author_id(token).await.map(|_| ())
    }
}
