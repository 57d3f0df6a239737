//! Shared HTTP/JSON plumbing for platform clients
//!
//! One `ApiClient` per platform client wraps a `reqwest::Client` carrying a
//! hard per-request timeout, and classifies every response into the publish
//! error taxonomy: transport failures, non-2xx statuses (body kept
//! verbatim), and bodies that fail to parse as JSON.

use crate::core::error::PublishError;
use crate::core::traits::Platform;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default per-request timeout in seconds
///
/// Every network call suspends at most this long; the orchestrator relies on
/// this bound instead of a timeout of its own.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP client for one platform with uniform response classification
#[derive(Clone)]
pub struct ApiClient {
    platform: Platform,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client whose every request carries the given timeout
    pub fn new(platform: Platform, timeout: Duration) -> Result<Self, PublishError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                PublishError::Config(format!("HTTPクライアントの初期化に失敗しました: {}", e))
            })?;

        Ok(Self { platform, http })
    }

    /// The platform this client talks to
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Start building a request
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http.request(method, url)
    }

    /// Send a request and interpret the response as a JSON value
    ///
    /// `operation` names the logical call for error messages (e.g. "記事の投稿").
    pub async fn execute(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<serde_json::Value, PublishError> {
        let response = request
            .send()
            .await
            .map_err(|e| PublishError::transport(self.platform, operation, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PublishError::transport(self.platform, operation, e))?;

        if !status.is_success() {
            // Forward structured error bodies verbatim
            let body = match serde_json::from_str::<serde_json::Value>(&body) {
                Ok(parsed) => parsed.to_string(),
                Err(_) => body,
            };
            return Err(PublishError::HttpStatus {
                platform: self.platform,
                operation: operation.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|_| PublishError::malformed(self.platform, operation, "JSONボディ"))
    }

    /// Decode a JSON value into the expected shape
    ///
    /// `expected` describes the shape for the malformed-response message.
    pub fn decode<T: DeserializeOwned>(
        &self,
        operation: &str,
        expected: &str,
        value: serde_json::Value,
    ) -> Result<T, PublishError> {
        serde_json::from_value(value)
            .map_err(|_| PublishError::malformed(self.platform, operation, expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_new_client() {
        let client =
            ApiClient::new(Platform::Medium, Duration::from_secs(DEFAULT_TIMEOUT_SECS)).unwrap();

        assert_eq!(client.platform(), Platform::Medium);
    }

    #[test]
    fn test_decode_expected_shape() {
        #[derive(Deserialize)]
        struct Envelope {
            data: Inner,
        }
        #[derive(Deserialize)]
        struct Inner {
            id: String,
        }

        let client = ApiClient::new(Platform::Medium, Duration::from_secs(1)).unwrap();
        let value = json!({"data": {"id": "abc123"}});

        let envelope: Envelope = client.decode("著者IDの取得", "data.id", value).unwrap();
        assert_eq!(envelope.data.id, "abc123");
    }

    #[test]
    fn test_decode_missing_field_is_malformed() {
        #[derive(Deserialize, Debug)]
        struct Envelope {
            #[allow(dead_code)]
            data: String,
        }

        let client = ApiClient::new(Platform::Hashnode, Duration::from_secs(1)).unwrap();
        let value = json!({"unexpected": true});

        let result: Result<Envelope, _> = client.decode("タグの解決", "data", value);
        let error = result.unwrap_err();

        assert_eq!(error.code(), "MALFORMED_RESPONSE");
        assert_eq!(error.platform(), Some(Platform::Hashnode));
    }
}
