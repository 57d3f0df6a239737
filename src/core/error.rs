//! Error handling for article publishing
//!
//! This module provides the error taxonomy for publish chains with recovery
//! guidance, using the thiserror crate for ergonomic error handling.

use crate::core::traits::Platform;
use thiserror::Error;

/// Main error type for article publishing operations
#[derive(Error, Debug)]
pub enum PublishError {
    // Credential errors
    #[error("[{platform}] 認証トークンが設定されていません")]
    TokenMissing { platform: Platform },

    // Network errors
    #[error("[{platform}] プラットフォームに接続できませんでした（{operation}）: {message}")]
    Transport {
        platform: Platform,
        operation: String,
        message: String,
    },

    #[error("[{platform}] {operation}がHTTP {status}で失敗しました: {body}")]
    HttpStatus {
        platform: Platform,
        operation: String,
        status: u16,
        body: String,
    },

    // Response interpretation errors
    #[error("[{platform}] {operation}の応答を解析できませんでした。期待した形式: {expected}")]
    MalformedResponse {
        platform: Platform,
        operation: String,
        expected: String,
    },

    #[error("[{platform}] プラットフォームがエラーを報告しました: {errors}")]
    PlatformReported { platform: Platform, errors: String },

    // Dependency chain errors
    #[error("[{platform}] {what}の解決に失敗したため投稿を中止しました: {reason}")]
    ResolutionFailed {
        platform: Platform,
        what: String,
        reason: String,
    },

    // Article errors
    #[error("記事が不正です: {0}")]
    InvalidArticle(String),

    #[error("記事ファイルを読み込めませんでした: {0}")]
    ContentSource(String),

    // Ambient errors
    #[error("設定の読み込みに失敗しました: {0}")]
    Config(String),

    #[error("トークンストアの操作に失敗しました: {0}")]
    TokenStore(String),
}

impl PublishError {
    /// Build a transport error from a failed network operation
    pub fn transport(
        platform: Platform,
        operation: &str,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::Transport {
            platform,
            operation: operation.to_string(),
            message: message.to_string(),
        }
    }

    /// Build a malformed-response error naming the expected shape
    pub fn malformed(platform: Platform, operation: &str, expected: &str) -> Self {
        Self::MalformedResponse {
            platform,
            operation: operation.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Build a resolution failure that short-circuits a publish chain
    pub fn resolution(platform: Platform, what: &str, reason: impl Into<String>) -> Self {
        Self::ResolutionFailed {
            platform,
            what: what.to_string(),
            reason: reason.into(),
        }
    }

    /// Get the platform associated with this error, if any
    pub fn platform(&self) -> Option<Platform> {
        match self {
            Self::TokenMissing { platform }
            | Self::Transport { platform, .. }
            | Self::HttpStatus { platform, .. }
            | Self::MalformedResponse { platform, .. }
            | Self::PlatformReported { platform, .. }
            | Self::ResolutionFailed { platform, .. } => Some(*platform),
            Self::InvalidArticle(_)
            | Self::ContentSource(_)
            | Self::Config(_)
            | Self::TokenStore(_) => None,
        }
    }

    /// Check if this error blocked the publish call of its chain
    pub fn is_resolution_failure(&self) -> bool {
        matches!(self, Self::ResolutionFailed { .. })
    }

    /// Get suggested actions for this error
    pub fn suggested_actions(&self) -> Vec<&'static str> {
        match self {
            Self::TokenMissing { .. } => vec![
                "環境変数を設定してください（例: MEDIUM_TOKEN, DEVTO_TOKEN, HASHNODE_TOKEN）",
                "`blog-publisher tokens set` で保存することもできます",
            ],
            Self::Transport { .. } => vec![
                "インターネット接続を確認してください",
                "しばらく待ってから再試行してください",
            ],
            Self::HttpStatus { .. } => vec![
                "ステータスコードと応答本文を確認してください",
                "トークンの有効期限を確認してください",
            ],
            Self::MalformedResponse { .. } => vec![
                "プラットフォームAPIの仕様変更の可能性があります",
                "応答本文を確認してください",
            ],
            Self::PlatformReported { .. } => {
                vec!["プラットフォームが返したエラー一覧を確認してください"]
            }
            Self::ResolutionFailed { .. } => vec![
                "ホスト名・タグ設定を確認してください",
                "トークンに必要な権限があるか確認してください",
            ],
            Self::InvalidArticle(_) => {
                vec!["タイトルと本文が空でないことを確認してください"]
            }
            Self::ContentSource(_) => vec![
                "ファイルパスを確認してください",
                "ファイルが空でないことを確認してください",
            ],
            Self::Config(_) => vec![".blog-publisher.ymlの内容を確認してください"],
            Self::TokenStore(_) => {
                vec!["設定ファイルの権限と内容を確認してください"]
            }
        }
    }

    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::TokenMissing { .. } => "TOKEN_MISSING",
            Self::Transport { .. } => "TRANSPORT_ERROR",
            Self::HttpStatus { .. } => "HTTP_STATUS_ERROR",
            Self::MalformedResponse { .. } => "MALFORMED_RESPONSE",
            Self::PlatformReported { .. } => "PLATFORM_REPORTED_ERROR",
            Self::ResolutionFailed { .. } => "RESOLUTION_FAILED",
            Self::InvalidArticle(_) => "INVALID_ARTICLE",
            Self::ContentSource(_) => "CONTENT_SOURCE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::TokenStore(_) => "TOKEN_STORE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_missing_error() {
        let error = PublishError::TokenMissing {
            platform: Platform::Medium,
        };

        assert_eq!(error.platform(), Some(Platform::Medium));
        assert_eq!(error.code(), "TOKEN_MISSING");
        assert!(!error.suggested_actions().is_empty());
    }

    #[test]
    fn test_transport_error_with_operation() {
        let error = PublishError::transport(Platform::Devto, "記事の投稿", "connection refused");

        assert_eq!(error.platform(), Some(Platform::Devto));
        assert_eq!(error.code(), "TRANSPORT_ERROR");
        let display = error.to_string();
        assert!(display.contains("記事の投稿"));
        assert!(display.contains("connection refused"));
    }

    #[test]
    fn test_http_status_error_includes_status_and_body() {
        let error = PublishError::HttpStatus {
            platform: Platform::Medium,
            operation: "著者IDの取得".to_string(),
            status: 404,
            body: r#"{"errors":["User not found"]}"#.to_string(),
        };

        let display = error.to_string();
        assert!(display.contains("404"));
        assert!(display.contains("User not found"));
        assert_eq!(error.code(), "HTTP_STATUS_ERROR");
    }

    #[test]
    fn test_malformed_response_names_expected_shape() {
        let error = PublishError::malformed(Platform::Hashnode, "出版物IDの取得", "publication.id");

        let display = error.to_string();
        assert!(display.contains("publication.id"));
        assert_eq!(error.code(), "MALFORMED_RESPONSE");
    }

    #[test]
    fn test_platform_reported_error() {
        let error = PublishError::PlatformReported {
            platform: Platform::Hashnode,
            errors: r#"[{"message":"Tag not allowed"}]"#.to_string(),
        };

        assert!(error.to_string().contains("Tag not allowed"));
        assert_eq!(error.code(), "PLATFORM_REPORTED_ERROR");
    }

    #[test]
    fn test_resolution_failed_short_circuits() {
        let error = PublishError::resolution(Platform::Medium, "著者ID", "HTTP 404");

        assert!(error.is_resolution_failure());
        assert_eq!(error.code(), "RESOLUTION_FAILED");
        assert!(error.to_string().contains("著者ID"));
    }

    #[test]
    fn test_ambient_errors_have_no_platform() {
        let error = PublishError::Config("version missing".to_string());

        assert_eq!(error.platform(), None);
        assert_eq!(error.code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_error_display_contains_platform_tag() {
        let error = PublishError::TokenMissing {
            platform: Platform::Hashnode,
        };

        let display = format!("{}", error);
        assert!(display.contains("hashnode"));
        assert!(display.contains("トークン"));
    }
}
