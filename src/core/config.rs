//! Configuration structures and types for blog-publisher
//!
//! This module provides type-safe configuration management with serde support.

use crate::core::traits::{
    DevtoTarget, HashnodeTarget, MediumTarget, PublishStatus, PublishTargets,
};
use serde::{Deserialize, Serialize};

/// Root configuration object (.blog-publisher.yml)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Schema version (required)
    pub version: String,

    /// Article defaults (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article: Option<ArticleConfig>,

    /// Platform-specific configurations (optional sections)
    #[serde(default)]
    pub platforms: PlatformConfigs,

    /// HTTP settings (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpConfig>,

    /// Security settings (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<SecurityConfig>,
}

/// Article defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArticleConfig {
    /// Default canonical URL attached to published posts (optional)
    #[serde(skip_serializing_if = "Option::is_none", rename = "canonicalUrl")]
    pub canonical_url: Option<String>,

    /// Default markdown file path (optional)
    #[serde(skip_serializing_if = "Option::is_none", rename = "filePath")]
    pub file_path: Option<String>,
}

/// Platform configurations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PlatformConfigs {
    /// Medium configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium: Option<MediumConfig>,

    /// Dev.to configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devto: Option<DevtoConfig>,

    /// Hashnode configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashnode: Option<HashnodeConfig>,
}

/// Medium configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediumConfig {
    /// Publish status for new posts (default: "public")
    #[serde(skip_serializing_if = "Option::is_none", rename = "publishStatus")]
    pub publish_status: Option<PublishStatus>,
}

/// Dev.to configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DevtoConfig {
    /// Tags attached to the article
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    /// Publish immediately instead of creating a draft (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

/// Hashnode configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HashnodeConfig {
    /// Publication host (e.g., "yourblog.hashnode.dev")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Tag slugs to resolve before publishing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// HTTP settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpConfig {
    /// Per-request timeout in seconds (default: 30)
    #[serde(skip_serializing_if = "Option::is_none", rename = "timeoutSecs")]
    pub timeout_secs: Option<u64>,
}

/// Security settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecurityConfig {
    /// Scan the article body for secrets before publishing (default: true)
    #[serde(skip_serializing_if = "Option::is_none", rename = "scanArticle")]
    pub scan_article: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            article: None,
            platforms: PlatformConfigs::default(),
            http: None,
            security: None,
        }
    }
}

impl AppConfig {
    /// Effective per-request timeout in seconds
    pub fn timeout_secs(&self) -> u64 {
        self.http
            .as_ref()
            .and_then(|h| h.timeout_secs)
            .unwrap_or(crate::platforms::http::DEFAULT_TIMEOUT_SECS)
    }

    /// Whether the pre-publish article secret scan is enabled
    pub fn scan_article(&self) -> bool {
        self.security
            .as_ref()
            .and_then(|s| s.scan_article)
            .unwrap_or(true)
    }

    /// Build the per-run publish targets from the configured defaults
    ///
    /// `host` overrides the configured Hashnode host when present.
    pub fn to_targets(&self, host: Option<&str>) -> PublishTargets {
        let medium = MediumTarget {
            publish_status: self
                .platforms
                .medium
                .as_ref()
                .and_then(|m| m.publish_status)
                .unwrap_or(PublishStatus::Public),
        };

        let devto = DevtoTarget {
            tags: self
                .platforms
                .devto
                .as_ref()
                .and_then(|d| d.tags.clone())
                .unwrap_or_default(),
            published: self
                .platforms
                .devto
                .as_ref()
                .and_then(|d| d.published)
                .unwrap_or(true),
        };

        let hashnode = HashnodeTarget {
            host: host
                .map(str::to_string)
                .or_else(|| {
                    self.platforms
                        .hashnode
                        .as_ref()
                        .and_then(|h| h.host.clone())
                })
                .unwrap_or_default(),
            tags: self
                .platforms
                .hashnode
                .as_ref()
                .and_then(|h| h.tags.clone())
                .unwrap_or_default(),
        };

        PublishTargets {
            medium,
            devto,
            hashnode,
        }
    }
}
