//! Core traits and types for multi-platform article publishing
//!
//! This module defines the fundamental abstractions shared by the platform
//! clients and the orchestrator: the platform set, per-platform targets,
//! outcome types, and the publishing contract.

use crate::core::article::Article;
use crate::core::error::PublishError;
use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Platforms
// ============================================================================

/// Supported publishing platform
///
/// The variant order is the declaration order: reports always list outcomes
/// in this order, independent of completion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Medium,
    Devto,
    Hashnode,
}

impl Platform {
    /// All platforms, in declaration order
    pub const ALL: [Platform; 3] = [Platform::Medium, Platform::Devto, Platform::Hashnode];

    /// Get string representation of the platform
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Medium => "medium",
            Platform::Devto => "dev.to",
            Platform::Hashnode => "hashnode",
        }
    }

    /// Key under which this platform's token is saved in the token store
    pub fn token_key(&self) -> &'static str {
        match self {
            Platform::Medium => "medium_token",
            Platform::Devto => "devto_token",
            Platform::Hashnode => "hashnode_token",
        }
    }

    /// Environment variable that overrides the saved token
    pub fn token_env_var(&self) -> &'static str {
        match self {
            Platform::Medium => "MEDIUM_TOKEN",
            Platform::Devto => "DEVTO_TOKEN",
            Platform::Hashnode => "HASHNODE_TOKEN",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Publish targets
// ============================================================================

/// Medium publish status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    Public,
    Draft,
    Unlisted,
}

impl PublishStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishStatus::Public => "public",
            PublishStatus::Draft => "draft",
            PublishStatus::Unlisted => "unlisted",
        }
    }
}

/// Medium-specific target configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediumTarget {
    /// Publish status sent with the post (default: public)
    #[serde(rename = "publishStatus")]
    pub publish_status: PublishStatus,
}

impl Default for MediumTarget {
    fn default() -> Self {
        Self {
            publish_status: PublishStatus::Public,
        }
    }
}

/// Dev.to-specific target configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DevtoTarget {
    /// Tags attached to the article
    pub tags: Vec<String>,

    /// Publish immediately instead of creating a draft (default: true)
    pub published: bool,
}

impl Default for DevtoTarget {
    fn default() -> Self {
        Self {
            tags: Vec::new(),
            published: true,
        }
    }
}

/// Hashnode-specific target configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HashnodeTarget {
    /// Publication host (e.g., "yourblog.hashnode.dev")
    pub host: String,

    /// Tag slugs to resolve before publishing
    pub tags: Vec<String>,
}

/// Per-platform configuration beyond the secret, immutable for one run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PublishTargets {
    pub medium: MediumTarget,
    pub devto: DevtoTarget,
    pub hashnode: HashnodeTarget,
}

// ============================================================================
// Outcomes
// ============================================================================

/// Details returned by a platform for a successfully published post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PublishedPost {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Per-platform success/failure record, exactly one per attempted platform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlatformOutcome {
    pub platform: Platform,
    pub success: bool,
    pub message: String,
}

impl PlatformOutcome {
    pub fn succeeded(platform: Platform, message: impl Into<String>) -> Self {
        Self {
            platform,
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(platform: Platform, message: impl Into<String>) -> Self {
        Self {
            platform,
            success: false,
            message: message.into(),
        }
    }
}

/// Aggregated result of one fan-out run
///
/// Built only after every started chain has reported. An empty attempt set
/// is never reported as success.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregatedReport {
    pub outcomes: Vec<PlatformOutcome>,
    pub all_succeeded: bool,
}

impl AggregatedReport {
    /// Build a report from collected outcomes (already in declaration order)
    pub fn from_outcomes(outcomes: Vec<PlatformOutcome>) -> Self {
        let all_succeeded = !outcomes.is_empty() && outcomes.iter().all(|o| o.success);
        Self {
            outcomes,
            all_succeeded,
        }
    }

    /// Get the outcome recorded for a platform, if it was attempted
    pub fn outcome_for(&self, platform: Platform) -> Option<&PlatformOutcome> {
        self.outcomes.iter().find(|o| o.platform == platform)
    }

    /// Print the run summary banner
    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(60));
        println!("📊 投稿結果");
        println!("{}", "=".repeat(60));

        if self.outcomes.is_empty() {
            println!("\n⚠️  投稿を試行したプラットフォームはありません");
        }

        for outcome in &self.outcomes {
            if outcome.success {
                println!("\n✅ {}: {}", outcome.platform, outcome.message);
            } else {
                println!("\n❌ {}: {}", outcome.platform, outcome.message);
            }
        }

        println!("\n{}", "=".repeat(60));
        println!(
            "Overall Status: {}",
            if self.all_succeeded {
                "✅ SUCCESS"
            } else {
                "❌ FAILED"
            }
        );
        println!("{}\n", "=".repeat(60));
    }
}

// ============================================================================
// Platform client contract
// ============================================================================

/// Main trait for platform client implementations
///
/// Each client encapsulates one platform's authentication header scheme,
/// payload shape, and response interpretation, including any resolution
/// calls that must precede the publish call. A failed resolution call
/// short-circuits the chain; the publish call is never attempted.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// The platform this client publishes to
    fn platform(&self) -> Platform;

    /// Publish one article, running any resolution calls first
    async fn publish(
        &self,
        token: &SecretString,
        article: &Article,
        targets: &PublishTargets,
    ) -> Result<PublishedPost, PublishError>;

    /// Perform a cheap authenticated round trip to verify the token
    async fn check_auth(&self, token: &SecretString) -> Result<(), PublishError>;
}
