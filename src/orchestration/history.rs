//! Publish history - track past publish attempts per platform
//!
//! Each run appends one record per attempted platform to a JSON data file;
//! the `stats` command aggregates them into per-platform statistics with a
//! markdown summary.

use crate::core::traits::AggregatedReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs;

const HISTORY_FILE_VERSION: &str = "1.0";

/// History record for a single platform publish attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishRecord {
    pub id: String,
    pub title: String,
    pub platform: String,
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Per-platform statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformStatistics {
    pub platform: String,
    pub attempts: usize,
    pub successes: usize,
    pub failures: usize,
    pub success_rate: f64,
    pub last_publish: DateTime<Utc>,
}

/// Overall publishing statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishStatistics {
    pub total_attempts: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub success_rate: f64,
    pub by_platform: HashMap<String, PlatformStatistics>,
}

/// Data file structure
#[derive(Debug, Serialize, Deserialize)]
struct HistoryDataFile {
    version: String,
    records: Vec<PublishRecord>,
    last_updated: String,
}

/// Persistent publish history
pub struct PublishHistory {
    records: Vec<PublishRecord>,
    data_file_path: PathBuf,
}

impl PublishHistory {
    /// Create a history store at the default location
    /// (~/.blog-publisher/history.json)
    pub fn new() -> Self {
        let base = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let data_file_path = PathBuf::from(base)
            .join(".blog-publisher")
            .join("history.json");

        Self {
            records: Vec::new(),
            data_file_path,
        }
    }

    /// Create a history store backed by a specific file
    pub fn with_path(data_file_path: impl Into<PathBuf>) -> Self {
        Self {
            records: Vec::new(),
            data_file_path: data_file_path.into(),
        }
    }

    /// Initialize by loading existing data; a missing file starts empty
    pub async fn initialize(&mut self) -> Result<(), anyhow::Error> {
        match fs::read_to_string(&self.data_file_path).await {
            Ok(content) => {
                let data: HistoryDataFile = serde_json::from_str(&content)?;
                self.records = data.records;
                Ok(())
            }
            Err(_) => {
                self.records = Vec::new();
                Ok(())
            }
        }
    }

    /// Record every outcome of one run
    pub async fn record_report(
        &mut self,
        title: &str,
        report: &AggregatedReport,
    ) -> Result<(), anyhow::Error> {
        for outcome in &report.outcomes {
            self.records.push(PublishRecord {
                id: Self::generate_id(),
                title: title.to_string(),
                platform: outcome.platform.as_str().to_string(),
                success: outcome.success,
                message: outcome.message.clone(),
                timestamp: Utc::now(),
            });
        }

        self.save().await
    }

    /// All loaded records, oldest first
    pub fn records(&self) -> &[PublishRecord] {
        &self.records
    }

    /// Aggregate the loaded records
    pub fn statistics(&self) -> PublishStatistics {
        let total_attempts = self.records.len();
        let success_count = self.records.iter().filter(|r| r.success).count();
        let failure_count = total_attempts - success_count;

        let mut by_platform: HashMap<String, PlatformStatistics> = HashMap::new();
        for record in &self.records {
            let entry = by_platform
                .entry(record.platform.clone())
                .or_insert_with(|| PlatformStatistics {
                    platform: record.platform.clone(),
                    attempts: 0,
                    successes: 0,
                    failures: 0,
                    success_rate: 0.0,
                    last_publish: record.timestamp,
                });

            entry.attempts += 1;
            if record.success {
                entry.successes += 1;
            } else {
                entry.failures += 1;
            }
            if record.timestamp > entry.last_publish {
                entry.last_publish = record.timestamp;
            }
        }

        for stats in by_platform.values_mut() {
            stats.success_rate = if stats.attempts > 0 {
                stats.successes as f64 / stats.attempts as f64 * 100.0
            } else {
                0.0
            };
        }

        PublishStatistics {
            total_attempts,
            success_count,
            failure_count,
            success_rate: if total_attempts > 0 {
                success_count as f64 / total_attempts as f64 * 100.0
            } else {
                0.0
            },
            by_platform,
        }
    }

    /// Render the statistics as a markdown summary
    pub fn markdown_summary(&self) -> String {
        let statistics = self.statistics();
        let mut lines = Vec::new();

        lines.push("# 投稿履歴".to_string());
        lines.push(String::new());
        lines.push(format!("**Total attempts**: {}", statistics.total_attempts));
        lines.push(format!(
            "**Success rate**: {:.1}% ({} / {})",
            statistics.success_rate, statistics.success_count, statistics.total_attempts
        ));
        lines.push(String::new());

        let mut platforms: Vec<&PlatformStatistics> = statistics.by_platform.values().collect();
        platforms.sort_by(|a, b| a.platform.cmp(&b.platform));

        for stats in platforms {
            lines.push(format!(
                "- **{}**: {}回中{}回成功（{:.1}%）、最終投稿: {}",
                stats.platform,
                stats.attempts,
                stats.successes,
                stats.success_rate,
                stats.last_publish.to_rfc3339()
            ));
        }

        lines.join("\n")
    }

    async fn save(&self) -> Result<(), anyhow::Error> {
        if let Some(parent) = self.data_file_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let data = HistoryDataFile {
            version: HISTORY_FILE_VERSION.to_string(),
            records: self.records.clone(),
            last_updated: Utc::now().to_rfc3339(),
        };

        fs::write(&self.data_file_path, serde_json::to_string_pretty(&data)?).await?;
        Ok(())
    }

    fn generate_id() -> String {
        format!("{}-{}", Utc::now().timestamp_millis(), uuid::Uuid::new_v4())
    }
}

impl Default for PublishHistory {
    fn default() -> Self {
        Self::new()
    }
}
