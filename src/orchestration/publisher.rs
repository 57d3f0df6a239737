//! Post orchestrator - concurrent fan-out over the platform clients
//!
//! Takes one article and the per-platform credentials, starts every
//! credentialed platform's publish chain concurrently, and aggregates the
//! outcomes into one report. Every chain failure is converted into exactly
//! one failure outcome at the chain boundary; nothing aborts the run or a
//! sibling chain. Platforms without a credential are skipped up front and
//! produce no outcome; whether that aborts the whole run is the caller's
//! decision.
//!
//! Outcomes are collected in platform declaration order, independent of
//! completion order, so reports are reproducible across runs.

use crate::core::article::Article;
use crate::core::error::PublishError;
use crate::core::traits::{
    AggregatedReport, Platform, PlatformClient, PlatformOutcome, PublishTargets,
};
use crate::platforms::default_clients;
use secrecy::SecretString;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Multi-platform publish orchestrator
pub struct PostOrchestrator {
    clients: Vec<Arc<dyn PlatformClient>>,
}

impl PostOrchestrator {
    /// Create an orchestrator over all supported platforms
    ///
    /// `timeout` bounds every network call each chain performs; it is the
    /// only thing keeping a stuck platform from blocking the fan-in.
    pub fn new(timeout: Duration) -> Result<Self, PublishError> {
        Ok(Self {
            clients: default_clients(timeout)?,
        })
    }

    /// Create an orchestrator over the given clients (declaration order)
    pub fn with_clients(clients: Vec<Arc<dyn PlatformClient>>) -> Self {
        Self { clients }
    }

    /// Publish one article to every platform with a present credential
    pub async fn publish_to_all(
        &self,
        article: &Article,
        credentials: &HashMap<Platform, SecretString>,
        targets: &PublishTargets,
    ) -> AggregatedReport {
        let tasks = self.spawn_chains(credentials, |client, token| {
            let article = article.clone();
            let targets = targets.clone();
            async move {
                let platform = client.platform();
                match client.publish(&token, &article, &targets).await {
                    Ok(post) => {
                        let message = match post.url {
                            Some(url) => format!("投稿に成功しました: {}", url),
                            None => "投稿に成功しました".to_string(),
                        };
                        PlatformOutcome::succeeded(platform, message)
                    }
                    Err(e) => PlatformOutcome::failed(platform, e.to_string()),
                }
            }
        });

        Self::join_chains(tasks).await
    }

    /// Verify every present credential with a cheap authenticated call
    pub async fn check_all(
        &self,
        credentials: &HashMap<Platform, SecretString>,
    ) -> AggregatedReport {
        let tasks = self.spawn_chains(credentials, |client, token| async move {
            let platform = client.platform();
            match client.check_auth(&token).await {
                Ok(()) => PlatformOutcome::succeeded(platform, "認証に成功しました".to_string()),
                Err(e) => PlatformOutcome::failed(platform, e.to_string()),
            }
        });

        Self::join_chains(tasks).await
    }

    /// Start one independent task per credentialed platform
    ///
    /// Platforms missing a credential are never attempted and get no slot.
    fn spawn_chains<F, Fut>(
        &self,
        credentials: &HashMap<Platform, SecretString>,
        run: F,
    ) -> Vec<(Platform, JoinHandle<PlatformOutcome>)>
    where
        F: Fn(Arc<dyn PlatformClient>, SecretString) -> Fut,
        Fut: Future<Output = PlatformOutcome> + Send + 'static,
    {
        let mut tasks = Vec::new();

        for client in &self.clients {
            let platform = client.platform();
            let Some(token) = credentials.get(&platform) else {
                continue;
            };

            let future = run(Arc::clone(client), token.clone());
            tasks.push((platform, tokio::spawn(future)));
        }

        tasks
    }

    /// Await every started chain and collect outcomes in declaration order
    ///
    /// Each handle owns its disjoint outcome slot; a panicked chain still
    /// yields exactly one failure outcome for its platform.
    async fn join_chains(
        tasks: Vec<(Platform, JoinHandle<PlatformOutcome>)>,
    ) -> AggregatedReport {
        let mut outcomes = Vec::with_capacity(tasks.len());

        for (platform, task) in tasks {
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(e) => PlatformOutcome::failed(
                    platform,
                    format!("タスクが異常終了しました: {}", e),
                ),
            };
            outcomes.push(outcome);
        }

        AggregatedReport::from_outcomes(outcomes)
    }
}
