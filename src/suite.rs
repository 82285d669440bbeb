//! Probe suite - runs the configured channel pairs against one device
//!
//! Resolves the target device from the harness registry, validates the
//! configured pairs, then runs each pair sequentially. Every run is bounded
//! by the wall-clock budget from the configuration; the runner itself
//! carries no cancellation, the budget is enforced here at the enclosing
//! layer.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::client::EventClient;
use crate::config::ProbeConfig;
use crate::probe::{PingPongRunner, ProbeContext, ProbeError, RunReport, RunnerConfig};

pub struct ProbeSuite {
    client: Arc<dyn EventClient>,
    config: ProbeConfig,
}

/// Suite outcome: one report per channel pair, in configuration order.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub device_id: String,
    pub started_at: String,
    pub runs: Vec<RunReport>,
}

impl ProbeSuite {
    pub fn new(client: Arc<dyn EventClient>, config: ProbeConfig) -> Self {
        Self { client, config }
    }

    /// Run every configured pair to completion, aborting the suite on the
    /// first failed run.
    pub async fn run(&self) -> Result<SuiteReport, ProbeError> {
        let devices = self.client.devices().await?;
        let device = devices.first().ok_or(ProbeError::NoDevices)?;

        for pair in &self.config.pairs {
            if pair.out_channel.is_empty() || pair.in_channel.is_empty() {
                return Err(ProbeError::Config("channel name is empty".to_string()));
            }
            if pair.out_channel == pair.in_channel {
                return Err(ProbeError::Config(format!(
                    "pair '{}' uses the same channel in both directions",
                    pair.out_channel
                )));
            }
        }

        let runner = PingPongRunner::new(
            ProbeContext {
                client: self.client.clone(),
                device_id: device.id.clone(),
            },
            RunnerConfig {
                event_count: self.config.event_count,
                event_interval: self.config.event_interval(),
                event_timeout: self.config.event_timeout(),
                event_size: self.config.event_size,
                retries: self.config.retries,
            },
        );

        let budget = self.config.run_timeout();
        let started_at = chrono::Utc::now().to_rfc3339();
        info!(
            "probe suite: device {}, {} pair(s), {}ms budget per run",
            device.id,
            self.config.pairs.len(),
            self.config.run_timeout_ms
        );

        let mut runs = Vec::with_capacity(self.config.pairs.len());
        for pair in &self.config.pairs {
            let report =
                match tokio::time::timeout(budget, runner.run(&pair.out_channel, &pair.in_channel))
                    .await
                {
                    Ok(result) => result?,
                    Err(_) => {
                        return Err(ProbeError::RunTimeout {
                            budget_ms: self.config.run_timeout_ms,
                        });
                    }
                };
            info!(
                "{} -> {}: {} events in {:.1}s",
                pair.out_channel,
                pair.in_channel,
                report.events,
                report.elapsed_ms as f64 / 1000.0
            );
            runs.push(report);
        }

        Ok(SuiteReport {
            device_id: device.id.clone(),
            started_at,
            runs,
        })
    }
}

#[cfg(all(test, feature = "mock-api"))]
mod tests {
    use super::*;
    use crate::client::LoopbackClient;
    use crate::config::ChannelPair;

    fn fast_probe_config() -> ProbeConfig {
        ProbeConfig {
            event_count: 3,
            event_interval_ms: 5,
            event_timeout_ms: 200,
            event_size: 64,
            run_timeout_ms: 5_000,
            retries: 3,
            pairs: vec![
                ChannelPair {
                    out_channel: "devout1".to_string(),
                    in_channel: "devin1".to_string(),
                },
                ChannelPair {
                    out_channel: "devout2".to_string(),
                    in_channel: "devin2".to_string(),
                },
            ],
        }
    }

    fn loopback_for(config: &ProbeConfig) -> Arc<LoopbackClient> {
        let client = Arc::new(LoopbackClient::single_device("dev0"));
        for pair in &config.pairs {
            client.pair(&pair.out_channel, &pair.in_channel);
        }
        client
    }

    #[tokio::test]
    async fn test_suite_runs_all_pairs() {
        let config = fast_probe_config();
        let client = loopback_for(&config);
        let suite = ProbeSuite::new(client, config);

        let report = suite.run().await.unwrap();
        assert_eq!(report.device_id, "dev0");
        assert_eq!(report.runs.len(), 2);
        assert_eq!(report.runs[0].out_channel, "devout1");
        assert_eq!(report.runs[1].out_channel, "devout2");
    }

    #[tokio::test]
    async fn test_empty_registry_is_fatal() {
        let config = fast_probe_config();
        let client = Arc::new(LoopbackClient::new(Vec::new()));
        let suite = ProbeSuite::new(client, config);

        let err = suite.run().await.unwrap_err();
        assert!(matches!(err, ProbeError::NoDevices));
    }

    #[tokio::test]
    async fn test_duplicate_pair_channels_rejected() {
        let mut config = fast_probe_config();
        config.pairs = vec![ChannelPair {
            out_channel: "dup".to_string(),
            in_channel: "dup".to_string(),
        }];
        let client = Arc::new(LoopbackClient::single_device("dev0"));
        let suite = ProbeSuite::new(client, config);

        let err = suite.run().await.unwrap_err();
        assert!(matches!(err, ProbeError::Config(_)));
    }

    #[tokio::test]
    async fn test_run_budget_is_enforced() {
        let mut config = fast_probe_config();
        config.event_count = 100;
        config.event_interval_ms = 50;
        config.run_timeout_ms = 30;
        let client = loopback_for(&config);
        let suite = ProbeSuite::new(client, config);

        let err = suite.run().await.unwrap_err();
        assert!(matches!(err, ProbeError::RunTimeout { budget_ms: 30 }));
    }
}
