//! Ping-pong runner - sequential, rate-limited echo exchanges
//!
//! Drives `event_count` exchanges over one outbound/inbound channel pair.
//! Each exchange walks a small state machine:
//!
//! ```text
//! Pacing -> Publishing -> AwaitingEcho -> Matched
//! ```
//!
//! Exchanges never overlap: exchange n is fully resolved (echo matched or
//! run aborted) before exchange n+1 starts, because the device echoes the
//! number it was just sent. At most one publish and one receive-wait are
//! outstanding at any time.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info};

use super::error::ProbeError;
use crate::client::{EventClient, PublishRequest};
use crate::payload;
use crate::stats::{RoundTripStats, StatsSummary};

/// Everything the runner needs from the enclosing harness. Constructed by
/// the caller and injected; the runner keeps no other context.
#[derive(Debug, Clone)]
pub struct ProbeContext {
    pub client: Arc<dyn EventClient>,
    pub device_id: String,
}

/// Tunables for one run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub event_count: u64,
    pub event_interval: Duration,
    pub event_timeout: Duration,
    pub event_size: usize,
    /// Advisory retry budget passed through to the transport.
    pub retries: u32,
}

/// Exchange lifecycle. `Matched` ends the exchange; every fatal condition
/// aborts the whole run instead of transitioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExchangeState {
    Pacing,
    Publishing,
    AwaitingEcho,
    Matched,
}

/// Outcome of a completed run. The elapsed wall-clock time is the
/// externally observable metric.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub out_channel: String,
    pub in_channel: String,
    pub events: u64,
    pub elapsed_ms: u64,
    pub events_per_sec: f64,
    pub rtt: StatsSummary,
}

pub struct PingPongRunner {
    ctx: ProbeContext,
    cfg: RunnerConfig,
}

impl PingPongRunner {
    pub fn new(ctx: ProbeContext, cfg: RunnerConfig) -> Self {
        Self { ctx, cfg }
    }

    /// Perform `event_count` sequential exchanges over the channel pair.
    ///
    /// Both channels must be pre-provisioned and subscribed by the harness;
    /// the runner only validates that the pair is well-formed.
    pub async fn run(&self, out_channel: &str, in_channel: &str) -> Result<RunReport, ProbeError> {
        if out_channel.is_empty() || in_channel.is_empty() {
            return Err(ProbeError::Config("channel name is empty".to_string()));
        }
        if out_channel == in_channel {
            return Err(ProbeError::Config(format!(
                "outbound and inbound channels must be distinct, both are '{out_channel}'"
            )));
        }
        // The largest header must fit the configured event size
        if let Err(e) = payload::encode(self.cfg.event_count, self.cfg.event_size) {
            return Err(ProbeError::Config(e.to_string()));
        }

        let event_name = format!("{}/{}", self.ctx.device_id, out_channel);
        info!(
            "ping-pong run: {} events of {} bytes, {} -> {}",
            self.cfg.event_count, self.cfg.event_size, out_channel, in_channel
        );

        let started = Instant::now();
        let mut stats = RoundTripStats::new();
        // First exchange never waits
        let mut last_publish: Option<Instant> = None;

        for seq in 1..=self.cfg.event_count {
            let mut state = ExchangeState::Pacing;
            let mut published_at = started;

            while state != ExchangeState::Matched {
                match state {
                    ExchangeState::Pacing => {
                        if let Some(prev) = last_publish {
                            let since = prev.elapsed();
                            if since < self.cfg.event_interval {
                                tokio::time::sleep(self.cfg.event_interval - since).await;
                            }
                        }
                        state = ExchangeState::Publishing;
                    }
                    ExchangeState::Publishing => {
                        let data = payload::encode(seq, self.cfg.event_size)
                            .map_err(|e| ProbeError::Config(e.to_string()))?;
                        self.ctx
                            .client
                            .publish_event(PublishRequest {
                                name: event_name.clone(),
                                data,
                                retries: self.cfg.retries,
                            })
                            .await?;
                        published_at = Instant::now();
                        last_publish = Some(published_at);
                        state = ExchangeState::AwaitingEcho;
                    }
                    ExchangeState::AwaitingEcho => {
                        let received = self
                            .ctx
                            .client
                            .receive_event(in_channel, self.cfg.event_timeout)
                            .await?;
                        let Some(data) = received else {
                            return Err(ProbeError::EchoTimeout {
                                channel: in_channel.to_string(),
                                waited_ms: self.cfg.event_timeout.as_millis() as u64,
                            });
                        };
                        let echoed = payload::decode(&data, self.cfg.event_size)
                            .map_err(ProbeError::BadEcho)?;
                        if echoed == seq {
                            stats.record(published_at.elapsed());
                            state = ExchangeState::Matched;
                        } else {
                            // Late or duplicate echo from an earlier
                            // exchange; keep waiting for the current one
                            debug!("stale echo {} while waiting for {}, discarded", echoed, seq);
                        }
                    }
                    ExchangeState::Matched => unreachable!("loop exits on Matched"),
                }
            }
        }

        let elapsed = started.elapsed();
        let events_per_sec = if elapsed.as_secs_f64() > 0.0 {
            self.cfg.event_count as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };
        info!(
            "ping-pong run done: {} events in {:.1}s ({:.1} events/sec)",
            self.cfg.event_count,
            elapsed.as_secs_f64(),
            events_per_sec
        );

        Ok(RunReport {
            out_channel: out_channel.to_string(),
            in_channel: in_channel.to_string(),
            events: self.cfg.event_count,
            elapsed_ms: elapsed.as_millis() as u64,
            events_per_sec,
            rtt: stats.summary(),
        })
    }
}
