//! Loopback harness - in-process echo of published events
//!
//! Stands in for the external device/cloud harness during local soak runs
//! and in tests. Every payload published to a registered outbound channel is
//! delivered back on the paired inbound channel, optionally through a fault
//! model: delayed echoes, stale replays of earlier payloads, truncation, or
//! swallowing the echo entirely.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ClientError, DeviceInfo, EventClient, PublishRequest};

/// Fault model for one channel pair. Default is a faithful instant echo.
#[derive(Debug, Clone, Default)]
pub struct PairBehavior {
    /// Delay before the echo (and any stale replays) are delivered.
    pub echo_delay: Duration,
    /// Number of replays of the previous payload delivered before the echo.
    /// No effect on the first exchange, there is nothing to replay yet.
    pub stale_copies: u32,
    /// Trailing bytes dropped from the echo.
    pub truncate: usize,
    /// Swallow the echo entirely: publish succeeds, nothing comes back.
    pub swallow: bool,
}

#[derive(Debug)]
struct Route {
    in_channel: String,
    behavior: PairBehavior,
    last_payload: Option<Vec<u8>>,
    publishes: u64,
}

#[derive(Debug, Default)]
struct State {
    // Keyed by outbound channel name (without the device prefix)
    routes: HashMap<String, Route>,
    senders: HashMap<String, mpsc::UnboundedSender<Vec<u8>>>,
    inboxes: HashMap<String, Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<Vec<u8>>>>>,
}

/// In-process [`EventClient`] that echoes published events back on the
/// paired inbound channel.
#[derive(Debug)]
pub struct LoopbackClient {
    devices: Vec<DeviceInfo>,
    state: Mutex<State>,
}

impl LoopbackClient {
    pub fn new(devices: Vec<DeviceInfo>) -> Self {
        Self {
            devices,
            state: Mutex::new(State::default()),
        }
    }

    /// Convenience constructor with a single provisioned device.
    pub fn single_device(id: &str) -> Self {
        Self::new(vec![DeviceInfo {
            id: id.to_string(),
            name: format!("loopback-{id}"),
        }])
    }

    /// Register a channel pair: events published to `out_channel` are echoed
    /// on `in_channel`.
    pub fn pair(&self, out_channel: &str, in_channel: &str) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state.lock().unwrap();
        state.routes.insert(
            out_channel.to_string(),
            Route {
                in_channel: in_channel.to_string(),
                behavior: PairBehavior::default(),
                last_payload: None,
                publishes: 0,
            },
        );
        state.senders.insert(in_channel.to_string(), tx);
        state.inboxes.insert(
            in_channel.to_string(),
            Arc::new(tokio::sync::Mutex::new(rx)),
        );
    }

    /// Replace the fault model for a registered pair.
    pub fn set_behavior(&self, out_channel: &str, behavior: PairBehavior) {
        let mut state = self.state.lock().unwrap();
        if let Some(route) = state.routes.get_mut(out_channel) {
            route.behavior = behavior;
        }
    }

    /// Number of publishes accepted on an outbound channel.
    pub fn published_count(&self, out_channel: &str) -> u64 {
        let state = self.state.lock().unwrap();
        state.routes.get(out_channel).map_or(0, |r| r.publishes)
    }
}

#[async_trait]
impl EventClient for LoopbackClient {
    async fn publish_event(&self, req: PublishRequest) -> Result<(), ClientError> {
        let channel = req
            .name
            .split_once('/')
            .map(|(_, channel)| channel)
            .ok_or_else(|| {
                ClientError::Transport(format!("event name '{}' missing device prefix", req.name))
            })?;

        let (frames, tx, delay) = {
            let mut state = self.state.lock().unwrap();
            let route = state
                .routes
                .get_mut(channel)
                .ok_or_else(|| ClientError::UnknownChannel(channel.to_string()))?;
            route.publishes += 1;

            if route.behavior.swallow {
                route.last_payload = Some(req.data);
                return Ok(());
            }

            let mut frames = Vec::new();
            if let Some(prev) = &route.last_payload {
                for _ in 0..route.behavior.stale_copies {
                    frames.push(prev.clone());
                }
            }
            let mut echo = req.data.clone();
            if route.behavior.truncate > 0 {
                let len = echo.len().saturating_sub(route.behavior.truncate);
                echo.truncate(len);
            }
            frames.push(echo);
            route.last_payload = Some(req.data);

            let in_channel = route.in_channel.clone();
            let delay = route.behavior.echo_delay;
            let tx = state
                .senders
                .get(&in_channel)
                .cloned()
                .ok_or(ClientError::UnknownChannel(in_channel))?;
            (frames, tx, delay)
        };

        if delay.is_zero() {
            for frame in frames {
                let _ = tx.send(frame);
            }
        } else {
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                for frame in frames {
                    let _ = tx.send(frame);
                }
            });
        }
        Ok(())
    }

    async fn receive_event(
        &self,
        channel: &str,
        timeout: Duration,
    ) -> Result<Option<Vec<u8>>, ClientError> {
        let inbox = {
            let state = self.state.lock().unwrap();
            state
                .inboxes
                .get(channel)
                .cloned()
                .ok_or_else(|| ClientError::UnknownChannel(channel.to_string()))?
        };

        let mut rx = inbox.lock().await;
        match tokio::time::timeout(timeout, rx.recv()).await {
            Ok(Some(data)) => Ok(Some(data)),
            Ok(None) => Err(ClientError::Transport("inbound channel closed".to_string())),
            Err(_) => Ok(None),
        }
    }

    async fn devices(&self) -> Result<Vec<DeviceInfo>, ClientError> {
        Ok(self.devices.clone())
    }
}
