//! Harness client contract
//!
//! The probe owns no transport. Publishing, receiving and device lookup go
//! through the [`EventClient`] trait, implemented by the enclosing test
//! harness. The crate ships a loopback implementation for local runs and
//! tests behind the `mock-api` feature.

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;
use thiserror::Error;

#[cfg(feature = "mock-api")]
pub mod loopback;
#[cfg(feature = "mock-api")]
pub use loopback::{LoopbackClient, PairBehavior};

/// Client-side failures, as reported by the transport.
#[derive(Debug, Error, Clone)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unknown channel: {0}")]
    UnknownChannel(String),
}

/// A provisioned device known to the harness.
///
/// The registry is ordered; the probe reads only the first entry.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub id: String,
    pub name: String,
}

/// Outbound event submission.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    /// Full event name, `"<device_id>/<channel>"`.
    pub name: String,
    pub data: Vec<u8>,
    /// Advisory retry budget. Retries are owned by the transport, never by
    /// the probe itself.
    pub retries: u32,
}

#[async_trait]
pub trait EventClient: Send + Sync + Debug {
    /// Submit an event. Fire-and-forget: returning `Ok` means the transport
    /// accepted the event, not that the device received it.
    async fn publish_event(&self, req: PublishRequest) -> Result<(), ClientError>;

    /// Wait up to `timeout` for the next undelivered message on the named
    /// inbound channel. Returns `Ok(None)` when the wait expires with no
    /// message.
    async fn receive_event(
        &self,
        channel: &str,
        timeout: Duration,
    ) -> Result<Option<Vec<u8>>, ClientError>;

    /// Ordered list of provisioned devices.
    async fn devices(&self) -> Result<Vec<DeviceInfo>, ClientError>;
}
