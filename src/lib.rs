//! Echo Probe - device-to-cloud event round-trip measurement
//!
//! Publishes numbered events to a device's outbound channel and expects the
//! device to echo each one back on a paired inbound channel, measuring
//! sustained round-trip throughput over a fixed-count, rate-limited run.
//!
//! # Modules
//!
//! - [`config`] - per-environment YAML configuration
//! - [`logging`] - tracing setup (rolling file + stdout)
//! - [`payload`] - fixed-size payload framing
//! - [`client`] - harness client contract (and the loopback test double)
//! - [`probe`] - the ping-pong runner and its error taxonomy
//! - [`stats`] - round-trip latency statistics
//! - [`suite`] - multi-pair probe orchestration

pub mod client;
pub mod config;
pub mod logging;
pub mod payload;
pub mod probe;
pub mod stats;
pub mod suite;

// Convenient re-exports at crate root
pub use client::{ClientError, DeviceInfo, EventClient, PublishRequest};
pub use config::{AppConfig, ChannelPair, ProbeConfig};
pub use payload::FrameError;
pub use probe::{PingPongRunner, ProbeContext, ProbeError, RunReport, RunnerConfig};
pub use stats::{RoundTripStats, StatsSummary};
pub use suite::{ProbeSuite, SuiteReport};

#[cfg(feature = "mock-api")]
pub use client::{LoopbackClient, PairBehavior};
