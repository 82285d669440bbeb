//! Ping-pong probe core
//!
//! The runner drives sequential publish/echo exchanges over one channel
//! pair; the error module defines what can abort a run.

pub mod error;
pub mod runner;

pub use error::ProbeError;
pub use runner::{PingPongRunner, ProbeContext, RunReport, RunnerConfig};
