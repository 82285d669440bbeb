//! Probe Error Types
//!
//! Only two error classes abort a run from inside an exchange: a missed
//! echo (timeout) and a malformed echo (framing). A stale echo, one whose
//! sequence number is merely not the expected one, is not an error at all;
//! the runner discards it and keeps waiting.

use thiserror::Error;

use crate::client::ClientError;
use crate::payload::FrameError;

/// Probe error taxonomy. Any of these terminates the run immediately; there
/// is no partial-success reporting and no resumption.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// No matching echo within the per-attempt receive timeout.
    #[error("no echo on '{channel}' within {waited_ms}ms")]
    EchoTimeout { channel: String, waited_ms: u64 },

    /// Received payload has the wrong length or a malformed header.
    #[error("bad echo payload: {0}")]
    BadEcho(FrameError),

    /// Transport-level failure reported by the harness client.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The harness device registry is empty.
    #[error("device registry is empty")]
    NoDevices,

    /// The whole run exceeded its wall-clock budget.
    #[error("run exceeded its {budget_ms}ms budget")]
    RunTimeout { budget_ms: u64 },

    /// Invalid probe configuration (channel pair or framing sizes).
    #[error("config error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ProbeError::EchoTimeout {
            channel: "devin1".to_string(),
            waited_ms: 30_000,
        };
        assert_eq!(err.to_string(), "no echo on 'devin1' within 30000ms");

        let err = ProbeError::BadEcho(FrameError::Size {
            expected: 1024,
            actual: 1023,
        });
        assert_eq!(
            err.to_string(),
            "bad echo payload: unexpected event size: expected 1024, got 1023"
        );
    }

    #[test]
    fn test_client_error_is_transparent() {
        let err: ProbeError = ClientError::UnknownChannel("devout9".to_string()).into();
        assert_eq!(err.to_string(), "unknown channel: devout9");
    }
}
