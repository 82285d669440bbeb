use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub enable_tracing: bool,
    #[serde(default)]
    pub probe: ProbeConfig,
}

/// One outbound/inbound channel pair probed as a unit.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ChannelPair {
    pub out_channel: String,
    pub in_channel: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProbeConfig {
    /// Exchanges per run.
    pub event_count: u64,
    /// Minimum spacing between consecutive publishes.
    pub event_interval_ms: u64,
    /// Bounded wait per receive attempt.
    pub event_timeout_ms: u64,
    /// Exact payload size in bytes, published and echoed.
    pub event_size: usize,
    /// Wall-clock budget for one whole run.
    pub run_timeout_ms: u64,
    /// Advisory retry budget handed to the transport.
    pub retries: u32,
    /// Channel pairs probed sequentially, all on the first device.
    pub pairs: Vec<ChannelPair>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            event_count: 200,
            event_interval_ms: 250,
            event_timeout_ms: 30_000,
            event_size: 1024,
            run_timeout_ms: 600_000,
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
}

impl ProbeConfig {
    pub fn event_interval(&self) -> Duration {
        Duration::from_millis(self.event_interval_ms)
    }

    pub fn event_timeout(&self) -> Duration {
        Duration::from_millis(self.event_timeout_ms)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_millis(self.run_timeout_ms)
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_defaults() {
        let cfg = ProbeConfig::default();
        assert_eq!(cfg.event_count, 200);
        assert_eq!(cfg.event_interval(), Duration::from_millis(250));
        assert_eq!(cfg.event_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.event_size, 1024);
        assert_eq!(cfg.run_timeout(), Duration::from_secs(600));
        assert_eq!(cfg.pairs.len(), 2);
        assert_eq!(cfg.pairs[0].out_channel, "devout1");
        assert_eq!(cfg.pairs[0].in_channel, "devin1");
    }

    #[test]
    fn test_probe_section_is_optional() {
        let yaml = r#"
log_level: info
log_dir: logs
log_file: probe.log
use_json: false
rotation: daily
enable_tracing: true
"#;
        let cfg: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.probe.event_count, 200);
    }

    #[test]
    fn test_probe_section_overrides() {
        let yaml = r#"
log_level: debug
log_dir: logs
log_file: probe.log
use_json: true
rotation: hourly
enable_tracing: true
probe:
  event_count: 10
  event_interval_ms: 100
  event_timeout_ms: 5000
  event_size: 256
  run_timeout_ms: 60000
  retries: 1
  pairs:
    - out_channel: ping
      in_channel: pong
"#;
        let cfg: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.probe.event_count, 10);
        assert_eq!(cfg.probe.event_size, 256);
        assert_eq!(
            cfg.probe.pairs,
            vec![ChannelPair {
                out_channel: "ping".to_string(),
                in_channel: "pong".to_string(),
            }]
        );
    }
}
