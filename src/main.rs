//! Echo Probe - device-to-cloud event round-trip probe
//!
//! Entry point. Loads the per-environment config, applies command line
//! overrides, then drives the probe suite:
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌───────────┐    ┌──────────┐
//! │  Config  │───▶│  Suite   │───▶│  Runner   │───▶│  Report  │
//! │  (YAML)  │    │ (pairs)  │    │(ping-pong)│    │(txt+json)│
//! └──────────┘    └──────────┘    └───────────┘    └──────────┘
//! ```
//!
//! With the `mock-api` feature (the default) the suite runs against the
//! in-process loopback harness, which is useful for soak-testing the probe
//! itself. Production builds disable the feature and embed the probe as a
//! library with a real harness client.

use std::fs::File;
use std::io::Write;
use std::time::Instant;

use echo_probe::config::AppConfig;
use echo_probe::logging::init_logging;
use echo_probe::suite::SuiteReport;

// ============================================================
// ARGUMENTS
// ============================================================

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

fn get_output_dir() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--output" && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "output".to_string()
}

/// Get a numeric override from the command line (e.g. `--count 50`)
fn get_u64_arg(name: &str) -> Option<u64> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == name && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

// ============================================================
// SUITE EXECUTION
// ============================================================

#[cfg(feature = "mock-api")]
fn run_suite(config: echo_probe::ProbeConfig) -> anyhow::Result<SuiteReport> {
    use anyhow::Context;
    use echo_probe::LoopbackClient;
    use echo_probe::suite::ProbeSuite;
    use std::sync::Arc;

    let client = Arc::new(LoopbackClient::single_device("loopback0"));
    for pair in &config.pairs {
        client.pair(&pair.out_channel, &pair.in_channel);
    }
    println!(
        "🚀 Probing {} pair(s) against the loopback harness",
        config.pairs.len()
    );

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        ProbeSuite::new(client, config)
            .run()
            .await
            .context("probe run failed")
    })
}

#[cfg(not(feature = "mock-api"))]
fn run_suite(_config: echo_probe::ProbeConfig) -> anyhow::Result<SuiteReport> {
    anyhow::bail!(
        "no harness transport compiled in; enable the `mock-api` feature \
         or embed the probe as a library with a real EventClient"
    )
}

// ============================================================
// MAIN
// ============================================================

fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config = AppConfig::load(&env);

    if let Some(count) = get_u64_arg("--count") {
        app_config.probe.event_count = count;
    }
    if let Some(size) = get_u64_arg("--size") {
        app_config.probe.event_size = size as usize;
    }
    if let Some(ms) = get_u64_arg("--interval-ms") {
        app_config.probe.event_interval_ms = ms;
    }

    let _log_guard = init_logging(&app_config);
    tracing::info!("Starting echo probe in {} mode (build {})", env, env!("GIT_HASH"));

    let output_dir = get_output_dir();
    std::fs::create_dir_all(&output_dir)?;

    let started = Instant::now();
    let report = run_suite(app_config.probe.clone())?;

    let mut run_lines = String::new();
    for run in &report.runs {
        run_lines.push_str(&format!(
            "  {} -> {}: {} events in {:.1}s ({:.1} events/sec, p50 {}us, p99 {}us)\n",
            run.out_channel,
            run.in_channel,
            run.events,
            run.elapsed_ms as f64 / 1000.0,
            run.events_per_sec,
            run.rtt.p50_us,
            run.rtt.p99_us,
        ));
    }
    let summary = format!(
        r#"=== Echo Probe Summary ===
Device: {}
Started: {}
{}Total Time: {:.2?}
"#,
        report.device_id,
        report.started_at,
        run_lines,
        started.elapsed(),
    );
    println!("\n{}", summary);

    let summary_path = format!("{}/probe_summary.txt", output_dir);
    let mut summary_file = File::create(&summary_path)?;
    summary_file.write_all(summary.as_bytes())?;

    let report_path = format!("{}/probe_report.json", output_dir);
    let mut report_file = File::create(&report_path)?;
    report_file.write_all(serde_json::to_string_pretty(&report)?.as_bytes())?;
    println!("Report written to {} and {}", summary_path, report_path);

    Ok(())
}
