//! Prefetch stressor CLI.
//!
//! This binary runs one instance of the prefetch stressor. It performs:
//! 1. **Configuration:** Loads an optional JSON file, then applies command-line overrides.
//! 2. **Run:** Benchmarks every prefetch distance until the op or time limit is reached.
//! 3. **Report:** Prints the metrics (or the full outcome as JSON) and exits with the framework's code.

use std::path::PathBuf;
use std::{fs, process};

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use prefbench_core::bench::{BoundedRun, MetricsReport, RunOutcome, run_stressor};
use prefbench_core::config::{Config, Settings};
use prefbench_core::method::{METHODS, method_names};

#[derive(Parser, Debug)]
#[command(
    name = "prefbench",
    author,
    version,
    about = "Cache prefetch micro-benchmark",
    long_about = "Measure read bandwidth against the distance at which a prefetch hint is issued.\n\nExamples:\n  prefbench --method prefetcht0 --ops 4\n  prefbench --l3-size 8m --verify --json\n  prefbench --config run.json --offsets"
)]
struct Cli {
    /// Data size to stream (suffixes b, k, m, g, t); probed from the cache topology by default.
    #[arg(long, value_name = "BYTES")]
    l3_size: Option<String>,

    /// Prefetch method (see --list-methods).
    #[arg(long, value_name = "NAME")]
    method: Option<String>,

    /// Stop after this many full passes.
    #[arg(long, value_name = "N")]
    ops: Option<u64>,

    /// Stop after this many seconds.
    #[arg(long, value_name = "SECS")]
    timeout: Option<f64>,

    /// Verify checksums and check the best rate against the baseline.
    #[arg(long)]
    verify: bool,

    /// JSON configuration file; command-line options take precedence.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the outcome as JSON.
    #[arg(long)]
    json: bool,

    /// List the methods this build supports and exit.
    #[arg(long)]
    list_methods: bool,

    /// Print the rate of every offset.
    #[arg(long)]
    offsets: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.list_methods {
        list_methods();
        return;
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    let settings = match build_settings(&cli, &config) {
        Ok(settings) => settings,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    let mut control = BoundedRun::from_config(&config.run);
    let mut report = MetricsReport::default();
    let outcome = run_stressor(&settings, &mut control, &mut report);

    if cli.json {
        print_json(&outcome, &report);
    } else {
        print_summary(&outcome, &report, cli.offsets);
    }

    process::exit(outcome.exit_code());
}

/// Installs the fmt subscriber; `RUST_LOG` wins over `-v`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn list_methods() {
    for method in METHODS {
        let state = if method.is_available() {
            "available"
        } else {
            "unavailable"
        };
        println!("{:<12} {:<30} {state}", method.name, method.kind.label());
    }
}

/// Reads the JSON file if given, then folds the run limits from the command line in.
fn load_config(cli: &Cli) -> Result<Config, String> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            Config::from_json(&text).map_err(|e| e.to_string())?
        }
        None => Config::default(),
    };

    if cli.ops.is_some() {
        config.run.max_ops = cli.ops;
    }
    if cli.timeout.is_some() {
        config.run.timeout_secs = cli.timeout;
    }
    Ok(config)
}

fn build_settings(cli: &Cli, config: &Config) -> Result<Settings, String> {
    let mut settings = config.settings().map_err(|e| e.to_string())?;
    if let Some(size) = &cli.l3_size {
        settings.set_l3_size_str(size).map_err(|e| e.to_string())?;
    }
    if let Some(name) = &cli.method {
        settings.set_method_str(name).map_err(|e| {
            format!("{e}\navailable: {}", method_names().collect::<Vec<_>>().join(", "))
        })?;
    }
    if cli.verify {
        settings = settings.with_verify(true);
    }
    Ok(settings)
}

fn print_json(outcome: &RunOutcome, report: &MetricsReport) {
    let doc = serde_json::json!({
        "outcome": outcome,
        "metrics": report,
    });
    match serde_json::to_string_pretty(&doc) {
        Ok(text) => println!("{text}"),
        Err(e) => error!("cannot serialize outcome: {e}"),
    }
}

fn print_summary(outcome: &RunOutcome, report: &MetricsReport, offsets: bool) {
    if offsets {
        if let Some(table) = &outcome.table {
            table.print();
        }
    }

    println!("method:    {}", outcome.method);
    println!("status:    {:?}", outcome.status);
    if outcome.data_size > 0 {
        println!("data size: {} KB", outcome.data_size / 1024);
    }
    println!("passes:    {}", outcome.ops);
    for metric in &report.metrics {
        println!("{:>12.3} {}", metric.value, metric.label);
    }
    if let Some(result) = &outcome.result {
        println!(
            "best offset {} bytes (~{:.2} ns lead time)",
            result.best_offset, result.lead_time_ns
        );
    }
    if let Some(e) = &outcome.error {
        println!("error:     {e}");
    }
}
