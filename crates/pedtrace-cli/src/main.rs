//! `pedtrace` – pedestrian trajectory dataset recorder.
//!
//! This binary is the entry point for a recording run.  It:
//!
//! 1. Loads `~/.pedtrace/config.toml` (optional; defaults cover a first run)
//!    and applies `PEDTRACE_*` environment overrides.
//! 2. Validates the scene extents and flip profile before any file is opened.
//! 3. Wires a scripted crossing scenario into the track bus and runs the
//!    recorder until the configured row count is reached.
//! 4. Intercepts **Ctrl-C** so a cut-short run still flushes and transposes
//!    what it collected.

mod config;

use colored::Colorize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use pedtrace_dataset::DatasetWriter;
use pedtrace_middleware::{SimSource, TrackBus, pump};
use pedtrace_pipeline::{Extents, FlipProfile, FrameProcessor, LocalZone};
use pedtrace_runtime::{Recorder, RecorderConfig, RecorderReport, init_tracing};

fn main() {
    init_tracing();

    print_banner();

    // ── Configuration Vault ───────────────────────────────────────────────
    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            println!("  No config file found; using defaults.");
            let mut cfg = config::Config::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = cfg.validate() {
        println!("{}: {}", "Invalid configuration".red(), e);
        std::process::exit(1);
    }
    debug!(robot_frame = %cfg.robot_frame, "robot frame accepted (not consumed by the pipeline)");

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!(
            "{}",
            "⚠  Ctrl-C received – finishing the run and flushing the dataset …"
                .yellow()
                .bold()
        );
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available");
    }

    // ── Recording run ─────────────────────────────────────────────────────
    match run_recording(&cfg, shutdown) {
        Ok(report) => print_report(&report),
        Err(e) => {
            println!("{}: {}", "Recording failed".red(), e);
            std::process::exit(1);
        }
    }
}

/// Build the pipeline from the validated config and drive it to completion
/// on a dedicated Tokio runtime.
fn run_recording(
    cfg: &config::Config,
    shutdown: Arc<AtomicBool>,
) -> Result<RecorderReport, String> {
    let extents =
        Extents::try_new(cfg.global_width, cfg.global_height).map_err(|e| e.to_string())?;
    let zone = LocalZone::new(cfg.local_width, cfg.local_height);
    let flip = FlipProfile::try_from(cfg.flip).map_err(|e| e.to_string())?;

    let processor = FrameProcessor::new(extents, zone, flip);
    let writer =
        DatasetWriter::create(&cfg.path, cfg.size, flip.index()).map_err(|e| e.to_string())?;

    let recorder_cfg = RecorderConfig {
        target_rows: cfg.size,
        sample_rate_hz: cfg.rate,
    };

    println!(
        "  Recording {} rows to {} at {} Hz ({}).\n",
        cfg.size.to_string().bold(),
        writer.path().display().to_string().bold(),
        cfg.rate,
        flip.to_string().cyan()
    );

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to start the async runtime: {}", e))?;

    runtime.block_on(async {
        let bus = TrackBus::default();

        // Subscribe before the pump starts so no early event is missed.
        let recorder = Recorder::new(processor, writer, recorder_cfg, &bus);

        let source = SimSource::new(cfg.global_width, cfg.global_height)
            .with_frames(cfg.size as u32)
            .with_step(Duration::from_secs_f64(1.0 / cfg.rate.max(1e-3)));
        let pump_bus = bus.clone();
        tokio::spawn(async move {
            pump(&source, &pump_bus).await;
        });

        recorder.run(shutdown).await.map_err(|e| e.to_string())
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner & report
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   ___         ___________                "#.bold().cyan());
    println!("{}", r#"  / _ \___ ___/ /_  __/ _ \___ ________   "#.bold().cyan());
    println!("{}", r#" / ___/ -_) _  / / / / , _/ _ `/ __/ -_)  "#.bold().cyan());
    println!("{}", r#"/_/   \__/\_,_/ /_/ /_/|_|\_,_/\__/\__/   "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "PedTrace".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Pedestrian Trajectory Dataset Recorder");
    println!();
}

fn print_report(report: &RecorderReport) {
    println!();
    println!("{}", "  ✓ Recording complete.".green().bold());
    println!(
        "    rows written     : {}",
        report.rows.to_string().bold()
    );
    println!(
        "    frames accepted  : {}",
        report.frames.to_string().bold()
    );
    println!(
        "    batches dropped  : {}",
        report.dropped_batches.to_string().bold()
    );
    println!(
        "    frame-major file : {}",
        report.dataset_path.display().to_string().bold()
    );
    println!(
        "    transposed file  : {}",
        report.transposed_path.display().to_string().bold()
    );
    println!();
}
