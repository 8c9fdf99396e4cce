//! glasma-bench entry point.
//!
//! Benchmark setup for the MV initial conditions of the glasma solver:
//! validates the physical inputs, freezes the backend selection, derives the
//! lattice parameters and exercises the engine in the requested mode.

use anyhow::{Context, Result};
use clap::Parser;
use glasma_cli::{Args, Mode, RunConfig, RunOptions};
use glasma_core::probe::{self, DynamicLibraryProbe};
use glasma_core::{
    derive, BenchmarkEngineFactory, DerivedParameters, Engine, EngineFactory, GlasmaError,
    InputSpec, JsonlProgressWriter, LogProgressSink, Orientation, RunLoop, RuntimeConfig,
    SimulationSetup,
};
use std::io::Write;
use std::process::ExitCode;
use std::time::Instant;

/// Run the timed simulation loop
fn run_full_mode(
    engine: &mut dyn Engine,
    spec: &InputSpec,
    options: &RunOptions,
) -> Result<serde_json::Value> {
    let progress = options
        .telemetry
        .as_ref()
        .map(JsonlProgressWriter::append)
        .transpose()?;
    let mut sink = (LogProgressSink, progress);

    let run_loop = RunLoop::new(spec.steps);
    let summary = run_loop.run(engine, &mut sink)?;

    log::info!("=== Results Summary ===");
    log::info!("  Steps: {}", summary.steps_recorded);
    log::info!("  Total: {:.3}s", summary.total_seconds);
    log::info!("  Mean per step: {:.6}s", summary.mean_seconds);
    log::info!("  Slowest step: {:.6}s", summary.max_seconds);

    Ok(serde_json::to_value(summary)?)
}

/// Time the initialisation of both nuclei
fn run_init_mode(engine: &mut dyn Engine, setup: &SimulationSetup) -> Result<serde_json::Value> {
    let mut nuclei = Vec::with_capacity(setup.nuclei.len());

    for nucleus in &setup.nuclei {
        let side = match nucleus.orientation {
            Orientation::Right => "left",
            Orientation::Left => "right",
        };
        log::info!("Initializing {} nucleus.", side);
        let start = Instant::now();
        engine.initialize_nucleus(nucleus)?;
        let seconds = start.elapsed().as_secs_f64();
        log::info!("Initialized {} nucleus in: {:.3}s", side, seconds);
        nuclei.push(serde_json::json!({ "nucleus": side, "seconds": seconds }));
    }

    let start = Instant::now();
    engine.finish_initialization()?;
    // async backends must drain their kernels before the timing is read
    engine.synchronize()?;
    let finish_seconds = start.elapsed().as_secs_f64();
    log::info!("Finished initialization in: {:.3}s", finish_seconds);

    Ok(serde_json::json!({
        "nuclei": nuclei,
        "finish_seconds": finish_seconds,
    }))
}

fn write_summary(
    options: &RunOptions,
    spec: &InputSpec,
    runtime: &RuntimeConfig,
    params: &DerivedParameters,
    results: serde_json::Value,
) -> Result<()> {
    let Some(path) = &options.telemetry else {
        return Ok(());
    };

    let telemetry = serde_json::json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "mode": options.mode.as_str(),
        "run": spec.run_name,
        "output_path": spec.output_path(),
        "runtime": runtime,
        "input": spec,
        "parameters": params,
        "results": results,
    });

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open telemetry file {}", path.display()))?;
    writeln!(file, "{}", serde_json::to_string(&telemetry)?)?;
    log::info!("Telemetry written to: {}", path.display());
    Ok(())
}

fn run(args: &Args, file: &RunConfig) -> Result<()> {
    let (spec, runtime, options) = args.resolve(file)?;
    spec.validate()?;

    log::info!("glasma-bench {} - Starting", glasma_cli::cli::VERSION);
    log::info!("Run '{}' in {} mode", spec.run_name, options.mode.as_str());
    log::info!("  Grid: {:?}, box: LL={} fm, LT={} fm", spec.dims(), spec.ll, spec.lt);
    log::info!("  Energy: {} MeV, m={} MeV, uv={} MeV", spec.sqrts, spec.m, spec.uv);
    log::info!("  Steps: {}", spec.steps);

    // engine-backend code must only be loaded after this point
    let runtime = *runtime.freeze()?;
    log::info!(
        "Backend: {} (device={}, fastmath={})",
        runtime.backend.backend,
        runtime.device_token(),
        runtime.fastmath_token()
    );
    probe::check_backend(&runtime.backend, &DynamicLibraryProbe)?;

    let params = derive(&spec)?;
    params.log_summary();

    let setup = SimulationSetup::new(&spec, &params);
    log::info!("Output file: {}", setup.output_path.display());
    if setup.debug {
        log::debug!("Simulation setup: {:?}", setup);
    }

    let mut engine = BenchmarkEngineFactory.build(&runtime, &setup)?;

    let results = match options.mode {
        Mode::Full => run_full_mode(engine.as_mut(), &spec, &options)?,
        Mode::Init => run_init_mode(engine.as_mut(), &setup)?,
    };

    write_summary(&options, &spec, &runtime, &params, results)?;
    log::info!("Benchmark completed successfully!");
    Ok(())
}

/// Info by default, overridden by `RUST_LOG`; `--debug` wins over both.
fn init_logger(debug: bool) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log::LevelFilter::Info);
    builder.parse_default_env();
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn main() -> ExitCode {
    let args = Args::parse();

    let file = args
        .config
        .as_deref()
        .map(RunConfig::from_file)
        .transpose();
    let debug = args.debug
        || matches!(&file, Ok(Some(config)) if config.run.debug == Some(true));
    init_logger(debug);

    let result = file
        .map_err(anyhow::Error::from)
        .and_then(|file| run(&args, &file.unwrap_or_default()));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<GlasmaError>() {
                Some(glasma) => log::error!("{}", glasma.user_message()),
                None => log::error!("{:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}
