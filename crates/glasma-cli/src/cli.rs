//! Command line surface of `glasma-bench`.
//!
//! Every physics flag is optional on the parser so that a value can come
//! from, in order: the flag itself, the environment (device and fastmath
//! only), the `--config` file, and finally the built-in defaults.

use crate::config::RunConfig;
use clap::{Parser, ValueEnum};
use glasma_core::input::{parse_device, parse_fastmath, parse_steps};
use glasma_core::{Device, InputSpec, Result, RuntimeConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// glasma-bench version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// What the harness exercises after setup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Timed loop of `20 × steps` engine advances
    #[default]
    Full,
    /// Time the initialisation of both nuclei only
    Init,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Full => "full",
            Mode::Init => "init",
        }
    }

    /// Run name used when neither `-o` nor `[run].name` gives one.
    pub fn default_run_name(&self) -> &'static str {
        match self {
            Mode::Full => "mv_full_bench",
            Mode::Init => "mv_init_bench",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "glasma-bench")]
#[command(version = VERSION)]
#[command(about = "MV initial-condition benchmark setup for the glasma solver", long_about = None)]
pub struct Args {
    /// Run name; the engine writes to "./output/T_<name>.dat"
    /// [default: mv_full_bench, or mv_init_bench in init mode]
    #[arg(short, long, value_name = "NAME")]
    pub output: Option<String>,

    /// Longitudinal grid size [default: 64]
    #[arg(short = 'l', long = "nl")]
    pub nl: Option<usize>,

    /// Transverse grid size [default: 256]
    #[arg(short = 't', long = "nt")]
    pub nt: Option<usize>,

    /// Longitudinal simulation box size in [fm] [default: 6.0]
    #[arg(short = 'L', long = "LL")]
    pub ll: Option<f64>,

    /// Transverse simulation box size in [fm] [default: 6.0]
    #[arg(short = 'T', long = "LT")]
    pub lt: Option<f64>,

    /// Collision energy in [MeV] [default: 200000.0]
    #[arg(short = 'E', long = "energy", value_name = "ENERGY")]
    pub energy: Option<f64>,

    /// Infrared regulator in [MeV] [default: 200.0]
    #[arg(short = 'm')]
    pub m: Option<f64>,

    /// Ultraviolet regulator in [MeV] [default: 10000.0]
    #[arg(short = 'u', long = "uv")]
    pub uv: Option<f64>,

    /// Ratio between aL and dt, an even integer ≥ 2 [default: 4]
    #[arg(short, long, value_parser = parse_steps)]
    pub steps: Option<u32>,

    /// Verbose output
    #[arg(long)]
    pub debug: bool,

    /// Target compute device: cuda, numba or cython [default: cuda]
    ///
    /// The resolved value is written back to MY_NUMBA_TARGET before the
    /// engine is loaded.
    #[arg(short, long, env = "MY_NUMBA_TARGET", value_parser = parse_device)]
    pub device: Option<Device>,

    /// Use fastmath kernels: 0 or 1 [default: 1]
    ///
    /// The resolved value is written back to FASTMATH before the engine is
    /// loaded.
    #[arg(long, env = "FASTMATH", value_parser = parse_fastmath)]
    pub fastmath: Option<bool>,

    /// Run configuration file (TOML); explicit flags take precedence
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Benchmark mode [default: full]
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Append per-step timings and a run summary to this JSONL file
    #[arg(long, value_name = "FILE")]
    pub telemetry: Option<PathBuf>,
}

/// Run options that are not part of the physics input.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub mode: Mode,
    pub telemetry: Option<PathBuf>,
}

impl Args {
    /// Merges flags, environment, config file and defaults.
    ///
    /// The returned spec is not validated yet.
    pub fn resolve(&self, file: &RunConfig) -> Result<(InputSpec, RuntimeConfig, RunOptions)> {
        let defaults = InputSpec::default();

        let fastmath = match self.fastmath {
            Some(fastmath) => Some(fastmath),
            None => file.backend.fastmath()?,
        };
        let runtime = RuntimeConfig::resolve(self.device.or(file.backend.device), fastmath)?;
        let mode = self.mode.or(file.run.mode).unwrap_or_default();

        let spec = InputSpec {
            run_name: self
                .output
                .clone()
                .or_else(|| file.run.name.clone())
                .unwrap_or_else(|| mode.default_run_name().to_string()),
            nx: self.nl.or(file.grid.nl).unwrap_or(defaults.nx),
            nt: self.nt.or(file.grid.nt).unwrap_or(defaults.nt),
            ll: self.ll.or(file.geometry.ll).unwrap_or(defaults.ll),
            lt: self.lt.or(file.geometry.lt).unwrap_or(defaults.lt),
            sqrts: self.energy.or(file.physics.energy).unwrap_or(defaults.sqrts),
            m: self.m.or(file.physics.m).unwrap_or(defaults.m),
            uv: self.uv.or(file.physics.uv).unwrap_or(defaults.uv),
            steps: self.steps.or(file.grid.steps).unwrap_or(defaults.steps),
            debug: self.debug || file.run.debug.unwrap_or(defaults.debug),
            device: runtime.device(),
            fastmath: runtime.fastmath(),
        };

        let options = RunOptions {
            mode,
            telemetry: self.telemetry.clone().or_else(|| file.run.telemetry.clone()),
        };

        Ok((spec, runtime, options))
    }
}
