//! # glasma-core
//!
//! Parameter derivation and run harness for the glasma MV benchmark: a
//! Colour-Glass-Condensate initial-state solver for heavy-ion collisions.
//!
//! The crate turns a few physical inputs into the lattice-unit parameters of
//! the solver and drives a timed loop over an externally supplied engine:
//! ```text
//! InputSpec ──validate──▶ derive() ──▶ DerivedParameters
//!                                           │
//! RuntimeConfig (frozen) ──▶ EngineFactory ◀┘ SimulationSetup
//!                                │
//!                                ▼
//!                     RunLoop ──▶ ProgressSink
//! ```
//!
//! Everything here runs on a single thread; the only process-wide state is
//! the runtime selection frozen once at startup (see [`runtime_config`]).

pub mod backend;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod input;
pub mod probe;
pub mod run_loop;
pub mod runtime_config;
pub mod telemetry;
pub mod units;

// Re-export commonly used items
pub use backend::{Backend, BackendConfig};
pub use engine::{
    BenchmarkEngine, BenchmarkEngineFactory, Engine, EngineFactory, NucleusSetup, Orientation,
    SimulationSetup,
};
pub use errors::{GlasmaError, Result};
pub use input::{Device, InputSpec};
pub use probe::{DynamicLibraryProbe, LibraryProbe};
pub use run_loop::{RunLoop, RunSummary, MAX_ITERS};
pub use runtime_config::RuntimeConfig;
pub use telemetry::{JsonlProgressWriter, LogProgressSink, ProgressRecord, ProgressSink};
pub use units::{derive, DerivedParameters};
