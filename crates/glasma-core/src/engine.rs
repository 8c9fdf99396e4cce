//! Simulation engine abstraction.
//!
//! The field solver itself lives outside this crate. The harness only needs
//! a narrow contract: build an engine from the derived parameters, initialise
//! the two nuclei, advance one grid cell at a time and synchronise before
//! timings are read. [`EngineFactory`] is where the backend strategy is
//! chosen, once, from the frozen [`RuntimeConfig`].

use crate::backend::Backend;
use crate::errors::Result;
use crate::input::InputSpec;
use crate::runtime_config::RuntimeConfig;
use crate::units::DerivedParameters;
use serde::Serialize;
use std::path::PathBuf;

/// Which way a nucleus moves along the beam axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Orientation {
    /// Moves towards +x, starts on the left
    Right,
    /// Moves towards -x, starts on the right
    Left,
}

impl Orientation {
    /// The ±1 sign the solver uses.
    pub fn sign(&self) -> i32 {
        match self {
            Orientation::Right => 1,
            Orientation::Left => -1,
        }
    }
}

/// MV initial condition of one nucleus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NucleusSetup {
    /// Longitudinal centre in lattice units
    pub x0: f64,
    pub mu: f64,
    pub sigma: f64,
    /// IR regulator (gluon mass) in lattice units
    pub mass: f64,
    pub uvt: f64,
    pub orientation: Orientation,
    /// Half-open range of longitudinal cells receiving charge planes
    pub charge_planes: (usize, usize),
}

/// Everything the engine is constructed with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSetup {
    pub dims: [usize; 3],
    pub a: [f64; 3],
    pub dt: f64,
    pub g: f64,
    /// Iteration bounds `[x0, x1, y0, y1, z0, z1]`; the outermost
    /// longitudinal cells are excluded.
    pub iter_dims: [usize; 6],
    pub debug: bool,
    pub nuclei: [NucleusSetup; 2],
    pub output_path: PathBuf,
}

impl SimulationSetup {
    pub fn new(spec: &InputSpec, params: &DerivedParameters) -> Self {
        let nx = spec.nx;
        let nt = spec.nt;
        let half = nx / 2;

        let nucleus = |fraction: f64, orientation: Orientation, charge_planes: (usize, usize)| {
            NucleusSetup {
                x0: nx as f64 * fraction * params.al,
                mu: params.mu,
                sigma: params.sigma,
                mass: params.ir,
                uvt: params.uvt,
                orientation,
                charge_planes,
            }
        };

        Self {
            dims: spec.dims(),
            a: params.a,
            dt: params.dt,
            g: params.g,
            iter_dims: [1, nx - 1, 0, nt, 0, nt],
            debug: spec.debug,
            nuclei: [
                nucleus(0.25, Orientation::Right, (0, half)),
                nucleus(0.75, Orientation::Left, (half, nx)),
            ],
            output_path: spec.output_path(),
        }
    }

    /// Number of lattice sites.
    pub fn cells(&self) -> usize {
        self.dims.iter().product()
    }
}

/// A simulation engine for one backend.
///
/// Calls are strictly sequential: step `i + 1` depends on step `i`.
pub trait Engine {
    /// Backend this engine runs on.
    fn backend(&self) -> Backend;

    /// Generates the colour charges and fields of one nucleus.
    fn initialize_nucleus(&mut self, nucleus: &NucleusSetup) -> Result<()>;

    /// Completes initialisation once both nuclei are in place.
    fn finish_initialization(&mut self) -> Result<()>;

    /// Moves the nuclei by exactly one longitudinal grid cell.
    fn advance_one_grid_cell(&mut self) -> Result<()>;

    /// Waits for outstanding device work. No-op for synchronous backends.
    fn synchronize(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Builds the engine implementation for a runtime selection.
pub trait EngineFactory {
    fn build(&self, runtime: &RuntimeConfig, setup: &SimulationSetup) -> Result<Box<dyn Engine>>;
}

/// Engine that performs no numerical work.
///
/// Used to measure the scheduling and timing overhead of the harness itself
/// on the selected backend.
#[derive(Debug, Clone)]
pub struct BenchmarkEngine {
    backend: Backend,
    nuclei_initialized: usize,
    initialized: bool,
    steps_advanced: u64,
}

impl BenchmarkEngine {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            nuclei_initialized: 0,
            initialized: false,
            steps_advanced: 0,
        }
    }

    pub fn steps_advanced(&self) -> u64 {
        self.steps_advanced
    }

    pub fn nuclei_initialized(&self) -> usize {
        self.nuclei_initialized
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl Engine for BenchmarkEngine {
    fn backend(&self) -> Backend {
        self.backend
    }

    fn initialize_nucleus(&mut self, nucleus: &NucleusSetup) -> Result<()> {
        log::debug!(
            "Benchmark engine: nucleus at x0={} (orientation {:+})",
            nucleus.x0,
            nucleus.orientation.sign()
        );
        self.nuclei_initialized += 1;
        Ok(())
    }

    fn finish_initialization(&mut self) -> Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn advance_one_grid_cell(&mut self) -> Result<()> {
        self.steps_advanced += 1;
        Ok(())
    }
}

/// Factory producing [`BenchmarkEngine`]s tagged with the selected backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct BenchmarkEngineFactory;

impl EngineFactory for BenchmarkEngineFactory {
    fn build(&self, runtime: &RuntimeConfig, setup: &SimulationSetup) -> Result<Box<dyn Engine>> {
        log::info!(
            "Building benchmark engine on {} (fastmath={}) for {:?} lattice",
            runtime.backend.backend,
            runtime.fastmath(),
            setup.dims
        );
        Ok(Box::new(BenchmarkEngine::new(runtime.backend.backend)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Device;
    use crate::units::derive;

    fn default_setup() -> SimulationSetup {
        let spec = InputSpec::default();
        let params = derive(&spec).unwrap();
        SimulationSetup::new(&spec, &params)
    }

    #[test]
    fn test_setup_geometry() {
        let setup = default_setup();
        assert_eq!(setup.dims, [64, 256, 256]);
        assert_eq!(setup.iter_dims, [1, 63, 0, 256, 0, 256]);
        assert_eq!(setup.a, [4.0, 1.0, 1.0]);
        assert_eq!(setup.dt, 1.0);
        assert_eq!(setup.cells(), 64 * 256 * 256);
        assert_eq!(setup.output_path, PathBuf::from("./output/T_mv_full_bench.dat"));
    }

    #[test]
    fn test_nuclei_placement() {
        let setup = default_setup();
        let [left, right] = setup.nuclei;

        assert_eq!(left.x0, 64.0 * 0.25 * 4.0);
        assert_eq!(left.orientation.sign(), 1);
        assert_eq!(left.charge_planes, (0, 32));

        assert_eq!(right.x0, 64.0 * 0.75 * 4.0);
        assert_eq!(right.orientation.sign(), -1);
        assert_eq!(right.charge_planes, (32, 64));

        assert_eq!(left.mu, right.mu);
        assert_eq!(left.mass, right.mass);
    }

    #[test]
    fn test_benchmark_factory_uses_runtime_backend() {
        let setup = default_setup();
        let runtime = RuntimeConfig::new(Device::Cython, false);
        let mut engine = BenchmarkEngineFactory.build(&runtime, &setup).unwrap();
        assert_eq!(engine.backend(), Backend::CpuCompiled);

        for nucleus in &setup.nuclei {
            engine.initialize_nucleus(nucleus).unwrap();
        }
        engine.finish_initialization().unwrap();
        engine.advance_one_grid_cell().unwrap();
        engine.synchronize().unwrap();
    }

    #[test]
    fn test_benchmark_engine_counts_steps() {
        let mut engine = BenchmarkEngine::new(Backend::CpuJit);
        assert!(!engine.is_initialized());
        for _ in 0..5 {
            engine.advance_one_grid_cell().unwrap();
        }
        engine.finish_initialization().unwrap();
        assert_eq!(engine.steps_advanced(), 5);
        assert!(engine.is_initialized());
        assert_eq!(engine.nuclei_initialized(), 0);
    }
}
