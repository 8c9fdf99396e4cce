//! Physical and numerical inputs of a benchmark run.
//!
//! [`InputSpec`] carries the handful of physical quantities (MeV / fm) and
//! grid settings from which every lattice parameter is derived. The string
//! parsers in this module are the validators used for raw command line and
//! environment values; [`InputSpec::validate`] re-checks a fully merged spec.

use crate::errors::{GlasmaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

const STEPS_REASON: &str = "must be an even integer ≥ 2";
const FASTMATH_REASON: &str = "must be 0 or 1";

/// Directory the engine writes its observables into.
pub const OUTPUT_DIR: &str = "./output";

/// Compute device requested for the simulation engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// CUDA kernels on an NVIDIA GPU
    #[default]
    Cuda,
    /// JIT-compiled CPU kernels
    Numba,
    /// Ahead-of-time compiled CPU kernels
    Cython,
}

impl Device {
    /// All accepted device tokens, in help-text order.
    pub const TOKENS: [&'static str; 3] = ["cuda", "numba", "cython"];

    /// The runtime-selection token for this device.
    pub fn token(&self) -> &'static str {
        match self {
            Device::Cuda => "cuda",
            Device::Numba => "numba",
            Device::Cython => "cython",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Device {
    type Err = GlasmaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "cuda" => Ok(Device::Cuda),
            "numba" => Ok(Device::Numba),
            "cython" => Ok(Device::Cython),
            other => Err(GlasmaError::validation(
                "device",
                other,
                format!("must be one of {}", Device::TOKENS.join(", ")),
            )),
        }
    }
}

/// Parses the `steps` value: the ratio between the longitudinal lattice
/// spacing and the time step.
pub fn parse_steps(raw: &str) -> Result<u32> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| GlasmaError::validation("steps", raw, STEPS_REASON))?;
    check_steps(value)
}

fn check_steps(value: i64) -> Result<u32> {
    if value < 2 || value % 2 != 0 {
        return Err(GlasmaError::validation("steps", value, STEPS_REASON));
    }
    u32::try_from(value).map_err(|_| GlasmaError::validation("steps", value, "out of range"))
}

/// Parses a device token (`cuda`, `numba` or `cython`).
pub fn parse_device(raw: &str) -> Result<Device> {
    raw.parse()
}

/// Parses the boolean-like fastmath flag. Only `0` and `1` are accepted.
pub fn parse_fastmath(raw: &str) -> Result<bool> {
    match raw.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(GlasmaError::validation("fastmath", other, FASTMATH_REASON)),
    }
}

/// Validated physical and numerical inputs.
///
/// Field names follow the physics notation of the MV setup; units are given
/// per field. Construct with struct update syntax over [`InputSpec::default`]
/// and call [`InputSpec::validate`] before deriving lattice parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    /// Name of the run, used for the output file `./output/T_<name>.dat`
    pub run_name: String,
    /// Longitudinal grid size
    pub nx: usize,
    /// Transverse grid size (ny = nz = nt)
    pub nt: usize,
    /// Longitudinal box size [fm]
    pub ll: f64,
    /// Transverse box size [fm]
    pub lt: f64,
    /// Collision energy √s [MeV]
    pub sqrts: f64,
    /// Infrared regulator [MeV]
    pub m: f64,
    /// Ultraviolet regulator [MeV]
    pub uv: f64,
    /// Ratio between aL and dt, even and ≥ 2
    pub steps: u32,
    /// Verbose engine output
    pub debug: bool,
    pub device: Device,
    pub fastmath: bool,
}

impl Default for InputSpec {
    fn default() -> Self {
        Self {
            run_name: "mv_full_bench".to_string(),
            nx: 64,
            nt: 256,
            ll: 6.0,
            lt: 6.0,
            sqrts: 200_000.0,
            m: 200.0,
            uv: 10_000.0,
            steps: 4,
            debug: false,
            device: Device::Cuda,
            fastmath: true,
        }
    }
}

impl InputSpec {
    /// Checks every field invariant.
    ///
    /// Fails on the first offending field, in declaration order.
    pub fn validate(&self) -> Result<()> {
        if self.run_name.trim().is_empty() {
            return Err(GlasmaError::validation(
                "run_name",
                &self.run_name,
                "must not be empty",
            ));
        }

        check_grid_size("nx", self.nx)?;
        check_grid_size("nt", self.nt)?;

        check_positive("LL", self.ll)?;
        check_positive("LT", self.lt)?;
        check_positive("sqrts", self.sqrts)?;
        check_positive("m", self.m)?;
        check_positive("uv", self.uv)?;

        if self.uv <= self.m {
            return Err(GlasmaError::validation(
                "uv",
                self.uv,
                format!("must exceed the infrared regulator m = {}", self.m),
            ));
        }

        check_steps(i64::from(self.steps))?;
        Ok(())
    }

    /// Grid dimensions `[nx, ny, nz]` with `ny = nz = nt`.
    pub fn dims(&self) -> [usize; 3] {
        [self.nx, self.nt, self.nt]
    }

    /// Output path of the engine's observables, `./output/T_<run_name>.dat`.
    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(format!("{}/T_{}.dat", OUTPUT_DIR, self.run_name))
    }
}

fn check_grid_size(field: &str, value: usize) -> Result<()> {
    if value < 2 {
        return Err(GlasmaError::validation(field, value, "must be an integer ≥ 2"));
    }
    Ok(())
}

fn check_positive(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(GlasmaError::validation(field, value, "must be a finite number"));
    }
    if value <= 0.0 {
        return Err(GlasmaError::validation(field, value, "must be > 0"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_accepts_even_values() {
        for raw in ["2", "4", "6", "100"] {
            let steps = parse_steps(raw).unwrap();
            assert_eq!(steps.to_string(), raw);
        }
        assert_eq!(parse_steps(" 8 ").unwrap(), 8);
    }

    #[test]
    fn test_steps_rejects_invalid_values() {
        for raw in ["3", "5", "1", "0", "-2", "abc", "2.0", ""] {
            let err = parse_steps(raw).unwrap_err();
            match err {
                GlasmaError::Validation { field, reason, .. } => {
                    assert_eq!(field, "steps");
                    assert_eq!(reason, "must be an even integer ≥ 2");
                }
                other => panic!("unexpected error for {raw:?}: {other}"),
            }
        }
    }

    #[test]
    fn test_device_tokens() {
        assert_eq!(parse_device("cuda").unwrap(), Device::Cuda);
        assert_eq!(parse_device("numba").unwrap(), Device::Numba);
        assert_eq!(parse_device("cython").unwrap(), Device::Cython);
        for token in Device::TOKENS {
            assert_eq!(parse_device(token).unwrap().token(), token);
        }

        let err = parse_device("opencl").unwrap_err();
        assert_eq!(err.field(), Some("device"));
    }

    #[test]
    fn test_fastmath_flag() {
        assert!(parse_fastmath("1").unwrap());
        assert!(!parse_fastmath("0").unwrap());
        for raw in ["2", "true", "yes", "-1", ""] {
            assert_eq!(parse_fastmath(raw).unwrap_err().field(), Some("fastmath"));
        }
    }

    #[test]
    fn test_default_spec_is_valid() {
        let spec = InputSpec::default();
        spec.validate().unwrap();
        assert_eq!(spec.dims(), [64, 256, 256]);
        assert_eq!(spec.output_path(), PathBuf::from("./output/T_mv_full_bench.dat"));
    }

    #[test]
    fn test_uv_must_exceed_ir() {
        let spec = InputSpec {
            uv: 100.0,
            m: 200.0,
            ..InputSpec::default()
        };
        assert_eq!(spec.validate().unwrap_err().field(), Some("uv"));

        let spec = InputSpec {
            uv: 200.0,
            m: 200.0,
            ..InputSpec::default()
        };
        assert_eq!(spec.validate().unwrap_err().field(), Some("uv"));
    }

    fn spec_with(edit: impl FnOnce(&mut InputSpec)) -> InputSpec {
        let mut spec = InputSpec::default();
        edit(&mut spec);
        spec
    }

    #[test]
    fn test_rejects_non_positive_geometry() {
        let cases = [
            ("LL", spec_with(|s| s.ll = 0.0)),
            ("LT", spec_with(|s| s.lt = -6.0)),
            ("sqrts", spec_with(|s| s.sqrts = f64::NAN)),
            ("m", spec_with(|s| s.m = f64::INFINITY)),
            ("nx", spec_with(|s| s.nx = 1)),
            ("nt", spec_with(|s| s.nt = 0)),
            ("steps", spec_with(|s| s.steps = 3)),
            ("run_name", spec_with(|s| s.run_name = "  ".into())),
        ];
        for (field, spec) in cases {
            assert_eq!(spec.validate().unwrap_err().field(), Some(field));
        }
    }
}
