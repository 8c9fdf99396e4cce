//! Conversion of physical inputs into lattice units.
//!
//! Lattice units fix the transverse spacing to `aT = 1`; energies are divided
//! by `E0 = ħc / aT_fm`. The MV initial-condition parameters (coupling,
//! colour charge density, regulators, nuclear thickness) follow from the
//! collision energy through the saturation scale `Qs`.
//!
//! The formulas and their evaluation order are fixed so that identical inputs
//! give bit-identical parameters.

use crate::constants::{
    FOUR_PI, GAMMA_NORM, HBARC, LAMBDA_QCD, MEV_PER_GEV, MV_CHARGE_FACTOR, R_AU,
};
use crate::errors::{GlasmaError, Result};
use crate::input::InputSpec;
use serde::Serialize;

/// Lattice parameters derived from an [`InputSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedParameters {
    /// Transverse lattice spacing [fm]
    pub at_fm: f64,
    /// Longitudinal lattice spacing [fm]
    pub al_fm: f64,
    /// Energy unit ħc / aT_fm [MeV]
    pub e0: f64,
    /// Transverse spacing in lattice units, always 1
    pub at: f64,
    /// Longitudinal spacing in lattice units
    pub al: f64,
    /// Per-axis spacing `[aL, aT, aT]`
    pub a: [f64; 3],
    /// Time step in lattice units
    pub dt: f64,
    /// Lorentz factor of each nucleus
    pub gamma: f64,
    /// Saturation scale [MeV]
    pub qs: f64,
    /// One-loop strong coupling at Qs
    pub alphas: f64,
    /// Gauge coupling √(4π αs)
    pub g: f64,
    /// MV colour charge density in lattice units
    pub mu: f64,
    /// UV regulator in lattice units
    pub uvt: f64,
    /// IR regulator in lattice units
    pub ir: f64,
    /// Longitudinal nuclear thickness in lattice units
    pub sigma: f64,
    /// Longitudinal nuclear thickness in cells
    pub sigma_c: f64,
}

impl DerivedParameters {
    /// Writes every derived value to the log at info level.
    pub fn log_summary(&self) {
        log::info!("Lattice parameters:");
        log::info!("  aT = {:.6} fm, aL = {:.6} fm", self.at_fm, self.al_fm);
        log::info!("  E0 = {:.4} MeV", self.e0);
        log::info!("  a = {:?}, dt = {}", self.a, self.dt);
        log::info!("MV parameters:");
        log::info!("  gamma = {}, Qs = {:.4} MeV", self.gamma, self.qs);
        log::info!("  alphas = {:.6}, g = {:.6}", self.alphas, self.g);
        log::info!("  mu = {:.6e}, uvt = {:.6e}, ir = {:.6e}", self.mu, self.uvt, self.ir);
        log::info!("  sigma = {:.6e}, sigma_c = {:.6e}", self.sigma, self.sigma_c);
    }
}

/// Derives the lattice parameters for `spec`.
///
/// `spec` is expected to have passed [`InputSpec::validate`]. Any stage that
/// produces a non-finite value, and a saturation scale at or below Λ_QCD,
/// fails with [`GlasmaError::Derivation`] instead of propagating NaN.
pub fn derive(spec: &InputSpec) -> Result<DerivedParameters> {
    let grid = || {
        format!(
            "LT={}, nt={}, LL={}, nx={}, steps={}",
            spec.lt, spec.nt, spec.ll, spec.nx, spec.steps
        )
    };

    // lattice spacings and energy unit
    let at_fm = finite("aT_fm", spec.lt / spec.nt as f64, grid)?;
    let e0 = finite("E0", HBARC / at_fm, grid)?;
    let at = 1.0;
    let al_fm = finite("aL_fm", spec.ll / spec.nx as f64, grid)?;
    let al = finite("aL", al_fm / at_fm, grid)?;
    let a = [al, at, at];
    let dt = finite("dt", al / f64::from(spec.steps), grid)?;

    // initial condition parameters
    let energy = || format!("sqrts={}", spec.sqrts);
    let gamma = finite("gamma", spec.sqrts / GAMMA_NORM, energy)?;
    let qs = finite(
        "Qs",
        (spec.sqrts / MEV_PER_GEV).powf(0.25) * MEV_PER_GEV,
        energy,
    )?;
    if qs <= LAMBDA_QCD {
        return Err(GlasmaError::derivation(
            "alphas",
            format!("sqrts={}, Qs={} ≤ Λ={}", spec.sqrts, qs, LAMBDA_QCD),
        ));
    }
    let coupling = || format!("sqrts={}, Qs={}", spec.sqrts, qs);
    let alphas = finite("alphas", FOUR_PI / (18.0 * (qs / LAMBDA_QCD).ln()), coupling)?;
    if alphas <= 0.0 {
        return Err(GlasmaError::derivation(
            "alphas",
            format!("sqrts={}, Qs={}, alphas={}", spec.sqrts, qs, alphas),
        ));
    }
    let g = finite("g", (FOUR_PI * alphas).sqrt(), coupling)?;
    let mu = finite("mu", qs / (g * g * MV_CHARGE_FACTOR) / e0, || {
        format!("Qs={}, g={}, E0={}", qs, g, e0)
    })?;

    let regulators = || format!("uv={}, m={}, E0={}", spec.uv, spec.m, e0);
    let uvt = finite("uvt", spec.uv / e0, regulators)?;
    let ir = finite("ir", spec.m / e0, regulators)?;

    let thickness = || format!("gamma={}, aL_fm={}, aL={}", gamma, al_fm, al);
    let sigma = finite("sigma", R_AU / (2.0 * gamma) / al_fm * al, thickness)?;
    let sigma_c = finite("sigma_c", sigma / al, thickness)?;

    Ok(DerivedParameters {
        at_fm,
        al_fm,
        e0,
        at,
        al,
        a,
        dt,
        gamma,
        qs,
        alphas,
        g,
        mu,
        uvt,
        ir,
        sigma,
        sigma_c,
    })
}

fn finite(stage: &str, value: f64, inputs: impl FnOnce() -> String) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(GlasmaError::derivation(
            stage,
            format!("{} -> {}", inputs(), value),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_scenario() {
        let params = derive(&InputSpec::default()).unwrap();

        assert_eq!(params.at_fm, 0.0234375);
        assert_eq!(params.al_fm, 0.09375);
        assert_eq!(params.al, 4.0);
        assert_eq!(params.dt, 1.0);
        assert_eq!(params.at, 1.0);
        assert_eq!(params.a, [4.0, 1.0, 1.0]);
        assert_relative_eq!(params.e0, 197.3270 * 256.0 / 6.0, max_relative = 1e-12);
        assert_relative_eq!(params.e0, 8419.285, epsilon = 1e-2);
    }

    #[test]
    fn test_energy_dependent_parameters() {
        let params = derive(&InputSpec::default()).unwrap();

        assert_eq!(params.gamma, 100.0);
        assert_relative_eq!(params.qs, 200.0_f64.powf(0.25) * 1000.0, max_relative = 1e-15);
        assert_relative_eq!(params.qs, 3760.6, epsilon = 0.1);
        assert_relative_eq!(
            params.alphas,
            12.5664 / (18.0 * (params.qs / 217.0).ln()),
            max_relative = 1e-15
        );
        assert_relative_eq!(params.g * params.g, 12.5664 * params.alphas, max_relative = 1e-12);
        assert!(params.alphas > 0.0 && params.alphas < 1.0);
    }

    #[test]
    fn test_regulators_and_thickness() {
        let params = derive(&InputSpec::default()).unwrap();

        assert_relative_eq!(params.uvt, 10_000.0 / params.e0, max_relative = 1e-15);
        assert_relative_eq!(params.ir, 200.0 / params.e0, max_relative = 1e-15);
        assert_relative_eq!(
            params.sigma,
            7.27331 / 200.0 / 0.09375 * 4.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(params.sigma_c, params.sigma / 4.0, max_relative = 1e-15);
    }

    #[test]
    fn test_low_energy_fails_at_alphas() {
        let spec = InputSpec {
            sqrts: 1.0,
            ..InputSpec::default()
        };
        match derive(&spec).unwrap_err() {
            GlasmaError::Derivation { stage, inputs } => {
                assert_eq!(stage, "alphas");
                assert!(inputs.contains("sqrts=1"));
            }
            other => panic!("expected derivation error, got {other}"),
        }
    }

    #[test]
    fn test_non_finite_input_is_reported() {
        let spec = InputSpec {
            lt: f64::INFINITY,
            ..InputSpec::default()
        };
        match derive(&spec).unwrap_err() {
            GlasmaError::Derivation { stage, .. } => assert_eq!(stage, "aT_fm"),
            other => panic!("expected derivation error, got {other}"),
        }
    }
}
