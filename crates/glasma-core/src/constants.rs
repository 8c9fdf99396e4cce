//! Physical constants and fixed formula coefficients.
//!
//! None of these are configuration: they are baked into the derivation and
//! must not be exposed as tunables.

/// ħc in MeV·fm
pub const HBARC: f64 = 197.3270;

/// Gold nuclear radius in fm
pub const R_AU: f64 = 7.27331;

/// 4π as used by the coupling formulas (truncated, kept for reproducibility)
pub const FOUR_PI: f64 = 12.5664;

/// QCD scale Λ in MeV
pub const LAMBDA_QCD: f64 = 217.0;

/// Energy normalisation for the Lorentz factor: γ = √s / 2000 MeV
pub const GAMMA_NORM: f64 = 2000.0;

/// MeV per GeV, used by the saturation-scale fit
pub const MEV_PER_GEV: f64 = 1000.0;

/// Colour factor in μ = Qs / (g² · 0.75)
pub const MV_CHARGE_FACTOR: f64 = 0.75;
