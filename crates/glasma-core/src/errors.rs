//! Error types for the glasma benchmark harness.
//!
//! Every failure in the harness is a configuration problem the operator has
//! to fix: nothing here is retried and nothing falls back to another backend.

use thiserror::Error;

/// Unified error type for all harness operations.
#[derive(Error, Debug)]
pub enum GlasmaError {
    /// Malformed or out-of-range input, detected before any derivation.
    #[error("invalid value '{value}' for {field}: {reason}")]
    Validation {
        field: String,
        value: String,
        reason: String,
    },

    /// A derived lattice quantity became non-finite or undefined.
    #[error("derivation failed at stage '{stage}' (inputs: {inputs})")]
    Derivation { stage: String, inputs: String },

    /// A native library required by the selected compute backend is missing.
    #[error("backend '{backend}' unavailable: failed to load {library}: {message}")]
    BackendUnavailable {
        backend: String,
        library: String,
        message: String,
    },

    /// Run-configuration file or runtime-selection errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors reported by the simulation engine
    #[error("engine error in {context}: {message}")]
    Engine { context: String, message: String },

    /// I/O errors (config files, telemetry writing)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors (telemetry records)
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GlasmaError {
    /// Creates a validation error for a single input field.
    pub fn validation(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        GlasmaError::Validation {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a derivation error naming the failing stage and its inputs.
    pub fn derivation(stage: impl Into<String>, inputs: impl Into<String>) -> Self {
        GlasmaError::Derivation {
            stage: stage.into(),
            inputs: inputs.into(),
        }
    }

    /// Creates a backend-unavailable error.
    pub fn backend_unavailable(
        backend: impl Into<String>,
        library: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        GlasmaError::BackendUnavailable {
            backend: backend.into(),
            library: library.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        GlasmaError::Config(message.into())
    }

    /// Creates an engine error with context.
    pub fn engine(context: impl Into<String>, message: impl Into<String>) -> Self {
        GlasmaError::Engine {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Name of the field that failed validation, if this is a validation error.
    pub fn field(&self) -> Option<&str> {
        match self {
            GlasmaError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Every harness error aborts the run.
    pub fn is_fatal(&self) -> bool {
        true
    }

    /// Returns a user-friendly error message with actionable guidance.
    pub fn user_message(&self) -> String {
        match self {
            GlasmaError::Validation { .. } => {
                format!(
                    "{}\n\
                     → Re-run with a corrected value (see --help for constraints).",
                    self
                )
            }
            GlasmaError::Derivation { stage, .. } => {
                format!(
                    "{}\n\
                     → The inputs are individually valid but yield an unphysical lattice setup.\n\
                     → {}",
                    self,
                    derivation_hint(stage)
                )
            }
            GlasmaError::BackendUnavailable { .. } => {
                format!(
                    "{}\n\
                     → Check the CUDA toolkit installation and LD_LIBRARY_PATH.\n\
                     → Without the toolkit only --device cython can run.",
                    self
                )
            }
            _ => self.to_string(),
        }
    }
}

fn derivation_hint(stage: &str) -> &'static str {
    match stage {
        "aT_fm" | "E0" | "aL_fm" | "aL" | "dt" => {
            "Check the box sizes (LL, LT), the grid sizes (nl, nt) and steps."
        }
        "gamma" | "Qs" | "alphas" | "g" | "mu" => {
            "Check the collision energy: the saturation scale must exceed 217 MeV."
        }
        "uvt" | "ir" => "Check the regulators (m, uv) against the energy unit E0.",
        "sigma" | "sigma_c" => "Check the collision energy and the longitudinal box size LL.",
        _ => "Check the physical inputs.",
    }
}

/// Result type alias for harness operations.
pub type Result<T> = std::result::Result<T, GlasmaError>;
