//! Run configuration file.
//!
//! Serde-based TOML parsing of the benchmark inputs. Every key is optional;
//! missing keys fall through to the command line defaults.
//!
//! ```toml
//! [run]
//! name = "mv_trial_gpu"
//! mode = "full"
//!
//! [grid]
//! nl = 64
//! nt = 256
//! steps = 4
//!
//! [geometry]
//! LL = 6.0
//! LT = 6.0
//!
//! [physics]
//! energy = 200000.0
//! m = 200.0
//! uv = 10000.0
//!
//! [backend]
//! device = "cuda"
//! fastmath = 1
//! ```

use crate::cli::Mode;
use glasma_core::input::parse_fastmath;
use glasma_core::{Device, GlasmaError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root of the run configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default)]
    pub run: RunSection,

    #[serde(default)]
    pub grid: GridSection,

    #[serde(default)]
    pub geometry: GeometrySection,

    #[serde(default)]
    pub physics: PhysicsSection,

    #[serde(default)]
    pub backend: BackendSection,
}

impl RunConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GlasmaError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| GlasmaError::config(format!("{}: {}", path.display(), e)))
    }

    /// Parse configuration from TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| GlasmaError::config(e.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub debug: Option<bool>,

    #[serde(default)]
    pub mode: Option<Mode>,

    #[serde(default)]
    pub telemetry: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridSection {
    #[serde(default)]
    pub nl: Option<usize>,

    #[serde(default)]
    pub nt: Option<usize>,

    #[serde(default)]
    pub steps: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeometrySection {
    #[serde(default, rename = "LL")]
    pub ll: Option<f64>,

    #[serde(default, rename = "LT")]
    pub lt: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhysicsSection {
    #[serde(default)]
    pub energy: Option<f64>,

    #[serde(default)]
    pub m: Option<f64>,

    #[serde(default)]
    pub uv: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendSection {
    #[serde(default)]
    pub device: Option<Device>,

    /// 0 or 1, like the FASTMATH environment variable
    #[serde(default)]
    pub fastmath: Option<i64>,
}

impl BackendSection {
    /// The fastmath flag, validated with the command line rules.
    pub fn fastmath(&self) -> Result<Option<bool>> {
        self.fastmath
            .map(|raw| parse_fastmath(&raw.to_string()))
            .transpose()
    }
}
