//! RuntimeConfig - the process-wide backend selection.
//!
//! The engine-loading code reads the backend through two environment
//! variables, `MY_NUMBA_TARGET` and `FASTMATH`. They are read once as
//! defaults, resolved together with the command line, and written back
//! exactly once by [`RuntimeConfig::freeze`] before any engine is built.
//! Backend selection is frozen at startup: after the first freeze the values
//! never change for the lifetime of the process.

use crate::backend::{self, BackendConfig};
use crate::errors::{GlasmaError, Result};
use crate::input::{parse_device, parse_fastmath, Device};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Environment variable holding the device token.
pub const TARGET_ENV: &str = "MY_NUMBA_TARGET";

/// Environment variable holding the fastmath flag (`0` / `1`).
pub const FASTMATH_ENV: &str = "FASTMATH";

static FROZEN: OnceLock<RuntimeConfig> = OnceLock::new();

/// Immutable runtime selection passed to the engine factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub backend: BackendConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(Device::Cuda, true)
    }
}

impl RuntimeConfig {
    pub fn new(device: Device, fastmath: bool) -> Self {
        Self {
            backend: backend::select(device, fastmath),
        }
    }

    /// Resolves the selection from explicit values, falling back to the
    /// environment (through `lookup`) and then to `cuda` / fastmath on.
    pub fn resolve_with<F>(
        device: Option<Device>,
        fastmath: Option<bool>,
        lookup: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let device = match device {
            Some(device) => device,
            None => match lookup(TARGET_ENV) {
                Some(raw) => parse_device(&raw)?,
                None => Device::Cuda,
            },
        };
        let fastmath = match fastmath {
            Some(fastmath) => fastmath,
            None => match lookup(FASTMATH_ENV) {
                Some(raw) => parse_fastmath(&raw)?,
                None => true,
            },
        };
        Ok(Self::new(device, fastmath))
    }

    /// [`RuntimeConfig::resolve_with`] over the process environment.
    pub fn resolve(device: Option<Device>, fastmath: Option<bool>) -> Result<Self> {
        Self::resolve_with(device, fastmath, |key| std::env::var(key).ok())
    }

    pub fn device(&self) -> Device {
        self.backend.device()
    }

    pub fn fastmath(&self) -> bool {
        self.backend.fastmath
    }

    /// Device token as written to `MY_NUMBA_TARGET`.
    pub fn device_token(&self) -> &'static str {
        self.device().token()
    }

    /// Fastmath token as written to `FASTMATH`.
    pub fn fastmath_token(&self) -> &'static str {
        if self.fastmath() {
            "1"
        } else {
            "0"
        }
    }

    /// The environment assignments this selection publishes.
    pub fn env_vars(&self) -> [(&'static str, &'static str); 2] {
        [
            (TARGET_ENV, self.device_token()),
            (FASTMATH_ENV, self.fastmath_token()),
        ]
    }

    /// Freezes this selection for the process and publishes it to the
    /// environment.
    ///
    /// Must run before any engine-backend code is loaded. Freezing again with
    /// an identical selection returns the stored value; a different selection
    /// is rejected.
    pub fn freeze(self) -> Result<&'static RuntimeConfig> {
        let frozen = FROZEN.get_or_init(|| {
            for (key, value) in self.env_vars() {
                std::env::set_var(key, value);
            }
            log::debug!(
                "Runtime selection frozen: {}={}, {}={}",
                TARGET_ENV,
                self.device_token(),
                FASTMATH_ENV,
                self.fastmath_token()
            );
            self
        });

        if *frozen != self {
            return Err(GlasmaError::config(format!(
                "backend selection is frozen ({}={}, {}={}); cannot switch to {}={}, {}={}",
                TARGET_ENV,
                frozen.device_token(),
                FASTMATH_ENV,
                frozen.fastmath_token(),
                TARGET_ENV,
                self.device_token(),
                FASTMATH_ENV,
                self.fastmath_token()
            )));
        }
        Ok(frozen)
    }

    /// The frozen selection, if startup has frozen one.
    pub fn frozen() -> Option<&'static RuntimeConfig> {
        FROZEN.get()
    }
}
