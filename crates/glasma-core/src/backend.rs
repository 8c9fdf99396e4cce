//! Compute backend selection.
//!
//! Maps the requested [`Device`] onto one of the engine implementations and
//! records the math-precision flag. Nothing here loads libraries; see
//! [`crate::probe`] for the native library check of the CUDA toolkit.

use crate::input::Device;
use serde::{Deserialize, Serialize};
use std::fmt;

/// CUDA toolkit libraries loaded at startup by the CUDA and the JIT engine.
pub const CUDA_LIBRARIES: [&str; 5] = ["cublas", "cusparse", "cufft", "curand", "nvvm"];

/// Engine implementation family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// GPU kernels through CUDA
    CudaAccelerated,
    /// JIT-compiled CPU kernels
    CpuJit,
    /// Ahead-of-time compiled CPU kernels
    CpuCompiled,
}

impl Backend {
    pub fn from_device(device: Device) -> Self {
        match device {
            Device::Cuda => Backend::CudaAccelerated,
            Device::Numba => Backend::CpuJit,
            Device::Cython => Backend::CpuCompiled,
        }
    }

    /// The device token this backend was selected by.
    pub fn device(&self) -> Device {
        match self {
            Backend::CudaAccelerated => Device::Cuda,
            Backend::CpuJit => Device::Numba,
            Backend::CpuCompiled => Device::Cython,
        }
    }

    /// Human-readable backend name.
    pub fn name(&self) -> &'static str {
        match self {
            Backend::CudaAccelerated => "cuda-accelerated",
            Backend::CpuJit => "cpu-jit",
            Backend::CpuCompiled => "cpu-compiled",
        }
    }

    /// Native libraries that must be loadable before the engine is built.
    ///
    /// The JIT engine shares its kernel sources with the CUDA engine and
    /// links the toolkit too; only the compiled CPU engine is free of it.
    pub fn required_libraries(&self) -> &'static [&'static str] {
        match self {
            Backend::CudaAccelerated | Backend::CpuJit => &CUDA_LIBRARIES,
            Backend::CpuCompiled => &[],
        }
    }

    /// Kernels run asynchronously and need an explicit sync before timing.
    pub fn is_asynchronous(&self) -> bool {
        matches!(self, Backend::CudaAccelerated)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolved backend choice plus math-precision flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub backend: Backend,
    pub fastmath: bool,
}

impl BackendConfig {
    pub fn device(&self) -> Device {
        self.backend.device()
    }
}

/// Selects the engine backend for a validated device and fastmath flag.
pub fn select(device: Device, fastmath: bool) -> BackendConfig {
    BackendConfig {
        backend: Backend::from_device(device),
        fastmath,
    }
}
