//! The runtime selection is written once per process.
//!
//! Kept in its own test binary with a single test: the frozen selection is
//! process-wide and would leak between tests sharing a process.

use glasma_core::runtime_config::{FASTMATH_ENV, TARGET_ENV};
use glasma_core::{derive, Device, GlasmaError, InputSpec, RuntimeConfig};

#[test]
fn test_freeze_publishes_once_and_never_changes() {
    assert!(RuntimeConfig::frozen().is_none());

    let runtime = RuntimeConfig::resolve(Some(Device::Numba), Some(false)).unwrap();
    let frozen = runtime.freeze().unwrap();
    assert_eq!(frozen.device_token(), "numba");
    assert_eq!(std::env::var(TARGET_ENV).unwrap(), "numba");
    assert_eq!(std::env::var(FASTMATH_ENV).unwrap(), "0");

    // derivations never touch the selection
    for nx in [32, 64, 128] {
        let spec = InputSpec {
            nx,
            device: Device::Cuda,
            ..InputSpec::default()
        };
        derive(&spec).unwrap();
    }
    assert_eq!(RuntimeConfig::frozen().unwrap().device_token(), "numba");

    // re-freezing the same selection is accepted
    assert_eq!(runtime.freeze().unwrap(), frozen);

    // a different selection is rejected and leaves everything untouched
    let err = RuntimeConfig::new(Device::Cuda, true).freeze().unwrap_err();
    assert!(matches!(err, GlasmaError::Config(_)));
    assert!(err.to_string().contains("frozen"));
    assert_eq!(RuntimeConfig::frozen(), Some(frozen));
    assert_eq!(std::env::var(TARGET_ENV).unwrap(), "numba");
    assert_eq!(std::env::var(FASTMATH_ENV).unwrap(), "0");
}
