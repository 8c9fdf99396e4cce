//! Native library availability check for the selected backend.
//!
//! The CUDA and JIT engines dlopen the toolkit libraries when they are
//! loaded; probing them up front turns a late, obscure loader failure into a
//! [`GlasmaError::BackendUnavailable`] at startup. There is no fallback to
//! another backend.

use crate::backend::BackendConfig;
use crate::errors::{GlasmaError, Result};

/// Something that can tell whether a native library can be loaded.
pub trait LibraryProbe {
    /// Attempts to load `name` (without `lib` prefix or extension).
    fn open(&self, name: &str) -> std::result::Result<(), String>;
}

/// Probes libraries with the platform dynamic loader.
#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicLibraryProbe;

impl DynamicLibraryProbe {
    /// Candidate file names for a library, most specific first.
    pub fn candidates(name: &str) -> Vec<String> {
        if cfg!(target_os = "windows") {
            vec![format!("{}.dll", name), format!("{}64_12.dll", name)]
        } else if cfg!(target_os = "macos") {
            vec![format!("lib{}.dylib", name)]
        } else {
            vec![format!("lib{}.so", name), format!("lib{}.so.1", name)]
        }
    }
}

impl LibraryProbe for DynamicLibraryProbe {
    fn open(&self, name: &str) -> std::result::Result<(), String> {
        let mut last_error = String::from("no candidate file names");
        for candidate in Self::candidates(name) {
            // SAFETY: loading runs the library's initialisers; the CUDA
            // toolkit libraries have no initialisers with preconditions. The
            // handle is dropped immediately, unloading the library again.
            match unsafe { libloading::Library::new(&candidate) } {
                Ok(_library) => {
                    log::debug!("Loaded {}", candidate);
                    return Ok(());
                }
                Err(e) => last_error = format!("{}: {}", candidate, e),
            }
        }
        Err(last_error)
    }
}

/// Verifies that every native library of the selected backend can be loaded.
///
/// Stops at the first missing library.
pub fn check_backend(config: &BackendConfig, probe: &dyn LibraryProbe) -> Result<()> {
    let libraries = config.backend.required_libraries();
    if libraries.is_empty() {
        log::debug!("Backend {} needs no native libraries", config.backend);
        return Ok(());
    }

    log::info!("Testing availability of CUDA libraries for {} ...", config.backend);
    for library in libraries {
        probe.open(library).map_err(|message| {
            log::error!("Loading {} library '{}' failed", config.backend, library);
            GlasmaError::backend_unavailable(config.device().token(), *library, message)
        })?;
    }
    log::info!("All {} libraries available", libraries.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::select;
    use crate::input::Device;
    use std::cell::RefCell;

    struct FakeProbe {
        missing: &'static str,
        opened: RefCell<Vec<String>>,
    }

    impl LibraryProbe for FakeProbe {
        fn open(&self, name: &str) -> std::result::Result<(), String> {
            self.opened.borrow_mut().push(name.to_string());
            if name == self.missing {
                Err(format!("lib{}.so: cannot open shared object file", name))
            } else {
                Ok(())
            }
        }
    }

    fn probe(missing: &'static str) -> FakeProbe {
        FakeProbe {
            missing,
            opened: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn test_compiled_backend_skips_probe() {
        let fake = probe("cublas");
        check_backend(&select(Device::Cython, false), &fake).unwrap();
        check_backend(&select(Device::Cython, true), &fake).unwrap();
        assert!(fake.opened.borrow().is_empty());
    }

    #[test]
    fn test_jit_backend_needs_cuda_toolkit() {
        let fake = probe("cublas");
        let err = check_backend(&select(Device::Numba, true), &fake).unwrap_err();
        match &err {
            GlasmaError::BackendUnavailable {
                backend, library, ..
            } => {
                assert_eq!(backend, "numba");
                assert_eq!(library, "cublas");
            }
            other => panic!("expected backend error, got {other}"),
        }
        assert_eq!(*fake.opened.borrow(), vec!["cublas"]);
    }

    #[test]
    fn test_cuda_probes_all_libraries() {
        let fake = probe("none");
        check_backend(&select(Device::Cuda, true), &fake).unwrap();
        assert_eq!(
            *fake.opened.borrow(),
            vec!["cublas", "cusparse", "cufft", "curand", "nvvm"]
        );
    }

    #[test]
    fn test_missing_library_is_fatal() {
        let fake = probe("cufft");
        let err = check_backend(&select(Device::Cuda, true), &fake).unwrap_err();
        match &err {
            GlasmaError::BackendUnavailable {
                backend, library, ..
            } => {
                assert_eq!(backend, "cuda");
                assert_eq!(library, "cufft");
            }
            other => panic!("expected backend error, got {other}"),
        }
        assert!(err.is_fatal());
        // stops at the first missing library
        assert_eq!(fake.opened.borrow().len(), 3);
    }

    #[test]
    fn test_dynamic_probe_reports_missing_library() {
        let err = DynamicLibraryProbe
            .open("glasma_definitely_not_a_library")
            .unwrap_err();
        assert!(err.contains("glasma_definitely_not_a_library"));
    }
}
