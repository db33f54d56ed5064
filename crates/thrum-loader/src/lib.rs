//! Dynamic plugin loading (§4.4, §6, §13).
//!
//! The source's plugin ABI is a shared-library entry point,
//! `Methcla_LibraryInit(host, bundlePath) -> Methcla_Library*`, resolved with
//! `dlopen`/`dlsym` and kept alive for the life of the handle
//! (`Methcla_LibraryDestroy` on teardown). This crate is the same idea built
//! on `libloading` instead of raw `dlopen`: [`load_bundle`] opens a
//! `cdylib`, resolves its `thrum_library_init` symbol, and calls it with a
//! `&mut dyn Host` so the module can register its synth definitions during
//! the call. The returned [`LoadedModule`] bundles the `Box<dyn Library>`
//! handle with the `libloading::Library` that must outlive it — dropping
//! either alone would either leak the live definitions or unmap code still
//! in use.
//!
//! The ABI this crate implements assumes the host and every loaded plugin
//! were built with the same compiler version: `dyn Trait` objects crossing
//! the dylib boundary have no stable vtable layout across `rustc` versions,
//! unlike a C struct of function pointers. This mirrors the approach taken
//! by `prokopyl-clack` and `RustAudio-vst-rs` for loading plugin shared
//! libraries, and is recorded as a known limitation rather than hidden: a
//! plugin built against a different toolchain can load successfully and
//! then corrupt memory on its first call. A production deployment would
//! pin an ABI version symbol and refuse to load a mismatch; out of scope
//! here because the wire/versioning format is unspecified (§1).
//!
//! Requires `unsafe` to call `libloading`'s FFI, which is why this crate
//! carries its own lint table rather than the workspace's
//! `unsafe_code = "deny"` and is excluded from the workspace's
//! `default-members`.

mod error;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use thrum_core::{Host, Library};

pub use error::LoaderError;

/// Name of the symbol every plugin bundle must export.
const ENTRY_SYMBOL: &[u8] = b"thrum_library_init\0";

/// Signature every plugin bundle's `thrum_library_init` export must match.
///
/// The module registers its synth definitions onto `host` during the call
/// and hands back a handle whose `Drop` tears the module down.
pub type LibraryInitFn = unsafe fn(host: &mut dyn Host, bundle_path: &Path) -> Box<dyn Library>;

/// A loaded plugin bundle: the module's own handle, plus the dynamic
/// library mapping that must stay alive as long as the handle (and any
/// `Arc<dyn SynthDef>` it registered) are in use.
///
/// Field order matters: Rust drops struct fields in declaration order, so
/// `module` is torn down (running any `Drop` impl that releases resources
/// through the `Host` the module was built with) before `_library` unmaps
/// the code it belongs to.
pub struct LoadedModule {
    module: Box<dyn Library>,
    _library: libloading::Library,
}

impl LoadedModule {
    /// The loaded module's human-readable name, for diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        self.module.name()
    }
}

/// The file extension a plugin bundle uses on the current platform.
#[must_use]
pub fn bundle_extension() -> &'static str {
    if cfg!(target_os = "windows") {
        "dll"
    } else if cfg!(target_os = "macos") {
        "dylib"
    } else {
        "so"
    }
}

/// Open `path` as a plugin bundle and call its `thrum_library_init` entry
/// point, registering its synth definitions onto `host`.
///
/// # Errors
/// Returns [`LoaderError::NotABundle`] if `path`'s extension doesn't match
/// [`bundle_extension`], [`LoaderError::OpenFailed`] if the dynamic library
/// fails to load, or [`LoaderError::MissingEntryPoint`] if it has no
/// `thrum_library_init` export.
///
/// # Safety concerns
/// This function is safe to call, but what it does is not: calling into
/// `thrum_library_init` assumes the bundle was built against an
/// ABI-compatible version of `thrum-core` (see the module documentation).
/// A malicious or mismatched bundle can violate every invariant this crate
/// relies on.
pub fn load_bundle(path: &Path, host: &mut dyn Host) -> Result<LoadedModule, LoaderError> {
    if path.extension() != Some(OsStr::new(bundle_extension())) {
        return Err(LoaderError::NotABundle(path.to_path_buf()));
    }

    // SAFETY: loading and running a dynamic library's entry point is
    // inherently unsafe; the caller accepts the ABI-compatibility
    // assumption documented on this function and the crate root.
    let library = unsafe {
        libloading::Library::new(path).map_err(|source| LoaderError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?
    };

    // SAFETY: see above; additionally assumes `ENTRY_SYMBOL` resolves to a
    // function matching `LibraryInitFn`'s signature exactly.
    let init: libloading::Symbol<LibraryInitFn> = unsafe {
        library
            .get(ENTRY_SYMBOL)
            .map_err(|source| LoaderError::MissingEntryPoint {
                path: path.to_path_buf(),
                source,
            })?
    };

    tracing::info!(path = %path.display(), "loading plugin bundle");
    // SAFETY: `init` was resolved from `ENTRY_SYMBOL` above.
    let module = unsafe { init(host, path) };

    Ok(LoadedModule {
        module,
        _library: library,
    })
}

/// Load every plugin bundle found directly inside `dir` (non-recursive).
///
/// Entries that are not a recognized bundle for this platform are skipped
/// rather than treated as an error; entries that look like a bundle but
/// fail to load are reported individually so one broken plugin doesn't
/// block the rest from loading.
///
/// # Errors
/// Returns an error if `dir` itself cannot be read.
pub fn load_dir(
    dir: &Path,
    host: &mut dyn Host,
) -> std::io::Result<Vec<Result<LoadedModule, LoaderError>>> {
    let mut results = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension() != Some(OsStr::new(bundle_extension())) {
            continue;
        }
        results.push(load_bundle(&path, host));
    }
    Ok(results)
}

/// Search `paths` in order for a bundle named `name` (without extension),
/// loading the first match.
///
/// # Errors
/// Returns [`LoaderError::NotABundle`] naming the first search path if
/// `name` is not found in any of them, or whatever error loading the match
/// produced.
pub fn find_and_load(
    paths: &[PathBuf],
    name: &str,
    host: &mut dyn Host,
) -> Result<LoadedModule, LoaderError> {
    for dir in paths {
        let candidate = dir.join(name).with_extension(bundle_extension());
        if candidate.is_file() {
            return load_bundle(&candidate, host);
        }
    }
    Err(LoaderError::NotABundle(
        paths
            .first()
            .cloned()
            .unwrap_or_default()
            .join(name)
            .with_extension(bundle_extension()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_extension_matches_current_platform() {
        let ext = bundle_extension();
        assert!(ext == "so" || ext == "dylib" || ext == "dll");
    }

    #[test]
    fn non_bundle_extension_is_rejected_without_opening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-a-plugin.txt");
        std::fs::write(&path, b"").unwrap();

        struct NullHost;
        impl Host for NullHost {
            fn lookup(&self, uri: &str) -> thrum_core::EngineResult<std::sync::Arc<dyn thrum_core::SynthDef>> {
                Err(thrum_core::EngineError::UnknownPlugin(uri.into()))
            }
            fn register(
                &mut self,
                _uri: String,
                _def: std::sync::Arc<dyn thrum_core::SynthDef>,
            ) -> thrum_core::EngineResult<()> {
                Ok(())
            }
            fn sound_files(&self) -> Option<&dyn thrum_core::SoundFileApi> {
                None
            }
            fn schedule_rt(&mut self, _job: thrum_core::RtJob) -> thrum_core::EngineResult<()> {
                Ok(())
            }
            fn log(&self, _level: thrum_core::LogLevel, _message: &str) {}
        }

        let mut host = NullHost;
        let err = load_bundle(&path, &mut host).unwrap_err();
        assert!(matches!(err, LoaderError::NotABundle(_)));
    }

    #[test]
    fn missing_bundle_in_search_paths_reports_first_path() {
        let dir = tempfile::tempdir().unwrap();
        struct NullHost;
        impl Host for NullHost {
            fn lookup(&self, uri: &str) -> thrum_core::EngineResult<std::sync::Arc<dyn thrum_core::SynthDef>> {
                Err(thrum_core::EngineError::UnknownPlugin(uri.into()))
            }
            fn register(
                &mut self,
                _uri: String,
                _def: std::sync::Arc<dyn thrum_core::SynthDef>,
            ) -> thrum_core::EngineResult<()> {
                Ok(())
            }
            fn sound_files(&self) -> Option<&dyn thrum_core::SoundFileApi> {
                None
            }
            fn schedule_rt(&mut self, _job: thrum_core::RtJob) -> thrum_core::EngineResult<()> {
                Ok(())
            }
            fn log(&self, _level: thrum_core::LogLevel, _message: &str) {}
        }
        let mut host = NullHost;
        let err = find_and_load(&[dir.path().to_path_buf()], "missing", &mut host).unwrap_err();
        assert!(matches!(err, LoaderError::NotABundle(_)));
    }
}
