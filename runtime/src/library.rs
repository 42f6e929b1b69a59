//! System-compiler compilation and dynamic loading of generated modules.
//!
//! Compiles C source via `cc -c` and `cc -shared` and loads the resulting
//! shared library via `dlopen`. Source, object and library live in a private
//! temporary directory that is removed together with the [`CompiledLibrary`].

use std::process::Command;
use std::time::Instant;

use snafu::{ResultExt, ensure};
use tracing::{debug, info};

use innerc_codegen::{
    CLEAR_SUBST_SYMBOL, CLEAR_SUBSTS_SYMBOL, FINI_SYMBOL, GET_SUBST_SYMBOL, INIT_SYMBOL, REWRITE_SYMBOL,
    RenderedModule, SET_SUBST_SYMBOL,
};

use crate::config::{BASE_CFLAGS, CompilerConfig};
use crate::error::{
    CompilationFailureSnafu, IoSnafu, LinkSymbolMissingSnafu, Result, Stage, SubstitutionTableFullSnafu,
};
use crate::host::RuntimeCallbacks;

type InitFn = unsafe extern "C" fn(*const RuntimeCallbacks) -> i32;
type FiniFn = unsafe extern "C" fn();
type RewriteFn = unsafe extern "C" fn(u32) -> u32;
type SetSubstFn = unsafe extern "C" fn(u32, u32) -> i32;
type GetSubstFn = unsafe extern "C" fn(u32) -> u32;
type ClearSubstFn = unsafe extern "C" fn(u32);
type ClearSubstsFn = unsafe extern "C" fn();

/// A generated rewriter loaded as a shared library.
pub struct CompiledLibrary {
    init: InitFn,
    fini: FiniFn,
    rewrite: RewriteFn,
    set_subst: SetSubstFn,
    get_subst: GetSubstFn,
    clear_subst: ClearSubstFn,
    clear_substs: ClearSubstsFn,
    /// Keep the library alive (prevents dlclose).
    _lib: libloading::Library,
    /// Keep the temp directory alive so the .so isn't deleted.
    tmp_dir: tempfile::TempDir,
    name: String,
}

fn run(command: &mut Command, stage: Stage) -> Result<()> {
    debug!(%stage, command = ?command, "running");
    let program = command.get_program().to_string_lossy().into_owned();
    let output = command
        .output()
        .map_err(|e| CompilationFailureSnafu { stage, reason: format!("failed to run {program}: {e}") }.build())?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return CompilationFailureSnafu { stage, reason: format!("{program} {}:\n{stderr}", output.status) }.fail();
    }
    Ok(())
}

/// # Safety
///
/// `T` must be the function pointer type of the symbol's C declaration.
unsafe fn resolve<T: Copy>(lib: &libloading::Library, name: &str) -> Result<T> {
    let symbol: libloading::Symbol<'_, T> =
        unsafe { lib.get(name.as_bytes()) }.map_err(|_| LinkSymbolMissingSnafu { name }.build())?;
    Ok(*symbol)
}

impl CompiledLibrary {
    /// Compile `module`, link it into a shared library and load it.
    pub fn compile(module: &RenderedModule, config: &CompilerConfig) -> Result<Self> {
        let start = Instant::now();
        let tmp_dir = tempfile::Builder::new().prefix("innerc-").tempdir().context(IoSnafu)?;
        let src_path = tmp_dir.path().join(format!("{}.c", module.name));
        let obj_path = tmp_dir.path().join(format!("{}.o", module.name));
        let so_path = tmp_dir.path().join(format!("{}.so", module.name));

        std::fs::write(&src_path, &module.code).context(IoSnafu)?;
        if config.keep_source {
            info!(module.name = %module.name, source = %module.code, "generated source");
        }

        run(
            Command::new(&config.cc)
                .args(BASE_CFLAGS)
                .args(&config.cflags)
                .arg("-o")
                .arg(&obj_path)
                .arg(&src_path),
            Stage::Compilation,
        )?;
        run(
            Command::new(&config.cc)
                .arg("-shared")
                .arg("-o")
                .arg(&so_path)
                .arg(&obj_path)
                .args(&config.ldflags),
            Stage::Linking,
        )?;

        let lib = unsafe { libloading::Library::new(&so_path) }.map_err(|e| {
            CompilationFailureSnafu { stage: Stage::Linking, reason: format!("failed to load {}: {e}", so_path.display()) }
                .build()
        })?;

        let library = unsafe {
            Self {
                init: resolve(&lib, INIT_SYMBOL)?,
                fini: resolve(&lib, FINI_SYMBOL)?,
                rewrite: resolve(&lib, REWRITE_SYMBOL)?,
                set_subst: resolve(&lib, SET_SUBST_SYMBOL)?,
                get_subst: resolve(&lib, GET_SUBST_SYMBOL)?,
                clear_subst: resolve(&lib, CLEAR_SUBST_SYMBOL)?,
                clear_substs: resolve(&lib, CLEAR_SUBSTS_SYMBOL)?,
                _lib: lib,
                tmp_dir,
                name: module.name.clone(),
            }
        };

        debug!(
            module.name = %module.name,
            module.routines = module.routines,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "module compiled and loaded"
        );
        Ok(library)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Private directory holding the source, object and library.
    pub fn directory(&self) -> &std::path::Path {
        self.tmp_dir.path()
    }

    /// # Safety
    ///
    /// `callbacks.ctx` must outlive every later call into the module.
    pub unsafe fn init(&self, callbacks: &RuntimeCallbacks) -> i32 {
        unsafe { (self.init)(callbacks) }
    }

    /// # Safety
    ///
    /// No call into the module may follow.
    pub unsafe fn fini(&self) {
        unsafe { (self.fini)() }
    }

    /// # Safety
    ///
    /// The module must be initialized and `t` must belong to its host's pool.
    pub unsafe fn rewrite(&self, t: u32) -> u32 {
        unsafe { (self.rewrite)(t) }
    }

    /// Bind `var`, failing when the module cannot grow its substitution table.
    pub fn set_subst(&self, var: u32, value: u32) -> Result<()> {
        let status = unsafe { (self.set_subst)(var, value) };
        ensure!(status == 0, SubstitutionTableFullSnafu { var });
        Ok(())
    }

    pub fn get_subst(&self, var: u32) -> u32 {
        unsafe { (self.get_subst)(var) }
    }

    pub fn clear_subst(&self, var: u32) {
        unsafe { (self.clear_subst)(var) }
    }

    pub fn clear_substs(&self) {
        unsafe { (self.clear_substs)() }
    }
}
