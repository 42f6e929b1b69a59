//! Host side of the generated module's callback interface.
//!
//! Generated code owns no terms. It inspects and builds them through the
//! function pointers of [`RuntimeCallbacks`], all of which receive a pointer
//! to the [`Host`] that owns the term pool.

use std::ffi::c_void;

use tracing::trace;

use innerc_codegen::{TermKind, UNBOUND};
use innerc_ir::{Head, OpId, Term, TermId, TermPool, VarId};

/// Term pool shared with generated code, plus the first error a callback hit.
#[derive(Debug, Default)]
pub struct Host {
    pub pool: TermPool,
    pub error: Option<innerc_ir::Error>,
}

impl Host {
    pub fn new(pool: TermPool) -> Self {
        Self { pool, error: None }
    }

    fn term(&self, t: u32) -> Option<&Term> {
        self.pool.get(TermId(t)).ok()
    }

    fn record(&mut self, result: innerc_ir::Result<TermId>) -> u32 {
        match result {
            Ok(id) => id.0,
            Err(error) => {
                trace!(%error, "callback failed");
                self.error.get_or_insert(error);
                UNBOUND
            }
        }
    }
}

/// Mirror of `innerc_runtime` in the generated C prelude.
#[repr(C)]
pub struct RuntimeCallbacks {
    pub ctx: *mut c_void,
    pub kind: unsafe extern "C" fn(*mut c_void, u32) -> u32,
    pub symbol: unsafe extern "C" fn(*mut c_void, u32) -> u32,
    pub arity: unsafe extern "C" fn(*mut c_void, u32) -> u32,
    pub arg: unsafe extern "C" fn(*mut c_void, u32, u32) -> u32,
    pub make_app: unsafe extern "C" fn(*mut c_void, u32, u32, *const u32) -> u32,
    pub make_var_app: unsafe extern "C" fn(*mut c_void, u32, u32, *const u32) -> u32,
    pub make_var: unsafe extern "C" fn(*mut c_void, u32) -> u32,
    pub compose: unsafe extern "C" fn(*mut c_void, u32, u32, *const u32) -> u32,
}

impl RuntimeCallbacks {
    /// Callbacks operating on `host`.
    ///
    /// The pointer must stay valid, and must not be aliased by a live
    /// reference, whenever generated code runs.
    pub fn new(host: *mut Host) -> Self {
        Self {
            ctx: host.cast(),
            kind: term_kind,
            symbol: term_symbol,
            arity: term_arity,
            arg: term_arg,
            make_app,
            make_var_app,
            make_var,
            compose,
        }
    }
}

/// # Safety
///
/// `ctx` must be the pointer passed to [`RuntimeCallbacks::new`].
unsafe fn host<'a>(ctx: *mut c_void) -> &'a mut Host {
    unsafe { &mut *ctx.cast::<Host>() }
}

/// # Safety
///
/// `args` must point to `n` handles unless `n` is zero.
unsafe fn handles<'a>(n: u32, args: *const u32) -> &'a [TermId] {
    if n == 0 || args.is_null() {
        &[]
    } else {
        // TermId is a transparent u32.
        unsafe { std::slice::from_raw_parts(args.cast::<TermId>(), n as usize) }
    }
}

unsafe extern "C" fn term_kind(ctx: *mut c_void, t: u32) -> u32 {
    let kind = match unsafe { host(ctx) }.term(t) {
        Some(Term::App { head: Head::Op(_), .. }) => TermKind::App,
        Some(Term::App { head: Head::Var(_), .. }) => TermKind::VarApp,
        Some(Term::Var(_)) | None => TermKind::Var,
    };
    kind as u32
}

unsafe extern "C" fn term_symbol(ctx: *mut c_void, t: u32) -> u32 {
    match unsafe { host(ctx) }.term(t) {
        Some(Term::Var(v) | Term::App { head: Head::Var(v), .. }) => v.0,
        Some(Term::App { head: Head::Op(op), .. }) => op.0,
        None => UNBOUND,
    }
}

unsafe extern "C" fn term_arity(ctx: *mut c_void, t: u32) -> u32 {
    match unsafe { host(ctx) }.term(t) {
        Some(Term::App { args, .. }) => args.len() as u32,
        Some(Term::Var(_)) | None => 0,
    }
}

unsafe extern "C" fn term_arg(ctx: *mut c_void, t: u32, i: u32) -> u32 {
    match unsafe { host(ctx) }.term(t) {
        Some(Term::App { args, .. }) => args.get(i as usize).map_or(UNBOUND, |a| a.0),
        Some(Term::Var(_)) | None => UNBOUND,
    }
}

unsafe extern "C" fn make_app(ctx: *mut c_void, op: u32, n: u32, args: *const u32) -> u32 {
    let host = unsafe { host(ctx) };
    if host.error.is_some() {
        return UNBOUND;
    }
    let result = host.pool.app(Head::Op(OpId(op)), unsafe { handles(n, args) });
    host.record(result)
}

unsafe extern "C" fn make_var_app(ctx: *mut c_void, var: u32, n: u32, args: *const u32) -> u32 {
    let host = unsafe { host(ctx) };
    if host.error.is_some() {
        return UNBOUND;
    }
    let result = host.pool.app(Head::Var(VarId(var)), unsafe { handles(n, args) });
    host.record(result)
}

unsafe extern "C" fn make_var(ctx: *mut c_void, var: u32) -> u32 {
    unsafe { host(ctx) }.pool.var(VarId(var)).0
}

unsafe extern "C" fn compose(ctx: *mut c_void, head: u32, n: u32, args: *const u32) -> u32 {
    let host = unsafe { host(ctx) };
    if host.error.is_some() {
        return UNBOUND;
    }
    let result = host.pool.compose(TermId(head), unsafe { handles(n, args) });
    host.record(result)
}
