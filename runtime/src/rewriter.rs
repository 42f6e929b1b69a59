//! The rewriter facade.
//!
//! A [`Rewriter`] owns the term pool of one data specification together with
//! the rules, strategies and, for [`Backend::Compiling`], the loaded module
//! implementing them. Terms cross the API either as public [`DataExpr`]s or as
//! internal [`TermId`]s of the rewriter's own pool.

use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};

use snafu::ResultExt;
use tracing::{debug, warn};

use innerc_codegen::{UNBOUND, c};
use innerc_ir::{DataEquation, DataExpr, DataSpecification, FunctionSymbol, TermId, TermPool, Variable, check_equation};
use innerc_schedule::{RuleSet, StrategyTable};

use crate::config::{Backend, RewriterConfig};
use crate::error::{CodegenSnafu, CompilationFailureSnafu, Error, IrSnafu, Result, RewriteSnafu, ScheduleSnafu, Stage};
use crate::host::{Host, RuntimeCallbacks};
use crate::interpreter::Interpreter;
use crate::library::CompiledLibrary;
use crate::substitution::Substitution;

static NEXT_MODULE: AtomicUsize = AtomicUsize::new(0);

enum Engine {
    Compiled(CompiledLibrary),
    Interpreted(Substitution),
}

/// Innermost rewriter for the equations of one data specification.
///
/// Not `Send`: the loaded module keeps a pointer to the term pool.
pub struct Rewriter {
    host: NonNull<Host>,
    rules: RuleSet,
    table: StrategyTable,
    engine: Engine,
}

impl Rewriter {
    /// Build a rewriter with the compiler configured from the environment.
    pub fn new(spec: &DataSpecification, backend: Backend) -> Result<Self> {
        Self::with_config(spec, &RewriterConfig::builder().backend(backend).build())
    }

    pub fn with_config(spec: &DataSpecification, config: &RewriterConfig) -> Result<Self> {
        let mut pool = TermPool::new();
        let rules = RuleSet::from_specification(&mut pool, spec).context(ScheduleSnafu)?;
        let table = StrategyTable::build(&pool, &rules);

        let engine = match config.backend {
            Backend::Compiling => {
                let name = format!("innerc_rewriter_{}", NEXT_MODULE.fetch_add(1, Ordering::Relaxed));
                let module = c::render(&pool, &table, &name).context(CodegenSnafu)?;
                Engine::Compiled(CompiledLibrary::compile(&module, &config.compiler)?)
            }
            Backend::Interpreter => Engine::Interpreted(Substitution::new()),
        };

        let host = NonNull::from(Box::leak(Box::new(Host::new(pool))));
        let rewriter = Self { host, rules, table, engine };
        if let Engine::Compiled(library) = &rewriter.engine {
            let callbacks = RuntimeCallbacks::new(rewriter.host.as_ptr());
            let status = unsafe { library.init(&callbacks) };
            if status != 0 {
                return CompilationFailureSnafu { stage: Stage::Linking, reason: format!("rewrite_init returned {status}") }
                    .fail();
            }
        }

        debug!(backend = %config.backend, rules = rewriter.rules.len(), "rewriter ready");
        Ok(rewriter)
    }

    fn host(&self) -> &Host {
        unsafe { self.host.as_ref() }
    }

    fn host_mut(&mut self) -> &mut Host {
        unsafe { self.host.as_mut() }
    }

    pub fn pool(&self) -> &TermPool {
        &self.host().pool
    }

    /// Which backend computes normal forms.
    pub fn strategy(&self) -> Backend {
        match self.engine {
            Engine::Compiled(_) => Backend::Compiling,
            Engine::Interpreted(_) => Backend::Interpreter,
        }
    }

    pub fn to_internal(&mut self, expr: &DataExpr) -> Result<TermId> {
        self.host_mut().pool.to_internal(expr).context(IrSnafu)
    }

    pub fn from_internal(&self, t: TermId) -> Result<DataExpr> {
        self.pool().from_internal(t).context(IrSnafu)
    }

    /// Normal form of `expr`.
    pub fn rewrite(&mut self, expr: &DataExpr) -> Result<DataExpr> {
        let t = self.to_internal(expr)?;
        let normal = self.rewrite_internal(t)?;
        self.from_internal(normal)
    }

    /// Normal form of an internal term.
    pub fn rewrite_internal(&mut self, t: TermId) -> Result<TermId> {
        self.pool().get(t).context(IrSnafu)?;
        let host = self.host.as_ptr();
        match &self.engine {
            Engine::Compiled(library) => {
                unsafe { (*host).error = None };
                let result = unsafe { library.rewrite(t.0) };
                match unsafe { (*host).error.take() } {
                    Some(source) => Err(Error::Rewrite { source }),
                    None => Ok(TermId(result)),
                }
            }
            Engine::Interpreted(substitution) => {
                let pool = unsafe { &mut (*host).pool };
                Interpreter::new(&self.table, substitution).rewrite(pool, t).context(RewriteSnafu)
            }
        }
    }

    pub fn rewrite_list(&mut self, exprs: &[DataExpr]) -> Result<Vec<DataExpr>> {
        exprs.iter().map(|e| self.rewrite(e)).collect()
    }

    /// Bind `var` to `value` for every following rewrite.
    pub fn set_substitution(&mut self, var: &Variable, value: &DataExpr) -> Result<()> {
        let value = self.to_internal(value)?;
        let id = self.host_mut().pool.intern_var(var);
        match &mut self.engine {
            Engine::Compiled(library) => library.set_subst(id.0, value.0)?,
            Engine::Interpreted(substitution) => substitution.set(id, value),
        }
        Ok(())
    }

    pub fn get_substitution(&self, var: &Variable) -> Result<Option<DataExpr>> {
        let Some(id) = self.pool().symbols().lookup_var(var) else { return Ok(None) };
        let bound = match &self.engine {
            Engine::Compiled(library) => Some(library.get_subst(id.0)).filter(|&t| t != UNBOUND).map(TermId),
            Engine::Interpreted(substitution) => substitution.get(id),
        };
        bound.map(|t| self.from_internal(t)).transpose()
    }

    pub fn clear_substitution(&mut self, var: &Variable) {
        let Some(id) = self.pool().symbols().lookup_var(var) else { return };
        match &mut self.engine {
            Engine::Compiled(library) => library.clear_subst(id.0),
            Engine::Interpreted(substitution) => substitution.clear(id),
        }
    }

    pub fn clear_substitutions(&mut self) {
        match &mut self.engine {
            Engine::Compiled(library) => library.clear_substs(),
            Engine::Interpreted(substitution) => substitution.clear_all(),
        }
    }

    /// Add an equation after construction.
    ///
    /// Returns `false` when the backend cannot change its rules or the
    /// equation is malformed.
    pub fn add_rewrite_rule(&mut self, equation: &DataEquation) -> Result<bool> {
        if matches!(self.engine, Engine::Compiled(_)) {
            debug!(%equation, "compiled rewriter cannot add rules");
            return Ok(false);
        }
        if let Err(error) = check_equation(equation) {
            warn!(%error, %equation, "ignoring malformed equation");
            return Ok(false);
        }
        let pool = unsafe { &mut (*self.host.as_ptr()).pool };
        let op = self.rules.push(pool, equation).context(ScheduleSnafu)?;
        self.table.refresh(pool, &self.rules, op);
        Ok(true)
    }

    /// Remove every rule created from `equation`.
    ///
    /// Returns `false` when the backend cannot change its rules or no rule
    /// came from `equation`.
    pub fn remove_rewrite_rule(&mut self, equation: &DataEquation) -> bool {
        if matches!(self.engine, Engine::Compiled(_)) {
            debug!(%equation, "compiled rewriter cannot remove rules");
            return false;
        }
        let Some(op) = self.rules.remove(equation) else { return false };
        let pool = unsafe { &(*self.host.as_ptr()).pool };
        self.table.refresh(pool, &self.rules, op);
        true
    }

    /// Number of rules of `op` reachable from its decision trees.
    pub fn compiled_rule_count(&self, op: &FunctionSymbol) -> usize {
        self.pool()
            .symbols()
            .lookup_op(op)
            .and_then(|id| self.table.get(id))
            .map_or(0, |strategy| strategy.compiled_rules())
    }
}

impl Drop for Rewriter {
    fn drop(&mut self) {
        if let Engine::Compiled(library) = &self.engine {
            debug!(module = library.name(), "unloading rewriter");
            unsafe { library.fini() };
        }
        drop(unsafe { Box::from_raw(self.host.as_ptr()) });
    }
}
