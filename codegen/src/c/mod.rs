//! C source code generation backend.
//!
//! Generates one C module per rule set, suitable for compilation with
//! `cc -shared -fPIC -O2` and loading via `dlopen`.
//!
//! # Module Interface
//!
//! ```c
//! int  rewrite_init(const innerc_runtime *rt);
//! void rewrite_fini(void);
//! term rewrite(term t);
//! int  set_subst(uint32_t var, term value);  /* 0, or -1 if the table cannot grow */
//! term get_subst(uint32_t var);
//! void clear_subst(uint32_t var);
//! void clear_substs(void);
//! ```
//!
//! Terms never cross the boundary as structures: `term` is the handle of a
//! host-owned term, and all inspection and construction goes through the
//! callbacks of `innerc_runtime`.

pub mod boilerplate;
pub mod context;
pub mod routine;

use itertools::Itertools;
use tracing::{debug, trace};

use innerc_ir::{FunctionSymbol, TermPool};
use innerc_schedule::{ArityStrategy, StrategyTable};

use crate::{RenderedModule, Result};

use self::context::CContext;
use self::routine::{RoutineEmitter, masks, routine_name, signature};

/// C source code renderer for rewriting via a host-provided term store.
pub struct CRenderer;

impl CRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Operator name usable inside a C comment.
fn sanitize(name: &str) -> String {
    name.chars().map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' }).collect()
}

impl crate::Renderer for CRenderer {
    fn render(&self, pool: &TermPool, table: &StrategyTable, name: &str) -> Result<RenderedModule> {
        let symbols = pool.symbols();
        let num_ops = symbols.num_ops();

        let strategies: Vec<&ArityStrategy> = table.iter().flat_map(|s| s.arities()).collect();
        let arities: Vec<usize> = strategies.iter().map(|s| s.arity()).sorted().dedup().collect();
        let routines: usize = strategies.iter().map(|s| masks(s.arity()).len()).sum();

        let mut code_lines = boilerplate::prelude(num_ops, table.max_arity());
        code_lines.push(String::new());

        // Forward declarations; routines call each other for nested rhs calls.
        for strategy in table.iter() {
            for arity_strategy in strategy.arities() {
                let arity = arity_strategy.arity();
                code_lines.push(format!("/* {}/{arity} */", sanitize(symbols.op(strategy.op()).name())));
                for mask in masks(arity) {
                    code_lines.push(format!("{};", signature(strategy.op(), arity, mask)));
                }
            }
        }
        code_lines.push(String::new());

        for strategy in table.iter() {
            for arity_strategy in strategy.arities() {
                for mask in masks(arity_strategy.arity()) {
                    let mut ctx = CContext::new();
                    RoutineEmitter::new(pool, table, strategy.op(), arity_strategy, mask).emit(&mut ctx)?;
                    code_lines.extend(ctx.into_lines());
                    code_lines.push(String::new());
                }
            }
        }

        // Dispatch tables point at the routine assuming nothing is normalized.
        for &arity in &arities {
            let params = if arity == 0 { "void".to_string() } else { vec!["term"; arity].join(", ") };
            code_lines.push(format!("typedef term (*rewr_fn_{arity})({params});"));
            code_lines.push(format!("static const rewr_fn_{arity} table_{arity}[NUM_OPS] = {{"));
            for strategy in table.iter() {
                if strategy.for_arity(arity).is_some() {
                    let op = strategy.op();
                    code_lines.push(format!("  [{}] = {},", op.index(), routine_name(op, arity, 0)));
                }
            }
            code_lines.push("};".to_string());
            code_lines.push(String::new());
        }

        let true_op = symbols.lookup_op(&FunctionSymbol::true_()).map(|op| op.0);
        code_lines.extend(boilerplate::entry_points(true_op, &arities));

        let code = code_lines.join("\n");
        trace!(name, code = %code, "generated C module");
        debug!(name, routines, num_ops, arities = ?arities, "rendered C module");

        let mut result = RenderedModule::new(code, name.to_string());
        result.routines = routines;
        result.num_ops = num_ops;
        Ok(result)
    }

    fn backend_name(&self) -> &str {
        "c"
    }
}

/// Render `table` with the C backend.
pub fn render(pool: &TermPool, table: &StrategyTable, name: &str) -> Result<RenderedModule> {
    let renderer = CRenderer::new();
    crate::Renderer::render(&renderer, pool, table, name)
}
