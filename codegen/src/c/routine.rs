//! Emission of one specialized rewrite routine.
//!
//! A routine `rewr_{op}_{k}_{mask}` rewrites a call of `op` with `k`
//! arguments, passed as `a0..a{k-1}`. Bit `i` of `mask` tells the routine
//! that argument `i` is already in normal form; only the first three
//! positions get a bit, and calls with more arguments use mask 0.
//!
//! Rules whose lhs is shorter than `k` match a prefix of the parameters; the
//! rest are applied to their right-hand side through `RT.compose`.

use itertools::Itertools;
use snafu::{OptionExt, ResultExt};

use innerc_ir::{Head, OpId, Term, TermId, TermPool, VarId};
use innerc_schedule::{ArityStrategy, MatchTree, Resolution, Rule, StrategyStep, StrategyTable};

use crate::error::{IrSnafu, Result, UnknownRuleSnafu};

use super::context::CContext;

/// Positions covered by the normal-form mask.
pub const MASKED_POSITIONS: usize = 3;

pub fn routine_name(op: OpId, arity: usize, mask: u32) -> String {
    format!("rewr_{}_{arity}_{mask}", op.index())
}

/// Masks a routine is emitted for.
pub fn masks(arity: usize) -> std::ops::Range<u32> {
    if arity <= MASKED_POSITIONS { 0..1 << arity } else { 0..1 }
}

pub fn signature(op: OpId, arity: usize, mask: u32) -> String {
    let params = if arity == 0 { "void".to_string() } else { (0..arity).map(|i| format!("term a{i}")).join(", ") };
    format!("static term {}({params})", routine_name(op, arity, mask))
}

/// C list of `args` usable as a `const term *` argument.
fn term_array(args: &[String]) -> String {
    if args.is_empty() { "0".to_string() } else { format!("(term[]){{{}}}", args.join(", ")) }
}

/// Position in the term being matched.
///
/// With no frames the current term is the routine parameter `a{root}`;
/// otherwise it is argument `index` of the local named by the top frame.
#[derive(Debug, Clone, Default)]
struct Cursor {
    root: usize,
    frames: Vec<(String, usize)>,
}

impl Cursor {
    fn current(&self) -> String {
        match self.frames.last() {
            Some((parent, index)) => format!("ARG({parent}, {index})"),
            None => format!("a{}", self.root),
        }
    }

    fn next(&mut self) {
        match self.frames.last_mut() {
            Some((_, index)) => *index += 1,
            None => self.root += 1,
        }
    }
}

pub struct RoutineEmitter<'a> {
    pool: &'a TermPool,
    table: &'a StrategyTable,
    op: OpId,
    strategy: &'a ArityStrategy,
    mask: u32,
}

impl<'a> RoutineEmitter<'a> {
    pub fn new(pool: &'a TermPool, table: &'a StrategyTable, op: OpId, strategy: &'a ArityStrategy, mask: u32) -> Self {
        Self { pool, table, op, strategy, mask }
    }

    pub fn emit(&self, ctx: &mut CContext) -> Result<()> {
        let arity = self.strategy.arity();
        let mut normalized: Vec<bool> =
            (0..arity).map(|i| i < MASKED_POSITIONS && self.mask & (1 << i) != 0).collect();

        ctx.line(format!("{} {{", signature(self.op, arity, self.mask)));
        ctx.push_indent();
        for step in self.strategy.steps() {
            match step {
                StrategyStep::Normalize(i) => {
                    if !normalized[*i] {
                        ctx.line(format!("a{i} = rewrite(a{i});"));
                        normalized[*i] = true;
                    }
                }
                StrategyStep::Tree(tree) => {
                    ctx.line("{");
                    ctx.push_indent();
                    self.emit_tree(ctx, tree, Cursor::default(), &normalized)?;
                    ctx.pop_indent();
                    ctx.line("}");
                }
            }
        }

        for (i, done) in normalized.iter().enumerate() {
            if !done {
                ctx.line(format!("a{i} = rewrite(a{i});"));
            }
        }
        let args = (0..arity).map(|i| format!("a{i}")).collect::<Vec<_>>();
        ctx.line(format!("return RT.make_app(RT.ctx, {}u, {arity}u, {});", self.op.index(), term_array(&args)));
        ctx.pop_indent();
        ctx.line("}");
        Ok(())
    }

    fn emit_tree(&self, ctx: &mut CContext, tree: &MatchTree, mut cursor: Cursor, normalized: &[bool]) -> Result<()> {
        match tree {
            MatchTree::Store { slot, then } => {
                ctx.line(format!("term s{slot} = {};", cursor.current()));
                self.emit_tree(ctx, then, cursor, normalized)
            }
            MatchTree::Match { slot, then, otherwise } => {
                ctx.line(format!("if ({} == s{slot}) {{", cursor.current()));
                self.emit_branches(ctx, then, cursor.clone(), otherwise, cursor, normalized)
            }
            MatchTree::Function { op, arity, then, otherwise } => {
                let local = ctx.next_name("t");
                ctx.line(format!("term {local} = {};", cursor.current()));
                ctx.line(format!("if (is_app({local}, {}u, {arity}u)) {{", op.index()));
                let mut inner = cursor.clone();
                inner.frames.push((local, 0));
                self.emit_branches(ctx, then, inner, otherwise, cursor, normalized)
            }
            MatchTree::Next(then) => {
                cursor.next();
                self.emit_tree(ctx, then, cursor, normalized)
            }
            MatchTree::Up(then) => {
                cursor.frames.pop();
                self.emit_tree(ctx, then, cursor, normalized)
            }
            MatchTree::Check { resolution, otherwise } => {
                let rule = self.rule(resolution.rule)?;
                if let Some(condition) = rule.condition() {
                    let test = self.term_expr(condition, rule, resolution, normalized)?;
                    let rhs = self.result_expr(rule, resolution, normalized)?;
                    ctx.line(format!("if ({test} == TRUE_TERM) return {rhs};"));
                } else {
                    ctx.line(format!("return {};", self.result_expr(rule, resolution, normalized)?));
                }
                self.emit_tree(ctx, otherwise, cursor, normalized)
            }
            MatchTree::Return(resolution) => {
                let rule = self.rule(resolution.rule)?;
                ctx.line(format!("return {};", self.result_expr(rule, resolution, normalized)?));
                Ok(())
            }
            MatchTree::Fail => Ok(()),
        }
    }

    fn emit_branches(
        &self,
        ctx: &mut CContext,
        then: &MatchTree,
        then_cursor: Cursor,
        otherwise: &MatchTree,
        cursor: Cursor,
        normalized: &[bool],
    ) -> Result<()> {
        ctx.push_indent();
        self.emit_tree(ctx, then, then_cursor, normalized)?;
        ctx.pop_indent();
        if matches!(otherwise, MatchTree::Fail) {
            ctx.line("}");
            return Ok(());
        }
        ctx.line("} else {");
        ctx.push_indent();
        self.emit_tree(ctx, otherwise, cursor, normalized)?;
        ctx.pop_indent();
        ctx.line("}");
        Ok(())
    }

    fn rule(&self, priority: usize) -> Result<&'a Rule> {
        self.strategy.rule(priority).context(UnknownRuleSnafu { rule: priority })
    }

    /// Normal form of the rhs of `rule`, applied to the parameters its lhs does not cover.
    fn result_expr(&self, rule: &Rule, resolution: &Resolution, normalized: &[bool]) -> Result<String> {
        let rhs = self.term_expr(rule.rhs(), rule, resolution, normalized)?;
        let rest: Vec<String> = (rule.arity()..self.strategy.arity()).map(|i| format!("a{i}")).collect();
        if rest.is_empty() {
            return Ok(rhs);
        }
        Ok(format!("rewrite(RT.compose(RT.ctx, {rhs}, {}u, {}))", rest.len(), term_array(&rest)))
    }

    /// Slot value of a bound variable and whether it may still be unnormalized.
    fn binding(&self, var: VarId, rule: &Rule, resolution: &Resolution, normalized: &[bool]) -> Option<(String, bool)> {
        let slot = resolution.slot_of(var)?;
        let raw = (0..rule.arity()).any(|i| !normalized[i] && rule.variable_at(self.pool, i) == Some(var));
        Some((format!("s{slot}"), raw))
    }

    /// Expression evaluating to the normal form of the instance of `id`.
    fn term_expr(&self, id: TermId, rule: &Rule, resolution: &Resolution, normalized: &[bool]) -> Result<String> {
        match self.pool.get(id).context(IrSnafu)? {
            Term::Var(v) => Ok(match self.binding(*v, rule, resolution, normalized) {
                Some((value, true)) => format!("rewrite({value})"),
                Some((value, false)) => value,
                None => format!("rewrite(RT.make_var(RT.ctx, {}u))", v.index()),
            }),
            Term::App { head: Head::Op(op), args } => {
                let n = args.len();
                if self.table.get(*op).and_then(|s| s.for_arity(n)).is_some() {
                    let mut mask = 0u32;
                    let mut params = Vec::with_capacity(n);
                    for (i, &arg) in args.iter().enumerate() {
                        let raw = match self.pool.term(arg) {
                            Term::Var(v) => self.binding(*v, rule, resolution, normalized).filter(|(_, raw)| *raw),
                            Term::App { .. } => None,
                        };
                        match raw {
                            Some((value, _)) => params.push(value),
                            None => {
                                params.push(self.term_expr(arg, rule, resolution, normalized)?);
                                if n <= MASKED_POSITIONS {
                                    mask |= 1 << i;
                                }
                            }
                        }
                    }
                    Ok(format!("{}({})", routine_name(*op, n, mask), params.join(", ")))
                } else {
                    let params = self.args_expr(args, rule, resolution, normalized)?;
                    Ok(format!("RT.make_app(RT.ctx, {}u, {n}u, {})", op.index(), term_array(&params)))
                }
            }
            Term::App { head: Head::Var(v), args } => {
                let n = args.len();
                let params = term_array(&self.args_expr(args, rule, resolution, normalized)?);
                Ok(match self.binding(*v, rule, resolution, normalized) {
                    Some((value, raw)) => {
                        let head = if raw { format!("rewrite({value})") } else { value };
                        format!("rewrite(RT.compose(RT.ctx, {head}, {n}u, {params}))")
                    }
                    None => format!("rewrite(RT.make_var_app(RT.ctx, {}u, {n}u, {params}))", v.index()),
                })
            }
        }
    }

    fn args_expr(&self, args: &[TermId], rule: &Rule, resolution: &Resolution, normalized: &[bool]) -> Result<Vec<String>> {
        args.iter().map(|&a| self.term_expr(a, rule, resolution, normalized)).collect()
    }
}
