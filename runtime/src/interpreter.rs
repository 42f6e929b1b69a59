//! Tree-walking rewrite backend.
//!
//! Executes the same strategies and decision trees the code generator
//! compiles, directly on the term pool. Semantics match the generated code
//! step for step: arguments are normalized when a strategy asks for it, tree
//! slots hold subterms, and a rule's right-hand side is built bottom-up with
//! nested calls dispatched straight to the callee's strategy. A rule shorter
//! than the call has the remaining arguments applied to its result.
//!
//! # Pool Context
//!
//! The pool is passed at rewrite time rather than owned, so one interpreter
//! borrows the strategy table and substitution while the caller keeps
//! ownership of the terms.

use smallvec::SmallVec;
use tracing::trace;

use innerc_ir::{FunctionSymbol, Head, OpId, Result, Term, TermId, TermPool, VarId};
use innerc_schedule::{ArityStrategy, MatchTree, Resolution, Rule, StrategyStep, StrategyTable};

use crate::Substitution;

type Args = SmallVec<[TermId; 4]>;

/// Cursor into the call being matched: a root argument index plus the
/// (parent, index) frames entered by function tests.
struct Cursor {
    root: usize,
    frames: Vec<(TermId, usize)>,
}

impl Cursor {
    fn current(&self, pool: &TermPool, args: &[TermId]) -> TermId {
        match self.frames.last() {
            Some(&(parent, index)) => pool.args(parent)[index],
            None => args[self.root],
        }
    }

    fn next(&mut self) {
        match self.frames.last_mut() {
            Some((_, index)) => *index += 1,
            None => self.root += 1,
        }
    }
}

/// State of one committed rule while its right-hand side is built.
struct Instance<'r> {
    rule: &'r Rule,
    resolution: &'r Resolution,
    slots: &'r [Option<TermId>],
    normalized: &'r [bool],
}

impl Instance<'_> {
    /// Bound value of `var` and whether it may still be unnormalized.
    fn binding(&self, pool: &TermPool, var: VarId) -> Option<(TermId, bool)> {
        let value = self.slots.get(self.resolution.slot_of(var)?).copied().flatten()?;
        let raw = (0..self.rule.arity()).any(|i| !self.normalized[i] && self.rule.variable_at(pool, i) == Some(var));
        Some((value, raw))
    }
}

pub struct Interpreter<'a> {
    table: &'a StrategyTable,
    substitution: &'a Substitution,
}

impl<'a> Interpreter<'a> {
    pub fn new(table: &'a StrategyTable, substitution: &'a Substitution) -> Self {
        Self { table, substitution }
    }

    /// Normal form of `t`.
    pub fn rewrite(&self, pool: &mut TermPool, t: TermId) -> Result<TermId> {
        match pool.get(t)?.clone() {
            Term::Var(v) => Ok(self.substitution.get(v).unwrap_or(t)),
            Term::App { head: Head::Op(op), args } => {
                let normalized = SmallVec::from_elem(false, args.len());
                self.call(pool, op, args, normalized)
            }
            Term::App { head: Head::Var(v), args } => match self.substitution.get(v) {
                Some(bound) => {
                    let composed = pool.compose(bound, &args)?;
                    self.rewrite(pool, composed)
                }
                None => {
                    let args = self.rewrite_all(pool, &args)?;
                    pool.app(Head::Var(v), &args)
                }
            },
        }
    }

    fn rewrite_all(&self, pool: &mut TermPool, args: &[TermId]) -> Result<Args> {
        args.iter().map(|&a| self.rewrite(pool, a)).collect()
    }

    /// Rewrite `op(args)` where `normalized[i]` marks arguments already in normal form.
    fn call(&self, pool: &mut TermPool, op: OpId, args: Args, normalized: SmallVec<[bool; 4]>) -> Result<TermId> {
        match self.table.get(op).and_then(|s| s.for_arity(args.len())) {
            Some(strategy) => self.apply(pool, op, strategy, args, normalized),
            None => {
                let mut args = args;
                for (arg, done) in args.iter_mut().zip(&normalized) {
                    if !done {
                        *arg = self.rewrite(pool, *arg)?;
                    }
                }
                pool.app(Head::Op(op), &args)
            }
        }
    }

    fn apply(
        &self,
        pool: &mut TermPool,
        op: OpId,
        strategy: &ArityStrategy,
        mut args: Args,
        mut normalized: SmallVec<[bool; 4]>,
    ) -> Result<TermId> {
        for step in strategy.steps() {
            match step {
                StrategyStep::Normalize(i) => {
                    if !normalized[*i] {
                        args[*i] = self.rewrite(pool, args[*i])?;
                        normalized[*i] = true;
                    }
                }
                StrategyStep::Tree(tree) => {
                    if let Some(result) = self.run_tree(pool, strategy, tree, &args, &normalized)? {
                        return Ok(result);
                    }
                }
            }
        }
        for (arg, done) in args.iter_mut().zip(&normalized) {
            if !done {
                *arg = self.rewrite(pool, *arg)?;
            }
        }
        pool.app(Head::Op(op), &args)
    }

    fn run_tree(
        &self,
        pool: &mut TermPool,
        strategy: &ArityStrategy,
        tree: &MatchTree,
        args: &[TermId],
        normalized: &[bool],
    ) -> Result<Option<TermId>> {
        let mut slots = vec![None; tree.slots()];
        let mut cursor = Cursor { root: 0, frames: Vec::new() };
        let mut node = tree;
        loop {
            node = match node {
                MatchTree::Store { slot, then } => {
                    slots[*slot] = Some(cursor.current(pool, args));
                    then
                }
                MatchTree::Match { slot, then, otherwise } => {
                    if slots[*slot] == Some(cursor.current(pool, args)) { then } else { otherwise }
                }
                MatchTree::Function { op, arity, then, otherwise } => {
                    let current = cursor.current(pool, args);
                    if pool.head(current) == Some(Head::Op(*op)) && pool.args(current).len() == *arity {
                        cursor.frames.push((current, 0));
                        then
                    } else {
                        otherwise
                    }
                }
                MatchTree::Next(then) => {
                    cursor.next();
                    then
                }
                MatchTree::Up(then) => {
                    cursor.frames.pop();
                    then
                }
                MatchTree::Check { resolution, otherwise } => {
                    let Some(rule) = strategy.rule(resolution.rule) else { return Ok(None) };
                    let instance = Instance { rule, resolution, slots: &slots, normalized };
                    let holds = match rule.condition() {
                        Some(condition) => {
                            let value = self.instantiate(pool, &instance, condition)?;
                            Some(value) == true_term(pool)?
                        }
                        None => true,
                    };
                    if holds {
                        trace!(rule = resolution.rule, "conditional rule applies");
                        let value = self.instantiate(pool, &instance, rule.rhs())?;
                        return self.apply_rest(pool, rule, value, args).map(Some);
                    }
                    otherwise
                }
                MatchTree::Return(resolution) => {
                    let Some(rule) = strategy.rule(resolution.rule) else { return Ok(None) };
                    trace!(rule = resolution.rule, "rule applies");
                    let instance = Instance { rule, resolution, slots: &slots, normalized };
                    let value = self.instantiate(pool, &instance, rule.rhs())?;
                    return self.apply_rest(pool, rule, value, args).map(Some);
                }
                MatchTree::Fail => return Ok(None),
            };
        }
    }

    /// Normal form of `value` applied to the call arguments `rule` left unmatched.
    fn apply_rest(&self, pool: &mut TermPool, rule: &Rule, value: TermId, args: &[TermId]) -> Result<TermId> {
        let rest = &args[rule.arity()..];
        if rest.is_empty() {
            return Ok(value);
        }
        let applied = pool.compose(value, rest)?;
        self.rewrite(pool, applied)
    }

    /// Normal form of the instance of `id` under the bindings of `instance`.
    fn instantiate(&self, pool: &mut TermPool, instance: &Instance<'_>, id: TermId) -> Result<TermId> {
        match pool.get(id)?.clone() {
            Term::Var(v) => match instance.binding(pool, v) {
                Some((value, true)) => self.rewrite(pool, value),
                Some((value, false)) => Ok(value),
                None => {
                    let var = pool.var(v);
                    self.rewrite(pool, var)
                }
            },
            Term::App { head: Head::Op(op), args } => {
                let mut values = Args::with_capacity(args.len());
                let mut normalized = SmallVec::with_capacity(args.len());
                for &arg in &args {
                    let raw = match pool.term(arg) {
                        Term::Var(v) => instance.binding(pool, *v).filter(|&(_, raw)| raw),
                        Term::App { .. } => None,
                    };
                    match raw {
                        Some((value, _)) => {
                            values.push(value);
                            normalized.push(false);
                        }
                        None => {
                            values.push(self.instantiate(pool, instance, arg)?);
                            normalized.push(true);
                        }
                    }
                }
                self.call(pool, op, values, normalized)
            }
            Term::App { head: Head::Var(v), args } => {
                let mut values = Args::with_capacity(args.len());
                for &arg in &args {
                    values.push(self.instantiate(pool, instance, arg)?);
                }
                let built = match instance.binding(pool, v) {
                    Some((value, raw)) => {
                        let head = if raw { self.rewrite(pool, value)? } else { value };
                        pool.compose(head, &values)?
                    }
                    None => pool.app(Head::Var(v), &values)?,
                };
                self.rewrite(pool, built)
            }
        }
    }
}

/// The `true` constant, if the pool knows it.
fn true_term(pool: &mut TermPool) -> Result<Option<TermId>> {
    match pool.symbols().lookup_op(&FunctionSymbol::true_()) {
        Some(op) => pool.app(Head::Op(op), &[]).map(Some),
        None => Ok(None),
    }
}
