//! Rewrite rules in the internal term format.

use std::collections::BTreeMap;

use smallvec::SmallVec;
use snafu::ResultExt;
use tracing::debug;

use innerc_ir::{DataEquation, DataSpecification, Head, OpId, TermId, TermPool, VarId, valid_equations};

use crate::error::{IrSnafu, NotARuleSnafu, Result};

/// An equation oriented left to right, with its lhs split into head and arguments.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Declaration rank; lower ranks win when several rules match.
    priority: usize,
    op: OpId,
    args: SmallVec<[TermId; 4]>,
    condition: Option<TermId>,
    rhs: TermId,
    equation: DataEquation,
}

impl Rule {
    /// Convert a validated equation.
    pub fn from_equation(pool: &mut TermPool, priority: usize, equation: &DataEquation) -> Result<Self> {
        for variable in equation.variables() {
            pool.intern_var(variable);
        }
        let lhs = pool.to_internal(equation.lhs()).context(IrSnafu)?;
        let Some(Head::Op(op)) = pool.head(lhs) else {
            return NotARuleSnafu { equation: equation.to_string() }.fail();
        };
        if has_variable_head(pool, lhs) {
            return NotARuleSnafu { equation: equation.to_string() }.fail();
        }
        let args = SmallVec::from_slice(pool.args(lhs));
        let condition = equation.condition().map(|c| pool.to_internal(c)).transpose().context(IrSnafu)?;
        let rhs = pool.to_internal(equation.rhs()).context(IrSnafu)?;
        Ok(Self { priority, op, args, condition, rhs, equation: equation.clone() })
    }

    pub fn priority(&self) -> usize {
        self.priority
    }

    pub fn op(&self) -> OpId {
        self.op
    }

    /// Number of lhs arguments, which selects the call arity the rule applies to.
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    pub fn args(&self) -> &[TermId] {
        &self.args
    }

    pub fn condition(&self) -> Option<TermId> {
        self.condition
    }

    pub fn rhs(&self) -> TermId {
        self.rhs
    }

    pub fn equation(&self) -> &DataEquation {
        &self.equation
    }

    /// Variable at argument position `i`, if that argument is a bare variable.
    pub fn variable_at(&self, pool: &TermPool, i: usize) -> Option<VarId> {
        match pool.term(self.args[i]) {
            innerc_ir::Term::Var(v) => Some(*v),
            innerc_ir::Term::App { .. } => None,
        }
    }
}

fn has_variable_head(pool: &TermPool, term: TermId) -> bool {
    match pool.head(term) {
        None => false,
        Some(Head::Var(_)) => true,
        Some(Head::Op(_)) => pool.args(term).iter().any(|&a| has_variable_head(pool, a)),
    }
}

/// All rules of a specification, indexed by head operator.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    by_op: BTreeMap<OpId, Vec<Rule>>,
    next_priority: usize,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the valid equations of `spec`.
    ///
    /// Fails on a target-sort ambiguity; individual malformed equations are
    /// skipped with a warning.
    pub fn from_specification(pool: &mut TermPool, spec: &DataSpecification) -> Result<Self> {
        spec.check_sorts().context(IrSnafu)?;
        for symbol in spec.functions() {
            pool.intern_op(symbol);
        }
        let mut set = Self::new();
        for equation in valid_equations(spec.equations()) {
            set.push(pool, equation)?;
        }
        debug!(rules = set.len(), equations = spec.equations().len(), "rule set collected");
        Ok(set)
    }

    /// Append a rule with the lowest priority so far.
    pub fn push(&mut self, pool: &mut TermPool, equation: &DataEquation) -> Result<OpId> {
        let rule = Rule::from_equation(pool, self.next_priority, equation)?;
        self.next_priority += 1;
        let op = rule.op();
        self.by_op.entry(op).or_default().push(rule);
        Ok(op)
    }

    /// Remove every rule created from `equation`, returning the affected operator.
    pub fn remove(&mut self, equation: &DataEquation) -> Option<OpId> {
        let mut affected = None;
        for (op, rules) in &mut self.by_op {
            let before = rules.len();
            rules.retain(|r| r.equation() != equation);
            if rules.len() != before {
                affected = Some(*op);
            }
        }
        self.by_op.retain(|_, rules| !rules.is_empty());
        affected
    }

    /// Rules for `op` in priority order.
    pub fn for_op(&self, op: OpId) -> &[Rule] {
        self.by_op.get(&op).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn ops(&self) -> impl Iterator<Item = OpId> + '_ {
        self.by_op.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.by_op.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_op.is_empty()
    }
}
