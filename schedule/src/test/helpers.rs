//! Test utilities for scheduling tests.

use innerc_ir::{DataEquation, DataSpecification, FunctionSymbol, Head, OpId, TermId, TermPool};

use crate::{MatchTree, RuleSet, StrategyTable};

/// A specification taken through rule collection and strategy construction.
pub struct Scheduled {
    pub pool: TermPool,
    pub rules: RuleSet,
    pub table: StrategyTable,
}

impl Scheduled {
    pub fn new(spec: &DataSpecification) -> Self {
        let mut pool = TermPool::new();
        let rules = RuleSet::from_specification(&mut pool, spec).expect("specification should schedule");
        let table = StrategyTable::build(&pool, &rules);
        Self { pool, rules, table }
    }

    pub fn op(&self, symbol: &FunctionSymbol) -> OpId {
        self.pool.symbols().lookup_op(symbol).expect("symbol should be interned")
    }
}

/// Specification with the signature of `base` and only `equations`.
pub fn with_equations(base: &DataSpecification, equations: Vec<DataEquation>) -> DataSpecification {
    let mut spec = DataSpecification::new();
    for sort in base.sorts() {
        spec.add_sort(sort.clone());
    }
    for c in base.constructors() {
        spec.add_constructor(c.clone());
    }
    for m in base.mappings() {
        spec.add_mapping(m.clone());
    }
    for eq in equations {
        spec.add_equation(eq);
    }
    spec
}

/// Rank of the rule `tree` commits to for a call with arguments `args`.
///
/// Conditions are taken to hold.
pub fn decide(pool: &TermPool, tree: &MatchTree, args: &[TermId]) -> Option<usize> {
    let mut slots = vec![None; tree.slots()];
    // (parent, index); no parent means the call itself
    let mut frames: Vec<(Option<TermId>, usize)> = vec![(None, 0)];
    let current = |frames: &[(Option<TermId>, usize)]| match frames.last() {
        Some(&(Some(parent), index)) => pool.args(parent)[index],
        Some(&(None, index)) => args[index],
        None => unreachable!("root frame is never popped"),
    };
    let mut node = tree;
    loop {
        node = match node {
            MatchTree::Store { slot, then } => {
                slots[*slot] = Some(current(&frames));
                then
            }
            MatchTree::Match { slot, then, otherwise } => {
                if slots[*slot] == Some(current(&frames)) { then } else { otherwise }
            }
            MatchTree::Function { op, arity, then, otherwise } => {
                let term = current(&frames);
                if pool.head(term) == Some(Head::Op(*op)) && pool.args(term).len() == *arity {
                    frames.push((Some(term), 0));
                    then
                } else {
                    otherwise
                }
            }
            MatchTree::Next(then) => {
                if let Some((_, index)) = frames.last_mut() {
                    *index += 1;
                }
                then
            }
            MatchTree::Up(then) => {
                frames.pop();
                then
            }
            MatchTree::Check { resolution, .. } | MatchTree::Return(resolution) => return Some(resolution.rule),
            MatchTree::Fail => return None,
        };
    }
}
