//! Evaluation strategies.
//!
//! Innermost rewriting normalizes every argument before the call itself is
//! rewritten, but a rule only needs the arguments its pattern inspects. A
//! strategy interleaves "normalize argument i" with "try this group of
//! rules" so that arguments are normalized only when some rule needs them,
//! and a call matching an early rule never normalizes the arguments that rule
//! merely passes through.
//!
//! A call with `k` arguments consults every rule whose lhs has at most `k`
//! arguments. A rule with fewer arguments matches a prefix of the call, and
//! the arguments it does not cover are applied to its right-hand side.
//! Groups are declaration-order prefixes of the remaining rules, so a later
//! rule never runs before an earlier one got its chance.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use itertools::Itertools;
use tracing::{debug, trace};

use innerc_ir::{OpId, Term, TermPool};

use crate::tree::{MatchTree, TreeBuilder, TreeView};
use crate::{Rule, RuleSet, Sequence};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyStep {
    /// Rewrite argument `i` to normal form.
    Normalize(usize),
    /// Run the decision tree of the next group of rules.
    Tree(MatchTree),
}

/// Plan for calls of one operator with a fixed number of arguments.
///
/// After the last step every argument not yet normalized is normalized and
/// the application is rebuilt.
#[derive(Debug, Clone)]
pub struct ArityStrategy {
    arity: usize,
    steps: Vec<StrategyStep>,
    rules: Vec<Rule>,
}

impl ArityStrategy {
    pub fn build(pool: &TermPool, arity: usize, rules: &[Rule]) -> Self {
        debug_assert!(rules.iter().all(|r| r.arity() <= arity));
        let mut pending: Vec<(&Rule, Vec<bool>)> = rules
            .iter()
            .map(|r| {
                // Positions past the lhs are never inspected.
                let mut deps = dependencies(pool, r);
                deps.resize(arity, false);
                (r, deps)
            })
            .collect();
        let mut normalized = vec![false; arity];
        let mut steps = Vec::new();

        while !pending.is_empty() {
            let ready = pending
                .iter()
                .take_while(|(_, deps)| deps.iter().zip(&normalized).all(|(&need, &done)| !need || done))
                .count();
            if ready > 0 {
                let group: Vec<&Rule> = pending.drain(..ready).map(|(r, _)| r).collect();
                steps.push(StrategyStep::Tree(build_tree(pool, &group)));
                continue;
            }

            // The first pending rule is blocked; pick among its missing
            // positions the one most other rules also wait for.
            let (_, first) = &pending[0];
            let Some(position) = (0..arity)
                .filter(|&i| first[i] && !normalized[i])
                .min_by_key(|&i| (Reverse(pending.iter().filter(|(_, deps)| deps[i]).count()), i))
            else {
                break;
            };
            normalized[position] = true;
            steps.push(StrategyStep::Normalize(position));
        }

        Self { arity, steps, rules: rules.to_vec() }
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn steps(&self) -> &[StrategyStep] {
        &self.steps
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rule with the given declaration rank.
    pub fn rule(&self, priority: usize) -> Option<&Rule> {
        self.rules.iter().find(|r| r.priority() == priority)
    }

    /// Ranks of the rules reachable from some tree of this strategy.
    fn reachable(&self) -> impl Iterator<Item = usize> + '_ {
        self.steps
            .iter()
            .filter_map(|s| match s {
                StrategyStep::Tree(tree) => Some(tree.rules()),
                StrategyStep::Normalize(_) => None,
            })
            .flatten()
    }

    /// Rules reachable from some tree of this strategy.
    pub fn compiled_rules(&self) -> usize {
        self.reachable().unique().count()
    }
}

/// Argument positions that must be in normal form before `rule` can be tried.
///
/// A position is needed when its pattern is not a variable, or when its
/// variable is compared with another position, consulted by the condition,
/// or copied more than once by the right-hand side.
pub fn dependencies(pool: &TermPool, rule: &Rule) -> Vec<bool> {
    let args = rule.args();
    (0..args.len())
        .map(|i| match pool.term(args[i]) {
            Term::App { .. } => true,
            Term::Var(v) => {
                let in_lhs: usize = args.iter().map(|&a| pool.occurrences(a, *v)).sum();
                let in_condition = rule.condition().map_or(0, |c| pool.occurrences(c, *v));
                in_lhs > 1 || in_condition > 0 || pool.occurrences(rule.rhs(), *v) > 1
            }
        })
        .collect()
}

fn build_tree(pool: &TermPool, rules: &[&Rule]) -> MatchTree {
    let sequences: Vec<Sequence> = rules.iter().map(|r| Sequence::new(pool, r)).collect();
    for seq in &sequences {
        trace!(%seq, "match sequence");
    }
    let conditional = rules.iter().map(|r| r.condition().is_some()).collect();
    let tree = TreeBuilder::new(&sequences, conditional).build();
    trace!(tree = %TreeView::new(&tree, pool.symbols()).render(), "decision tree");
    tree
}

/// Strategies of one operator, per call arity some rule applies to.
///
/// Arities range from the shortest lhs up to the declared arity of the
/// operator; each strategy holds the rules not longer than its arity.
#[derive(Debug, Clone)]
pub struct Strategy {
    op: OpId,
    arities: BTreeMap<usize, ArityStrategy>,
}

impl Strategy {
    pub fn build(pool: &TermPool, op: OpId, rules: &[Rule]) -> Self {
        let ordered: Vec<Rule> = rules.iter().cloned().sorted_by_key(Rule::priority).collect();
        let declared = pool.symbols().op_arity(op);
        let arities = match ordered.iter().map(Rule::arity).min() {
            Some(shortest) => (shortest..=declared.max(shortest))
                .map(|arity| {
                    let applicable: Vec<Rule> = ordered.iter().filter(|r| r.arity() <= arity).cloned().collect();
                    (arity, ArityStrategy::build(pool, arity, &applicable))
                })
                .collect::<BTreeMap<_, _>>(),
            None => BTreeMap::new(),
        };
        debug!(
            op = pool.symbols().op(op).name(),
            arities = ?arities.keys().collect::<Vec<_>>(),
            rules = rules.len(),
            "strategy built"
        );
        Self { op, arities }
    }

    pub fn op(&self) -> OpId {
        self.op
    }

    pub fn for_arity(&self, arity: usize) -> Option<&ArityStrategy> {
        self.arities.get(&arity)
    }

    pub fn arities(&self) -> impl Iterator<Item = &ArityStrategy> {
        self.arities.values()
    }

    /// Distinct rules reachable from the strategy of some arity.
    pub fn compiled_rules(&self) -> usize {
        self.arities.values().flat_map(|a| a.reachable()).unique().count()
    }
}

/// Strategies for every operator that has rules.
#[derive(Debug, Clone, Default)]
pub struct StrategyTable {
    by_op: BTreeMap<OpId, Strategy>,
}

impl StrategyTable {
    pub fn build(pool: &TermPool, rules: &RuleSet) -> Self {
        let by_op = rules.ops().map(|op| (op, Strategy::build(pool, op, rules.for_op(op)))).collect();
        Self { by_op }
    }

    pub fn get(&self, op: OpId) -> Option<&Strategy> {
        self.by_op.get(&op)
    }

    /// Rebuild the strategy of `op` after its rules changed.
    pub fn refresh(&mut self, pool: &TermPool, rules: &RuleSet, op: OpId) {
        let op_rules = rules.for_op(op);
        if op_rules.is_empty() {
            self.by_op.remove(&op);
        } else {
            self.by_op.insert(op, Strategy::build(pool, op, op_rules));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Strategy> {
        self.by_op.values()
    }

    /// Highest call arity any strategy handles.
    pub fn max_arity(&self) -> usize {
        self.by_op.values().flat_map(|s| s.arities.keys().copied()).max().unwrap_or(0)
    }
}
