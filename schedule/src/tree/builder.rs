//! Merging match sequences into one decision tree.
//!
//! All sequences advance together over the same cursor. At every point the
//! builder groups the sequences by the step they want to perform: stores
//! first, then equality matches, then function tests. Sequences that are done
//! with the current term wait on a per-level list until the shared cursor
//! moves on (`Next`) or returns to their level (`Up`). The levels form an
//! explicit stack owned by the current branch of the build.
//!
//! A sequence that reaches its result is only committed when no sequence of
//! an earlier-declared rule is still pending on that branch; until then it is
//! held back, so the first declared rule wins whenever several match.

use std::mem;

use innerc_ir::VarId;
use tracing::trace;

use super::{MatchTree, Resolution, Slot};
use crate::sequence::{Outcome, Sequence, Step};

/// A sequence together with its progress and the slots it has bound.
#[derive(Debug, Clone)]
struct Cursor {
    seq: usize,
    pos: usize,
    bindings: Vec<(VarId, Slot)>,
}

impl Cursor {
    fn slot_of(&self, var: VarId) -> Option<Slot> {
        self.bindings.iter().find(|(v, _)| *v == var).map(|&(_, s)| s)
    }
}

/// A completed sequence waiting for its turn.
#[derive(Debug, Clone)]
struct Ready {
    rule: usize,
    conditional: bool,
    resolution: Resolution,
}

#[derive(Debug, Clone)]
struct Frontier {
    store: Vec<Cursor>,
    matching: Vec<Cursor>,
    function: Vec<Cursor>,
    /// Passed a function test at the current term, about to enter its arguments.
    descend: Vec<Cursor>,
    /// Per level, the sequences waiting for the cursor to reach their next sibling.
    levels: Vec<Vec<Cursor>>,
    ready: Vec<Ready>,
}

impl Frontier {
    fn pending(&self) -> impl Iterator<Item = &Cursor> {
        self.store
            .iter()
            .chain(&self.matching)
            .chain(&self.function)
            .chain(&self.descend)
            .chain(self.levels.iter().flatten())
    }
}

/// Builds one [`MatchTree`] from the sequences of one operator and arity.
pub struct TreeBuilder<'a> {
    sequences: &'a [Sequence],
    conditional: Vec<bool>,
    /// Per slot, how often the subtree built under its `Store` consults it.
    usage: Vec<usize>,
}

impl<'a> TreeBuilder<'a> {
    /// `conditional[i]` tells whether the rule of `sequences[i]` has a condition.
    pub fn new(sequences: &'a [Sequence], conditional: Vec<bool>) -> Self {
        let slots = sequences.iter().map(Sequence::variables).sum();
        Self { sequences, conditional, usage: vec![0; slots] }
    }

    pub fn build(mut self) -> MatchTree {
        let mut frontier = Frontier {
            store: Vec::new(),
            matching: Vec::new(),
            function: Vec::new(),
            descend: Vec::new(),
            levels: vec![Vec::new()],
            ready: Vec::new(),
        };
        for seq in 0..self.sequences.len() {
            self.activate(&mut frontier, Cursor { seq, pos: 0, bindings: Vec::new() });
        }
        self.build_tree(frontier, 0)
    }

    fn step(&self, cursor: &Cursor) -> &'a Step {
        &self.sequences[cursor.seq].steps()[cursor.pos]
    }

    fn priority(&self, cursor: &Cursor) -> usize {
        self.sequences[cursor.seq].outcome().rule
    }

    /// Place a cursor whose next step applies to the current term.
    fn activate(&self, frontier: &mut Frontier, cursor: Cursor) {
        match self.step(&cursor) {
            Step::Store(_) => frontier.store.push(cursor),
            Step::Match(_) => frontier.matching.push(cursor),
            Step::Function { .. } => frontier.function.push(cursor),
            Step::Next | Step::Up | Step::Result(_) => {
                let depth = frontier.levels.len() - 1;
                self.settle(frontier, cursor, depth);
            }
        }
    }

    /// Park a cursor that is done with the current term at level `depth`.
    fn settle(&self, frontier: &mut Frontier, mut cursor: Cursor, mut depth: usize) {
        loop {
            match self.step(&cursor) {
                Step::Next => {
                    cursor.pos += 1;
                    frontier.levels[depth].push(cursor);
                    return;
                }
                Step::Up => {
                    cursor.pos += 1;
                    depth -= 1;
                }
                Step::Result(outcome) => {
                    frontier.ready.push(self.resolve(&cursor, outcome));
                    return;
                }
                Step::Store(_) | Step::Match(_) | Step::Function { .. } => {
                    unreachable!("sequence steps on a term before moving to it")
                }
            }
        }
    }

    fn resolve(&self, cursor: &Cursor, outcome: &Outcome) -> Ready {
        let mut bindings = Vec::new();
        for &var in outcome.condition_vars.iter().chain(&outcome.rhs_vars) {
            if let Some(slot) = cursor.slot_of(var)
                && !bindings.contains(&(var, slot))
            {
                bindings.push((var, slot));
            }
        }
        Ready {
            rule: outcome.rule,
            conditional: self.conditional[cursor.seq],
            resolution: Resolution { rule: outcome.rule, bindings },
        }
    }

    fn consult(&mut self, slot: Slot) {
        if slot >= self.usage.len() {
            self.usage.resize(slot + 1, 0);
        }
        self.usage[slot] += 1;
    }

    fn build_tree(&mut self, mut frontier: Frontier, next_slot: Slot) -> MatchTree {
        // Commit the best completed rule unless an earlier rule may still match.
        frontier.ready.sort_by_key(|r| r.rule);
        let earliest_pending = frontier.pending().map(|c| self.priority(c)).min();
        if let Some(first) = frontier.ready.first()
            && earliest_pending.is_none_or(|p| first.rule < p)
        {
            let first = frontier.ready.remove(0);
            for &(_, slot) in &first.resolution.bindings {
                self.consult(slot);
            }
            if !first.conditional {
                return MatchTree::Return(first.resolution);
            }
            let otherwise = self.build_tree(frontier, next_slot);
            return MatchTree::Check { resolution: first.resolution, otherwise: Box::new(otherwise) };
        }
        if earliest_pending.is_none() {
            return MatchTree::Fail;
        }

        if !frontier.store.is_empty() {
            let slot = next_slot;
            if slot >= self.usage.len() {
                self.usage.resize(slot + 1, 0);
            }
            self.usage[slot] = 0;
            let depth = frontier.levels.len() - 1;
            for mut cursor in mem::take(&mut frontier.store) {
                let Step::Store(var) = self.step(&cursor) else { unreachable!("store list holds stores") };
                cursor.bindings.push((*var, slot));
                cursor.pos += 1;
                self.settle(&mut frontier, cursor, depth);
            }
            let then = self.build_tree(frontier, next_slot + 1);
            if self.usage[slot] == 0 {
                trace!(slot, "store elided");
                return then;
            }
            return MatchTree::Store { slot, then: Box::new(then) };
        }

        if !frontier.matching.is_empty() {
            let slot_of = |c: &Cursor| match self.step(c) {
                Step::Match(var) => c.slot_of(*var),
                _ => None,
            };
            let slot = slot_of(&frontier.matching[0]);
            let (hit, rest): (Vec<_>, Vec<_>) =
                mem::take(&mut frontier.matching).into_iter().partition(|c| slot_of(c) == slot);
            let Some(slot) = slot else { unreachable!("matched variable was stored earlier") };
            frontier.matching = rest;

            let otherwise = self.build_tree(frontier.clone(), next_slot);
            let depth = frontier.levels.len() - 1;
            for mut cursor in hit {
                cursor.pos += 1;
                self.settle(&mut frontier, cursor, depth);
            }
            let then = self.build_tree(frontier, next_slot);
            if then == otherwise {
                return then;
            }
            self.consult(slot);
            return MatchTree::Match { slot, then: Box::new(then), otherwise: Box::new(otherwise) };
        }

        if !frontier.function.is_empty() {
            let Step::Function { op, arity } = *self.step(&frontier.function[0]) else {
                unreachable!("function list holds function tests")
            };
            let (hit, rest): (Vec<_>, Vec<_>) = mem::take(&mut frontier.function)
                .into_iter()
                .partition(|c| *self.step(c) == Step::Function { op, arity });

            let mut missed = frontier.clone();
            missed.function = rest;
            let otherwise = self.build_tree(missed, next_slot);

            frontier.descend = hit
                .into_iter()
                .map(|mut c| {
                    c.pos += 1;
                    c
                })
                .collect();
            let then = self.build_tree(frontier, next_slot);
            if then == otherwise {
                return then;
            }
            return MatchTree::Function { op, arity, then: Box::new(then), otherwise: Box::new(otherwise) };
        }

        if !frontier.descend.is_empty() {
            frontier.levels.push(Vec::new());
            for cursor in mem::take(&mut frontier.descend) {
                self.activate(&mut frontier, cursor);
            }
            return self.build_tree(frontier, next_slot);
        }

        let Some(top) = frontier.levels.last_mut() else {
            return MatchTree::Fail;
        };
        if top.is_empty() {
            if frontier.levels.len() == 1 {
                return MatchTree::Fail;
            }
            frontier.levels.pop();
            return MatchTree::Up(Box::new(self.build_tree(frontier, next_slot)));
        }
        for cursor in mem::take(top) {
            self.activate(&mut frontier, cursor);
        }
        MatchTree::Next(Box::new(self.build_tree(frontier, next_slot)))
    }
}
