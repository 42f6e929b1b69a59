//! Linear encoding of rule patterns.
//!
//! A match sequence walks the argument list of a left-hand side in preorder:
//!
//! ```text
//! count(e, insert(e, rest))
//!   Store(e) Next Function(insert/2) Match(e) Next Store(rest) Up Result
//! ```
//!
//! `Function` descends into the tested application on success, `Next` moves
//! to the following sibling and `Up` returns to the enclosing level.

use std::fmt;

use innerc_ir::{Head, OpId, Term, TermPool, VarId};

use crate::Rule;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Bind the current term to a variable seen for the first time.
    Store(VarId),
    /// Compare the current term with the binding of a variable seen before.
    Match(VarId),
    /// Test head symbol and argument count, then descend into the arguments.
    Function { op: OpId, arity: usize },
    Next,
    Up,
    /// Pattern fully matched.
    Result(Outcome),
}

/// What a completed match yields: the rule and the variables it consults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Declaration rank of the rule.
    pub rule: usize,
    pub condition_vars: Vec<VarId>,
    pub rhs_vars: Vec<VarId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    steps: Vec<Step>,
    /// Number of distinct pattern variables.
    variables: usize,
}

impl Sequence {
    pub fn new(pool: &TermPool, rule: &Rule) -> Self {
        let mut builder = SequenceBuilder { pool, steps: Vec::new(), stored: Vec::new() };
        for (i, &arg) in rule.args().iter().enumerate() {
            if i > 0 {
                builder.steps.push(Step::Next);
            }
            builder.encode(arg);
        }
        let outcome = Outcome {
            rule: rule.priority(),
            condition_vars: rule.condition().map(|c| pool.variables(c)).unwrap_or_default(),
            rhs_vars: pool.variables(rule.rhs()),
        };
        builder.steps.push(Step::Result(outcome));
        Self { variables: builder.stored.len(), steps: builder.steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn variables(&self) -> usize {
        self.variables
    }

    pub fn outcome(&self) -> &Outcome {
        match self.steps.last() {
            Some(Step::Result(outcome)) => outcome,
            _ => unreachable!("sequence always ends with a result"),
        }
    }
}

struct SequenceBuilder<'a> {
    pool: &'a TermPool,
    steps: Vec<Step>,
    stored: Vec<VarId>,
}

impl SequenceBuilder<'_> {
    fn encode(&mut self, term: innerc_ir::TermId) {
        match self.pool.term(term) {
            Term::Var(v) if self.stored.contains(v) => self.steps.push(Step::Match(*v)),
            Term::Var(v) => {
                self.stored.push(*v);
                self.steps.push(Step::Store(*v));
            }
            Term::App { head: Head::Op(op), args } => {
                self.steps.push(Step::Function { op: *op, arity: args.len() });
                for (i, &arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.steps.push(Step::Next);
                    }
                    self.encode(arg);
                }
                self.steps.push(Step::Up);
            }
            // Rejected by validation before rules are built.
            Term::App { head: Head::Var(_), .. } => unreachable!("variable head in pattern"),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(v) => write!(f, "S({v})"),
            Self::Match(v) => write!(f, "M({v})"),
            Self::Function { op, arity } => write!(f, "F({op}/{arity})"),
            Self::Next => write!(f, "N"),
            Self::Up => write!(f, "U"),
            Self::Result(outcome) => write!(f, "R(rule{})", outcome.rule),
        }
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}
