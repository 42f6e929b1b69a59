//! Hash-consed internal terms.
//!
//! The compiled engine works on [`TermId`] handles into a [`TermPool`].
//! Structurally identical terms share one handle, so term equality is a
//! handle comparison, which is what `Match` nodes of the decision trees rely
//! on. Applications are flat: the head is an operator or a variable and the
//! argument list holds every argument of the (possibly curried) application.
//!
//! # Example
//!
//! ```rust
//! # use innerc_ir::{FunctionSymbol, Head, Sort, TermPool};
//! let nat = Sort::basic("Nat");
//! let zero = FunctionSymbol::new("0", nat.clone());
//! let succ = FunctionSymbol::new("s", Sort::arrow(vec![nat.clone()], nat));
//!
//! let mut pool = TermPool::new();
//! let z = pool.constant(&zero);
//! let s = pool.intern_op(&succ);
//! let one = pool.app(Head::Op(s), &[z]).unwrap();
//! assert_eq!(one, pool.app(Head::Op(s), &[z]).unwrap());
//! ```

use std::collections::HashMap;
use std::fmt;

use smallvec::SmallVec;

use crate::error::{ArityMismatchSnafu, UnknownTermSnafu};
use crate::{DataExpr, FunctionSymbol, OpId, Result, SymbolTable, VarId, Variable};

/// Handle of a term inside its [`TermPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TermId(pub u32);

impl TermId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Head {
    Op(OpId),
    Var(VarId),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Var(VarId),
    /// Application; constants are applications without arguments.
    /// A variable head always carries at least one argument.
    App { head: Head, args: SmallVec<[TermId; 4]> },
}

/// Arena of hash-consed terms plus the symbol numbering they refer to.
#[derive(Debug, Default)]
pub struct TermPool {
    symbols: SymbolTable,
    nodes: Vec<Term>,
    index: HashMap<Term, TermId>,
}

impl TermPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn intern_op(&mut self, symbol: &FunctionSymbol) -> OpId {
        self.symbols.intern_op(symbol)
    }

    pub fn intern_var(&mut self, variable: &Variable) -> VarId {
        self.symbols.intern_var(variable)
    }

    /// Number of distinct terms created so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn insert(&mut self, term: Term) -> TermId {
        if let Some(&id) = self.index.get(&term) {
            return id;
        }
        let id = TermId(self.nodes.len() as u32);
        self.nodes.push(term.clone());
        self.index.insert(term, id);
        id
    }

    pub fn var(&mut self, var: VarId) -> TermId {
        self.insert(Term::Var(var))
    }

    /// Intern `symbol` and return it as a constant (zero-argument application).
    pub fn constant(&mut self, symbol: &FunctionSymbol) -> TermId {
        let op = self.intern_op(symbol);
        self.insert(Term::App { head: Head::Op(op), args: SmallVec::new() })
    }

    /// Build `head(args...)`.
    ///
    /// Fails with [`crate::Error::ArityMismatch`] when an operator receives
    /// more arguments than its sort accepts. A variable head without
    /// arguments is the variable itself.
    pub fn app(&mut self, head: Head, args: &[TermId]) -> Result<TermId> {
        match head {
            Head::Op(op) => {
                let declared = self.symbols.op_arity(op);
                if args.len() > declared {
                    return ArityMismatchSnafu {
                        symbol: self.symbols.op(op).name().to_string(),
                        declared,
                        actual: args.len(),
                    }
                    .fail();
                }
            }
            Head::Var(v) if args.is_empty() => return Ok(self.var(v)),
            Head::Var(_) => {}
        }
        Ok(self.insert(Term::App { head, args: SmallVec::from_slice(args) }))
    }

    /// Append `extra` to the arguments of `partial`.
    ///
    /// Used when a variable bound to a partial application is itself applied:
    /// `x(a)` with `x := f(b)` becomes `f(b, a)`.
    pub fn compose(&mut self, partial: TermId, extra: &[TermId]) -> Result<TermId> {
        match self.get(partial)?.clone() {
            Term::Var(v) => self.app(Head::Var(v), extra),
            Term::App { head, args } => {
                let mut all: SmallVec<[TermId; 8]> = SmallVec::from_slice(&args);
                all.extend_from_slice(extra);
                self.app(head, &all)
            }
        }
    }

    pub fn get(&self, id: TermId) -> Result<&Term> {
        self.nodes.get(id.index()).ok_or_else(|| UnknownTermSnafu { handle: id.0 }.build())
    }

    /// Like [`TermPool::get`] for handles produced by this pool.
    ///
    /// # Panics
    ///
    /// Panics if `id` was created by a different pool.
    pub fn term(&self, id: TermId) -> &Term {
        &self.nodes[id.index()]
    }

    pub fn head(&self, id: TermId) -> Option<Head> {
        match self.term(id) {
            Term::Var(_) => None,
            Term::App { head, .. } => Some(*head),
        }
    }

    pub fn args(&self, id: TermId) -> &[TermId] {
        match self.term(id) {
            Term::Var(_) => &[],
            Term::App { args, .. } => args,
        }
    }

    /// Distinct variables of `id` in order of first occurrence, heads included.
    pub fn variables(&self, id: TermId) -> Vec<VarId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(t) = stack.pop() {
            match self.term(t) {
                Term::Var(v) => {
                    if !out.contains(v) {
                        out.push(*v);
                    }
                }
                Term::App { head, args } => {
                    if let Head::Var(v) = head
                        && !out.contains(v)
                    {
                        out.push(*v);
                    }
                    stack.extend(args.iter().rev());
                }
            }
        }
        out
    }

    /// Number of occurrences of `var` in `id`, heads included.
    pub fn occurrences(&self, id: TermId, var: VarId) -> usize {
        match self.term(id) {
            Term::Var(v) => usize::from(*v == var),
            Term::App { head, args } => {
                let own = usize::from(*head == Head::Var(var));
                own + args.iter().map(|&a| self.occurrences(a, var)).sum::<usize>()
            }
        }
    }

    /// Convert a public expression into the flat internal format.
    ///
    /// Symbols and variables met for the first time are interned.
    pub fn to_internal(&mut self, expr: &DataExpr) -> Result<TermId> {
        match expr {
            DataExpr::Variable(v) => {
                let id = self.intern_var(v);
                Ok(self.var(id))
            }
            DataExpr::Function(f) => Ok(self.constant(f)),
            DataExpr::Application { head, args } => {
                let head = self.to_internal(head)?;
                let args = args.iter().map(|a| self.to_internal(a)).collect::<Result<SmallVec<[TermId; 4]>>>()?;
                self.compose(head, &args)
            }
        }
    }

    /// Convert an internal term back to the public representation.
    pub fn from_internal(&self, id: TermId) -> Result<DataExpr> {
        match self.get(id)? {
            Term::Var(v) => Ok(DataExpr::var(self.symbols.var(*v))),
            Term::App { head, args } => {
                let head = match head {
                    Head::Op(op) => DataExpr::func(self.symbols.op(*op)),
                    Head::Var(v) => DataExpr::var(self.symbols.var(*v)),
                };
                let args = args.iter().map(|&a| self.from_internal(a)).collect::<Result<Vec<_>>>()?;
                Ok(DataExpr::apply(head, args))
            }
        }
    }

    /// Display adapter for logging internal terms.
    pub fn display(&self, id: TermId) -> TermDisplay<'_> {
        TermDisplay { pool: self, id }
    }
}

pub struct TermDisplay<'a> {
    pool: &'a TermPool,
    id: TermId,
}

impl fmt::Display for TermDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols = self.pool.symbols();
        match self.pool.term(self.id) {
            Term::Var(v) => write!(f, "{}", symbols.var(*v).name()),
            Term::App { head, args } => {
                match head {
                    Head::Op(op) => write!(f, "{}", symbols.op(*op))?,
                    Head::Var(v) => write!(f, "{}", symbols.var(*v).name())?,
                }
                if args.is_empty() {
                    return Ok(());
                }
                write!(f, "(")?;
                for (i, &a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", self.pool.display(a))?;
                }
                write!(f, ")")
            }
        }
    }
}
