//! Function symbols, variables and their dense numbering.
//!
//! Both are interned into a [`SymbolTable`] on first encounter. Interning is
//! idempotent: the same symbol always yields the same id for the lifetime of
//! the table, and the table is owned by one rewriter instance.

use std::collections::HashMap;
use std::fmt;

use crate::Sort;

/// Dense operator number assigned on first use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("op{_0}")]
pub struct OpId(pub u32);

/// Dense variable number assigned on first use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("var{_0}")]
pub struct VarId(pub u32);

impl OpId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl VarId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A named operator together with its sort.
///
/// Overloading is allowed: `plus: Nat # Nat -> Nat` and `plus: Int # Int -> Int`
/// are different symbols.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionSymbol {
    name: String,
    sort: Sort,
}

impl FunctionSymbol {
    pub fn new(name: impl Into<String>, sort: Sort) -> Self {
        Self { name: name.into(), sort }
    }

    /// `true: Bool`, the value a condition must rewrite to.
    pub fn true_() -> Self {
        Self::new("true", Sort::bool())
    }

    /// `false: Bool`.
    pub fn false_() -> Self {
        Self::new("false", Sort::bool())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    pub fn arity(&self) -> usize {
        self.sort.arity()
    }
}

impl fmt::Display for FunctionSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    name: String,
    sort: Sort,
}

impl Variable {
    pub fn new(name: impl Into<String>, sort: Sort) -> Self {
        Self { name: name.into(), sort }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.sort)
    }
}

/// Operator and variable numbering owned by one rewriter instance.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    ops: Vec<FunctionSymbol>,
    op_ids: HashMap<FunctionSymbol, OpId>,
    vars: Vec<Variable>,
    var_ids: HashMap<Variable, VarId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern_op(&mut self, symbol: &FunctionSymbol) -> OpId {
        if let Some(&id) = self.op_ids.get(symbol) {
            return id;
        }
        let id = OpId(self.ops.len() as u32);
        self.ops.push(symbol.clone());
        self.op_ids.insert(symbol.clone(), id);
        id
    }

    pub fn intern_var(&mut self, variable: &Variable) -> VarId {
        if let Some(&id) = self.var_ids.get(variable) {
            return id;
        }
        let id = VarId(self.vars.len() as u32);
        self.vars.push(variable.clone());
        self.var_ids.insert(variable.clone(), id);
        id
    }

    pub fn lookup_op(&self, symbol: &FunctionSymbol) -> Option<OpId> {
        self.op_ids.get(symbol).copied()
    }

    pub fn lookup_var(&self, variable: &Variable) -> Option<VarId> {
        self.var_ids.get(variable).copied()
    }

    pub fn op(&self, id: OpId) -> &FunctionSymbol {
        &self.ops[id.index()]
    }

    pub fn var(&self, id: VarId) -> &Variable {
        &self.vars[id.index()]
    }

    pub fn op_arity(&self, id: OpId) -> usize {
        self.ops[id.index()].arity()
    }

    pub fn num_ops(&self) -> usize {
        self.ops.len()
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn ops(&self) -> impl Iterator<Item = (OpId, &FunctionSymbol)> {
        self.ops.iter().enumerate().map(|(i, s)| (OpId(i as u32), s))
    }
}
