//! Public term representation.
//!
//! [`DataExpr`] is what front-ends hand to the rewriter and what they get
//! back. Applications may be nested (`f(a)(b)`); the internal format flattens
//! them, see [`crate::TermPool::to_internal`].

use std::fmt;

use crate::error::{IllSortedSnafu, NotAFunctionSnafu};
use crate::{FunctionSymbol, Result, Sort, Variable};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataExpr {
    Variable(Variable),
    Function(FunctionSymbol),
    Application { head: Box<DataExpr>, args: Vec<DataExpr> },
}

impl DataExpr {
    pub fn var(variable: &Variable) -> Self {
        Self::Variable(variable.clone())
    }

    pub fn func(symbol: &FunctionSymbol) -> Self {
        Self::Function(symbol.clone())
    }

    /// Apply `head` to `args`; an empty argument list yields `head` itself.
    pub fn apply(head: DataExpr, args: Vec<DataExpr>) -> Self {
        if args.is_empty() {
            return head;
        }
        Self::Application { head: Box::new(head), args }
    }

    /// Apply a function symbol to `args`.
    pub fn call(symbol: &FunctionSymbol, args: Vec<DataExpr>) -> Self {
        Self::apply(Self::func(symbol), args)
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    /// Innermost head and the flattened argument list.
    pub fn spine(&self) -> (&DataExpr, Vec<&DataExpr>) {
        match self {
            Self::Application { head, args } => {
                let (h, mut all) = head.spine();
                all.extend(args.iter());
                (h, all)
            }
            other => (other, Vec::new()),
        }
    }

    /// Distinct variables in order of first occurrence, including variable heads.
    pub fn variables(&self) -> Vec<Variable> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables(&self, out: &mut Vec<Variable>) {
        match self {
            Self::Variable(v) => {
                if !out.contains(v) {
                    out.push(v.clone());
                }
            }
            Self::Function(_) => {}
            Self::Application { head, args } => {
                head.collect_variables(out);
                for a in args {
                    a.collect_variables(out);
                }
            }
        }
    }

    /// Infer the sort of this expression, checking argument sorts on the way.
    pub fn sort(&self) -> Result<Sort> {
        match self {
            Self::Variable(v) => Ok(v.sort().clone()),
            Self::Function(f) => Ok(f.sort().clone()),
            Self::Application { head, args } => {
                let head_sort = head.sort()?;
                let expected = head_sort.argument_sorts();
                if args.len() > expected.len() {
                    return NotAFunctionSnafu { head: head.to_string(), sort: head_sort.clone(), actual: args.len() }
                        .fail();
                }
                for (position, (arg, want)) in args.iter().zip(expected.iter()).enumerate() {
                    let got = arg.sort()?;
                    if &got != *want {
                        return IllSortedSnafu {
                            head: head.to_string(),
                            position,
                            expected: (*want).clone(),
                            actual: got,
                        }
                        .fail();
                    }
                }
                // Length was checked above, so applying cannot overshoot.
                Ok(head_sort.applied(args.len()).unwrap_or(head_sort))
            }
        }
    }
}

impl fmt::Display for DataExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(v) => write!(f, "{}", v.name()),
            Self::Function(s) => write!(f, "{s}"),
            Self::Application { head, args } => {
                write!(f, "{head}(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, ")")
            }
        }
    }
}
