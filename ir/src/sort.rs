//! Sorts of the term algebra.
//!
//! Function sorts may be nested (`A -> (B # C -> D)`); the arity of an
//! operator counts the arguments of every nested arrow, which is how curried
//! applications are flattened into one argument list.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sort {
    /// A named sort such as `Nat` or `Bool`.
    Basic(String),
    /// Function sort `domain_0 # ... # domain_n -> codomain`.
    Arrow { domain: Vec<Sort>, codomain: Box<Sort> },
}

impl Sort {
    pub fn basic(name: impl Into<String>) -> Self {
        Self::Basic(name.into())
    }

    pub fn arrow(domain: Vec<Sort>, codomain: Sort) -> Self {
        if domain.is_empty() {
            return codomain;
        }
        Self::Arrow { domain, codomain: Box::new(codomain) }
    }

    /// The boolean sort conditions are evaluated in.
    pub fn bool() -> Self {
        Self::basic("Bool")
    }

    /// Total number of arguments accepted across nested arrows.
    pub fn arity(&self) -> usize {
        match self {
            Self::Basic(_) => 0,
            Self::Arrow { domain, codomain } => domain.len() + codomain.arity(),
        }
    }

    /// Argument sorts across nested arrows, in application order.
    pub fn argument_sorts(&self) -> Vec<&Sort> {
        let mut out = Vec::new();
        let mut current = self;
        while let Self::Arrow { domain, codomain } = current {
            out.extend(domain.iter());
            current = codomain;
        }
        out
    }

    /// Sort of the term obtained by applying `n` arguments.
    ///
    /// Returns `None` when `n` exceeds [`Sort::arity`]. Applying part of an
    /// arrow's domain yields the arrow over the remaining domain sorts.
    pub fn applied(&self, n: usize) -> Option<Sort> {
        if n == 0 {
            return Some(self.clone());
        }
        match self {
            Self::Basic(_) => None,
            Self::Arrow { domain, codomain } if n < domain.len() => {
                Some(Self::Arrow { domain: domain[n..].to_vec(), codomain: codomain.clone() })
            }
            Self::Arrow { domain, codomain } => codomain.applied(n - domain.len()),
        }
    }

    /// The final result sort after all arguments are supplied.
    pub fn target(&self) -> &Sort {
        match self {
            Self::Basic(_) => self,
            Self::Arrow { codomain, .. } => codomain.target(),
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic(name) => write!(f, "{name}"),
            Self::Arrow { domain, codomain } => {
                for (i, s) in domain.iter().enumerate() {
                    if i > 0 {
                        write!(f, " # ")?;
                    }
                    match s {
                        Self::Arrow { .. } => write!(f, "({s})")?,
                        Self::Basic(_) => write!(f, "{s}")?,
                    }
                }
                write!(f, " -> {codomain}")
            }
        }
    }
}
