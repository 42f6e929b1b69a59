use snafu::Snafu;

use crate::{Sort, Variable};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Operator applied to more arguments than its sort allows.
    #[snafu(display("arity mismatch: {symbol} takes at most {declared} arguments, got {actual}"))]
    ArityMismatch { symbol: String, declared: usize, actual: usize },

    /// Application of something that is not a function.
    #[snafu(display("cannot apply {head} of sort {sort} to {actual} arguments"))]
    NotAFunction { head: String, sort: Sort, actual: usize },

    /// Argument sort differs from the declared domain.
    #[snafu(display("ill-sorted argument {position} of {head}: expected {expected}, got {actual}"))]
    IllSorted { head: String, position: usize, expected: Sort, actual: Sort },

    /// Overloaded operator whose result sort cannot be inferred from its argument sorts.
    #[snafu(display("target sort ambiguity: {name} over ({domain}) yields both {first} and {second}"))]
    TargetSortAmbiguity { name: String, domain: String, first: Sort, second: Sort },

    /// Internal term handle that does not belong to the pool.
    #[snafu(display("unknown term handle {handle}"))]
    UnknownTerm { handle: u32 },

    // =========================================================================
    // Rewrite-rule validity
    // =========================================================================
    /// Variable used in the equation but missing from its declaration.
    #[snafu(display("variable {variable} is not declared (in {equation})"))]
    UndeclaredVariable { variable: Variable, equation: String },

    /// Same variable name used with different sorts.
    #[snafu(display("variable {name} is used with sorts {first} and {second} (in {equation})"))]
    InconsistentVariable { name: String, first: Sort, second: Sort, equation: String },

    /// Right-hand side variable absent from the left-hand side.
    #[snafu(display("variable {variable} occurs in the right-hand side but not in the left-hand side (in {equation})"))]
    UnboundRhsVariable { variable: Variable, equation: String },

    /// Left-hand side is a bare variable.
    #[snafu(display("left-hand side is a variable (in {equation})"))]
    VariableLhs { equation: String },

    /// Pattern applies a variable as a function head.
    #[snafu(display("pattern applies variable {variable} as a function (in {equation})"))]
    VariableHead { variable: Variable, equation: String },

    /// Sides of the equation disagree on their sort, or the condition is not boolean.
    #[snafu(display("equation is ill-sorted: {reason} (in {equation})"))]
    IllSortedEquation { reason: String, equation: String },
}

impl Error {
    /// Whether the error marks a single equation as unusable rather than the whole specification.
    pub fn is_malformed_rule(&self) -> bool {
        matches!(
            self,
            Self::UndeclaredVariable { .. }
                | Self::InconsistentVariable { .. }
                | Self::UnboundRhsVariable { .. }
                | Self::VariableLhs { .. }
                | Self::VariableHead { .. }
                | Self::IllSortedEquation { .. }
        )
    }
}
