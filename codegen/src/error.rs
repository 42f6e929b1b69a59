//! Error types for code generation.

use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur during code generation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// A tree returns a rule the strategy does not hold.
    #[snafu(display("decision tree refers to unknown rule {rule}"))]
    UnknownRule { rule: usize },

    /// Error from IR layer.
    #[snafu(display("IR error: {source}"))]
    IrError { source: innerc_ir::Error },
}
