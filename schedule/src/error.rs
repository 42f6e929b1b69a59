//! Error types for rule scheduling.

use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Error from the term layer.
    #[snafu(display("IR error: {source}"))]
    IrError { source: innerc_ir::Error },

    /// Left-hand side is not an operator application.
    #[snafu(display("left-hand side of {equation} is not headed by a function symbol"))]
    NotARule { equation: String },
}
