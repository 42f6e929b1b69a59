//! Error types for building and running rewriters.

use snafu::Snafu;

/// Result type for runtime operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Phase of a rewriter's life an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Stage {
    Validation,
    SortInference,
    Compilation,
    Linking,
    Rewriting,
}

/// Errors that can occur while building or running a rewriter.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// The external compiler or linker failed, or its output could not be loaded.
    #[snafu(display("{stage} failed: {reason}"))]
    CompilationFailure { stage: Stage, reason: String },

    /// The loaded module lacks an expected entry point.
    #[snafu(display("symbol '{name}' not found in generated module"))]
    LinkSymbolMissing { name: String },

    /// Temporary files could not be written.
    #[snafu(display("I/O error: {source}"))]
    Io { source: std::io::Error },

    /// Error from IR layer.
    #[snafu(display("IR error: {source}"))]
    Ir { source: innerc_ir::Error },

    /// Rule collection failed.
    #[snafu(display("Schedule error: {source}"))]
    Schedule { source: innerc_schedule::Error },

    /// Codegen error occurred.
    #[snafu(display("Codegen error: {source}"))]
    Codegen { source: innerc_codegen::Error },

    /// The generated module could not store a substitution entry.
    #[snafu(display("cannot bind variable #{var}: substitution table cannot grow"))]
    SubstitutionTableFull { var: u32 },

    /// A term built during rewriting was rejected, e.g. an over-applied partial application.
    #[snafu(display("rewriting failed: {source}"))]
    Rewrite { source: innerc_ir::Error },
}

fn ir_stage(error: &innerc_ir::Error) -> Stage {
    match error {
        innerc_ir::Error::TargetSortAmbiguity { .. } => Stage::SortInference,
        _ => Stage::Validation,
    }
}

impl Error {
    /// The stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            Self::CompilationFailure { stage, .. } => *stage,
            Self::LinkSymbolMissing { .. } => Stage::Linking,
            Self::Io { .. } | Self::Codegen { .. } => Stage::Compilation,
            Self::Ir { source } => ir_stage(source),
            Self::Schedule { source: innerc_schedule::Error::IrError { source } } => ir_stage(source),
            Self::Schedule { .. } => Stage::Validation,
            Self::Rewrite { .. } | Self::SubstitutionTableFull { .. } => Stage::Rewriting,
        }
    }
}
