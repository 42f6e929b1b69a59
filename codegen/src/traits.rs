//! Core traits for code generation.

use innerc_ir::TermPool;
use innerc_schedule::StrategyTable;

use crate::{RenderedModule, Result};

/// Backend-agnostic code generation interface.
///
/// Implementers turn the strategies of a rule set into source code exporting
/// the symbols listed in [`crate::EXPORTED_SYMBOLS`].
pub trait Renderer {
    /// Render every strategy of `table` into one module.
    ///
    /// Operator and variable ids in the output are those of `pool`; the module
    /// must only ever be driven with terms from the same pool.
    fn render(&self, pool: &TermPool, table: &StrategyTable, name: &str) -> Result<RenderedModule>;

    /// Get the backend name (e.g., "c").
    fn backend_name(&self) -> &str;
}
