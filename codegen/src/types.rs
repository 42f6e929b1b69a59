//! Types shared between generated modules and their host.

/// Symbols every generated module exports.
pub const INIT_SYMBOL: &str = "rewrite_init";
pub const FINI_SYMBOL: &str = "rewrite_fini";
pub const REWRITE_SYMBOL: &str = "rewrite";
pub const SET_SUBST_SYMBOL: &str = "set_subst";
pub const GET_SUBST_SYMBOL: &str = "get_subst";
pub const CLEAR_SUBST_SYMBOL: &str = "clear_subst";
pub const CLEAR_SUBSTS_SYMBOL: &str = "clear_substs";

pub const EXPORTED_SYMBOLS: [&str; 7] = [
    INIT_SYMBOL,
    FINI_SYMBOL,
    REWRITE_SYMBOL,
    SET_SUBST_SYMBOL,
    GET_SUBST_SYMBOL,
    CLEAR_SUBST_SYMBOL,
    CLEAR_SUBSTS_SYMBOL,
];

/// Handle value meaning "no term", used for unbound substitution entries.
pub const UNBOUND: u32 = u32::MAX;

/// Shape of a term as reported to generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumIter)]
#[repr(u32)]
pub enum TermKind {
    #[strum(serialize = "INNERC_VAR")]
    Var = 0,
    #[strum(serialize = "INNERC_APP")]
    App = 1,
    /// Application whose head is a variable.
    #[strum(serialize = "INNERC_VAR_APP")]
    VarApp = 2,
}

/// Generated source of one rewriter module.
#[derive(Debug, Clone)]
pub struct RenderedModule {
    /// The generated code.
    pub code: String,

    /// Base name used for the source, object and library files.
    pub name: String,

    /// Number of specialized routines emitted.
    pub routines: usize,

    /// Operators known when the module was generated.
    pub num_ops: usize,
}

impl RenderedModule {
    pub fn new(code: String, name: String) -> Self {
        Self { code, name, routines: 0, num_ops: 0 }
    }
}
