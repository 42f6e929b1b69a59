//! Rewriter configuration.
//!
//! Provides typed configuration with bon builders and environment overrides.

use bon::bon;

/// How normal forms are computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display)]
pub enum Backend {
    /// Generate C, compile it with the system compiler and call into the loaded module.
    #[default]
    #[strum(serialize = "compiling")]
    Compiling,
    /// Walk the decision trees directly. Supports adding and removing rules.
    #[strum(serialize = "interpreter")]
    Interpreter,
}

// ============================================================================
// COMPILER CONFIGURATION
// ============================================================================

/// Flags every module is compiled with, before user flags.
pub const BASE_CFLAGS: [&str; 4] = ["-c", "-fPIC", "-O2", "-w"];

/// External compiler invocation used by [`Backend::Compiling`].
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Compiler driver, also used as linker.
    pub cc: String,
    /// Extra flags for the compile step.
    pub cflags: Vec<String>,
    /// Extra flags for the link step.
    pub ldflags: Vec<String>,
    /// Log the full generated source at info level.
    pub keep_source: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self { cc: "cc".to_string(), cflags: Vec::new(), ldflags: Vec::new(), keep_source: false }
    }
}

fn split_flags(flags: &str) -> Vec<String> {
    flags.split_whitespace().map(str::to_string).collect()
}

#[bon]
impl CompilerConfig {
    /// Create a compiler configuration with builder pattern.
    #[builder]
    pub fn builder(
        #[builder(default = "cc".to_string(), into)] cc: String,
        #[builder(default)] cflags: Vec<String>,
        #[builder(default)] ldflags: Vec<String>,
        #[builder(default = false)] keep_source: bool,
    ) -> Self {
        Self { cc, cflags, ldflags, keep_source }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `INNERC_CC` - Compiler driver (default: `cc`)
    /// * `INNERC_CFLAGS` - Whitespace-separated extra compile flags
    /// * `INNERC_LDFLAGS` - Whitespace-separated extra link flags
    /// * `INNERC_KEEP_SOURCE` - Log generated source if set
    pub fn from_env() -> Self {
        let cc = std::env::var("INNERC_CC").ok().filter(|s| !s.is_empty()).unwrap_or_else(|| "cc".to_string());
        let cflags = std::env::var("INNERC_CFLAGS").map(|s| split_flags(&s)).unwrap_or_default();
        let ldflags = std::env::var("INNERC_LDFLAGS").map(|s| split_flags(&s)).unwrap_or_default();
        let keep_source = std::env::var("INNERC_KEEP_SOURCE").is_ok();

        Self { cc, cflags, ldflags, keep_source }
    }
}

// ============================================================================
// REWRITER CONFIGURATION
// ============================================================================

/// Backend choice plus the compiler it may need.
#[derive(Debug, Clone, Default)]
pub struct RewriterConfig {
    pub backend: Backend,
    pub compiler: CompilerConfig,
}

#[bon]
impl RewriterConfig {
    /// Create a rewriter configuration with builder pattern.
    ///
    /// The compiler defaults to [`CompilerConfig::from_env`].
    #[builder]
    pub fn builder(
        #[builder(default)] backend: Backend,
        #[builder(default = CompilerConfig::from_env())] compiler: CompilerConfig,
    ) -> Self {
        Self { backend, compiler }
    }
}
