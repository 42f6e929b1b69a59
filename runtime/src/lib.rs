//! Runtime for innerc rewriters.
//!
//! Builds a [`Rewriter`] from a data specification: equations become rules,
//! rules become strategies, and strategies are either compiled to a native
//! module via the system C compiler or interpreted directly.
//!
//! # Backends
//!
//! - [`Backend::Compiling`] - generated C loaded with `dlopen`; rules are fixed
//!   at construction and compilation failures are fatal
//! - [`Backend::Interpreter`] - tree walker over the same strategies; rules may
//!   be added and removed

pub mod config;
pub mod error;
pub mod host;
pub mod interpreter;
pub mod library;
pub mod rewriter;
pub mod substitution;


pub use config::{Backend, CompilerConfig, RewriterConfig};
pub use error::*;
pub use interpreter::Interpreter;
pub use library::CompiledLibrary;
pub use rewriter::Rewriter;
pub use substitution::Substitution;
