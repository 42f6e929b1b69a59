//! Code generation for innerc rewriters.
//!
//! This crate turns the strategies computed by `innerc-schedule` into source
//! code of a shared library that rewrites terms owned by the host.
//!
//! # Architecture
//!
//! - **Traits**: Backend-agnostic interfaces (`Renderer`)
//! - **C**: C source generation, compiled with the system C compiler
//!
//! # Usage
//!
//! ```ignore
//! use innerc_codegen::c;
//!
//! let module = c::render(&pool, &strategies, "rewriter")?;
//! ```

pub mod c;
pub mod error;
pub mod traits;
pub mod types;


pub use error::*;
pub use traits::*;
pub use types::*;
