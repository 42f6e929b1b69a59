//! Term model for the innerc rewriter.
//!
//! This crate defines the data consumed by the rewriter: sorts, function
//! symbols, the public [`DataExpr`] representation, data specifications with
//! their equations, and the hash-consed internal [`TermPool`] the compiled
//! engine operates on.
//!
//! # Module Organization
//!
//! - [`sort`] - Basic and arrow sorts, arity computation
//! - [`symbol`] - Function symbols, variables and their dense numbering
//! - [`expr`] - Public term representation and sort inference
//! - [`term`] - Hash-consed internal terms (`TermId` handles)
//! - [`spec`] - Equations and data specifications
//! - [`validate`] - Rewrite-rule validity checks
//! - [`error`] - Error types and result handling

pub mod error;
pub mod expr;
pub mod sort;
pub mod spec;
pub mod symbol;
pub mod term;
pub mod validate;


pub use error::{Error, Result};
pub use expr::DataExpr;
pub use sort::Sort;
pub use spec::{DataEquation, DataSpecification};
pub use symbol::{FunctionSymbol, OpId, SymbolTable, VarId, Variable};
pub use term::{Head, Term, TermId, TermPool};
pub use validate::{check_equation, valid_equations};
