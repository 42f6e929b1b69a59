//! Rule scheduling for the innerc rewriter.
//!
//! Turns the equations of a data specification into per-operator evaluation
//! strategies whose matching steps are decision trees. The result is
//! independent of how it is executed: the code generator and the tree-walking
//! backend consume the same [`StrategyTable`].
//!
//! # Module Organization
//!
//! - [`rule`] - Equations oriented into rules, indexed by operator
//! - [`sequence`] - Linear match sequences of rule patterns
//! - [`tree`] - Decision-tree construction and rendering
//! - [`strategy`] - Argument-normalization order and rule groups per arity

pub mod error;
pub mod rule;
pub mod sequence;
pub mod strategy;
pub mod tree;


pub use error::{Error, Result};
pub use rule::{Rule, RuleSet};
pub use sequence::{Outcome, Sequence, Step};
pub use strategy::{ArityStrategy, Strategy, StrategyStep, StrategyTable, dependencies};
pub use tree::{MatchTree, Resolution, Slot, TreeBuilder, TreeView};
