//! Decision trees over match sequences.
//!
//! One tree decides, for a single operator and call arity, which rule (if
//! any) applies to a call. Execution keeps a stack of frames, each holding a
//! parent term and an argument index; the bottom frame ranges over the
//! arguments of the call itself.
//!
//! ```text
//! Store(slot)     bind the current term to a slot
//! Match(slot)     compare the current term with a slot
//! Function(f/n)   test head and argument count, push a frame on success
//! Next            advance the top frame to the next argument
//! Up              pop the top frame
//! Check           evaluate a condition, return on `true`
//! Return / Fail   leaves
//! ```

mod builder;
mod render;

pub use builder::TreeBuilder;
pub use render::TreeView;

use innerc_ir::{OpId, VarId};

/// Index of a binding slot; slots are shared by all rules storing the same position.
pub type Slot = usize;

/// A committed rule together with the slot of every variable it consults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Declaration rank of the rule.
    pub rule: usize,
    pub bindings: Vec<(VarId, Slot)>,
}

impl Resolution {
    pub fn slot_of(&self, var: VarId) -> Option<Slot> {
        self.bindings.iter().find(|(v, _)| *v == var).map(|&(_, s)| s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchTree {
    Store { slot: Slot, then: Box<MatchTree> },
    Match { slot: Slot, then: Box<MatchTree>, otherwise: Box<MatchTree> },
    Function { op: OpId, arity: usize, then: Box<MatchTree>, otherwise: Box<MatchTree> },
    Next(Box<MatchTree>),
    Up(Box<MatchTree>),
    /// Return `resolution` if its condition rewrites to `true`.
    Check { resolution: Resolution, otherwise: Box<MatchTree> },
    Return(Resolution),
    Fail,
}

impl MatchTree {
    /// Number of slots execution must provide.
    pub fn slots(&self) -> usize {
        match self {
            Self::Store { slot, then } => (slot + 1).max(then.slots()),
            Self::Match { then, otherwise, .. } | Self::Function { then, otherwise, .. } => {
                then.slots().max(otherwise.slots())
            }
            Self::Next(t) | Self::Up(t) => t.slots(),
            Self::Check { otherwise, .. } => otherwise.slots(),
            Self::Return(_) | Self::Fail => 0,
        }
    }

    /// Rules reachable through a `Return` or `Check`, in tree order.
    pub fn rules(&self) -> Vec<usize> {
        let mut out = Vec::new();
        self.collect_rules(&mut out);
        out
    }

    fn collect_rules(&self, out: &mut Vec<usize>) {
        match self {
            Self::Store { then, .. } | Self::Next(then) | Self::Up(then) => then.collect_rules(out),
            Self::Match { then, otherwise, .. } | Self::Function { then, otherwise, .. } => {
                then.collect_rules(out);
                otherwise.collect_rules(out);
            }
            Self::Check { resolution, otherwise } => {
                if !out.contains(&resolution.rule) {
                    out.push(resolution.rule);
                }
                otherwise.collect_rules(out);
            }
            Self::Return(resolution) => {
                if !out.contains(&resolution.rule) {
                    out.push(resolution.rule);
                }
            }
            Self::Fail => {}
        }
    }
}
