//! ASCII rendering of decision trees for debugging.

use std::borrow::Cow;
use std::io;

use innerc_ir::SymbolTable;
use ptree::{Style, TreeItem};

use super::{MatchTree, Resolution};

/// Renders a [`MatchTree`] with operator and variable names resolved.
///
/// Branching nodes show their `then` child before the `otherwise` child.
#[derive(Clone)]
pub struct TreeView<'a> {
    tree: &'a MatchTree,
    symbols: &'a SymbolTable,
    label: Option<&'static str>,
}

impl<'a> TreeView<'a> {
    pub fn new(tree: &'a MatchTree, symbols: &'a SymbolTable) -> Self {
        Self { tree, symbols, label: None }
    }

    fn child(&self, tree: &'a MatchTree, label: Option<&'static str>) -> Self {
        Self { tree, symbols: self.symbols, label }
    }

    /// Render into a string.
    pub fn render(&self) -> String {
        let mut out = Vec::new();
        match ptree::write_tree(self, &mut out) {
            Ok(()) => String::from_utf8_lossy(&out).into_owned(),
            Err(e) => format!("<tree rendering failed: {e}>"),
        }
    }

    fn resolution(&self, r: &Resolution) -> String {
        let bindings = r
            .bindings
            .iter()
            .map(|(v, s)| format!("{}=#{s}", self.symbols.var(*v).name()))
            .collect::<Vec<_>>()
            .join(", ");
        format!("rule {} [{bindings}]", r.rule)
    }
}

impl TreeItem for TreeView<'_> {
    type Child = Self;

    fn write_self<W: io::Write>(&self, f: &mut W, _style: &Style) -> io::Result<()> {
        if let Some(label) = self.label {
            write!(f, "{label}: ")?;
        }
        match self.tree {
            MatchTree::Store { slot, .. } => write!(f, "store #{slot}"),
            MatchTree::Match { slot, .. } => write!(f, "match #{slot}"),
            MatchTree::Function { op, arity, .. } => {
                write!(f, "function {}/{arity}", self.symbols.op(*op).name())
            }
            MatchTree::Next(_) => write!(f, "next"),
            MatchTree::Up(_) => write!(f, "up"),
            MatchTree::Check { resolution, .. } => write!(f, "check {}", self.resolution(resolution)),
            MatchTree::Return(resolution) => write!(f, "return {}", self.resolution(resolution)),
            MatchTree::Fail => write!(f, "fail"),
        }
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        let children = match self.tree {
            MatchTree::Store { then, .. } | MatchTree::Next(then) | MatchTree::Up(then) => {
                vec![self.child(then, None)]
            }
            MatchTree::Match { then, otherwise, .. } | MatchTree::Function { then, otherwise, .. } => {
                vec![self.child(then, Some("then")), self.child(otherwise, Some("else"))]
            }
            MatchTree::Check { otherwise, .. } => vec![self.child(otherwise, Some("else"))],
            MatchTree::Return(_) | MatchTree::Fail => Vec::new(),
        };
        Cow::Owned(children)
    }
}
