//! Variable bindings applied by the tree-walking backend.

use innerc_ir::{TermId, VarId};

/// Dense table of variable bindings; an unbound variable rewrites to itself.
#[derive(Debug, Clone, Default)]
pub struct Substitution {
    bindings: Vec<Option<TermId>>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, var: VarId, value: TermId) {
        let index = var.index();
        if index >= self.bindings.len() {
            self.bindings.resize(index + 1, None);
        }
        self.bindings[index] = Some(value);
    }

    pub fn get(&self, var: VarId) -> Option<TermId> {
        self.bindings.get(var.index()).copied().flatten()
    }

    pub fn clear(&mut self, var: VarId) {
        if let Some(slot) = self.bindings.get_mut(var.index()) {
            *slot = None;
        }
    }

    pub fn clear_all(&mut self) {
        self.bindings.fill(None);
    }

    /// Number of bound variables.
    pub fn len(&self) -> usize {
        self.bindings.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
