//! Parser configuration

/// Options that control how a [`Parser`](super::Parser) behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Most tokens a single recovery may skip before it gives up and flushes
    pub recovery_budget: usize,
    /// Push unchanged subtrees of the old tree during incremental parses
    pub reuse_subtrees: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            recovery_budget: 16,
            reuse_subtrees: true,
        }
    }
}

impl ParseOptions {
    pub fn with_recovery_budget(mut self, budget: usize) -> Self {
        self.recovery_budget = budget.max(1);
        self
    }

    pub fn with_reuse(mut self, reuse: bool) -> Self {
        self.reuse_subtrees = reuse;
        self
    }
}
