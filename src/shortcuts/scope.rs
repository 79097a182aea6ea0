//! Ordered stack of named shortcut scopes.
//!
//! The stack always holds `"global"` at the bottom; the top entry is the
//! active scope and is the only one shortcuts are matched against.

use crate::config::DEFAULT_SCOPE;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopeStack {
    stack: Vec<String>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            stack: vec![DEFAULT_SCOPE.to_string()],
        }
    }

    /// Push a new scope, making it active. Empty or already-present names are ignored.
    pub fn push(&mut self, scope: &str) {
        if scope.is_empty() || self.contains(scope) {
            return;
        }
        self.stack.push(scope.to_string());
    }

    /// Remove the active scope unless it is the last one left.
    pub fn pop(&mut self) -> Option<String> {
        if self.stack.len() > 1 {
            self.stack.pop()
        } else {
            None
        }
    }

    /// Swap `scope` into the top slot; the previously active scope takes its old slot.
    ///
    /// Returns `false` (and changes nothing) when the scope is not on the stack.
    pub fn set_active(&mut self, scope: &str) -> bool {
        let Some(index) = self.stack.iter().position(|s| s == scope) else {
            return false;
        };
        let top = self.stack.len() - 1;
        self.stack.swap(index, top);
        true
    }

    pub fn reset(&mut self) {
        self.stack.clear();
        self.stack.push(DEFAULT_SCOPE.to_string());
    }

    pub fn active(&self) -> &str {
        self.stack.last().map(String::as_str).unwrap_or(DEFAULT_SCOPE)
    }

    /// Snapshot of the stack, bottom first.
    pub fn list(&self) -> Vec<String> {
        self.stack.clone()
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.stack.iter().any(|s| s == scope)
    }

    /// True iff the active scope equals `scope` (default `"global"`).
    pub fn is_active(&self, scope: Option<&str>) -> bool {
        self.active() == scope.unwrap_or(DEFAULT_SCOPE)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stack_is_global() {
        let stack = ScopeStack::new();
        assert_eq!(stack.list(), vec!["global"]);
        assert!(stack.is_active(None));
        assert!(stack.is_active(Some("global")));
    }

    #[test]
    fn test_push_ignores_empty_and_duplicates() {
        let mut stack = ScopeStack::new();
        stack.push("editor");
        stack.push("editor");
        stack.push("");
        assert_eq!(stack.list(), vec!["global", "editor"]);
        assert_eq!(stack.active(), "editor");
    }

    #[test]
    fn test_pop_never_removes_global() {
        let mut stack = ScopeStack::new();
        stack.push("modal");
        assert_eq!(stack.pop().as_deref(), Some("modal"));
        assert_eq!(stack.pop(), None);
        assert_eq!(stack.list(), vec!["global"]);
    }

    #[test]
    fn test_set_active_swaps_with_top() {
        let mut stack = ScopeStack::new();
        stack.push("editor");
        stack.push("modal");

        assert!(stack.set_active("global"));
        assert_eq!(stack.list(), vec!["modal", "editor", "global"]);
        assert_eq!(stack.active(), "global");

        assert!(!stack.set_active("missing"));
        assert_eq!(stack.list(), vec!["modal", "editor", "global"]);
    }

    #[test]
    fn test_reset_restores_global() {
        let mut stack = ScopeStack::new();
        stack.push("a");
        stack.push("b");
        stack.reset();
        assert_eq!(stack.list(), vec!["global"]);
        assert_eq!(stack.depth(), 1);
    }
}
