//! Snapshot-based Undo/Redo
//!
//! Each entry is a full pre-mutation `Snapshot`, so restoring a step is a
//! single `replace_all` no matter how many nodes the original action touched.
//!
//! # Semantics
//!
//! - `push_undo(current)` records the state *before* a local mutation and
//!   clears the redo stack
//! - `undo(current)` pops the latest checkpoint, stores `current` on the redo
//!   stack and returns the checkpoint to restore
//! - `redo(current)` mirrors `undo`
//!
//! Both stacks are bounded; when full, the oldest entry is evicted.

use crate::models::Snapshot;
use std::collections::VecDeque;

pub const DEFAULT_UNDO_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
pub struct UndoManager {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: VecDeque<Snapshot>,
    capacity: usize,
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_CAPACITY)
    }
}

impl UndoManager {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            undo_stack: VecDeque::with_capacity(capacity.min(DEFAULT_UNDO_CAPACITY)),
            redo_stack: VecDeque::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push_undo(&mut self, current: Snapshot) {
        push_bounded(&mut self.undo_stack, current, self.capacity);
        self.redo_stack.clear();
    }

    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let restored = self.undo_stack.pop_back()?;
        push_bounded(&mut self.redo_stack, current, self.capacity);
        Some(restored)
    }

    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let restored = self.redo_stack.pop_back()?;
        push_bounded(&mut self.undo_stack, current, self.capacity);
        Some(restored)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

fn push_bounded(stack: &mut VecDeque<Snapshot>, snapshot: Snapshot, capacity: usize) {
    if stack.len() == capacity {
        stack.pop_front();
    }
    stack.push_back(snapshot);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(title: &str) -> Snapshot {
        Snapshot::new(Vec::new(), Vec::new(), title)
    }

    #[test]
    fn test_undo_on_empty_history_is_none() {
        let mut history = UndoManager::default();
        assert!(history.undo(titled("now")).is_none());
        assert!(history.redo(titled("now")).is_none());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_then_redo_swaps_states() {
        let mut history = UndoManager::default();
        history.push_undo(titled("before"));

        let restored = history.undo(titled("after")).unwrap();
        assert_eq!(restored.title, "before");
        assert!(history.can_redo());

        let redone = history.redo(titled("before")).unwrap();
        assert_eq!(redone.title, "after");
        assert_eq!(history.undo_len(), 1);
        assert_eq!(history.redo_len(), 0);
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = UndoManager::default();
        history.push_undo(titled("a"));
        history.undo(titled("b"));
        assert!(history.can_redo());

        history.push_undo(titled("c"));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = UndoManager::new(3);
        for title in ["1", "2", "3", "4"] {
            history.push_undo(titled(title));
        }

        assert_eq!(history.undo_len(), 3);
        let mut popped = Vec::new();
        while let Some(snapshot) = history.undo(titled("x")) {
            popped.push(snapshot.title);
        }
        assert_eq!(popped, vec!["4", "3", "2"]);
    }
}
