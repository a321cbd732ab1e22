//! Bounded undo/redo history of full image snapshots.

use std::collections::VecDeque;

use crate::config::DEFAULT_HISTORY_DEPTH;

/// Two stacks of snapshots with a depth limit on the undo side.
///
/// Every mutation records the state it replaced and clears the redo stack.
/// Once `depth` snapshots are held, recording drops the oldest one.
#[derive(Clone, Debug)]
pub struct EditHistory<T> {
    undo: VecDeque<T>,
    redo: Vec<T>,
    depth: usize,
}

impl<T> Default for EditHistory<T> {
    fn default() -> Self {
        Self::with_depth(DEFAULT_HISTORY_DEPTH)
    }
}

impl<T> EditHistory<T> {
    /// `depth` is raised to 1 if zero is given.
    pub fn with_depth(depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            depth: depth.max(1),
        }
    }

    /// Records the state that a mutation is about to replace.
    pub fn record(&mut self, previous: T) {
        if self.undo.len() == self.depth {
            self.undo.pop_front();
        }
        self.undo.push_back(previous);
        self.redo.clear();
    }

    /// Swaps `current` for the most recent snapshot.
    ///
    /// Hands `current` back as `Err` when there is nothing to undo.
    pub fn undo(&mut self, current: T) -> std::result::Result<T, T> {
        match self.undo.pop_back() {
            Some(previous) => {
                self.redo.push(current);
                Ok(previous)
            }
            None => Err(current),
        }
    }

    /// Mirror of [`Self::undo`].
    pub fn redo(&mut self, current: T) -> std::result::Result<T, T> {
        match self.redo.pop() {
            Some(next) => {
                self.undo.push_back(current);
                if self.undo.len() > self.depth {
                    self.undo.pop_front();
                }
                Ok(next)
            }
            None => Err(current),
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_snapshot_is_dropped_at_depth() {
        let mut history = EditHistory::with_depth(2);
        history.record(1);
        history.record(2);
        history.record(3);
        assert_eq!(history.undo_len(), 2);

        let current = history.undo(4).unwrap();
        assert_eq!(current, 3);
        let current = history.undo(current).unwrap();
        assert_eq!(current, 2);
        assert_eq!(history.undo(current), Err(2));
    }

    #[test]
    fn record_clears_redo() {
        let mut history = EditHistory::with_depth(5);
        history.record("a");
        let current = history.undo("b").unwrap();
        assert!(history.can_redo());
        history.record(current);
        assert!(!history.can_redo());
    }
}
