//! Snapshot History
//!
//! Two bounded stacks of serialized content. The top of the undo stack
//! is always the committed state of the surface; `undo` needs a second
//! entry underneath it to have somewhere to go.

use std::collections::VecDeque;

/// Linear undo/redo history
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<String>,
    redo_stack: Vec<String>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record a new committed state. Evicts the oldest entry on overflow
    /// and drops every redo entry.
    pub fn push(&mut self, snapshot: String) {
        self.undo_stack.push_back(snapshot);
        while self.undo_stack.len() > self.limit {
            self.undo_stack.pop_front();
        }
        self.redo_stack.clear();
    }

    /// Step back. Returns the state to restore.
    pub fn undo(&mut self) -> Option<&str> {
        if self.undo_stack.len() < 2 {
            return None;
        }
        let current = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);
        self.undo_stack.back().map(String::as_str)
    }

    /// Step forward. Returns the state to restore.
    pub fn redo(&mut self) -> Option<&str> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push_back(next);
        while self.undo_stack.len() > self.limit {
            self.undo_stack.pop_front();
        }
        self.undo_stack.back().map(String::as_str)
    }

    /// Forget everything and start over from one baseline
    pub fn reset(&mut self, baseline: String) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.undo_stack.push_back(baseline);
    }

    /// Committed state
    pub fn current(&self) -> Option<&str> {
        self.undo_stack.back().map(String::as_str)
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() >= 2
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

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(100)
    }
}
