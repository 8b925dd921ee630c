//! Linear undo/redo history.

/// Two LIFO stacks of full-state snapshots.
///
/// `commit` records a new state and discards the redo stack; the other push
/// operations move states between the stacks without touching the opposite
/// side.
#[derive(Debug, Clone)]
pub struct History<T> {
    undo: Vec<T>,
    redo: Vec<T>,
    /// Maximum undo entries kept (`None` = bounded only by memory).
    limit: Option<usize>,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> History<T> {
    /// Create an unbounded history.
    pub fn new() -> Self {
        Self::with_limit(None)
    }

    /// Create a history that keeps at most `limit` undo entries.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            limit: limit.map(|l| l.max(1)),
        }
    }

    /// Record a new state after an edit. Clears the redo stack.
    pub fn commit(&mut self, state: T) {
        self.redo.clear();
        self.push_undo(state);
    }

    /// Push onto the undo stack without clearing redo.
    pub fn push_undo(&mut self, state: T) {
        self.undo.push(state);
        if let Some(limit) = self.limit {
            if self.undo.len() > limit {
                let excess = self.undo.len() - limit;
                self.undo.drain(..excess);
            }
        }
    }

    pub fn push_redo(&mut self, state: T) {
        self.redo.push(state);
    }

    pub fn pop_undo(&mut self) -> Option<T> {
        self.undo.pop()
    }

    pub fn pop_redo(&mut self) -> Option<T> {
        self.redo.pop()
    }

    /// Most recent undo entry.
    pub fn peek_undo(&self) -> Option<&T> {
        self.undo.last()
    }

    /// Drop every entry on both stacks.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
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
}
