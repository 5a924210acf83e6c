use std::sync::Arc;

use crate::action::{Action, ActionLog};

/// A frozen copy of the action log. Shared, never mutated after it is taken.
pub type Snapshot = Arc<[Action]>;

/// Linear undo/redo over whole-log snapshots.
///
/// The caller calls [`History::commit`] with the log as it stands *before*
/// appending the new action, so undoing always lands exactly on the state that
/// preceded the change. Any commit clears the redo stack; there is no
/// branching history.
#[derive(Debug, Default, Clone)]
pub struct History {
    /// Snapshots that `undo` can restore, most recent last
    undo_stack: Vec<Snapshot>,
    /// Snapshots that `redo` can restore, most recent last
    redo_stack: Vec<Snapshot>,
}

impl History {
    /// Creates a new empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Checkpoint `log` (the pre-change state) and drop any redoable states.
    pub fn commit(&mut self, log: &[Action]) {
        self.undo_stack.push(Arc::from(log));
        self.redo_stack.clear();
        log::debug!(
            "history commit: {} actions checkpointed, undo depth {}",
            log.len(),
            self.undo_stack.len()
        );
    }

    /// Commit the current state, then append `action` to the log.
    pub fn apply(&mut self, log: &mut ActionLog, action: Action) {
        self.commit(log);
        log.push(action);
    }

    /// Restore the most recent undo snapshot. Returns false (and leaves
    /// everything untouched) when there is nothing to undo.
    pub fn undo(&mut self, log: &mut ActionLog) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            log::debug!("undo ignored: undo stack is empty");
            return false;
        };
        self.redo_stack.push(Arc::from(log.as_slice()));
        *log = previous.to_vec();
        true
    }

    /// Restore the most recent redo snapshot. Returns false when there is
    /// nothing to redo.
    pub fn redo(&mut self, log: &mut ActionLog) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            log::debug!("redo ignored: redo stack is empty");
            return false;
        };
        self.undo_stack.push(Arc::from(log.as_slice()));
        *log = next.to_vec();
        true
    }

    /// Empty the log as an undoable change.
    pub fn clear(&mut self, log: &mut ActionLog) {
        self.commit(log);
        log.clear();
    }

    /// Push `log` as the only undo snapshot, used when hydrating a saved
    /// drawing in compatibility mode.
    pub fn seed(&mut self, log: &[Action]) {
        self.reset();
        self.undo_stack.push(Arc::from(log));
    }

    /// Forget every snapshot
    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Returns true if there are states that can be undone
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there are states that can be redone
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn undo_stack(&self) -> &[Snapshot] {
        &self.undo_stack
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;

    fn rect(x: f32) -> Action {
        Action::Rectangle {
            color: Color::BLACK,
            start_x: x,
            start_y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }

    #[test]
    fn test_snapshots_are_copies() {
        let mut history = History::new();
        let mut log = vec![rect(0.0)];
        history.commit(&log);
        log.push(rect(1.0));
        log[0] = rect(9.0);

        assert_eq!(&*history.undo_stack()[0], &[rect(0.0)][..]);
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut history = History::new();
        let mut log = vec![rect(0.0)];
        assert!(!history.undo(&mut log));
        assert!(!history.redo(&mut log));
        assert_eq!(log, vec![rect(0.0)]);
        assert_eq!(history.undo_depth(), 0);
        assert_eq!(history.redo_depth(), 0);
    }

    #[test]
    fn test_seed_replaces_stacks() {
        let mut history = History::new();
        let mut log = Vec::new();
        history.apply(&mut log, rect(0.0));
        history.undo(&mut log);
        assert!(history.can_redo());

        history.seed(&[rect(5.0)]);
        assert_eq!(history.undo_depth(), 1);
        assert!(!history.can_redo());
    }
}
