//! Undo/redo history over whole-shape-set snapshots.
//!
//! One snapshot per committed gesture (draw, erase, move, delete). Snapshot
//! granularity keeps undo semantics trivial at the cost of cloning the shape
//! set, which stays small in practice.

use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::constants::MAX_HISTORY_DEPTH;

use super::params::ui_wants_keyboard;
use super::session::EditSession;
use super::shape::ShapeSet;

#[derive(Resource)]
pub struct SnapshotHistory {
    entries: Vec<ShapeSet>,
    index: usize,
}

impl Default for SnapshotHistory {
    fn default() -> Self {
        // The empty canvas is always the first undo target
        Self {
            entries: vec![ShapeSet::new()],
            index: 0,
        }
    }
}

impl SnapshotHistory {
    /// Record a new snapshot after a committed gesture. Any redo entries past
    /// the current position are discarded.
    pub fn push(&mut self, snapshot: ShapeSet) {
        self.entries.truncate(self.index + 1);
        self.entries.push(snapshot);
        self.index += 1;

        if self.entries.len() > MAX_HISTORY_DEPTH {
            // Evict the oldest snapshot; the earliest undo target shifts
            self.entries.remove(0);
            self.index -= 1;
        }
    }

    pub fn undo(&mut self) -> Option<&ShapeSet> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(&self.entries[self.index])
    }

    pub fn redo(&mut self) -> Option<&ShapeSet> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(&self.entries[self.index])
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Forget everything and start over from an empty canvas
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Request to step the history, fired by keyboard shortcuts and the toolbar
#[derive(Message)]
pub enum HistoryStepRequest {
    Undo,
    Redo,
}

pub fn handle_history_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut requests: MessageWriter<HistoryStepRequest>,
    mut contexts: EguiContexts,
) {
    if ui_wants_keyboard(&mut contexts) {
        return;
    }

    let ctrl = keyboard.pressed(KeyCode::ControlLeft)
        || keyboard.pressed(KeyCode::ControlRight)
        || keyboard.pressed(KeyCode::SuperLeft)
        || keyboard.pressed(KeyCode::SuperRight);
    if !ctrl {
        return;
    }
    let shift = keyboard.pressed(KeyCode::ShiftLeft) || keyboard.pressed(KeyCode::ShiftRight);

    if keyboard.just_pressed(KeyCode::KeyZ) {
        if shift {
            requests.write(HistoryStepRequest::Redo);
        } else {
            requests.write(HistoryStepRequest::Undo);
        }
    } else if keyboard.just_pressed(KeyCode::KeyY) {
        requests.write(HistoryStepRequest::Redo);
    }
}

pub fn apply_history_steps(
    mut requests: MessageReader<HistoryStepRequest>,
    mut history: ResMut<SnapshotHistory>,
    mut session: ResMut<EditSession>,
) {
    for request in requests.read() {
        let snapshot = match request {
            HistoryStepRequest::Undo => history.undo(),
            HistoryStepRequest::Redo => history.redo(),
        };
        if let Some(snapshot) = snapshot {
            debug!(shapes = snapshot.len(), "history step applied");
            session.shapes = snapshot.clone();
            session.clear_selection();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::shape::{Point, Shape};

    fn snapshot(n: usize) -> ShapeSet {
        (0..n)
            .map(|_| Shape::new_pen("#ff0000", 3.0, Point::new(0.5, 0.5)))
            .collect()
    }

    #[test]
    fn test_empty_history_has_nothing_to_step() {
        let mut history = SnapshotHistory::default();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_undo_returns_to_empty_canvas() {
        let mut history = SnapshotHistory::default();
        history.push(snapshot(1));
        assert!(history.can_undo());

        let restored = history.undo().unwrap();
        assert!(restored.is_empty());
        assert!(history.can_redo());
    }

    #[test]
    fn test_undo_redo_symmetry() {
        let mut history = SnapshotHistory::default();
        history.push(snapshot(1));
        history.push(snapshot(2));

        assert_eq!(history.undo().unwrap().len(), 1);
        assert_eq!(history.undo().unwrap().len(), 0);
        assert_eq!(history.redo().unwrap().len(), 1);
        assert_eq!(history.redo().unwrap().len(), 2);
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_push_discards_redo_entries() {
        let mut history = SnapshotHistory::default();
        history.push(snapshot(1));
        history.push(snapshot(2));
        history.undo();
        history.push(snapshot(3));

        assert!(!history.can_redo());
        assert_eq!(history.undo().unwrap().len(), 1);
    }

    #[test]
    fn test_depth_cap_evicts_oldest() {
        let mut history = SnapshotHistory::default();
        for i in 1..=MAX_HISTORY_DEPTH + 10 {
            history.push(snapshot(i));
        }

        // Walk back as far as possible; the oldest snapshots are gone
        let mut steps = 0;
        while history.undo().is_some() {
            steps += 1;
        }
        assert_eq!(steps, MAX_HISTORY_DEPTH - 1);
    }

    #[test]
    fn test_reset_forgets_everything() {
        let mut history = SnapshotHistory::default();
        history.push(snapshot(3));
        history.reset();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
