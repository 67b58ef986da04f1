//! Undo/redo history of the visual state.

use serde::{Deserialize, Serialize};

use crate::{Color, FontFamily, FontSize, Position, PresentationState, StylePreset};

/// Immutable copy of the tracked part of [`PresentationState`].
///
/// Background image and export attributes are not tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    /// Quote text.
    pub text: String,
    /// Card background color.
    pub background_color: Color,
    /// Text color.
    pub text_color: Color,
    /// Text background color.
    pub text_background_color: Color,
    /// Font size.
    pub font_size: FontSize,
    /// Text position.
    pub position: Position,
    /// Font family.
    pub font_family: FontFamily,
    /// Style preset.
    pub style_preset: StylePreset,
}

impl HistorySnapshot {
    /// Capture the tracked fields of `state`.
    #[must_use]
    pub fn capture(state: &PresentationState) -> Self {
        Self {
            text: state.text.clone(),
            background_color: state.background_color.clone(),
            text_color: state.text_color.clone(),
            text_background_color: state.text_background_color.clone(),
            font_size: state.font_size,
            position: state.position,
            font_family: state.font_family,
            style_preset: state.style_preset,
        }
    }

    /// Overwrite the tracked fields of `state`.
    pub fn apply_to(&self, state: &mut PresentationState) {
        state.text.clone_from(&self.text);
        state.background_color = self.background_color.clone();
        state.text_color = self.text_color.clone();
        state.text_background_color = self.text_background_color.clone();
        state.font_size = self.font_size;
        state.position = self.position;
        state.font_family = self.font_family;
        state.style_preset = self.style_preset;
    }
}

/// Snapshot sequence with a cursor.
///
/// The cursor is `None` while the log is empty and otherwise always points at
/// an existing entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryLog {
    entries: Vec<HistorySnapshot>,
    cursor: Option<usize>,
}

impl HistoryLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot, dropping every entry after the cursor first.
    pub fn record(&mut self, snapshot: HistorySnapshot) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        if keep < self.entries.len() {
            tracing::debug!(
                "Truncating {} redo entries",
                self.entries.len() - keep
            );
            self.entries.truncate(keep);
        }
        self.entries.push(snapshot);
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Move the cursor back one entry and return the snapshot there.
    ///
    /// Returns `None` (and leaves the cursor alone) at the first entry.
    pub fn undo(&mut self) -> Option<&HistorySnapshot> {
        let cursor = self.cursor.filter(|&c| c > 0)? - 1;
        self.cursor = Some(cursor);
        self.entries.get(cursor)
    }

    /// Move the cursor forward one entry and return the snapshot there.
    ///
    /// Returns `None` (and leaves the cursor alone) at the last entry.
    pub fn redo(&mut self) -> Option<&HistorySnapshot> {
        let next = self.cursor.map_or(0, |c| c + 1);
        if self.cursor.is_none() || next >= self.entries.len() {
            return None;
        }
        self.cursor = Some(next);
        self.entries.get(next)
    }

    /// Whether [`Self::undo`] would move.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    /// Whether [`Self::redo`] would move.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.entries.len())
    }

    /// Current cursor, `None` for an empty log.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Snapshot under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&HistorySnapshot> {
        self.cursor.and_then(|c| self.entries.get(c))
    }

    /// All snapshots, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[HistorySnapshot] {
        &self.entries
    }

    /// Number of snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
