//! The editor session: presentation state plus history, driven by intents.

use crate::view::{CardGeometry, CardView};
use crate::{HistoryLog, HistorySnapshot, Intent, Outcome, PresentationState};

/// Key that inserts a line break in the text field.
const ENTER_KEY: &str = "Enter";

/// Owns the presentation state of one session and its history.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    state: PresentationState,
    history: HistoryLog,
}

impl Editor {
    /// Start a session with default state and empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session from an existing state, e.g. one restored by a host.
    #[must_use]
    pub fn with_state(state: PresentationState) -> Self {
        Self {
            state,
            history: HistoryLog::new(),
        }
    }

    /// Current presentation state.
    #[must_use]
    pub fn state(&self) -> &PresentationState {
        &self.state
    }

    /// History log.
    #[must_use]
    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Project the current state onto a card of the given geometry.
    #[must_use]
    pub fn view(&self, geometry: CardGeometry) -> CardView {
        CardView::project(&self.state, geometry)
    }

    /// Apply an intent.
    ///
    /// User edits that change a tracked field while the text is non-empty are
    /// recorded in history; undo and redo never are.
    pub fn dispatch(&mut self, intent: Intent) -> Outcome {
        tracing::debug!(intent = intent.name(), "Dispatching intent");

        if !intent.is_user_edit() {
            let moved = match intent {
                Intent::Undo => self.undo(),
                _ => self.redo(),
            };
            return Outcome {
                changed: moved,
                ..Outcome::default()
            };
        }

        let before = HistorySnapshot::capture(&self.state);
        let mut outcome = self.apply(intent);
        if outcome.changed {
            outcome.recorded = self.record_if_user_edit(&before);
        }
        outcome
    }

    /// Step back in history, restoring the previous snapshot.
    ///
    /// Returns `false` if there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                snapshot.apply_to(&mut self.state);
                tracing::debug!(cursor = ?self.history.cursor(), "Undo");
                true
            }
            None => false,
        }
    }

    /// Step forward in history.
    ///
    /// Returns `false` if there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                snapshot.apply_to(&mut self.state);
                tracing::debug!(cursor = ?self.history.cursor(), "Redo");
                true
            }
            None => false,
        }
    }

    /// Whether the undo control is enabled.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether the redo control is enabled.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn record_if_user_edit(&mut self, before: &HistorySnapshot) -> bool {
        if self.state.text.is_empty() {
            return false;
        }
        let after = HistorySnapshot::capture(&self.state);
        if after == *before {
            return false;
        }
        self.history.record(after);
        tracing::debug!(len = self.history.len(), "Recorded history snapshot");
        true
    }

    fn apply(&mut self, intent: Intent) -> Outcome {
        let state = &mut self.state;
        let changed = match intent {
            Intent::SetText(text) => replace(&mut state.text, text),
            Intent::KeyDown {
                key,
                modifiers,
                caret,
            } => {
                if key != ENTER_KEY || modifiers.shift {
                    return Outcome::default();
                }
                let caret = state.insert_line_break(caret);
                return Outcome {
                    changed: true,
                    suppress_default: true,
                    caret: Some(caret),
                    recorded: false,
                };
            }
            Intent::SetBackgroundColor(color) => replace(&mut state.background_color, color),
            Intent::SetTextColor(color) => replace(&mut state.text_color, color),
            Intent::SetTextBackgroundColor(color) => {
                replace(&mut state.text_background_color, color)
            }
            Intent::SetFontSize(value) => {
                let previous = state.font_size;
                state.set_font_size(value) && state.font_size != previous
            }
            Intent::SetPosition(position) => replace(&mut state.position, position),
            Intent::SetFontFamily(family) => replace(&mut state.font_family, family),
            Intent::SetStylePreset(preset) => replace(&mut state.style_preset, preset),
            Intent::ResetColors => {
                let before = (
                    state.background_color.clone(),
                    state.text_color.clone(),
                    state.text_background_color.clone(),
                );
                state.reset_colors();
                before
                    != (
                        state.background_color.clone(),
                        state.text_color.clone(),
                        state.text_background_color.clone(),
                    )
            }
            Intent::SelectBackgroundFile(file_name) => {
                let previous = state.file_input.clone();
                state.select_background_file(file_name);
                state.file_input != previous
            }
            Intent::BackgroundImageLoaded(image) => {
                tracing::debug!(mime = image.mime(), len = image.bytes().len(), "Background image loaded");
                state.set_background_image(image);
                true
            }
            Intent::ResetBackgroundImage => {
                let had_any = state.background_image.is_some() || state.file_input.is_some();
                state.reset_background_image();
                had_any
            }
            Intent::SetFileNameBase(base) => replace(&mut state.export.file_name_base, base),
            Intent::SetExportFormat(format) => replace(&mut state.export.format, format),
            Intent::OpenExportPrompt => replace(&mut state.export.prompt_open, true),
            Intent::CloseExportPrompt => replace(&mut state.export.prompt_open, false),
            Intent::Undo | Intent::Redo => false,
        };

        Outcome {
            changed,
            ..Outcome::default()
        }
    }
}

/// Store `value` in `slot`, reporting whether it differed.
fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}
