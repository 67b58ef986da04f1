//! Intents dispatched by the editor controls.
//!
//! Every control describes what the user asked for instead of mutating the
//! state directly; [`crate::Editor::dispatch`] applies them.

use serde::{Deserialize, Serialize};

use crate::{BackgroundImage, Color, ExportFormat, FontFamily, Position, StylePreset};

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyModifiers {
    /// Shift key pressed.
    pub shift: bool,
    /// Control key pressed.
    pub ctrl: bool,
    /// Alt/Option key pressed.
    pub alt: bool,
    /// Meta/Command key pressed.
    pub meta: bool,
}

/// All intents the editor accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Intent {
    /// Text field content changed.
    SetText(String),

    /// Key pressed inside the text field.
    KeyDown {
        /// Key name, e.g. `Enter`.
        key: String,
        /// Active modifier keys.
        #[serde(default)]
        modifiers: KeyModifiers,
        /// Caret offset in characters.
        caret: usize,
    },

    /// Background color picker changed.
    SetBackgroundColor(Color),

    /// Text color picker changed.
    SetTextColor(Color),

    /// Text background color picker changed.
    SetTextBackgroundColor(Color),

    /// Font size slider or number field changed.
    SetFontSize(f64),

    /// Position selector changed.
    SetPosition(Position),

    /// Font family selector changed.
    SetFontFamily(FontFamily),

    /// Style preset chosen in the sidebar.
    SetStylePreset(StylePreset),

    /// Reset the three colors.
    ResetColors,

    /// File picker closed; `None` when nothing was selected.
    SelectBackgroundFile(Option<String>),

    /// Selected file finished loading.
    BackgroundImageLoaded(BackgroundImage),

    /// Remove the background image.
    ResetBackgroundImage,

    /// Export file name field changed.
    SetFileNameBase(String),

    /// Export format selector changed.
    SetExportFormat(ExportFormat),

    /// Show the export file name prompt.
    OpenExportPrompt,

    /// Hide the export file name prompt.
    CloseExportPrompt,

    /// Step back in history.
    Undo,

    /// Step forward in history.
    Redo,
}

impl Intent {
    /// Whether this intent originates from a user edit that may be recorded
    /// in history. History navigation itself never is.
    #[must_use]
    pub fn is_user_edit(&self) -> bool {
        !matches!(self, Self::Undo | Self::Redo)
    }

    /// Short name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetText(_) => "set_text",
            Self::KeyDown { .. } => "key_down",
            Self::SetBackgroundColor(_) => "set_background_color",
            Self::SetTextColor(_) => "set_text_color",
            Self::SetTextBackgroundColor(_) => "set_text_background_color",
            Self::SetFontSize(_) => "set_font_size",
            Self::SetPosition(_) => "set_position",
            Self::SetFontFamily(_) => "set_font_family",
            Self::SetStylePreset(_) => "set_style_preset",
            Self::ResetColors => "reset_colors",
            Self::SelectBackgroundFile(_) => "select_background_file",
            Self::BackgroundImageLoaded(_) => "background_image_loaded",
            Self::ResetBackgroundImage => "reset_background_image",
            Self::SetFileNameBase(_) => "set_file_name_base",
            Self::SetExportFormat(_) => "set_export_format",
            Self::OpenExportPrompt => "open_export_prompt",
            Self::CloseExportPrompt => "close_export_prompt",
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }
}

/// Result of dispatching an intent, for the view to act on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// The state changed and the card must re-render.
    pub changed: bool,
    /// The widget's default action must be suppressed.
    pub suppress_default: bool,
    /// Caret offset to restore in the text field.
    pub caret: Option<usize>,
    /// A history snapshot was recorded.
    pub recorded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_json_shape() {
        let json = serde_json::to_string(&Intent::SetPosition(Position::BottomRight)).expect("json");
        assert_eq!(json, r#"{"type":"set_position","data":"bottom-right"}"#);

        let parsed: Intent = serde_json::from_str(r#"{"type":"reset_colors"}"#).expect("parse");
        assert_eq!(parsed, Intent::ResetColors);
    }

    #[test]
    fn test_key_down_modifiers_default() {
        let parsed: Intent =
            serde_json::from_str(r#"{"type":"key_down","data":{"key":"Enter","caret":3}}"#)
                .expect("parse");
        assert_eq!(
            parsed,
            Intent::KeyDown {
                key: "Enter".to_string(),
                modifiers: KeyModifiers::default(),
                caret: 3,
            }
        );
    }

    #[test]
    fn test_history_navigation_is_not_user_edit() {
        assert!(!Intent::Undo.is_user_edit());
        assert!(!Intent::Redo.is_user_edit());
        assert!(Intent::ResetColors.is_user_edit());
    }
}
