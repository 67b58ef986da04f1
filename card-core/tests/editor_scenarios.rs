//! Editor integration tests.
//!
//! Covers the undo/redo contract, color and image resets, and font size
//! clamping across every input path.

use card_core::{
    BackgroundImage, Background, CardGeometry, Color, Editor, ExportFormat, FontFamily,
    HistorySnapshot, Intent, Position, StylePreset,
};
use proptest::prelude::*;

fn edit(editor: &mut Editor, text: &str) {
    editor.dispatch(Intent::SetText(text.to_string()));
}

// ==========================================================================
// History
// ==========================================================================

#[test]
fn test_n_edits_then_undo_to_first() {
    let mut editor = Editor::new();
    let texts = ["a", "ab", "abc", "abcd", "abcde"];
    for text in texts {
        edit(&mut editor, text);
    }
    assert_eq!(editor.history().len(), texts.len());
    assert_eq!(editor.history().cursor(), Some(texts.len() - 1));

    for _ in 0..texts.len() - 1 {
        assert!(editor.undo());
    }
    assert_eq!(editor.history().cursor(), Some(0));
    assert_eq!(
        HistorySnapshot::capture(editor.state()),
        editor.history().entries()[0]
    );
}

#[test]
fn test_undo_at_start_and_redo_at_end_are_noops() {
    let mut editor = Editor::new();
    edit(&mut editor, "only");
    let state_before = editor.state().clone();
    let log_before = editor.history().clone();

    assert!(!editor.undo());
    assert!(!editor.redo());
    assert_eq!(editor.state(), &state_before);
    assert_eq!(editor.history(), &log_before);
}

#[test]
fn test_scenario_c_branch_truncation() {
    let mut editor = Editor::new();
    edit(&mut editor, "edit1");
    editor.dispatch(Intent::SetPosition(Position::TopLeft));
    editor.dispatch(Intent::SetTextColor(Color::new("#ff0000")));
    assert_eq!(editor.history().len(), 3);
    assert_eq!(editor.history().cursor(), Some(2));

    assert!(editor.undo());
    assert_eq!(editor.history().cursor(), Some(1));
    assert_eq!(editor.state().position, Position::TopLeft);
    assert_eq!(editor.state().text_color.as_str(), "#000000");
    let edit2 = editor.history().entries()[1].clone();

    editor.dispatch(Intent::SetFontFamily(FontFamily::Mono));
    let log = editor.history();
    assert_eq!(log.len(), 3);
    assert_eq!(log.cursor(), Some(2));
    assert_eq!(log.entries()[1], edit2);
    assert_eq!(log.entries()[2].font_family, FontFamily::Mono);
    assert_eq!(log.entries()[2].text_color.as_str(), "#000000");
    assert!(!editor.can_redo());
}

#[test]
fn test_undo_keeps_background_image_and_export_settings() {
    let mut editor = Editor::new();
    edit(&mut editor, "a");
    edit(&mut editor, "ab");
    editor.dispatch(Intent::BackgroundImageLoaded(BackgroundImage::new(
        "image/png",
        vec![1, 2, 3],
    )));
    editor.dispatch(Intent::SetExportFormat(ExportFormat::Webp));

    assert!(editor.undo());
    assert_eq!(editor.state().text, "a");
    assert!(editor.state().background_image.is_some());
    assert_eq!(editor.state().export.format, ExportFormat::Webp);
}

// ==========================================================================
// Resets
// ==========================================================================

#[test]
fn test_reset_colors_from_any_state() {
    let mut editor = Editor::new();
    editor.dispatch(Intent::SetBackgroundColor(Color::new("#101010")));
    editor.dispatch(Intent::SetTextColor(Color::new("not-a-color")));
    editor.dispatch(Intent::SetTextBackgroundColor(Color::new("#abcdef")));
    editor.dispatch(Intent::ResetColors);

    let state = editor.state();
    assert_eq!(state.background_color.as_str(), "#f3f4f6");
    assert_eq!(state.text_color.as_str(), "#000000");
    assert_eq!(state.text_background_color.as_str(), "transparent");
}

#[test]
fn test_scenario_b_reset_background_falls_back_to_color() {
    let mut editor = Editor::new();
    editor.dispatch(Intent::SelectBackgroundFile(Some("beach.jpg".to_string())));
    editor.dispatch(Intent::BackgroundImageLoaded(BackgroundImage::new(
        "image/jpeg",
        vec![0xFF, 0xD8, 0xFF],
    )));
    assert!(editor.view(CardGeometry::default()).has_image());

    editor.dispatch(Intent::ResetBackgroundImage);
    assert!(editor.state().background_image.is_none());
    assert!(editor.state().file_input.is_none());

    let view = editor.view(CardGeometry::default());
    assert_eq!(
        view.background,
        Background::Solid {
            color: Color::new("#f3f4f6")
        }
    );
}

// ==========================================================================
// Scenario A (state side)
// ==========================================================================

#[test]
fn test_scenario_a_state_and_file_name() {
    let mut editor = Editor::new();
    edit(&mut editor, "Hello\nWorld");
    editor.dispatch(Intent::SetPosition(Position::BottomRight));
    editor.dispatch(Intent::SetStylePreset(StylePreset::Meme));
    editor.dispatch(Intent::SetFileNameBase("quote1".to_string()));
    editor.dispatch(Intent::SetExportFormat(ExportFormat::Jpg));

    assert_eq!(editor.state().export.file_name(), "quote1.trenstand.jpg");
    let block = editor
        .view(CardGeometry::default())
        .text
        .expect("text block");
    let lines: Vec<_> = block.lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(lines, ["HELLO", "WORLD"]);
}

#[test]
fn test_intents_replay_from_json() {
    let script = r#"[
        {"type":"set_text","data":"Hi"},
        {"type":"set_font_size","data":100},
        {"type":"set_style_preset","data":"retro"},
        {"type":"undo"}
    ]"#;
    let intents: Vec<Intent> = serde_json::from_str(script).expect("script");
    let mut editor = Editor::new();
    for intent in intents {
        editor.dispatch(intent);
    }
    assert_eq!(editor.state().font_size.px(), 72);
    assert_eq!(editor.state().style_preset, StylePreset::Normal);
    assert!(editor.can_redo());
}

// ==========================================================================
// Properties
// ==========================================================================

proptest! {
    #[test]
    fn prop_font_size_always_in_range(value in proptest::num::f64::ANY) {
        let mut editor = Editor::new();
        editor.dispatch(Intent::SetFontSize(value));
        let px = editor.state().font_size.px();
        prop_assert!((12..=72).contains(&px));
    }

    #[test]
    fn prop_file_name_shape(base in "[ a-zA-Z0-9_.()-]{1,20}", idx in 0usize..3) {
        let format = ExportFormat::ALL[idx];
        prop_assert_eq!(
            format.file_name(&base),
            format!("{base}.trenstand.{}", format.as_str())
        );
    }

    #[test]
    fn prop_cursor_stays_in_bounds(ops in proptest::collection::vec(0u8..3, 1..40)) {
        let mut editor = Editor::new();
        let mut counter = 0u32;
        for op in ops {
            match op {
                0 => {
                    counter += 1;
                    editor.dispatch(Intent::SetText(format!("edit {counter}")));
                }
                1 => { editor.undo(); }
                _ => { editor.redo(); }
            }
            let log = editor.history();
            match log.cursor() {
                Some(c) => prop_assert!(c < log.len()),
                None => prop_assert!(log.is_empty()),
            }
        }
    }
}
