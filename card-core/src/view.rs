//! Render target: the composed card as a pure function of the presentation
//! state and the catalogs.
//!
//! ```text
//! ┌──────────────── card ────────────────┐
//! │ wrapper padding                      │
//! │   ┌──── text box (≤ 90% wide) ────┐  │
//! │   │ 0.5em padding                 │  │
//! │   │   line 1                      │  │
//! │   │   line 2                      │  │
//! │   └───────────────────────────────┘  │
//! └──────────────────────────────────────┘
//! ```
//!
//! Glyph metrics are estimated from the font catalog; the rasterizer shapes
//! the actual glyphs at the computed line origins.

use serde::Serialize;

use crate::catalog::{Anchor, Effect, TextAlign};
use crate::{BackgroundImage, Color, FontFamily, PresentationState};

/// Padding of the wrapper around the text box.
pub const WRAPPER_PADDING: f32 = 32.0;

/// Maximum wrapper width as a fraction of the card width.
pub const WRAPPER_MAX_WIDTH: f32 = 0.9;

/// Text box padding in em.
pub const TEXT_PADDING_EM: f32 = 0.5;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT: f32 = 1.5;

/// Corner radius of a filled text box.
pub const TEXT_BOX_RADIUS: f32 = 4.0;

/// Ascent as a fraction of the font size, used to place baselines.
const ASCENT: f32 = 0.8;

/// Size of the card in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CardGeometry {
    /// Width in logical pixels.
    pub width: f32,
    /// Height in logical pixels.
    pub height: f32,
}

impl CardGeometry {
    /// A square card.
    #[must_use]
    pub fn square(side: f32) -> Self {
        Self {
            width: side,
            height: side,
        }
    }
}

impl Default for CardGeometry {
    fn default() -> Self {
        Self::square(800.0)
    }
}

/// Bottom layer of the card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Background {
    /// Solid fill.
    Solid {
        /// Fill color.
        color: Color,
    },
    /// Image scaled to cover the card, centered.
    Image {
        /// Image payload.
        image: BackgroundImage,
    },
}

/// A laid out line of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLine {
    /// Line content (already case-transformed).
    pub text: String,
    /// Anchor x: left edge, center or right edge depending on alignment.
    pub x: f32,
    /// Baseline y.
    pub baseline: f32,
    /// Estimated advance width.
    pub width: f32,
}

/// The text box with its resolved style.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    /// Box left edge.
    pub x: f32,
    /// Box top edge.
    pub y: f32,
    /// Box width including padding.
    pub width: f32,
    /// Box height including padding.
    pub height: f32,
    /// Lines in paint order.
    pub lines: Vec<TextLine>,
    /// Alignment of lines within the box.
    pub align: TextAlign,
    /// Resolved font family (after the preset override).
    pub font_family: FontFamily,
    /// Font size in pixels.
    pub font_size: f32,
    /// Bold weight.
    pub bold: bool,
    /// Letter spacing in pixels.
    pub letter_spacing: f32,
    /// Text color.
    pub color: Color,
    /// Box fill, `None` when transparent.
    pub fill: Option<Color>,
    /// Box corner radius.
    pub corner_radius: f32,
    /// Preset decoration.
    pub effect: Effect,
}

/// Complete description of what the card looks like.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    /// Card geometry.
    pub geometry: CardGeometry,
    /// Background layer.
    pub background: Background,
    /// Text box, absent while the text is empty.
    pub text: Option<TextBlock>,
}

impl CardView {
    /// Project a presentation state onto a card.
    #[must_use]
    pub fn project(state: &PresentationState, geometry: CardGeometry) -> Self {
        let background = match &state.background_image {
            Some(image) => Background::Image {
                image: image.clone(),
            },
            None => Background::Solid {
                color: state.background_color.clone(),
            },
        };

        let text = (!state.text.is_empty()).then(|| layout_text(state, geometry));

        Self {
            geometry,
            background,
            text,
        }
    }

    /// Whether an image layer is present.
    #[must_use]
    pub fn has_image(&self) -> bool {
        matches!(self.background, Background::Image { .. })
    }
}

#[allow(clippy::cast_precision_loss)]
fn layout_text(state: &PresentationState, geometry: CardGeometry) -> TextBlock {
    let style = state.style_preset.spec();
    let placement = state.position.placement();
    let font_family = state.effective_font_family();
    let font_size = state.font_size.px() as f32;
    let letter_spacing = style.effect.letter_spacing(font_size);
    let padding = TEXT_PADDING_EM * font_size;
    let line_height = LINE_HEIGHT * font_size;

    let mut advance = font_family.average_advance() * font_size + letter_spacing;
    if style.bold {
        advance *= 1.1;
    }

    let text = if style.uppercase {
        state.text.to_uppercase()
    } else {
        state.text.clone()
    };

    let max_box_width =
        (geometry.width * WRAPPER_MAX_WIDTH - 2.0 * WRAPPER_PADDING).max(2.0 * padding + advance);
    let max_content_width = max_box_width - 2.0 * padding;

    let wrapped = wrap_text(&text, max_content_width, advance);
    let content_width = wrapped
        .iter()
        .map(|(_, w)| *w)
        .fold(0.0_f32, f32::max);

    let width = content_width + 2.0 * padding;
    let height = wrapped.len() as f32 * line_height + 2.0 * padding;

    let x = anchor_offset(placement.horizontal, geometry.width, width);
    let y = anchor_offset(placement.vertical, geometry.height, height);

    let line_x = match placement.text_align {
        TextAlign::Left => x + padding,
        TextAlign::Center => x + width / 2.0,
        TextAlign::Right => x + width - padding,
    };
    let first_baseline = y + padding + (line_height - font_size) / 2.0 + ASCENT * font_size;

    let lines = wrapped
        .into_iter()
        .enumerate()
        .map(|(i, (text, width))| TextLine {
            text,
            x: line_x,
            baseline: first_baseline + i as f32 * line_height,
            width,
        })
        .collect();

    let fill = (!state.text_background_color.is_transparent())
        .then(|| state.text_background_color.clone());
    let corner_radius = if fill.is_some() { TEXT_BOX_RADIUS } else { 0.0 };

    TextBlock {
        x,
        y,
        width,
        height,
        lines,
        align: placement.text_align,
        font_family,
        font_size,
        bold: style.bold,
        letter_spacing,
        color: state.text_color.clone(),
        fill,
        corner_radius,
        effect: style.effect,
    }
}

/// Offset of a box of `size` along an axis of `extent` for the given anchor.
fn anchor_offset(anchor: Anchor, extent: f32, size: f32) -> f32 {
    match anchor {
        Anchor::Start => WRAPPER_PADDING,
        Anchor::Center => (extent - size) / 2.0,
        Anchor::End => extent - WRAPPER_PADDING - size,
    }
}

/// Greedy `pre-wrap` + `break-words` wrapping.
///
/// Explicit line breaks are kept, runs of spaces are preserved and words
/// longer than a line are split between characters. Returns each line with
/// its estimated width.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn wrap_text(text: &str, max_width: f32, advance: f32) -> Vec<(String, f32)> {
    let max_chars = ((max_width / advance).floor() as usize).max(1);
    let measure = |s: &str| s.chars().count() as f32 * advance;
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for (i, word) in paragraph.split(' ').enumerate() {
            let candidate_len = current.chars().count() + usize::from(i > 0) + word.chars().count();
            if i > 0 && candidate_len <= max_chars {
                current.push(' ');
                current.push_str(word);
                continue;
            }
            if i > 0 {
                lines.push(std::mem::take(&mut current));
            }
            let mut chars: Vec<char> = word.chars().collect();
            while chars.len() > max_chars {
                let rest = chars.split_off(max_chars);
                lines.push(chars.into_iter().collect());
                chars = rest;
            }
            current = chars.into_iter().collect();
        }
        lines.push(current);
    }

    lines
        .into_iter()
        .map(|line| {
            let width = measure(&line);
            (line, width)
        })
        .collect()
}
