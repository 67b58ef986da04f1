//! Static style, layout and font catalogs.
//!
//! Everything here is a closed lookup table: the editor stores one of the enum
//! values and the view projection asks the catalog how to draw it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CardError;

/// Font family choices offered to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    /// Sans-serif (default).
    #[default]
    Sans,
    /// Serif.
    Serif,
    /// Monospace.
    Mono,
    /// Cursive / handwriting.
    Cursive,
}

impl FontFamily {
    /// All families in menu order.
    pub const ALL: [Self; 4] = [Self::Sans, Self::Serif, Self::Mono, Self::Cursive];

    /// Key used in intents and menus.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sans => "sans",
            Self::Serif => "serif",
            Self::Mono => "mono",
            Self::Cursive => "cursive",
        }
    }

    /// Generic CSS/SVG font-family name.
    #[must_use]
    pub fn generic_name(self) -> &'static str {
        match self {
            Self::Sans => "sans-serif",
            Self::Serif => "serif",
            Self::Mono => "monospace",
            Self::Cursive => "cursive",
        }
    }

    /// Average glyph advance as a fraction of the font size.
    ///
    /// Used for line wrapping and box sizing; real glyph metrics are only
    /// known to the rasterizer.
    #[must_use]
    pub fn average_advance(self) -> f32 {
        match self {
            Self::Sans => 0.55,
            Self::Serif => 0.52,
            Self::Mono => 0.6,
            Self::Cursive => 0.5,
        }
    }
}

/// Vertical or horizontal anchor inside the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    /// Top or left edge.
    Start,
    /// Centered.
    Center,
    /// Bottom or right edge.
    End,
}

/// Horizontal alignment of lines within the text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Left aligned.
    Left,
    /// Centered.
    Center,
    /// Right aligned.
    Right,
}

/// Alignment directives for one of the nine positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Vertical anchor.
    pub vertical: Anchor,
    /// Horizontal anchor.
    pub horizontal: Anchor,
    /// Line alignment.
    pub text_align: TextAlign,
}

/// Nine anchor positions on a 3x3 grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    /// Top left.
    TopLeft,
    /// Top center.
    TopCenter,
    /// Top right.
    TopRight,
    /// Middle left.
    MiddleLeft,
    /// Middle center (default).
    #[default]
    MiddleCenter,
    /// Middle right.
    MiddleRight,
    /// Bottom left.
    BottomLeft,
    /// Bottom center.
    BottomCenter,
    /// Bottom right.
    BottomRight,
}

impl Position {
    /// All positions in menu order.
    pub const ALL: [Self; 9] = [
        Self::TopLeft,
        Self::TopCenter,
        Self::TopRight,
        Self::MiddleLeft,
        Self::MiddleCenter,
        Self::MiddleRight,
        Self::BottomLeft,
        Self::BottomCenter,
        Self::BottomRight,
    ];

    /// Key used in intents and menus.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopCenter => "top-center",
            Self::TopRight => "top-right",
            Self::MiddleLeft => "middle-left",
            Self::MiddleCenter => "middle-center",
            Self::MiddleRight => "middle-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
            Self::BottomRight => "bottom-right",
        }
    }

    /// Look up the alignment directives for this position.
    #[must_use]
    pub fn placement(self) -> Placement {
        let (vertical, horizontal) = match self {
            Self::TopLeft => (Anchor::Start, Anchor::Start),
            Self::TopCenter => (Anchor::Start, Anchor::Center),
            Self::TopRight => (Anchor::Start, Anchor::End),
            Self::MiddleLeft => (Anchor::Center, Anchor::Start),
            Self::MiddleCenter => (Anchor::Center, Anchor::Center),
            Self::MiddleRight => (Anchor::Center, Anchor::End),
            Self::BottomLeft => (Anchor::End, Anchor::Start),
            Self::BottomCenter => (Anchor::End, Anchor::Center),
            Self::BottomRight => (Anchor::End, Anchor::End),
        };
        let text_align = match horizontal {
            Anchor::Start => TextAlign::Left,
            Anchor::Center => TextAlign::Center,
            Anchor::End => TextAlign::Right,
        };
        Placement {
            vertical,
            horizontal,
            text_align,
        }
    }
}

/// A single text shadow layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextShadow {
    /// Horizontal offset in pixels.
    pub dx: f32,
    /// Vertical offset in pixels.
    pub dy: f32,
    /// Blur radius in pixels.
    pub blur: f32,
    /// Shadow color (CSS color syntax).
    pub color: &'static str,
}

/// Decorative effect applied to the text of a preset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Effect {
    /// Shadow layers, first one painted on top.
    pub shadows: &'static [TextShadow],
    /// Fixed letter spacing in pixels.
    pub letter_spacing_px: f32,
    /// Letter spacing relative to the font size.
    pub tracking_em: f32,
    /// Border width around the text box, drawn in the text color.
    pub border_px: Option<f32>,
}

impl Effect {
    /// No decoration.
    pub const NONE: Self = Self {
        shadows: &[],
        letter_spacing_px: 0.0,
        tracking_em: 0.0,
        border_px: None,
    };

    /// Total letter spacing for the given font size.
    #[must_use]
    pub fn letter_spacing(&self, font_size: f32) -> f32 {
        self.letter_spacing_px + self.tracking_em * font_size
    }
}

/// Catalog entry for a style preset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StyleSpec {
    /// Name shown in the style sidebar.
    pub display_name: &'static str,
    /// Render text in upper case.
    pub uppercase: bool,
    /// Render text in bold weight.
    pub bold: bool,
    /// Font family forced by the preset, overriding the user choice.
    pub font_override: Option<FontFamily>,
    /// Decorative effect.
    pub effect: Effect,
}

const MEME_SHADOWS: &[TextShadow] = &[TextShadow {
    dx: 2.0,
    dy: 2.0,
    blur: 0.0,
    color: "#000",
}];

const AESTHETIC_SHADOWS: &[TextShadow] = &[TextShadow {
    dx: 1.0,
    dy: 1.0,
    blur: 2.0,
    color: "rgba(0,0,0,0.3)",
}];

const RETRO_SHADOWS: &[TextShadow] = &[
    TextShadow {
        dx: 3.0,
        dy: 3.0,
        blur: 0.0,
        color: "rgba(255,105,180,0.7)",
    },
    TextShadow {
        dx: -3.0,
        dy: -3.0,
        blur: 0.0,
        color: "rgba(0,255,255,0.7)",
    },
];

const NEON_SHADOWS: &[TextShadow] = &[
    TextShadow { dx: 0.0, dy: 0.0, blur: 7.0, color: "#fff" },
    TextShadow { dx: 0.0, dy: 0.0, blur: 10.0, color: "#fff" },
    TextShadow { dx: 0.0, dy: 0.0, blur: 21.0, color: "#fff" },
    TextShadow { dx: 0.0, dy: 0.0, blur: 42.0, color: "#0fa" },
    TextShadow { dx: 0.0, dy: 0.0, blur: 82.0, color: "#0fa" },
    TextShadow { dx: 0.0, dy: 0.0, blur: 92.0, color: "#0fa" },
];

/// Named bundles of decorative text effects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylePreset {
    /// Plain text.
    #[default]
    Normal,
    /// Bold upper case with a hard drop shadow.
    Meme,
    /// Cursive with a soft shadow and wide spacing.
    Aesthetic,
    /// Monospace in a thin border.
    Minimal,
    /// Serif with offset pink and cyan shadows.
    Retro,
    /// White and green glow.
    Neon,
}

impl StylePreset {
    /// All presets in sidebar order.
    pub const ALL: [Self; 6] = [
        Self::Normal,
        Self::Meme,
        Self::Aesthetic,
        Self::Minimal,
        Self::Retro,
        Self::Neon,
    ];

    /// Key used in intents and menus.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Meme => "meme",
            Self::Aesthetic => "aesthetic",
            Self::Minimal => "minimal",
            Self::Retro => "retro",
            Self::Neon => "neon",
        }
    }

    /// Look up the catalog entry for this preset.
    #[must_use]
    pub fn spec(self) -> StyleSpec {
        match self {
            Self::Normal => StyleSpec {
                display_name: "Normal",
                uppercase: false,
                bold: false,
                font_override: None,
                effect: Effect::NONE,
            },
            Self::Meme => StyleSpec {
                display_name: "Meme",
                uppercase: true,
                bold: true,
                font_override: None,
                effect: Effect {
                    shadows: MEME_SHADOWS,
                    ..Effect::NONE
                },
            },
            Self::Aesthetic => StyleSpec {
                display_name: "Aesthetic",
                uppercase: false,
                bold: false,
                font_override: Some(FontFamily::Cursive),
                effect: Effect {
                    shadows: AESTHETIC_SHADOWS,
                    letter_spacing_px: 2.0,
                    ..Effect::NONE
                },
            },
            Self::Minimal => StyleSpec {
                display_name: "Minimal",
                uppercase: false,
                bold: false,
                font_override: Some(FontFamily::Mono),
                effect: Effect {
                    tracking_em: 0.025,
                    border_px: Some(1.0),
                    ..Effect::NONE
                },
            },
            Self::Retro => StyleSpec {
                display_name: "Retro",
                uppercase: false,
                bold: false,
                font_override: Some(FontFamily::Serif),
                effect: Effect {
                    shadows: RETRO_SHADOWS,
                    ..Effect::NONE
                },
            },
            Self::Neon => StyleSpec {
                display_name: "Neon",
                uppercase: false,
                bold: false,
                font_override: Some(FontFamily::Sans),
                effect: Effect {
                    shadows: NEON_SHADOWS,
                    ..Effect::NONE
                },
            },
        }
    }
}

macro_rules! catalog_str_impls {
    ($ty:ty, $kind:literal) => {
        impl FromStr for $ty {
            type Err = CardError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .into_iter()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| CardError::UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

catalog_str_impls!(FontFamily, "font family");
catalog_str_impls!(Position, "position");
catalog_str_impls!(StylePreset, "style preset");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_parse_roundtrip() {
        for pos in Position::ALL {
            assert_eq!(pos.as_str().parse::<Position>().expect("parse"), pos);
        }
        assert!("center-center".parse::<Position>().is_err());
    }

    #[test]
    fn test_placement_text_align_follows_horizontal_anchor() {
        let p = Position::BottomRight.placement();
        assert_eq!(p.vertical, Anchor::End);
        assert_eq!(p.horizontal, Anchor::End);
        assert_eq!(p.text_align, TextAlign::Right);

        let p = Position::TopLeft.placement();
        assert_eq!(p.text_align, TextAlign::Left);
        assert_eq!(Position::default().placement().text_align, TextAlign::Center);
    }

    #[test]
    fn test_preset_catalog() {
        let meme = StylePreset::Meme.spec();
        assert!(meme.uppercase && meme.bold);
        assert_eq!(meme.effect.shadows.len(), 1);

        assert_eq!(StylePreset::Neon.spec().effect.shadows.len(), 6);
        assert_eq!(StylePreset::Minimal.spec().effect.border_px, Some(1.0));
        assert_eq!(StylePreset::Normal.spec().effect, Effect::NONE);
        assert_eq!(StylePreset::Retro.spec().display_name, "Retro");
    }

    #[test]
    fn test_letter_spacing_combines_px_and_em() {
        let minimal = StylePreset::Minimal.spec().effect;
        assert!((minimal.letter_spacing(40.0) - 1.0).abs() < f32::EPSILON);
        let aesthetic = StylePreset::Aesthetic.spec().effect;
        assert!((aesthetic.letter_spacing(40.0) - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_unknown_preset_is_rejected() {
        let err = "vaporwave".parse::<StylePreset>().unwrap_err();
        assert!(err.to_string().contains("vaporwave"));
    }

    #[test]
    fn test_serde_uses_menu_keys() {
        let json = serde_json::to_string(&Position::BottomRight).expect("json");
        assert_eq!(json, "\"bottom-right\"");
        let font: FontFamily = serde_json::from_str("\"mono\"").expect("font");
        assert_eq!(font, FontFamily::Mono);
    }
}
