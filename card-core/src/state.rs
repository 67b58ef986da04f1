//! Presentation state: every user-chosen attribute of the card.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::{CardError, CardResult, FontFamily, Position, StylePreset};

/// Default card background color.
pub const DEFAULT_BACKGROUND_COLOR: &str = "#f3f4f6";

/// Default text color.
pub const DEFAULT_TEXT_COLOR: &str = "#000000";

/// Default text background color.
pub const DEFAULT_TEXT_BACKGROUND_COLOR: &str = "transparent";

/// Default export file name base.
pub const DEFAULT_FILE_NAME_BASE: &str = "my-quote";

/// A color value as entered by the user.
///
/// Either a hex string or the sentinel `transparent`. Not validated: the
/// renderer passes it through as CSS color syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    /// The `transparent` sentinel.
    #[must_use]
    pub fn transparent() -> Self {
        Self(DEFAULT_TEXT_BACKGROUND_COLOR.to_string())
    }

    /// Create a color from any string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Whether this is the `transparent` sentinel.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.0.trim().eq_ignore_ascii_case("transparent")
    }

    /// The raw color string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Color {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Font size in whole pixels, always within [`FontSize::MIN`, `FontSize::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "u32")]
pub struct FontSize(u32);

impl FontSize {
    /// Smallest allowed size.
    pub const MIN: u32 = 12;
    /// Largest allowed size.
    pub const MAX: u32 = 72;
    /// Size at session start.
    pub const DEFAULT: Self = Self(24);

    /// Coerce a numeric input to a whole, in-range size.
    ///
    /// Returns `None` for NaN or infinite input.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn clamped(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let rounded = value
            .round()
            .clamp(f64::from(Self::MIN), f64::from(Self::MAX));
        Some(Self(rounded as u32))
    }

    /// Parse free-text entry, clamping the result.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::InvalidFontSize`] if the text is not a finite number.
    pub fn parse(text: &str) -> CardResult<Self> {
        text.trim()
            .parse::<f64>()
            .ok()
            .and_then(Self::clamped)
            .ok_or_else(|| CardError::InvalidFontSize(text.to_string()))
    }

    /// Size in pixels.
    #[must_use]
    pub fn px(self) -> u32 {
        self.0
    }
}

impl Default for FontSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for FontSize {
    type Error = CardError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::clamped(value).ok_or_else(|| CardError::InvalidFontSize(value.to_string()))
    }
}

impl From<FontSize> for u32 {
    fn from(size: FontSize) -> Self {
        size.0
    }
}

/// An uploaded background image payload.
///
/// Serialized as a `data:` URI so intents stay plain JSON.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BackgroundImage {
    mime: String,
    bytes: Vec<u8>,
}

impl BackgroundImage {
    /// Wrap raw image bytes with their MIME type.
    #[must_use]
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    /// Parse a base64 `data:` URI, e.g. `data:image/png;base64,iVBOR...`.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::InvalidDataUri`] if the URI is not base64 encoded
    /// image data.
    pub fn from_data_uri(uri: &str) -> CardResult<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| CardError::InvalidDataUri("missing data: prefix".to_string()))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| CardError::InvalidDataUri("missing comma".to_string()))?;
        let mime = meta
            .strip_suffix(";base64")
            .ok_or_else(|| CardError::InvalidDataUri("only base64 payloads are supported".to_string()))?;
        if !mime.starts_with("image/") {
            return Err(CardError::InvalidDataUri(format!("not an image type: {mime}")));
        }
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| CardError::InvalidDataUri(e.to_string()))?;
        Ok(Self::new(mime, bytes))
    }

    /// Encode as a base64 `data:` URI.
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{encoded}", self.mime)
    }

    /// MIME type of the payload.
    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Raw encoded image bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for BackgroundImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackgroundImage")
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl TryFrom<String> for BackgroundImage {
    type Error = CardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_data_uri(&value)
    }
}

impl From<BackgroundImage> for String {
    fn from(image: BackgroundImage) -> Self {
        image.to_data_uri()
    }
}

/// Export file format offered in the format selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// PNG (default).
    #[default]
    Png,
    /// JPEG.
    Jpg,
    /// WebP.
    Webp,
}

impl ExportFormat {
    /// All formats in selector order.
    pub const ALL: [Self; 3] = [Self::Png, Self::Jpg, Self::Webp];

    /// File extension, also the selector key.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Webp => "webp",
        }
    }

    /// MIME type of the encoded artifact.
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    /// Build the artifact file name `<base>.trenstand.<ext>`.
    ///
    /// The base is used as typed; only an empty base falls back to
    /// [`DEFAULT_FILE_NAME_BASE`].
    #[must_use]
    pub fn file_name(self, base: &str) -> String {
        let base = if base.is_empty() {
            DEFAULT_FILE_NAME_BASE
        } else {
            base
        };
        format!("{base}.trenstand.{}", self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "webp" => Ok(Self::Webp),
            _ => Err(CardError::UnknownVariant {
                kind: "export format",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Export-only attributes; never part of the visual state or history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// File name without the `.trenstand.<ext>` suffix.
    pub file_name_base: String,
    /// Selected output format.
    pub format: ExportFormat,
    /// Whether the file name prompt is showing.
    pub prompt_open: bool,
}

impl ExportSettings {
    /// File name the next export will be saved under.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.format.file_name(&self.file_name_base)
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            file_name_base: DEFAULT_FILE_NAME_BASE.to_string(),
            format: ExportFormat::default(),
            prompt_open: false,
        }
    }
}

/// The complete presentation state of a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationState {
    /// Quote text; may contain line breaks.
    pub text: String,
    /// Card background color, hidden while a background image is set.
    pub background_color: Color,
    /// Text color.
    pub text_color: Color,
    /// Fill behind the text box.
    pub text_background_color: Color,
    /// Font size in pixels.
    pub font_size: FontSize,
    /// Anchor position of the text box.
    pub position: Position,
    /// User-chosen font family.
    pub font_family: FontFamily,
    /// Decorative preset.
    pub style_preset: StylePreset,
    /// Uploaded background image, takes precedence over the color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<BackgroundImage>,
    /// File currently selected in the file picker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_input: Option<String>,
    /// Export attributes.
    pub export: ExportSettings,
}

impl PresentationState {
    /// Create a state with all defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            text: String::new(),
            background_color: Color::new(DEFAULT_BACKGROUND_COLOR),
            text_color: Color::new(DEFAULT_TEXT_COLOR),
            text_background_color: Color::transparent(),
            font_size: FontSize::DEFAULT,
            position: Position::default(),
            font_family: FontFamily::default(),
            style_preset: StylePreset::default(),
            background_image: None,
            file_input: None,
            export: ExportSettings::default(),
        }
    }

    /// Replace the text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Replace the background color.
    pub fn set_background_color(&mut self, color: Color) {
        self.background_color = color;
    }

    /// Replace the text color.
    pub fn set_text_color(&mut self, color: Color) {
        self.text_color = color;
    }

    /// Replace the text background color.
    pub fn set_text_background_color(&mut self, color: Color) {
        self.text_background_color = color;
    }

    /// Set the font size from slider or free entry.
    ///
    /// The value is rounded and clamped; non-finite input leaves the size
    /// unchanged and returns `false`.
    pub fn set_font_size(&mut self, value: f64) -> bool {
        match FontSize::clamped(value) {
            Some(size) => {
                self.font_size = size;
                true
            }
            None => {
                tracing::debug!("Ignoring non-finite font size {value}");
                false
            }
        }
    }

    /// Replace the position.
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Replace the font family.
    pub fn set_font_family(&mut self, family: FontFamily) {
        self.font_family = family;
    }

    /// Replace the style preset.
    pub fn set_style_preset(&mut self, preset: StylePreset) {
        self.style_preset = preset;
    }

    /// Record the file picker selection. `None` means the dialog was
    /// cancelled, which is ignored.
    pub fn select_background_file(&mut self, file_name: Option<String>) {
        if let Some(name) = file_name {
            self.file_input = Some(name);
        }
    }

    /// Replace the background image.
    pub fn set_background_image(&mut self, image: BackgroundImage) {
        self.background_image = Some(image);
    }

    /// Replace the export file name base.
    pub fn set_file_name_base(&mut self, base: impl Into<String>) {
        self.export.file_name_base = base.into();
    }

    /// Replace the export format.
    pub fn set_export_format(&mut self, format: ExportFormat) {
        self.export.format = format;
    }

    /// Show the file name prompt.
    pub fn open_export_prompt(&mut self) {
        self.export.prompt_open = true;
    }

    /// Hide the file name prompt.
    pub fn close_export_prompt(&mut self) {
        self.export.prompt_open = false;
    }

    /// Restore the three colors to their defaults.
    pub fn reset_colors(&mut self) {
        self.background_color = Color::new(DEFAULT_BACKGROUND_COLOR);
        self.text_color = Color::new(DEFAULT_TEXT_COLOR);
        self.text_background_color = Color::transparent();
    }

    /// Drop the background image and the file picker selection.
    pub fn reset_background_image(&mut self) {
        self.background_image = None;
        self.file_input = None;
    }

    /// Insert a line break at `caret` (a character offset, clamped to the
    /// text length). Returns the caret position after the break.
    pub fn insert_line_break(&mut self, caret: usize) -> usize {
        let caret = caret.min(self.text.chars().count());
        let byte_index = self
            .text
            .char_indices()
            .nth(caret)
            .map_or(self.text.len(), |(i, _)| i);
        self.text.insert(byte_index, '\n');
        caret + 1
    }

    /// Style preset font override, or the user choice.
    #[must_use]
    pub fn effective_font_family(&self) -> FontFamily {
        self.style_preset
            .spec()
            .font_override
            .unwrap_or(self.font_family)
    }
}

impl Default for PresentationState {
    fn default() -> Self {
        Self::new()
    }
}
