//! # Trenstand Quote Card WASM Application
//!
//! This crate provides the WASM bindings for the quote card editor,
//! enabling it to run in web browsers.
//!
//! ## Usage
//!
//! Build for WASM:
//! ```bash
//! wasm-pack build --target web card-app
//! ```
//!
//! Then import in JavaScript:
//! ```javascript
//! import init, { QuoteCardApp } from './pkg/card_app.js';
//!
//! await init();
//! const app = new QuoteCardApp(800);
//! app.registerFont(new Uint8Array(await (await fetch('Inter.ttf')).arrayBuffer()));
//!
//! textarea.oninput = () => {
//!     app.dispatch(JSON.stringify({ type: 'set_text', data: textarea.value }));
//!     preview.innerHTML = app.previewSvg();
//! };
//! exportButton.onclick = () => app.exportImage(false);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use card_core::{CardError, CardGeometry, Editor, FontSize, Intent, KeyModifiers, Outcome};
use card_renderer::{
    decode_background, ArtifactSink, ExportAction, ExportArtifact, ExportConfig,
    ExportPipeline, ExportRequest, RasterConfig, RenderError, RenderResult, SvgRasterizer,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, FilePropertyBag, HtmlAnchorElement};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init_wasm() {
    console_error_panic_hook::set_once();
    tracing::info!("Quote card WASM initialized");
}

/// Errors surfaced to JavaScript.
#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("{0}")]
    Card(#[from] CardError),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<AppError> for JsValue {
    fn from(err: AppError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

fn dom_error(context: &str, value: &JsValue) -> RenderError {
    RenderError::Export(format!("{context}: {value:?}"))
}

/// Delivers artifacts through the page: anchor downloads and the Web Share API.
struct BrowserSink {
    window: web_sys::Window,
}

impl BrowserSink {
    fn current() -> RenderResult<Self> {
        let window = web_sys::window()
            .ok_or_else(|| RenderError::Export("No window object".to_string()))?;
        Ok(Self { window })
    }

    /// `navigator.share`, if the browser has it.
    fn share_fn(&self) -> Option<js_sys::Function> {
        js_sys::Reflect::get(&self.window.navigator(), &JsValue::from_str("share"))
            .ok()?
            .dyn_into::<js_sys::Function>()
            .ok()
    }
}

impl ArtifactSink for BrowserSink {
    fn save(&self, artifact: &ExportArtifact) -> RenderResult<()> {
        let document = self
            .window
            .document()
            .ok_or_else(|| RenderError::Export("No document object".to_string()))?;
        let anchor = document
            .create_element("a")
            .map_err(|e| dom_error("Failed to create anchor", &e))?
            .dyn_into::<HtmlAnchorElement>()
            .map_err(|e| dom_error("Element is not an anchor", &e))?;

        anchor.set_download(&artifact.file_name);
        anchor.set_href(&artifact.data_uri);
        anchor.click();
        Ok(())
    }

    fn can_share(&self) -> bool {
        self.share_fn().is_some()
    }

    fn share(&self, artifact: &ExportArtifact, title: &str) -> RenderResult<()> {
        let share = self.share_fn().ok_or(RenderError::ShareUnavailable)?;

        let bits = js_sys::Array::of1(&js_sys::Uint8Array::from(artifact.bytes.as_slice()));
        let options = FilePropertyBag::new();
        options.set_type(artifact.mime());
        let file = File::new_with_u8_array_sequence_and_options(&bits, &artifact.file_name, &options)
            .map_err(|e| dom_error("Failed to create file", &e))?;

        let data = js_sys::Object::new();
        js_sys::Reflect::set(&data, &"files".into(), &js_sys::Array::of1(&file))
            .map_err(|e| dom_error("Failed to build share data", &e))?;
        js_sys::Reflect::set(&data, &"title".into(), &JsValue::from_str(title))
            .map_err(|e| dom_error("Failed to build share data", &e))?;

        let promise = share
            .call1(&self.window.navigator(), &data)
            .map_err(|e| dom_error("Share rejected", &e))?
            .dyn_into::<js_sys::Promise>()
            .map_err(|e| dom_error("Share did not return a promise", &e))?;

        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                tracing::warn!("Share was not completed: {:?}", e);
            }
        });
        Ok(())
    }
}

/// The quote card editor bound to a page.
#[wasm_bindgen]
pub struct QuoteCardApp {
    editor: Editor,
    geometry: CardGeometry,
    pipeline: ExportPipeline<SvgRasterizer>,
    mounted: bool,
}

#[wasm_bindgen]
impl QuoteCardApp {
    /// Create an editor for a square card of `size` CSS pixels.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new(size: f32) -> QuoteCardApp {
        let rasterizer = SvgRasterizer::new(RasterConfig {
            scale: 1.0,
            load_system_fonts: false,
        });
        Self {
            editor: Editor::new(),
            geometry: CardGeometry::square(size),
            pipeline: ExportPipeline::new(rasterizer, ExportConfig::default()),
            mounted: true,
        }
    }

    /// Apply an intent given as JSON, e.g. `{"type":"set_text","data":"Hi"}`.
    /// Returns the outcome as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the intent cannot be parsed.
    pub fn dispatch(&mut self, intent_json: &str) -> Result<String, JsValue> {
        let intent: Intent = serde_json::from_str(intent_json).map_err(AppError::from)?;
        let outcome = self.editor.dispatch(intent);
        Ok(outcome_json(&outcome)?)
    }

    /// Forward a key press from the text area. Returns the outcome as JSON;
    /// when `suppress_default` is set the page should take the new text and
    /// move the caret to `caret`.
    ///
    /// `caret` is the textarea's `selectionStart`, in UTF-16 code units. The
    /// returned caret uses the same units.
    ///
    /// # Errors
    ///
    /// Returns an error if the outcome cannot be serialized.
    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, key: &str, shift: bool, caret: usize) -> Result<String, JsValue> {
        let caret = char_offset_from_utf16(&self.editor.state().text, caret);
        let mut outcome = self.editor.dispatch(Intent::KeyDown {
            key: key.to_string(),
            modifiers: KeyModifiers {
                shift,
                ..KeyModifiers::default()
            },
            caret,
        });
        outcome.caret = outcome
            .caret
            .map(|chars| utf16_offset_from_chars(&self.editor.state().text, chars));
        Ok(outcome_json(&outcome)?)
    }

    /// Apply free-text font size entry. Out-of-range values are clamped.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a number.
    #[wasm_bindgen(js_name = setFontSizeText)]
    pub fn set_font_size_text(&mut self, text: &str) -> Result<bool, JsValue> {
        let size = FontSize::parse(text).map_err(AppError::from)?;
        Ok(self
            .editor
            .dispatch(Intent::SetFontSize(f64::from(size.px())))
            .changed)
    }

    /// Handle a file chosen in the background picker.
    ///
    /// Undecodable files are logged and ignored. Returns whether the image
    /// was applied.
    #[wasm_bindgen(js_name = loadBackground)]
    pub fn load_background(&mut self, bytes: Vec<u8>, mime: &str, name: &str) -> bool {
        self.editor
            .dispatch(Intent::SelectBackgroundFile(Some(name.to_string())));
        match decode_background(bytes, mime) {
            Ok(loaded) => {
                self.editor
                    .dispatch(Intent::BackgroundImageLoaded(loaded.image));
                true
            }
            Err(e) => {
                tracing::warn!("Ignoring background file {name}: {e}");
                false
            }
        }
    }

    /// Step back in history.
    pub fn undo(&mut self) -> bool {
        self.editor.undo()
    }

    /// Step forward in history.
    pub fn redo(&mut self) -> bool {
        self.editor.redo()
    }

    /// Whether undo is available.
    #[wasm_bindgen(js_name = canUndo)]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    /// Whether redo is available.
    #[wasm_bindgen(js_name = canRedo)]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    /// Current presentation state as JSON, for binding the controls.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be serialized.
    #[wasm_bindgen(js_name = stateJson)]
    pub fn state_json(&self) -> Result<String, JsValue> {
        Ok(serde_json::to_string(self.editor.state()).map_err(AppError::from)?)
    }

    /// SVG markup of the live preview.
    #[wasm_bindgen(js_name = previewSvg)]
    #[must_use]
    pub fn preview_svg(&self) -> String {
        self.pipeline
            .rasterizer()
            .to_svg(&self.editor.view(self.geometry))
    }

    /// Register font data (TTF/OTF) for exported text.
    #[wasm_bindgen(js_name = registerFont)]
    pub fn register_font(&mut self, bytes: Vec<u8>) {
        self.pipeline.rasterizer_mut().register_font(bytes);
    }

    /// Mark whether the card preview is attached to the page. Exports are
    /// skipped while it is not.
    #[wasm_bindgen(js_name = setMounted)]
    pub fn set_mounted(&mut self, mounted: bool) {
        self.mounted = mounted;
    }

    /// Whether an export is running.
    #[wasm_bindgen(js_name = isExporting)]
    #[must_use]
    pub fn is_exporting(&self) -> bool {
        self.pipeline.is_busy()
    }

    /// Export the card with the current file name and format, downloading
    /// it or, when `share` is set and supported, handing it to the share
    /// sheet. Closes the export prompt on success and returns the file name.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering, encoding or delivery fails.
    #[wasm_bindgen(js_name = exportImage)]
    pub fn export_image(&mut self, share: bool) -> Result<Option<String>, JsValue> {
        let action = if share {
            ExportAction::Share
        } else {
            ExportAction::Download
        };
        let request = ExportRequest::from_settings(&self.editor.state().export, action);
        let view = self.mounted.then(|| self.editor.view(self.geometry));
        let sink = BrowserSink::current().map_err(AppError::from)?;

        let outcome = self
            .pipeline
            .export(view.as_ref(), &request, &sink)
            .map_err(AppError::from)?;

        Ok(outcome.map(|outcome| {
            tracing::debug!(delivery = ?outcome.delivery, "Closing export prompt");
            self.editor.dispatch(Intent::CloseExportPrompt);
            outcome.file_name
        }))
    }
}

/// Character offset for a caret counted in UTF-16 code units. A caret inside
/// a surrogate pair moves past the whole character.
fn char_offset_from_utf16(text: &str, units: usize) -> usize {
    let mut seen = 0;
    for (index, c) in text.chars().enumerate() {
        if seen >= units {
            return index;
        }
        seen += c.len_utf16();
    }
    text.chars().count()
}

/// UTF-16 length of the first `chars` characters of `text`.
fn utf16_offset_from_chars(text: &str, chars: usize) -> usize {
    text.chars().take(chars).map(char::len_utf16).sum()
}

fn outcome_json(outcome: &Outcome) -> Result<String, AppError> {
    Ok(serde_json::to_string(outcome)?)
}
