//! # Trenstand Quote Card CLI
//!
//! Headless host for the quote card editor. A script of editor intents is
//! replayed against a fresh editor and every `export` step writes an image
//! into the output directory.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p card-cli -- render --script card.json --out-dir out --system-fonts
//! ```
//!
//! ## Script format
//!
//! A JSON array of steps. Editor intents use their usual encoding, plus two
//! host steps:
//!
//! ```json
//! [
//!   { "type": "set_text", "data": "Hello\nWorld" },
//!   { "type": "set_position", "data": "bottom-right" },
//!   { "type": "load_background", "data": { "path": "sunset.jpg" } },
//!   { "type": "undo" },
//!   { "type": "export", "data": { "action": "download" } }
//! ]
//! ```
//!
//! Relative paths are resolved against the script's directory.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use card_core::{CardGeometry, Editor, Intent};
use card_renderer::image::ImageFormat;
use card_renderer::{
    decode_background, DirectorySink, ExportAction, ExportConfig, ExportOutcome, ExportPipeline,
    ExportRequest, RasterConfig, SvgRasterizer,
};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

/// Command-line arguments for quotecard.
#[derive(Debug, Clone, Parser)]
#[command(name = "quotecard")]
#[command(about = "Render Trenstand quote cards from editor scripts")]
#[command(version)]
pub struct CliArgs {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Replay a script and export the resulting cards
    Render(RenderArgs),
}

/// Arguments for `quotecard render`.
#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    /// JSON script of editor steps
    #[arg(long, env = "QUOTECARD_SCRIPT")]
    pub script: PathBuf,

    /// Directory exported images are written to
    #[arg(long, env = "QUOTECARD_OUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Card edge length in CSS pixels
    #[arg(long, env = "QUOTECARD_SIZE", default_value = "800")]
    pub size: f32,

    /// Device pixel ratio applied to exports
    #[arg(long, env = "QUOTECARD_SCALE", default_value = "1.0")]
    pub scale: f32,

    /// Load the fonts installed on this machine
    #[arg(long, env = "QUOTECARD_SYSTEM_FONTS")]
    pub system_fonts: bool,

    /// Extra font files (TTF/OTF) to register, repeatable
    #[arg(long = "font", env = "QUOTECARD_FONTS", value_delimiter = ',')]
    pub fonts: Vec<PathBuf>,
}

/// Steps only the host can perform.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum HostStep {
    /// Read an image file and use it as the background.
    LoadBackground {
        /// Image path.
        path: PathBuf,
    },
    /// Export the card with the current export settings.
    Export {
        /// Download (write to disk) or share.
        #[serde(default)]
        action: ExportAction,
    },
}

/// One step of a script.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStep {
    /// A host step.
    Host(HostStep),
    /// An editor intent.
    Intent(Intent),
}

impl ScriptStep {
    /// `type` tags handled by the host rather than the editor.
    const HOST_TYPES: [&'static str; 2] = ["load_background", "export"];

    fn from_value(value: serde_json::Value) -> anyhow::Result<Self> {
        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned)
            .context("Step has no \"type\"")?;

        if Self::HOST_TYPES.contains(&kind.as_str()) {
            serde_json::from_value(value)
                .map(Self::Host)
                .with_context(|| format!("Malformed `{kind}` step"))
        } else {
            serde_json::from_value(value)
                .map(Self::Intent)
                .with_context(|| format!("Unknown or malformed step `{kind}`"))
        }
    }
}

/// Parse a script document.
///
/// # Errors
///
/// Returns an error if the JSON is not an array, or names the index of the
/// first step that is not a known host step or editor intent.
pub fn parse_script(json: &str) -> anyhow::Result<Vec<ScriptStep>> {
    let raw: Vec<serde_json::Value> =
        serde_json::from_str(json).context("Script must be a JSON array of steps")?;
    raw.into_iter()
        .enumerate()
        .map(|(index, value)| {
            ScriptStep::from_value(value).with_context(|| format!("Invalid script step {index}"))
        })
        .collect()
}

/// Replay a script and return the completed exports.
///
/// # Errors
///
/// Returns an error if the script, a font or an export fails. Background
/// files that cannot be decoded are logged and skipped.
pub async fn run_render(args: &RenderArgs) -> anyhow::Result<Vec<ExportOutcome>> {
    let source = tokio::fs::read_to_string(&args.script)
        .await
        .with_context(|| format!("Failed to read script {}", args.script.display()))?;
    let steps = parse_script(&source)?;
    let base_dir = args
        .script
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let mut rasterizer = SvgRasterizer::new(RasterConfig {
        scale: args.scale,
        load_system_fonts: args.system_fonts,
    });
    for font in &args.fonts {
        let data = tokio::fs::read(font)
            .await
            .with_context(|| format!("Failed to read font {}", font.display()))?;
        rasterizer.register_font(data);
    }
    if rasterizer.font_count() == 0 {
        tracing::warn!("No fonts available, card text will not be drawn");
    }

    let pipeline = Arc::new(ExportPipeline::new(rasterizer, ExportConfig::default()));
    let sink = Arc::new(
        DirectorySink::new(&args.out_dir)
            .with_context(|| format!("Failed to create {}", args.out_dir.display()))?,
    );
    let geometry = CardGeometry::square(args.size);
    let mut editor = Editor::new();
    let mut exports = Vec::new();

    tracing::info!("Replaying {} script steps", steps.len());
    for (index, step) in steps.into_iter().enumerate() {
        match step {
            ScriptStep::Intent(intent) => {
                let name = intent.name();
                let outcome = editor.dispatch(intent);
                tracing::debug!(step = index, intent = name, changed = outcome.changed, "Applied intent");
            }
            ScriptStep::Host(HostStep::LoadBackground { path }) => {
                load_background(&mut editor, &base_dir.join(path)).await?;
            }
            ScriptStep::Host(HostStep::Export { action }) => {
                let request = ExportRequest::from_settings(&editor.state().export, action);
                let view = editor.view(geometry);
                let pipeline = Arc::clone(&pipeline);
                let sink = Arc::clone(&sink);

                let outcome = tokio::task::spawn_blocking(move || {
                    pipeline.export(Some(&view), &request, sink.as_ref())
                })
                .await
                .context("Export task panicked")?
                .with_context(|| format!("Export at step {index} failed"))?;

                if let Some(outcome) = outcome {
                    editor.dispatch(Intent::CloseExportPrompt);
                    exports.push(outcome);
                }
            }
        }
    }

    Ok(exports)
}

async fn load_background(editor: &mut Editor, path: &Path) -> anyhow::Result<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());
    editor.dispatch(Intent::SelectBackgroundFile(name));

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read background {}", path.display()))?;
    let declared = path
        .extension()
        .and_then(|ext| ImageFormat::from_extension(&ext.to_string_lossy()).mime())
        .unwrap_or("application/octet-stream");

    match decode_background(bytes, declared) {
        Ok(loaded) => {
            tracing::debug!(
                "Background {} is {}x{}",
                path.display(),
                loaded.width,
                loaded.height
            );
            editor.dispatch(Intent::BackgroundImageLoaded(loaded.image));
        }
        Err(e) => tracing::warn!("Ignoring background {}: {e}", path.display()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use card_core::{Color, Position};

    #[test]
    fn test_parse_mixed_script() {
        let steps = parse_script(
            r##"[
                {"type": "set_text", "data": "Hi"},
                {"type": "set_position", "data": "top-left"},
                {"type": "set_background_color", "data": "#112233"},
                {"type": "load_background", "data": {"path": "bg.png"}},
                {"type": "undo"},
                {"type": "export", "data": {}},
                {"type": "export", "data": {"action": "share"}}
            ]"##,
        )
        .expect("script");

        assert_eq!(steps.len(), 7);
        assert_eq!(steps[0], ScriptStep::Intent(Intent::SetText("Hi".to_string())));
        assert_eq!(
            steps[1],
            ScriptStep::Intent(Intent::SetPosition(Position::TopLeft))
        );
        assert_eq!(
            steps[2],
            ScriptStep::Intent(Intent::SetBackgroundColor(Color::new("#112233")))
        );
        assert_eq!(
            steps[3],
            ScriptStep::Host(HostStep::LoadBackground {
                path: PathBuf::from("bg.png")
            })
        );
        assert_eq!(steps[4], ScriptStep::Intent(Intent::Undo));
        assert_eq!(
            steps[5],
            ScriptStep::Host(HostStep::Export {
                action: ExportAction::Download
            })
        );
        assert_eq!(
            steps[6],
            ScriptStep::Host(HostStep::Export {
                action: ExportAction::Share
            })
        );
    }

    #[test]
    fn test_unknown_step_is_rejected() {
        assert!(parse_script(r#"[{"type": "explode"}]"#).is_err());
        assert!(parse_script(r#"{"type": "undo"}"#).is_err());
        assert!(parse_script(r#"[{"data": "no type"}]"#).is_err());
    }

    #[test]
    fn test_misspelled_step_names_index_and_type() {
        let err = parse_script(
            r#"[
                {"type": "set_text", "data": "Hi"},
                {"type": "load_backgrond", "data": {"path": "bg.png"}}
            ]"#,
        )
        .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("Invalid script step 1"), "{message}");
        assert!(message.contains("load_backgrond"), "{message}");
    }

    #[test]
    fn test_malformed_host_step_is_reported() {
        let err = parse_script(r#"[{"type": "load_background", "data": {}}]"#).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("Invalid script step 0"), "{message}");
        assert!(message.contains("Malformed `load_background` step"), "{message}");
    }

    #[test]
    fn test_cli_defaults() {
        let args = CliArgs::try_parse_from(["quotecard", "render", "--script", "card.json"])
            .expect("args");
        let Command::Render(render) = args.command;
        assert_eq!(render.script, PathBuf::from("card.json"));
        assert_eq!(render.out_dir, PathBuf::from("."));
        assert!((render.size - 800.0).abs() < f32::EPSILON);
        assert!((render.scale - 1.0).abs() < f32::EPSILON);
        assert!(!render.system_fonts);
        assert!(render.fonts.is_empty());
    }

    #[test]
    fn test_cli_requires_script() {
        std::env::remove_var("QUOTECARD_SCRIPT");
        let err = CliArgs::try_parse_from(["quotecard", "render"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
