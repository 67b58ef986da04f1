//! Card export pipeline.
//!
//! Rasterizes a [`CardView`], encodes it in the selected format and delivers
//! the artifact through an [`ArtifactSink`] as a download or a share.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use card_core::{CardView, ExportFormat, ExportSettings};

use crate::encode::{encode, EncodeOptions};
use crate::error::{RenderError, RenderResult};
use crate::image::encode_data_uri;
use crate::raster::Rasterizer;

/// Title attached to shared artifacts.
pub const SHARE_TITLE: &str = "FrenStand Creation";

/// How the artifact should reach the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportAction {
    /// Save as a file.
    #[default]
    Download,
    /// Hand to the platform share action, saving instead if unavailable.
    Share,
}

/// What to export and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    /// File name without the `.trenstand.<ext>` suffix.
    pub file_name_base: String,
    /// Output format.
    pub format: ExportFormat,
    /// Delivery.
    pub action: ExportAction,
}

impl ExportRequest {
    /// Build a request from the editor's export settings.
    #[must_use]
    pub fn from_settings(settings: &ExportSettings, action: ExportAction) -> Self {
        Self {
            file_name_base: settings.file_name_base.clone(),
            format: settings.format,
            action,
        }
    }

    /// File name the artifact is saved under.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.format.file_name(&self.file_name_base)
    }
}

/// An encoded card ready for delivery.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    /// `<base>.trenstand.<ext>`.
    pub file_name: String,
    /// Encoded format.
    pub format: ExportFormat,
    /// Encoded bytes.
    pub bytes: Vec<u8>,
    /// Same bytes as a `data:` URI.
    pub data_uri: String,
}

impl ExportArtifact {
    /// MIME type of the encoded bytes.
    #[must_use]
    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }
}

/// How an artifact was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Saved through [`ArtifactSink::save`].
    Saved,
    /// Passed to [`ArtifactSink::share`].
    Shared,
}

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    /// File name of the artifact.
    pub file_name: String,
    /// Encoded size in bytes.
    pub size: usize,
    /// Delivery path taken.
    pub delivery: Delivery,
}

/// Destination for exported artifacts.
pub trait ArtifactSink {
    /// Save the artifact as a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact cannot be written.
    fn save(&self, artifact: &ExportArtifact) -> RenderResult<()>;

    /// Whether a platform share action is available.
    fn can_share(&self) -> bool {
        false
    }

    /// Share the artifact under the given title.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::ShareUnavailable`] unless overridden.
    fn share(&self, artifact: &ExportArtifact, title: &str) -> RenderResult<()> {
        let _ = (artifact, title);
        Err(RenderError::ShareUnavailable)
    }
}

/// Sink that writes artifacts into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Write artifacts into `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Io`] if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> RenderResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactSink for DirectorySink {
    fn save(&self, artifact: &ExportArtifact) -> RenderResult<()> {
        let path = self.dir.join(&artifact.file_name);
        std::fs::write(&path, &artifact.bytes)?;
        tracing::debug!("Wrote {} bytes to {}", artifact.bytes.len(), path.display());
        Ok(())
    }
}

/// Configuration for the export pipeline.
#[derive(Debug, Clone, Default)]
pub struct ExportConfig {
    /// Encoder settings.
    pub encode: EncodeOptions,
}

/// Clears the in-flight flag when the export finishes, successfully or not.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Rasterize, encode and deliver cards.
pub struct ExportPipeline<R> {
    rasterizer: R,
    config: ExportConfig,
    in_flight: AtomicBool,
}

impl<R: Rasterizer> ExportPipeline<R> {
    /// Create a pipeline around a rasterizer.
    #[must_use]
    pub fn new(rasterizer: R, config: ExportConfig) -> Self {
        Self {
            rasterizer,
            config,
            in_flight: AtomicBool::new(false),
        }
    }

    /// The rasterizer.
    #[must_use]
    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// Mutable access to the rasterizer, e.g. to register fonts.
    pub fn rasterizer_mut(&mut self) -> &mut R {
        &mut self.rasterizer
    }

    /// Whether an export is currently running.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Rasterize and encode without delivering.
    ///
    /// # Errors
    ///
    /// Returns an error if rasterization or encoding fails.
    pub fn render(&self, view: &CardView, request: &ExportRequest) -> RenderResult<ExportArtifact> {
        let image = self.rasterizer.rasterize(view)?;
        let bytes = encode(&image, request.format, &self.config.encode)?;
        let data_uri = encode_data_uri(request.format.mime(), &bytes);
        Ok(ExportArtifact {
            file_name: request.file_name(),
            format: request.format,
            bytes,
            data_uri,
        })
    }

    /// Export the card.
    ///
    /// Returns `Ok(None)` when there is no mounted view. A second call while
    /// one is running is rejected with [`RenderError::ExportInFlight`].
    /// Failures are logged and returned; nothing is delivered.
    ///
    /// # Errors
    ///
    /// Returns an error if another export is running or any stage fails.
    pub fn export(
        &self,
        view: Option<&CardView>,
        request: &ExportRequest,
        sink: &dyn ArtifactSink,
    ) -> RenderResult<Option<ExportOutcome>> {
        let Some(view) = view else {
            tracing::debug!("Export requested with no mounted card");
            return Ok(None);
        };

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("Ignoring export request while another is in flight");
            return Err(RenderError::ExportInFlight);
        }
        let _guard = InFlightGuard(&self.in_flight);

        match self.render_and_deliver(view, request, sink) {
            Ok(outcome) => {
                tracing::info!(
                    file = %outcome.file_name,
                    size = outcome.size,
                    delivery = ?outcome.delivery,
                    "Exported card"
                );
                Ok(Some(outcome))
            }
            Err(e) => {
                tracing::error!("Error generating image: {e}");
                Err(e)
            }
        }
    }

    fn render_and_deliver(
        &self,
        view: &CardView,
        request: &ExportRequest,
        sink: &dyn ArtifactSink,
    ) -> RenderResult<ExportOutcome> {
        let artifact = self.render(view, request)?;

        let delivery = match request.action {
            ExportAction::Share if sink.can_share() => {
                sink.share(&artifact, SHARE_TITLE)?;
                Delivery::Shared
            }
            ExportAction::Share => {
                tracing::warn!("Share unavailable, falling back to download");
                sink.save(&artifact)?;
                Delivery::Saved
            }
            ExportAction::Download => {
                sink.save(&artifact)?;
                Delivery::Saved
            }
        };

        Ok(ExportOutcome {
            file_name: artifact.file_name,
            size: artifact.bytes.len(),
            delivery,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::RasterImage;
    use card_core::{BackgroundImage, CardGeometry, PresentationState};
    use std::sync::Mutex;

    struct SolidRasterizer;

    impl Rasterizer for SolidRasterizer {
        fn rasterize(&self, view: &CardView) -> RenderResult<RasterImage> {
            let _ = view;
            Ok(RasterImage {
                width: 2,
                height: 2,
                pixels: [200, 100, 50, 255].repeat(4),
            })
        }
    }

    struct FailingRasterizer;

    impl Rasterizer for FailingRasterizer {
        fn rasterize(&self, _view: &CardView) -> RenderResult<RasterImage> {
            Err(RenderError::Rasterize("tainted image".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        shareable: bool,
        saved: Mutex<Vec<String>>,
        shared: Mutex<Vec<(String, String)>>,
    }

    impl ArtifactSink for RecordingSink {
        fn save(&self, artifact: &ExportArtifact) -> RenderResult<()> {
            self.saved
                .lock()
                .expect("lock")
                .push(artifact.file_name.clone());
            Ok(())
        }

        fn can_share(&self) -> bool {
            self.shareable
        }

        fn share(&self, artifact: &ExportArtifact, title: &str) -> RenderResult<()> {
            self.shared
                .lock()
                .expect("lock")
                .push((artifact.file_name.clone(), title.to_string()));
            Ok(())
        }
    }

    fn view() -> CardView {
        CardView::project(&PresentationState::new(), CardGeometry::square(2.0))
    }

    fn request(format: ExportFormat, action: ExportAction) -> ExportRequest {
        ExportRequest {
            file_name_base: "quote1".to_string(),
            format,
            action,
        }
    }

    #[test]
    fn test_unmounted_view_is_noop() {
        let pipeline = ExportPipeline::new(SolidRasterizer, ExportConfig::default());
        let sink = RecordingSink::default();
        let outcome = pipeline
            .export(None, &request(ExportFormat::Png, ExportAction::Download), &sink)
            .expect("noop");
        assert!(outcome.is_none());
        assert!(sink.saved.lock().expect("lock").is_empty());
    }

    #[test]
    fn test_download_saves_under_trenstand_name() {
        let pipeline = ExportPipeline::new(SolidRasterizer, ExportConfig::default());
        let sink = RecordingSink::default();
        let outcome = pipeline
            .export(Some(&view()), &request(ExportFormat::Jpg, ExportAction::Download), &sink)
            .expect("export")
            .expect("outcome");
        assert_eq!(outcome.file_name, "quote1.trenstand.jpg");
        assert_eq!(outcome.delivery, Delivery::Saved);
        assert_eq!(*sink.saved.lock().expect("lock"), ["quote1.trenstand.jpg"]);
        assert!(!pipeline.is_busy());
    }

    #[test]
    fn test_share_uses_title_when_available() {
        let pipeline = ExportPipeline::new(SolidRasterizer, ExportConfig::default());
        let sink = RecordingSink {
            shareable: true,
            ..RecordingSink::default()
        };
        let outcome = pipeline
            .export(Some(&view()), &request(ExportFormat::Png, ExportAction::Share), &sink)
            .expect("export")
            .expect("outcome");
        assert_eq!(outcome.delivery, Delivery::Shared);
        let shared = sink.shared.lock().expect("lock");
        assert_eq!(shared[0].1, SHARE_TITLE);
        assert!(sink.saved.lock().expect("lock").is_empty());
    }

    #[test]
    fn test_share_falls_back_to_save() {
        let pipeline = ExportPipeline::new(SolidRasterizer, ExportConfig::default());
        let sink = RecordingSink::default();
        let outcome = pipeline
            .export(Some(&view()), &request(ExportFormat::Webp, ExportAction::Share), &sink)
            .expect("export")
            .expect("outcome");
        assert_eq!(outcome.delivery, Delivery::Saved);
        assert_eq!(*sink.saved.lock().expect("lock"), ["quote1.trenstand.webp"]);
    }

    #[test]
    fn test_rasterize_failure_delivers_nothing_and_releases_flag() {
        let pipeline = ExportPipeline::new(FailingRasterizer, ExportConfig::default());
        let sink = RecordingSink::default();
        let err = pipeline
            .export(Some(&view()), &request(ExportFormat::Png, ExportAction::Download), &sink)
            .unwrap_err();
        assert!(matches!(err, RenderError::Rasterize(_)));
        assert!(sink.saved.lock().expect("lock").is_empty());
        assert!(!pipeline.is_busy());
    }

    #[test]
    fn test_artifact_data_uri_matches_bytes() {
        let pipeline = ExportPipeline::new(SolidRasterizer, ExportConfig::default());
        let artifact = pipeline
            .render(&view(), &request(ExportFormat::Png, ExportAction::Download))
            .expect("render");
        assert!(artifact.data_uri.starts_with("data:image/png;base64,"));
        let decoded = BackgroundImage::from_data_uri(&artifact.data_uri).expect("decode");
        assert_eq!(decoded.bytes(), artifact.bytes.as_slice());
        assert_eq!(artifact.mime(), "image/png");
    }

    #[test]
    fn test_request_from_settings() {
        let mut state = PresentationState::new();
        state.set_file_name_base("");
        let req = ExportRequest::from_settings(&state.export, ExportAction::Download);
        assert_eq!(req.file_name(), "my-quote.trenstand.png");
    }

    #[test]
    fn test_directory_sink_writes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = DirectorySink::new(dir.path().join("out")).expect("sink");
        let pipeline = ExportPipeline::new(SolidRasterizer, ExportConfig::default());
        pipeline
            .export(Some(&view()), &request(ExportFormat::Png, ExportAction::Download), &sink)
            .expect("export");
        let written = std::fs::read(sink.dir().join("quote1.trenstand.png")).expect("file");
        assert_eq!(&written[0..4], &[137, 80, 78, 71]);
        assert!(!sink.can_share());
    }
}
