//! # Trenstand Card Renderer
//!
//! Turns card views into image files.
//!
//! ## Export Pipeline
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌─────────┐   ┌──────────────┐
//! │ CardView │──▶│ Rasterizer │──▶│ Encoder │──▶│ ArtifactSink │
//! │          │   │ SVG+resvg  │   │ png/jpg │   │ save / share │
//! └──────────┘   └────────────┘   │ webp    │   └──────────────┘
//!                                 └─────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod encode;
pub mod error;
pub mod export;
pub mod image;
pub mod raster;
pub mod svg;

pub use encode::EncodeOptions;
pub use error::{RenderError, RenderResult};
pub use export::{
    ArtifactSink, Delivery, DirectorySink, ExportAction, ExportArtifact, ExportConfig,
    ExportOutcome, ExportPipeline, ExportRequest, SHARE_TITLE,
};
pub use image::{decode_background, LoadedBackground};
pub use raster::{RasterConfig, RasterImage, Rasterizer, SvgRasterizer};
