//! # Trenstand Card Core
//!
//! Presentation state, undo history and view projection for the quote card
//! editor. Pure logic: no rendering or platform dependencies, so the same
//! session model drives the browser app and the headless CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 card-core                   │
//! ├─────────────────────────────────────────────┤
//! │  Intents         │  Editor                  │
//! │  - Setters       │  - Reducer               │
//! │  - Key handling  │  - History log           │
//! ├─────────────────────────────────────────────┤
//! │  Catalogs        │  View projection         │
//! │  - Style presets │  - Text layout           │
//! │  - Positions     │  - Background layer      │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod editor;
pub mod error;
pub mod history;
pub mod intent;
pub mod state;
pub mod view;

pub use catalog::{
    Anchor, Effect, FontFamily, Placement, Position, StylePreset, StyleSpec, TextAlign, TextShadow,
};
pub use editor::Editor;
pub use error::{CardError, CardResult};
pub use history::{HistoryLog, HistorySnapshot};
pub use intent::{Intent, KeyModifiers, Outcome};
pub use state::{
    BackgroundImage, Color, ExportFormat, ExportSettings, FontSize, PresentationState,
};
pub use view::{Background, CardGeometry, CardView, TextBlock, TextLine};

/// Card core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
