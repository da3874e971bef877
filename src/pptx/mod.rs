//! Minimal PresentationML reading and writing: enough to inspect a
//! template's layouts and append new slides built from them.

pub mod blank;
pub mod chart;
pub mod content_types;
pub mod deck;
pub mod error;
pub mod inspect;
pub mod layout;
pub mod package;
pub mod presentation;
pub mod rels;
pub mod slide;
mod xml;

pub use chart::{ChartKind, ChartPlot, ChartStyle, Grouping};
pub use deck::{Deck, Fill, PngImage, Template};
pub use error::PptxError;
pub use layout::{Layout, LayoutInfo, PlaceholderInfo, PlaceholderKind, PlaceholderShape, Rect};
pub use package::Package;
