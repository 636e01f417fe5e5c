//! Presentation layer
//!
//! The layout engine computes the exported page; the PDF writer and the
//! raster preview draw it. The prompt module is the terminal wizard.

pub mod layout;
pub mod pdf;
pub mod prompt;
pub mod renderer;

pub use layout::{DocumentLayout, DrawOp, LayoutError, LayoutMetrics, PageMetrics};
pub use pdf::{PdfError, render_pdf};
pub use renderer::{PreviewRenderer, RendererError};
