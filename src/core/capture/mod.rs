//! Widget image capture
//!
//! Turns a widget into a stored display image through an ordered chain of
//! strategies:
//!
//! 1. **Container snapshot** of the rendered widget
//! 2. **Card snapshot**, for maps whose legend lives on the card
//! 3. **Surface raster** straight from the chart's canvas or SVG
//! 4. **Synthetic render** from the widget's data, for metric tiles and cards
//! 5. **Placeholder** with the title and a notice
//!
//! Each capture + upload pair runs under the capture timeout. The first
//! success wins; the placeholder makes the chain total unless the asset store
//! itself is down.

pub mod chain;
pub mod placeholder;
pub mod profile;
pub mod strategies;
pub mod svg;
pub mod synthetic;

pub use chain::{first_success, CaptureChain};
pub use profile::CaptureProfile;
pub use strategies::{standard_strategies, CaptureStrategy};
