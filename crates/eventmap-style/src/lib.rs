//! # EventMap Style
//!
//! Theme-aware recoloring of the map style.
//!
//! - [`palette`]: color tokens per theme mode and the resolved [`Palette`]
//! - [`classify`]: the pure `(layer type, id) -> class` rules
//! - [`theme`]: the best-effort [`apply_theme`] pass
//! - [`provider`]: mounting and re-theming on style and mode changes
//! - [`selector`]: base style options and their coupling to the theme mode
//!
//! ## Example
//!
//! ```
//! use eventmap_core::style::LayerType;
//! use eventmap_style::classify::{classify, LayerClass};
//!
//! assert_eq!(classify(&LayerType::Line, "road-primary"), Some(LayerClass::MajorRoad));
//! assert_eq!(classify(&LayerType::Fill, "mystery-layer-42"), None);
//! ```

pub mod classify;
pub mod palette;
pub mod provider;
pub mod selector;
pub mod theme;

pub use classify::{classify, LayerClass, PaintWrite};
pub use palette::{resolve_palette, Palette, ThemeTokens, TokenSheet};
pub use provider::ThemeController;
pub use selector::{StyleOption, StyleSelector};
pub use theme::{apply_theme, ThemeReport};
