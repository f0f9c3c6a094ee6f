//! # EventMap Core
//!
//! Core types, error handling, and configuration for the EventMap interactive
//! event map.
//!
//! - **Types**: geographic points, event records and resolved event
//!   locations, viewport geometry.
//! - **Events**: the validated event catalog and coordinate resolution.
//! - **Style**: the layer model of a map style.
//! - **Engine**: the map engine contract, the shared [`MapContext`] handle,
//!   and [`HeadlessMap`], an in-memory engine.
//! - **Errors / Configuration**: `thiserror` error taxonomy and a YAML
//!   configuration with environment overrides.
//!
//! ## Example
//!
//! ```
//! use eventmap_core::events::to_lng_lat;
//!
//! let point = to_lng_lat(50.0, 50.0);
//! assert_eq!(point.longitude, 0.0);
//! assert_eq!(point.latitude, 0.0);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod headless;
pub mod style;
pub mod types;

// Re-export commonly used types for convenience
pub use config::{AppConfig, ThemeMode};
pub use engine::{MapContext, MapEngine, MapEvent, MarkerId, PointerKind};
pub use error::{EngineError, EventMapError, Result};
pub use events::EventCatalog;
pub use headless::HeadlessMap;
pub use types::{EventLocation, EventRecord, GeoPoint, Padding, ScreenPoint, ScreenSize};
