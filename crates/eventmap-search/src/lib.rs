//! # EventMap Search
//!
//! Place search for the event map: a [`Geocoder`] abstraction with a Photon
//! backend, normalization into [`LocationFeature`]s, and the debounced
//! [`SearchPipeline`] behind the search box.

pub mod feature;
pub mod geocoder;
pub mod pipeline;

pub use feature::{icon_for, LocationFeature};
pub use geocoder::{Geocoder, PhotonGeocoder, SearchError};
pub use pipeline::{SearchPipeline, SearchState};
