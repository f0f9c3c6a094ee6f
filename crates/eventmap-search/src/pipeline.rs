//! Debounced search-as-you-type.
//!
//! Each keystroke restarts the debounce timer. When it fires, a geocode
//! request runs in its own task and is not cancelled by later keystrokes.
//! Every query change bumps a generation counter and a response is applied
//! only if its generation is still current, so a slow stale response can
//! never overwrite newer results.

use crate::feature::LocationFeature;
use crate::geocoder::Geocoder;
use eventmap_core::config::SearchConfig;
use eventmap_core::engine::{FlyToOptions, MapContext};
use metrics::{counter, describe_counter};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Zoom level the camera flies to for a selected result.
pub const SELECT_ZOOM: f64 = 14.0;
pub const SELECT_SPEED: f64 = 4.0;
pub const SELECT_DURATION: Duration = Duration::from_millis(1000);

/// Display value used when the selected result has no name.
const UNNAMED_SELECTION: &str = "Selected location";

/// Snapshot of everything the search box renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchState {
    /// Raw text being searched for
    pub query: String,
    /// Text shown in the input
    pub display_value: String,
    pub results: Vec<LocationFeature>,
    pub searching: bool,
    /// Whether the result list is shown
    pub open: bool,
    /// Locations picked from the results, shown as markers
    pub selected_locations: Vec<LocationFeature>,
    /// Location whose popup is shown
    pub active_location: Option<LocationFeature>,
}

#[derive(Debug, Default)]
struct Shared {
    state: SearchState,
    generation: u64,
}

/// Registers descriptions for the geocoding counters.
pub fn describe_metrics() {
    describe_counter!("geocode_requests_total", "Geocode requests issued");
    describe_counter!("geocode_failures_total", "Geocode requests that failed");
    describe_counter!("geocode_stale_responses_total", "Geocode responses discarded as stale");
}

/// The search box state machine.
///
/// Query changes spawn onto the ambient tokio runtime. Without one the
/// state still updates but no request is scheduled.
pub struct SearchPipeline {
    geocoder: Arc<dyn Geocoder>,
    shared: Arc<Mutex<Shared>>,
    debounce: Duration,
    limit: usize,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl SearchPipeline {
    pub fn new(geocoder: Arc<dyn Geocoder>, debounce: Duration, limit: usize) -> Self {
        Self {
            geocoder,
            shared: Arc::new(Mutex::new(Shared::default())),
            debounce,
            limit,
            pending: Mutex::new(None),
        }
    }

    pub fn from_config(geocoder: Arc<dyn Geocoder>, config: &SearchConfig) -> Self {
        Self::new(geocoder, config.debounce(), config.limit)
    }

    pub fn state(&self) -> SearchState {
        self.shared.lock().state.clone()
    }

    /// Current request generation.
    pub fn generation(&self) -> u64 {
        self.shared.lock().generation
    }

    /// Handles an edit of the search input.
    ///
    /// A blank query clears and closes the result list at once and issues
    /// no request. Anything else is looked up once input has been quiet for
    /// the debounce delay.
    pub fn on_query_change(&self, text: &str) {
        let generation = {
            let mut shared = self.shared.lock();
            shared.generation += 1;
            shared.state.query = text.to_string();
            shared.state.display_value = text.to_string();
            if text.trim().is_empty() {
                shared.state.results.clear();
                shared.state.open = false;
                shared.state.searching = false;
            }
            shared.generation
        };

        self.cancel_debounce();
        if text.trim().is_empty() {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(query = %text, "No tokio runtime, search not scheduled");
            return;
        };

        let query = text.to_string();
        let shared = Arc::clone(&self.shared);
        let geocoder = Arc::clone(&self.geocoder);
        let (debounce, limit) = (self.debounce, self.limit);

        let handle = runtime.spawn(async move {
            tokio::time::sleep(debounce).await;
            // the request outlives later keystrokes
            tokio::spawn(run_query(shared, geocoder, query, limit, generation));
        });
        *self.pending.lock() = Some(handle);
    }

    /// Picks a result: flies the camera to it, shows its name in the input,
    /// records it as the selected location and closes the list. Returns
    /// false and changes nothing before the map is ready.
    pub fn select(&self, ctx: &MapContext, location: &LocationFeature) -> bool {
        let flown = ctx.with(|engine| {
            engine.fly_to(FlyToOptions {
                center: location.position(),
                zoom: SELECT_ZOOM,
                speed: SELECT_SPEED,
                duration: SELECT_DURATION,
                essential: true,
            })
        });
        if flown.is_none() {
            debug!("Map not ready, ignoring selection");
            return false;
        }

        self.cancel_debounce();
        let mut shared = self.shared.lock();
        shared.generation += 1;
        let state = &mut shared.state;
        state.display_value = if location.name().is_empty() {
            UNNAMED_SELECTION.to_string()
        } else {
            location.name().to_string()
        };
        state.selected_locations = vec![location.clone()];
        state.active_location = Some(location.clone());
        state.results.clear();
        state.open = false;
        state.searching = false;
        info!(id = location.id(), name = location.name(), "Search result selected");
        true
    }

    /// Selects the result at `index` of the current list.
    pub fn select_index(&self, ctx: &MapContext, index: usize) -> bool {
        let location = self.shared.lock().state.results.get(index).cloned();
        match location {
            Some(location) => self.select(ctx, &location),
            None => false,
        }
    }

    /// Shows or hides the popup for a selected location.
    pub fn set_active_location(&self, location: Option<LocationFeature>) {
        self.shared.lock().state.active_location = location;
    }

    /// Resets the input, the results and the selected locations.
    pub fn clear(&self) {
        self.cancel_debounce();
        let mut shared = self.shared.lock();
        shared.generation += 1;
        shared.state = SearchState::default();
    }

    fn cancel_debounce(&self) {
        if let Some(handle) = self.pending.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for SearchPipeline {
    fn drop(&mut self) {
        self.cancel_debounce();
    }
}

async fn run_query(
    shared: Arc<Mutex<Shared>>,
    geocoder: Arc<dyn Geocoder>,
    query: String,
    limit: usize,
    generation: u64,
) {
    {
        let mut shared = shared.lock();
        if shared.generation != generation {
            return;
        }
        shared.state.searching = true;
        shared.state.open = true;
    }

    counter!("geocode_requests_total").increment(1);
    let result = geocoder.search(&query, limit).await;

    let mut shared = shared.lock();
    if shared.generation != generation {
        debug!(query = %query, "Discarding stale geocode response");
        counter!("geocode_stale_responses_total").increment(1);
        return;
    }

    let state = &mut shared.state;
    state.searching = false;
    match result {
        Ok(features) => {
            debug!(query = %query, results = features.len(), "Search results updated");
            state.results = features;
        }
        Err(e) => {
            warn!(query = %query, error = %e, "Geocoding failed");
            counter!("geocode_failures_total").increment(1);
            state.results.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocoder::SearchError;
    use async_trait::async_trait;
    use eventmap_core::headless::HeadlessMap;
    use eventmap_core::types::{GeoPoint, ScreenSize};
    use std::collections::HashMap;

    #[derive(Default)]
    struct MockGeocoder {
        calls: Mutex<Vec<String>>,
        delays: HashMap<String, Duration>,
        fail: bool,
    }

    impl MockGeocoder {
        fn with_delay(mut self, query: &str, delay: Duration) -> Self {
            self.delays.insert(query.to_string(), delay);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl Geocoder for MockGeocoder {
        async fn search(
            &self,
            query: &str,
            _limit: usize,
        ) -> Result<Vec<LocationFeature>, SearchError> {
            self.calls.lock().push(query.to_string());
            if let Some(delay) = self.delays.get(query) {
                tokio::time::sleep(*delay).await;
            }
            if self.fail {
                return Err(SearchError::Status { status: 503 });
            }
            Ok(vec![LocationFeature::point(
                format!("{}-1", query),
                query,
                GeoPoint::new(13.4, 52.5),
            )])
        }
    }

    fn pipeline(geocoder: Arc<MockGeocoder>) -> SearchPipeline {
        SearchPipeline::new(geocoder, Duration::from_millis(400), 5)
    }

    async fn settle(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_issues_one_request() {
        let geocoder = Arc::new(MockGeocoder::default());
        let search = pipeline(geocoder.clone());

        for prefix in ["B", "Be", "Ber", "Berl", "Berli", "Berlin"] {
            search.on_query_change(prefix);
            settle(100).await;
        }
        settle(500).await;

        assert_eq!(geocoder.calls(), ["Berlin"]);
        let state = search.state();
        assert!(state.open);
        assert!(!state.searching);
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.results[0].name(), "Berlin");
    }

    #[test]
    fn test_query_change_outside_runtime() {
        let geocoder = Arc::new(MockGeocoder::default());
        let search = pipeline(geocoder.clone());

        search.on_query_change("Berlin");
        let state = search.state();
        assert_eq!(state.query, "Berlin");
        assert_eq!(state.display_value, "Berlin");
        assert!(!state.searching);
        assert!(geocoder.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_query_clears_without_request() {
        let geocoder = Arc::new(MockGeocoder::default());
        let search = pipeline(geocoder.clone());

        search.on_query_change("Lisbon");
        settle(500).await;
        assert_eq!(search.state().results.len(), 1);

        search.on_query_change("   ");
        let state = search.state();
        assert!(state.results.is_empty());
        assert!(!state.open);

        settle(1000).await;
        assert_eq!(geocoder.calls(), ["Lisbon"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_discarded() {
        let geocoder =
            Arc::new(MockGeocoder::default().with_delay("Par", Duration::from_millis(2000)));
        let search = pipeline(geocoder.clone());

        search.on_query_change("Par");
        settle(450).await;
        // the slow request for "Par" is in flight
        search.on_query_change("Paris");
        settle(450).await;
        assert_eq!(search.state().results[0].name(), "Paris");

        settle(3000).await;
        assert_eq!(geocoder.calls(), ["Par", "Paris"]);
        assert_eq!(search.state().results[0].name(), "Paris");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_clears_results() {
        let geocoder = Arc::new(MockGeocoder {
            fail: true,
            ..MockGeocoder::default()
        });
        let search = pipeline(geocoder.clone());

        search.on_query_change("Oslo");
        settle(500).await;

        let state = search.state();
        assert!(state.results.is_empty());
        assert!(!state.searching);
        assert_eq!(state.display_value, "Oslo");
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_flies_and_closes() {
        let search = pipeline(Arc::new(MockGeocoder::default()));
        let map = HeadlessMap::new(ScreenSize::new(800.0, 600.0));
        let ctx = MapContext::new();

        search.on_query_change("Berlin");
        settle(500).await;

        // not mounted yet
        assert!(!search.select_index(&ctx, 0));
        assert!(search.state().open);

        ctx.attach(Box::new(map.clone()));
        assert!(search.select_index(&ctx, 0));

        let fly = map.last_fly().unwrap();
        assert_eq!(fly.center, GeoPoint::new(13.4, 52.5));
        assert_eq!(fly.zoom, 14.0);
        assert_eq!(fly.speed, 4.0);
        assert_eq!(fly.duration, Duration::from_millis(1000));
        assert!(fly.essential);

        let state = search.state();
        assert_eq!(state.display_value, "Berlin");
        assert!(state.results.is_empty());
        assert!(!state.open);
        assert_eq!(state.selected_locations.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unnamed_selection_and_clear() {
        let search = pipeline(Arc::new(MockGeocoder::default()));
        let ctx = MapContext::new();
        ctx.attach(Box::new(HeadlessMap::new(ScreenSize::new(800.0, 600.0))));

        let unnamed = LocationFeature::point("x", "", GeoPoint::ORIGIN);
        assert!(search.select(&ctx, &unnamed));
        assert_eq!(search.state().display_value, "Selected location");

        let before = search.generation();
        search.clear();
        assert!(search.generation() > before);
        assert_eq!(search.state(), SearchState::default());
    }
}
