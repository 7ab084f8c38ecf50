use std::io::Read;

use super::addresses::{read_addresses, AddressRecord};
use super::routing::{
    assemble_route, normalize_query, resolve_address, resolve_addresses, Coordinate, MapProvider,
    RoutePolyline, RoutingError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    /// Nothing requested yet, or every lookup failed.
    Empty,
    /// Destination lookups dispatched, none resolved yet.
    Loading,
    /// At least one destination resolved; more may still be pending.
    Displayed,
}

/// Everything the map shows. Lives for one session and is discarded with it.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    reference: Option<Coordinate>,
    destinations: Vec<Coordinate>,
    route: Option<RoutePolyline>,
    pending: usize,
    // reference or destinations changed since the last route attempt
    route_stale: bool,
}

impl AppState {
    pub fn reference(&self) -> Option<Coordinate> {
        self.reference
    }

    pub fn destinations(&self) -> &[Coordinate] {
        &self.destinations
    }

    pub fn route(&self) -> Option<&RoutePolyline> {
        self.route.as_ref()
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn is_ready(&self) -> bool {
        !self.destinations.is_empty()
    }

    pub fn display_state(&self) -> DisplayState {
        if self.is_ready() {
            DisplayState::Displayed
        } else if self.pending > 0 {
            DisplayState::Loading
        } else {
            DisplayState::Empty
        }
    }

    fn mark_dispatched(&mut self, count: usize) {
        self.pending += count;
    }

    fn mark_settled(&mut self, count: usize) {
        self.pending = self.pending.saturating_sub(count);
    }

    fn set_reference(&mut self, coord: Coordinate) {
        self.reference = Some(coord);
        self.route_stale = true;
    }

    fn extend_destinations(&mut self, coords: Vec<Coordinate>) {
        if coords.is_empty() {
            return;
        }
        self.destinations.extend(coords);
        self.route_stale = true;
    }

    fn wants_route(&self) -> bool {
        self.route_stale && self.reference.is_some() && !self.destinations.is_empty()
    }
}

/// Destination lookups that were dispatched and still count as pending.
/// Hand the result of `resolve` back to `Session::commit_lookups`.
#[must_use = "lookups stay pending until committed"]
#[derive(Debug)]
pub struct PendingLookups {
    queries: Vec<String>,
}

impl PendingLookups {
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Runs every lookup concurrently; results keep dispatch order.
    pub async fn resolve<P: MapProvider>(self, provider: &P) -> ResolvedLookups {
        let coords = resolve_addresses(provider, &self.queries).await;
        ResolvedLookups {
            dispatched: self.queries.len(),
            coords,
        }
    }
}

#[must_use = "results are not applied until committed"]
#[derive(Debug)]
pub struct ResolvedLookups {
    dispatched: usize,
    coords: Vec<Coordinate>,
}

impl ResolvedLookups {
    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coords
    }
}

/// Owns the provider and the state it feeds. Every user action resolves its
/// input, commits the result and then lets the route observer catch up.
pub struct Session<P> {
    provider: P,
    state: AppState,
}

impl<P: MapProvider> Session<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            state: AppState::default(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn into_state(self) -> AppState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = AppState::default();
    }

    /// Parses a CSV upload and geocodes every row. A parse error aborts the
    /// whole file and leaves the state untouched. Returns how many
    /// destinations were added.
    pub async fn upload_csv<R: Read>(&mut self, reader: R) -> Result<usize, RoutingError> {
        let records = read_addresses(reader).map_err(|e| {
            log::error!("Failed to read CSV upload: {}", e);
            e
        })?;
        log::info!("CSV upload has {} address rows", records.len());
        Ok(self.add_records(&records).await)
    }

    pub async fn add_records(&mut self, records: &[AddressRecord]) -> usize {
        let pending = self.begin_lookups(records.iter().map(|r| r.address.as_str()));
        let resolved = pending.resolve(&self.provider).await;
        self.commit_lookups(resolved).await
    }

    /// Geocodes one manually entered destination. Blank input is ignored.
    pub async fn add_destination(&mut self, address: &str) -> bool {
        if normalize_query(address).is_none() {
            return false;
        }
        let pending = self.begin_lookups([address]);
        let resolved = pending.resolve(&self.provider).await;
        self.commit_lookups(resolved).await == 1
    }

    /// Dispatch half of a destination upload. Blank addresses are dropped;
    /// the rest count as pending, so the state reads `Loading` until the
    /// matching `commit_lookups`.
    pub fn begin_lookups<I, S>(&mut self, addresses: I) -> PendingLookups
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let queries: Vec<String> = addresses
            .into_iter()
            .filter_map(|a| normalize_query(a.as_ref()).map(str::to_string))
            .collect();
        self.state.mark_dispatched(queries.len());
        log::debug!("Dispatched {} destination lookups", queries.len());
        PendingLookups { queries }
    }

    /// Commit half: appends the resolved destinations in dispatch order,
    /// settles the pending count and lets the route observer run. Returns
    /// how many destinations were added.
    pub async fn commit_lookups(&mut self, resolved: ResolvedLookups) -> usize {
        self.state.mark_settled(resolved.dispatched);
        let added = resolved.coords.len();
        self.state.extend_destinations(resolved.coords);
        self.sync_route().await;
        added
    }

    /// Geocodes and replaces the reference location. Blank input is ignored;
    /// on failure the previous reference stays.
    pub async fn submit_reference(&mut self, input: &str) -> bool {
        let Some(query) = normalize_query(input) else {
            return false;
        };

        let result = resolve_address(&self.provider, query).await;
        let updated = match result {
            Ok(coord) => {
                log::info!("Reference location set to {}", coord);
                self.state.set_reference(coord);
                true
            }
            Err(err) => {
                log::error!("Failed to resolve reference location \"{}\": {}", query, err);
                false
            }
        };
        self.sync_route().await;
        updated
    }

    /// Fetches a fresh route if the reference or destinations changed since
    /// the last attempt and both are present. On failure the previous route
    /// is kept. Returns whether a request was made.
    pub async fn sync_route(&mut self) -> bool {
        if !self.state.wants_route() {
            return false;
        }
        self.state.route_stale = false;

        match assemble_route(&self.provider, self.state.reference, &self.state.destinations).await {
            Ok(polyline) => {
                log::info!("Route updated with {} points", polyline.len());
                self.state.route = Some(polyline);
            }
            Err(err) => {
                log::error!("Failed to fetch directions: {}", err);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::routing::fakes::FakeProvider;
    use crate::sdk::routing::waypoint_path;
    use std::time::Duration;

    fn line(points: &[[f64; 2]]) -> RoutePolyline {
        RoutePolyline(points.to_vec())
    }

    #[test]
    fn display_state_follows_resolved_data() {
        let mut state = AppState::default();
        assert_eq!(state.display_state(), DisplayState::Empty);

        state.mark_dispatched(2);
        assert_eq!(state.display_state(), DisplayState::Loading);
        assert!(!state.is_ready());

        state.extend_destinations(vec![Coordinate::new(1.0, 2.0)]);
        assert_eq!(state.display_state(), DisplayState::Displayed);

        state.mark_settled(2);
        assert_eq!(state.pending(), 0);
        assert_eq!(state.display_state(), DisplayState::Displayed);
    }

    #[test]
    fn finished_lookups_without_results_fall_back_to_empty() {
        let mut state = AppState::default();
        state.mark_dispatched(1);
        state.mark_settled(1);
        assert_eq!(state.display_state(), DisplayState::Empty);
    }

    #[tokio::test(start_paused = true)]
    async fn loading_is_visible_while_lookups_are_in_flight() {
        let provider = FakeProvider::new()
            .with_place("slow", Coordinate::new(1.0, 2.0))
            .with_delay("slow", Duration::from_secs(3));
        let mut session = Session::new(provider);

        let pending = session.begin_lookups(["slow", "  "]);
        assert_eq!(pending.len(), 1);
        assert_eq!(session.state().display_state(), DisplayState::Loading);
        assert_eq!(session.state().pending(), 1);

        let resolved = {
            let lookup = pending.resolve(session.provider());
            tokio::pin!(lookup);
            tokio::select! {
                _ = &mut lookup => panic!("lookup finished before its delay"),
                _ = tokio::time::sleep(Duration::from_secs(1)) => {}
            }
            assert_eq!(session.state().display_state(), DisplayState::Loading);
            assert!(crate::sdk::display::MapView::from_state(session.state()).is_none());

            lookup.await
        };
        assert_eq!(resolved.coordinates(), &[Coordinate::new(1.0, 2.0)]);
        assert_eq!(session.commit_lookups(resolved).await, 1);

        assert_eq!(session.state().pending(), 0);
        assert_eq!(session.state().display_state(), DisplayState::Displayed);
    }

    #[tokio::test]
    async fn failed_lookups_settle_back_to_empty() {
        let mut session = Session::new(FakeProvider::new());

        let pending = session.begin_lookups(["Atlantis"]);
        assert_eq!(session.state().display_state(), DisplayState::Loading);

        let resolved = pending.resolve(session.provider()).await;
        assert_eq!(session.commit_lookups(resolved).await, 0);

        assert_eq!(session.state().pending(), 0);
        assert_eq!(session.state().display_state(), DisplayState::Empty);
    }

    #[tokio::test]
    async fn blank_only_dispatch_stays_empty() {
        let mut session = Session::new(FakeProvider::new());

        let pending = session.begin_lookups(["", "   "]);

        assert!(pending.is_empty());
        assert_eq!(session.state().display_state(), DisplayState::Empty);
        let resolved = pending.resolve(session.provider()).await;
        session.commit_lookups(resolved).await;
        assert_eq!(session.provider().geocode_count(), 0);
    }

    #[tokio::test]
    async fn manual_destination_grows_list_by_one() {
        let provider = FakeProvider::new().with_place("Adobe", Coordinate::new(-121.8853, 37.3387));
        let mut session = Session::new(provider);

        assert!(session.add_destination("Adobe").await);

        assert_eq!(session.state().destinations(), &[Coordinate::new(-121.8853, 37.3387)]);
        assert!(session.state().is_ready());
    }

    #[tokio::test]
    async fn blank_inputs_make_no_calls_and_change_nothing() {
        let mut session = Session::new(FakeProvider::new());

        assert!(!session.add_destination("   ").await);
        assert!(!session.submit_reference("\t").await);

        assert_eq!(session.provider().geocode_count(), 0);
        assert_eq!(session.state().display_state(), DisplayState::Empty);
        assert!(session.state().reference().is_none());
    }

    #[tokio::test]
    async fn failed_destination_is_dropped_silently() {
        let mut session = Session::new(FakeProvider::new());

        assert!(!session.add_destination("Atlantis").await);

        assert!(session.state().destinations().is_empty());
        assert_eq!(session.provider().geocode_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn csv_upload_commits_every_row_in_row_order() {
        let mut provider = FakeProvider::new();
        let mut csv = String::from("address\n");
        for i in 0..6 {
            let name = format!("row {i}");
            provider = provider
                .with_place(&name, Coordinate::new(i as f64, 0.0))
                .with_delay(&name, Duration::from_millis(100 * (6 - i)));
            csv.push_str(&name);
            csv.push('\n');
        }
        let mut session = Session::new(provider);

        let added = session.upload_csv(csv.as_bytes()).await.unwrap();

        assert_eq!(added, 6);
        let lons: Vec<f64> = session.state().destinations().iter().map(|c| c.longitude).collect();
        assert_eq!(lons, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(session.state().pending(), 0);
    }

    #[tokio::test]
    async fn bad_csv_leaves_state_untouched() {
        let mut session = Session::new(FakeProvider::new());

        let result = session.upload_csv("name\nRennes\n".as_bytes()).await;

        assert!(matches!(result, Err(RoutingError::MissingAddressColumn)));
        assert_eq!(session.provider().geocode_count(), 0);
        assert_eq!(session.state().display_state(), DisplayState::Empty);
    }

    #[tokio::test]
    async fn route_waits_for_both_reference_and_destinations() {
        let provider = FakeProvider::new()
            .with_place("home", Coordinate::new(0.0, 0.0))
            .with_place("work", Coordinate::new(1.0, 1.0))
            .with_route(Ok(line(&[[0.0, 0.0], [1.0, 1.0]])));
        let mut session = Session::new(provider);

        session.submit_reference("home").await;
        assert_eq!(session.provider().directions_count(), 0);

        session.add_destination("work").await;
        assert_eq!(session.provider().directions_count(), 1);
        assert_eq!(session.state().route(), Some(&line(&[[0.0, 0.0], [1.0, 1.0]])));
    }

    #[tokio::test]
    async fn route_query_lists_reference_then_destinations() {
        let provider = FakeProvider::new()
            .with_place("ref", Coordinate::new(-121.9552, 37.3541))
            .with_place("a", Coordinate::new(-122.1483, 37.4851))
            .with_place("b", Coordinate::new(-122.0839, 37.3861))
            .with_route(Ok(line(&[[1.0, 2.0]])));
        let mut session = Session::new(provider);

        session.upload_csv("address\na\nb\n".as_bytes()).await.unwrap();
        session.submit_reference("ref").await;

        let sent = session.provider().last_waypoints().unwrap();
        assert_eq!(
            waypoint_path(&sent),
            "-121.9552,37.3541;-122.1483,37.4851;-122.0839,37.3861"
        );
    }

    #[tokio::test]
    async fn displayed_route_is_the_response_geometry() {
        let provider = FakeProvider::new()
            .with_place("ref", Coordinate::new(0.0, 0.0))
            .with_place("a", Coordinate::new(5.0, 5.0))
            .with_route(Ok(line(&[[1.0, 2.0], [3.0, 4.0]])));
        let mut session = Session::new(provider);

        session.submit_reference("ref").await;
        session.add_destination("a").await;

        assert_eq!(session.state().route().unwrap().points(), &[[1.0, 2.0], [3.0, 4.0]]);
    }

    #[tokio::test]
    async fn failed_refetch_keeps_previous_route() {
        let provider = FakeProvider::new()
            .with_place("ref", Coordinate::new(0.0, 0.0))
            .with_place("a", Coordinate::new(1.0, 1.0))
            .with_place("b", Coordinate::new(2.0, 2.0))
            .with_route(Ok(line(&[[1.0, 2.0], [3.0, 4.0]])))
            .with_route(Err(RoutingError::ApiError {
                status: 422,
                message: "No route found".to_string(),
            }));
        let mut session = Session::new(provider);

        session.submit_reference("ref").await;
        session.add_destination("a").await;
        session.add_destination("b").await;

        assert_eq!(session.provider().directions_count(), 2);
        assert_eq!(session.state().route().unwrap().points(), &[[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(session.state().destinations().len(), 2);
    }

    #[tokio::test]
    async fn unchanged_inputs_do_not_refetch() {
        let provider = FakeProvider::new()
            .with_place("ref", Coordinate::new(0.0, 0.0))
            .with_place("a", Coordinate::new(1.0, 1.0))
            .with_route(Ok(line(&[[0.0, 0.0]])));
        let mut session = Session::new(provider);

        session.submit_reference("ref").await;
        session.add_destination("a").await;
        assert!(!session.sync_route().await);
        assert!(!session.add_destination("nowhere").await);

        assert_eq!(session.provider().directions_count(), 1);
    }

    #[tokio::test]
    async fn one_route_request_per_csv_upload() {
        let provider = FakeProvider::new()
            .with_place("ref", Coordinate::new(0.0, 0.0))
            .with_place("a", Coordinate::new(1.0, 1.0))
            .with_place("b", Coordinate::new(2.0, 2.0))
            .with_place("c", Coordinate::new(3.0, 3.0))
            .with_route(Ok(line(&[[0.0, 0.0]])));
        let mut session = Session::new(provider);

        session.submit_reference("ref").await;
        session.upload_csv("address\na\nb\nc\n".as_bytes()).await.unwrap();

        assert_eq!(session.provider().directions_count(), 1);
    }

    #[tokio::test]
    async fn resubmitting_reference_overwrites_and_reroutes() {
        let provider = FakeProvider::new()
            .with_place("old", Coordinate::new(0.0, 0.0))
            .with_place("new", Coordinate::new(9.0, 9.0))
            .with_place("a", Coordinate::new(1.0, 1.0))
            .with_route(Ok(line(&[[0.0, 0.0]])))
            .with_route(Ok(line(&[[9.0, 9.0]])));
        let mut session = Session::new(provider);

        session.add_destination("a").await;
        session.submit_reference("old").await;
        session.submit_reference("new").await;

        assert_eq!(session.state().reference(), Some(Coordinate::new(9.0, 9.0)));
        assert_eq!(session.state().route().unwrap().points(), &[[9.0, 9.0]]);
        assert_eq!(session.provider().last_waypoints().unwrap()[0], Coordinate::new(9.0, 9.0));
    }

    #[tokio::test]
    async fn failed_reference_keeps_previous() {
        let provider = FakeProvider::new().with_place("home", Coordinate::new(3.0, 4.0));
        let mut session = Session::new(provider);

        session.submit_reference("home").await;
        assert!(!session.submit_reference("nowhere").await);

        assert_eq!(session.state().reference(), Some(Coordinate::new(3.0, 4.0)));
    }

    #[tokio::test]
    async fn reset_discards_everything() {
        let provider = FakeProvider::new().with_place("a", Coordinate::new(1.0, 1.0));
        let mut session = Session::new(provider);
        session.add_destination("a").await;

        session.reset();

        assert_eq!(session.state().display_state(), DisplayState::Empty);
        assert!(session.state().destinations().is_empty());
    }
}
