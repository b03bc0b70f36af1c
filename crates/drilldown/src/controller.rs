use catalog::RegionCatalog;
use formats::{BoundaryCollection, BoundaryFeature};
use foundation::{GeoLevel, LonLat, RegionId};
use layers::{BoundaryLayer, LayerStack, ZonePanel, pick_point};
use runtime::{DispatchBudget, EventBus, Frame};
use scene::{Selection, ViewState};
use streaming::{
    BoundaryCache, CacheBudget, FetchQueue, LayerKey, LayerPhase, LayerSlot, ProviderError,
};

use crate::command::Command;
use crate::effect::{CanonicalStatesResponse, Effect, LayerResponse};
use crate::event::DrillEvent;

/// Minimum zoom after selecting a state by click.
const STATE_FOCUS_ZOOM: f64 = 2.2;
/// Minimum zoom after selecting a district by click.
const DISTRICT_FOCUS_ZOOM: f64 = 3.0;
/// Hit radius for the fallback panel pins, in panel fractions.
const PIN_RADIUS_FRAC: f64 = 0.08;

#[derive(Debug, Clone, PartialEq)]
pub struct DrilldownConfig {
    /// Required drill depth at boot.
    pub initial_level: GeoLevel,
    /// Byte budget for the per-ancestor-key boundary cache.
    pub cache_budget_bytes: usize,
    /// Backpressure limit for queued fetches.
    pub max_pending_fetches: usize,
    /// Fetches dispatched per tick.
    pub dispatches_per_frame: u32,
    /// Frames before an unanswered fetch is treated as failed.
    pub fetch_timeout_frames: u64,
    /// Fixed tick delta (seconds).
    pub frame_dt_s: f64,
}

impl Default for DrilldownConfig {
    fn default() -> Self {
        Self {
            initial_level: GeoLevel::National,
            cache_budget_bytes: 8 << 20,
            max_pending_fetches: 8,
            dispatches_per_frame: 4,
            fetch_timeout_frames: 600,
            frame_dt_s: 1.0 / 60.0,
        }
    }
}

/// The drill-down selector's single owner of state.
///
/// One instance per page mount. All mutation happens on the host's event
/// loop thread through [`apply`](Self::apply), [`tick`](Self::tick) and the
/// completion methods; there are no other writers, so the only discipline
/// needed is the per-slot staleness guard.
#[derive(Debug)]
pub struct DrilldownController {
    config: DrilldownConfig,
    frame: Frame,

    country: Option<RegionId>,
    level: GeoLevel,
    selection: Selection,
    view: ViewState,

    catalog: RegionCatalog,
    catalog_phase: LayerPhase,
    catalog_generation: u64,
    catalog_fetch_pending: Option<(RegionId, u64)>,

    state_slot: LayerSlot,
    district_slot: LayerSlot,
    mandal_slot: LayerSlot,
    stack: LayerStack,
    panel: ZonePanel,

    cache: BoundaryCache,
    queue: FetchQueue,
    events: EventBus<DrillEvent>,
}

impl DrilldownController {
    pub fn new(config: DrilldownConfig) -> Self {
        Self {
            frame: Frame::new(0, config.frame_dt_s),
            country: None,
            level: config.initial_level,
            selection: Selection::new(),
            view: ViewState::new(),
            catalog: RegionCatalog::default(),
            catalog_phase: LayerPhase::Idle,
            catalog_generation: 0,
            catalog_fetch_pending: None,
            state_slot: LayerSlot::new(GeoLevel::State),
            district_slot: LayerSlot::new(GeoLevel::District),
            mandal_slot: LayerSlot::new(GeoLevel::Mandal),
            stack: LayerStack::new(),
            panel: ZonePanel::new(),
            cache: BoundaryCache::new(CacheBudget::new(config.cache_budget_bytes)),
            queue: FetchQueue::new(config.max_pending_fetches),
            config,
            events: EventBus::new(),
        }
    }

    // --- accessors -------------------------------------------------------

    pub fn country(&self) -> Option<&RegionId> {
        self.country.as_ref()
    }

    pub fn level(&self) -> GeoLevel {
        self.level
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn stack(&self) -> &LayerStack {
        &self.stack
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    pub fn zone_panel(&self) -> &ZonePanel {
        &self.panel
    }

    pub fn layer_phase(&self, level: GeoLevel) -> LayerPhase {
        match level {
            GeoLevel::State => self.state_slot.phase(),
            GeoLevel::District => self.district_slot.phase(),
            GeoLevel::Mandal => self.mandal_slot.phase(),
            _ => LayerPhase::Idle,
        }
    }

    /// Whether the degraded five-zone panel should replace the map.
    pub fn fallback_active(&self) -> bool {
        self.state_slot.phase() == LayerPhase::Failed
    }

    /// "At least one fetch in flight": the coarse indicator hosts show as a
    /// spinner. Per-level detail lives in [`layer_phase`](Self::layer_phase).
    pub fn is_loading(&self) -> bool {
        self.state_slot.is_loading()
            || self.district_slot.is_loading()
            || self.mandal_slot.is_loading()
            || self.catalog_phase == LayerPhase::Loading
    }

    pub fn events(&self) -> &runtime::EventBus<DrillEvent> {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<runtime::Event<DrillEvent>> {
        self.events.drain()
    }

    // --- commands --------------------------------------------------------

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::SetCountry(country) => self.set_country(country),
            Command::SetLevel(level) => {
                if self.level != level {
                    self.level = level;
                    self.emit(DrillEvent::LevelChanged(level));
                    self.reconcile();
                }
            }
            Command::SetZone(zone) => {
                if self.selection.zone() != zone {
                    self.selection.set_zone(zone);
                    self.emit(DrillEvent::ZoneSelected(zone));
                }
            }
            Command::ClickAt(point) => self.click_at(point),
            Command::ClickFallbackAt { x_frac, y_frac } => {
                if let Some(zone) = self.panel.pin_near(x_frac, y_frac, PIN_RADIUS_FRAC) {
                    self.selection.set_zone(Some(zone));
                    self.emit(DrillEvent::ZoneSelected(Some(zone)));
                }
            }
            Command::SelectState(id) => {
                self.selection.select_state(id.clone());
                self.emit(DrillEvent::StateSelected(id));
                self.reconcile();
            }
            Command::SelectDistrict(id) => {
                if self.selection.select_district(id.clone()) {
                    self.emit(DrillEvent::DistrictSelected(id));
                    self.reconcile();
                }
            }
            Command::SelectMandal(id) => {
                if self.selection.select_mandal(id.clone()) {
                    self.emit(DrillEvent::MandalSelected(id));
                }
            }
            Command::ZoomIn => self.view.zoom_in(),
            Command::ZoomOut => self.view.zoom_out(),
            Command::Reset => {
                self.selection.reset_chain();
                self.view.reset();
                self.emit(DrillEvent::SelectionReset);
                self.reconcile();
            }
        }
    }

    fn set_country(&mut self, country: RegionId) {
        if self.country.as_ref() == Some(&country) {
            return;
        }
        self.country = Some(country.clone());
        // The country is an ancestor of the whole chain.
        self.selection.reset_chain();
        self.emit(DrillEvent::CountryChanged(country.clone()));

        self.catalog_generation += 1;
        self.catalog_phase = LayerPhase::Loading;
        self.catalog_fetch_pending = Some((country, self.catalog_generation));

        self.reconcile();
    }

    fn click_at(&mut self, point: LonLat) {
        let Some(hit) = pick_point(&self.stack, point) else {
            return;
        };
        let Some(region) = hit.region else {
            return;
        };
        match hit.level {
            GeoLevel::State => {
                self.selection.select_state(region.clone());
                self.emit(DrillEvent::StateSelected(region));
                self.view.ensure_min_zoom(STATE_FOCUS_ZOOM);
                self.reconcile();
            }
            GeoLevel::District => {
                if self.selection.select_district(region.clone()) {
                    self.emit(DrillEvent::DistrictSelected(region));
                    self.view.ensure_min_zoom(DISTRICT_FOCUS_ZOOM);
                    self.reconcile();
                }
            }
            GeoLevel::Mandal => {
                if self.selection.select_mandal(region.clone()) {
                    self.emit(DrillEvent::MandalSelected(region));
                }
            }
            _ => {}
        }
    }

    // --- frame advance ---------------------------------------------------

    /// Advances one frame: expires overdue fetches, dispatches queued work
    /// within the per-frame budget, and returns the effects to perform.
    pub fn tick(&mut self) -> Vec<Effect> {
        self.frame = self.frame.next();
        let mut effects = Vec::new();

        if let Some((country, generation)) = self.catalog_fetch_pending.take() {
            effects.push(Effect::FetchCanonicalStates {
                country,
                generation,
            });
        }

        self.expire_overdue();

        let mut budget = DispatchBudget::new(self.config.dispatches_per_frame);
        while let Some(request) = self.queue.pop_next_with_budget(&mut budget) {
            effects.push(Effect::FetchLayer(request));
        }

        effects
    }

    fn expire_overdue(&mut self) {
        let now = self.frame.index;
        let timeout = self.config.fetch_timeout_frames;
        for level in GeoLevel::boundary_levels() {
            let slot = self.slot_mut(level);
            if !slot.timed_out(now, timeout) {
                continue;
            }
            let Some(request) = slot.expire() else {
                continue;
            };
            // The request may still be sitting in the queue undispatched.
            self.queue.cancel_where(|r| *r == request);
            self.stack.clear(level);
            self.emit(DrillEvent::LayerTimedOut {
                level,
                parent: request.key.parent.clone(),
            });
            if level == GeoLevel::State {
                self.emit(DrillEvent::FallbackActivated);
            }
        }
    }

    // --- completions -----------------------------------------------------

    pub fn complete_layer(&mut self, response: LayerResponse) {
        let LayerResponse { request, payload } = response;
        let level = request.level();

        let outcome = match payload {
            Ok(value) => match BoundaryCollection::from_geojson_value(value) {
                Ok(collection) => Ok(collection),
                Err(e) => Err(ProviderError::from(e)),
            },
            Err(e) => Err(e),
        };

        match outcome {
            Ok(collection) => {
                let slot = self.slot_mut(level);
                if !slot.complete(&request, collection.clone()) {
                    self.emit(DrillEvent::StaleResponseDropped {
                        level,
                        parent: request.key.parent,
                    });
                    return;
                }
                let key = LayerKey::new(level, request.key.parent.clone());
                let _ = self.cache.insert(key, collection.clone());
                self.install_layer(level, &collection);
                self.emit(DrillEvent::LayerLoaded {
                    level,
                    parent: request.key.parent,
                    features: collection.len(),
                    from_cache: false,
                });
            }
            Err(error) => {
                let slot = self.slot_mut(level);
                if !slot.fail(&request) {
                    self.emit(DrillEvent::StaleResponseDropped {
                        level,
                        parent: request.key.parent,
                    });
                    return;
                }
                self.stack.clear(level);
                self.emit(DrillEvent::LayerFailed {
                    level,
                    parent: request.key.parent,
                    error,
                });
                if level == GeoLevel::State {
                    self.emit(DrillEvent::FallbackActivated);
                }
            }
        }
    }

    pub fn complete_canonical_states(&mut self, response: CanonicalStatesResponse) {
        if response.generation != self.catalog_generation
            || self.country.as_ref() != Some(&response.country)
        {
            self.emit(DrillEvent::CatalogResponseDropped);
            return;
        }

        match response.payload.and_then(|value| {
            RegionCatalog::from_json_value(value)
                .map_err(|e| ProviderError::Decode(e.to_string()))
        }) {
            Ok(catalog) => {
                self.catalog = catalog;
                self.catalog_phase = LayerPhase::Loaded;
                self.cache.pin_revision(self.catalog.revision());
                self.emit(DrillEvent::CatalogLoaded {
                    regions: self.catalog.len(),
                });
                // Re-bind the state layer: id resolution may have changed.
                if let Some(collection) = self.state_slot.collection().cloned() {
                    self.install_layer(GeoLevel::State, &collection);
                }
            }
            Err(_) => {
                // Degrade to raw feature ids; the selector keeps working.
                self.catalog = RegionCatalog::default();
                self.catalog_phase = LayerPhase::Failed;
                self.emit(DrillEvent::CatalogUnavailable);
            }
        }
    }

    // --- internals -------------------------------------------------------

    fn emit(&mut self, event: DrillEvent) {
        self.events.emit(self.frame, event);
    }

    /// Drives every slot towards what the current country/selection/level
    /// require: clears what is no longer wanted, serves what the cache has,
    /// enqueues fetches for the rest.
    fn reconcile(&mut self) {
        let state_parent = self.country.clone();
        let district_parent = self
            .selection
            .state()
            .cloned()
            .filter(|_| self.level >= GeoLevel::District);
        let mandal_parent = self
            .selection
            .district()
            .cloned()
            .filter(|_| self.level == GeoLevel::Mandal);

        self.reconcile_slot(GeoLevel::State, state_parent);
        self.reconcile_slot(GeoLevel::District, district_parent);
        self.reconcile_slot(GeoLevel::Mandal, mandal_parent);
    }

    fn reconcile_slot(&mut self, level: GeoLevel, desired: Option<RegionId>) {
        let Some(parent) = desired else {
            let had_anything = self.slot_mut(level).phase() != LayerPhase::Idle;
            if had_anything {
                self.queue.cancel_where(|r| r.level() == level);
                self.slot_mut(level).clear();
                self.stack.clear(level);
                self.emit(DrillEvent::LayerCleared(level));
            }
            return;
        };

        if self.slot_mut(level).covers(&parent) {
            return;
        }
        // A failed fetch for this exact key is terminal; no retry loop.
        {
            let slot = self.slot_mut(level);
            if slot.phase() == LayerPhase::Failed && slot.parent() == Some(&parent) {
                return;
            }
        }

        let key = LayerKey::new(level, parent.clone());
        if let Some(collection) = self.cache.get(&key).cloned() {
            self.slot_mut(level).load_cached(parent.clone(), collection.clone());
            self.install_layer(level, &collection);
            self.emit(DrillEvent::LayerLoaded {
                level,
                parent,
                features: collection.len(),
                from_cache: true,
            });
            return;
        }

        let frame_index = self.frame.index;
        let request = self.slot_mut(level).begin(parent.clone(), frame_index);
        // Supersede anything older still queued for this level.
        let generation = request.generation;
        self.queue
            .cancel_where(|r| r.level() == level && r.generation < generation);
        match self.queue.try_submit(request.clone()) {
            Ok(()) => {
                self.emit(DrillEvent::LayerRequested { level, parent });
            }
            Err(_) => {
                // Saturated queue: absorb as a failure rather than wedging
                // the slot in Loading forever.
                let slot = self.slot_mut(level);
                let _ = slot.fail(&request);
                self.stack.clear(level);
                self.emit(DrillEvent::LayerFailed {
                    level,
                    parent,
                    error: ProviderError::Unreachable("fetch queue saturated".to_string()),
                });
                if level == GeoLevel::State {
                    self.emit(DrillEvent::FallbackActivated);
                }
            }
        }
    }

    fn install_layer(&mut self, level: GeoLevel, collection: &BoundaryCollection) {
        let layer = match level {
            GeoLevel::State => {
                let catalog = &self.catalog;
                BoundaryLayer::bind(level, collection, |feature| {
                    catalog
                        .resolve_feature(feature.id.as_deref(), feature.name.as_deref())
                        .map(|resolved| resolved.id)
                })
            }
            _ => BoundaryLayer::bind(level, collection, raw_identity),
        };
        self.stack.set(layer);
    }

    fn slot_mut(&mut self, level: GeoLevel) -> &mut LayerSlot {
        match level {
            GeoLevel::State => &mut self.state_slot,
            GeoLevel::District => &mut self.district_slot,
            GeoLevel::Mandal => &mut self.mandal_slot,
            other => unreachable!("no layer slot at level {other}"),
        }
    }
}

/// District and mandal features keep their published id verbatim; only the
/// State layer goes through canonical name resolution.
fn raw_identity(feature: &BoundaryFeature) -> Option<RegionId> {
    feature
        .id
        .as_deref()
        .or(feature.name.as_deref())
        .map(RegionId::new)
}

#[cfg(test)]
mod tests {
    use super::{DrilldownConfig, DrilldownController};
    use crate::command::Command;
    use crate::effect::{CanonicalStatesResponse, Effect, LayerResponse};
    use crate::event::DrillEvent;
    use foundation::{GeoLevel, LonLat, RegionId, Zone};
    use pretty_assertions::assert_eq;
    use scene::view::{DEFAULT_CENTER, MIN_ZOOM};
    use serde_json::{Value, json};
    use streaming::{LayerPhase, LayerRequest, ProviderError};

    fn id(s: &str) -> RegionId {
        RegionId::new(s)
    }

    fn square(name: Option<&str>, fid: Option<&str>, x0: f64, y0: f64, x1: f64, y1: f64) -> Value {
        let mut properties = serde_json::Map::new();
        if let Some(name) = name {
            properties.insert("name".to_string(), json!(name));
        }
        if let Some(fid) = fid {
            properties.insert("id".to_string(), json!(fid));
        }
        json!({
            "type": "Feature",
            "properties": properties,
            "geometry": {"type": "Polygon",
                "coordinates": [[[x0, y0], [x1, y0], [x1, y1], [x0, y1], [x0, y0]]]}
        })
    }

    fn fc(features: Vec<Value>) -> Value {
        json!({"type": "FeatureCollection", "features": features})
    }

    /// Two states by name only; the catalog maps them to TS / KA.
    fn states_fc() -> Value {
        fc(vec![
            square(Some("Telangana"), None, 77.0, 15.0, 82.0, 20.0),
            square(Some("Karnataka"), None, 73.0, 11.0, 77.0, 15.0),
        ])
    }

    fn states_listing() -> Value {
        json!({"data": [
            {"id": "TS", "name": "Telangana", "zone": "SOUTH"},
            {"id": "KA", "name": "Karnataka", "zone": "SOUTH"},
        ]})
    }

    fn districts_fc(prefix: &str) -> Value {
        let d1 = format!("{prefix}-D1");
        let d2 = format!("{prefix}-D2");
        fc(vec![
            square(None, Some(d1.as_str()), 77.0, 15.0, 79.0, 17.0),
            square(None, Some(d2.as_str()), 79.0, 17.0, 82.0, 20.0),
        ])
    }

    fn mandals_fc() -> Value {
        fc(vec![square(
            None,
            Some("TS-D1-M1"),
            77.0,
            15.0,
            78.0,
            16.0,
        )])
    }

    fn config(level: GeoLevel) -> DrilldownConfig {
        DrilldownConfig {
            initial_level: level,
            ..DrilldownConfig::default()
        }
    }

    fn layer_requests(effects: &[Effect], level: GeoLevel) -> Vec<LayerRequest> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::FetchLayer(r) if r.level() == level => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    fn only_layer_request(effects: &[Effect], level: GeoLevel) -> LayerRequest {
        let mut found = layer_requests(effects, level);
        assert_eq!(found.len(), 1, "expected one {level} fetch in {effects:?}");
        found.remove(0)
    }

    fn complete_ok(ctrl: &mut DrilldownController, request: LayerRequest, payload: Value) {
        ctrl.complete_layer(LayerResponse {
            request,
            payload: Ok(payload),
        });
    }

    fn complete_err(ctrl: &mut DrilldownController, request: LayerRequest, error: ProviderError) {
        ctrl.complete_layer(LayerResponse {
            request,
            payload: Err(error),
        });
    }

    fn payloads(ctrl: &mut DrilldownController) -> Vec<DrillEvent> {
        ctrl.drain_events().into_iter().map(|e| e.payload).collect()
    }

    /// Boots a controller for "IN" with the catalog and state layer loaded.
    fn booted(level: GeoLevel) -> DrilldownController {
        let mut ctrl = DrilldownController::new(config(level));
        ctrl.apply(Command::SetCountry(id("IN")));
        let effects = ctrl.tick();

        let state_req = only_layer_request(&effects, GeoLevel::State);
        let catalog_effect = effects
            .iter()
            .find(|e| matches!(e, Effect::FetchCanonicalStates { .. }))
            .cloned()
            .expect("catalog fetch on boot");
        let Effect::FetchCanonicalStates {
            country,
            generation,
        } = catalog_effect
        else {
            unreachable!()
        };
        ctrl.complete_canonical_states(CanonicalStatesResponse {
            country,
            generation,
            payload: Ok(states_listing()),
        });
        complete_ok(&mut ctrl, state_req, states_fc());
        let _ = ctrl.drain_events();
        ctrl
    }

    #[test]
    fn boot_fetches_state_layer_regardless_of_level() {
        let mut ctrl = DrilldownController::new(config(GeoLevel::National));
        ctrl.apply(Command::SetCountry(id("IN")));
        assert!(ctrl.is_loading());

        let effects = ctrl.tick();
        let req = only_layer_request(&effects, GeoLevel::State);
        assert_eq!(req.key.parent, id("IN"));
        assert!(
            effects
                .iter()
                .any(|e| matches!(e, Effect::FetchCanonicalStates { .. }))
        );
        assert_eq!(ctrl.layer_phase(GeoLevel::State), LayerPhase::Loading);

        // No deeper fetch, ever, at NATIONAL level.
        assert!(layer_requests(&effects, GeoLevel::District).is_empty());
        assert!(layer_requests(&effects, GeoLevel::Mandal).is_empty());
    }

    #[test]
    fn state_layer_binds_through_canonical_resolution() {
        let ctrl = booted(GeoLevel::State);
        let layer = ctrl.stack().get(GeoLevel::State).expect("state layer");
        let regions: Vec<_> = layer
            .features()
            .iter()
            .map(|f| f.region.clone().unwrap())
            .collect();
        assert_eq!(regions, vec![id("TS"), id("KA")]);
    }

    #[test]
    fn full_drill_scenario() {
        let mut ctrl = booted(GeoLevel::Mandal);

        // Click inside Telangana: resolves to TS, zooms to the state floor.
        ctrl.apply(Command::ClickAt(LonLat::new(80.0, 18.0)));
        assert_eq!(ctrl.selection().state(), Some(&id("TS")));
        assert!(ctrl.view().zoom >= 2.2);

        let effects = ctrl.tick();
        let district_req = only_layer_request(&effects, GeoLevel::District);
        assert_eq!(district_req.key.parent, id("TS"));
        complete_ok(&mut ctrl, district_req, districts_fc("TS"));

        // Click inside TS-D1: drills deeper, zooms to the district floor.
        ctrl.apply(Command::ClickAt(LonLat::new(78.0, 16.0)));
        assert_eq!(ctrl.selection().district(), Some(&id("TS-D1")));
        assert!(ctrl.view().zoom >= 3.0);

        let effects = ctrl.tick();
        let mandal_req = only_layer_request(&effects, GeoLevel::Mandal);
        assert_eq!(mandal_req.key.parent, id("TS-D1"));
        complete_ok(&mut ctrl, mandal_req, mandals_fc());

        // Mandal click: selection only, no zoom change.
        let zoom_before = ctrl.view().zoom;
        ctrl.apply(Command::ClickAt(LonLat::new(77.5, 15.5)));
        assert_eq!(ctrl.selection().mandal(), Some(&id("TS-D1-M1")));
        assert_eq!(ctrl.view().zoom, zoom_before);

        // All three layers stack independently.
        assert_eq!(ctrl.stack().draw_order().count(), 3);

        // Reset: chain and camera back to defaults, country kept.
        ctrl.apply(Command::Reset);
        assert_eq!(ctrl.selection().state(), None);
        assert_eq!(ctrl.selection().district(), None);
        assert_eq!(ctrl.selection().mandal(), None);
        assert_eq!(ctrl.view().zoom, MIN_ZOOM);
        assert_eq!(ctrl.view().center, DEFAULT_CENTER);
        assert_eq!(ctrl.country(), Some(&id("IN")));
        assert!(ctrl.stack().get(GeoLevel::State).is_some());
        assert!(ctrl.stack().get(GeoLevel::District).is_none());
        assert!(ctrl.stack().get(GeoLevel::Mandal).is_none());
    }

    #[test]
    fn district_fetch_is_gated_by_level() {
        let mut ctrl = booted(GeoLevel::State);
        ctrl.apply(Command::SelectState(id("TS")));

        let effects = ctrl.tick();
        assert!(layer_requests(&effects, GeoLevel::District).is_empty());
        assert_eq!(ctrl.layer_phase(GeoLevel::District), LayerPhase::Idle);

        // Raising the level is what makes the fetch legal.
        ctrl.apply(Command::SetLevel(GeoLevel::District));
        let effects = ctrl.tick();
        let req = only_layer_request(&effects, GeoLevel::District);
        assert_eq!(req.key.parent, id("TS"));

        // Dropping the level clears the layer; its late response is stale.
        ctrl.apply(Command::SetLevel(GeoLevel::State));
        assert_eq!(ctrl.layer_phase(GeoLevel::District), LayerPhase::Idle);
        complete_ok(&mut ctrl, req, districts_fc("TS"));
        assert!(ctrl.stack().get(GeoLevel::District).is_none());
        assert!(payloads(&mut ctrl).contains(&DrillEvent::StaleResponseDropped {
            level: GeoLevel::District,
            parent: id("TS"),
        }));
    }

    #[test]
    fn stale_district_response_never_wins() {
        let mut ctrl = booted(GeoLevel::District);

        ctrl.apply(Command::SelectState(id("TS")));
        let req_ts = only_layer_request(&ctrl.tick(), GeoLevel::District);

        ctrl.apply(Command::SelectState(id("KA")));
        let req_ka = only_layer_request(&ctrl.tick(), GeoLevel::District);

        // TS's response resolves after the selection moved on: dropped.
        complete_ok(&mut ctrl, req_ts.clone(), districts_fc("TS"));
        assert_eq!(ctrl.layer_phase(GeoLevel::District), LayerPhase::Loading);
        assert!(ctrl.stack().get(GeoLevel::District).is_none());

        complete_ok(&mut ctrl, req_ka, districts_fc("KA"));
        let layer = ctrl.stack().get(GeoLevel::District).expect("KA districts");
        assert_eq!(layer.features()[0].region, Some(id("KA-D1")));

        // Even later, TS's response stays dead.
        complete_ok(&mut ctrl, req_ts, districts_fc("TS"));
        let layer = ctrl.stack().get(GeoLevel::District).expect("KA districts");
        assert_eq!(layer.features()[0].region, Some(id("KA-D1")));
    }

    #[test]
    fn state_failure_activates_fallback_panel() {
        let mut ctrl = DrilldownController::new(config(GeoLevel::State));
        ctrl.apply(Command::SetCountry(id("IN")));
        let req = only_layer_request(&ctrl.tick(), GeoLevel::State);

        complete_err(&mut ctrl, req, ProviderError::Status(503));
        assert!(ctrl.fallback_active());
        assert!(ctrl.stack().get(GeoLevel::State).is_none());
        assert!(payloads(&mut ctrl).contains(&DrillEvent::FallbackActivated));

        // The zone pins keep the page usable without any polygons.
        ctrl.apply(Command::ClickFallbackAt {
            x_frac: 0.48,
            y_frac: 0.18,
        });
        assert_eq!(ctrl.selection().zone(), Some(Zone::North));
    }

    #[test]
    fn deeper_failures_stay_silent_and_terminal() {
        let mut ctrl = booted(GeoLevel::District);
        ctrl.apply(Command::SelectState(id("TS")));
        let req = only_layer_request(&ctrl.tick(), GeoLevel::District);

        complete_err(&mut ctrl, req, ProviderError::Status(500));
        assert!(!ctrl.fallback_active());
        assert_eq!(ctrl.layer_phase(GeoLevel::District), LayerPhase::Failed);
        let events = payloads(&mut ctrl);
        assert!(!events.contains(&DrillEvent::FallbackActivated));

        // Same key again: no retry loop.
        ctrl.apply(Command::SelectState(id("TS")));
        assert!(layer_requests(&ctrl.tick(), GeoLevel::District).is_empty());
        assert_eq!(ctrl.layer_phase(GeoLevel::District), LayerPhase::Failed);
    }

    #[test]
    fn revisited_ancestors_load_from_cache() {
        let mut ctrl = booted(GeoLevel::District);

        ctrl.apply(Command::SelectState(id("TS")));
        let req = only_layer_request(&ctrl.tick(), GeoLevel::District);
        complete_ok(&mut ctrl, req, districts_fc("TS"));

        ctrl.apply(Command::SelectState(id("KA")));
        let req = only_layer_request(&ctrl.tick(), GeoLevel::District);
        complete_ok(&mut ctrl, req, districts_fc("KA"));
        let _ = ctrl.drain_events();

        // Back to TS: served from cache, no provider round trip.
        ctrl.apply(Command::SelectState(id("TS")));
        assert_eq!(ctrl.layer_phase(GeoLevel::District), LayerPhase::Loaded);
        assert!(layer_requests(&ctrl.tick(), GeoLevel::District).is_empty());
        let layer = ctrl.stack().get(GeoLevel::District).expect("TS districts");
        assert_eq!(layer.features()[0].region, Some(id("TS-D1")));
        assert!(payloads(&mut ctrl).iter().any(|e| matches!(
            e,
            DrillEvent::LayerLoaded {
                from_cache: true,
                ..
            }
        )));
    }

    #[test]
    fn overdue_fetches_time_out_into_failure() {
        let mut ctrl = DrilldownController::new(DrilldownConfig {
            fetch_timeout_frames: 3,
            ..config(GeoLevel::State)
        });
        ctrl.apply(Command::SetCountry(id("IN")));
        let req = only_layer_request(&ctrl.tick(), GeoLevel::State);

        let mut timed_out = false;
        for _ in 0..3 {
            let _ = ctrl.tick();
            if ctrl.layer_phase(GeoLevel::State) == LayerPhase::Failed {
                timed_out = true;
                break;
            }
        }
        assert!(timed_out);
        assert!(ctrl.fallback_active());
        let events = payloads(&mut ctrl);
        assert!(events.contains(&DrillEvent::LayerTimedOut {
            level: GeoLevel::State,
            parent: id("IN"),
        }));

        // The response that eventually arrives is stale.
        complete_ok(&mut ctrl, req, states_fc());
        assert!(ctrl.fallback_active());
        assert!(ctrl.stack().get(GeoLevel::State).is_none());
    }

    #[test]
    fn zone_tag_is_orthogonal_and_survives_reset() {
        let mut ctrl = booted(GeoLevel::Mandal);
        ctrl.apply(Command::SetZone(Some(Zone::South)));
        ctrl.apply(Command::ClickAt(LonLat::new(80.0, 18.0)));
        assert_eq!(ctrl.selection().zone(), Some(Zone::South));

        ctrl.apply(Command::Reset);
        assert_eq!(ctrl.selection().zone(), Some(Zone::South));
        assert_eq!(ctrl.selection().level(), GeoLevel::Zone);
    }

    #[test]
    fn level_drop_keeps_ids_but_clears_layers() {
        let mut ctrl = booted(GeoLevel::Mandal);
        ctrl.apply(Command::SelectState(id("TS")));
        let req = only_layer_request(&ctrl.tick(), GeoLevel::District);
        complete_ok(&mut ctrl, req, districts_fc("TS"));
        ctrl.apply(Command::SelectDistrict(id("TS-D1")));
        let req = only_layer_request(&ctrl.tick(), GeoLevel::Mandal);
        complete_ok(&mut ctrl, req, mandals_fc());

        ctrl.apply(Command::SetLevel(GeoLevel::State));
        // Identifiers persist; only the layers unload.
        assert_eq!(ctrl.selection().district(), Some(&id("TS-D1")));
        assert!(ctrl.stack().get(GeoLevel::District).is_none());
        assert!(ctrl.stack().get(GeoLevel::Mandal).is_none());
        assert!(ctrl.tick().is_empty());

        // Raising the level again re-serves both layers from cache.
        ctrl.apply(Command::SetLevel(GeoLevel::Mandal));
        assert_eq!(ctrl.layer_phase(GeoLevel::District), LayerPhase::Loaded);
        assert_eq!(ctrl.layer_phase(GeoLevel::Mandal), LayerPhase::Loaded);
        assert!(ctrl.tick().is_empty());
    }

    #[test]
    fn country_change_clears_the_whole_chain() {
        let mut ctrl = booted(GeoLevel::District);
        ctrl.apply(Command::SelectState(id("TS")));
        let req = only_layer_request(&ctrl.tick(), GeoLevel::District);
        complete_ok(&mut ctrl, req, districts_fc("TS"));

        ctrl.apply(Command::SetCountry(id("BD")));
        assert_eq!(ctrl.selection().state(), None);
        assert_eq!(ctrl.selection().district(), None);

        let effects = ctrl.tick();
        let req = only_layer_request(&effects, GeoLevel::State);
        assert_eq!(req.key.parent, id("BD"));
        assert!(
            effects
                .iter()
                .any(|e| matches!(e, Effect::FetchCanonicalStates { .. }))
        );
    }

    #[test]
    fn catalog_failure_degrades_to_raw_ids() {
        let mut ctrl = DrilldownController::new(config(GeoLevel::State));
        ctrl.apply(Command::SetCountry(id("IN")));
        let effects = ctrl.tick();
        let state_req = only_layer_request(&effects, GeoLevel::State);

        ctrl.complete_canonical_states(CanonicalStatesResponse {
            country: id("IN"),
            generation: 1,
            payload: Err(ProviderError::Status(404)),
        });
        assert!(payloads(&mut ctrl).contains(&DrillEvent::CatalogUnavailable));

        complete_ok(&mut ctrl, state_req, states_fc());
        let layer = ctrl.stack().get(GeoLevel::State).expect("state layer");
        // No canonical match: the sniffed name is used verbatim.
        assert_eq!(layer.features()[0].region, Some(id("Telangana")));
    }

    #[test]
    fn late_catalog_rebinds_the_state_layer() {
        let mut ctrl = DrilldownController::new(config(GeoLevel::State));
        ctrl.apply(Command::SetCountry(id("IN")));
        let effects = ctrl.tick();
        let state_req = only_layer_request(&effects, GeoLevel::State);

        // State polygons land before the listing.
        complete_ok(&mut ctrl, state_req, states_fc());
        let layer = ctrl.stack().get(GeoLevel::State).unwrap();
        assert_eq!(layer.features()[0].region, Some(id("Telangana")));

        ctrl.complete_canonical_states(CanonicalStatesResponse {
            country: id("IN"),
            generation: 1,
            payload: Ok(states_listing()),
        });
        let layer = ctrl.stack().get(GeoLevel::State).unwrap();
        assert_eq!(layer.features()[0].region, Some(id("TS")));
    }

    #[test]
    fn stale_catalog_response_is_dropped() {
        let mut ctrl = booted(GeoLevel::State);
        ctrl.complete_canonical_states(CanonicalStatesResponse {
            country: id("IN"),
            generation: 0,
            payload: Ok(json!({"data": []})),
        });
        assert!(payloads(&mut ctrl).contains(&DrillEvent::CatalogResponseDropped));
        // The loaded catalog is untouched.
        assert_eq!(ctrl.catalog().len(), 2);
    }

    #[test]
    fn zoom_controls_clamp_through_the_controller() {
        let mut ctrl = booted(GeoLevel::State);
        for _ in 0..40 {
            ctrl.apply(Command::ZoomIn);
        }
        assert_eq!(ctrl.view().zoom, 12.0);
        for _ in 0..40 {
            ctrl.apply(Command::ZoomOut);
        }
        assert_eq!(ctrl.view().zoom, 1.0);
    }
}
