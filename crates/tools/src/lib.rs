//! Fixture-backed host harness for the drill-down controller.
//!
//! The `atlas` binary uses this to replay an interaction against GeoJSON
//! files on disk; tests use it as a ready-made offline host.

use std::fs;
use std::path::PathBuf;

use drilldown::{CanonicalStatesResponse, DrilldownController, Effect, LayerResponse};
use foundation::RegionId;
use serde_json::Value;
use streaming::{GeoProvider, ProviderError};

/// A geo data provider reading fixture files from one directory.
///
/// Layout:
/// - `states.geojson`: the country's state boundaries
/// - `states.json`: canonical `{id, name, zone}` listing (may be absent)
/// - `districts-<STATE>.geojson`: districts per state id
/// - `mandals-<DISTRICT>.geojson`: mandals per district id
#[derive(Debug, Clone)]
pub struct DirProvider {
    root: PathBuf,
}

impl DirProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_json(&self, file_name: &str) -> Result<Value, ProviderError> {
        let path = self.root.join(file_name);
        let bytes = fs::read(&path)
            .map_err(|e| ProviderError::Unreachable(format!("{}: {e}", path.display())))?;
        serde_json::from_slice(&bytes).map_err(ProviderError::from)
    }
}

impl GeoProvider for DirProvider {
    fn fetch_state_layer(&self, _country: &RegionId) -> Result<Value, ProviderError> {
        self.read_json("states.geojson")
    }

    fn fetch_district_layer(&self, state: &RegionId) -> Result<Value, ProviderError> {
        self.read_json(&format!("districts-{state}.geojson"))
    }

    fn fetch_mandal_layer(&self, district: &RegionId) -> Result<Value, ProviderError> {
        self.read_json(&format!("mandals-{district}.geojson"))
    }

    fn list_canonical_states(&self, _country: &RegionId) -> Result<Value, ProviderError> {
        self.read_json("states.json")
    }
}

/// Runs the controller's pending work against `provider` until it settles:
/// ticks, performs every returned effect synchronously, feeds completions
/// back. Returns the number of fetches performed.
pub fn pump(ctrl: &mut DrilldownController, provider: &impl GeoProvider) -> usize {
    let mut fetches = 0;
    loop {
        let effects = ctrl.tick();
        if effects.is_empty() && !ctrl.is_loading() {
            return fetches;
        }
        for effect in effects {
            match effect {
                Effect::FetchLayer(request) => {
                    fetches += 1;
                    let payload = provider.fetch_layer(request.level(), &request.key.parent);
                    ctrl.complete_layer(LayerResponse { request, payload });
                }
                Effect::FetchCanonicalStates {
                    country,
                    generation,
                } => {
                    fetches += 1;
                    let payload = provider.list_canonical_states(&country);
                    ctrl.complete_canonical_states(CanonicalStatesResponse {
                        country,
                        generation,
                        payload,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DirProvider, pump};
    use drilldown::{Command, DrilldownConfig, DrilldownController};
    use foundation::{GeoLevel, RegionId};
    use serde_json::json;
    use std::fs;

    fn write_fixtures(dir: &std::path::Path) {
        let states = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"name": "Telangana"},
                "geometry": {"type": "Polygon",
                    "coordinates": [[[77.0, 15.0], [82.0, 15.0], [82.0, 20.0], [77.0, 20.0], [77.0, 15.0]]]}
            }]
        });
        let listing = json!({"data": [{"id": "TS", "name": "Telangana", "zone": "SOUTH"}]});
        let districts = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"id": "TS-D1"},
                "geometry": {"type": "Polygon",
                    "coordinates": [[[77.0, 15.0], [79.0, 15.0], [79.0, 17.0], [77.0, 17.0], [77.0, 15.0]]]}
            }]
        });
        fs::write(dir.join("states.geojson"), states.to_string()).unwrap();
        fs::write(dir.join("states.json"), listing.to_string()).unwrap();
        fs::write(dir.join("districts-TS.geojson"), districts.to_string()).unwrap();
    }

    #[test]
    fn pump_settles_a_directory_backed_session() {
        let dir = std::env::temp_dir().join(format!("atlas-pump-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        write_fixtures(&dir);

        let provider = DirProvider::new(&dir);
        let mut ctrl = DrilldownController::new(DrilldownConfig {
            initial_level: GeoLevel::District,
            ..DrilldownConfig::default()
        });
        ctrl.apply(Command::SetCountry(RegionId::new("IN")));
        let fetches = pump(&mut ctrl, &provider);
        assert_eq!(fetches, 2); // catalog + state layer

        ctrl.apply(Command::SelectState(RegionId::new("TS")));
        let fetches = pump(&mut ctrl, &provider);
        assert_eq!(fetches, 1);
        assert!(ctrl.stack().get(GeoLevel::District).is_some());

        let _ = fs::remove_dir_all(&dir);
    }
}
