//! GeoJSON boundary decoding.
//!
//! Boundary sources disagree on where a feature's identity lives: some carry
//! `properties.id`, some only a display name under a publisher-specific key,
//! some a numeric top-level id. The decoder normalizes all of that into
//! [`BoundaryFeature`] and leaves id-to-canonical resolution to the catalog.

use foundation::{GeoBounds, LonLat, Zone};
use serde_json::{Map, Value};

/// Property keys checked, in order, for a feature's display name.
///
/// Matches the aliases seen across public administrative boundary dumps.
pub const NAME_KEYS: [&str; 7] = [
    "name",
    "NAME_1",
    "st_nm",
    "ST_NM",
    "state_name",
    "STATE",
    "State",
];

/// One ring of lon/lat vertices; the first ring of a polygon is the
/// exterior, the rest are holes.
pub type Ring = Vec<LonLat>;

/// A polygon as a list of rings.
pub type Polygon = Vec<Ring>;

#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    /// Raw identifier as published by the source, if any.
    pub id: Option<String>,
    /// Display name sniffed from [`NAME_KEYS`], if any.
    pub name: Option<String>,
    /// Optional zone tag carried by the source.
    pub zone: Option<Zone>,
    /// MultiPolygon geometry; single polygons decode as one entry.
    pub polygons: Vec<Polygon>,
    /// Bounds over all exterior rings, for cheap hit-test prefiltering.
    pub bounds: GeoBounds,
}

impl BoundaryFeature {
    /// Vertex count across all rings (size accounting).
    fn vertex_count(&self) -> usize {
        self.polygons
            .iter()
            .flat_map(|p| p.iter())
            .map(|r| r.len())
            .sum()
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct BoundaryCollection {
    pub features: Vec<BoundaryFeature>,
    /// Features dropped during decode (non-polygon or degenerate geometry,
    /// or no usable identity). Surfaced so hosts can log coverage gaps.
    pub skipped: usize,
}

#[derive(Debug)]
pub enum GeoJsonError {
    NotAFeatureCollection,
    InvalidFeature { index: usize, reason: String },
    Json(String),
}

impl std::fmt::Display for GeoJsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoJsonError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
            GeoJsonError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
            GeoJsonError::Json(msg) => write!(f, "JSON parse error: {msg}"),
        }
    }
}

impl std::error::Error for GeoJsonError {}

/// Pick a display name out of a feature's properties using [`NAME_KEYS`].
pub fn sniff_display_name(properties: &Map<String, Value>) -> Option<&str> {
    for key in NAME_KEYS {
        if let Some(s) = properties.get(key).and_then(|v| v.as_str()) {
            let s = s.trim();
            if !s.is_empty() {
                return Some(s);
            }
        }
    }
    None
}

impl BoundaryCollection {
    pub fn from_geojson_str(payload: &str) -> Result<Self, GeoJsonError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| GeoJsonError::Json(e.to_string()))?;
        Self::from_geojson_value(value)
    }

    pub fn from_geojson_value(value: Value) -> Result<Self, GeoJsonError> {
        let obj = value.as_object().ok_or(GeoJsonError::NotAFeatureCollection)?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(GeoJsonError::NotAFeatureCollection)?;
        if ty != "FeatureCollection" {
            return Err(GeoJsonError::NotAFeatureCollection);
        }

        let features_val = obj
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or(GeoJsonError::NotAFeatureCollection)?;

        let mut features = Vec::with_capacity(features_val.len());
        let mut skipped = 0usize;
        for (index, feat_val) in features_val.iter().enumerate() {
            match decode_feature(index, feat_val)? {
                Some(feature) => features.push(feature),
                None => skipped += 1,
            }
        }

        Ok(Self { features, skipped })
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Approximate in-memory size, used for cache budgeting.
    pub fn approx_size_bytes(&self) -> usize {
        let mut bytes = 0usize;
        for f in &self.features {
            bytes += 64;
            bytes += f.id.as_deref().map_or(0, str::len);
            bytes += f.name.as_deref().map_or(0, str::len);
            bytes += f.vertex_count() * std::mem::size_of::<LonLat>();
        }
        bytes
    }

    /// Content hash of the decoded collection.
    ///
    /// Stable across runs: identity strings and coordinates are fed to the
    /// hasher in feature order.
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.features.len() as u64).to_le_bytes());
        for f in &self.features {
            hasher.update(f.id.as_deref().unwrap_or("").as_bytes());
            hasher.update(&[0]);
            hasher.update(f.name.as_deref().unwrap_or("").as_bytes());
            hasher.update(&[0]);
            hasher.update(f.zone.as_ref().map(Zone::code).unwrap_or("").as_bytes());
            hasher.update(&[0]);
            for polygon in &f.polygons {
                for ring in polygon {
                    for p in ring {
                        hasher.update(&p.lon_deg.to_le_bytes());
                        hasher.update(&p.lat_deg.to_le_bytes());
                    }
                }
            }
        }
        hasher.finalize().to_hex().to_string()
    }
}

/// Decode one feature; `Ok(None)` means "skip it" (tracked by the caller).
fn decode_feature(index: usize, value: &Value) -> Result<Option<BoundaryFeature>, GeoJsonError> {
    let obj = value.as_object().ok_or(GeoJsonError::InvalidFeature {
        index,
        reason: "feature must be an object".to_string(),
    })?;

    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or(GeoJsonError::InvalidFeature {
            index,
            reason: "feature missing type".to_string(),
        })?;
    if ty != "Feature" {
        return Err(GeoJsonError::InvalidFeature {
            index,
            reason: format!("unexpected feature type: {ty}"),
        });
    }

    let empty = Map::new();
    let properties = obj
        .get("properties")
        .and_then(|v| v.as_object())
        .unwrap_or(&empty);

    let id = value_as_id(properties.get("id")).or_else(|| value_as_id(obj.get("id")));
    let name = sniff_display_name(properties).map(str::to_string);
    let zone = properties
        .get("zone")
        .and_then(|v| v.as_str())
        .and_then(Zone::parse);

    // A feature we can neither click-resolve nor label is useless downstream.
    if id.is_none() && name.is_none() {
        return Ok(None);
    }

    let Some(geometry) = obj.get("geometry").filter(|g| !g.is_null()) else {
        return Ok(None);
    };
    let Some(polygons) = decode_polygons(geometry) else {
        return Ok(None);
    };

    let mut bounds = GeoBounds::empty();
    for polygon in &polygons {
        if let Some(exterior) = polygon.first() {
            for p in exterior {
                bounds.expand(*p);
            }
        }
    }
    if bounds.is_empty() {
        return Ok(None);
    }

    Ok(Some(BoundaryFeature {
        id,
        name,
        zone,
        polygons,
        bounds,
    }))
}

fn value_as_id(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Decode a Polygon or MultiPolygon geometry; `None` for anything else or
/// for degenerate rings.
fn decode_polygons(geometry: &Value) -> Option<Vec<Polygon>> {
    let obj = geometry.as_object()?;
    let ty = obj.get("type")?.as_str()?;
    let coords = obj.get("coordinates")?.as_array()?;

    let polygons = match ty {
        "Polygon" => vec![decode_polygon(coords)?],
        "MultiPolygon" => {
            let mut out = Vec::with_capacity(coords.len());
            for polygon_coords in coords {
                out.push(decode_polygon(polygon_coords.as_array()?)?);
            }
            out
        }
        _ => return None,
    };

    (!polygons.is_empty()).then_some(polygons)
}

fn decode_polygon(rings: &[Value]) -> Option<Polygon> {
    let mut out = Vec::with_capacity(rings.len());
    for (ring_i, ring_val) in rings.iter().enumerate() {
        let ring = decode_ring(ring_val.as_array()?)?;
        // The exterior must enclose area; degenerate holes are dropped.
        if ring.len() < 3 {
            if ring_i == 0 {
                return None;
            }
            continue;
        }
        out.push(ring);
    }
    (!out.is_empty()).then_some(out)
}

fn decode_ring(coords: &[Value]) -> Option<Ring> {
    let mut ring = Vec::with_capacity(coords.len());
    for pair in coords {
        let pair = pair.as_array()?;
        if pair.len() < 2 {
            return None;
        }
        let lon = pair[0].as_f64()?;
        let lat = pair[1].as_f64()?;
        ring.push(LonLat::new(lon, lat));
    }
    Some(ring)
}

#[cfg(test)]
mod tests {
    use super::{BoundaryCollection, GeoJsonError};
    use foundation::{LonLat, Zone};
    use serde_json::json;

    fn square_coords(x0: f64, y0: f64, x1: f64, y1: f64) -> serde_json::Value {
        json!([[[x0, y0], [x1, y0], [x1, y1], [x0, y1], [x0, y0]]])
    }

    #[test]
    fn decodes_features_with_sniffed_names() {
        let fc = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"st_nm": "Telangana", "zone": "SOUTH"},
                    "geometry": {"type": "Polygon", "coordinates": square_coords(77.0, 16.0, 81.0, 19.0)}
                },
                {
                    "type": "Feature",
                    "id": 36,
                    "properties": {},
                    "geometry": {"type": "Polygon", "coordinates": square_coords(70.0, 20.0, 75.0, 25.0)}
                }
            ]
        });
        let c = BoundaryCollection::from_geojson_value(fc).unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c.skipped, 0);

        let f0 = &c.features[0];
        assert_eq!(f0.id, None);
        assert_eq!(f0.name.as_deref(), Some("Telangana"));
        assert_eq!(f0.zone, Some(Zone::South));
        assert!(f0.bounds.contains(LonLat::new(79.0, 17.0)));

        let f1 = &c.features[1];
        assert_eq!(f1.id.as_deref(), Some("36"));
        assert_eq!(f1.name, None);
    }

    #[test]
    fn properties_id_wins_over_top_level_id() {
        let fc = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "id": "outer",
                "properties": {"id": "TS", "name": "Telangana"},
                "geometry": {"type": "Polygon", "coordinates": square_coords(0.0, 0.0, 1.0, 1.0)}
            }]
        });
        let c = BoundaryCollection::from_geojson_value(fc).unwrap();
        assert_eq!(c.features[0].id.as_deref(), Some("TS"));
    }

    #[test]
    fn multipolygon_decodes_every_part() {
        let fc = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"name": "Islands"},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        square_coords(0.0, 0.0, 1.0, 1.0),
                        square_coords(5.0, 5.0, 6.0, 6.0)
                    ]
                }
            }]
        });
        let c = BoundaryCollection::from_geojson_value(fc).unwrap();
        assert_eq!(c.features[0].polygons.len(), 2);
        assert!(c.features[0].bounds.contains(LonLat::new(5.5, 5.5)));
    }

    #[test]
    fn non_polygon_and_anonymous_features_are_skipped() {
        let fc = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"name": "Capital"},
                    "geometry": {"type": "Point", "coordinates": [78.4, 17.4]}
                },
                {
                    "type": "Feature",
                    "properties": {},
                    "geometry": {"type": "Polygon", "coordinates": square_coords(0.0, 0.0, 1.0, 1.0)}
                }
            ]
        });
        let c = BoundaryCollection::from_geojson_value(fc).unwrap();
        assert!(c.is_empty());
        assert_eq!(c.skipped, 2);
    }

    #[test]
    fn rejects_non_feature_collections() {
        let err = BoundaryCollection::from_geojson_value(json!({"type": "Feature"})).unwrap_err();
        assert!(matches!(err, GeoJsonError::NotAFeatureCollection));

        let err = BoundaryCollection::from_geojson_str("not json").unwrap_err();
        assert!(matches!(err, GeoJsonError::Json(_)));
    }

    #[test]
    fn content_hash_tracks_geometry() {
        let fc = |x: f64| {
            json!({
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "properties": {"name": "A"},
                    "geometry": {"type": "Polygon", "coordinates": square_coords(0.0, 0.0, x, 1.0)}
                }]
            })
        };
        let a = BoundaryCollection::from_geojson_value(fc(1.0)).unwrap();
        let b = BoundaryCollection::from_geojson_value(fc(1.0)).unwrap();
        let c = BoundaryCollection::from_geojson_value(fc(2.0)).unwrap();
        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(a.content_hash(), c.content_hash());
        assert!(a.approx_size_bytes() > 0);
    }
}
