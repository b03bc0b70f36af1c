//! Canonical region registry and name-based identifier resolution.
//!
//! Boundary sources key their features by whatever the upstream publisher
//! chose (often a human-readable name); the rest of the system is keyed by
//! canonical ids. This crate owns the one adapter where that mismatch is
//! patched over: normalize the feature's name, match it against a canonical
//! listing, and fall back to the raw feature id when nothing matches.

use std::collections::BTreeMap;

use foundation::{RegionId, Zone};
use serde::{Deserialize, Serialize};

/// One entry of a canonical listing, as served by the geo data provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

/// A canonical region with its decoded zone tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRegion {
    pub id: RegionId,
    pub name: String,
    pub zone: Option<Zone>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    Parse(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Parse(msg) => write!(f, "catalog listing parse error: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Outcome of resolving a boundary feature to an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRegion {
    pub id: RegionId,
    /// `true` when the id came from the canonical listing; `false` when the
    /// raw feature text was used verbatim.
    pub canonical: bool,
}

/// Normalize a display name for matching: lowercase, ASCII alphanumerics
/// only. Mirrors what the upstream publishers survive round-tripping, so
/// "Tamil Nadu", "TAMIL-NADU" and "tamilnadu" all collide.
pub fn normalize_name(s: &str) -> String {
    s.chars()
        .filter_map(|c| {
            let c = c.to_ascii_lowercase();
            c.is_ascii_alphanumeric().then_some(c)
        })
        .collect()
}

/// Ordered canonical region registry.
///
/// Ordering contract:
/// - `regions()` yields entries in listing order.
/// - Name collisions after normalization resolve to the earliest entry.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RegionCatalog {
    regions: Vec<CanonicalRegion>,
    by_id: BTreeMap<RegionId, usize>,
    by_normalized_name: BTreeMap<String, usize>,
}

impl RegionCatalog {
    pub fn new(regions: Vec<CanonicalRegion>) -> Self {
        let mut by_id = BTreeMap::new();
        let mut by_normalized_name = BTreeMap::new();
        for (idx, region) in regions.iter().enumerate() {
            by_id.entry(region.id.clone()).or_insert(idx);
            let norm = normalize_name(&region.name);
            if !norm.is_empty() {
                by_normalized_name.entry(norm).or_insert(idx);
            }
        }
        Self {
            regions,
            by_id,
            by_normalized_name,
        }
    }

    /// Decode a canonical listing. Accepts either a bare JSON array of
    /// records or the provider's `{"data": [...]}` envelope.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, CatalogError> {
        let records = match value {
            serde_json::Value::Array(_) => value,
            serde_json::Value::Object(mut obj) => obj
                .remove("data")
                .ok_or_else(|| CatalogError::Parse("missing data field".to_string()))?,
            other => {
                return Err(CatalogError::Parse(format!(
                    "expected array or object, got {other}"
                )));
            }
        };
        let records: Vec<RegionRecord> =
            serde_json::from_value(records).map_err(|e| CatalogError::Parse(e.to_string()))?;
        let regions = records
            .into_iter()
            .map(|r| CanonicalRegion {
                id: RegionId::from(r.id),
                name: r.name,
                zone: r.zone.as_deref().and_then(Zone::parse),
            })
            .collect();
        Ok(Self::new(regions))
    }

    pub fn from_json_str(payload: &str) -> Result<Self, CatalogError> {
        let value =
            serde_json::from_str(payload).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::from_json_value(value)
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn regions(&self) -> &[CanonicalRegion] {
        &self.regions
    }

    pub fn get(&self, id: &RegionId) -> Option<&CanonicalRegion> {
        self.by_id.get(id).map(|&idx| &self.regions[idx])
    }

    /// Content revision of this listing, for cache pinning.
    ///
    /// Stable across process runs: hashes the canonical serialization of the
    /// records in listing order.
    pub fn revision(&self) -> String {
        let records: Vec<RegionRecord> = self
            .regions
            .iter()
            .map(|r| RegionRecord {
                id: r.id.as_str().to_string(),
                name: r.name.clone(),
                zone: r.zone.map(|z| z.code().to_string()),
            })
            .collect();
        let bytes = serde_json::to_vec(&records).unwrap_or_default();
        blake3::hash(&bytes).to_hex().to_string()
    }

    /// Resolve a boundary feature to an identifier.
    ///
    /// Rules, first match wins:
    /// 1. The raw feature id is already a canonical id → use it.
    /// 2. The normalized display name matches a canonical name → canonical id.
    /// 3. Fall back to the raw feature id (or the display name when the
    ///    feature carries no id at all) verbatim.
    pub fn resolve_feature(
        &self,
        raw_id: Option<&str>,
        display_name: Option<&str>,
    ) -> Option<ResolvedRegion> {
        if let Some(raw) = raw_id {
            let candidate = RegionId::new(raw);
            if self.by_id.contains_key(&candidate) {
                return Some(ResolvedRegion {
                    id: candidate,
                    canonical: true,
                });
            }
        }
        if let Some(name) = display_name {
            let norm = normalize_name(name);
            if !norm.is_empty() {
                if let Some(&idx) = self.by_normalized_name.get(&norm) {
                    return Some(ResolvedRegion {
                        id: self.regions[idx].id.clone(),
                        canonical: true,
                    });
                }
            }
        }
        raw_id
            .or(display_name)
            .filter(|s| !s.is_empty())
            .map(|s| ResolvedRegion {
                id: RegionId::new(s),
                canonical: false,
            })
    }
}
