use std::sync::Arc;

/// Stable key for a region at any level.
///
/// Keeps the original identifier text verbatim (canonical ids and raw feature
/// ids share this type) while staying cheap to clone and usable as an ordered
/// map key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionId(Arc<str>);

impl RegionId {
    pub fn new(id: impl AsRef<str>) -> Self {
        RegionId(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RegionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionId {
    fn from(s: &str) -> Self {
        RegionId::new(s)
    }
}

impl From<String> for RegionId {
    fn from(s: String) -> Self {
        RegionId(Arc::from(s))
    }
}
