/// Logical region tag, independent of polygon data.
///
/// Used for zone-match highlighting and as the degraded-mode picker's
/// vocabulary; never part of the boundary fetch keys.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Zone {
    North,
    South,
    East,
    West,
    Central,
}

impl Zone {
    pub const ALL: [Zone; 5] = [Zone::North, Zone::South, Zone::East, Zone::West, Zone::Central];

    pub fn code(&self) -> &'static str {
        match self {
            Zone::North => "NORTH",
            Zone::South => "SOUTH",
            Zone::East => "EAST",
            Zone::West => "WEST",
            Zone::Central => "CENTRAL",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Zone::North => "North",
            Zone::South => "South",
            Zone::East => "East",
            Zone::West => "West",
            Zone::Central => "Central",
        }
    }

    /// Case-insensitive parse of a zone code or label.
    pub fn parse(s: &str) -> Option<Zone> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NORTH" => Some(Zone::North),
            "SOUTH" => Some(Zone::South),
            "EAST" => Some(Zone::East),
            "WEST" => Some(Zone::West),
            "CENTRAL" => Some(Zone::Central),
            _ => None,
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
