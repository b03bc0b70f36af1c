use earcutr::earcut;
use foundation::LonLat;
use formats::BoundaryFeature;

/// Triangulates a feature's polygons into a flat triangle list
/// (3 vertices per triangle) in lon/lat space.
///
/// Boundary polygons are small enough that triangulating directly in degree
/// space is fine; the render surface applies its projection per vertex.
pub fn triangulate_feature(feature: &BoundaryFeature) -> Vec<LonLat> {
    let mut out = Vec::new();
    for polygon in &feature.polygons {
        out.extend(triangulate_rings(polygon));
    }
    out
}

fn triangulate_rings(rings: &[Vec<LonLat>]) -> Vec<LonLat> {
    let Some(outer) = rings.first() else {
        return Vec::new();
    };
    if outer.len() < 3 {
        return Vec::new();
    }

    // Flatten rings into 2D coordinates plus a parallel vertex list, and
    // remove a closing duplicate point if present.
    let mut vertices: Vec<LonLat> = Vec::new();
    let mut coords_2d: Vec<f64> = Vec::new();
    let mut hole_indices: Vec<usize> = Vec::new();

    for (ring_i, ring) in rings.iter().enumerate() {
        let mut ring_pts: Vec<LonLat> = ring.clone();
        drop_closing_duplicate(&mut ring_pts);
        if ring_pts.len() < 3 {
            continue;
        }

        if ring_i > 0 {
            hole_indices.push(vertices.len());
        }

        for p in ring_pts {
            coords_2d.push(p.lon_deg);
            coords_2d.push(p.lat_deg);
            vertices.push(p);
        }
    }

    if vertices.len() < 3 {
        return Vec::new();
    }

    let indices = match earcut(&coords_2d, &hole_indices, 2) {
        Ok(ix) => ix,
        Err(_) => return Vec::new(),
    };

    let mut out: Vec<LonLat> = Vec::with_capacity(indices.len());
    for idx in indices {
        if let Some(v) = vertices.get(idx) {
            out.push(*v);
        }
    }
    out
}

fn drop_closing_duplicate(points: &mut Vec<LonLat>) {
    if points.len() >= 2 {
        let first = points[0];
        let last = *points.last().unwrap();
        if (first.lon_deg - last.lon_deg).abs() < 1e-9
            && (first.lat_deg - last.lat_deg).abs() < 1e-9
        {
            points.pop();
        }
    }
}
