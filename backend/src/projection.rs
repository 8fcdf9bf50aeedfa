use shared::GeoPoint;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProjectionError {
    #[error("reference path needs at least two points, got {0}")]
    EmptyReferencePath(usize),
}

/// A manually-relocated waypoint bound to its segment index on the current
/// path. Recomputed by [`reanchor`] whenever the path is recalculated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntermediatePoint {
    pub position: GeoPoint,
    pub index: usize,
}

/// The closest point on a polyline to a query point, with the index of the
/// segment it lies on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub nearest: GeoPoint,
    pub index: usize,
}

/// Find the globally closest point on `path` to `point`.
///
/// Each consecutive segment is considered in turn: the query point is
/// projected orthogonally onto the segment, clamped to its endpoints, and
/// compared by planar squared distance over (lng, lat) degrees. Ties keep
/// the first (lowest) segment index.
pub fn project_onto_path(path: &[GeoPoint], point: GeoPoint) -> Result<Projection, ProjectionError> {
    if path.len() < 2 {
        return Err(ProjectionError::EmptyReferencePath(path.len()));
    }

    let mut best = Projection {
        nearest: path[0],
        index: 0,
    };
    let mut best_distance = f64::INFINITY;

    for (index, segment) in path.windows(2).enumerate() {
        let nearest = nearest_on_segment(segment[0], segment[1], point);
        let distance = squared_distance(nearest, point);
        if distance < best_distance {
            best_distance = distance;
            best = Projection { nearest, index };
        }
    }

    Ok(best)
}

/// Re-anchor a batch of dragged waypoints against a freshly computed path.
///
/// Each waypoint is projected independently; the waypoint keeps its dragged
/// position while its index becomes the nearest-segment index on the new
/// path. The result is sorted ascending by index so callers can splice the
/// waypoints back into path order. Waypoints landing on the same index are
/// all kept; later consumers may overwrite same-index entries.
pub fn reanchor(
    path: &[GeoPoint],
    dragged: &[IntermediatePoint],
) -> Result<Vec<IntermediatePoint>, ProjectionError> {
    let mut anchored = dragged
        .iter()
        .map(|waypoint| {
            project_onto_path(path, waypoint.position).map(|projection| IntermediatePoint {
                position: waypoint.position,
                index: projection.index,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    // stable: same-index waypoints keep their submission order
    anchored.sort_by_key(|waypoint| waypoint.index);
    Ok(anchored)
}

fn nearest_on_segment(a: GeoPoint, b: GeoPoint, p: GeoPoint) -> GeoPoint {
    let dx = b.lng - a.lng;
    let dy = b.lat - a.lat;
    let length2 = dx * dx + dy * dy;
    if length2 == 0.0 {
        return a;
    }
    let t = (((p.lng - a.lng) * dx + (p.lat - a.lat) * dy) / length2).clamp(0.0, 1.0);
    GeoPoint {
        lng: a.lng + t * dx,
        lat: a.lat + t * dy,
    }
}

fn squared_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let dx = a.lng - b.lng;
    let dy = a.lat - b.lat;
    dx * dx + dy * dy
}
