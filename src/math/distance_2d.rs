use super::Point2;

/// Returns the Euclidean distance between two points.
#[must_use]
pub fn point_dist(a: &Point2, b: &Point2) -> f64 {
    (a - b).norm()
}

/// Returns the squared Euclidean distance between two points.
#[must_use]
pub fn point_dist_sq(a: &Point2, b: &Point2) -> f64 {
    (a - b).norm_squared()
}

/// Returns the minimum distance from point `p` to the line segment `a`→`b`.
#[must_use]
pub fn point_to_segment_dist(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    point_to_segment_projection(p, a, b).0
}

/// Returns `(distance, t)` from point `p` to the segment `a`→`b`, where `t`
/// is the projection parameter clamped to `[0, 1]`.
#[must_use]
pub fn point_to_segment_projection(p: &Point2, a: &Point2, b: &Point2) -> (f64, f64) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;

    if len_sq < 1e-20 {
        // Degenerate segment (zero length).
        return (point_dist(p, a), 0.0);
    }

    // Project point onto the infinite line, clamp to [0, 1].
    let t = ((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq;
    let t = t.clamp(0.0, 1.0);

    let closest_x = a.x + t * dx;
    let closest_y = a.y + t * dy;

    (
        ((p.x - closest_x).powi(2) + (p.y - closest_y).powi(2)).sqrt(),
        t,
    )
}
