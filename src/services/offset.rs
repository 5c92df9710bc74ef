use crate::math::distance_2d::{point_dist_sq, point_to_segment_dist};
use crate::math::intersect_2d::{line_line_intersect_2d, segment_segment_intersect_2d};
use crate::math::polygon_2d::{point_in_polygon_2d, signed_area_2d};
use crate::math::{Point2, Vector2, TOLERANCE};
use crate::plan::RoomPolygon;

/// Maximum miter distance as a multiple of the offset distance.
const MITER_LIMIT: f64 = 4.0;

/// Threshold for flat cap: `cos(angle) < this` → near-180° reversal.
const FLAT_CAP_COS: f64 = -0.98;

/// Offsets a closed polygon inward by `distance_px`.
///
/// Uses the slice-and-filter pipeline: build the raw parallel offset with
/// mitered corners, find its self-intersections, slice at them, discard
/// slices that fall back towards the original boundary, and stitch the
/// survivors into closed loops. Returns zero polygons when the offset
/// collapses, and several when the shape splits into pockets.
#[must_use]
pub fn inward_offsets(polygon: &[Point2], distance_px: f64) -> Vec<RoomPolygon> {
    if polygon.len() < 3 || distance_px <= 0.0 || !distance_px.is_finite() {
        return Vec::new();
    }

    // Interior lies to the left of CCW edges; normalize so the left
    // normal always points inward.
    let mut source: Vec<Point2> = polygon.to_vec();
    if signed_area_2d(&source) < 0.0 {
        source.reverse();
    }

    let Some(raw) = raw_offset(&source, distance_px) else {
        return Vec::new();
    };

    let intersections = self_intersections(&raw);
    let loops = if intersections.is_empty() {
        vec![raw]
    } else {
        let slices = slice_at(&raw, &intersections);
        let valid = filter_slices(&slices, &source, distance_px);
        stitch(&valid)
    };

    // A collapsed offset inverts its loop; requiring the source's CCW
    // orientation drops those artifacts along with degenerate slivers.
    loops
        .into_iter()
        .filter(|poly| poly.len() >= 3 && signed_area_2d(poly) > TOLERANCE)
        .filter(|poly| poly.iter().all(|p| point_in_polygon_2d(p, &source)))
        .collect()
}

/// Builds the raw (untrimmed) offset loop by displacing each edge along
/// its left normal and joining consecutive edges at corners.
fn raw_offset(polygon: &[Point2], distance: f64) -> Option<Vec<Point2>> {
    struct OffsetSeg {
        start: Point2,
        end: Point2,
        dir: Vector2,
    }

    let n = polygon.len();
    let mut segs: Vec<OffsetSeg> = Vec::with_capacity(n);

    for i in 0..n {
        let p0 = polygon[i];
        let p1 = polygon[(i + 1) % n];
        let d = p1 - p0;
        let len = d.norm();
        if len < TOLERANCE {
            continue;
        }
        let dir = d / len;
        let normal = Vector2::new(-dir.y, dir.x);
        segs.push(OffsetSeg {
            start: p0 + normal * distance,
            end: p1 + normal * distance,
            dir,
        });
    }

    if segs.len() < 3 {
        return None;
    }

    let m = segs.len();
    let mut verts: Vec<Point2> = Vec::with_capacity(m * 2);

    for i in 0..m {
        let prev = &segs[if i == 0 { m - 1 } else { i - 1 }];
        let next = &segs[i];
        let cos_angle = prev.dir.dot(&next.dir);

        if cos_angle < FLAT_CAP_COS {
            // Near-antiparallel: flat cap.
            verts.push(prev.end);
            verts.push(next.start);
            continue;
        }

        if let Some((t, _)) =
            line_line_intersect_2d(&prev.end, &prev.dir, &next.start, &next.dir)
        {
            let corner = prev.end + prev.dir * t;
            let miter_sq = point_dist_sq(&corner, &next.start);
            let limit = MITER_LIMIT * distance;
            // Guard against runaway miters at sharp corners.
            if miter_sq > limit * limit {
                verts.push(prev.end);
                verts.push(next.start);
            } else {
                verts.push(corner);
            }
        } else {
            // Collinear join: the shared offset point.
            verts.push(next.start);
        }
    }

    Some(dedup_consecutive(verts))
}

fn dedup_consecutive(mut verts: Vec<Point2>) -> Vec<Point2> {
    verts.dedup_by(|a, b| point_dist_sq(a, b) < TOLERANCE);
    if verts.len() > 1 {
        let last = verts[verts.len() - 1];
        if point_dist_sq(&verts[0], &last) < TOLERANCE {
            verts.pop();
        }
    }
    verts
}

/// A self-intersection between two non-adjacent segments of a closed loop.
#[derive(Debug, Clone, Copy)]
struct Intersection {
    seg_i: usize,
    seg_j: usize,
    t_i: f64,
    t_j: f64,
}

/// Finds all self-intersections between non-adjacent segments, skipping
/// endpoint-to-endpoint touches.
fn self_intersections(polygon: &[Point2]) -> Vec<Intersection> {
    let n = polygon.len();
    if n < 4 {
        return Vec::new();
    }

    let eps = 1e-8;
    let mut results = Vec::new();

    for i in 0..n {
        for j in (i + 2)..n {
            // Skip adjacent segments (including the closing seam).
            if i == 0 && j == n - 1 {
                continue;
            }
            let a0 = &polygon[i];
            let a1 = &polygon[(i + 1) % n];
            let b0 = &polygon[j];
            let b1 = &polygon[(j + 1) % n];

            if let Some((_, t, u)) = segment_segment_intersect_2d(a0, a1, b0, b1) {
                let t_at_end = t < eps || t > 1.0 - eps;
                let u_at_end = u < eps || u > 1.0 - eps;
                if t_at_end || u_at_end {
                    continue;
                }
                results.push(Intersection {
                    seg_i: i,
                    seg_j: j,
                    t_i: t,
                    t_j: u,
                });
            }
        }
    }

    results
}

/// Slices the closed loop at every intersection point.
fn slice_at(polygon: &[Point2], intersections: &[Intersection]) -> Vec<Vec<Point2>> {
    let n = polygon.len();

    // Split points as (segment, parameter), ordered around the loop.
    let mut splits: Vec<(usize, f64)> = Vec::with_capacity(intersections.len() * 2);
    for ix in intersections {
        splits.push((ix.seg_i, ix.t_i));
        splits.push((ix.seg_j, ix.t_j));
    }
    splits.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then(a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    });

    let point_at = |seg: usize, t: f64| -> Point2 {
        let p0 = polygon[seg];
        let p1 = polygon[(seg + 1) % n];
        Point2::new(p0.x + t * (p1.x - p0.x), p0.y + t * (p1.y - p0.y))
    };

    let total = splits.len();
    let mut slices = Vec::with_capacity(total);

    for s in 0..total {
        let (seg_start, t_start) = splits[s];
        let (seg_end, t_end) = splits[(s + 1) % total];

        let mut verts = vec![point_at(seg_start, t_start)];

        if seg_start == seg_end && t_end > t_start {
            verts.push(point_at(seg_end, t_end));
        } else {
            // Walk full vertices between the two split points, wrapping.
            let mut seg = (seg_start + 1) % n;
            loop {
                verts.push(polygon[seg]);
                if seg == seg_end {
                    break;
                }
                seg = (seg + 1) % n;
            }
            verts.push(point_at(seg_end, t_end));
        }

        if verts.len() >= 2 {
            slices.push(verts);
        }
    }

    slices
}

/// Keeps slices whose midpoint stays at least half the offset distance
/// away from the original boundary and inside the original polygon.
fn filter_slices<'a>(
    slices: &'a [Vec<Point2>],
    original: &[Point2],
    distance: f64,
) -> Vec<&'a Vec<Point2>> {
    let threshold = distance * 0.5;

    slices
        .iter()
        .filter(|slice| {
            if slice.len() < 2 {
                return false;
            }
            let mid = &slice[slice.len() / 2];
            point_in_polygon_2d(mid, original) && min_dist_to_boundary(mid, original) >= threshold
        })
        .collect()
}

fn min_dist_to_boundary(p: &Point2, polygon: &[Point2]) -> f64 {
    let n = polygon.len();
    let mut min_d = f64::MAX;
    for i in 0..n {
        let d = point_to_segment_dist(p, &polygon[i], &polygon[(i + 1) % n]);
        if d < min_d {
            min_d = d;
        }
    }
    min_d
}

/// Stitches valid slices back into closed loops by greedy endpoint
/// matching: for each chain end, take the nearest unused slice whose start
/// coincides with it.
fn stitch(slices: &[&Vec<Point2>]) -> Vec<Vec<Point2>> {
    if slices.is_empty() {
        return Vec::new();
    }

    let n = slices.len();
    let mut used = vec![false; n];
    let mut results = Vec::new();
    let tol_sq = 1e-8;

    for start in 0..n {
        if used[start] {
            continue;
        }
        used[start] = true;
        let mut chain: Vec<Point2> = slices[start].clone();

        loop {
            let Some(end) = chain.last().copied() else {
                break;
            };

            let mut best: Option<usize> = None;
            let mut best_dist_sq = tol_sq;
            for candidate in 0..n {
                if used[candidate] {
                    continue;
                }
                let dist_sq = point_dist_sq(&slices[candidate][0], &end);
                if dist_sq < best_dist_sq {
                    best_dist_sq = dist_sq;
                    best = Some(candidate);
                }
            }

            if let Some(next) = best {
                used[next] = true;
                chain.extend_from_slice(&slices[next][1..]);
            } else {
                break;
            }
        }

        if chain.len() < 3 {
            continue;
        }

        // Closed loops only; drop the duplicate closing vertex.
        let coincide = point_dist_sq(&chain[0], &chain[chain.len() - 1]) < tol_sq;
        if coincide {
            chain.pop();
            if chain.len() >= 3 {
                results.push(chain);
            }
        }
    }

    results
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::polygon_2d::bounding_box_2d;

    fn rect(w: f64, h: f64) -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(w, 0.0),
            Point2::new(w, h),
            Point2::new(0.0, h),
        ]
    }

    #[test]
    fn square_offsets_to_smaller_square() {
        let result = inward_offsets(&rect(400.0, 400.0), 50.0);
        assert_eq!(result.len(), 1, "expected one offset polygon");
        let area = signed_area_2d(&result[0]).abs();
        assert!((area - 90_000.0).abs() < 1.0, "area={area}");
        let bb = bounding_box_2d(&result[0]).unwrap();
        assert!((bb.min.x - 50.0).abs() < 1e-6);
        assert!((bb.max.x - 350.0).abs() < 1e-6);
    }

    #[test]
    fn clockwise_input_is_normalized() {
        let mut cw = rect(400.0, 400.0);
        cw.reverse();
        let result = inward_offsets(&cw, 50.0);
        assert_eq!(result.len(), 1);
        assert!((signed_area_2d(&result[0]).abs() - 90_000.0).abs() < 1.0);
    }

    #[test]
    fn over_deep_offset_collapses() {
        let result = inward_offsets(&rect(400.0, 400.0), 250.0);
        assert!(result.is_empty(), "offset past the center must collapse");
    }

    #[test]
    fn hourglass_splits_into_two() {
        // Hourglass with a 60 px waist at y=200: a 50 px inward offset
        // pinches the waist off and the lobes separate.
        let poly = vec![
            Point2::new(0.0, 0.0),
            Point2::new(400.0, 0.0),
            Point2::new(230.0, 200.0),
            Point2::new(400.0, 400.0),
            Point2::new(0.0, 400.0),
            Point2::new(170.0, 200.0),
        ];
        let result = inward_offsets(&poly, 50.0);
        assert_eq!(result.len(), 2, "waist must pinch off, got {}", result.len());
        for lobe in &result {
            let area = signed_area_2d(lobe);
            assert!(area > 1_000.0, "lobe area={area}");
            for p in lobe {
                assert!(point_in_polygon_2d(p, &poly));
            }
        }
    }

    #[test]
    fn degenerate_input_rejected() {
        assert!(inward_offsets(&[], 50.0).is_empty());
        assert!(inward_offsets(&rect(400.0, 400.0)[..2], 50.0).is_empty());
        assert!(inward_offsets(&rect(400.0, 400.0), -10.0).is_empty());
        assert!(inward_offsets(&rect(400.0, 400.0), 0.0).is_empty());
    }

    #[test]
    fn result_stays_inside_original()  {
        let poly = vec![
            Point2::new(0.0, 0.0),
            Point2::new(600.0, 0.0),
            Point2::new(600.0, 300.0),
            Point2::new(300.0, 300.0),
            Point2::new(300.0, 600.0),
            Point2::new(0.0, 600.0),
        ];
        for ring in inward_offsets(&poly, 60.0) {
            for p in &ring {
                assert!(point_in_polygon_2d(p, &poly), "({}, {}) escaped", p.x, p.y);
            }
        }
    }
}
