use crate::math::distance_2d::point_dist;
use crate::math::polygon_2d::point_in_polygon_2d;
use crate::math::Point2;
use crate::plan::Anchor;

use super::candidates::{CandidateSet, Priority};
use super::classify::{ProcessedRoom, RoomCategory};
use super::context::PlacementContext;

/// Second pass over the rooms: grid-sample each non-compact room for
/// weak-signal pockets and inject one corrective critical candidate per
/// room that has any.
///
/// Signal is approximated as `max(0, 1 − d / radius)` against the nearest
/// candidate or pre-existing anchor. Weak points are averaged into a
/// single correction; if the average escapes the room polygon (concave
/// shapes), the nearest literal weak point stands in for it.
pub fn sweep(
    rooms: &[ProcessedRoom],
    existing: &[Anchor],
    ctx: &PlacementContext<'_>,
    set: &mut CandidateSet,
) {
    for room in rooms {
        if room.category == RoomCategory::Compact {
            continue;
        }
        sweep_room(room, existing, ctx, set);
    }
}

fn sweep_room(
    room: &ProcessedRoom,
    existing: &[Anchor],
    ctx: &PlacementContext<'_>,
    set: &mut CandidateSet,
) {
    let tuning = ctx.tuning();
    // Diagonal of a one-meter cell, so the grid never under-samples a
    // square meter.
    let step = tuning.grid_step_factor * ctx.scale_ratio;
    if step <= 0.0 {
        return;
    }

    let bbox = room.metrics.bbox;
    let mut weak: Vec<Point2> = Vec::new();

    let mut y = bbox.min.y;
    while y <= bbox.max.y {
        let mut x = bbox.min.x;
        while x <= bbox.max.x {
            let p = Point2::new(x, y);
            if point_in_polygon_2d(&p, &room.polygon) {
                let strength = signal_strength(&p, existing, ctx, set);
                if strength < tuning.weak_signal_cutoff {
                    weak.push(p);
                }
            }
            x += step;
        }
        y += step;
    }

    if weak.is_empty() {
        return;
    }

    let mut sx = 0.0;
    let mut sy = 0.0;
    for p in &weak {
        sx += p.x;
        sy += p.y;
    }
    #[allow(clippy::cast_precision_loss)]
    let inv = 1.0 / weak.len() as f64;
    let average = Point2::new(sx * inv, sy * inv);

    let correction = if point_in_polygon_2d(&average, &room.polygon) {
        average
    } else {
        nearest_to(&average, &weak)
    };
    set.add(correction, Priority::Critical, None);
}

/// Normalized signal at a point from the nearest candidate or anchor.
fn signal_strength(
    p: &Point2,
    existing: &[Anchor],
    ctx: &PlacementContext<'_>,
    set: &CandidateSet,
) -> f64 {
    let mut nearest = set.min_dist_to(p).unwrap_or(f64::MAX);
    for anchor in existing {
        nearest = nearest.min(point_dist(&anchor.position(), p));
    }
    (1.0 - nearest / ctx.radius_px).max(0.0)
}

fn nearest_to(target: &Point2, points: &[Point2]) -> Point2 {
    let mut best = points[0];
    let mut best_dist = point_dist(&best, target);
    for p in &points[1..] {
        let d = point_dist(p, target);
        if d < best_dist {
            best_dist = d;
            best = *p;
        }
    }
    best
}
