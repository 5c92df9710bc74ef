use std::f64::consts::TAU;

use crate::math::distance_2d::point_dist;
use crate::math::intersect_2d::segment_segment_intersect_2d;
use crate::math::polygon_2d::{point_in_polygon_2d, polyline_length_2d};
use crate::math::{Point2, TOLERANCE};
use crate::plan::RoomPolygon;
use crate::services::GeometryServices;

use super::super::candidates::{CandidateSet, Priority};
use super::super::classify::ProcessedRoom;
use super::super::context::PlacementContext;

/// Number of probe points used by the local overlap-ratio estimate.
const OVERLAP_PROBES: usize = 8;

/// Large rooms get a concentric multi-zone analysis over erosion rings:
///
/// 1. first-ring/skeleton intersections (structure near the walls),
/// 2. skeleton junctions inside the deepest ring,
/// 3. gap fill along long ring edges,
/// 4. gap fill along skeleton paths the rings fail to cover.
pub fn place<S: GeometryServices>(
    services: &S,
    room: &ProcessedRoom,
    ctx: &PlacementContext<'_>,
    set: &mut CandidateSet,
) {
    let rings = erosion_rings(services, &room.polygon, ctx);

    zone_ring_skeleton(&rings, room, ctx, set);
    zone_deep_junctions(&rings, room, ctx, set);
    zone_ring_gap_fill(&rings, ctx, set);
    zone_skeleton_gap_fill(&rings, room, ctx, set);
}

/// Erodes the room inward layer by layer until the offset collapses.
///
/// Layer depths grow from the initial ring distance by a fixed step, with
/// a hard layer cap so pathological input cannot loop forever.
fn erosion_rings<S: GeometryServices>(
    services: &S,
    polygon: &[Point2],
    ctx: &PlacementContext<'_>,
) -> Vec<Vec<RoomPolygon>> {
    let tuning = ctx.tuning();
    let mut rings = Vec::new();
    let mut depth_m = tuning.ring_initial_m;

    for _ in 0..tuning.ring_layer_cap {
        let layer: Vec<RoomPolygon> = services
            .generate_offsets(polygon, ctx.px(depth_m))
            .into_iter()
            .filter(|p| p.len() >= 3)
            .collect();
        if layer.is_empty() {
            break;
        }
        rings.push(layer);
        depth_m += tuning.ring_step_m;
    }

    rings
}

/// Zone 1: intersect every first-ring edge with every skeleton path and
/// emit the crossing points, snapped to a nearby ring vertex when close.
fn zone_ring_skeleton(
    rings: &[Vec<RoomPolygon>],
    room: &ProcessedRoom,
    ctx: &PlacementContext<'_>,
    set: &mut CandidateSet,
) {
    let Some(first_layer) = rings.first() else {
        return;
    };
    let snap_px = ctx.px(ctx.tuning().ring_vertex_snap_m);

    for ring in first_layer {
        let n = ring.len();
        for i in 0..n {
            let e0 = &ring[i];
            let e1 = &ring[(i + 1) % n];
            for path in &room.graph.paths {
                for seg in path.windows(2) {
                    let Some((pt, _, _)) = segment_segment_intersect_2d(e0, e1, &seg[0], &seg[1])
                    else {
                        continue;
                    };
                    let snapped = snap_to_ring_vertex(&pt, ring, snap_px);
                    set.add(snapped, Priority::High, None);
                }
            }
        }
    }
}

fn snap_to_ring_vertex(pt: &Point2, ring: &[Point2], snap_px: f64) -> Point2 {
    let mut best = *pt;
    let mut best_dist = snap_px;
    for v in ring {
        let d = point_dist(pt, v);
        if d < best_dist {
            best_dist = d;
            best = *v;
        }
    }
    best
}

/// Zone 2: skeleton junctions inside the deepest ring, kept only when the
/// pocket is not already served.
fn zone_deep_junctions(
    rings: &[Vec<RoomPolygon>],
    room: &ProcessedRoom,
    ctx: &PlacementContext<'_>,
    set: &mut CandidateSet,
) {
    let Some(deep_layer) = rings.last() else {
        return;
    };
    let tuning = ctx.tuning();
    let gap_px = ctx.px(tuning.deep_gap_m);

    for junction in room.graph.junction_positions() {
        if !inside_any(&junction, deep_layer) {
            continue;
        }
        if let Some(d) = set.min_dist_to(&junction) {
            if d < gap_px {
                continue;
            }
        }
        // Do not crowd deep pockets that are already well covered.
        if set.count_within(&junction, ctx.radius_px) >= 2
            && overlap_ratio(&junction, ctx, set) > tuning.overlap_ratio_limit
        {
            continue;
        }
        set.add(junction, Priority::High, None);
    }
}

/// Fraction of probe points around `center` already inside some existing
/// candidate's coverage radius.
fn overlap_ratio(center: &Point2, ctx: &PlacementContext<'_>, set: &CandidateSet) -> f64 {
    let probe_radius = ctx.radius_px * 0.5;
    let mut covered = 0_usize;

    for i in 0..OVERLAP_PROBES {
        #[allow(clippy::cast_precision_loss)]
        let angle = TAU * i as f64 / OVERLAP_PROBES as f64;
        let probe = Point2::new(
            center.x + probe_radius * angle.cos(),
            center.y + probe_radius * angle.sin(),
        );
        if set.count_within(&probe, ctx.radius_px) > 0 {
            covered += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    {
        covered as f64 / OVERLAP_PROBES as f64
    }
}

/// Zone 3: long ring edges get evenly spaced gap-fill candidates.
fn zone_ring_gap_fill(
    rings: &[Vec<RoomPolygon>],
    ctx: &PlacementContext<'_>,
    set: &mut CandidateSet,
) {
    let edge_gap_px = ctx.px(ctx.tuning().ring_edge_gap_m);

    for layer in rings {
        for ring in layer {
            let n = ring.len();
            for i in 0..n {
                let e0 = ring[i];
                let e1 = ring[(i + 1) % n];
                let len = point_dist(&e0, &e1);
                if len <= edge_gap_px {
                    continue;
                }
                let mut travelled = ctx.spacing_px;
                while travelled < len {
                    let t = travelled / len;
                    let p = Point2::new(e0.x + t * (e1.x - e0.x), e0.y + t * (e1.y - e0.y));
                    set.add(p, Priority::Normal, None);
                    travelled += ctx.spacing_px;
                }
            }
        }
    }
}

/// Zone 4: skeleton paths mostly outside every ring are under-covered;
/// walk them at the derived spacing.
fn zone_skeleton_gap_fill(
    rings: &[Vec<RoomPolygon>],
    room: &ProcessedRoom,
    ctx: &PlacementContext<'_>,
    set: &mut CandidateSet,
) {
    let tuning = ctx.tuning();
    let guard_px = ctx.spacing_px * tuning.spacing_guard_factor;
    let deep_layer = rings.last();

    for path in &room.graph.paths {
        let samples = sample_evenly(path, tuning.path_sample_count);
        if samples.is_empty() {
            continue;
        }
        let inside = samples
            .iter()
            .filter(|&p| rings.iter().any(|layer| inside_any(p, layer)))
            .count();
        if inside * 2 >= samples.len() {
            continue;
        }

        for p in walk_at_intervals(path, ctx.spacing_px) {
            let in_deep = deep_layer.is_some_and(|layer| inside_any(&p, layer));
            if !in_deep && set.has_priority_within(&p, guard_px, Priority::High) {
                continue;
            }
            // The walk's own stride spaces these; only the hard dedup
            // applies at the accumulator.
            set.add(p, Priority::Normal, Some(ctx.hard_dedup_px));
        }
    }
}

fn inside_any(p: &Point2, layer: &[RoomPolygon]) -> bool {
    layer.iter().any(|ring| point_in_polygon_2d(p, ring))
}

/// `count` points at even arc-length spacing along a path, endpoints
/// included.
fn sample_evenly(path: &[Point2], count: usize) -> Vec<Point2> {
    if path.len() < 2 || count < 2 {
        return path.first().copied().into_iter().collect();
    }
    let total = polyline_length_2d(path);
    if total < TOLERANCE {
        return vec![path[0]];
    }

    (0..count)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let target = total * i as f64 / (count - 1) as f64;
            point_at_arc(path, target)
        })
        .collect()
}

/// Interior points every `spacing` of arc length along a path.
fn walk_at_intervals(path: &[Point2], spacing: f64) -> Vec<Point2> {
    if path.len() < 2 || spacing <= 0.0 {
        return Vec::new();
    }
    let total = polyline_length_2d(path);
    let mut out = Vec::new();
    let mut travelled = spacing;
    while travelled < total - TOLERANCE {
        out.push(point_at_arc(path, travelled));
        travelled += spacing;
    }
    out
}

fn point_at_arc(path: &[Point2], target: f64) -> Point2 {
    let mut remaining = target;
    for seg in path.windows(2) {
        let len = point_dist(&seg[0], &seg[1]);
        if remaining <= len {
            if len < TOLERANCE {
                return seg[0];
            }
            let t = remaining / len;
            return Point2::new(
                seg[0].x + t * (seg[1].x - seg[0].x),
                seg[0].y + t * (seg[1].y - seg[0].y),
            );
        }
        remaining -= len;
    }
    path[path.len() - 1]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::super::classify::{classify, room_metrics, RoomCategory};
    use super::super::super::options::PlacementOptions;
    use super::super::super::skeleton::build_robust_graph;
    use super::*;
    use crate::plan::Wall;
    use crate::services::offset::inward_offsets;

    const SCALE: f64 = 10.0;

    /// Offsets are real; rooms and skeletons come from the test fixtures.
    struct FixtureServices;

    impl GeometryServices for FixtureServices {
        fn detect_rooms(&self, _walls: &[Wall]) -> Vec<RoomPolygon> {
            Vec::new()
        }

        fn generate_offsets(&self, polygon: &[Point2], distance_px: f64) -> Vec<RoomPolygon> {
            inward_offsets(polygon, distance_px)
        }

        fn generate_medial_axis(&self, _polygon: &[Point2], _sampling_px: f64) -> Vec<Vec<Point2>> {
            Vec::new()
        }
    }

    fn make_room(polygon: Vec<Point2>, raw_skeleton: Vec<Vec<Point2>>) -> ProcessedRoom {
        let opts = PlacementOptions::new(SCALE);
        let metrics = room_metrics(&polygon, SCALE).unwrap();
        let graph = build_robust_graph(&raw_skeleton, opts.tuning.graph_snap_px);
        let max_skeleton_path_m = graph.max_path_length() / SCALE;
        let category = classify(&metrics, max_skeleton_path_m, &opts.tuning);
        assert_eq!(category, RoomCategory::Large, "fixture must be a large room");
        ProcessedRoom {
            polygon,
            metrics,
            category,
            raw_skeleton,
            graph,
            max_skeleton_path_m,
        }
    }

    fn rect_px(w: f64, h: f64) -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(w, 0.0),
            Point2::new(w, h),
            Point2::new(0.0, h),
        ]
    }

    #[test]
    fn ring_skeleton_intersections_become_high_candidates() {
        // 40 m × 30 m room at 10 px/m, centerline skeleton.
        let room = make_room(
            rect_px(400.0, 300.0),
            vec![vec![Point2::new(50.0, 150.0), Point2::new(350.0, 150.0)]],
        );
        let opts = PlacementOptions::new(SCALE);
        let ctx = PlacementContext::new(&opts).unwrap();
        let mut set = CandidateSet::new(&ctx);

        place(&FixtureServices, &room, &ctx, &mut set);

        let highs: Vec<_> = set
            .as_slice()
            .iter()
            .filter(|c| c.priority == Priority::High)
            .collect();
        assert!(highs.len() >= 2, "expected ring/skeleton crossings, got {highs:?}");
        assert!(
            highs
                .iter()
                .any(|c| point_dist(&c.point, &Point2::new(50.0, 150.0)) < 20.0),
            "left crossing missing"
        );
        assert!(
            highs
                .iter()
                .any(|c| point_dist(&c.point, &Point2::new(350.0, 150.0)) < 20.0),
            "right crossing missing"
        );
    }

    #[test]
    fn deep_junction_becomes_candidate() {
        let room = make_room(
            rect_px(400.0, 300.0),
            vec![
                vec![Point2::new(50.0, 150.0), Point2::new(200.0, 150.0)],
                vec![Point2::new(200.0, 150.0), Point2::new(350.0, 150.0)],
                vec![Point2::new(200.0, 150.0), Point2::new(200.0, 60.0)],
            ],
        );
        let opts = PlacementOptions::new(SCALE);
        let ctx = PlacementContext::new(&opts).unwrap();
        let mut set = CandidateSet::new(&ctx);

        place(&FixtureServices, &room, &ctx, &mut set);

        assert!(
            set.as_slice()
                .iter()
                .any(|c| c.priority == Priority::High
                    && point_dist(&c.point, &Point2::new(200.0, 150.0)) < 20.0),
            "deep junction at the T center missing: {:?}",
            set.as_slice()
        );
    }

    #[test]
    fn collapsed_rings_fall_back_to_skeleton_walk() {
        // 40 m × 8 m room: the 5 m first ring already collapses, so the
        // whole skeleton is under-covered and gets walked.
        let room = make_room(
            rect_px(400.0, 80.0),
            vec![vec![Point2::new(20.0, 40.0), Point2::new(380.0, 40.0)]],
        );
        let opts = PlacementOptions::new(SCALE);
        let ctx = PlacementContext::new(&opts).unwrap();
        let mut set = CandidateSet::new(&ctx);

        place(&FixtureServices, &room, &ctx, &mut set);

        let normals: Vec<_> = set
            .as_slice()
            .iter()
            .filter(|c| c.priority == Priority::Normal)
            .collect();
        assert_eq!(normals.len(), 3, "spacing walk at 95 px over 360 px: {normals:?}");
        for c in normals {
            assert!((c.point.y - 40.0).abs() < 1e-9, "walk strays off the skeleton");
        }
    }

    #[test]
    fn arc_walk_helpers() {
        let path = vec![
            Point2::new(0.0, 0.0),
            Point2::new(100.0, 0.0),
            Point2::new(100.0, 100.0),
        ];
        let samples = sample_evenly(&path, 5);
        assert_eq!(samples.len(), 5);
        assert!(point_dist(&samples[0], &path[0]) < 1e-9);
        assert!(point_dist(&samples[4], &path[2]) < 1e-9);
        // Midpoint of a 200-long path sits at the corner.
        assert!(point_dist(&samples[2], &Point2::new(100.0, 0.0)) < 1e-9);

        let walked = walk_at_intervals(&path, 80.0);
        assert_eq!(walked.len(), 2);
        assert!(point_dist(&walked[0], &Point2::new(80.0, 0.0)) < 1e-9);
        assert!(point_dist(&walked[1], &Point2::new(100.0, 60.0)) < 1e-9);
    }
}
