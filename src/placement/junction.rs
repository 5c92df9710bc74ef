use std::collections::HashMap;

use crate::math::distance_2d::{point_dist, point_to_segment_projection};
use crate::math::Point2;

use super::context::PlacementContext;
use super::skeleton::SkeletonGraph;

/// Junctions and endpoints found in one room's skeleton.
///
/// Endpoints are reported separately: strategies fall back to them only
/// when a room yields no junctions at all (pure linear corridor).
#[derive(Debug, Default)]
pub struct JunctionReport {
    pub junctions: Vec<Point2>,
    pub endpoints: Vec<Point2>,
}

/// Runs all junction-detection passes over a room's raw skeleton and
/// stitched graph, union-merging their results.
///
/// The graph builder's snap tolerance can itself erase true junctions
/// (e.g. a T whose three converging tips lie just outside tolerance of
/// each other), so several independently-thresholded detectors run and
/// their outputs are deduplicated by proximity. Redundancy here is cheaper
/// and more robust than tuning one perfect detector.
#[must_use]
pub fn detect(
    raw: &[Vec<Point2>],
    graph: &SkeletonGraph,
    ctx: &PlacementContext<'_>,
) -> JunctionReport {
    let tuning = ctx.tuning();

    let mut found = Vec::new();
    found.extend(grid_bucket_junctions(raw, tuning.grid_cell_px));
    found.extend(cluster_tip_junctions(raw, tuning.cluster_tolerance_px));
    found.extend(vertex_graph_junctions(raw, tuning.cluster_tolerance_px));
    found.extend(bend_junctions(&graph.paths, tuning.bend_angle_deg));
    found.extend(tip_proximity_junctions(
        raw,
        ctx.px(tuning.tip_proximity_m),
        tuning.cluster_tolerance_px,
    ));

    JunctionReport {
        junctions: merge_by_proximity(found, ctx.px(tuning.junction_merge_m)),
        endpoints: graph.endpoint_positions(),
    }
}

/// Pass 1: snap every segment endpoint to a coarse grid and count
/// occurrences per cell; cells hit three or more times are junctions.
#[allow(clippy::cast_possible_truncation)]
fn grid_bucket_junctions(raw: &[Vec<Point2>], cell_px: f64) -> Vec<Point2> {
    if cell_px <= 0.0 {
        return Vec::new();
    }

    let mut cells: HashMap<(i64, i64), (f64, f64, usize)> = HashMap::new();
    for tip in segment_tips(raw) {
        let key = ((tip.x / cell_px).round() as i64, (tip.y / cell_px).round() as i64);
        let entry = cells.entry(key).or_insert((0.0, 0.0, 0));
        entry.0 += tip.x;
        entry.1 += tip.y;
        entry.2 += 1;
    }

    // Sorted by cell key so output order never depends on hash state.
    let mut hits: Vec<((i64, i64), (f64, f64, usize))> = cells
        .into_iter()
        .filter(|&(_, (_, _, count))| count >= 3)
        .collect();
    hits.sort_by_key(|&(key, _)| key);

    hits.into_iter()
        .map(|(_, (sx, sy, count))| {
            #[allow(clippy::cast_precision_loss)]
            let inv = 1.0 / count as f64;
            Point2::new(sx * inv, sy * inv)
        })
        .collect()
}

/// Pass 2: incrementally cluster segment endpoints by mutual distance,
/// tracking a running centroid per cluster; clusters with three or more
/// members are junctions.
fn cluster_tip_junctions(raw: &[Vec<Point2>], tolerance_px: f64) -> Vec<Point2> {
    let mut clusters = PointClusters::new(tolerance_px);
    for tip in segment_tips(raw) {
        clusters.absorb(tip);
    }
    clusters
        .iter()
        .filter(|c| c.count >= 3)
        .map(PointCluster::centroid)
        .collect()
}

/// Pass 3: build an adjacency graph over every vertex of every raw
/// polyline (not just tips), with cluster-interned node identity; nodes of
/// degree three or more are junctions.
fn vertex_graph_junctions(raw: &[Vec<Point2>], tolerance_px: f64) -> Vec<Point2> {
    let mut clusters = PointClusters::new(tolerance_px);
    let mut adjacency: Vec<Vec<usize>> = Vec::new();

    for polyline in raw {
        let mut prev: Option<usize> = None;
        for point in polyline {
            let id = clusters.intern(*point);
            if adjacency.len() <= id {
                adjacency.resize(id + 1, Vec::new());
            }
            if let Some(p) = prev {
                if p != id {
                    if !adjacency[p].contains(&id) {
                        adjacency[p].push(id);
                    }
                    if !adjacency[id].contains(&p) {
                        adjacency[id].push(p);
                    }
                }
            }
            prev = Some(id);
        }
    }

    adjacency
        .iter()
        .enumerate()
        .filter(|(_, neighbors)| neighbors.len() >= 3)
        .map(|(id, _)| clusters.clusters[id].centroid())
        .collect()
}

/// Pass 4: walk each stitched path in triples; a turn sharper than the
/// bend threshold marks the middle point as a junction. Captures corners
/// the chain simplification absorbed.
fn bend_junctions(paths: &[Vec<Point2>], bend_angle_deg: f64) -> Vec<Point2> {
    let threshold = bend_angle_deg.to_radians();
    let mut out = Vec::new();

    for path in paths {
        for triple in path.windows(3) {
            let v1 = triple[1] - triple[0];
            let v2 = triple[2] - triple[1];
            let n1 = v1.norm();
            let n2 = v2.norm();
            if n1 < 1e-9 || n2 < 1e-9 {
                continue;
            }
            let cos = (v1.dot(&v2) / (n1 * n2)).clamp(-1.0, 1.0);
            if cos.acos() > threshold {
                out.push(triple[1]);
            }
        }
    }

    out
}

/// Pass 5: a tip whose perpendicular foot lands strictly inside another
/// polyline's segment, closer than the proximity tolerance, is a junction
/// even though it coincides with no vertex (geometric T detection).
///
/// Segments sharing a vertex with the tip are skipped, and the projection
/// must be interior — a tip that merely clamps onto another segment's
/// endpoint is chain continuation, not a crossing.
fn tip_proximity_junctions(
    raw: &[Vec<Point2>],
    proximity_px: f64,
    coincide_px: f64,
) -> Vec<Point2> {
    const INTERIOR_EPS: f64 = 1e-6;

    let mut out = Vec::new();
    for tip in segment_tips(raw) {
        let hit = raw.iter().any(|other| {
            other.windows(2).any(|seg| {
                // A tip at (or near) a segment's own vertex is chain
                // continuation, not a crossing.
                if point_dist(&tip, &seg[0]) < coincide_px
                    || point_dist(&tip, &seg[1]) < coincide_px
                {
                    return false;
                }
                let (d, t) = point_to_segment_projection(&tip, &seg[0], &seg[1]);
                t > INTERIOR_EPS && t < 1.0 - INTERIOR_EPS && d < proximity_px
            })
        });
        if hit {
            out.push(tip);
        }
    }
    out
}

/// Greedy proximity dedup shared by every pass: earlier points win.
#[must_use]
pub fn merge_by_proximity(points: Vec<Point2>, tolerance_px: f64) -> Vec<Point2> {
    let mut merged: Vec<Point2> = Vec::new();
    for p in points {
        if !merged.iter().any(|q| point_dist(q, &p) < tolerance_px) {
            merged.push(p);
        }
    }
    merged
}

/// Both endpoints of every 2-point segment, with longer polylines
/// decomposed into their consecutive-pair segments.
fn segment_tips(raw: &[Vec<Point2>]) -> impl Iterator<Item = Point2> + '_ {
    raw.iter()
        .flat_map(|p| p.windows(2))
        .flat_map(|seg| [seg[0], seg[1]])
}

/// Incremental point clusters with running centroids.
struct PointClusters {
    clusters: Vec<PointCluster>,
    tolerance_px: f64,
}

struct PointCluster {
    sum_x: f64,
    sum_y: f64,
    count: usize,
}

impl PointCluster {
    fn centroid(&self) -> Point2 {
        #[allow(clippy::cast_precision_loss)]
        let inv = 1.0 / self.count as f64;
        Point2::new(self.sum_x * inv, self.sum_y * inv)
    }
}

impl PointClusters {
    fn new(tolerance_px: f64) -> Self {
        Self {
            clusters: Vec::new(),
            tolerance_px,
        }
    }

    /// Adds a point to the first cluster whose centroid is within
    /// tolerance, creating a new cluster otherwise; returns the cluster id.
    fn intern(&mut self, p: Point2) -> usize {
        for (id, cluster) in self.clusters.iter_mut().enumerate() {
            if point_dist(&cluster.centroid(), &p) < self.tolerance_px {
                cluster.sum_x += p.x;
                cluster.sum_y += p.y;
                cluster.count += 1;
                return id;
            }
        }
        self.clusters.push(PointCluster {
            sum_x: p.x,
            sum_y: p.y,
            count: 1,
        });
        self.clusters.len() - 1
    }

    fn absorb(&mut self, p: Point2) {
        let _ = self.intern(p);
    }

    fn iter(&self) -> impl Iterator<Item = &PointCluster> {
        self.clusters.iter()
    }
}
