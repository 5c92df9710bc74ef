use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::FixedFaceHandle;
use spade::{ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation};

use crate::error::GeometryError;
use crate::math::polygon_2d::point_in_polygon_2d;
use crate::math::{Point2, TOLERANCE};

/// Approximates a polygon's medial axis as raw 2-point segments.
///
/// The boundary is sampled at `sampling_px` and triangulated with the
/// boundary as constraint edges. Circumcenters of interior triangles lie
/// near the locus equidistant from boundary edges; joining circumcenters
/// of adjacent interior triangles yields a centerline approximation.
///
/// The output is intentionally raw: segments are unordered, disconnected,
/// and noisy near junctions. Consumers own stitching and snapping.
///
/// # Errors
///
/// Returns `GeometryError::Degenerate` for polygons with fewer than 3
/// vertices or a non-positive sampling step, and
/// `GeometryError::Triangulation` if a boundary sample cannot be inserted.
pub fn try_medial_axis(
    polygon: &[Point2],
    sampling_px: f64,
) -> Result<Vec<Vec<Point2>>, GeometryError> {
    if polygon.len() < 3 {
        return Err(GeometryError::Degenerate(format!(
            "medial axis needs at least 3 vertices, got {}",
            polygon.len()
        )));
    }
    if sampling_px <= 0.0 || !sampling_px.is_finite() {
        return Err(GeometryError::Degenerate(format!(
            "non-positive sampling step {sampling_px}"
        )));
    }

    let samples = sample_boundary(polygon, sampling_px);
    let mut cdt = ConstrainedDelaunayTriangulation::<SpadePoint2<f64>>::new();
    insert_constraint_loop(&mut cdt, &samples)?;

    let interior = classify_interior_faces(&cdt);

    // Circumcenter per interior face, keyed by face index.
    let mut centers: HashMap<usize, Point2> = HashMap::new();
    for face in cdt.inner_faces() {
        let idx = face.fix().index();
        if !interior.contains(&idx) {
            continue;
        }
        let [a, b, c] = face.vertices().map(|v| {
            let pos = v.position();
            Point2::new(pos.x, pos.y)
        });
        if let Some(center) = circumcenter(&a, &b, &c) {
            centers.insert(idx, center);
        }
    }

    // One segment per pair of adjacent interior faces; circumcenters that
    // escape the polygon (obtuse boundary triangles) are dropped.
    let mut segments: Vec<Vec<Point2>> = Vec::new();
    for face in cdt.inner_faces() {
        let idx = face.fix().index();
        if !interior.contains(&idx) {
            continue;
        }
        for edge in face.adjacent_edges() {
            if cdt.is_constraint_edge(edge.as_undirected().fix()) {
                continue;
            }
            let Some(neighbor) = edge.rev().face().as_inner() else {
                continue;
            };
            let n_idx = neighbor.fix().index();
            // Emit each undirected adjacency once.
            if n_idx <= idx || !interior.contains(&n_idx) {
                continue;
            }
            let (Some(&c1), Some(&c2)) = (centers.get(&idx), centers.get(&n_idx)) else {
                continue;
            };
            if (c1 - c2).norm() < TOLERANCE {
                continue;
            }
            if point_in_polygon_2d(&c1, polygon) && point_in_polygon_2d(&c2, polygon) {
                segments.push(vec![c1, c2]);
            }
        }
    }

    Ok(segments)
}

/// Samples the polygon boundary at roughly even spacing, keeping every
/// original vertex.
fn sample_boundary(polygon: &[Point2], sampling_px: f64) -> Vec<SpadePoint2<f64>> {
    let n = polygon.len();
    let mut samples = Vec::with_capacity(n * 4);

    for i in 0..n {
        let p0 = polygon[i];
        let p1 = polygon[(i + 1) % n];
        let len = (p1 - p0).norm();

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = (len / sampling_px).ceil().max(1.0) as usize;
        for j in 0..steps {
            #[allow(clippy::cast_precision_loss)]
            let t = j as f64 / steps as f64;
            samples.push(SpadePoint2::new(
                p0.x + t * (p1.x - p0.x),
                p0.y + t * (p1.y - p0.y),
            ));
        }
    }

    samples
}

/// Inserts a closed sample loop as constraint edges into the CDT.
fn insert_constraint_loop(
    cdt: &mut ConstrainedDelaunayTriangulation<SpadePoint2<f64>>,
    points: &[SpadePoint2<f64>],
) -> Result<(), GeometryError> {
    if points.len() < 3 {
        return Err(GeometryError::Degenerate(
            "constraint loop needs at least 3 points".into(),
        ));
    }

    let mut handles = Vec::with_capacity(points.len());
    for &pt in points {
        let h = cdt
            .insert(pt)
            .map_err(|e: InsertionError| GeometryError::Triangulation(format!("CDT insert: {e}")))?;
        handles.push(h);
    }

    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from != to {
            cdt.add_constraint(from, to);
        }
    }

    Ok(())
}

/// Classifies which inner faces of the CDT are inside the polygon using
/// flood-fill.
///
/// Starts from faces adjacent to the outer (infinite) face at depth 0.
/// Each time a constraint edge is crossed, depth increments. Odd depth =
/// interior.
fn classify_interior_faces(
    cdt: &ConstrainedDelaunayTriangulation<SpadePoint2<f64>>,
) -> HashSet<usize> {
    let mut interior = HashSet::new();
    let mut depth_map: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<spade::handles::InnerTag>, u32)> = VecDeque::new();

    let outer_fix = cdt.outer_face().fix();

    // Seed: inner faces adjacent to the outer face via directed edges.
    for edge in cdt.directed_edges() {
        if edge.face().fix() == outer_fix {
            let rev_face = edge.rev().face();
            if let Some(inner) = rev_face.as_inner() {
                let idx = inner.fix().index();
                if depth_map.contains_key(&idx) {
                    continue;
                }
                let depth = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
                depth_map.insert(idx, depth);
                if depth % 2 == 1 {
                    interior.insert(idx);
                }
                queue.push_back((inner.fix(), depth));
            }
        }
    }

    // BFS flood-fill.
    while let Some((face_fix, depth)) = queue.pop_front() {
        let face = cdt.face(face_fix);
        for edge in face.adjacent_edges() {
            let neighbor = edge.rev().face();
            if let Some(inner_neighbor) = neighbor.as_inner() {
                let n_idx = inner_neighbor.fix().index();
                if depth_map.contains_key(&n_idx) {
                    continue;
                }
                let new_depth = if cdt.is_constraint_edge(edge.as_undirected().fix()) {
                    depth + 1
                } else {
                    depth
                };
                depth_map.insert(n_idx, new_depth);
                if new_depth % 2 == 1 {
                    interior.insert(n_idx);
                }
                queue.push_back((inner_neighbor.fix(), new_depth));
            }
        }
    }

    interior
}

/// Circumcenter of a triangle, or `None` when near-degenerate.
fn circumcenter(a: &Point2, b: &Point2, c: &Point2) -> Option<Point2> {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d.abs() < 1e-12 {
        return None;
    }

    let a_sq = a.x * a.x + a.y * a.y;
    let b_sq = b.x * b.x + b.y * b.y;
    let c_sq = c.x * c.x + c.y * c.y;

    let ux = (a_sq * (b.y - c.y) + b_sq * (c.y - a.y) + c_sq * (a.y - b.y)) / d;
    let uy = (a_sq * (c.x - b.x) + b_sq * (a.x - c.x) + c_sq * (b.x - a.x)) / d;
    Some(Point2::new(ux, uy))
}
