use std::collections::HashSet;

use crate::math::polygon_2d::signed_area_2d;
use crate::math::{Point2, TOLERANCE};
use crate::plan::{RoomPolygon, Wall};

/// Snap distance for coincident wall endpoints, pixels.
const ENDPOINT_SNAP_PX: f64 = 1.0;

/// Detects enclosed rooms from wall centerlines.
///
/// Wall endpoints are interned into canonical graph nodes, then every
/// bounded face of the wall graph is traced with an angle-ordered walk:
/// arriving at a node, the walk continues along the next edge clockwise
/// from the reversed incoming direction. Bounded faces come out
/// counter-clockwise; the unbounded outer face comes out clockwise and is
/// dropped by its negative signed area.
#[must_use]
pub fn detect_rooms(walls: &[Wall]) -> Vec<RoomPolygon> {
    let mut points: Vec<Point2> = Vec::new();
    let mut edges: Vec<(usize, usize)> = Vec::new();

    for wall in walls {
        let a = ensure_point(&mut points, wall.p1);
        let b = ensure_point(&mut points, wall.p2);
        if a != b && !edges.contains(&(a, b)) && !edges.contains(&(b, a)) {
            edges.push((a, b));
        }
    }

    if edges.len() < 3 {
        return Vec::new();
    }

    // Neighbors sorted by outgoing angle, ascending.
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); points.len()];
    for &(a, b) in &edges {
        adjacency[a].push(b);
        adjacency[b].push(a);
    }
    for (i, neighbors) in adjacency.iter_mut().enumerate() {
        let origin = points[i];
        neighbors.sort_by(|&m, &n| {
            outgoing_angle(&origin, &points[m])
                .partial_cmp(&outgoing_angle(&origin, &points[n]))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    let mut used: HashSet<(usize, usize)> = HashSet::new();
    let mut rooms = Vec::new();
    let max_steps = edges.len() * 2 + 2;

    for &(a, b) in &edges {
        for (from, to) in [(a, b), (b, a)] {
            if used.contains(&(from, to)) {
                continue;
            }
            if let Some(cycle) = trace_face(from, to, &points, &adjacency, &mut used, max_steps) {
                let polygon: Vec<Point2> = cycle.iter().map(|&i| points[i]).collect();
                if polygon.len() >= 3 && signed_area_2d(&polygon) > TOLERANCE {
                    rooms.push(polygon);
                }
            }
        }
    }

    rooms
}

/// Walks one face loop starting along the directed edge `from`→`to`.
///
/// Returns the vertex cycle without the closing duplicate, or `None` if
/// the walk fails to close within the step cap.
fn trace_face(
    start_from: usize,
    start_to: usize,
    points: &[Point2],
    adjacency: &[Vec<usize>],
    used: &mut HashSet<(usize, usize)>,
    max_steps: usize,
) -> Option<Vec<usize>> {
    let mut cycle = Vec::new();
    let mut from = start_from;
    let mut to = start_to;

    for _ in 0..max_steps {
        used.insert((from, to));
        cycle.push(from);

        let next = next_clockwise(to, from, points, adjacency)?;
        from = to;
        to = next;

        if from == start_from && to == start_to {
            return Some(cycle);
        }
    }

    None
}

/// Picks the next edge clockwise from the reversed incoming direction.
///
/// At a dead end the only neighbor is the reverse edge itself, producing
/// a U-turn; dangling wall stubs therefore contribute zero area to the
/// face that swallows them.
fn next_clockwise(
    at: usize,
    came_from: usize,
    points: &[Point2],
    adjacency: &[Vec<usize>],
) -> Option<usize> {
    let neighbors = adjacency.get(at)?;
    if neighbors.is_empty() {
        return None;
    }

    let back_angle = outgoing_angle(&points[at], &points[came_from]);
    let eps = 1e-9;

    // Largest angle strictly below the back edge, wrapping to the overall
    // maximum when nothing is below.
    let mut best: Option<(usize, f64)> = None;
    let mut max: Option<(usize, f64)> = None;
    for &n in neighbors {
        let angle = outgoing_angle(&points[at], &points[n]);
        if max.is_none_or(|(_, a)| angle > a) {
            max = Some((n, angle));
        }
        if angle < back_angle - eps && best.is_none_or(|(_, a)| angle > a) {
            best = Some((n, angle));
        }
    }

    best.or(max).map(|(n, _)| n)
}

fn outgoing_angle(origin: &Point2, target: &Point2) -> f64 {
    (target.y - origin.y).atan2(target.x - origin.x)
}

/// Finds or inserts an interned point, returning its index.
fn ensure_point(points: &mut Vec<Point2>, p: Point2) -> usize {
    for (i, q) in points.iter().enumerate() {
        if (q - p).norm() <= ENDPOINT_SNAP_PX {
            return i;
        }
    }
    points.push(p);
    points.len() - 1
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn wall(x0: f64, y0: f64, x1: f64, y1: f64) -> Wall {
        Wall::new(Point2::new(x0, y0), Point2::new(x1, y1), 10.0)
    }

    #[test]
    fn square_room() {
        let walls = vec![
            wall(0.0, 0.0, 300.0, 0.0),
            wall(300.0, 0.0, 300.0, 300.0),
            wall(300.0, 300.0, 0.0, 300.0),
            wall(0.0, 300.0, 0.0, 0.0),
        ];
        let rooms = detect_rooms(&walls);
        assert_eq!(rooms.len(), 1, "expected one room, got {}", rooms.len());
        assert_eq!(rooms[0].len(), 4);
        assert!((signed_area_2d(&rooms[0]).abs() - 90_000.0).abs() < 1.0);
    }

    #[test]
    fn two_rooms_sharing_a_wall() {
        let walls = vec![
            wall(0.0, 0.0, 300.0, 0.0),
            wall(300.0, 0.0, 600.0, 0.0),
            wall(600.0, 0.0, 600.0, 300.0),
            wall(600.0, 300.0, 300.0, 300.0),
            wall(300.0, 300.0, 0.0, 300.0),
            wall(0.0, 300.0, 0.0, 0.0),
            // Dividing wall.
            wall(300.0, 0.0, 300.0, 300.0),
        ];
        let rooms = detect_rooms(&walls);
        assert_eq!(rooms.len(), 2, "expected two rooms, got {}", rooms.len());
        for room in &rooms {
            assert!((signed_area_2d(room).abs() - 90_000.0).abs() < 1.0);
        }
    }

    #[test]
    fn noisy_endpoints_still_close() {
        let walls = vec![
            wall(0.0, 0.0, 300.0, 0.5),
            wall(300.0, 0.0, 300.0, 300.0),
            wall(300.0, 300.5, 0.0, 300.0),
            wall(0.3, 300.0, 0.0, 0.0),
        ];
        let rooms = detect_rooms(&walls);
        assert_eq!(rooms.len(), 1);
    }

    #[test]
    fn open_walls_make_no_rooms() {
        let walls = vec![wall(0.0, 0.0, 300.0, 0.0), wall(300.0, 0.0, 300.0, 300.0)];
        assert!(detect_rooms(&walls).is_empty());
    }

    #[test]
    fn dangling_stub_is_harmless() {
        let walls = vec![
            wall(0.0, 0.0, 300.0, 0.0),
            wall(300.0, 0.0, 300.0, 300.0),
            wall(300.0, 300.0, 0.0, 300.0),
            wall(0.0, 300.0, 0.0, 0.0),
            // Stub poking into the room from a corner.
            wall(0.0, 0.0, 80.0, 80.0),
        ];
        let rooms = detect_rooms(&walls);
        assert_eq!(rooms.len(), 1);
        // Area unchanged; the stub is traversed both ways.
        assert!((signed_area_2d(&rooms[0]).abs() - 90_000.0).abs() < 1.0);
    }

    #[test]
    fn duplicate_walls_are_ignored() {
        let walls = vec![
            wall(0.0, 0.0, 300.0, 0.0),
            wall(0.0, 0.0, 300.0, 0.0),
            wall(300.0, 0.0, 300.0, 300.0),
            wall(300.0, 300.0, 0.0, 300.0),
            wall(0.0, 300.0, 0.0, 0.0),
        ];
        assert_eq!(detect_rooms(&walls).len(), 1);
    }
}
