use std::collections::HashSet;

use slotmap::{new_key_type, Key, SecondaryMap, SlotMap};

use crate::math::distance_2d::point_dist;
use crate::math::polygon_2d::polyline_length_2d;
use crate::math::Point2;

new_key_type! {
    /// Key for a canonical skeleton graph node.
    pub struct SkeletonNodeId;
}

/// Topological graph reconstructed from raw medial-axis segments.
///
/// Raw skeletonization output is numerically noisy: near-coincident
/// endpoints from adjacent segments do not share exact coordinates. The
/// builder clusters endpoints into canonical nodes, drops segments that
/// collapse under snapping, and walks degree-2 chains into simplified
/// paths between structural nodes (degree ≠ 2).
#[derive(Debug, Default)]
pub struct SkeletonGraph {
    nodes: SlotMap<SkeletonNodeId, Point2>,
    adjacency: SecondaryMap<SkeletonNodeId, Vec<SkeletonNodeId>>,
    /// Simplified paths, each running from one structural node to another
    /// (or around a pure loop).
    pub paths: Vec<Vec<Point2>>,
}

impl SkeletonGraph {
    /// Number of canonical nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Degree of a node (number of distinct neighbors).
    #[must_use]
    pub fn degree(&self, id: SkeletonNodeId) -> usize {
        self.adjacency.get(id).map_or(0, Vec::len)
    }

    /// Positions of all junction nodes (degree ≥ 3).
    #[must_use]
    pub fn junction_positions(&self) -> Vec<Point2> {
        self.nodes
            .iter()
            .filter(|&(id, _)| self.degree(id) >= 3)
            .map(|(_, &pos)| pos)
            .collect()
    }

    /// Positions of all dead-end nodes (degree 1).
    #[must_use]
    pub fn endpoint_positions(&self) -> Vec<Point2> {
        self.nodes
            .iter()
            .filter(|&(id, _)| self.degree(id) == 1)
            .map(|(_, &pos)| pos)
            .collect()
    }

    /// Length of the longest simplified path, in input units.
    #[must_use]
    pub fn max_path_length(&self) -> f64 {
        self.paths
            .iter()
            .map(|p| polyline_length_2d(p))
            .fold(0.0, f64::max)
    }
}

/// Builds a [`SkeletonGraph`] from raw, possibly-disconnected polylines.
///
/// Endpoints are clustered by a running spatial match against nodes found
/// so far (first node within `snap_radius` wins), so no separate
/// cluster-merge pass is needed. Segments that collapse to a single node
/// after snapping are dropped. Each undirected edge contributes one
/// traversal; a connected component with no structural node (a pure loop)
/// gets an arbitrary node promoted to anchor the walk.
#[must_use]
pub fn build_robust_graph(segments: &[Vec<Point2>], snap_radius: f64) -> SkeletonGraph {
    let mut graph = SkeletonGraph::default();

    for polyline in segments {
        for pair in polyline.windows(2) {
            if !is_finite_point(&pair[0]) || !is_finite_point(&pair[1]) {
                continue;
            }
            let a = intern_node(&mut graph, pair[0], snap_radius);
            let b = intern_node(&mut graph, pair[1], snap_radius);
            if a == b {
                // Degenerate after snapping.
                continue;
            }
            link(&mut graph, a, b);
            link(&mut graph, b, a);
        }
    }

    graph.paths = walk_paths(&graph);
    graph
}

fn is_finite_point(p: &Point2) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

/// Finds or inserts the canonical node for a point.
fn intern_node(graph: &mut SkeletonGraph, p: Point2, snap_radius: f64) -> SkeletonNodeId {
    for (id, pos) in &graph.nodes {
        if point_dist(pos, &p) <= snap_radius {
            return id;
        }
    }
    let id = graph.nodes.insert(p);
    graph.adjacency.insert(id, Vec::new());
    id
}

fn link(graph: &mut SkeletonGraph, from: SkeletonNodeId, to: SkeletonNodeId) {
    if let Some(neighbors) = graph.adjacency.get_mut(from) {
        if !neighbors.contains(&to) {
            neighbors.push(to);
        }
    }
}

/// Order-independent key for an undirected edge.
fn edge_key(a: SkeletonNodeId, b: SkeletonNodeId) -> (u64, u64) {
    let (x, y) = (a.data().as_ffi(), b.data().as_ffi());
    if x < y {
        (x, y)
    } else {
        (y, x)
    }
}

/// Walks simplified paths: from every structural node (degree ≠ 2), follow
/// each unvisited edge through degree-2 chains until the next structural
/// node. Leftover unvisited edges belong to pure degree-2 loops and are
/// walked from an arbitrary start.
fn walk_paths(graph: &SkeletonGraph) -> Vec<Vec<Point2>> {
    let mut visited: HashSet<(u64, u64)> = HashSet::new();
    let mut paths = Vec::new();

    let structural: Vec<SkeletonNodeId> = graph
        .nodes
        .keys()
        .filter(|&id| graph.degree(id) != 2)
        .collect();

    for &start in &structural {
        let Some(neighbors) = graph.adjacency.get(start) else {
            continue;
        };
        for &first in neighbors {
            if visited.contains(&edge_key(start, first)) {
                continue;
            }
            paths.push(walk_chain(graph, start, first, &mut visited, |node| {
                graph.degree(node) != 2
            }));
        }
    }

    // Pure loops: every node has degree 2, so no structural walk touched
    // them. Promote the first node with an unvisited edge to an ad hoc
    // anchor and traverse the cycle once.
    for id in graph.nodes.keys() {
        let Some(neighbors) = graph.adjacency.get(id) else {
            continue;
        };
        for &first in neighbors {
            if visited.contains(&edge_key(id, first)) {
                continue;
            }
            paths.push(walk_chain(graph, id, first, &mut visited, |node| node == id));
        }
    }

    paths
}

/// Follows a degree-2 chain from `start` through `first` until `stop_at`
/// returns true (or the chain dead-ends), marking edges visited.
fn walk_chain(
    graph: &SkeletonGraph,
    start: SkeletonNodeId,
    first: SkeletonNodeId,
    visited: &mut HashSet<(u64, u64)>,
    stop_at: impl Fn(SkeletonNodeId) -> bool,
) -> Vec<Point2> {
    let mut path = vec![graph.nodes[start]];
    let mut prev = start;
    let mut current = first;
    visited.insert(edge_key(prev, current));

    loop {
        path.push(graph.nodes[current]);
        if stop_at(current) {
            break;
        }
        let Some(next) = graph
            .adjacency
            .get(current)
            .and_then(|ns| ns.iter().copied().find(|&n| n != prev))
        else {
            break;
        };
        if visited.contains(&edge_key(current, next)) {
            break;
        }
        visited.insert(edge_key(current, next));
        prev = current;
        current = next;
    }

    path
}
