pub mod medial;
pub mod offset;
pub mod rooms;

use crate::math::Point2;
use crate::plan::{RoomPolygon, Wall};

/// Geometric collaborator services consumed by the placement engine.
///
/// The engine treats room extraction, inward polygon offsets, and
/// medial-axis extraction as black boxes behind this seam: it never
/// validates their output beyond basic degeneracy guards, and tests can
/// substitute fixtures for any of them.
pub trait GeometryServices {
    /// Extracts closed, simple room polygons from wall centerlines.
    ///
    /// Orientation is irrelevant to the engine (areas are taken as
    /// absolute values); the closing duplicate vertex must not be present.
    fn detect_rooms(&self, walls: &[Wall]) -> Vec<RoomPolygon>;

    /// Offsets a polygon inward by `distance_px`.
    ///
    /// May return zero polygons (the offset collapsed), one, or several
    /// (the shape split into pockets).
    fn generate_offsets(&self, polygon: &[Point2], distance_px: f64) -> Vec<RoomPolygon>;

    /// Approximates the medial axis of a polygon as raw segments.
    ///
    /// The output may be disconnected and numerically noisy; the engine's
    /// skeleton builder owns stitching and snapping. `sampling_px`
    /// controls boundary sampling density.
    fn generate_medial_axis(&self, polygon: &[Point2], sampling_px: f64) -> Vec<Vec<Point2>>;
}

/// Built-in geometry services.
///
/// Room detection walks minimal loops of the wall graph, inward offsets
/// use a slice-and-filter polygon offset, and the medial axis comes from
/// circumcenters of a constrained Delaunay triangulation.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicGeometry;

impl GeometryServices for BasicGeometry {
    fn detect_rooms(&self, walls: &[Wall]) -> Vec<RoomPolygon> {
        rooms::detect_rooms(walls)
    }

    fn generate_offsets(&self, polygon: &[Point2], distance_px: f64) -> Vec<RoomPolygon> {
        offset::inward_offsets(polygon, distance_px)
    }

    fn generate_medial_axis(&self, polygon: &[Point2], sampling_px: f64) -> Vec<Vec<Point2>> {
        // Collaborators are best-effort: a failed triangulation yields an
        // empty skeleton, not an engine error.
        medial::try_medial_axis(polygon, sampling_px).unwrap_or_default()
    }
}
