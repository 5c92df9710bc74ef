use crate::math::polygon_2d::{bounding_box_2d, signed_area_2d, Aabb2};
use crate::math::{Point2, TOLERANCE};
use crate::plan::RoomPolygon;

use super::options::Tuning;
use super::skeleton::SkeletonGraph;

/// Room size/shape category driving strategy selection.
///
/// The variant order is the processing order: compact rooms claim their
/// preferred positions first, so large-room logic must avoid them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RoomCategory {
    Compact,
    Extended,
    Large,
}

/// Shape metrics computed once per room.
#[derive(Debug, Clone, Copy)]
pub struct RoomMetrics {
    /// Raw polygon area in square pixels (absolute shoelace value).
    pub area_px: f64,
    /// Area in square meters.
    pub area_m2: f64,
    /// Polygon area over bounding-box area; low values mean L/T/U shapes.
    pub fill_factor: f64,
    /// Bounding-box aspect ratio, always ≥ 1.
    pub aspect_ratio: f64,
    pub bbox: Aabb2,
}

/// Computes the metrics for one room polygon.
///
/// Returns `None` for degenerate input (fewer than 3 vertices, near-zero
/// area, or a collapsed bounding box); such rooms contribute no anchors.
#[must_use]
pub fn room_metrics(polygon: &[Point2], scale_ratio: f64) -> Option<RoomMetrics> {
    if polygon.len() < 3 {
        return None;
    }
    let bbox = bounding_box_2d(polygon)?;
    let width = bbox.width();
    let height = bbox.height();
    if width < TOLERANCE || height < TOLERANCE {
        return None;
    }

    let area_px = signed_area_2d(polygon).abs();
    if area_px < TOLERANCE {
        return None;
    }

    Some(RoomMetrics {
        area_px,
        area_m2: area_px / (scale_ratio * scale_ratio),
        fill_factor: area_px / (width * height),
        aspect_ratio: width.max(height) / width.min(height),
        bbox,
    })
}

/// Assigns a room category from its metrics and skeleton topology.
///
/// Rules, evaluated in order:
/// 1. tiny rooms are always compact;
/// 2. boxy medium rooms are compact…
/// 3. …unless elongated, which makes them corridors (extended);
/// 4. irregular medium rooms split on skeleton path length;
/// 5. everything else is large.
#[must_use]
pub fn classify(metrics: &RoomMetrics, max_skeleton_path_m: f64, tuning: &Tuning) -> RoomCategory {
    if metrics.area_m2 < tuning.compact_area_m2 {
        return RoomCategory::Compact;
    }

    if metrics.area_m2 <= tuning.medium_area_m2 {
        if metrics.fill_factor > tuning.fill_factor_cutoff {
            if metrics.aspect_ratio < tuning.aspect_ratio_cutoff {
                return RoomCategory::Compact;
            }
            return RoomCategory::Extended;
        }
        if max_skeleton_path_m < tuning.corridor_skeleton_m {
            return RoomCategory::Compact;
        }
        return RoomCategory::Extended;
    }

    RoomCategory::Large
}

/// A room prepared for candidate generation; lives for one engine call.
#[derive(Debug)]
pub struct ProcessedRoom {
    pub polygon: RoomPolygon,
    pub metrics: RoomMetrics,
    pub category: RoomCategory,
    /// Raw medial-axis segments as returned by the geometry service.
    pub raw_skeleton: Vec<Vec<Point2>>,
    /// Stitched skeleton graph built over the raw segments.
    pub graph: SkeletonGraph,
    pub max_skeleton_path_m: f64,
}
