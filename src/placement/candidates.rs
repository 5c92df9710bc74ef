use crate::math::distance_2d::point_dist;
use crate::math::polygon_2d::point_in_polygon_2d;
use crate::math::Point2;
use crate::plan::RoomPolygon;

use super::context::PlacementContext;

/// Candidate priority tier. Ordered: `Critical > High > Normal`.
///
/// Priority controls both selection order and how aggressively a candidate
/// is protected from deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Normal,
    High,
    Critical,
}

/// A placement candidate accumulated during generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub point: Point2,
    pub priority: Priority,
}

/// The shared candidate accumulator.
///
/// All rooms and all generation passes write into one set; candidates are
/// append-only here, and only the final selector discards them. The set
/// enforces the accumulation contract:
///
/// - non-finite points are rejected silently;
/// - a hard dedup distance applies to every add, regardless of priority;
/// - high/normal adds are additionally rejected within a soft threshold of
///   any existing candidate, so softer candidates keep more distance;
/// - critical adds bypass the soft threshold — a room centroid or a
///   coverage correction must never be dropped because a stray normal
///   point landed nearby;
/// - when a placement area is enabled, points outside it never accumulate.
#[derive(Debug)]
pub struct CandidateSet {
    candidates: Vec<Candidate>,
    hard_dedup_px: f64,
    soft_dedup_px: f64,
    placement_area: Option<RoomPolygon>,
}

impl CandidateSet {
    /// Creates an empty set with thresholds from the context.
    #[must_use]
    pub fn new(ctx: &PlacementContext<'_>) -> Self {
        let placement_area = if ctx.options.placement_area_enabled {
            ctx.options.placement_area.clone()
        } else {
            None
        };
        Self {
            candidates: Vec::new(),
            hard_dedup_px: ctx.hard_dedup_px,
            soft_dedup_px: ctx.soft_dedup_px,
            placement_area,
        }
    }

    /// Attempts to add a candidate; returns whether it was accepted.
    ///
    /// `custom_threshold` overrides the default soft dedup distance for
    /// high/normal priorities; critical candidates ignore it entirely.
    pub fn add(&mut self, point: Point2, priority: Priority, custom_threshold: Option<f64>) -> bool {
        if !point.x.is_finite() || !point.y.is_finite() {
            return false;
        }
        if let Some(area) = &self.placement_area {
            if !point_in_polygon_2d(&point, area) {
                return false;
            }
        }

        for existing in &self.candidates {
            if point_dist(&existing.point, &point) < self.hard_dedup_px {
                return false;
            }
        }

        if priority != Priority::Critical {
            let threshold = custom_threshold.unwrap_or(self.soft_dedup_px);
            for existing in &self.candidates {
                if point_dist(&existing.point, &point) < threshold {
                    return false;
                }
            }
        }

        self.candidates.push(Candidate { point, priority });
        true
    }

    /// Distance from `point` to the nearest accumulated candidate.
    #[must_use]
    pub fn min_dist_to(&self, point: &Point2) -> Option<f64> {
        self.candidates
            .iter()
            .map(|c| point_dist(&c.point, point))
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Number of candidates within `dist` of `point`.
    #[must_use]
    pub fn count_within(&self, point: &Point2, dist: f64) -> usize {
        self.candidates
            .iter()
            .filter(|c| point_dist(&c.point, point) < dist)
            .count()
    }

    /// Whether any candidate of at least `min_priority` lies within `dist`.
    #[must_use]
    pub fn has_priority_within(&self, point: &Point2, dist: f64, min_priority: Priority) -> bool {
        self.candidates
            .iter()
            .any(|c| c.priority >= min_priority && point_dist(&c.point, point) < dist)
    }

    /// The accumulated candidates in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Consumes the set, returning candidates in insertion order.
    #[must_use]
    pub fn into_candidates(self) -> Vec<Candidate> {
        self.candidates
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
