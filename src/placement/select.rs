use std::cmp::Reverse;

use crate::math::distance_2d::point_dist;
use crate::math::polygon_2d::point_in_polygon_2d;
use crate::plan::{Anchor, DEFAULT_POWER, DEFAULT_TX_POWER};

use super::candidates::{CandidateSet, Priority};
use super::context::PlacementContext;

/// Resolves the accumulated candidates into the final anchor list.
///
/// Candidates are processed in descending priority (stable within a tier,
/// so earlier-processed rooms win ties). Each one must clear a
/// priority-scaled distance to every already-accepted anchor and a fixed
/// gap to every caller-supplied anchor. The placement-area containment
/// check runs again here even though accumulation already filters on it.
#[must_use]
pub fn select(set: CandidateSet, existing: &[Anchor], ctx: &PlacementContext<'_>) -> Vec<Anchor> {
    let tuning = ctx.tuning();
    let existing_gap_px = ctx.px(tuning.existing_anchor_gap_m);
    let area = if ctx.options.placement_area_enabled {
        ctx.options.placement_area.as_deref()
    } else {
        None
    };

    let mut candidates = set.into_candidates();
    candidates.sort_by_key(|c| Reverse(c.priority));

    let mut accepted: Vec<Anchor> = Vec::new();

    for candidate in candidates {
        let factor = match candidate.priority {
            Priority::Critical => tuning.select_critical_factor,
            Priority::High => tuning.select_high_factor,
            Priority::Normal => tuning.select_normal_factor,
        };
        let threshold = ctx.radius_px * factor;

        if accepted
            .iter()
            .any(|a| point_dist(&a.position(), &candidate.point) < threshold)
        {
            continue;
        }
        if existing
            .iter()
            .any(|a| point_dist(&a.position(), &candidate.point) < existing_gap_px)
        {
            continue;
        }
        if let Some(area) = area {
            if !point_in_polygon_2d(&candidate.point, area) {
                continue;
            }
        }

        accepted.push(Anchor {
            x: candidate.point.x,
            y: candidate.point.y,
            radius: ctx.options.radius,
            range: ctx.options.radius,
            show_radius: true,
            shape: ctx.options.shape,
            power: DEFAULT_POWER,
            tx_power: DEFAULT_TX_POWER,
            is_auto: true,
        });
    }

    accepted
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::options::PlacementOptions;
    use super::*;
    use crate::math::Point2;

    const SCALE: f64 = 50.0;

    fn ctx_and_set(opts: &PlacementOptions) -> (PlacementContext<'_>, CandidateSet) {
        let ctx = PlacementContext::new(opts).unwrap();
        let set = CandidateSet::new(&ctx);
        (ctx, set)
    }

    #[test]
    fn critical_threshold_is_tighter_than_high() {
        // radius 5 m at 50 px/m → radius_px 250; thresholds 100/225/300.
        let opts = PlacementOptions::new(SCALE);

        // Two criticals 150 px apart both survive.
        let (ctx, mut set) = ctx_and_set(&opts);
        assert!(set.add(Point2::new(0.0, 0.0), Priority::Critical, None));
        assert!(set.add(Point2::new(150.0, 0.0), Priority::Critical, None));
        assert_eq!(select(set, &[], &ctx).len(), 2);

        // Two highs at the same spacing collapse to one.
        let (ctx, mut set) = ctx_and_set(&opts);
        assert!(set.add(Point2::new(0.0, 0.0), Priority::High, Some(60.0)));
        assert!(set.add(Point2::new(150.0, 0.0), Priority::High, Some(60.0)));
        assert_eq!(select(set, &[], &ctx).len(), 1);
    }

    #[test]
    fn higher_priority_wins_conflicts() {
        let opts = PlacementOptions::new(SCALE);
        let (ctx, mut set) = ctx_and_set(&opts);

        // Normal accumulates first but the later critical takes the spot.
        assert!(set.add(Point2::new(0.0, 0.0), Priority::Normal, None));
        assert!(set.add(Point2::new(200.0, 0.0), Priority::Critical, None));

        let anchors = select(set, &[], &ctx);
        assert_eq!(anchors.len(), 1);
        assert!((anchors[0].x - 200.0).abs() < 1e-9, "critical must win");
    }

    #[test]
    fn insertion_order_breaks_ties_within_a_tier() {
        let opts = PlacementOptions::new(SCALE);
        let (ctx, mut set) = ctx_and_set(&opts);
        assert!(set.add(Point2::new(0.0, 0.0), Priority::High, Some(60.0)));
        assert!(set.add(Point2::new(100.0, 0.0), Priority::High, Some(60.0)));

        let anchors = select(set, &[], &ctx);
        assert_eq!(anchors.len(), 1);
        assert!((anchors[0].x).abs() < 1e-9, "first-processed candidate wins");
    }

    #[test]
    fn existing_anchors_block_nearby_candidates() {
        let opts = PlacementOptions::new(SCALE);
        let (ctx, mut set) = ctx_and_set(&opts);
        assert!(set.add(Point2::new(0.0, 0.0), Priority::Critical, None));

        // 10 m gap at 50 px/m → 500 px exclusion.
        let existing = vec![Anchor::new(300.0, 0.0, 5.0)];
        assert!(select(set, &existing, &ctx).is_empty());

        let (ctx, mut set) = ctx_and_set(&opts);
        assert!(set.add(Point2::new(0.0, 0.0), Priority::Critical, None));
        let distant = vec![Anchor::new(600.0, 0.0, 5.0)];
        assert_eq!(select(set, &distant, &ctx).len(), 1);
    }

    #[test]
    fn placement_area_guard_runs_again() {
        let mut opts = PlacementOptions::new(SCALE);
        let area = vec![
            Point2::new(0.0, 0.0),
            Point2::new(400.0, 0.0),
            Point2::new(400.0, 400.0),
            Point2::new(0.0, 400.0),
        ];
        opts.placement_area = Some(area);
        let ctx = PlacementContext::new(&opts).unwrap();
        let mut set = CandidateSet::new(&ctx);
        assert!(set.add(Point2::new(200.0, 200.0), Priority::Critical, None));

        let anchors = select(set, &[], &ctx);
        assert_eq!(anchors.len(), 1);
        assert!(anchors[0].is_auto);
        assert!((anchors[0].radius - 5.0).abs() < 1e-9);
    }

    #[test]
    fn output_anchors_carry_options() {
        let mut opts = PlacementOptions::new(SCALE);
        opts.radius = 7.5;
        let ctx = PlacementContext::new(&opts).unwrap();
        let mut set = CandidateSet::new(&ctx);
        set.add(Point2::new(10.0, 20.0), Priority::Normal, None);

        let anchors = select(set, &[], &ctx);
        assert_eq!(anchors.len(), 1);
        let a = anchors[0];
        assert!(a.is_auto);
        assert!((a.radius - 7.5).abs() < 1e-9);
        assert!((a.range - 7.5).abs() < 1e-9);
        assert!(a.show_radius);
    }
}
