use super::super::candidates::{CandidateSet, Priority};
use super::super::context::PlacementContext;
use super::super::junction::{merge_by_proximity, JunctionReport};

/// Extended rooms place at skeleton junctions, falling back to skeleton
/// endpoints for junction-free corridors.
///
/// The report's junctions can contain near-duplicates from different
/// detection passes, so a local dedup runs before the shared accumulator
/// sees them.
pub fn place(report: &JunctionReport, ctx: &PlacementContext<'_>, set: &mut CandidateSet) {
    let points = if report.junctions.is_empty() {
        report.endpoints.clone()
    } else {
        report.junctions.clone()
    };

    let deduped = merge_by_proximity(points, ctx.px(ctx.tuning().extended_dedup_m));
    for point in deduped {
        set.add(point, Priority::High, None);
    }
}
