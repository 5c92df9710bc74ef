pub mod candidates;
pub mod classify;
pub mod context;
pub mod coverage;
pub mod junction;
pub mod options;
pub mod select;
pub mod skeleton;
pub mod strategy;

pub use candidates::{Candidate, CandidateSet, Priority};
pub use classify::{ProcessedRoom, RoomCategory};
pub use context::PlacementContext;
pub use options::{PlacementOptions, TargetScope, Tuning};

use crate::error::Result;
use crate::plan::{Anchor, RoomPolygon, Wall};
use crate::services::GeometryServices;

/// Automatic anchor placement over a floor plan.
///
/// A pure, synchronous computation: classify rooms, generate candidates
/// per category, patch coverage gaps, then resolve conflicts into the
/// final anchor list. Holds no state beyond its options; every invocation
/// works on an immutable snapshot of walls and existing anchors.
#[derive(Debug)]
pub struct AutoAnchors2D {
    options: PlacementOptions,
}

impl AutoAnchors2D {
    /// Creates a new placement operation.
    #[must_use]
    pub fn new(options: PlacementOptions) -> Self {
        Self { options }
    }

    /// Executes placement over wall centerlines.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` variants for invalid options (non-positive
    /// scale ratio, out-of-range targets, degenerate placement area).
    /// Malformed geometry never errors: a room that yields no candidates
    /// simply contributes no anchors.
    pub fn execute<S: GeometryServices>(
        &self,
        services: &S,
        walls: &[Wall],
        existing: &[Anchor],
    ) -> Result<Vec<Anchor>> {
        let ctx = PlacementContext::new(&self.options)?;
        let rooms = services.detect_rooms(walls);
        Ok(self.run(services, rooms, existing, &ctx))
    }

    /// Executes placement over already-extracted room polygons.
    ///
    /// Useful for callers that shard per room and merge, and for tests.
    ///
    /// # Errors
    ///
    /// Same as [`Self::execute`].
    pub fn execute_rooms<S: GeometryServices>(
        &self,
        services: &S,
        rooms: Vec<RoomPolygon>,
        existing: &[Anchor],
    ) -> Result<Vec<Anchor>> {
        let ctx = PlacementContext::new(&self.options)?;
        Ok(self.run(services, rooms, existing, &ctx))
    }

    fn run<S: GeometryServices>(
        &self,
        services: &S,
        rooms: Vec<RoomPolygon>,
        existing: &[Anchor],
        ctx: &PlacementContext<'_>,
    ) -> Vec<Anchor> {
        // Step 1: Classify rooms; degenerate polygons drop out here.
        let mut processed: Vec<ProcessedRoom> = rooms
            .into_iter()
            .filter_map(|polygon| process_room(services, polygon, ctx))
            .filter(|room| scope_allows(ctx.options.target_scope, room.category))
            .collect();

        // Step 2: Compact rooms claim their spots before larger ones.
        processed.sort_by_key(|room| room.category);

        // Step 3: Category strategies fill the shared candidate set.
        let mut set = CandidateSet::new(ctx);
        for room in &processed {
            strategy::generate(services, room, ctx, &mut set);
        }

        // Step 4: Patch weak-signal pockets.
        coverage::sweep(&processed, existing, ctx, &mut set);

        // Step 5: Priority-ordered conflict resolution.
        select::select(set, existing, ctx)
    }
}

/// Builds the per-invocation room record: metrics, skeleton, category.
fn process_room<S: GeometryServices>(
    services: &S,
    polygon: RoomPolygon,
    ctx: &PlacementContext<'_>,
) -> Option<ProcessedRoom> {
    let metrics = classify::room_metrics(&polygon, ctx.scale_ratio)?;
    let tuning = ctx.tuning();

    let raw_skeleton =
        services.generate_medial_axis(&polygon, ctx.px(tuning.medial_sampling_m));
    let graph = skeleton::build_robust_graph(&raw_skeleton, tuning.graph_snap_px);
    let max_skeleton_path_m = graph.max_path_length() / ctx.scale_ratio;
    let category = classify::classify(&metrics, max_skeleton_path_m, tuning);

    Some(ProcessedRoom {
        polygon,
        metrics,
        category,
        raw_skeleton,
        graph,
        max_skeleton_path_m,
    })
}

fn scope_allows(scope: TargetScope, category: RoomCategory) -> bool {
    match scope {
        TargetScope::All => true,
        TargetScope::Small => category != RoomCategory::Large,
        TargetScope::Large => category == RoomCategory::Large,
    }
}

/// Generates automatic anchors for a floor plan.
///
/// Convenience wrapper over [`AutoAnchors2D`].
///
/// # Errors
///
/// Returns `ConfigError` variants for invalid options.
pub fn generate_auto_anchors<S: GeometryServices>(
    services: &S,
    walls: &[Wall],
    options: &PlacementOptions,
    existing: &[Anchor],
) -> Result<Vec<Anchor>> {
    AutoAnchors2D::new(options.clone()).execute(services, walls, existing)
}
