use crate::plan::{AnchorShape, RoomPolygon};

/// Which room sizes the generator targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetScope {
    /// Compact and extended rooms only.
    Small,
    /// Large rooms only.
    Large,
    /// Every room.
    #[default]
    All,
}

/// Empirically tuned placement constants.
///
/// Every threshold the heuristics depend on is a named field so callers can
/// override individual values; the defaults are the production tuning.
/// Fields suffixed `_m` are meters, `_px` raw pixels, `_deg` degrees.
#[derive(Debug, Clone)]
pub struct Tuning {
    /// Rooms below this area are always compact.
    pub compact_area_m2: f64,
    /// Upper area bound for the compact/extended rules.
    pub medium_area_m2: f64,
    /// Fill-factor cutoff separating boxy from irregular rooms.
    pub fill_factor_cutoff: f64,
    /// Aspect-ratio cutoff above which a boxy room counts as a corridor.
    pub aspect_ratio_cutoff: f64,
    /// Skeleton path length separating compact from extended irregular rooms.
    pub corridor_skeleton_m: f64,

    /// Endpoint snap radius for the skeleton graph builder.
    pub graph_snap_px: f64,
    /// Boundary sampling step handed to the medial-axis service.
    pub medial_sampling_m: f64,

    /// Cell size for the coarse-grid junction pass.
    pub grid_cell_px: f64,
    /// Clustering tolerance for the tip and vertex-graph junction passes.
    pub cluster_tolerance_px: f64,
    /// Turn-angle deviation that marks a path bend as a junction.
    pub bend_angle_deg: f64,
    /// Tip-to-segment distance for the T-junction proximity pass.
    pub tip_proximity_m: f64,
    /// Proximity used when union-merging junctions from all passes.
    pub junction_merge_m: f64,

    /// Unconditional candidate dedup distance.
    pub hard_dedup_m: f64,
    /// Soft dedup threshold factor applied to `radius` for high/normal adds.
    pub soft_dedup_factor: f64,
    /// Intra-room dedup distance for extended-room junction candidates.
    pub extended_dedup_m: f64,

    /// Inward distance of the first erosion ring.
    pub ring_initial_m: f64,
    /// Additional inward distance per subsequent ring.
    pub ring_step_m: f64,
    /// Hard cap on erosion ring layers.
    pub ring_layer_cap: usize,
    /// Snap distance from a ring/skeleton intersection to a ring vertex.
    pub ring_vertex_snap_m: f64,
    /// Minimum gap between a deep junction and any existing candidate.
    pub deep_gap_m: f64,
    /// Local overlap ratio above which a deep junction is rejected.
    pub overlap_ratio_limit: f64,
    /// Ring edges longer than this get gap-fill candidates.
    pub ring_edge_gap_m: f64,
    /// Floor for the derived candidate spacing.
    pub min_spacing_m: f64,
    /// Fraction of the spacing kept clear around high/critical candidates
    /// during skeleton gap fill.
    pub spacing_guard_factor: f64,
    /// Sample count for the skeleton path coverage test.
    pub path_sample_count: usize,

    /// Coverage grid step as a multiple of the scale ratio.
    pub grid_step_factor: f64,
    /// Normalized signal strength below which a grid point counts as weak.
    pub weak_signal_cutoff: f64,

    /// Conflict threshold factor for critical candidates in the selector.
    pub select_critical_factor: f64,
    /// Conflict threshold factor for high candidates in the selector.
    pub select_high_factor: f64,
    /// Conflict threshold factor for normal candidates in the selector.
    pub select_normal_factor: f64,
    /// Minimum gap between a new anchor and any pre-existing anchor.
    pub existing_anchor_gap_m: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            compact_area_m2: 40.0,
            medium_area_m2: 110.0,
            fill_factor_cutoff: 0.85,
            aspect_ratio_cutoff: 3.0,
            corridor_skeleton_m: 13.0,
            graph_snap_px: 5.0,
            medial_sampling_m: 0.5,
            grid_cell_px: 5.0,
            cluster_tolerance_px: 20.0,
            bend_angle_deg: 45.0,
            tip_proximity_m: 25.0,
            junction_merge_m: 1.0,
            hard_dedup_m: 1.0,
            soft_dedup_factor: 1.2,
            extended_dedup_m: 5.0,
            ring_initial_m: 5.0,
            ring_step_m: 10.0,
            ring_layer_cap: 20,
            ring_vertex_snap_m: 1.5,
            deep_gap_m: 12.0,
            overlap_ratio_limit: 0.40,
            ring_edge_gap_m: 12.5,
            min_spacing_m: 3.0,
            spacing_guard_factor: 0.8,
            path_sample_count: 5,
            grid_step_factor: 1.41,
            weak_signal_cutoff: 0.3,
            select_critical_factor: 0.4,
            select_high_factor: 0.9,
            select_normal_factor: 1.2,
            existing_anchor_gap_m: 10.0,
        }
    }
}

/// Configuration for one placement run.
///
/// `scale_ratio` (pixels per meter) is required — every distance threshold
/// is derived from it, so there is no meaningful default.
#[derive(Debug, Clone)]
pub struct PlacementOptions {
    /// Coverage radius in meters.
    pub radius: f64,
    /// Rendering hint for produced anchors; not used by the geometry.
    pub shape: AnchorShape,
    /// Minimum overlap ratio, carried through for density post-processing.
    pub min_overlap: f64,
    /// Wall thickness in pixels, carried through for signal-aware consumers.
    pub wall_thickness: f64,
    /// Pixels per meter.
    pub scale_ratio: f64,
    /// Base spacing multiplier for gap-fill candidates.
    pub spacing_factor: f64,
    pub target_scope: TargetScope,
    /// Desired coverage percentage (50–100); tightens spacing when high.
    pub coverage_target: Option<f64>,
    /// Acceptable signal floor (−90..−40); loosens spacing when low.
    pub min_signal_strength: Option<f64>,
    /// Optional polygon constraining where anchors may be placed.
    pub placement_area: Option<RoomPolygon>,
    /// Whether `placement_area` is honored when present.
    pub placement_area_enabled: bool,
    pub tuning: Tuning,
}

impl PlacementOptions {
    /// Creates options with production defaults for the given scale ratio.
    #[must_use]
    pub fn new(scale_ratio: f64) -> Self {
        Self {
            radius: 5.0,
            shape: AnchorShape::default(),
            min_overlap: 0.3,
            wall_thickness: 10.0,
            scale_ratio,
            spacing_factor: 1.9,
            target_scope: TargetScope::default(),
            coverage_target: None,
            min_signal_strength: None,
            placement_area: None,
            placement_area_enabled: true,
            tuning: Tuning::default(),
        }
    }
}
