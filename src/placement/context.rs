use crate::error::ConfigError;

use super::options::{PlacementOptions, Tuning};

/// Immutable per-invocation context derived from [`PlacementOptions`].
///
/// Converts every meter-denominated threshold to pixels once, so the
/// pipeline stages never touch the raw options. Built by [`Self::new`],
/// which is also where all configuration validation happens.
#[derive(Debug)]
pub struct PlacementContext<'a> {
    pub options: &'a PlacementOptions,
    /// Pixels per meter.
    pub scale_ratio: f64,
    /// Coverage radius in pixels.
    pub radius_px: f64,
    /// Unconditional candidate dedup distance in pixels.
    pub hard_dedup_px: f64,
    /// Default soft dedup threshold for high/normal candidates, pixels.
    pub soft_dedup_px: f64,
    /// Derived gap-fill spacing in meters.
    pub spacing_m: f64,
    /// Derived gap-fill spacing in pixels.
    pub spacing_px: f64,
}

impl<'a> PlacementContext<'a> {
    /// Validates the options and derives pixel thresholds.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidScaleRatio` for a non-positive scale
    /// ratio, `ConfigError::OptionOutOfRange` for out-of-range numeric
    /// options, and `ConfigError::DegeneratePlacementArea` when an enabled
    /// placement area has fewer than 3 vertices.
    pub fn new(options: &'a PlacementOptions) -> Result<Self, ConfigError> {
        if options.scale_ratio <= 0.0 || !options.scale_ratio.is_finite() {
            return Err(ConfigError::InvalidScaleRatio(options.scale_ratio));
        }
        if options.radius <= 0.0 || !options.radius.is_finite() {
            return Err(ConfigError::OptionOutOfRange {
                option: "radius",
                value: options.radius,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        if let Some(target) = options.coverage_target {
            if !(50.0..=100.0).contains(&target) {
                return Err(ConfigError::OptionOutOfRange {
                    option: "coverage_target",
                    value: target,
                    min: 50.0,
                    max: 100.0,
                });
            }
        }
        if let Some(signal) = options.min_signal_strength {
            if !(-90.0..=-40.0).contains(&signal) {
                return Err(ConfigError::OptionOutOfRange {
                    option: "min_signal_strength",
                    value: signal,
                    min: -90.0,
                    max: -40.0,
                });
            }
        }
        if options.placement_area_enabled {
            if let Some(area) = &options.placement_area {
                if area.len() < 3 {
                    return Err(ConfigError::DegeneratePlacementArea(area.len()));
                }
            }
        }

        let tuning = &options.tuning;
        let scale_ratio = options.scale_ratio;
        let radius_px = options.radius * scale_ratio;
        let spacing_m = (options.spacing_factor * options.radius * density_multiplier(options))
            .max(tuning.min_spacing_m);

        Ok(Self {
            options,
            scale_ratio,
            radius_px,
            hard_dedup_px: tuning.hard_dedup_m * scale_ratio,
            soft_dedup_px: radius_px * tuning.soft_dedup_factor,
            spacing_m,
            spacing_px: spacing_m * scale_ratio,
        })
    }

    /// Converts meters to pixels.
    #[must_use]
    pub fn px(&self, meters: f64) -> f64 {
        meters * self.scale_ratio
    }

    /// The tuning constants in effect.
    #[must_use]
    pub fn tuning(&self) -> &Tuning {
        &self.options.tuning
    }
}

/// Blends the coverage target and signal floor into a spacing multiplier.
///
/// A higher coverage target tightens spacing; a weaker acceptable signal
/// floor loosens it. When both are configured the two factors are averaged;
/// when neither is, the multiplier is 1.
fn density_multiplier(options: &PlacementOptions) -> f64 {
    let coverage = options
        .coverage_target
        .map(|target| 1.3 - (target - 50.0) / 50.0 * 0.6);
    let signal = options
        .min_signal_strength
        .map(|floor| 1.2 - (floor + 90.0) / 50.0 * 0.6);

    match (coverage, signal) {
        (Some(c), Some(s)) => (c + s) * 0.5,
        (Some(c), None) => c,
        (None, Some(s)) => s,
        (None, None) => 1.0,
    }
}
