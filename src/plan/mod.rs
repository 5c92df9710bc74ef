use crate::math::Point2;

/// An ordered, closed polygon describing a room outline.
///
/// The closing duplicate vertex is not stored; the last vertex connects
/// back to the first.
pub type RoomPolygon = Vec<Point2>;

/// Wall construction material, used by signal-aware consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WallMaterial {
    #[default]
    Drywall,
    Brick,
    Concrete,
    Glass,
}

/// A wall centerline segment with physical attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wall {
    pub p1: Point2,
    pub p2: Point2,
    /// Wall thickness in pixels.
    pub thickness: f64,
    pub material: WallMaterial,
}

impl Wall {
    /// Creates a drywall wall segment with the given thickness.
    #[must_use]
    pub fn new(p1: Point2, p2: Point2, thickness: f64) -> Self {
        Self {
            p1,
            p2,
            thickness,
            material: WallMaterial::default(),
        }
    }

    /// Returns the same wall with a different material.
    #[must_use]
    pub fn with_material(mut self, material: WallMaterial) -> Self {
        self.material = material;
        self
    }
}

/// Rendering shape hint for an anchor's coverage indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnchorShape {
    #[default]
    Circle,
    Square,
    Diamond,
}

/// Default transmit power assigned to generated anchors, in percent.
pub const DEFAULT_POWER: f64 = 100.0;

/// Default transmit power assigned to generated anchors, dBm-like scalar.
pub const DEFAULT_TX_POWER: f64 = 20.0;

/// A placed device anchor.
///
/// Coordinates are in pixels; `radius` and `range` are in meters.
/// Anchors with `is_auto = true` were produced by the placement engine
/// and may be pruned or edited freely by the caller afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub range: f64,
    pub show_radius: bool,
    pub shape: AnchorShape,
    pub power: f64,
    pub tx_power: f64,
    pub is_auto: bool,
}

impl Anchor {
    /// Creates a manually placed anchor at the given pixel position.
    #[must_use]
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self {
            x,
            y,
            radius,
            range: radius,
            show_radius: true,
            shape: AnchorShape::default(),
            power: DEFAULT_POWER,
            tx_power: DEFAULT_TX_POWER,
            is_auto: false,
        }
    }

    /// The anchor's position as a point.
    #[must_use]
    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}
