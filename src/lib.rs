pub mod error;
pub mod math;
pub mod placement;
pub mod plan;
pub mod services;

pub use error::{AnkoraError, Result};
pub use placement::{
    generate_auto_anchors, AutoAnchors2D, PlacementOptions, TargetScope, Tuning,
};
pub use plan::{Anchor, AnchorShape, Wall, WallMaterial};
pub use services::{BasicGeometry, GeometryServices};
