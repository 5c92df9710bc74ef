use thiserror::Error;

/// Top-level error type for the Ankora placement engine.
#[derive(Debug, Error)]
pub enum AnkoraError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Errors related to placement configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("scale ratio must be positive, got {0}")]
    InvalidScaleRatio(f64),

    #[error("option {option} = {value} is out of range [{min}, {max}]")]
    OptionOutOfRange {
        option: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("placement area needs at least 3 vertices, got {0}")]
    DegeneratePlacementArea(usize),
}

/// Errors related to geometric computations in the built-in services.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("triangulation failed: {0}")]
    Triangulation(String),
}

/// Convenience type alias for results using [`AnkoraError`].
pub type Result<T> = std::result::Result<T, AnkoraError>;
