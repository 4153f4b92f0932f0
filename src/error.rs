use crate::geometry::Coordinate;

/// Errors reported by board construction, moves, layout loading and path translation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("position ({x}, {y}) is outside of the board")]
    OutOfBounds { x: i32, y: i32 },

    #[error("unknown robot '{0}'")]
    UnknownRobot(String),

    #[error("unknown direction '{0}'")]
    UnknownDirection(String),

    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    /// Two consecutive path cells that are equal or not axis-aligned.
    #[error("invalid path step from {from} to {to}")]
    InvalidPath { from: Coordinate, to: Coordinate },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed layout JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn out_of_bounds(pos: Coordinate) -> Self {
        Error::OutOfBounds { x: pos.x, y: pos.y }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
