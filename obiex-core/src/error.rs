//! Error types for board construction, moves and the string formats.

use thiserror::Error;

use crate::coord::Coord;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level engine error.
///
/// Every public operation validates its input before touching state, so a
/// returned error always means the board or session is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(#[from] CoordError),

    #[error("invalid map: {0}")]
    InvalidMap(#[from] MapError),

    #[error("invalid move: {0}")]
    InvalidMove(#[from] MoveError),

    #[error("invalid board data: {0}")]
    InvalidBoardData(String),

    #[error("invalid move data: {0}")]
    InvalidMoveData(String),

    #[error("invalid action: no moves to undo")]
    NoMovesToUndo,
}

/// Why a single coordinate was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordError {
    #[error("expected exactly 2 components, got {0}")]
    WrongShape(usize),

    #[error("component {0} is outside the safe integer range")]
    OutOfRange(i64),
}

/// Why a whole map was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("invalid coordinate: {0}")]
    Coordinate(#[from] CoordError),

    #[error("all coordinates must be unique, {0} appears twice")]
    Duplicate(Coord),
}

/// Why a move was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("unknown direction {0:?}")]
    UnknownDirection(String),

    #[error("invalid index {0}")]
    InvalidIndex(usize),

    #[error("no obx at {0}")]
    NoObstacleAt(Coord),

    #[error("invalid coordinate: {0}")]
    Coordinate(#[from] CoordError),
}
