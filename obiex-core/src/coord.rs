//! Grid coordinates, obstacle locations and slide directions.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoordError, Error, MoveError};

/// A cell on the unbounded integer grid.
///
/// `x` grows to the right, `y` grows downward.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Coord {
    pub x: i64,
    pub y: i64,
}

impl Coord {
    /// Largest magnitude accepted for a component (2^53 - 1).
    pub const MAX_SAFE: i64 = (1 << 53) - 1;

    pub const ORIGIN: Coord = Coord { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i64, y: i64) -> Coord {
        Coord { x, y }
    }

    /// Manhattan distance to `other`.
    #[inline]
    pub fn manhattan(self, other: Coord) -> i64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Check that both components lie in `[-MAX_SAFE, MAX_SAFE]`.
    pub fn validate(self) -> Result<Coord, CoordError> {
        for v in [self.x, self.y] {
            if !(-Self::MAX_SAFE..=Self::MAX_SAFE).contains(&v) {
                return Err(CoordError::OutOfRange(v));
            }
        }
        Ok(self)
    }
}

impl TryFrom<&[i64]> for Coord {
    type Error = CoordError;

    fn try_from(parts: &[i64]) -> Result<Coord, CoordError> {
        match *parts {
            [x, y] => Coord::new(x, y).validate(),
            _ => Err(CoordError::WrongShape(parts.len())),
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

impl Add for Coord {
    type Output = Coord;

    #[inline]
    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Coord {
    type Output = Coord;

    #[inline]
    fn sub(self, rhs: Coord) -> Coord {
        Coord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Coord {
    type Output = Coord;

    #[inline]
    fn neg(self) -> Coord {
        Coord::new(-self.x, -self.y)
    }
}

impl Mul<i64> for Coord {
    type Output = Coord;

    #[inline]
    fn mul(self, rhs: i64) -> Coord {
        Coord::new(self.x * rhs, self.y * rhs)
    }
}

/// Where an obstacle currently is.
///
/// An obstacle that slides with nothing in front of it leaves the board for
/// good. It keeps its index so undo can put it back.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Location {
    OnBoard(Coord),
    OffBoard,
}

impl Location {
    #[inline]
    pub fn coord(self) -> Option<Coord> {
        match self {
            Location::OnBoard(c) => Some(c),
            Location::OffBoard => None,
        }
    }

    #[inline]
    pub fn is_off_board(self) -> bool {
        matches!(self, Location::OffBoard)
    }
}

impl From<Coord> for Location {
    fn from(c: Coord) -> Location {
        Location::OnBoard(c)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::OnBoard(c) => c.fmt(f),
            Location::OffBoard => f.write_str("off-board"),
        }
    }
}

/// Slide direction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Unit step for this direction.
    #[inline]
    pub const fn offset(self) -> Coord {
        match self {
            Direction::Up => Coord::new(0, -1),
            Direction::Down => Coord::new(0, 1),
            Direction::Left => Coord::new(-1, 0),
            Direction::Right => Coord::new(1, 0),
        }
    }

    /// Letter used by the move-list format.
    #[inline]
    pub const fn letter(self) -> char {
        match self {
            Direction::Up => 'U',
            Direction::Down => 'D',
            Direction::Left => 'L',
            Direction::Right => 'R',
        }
    }

    pub fn from_letter(letter: char) -> Option<Direction> {
        match letter {
            'U' => Some(Direction::Up),
            'D' => Some(Direction::Down),
            'L' => Some(Direction::Left),
            'R' => Some(Direction::Right),
            _ => None,
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Direction, Error> {
        let mut chars = s.chars();
        let dir = match (chars.next(), chars.next()) {
            (Some(c), None) => Direction::from_letter(c),
            _ => None,
        };
        dir.ok_or_else(|| MoveError::UnknownDirection(s.to_string()).into())
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}
