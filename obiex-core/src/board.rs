//! Board state and slide physics.
//!
//! # Slide resolution
//!
//! ```text
//!   . 0 . . 1 .        0 slides Right: 1 is on its ray at distance 3,
//!   . . . . . .        so 0 stops 2 cells later, next to 1.
//!
//!   . . 0 . . .        0 slides Up: nothing on its ray, 0 leaves the
//!   . . . . 1 .        board and is lost.
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::{self, Encoding};
use crate::coord::{Coord, Direction, Location};
use crate::error::{Error, MapError, MoveError, Result};

/// Largest bounding box, in cells, that [`Board::render`] draws.
pub const MAX_RENDER_CELLS: u64 = 1 << 16;

/// Raw board description: a target and the starting obstacle cells.
///
/// Obstacle 0 is the primary obstacle.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Map {
    pub target: Coord,
    pub obstacles: Vec<Coord>,
}

impl Map {
    pub fn new(target: Coord, obstacles: Vec<Coord>) -> Map {
        Map { target, obstacles }
    }

    /// Build a map from untyped `[x, y]` arrays, as they arrive from JSON
    /// or JavaScript.
    pub fn from_components(target: &[i64], obstacles: &[Vec<i64>]) -> Result<Map> {
        let target = Coord::try_from(target).map_err(MapError::from)?;
        let obstacles = obstacles
            .iter()
            .map(|c| Coord::try_from(c.as_slice()).map_err(MapError::from))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Map { target, obstacles })
    }

    /// Check every coordinate is in range and no two coincide.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.obstacles.len() + 1);
        for &c in std::iter::once(&self.target).chain(&self.obstacles) {
            c.validate().map_err(MapError::from)?;
            if !seen.insert(c) {
                return Err(MapError::Duplicate(c).into());
            }
        }
        Ok(())
    }
}

/// What occupies a cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Occupant {
    Target,
    Obstacle(usize),
}

/// Inclusive bounding box of the target and every on-board obstacle.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: i64,
    pub max_x: i64,
    pub min_y: i64,
    pub max_y: i64,
}

impl Bounds {
    fn around(c: Coord) -> Bounds {
        Bounds { min_x: c.x, max_x: c.x, min_y: c.y, max_y: c.y }
    }

    fn include(&mut self, c: Coord) {
        self.min_x = self.min_x.min(c.x);
        self.max_x = self.max_x.max(c.x);
        self.min_y = self.min_y.min(c.y);
        self.max_y = self.max_y.max(c.y);
    }

    #[inline]
    pub fn contains(&self, c: Coord) -> bool {
        (self.min_x..=self.max_x).contains(&c.x) && (self.min_y..=self.max_y).contains(&c.y)
    }

    pub fn width(&self) -> u64 {
        self.max_x.abs_diff(self.min_x).saturating_add(1)
    }

    pub fn height(&self) -> u64 {
        self.max_y.abs_diff(self.min_y).saturating_add(1)
    }

    /// Number of cells in the box, `None` on overflow.
    pub fn area(&self) -> Option<u64> {
        self.width().checked_mul(self.height())
    }
}

/// Outcome of a position, checking win before loss.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Playing,
    Won,
    Lost,
}

/// A puzzle position.
///
/// Clones are fully independent.
#[derive(Clone, Debug)]
pub struct Board {
    target: Coord,
    obstacles: Vec<Location>,
    /// Cell -> occupant. An obstacle standing on the target shadows it.
    occupancy: HashMap<Coord, Occupant>,
    bounds: Bounds,
}

impl Board {
    /// Create a board from a map, validating it first.
    pub fn new(map: Map) -> Result<Board> {
        map.validate()?;
        Ok(Board::from_valid_map(map))
    }

    fn from_valid_map(map: Map) -> Board {
        let mut bounds = Bounds::around(map.target);
        let mut occupancy = HashMap::with_capacity(map.obstacles.len() + 1);
        occupancy.insert(map.target, Occupant::Target);
        for (i, &c) in map.obstacles.iter().enumerate() {
            bounds.include(c);
            occupancy.insert(c, Occupant::Obstacle(i));
        }
        Board {
            target: map.target,
            obstacles: map.obstacles.into_iter().map(Location::OnBoard).collect(),
            occupancy,
            bounds,
        }
    }

    /// Replace the whole position. On error the board is left as it was.
    pub fn set_map(&mut self, map: Map) -> Result<()> {
        map.validate()?;
        *self = Board::from_valid_map(map);
        Ok(())
    }

    #[inline]
    pub fn target(&self) -> Coord {
        self.target
    }

    #[inline]
    pub fn obstacles(&self) -> &[Location] {
        &self.obstacles
    }

    /// Number of obstacles, lost ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Location of obstacle `index`.
    pub fn obstacle(&self, index: usize) -> Result<Location> {
        self.obstacles
            .get(index)
            .copied()
            .ok_or_else(|| MoveError::InvalidIndex(index).into())
    }

    #[inline]
    pub fn occupant(&self, c: Coord) -> Option<Occupant> {
        self.occupancy.get(&c).copied()
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    // ========== Moves ==========

    /// Slide obstacle `index` in `direction` and return where it ends up.
    ///
    /// It stops on the cell before the nearest obstacle on its ray, or goes
    /// off-board when the ray is empty. An obstacle that is already lost
    /// stays lost.
    pub fn move_obstacle(&mut self, index: usize, direction: Direction) -> Result<Location> {
        let from = self.obstacle(index)?;
        let to = match from {
            Location::OffBoard => Location::OffBoard,
            Location::OnBoard(start) => match self.nearest_blocker(index, start, direction) {
                Some(dist) => Location::OnBoard(start + direction.offset() * (dist - 1)),
                None => Location::OffBoard,
            },
        };
        self.relocate(index, to);
        debug!(index, direction = %direction, from = %from, to = %to, "obx slid");
        Ok(to)
    }

    /// Slide whichever obstacle stands on `c`.
    pub fn move_at(&mut self, c: Coord, direction: Direction) -> Result<Location> {
        c.validate().map_err(MoveError::from)?;
        match self.occupant(c) {
            Some(Occupant::Obstacle(index)) => self.move_obstacle(index, direction),
            _ => Err(MoveError::NoObstacleAt(c).into()),
        }
    }

    /// Put obstacle `index` at `location` without any collision handling.
    ///
    /// Only meant for restoring a position that was valid before, as undo
    /// does; uniqueness is not rechecked.
    pub fn force_place(&mut self, index: usize, location: Location) -> Result<Location> {
        self.obstacle(index)?;
        if let Location::OnBoard(c) = location {
            c.validate()?;
        }
        self.relocate(index, location);
        debug!(index, to = %location, "obx placed");
        Ok(location)
    }

    /// Distance to the closest other on-board obstacle lying on the ray
    /// from `start` in `direction`.
    fn nearest_blocker(&self, index: usize, start: Coord, direction: Direction) -> Option<i64> {
        let step = direction.offset();
        self.obstacles
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != index)
            .filter_map(|(_, loc)| loc.coord())
            .filter_map(|c| {
                let diff = c - start;
                let dist = start.manhattan(c);
                (dist > 0 && step * dist == diff).then_some(dist)
            })
            .min()
    }

    /// Move obstacle `index` to `to`, keeping the occupancy index in step.
    fn relocate(&mut self, index: usize, to: Location) {
        if let Location::OnBoard(old) = self.obstacles[index] {
            if self.occupancy.get(&old) == Some(&Occupant::Obstacle(index)) {
                if old == self.target {
                    self.occupancy.insert(old, Occupant::Target);
                } else {
                    self.occupancy.remove(&old);
                }
            }
        }
        self.obstacles[index] = to;
        if let Location::OnBoard(new) = to {
            self.occupancy.insert(new, Occupant::Obstacle(index));
        }
    }

    // ========== Queries ==========

    /// True iff the primary obstacle sits on the target.
    pub fn is_win(&self) -> bool {
        self.obstacles.first() == Some(&Location::OnBoard(self.target))
    }

    /// True iff any obstacle has gone off-board.
    pub fn is_lost(&self) -> bool {
        self.obstacles.iter().any(|ob| ob.is_off_board())
    }

    /// Win takes precedence over loss.
    pub fn status(&self) -> Status {
        if self.is_win() {
            Status::Won
        } else if self.is_lost() {
            Status::Lost
        } else {
            Status::Playing
        }
    }

    // ========== Serialization ==========

    /// Encode as `tx,ty,o0x,o0y,...`, wrapped per `encoding`.
    pub fn serialize(&self, encoding: Encoding) -> String {
        codec::encode_text(&codec::encode_board(self.target, &self.obstacles), encoding)
    }

    /// Replace the position with one decoded from `data`.
    ///
    /// Malformed text fails with `InvalidBoardData`, a well-formed list that
    /// breaks the map rules with `InvalidMap`. Either way nothing changes.
    pub fn load(&mut self, data: &str, encoding: Encoding) -> Result<()> {
        let text = codec::decode_text(data, encoding).map_err(Error::InvalidBoardData)?;
        let (target, obstacles) = codec::decode_board(&text)?;
        self.set_map(Map { target, obstacles })
    }

    /// Decode a fresh board from `data`.
    pub fn from_encoded(data: &str, encoding: Encoding) -> Result<Board> {
        let mut board = Board::default();
        board.load(data, encoding)?;
        Ok(board)
    }

    // ========== Rendering ==========

    /// Draw the bounding box: `x` target, obstacle index, `.` empty.
    ///
    /// Boxes over [`MAX_RENDER_CELLS`] cells get a one-line placeholder instead.
    pub fn render(&self) -> String {
        let b = self.bounds;
        if !matches!(b.area(), Some(n) if n <= MAX_RENDER_CELLS) {
            debug!(width = b.width(), height = b.height(), "board too large to draw");
            return format!("(board too large to draw: {}x{})", b.width(), b.height());
        }
        let mut rows = Vec::new();
        for y in b.min_y..=b.max_y {
            let mut row = String::new();
            for x in b.min_x..=b.max_x {
                match self.occupant(Coord::new(x, y)) {
                    Some(Occupant::Target) => row.push('x'),
                    Some(Occupant::Obstacle(i)) => row.push_str(&i.to_string()),
                    None => row.push('.'),
                }
            }
            rows.push(row);
        }
        rows.join("\n")
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::from_valid_map(Map {
            target: Coord::ORIGIN,
            obstacles: vec![Coord::new(-1, 0), Coord::new(1, 0)],
        })
    }
}

/// Boards compare by target and obstacle locations.
impl PartialEq for Board {
    fn eq(&self, other: &Board) -> bool {
        self.target == other.target && self.obstacles == other.obstacles
    }
}

impl Eq for Board {}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: i64, y: i64) -> Coord {
        Coord::new(x, y)
    }

    fn board(target: Coord, obstacles: &[Coord]) -> Board {
        Board::new(Map::new(target, obstacles.to_vec())).unwrap()
    }

    /// Check the occupancy index against a full rebuild.
    fn assert_occupancy_consistent(b: &Board) {
        let mut expected = HashMap::new();
        expected.insert(b.target, Occupant::Target);
        for (i, ob) in b.obstacles.iter().enumerate() {
            if let Location::OnBoard(c) = ob {
                expected.insert(*c, Occupant::Obstacle(i));
            }
        }
        assert_eq!(b.occupancy, expected);
    }

    // ========== Construction ==========

    #[test]
    fn test_default_board() {
        let b = Board::default();
        assert_eq!(b.target(), c(0, 0));
        assert_eq!(b.obstacles(), &[Location::OnBoard(c(-1, 0)), Location::OnBoard(c(1, 0))]);
        assert_occupancy_consistent(&b);
    }

    #[test]
    fn test_new_rejects_duplicates() {
        let err = Board::new(Map::new(c(0, 0), vec![c(0, 0), c(1, 1)])).unwrap_err();
        assert_eq!(err, Error::InvalidMap(MapError::Duplicate(c(0, 0))));

        let err = Board::new(Map::new(c(0, 0), vec![c(2, 2), c(1, 1), c(2, 2)])).unwrap_err();
        assert_eq!(err, Error::InvalidMap(MapError::Duplicate(c(2, 2))));
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        let err = Board::new(Map::new(c(0, 0), vec![c(Coord::MAX_SAFE + 1, 0)])).unwrap_err();
        assert!(matches!(err, Error::InvalidMap(MapError::Coordinate(_))));
    }

    #[test]
    fn test_map_from_components() {
        let map = Map::from_components(&[5, 2], &[vec![2, 3], vec![1, 1]]).unwrap();
        assert_eq!(map, Map::new(c(5, 2), vec![c(2, 3), c(1, 1)]));

        let err = Map::from_components(&[5, 2], &[vec![2, 3, 4]]).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidMap(MapError::Coordinate(crate::error::CoordError::WrongShape(3)))
        );
        assert!(Map::from_components(&[5], &[]).is_err());
    }

    #[test]
    fn test_set_map_failure_keeps_state() {
        let mut b = board(c(5, 2), &[c(2, 3), c(1, 1)]);
        let before = b.clone();
        assert!(b.set_map(Map::new(c(0, 0), vec![c(0, 0)])).is_err());
        assert_eq!(b, before);
        assert_eq!(b.bounds(), before.bounds());
        assert_occupancy_consistent(&b);
    }

    #[test]
    fn test_bounds() {
        let b = board(c(5, 2), &[c(2, 3), c(1, 1), c(6, 1), c(6, 3)]);
        assert_eq!(b.bounds(), Bounds { min_x: 1, max_x: 6, min_y: 1, max_y: 3 });
        assert!(b.bounds().contains(c(5, 2)));
        assert!(!b.bounds().contains(c(0, 2)));
    }

    // ========== Sliding ==========

    #[test]
    fn test_slide_into_target_wins() {
        let mut b = Board::default();
        assert!(!b.is_win());
        assert_eq!(b.move_obstacle(0, Direction::Right), Ok(c(0, 0).into()));
        assert!(b.is_win());
        assert!(!b.is_lost());
        assert_eq!(b.status(), Status::Won);
    }

    #[test]
    fn test_slide_off_board_loses() {
        let mut b = board(c(5, 2), &[c(2, 3), c(1, 1), c(6, 1), c(6, 3)]);
        assert_eq!(b.move_obstacle(0, Direction::Down), Ok(Location::OffBoard));
        assert!(b.is_lost());
        assert!(!b.is_win());
        assert_eq!(b.status(), Status::Lost);
        assert_eq!(b.occupant(c(2, 3)), None);
        assert_occupancy_consistent(&b);
    }

    #[test]
    fn test_slide_stops_before_blocker() {
        for d in 1..6 {
            let mut b = board(c(100, 100), &[c(0, 0), c(d, 0)]);
            assert_eq!(b.move_obstacle(0, Direction::Right), Ok(c(d - 1, 0).into()));
            assert_occupancy_consistent(&b);
        }
    }

    #[test]
    fn test_adjacent_blocker_no_displacement() {
        let mut b = board(c(9, 9), &[c(0, 0), c(0, -1)]);
        assert_eq!(b.move_obstacle(0, Direction::Up), Ok(c(0, 0).into()));
        assert_occupancy_consistent(&b);
    }

    #[test]
    fn test_slide_picks_nearest_blocker() {
        let mut b = board(c(100, 0), &[c(0, 0), c(10, 0), c(3, 0), c(7, 0)]);
        assert_eq!(b.move_obstacle(0, Direction::Right), Ok(c(2, 0).into()));
    }

    #[test]
    fn test_slide_ignores_obstacles_off_ray() {
        // behind, diagonal and perpendicular-offset obstacles never block
        let mut b = board(c(50, 50), &[c(0, 0), c(-3, 0), c(2, 1), c(4, -1)]);
        assert_eq!(b.move_obstacle(0, Direction::Right), Ok(Location::OffBoard));
    }

    #[test]
    fn test_slide_all_directions() {
        let mut b = board(c(50, 50), &[c(0, 0), c(0, -4), c(0, 4), c(-4, 0), c(4, 0)]);
        let expected = [
            (Direction::Up, c(0, -3)),
            (Direction::Down, c(0, 3)),
            (Direction::Left, c(-3, 0)),
            (Direction::Right, c(3, 0)),
        ];
        for (dir, stop) in expected {
            b.force_place(0, c(0, 0).into()).unwrap();
            assert_eq!(b.move_obstacle(0, dir), Ok(stop.into()), "{dir:?}");
        }
    }

    #[test]
    fn test_target_does_not_block() {
        let mut b = board(c(2, 0), &[c(0, 0), c(5, 0)]);
        assert_eq!(b.move_obstacle(0, Direction::Right), Ok(c(4, 0).into()));
        assert!(!b.is_win());
    }

    #[test]
    fn test_lost_obstacle_does_not_block() {
        let mut b = board(c(50, 50), &[c(0, 0), c(3, 0), c(3, 5)]);
        assert_eq!(b.move_obstacle(1, Direction::Up), Ok(Location::OffBoard));
        assert_eq!(b.move_obstacle(0, Direction::Right), Ok(Location::OffBoard));
    }

    #[test]
    fn test_moving_lost_obstacle_stays_lost() {
        let mut b = board(c(50, 50), &[c(0, 0), c(3, 0)]);
        b.move_obstacle(0, Direction::Up).unwrap();
        assert_eq!(b.move_obstacle(0, Direction::Right), Ok(Location::OffBoard));
        assert_occupancy_consistent(&b);
    }

    #[test]
    fn test_move_invalid_index() {
        let mut b = Board::default();
        let before = b.clone();
        assert_eq!(
            b.move_obstacle(2, Direction::Up),
            Err(Error::InvalidMove(MoveError::InvalidIndex(2)))
        );
        assert_eq!(b, before);
    }

    #[test]
    fn test_move_at() {
        let mut b = Board::default();
        assert_eq!(b.move_at(c(-1, 0), Direction::Right), Ok(c(0, 0).into()));
        assert!(b.is_win());

        assert_eq!(
            b.move_at(c(7, 7), Direction::Right),
            Err(Error::InvalidMove(MoveError::NoObstacleAt(c(7, 7))))
        );
    }

    #[test]
    fn test_move_at_target_cell_without_obstacle() {
        let mut b = Board::default();
        assert_eq!(
            b.move_at(c(0, 0), Direction::Right),
            Err(Error::InvalidMove(MoveError::NoObstacleAt(c(0, 0))))
        );
    }

    // ========== Occupancy ==========

    #[test]
    fn test_target_marker_restored_after_leaving() {
        let mut b = Board::default();
        b.move_obstacle(0, Direction::Right).unwrap();
        assert_eq!(b.occupant(c(0, 0)), Some(Occupant::Obstacle(0)));
        b.move_obstacle(0, Direction::Left).unwrap();
        assert_eq!(b.occupant(c(0, 0)), Some(Occupant::Target));
        assert_occupancy_consistent(&b);
    }

    #[test]
    fn test_force_place() {
        let mut b = Board::default();
        b.move_obstacle(0, Direction::Up).unwrap();
        assert!(b.is_lost());
        assert_eq!(b.force_place(0, c(-1, 0).into()), Ok(c(-1, 0).into()));
        assert!(!b.is_lost());
        assert_eq!(b, Board::default());
        assert_occupancy_consistent(&b);

        assert_eq!(
            b.force_place(5, c(0, 0).into()),
            Err(Error::InvalidMove(MoveError::InvalidIndex(5)))
        );
        assert!(matches!(
            b.force_place(0, c(i64::MAX, 0).into()),
            Err(Error::InvalidCoordinate(_))
        ));
        assert_eq!(b, Board::default());
    }

    #[test]
    fn test_win_only_depends_on_primary() {
        let mut b = board(c(0, 0), &[c(0, 3), c(5, 5), c(0, -1)]);
        // primary off target, others shuffled around
        b.force_place(1, c(0, 1).into()).unwrap();
        assert!(!b.is_win());
        b.force_place(0, c(0, 0).into()).unwrap();
        assert!(b.is_win());
        b.force_place(1, Location::OffBoard).unwrap();
        b.force_place(2, c(9, 9).into()).unwrap();
        assert!(b.is_win());
        assert_eq!(b.status(), Status::Won);
    }

    // ========== Serialization ==========

    #[test]
    fn test_serialize_raw() {
        let b = board(c(5, 2), &[c(2, 3), c(1, 1), c(6, 1), c(6, 3)]);
        assert_eq!(b.serialize(Encoding::Raw), "5,2,2,3,1,1,6,1,6,3");
    }

    #[test]
    fn test_serialize_load_roundtrip() {
        let b = board(c(-4, 9), &[c(2, -3), c(-11, 1), c(600, 1)]);
        for enc in [Encoding::Raw, Encoding::Base64] {
            let loaded = Board::from_encoded(&b.serialize(enc), enc).unwrap();
            assert_eq!(loaded.target(), b.target());
            assert_eq!(loaded.obstacles(), b.obstacles());
        }
    }

    #[test]
    fn test_load_errors() {
        let mut b = Board::default();
        assert!(matches!(b.load("1,2,3", Encoding::Raw), Err(Error::InvalidBoardData(_))));
        assert!(matches!(
            b.load("0,0,0,0,1,1", Encoding::Raw),
            Err(Error::InvalidMap(MapError::Duplicate(_)))
        ));
        assert!(matches!(b.load("%%%", Encoding::Base64), Err(Error::InvalidBoardData(_))));
        assert_eq!(b, Board::default());
    }

    // ========== Rendering ==========

    #[test]
    fn test_render() {
        let b = board(c(5, 2), &[c(2, 3), c(1, 1), c(6, 1), c(6, 3)]);
        assert_eq!(b.render(), "1....2\n....x.\n.0...3");
        assert_eq!(b.to_string(), b.render());
    }

    #[test]
    fn test_render_primary_on_target() {
        let mut b = Board::default();
        assert_eq!(b.render(), "0x1");
        b.move_obstacle(0, Direction::Right).unwrap();
        assert_eq!(b.render(), ".01");
    }

    #[test]
    fn test_render_far_flung_board() {
        let b = board(c(0, 0), &[c(1, 0), c(1_000_000, 100_000)]);
        assert_eq!(b.bounds().area(), Some(1_000_001 * 100_001));
        assert_eq!(b.render(), "(board too large to draw: 1000001x100001)");

        let b = board(c(0, 0), &[c(Coord::MAX_SAFE, Coord::MAX_SAFE), c(-Coord::MAX_SAFE, -Coord::MAX_SAFE)]);
        assert_eq!(b.bounds().area(), None);
        assert!(b.render().starts_with("(board too large to draw: "));
    }

    #[test]
    fn test_render_at_size_limit() {
        let b = board(c(0, 0), &[c(255, 255), c(0, 255)]);
        assert_eq!(b.bounds().area(), Some(MAX_RENDER_CELLS));
        let drawn = b.render();
        assert_eq!(drawn.lines().count(), 256);
        assert!(drawn.lines().all(|row| row.len() == 256));
    }
}
