//! String formats shared by [`Board`](crate::Board) and [`Session`](crate::Session).
//!
//! ```text
//! board:    tx,ty,o0x,o0y,o1x,o1y,...      (even count, at least 6 integers)
//! moves:    <index><U|D|L|R>,...           e.g. 0L,2U,1R
//! session:  <board>[|<moves>]
//! ```
//!
//! Each format is either carried as-is ([`Encoding::Raw`]) or wrapped in
//! standard padded base64 ([`Encoding::Base64`]). The session format is
//! wrapped as one unit; its board and move segments are always raw inside.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::coord::{Coord, Direction, Location};
use crate::error::{Error, Result};

/// Minimum number of integers in a board string (target + 2 obstacles).
pub const MIN_BOARD_INTS: usize = 6;

const SESSION_SEPARATOR: char = '|';

/// Transport wrapping applied to a string format.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Base64,
    Raw,
}

/// A move as written in the move-list format.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MoveToken {
    pub index: usize,
    pub direction: Direction,
}

pub fn encode_text(text: &str, encoding: Encoding) -> String {
    match encoding {
        Encoding::Base64 => STANDARD.encode(text.as_bytes()),
        Encoding::Raw => text.to_string(),
    }
}

/// Undo the transport wrapping. Failures carry a short reason; callers
/// turn them into the error kind of the format being read.
pub fn decode_text(data: &str, encoding: Encoding) -> std::result::Result<String, String> {
    match encoding {
        Encoding::Raw => Ok(data.to_string()),
        Encoding::Base64 => {
            let bytes = STANDARD
                .decode(data.trim().as_bytes())
                .map_err(|e| format!("bad base64: {e}"))?;
            String::from_utf8(bytes).map_err(|_| "not utf-8".to_string())
        }
    }
}

/// Write `target` followed by every obstacle as a flat integer list.
///
/// An off-board obstacle has no integer form and is written as `NaN,NaN`,
/// which [`decode_board`] refuses.
pub fn encode_board(target: Coord, obstacles: &[Location]) -> String {
    let mut parts = Vec::with_capacity(2 + obstacles.len() * 2);
    parts.push(target.x.to_string());
    parts.push(target.y.to_string());
    for ob in obstacles {
        match ob {
            Location::OnBoard(c) => {
                parts.push(c.x.to_string());
                parts.push(c.y.to_string());
            }
            Location::OffBoard => {
                parts.push("NaN".to_string());
                parts.push("NaN".to_string());
            }
        }
    }
    parts.join(",")
}

/// Parse a raw board string into `(target, obstacles)`.
///
/// Only the list shape is checked here; coordinate range and uniqueness are
/// the map's concern.
pub fn decode_board(text: &str) -> Result<(Coord, Vec<Coord>)> {
    let ints = text
        .split(',')
        .map(|tok| tok.trim().parse::<i64>())
        .collect::<std::result::Result<Vec<i64>, _>>()
        .map_err(|_| Error::InvalidBoardData("every entry must be an integer".to_string()))?;

    if ints.len() % 2 != 0 || ints.len() < MIN_BOARD_INTS {
        return Err(Error::InvalidBoardData(format!(
            "expected an even count of at least {MIN_BOARD_INTS} integers, got {}",
            ints.len()
        )));
    }

    let mut coords = ints.chunks_exact(2).map(|p| Coord::new(p[0], p[1]));
    let target = coords.next().unwrap_or(Coord::ORIGIN);
    Ok((target, coords.collect()))
}

pub fn encode_moves<I>(moves: I) -> String
where
    I: IntoIterator<Item = MoveToken>,
{
    moves
        .into_iter()
        .map(|m| format!("{}{}", m.index, m.direction.letter()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse a raw move list, checking every index against `obstacle_count`.
pub fn decode_moves(text: &str, obstacle_count: usize) -> Result<Vec<MoveToken>> {
    text.split(',')
        .map(|tok| decode_move_token(tok.trim(), obstacle_count))
        .collect()
}

fn decode_move_token(tok: &str, obstacle_count: usize) -> Result<MoveToken> {
    let letter = tok
        .chars()
        .next_back()
        .ok_or_else(|| Error::InvalidMoveData("empty move".to_string()))?;
    let direction = Direction::from_letter(letter)
        .ok_or_else(|| Error::InvalidMoveData(format!("unknown dir {letter:?}")))?;

    let digits = &tok[..tok.len() - letter.len_utf8()];
    let index = parse_index(digits)
        .filter(|&i| i < obstacle_count)
        .ok_or_else(|| Error::InvalidMoveData(format!("invalid index {digits:?}")))?;

    Ok(MoveToken { index, direction })
}

/// Parse a decimal obstacle index: ASCII digits only, no sign.
pub fn parse_index(text: &str) -> Option<usize> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Split a raw session string into its board and (possibly empty) move segment.
pub fn split_session(text: &str) -> (&str, Option<&str>) {
    match text.split_once(SESSION_SEPARATOR) {
        Some((board, moves)) if !moves.is_empty() => (board, Some(moves)),
        Some((board, _)) => (board, None),
        None => (text, None),
    }
}

pub fn join_session(board: &str, moves: &str) -> String {
    if moves.is_empty() {
        board.to_string()
    } else {
        format!("{board}{SESSION_SEPARATOR}{moves}")
    }
}
