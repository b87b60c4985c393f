//! A game in progress: the loaded board, a working copy and the move history.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::board::Board;
use crate::codec::{self, Encoding, MoveToken};
use crate::coord::{Direction, Location};
use crate::error::{Error, Result};

/// One applied move.
///
/// `from` is a snapshot of the obstacle's location before the move and is
/// what undo restores.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct MoveRecord {
    pub index: usize,
    pub direction: Direction,
    pub from: Location,
    pub to: Location,
}

impl MoveRecord {
    fn token(&self) -> MoveToken {
        MoveToken { index: self.index, direction: self.direction }
    }
}

/// The committed board stays as loaded; all play happens on `state`.
#[derive(Clone, Debug, Default)]
pub struct Session {
    board: Board,
    state: Board,
    moves: Vec<MoveRecord>,
}

impl Session {
    /// Start with the default board and no history.
    pub fn new() -> Session {
        Session::default()
    }

    pub fn from_board(board: Board) -> Session {
        Session { state: board.clone(), board, moves: Vec::new() }
    }

    /// The board as loaded.
    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The board being played.
    #[inline]
    pub fn state(&self) -> &Board {
        &self.state
    }

    #[inline]
    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        !self.moves.is_empty()
    }

    /// Slide an obstacle on the working board and record it.
    #[instrument(level = "debug", skip(self))]
    pub fn move_obstacle(&mut self, index: usize, direction: Direction) -> Result<Location> {
        let from = self.state.obstacle(index)?;
        let to = self.state.move_obstacle(index, direction)?;
        self.moves.push(MoveRecord { index, direction, from, to });
        Ok(to)
    }

    /// Take back the last move by putting the obstacle back where it was.
    #[instrument(level = "debug", skip(self))]
    pub fn undo(&mut self) -> Result<MoveRecord> {
        let last = *self.moves.last().ok_or(Error::NoMovesToUndo)?;
        self.state.force_place(last.index, last.from)?;
        self.moves.pop();
        Ok(last)
    }

    /// Drop all moves and start again from the committed board.
    #[instrument(level = "debug", skip(self))]
    pub fn reset(&mut self) {
        self.moves.clear();
        self.state = self.board.clone();
    }

    /// Load a session string (`board[|moves]`).
    ///
    /// Replaces the committed board, resets, then replays the moves. Nothing
    /// changes unless every part parses and replays.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&mut self, data: &str, encoding: Encoding) -> Result<()> {
        let text = codec::decode_text(data, encoding).map_err(Error::InvalidBoardData)?;
        let (board_text, moves_text) = codec::split_session(&text);

        let mut next = Session::from_board(Board::from_encoded(board_text, Encoding::Raw)?);
        if let Some(moves_text) = moves_text {
            next.replay(moves_text)?;
        }

        debug!(obstacles = next.board.len(), moves = next.moves.len(), "session loaded");
        *self = next;
        Ok(())
    }

    /// Replay a move list on top of the current state, appending to history.
    #[instrument(level = "debug", skip(self))]
    pub fn load_moves(&mut self, data: &str, encoding: Encoding) -> Result<()> {
        let text = codec::decode_text(data, encoding).map_err(Error::InvalidMoveData)?;
        let mut next = self.clone();
        next.replay(&text)?;
        *self = next;
        Ok(())
    }

    fn replay(&mut self, moves_text: &str) -> Result<()> {
        for m in codec::decode_moves(moves_text, self.board.len())? {
            self.move_obstacle(m.index, m.direction)?;
        }
        Ok(())
    }

    /// Encode the committed board plus the move history, if any.
    pub fn serialize(&self, encoding: Encoding) -> String {
        let board = self.board.serialize(Encoding::Raw);
        let moves = self.serialize_moves(Encoding::Raw);
        codec::encode_text(&codec::join_session(&board, &moves), encoding)
    }

    pub fn serialize_moves(&self, encoding: Encoding) -> String {
        codec::encode_text(&codec::encode_moves(self.moves.iter().map(MoveRecord::token)), encoding)
    }
}
