//! Obiex puzzle rules engine.
//!
//! Obstacles ("obx") sit on an unbounded integer grid. A move slides one
//! obstacle in a direction until it bumps into another; with nothing in the
//! way it slides off the grid and is lost. Getting obstacle 0 onto the
//! target cell wins.
//!
//! # String formats
//!
//! ```text
//! board:    tx,ty,o0x,o0y,o1x,o1y,...    e.g. 5,2,2,3,1,1,6,1,6,3
//! moves:    <index><U|D|L|R>,...         e.g. 1R,0R,0U
//! session:  <board>[|<moves>]
//! ```
//!
//! Each is sent either raw or base64-wrapped, see [`Encoding`].
//!
//! ```
//! use obiex_core::{Direction, Encoding, Session};
//!
//! let mut session = Session::new();
//! session.load("5,2,2,3,1,1,6,1,6,3", Encoding::Raw)?;
//! session.move_obstacle(1, Direction::Right)?;
//! session.move_obstacle(0, Direction::Right)?;
//! session.move_obstacle(0, Direction::Up)?;
//! assert!(session.state().is_win());
//! assert_eq!(session.serialize(Encoding::Raw), "5,2,2,3,1,1,6,1,6,3|1R,0R,0U");
//! # Ok::<(), obiex_core::Error>(())
//! ```

pub mod board;
pub mod codec;
pub mod coord;
pub mod error;
pub mod session;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use board::{Board, Bounds, Map, Occupant, Status, MAX_RENDER_CELLS};
pub use codec::Encoding;
pub use coord::{Coord, Direction, Location};
pub use error::{CoordError, Error, MapError, MoveError, Result};
pub use session::{MoveRecord, Session};
