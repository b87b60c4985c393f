//! Built-in level table, in raw board format.

use obiex_core::{Encoding, Result, Session};

pub const LEVELS: &[&str] = &[
    "0,0,-1,0,1,0",
    "5,2,2,3,1,1,6,1,6,3",
    "4,3,5,3,5,1,5,5,1,3,0,0",
    "2,2,3,1,5,1,1,2,1,5,5,4",
    "6,4,4,4,6,1,1,4,3,4,8,4",
    "4,3,4,1,1,1,6,1,1,4,6,4",
    "3,2,2,3,1,1,5,1,6,1,5,3,6,3",
    "4,4,6,4,1,1,1,4,1,7,7,3,6,7",
    "4,3,2,5,1,1,1,2,2,1,6,1,6,5",
    "3,2,2,3,1,1,6,1,7,1,6,3,7,3",
    "2,4,5,6,1,1,4,1,7,1,1,6",
    "3,2,2,5,1,1,5,1,6,2,5,5,6,5",
    "4,3,4,1,1,1,1,4,7,1,7,5,8,4",
    "5,3,9,4,1,1,1,3,1,6,9,2,9,5",
    "3,2,3,5,1,1,1,4,5,1,5,4,2,5,4,5",
    "4,3,5,1,1,1,1,4,7,1,8,4,7,5",
    "6,3,10,4,1,1,1,3,1,6,10,2,10,5",
    "5,5,10,7,1,1,1,7,2,7,10,1,9,2",
    "0,0,100,0,-1,0",
];

/// Load level `index` into `session`. Returns `None` past the last level.
pub fn load_level(session: &mut Session, index: usize) -> Option<Result<()>> {
    LEVELS.get(index).map(|level| session.load(level, Encoding::Raw))
}
