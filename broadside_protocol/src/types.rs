// Core vocabulary shared by the server engine and both transports.
//
// These types cross the wire inside `message.rs` payloads, so everything
// here derives `Serialize`/`Deserialize`. The server's `Board` and `Session`
// build on the same enums rather than defining private duplicates — there is
// exactly one definition of a cell state or a seat in the whole workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Process-unique player ID, assigned by the registry when a player joins.
/// Opaque to clients. The socket transport uses it to tag reader threads,
/// the polling transport uses it to key event mailboxes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u64);

/// Room code: the shared secret players exchange to meet in a session.
/// Six uppercase-alphanumeric characters as generated by the registry, but
/// the type accepts any string so a bad code simply fails lookup.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomCode(pub String);

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One of the two fixed player slots in a session. Seat one is always the
/// room creator and always opens both the placement and battle phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    One,
    Two,
}

impl Seat {
    /// The other seat.
    pub fn opponent(self) -> Seat {
        match self {
            Seat::One => Seat::Two,
            Seat::Two => Seat::One,
        }
    }

    /// Zero-based index, for `[T; 2]` per-seat storage.
    pub fn index(self) -> usize {
        match self {
            Seat::One => 0,
            Seat::Two => 1,
        }
    }

    /// Human-facing seat number (1 or 2).
    pub fn number(self) -> u8 {
        match self {
            Seat::One => 1,
            Seat::Two => 2,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// State of a single board cell. Legal transitions are `Empty -> Ship`
/// during placement and `Ship -> Hit` / `Empty -> Miss` during battle;
/// nothing else, ever.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Ship,
    Miss,
    Hit,
}

/// A full board as rows of cells, as it appears in wire messages and
/// snapshots. Row-major: `grid[row][col]`.
pub type BoardGrid = Vec<Vec<Cell>>;

/// Coarse session state. Advances monotonically; `Finished` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Waiting,
    Placement,
    Battle,
    Finished,
}
