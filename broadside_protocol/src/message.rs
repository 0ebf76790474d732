// Protocol messages for client-server communication.
//
// Two enums define the full protocol vocabulary:
// - `ClientMessage`: sent by game clients to the server.
// - `ServerMessage`: sent by the server to game clients.
//
// Every message kind is a named variant matched exhaustively on both sides,
// so an unhandled kind is a compile error rather than a silent fallthrough.
//
// Identity is implicit on the socket transport: `CreateRoom`/`JoinRoom` act
// as the handshake and every later frame on that connection is attributed to
// the player assigned then. The polling transport carries the room code and
// player ID alongside each request instead (see `broadside_server::poll`).

use serde::{Deserialize, Serialize};

use crate::types::{BoardGrid, Cell, Phase, PlayerId, RoomCode, Seat};

/// Messages sent by a client to the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ClientMessage {
    /// Open a new room (handshake). The sender becomes seat one.
    CreateRoom { player_name: String },
    /// Join an existing room by code (handshake).
    JoinRoom {
        room_code: RoomCode,
        player_name: String,
    },
    /// Submit a move for the sender's seat. During placement `horizontal`
    /// selects the ship axis (absent means vertical); during battle it is
    /// ignored.
    Move {
        row: u8,
        col: u8,
        horizontal: Option<bool>,
    },
    /// Player is leaving gracefully.
    Goodbye,
}

/// Messages sent by the server to a client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ServerMessage {
    /// Handshake reply: room opened, sender seated as seat one.
    RoomCreated {
        room_code: RoomCode,
        seat: Seat,
        player_id: PlayerId,
    },
    /// Handshake reply: joined an existing room.
    RoomJoined {
        room_code: RoomCode,
        seat: Seat,
        player_id: PlayerId,
    },
    /// A player took a seat (sent to everyone in the room, joiner included).
    PlayerJoined {
        seat: Seat,
        name: String,
        total_players: u8,
    },
    /// Both seats are filled — placement begins with `first_seat`.
    GameStart { first_seat: Seat },
    /// A ship was placed mid-manifest; the same seat continues with a ship
    /// of `next_ship_size`.
    ShipPlaced {
        seat: Seat,
        board: BoardGrid,
        next_ship_size: u8,
    },
    /// A seat finished its manifest; `next_seat` places (or waits) next.
    PlacementComplete { seat: Seat, next_seat: Seat },
    /// Both manifests are done — battle begins with `first_seat`.
    BattleStart { first_seat: Seat },
    /// A shot was resolved against `seat`'s opponent. When `game_over` is
    /// set, `next_seat` is the winner; otherwise it is whose turn is next.
    ShotFired {
        seat: Seat,
        row: u8,
        col: u8,
        hit: bool,
        game_over: bool,
        target_board: BoardGrid,
        next_seat: Seat,
    },
    /// A player disconnected or left.
    PlayerLeft { seat: Seat, name: String },
    /// The sender's last operation was rejected. The session is unchanged.
    Error { message: String },
}

/// Public identity of a seated player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub seat: Seat,
}

/// Full authoritative game state, as returned by the polling transport's
/// state read. Everything a client needs to render the room from scratch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub phase: Phase,
    /// The seat currently authorized to move. Frozen on the winner once
    /// the game is finished.
    pub turn: Seat,
    pub winner: Option<Seat>,
    /// Both boards, indexed by `Seat::index()`.
    pub boards: [BoardGrid; 2],
    /// Ordered ship lengths each seat must place.
    pub ship_sizes: Vec<u8>,
    /// Per-seat index of the next manifest entry to place.
    pub placement_cursor: [usize; 2],
    pub ships_placed: [bool; 2],
    pub players: Vec<PlayerInfo>,
}

impl GameSnapshot {
    /// Length of the next ship `seat` must place, if any remain.
    pub fn next_ship_size(&self, seat: Seat) -> Option<u8> {
        self.ship_sizes
            .get(self.placement_cursor[seat.index()])
            .copied()
    }
}

/// Convenience for building an empty `height x width` grid.
pub fn empty_grid(height: u8, width: u8) -> BoardGrid {
    vec![vec![Cell::Empty; usize::from(width)]; usize::from(height)]
}
