// Session state for one room: the authoritative game state machine.
//
// `Session` owns both players' boards, the turn pointer, the phase, and the
// per-seat placement progress. All mutation happens through methods called
// from a transport adapter; every method either applies an operation and
// returns the events it produced, or rejects it with a `GameError` and
// changes nothing.
//
// Sessions hold no transport handles. Each produced event is addressed to a
// concrete `PlayerId` (`Outbound`), so an adapter only needs to implement
// "deliver this message to that player" — a TCP write for the socket
// transport, a mailbox push for the polling transport. This keeps the game
// rules in exactly one place regardless of how clients are connected.
//
// Phase machine: `Waiting` (0-1 players) -> `Placement` (both seats filled,
// ships placed in manifest order) -> `Battle` (alternating shots) ->
// `Finished` (one side sunk). `Finished` is terminal. A departure from an
// unfinished match drops the session back to `Waiting`; refilling the seat
// restarts placement on fresh boards (there is no session resumption).

use broadside_protocol::message::{GameSnapshot, PlayerInfo, ServerMessage};
use broadside_protocol::types::{Phase, PlayerId, Seat};

use crate::board::{Board, ShotOutcome};
use crate::errors::GameError;

/// Immutable per-session rules: board dimensions and the ship manifest.
#[derive(Clone, Debug)]
pub struct GameRules {
    pub board_height: u8,
    pub board_width: u8,
    /// Ordered ship lengths each seat must place before battle.
    pub ship_sizes: Vec<u8>,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            board_height: 7,
            board_width: 9,
            ship_sizes: vec![5, 4, 3, 3, 2],
        }
    }
}

/// A move as submitted by a client, already attributed to a seat.
#[derive(Clone, Copy, Debug)]
pub struct MoveData {
    pub row: u8,
    pub col: u8,
    /// Placement axis; absent means vertical. Ignored during battle.
    pub horizontal: Option<bool>,
}

/// An event addressed to one player. Adapters deliver these verbatim.
#[derive(Clone, Debug)]
pub struct Outbound {
    pub to: PlayerId,
    pub event: ServerMessage,
}

struct PlayerRecord {
    id: PlayerId,
    name: String,
    seat: Seat,
}

/// One room's authoritative state.
pub struct Session {
    rules: GameRules,
    players: Vec<PlayerRecord>,
    boards: [Board; 2],
    phase: Phase,
    turn: Seat,
    winner: Option<Seat>,
    cursor: [usize; 2],
    placed: [bool; 2],
}

impl Session {
    pub fn new(rules: GameRules) -> Self {
        let board = || Board::new(rules.board_height, rules.board_width);
        Self {
            boards: [board(), board()],
            rules,
            players: Vec::new(),
            phase: Phase::Waiting,
            turn: Seat::One,
            winner: None,
            cursor: [0, 0],
            placed: [false, false],
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The seat currently authorized to move (the winner, once finished).
    pub fn turn(&self) -> Seat {
        self.turn
    }

    pub fn winner(&self) -> Option<Seat> {
        self.winner
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// The seat occupied by `player`, if they are in this room.
    pub fn seat_of(&self, player: PlayerId) -> Option<Seat> {
        self.players.iter().find(|p| p.id == player).map(|p| p.seat)
    }

    /// IDs of everyone in the room, in seat order.
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().map(|p| p.id)
    }

    /// Seat a player in the lowest free seat. The instant the second seat
    /// fills, match state is reset and the phase advances to `Placement`
    /// with the turn pointer on seat one — a seat refilled after a
    /// departure restarts the match rather than resuming it.
    pub fn join(&mut self, id: PlayerId, name: String) -> Result<(Seat, Vec<Outbound>), GameError> {
        if self.players.len() >= 2 {
            return Err(GameError::RoomFull);
        }
        let seat = if self.players.iter().any(|p| p.seat == Seat::One) {
            Seat::Two
        } else {
            Seat::One
        };
        self.players.push(PlayerRecord {
            id,
            name: name.clone(),
            seat,
        });

        let mut out = self.broadcast(ServerMessage::PlayerJoined {
            seat,
            name,
            total_players: self.players.len() as u8,
        });
        if self.players.len() == 2 {
            self.reset_match();
            self.phase = Phase::Placement;
            self.turn = Seat::One;
            out.extend(self.broadcast(ServerMessage::GameStart {
                first_seat: Seat::One,
            }));
        }
        Ok((seat, out))
    }

    /// Remove a player and notify whoever remains. An unfinished match
    /// drops back to `Waiting` (no moves until the seat refills); a
    /// finished one stays `Finished`. A deserted room is evicted by the
    /// registry owner instead.
    pub fn remove_player(&mut self, id: PlayerId) -> Vec<Outbound> {
        let Some(pos) = self.players.iter().position(|p| p.id == id) else {
            return Vec::new();
        };
        let gone = self.players.remove(pos);
        if self.phase != Phase::Finished {
            self.phase = Phase::Waiting;
        }
        self.broadcast(ServerMessage::PlayerLeft {
            seat: gone.seat,
            name: gone.name,
        })
    }

    /// Wipe boards and placement progress for a fresh match.
    fn reset_match(&mut self) {
        let board = || Board::new(self.rules.board_height, self.rules.board_width);
        self.boards = [board(), board()];
        self.winner = None;
        self.cursor = [0, 0];
        self.placed = [false, false];
    }

    /// Apply a move for `seat`. Exactly one of: events produced and state
    /// advanced, or an error with no state change.
    pub fn apply_move(&mut self, seat: Seat, mv: MoveData) -> Result<Vec<Outbound>, GameError> {
        if seat != self.turn {
            return Err(GameError::NotYourTurn);
        }
        match self.phase {
            Phase::Placement => self.handle_placement(seat, mv),
            Phase::Battle => self.handle_battle(seat, mv),
            Phase::Waiting | Phase::Finished => Err(GameError::InvalidPhase),
        }
    }

    fn handle_placement(&mut self, seat: Seat, mv: MoveData) -> Result<Vec<Outbound>, GameError> {
        let idx = self.cursor[seat.index()];
        let Some(&length) = self.rules.ship_sizes.get(idx) else {
            return Err(GameError::InvalidPhase);
        };
        let horizontal = mv.horizontal.unwrap_or(false);

        let board = &mut self.boards[seat.index()];
        if !board.place(mv.row, mv.col, length, horizontal) {
            return Err(GameError::InvalidPlacement);
        }
        self.cursor[seat.index()] += 1;

        if self.cursor[seat.index()] < self.rules.ship_sizes.len() {
            // Same seat keeps placing; the turn pointer does not move.
            let next_ship_size = self.rules.ship_sizes[self.cursor[seat.index()]];
            let board = self.boards[seat.index()].snapshot();
            return Ok(self.broadcast(ServerMessage::ShipPlaced {
                seat,
                board,
                next_ship_size,
            }));
        }

        self.placed[seat.index()] = true;
        if self.placed[0] && self.placed[1] {
            self.phase = Phase::Battle;
            self.turn = Seat::One;
            return Ok(self.broadcast(ServerMessage::BattleStart {
                first_seat: Seat::One,
            }));
        }
        // Hand the turn to the seat that still has ships to place. Seat one
        // finishing first is the only ordering the turn rules allow, but the
        // phase flip above requires both flags either way.
        let next_seat = seat.opponent();
        self.turn = next_seat;
        Ok(self.broadcast(ServerMessage::PlacementComplete { seat, next_seat }))
    }

    fn handle_battle(&mut self, seat: Seat, mv: MoveData) -> Result<Vec<Outbound>, GameError> {
        let target_seat = seat.opponent();
        let target = &mut self.boards[target_seat.index()];
        if !target.in_bounds(mv.row, mv.col) {
            return Err(GameError::InvalidCoordinates);
        }
        let hit = match target.fire_at(mv.row, mv.col) {
            ShotOutcome::AlreadyTargeted => return Err(GameError::DuplicateShot),
            ShotOutcome::Hit => true,
            ShotOutcome::Miss => false,
        };

        let game_over = target.all_ships_sunk();
        let target_board = target.snapshot();
        let next_seat = if game_over {
            self.phase = Phase::Finished;
            self.winner = Some(seat);
            // Turn pointer freezes on the winner; no further moves accepted.
            seat
        } else {
            self.turn = target_seat;
            target_seat
        };
        Ok(self.broadcast(ServerMessage::ShotFired {
            seat,
            row: mv.row,
            col: mv.col,
            hit,
            game_over,
            target_board,
            next_seat,
        }))
    }

    /// Full state for the polling transport's state read.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            phase: self.phase,
            turn: self.turn,
            winner: self.winner,
            boards: [self.boards[0].snapshot(), self.boards[1].snapshot()],
            ship_sizes: self.rules.ship_sizes.clone(),
            placement_cursor: self.cursor,
            ships_placed: self.placed,
            players: self
                .players
                .iter()
                .map(|p| PlayerInfo {
                    id: p.id,
                    name: p.name.clone(),
                    seat: p.seat,
                })
                .collect(),
        }
    }

    /// Address `event` to every seated player.
    fn broadcast(&self, event: ServerMessage) -> Vec<Outbound> {
        self.players
            .iter()
            .map(|p| Outbound {
                to: p.id,
                event: event.clone(),
            })
            .collect()
    }
}
