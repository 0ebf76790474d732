// Pull-based transport adapter: request/response with per-player mailboxes.
//
// For clients that cannot hold a socket open, the same registry/session
// engine is driven through plain request/response calls. Events a session
// produces for the *acting* player are returned synchronously as the
// response; events for the other player are buffered in that player's
// mailbox until they poll, then handed over and cleared — at-most-once
// delivery per poll, in generation order (a `Vec` drained in push order,
// never reordered or deduplicated).
//
// This adapter owns no game logic: every rule lives in `session.rs`. An HTTP
// layer (or a serverless function) wrapping these methods only translates
// requests and serializes replies — which is why none exists here.
//
// `PollTransport` takes `&mut self` for every mutation, so whatever owns it
// (one thread, or anything enforcing exclusive access) serializes all
// operations, as the turn invariant requires. Sessions behind different
// transports are never shared.

use std::collections::HashMap;

use broadside_protocol::message::{GameSnapshot, ServerMessage};
use broadside_protocol::types::{PlayerId, RoomCode, Seat};

use crate::errors::GameError;
use crate::registry::Registry;
use crate::session::{GameRules, MoveData, Outbound};

/// Handshake reply shared by `create_room` and `join_room`.
#[derive(Clone, Debug, PartialEq)]
pub struct JoinedRoom {
    pub room_code: RoomCode,
    pub seat: Seat,
    pub player_id: PlayerId,
}

pub struct PollTransport {
    registry: Registry,
    /// Buffered events per player, drained by `poll_events`.
    mailboxes: HashMap<PlayerId, Vec<ServerMessage>>,
    /// Which room each live player belongs to.
    membership: HashMap<PlayerId, RoomCode>,
}

impl PollTransport {
    pub fn new(rules: GameRules) -> Self {
        Self {
            registry: Registry::new(rules),
            mailboxes: HashMap::new(),
            membership: HashMap::new(),
        }
    }

    /// Open a room; the caller takes seat one. A join into a freshly
    /// created room cannot fail, but the engine's verdict is propagated
    /// rather than assumed.
    pub fn create_room(&mut self, player_name: &str) -> Result<JoinedRoom, GameError> {
        let player_id = self.registry.allocate_player_id();
        let (room_code, session) = self.registry.create();
        let (seat, events) = session.join(player_id, player_name.to_string())?;
        self.membership.insert(player_id, room_code.clone());
        self.route(player_id, events);
        log::info!("room {room_code} created by {player_name:?}");
        Ok(JoinedRoom {
            room_code,
            seat,
            player_id,
        })
    }

    /// Join an existing room by code.
    pub fn join_room(
        &mut self,
        code: &RoomCode,
        player_name: &str,
    ) -> Result<JoinedRoom, GameError> {
        let player_id = self.registry.allocate_player_id();
        let session = self.registry.get_mut(code).ok_or(GameError::RoomNotFound)?;
        let (seat, events) = session.join(player_id, player_name.to_string())?;
        self.membership.insert(player_id, code.clone());
        self.route(player_id, events);
        Ok(JoinedRoom {
            room_code: code.clone(),
            seat,
            player_id,
        })
    }

    /// Submit a move. Returns the acting player's own events; everything
    /// addressed elsewhere lands in the recipients' mailboxes.
    pub fn game_move(
        &mut self,
        code: &RoomCode,
        player_id: PlayerId,
        mv: MoveData,
    ) -> Result<Vec<ServerMessage>, GameError> {
        let session = self.registry.get_mut(code).ok_or(GameError::RoomNotFound)?;
        let seat = session.seat_of(player_id).ok_or(GameError::PlayerNotFound)?;
        let events = session.apply_move(seat, mv)?;
        Ok(self.route(player_id, events))
    }

    /// Drain the player's mailbox. At-most-once: a second poll without
    /// intervening events returns nothing.
    pub fn poll_events(&mut self, player_id: PlayerId) -> Vec<ServerMessage> {
        self.mailboxes
            .get_mut(&player_id)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Full current game state for a room — the snapshot read used when no
    /// push channel is available.
    pub fn snapshot(&mut self, code: &RoomCode) -> Result<GameSnapshot, GameError> {
        self.registry
            .get_mut(code)
            .map(|s| s.snapshot())
            .ok_or(GameError::RoomNotFound)
    }

    /// Explicit leave (the pull channel has no disconnect to observe).
    /// Remaining players learn via `PlayerLeft` in their mailboxes; an empty
    /// room is evicted. Idempotent.
    pub fn leave(&mut self, player_id: PlayerId) {
        let Some(code) = self.membership.remove(&player_id) else {
            return;
        };
        self.mailboxes.remove(&player_id);
        let Some(session) = self.registry.get_mut(&code) else {
            return;
        };
        let events = session.remove_player(player_id);
        let empty = session.is_empty();
        self.route(player_id, events);
        if empty {
            self.registry.remove(&code);
            log::info!("room {code} emptied, evicted");
        }
    }

    pub fn room_count(&self) -> usize {
        self.registry.room_count()
    }

    /// Split outbound events: the actor's own come back as the return
    /// value, the rest are appended to their recipients' mailboxes.
    fn route(&mut self, actor: PlayerId, events: Vec<Outbound>) -> Vec<ServerMessage> {
        let mut own = Vec::new();
        for out in events {
            if out.to == actor {
                own.push(out.event);
            } else {
                self.mailboxes.entry(out.to).or_default().push(out.event);
            }
        }
        own
    }
}
