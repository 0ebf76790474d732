// Room registry: maps room codes to live sessions.
//
// The registry is a plain owned value constructed at process start and
// injected into whichever transport drives it — no globals. Both transports
// run their registry on a single thread (see `server.rs` / `poll.rs`), so
// create/join/remove on the same code are trivially atomic.
//
// It also hands out process-unique `PlayerId`s, since player identity must
// stay unambiguous across rooms for the polling transport's mailboxes.

use std::collections::HashMap;

use rand::Rng;

use broadside_protocol::types::{PlayerId, RoomCode};

use crate::session::{GameRules, Session};

const CODE_LEN: usize = 6;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub struct Registry {
    rules: GameRules,
    rooms: HashMap<RoomCode, Session>,
    next_player_id: u64,
}

impl Registry {
    pub fn new(rules: GameRules) -> Self {
        Self {
            rules,
            rooms: HashMap::new(),
            next_player_id: 1,
        }
    }

    /// Open a new room under a freshly generated code, unique among live
    /// rooms. With 36^6 possible codes a collision retry is rare enough
    /// that the loop is effectively one iteration.
    pub fn create(&mut self) -> (RoomCode, &mut Session) {
        let mut rng = rand::thread_rng();
        let code = loop {
            let candidate = generate_code(&mut rng);
            if !self.rooms.contains_key(&candidate) {
                break candidate;
            }
        };
        let session = self
            .rooms
            .entry(code.clone())
            .or_insert_with(|| Session::new(self.rules.clone()));
        (code, session)
    }

    pub fn get_mut(&mut self, code: &RoomCode) -> Option<&mut Session> {
        self.rooms.get_mut(code)
    }

    /// Evict a room. Idempotent: removing an unknown code is a no-op.
    pub fn remove(&mut self, code: &RoomCode) {
        self.rooms.remove(code);
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn allocate_player_id(&mut self) -> PlayerId {
        let id = PlayerId(self.next_player_id);
        self.next_player_id += 1;
        id
    }
}

fn generate_code<R: Rng>(rng: &mut R) -> RoomCode {
    let code: String = (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    RoomCode(code)
}
