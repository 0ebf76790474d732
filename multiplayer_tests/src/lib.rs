// Test-only game client for multiplayer integration tests.
//
// Wraps the real `GameClient` (from `broadside_server::client`) to provide
// a synchronous, test-friendly API for exercising the full pipeline:
// create room -> join -> placement -> battle -> game over.
//
// The only test-specific code here is the blocking wrappers (polling loops
// around `GameClient::poll()`). All networking uses the same code paths as
// a real front end.
//
// See also: `tests/full_pipeline.rs` for the scenarios.

use std::net::SocketAddr;
use std::thread;
use std::time::{Duration, Instant};

use broadside_protocol::message::ServerMessage;
use broadside_protocol::types::{RoomCode, Seat};
use broadside_server::client::GameClient;

/// Default timeout for blocking poll operations.
const POLL_TIMEOUT: Duration = Duration::from_secs(5);

/// Sleep duration between poll attempts.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A test client wrapping a real GameClient.
pub struct TestPlayer {
    client: GameClient,
}

impl TestPlayer {
    /// Connect and create a room.
    pub fn create(addr: SocketAddr, name: &str) -> Self {
        let client = GameClient::create_room(&addr.to_string(), name)
            .expect("TestPlayer::create failed");
        Self { client }
    }

    /// Connect and join an existing room.
    pub fn join(addr: SocketAddr, code: RoomCode, name: &str) -> Self {
        let client = GameClient::join_room(&addr.to_string(), code, name)
            .expect("TestPlayer::join failed");
        Self { client }
    }

    pub fn room_code(&self) -> RoomCode {
        self.client.seat_info.room_code.clone()
    }

    pub fn seat(&self) -> Seat {
        self.client.seat_info.seat
    }

    /// Submit a move for this player's seat.
    pub fn send_move(&mut self, row: u8, col: u8, horizontal: Option<bool>) {
        self.client
            .send_move(row, col, horizontal)
            .expect("send_move failed");
    }

    /// Blocking poll until a message matching `pred` arrives; returns it.
    /// Messages that don't match are discarded, so callers should assert on
    /// the most specific event they care about.
    pub fn wait_for<F>(&mut self, what: &str, mut pred: F) -> ServerMessage
    where
        F: FnMut(&ServerMessage) -> bool,
    {
        let start = Instant::now();
        loop {
            assert!(
                start.elapsed() < POLL_TIMEOUT,
                "timed out waiting for {what}"
            );
            for msg in self.client.poll() {
                if pred(&msg) {
                    return msg;
                }
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Non-blocking: return whatever is queued right now.
    pub fn drain(&mut self) -> Vec<ServerMessage> {
        self.client.poll()
    }

    /// Send Goodbye and close the connection.
    pub fn disconnect(&mut self) {
        self.client.disconnect();
    }
}
