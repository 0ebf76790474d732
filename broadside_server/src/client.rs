// TCP client for connecting to a Broadside server.
//
// Provides a non-blocking interface for a front end (or an integration
// test) to drive a game. Architecture:
// - `create_room()` / `join_room()` perform TCP connect + handshake on the
//   calling thread, then spawn a background reader thread.
// - The reader thread calls `read_message()` in a loop, deserializes
//   `ServerMessage`, and pushes into an `mpsc` channel.
// - The caller holds a `BufWriter<TcpStream>` for sending.
// - `poll()` drains the inbox non-blocking, returning all queued messages.
//
// This separation means the caller never blocks on network I/O. The reader
// thread handles the blocking reads, and the writer flushes synchronously
// (acceptable for the small messages we send).

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use broadside_protocol::framing::{read_message, write_message};
use broadside_protocol::message::{ClientMessage, ServerMessage};
use broadside_protocol::types::{PlayerId, RoomCode, Seat};

/// Identity established by a successful handshake.
#[derive(Clone, Debug)]
pub struct SeatInfo {
    pub room_code: RoomCode,
    pub seat: Seat,
    pub player_id: PlayerId,
}

/// TCP client for one player's connection.
#[derive(Debug)]
pub struct GameClient {
    writer: BufWriter<TcpStream>,
    inbox: Receiver<ServerMessage>,
    _reader_thread: Option<JoinHandle<()>>,
    pub seat_info: SeatInfo,
}

impl GameClient {
    /// Connect and open a new room; the caller becomes seat one.
    pub fn create_room(addr: &str, player_name: &str) -> Result<Self, String> {
        Self::connect(addr, ClientMessage::CreateRoom {
            player_name: player_name.into(),
        })
    }

    /// Connect and join an existing room by code.
    pub fn join_room(addr: &str, code: RoomCode, player_name: &str) -> Result<Self, String> {
        Self::connect(addr, ClientMessage::JoinRoom {
            room_code: code,
            player_name: player_name.into(),
        })
    }

    /// TCP connect, send the handshake, wait for the seat assignment, then
    /// spawn the reader thread.
    fn connect(addr: &str, hello: ClientMessage) -> Result<Self, String> {
        let stream = TcpStream::connect(addr).map_err(|e| format!("connect failed: {e}"))?;

        // Set a read timeout for the handshake.
        stream
            .set_read_timeout(Some(std::time::Duration::from_secs(5)))
            .ok();

        let reader_stream = stream
            .try_clone()
            .map_err(|e| format!("clone failed: {e}"))?;
        let mut writer = BufWriter::new(stream);

        send_msg(&mut writer, &hello).map_err(|e| format!("send handshake failed: {e}"))?;

        let mut reader = BufReader::new(reader_stream);
        let response_bytes =
            read_message(&mut reader).map_err(|e| format!("read seat assignment failed: {e}"))?;
        let response: ServerMessage = serde_json::from_slice(&response_bytes)
            .map_err(|e| format!("parse seat assignment failed: {e}"))?;

        let seat_info = match response {
            ServerMessage::RoomCreated {
                room_code,
                seat,
                player_id,
            }
            | ServerMessage::RoomJoined {
                room_code,
                seat,
                player_id,
            } => SeatInfo {
                room_code,
                seat,
                player_id,
            },
            ServerMessage::Error { message } => {
                return Err(format!("rejected: {message}"));
            }
            other => {
                return Err(format!("unexpected response: {other:?}"));
            }
        };

        // Clear read timeout for the long-lived reader loop.
        if let Ok(inner) = reader.get_ref().try_clone() {
            inner.set_read_timeout(None).ok();
        }

        // Spawn reader thread.
        let (tx, rx) = mpsc::channel();
        let reader_thread = thread::spawn(move || {
            reader_loop(reader, tx);
        });

        Ok(Self {
            writer,
            inbox: rx,
            _reader_thread: Some(reader_thread),
            seat_info,
        })
    }

    /// Submit a move for this player's seat.
    pub fn send_move(&mut self, row: u8, col: u8, horizontal: Option<bool>) -> Result<(), String> {
        let msg = ClientMessage::Move {
            row,
            col,
            horizontal,
        };
        send_msg(&mut self.writer, &msg).map_err(|e| format!("send Move failed: {e}"))
    }

    /// Send Goodbye and close the connection.
    pub fn disconnect(&mut self) {
        let _ = send_msg(&mut self.writer, &ClientMessage::Goodbye);
    }

    /// Drain all queued server messages (non-blocking).
    pub fn poll(&self) -> Vec<ServerMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.inbox.try_recv() {
            messages.push(msg);
        }
        messages
    }
}

/// Serialize a `ClientMessage` to JSON and write with length-delimited
/// framing.
fn send_msg(writer: &mut BufWriter<TcpStream>, msg: &ClientMessage) -> Result<(), String> {
    let json = serde_json::to_vec(msg).map_err(|e| e.to_string())?;
    write_message(writer, &json).map_err(|e| e.to_string())
}

/// Reader thread: read framed messages in a loop, push to channel.
fn reader_loop(mut reader: BufReader<TcpStream>, tx: mpsc::Sender<ServerMessage>) {
    while let Ok(bytes) = read_message(&mut reader) {
        match serde_json::from_slice::<ServerMessage>(&bytes) {
            Ok(msg) => {
                if tx.send(msg).is_err() {
                    break; // Caller dropped the receiver
                }
            }
            Err(_) => break, // Malformed message
        }
    }
}
