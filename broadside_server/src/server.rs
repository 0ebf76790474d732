// TCP server and main event loop: the push transport.
//
// Architecture: thread-per-reader with a central `mpsc` channel.
//
// - **Listener thread** (`TcpListener::accept()` loop): accepts new TCP
//   connections and sends `InternalEvent::NewConnection` to the main thread.
// - **Reader threads** (one per client): call `framing::read_message()` in a
//   loop, deserialize `ClientMessage`, and send `InternalEvent::MessageFrom`
//   to the main thread. On error/EOF, send `InternalEvent::Disconnected`.
// - **Main thread**: owns the `Registry` (and through it every `Session`)
//   plus all client write halves, receives events from the channel, and
//   dispatches them one at a time. Exactly one mutation is ever in flight,
//   so two simultaneous moves resolve to one accepted and one `NotYourTurn`
//   rejection, never both applied. Independent rooms still interleave fairly
//   since each event is a single cheap state transition.
//
// The first frame on a connection must be `CreateRoom` or `JoinRoom`; it is
// handled synchronously on the main thread, which assigns the `PlayerId`
// that tags that connection's reader thread from then on. The main thread is
// the only writer to client TCP streams. Reader threads only read.
//
// Game rules live entirely in `session.rs` — this module only translates
// frames to operations and events back to frames.

use std::collections::HashMap;
use std::io::{BufReader, BufWriter};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use broadside_protocol::framing::{read_message, write_message};
use broadside_protocol::message::{ClientMessage, ServerMessage};
use broadside_protocol::types::{PlayerId, RoomCode};

use crate::errors::GameError;
use crate::registry::Registry;
use crate::session::{GameRules, MoveData, Outbound};

/// Events sent from listener/reader threads to the main thread.
enum InternalEvent {
    NewConnection {
        stream: TcpStream,
    },
    MessageFrom {
        player_id: PlayerId,
        message: ClientMessage,
    },
    /// A frame arrived but its payload failed to parse. The framing layer
    /// stays in sync, so the connection survives with an error reply.
    Malformed {
        player_id: PlayerId,
    },
    Disconnected {
        player_id: PlayerId,
    },
}

/// Handle returned by `start_server` to control the running server.
pub struct ServerHandle {
    keep_running: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ServerHandle {
    /// Signal the server to stop and wait for it to shut down.
    pub fn stop(self) {
        self.keep_running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread {
            let _ = handle.join();
        }
    }
}

/// Configuration for starting a server.
pub struct ServerConfig {
    pub port: u16,
    pub rules: GameRules,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            rules: GameRules::default(),
        }
    }
}

/// Start the server on a background thread. Returns a handle for stopping
/// it and the actual bound address (useful when port 0 is used to let the
/// OS pick a free port).
pub fn start_server(config: ServerConfig) -> std::io::Result<(ServerHandle, SocketAddr)> {
    let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port))?;
    let addr = listener.local_addr()?;
    let keep_running = Arc::new(AtomicBool::new(true));
    let keep_running_clone = keep_running.clone();

    let thread = thread::spawn(move || {
        run_server(listener, config, keep_running_clone);
    });

    Ok((
        ServerHandle {
            keep_running,
            thread: Some(thread),
        },
        addr,
    ))
}

/// Everything the main thread owns: the room registry plus the write half
/// and room membership of every connected player.
struct Gateway {
    registry: Registry,
    writers: HashMap<PlayerId, BufWriter<TcpStream>>,
    membership: HashMap<PlayerId, RoomCode>,
}

impl Gateway {
    fn new(rules: GameRules) -> Self {
        Self {
            registry: Registry::new(rules),
            writers: HashMap::new(),
            membership: HashMap::new(),
        }
    }

    /// Send one message to one player. Write errors are logged and ignored;
    /// the reader thread will detect the broken pipe and disconnect.
    fn deliver(&mut self, player_id: PlayerId, msg: &ServerMessage) {
        if let Some(writer) = self.writers.get_mut(&player_id)
            && let Err(e) = send_message(writer, msg)
        {
            log::warn!("write to {player_id:?} failed: {e}");
        }
    }

    fn deliver_all(&mut self, events: Vec<Outbound>) {
        for out in events {
            self.deliver(out.to, &out.event);
        }
    }

    /// Handle the first frame of a fresh connection. Returns the assigned
    /// player ID if the connection was seated (and should get a reader
    /// thread), or `None` if it was rejected and should be dropped.
    fn handshake(&mut self, stream: TcpStream, message: ClientMessage) -> Option<PlayerId> {
        match message {
            ClientMessage::CreateRoom { player_name } => {
                let player_id = self.registry.allocate_player_id();
                let (room_code, session) = self.registry.create();
                let (seat, events) = session.join(player_id, player_name.clone()).ok()?;
                log::info!("room {room_code} created by {player_name:?}");
                self.seat_connection(stream, player_id, room_code.clone());
                self.deliver(
                    player_id,
                    &ServerMessage::RoomCreated {
                        room_code,
                        seat,
                        player_id,
                    },
                );
                self.deliver_all(events);
                Some(player_id)
            }
            ClientMessage::JoinRoom {
                room_code,
                player_name,
            } => {
                let player_id = self.registry.allocate_player_id();
                let joined = self
                    .registry
                    .get_mut(&room_code)
                    .ok_or(GameError::RoomNotFound)
                    .and_then(|session| session.join(player_id, player_name));
                match joined {
                    Ok((seat, events)) => {
                        self.seat_connection(stream, player_id, room_code.clone());
                        self.deliver(
                            player_id,
                            &ServerMessage::RoomJoined {
                                room_code,
                                seat,
                                player_id,
                            },
                        );
                        self.deliver_all(events);
                        Some(player_id)
                    }
                    Err(err) => {
                        log::info!("join to {room_code} rejected: {err}");
                        reject(stream, &err.to_string());
                        None
                    }
                }
            }
            // Anything else as a first frame is a protocol violation.
            ClientMessage::Move { .. } | ClientMessage::Goodbye => {
                reject(stream, &GameError::MalformedMessage.to_string());
                None
            }
        }
    }

    fn seat_connection(&mut self, stream: TcpStream, player_id: PlayerId, room_code: RoomCode) {
        self.writers.insert(player_id, BufWriter::new(stream));
        self.membership.insert(player_id, room_code);
    }

    /// Handle a message from a seated player.
    fn handle_message(&mut self, player_id: PlayerId, message: ClientMessage) {
        match message {
            ClientMessage::Move {
                row,
                col,
                horizontal,
            } => {
                let result = self.apply_move(player_id, MoveData {
                    row,
                    col,
                    horizontal,
                });
                match result {
                    Ok(events) => self.deliver_all(events),
                    Err(err) => self.deliver(
                        player_id,
                        &ServerMessage::Error {
                            message: err.to_string(),
                        },
                    ),
                }
            }
            // A second handshake on a live connection is a protocol error.
            ClientMessage::CreateRoom { .. } | ClientMessage::JoinRoom { .. } => {
                self.deliver(
                    player_id,
                    &ServerMessage::Error {
                        message: GameError::MalformedMessage.to_string(),
                    },
                );
            }
            ClientMessage::Goodbye => {
                // Handled in the reader loop as a disconnect.
            }
        }
    }

    fn apply_move(&mut self, player_id: PlayerId, mv: MoveData) -> Result<Vec<Outbound>, GameError> {
        let code = self
            .membership
            .get(&player_id)
            .cloned()
            .ok_or(GameError::PlayerNotFound)?;
        let session = self
            .registry
            .get_mut(&code)
            .ok_or(GameError::RoomNotFound)?;
        let seat = session.seat_of(player_id).ok_or(GameError::PlayerNotFound)?;
        session.apply_move(seat, mv)
    }

    /// Remove a departed player; notify the remaining seat and evict the
    /// room if it emptied.
    fn drop_player(&mut self, player_id: PlayerId) {
        self.writers.remove(&player_id);
        let Some(code) = self.membership.remove(&player_id) else {
            return;
        };
        let Some(session) = self.registry.get_mut(&code) else {
            return;
        };
        let events = session.remove_player(player_id);
        let empty = session.is_empty();
        self.deliver_all(events);
        if empty {
            self.registry.remove(&code);
            log::info!("room {code} emptied, evicted");
        }
    }
}

/// Main server loop. Runs until `keep_running` is set to false.
fn run_server(listener: TcpListener, config: ServerConfig, keep_running: Arc<AtomicBool>) {
    let mut gateway = Gateway::new(config.rules);

    let (tx, rx): (Sender<InternalEvent>, Receiver<InternalEvent>) = mpsc::channel();

    // Set the listener to non-blocking so the accept thread can check
    // keep_running periodically.
    listener.set_nonblocking(true).ok();

    // Listener thread: accepts new connections.
    let keep_running_listener = keep_running.clone();
    let tx_listener = tx.clone();
    thread::spawn(move || {
        while keep_running_listener.load(Ordering::SeqCst) {
            match listener.accept() {
                Ok((stream, _addr)) => {
                    stream.set_nonblocking(false).ok();
                    let _ = tx_listener.send(InternalEvent::NewConnection { stream });
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(50));
                }
                Err(_) => break,
            }
        }
    });

    // Main event loop. The timeout only bounds how long a shutdown request
    // can go unnoticed.
    while keep_running.load(Ordering::SeqCst) {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                handle_event(&mut gateway, event, &tx, &keep_running);
                // Drain any additional events that arrived during handling.
                while let Ok(event) = rx.try_recv() {
                    handle_event(&mut gateway, event, &tx, &keep_running);
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
}

/// Dispatch a single event against the gateway.
fn handle_event(
    gateway: &mut Gateway,
    event: InternalEvent,
    tx: &Sender<InternalEvent>,
    keep_running: &Arc<AtomicBool>,
) {
    match event {
        InternalEvent::NewConnection { stream } => {
            handle_new_connection(gateway, stream, tx, keep_running);
        }
        InternalEvent::MessageFrom { player_id, message } => {
            gateway.handle_message(player_id, message);
        }
        InternalEvent::Malformed { player_id } => {
            gateway.deliver(
                player_id,
                &ServerMessage::Error {
                    message: GameError::MalformedMessage.to_string(),
                },
            );
        }
        InternalEvent::Disconnected { player_id } => {
            gateway.drop_player(player_id);
        }
    }
}

/// Handle a new TCP connection: read the handshake frame, seat the player,
/// and spawn a reader thread.
fn handle_new_connection(
    gateway: &mut Gateway,
    stream: TcpStream,
    tx: &Sender<InternalEvent>,
    keep_running: &Arc<AtomicBool>,
) {
    // Set a read timeout so the handshake doesn't block forever.
    stream.set_read_timeout(Some(Duration::from_secs(5))).ok();

    let mut reader = BufReader::new(match stream.try_clone() {
        Ok(s) => s,
        Err(_) => return,
    });

    let hello_bytes = match read_message(&mut reader) {
        Ok(bytes) => bytes,
        Err(_) => return,
    };

    let hello: ClientMessage = match serde_json::from_slice(&hello_bytes) {
        Ok(msg) => msg,
        Err(_) => {
            reject(stream, &GameError::MalformedMessage.to_string());
            return;
        }
    };

    if let Some(player_id) = gateway.handshake(stream, hello) {
        // Clear read timeout for the long-lived reader loop.
        if let Ok(inner) = reader.get_ref().try_clone() {
            inner.set_read_timeout(None).ok();
        }

        let tx_reader = tx.clone();
        let keep_running_reader = keep_running.clone();
        thread::spawn(move || {
            reader_loop(reader, player_id, tx_reader, keep_running_reader);
        });
    }
}

/// Reader loop for a single client. Runs in its own thread.
fn reader_loop(
    mut reader: BufReader<TcpStream>,
    player_id: PlayerId,
    tx: Sender<InternalEvent>,
    keep_running: Arc<AtomicBool>,
) {
    while keep_running.load(Ordering::SeqCst) {
        match read_message(&mut reader) {
            Ok(bytes) => match serde_json::from_slice::<ClientMessage>(&bytes) {
                Ok(ClientMessage::Goodbye) => {
                    let _ = tx.send(InternalEvent::Disconnected { player_id });
                    break;
                }
                Ok(message) => {
                    let _ = tx.send(InternalEvent::MessageFrom { player_id, message });
                }
                Err(_) => {
                    // Bad payload in an intact frame — recoverable.
                    let _ = tx.send(InternalEvent::Malformed { player_id });
                }
            },
            Err(_) => {
                // Framing error or EOF — disconnect.
                let _ = tx.send(InternalEvent::Disconnected { player_id });
                break;
            }
        }
    }
}

/// Serialize a `ServerMessage` to JSON and write it with length-delimited
/// framing.
fn send_message(writer: &mut BufWriter<TcpStream>, msg: &ServerMessage) -> std::io::Result<()> {
    let json = serde_json::to_vec(msg)?;
    write_message(writer, &json)
}

/// Send a final `Error` to a connection that never got seated, then let the
/// stream drop.
fn reject(stream: TcpStream, message: &str) {
    let mut writer = BufWriter::new(stream);
    let _ = send_message(
        &mut writer,
        &ServerMessage::Error {
            message: message.into(),
        },
    );
}
