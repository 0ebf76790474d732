// broadside_protocol — wire protocol for the Broadside battleship server.
//
// This crate defines the message types, framing, and shared game vocabulary
// used by the server (`broadside_server`) and game clients to communicate.
// It has no dependency on the engine — both transports and the engine speak
// exclusively in these types.
//
// Module overview:
// - `types.rs`:   Core types — `PlayerId`, `RoomCode`, `Seat`, `Cell`,
//                 `Phase`, and the `BoardGrid` alias.
// - `message.rs`: Client-to-server and server-to-client message enums, plus
//                 `PlayerInfo` and the polling transport's `GameSnapshot`.
// - `framing.rs`: Length-delimited framing over any `Read`/`Write` stream:
//                 4-byte big-endian length prefix, then JSON payload.
//
// Design decisions:
// - **JSON serialization.** Human-debuggable and matches the rest of the
//   stack's serde_json usage. Binary framing can be swapped in later if
//   bandwidth matters (it won't for a 7x9 board).
// - **No async runtime.** Uses `std::io::Read`/`Write` for framing,
//   compatible with both blocking TCP streams and buffered wrappers.

pub mod framing;
pub mod message;
pub mod types;

pub use framing::{MAX_MESSAGE_SIZE, read_message, write_message};
pub use message::{ClientMessage, GameSnapshot, PlayerInfo, ServerMessage, empty_grid};
pub use types::{BoardGrid, Cell, Phase, PlayerId, RoomCode, Seat};
