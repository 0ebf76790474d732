// broadside_server — authoritative game-session server for Broadside.
//
// The server arbitrates two-player battleship matches: room membership,
// turn order, ship placement, and shot resolution. Clients are untrusted
// renderers; every rule is enforced here.
//
// Module overview:
// - `board.rs`:    Grid model — cell states, placement and targeting
//                  primitives. Knows nothing about turns or players.
// - `session.rs`:  One room's state machine — seats, boards, phase, turn
//                  pointer, placement progress. Produces per-player events;
//                  holds no transport handles.
// - `registry.rs`: Room-code -> session map with unique code generation and
//                  eviction of deserted rooms.
// - `errors.rs`:   The `GameError` taxonomy. Every kind is recoverable and
//                  rejects exactly one operation.
// - `server.rs`:   Push transport — TCP listener, reader threads (one per
//                  client), and the main event loop. `std::net` with a
//                  thread-per-reader architecture and an `mpsc` channel
//                  funneling events into the single-threaded gateway.
// - `poll.rs`:     Pull transport — request/response driving the same
//                  engine, with per-player event mailboxes drained
//                  at-most-once per poll.
// - `client.rs`:   TCP client used by native front ends and the
//                  integration tests.
//
// Dependencies: `broadside_protocol` (shared message types and framing).
//
// The server can run standalone (`main.rs`, the `broadside` binary) or be
// embedded in another process via the library API (`start_server`).

pub mod board;
pub mod client;
pub mod errors;
pub mod poll;
pub mod registry;
pub mod server;
pub mod session;

pub use server::start_server;
