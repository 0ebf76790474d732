// Error taxonomy for the game engine and transports.
//
// Every variant is recoverable at the session boundary: it rejects the one
// offending operation and leaves all state unchanged. Transports convert a
// `GameError` into `ServerMessage::Error { message }` for the offending
// client via `Display` — the strings below are exactly what players see.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("room not found")]
    RoomNotFound,
    #[error("room is full")]
    RoomFull,
    #[error("not your turn")]
    NotYourTurn,
    #[error("no moves allowed in this phase")]
    InvalidPhase,
    #[error("cannot place a ship there")]
    InvalidPlacement,
    #[error("already fired at this cell")]
    DuplicateShot,
    #[error("coordinates are outside the board")]
    InvalidCoordinates,
    #[error("unknown player")]
    PlayerNotFound,
    #[error("malformed message")]
    MalformedMessage,
}
