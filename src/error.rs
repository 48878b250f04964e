use thiserror::Error;

use crate::models::RoomId;

/// Everything that can go wrong while handling a client event.
///
/// None of these are fatal: the router reports them to the offending
/// connection (or drops them silently) and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Missing or empty fields in a client payload
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("No room with id {0}")]
    NotFound(RoomId),

    /// The room already seats two players
    #[error("Room {0} is full")]
    Capacity(RoomId),

    #[error("Illegal move: {0}")]
    IllegalMove(String),

    #[error("Illegal state: {0}")]
    IllegalState(String),
}
