use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

use crate::error::GameError;
use crate::game::{assign_pieces, BoardPhase, GameBoard, Piece};
use crate::models::messages::ServerEvent;
use crate::models::{ConnectionId, RoomId};

/// Rooms seat exactly two players
pub const ROOM_CAPACITY: usize = 2;

/// A connection seated in a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub connection_id: ConnectionId,
    pub display_name: String,
    /// `None` until the room fills up
    pub piece: Option<Piece>,
    /// Room this participant sits in
    pub room_id: RoomId,
}

impl Participant {
    pub fn new(connection_id: ConnectionId, display_name: String, room_id: RoomId) -> Self {
        Self {
            connection_id,
            display_name,
            piece: None,
            room_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Empty,
    /// One player seated, waiting for an opponent
    Waiting,
    Active,
    /// Won or drawn, waiting for a rematch
    Ended,
}

/// Who an outgoing event is addressed to
#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    /// A single connection
    Direct(ConnectionId, ServerEvent),
    /// Everyone currently seated in the room
    Group(ServerEvent),
}

/// A room: up to two participants sharing one board.
///
/// Every operation is a plain state transition that returns the events to
/// publish; the caller holds the room's lock while applying and publishing them.
#[derive(Debug)]
pub struct Session {
    id: RoomId,
    participants: Vec<Participant>,
    board: Option<GameBoard>,
    phase: SessionPhase,
    retired: bool,
    rng: StdRng,
    last_activity: Instant,
}

impl Session {
    pub fn new(id: RoomId, seed: u64) -> Self {
        Self {
            id,
            participants: Vec::with_capacity(ROOM_CAPACITY),
            board: None,
            phase: SessionPhase::Empty,
            retired: false,
            rng: StdRng::seed_from_u64(seed),
            last_activity: Instant::now(),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn board(&self) -> Option<&GameBoard> {
        self.board.as_ref()
    }

    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    /// Set once the room has been dropped from the registry
    pub fn is_retired(&self) -> bool {
        self.retired
    }

    pub(crate) fn retire(&mut self) {
        self.retired = true;
    }

    pub fn member_ids(&self) -> Vec<ConnectionId> {
        self.participants
            .iter()
            .map(|p| p.connection_id.clone())
            .collect()
    }

    pub fn participant(&self, connection_id: &str) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.connection_id == connection_id)
    }

    /// Whether a newcomer would get a seat right now. Changes nothing.
    pub fn can_seat(&self) -> Result<(), GameError> {
        if self.retired {
            return Err(GameError::NotFound(self.id.clone()));
        }
        if self.participants.len() >= ROOM_CAPACITY {
            return Err(GameError::Capacity(self.id.clone()));
        }
        Ok(())
    }

    /// Seats a new participant.
    ///
    /// A full room rejects the newcomer and is left exactly as it was.
    pub fn join(&mut self, participant: Participant) -> Result<Vec<Outgoing>, GameError> {
        self.can_seat()?;
        if self.participant(&participant.connection_id).is_some() {
            return Err(GameError::IllegalState(format!(
                "{} is already seated in room {}",
                participant.connection_id, self.id
            )));
        }

        info!(
            "Player {} ({}) joined room {}",
            participant.connection_id, participant.display_name, self.id
        );
        self.participants.push(participant);
        self.touch();

        if self.participants.len() < ROOM_CAPACITY {
            self.phase = SessionPhase::Waiting;
            return Ok(vec![Outgoing::Group(ServerEvent::Waiting)]);
        }

        let mut outgoing = self.assign_pieces();
        let board = GameBoard::new();
        let players = self
            .participants
            .iter()
            .map(|p| (p.connection_id.clone(), p.display_name.clone()))
            .collect();
        outgoing.push(Outgoing::Group(ServerEvent::Starting {
            game_state: *board.cells(),
            players,
            turn: board.turn(),
        }));
        self.board = Some(board);
        self.phase = SessionPhase::Active;
        info!("Room {} is full, game starting", self.id);

        Ok(outgoing)
    }

    /// Plays `piece` at `index` on behalf of `connection_id`.
    ///
    /// Exactly one of `winner`, `draw` or `update` is published on success.
    /// Nothing changes on failure.
    pub fn apply_move(
        &mut self,
        connection_id: &str,
        index: usize,
        piece: Piece,
    ) -> Result<Vec<Outgoing>, GameError> {
        let mover = self.participant(connection_id).ok_or_else(|| {
            GameError::IllegalState(format!("{} is not seated in room {}", connection_id, self.id))
        })?;
        let mover_piece = mover.piece;
        let Some(board) = self.board.as_mut() else {
            return Err(GameError::IllegalState(format!(
                "room {} has no game in progress",
                self.id
            )));
        };
        if self.phase == SessionPhase::Ended {
            return Err(GameError::IllegalState(format!(
                "game in room {} is over",
                self.id
            )));
        }
        if mover_piece != Some(piece) {
            return Err(GameError::IllegalMove(format!(
                "{} does not play {}",
                connection_id, piece
            )));
        }

        board.make_move(index, piece)?;

        let event = match board.phase() {
            BoardPhase::Won(_) => {
                info!("{} ({}) wins in room {}", connection_id, piece, self.id);
                ServerEvent::Winner {
                    game_state: *board.cells(),
                    id: connection_id.to_string(),
                }
            }
            BoardPhase::Draw => {
                info!("Room {} ends in a draw", self.id);
                ServerEvent::Draw {
                    game_state: *board.cells(),
                }
            }
            BoardPhase::Active => {
                board.switch_turn()?;
                ServerEvent::Update {
                    game_state: *board.cells(),
                    turn: board.turn(),
                }
            }
        };
        if board.phase() != BoardPhase::Active {
            self.phase = SessionPhase::Ended;
        }
        self.touch();

        Ok(vec![Outgoing::Group(event)])
    }

    /// Starts a rematch on the same board with freshly drawn pieces.
    ///
    /// A request while the game is still running is ignored.
    pub fn play_again(&mut self, connection_id: &str) -> Result<Vec<Outgoing>, GameError> {
        if self.participant(connection_id).is_none() {
            return Err(GameError::IllegalState(format!(
                "{} is not seated in room {}",
                connection_id, self.id
            )));
        }
        if self.board.is_none() {
            return Err(GameError::IllegalState(format!(
                "room {} has no game to restart",
                self.id
            )));
        }
        if self.phase == SessionPhase::Active {
            return Ok(Vec::new());
        }

        let mut outgoing = self.assign_pieces();
        let board = self.board.get_or_insert_with(GameBoard::new);
        board.reset();
        outgoing.push(Outgoing::Group(ServerEvent::Restart {
            game_state: *board.cells(),
            turn: board.turn(),
        }));
        self.phase = SessionPhase::Active;
        self.touch();
        info!("Room {} restarted", self.id);

        Ok(outgoing)
    }

    /// Removes a participant. Returns `None` if the connection was not seated here.
    ///
    /// The board is thrown away; a lone remaining player goes back to waiting.
    pub fn leave(&mut self, connection_id: &str) -> Option<Vec<Outgoing>> {
        let position = self
            .participants
            .iter()
            .position(|p| p.connection_id == connection_id)?;
        self.participants.remove(position);
        self.board = None;
        self.touch();
        info!("Player {} left room {}", connection_id, self.id);

        match self.participants.len() {
            0 => {
                self.phase = SessionPhase::Empty;
                Some(Vec::new())
            }
            _ => {
                for participant in &mut self.participants {
                    participant.piece = None;
                }
                self.phase = SessionPhase::Waiting;
                Some(vec![Outgoing::Group(ServerEvent::Waiting)])
            }
        }
    }

    fn assign_pieces(&mut self) -> Vec<Outgoing> {
        let (first, second) = assign_pieces(self.rng.random());
        let mut outgoing = Vec::with_capacity(ROOM_CAPACITY + 1);
        for (participant, piece) in self.participants.iter_mut().zip([first, second]) {
            participant.piece = Some(piece);
            outgoing.push(Outgoing::Direct(
                participant.connection_id.clone(),
                ServerEvent::PieceAssignment {
                    piece,
                    id: participant.connection_id.clone(),
                },
            ));
        }
        outgoing
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}
