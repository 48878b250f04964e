use log::{debug, info, warn};

use crate::error::GameError;
use crate::game::Piece;
use crate::models::messages::{frame_event_name, ClientEvent, ServerEvent};
use crate::models::registry::{lock_session, SessionRegistry};
use crate::models::session::{Outgoing, Participant, Session};
use crate::models::{ConnectionId, RoomId};
use crate::websocket::hub::Outbox;

const ROOM_NOT_FOUND: &str = "No room with that id found";

/// Turns one connection's inbound events into room operations.
///
/// Owns the state that has to survive between events of the same connection:
/// which room it sits in and which piece it was last handed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRouter {
    id: ConnectionId,
    assigned_piece: Option<Piece>,
    current_room: Option<RoomId>,
}

impl ConnectionRouter {
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            assigned_piece: None,
            current_room: None,
        }
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn assigned_piece(&self) -> Option<Piece> {
        self.assigned_piece
    }

    pub fn current_room(&self) -> Option<&RoomId> {
        self.current_room.as_ref()
    }

    /// Parses a text frame and dispatches it. Garbage gets an `errorMessage` back,
    /// except a `newRoomJoin` with an unusable payload, which gets `joinError`.
    pub fn handle_text(&mut self, text: &str, registry: &SessionRegistry, outbox: &dyn Outbox) {
        debug!("Received from {}: {}", self.id, text);
        match serde_json::from_str::<ClientEvent>(text) {
            Ok(event) => self.dispatch(event, registry, outbox),
            Err(e) if frame_event_name(text).as_deref() == Some("newRoomJoin") => {
                warn!("Rejected newRoomJoin from {}: {}", self.id, e);
                outbox.send(&self.id, &ServerEvent::JoinError);
            }
            Err(e) => {
                warn!("Error parsing message from {}: {}", self.id, e);
                outbox.send(
                    &self.id,
                    &ServerEvent::ErrorMessage(format!("Invalid message format: {}", e)),
                );
            }
        }
    }

    /// Routes one client event to its handler and reports failures the way
    /// that event's protocol expects.
    pub fn dispatch(&mut self, event: ClientEvent, registry: &SessionRegistry, outbox: &dyn Outbox) {
        let name = event.name();
        let result = match event {
            ClientEvent::NewGame => self.handle_new_game(registry, outbox),
            ClientEvent::Joining { room } => self.handle_joining(room, registry, outbox),
            ClientEvent::NewRoomJoin { room, name } => {
                self.handle_new_room_join(room, name, registry, outbox)
            }
            ClientEvent::Move { room, piece, index } => {
                self.handle_move(room, piece, index, registry, outbox)
            }
            ClientEvent::PlayAgainRequest(room) => self.handle_play_again(room, registry, outbox),
        };

        let Err(err) = result else {
            return;
        };
        warn!("Rejected {} from {}: {}", name, self.id, err);
        match name {
            "newRoomJoin" => outbox.send(&self.id, &ServerEvent::JoinError),
            "joining" => outbox.send(
                &self.id,
                &ServerEvent::ErrorMessage(ROOM_NOT_FOUND.to_string()),
            ),
            // moves and rematch requests are dropped without a reply
            _ => {}
        }
    }

    /// Keeps the cached piece in step with what the server told this connection.
    pub fn observe(&mut self, event: &ServerEvent) {
        match event {
            ServerEvent::PieceAssignment { piece, id } if *id == self.id => {
                self.assigned_piece = Some(*piece);
            }
            ServerEvent::Waiting => self.assigned_piece = None,
            _ => {}
        }
    }

    /// Leaves whatever room the connection was in. Called once the transport is gone.
    pub fn handle_disconnect(&mut self, registry: &SessionRegistry, outbox: &dyn Outbox) {
        if let Some(room) = self.current_room.take() {
            info!("Connection {} dropped while in room {}", self.id, room);
            self.leave_room(&room, registry, outbox);
        }
        self.assigned_piece = None;
    }

    fn handle_new_game(
        &mut self,
        registry: &SessionRegistry,
        outbox: &dyn Outbox,
    ) -> Result<(), GameError> {
        let room = registry.create();
        outbox.send(&self.id, &ServerEvent::NewGameCreated(room));
        Ok(())
    }

    fn handle_joining(
        &mut self,
        room: RoomId,
        registry: &SessionRegistry,
        outbox: &dyn Outbox,
    ) -> Result<(), GameError> {
        if !registry.contains(&room) {
            return Err(GameError::NotFound(room));
        }
        outbox.send(&self.id, &ServerEvent::JoinConfirmed(room));
        Ok(())
    }

    fn handle_new_room_join(
        &mut self,
        room: RoomId,
        name: String,
        registry: &SessionRegistry,
        outbox: &dyn Outbox,
    ) -> Result<(), GameError> {
        if room.trim().is_empty() || name.trim().is_empty() {
            return Err(GameError::Validation("room and name are required".to_string()));
        }
        if self.current_room.as_ref() == Some(&room) {
            debug!("{} is already seated in room {}", self.id, room);
            return Ok(());
        }
        let session = registry
            .get(&room)
            .ok_or_else(|| GameError::NotFound(room.clone()))?;
        // a refused switch must not cost the old seat
        lock_session(&session).can_seat()?;

        if let Some(previous) = self.current_room.take() {
            self.leave_room(&previous, registry, outbox);
        }

        let mut session = lock_session(&session);
        let outgoing = session.join(Participant::new(self.id.clone(), name, room.clone()))?;
        self.current_room = Some(room);
        self.publish(&session, outgoing, outbox);
        Ok(())
    }

    fn handle_move(
        &mut self,
        room: RoomId,
        piece: Piece,
        index: usize,
        registry: &SessionRegistry,
        outbox: &dyn Outbox,
    ) -> Result<(), GameError> {
        self.ensure_seated_in(&room)?;
        let session = registry
            .get(&room)
            .ok_or_else(|| GameError::NotFound(room.clone()))?;

        let mut session = lock_session(&session);
        let outgoing = session.apply_move(&self.id, index, piece)?;
        self.publish(&session, outgoing, outbox);
        Ok(())
    }

    fn handle_play_again(
        &mut self,
        room: RoomId,
        registry: &SessionRegistry,
        outbox: &dyn Outbox,
    ) -> Result<(), GameError> {
        self.ensure_seated_in(&room)?;
        let session = registry
            .get(&room)
            .ok_or_else(|| GameError::NotFound(room.clone()))?;

        let mut session = lock_session(&session);
        let outgoing = session.play_again(&self.id)?;
        self.publish(&session, outgoing, outbox);
        Ok(())
    }

    fn ensure_seated_in(&self, room: &str) -> Result<(), GameError> {
        match &self.current_room {
            Some(current) if current == room => Ok(()),
            _ => Err(GameError::IllegalState(format!(
                "{} is not seated in room {}",
                self.id, room
            ))),
        }
    }

    fn leave_room(&mut self, room: &str, registry: &SessionRegistry, outbox: &dyn Outbox) {
        let Some(session) = registry.get(room) else {
            return;
        };
        let remaining = {
            let mut session = lock_session(&session);
            let Some(outgoing) = session.leave(&self.id) else {
                return;
            };
            self.publish(&session, outgoing, outbox);
            session.participants().len()
        };
        if remaining == 0 {
            registry.remove_if_vacant(room);
        }
    }

    /// Sends a room's events out. Runs while the room lock is held so every
    /// member sees the room's events in the order they happened.
    fn publish(&mut self, session: &Session, outgoing: Vec<Outgoing>, outbox: &dyn Outbox) {
        let members = session.member_ids();
        for item in outgoing {
            match item {
                Outgoing::Direct(to, event) => {
                    if to == self.id {
                        self.observe(&event);
                    }
                    outbox.send(&to, &event);
                }
                Outgoing::Group(event) => {
                    if members.contains(&self.id) {
                        self.observe(&event);
                    }
                    outbox.send_group(&members, &event);
                }
            }
        }
    }
}
