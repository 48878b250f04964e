use actix::Recipient;
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use crate::models::messages::ServerEvent;
use crate::models::ConnectionId;

/// Where the game logic sends events. The only thing it needs from the transport.
pub trait Outbox {
    /// Queues `event` for one connection. Unknown connections are skipped.
    fn send(&self, to: &str, event: &ServerEvent);

    /// Queues `event` for every connection in `members`, in order.
    fn send_group(&self, members: &[ConnectionId], event: &ServerEvent) {
        for member in members {
            self.send(member, event);
        }
    }
}

/// Mailboxes of every open WebSocket connection
#[derive(Default)]
pub struct ConnectionHub {
    connections: Mutex<HashMap<ConnectionId, Recipient<ServerEvent>>>,
}

impl fmt::Debug for ConnectionHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHub")
            .field("connections", &self.len())
            .finish()
    }
}

impl ConnectionHub {
    pub fn register(&self, id: ConnectionId, recipient: Recipient<ServerEvent>) {
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, recipient);
    }

    pub fn unregister(&self, id: &str) {
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
    }

    pub fn len(&self) -> usize {
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Outbox for ConnectionHub {
    fn send(&self, to: &str, event: &ServerEvent) {
        let connections = self
            .connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match connections.get(to) {
            Some(recipient) => {
                debug!("Sending {} to connection {}", event.name(), to);
                recipient.do_send(event.clone());
            }
            None => warn!("Connection {} not found, dropping {}", to, event.name()),
        }
    }
}
