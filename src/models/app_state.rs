use crate::models::registry::SessionRegistry;
use crate::websocket::hub::ConnectionHub;

/// Application state shared between connections
#[derive(Debug, Default)]
pub struct AppState {
    pub registry: SessionRegistry,
    pub hub: ConnectionHub,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}
