pub mod app_state;
pub mod messages;
pub mod registry;
pub mod session;

/// Opaque room identifier (a v4 UUID in practice)
pub type RoomId = String;
/// Opaque per-connection identifier, unique while the connection is open
pub type ConnectionId = String;

// Re-export important types
pub use app_state::*;
pub use messages::*;
pub use registry::*;
pub use session::*;
