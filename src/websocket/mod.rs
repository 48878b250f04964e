pub mod game_handlers;
pub mod handler;
pub mod hub;
pub mod sweeper;

pub use game_handlers::ConnectionRouter;
pub use handler::{ws_index, GameSocket};
pub use hub::{ConnectionHub, Outbox};
