//! Two-player tic-tac-toe server: rooms, turn order and real-time sync over WebSockets.

pub mod config;
pub mod error;
pub mod game;
pub mod models;
pub mod routes;
pub mod websocket;
