pub mod board;
pub mod utils;

// Re-export important types
pub use board::*;
pub use utils::*;
