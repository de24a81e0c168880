pub mod types;
pub mod board;
pub mod rules;
pub mod zones;
pub mod state;
pub mod engine;

pub use types::*;
pub use board::*;
pub use rules::*;
pub use zones::{clean_expired_blocks, is_position_blocked};
pub use state::*;
pub use engine::*;
