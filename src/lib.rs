pub mod ai;
pub mod config;
pub mod error;
pub mod game;
pub mod session;
pub mod skills;

pub use config::{Config, SystemLimits};
pub use error::{AIError, GameError, Result, SkillPoolError};
pub use game::{GameEngine, GameState, Position, Stone};
pub use session::{RoomManager, RoomOptions};
