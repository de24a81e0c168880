pub mod room_manager;

pub use room_manager::*;
