pub mod evaluation;
pub mod local_service;
pub mod service;
pub mod strategies;

pub use evaluation::BoardEvaluator;
pub use local_service::*;
pub use service::*;
pub use strategies::*;
