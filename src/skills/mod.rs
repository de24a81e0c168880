pub mod definition;
pub mod effects;
pub mod registry;
pub mod pool;

pub use definition::*;
pub use effects::{Actor, SkillContext, SkillOutcome};
pub use registry::*;
pub use pool::*;
