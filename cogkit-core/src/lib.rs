pub mod error;
pub mod geometry;
pub mod session;
pub mod task;

pub use error::ConfigError;
pub use geometry::{Direction, Point};
pub use session::{Session, SessionState};
pub use task::{CompletionHook, Task};
