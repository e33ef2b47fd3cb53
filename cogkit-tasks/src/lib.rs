//! The four assessment engines. Each module pairs pure generation and
//! scoring functions with a `*Task` controller driven by the host loop.

pub mod clock;
pub mod maze;
pub mod nback;
pub mod trail;

pub use clock::{ClockConfig, ClockOutcome, ClockScene, ClockTask};
pub use maze::{MazeConfig, MazeOutcome, MazeScene, MazeTask};
pub use nback::{NBackConfig, NBackScene, NBackScore, NBackTask};
pub use trail::{TrailConfig, TrailOutcome, TrailScene, TrailTask};
