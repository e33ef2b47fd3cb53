//! Maze navigation: carve a maze, walk the player from entry to exit, time it.

mod grid;
mod search;

pub use grid::{CellState, Grid, GridPos, MazeLayout, endpoints, extra_cell_count, generate};
pub use search::{astar, bfs_distance, reachable, repair_connectivity};

use cogkit_core::{CompletionHook, ConfigError, Direction, Session, SessionState, Task};
use cogkit_timing::{Timer, TaskSlot, ms};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

const CLOCK_TICK_NS: u64 = ms(1_000);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MazeConfig {
    /// Cells per side.
    pub maze_size: usize,
    /// Render scale in pixels per cell.
    pub cell_size: u32,
    /// Looseness in `[0, 1]`; lower values punch more extra openings.
    pub complexity: f64,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            maze_size: 15,
            cell_size: 30,
            complexity: 0.5,
        }
    }
}

impl MazeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::at_least("mazeSize", self.maze_size as u64, 3)?;
        ConfigError::at_least("cellSize", self.cell_size as u64, 1)?;
        if !(0.0..=1.0).contains(&self.complexity) {
            return Err(ConfigError::OutOfRange {
                field: "complexity",
                min: 0.0,
                max: 1.0,
                value: self.complexity,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MazeOutcome {
    /// Milliseconds from start to reaching the exit.
    #[serde(rename = "time")]
    pub time_ms: u64,
    pub completed: bool,
}

/// Everything the presentation layer needs for one frame.
#[derive(Debug, Clone)]
pub struct MazeScene {
    pub grid: Arc<Grid>,
    pub cell_size: u32,
    pub entry: GridPos,
    pub exit: GridPos,
    pub player: GridPos,
    pub elapsed_secs: u64,
    pub state: SessionState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum MazeEvent {
    ClockTick,
}

pub struct MazeTask<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    pub config: MazeConfig,
    timer: T,
    rng: R,
    grid: Arc<Grid>,
    entry: GridPos,
    exit: GridPos,
    player: GridPos,
    repaired: bool,
    session: Session,
    elapsed_secs: u64,
    slot: TaskSlot<MazeEvent>,
    on_complete: CompletionHook<MazeOutcome>,
}

impl<T, R> MazeTask<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    pub fn new(config: MazeConfig, timer: T, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut task = Self {
            config,
            timer,
            rng,
            grid: Arc::new(Grid::filled(0, 0, CellState::Wall)),
            entry: GridPos::new(0, 0),
            exit: GridPos::new(0, 0),
            player: GridPos::new(0, 0),
            repaired: false,
            session: Session::new(),
            elapsed_secs: 0,
            slot: TaskSlot::new(),
            on_complete: CompletionHook::none(),
        };
        task.regenerate();
        Ok(task)
    }

    pub fn with_on_complete(mut self, hook: impl FnMut(&MazeOutcome) + 'static) -> Self {
        self.on_complete = CompletionHook::new(hook);
        self
    }

    fn regenerate(&mut self) {
        let size = self.config.maze_size;
        let layout = generate(size, size, self.config.complexity, &mut self.rng);
        self.entry = layout.entry;
        self.exit = layout.exit;
        self.player = layout.entry;
        self.repaired = layout.repaired;
        self.grid = Arc::new(layout.grid);
    }

    /// Idle -> Active; starts the elapsed clock and its 1 Hz display tick.
    pub fn start(&mut self) -> bool {
        let now = self.timer.now();
        if !self.session.start(now) {
            return false;
        }
        self.elapsed_secs = 0;
        self.slot.schedule(now + CLOCK_TICK_NS, MazeEvent::ClockTick);
        info!(size = self.config.maze_size, "maze session started");
        true
    }

    /// Step the player one cell. Walls, edges and finished sessions swallow
    /// the move. The first accepted move of an idle session starts it.
    pub fn move_player(&mut self, dir: Direction) -> bool {
        if self.session.state().is_completed() {
            return false;
        }
        let Some(target) = self.grid.offset(self.player, dir, 1) else {
            return false;
        };
        if !self.grid.is_path(target) {
            return false;
        }
        if self.session.state().is_idle() {
            self.start();
        }
        self.player = target;
        if self.player == self.exit {
            self.finish();
        }
        true
    }

    /// `move(dx, dy)` form; only unit orthogonal steps are meaningful.
    pub fn move_by(&mut self, dx: i32, dy: i32) -> bool {
        Direction::from_delta(dx, dy).is_some_and(|dir| self.move_player(dir))
    }

    fn finish(&mut self) {
        let now = self.timer.now();
        if !self.session.complete(now) {
            return;
        }
        self.slot.cancel();
        self.elapsed_secs = self.session.elapsed_ns(now) / CLOCK_TICK_NS;
        let outcome = self.result();
        info!(time_ms = outcome.time_ms, "maze completed");
        self.on_complete.fire(&outcome);
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> GridPos {
        self.player
    }

    pub fn entry(&self) -> GridPos {
        self.entry
    }

    pub fn exit(&self) -> GridPos {
        self.exit
    }

    /// Shortest route from the player's cell to the exit, both ends included.
    pub fn solve(&self) -> Option<Vec<GridPos>> {
        astar(&self.grid, self.player, self.exit)
    }

    pub fn was_repaired(&self) -> bool {
        self.repaired
    }

    /// Whole seconds shown by the live clock.
    pub fn elapsed_display_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn time_ms(&self) -> u64 {
        self.session.elapsed_ms(self.timer.now())
    }
}

impl<T, R> Task for MazeTask<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    type Outcome = MazeOutcome;
    type Scene = MazeScene;

    fn reset(&mut self) {
        self.slot.cancel();
        self.regenerate();
        self.session = Session::new();
        self.elapsed_secs = 0;
        self.on_complete.rearm();
        debug!("maze reset");
    }

    fn tick(&mut self) {
        let now = self.timer.now();
        while let Some((due, MazeEvent::ClockTick)) = self.slot.poll(now) {
            if !self.session.state().is_active() {
                break;
            }
            self.elapsed_secs = self.session.elapsed_ns(due) / CLOCK_TICK_NS;
            self.slot.schedule(due + CLOCK_TICK_NS, MazeEvent::ClockTick);
        }
    }

    fn session_state(&self) -> SessionState {
        self.session.state()
    }

    fn result(&self) -> MazeOutcome {
        MazeOutcome {
            time_ms: self.time_ms(),
            completed: self.session.state().is_completed(),
        }
    }

    fn scene(&self) -> MazeScene {
        MazeScene {
            grid: Arc::clone(&self.grid),
            cell_size: self.config.cell_size,
            entry: self.entry,
            exit: self.exit,
            player: self.player,
            elapsed_secs: self.elapsed_secs,
            state: self.session.state(),
        }
    }
}
