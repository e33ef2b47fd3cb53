use crate::config::{self, ResultSink};
use anyhow::Result;
use clap::ValueEnum;
use cogkit_core::{Direction, Point, SessionState, Task};
use cogkit_render::{FrameStats, SkiaRenderer};
use cogkit_tasks::clock::Hand;
use cogkit_tasks::trail::Release;
use cogkit_tasks::{
    ClockConfig, ClockTask, MazeConfig, MazeTask, NBackConfig, NBackTask, TrailConfig, TrailTask,
};
use cogkit_timing::HighPrecisionTimer;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use tracing::debug;
use winit::keyboard::KeyCode;

/// Canvas edge for the n-back stage, which has no size option.
const NBACK_STAGE: u32 = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TaskKind {
    Maze,
    #[value(name = "nback")]
    NBack,
    Clock,
    Trail,
}

impl TaskKind {
    pub fn name(self) -> &'static str {
        match self {
            TaskKind::Maze => "maze",
            TaskKind::NBack => "nback",
            TaskKind::Clock => "clock",
            TaskKind::Trail => "trail",
        }
    }

    /// The effective config for this task as pretty JSON.
    pub fn config_json(self, path: Option<&Path>) -> Result<String> {
        let text = match self {
            TaskKind::Maze => serde_json::to_string_pretty(&config::load::<MazeConfig>(path)?)?,
            TaskKind::NBack => serde_json::to_string_pretty(&config::load::<NBackConfig>(path)?)?,
            TaskKind::Clock => serde_json::to_string_pretty(&config::load::<ClockConfig>(path)?)?,
            TaskKind::Trail => serde_json::to_string_pretty(&config::load::<TrailConfig>(path)?)?,
        };
        Ok(text)
    }
}

/// The one engine the host is running.
pub enum ActiveTask {
    Maze(MazeTask<HighPrecisionTimer, StdRng>),
    NBack(NBackTask<HighPrecisionTimer, StdRng>),
    Clock(ClockTask<HighPrecisionTimer>),
    Trail(TrailTask<HighPrecisionTimer, StdRng>),
}

impl ActiveTask {
    pub fn build(
        kind: TaskKind,
        config_path: Option<&Path>,
        results: Option<PathBuf>,
        timer: HighPrecisionTimer,
        rng: StdRng,
    ) -> Result<Self> {
        let sink = ResultSink::new(kind.name(), results);
        let task = match kind {
            TaskKind::Maze => {
                let task = MazeTask::new(config::load(config_path)?, timer, rng)?;
                ActiveTask::Maze(task.with_on_complete(move |o| sink.publish(o)))
            }
            TaskKind::NBack => {
                let task = NBackTask::new(config::load(config_path)?, timer, rng)?;
                ActiveTask::NBack(task.with_on_complete(move |o| sink.publish(o)))
            }
            TaskKind::Clock => {
                let task = ClockTask::new(config::load(config_path)?, timer)?;
                ActiveTask::Clock(task.with_on_complete(move |o| sink.publish(o)))
            }
            TaskKind::Trail => {
                let task = TrailTask::new(config::load(config_path)?, timer, rng)?;
                ActiveTask::Trail(task.with_on_complete(move |o| sink.publish(o)))
            }
        };
        Ok(task)
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        match self {
            ActiveTask::Maze(t) => {
                let edge = t.config.maze_size as u32 * t.config.cell_size;
                (edge, edge)
            }
            ActiveTask::NBack(_) => (NBACK_STAGE, NBACK_STAGE),
            ActiveTask::Clock(t) => (t.config.clock_size, t.config.clock_size),
            ActiveTask::Trail(t) => (t.config.grid_size, t.config.grid_size),
        }
    }

    pub fn tick(&mut self) {
        match self {
            ActiveTask::Maze(t) => t.tick(),
            ActiveTask::NBack(t) => t.tick(),
            ActiveTask::Clock(t) => t.tick(),
            ActiveTask::Trail(t) => t.tick(),
        }
    }

    pub fn reset(&mut self) {
        match self {
            ActiveTask::Maze(t) => t.reset(),
            ActiveTask::NBack(t) => t.reset(),
            ActiveTask::Clock(t) => t.reset(),
            ActiveTask::Trail(t) => t.reset(),
        }
    }

    pub fn state(&self) -> SessionState {
        match self {
            ActiveTask::Maze(t) => t.session_state(),
            ActiveTask::NBack(t) => t.session_state(),
            ActiveTask::Clock(t) => t.session_state(),
            ActiveTask::Trail(t) => t.session_state(),
        }
    }

    pub fn render(
        &self,
        renderer: &mut SkiaRenderer,
        frame: &mut [u8],
        timer: &mut HighPrecisionTimer,
    ) -> Result<FrameStats> {
        match self {
            ActiveTask::Maze(t) => renderer.render_frame(&t.scene(), frame, timer),
            ActiveTask::NBack(t) => renderer.render_frame(&t.scene(), frame, timer),
            ActiveTask::Clock(t) => renderer.render_frame(&t.scene(), frame, timer),
            ActiveTask::Trail(t) => renderer.render_frame(&t.scene(), frame, timer),
        }
    }

    /// Task-specific keys. Returns whether the key did anything.
    pub fn key(&mut self, key: KeyCode) -> bool {
        match self {
            ActiveTask::Maze(t) => {
                let dir = match key {
                    KeyCode::ArrowUp | KeyCode::KeyW => Direction::Up,
                    KeyCode::ArrowDown | KeyCode::KeyS => Direction::Down,
                    KeyCode::ArrowLeft | KeyCode::KeyA => Direction::Left,
                    KeyCode::ArrowRight | KeyCode::KeyD => Direction::Right,
                    _ => return false,
                };
                t.move_player(dir)
            }
            ActiveTask::NBack(t) if key == KeyCode::Space => {
                if t.session_state().is_idle() {
                    t.start()
                } else {
                    t.signal_match().is_some()
                }
            }
            ActiveTask::Clock(t) if matches!(key, KeyCode::Enter | KeyCode::NumpadEnter) => {
                t.submit().is_some()
            }
            _ => false,
        }
    }

    pub fn pointer_down(&mut self, at: Point) {
        match self {
            ActiveTask::Clock(t) => {
                if let Some(hand) = t.press(at) {
                    debug!(?hand, "hand captured");
                }
            }
            ActiveTask::Trail(t) => {
                t.press(at);
            }
            _ => {}
        }
    }

    pub fn pointer_moved(&mut self, at: Point) {
        match self {
            ActiveTask::Clock(t) => {
                t.drag(at);
            }
            ActiveTask::Trail(t) => t.move_pointer(at),
            _ => {}
        }
    }

    pub fn pointer_up(&mut self, at: Point) {
        match self {
            ActiveTask::Clock(t) => t.release(),
            ActiveTask::Trail(t) => {
                if let Some(Release::Error(id)) = t.release(at) {
                    debug!(dot = id, "wrong dot");
                }
            }
            _ => {}
        }
    }

    /// Window title doubling as the status line.
    pub fn title(&self) -> String {
        match self {
            ActiveTask::Maze(t) => match t.session_state() {
                SessionState::Idle => "Maze | arrow keys to move".to_string(),
                SessionState::Active => format!("Maze | {} s", t.elapsed_display_secs()),
                SessionState::Completed => {
                    format!("Maze | done in {:.1} s | R to retry", t.result().time_ms as f64 / 1e3)
                }
            },
            ActiveTask::NBack(t) => {
                let n = t.config.n_value;
                match t.session_state() {
                    SessionState::Idle => format!("{n}-back | SPACE to start"),
                    SessionState::Active => format!("{n}-back | SPACE on a match"),
                    SessionState::Completed => {
                        let s = t.result();
                        format!(
                            "{n}-back | {}% ({} correct, {} wrong, {} missed)",
                            s.percentage_score, s.correct, s.incorrect, s.missed
                        )
                    }
                }
            }
            ActiveTask::Clock(t) => {
                let target = &t.config.target_time;
                if t.session_state().is_completed() {
                    format!("Clock {target} | score {}", t.result().score)
                } else {
                    let held = match t.scene().captured {
                        Some(Hand::Hour) => " | hour hand",
                        Some(Hand::Minute) => " | minute hand",
                        None => "",
                    };
                    format!("Clock | set {target}, ENTER to submit{held}")
                }
            }
            ActiveTask::Trail(t) => {
                if t.session_state().is_completed() {
                    let o = t.result();
                    format!(
                        "Trail | {:.1} s, {} errors",
                        o.time_ms as f64 / 1e3,
                        o.errors
                    )
                } else {
                    format!(
                        "Trail | drag from {} to {} | {} errors",
                        t.current_index(),
                        t.current_index() + 1,
                        t.errors()
                    )
                }
            }
        }
    }
}
