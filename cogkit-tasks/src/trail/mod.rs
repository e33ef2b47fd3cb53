//! Trail making: connect numbered dots in order by dragging between them.

mod placement;

pub use placement::{Dot, DotSet, PlacementRules, generate, generate_with, grid_layout};

use cogkit_core::{CompletionHook, ConfigError, Point, Session, SessionState, Task};
use cogkit_timing::{Timer, ms};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// How long a wrong connection stays on screen.
pub const ERROR_LINE_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrailConfig {
    pub dot_count: usize,
    /// Side of the square canvas in pixels.
    pub grid_size: u32,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            dot_count: 10,
            grid_size: 400,
        }
    }
}

impl TrailConfig {
    pub fn validate(&self, rules: &PlacementRules) -> Result<(), ConfigError> {
        ConfigError::at_least("dotCount", self.dot_count as u64, 2)?;
        ConfigError::at_least(
            "gridSize",
            self.grid_size as u64,
            rules.min_canvas().ceil() as u64,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeLine {
    pub start: Point,
    pub end: Point,
    pub is_error: bool,
    /// Error lines disappear at this timer instant.
    #[serde(skip)]
    pub expires_at: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailOutcome {
    #[serde(rename = "time")]
    pub time_ms: u64,
    pub errors: usize,
    pub completed: bool,
}

/// What a pointer release did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Connected the next dot in order.
    Advanced(usize),
    /// Landed on a wrong dot.
    Error(usize),
    /// Landed on empty canvas or the source dot.
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct TrailScene {
    pub canvas_size: u32,
    pub dot_radius: f64,
    pub dots: Arc<DotSet>,
    pub lines: Vec<StrokeLine>,
    /// Rubber band from the active dot to the pointer.
    pub drag: Option<(Point, Point)>,
    pub current_index: usize,
    pub errors: usize,
    pub state: SessionState,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    from: Point,
    to: Point,
}

pub struct TrailTask<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    pub config: TrailConfig,
    pub rules: PlacementRules,
    timer: T,
    rng: R,
    dots: Arc<DotSet>,
    current_index: usize,
    lines: Vec<StrokeLine>,
    drag: Option<Drag>,
    errors: usize,
    session: Session,
    on_complete: CompletionHook<TrailOutcome>,
}

impl<T, R> TrailTask<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    pub fn new(config: TrailConfig, timer: T, rng: R) -> Result<Self, ConfigError> {
        Self::with_rules(config, PlacementRules::default(), timer, rng)
    }

    pub fn with_rules(
        config: TrailConfig,
        rules: PlacementRules,
        timer: T,
        mut rng: R,
    ) -> Result<Self, ConfigError> {
        config.validate(&rules)?;
        let dots = generate_with(config.dot_count, config.grid_size as f64, &rules, &mut rng);
        Ok(Self {
            config,
            rules,
            timer,
            rng,
            dots: Arc::new(dots),
            current_index: 1,
            lines: Vec::new(),
            drag: None,
            errors: 0,
            session: Session::new(),
            on_complete: CompletionHook::none(),
        })
    }

    pub fn with_on_complete(mut self, hook: impl FnMut(&TrailOutcome) + 'static) -> Self {
        self.on_complete = CompletionHook::new(hook);
        self
    }

    pub fn dots(&self) -> &DotSet {
        &self.dots
    }

    /// Label of the last connected dot; starts at 1.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    pub fn lines(&self) -> &[StrokeLine] {
        &self.lines
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Dot whose hit radius contains `point`, nearest first.
    pub fn dot_at(&self, point: Point) -> Option<Dot> {
        self.dots
            .dots
            .iter()
            .map(|d| (d, d.position.distance(point)))
            .filter(|(_, dist)| *dist <= self.rules.dot_radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(d, _)| *d)
    }

    /// Start a drag; only accepted on the current dot. The first accepted
    /// press starts the session clock.
    pub fn press(&mut self, point: Point) -> bool {
        if self.session.state().is_completed() {
            return false;
        }
        let Some(dot) = self.dots.get(self.current_index).copied() else {
            return false;
        };
        if dot.position.distance(point) > self.rules.dot_radius {
            return false;
        }
        if self.session.start(self.timer.now()) {
            info!(dot_count = self.config.dot_count, "trail session started");
        }
        self.drag = Some(Drag {
            from: dot.position,
            to: point,
        });
        true
    }

    pub fn move_pointer(&mut self, point: Point) {
        if let Some(drag) = self.drag.as_mut() {
            drag.to = point;
        }
    }

    pub fn release(&mut self, point: Point) -> Option<Release> {
        let drag = self.drag.take()?;
        let Some(target) = self.dot_at(point) else {
            return Some(Release::Cancelled);
        };

        if target.id == self.current_index + 1 {
            self.lines.push(StrokeLine {
                start: drag.from,
                end: target.position,
                is_error: false,
                expires_at: None,
            });
            self.current_index = target.id;
            debug!(dot = target.id, "dot connected");
            if self.current_index == self.dots.len() {
                self.finish();
            }
            Some(Release::Advanced(target.id))
        } else if target.id != self.current_index {
            let now = self.timer.now();
            self.lines.push(StrokeLine {
                start: drag.from,
                end: target.position,
                is_error: true,
                expires_at: Some(now + ms(ERROR_LINE_MS)),
            });
            self.errors += 1;
            debug!(dot = target.id, expected = self.current_index + 1, "wrong dot");
            Some(Release::Error(target.id))
        } else {
            Some(Release::Cancelled)
        }
    }

    fn finish(&mut self) {
        let now = self.timer.now();
        if !self.session.complete(now) {
            return;
        }
        let outcome = self.result();
        info!(time_ms = outcome.time_ms, errors = outcome.errors, "trail completed");
        self.on_complete.fire(&outcome);
    }
}

impl<T, R> Task for TrailTask<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    type Outcome = TrailOutcome;
    type Scene = TrailScene;

    fn reset(&mut self) {
        self.lines.clear();
        self.drag = None;
        let dots = generate_with(
            self.config.dot_count,
            self.config.grid_size as f64,
            &self.rules,
            &mut self.rng,
        );
        self.dots = Arc::new(dots);
        self.current_index = 1;
        self.errors = 0;
        self.session = Session::new();
        self.on_complete.rearm();
        debug!("trail reset");
    }

    /// Drop error lines whose display time is over.
    fn tick(&mut self) {
        let now = self.timer.now();
        self.lines
            .retain(|line| line.expires_at.is_none_or(|at| at > now));
    }

    fn session_state(&self) -> SessionState {
        self.session.state()
    }

    fn result(&self) -> TrailOutcome {
        TrailOutcome {
            time_ms: self.session.elapsed_ms(self.timer.now()),
            errors: self.errors,
            completed: self.session.state().is_completed(),
        }
    }

    fn scene(&self) -> TrailScene {
        TrailScene {
            canvas_size: self.config.grid_size,
            dot_radius: self.rules.dot_radius,
            dots: Arc::clone(&self.dots),
            lines: self.lines.clone(),
            drag: self.drag.map(|d| (d.from, d.to)),
            current_index: self.current_index,
            errors: self.errors,
            state: self.session.state(),
        }
    }
}
