//! Clock setting: drag the two hands to a configured time, scored by
//! shortest-arc angular error.
//!
//! Angles are degrees with 0 at twelve o'clock, growing clockwise.

use cogkit_core::{CompletionHook, ConfigError, Point, Session, SessionState, Task};
use cogkit_timing::Timer;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const HOUR_WEIGHT: f64 = 0.6;
const MINUTE_WEIGHT: f64 = 0.4;
const HOUR_HAND_RATIO: f64 = 0.5;
const MINUTE_HAND_RATIO: f64 = 0.8;
/// Pointer distance from a hand that still grabs it.
const HIT_TOLERANCE_PX: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AngleTarget {
    pub target_hour_angle: f64,
    pub target_minute_angle: f64,
}

/// Parse `H:MM` / `HH:MM` on a 24 hour clock.
pub fn parse_time(text: &str) -> Result<(u32, u32), ConfigError> {
    let invalid = || ConfigError::InvalidTime(text.to_string());
    let (h, m) = text.trim().split_once(':').ok_or_else(invalid)?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return Err(invalid());
    }
    if !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let hour: u32 = h.parse().map_err(|_| invalid())?;
    let minute: u32 = m.parse().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok((hour, minute))
}

pub fn target_angles(hour: u32, minute: u32) -> AngleTarget {
    let hour_pos = (hour as f64 + minute as f64 / 60.0).rem_euclid(12.0);
    AngleTarget {
        target_hour_angle: hour_pos * 30.0,
        target_minute_angle: minute as f64 * 6.0,
    }
}

/// `configure(targetTime)`: derive both target angles from `HH:MM`.
pub fn configure(target_time: &str) -> Result<AngleTarget, ConfigError> {
    let (hour, minute) = parse_time(target_time)?;
    Ok(target_angles(hour, minute))
}

/// Hand angle for a pointer position relative to the dial centre.
pub fn pointer_angle(center: Point, pointer: Point) -> f64 {
    let radians = (pointer.y - center.y).atan2(pointer.x - center.x);
    (radians.to_degrees() + 90.0).rem_euclid(360.0)
}

/// Shortest arc between two angles, in `[0, 180]`.
pub fn circular_difference(current: f64, target: f64) -> f64 {
    ((current - target + 180.0).rem_euclid(360.0) - 180.0).abs()
}

/// Linear accuracy: 100 at zero error, 0 at 180 degrees.
pub fn hand_accuracy(current: f64, target: f64) -> f64 {
    (100.0 - circular_difference(current, target) / 1.8).max(0.0)
}

pub fn composite_score(hour_accuracy: f64, minute_accuracy: f64) -> u32 {
    (HOUR_WEIGHT * hour_accuracy + MINUTE_WEIGHT * minute_accuracy).round() as u32
}

/// Distance from `p` to the segment `a..b`.
fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Hand {
    Hour,
    Minute,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClockConfig {
    /// Target time as `HH:MM`.
    pub target_time: String,
    /// Dial diameter in pixels.
    pub clock_size: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            target_time: "10:10".to_string(),
            clock_size: 300,
        }
    }
}

impl ClockConfig {
    pub fn validate(&self) -> Result<AngleTarget, ConfigError> {
        ConfigError::at_least("clockSize", self.clock_size as u64, 1)?;
        configure(&self.target_time)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockOutcome {
    pub score: u32,
    pub hour_accuracy: f64,
    pub minute_accuracy: f64,
    pub hour_angle: f64,
    pub minute_angle: f64,
    pub submitted: bool,
}

#[derive(Debug, Clone)]
pub struct ClockScene {
    pub size: u32,
    pub center: Point,
    pub hour_angle: f64,
    pub minute_angle: f64,
    pub hour_length: f64,
    pub minute_length: f64,
    pub captured: Option<Hand>,
    pub submitted: bool,
    pub state: SessionState,
}

pub struct ClockTask<T>
where
    T: Timer<Timestamp = u64>,
{
    pub config: ClockConfig,
    timer: T,
    target: AngleTarget,
    hour_angle: f64,
    minute_angle: f64,
    captured: Option<Hand>,
    session: Session,
    on_complete: CompletionHook<ClockOutcome>,
}

impl<T> ClockTask<T>
where
    T: Timer<Timestamp = u64>,
{
    pub fn new(config: ClockConfig, timer: T) -> Result<Self, ConfigError> {
        let target = config.validate()?;
        debug!(
            target_time = %config.target_time,
            hour = target.target_hour_angle,
            minute = target.target_minute_angle,
            "clock configured"
        );
        Ok(Self {
            config,
            timer,
            target,
            hour_angle: 0.0,
            minute_angle: 0.0,
            captured: None,
            session: Session::new(),
            on_complete: CompletionHook::none(),
        })
    }

    pub fn with_on_complete(mut self, hook: impl FnMut(&ClockOutcome) + 'static) -> Self {
        self.on_complete = CompletionHook::new(hook);
        self
    }

    pub fn target(&self) -> AngleTarget {
        self.target
    }

    pub fn center(&self) -> Point {
        let r = self.config.clock_size as f64 / 2.0;
        Point::new(r, r)
    }

    fn radius(&self) -> f64 {
        self.config.clock_size as f64 / 2.0
    }

    fn hand_length(&self, hand: Hand) -> f64 {
        match hand {
            Hand::Hour => self.radius() * HOUR_HAND_RATIO,
            Hand::Minute => self.radius() * MINUTE_HAND_RATIO,
        }
    }

    pub fn hand_angle(&self, hand: Hand) -> f64 {
        match hand {
            Hand::Hour => self.hour_angle,
            Hand::Minute => self.minute_angle,
        }
    }

    /// Tip of a hand in canvas pixels.
    pub fn hand_tip(&self, hand: Hand) -> Point {
        let c = self.center();
        let len = self.hand_length(hand);
        let theta = self.hand_angle(hand).to_radians();
        Point::new(c.x + len * theta.sin(), c.y - len * theta.cos())
    }

    fn interactive(&mut self) -> bool {
        if self.session.state().is_completed() {
            return false;
        }
        self.session.start(self.timer.now());
        true
    }

    /// Pointer down: capture whichever hand lies under the pointer.
    pub fn press(&mut self, pointer: Point) -> Option<Hand> {
        if self.session.state().is_completed() {
            return None;
        }
        let center = self.center();
        let hit = [Hand::Hour, Hand::Minute]
            .into_iter()
            .map(|hand| (hand, segment_distance(pointer, center, self.hand_tip(hand))))
            .filter(|(_, d)| *d <= HIT_TOLERANCE_PX)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(hand, _)| hand);
        if hit.is_some() {
            self.interactive();
            self.captured = hit;
        }
        hit
    }

    /// Pointer move: only the captured hand follows.
    pub fn drag(&mut self, pointer: Point) -> bool {
        match self.captured {
            Some(hand) => self.set_hand(hand, pointer),
            None => false,
        }
    }

    pub fn release(&mut self) {
        self.captured = None;
    }

    pub fn drag_hour(&mut self, pointer: Point) -> bool {
        self.set_hand(Hand::Hour, pointer)
    }

    pub fn drag_minute(&mut self, pointer: Point) -> bool {
        self.set_hand(Hand::Minute, pointer)
    }

    fn set_hand(&mut self, hand: Hand, pointer: Point) -> bool {
        if !self.interactive() {
            return false;
        }
        let angle = pointer_angle(self.center(), pointer);
        match hand {
            Hand::Hour => self.hour_angle = angle,
            Hand::Minute => self.minute_angle = angle,
        }
        true
    }

    /// One-shot scoring; hands freeze afterwards. `None` if already submitted.
    pub fn submit(&mut self) -> Option<u32> {
        let now = self.timer.now();
        self.session.start(now);
        if !self.session.complete(now) {
            return None;
        }
        self.captured = None;
        let outcome = self.result();
        info!(
            score = outcome.score,
            hour_accuracy = outcome.hour_accuracy,
            minute_accuracy = outcome.minute_accuracy,
            "clock submitted"
        );
        self.on_complete.fire(&outcome);
        Some(outcome.score)
    }

    #[cfg(test)]
    fn set_angles(&mut self, hour: f64, minute: f64) {
        self.hour_angle = hour;
        self.minute_angle = minute;
    }
}

impl<T> Task for ClockTask<T>
where
    T: Timer<Timestamp = u64>,
{
    type Outcome = ClockOutcome;
    type Scene = ClockScene;

    fn reset(&mut self) {
        self.hour_angle = 0.0;
        self.minute_angle = 0.0;
        self.captured = None;
        self.session = Session::new();
        self.on_complete.rearm();
        debug!("clock reset");
    }

    /// Nothing on the dial is time driven.
    fn tick(&mut self) {}

    fn session_state(&self) -> SessionState {
        self.session.state()
    }

    fn result(&self) -> ClockOutcome {
        let hour_accuracy = hand_accuracy(self.hour_angle, self.target.target_hour_angle);
        let minute_accuracy = hand_accuracy(self.minute_angle, self.target.target_minute_angle);
        ClockOutcome {
            score: composite_score(hour_accuracy, minute_accuracy),
            hour_accuracy,
            minute_accuracy,
            hour_angle: self.hour_angle,
            minute_angle: self.minute_angle,
            submitted: self.session.state().is_completed(),
        }
    }

    fn scene(&self) -> ClockScene {
        ClockScene {
            size: self.config.clock_size,
            center: self.center(),
            hour_angle: self.hour_angle,
            minute_angle: self.minute_angle,
            hour_length: self.hand_length(Hand::Hour),
            minute_length: self.hand_length(Hand::Minute),
            captured: self.captured,
            submitted: self.session.state().is_completed(),
            state: self.session.state(),
        }
    }
}
