//! N-back working memory: a symbol stream with injected lag-`n` repeats,
//! revealed on a fixed cadence while the subject flags matches.

use cogkit_core::{CompletionHook, ConfigError, Session, SessionState, Task};
use cogkit_timing::{Timer, TaskSlot, ms};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Stimulus alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    Circle,
    Square,
    Triangle,
}

impl Symbol {
    pub const ALPHABET: [Symbol; 3] = [Symbol::Circle, Symbol::Square, Symbol::Triangle];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    symbols: Vec<Symbol>,
    n: usize,
}

impl Sequence {
    pub fn new(symbols: Vec<Symbol>, n: usize) -> Result<Self, ConfigError> {
        if n >= symbols.len() {
            return Err(ConfigError::LagTooLarge {
                n,
                length: symbols.len(),
            });
        }
        Ok(Self { symbols, n })
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn get(&self, i: usize) -> Option<Symbol> {
        self.symbols.get(i).copied()
    }

    /// Whether stimulus `i` repeats the one shown `n` steps earlier.
    /// Indices below `n` can never match.
    pub fn is_match(&self, i: usize) -> bool {
        i >= self.n && i < self.symbols.len() && self.symbols[i] == self.symbols[i - self.n]
    }

    pub fn true_matches(&self) -> usize {
        (self.n..self.symbols.len())
            .filter(|&i| self.is_match(i))
            .count()
    }
}

/// Uniform draws from the alphabet, then `floor((length - n) * 0.3)` copy
/// operations `s[i] = s[i - n]` at random `i >= n`. Repeated or later
/// overwrites can erase earlier matches, so the match count is approximate.
pub fn generate<R: Rng>(length: usize, n: usize, rng: &mut R) -> Sequence {
    let mut symbols: Vec<Symbol> = (0..length)
        .map(|_| Symbol::ALPHABET[rng.random_range(0..Symbol::ALPHABET.len())])
        .collect();

    let injections = (length.saturating_sub(n) as f64 * 0.3).floor() as usize;
    if n < length {
        for _ in 0..injections {
            let i = rng.random_range(n..length);
            symbols[i] = symbols[i - n];
        }
    }
    Sequence { symbols, n }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NBackScore {
    pub correct: usize,
    pub incorrect: usize,
    pub missed: usize,
    pub total: usize,
    pub percentage_score: u32,
}

pub fn score(sequence: &Sequence, correct: usize, incorrect: usize) -> NBackScore {
    let total = sequence.true_matches();
    let percentage_score = if total == 0 {
        0
    } else {
        (100.0 * correct as f64 / total as f64).round() as u32
    };
    NBackScore {
        correct,
        incorrect,
        missed: total.saturating_sub(correct),
        total,
        percentage_score,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NBackConfig {
    pub n_value: usize,
    pub sequence_length: usize,
    /// Milliseconds each stimulus stays visible.
    pub stimulus_duration: u64,
    /// Milliseconds of blank screen between stimuli.
    pub inter_stimulus_interval: u64,
}

impl Default for NBackConfig {
    fn default() -> Self {
        Self {
            n_value: 2,
            sequence_length: 20,
            stimulus_duration: 1000,
            inter_stimulus_interval: 1000,
        }
    }
}

impl NBackConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::at_least("nValue", self.n_value as u64, 1)?;
        ConfigError::at_least("stimulusDuration", self.stimulus_duration, 1)?;
        if self.n_value >= self.sequence_length {
            return Err(ConfigError::LagTooLarge {
                n: self.n_value,
                length: self.sequence_length,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Feedback {
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    NotStarted,
    Showing(usize),
    Blank(usize),
    Finished,
}

#[derive(Debug, Clone)]
pub struct NBackScene {
    pub symbol: Option<Symbol>,
    pub index: Option<usize>,
    pub length: usize,
    pub n: usize,
    pub feedback: Option<Feedback>,
    pub state: SessionState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum NBackEvent {
    Hide(usize),
    Reveal(usize),
    End,
}

pub struct NBackTask<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    pub config: NBackConfig,
    timer: T,
    rng: R,
    sequence: Sequence,
    presentation: Presentation,
    responded: Vec<bool>,
    feedback: Option<Feedback>,
    correct: usize,
    incorrect: usize,
    session: Session,
    slot: TaskSlot<NBackEvent>,
    on_complete: CompletionHook<NBackScore>,
}

impl<T, R> NBackTask<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    pub fn new(config: NBackConfig, timer: T, mut rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let sequence = generate(config.sequence_length, config.n_value, &mut rng);
        Ok(Self {
            responded: vec![false; sequence.len()],
            config,
            timer,
            rng,
            sequence,
            presentation: Presentation::NotStarted,
            feedback: None,
            correct: 0,
            incorrect: 0,
            session: Session::new(),
            slot: TaskSlot::new(),
            on_complete: CompletionHook::none(),
        })
    }

    pub fn with_on_complete(mut self, hook: impl FnMut(&NBackScore) + 'static) -> Self {
        self.on_complete = CompletionHook::new(hook);
        self
    }

    /// Reveal the first stimulus now and arm the cadence.
    pub fn start(&mut self) -> bool {
        let now = self.timer.now();
        if !self.session.start(now) {
            return false;
        }
        info!(
            n = self.sequence.n(),
            length = self.sequence.len(),
            true_matches = self.sequence.true_matches(),
            "n-back session started"
        );
        self.reveal(0, now);
        true
    }

    fn reveal(&mut self, index: usize, at: u64) {
        self.presentation = Presentation::Showing(index);
        self.feedback = None;
        self.slot
            .schedule(at + ms(self.config.stimulus_duration), NBackEvent::Hide(index));
    }

    fn handle(&mut self, due: u64, event: NBackEvent) {
        match event {
            NBackEvent::Hide(i) => {
                self.presentation = Presentation::Blank(i);
                let next = if i + 1 < self.sequence.len() {
                    NBackEvent::Reveal(i + 1)
                } else {
                    NBackEvent::End
                };
                self.slot
                    .schedule(due + ms(self.config.inter_stimulus_interval), next);
            }
            NBackEvent::Reveal(i) => self.reveal(i, due),
            NBackEvent::End => self.finish(due),
        }
    }

    /// Subject flags the visible stimulus as an n-back match. Ignored while
    /// nothing is visible, for indices below `n`, and for repeat presses on
    /// the same stimulus.
    pub fn signal_match(&mut self) -> Option<Feedback> {
        if !self.session.state().is_active() {
            return None;
        }
        let Presentation::Showing(i) = self.presentation else {
            return None;
        };
        if i < self.sequence.n() || self.responded[i] {
            return None;
        }
        self.responded[i] = true;
        let feedback = if self.sequence.is_match(i) {
            self.correct += 1;
            Feedback::Correct
        } else {
            self.incorrect += 1;
            Feedback::Incorrect
        };
        debug!(index = i, ?feedback, "match signalled");
        self.feedback = Some(feedback);
        Some(feedback)
    }

    fn finish(&mut self, at: u64) {
        if !self.session.complete(at) {
            return;
        }
        self.slot.cancel();
        self.presentation = Presentation::Finished;
        let outcome = self.result();
        info!(
            correct = outcome.correct,
            incorrect = outcome.incorrect,
            missed = outcome.missed,
            percentage = outcome.percentage_score,
            "n-back completed"
        );
        self.on_complete.fire(&outcome);
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn presentation(&self) -> Presentation {
        self.presentation
    }

    pub fn has_pending_timer(&self) -> bool {
        self.slot.is_pending()
    }
}

impl<T, R> Task for NBackTask<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    type Outcome = NBackScore;
    type Scene = NBackScene;

    fn reset(&mut self) {
        self.slot.cancel();
        self.sequence = generate(
            self.config.sequence_length,
            self.config.n_value,
            &mut self.rng,
        );
        self.responded = vec![false; self.sequence.len()];
        self.presentation = Presentation::NotStarted;
        self.feedback = None;
        self.correct = 0;
        self.incorrect = 0;
        self.session = Session::new();
        self.on_complete.rearm();
        debug!("n-back reset");
    }

    fn tick(&mut self) {
        let now = self.timer.now();
        while let Some((due, event)) = self.slot.poll(now) {
            self.handle(due, event);
        }
    }

    fn session_state(&self) -> SessionState {
        self.session.state()
    }

    fn result(&self) -> NBackScore {
        score(&self.sequence, self.correct, self.incorrect)
    }

    fn scene(&self) -> NBackScene {
        let index = match self.presentation {
            Presentation::Showing(i) => Some(i),
            _ => None,
        };
        NBackScene {
            symbol: index.and_then(|i| self.sequence.get(i)),
            index,
            length: self.sequence.len(),
            n: self.sequence.n(),
            feedback: self.feedback,
            state: self.session.state(),
        }
    }
}
