use cogkit_core::{SessionState, Task};
use cogkit_tasks::nback::{NBackConfig, NBackScore, NBackTask, Presentation, generate};
use cogkit_timing::ManualTimer;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::cell::RefCell;
use std::rc::Rc;

fn independent_matches(symbols: &[cogkit_tasks::nback::Symbol], n: usize) -> usize {
    (n..symbols.len()).filter(|&i| symbols[i] == symbols[i - n]).count()
}

fn fast_config(length: usize, n: usize) -> NBackConfig {
    NBackConfig {
        n_value: n,
        sequence_length: length,
        stimulus_duration: 10,
        inter_stimulus_interval: 5,
    }
}

/// Run a whole session, pressing on stimulus `i` when `press(i)` says so.
fn run_session(
    task: &mut NBackTask<ManualTimer, StdRng>,
    timer: &ManualTimer,
    press: impl Fn(usize) -> bool,
) {
    task.start();
    while task.session_state() != SessionState::Completed {
        if let Presentation::Showing(i) = task.presentation() {
            if press(i) {
                task.signal_match();
            }
        }
        timer.advance_ms(5);
        task.tick();
    }
}

proptest! {
    #[test]
    fn correct_plus_missed_is_total(
        length in 2usize..60,
        lag in 1usize..8,
        seed in any::<u64>(),
        presses in proptest::collection::vec(any::<bool>(), 60),
    ) {
        let n = lag.min(length - 1);
        let timer = ManualTimer::new();
        let mut task =
            NBackTask::new(fast_config(length, n), timer.clone(), StdRng::seed_from_u64(seed))
                .unwrap();
        run_session(&mut task, &timer, |i| presses[i]);

        let score = task.result();
        let expected = independent_matches(task.sequence().symbols(), n);
        prop_assert_eq!(score.total, expected);
        prop_assert_eq!(score.correct + score.missed, expected);
        prop_assert!(score.percentage_score <= 100);
    }

    #[test]
    fn generation_never_leaves_bounds(length in 1usize..200, n in 0usize..220, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let seq = generate(length, n, &mut rng);
        prop_assert_eq!(seq.len(), length);
        for i in 0..length + 5 {
            let _ = seq.is_match(i);
        }
    }
}

#[test]
fn no_presses_means_everything_missed() {
    let timer = ManualTimer::new();
    let mut task =
        NBackTask::new(fast_config(30, 2), timer.clone(), StdRng::seed_from_u64(9)).unwrap();
    run_session(&mut task, &timer, |_| false);
    let score = task.result();
    assert_eq!(score.correct, 0);
    assert_eq!(score.incorrect, 0);
    assert_eq!(score.missed, score.total);
}

#[test]
fn twenty_by_two_scores_every_index() {
    let timer = ManualTimer::new();
    let mut task =
        NBackTask::new(fast_config(20, 2), timer.clone(), StdRng::seed_from_u64(4)).unwrap();
    assert_eq!(task.sequence().len(), 20);
    // Pressing on every stimulus, including i < n, must not index out of range.
    run_session(&mut task, &timer, |_| true);
    let score = task.result();
    let total = independent_matches(task.sequence().symbols(), 2);
    assert_eq!(score.correct, total);
    assert_eq!(score.correct + score.incorrect, 18);
    assert_eq!(score.missed, 0);
}

#[test]
fn perfect_responder_scores_100() {
    let timer = ManualTimer::new();
    let mut task =
        NBackTask::new(fast_config(40, 1), timer.clone(), StdRng::seed_from_u64(77)).unwrap();
    let symbols = task.sequence().symbols().to_vec();
    run_session(&mut task, &timer, |i| i >= 1 && symbols[i] == symbols[i - 1]);
    let score = task.result();
    assert_eq!(score.incorrect, 0);
    if score.total > 0 {
        assert_eq!(score.percentage_score, 100);
    }
}

#[test]
fn completion_hook_receives_final_score_once() {
    let timer = ManualTimer::new();
    let seen: Rc<RefCell<Vec<NBackScore>>> = Rc::default();
    let sink = Rc::clone(&seen);
    let mut task = NBackTask::new(fast_config(12, 2), timer.clone(), StdRng::seed_from_u64(2))
        .unwrap()
        .with_on_complete(move |s| sink.borrow_mut().push(*s));
    run_session(&mut task, &timer, |_| false);
    timer.advance_ms(1_000);
    task.tick();
    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(seen.borrow()[0], task.result());
}

#[test]
fn reset_mid_interval_cancels_the_cadence() {
    let timer = ManualTimer::new();
    let fired = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&fired);
    let mut task = NBackTask::new(fast_config(10, 2), timer.clone(), StdRng::seed_from_u64(5))
        .unwrap()
        .with_on_complete(move |_| *counter.borrow_mut() += 1);

    task.start();
    timer.advance_ms(12);
    task.tick();
    assert_eq!(task.presentation(), Presentation::Blank(0));
    assert!(task.has_pending_timer());

    task.reset();
    assert!(!task.has_pending_timer());
    timer.advance_ms(60_000);
    task.tick();
    assert_eq!(task.presentation(), Presentation::NotStarted);
    assert_eq!(task.session_state(), SessionState::Idle);
    assert_eq!(*fired.borrow(), 0);

    // A fresh session still runs to completion and reports once.
    run_session(&mut task, &timer, |_| false);
    assert_eq!(*fired.borrow(), 1);
}

#[test]
fn score_serializes_with_host_field_names() {
    let score = NBackScore {
        correct: 3,
        incorrect: 1,
        missed: 2,
        total: 5,
        percentage_score: 60,
    };
    let json = serde_json::to_value(score).unwrap();
    assert_eq!(json["percentageScore"], 60);
    assert_eq!(json["total"], 5);
}
