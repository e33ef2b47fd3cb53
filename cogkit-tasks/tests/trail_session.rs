use cogkit_core::{Point, SessionState, Task};
use cogkit_tasks::trail::{
    ERROR_LINE_MS, PlacementRules, Release, TrailConfig, TrailOutcome, TrailTask, generate,
};
use cogkit_timing::ManualTimer;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::cell::RefCell;
use std::rc::Rc;

fn ten_dots(seed: u64) -> (TrailTask<ManualTimer, StdRng>, ManualTimer) {
    let timer = ManualTimer::new();
    let config = TrailConfig {
        dot_count: 10,
        grid_size: 400,
    };
    let task = TrailTask::new(config, timer.clone(), StdRng::seed_from_u64(seed)).unwrap();
    (task, timer)
}

fn at(task: &TrailTask<ManualTimer, StdRng>, id: usize) -> Point {
    task.dots().get(id).unwrap().position
}

proptest! {
    #[test]
    fn placement_respects_separation_or_grid(
        dot_count in 1usize..80,
        seed in any::<u64>(),
    ) {
        let size = 400.0;
        let rules = PlacementRules::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let set = generate(dot_count, size, &mut rng);
        prop_assert_eq!(set.len(), dot_count);

        for (i, dot) in set.dots.iter().enumerate() {
            prop_assert_eq!(dot.id, i + 1);
            prop_assert!(dot.position.x >= rules.padding && dot.position.x <= size - rules.padding);
            prop_assert!(dot.position.y >= rules.padding && dot.position.y <= size - rules.padding);
        }
        if set.grid_fallback {
            for (i, a) in set.dots.iter().enumerate() {
                for b in &set.dots[i + 1..] {
                    prop_assert!(a.position != b.position);
                }
            }
        } else if let Some(min) = set.min_pairwise_distance() {
            prop_assert!(min >= rules.min_separation);
        }
    }
}

#[test]
fn wrong_dot_counts_an_error_and_the_line_fades() {
    let (mut task, timer) = ten_dots(12);
    assert!(task.press(at(&task, 1)));
    assert_eq!(task.release(at(&task, 5)), Some(Release::Error(5)));
    assert_eq!(task.errors(), 1);
    assert_eq!(task.current_index(), 1);
    assert_eq!(task.lines().len(), 1);
    assert!(task.lines()[0].is_error);

    timer.advance_ms(ERROR_LINE_MS - 1);
    task.tick();
    assert_eq!(task.lines().len(), 1);
    timer.advance_ms(1);
    task.tick();
    assert!(task.lines().is_empty());
    assert_eq!(task.errors(), 1);
}

#[test]
fn connecting_all_dots_completes_with_time_and_errors() {
    let (task, timer) = ten_dots(30);
    let seen: Rc<RefCell<Vec<TrailOutcome>>> = Rc::default();
    let sink = Rc::clone(&seen);
    let mut task = task.with_on_complete(move |o| sink.borrow_mut().push(o.clone()));

    // One wrong attempt first.
    task.press(at(&task, 1));
    task.release(at(&task, 3));

    for id in 2..=10 {
        assert!(task.press(at(&task, id - 1)));
        task.move_pointer(at(&task, id));
        timer.advance_ms(100);
        task.tick();
        assert_eq!(task.release(at(&task, id)), Some(Release::Advanced(id)));
    }

    assert_eq!(task.session_state(), SessionState::Completed);
    let outcomes = seen.borrow();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].errors, 1);
    assert_eq!(outcomes[0].time_ms, 900);
    assert!(outcomes[0].completed);
    assert_eq!(task.lines().iter().filter(|l| !l.is_error).count(), 9);

    // Frozen after completion.
    assert!(!task.press(at(&task, 10)));
    timer.advance_ms(5_000);
    assert_eq!(task.result().time_ms, 900);
}

#[test]
fn release_on_empty_canvas_cancels() {
    let (mut task, _) = ten_dots(4);
    task.press(at(&task, 1));
    assert!(task.is_dragging());
    let empty = (0..400)
        .step_by(5)
        .flat_map(|x| (0..400).step_by(5).map(move |y| Point::new(x as f64, y as f64)))
        .find(|p| task.dot_at(*p).is_none())
        .unwrap();
    assert_eq!(task.release(empty), Some(Release::Cancelled));
    assert!(!task.is_dragging());
    assert_eq!(task.errors(), 0);
    assert!(task.lines().is_empty());
}

#[test]
fn reset_clears_lines_and_progress() {
    let (mut task, _) = ten_dots(8);
    task.press(at(&task, 1));
    task.release(at(&task, 2));
    task.press(at(&task, 2));
    task.release(at(&task, 7));
    assert_eq!(task.lines().len(), 2);

    task.reset();
    assert!(task.lines().is_empty());
    assert_eq!(task.current_index(), 1);
    assert_eq!(task.errors(), 0);
    assert_eq!(task.session_state(), SessionState::Idle);
    assert_eq!(task.result().time_ms, 0);
}

#[test]
fn outcome_serializes_time_and_errors() {
    let outcome = TrailOutcome {
        time_ms: 4_200,
        errors: 2,
        completed: true,
    };
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["time"], 4_200);
    assert_eq!(json["errors"], 2);
}
