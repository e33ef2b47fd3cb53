use cogkit_core::{Point, Task};
use cogkit_tasks::clock::{
    ClockConfig, ClockOutcome, ClockTask, circular_difference, composite_score, configure,
    hand_accuracy, pointer_angle,
};
use cogkit_timing::ManualTimer;
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

/// Pointer on the ray at `angle` degrees from the dial centre.
fn pointer_for(center: Point, angle: f64, radius: f64) -> Point {
    let theta = angle.to_radians();
    Point::new(center.x + radius * theta.sin(), center.y - radius * theta.cos())
}

proptest! {
    #[test]
    fn score_stays_in_range(
        hour in 0.0f64..360.0,
        minute in 0.0f64..360.0,
        target_h in 0.0f64..360.0,
        target_m in 0.0f64..360.0,
    ) {
        let h = hand_accuracy(hour, target_h);
        let m = hand_accuracy(minute, target_m);
        prop_assert!((0.0..=100.0).contains(&h));
        prop_assert!((0.0..=100.0).contains(&m));
        prop_assert!(composite_score(h, m) <= 100);
        prop_assert!((0.0..=180.0).contains(&circular_difference(hour, target_h)));
    }

    #[test]
    fn full_turn_does_not_change_accuracy(current in 0.0f64..360.0, target in 0.0f64..360.0) {
        let a = hand_accuracy(current, target);
        prop_assert!((a - hand_accuracy(current + 360.0, target)).abs() < 1e-9);
        prop_assert!((a - hand_accuracy(current, target + 360.0)).abs() < 1e-9);
    }

    #[test]
    fn pointer_angle_is_normalised(x in -500.0f64..500.0, y in -500.0f64..500.0) {
        let a = pointer_angle(Point::new(0.0, 0.0), Point::new(x, y));
        prop_assert!((0.0..360.0).contains(&a));
    }
}

#[test]
fn matching_angles_score_100_and_opposite_scores_0() {
    assert_eq!(composite_score(hand_accuracy(42.0, 42.0), hand_accuracy(7.0, 7.0)), 100);
    assert_eq!(hand_accuracy(30.0, 210.0), 0.0);
    assert_eq!(composite_score(0.0, 0.0), 0);
    assert_eq!(composite_score(100.0, 0.0), 60);
    assert_eq!(composite_score(0.0, 100.0), 40);
}

#[test]
fn ten_past_ten_dragged_into_place() {
    let config = ClockConfig {
        target_time: "10:10".into(),
        clock_size: 300,
    };
    let seen: Rc<RefCell<Vec<ClockOutcome>>> = Rc::default();
    let sink = Rc::clone(&seen);
    let mut task = ClockTask::new(config, ManualTimer::new())
        .unwrap()
        .with_on_complete(move |o| sink.borrow_mut().push(o.clone()));

    let target = configure("10:10").unwrap();
    assert_eq!(task.target(), target);

    let center = task.center();
    assert!(task.drag_hour(pointer_for(center, target.target_hour_angle, 60.0)));
    assert!(task.drag_minute(pointer_for(center, target.target_minute_angle, 100.0)));
    assert_eq!(task.submit(), Some(100));
    assert_eq!(seen.borrow().len(), 1);
    assert!(seen.borrow()[0].submitted);
    assert_eq!(task.result().score, 100);
}

#[test]
fn invalid_target_time_is_a_config_error() {
    let config = ClockConfig {
        target_time: "nine".into(),
        ..ClockConfig::default()
    };
    assert!(ClockTask::new(config, ManualTimer::new()).is_err());
}

#[test]
fn config_reads_host_option_names() {
    let config: ClockConfig =
        serde_json::from_str(r#"{"targetTime": "3:45", "clockSize": 240}"#).unwrap();
    assert_eq!(config.target_time, "3:45");
    assert_eq!(config.clock_size, 240);
    let defaults: ClockConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(defaults, ClockConfig::default());
}
