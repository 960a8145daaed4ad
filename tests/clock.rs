use vivaria::clock::{SimClock, MAX_INTERVAL, MIN_INTERVAL};

#[test]
fn three_small_steps_fire_once_with_leftover() {
    let mut clock = SimClock::new(0.5);
    let fired: Vec<bool> = [0.3, 0.3, 0.3].iter().map(|dt| clock.tick(*dt)).collect();
    assert_eq!(fired, vec![false, false, true]);
    assert!((clock.accumulated() - 0.4).abs() < 1e-6);
}

#[test]
fn long_stall_fires_once_and_clamps_leftover() {
    let mut clock = SimClock::new(0.5);
    assert!(clock.tick(10.0));
    assert!(clock.accumulated() <= clock.interval());
}

#[test]
fn interval_changes_clamp_and_preserve_accumulated_time() {
    let mut clock = SimClock::new(0.5);
    clock.tick(0.2);
    assert_eq!(clock.set_interval(99.0), MAX_INTERVAL);
    assert_eq!(clock.set_interval(-3.0), MIN_INTERVAL);
    assert!((clock.accumulated() - 0.2).abs() < 1e-6);

    // With the shortest interval the pending 0.2s fires immediately.
    assert!(clock.tick(0.0));
}

#[test]
fn reset_discards_pending_time() {
    let mut clock = SimClock::new(0.5);
    clock.tick(0.49);
    clock.reset();
    assert!(!clock.tick(0.49));
}
