use crate::config::WheelConfig;
use crate::entry::{Repeat, TimerEntry, TimerId};
use crate::wheel::Wheel;
use std::time::Duration;

// ==================== Repeat Policy Tests ====================
// ==================== 重复策略测试 ====================

fn slow_config(slot_count: usize) -> WheelConfig {
    WheelConfig::builder()
        .tick_interval(Duration::from_secs(1))
        .slot_count(slot_count)
        .build()
        .unwrap()
}

fn entry(delay: Duration, repeat: Repeat) -> TimerEntry {
    TimerEntry::new(delay, repeat, None, None)
}

fn anchored_wheel(e: TimerEntry, slot_count: usize) -> (Wheel, TimerId) {
    let mut wheel = Wheel::new(&slow_config(slot_count), e.create_time);
    let id = wheel.insert(e);
    (wheel, id)
}

#[test]
fn test_times_fires_on_drift_free_frames() {
    // delay 2s, three shots: deadlines at 2s/4s/6s -> frames 1, 3, 5
    // 延迟 2 秒，三次触发：截止时刻 2/4/6 秒 -> 第 1、3、5 帧
    let (mut wheel, id) = anchored_wheel(entry(Duration::from_secs(2), Repeat::from_count(3)), 10);

    let mut fired_on = Vec::new();
    for frame in 0..8 {
        for firing in wheel.advance() {
            assert_eq!(firing.id, id);
            fired_on.push(frame);
        }
    }

    assert_eq!(fired_on, vec![1, 3, 5]);
    assert!(wheel.is_empty());
}

#[test]
fn test_finished_flag_marks_last_firing() {
    let (mut wheel, _) = anchored_wheel(entry(Duration::from_secs(1), Repeat::from_count(2)), 10);

    let first = wheel.advance();
    assert_eq!(first.len(), 1);
    assert!(!first[0].finished);

    let second = wheel.advance();
    assert_eq!(second.len(), 1);
    assert!(second[0].finished);
    assert!(wheel.is_empty());
}

#[test]
fn test_forever_survives_every_firing() {
    let (mut wheel, id) = anchored_wheel(entry(Duration::from_secs(1), Repeat::Forever), 10);

    let mut total = 0;
    for _ in 0..25 {
        let firings = wheel.advance();
        assert!(firings.iter().all(|f| !f.finished));
        total += firings.len();
    }

    // One firing per frame, across multiple laps of the ring
    // 每帧触发一次，跨过环的多圈
    assert_eq!(total, 25);
    assert!(wheel.contains(id));
}

#[test]
fn test_catch_up_burst_replays_short_period_repeats() {
    let (mut wheel, _) = anchored_wheel(entry(Duration::from_secs(1), Repeat::from_count(3)), 10);

    // Simulate a catch-up batch: ten advances back to back. The entry must
    // re-fire within the batch, then stop at exactly three.
    // 模拟补帧批次：连续推进十次。条目必须在批次内再次触发，
    // 且恰好停在三次。
    let mut total = 0;
    for _ in 0..10 {
        total += wheel.advance().len();
    }
    assert_eq!(total, 3);
    assert!(wheel.is_empty());
}

#[test]
fn test_from_count_normalization() {
    // Zero normalizes to a single shot
    // 零规范化为单次触发
    let (mut wheel, once) = anchored_wheel(entry(Duration::from_secs(1), Repeat::from_count(0)), 10);
    let firings = wheel.advance();
    assert_eq!(firings.len(), 1);
    assert!(firings[0].finished);
    assert!(!wheel.contains(once));

    // Negative normalizes to forever
    // 负数规范化为无限重复
    let (mut wheel, forever) =
        anchored_wheel(entry(Duration::from_secs(1), Repeat::from_count(-1)), 10);
    for _ in 0..5 {
        wheel.advance();
    }
    assert!(wheel.contains(forever));
}

#[test]
fn test_reinserted_entry_moves_to_new_slot() {
    // delay 3s forever: deadlines 3s/6s/9s -> frames 2, 5, 8
    let (mut wheel, id) = anchored_wheel(entry(Duration::from_secs(3), Repeat::Forever), 10);
    assert_eq!(wheel.slot_of(id), Some(2));

    for _ in 0..3 {
        wheel.advance();
    }
    assert_eq!(wheel.frame_of(id), Some(5));
    assert_eq!(wheel.slot_of(id), Some(5));
}
