use crate::config::WheelConfig;
use crate::entry::{Repeat, TimerEntry};
use crate::wheel::Wheel;
use std::time::{Duration, Instant};

// ==================== Frame Placement and Advance Tests ====================
// ==================== 帧放置与推进测试 ====================
//
// These tests drive `advance` by hand with a 1-second tick, so wall-clock
// time never catches up with the wheel. Anchoring the wheel at the entry's
// own create_time keeps the frame math exact even for delays that are
// whole multiples of the tick.
//
// 这些测试用 1 秒的 tick 手动驱动 `advance`，挂钟时间追不上时间轮。
// 将时间轮锚定在条目自身的 create_time 上，即使延迟是 tick 的整数倍，
// 帧计算也保持精确。

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

/// Wheel anchored at the entry's creation instant, entry already inserted
///
/// 锚定在条目创建时刻的时间轮，条目已插入
fn anchored_wheel(e: TimerEntry, slot_count: usize) -> (Wheel, crate::entry::TimerId) {
    let mut wheel = Wheel::new(&slow_config(slot_count), e.create_time);
    let id = wheel.insert(e);
    (wheel, id)
}

#[test]
fn test_frame_placement_mid_interval() {
    // 2.5s with a 1s tick lands on frame 2 (fires at the tick at ~3s)
    // 1 秒 tick 下 2.5 秒落在第 2 帧（约 3 秒的 tick 触发）
    let (wheel, id) = anchored_wheel(entry(Duration::from_millis(2500), Repeat::ONCE), 10);
    assert_eq!(wheel.frame_of(id), Some(2));
    assert_eq!(wheel.slot_of(id), Some(2));
}

#[test]
fn test_frame_placement_exact_multiple() {
    // An exact multiple of the tick fires at its own tick, not one later:
    // 2s -> frame 1, which fires at wall time ~2s
    // tick 的整数倍在自己的 tick 触发，而不是晚一个：2 秒 -> 第 1 帧
    let (mut wheel, id) = anchored_wheel(entry(Duration::from_secs(2), Repeat::ONCE), 10);
    assert_eq!(wheel.frame_of(id), Some(1));

    assert!(wheel.advance().is_empty());
    let firings = wheel.advance();
    assert_eq!(firings.len(), 1);
    assert_eq!(firings[0].id, id);
    assert!(wheel.is_empty());
}

#[test]
fn test_slot_wraps_around_ring() {
    // 25s -> frame 24, slot 24 % 10 = 4
    let (wheel, id) = anchored_wheel(entry(Duration::from_secs(25), Repeat::ONCE), 10);
    assert_eq!(wheel.frame_of(id), Some(24));
    assert_eq!(wheel.slot_of(id), Some(4));
}

#[test]
fn test_zero_delay_fires_on_next_advance() {
    let (mut wheel, id) = anchored_wheel(entry(Duration::ZERO, Repeat::ONCE), 10);
    assert_eq!(wheel.frame_of(id), Some(0));

    let firings = wheel.advance();
    assert_eq!(firings.len(), 1);
    assert_eq!(firings[0].id, id);
    assert!(firings[0].finished);
}

#[test]
fn test_frame_equality_is_authoritative() {
    // Both entries share slot 0, but only the one whose frame matches fires
    // 两个条目共享第 0 槽，但只有帧匹配的那个触发
    let (mut wheel, near) = anchored_wheel(entry(Duration::from_millis(500), Repeat::ONCE), 10);
    let far = wheel.insert(entry(Duration::from_millis(10500), Repeat::ONCE)); // frame 10
    assert_eq!(wheel.slot_of(near), Some(0));
    assert_eq!(wheel.slot_of(far), Some(0));

    let firings = wheel.advance();
    assert_eq!(firings.len(), 1);
    assert_eq!(firings[0].id, near);

    // The far entry survives nine more empty laps of its slot
    // 远端条目再熬过九次空扫
    for _ in 0..9 {
        assert!(wheel.advance().is_empty());
    }
    assert!(wheel.contains(far));

    let firings = wheel.advance();
    assert_eq!(firings.len(), 1);
    assert_eq!(firings[0].id, far);
    assert!(wheel.is_empty());
}

#[test]
fn test_target_frame_tracks_wall_clock() {
    let start = Instant::now();
    let config = WheelConfig::builder()
        .tick_interval(Duration::from_millis(100))
        .slot_count(10)
        .build()
        .unwrap();
    let wheel = Wheel::new(&config, start);

    assert_eq!(wheel.target_frame(start), 0);
    assert_eq!(wheel.target_frame(start + Duration::from_millis(99)), 0);
    assert_eq!(wheel.target_frame(start + Duration::from_millis(100)), 1);
    assert_eq!(wheel.target_frame(start + Duration::from_millis(750)), 7);
    // A timestamp before the anchor saturates instead of underflowing
    // 早于锚点的时间戳饱和而不是下溢
    assert_eq!(wheel.target_frame(start - Duration::from_millis(50)), 0);
}

#[test]
fn test_restart_reanchors_existing_entries() {
    let (mut wheel, stale) = anchored_wheel(entry(Duration::ZERO, Repeat::ONCE), 10);

    // An entry whose deadline already passed collapses to the next tick
    // after restart; a future one keeps its relative position
    // 重新锚定后，截止时刻已过的条目归到下一个 tick；
    // 未到期的保持相对位置
    let fresh = wheel.insert(entry(Duration::from_millis(3500), Repeat::ONCE));

    wheel.restart(Instant::now());
    assert_eq!(wheel.current_frame(), 0);
    assert_eq!(wheel.frame_of(stale), Some(0));
    assert_eq!(wheel.frame_of(fresh), Some(3));

    let firings = wheel.advance();
    assert_eq!(firings.len(), 1);
    assert_eq!(firings[0].id, stale);
}
