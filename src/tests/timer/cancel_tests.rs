use crate::{CallbackWrapper, Repeat, TimerWheel, WheelConfig};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

// ==================== Cancellation Tests ====================
// ==================== 取消测试 ====================

fn fast_config() -> WheelConfig {
    WheelConfig::builder()
        .tick_interval(Duration::from_millis(10))
        .slot_count(16)
        .build()
        .unwrap()
}

fn counting_callback(counter: &Arc<AtomicU32>) -> Option<CallbackWrapper> {
    let counter = Arc::clone(counter);
    Some(CallbackWrapper::new(move || {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }))
}

#[tokio::test]
async fn test_cancel_before_firing() {
    let timer = TimerWheel::new(fast_config());
    timer.start();
    let counter = Arc::new(AtomicU32::new(0));

    let handle = timer.add(
        Duration::from_millis(100),
        Repeat::ONCE,
        counting_callback(&counter),
    );

    assert!(handle.cancel());
    sleep(Duration::from_millis(250)).await;
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_double_cancel_fails() {
    let timer = TimerWheel::new(fast_config());
    timer.start();

    let handle = timer.add(Duration::from_secs(10), Repeat::ONCE, None);
    assert!(handle.cancel());
    assert!(!handle.cancel());
}

#[tokio::test]
async fn test_cancel_after_natural_expiry_fails() {
    let timer = TimerWheel::new(fast_config());
    timer.start();
    let counter = Arc::new(AtomicU32::new(0));

    let handle = timer.add(
        Duration::from_millis(20),
        Repeat::ONCE,
        counting_callback(&counter),
    );

    sleep(Duration::from_millis(150)).await;
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    // The entry already left the wheel on its final firing
    // 条目已在最后一次触发时离开时间轮
    assert!(!handle.cancel());
}

#[tokio::test]
async fn test_remove_is_silent_and_idempotent() {
    let timer = TimerWheel::new(fast_config());
    timer.start();

    let handle = timer.add(Duration::from_secs(10), Repeat::ONCE, None);
    let id = handle.id();

    timer.remove(id);
    assert!(timer.is_empty());
    // Unknown id: no panic, no effect
    // 未知 id：不恐慌，无副作用
    timer.remove(id);
}

#[tokio::test]
async fn test_cancel_some_keep_others() {
    let timer = TimerWheel::new(fast_config());
    timer.start();
    let counter = Arc::new(AtomicU32::new(0));

    let handles: Vec<_> = (0..5)
        .map(|_| {
            timer.add(
                Duration::from_millis(60),
                Repeat::ONCE,
                counting_callback(&counter),
            )
        })
        .collect();

    assert!(handles[0].cancel());
    assert!(handles[2].cancel());
    assert!(handles[4].cancel());

    sleep(Duration::from_millis(250)).await;
    assert_eq!(counter.load(Ordering::SeqCst), 2);
    assert!(timer.is_empty());
}
