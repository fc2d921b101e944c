//! # 帧锚定异步时间轮 (Frame-Anchored Async Timing Wheel)
//!
//! 基于哈希时间轮（Hashed Timing Wheel）算法实现的异步定时器，支持 tokio 运行时。
//! (Async timer based on the hashed timing wheel algorithm, supports tokio runtime)
//!
//! ## 特性 (Features)
//!
//! - **高性能 (High Performance)**: 插入、取消和重置操作的时间复杂度为 O(1)
//!   (Insert, cancel, and reset operations are O(1))
//! - **无漂移 (Drift-Free)**: 触发时刻由挂钟锚点计算，而不是 tick 计数，
//!   重复触发的舍入误差不会累积
//!   (Firing deadlines are computed from a wall-clock anchor rather than tick
//!   counts, so rounding never compounds across repeats)
//! - **补帧 (Catch-Up)**: 调度循环被阻塞后按挂钟流逝时间补上错过的 tick，
//!   条目触发的次数与按时调度时完全一致
//!   (After the scheduling loop stalls, missed ticks are replayed from
//!   wall-clock elapsed time; entries fire exactly as many times as they
//!   would have on schedule)
//! - **分组分发 (Group Dispatch)**: 调用方可以把条目归入分组，拦截触发事件
//!   并在自己的处理路径上执行，支持批量取消
//!   (Callers can group entries, intercept firings on their own processing
//!   path, and cancel in bulk)
//! - **线程安全 (Thread-Safe)**: 使用 parking_lot 提供高性能的锁机制
//!   (Uses parking_lot for high-performance locking mechanism)
//!
//! ## 快速开始 (Quick Start)
//!
//! ```no_run
//! use framewheel::{CallbackWrapper, Repeat, TimerWheel, WheelConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     // 创建并启动定时器管理器
//!     let timer = TimerWheel::new(WheelConfig::default());
//!     timer.start();
//!
//!     // 注册一个 250ms 后触发一次的定时器
//!     let handle = timer.add(
//!         Duration::from_millis(250),
//!         Repeat::ONCE,
//!         Some(CallbackWrapper::new(|| async {
//!             println!("Timer fired after 250ms!");
//!         })),
//!     );
//!
//!     tokio::time::sleep(Duration::from_millis(400)).await;
//!     assert!(!handle.cancel()); // 已触发并离开时间轮
//!     timer.stop();
//! }
//! ```
//!
//! ## 中文架构说明
//!
//! ### 时间轮算法
//!
//! 单层哈希时间轮：`slotCount` 个槽组成环，条目按 `frame mod slotCount`
//! 存放。帧（frame）是单调递增的绝对 tick 索引：槽位归属只是必要条件，
//! 条目的目标帧等于引擎当前帧时才触发，因此任意长的延迟都可以存放在
//! 固定大小的环上，不需要层级降级。
//!
//! ### 调度模型
//!
//! - 一个后台 tokio 任务驱动调度循环；每个 ticker 信号都将时间轮推进到
//!   由挂钟流逝时间推导出的目标帧
//! - `advance` 在引擎锁内只做收集：扫描当前槽，暂存到期条目，扫描结束后
//!   统一应用移除/重插——扫描期间从不修改槽容器
//! - 回调的执行与分组分发都发生在引擎锁释放之后，因此分发函数可以安全地
//!   回调 add/remove/reset 而不会死锁
//!
//! ## English Architecture Description
//!
//! ### Timing Wheel Algorithm
//!
//! A single-layer hashed wheel: `slotCount` slots form a ring and entries
//! live in slot `frame mod slotCount`. The frame is an absolute, monotonic
//! tick index: slot membership is only necessary, an entry fires when its
//! target frame equals the engine frame — so arbitrarily long delays fit a
//! fixed-size ring with no layer demotion.
//!
//! ### Scheduling Model
//!
//! - One background tokio task drives the scheduling loop; every ticker
//!   signal advances the wheel to the target frame derived from wall-clock
//!   elapsed time
//! - `advance` only collects under the engine lock: it scans the current
//!   slot, stages due entries, and applies removals/reinsertions after the
//!   scan completes — the slot container is never mutated mid-scan
//! - Callback execution and group dispatch both happen after the engine lock
//!   is released, so a dispatch function can safely call back into
//!   add/remove/reset without deadlocking

mod config;
mod entry;
mod error;
mod group;
mod timer;
mod wheel;

#[cfg(test)]
mod tests;

// 重新导出公共 API (Re-export public API)
pub use config::{WheelConfig, WheelConfigBuilder, MIN_TICK_INTERVAL};
pub use entry::{CallbackWrapper, FiredTimer, Repeat, TimerCallback, TimerId};
pub use error::WheelError;
pub use group::TimerGroup;
pub use timer::{TimerHandle, TimerWheel};
