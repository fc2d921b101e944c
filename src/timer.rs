use crate::config::WheelConfig;
use crate::entry::{CallbackWrapper, FiredTimer, Firing, Repeat, TimerEntry, TimerId};
use crate::group::TimerGroup;
use crate::wheel::Wheel;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Timer handle for managing a single entry's lifecycle
///
/// Note: cloning is allowed; cancel is idempotent, so duplicate handles are harmless.
///
/// 定时器句柄，用于管理单个条目的生命周期
///
/// 注意：允许克隆；取消是幂等的，因此重复的句柄无害。
#[derive(Clone)]
pub struct TimerHandle {
    pub(crate) id: TimerId,
    pub(crate) wheel: Arc<Mutex<Wheel>>,
}

impl TimerHandle {
    pub(crate) fn new(id: TimerId, wheel: Arc<Mutex<Wheel>>) -> Self {
        Self { id, wheel }
    }

    /// Get the timer ID
    ///
    /// 获取定时器 ID
    #[inline]
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Cancel the timer
    ///
    /// # Returns
    /// Returns true if the entry was still scheduled, false if it had already
    /// fired its last occurrence or been removed. Calling twice is safe.
    ///
    /// 取消定时器
    ///
    /// # 返回值
    /// 条目仍在调度中则返回 true；已完成最后一次触发或已被移除则返回
    /// false。重复调用是安全的。
    ///
    /// # Examples (示例)
    /// ```no_run
    /// # use framewheel::{Repeat, TimerWheel, WheelConfig, CallbackWrapper};
    /// # use std::time::Duration;
    /// #
    /// # #[tokio::main]
    /// # async fn main() {
    /// let timer = TimerWheel::new(WheelConfig::default());
    /// timer.start();
    ///
    /// let handle = timer.add(
    ///     Duration::from_secs(1),
    ///     Repeat::ONCE,
    ///     Some(CallbackWrapper::new(|| async {})),
    /// );
    ///
    /// let success = handle.cancel();
    /// println!("Cancelled successfully: {}", success);
    /// # }
    /// ```
    pub fn cancel(&self) -> bool {
        let mut wheel = self.wheel.lock();
        wheel.cancel(self.id)
    }

    /// Reschedule the timer with a new delay and repeat policy
    ///
    /// The old schedule is fully replaced: the entry will not fire at its old
    /// target frame, its anchor is reset to now and its fired count to zero.
    ///
    /// # Returns
    /// Returns false if the entry has already been evicted — the caller's
    /// intent (reschedule a believed-live timer) cannot be honored, and
    /// silently creating a new entry would be surprising.
    ///
    /// 用新的延迟和重复策略重新调度定时器
    ///
    /// 旧调度被完全替换：条目不会在旧目标帧触发，锚点重置为当前时刻，
    /// 触发计数归零。
    ///
    /// # 返回值
    /// 条目已被移除则返回 false——调用方的意图（重调度一个自认为存活的
    /// 定时器）无法满足，而静默创建新条目会令人意外。
    pub fn reset_duration(&self, new_delay: Duration, new_repeat: Repeat) -> bool {
        let mut wheel = self.wheel.lock();
        wheel.reset(self.id, new_delay, new_repeat)
    }
}

/// Timing Wheel Timer Manager
///
/// 时间轮定时器管理器
pub struct TimerWheel {
    /// Timing wheel instance, wrapped in Arc<Mutex> for multi-threaded access
    ///
    /// 时间轮实例，包装在 Arc<Mutex> 中以支持多线程访问
    wheel: Arc<Mutex<Wheel>>,

    /// Effective tick interval (after the platform floor clamp)
    ///
    /// 有效 tick 间隔（经平台下限钳制后）
    tick_interval: Duration,

    /// Background scheduling loop handle; None until start
    ///
    /// 后台调度循环句柄；start 之前为 None
    tick_handle: Mutex<Option<JoinHandle<()>>>,
}

impl TimerWheel {
    /// Create a new timer manager
    ///
    /// The scheduling loop is not running yet; call [`TimerWheel::start`].
    /// Entries may be added before start — they fire relative to when they
    /// were added once the loop is running.
    ///
    /// # Parameters
    /// - `config`: Timing wheel configuration, already validated
    ///
    /// 创建新的定时器管理器
    ///
    /// 调度循环尚未运行；需调用 [`TimerWheel::start`]。可以在 start 之前
    /// 添加条目——循环运行后它们相对各自的注册时刻触发。
    ///
    /// # Examples (示例)
    /// ```no_run
    /// use framewheel::{TimerWheel, WheelConfig};
    /// use std::time::Duration;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let config = WheelConfig::builder()
    ///         .tick_interval(Duration::from_millis(100))
    ///         .slot_count(50)
    ///         .build()
    ///         .unwrap();
    ///     let timer = TimerWheel::new(config);
    ///     timer.start();
    /// }
    /// ```
    pub fn new(config: WheelConfig) -> Self {
        let tick_interval = config.tick_interval;
        let wheel = Wheel::new(&config, Instant::now());

        Self {
            wheel: Arc::new(Mutex::new(wheel)),
            tick_interval,
            tick_handle: Mutex::new(None),
        }
    }

    /// Create timer manager with the default configuration
    /// - tick interval: 100ms, slot count: 50
    ///
    /// 使用默认配置创建定时器管理器
    /// - tick 间隔：100ms，槽数量：50
    pub fn with_defaults() -> Self {
        Self::new(WheelConfig::default())
    }

    /// Start the background scheduling loop
    ///
    /// Re-anchors the wheel clock at now and spawns the loop on the current
    /// tokio runtime. Calling start while the loop is already running is a
    /// no-op.
    ///
    /// 启动后台调度循环
    ///
    /// 将时间轮的时钟重新锚定到当前时刻，并在当前 tokio 运行时上派生
    /// 循环任务。循环已在运行时再次调用是无操作。
    pub fn start(&self) {
        let mut handle_guard = self.tick_handle.lock();
        if let Some(handle) = handle_guard.as_ref() {
            if !handle.is_finished() {
                return;
            }
        }

        self.wheel.lock().restart(Instant::now());

        let wheel = Arc::clone(&self.wheel);
        let tick_interval = self.tick_interval;
        *handle_guard = Some(tokio::spawn(async move {
            Self::tick_loop(wheel, tick_interval).await;
        }));
    }

    /// Stop the scheduling loop and evict every entry
    ///
    /// Subsequent calls are safe no-ops; an already-stopped wheel has nothing
    /// to clear. The wheel can be started again afterwards.
    ///
    /// 停止调度循环并移除所有条目
    ///
    /// 重复调用是安全的无操作；已停止的时间轮没有可清理的内容。
    /// 之后可以再次启动。
    pub fn stop(&self) {
        if let Some(handle) = self.tick_handle.lock().take() {
            handle.abort();
        }
        self.wheel.lock().clear();
    }

    /// Add a timer entry
    ///
    /// # Parameters
    /// - `delay`: Delay before the first firing (and the period between
    ///   repeat firings). A zero delay fires on the next tick.
    /// - `repeat`: Repeat policy; see [`Repeat::from_count`] for the raw
    ///   count normalization rules
    /// - `callback`: Async callback, optional
    ///
    /// # Returns
    /// A handle usable for cancel and reset. Never fails.
    ///
    /// 添加定时器条目
    ///
    /// # 参数
    /// - `delay`: 首次触发前的延迟（也是重复触发的间隔）。零延迟在
    ///   下一个 tick 触发。
    /// - `repeat`: 重复策略；原始计数的归一化规则见 [`Repeat::from_count`]
    /// - `callback`: 异步回调，可选
    ///
    /// # 返回值
    /// 可用于取消和重置的句柄。不会失败。
    ///
    /// # Examples (示例)
    /// ```no_run
    /// use framewheel::{CallbackWrapper, Repeat, TimerWheel, WheelConfig};
    /// use std::time::Duration;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let timer = TimerWheel::new(WheelConfig::default());
    ///     timer.start();
    ///
    ///     // Fires every 200ms, three times total
    ///     // 每 200ms 触发一次，共三次
    ///     let handle = timer.add(
    ///         Duration::from_millis(200),
    ///         Repeat::Times(3),
    ///         Some(CallbackWrapper::new(|| async {
    ///             println!("Timer fired!");
    ///         })),
    ///     );
    ///
    ///     tokio::time::sleep(Duration::from_millis(700)).await;
    ///     assert!(!handle.cancel()); // already exhausted (已自然耗尽)
    /// }
    /// ```
    #[inline]
    pub fn add(
        &self,
        delay: Duration,
        repeat: Repeat,
        callback: Option<CallbackWrapper>,
    ) -> TimerHandle {
        let entry = TimerEntry::new(delay, repeat, callback, None);
        let id = entry.id;

        {
            let mut wheel = self.wheel.lock();
            wheel.insert(entry);
        }

        TimerHandle::new(id, Arc::clone(&self.wheel))
    }

    /// Remove a timer entry by id
    ///
    /// Silent no-op if the entry is unknown or has already left the index
    /// after its final firing — callers cannot always know this in advance,
    /// so removal is idempotent rather than an error.
    ///
    /// 按 id 移除定时器条目
    ///
    /// 条目未知或已在最后一次触发后离开索引时静默无操作——调用方无法
    /// 总是预先知道这一点，因此移除是幂等的而不是错误。
    #[inline]
    pub fn remove(&self, id: TimerId) {
        let mut wheel = self.wheel.lock();
        wheel.cancel(id);
    }

    /// Create a timer group routing firings to `dispatch`
    ///
    /// Dispatch is invoked by the scheduling loop outside the engine lock,
    /// so it may call back into add/remove/reset on this wheel.
    ///
    /// 创建一个将触发事件路由到 `dispatch` 的定时器分组
    ///
    /// 分发函数由调度循环在引擎锁之外调用，因此可以回调本时间轮的
    /// add/remove/reset。
    pub fn create_group(
        &self,
        dispatch: impl Fn(FiredTimer) + Send + Sync + 'static,
    ) -> TimerGroup {
        TimerGroup::new(Arc::clone(&self.wheel), dispatch)
    }

    /// Number of live entries in the wheel
    ///
    /// 时间轮中存活条目的数量
    pub fn len(&self) -> usize {
        self.wheel.lock().len()
    }

    /// Check if the wheel has no entries
    ///
    /// 检查时间轮是否没有条目
    pub fn is_empty(&self) -> bool {
        self.wheel.lock().is_empty()
    }

    /// Core scheduling loop
    ///
    /// On every ticker signal the wheel is advanced until its frame matches
    /// the frame derived from wall-clock elapsed time, so ticks missed while
    /// the task was stalled are replayed rather than dropped. Firings are
    /// routed only after the engine lock is released.
    ///
    /// 核心调度循环
    ///
    /// 每个 ticker 信号都将时间轮推进到与挂钟流逝时间推导出的帧一致，
    /// 因此任务阻塞期间错过的 tick 会被补上而不是丢弃。触发事件只在
    /// 释放引擎锁之后路由。
    async fn tick_loop(wheel: Arc<Mutex<Wheel>>, tick_interval: Duration) {
        let mut interval = tokio::time::interval(tick_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;

            let now = Instant::now();
            let firings = {
                let mut wheel_guard = wheel.lock();
                let target = wheel_guard.target_frame(now);

                let mut firings = Vec::new();
                while wheel_guard.current_frame() < target {
                    firings.append(&mut wheel_guard.advance());
                }
                firings
            };

            Self::run_firings(firings);
        }
    }

    /// Route the firings of one loop iteration, outside the engine lock
    ///
    /// Owned entries go to their group's dispatch function; unowned ones
    /// (including those whose group has since been dropped) run their
    /// callback as an independent tokio task.
    ///
    /// 路由一轮循环的触发事件，在引擎锁之外进行
    ///
    /// 有归属的条目交给其分组的分发函数；无归属的条目
    /// （包括分组已被丢弃的条目）把回调作为独立的 tokio 任务执行。
    fn run_firings(firings: Vec<Firing>) {
        for firing in firings {
            let (fired, owner) = firing.into_parts();

            if let Some(core) = owner.as_ref().and_then(|weak| weak.upgrade()) {
                // Membership is pruned on the final firing
                // 最后一次触发时清理成员关系
                if fired.is_last() {
                    core.forget(fired.id());
                }
                core.dispatch(fired);
            } else if let Some(callback) = fired.callback {
                tokio::spawn(async move {
                    callback.call().await;
                });
            }
        }
    }
}

impl Drop for TimerWheel {
    fn drop(&mut self) {
        if let Some(handle) = self.tick_handle.lock().take() {
            handle.abort();
        }
    }
}
