use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use crate::group::GroupCore;

/// Global unique timer ID generator
///
/// 全局唯一定时器 ID 生成器
static NEXT_TIMER_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for timer entries
///
/// 定时器条目唯一标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

impl TimerId {
    /// Generate a new unique timer ID (internal use)
    ///
    /// 生成一个新的唯一定时器 ID (内部使用)
    #[inline]
    pub(crate) fn new() -> Self {
        TimerId(NEXT_TIMER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the numeric value of the timer ID
    ///
    /// 获取定时器 ID 的数值
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Repeat policy for timer entries
///
/// `Times(1)` fires once; `Times(n)` fires n times; `Forever` fires until
/// explicitly removed.
///
/// 定时器条目的重复策略。`Times(1)` 触发一次；`Times(n)` 触发 n 次；
/// `Forever` 一直触发直到被显式移除。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// Fire a fixed number of times
    ///
    /// 触发固定次数
    Times(u32),
    /// Fire indefinitely until removed
    ///
    /// 无限触发直到移除
    Forever,
}

impl Repeat {
    /// Fire exactly once
    ///
    /// 只触发一次
    pub const ONCE: Repeat = Repeat::Times(1);

    /// Normalize a raw signed count into a repeat policy
    ///
    /// Zero means fire once; any negative value means fire forever.
    ///
    /// 将原始有符号计数归一化为重复策略：0 表示触发一次，负数表示无限触发。
    #[inline]
    pub fn from_count(count: i64) -> Self {
        if count < 0 {
            Repeat::Forever
        } else if count == 0 {
            Repeat::Times(1)
        } else {
            Repeat::Times(count as u32)
        }
    }

    /// Whether `fired_count` firings exhaust this policy
    ///
    /// `fired_count` 次触发后该策略是否已耗尽
    #[inline]
    pub(crate) fn exhausted_after(&self, fired_count: u32) -> bool {
        match self {
            Repeat::Times(n) => fired_count >= *n,
            Repeat::Forever => false,
        }
    }
}

/// Timer Callback Trait
///
/// Types implementing this trait can be used as timer callbacks.
///
/// 可实现此特性的类型可以作为定时器回调函数。
///
/// # Examples (示例)
///
/// ```
/// use framewheel::TimerCallback;
/// use std::future::Future;
/// use std::pin::Pin;
///
/// struct MyCallback;
///
/// impl TimerCallback for MyCallback {
///     fn call(&self) -> Pin<Box<dyn Future<Output = ()> + Send>> {
///         Box::pin(async {
///             println!("Timer callback executed!");
///         })
///     }
/// }
/// ```
pub trait TimerCallback: Send + Sync + 'static {
    /// Execute callback, returns a Future
    ///
    /// 执行回调函数，返回一个 Future
    fn call(&self) -> Pin<Box<dyn Future<Output = ()> + Send>>;
}

/// Implement TimerCallback trait for closures
///
/// Supports Fn() -> Future closures, can be called multiple times, suitable for repeating timers
///
/// 实现 TimerCallback 特性的类型，支持 Fn() -> Future 闭包，可以多次调用，适合重复触发的定时器
impl<F, Fut> TimerCallback for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn call(&self) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(self())
    }
}

/// Callback wrapper for standardized callback creation and management
///
/// Callback 包装器，用于标准化回调创建和管理
///
/// # Examples (示例)
///
/// ```
/// use framewheel::CallbackWrapper;
///
/// let callback = CallbackWrapper::new(|| async {
///     println!("Timer fired!"); // 定时器触发
/// });
/// ```
#[derive(Clone)]
pub struct CallbackWrapper {
    callback: Arc<dyn TimerCallback>,
}

impl CallbackWrapper {
    /// Create a new callback wrapper
    ///
    /// 创建一个新的回调包装器
    #[inline]
    pub fn new(callback: impl TimerCallback) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Call the callback function
    ///
    /// 调用回调函数
    #[inline]
    pub fn call(&self) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        self.callback.call()
    }
}

/// A fired timer, handed to an owner group's dispatch function
///
/// Carries the entry's callback so the owner decides how and when to run it.
///
/// 已触发的定时器，交给所属分组的分发函数。携带条目的回调，
/// 由分组决定如何以及何时执行。
pub struct FiredTimer {
    pub(crate) id: TimerId,
    pub(crate) callback: Option<CallbackWrapper>,
    pub(crate) finished: bool,
}

impl FiredTimer {
    /// Get the timer ID
    ///
    /// 获取定时器 ID
    #[inline]
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Get the entry's callback, if any
    ///
    /// 获取条目的回调（如果有）
    #[inline]
    pub fn callback(&self) -> Option<&CallbackWrapper> {
        self.callback.as_ref()
    }

    /// Whether this was the entry's final firing
    ///
    /// 这是否是该条目的最后一次触发
    #[inline]
    pub fn is_last(&self) -> bool {
        self.finished
    }
}

/// A due entry collected by `advance`, routed after the engine lock is released
///
/// `advance` 收集到的到期条目，在释放引擎锁之后再路由
pub(crate) struct Firing {
    pub(crate) id: TimerId,
    pub(crate) callback: Option<CallbackWrapper>,
    pub(crate) owner: Option<Weak<GroupCore>>,
    pub(crate) finished: bool,
}

impl Firing {
    /// Split into the public fired value and its routing information
    ///
    /// 拆分为公开的触发值和其路由信息
    #[inline]
    pub(crate) fn into_parts(self) -> (FiredTimer, Option<Weak<GroupCore>>) {
        let fired = FiredTimer {
            id: self.id,
            callback: self.callback,
            finished: self.finished,
        };
        (fired, self.owner)
    }
}

/// Timer entry stored in a wheel slot
///
/// 存储在时间轮槽位中的定时器条目
pub(crate) struct TimerEntry {
    /// Unique identifier
    ///
    /// 唯一标识符
    pub(crate) id: TimerId,

    /// Period between firings (also the initial delay)
    ///
    /// 触发间隔（同时是初始延迟）
    pub(crate) delay: Duration,

    /// Async callback, optional
    ///
    /// 异步回调，可选
    pub(crate) callback: Option<CallbackWrapper>,

    /// Repeat policy
    ///
    /// 重复策略
    pub(crate) repeat: Repeat,

    /// Firings so far; the next deadline is `create_time + (fired_count + 1) * delay`
    ///
    /// 已触发次数；下一个截止时刻是 `create_time + (fired_count + 1) * delay`
    pub(crate) fired_count: u32,

    /// Wall-clock anchor of this entry's schedule
    ///
    /// 该条目调度序列的挂钟锚点
    pub(crate) create_time: Instant,

    /// Target frame, the authoritative firing condition
    ///
    /// 目标帧，触发的权威判据
    pub(crate) frame: u64,

    /// Owner group, if registered through one
    ///
    /// 所属分组（若通过分组注册）
    pub(crate) owner: Option<Weak<GroupCore>>,
}

impl TimerEntry {
    /// Create a new entry anchored at the current instant
    ///
    /// 创建一个以当前时刻为锚点的新条目
    pub(crate) fn new(
        delay: Duration,
        repeat: Repeat,
        callback: Option<CallbackWrapper>,
        owner: Option<Weak<GroupCore>>,
    ) -> Self {
        Self {
            id: TimerId::new(),
            delay,
            callback,
            repeat,
            fired_count: 0,
            create_time: Instant::now(),
            frame: 0,
            owner,
        }
    }

    /// Absolute deadline of the next firing, drift-free
    ///
    /// Computed from the entry's own anchor so rounding never compounds
    /// across repeats.
    ///
    /// 下一次触发的绝对截止时刻，无漂移。从条目自身的锚点计算，
    /// 舍入不会随重复次数累积。
    #[inline]
    pub(crate) fn next_deadline(&self) -> Instant {
        self.create_time + self.delay * (self.fired_count + 1)
    }
}

/// Entry location within the slot ring, for O(1) keyed removal
///
/// 条目在槽环中的位置，用于 O(1) 按键移除
#[derive(Debug, Clone, Copy)]
pub(crate) struct EntryLocation {
    /// Slot index
    ///
    /// 槽索引
    pub slot_index: usize,
    /// Index position of the entry in the slot Vec
    ///
    /// 条目在槽向量中的索引位置
    pub vec_index: usize,
}

impl EntryLocation {
    /// Create a new entry location
    ///
    /// 创建一个新的条目位置
    #[inline(always)]
    pub fn new(slot_index: usize, vec_index: usize) -> Self {
        Self {
            slot_index,
            vec_index,
        }
    }
}
