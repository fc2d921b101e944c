//! 定时器分组模块 (Timer Group Module)
//!
//! 将一部分条目归入同一个调用方提供的分发函数之下，支持批量取消，
//! 并允许调用方拦截触发事件而不是由时间轮直接执行回调。
//! (Groups a subset of entries under one caller-supplied dispatch function,
//! enabling bulk cancellation and letting the caller intercept firings
//! instead of having the wheel run callbacks directly)

use crate::entry::{CallbackWrapper, FiredTimer, Repeat, TimerEntry, TimerId};
use crate::timer::TimerHandle;
use crate::wheel::Wheel;
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// Shared state of a timer group
///
/// Entries hold a `Weak` back-reference to this; the scheduling loop upgrades
/// it to route firings. The membership lock is separate from the engine lock
/// and is never held while calling into the engine.
///
/// 定时器分组的共享状态。条目持有指向它的 `Weak` 反向引用；
/// 调度循环将其升级以路由触发事件。成员锁与引擎锁是两把独立的锁，
/// 调用引擎时从不持有成员锁。
pub(crate) struct GroupCore {
    /// Caller-supplied dispatch function, invoked outside the engine lock
    ///
    /// 调用方提供的分发函数，在引擎锁之外调用
    dispatch: Box<dyn Fn(FiredTimer) + Send + Sync>,

    /// Ids of the entries registered through this group
    ///
    /// 通过此分组注册的条目 id 集合
    members: Mutex<FxHashSet<TimerId>>,
}

impl GroupCore {
    /// Route a fired timer to the group's dispatch function
    ///
    /// 将触发的定时器路由到分组的分发函数
    #[inline]
    pub(crate) fn dispatch(&self, fired: FiredTimer) {
        (self.dispatch)(fired);
    }

    /// Drop an id from the membership set
    ///
    /// 从成员集合中移除一个 id
    #[inline]
    pub(crate) fn forget(&self, id: TimerId) {
        self.members.lock().remove(&id);
    }
}

/// Timer group: a caller-defined grouping of entries sharing one dispatch
/// function and one bulk-lifecycle control point
///
/// Created via [`crate::TimerWheel::create_group`]. Entries added through the
/// group still live in the wheel; when one fires, the scheduling loop hands a
/// [`FiredTimer`] to the group's dispatch function instead of spawning the
/// callback itself. Dispatch runs outside the engine lock, so it may freely
/// add, remove, or reset timers on the same wheel.
///
/// 定时器分组：调用方定义的条目分组，共享一个分发函数和一个批量
/// 生命周期控制点。
///
/// 通过 [`crate::TimerWheel::create_group`] 创建。经分组添加的条目仍然
/// 存放在时间轮中；触发时调度循环将 [`FiredTimer`] 交给分组的分发函数，
/// 而不是自行派生回调任务。分发在引擎锁之外执行，因此可以自由地对
/// 同一个时间轮执行添加、移除或重置。
///
/// # 示例 (Examples)
/// ```no_run
/// use framewheel::{Repeat, TimerWheel, WheelConfig};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let timer = TimerWheel::new(WheelConfig::default());
///     timer.start();
///
///     // Route firings into our own handler instead of spawned tasks
///     // 将触发事件路由到自己的处理函数而不是派生任务
///     let group = timer.create_group(|fired| {
///         println!("timer {:?} fired (last: {})", fired.id(), fired.is_last());
///     });
///
///     group.add(Duration::from_millis(100), Repeat::Times(3), None);
///
///     tokio::time::sleep(Duration::from_millis(400)).await;
///     group.clear();
/// }
/// ```
#[derive(Clone)]
pub struct TimerGroup {
    core: Arc<GroupCore>,
    wheel: Arc<Mutex<Wheel>>,
}

impl TimerGroup {
    pub(crate) fn new(
        wheel: Arc<Mutex<Wheel>>,
        dispatch: impl Fn(FiredTimer) + Send + Sync + 'static,
    ) -> Self {
        Self {
            core: Arc::new(GroupCore {
                dispatch: Box::new(dispatch),
                members: Mutex::new(FxHashSet::default()),
            }),
            wheel,
        }
    }

    /// Add a timer entry owned by this group
    ///
    /// The entry is inserted into the wheel like any other, and additionally
    /// recorded under the group. When it fires, the group's dispatch function
    /// receives it.
    ///
    /// 添加一个归属此分组的定时器条目
    ///
    /// 条目像普通条目一样插入时间轮，同时记录在分组下。
    /// 触发时由分组的分发函数接收。
    pub fn add(
        &self,
        delay: std::time::Duration,
        repeat: Repeat,
        callback: Option<CallbackWrapper>,
    ) -> TimerHandle {
        let entry = TimerEntry::new(delay, repeat, callback, Some(Arc::downgrade(&self.core)));
        let id = entry.id;

        // Record membership before the engine sees the entry; neither lock
        // is held while taking the other
        // 在引擎看到条目之前先记录成员关系；两把锁从不互相嵌套
        self.core.members.lock().insert(id);
        self.wheel.lock().insert(entry);

        TimerHandle::new(id, Arc::clone(&self.wheel))
    }

    /// Remove a member entry by id; silent no-op if it is not a member or has
    /// already been evicted
    ///
    /// 按 id 移除成员条目；非成员或已被移除时静默无操作
    pub fn remove(&self, id: TimerId) {
        let was_member = self.core.members.lock().remove(&id);
        if was_member {
            self.wheel.lock().cancel(id);
        }
    }

    /// Remove every member entry from the wheel and reset the membership set
    ///
    /// Used for bulk cancellation when an owning subsystem shuts down. The
    /// member ids are drained first so the engine lock is taken without the
    /// membership lock held.
    ///
    /// 从时间轮中移除所有成员条目并清空成员集合
    ///
    /// 用于所属子系统关闭时的批量取消。先取出成员 id 列表，
    /// 再在不持有成员锁的情况下获取引擎锁。
    pub fn clear(&self) {
        let ids: Vec<TimerId> = self.core.members.lock().drain().collect();

        let mut wheel = self.wheel.lock();
        for id in ids {
            wheel.cancel(id);
        }
    }

    /// Number of member entries (including ones that may have just finished
    /// firing but are not yet pruned)
    ///
    /// 成员条目数量（可能包含刚触发完毕但尚未清理的条目）
    pub fn len(&self) -> usize {
        self.core.members.lock().len()
    }

    /// Check if the group has no members
    ///
    /// 检查分组是否没有成员
    pub fn is_empty(&self) -> bool {
        self.core.members.lock().is_empty()
    }
}
