use crate::config::WheelConfig;
use crate::entry::{EntryLocation, Firing, Repeat, TimerEntry, TimerId};
use rustc_hash::FxHashMap;
use std::time::{Duration, Instant};

/// Timing wheel data structure
///
/// A single-layer hashed wheel: an entry lives in slot `frame % slot_count`,
/// but only fires when its target frame equals the engine frame. Slot
/// membership is necessary, frame equality is authoritative.
///
/// 时间轮数据结构
///
/// 单层哈希时间轮：条目存放在 `frame % slot_count` 槽位中，
/// 但只有目标帧等于引擎当前帧时才触发。槽位归属是必要条件，
/// 帧相等才是权威判据。
pub(crate) struct Wheel {
    /// Slot array, each slot stores a group of timer entries
    ///
    /// 槽数组，每个槽存储一组定时器条目
    slots: Vec<Vec<TimerEntry>>,

    /// Current frame pointer (monotonic tick index)
    ///
    /// 当前帧指针（单调递增的 tick 索引）
    frame: u64,

    /// Slot count
    ///
    /// 槽数量
    slot_count: usize,

    /// Tick interval in nanoseconds (u64) - avoid repeated Duration conversion
    ///
    /// tick 间隔（纳秒，u64）- 避免重复的 Duration 转换
    interval_ns: u64,

    /// Entry index for fast lookup and cancellation
    ///
    /// 条目索引，用于快速查找和取消
    index: FxHashMap<TimerId, EntryLocation>,

    /// Wall-clock anchor; frame n covers `(start_time + n*I, start_time + (n+1)*I]`
    ///
    /// 挂钟锚点；第 n 帧覆盖 `(start_time + n*I, start_time + (n+1)*I]`
    start_time: Instant,
}

impl Wheel {
    /// Create new timing wheel anchored at `start_time`
    ///
    /// # Notes
    /// Configuration parameters have been validated in WheelConfig::builder().build(), so this method will not fail.
    ///
    /// 创建新的时间轮，锚定在 `start_time`
    ///
    /// # 注意
    /// 配置参数已在 WheelConfig::builder().build() 中验证，因此此方法不会失败。
    pub(crate) fn new(config: &WheelConfig, start_time: Instant) -> Self {
        let mut slots = Vec::with_capacity(config.slot_count);
        // Pre-allocate capacity for each slot to reduce subsequent reallocation during push
        // 为每个槽预分配容量以减少后续 push 时的重新分配
        for _ in 0..config.slot_count {
            slots.push(Vec::with_capacity(4));
        }

        Self {
            slots,
            frame: 0,
            slot_count: config.slot_count,
            interval_ns: config.tick_interval.as_nanos() as u64,
            index: FxHashMap::default(),
            start_time,
        }
    }

    /// Get current frame
    ///
    /// 获取当前帧
    #[inline]
    pub(crate) fn current_frame(&self) -> u64 {
        self.frame
    }

    /// Number of live entries
    ///
    /// 存活条目数量
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if the timing wheel is empty
    ///
    /// 检查时间轮是否为空
    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Check if an entry is still scheduled
    ///
    /// 检查条目是否仍在调度中
    #[inline]
    pub(crate) fn contains(&self, id: TimerId) -> bool {
        self.index.contains_key(&id)
    }

    /// The frame the wheel should have reached by `now`
    ///
    /// 到 `now` 时刻时间轮应当到达的帧
    #[inline]
    pub(crate) fn target_frame(&self, now: Instant) -> u64 {
        let elapsed_ns = now.saturating_duration_since(self.start_time).as_nanos() as u64;
        elapsed_ns / self.interval_ns
    }

    /// Map an absolute deadline to its target frame
    ///
    /// Frame `f` fires at wall time `start + (f+1)*I`, so the first frame at
    /// or after a deadline `t` is `ceil((t - start) / I) - 1`. Deadlines at
    /// or before the anchor collapse to frame 0; the caller clamps against
    /// the current frame so past deadlines fire on the next tick.
    ///
    /// 将绝对截止时刻映射到目标帧
    ///
    /// 第 `f` 帧在挂钟时刻 `start + (f+1)*I` 触发，因此不早于截止时刻 `t`
    /// 的第一帧是 `ceil((t - start) / I) - 1`。不晚于锚点的截止时刻
    /// 归到第 0 帧；调用方再对当前帧钳制，使过期的截止时刻在下一个 tick 触发。
    #[inline]
    fn frame_for(&self, deadline: Instant) -> u64 {
        let elapsed_ns = deadline
            .saturating_duration_since(self.start_time)
            .as_nanos() as u64;
        let ticks = (elapsed_ns + self.interval_ns - 1) / self.interval_ns;
        ticks.saturating_sub(1)
    }

    /// Place an entry into the ring at its next deadline
    ///
    /// The frame is clamped to be no earlier than `min_frame`, so an entry
    /// whose deadline has already passed still fires on the next advance.
    ///
    /// 按下一个截止时刻将条目放入槽环。帧被钳制为不早于 `min_frame`，
    /// 因此截止时刻已过的条目仍会在下一次推进时触发。
    fn place(&mut self, mut entry: TimerEntry, min_frame: u64) {
        let frame = self.frame_for(entry.next_deadline()).max(min_frame);
        let slot_index = (frame % self.slot_count as u64) as usize;
        entry.frame = frame;

        let id = entry.id;
        // The length before insertion is the index of the new entry
        // 插入前的长度就是新条目的索引
        let vec_index = self.slots[slot_index].len();
        self.slots[slot_index].push(entry);
        self.index.insert(id, EntryLocation::new(slot_index, vec_index));
    }

    /// Insert a timer entry
    ///
    /// # Returns
    /// Unique identifier of the entry (TimerId)
    ///
    /// # Implementation Details
    /// - Target frame derived from the entry's wall-clock deadline, not a tick count
    /// - Zero (or already-elapsed) delay schedules firing on the next tick
    /// - Maintains the id index to support O(1) lookup and cancellation
    ///
    /// 插入定时器条目
    ///
    /// # 返回值
    /// 条目的唯一标识符（TimerId）
    ///
    /// # 实现细节
    /// - 目标帧由条目的挂钟截止时刻推导，而不是 tick 计数
    /// - 零延迟（或已过期的延迟）安排在下一个 tick 触发
    /// - 维护 id 索引以支持 O(1) 查找和取消
    #[inline]
    pub(crate) fn insert(&mut self, entry: TimerEntry) -> TimerId {
        let id = entry.id;
        let min_frame = self.frame;
        self.place(entry, min_frame);
        id
    }

    /// Cancel a timer entry
    ///
    /// # Returns
    /// Returns true if the entry exists and is successfully cancelled, otherwise returns false
    ///
    /// 取消定时器条目
    ///
    /// # 返回值
    /// 如果条目存在且成功取消则返回 true，否则返回 false
    #[inline]
    pub(crate) fn cancel(&mut self, id: TimerId) -> bool {
        self.take(id).is_some()
    }

    /// Remove an entry from its slot and the index, returning it
    ///
    /// 从槽位和索引中移除条目并返回
    fn take(&mut self, id: TimerId) -> Option<TimerEntry> {
        let location = self.index.remove(&id)?;

        let slot = &mut self.slots[location.slot_index];

        // Boundary check and ID verification
        // 边界检查和 ID 验证
        if location.vec_index >= slot.len() || slot[location.vec_index].id != id {
            // Index inconsistent, re-insert location to maintain data consistency
            // 索引不一致，重新插入位置以保持数据一致性
            self.index.insert(id, location);
            return None;
        }

        // Use swap_remove to remove the entry, then fix up the swapped entry's index
        // 使用 swap_remove 移除条目，然后修正被交换条目的索引
        let removed = slot.swap_remove(location.vec_index);

        // If a swap occurred (vec_index is not the last element)
        // 如果发生了交换（vec_index 不是最后一个元素）
        if location.vec_index < slot.len() {
            let swapped_id = slot[location.vec_index].id;
            if let Some(swapped_location) = self.index.get_mut(&swapped_id) {
                swapped_location.vec_index = location.vec_index;
            }
        }

        debug_assert_eq!(removed.id, id);
        Some(removed)
    }

    /// Reschedule an entry (the TimerId is kept)
    ///
    /// # Parameters
    /// - `id`: Entry to reschedule
    /// - `new_delay`: New delay, anchored at the current instant
    /// - `new_repeat`: New repeat policy
    ///
    /// # Returns
    /// Returns true if the entry is still live, false if it has already been
    /// evicted (no mutation occurs in that case).
    ///
    /// # Implementation Details
    /// Remove-then-reinsert is the only safe way to reschedule: mutating a
    /// live entry's delay in place would violate the slot/frame invariant.
    /// The old schedule leaves no trace; `create_time` is reset to now and
    /// `fired_count` to 0.
    ///
    /// 重新调度条目（保留原始 TimerId）
    ///
    /// # 返回值
    /// 条目仍存活则返回 true；已被移除则返回 false（此时不做任何修改）。
    ///
    /// # 实现细节
    /// 先移除再重插是唯一安全的重调度方式：就地修改存活条目的延迟会
    /// 破坏槽位/帧不变量。旧调度不留痕迹；`create_time` 重置为当前时刻，
    /// `fired_count` 归零。
    pub(crate) fn reset(&mut self, id: TimerId, new_delay: Duration, new_repeat: Repeat) -> bool {
        let mut entry = match self.take(id) {
            Some(entry) => entry,
            None => return false,
        };

        entry.delay = new_delay;
        entry.repeat = new_repeat;
        entry.fired_count = 0;
        entry.create_time = Instant::now();

        let min_frame = self.frame;
        self.place(entry, min_frame);
        true
    }

    /// Remove every entry from every slot and clear the index
    ///
    /// 从所有槽位移除所有条目并清空索引
    pub(crate) fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.clear();
        }
        self.index.clear();
    }

    /// Re-anchor the wheel and re-place every live entry
    ///
    /// Used by Start: the frame counter restarts at 0 against the new anchor,
    /// and entries keep their own `create_time`, so pre-start registrations
    /// fire relative to when they were added (past deadlines collapse to the
    /// next tick) instead of being replayed in a catch-up burst.
    ///
    /// 重新锚定时间轮并重新放置所有存活条目
    ///
    /// 供 Start 使用：帧计数器相对新锚点从 0 重新开始，条目保留各自的
    /// `create_time`，因此启动前注册的条目相对其注册时刻触发
    /// （已过期的截止时刻归到下一个 tick），而不是被补帧突发重放。
    pub(crate) fn restart(&mut self, now: Instant) {
        self.start_time = now;
        self.frame = 0;

        let mut live = Vec::with_capacity(self.index.len());
        for slot in &mut self.slots {
            live.append(slot);
        }
        self.index.clear();

        for entry in live {
            self.place(entry, 0);
        }
    }

    /// Advance the wheel by one frame, collecting due entries
    ///
    /// # Returns
    /// The firings of this frame; the caller routes them after releasing the
    /// engine lock. No caller-supplied code runs in here.
    ///
    /// # Implementation Details
    /// - Scans the slot `frame % slot_count`; an entry is due iff its target
    ///   frame equals the engine frame
    /// - The scan never mutates the slot container; due entries are staged
    ///   and the removals/reinsertions applied only after the scan completes
    /// - Entries with repeats remaining get their count incremented and are
    ///   re-placed at the next drift-free deadline; staged mutations apply
    ///   within this call, so a short-period entry re-fires correctly while
    ///   the loop is catching up on missed ticks
    ///
    /// 推进时间轮一帧，收集到期条目
    ///
    /// # 返回值
    /// 本帧的触发列表；调用方在释放引擎锁后再路由。此处不执行任何
    /// 调用方提供的代码。
    ///
    /// # 实现细节
    /// - 扫描 `frame % slot_count` 槽位；条目到期当且仅当其目标帧等于引擎帧
    /// - 扫描过程中从不修改槽容器；到期条目先暂存，扫描完成后才应用
    ///   移除/重插
    /// - 还有剩余次数的条目递增计数并按下一个无漂移截止时刻重新放置；
    ///   暂存的修改在本次调用内应用，因此短周期条目在补帧期间也能
    ///   正确地再次触发
    pub(crate) fn advance(&mut self) -> Vec<Firing> {
        let slot_index = (self.frame % self.slot_count as u64) as usize;

        let mut firings = Vec::new();
        let mut due = Vec::new();

        // Scan pass: snapshot which entries are due, mutate nothing
        // 扫描阶段：快照哪些条目到期，不做任何修改
        for (vec_index, entry) in self.slots[slot_index].iter().enumerate() {
            if entry.frame == self.frame {
                let finished = entry.repeat.exhausted_after(entry.fired_count + 1);
                firings.push(Firing {
                    id: entry.id,
                    callback: entry.callback.clone(),
                    owner: entry.owner.clone(),
                    finished,
                });
                due.push(vec_index);
            }
        }

        self.frame += 1;

        // Apply pass: remove due entries back-to-front, reinsert survivors
        // 应用阶段：从后向前移除到期条目，重插存活者
        let mut to_reinsert = Vec::new();
        for &vec_index in due.iter().rev() {
            let slot = &mut self.slots[slot_index];
            let mut entry = slot.swap_remove(vec_index);
            self.index.remove(&entry.id);

            if vec_index < slot.len() {
                let swapped_id = slot[vec_index].id;
                if let Some(swapped_location) = self.index.get_mut(&swapped_id) {
                    swapped_location.vec_index = vec_index;
                }
            }

            entry.fired_count += 1;
            if !entry.repeat.exhausted_after(entry.fired_count) {
                to_reinsert.push(entry);
            }
        }

        // The frame has already been incremented, so the clamp guarantees a
        // reinserted entry fires no earlier than the next advance
        // 帧已经递增，钳制保证重插的条目不早于下一次推进触发
        let min_frame = self.frame;
        for entry in to_reinsert {
            self.place(entry, min_frame);
        }

        firings
    }

    /// Slot index an entry currently lives in, if scheduled
    ///
    /// 条目当前所在的槽索引（若仍在调度中）
    #[cfg(test)]
    pub(crate) fn slot_of(&self, id: TimerId) -> Option<usize> {
        self.index.get(&id).map(|loc| loc.slot_index)
    }

    /// Target frame of a scheduled entry
    ///
    /// 已调度条目的目标帧
    #[cfg(test)]
    pub(crate) fn frame_of(&self, id: TimerId) -> Option<u64> {
        let location = self.index.get(&id)?;
        Some(self.slots[location.slot_index][location.vec_index].frame)
    }
}
