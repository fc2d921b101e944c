//! 时间轮配置模块 (Timing Wheel Configuration Module)
//!
//! 提供配置结构和 Builder 模式，用于配置时间轮的 tick 间隔与槽位数量。
//! (Provides configuration structure and Builder pattern for configuring the
//! tick interval and slot count of the timing wheel)

use crate::error::WheelError;
use std::time::Duration;

/// 平台 tick 间隔下限 (Platform tick interval floor)
///
/// Windows 的系统定时器精度较粗，过小的 tick 间隔只会空转，
/// 因此配置构建时向上钳制到此下限。
/// (Windows system timers have coarse resolution; a smaller tick interval
/// would just spin, so build() clamps the effective interval up to this floor)
pub const MIN_TICK_INTERVAL: Duration = if cfg!(windows) {
    Duration::from_millis(15)
} else {
    Duration::from_millis(1)
};

/// 时间轮配置 (Timing Wheel Configuration)
///
/// tick 间隔和槽位数量是仅有的两个必需参数。
/// (Tick interval and slot count are the only required parameters)
///
/// # 示例 (Examples)
/// ```no_run
/// use framewheel::WheelConfig;
/// use std::time::Duration;
///
/// // 使用默认配置 (Use default configuration)
/// let config = WheelConfig::default();
///
/// // 使用 Builder 自定义配置 (Use Builder to customize configuration)
/// let config = WheelConfig::builder()
///     .tick_interval(Duration::from_millis(100))
///     .slot_count(10)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct WheelConfig {
    /// 每个 tick 的时间长度（构建后为钳制过的有效值）
    /// (Duration of each tick; the clamped effective value after build)
    pub tick_interval: Duration,
    /// 槽位数量 (Number of slots)
    pub slot_count: usize,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(100),
            slot_count: 50,
        }
    }
}

impl WheelConfig {
    /// 创建配置构建器 (Create configuration builder)
    pub fn builder() -> WheelConfigBuilder {
        WheelConfigBuilder::default()
    }
}

/// 时间轮配置构建器 (Timing Wheel Configuration Builder)
#[derive(Debug, Clone)]
pub struct WheelConfigBuilder {
    tick_interval: Duration,
    slot_count: usize,
}

impl Default for WheelConfigBuilder {
    fn default() -> Self {
        let config = WheelConfig::default();
        Self {
            tick_interval: config.tick_interval,
            slot_count: config.slot_count,
        }
    }
}

impl WheelConfigBuilder {
    /// 设置 tick 间隔 (Set tick interval)
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// 设置槽位数量 (Set slot count)
    pub fn slot_count(mut self, count: usize) -> Self {
        self.slot_count = count;
        self
    }

    /// 构建配置并进行验证
    ///      (Build and validate configuration)
    ///
    /// # 返回 (Returns)
    /// - `Ok(WheelConfig)`: 配置有效
    ///      (Configuration is valid)
    /// - `Err(WheelError)`: 配置验证失败
    ///      (Configuration validation failed)
    ///
    /// # 验证规则 (Validation Rules)
    /// - tick 间隔必须大于 0
    ///      (Tick interval must be greater than 0)
    /// - 槽位数量必须大于 0
    ///      (Slot count must be greater than 0)
    /// - 小于平台下限的 tick 间隔被钳制到 [`MIN_TICK_INTERVAL`]，
    ///   配置报告钳制后的值而不是静默漂移
    ///      (A tick interval below the platform floor is clamped up to
    ///      [`MIN_TICK_INTERVAL`]; the config reports the clamped value
    ///      instead of silently drifting)
    pub fn build(self) -> Result<WheelConfig, WheelError> {
        if self.tick_interval.is_zero() {
            return Err(WheelError::InvalidInterval {
                reason: "tick interval must be greater than 0",
            });
        }

        if self.slot_count == 0 {
            return Err(WheelError::InvalidSlotCount {
                slot_count: self.slot_count,
                reason: "slot count must be greater than 0",
            });
        }

        Ok(WheelConfig {
            tick_interval: self.tick_interval.max(MIN_TICK_INTERVAL),
            slot_count: self.slot_count,
        })
    }
}
