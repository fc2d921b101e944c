use std::fmt;

/// 时间轮错误类型 (Timing Wheel Error Type)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WheelError {
    /// tick 间隔无效（必须大于 0）
    /// Invalid tick interval (must be greater than 0)
    InvalidInterval {
        reason: &'static str,
    },

    /// 槽位数量无效（必须大于 0）
    /// Invalid slot count (must be greater than 0)
    InvalidSlotCount {
        slot_count: usize,
        reason: &'static str,
    },
}

impl fmt::Display for WheelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WheelError::InvalidInterval { reason } => {
                write!(f, "Invalid tick interval: {}", reason)
            }
            WheelError::InvalidSlotCount { slot_count, reason } => {
                write!(f, "Invalid slot count {}: {}", slot_count, reason)
            }
        }
    }
}

impl std::error::Error for WheelError {}
