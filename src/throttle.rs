//! 警告限流器
//!
//! 两条信号路径（帧分类与生命周期事件）汇聚到的唯一出口，
//! 也是 [`WarningState`] 的唯一修改点。限流策略是"先到先得、静默丢弃"：
//! 距上次接受不足窗口时长的信号直接丢掉，不排队、不合并、不统计。
//! 同一窗口内两条路径谁先被调度谁生效，顺序由宿主事件循环决定。
//!
//! 对外的观察者回调由编排器（`monitor::Proctor`）负责，
//! 限流器本身只做纯粹的状态与策略。

use crate::signal::ViolationSignal;

/// 当前警告状态：每个监控器实例恰有一份
#[derive(Debug, Clone)]
pub struct WarningState {
    /// 当前展示的提示文案，None 表示无警告
    pub message: Option<String>,
    /// 上次接受信号的时刻（毫秒）
    pub last_emitted_at: f64,
}

/// 警告限流器
pub struct WarningThrottler {
    window_ms: f64,
    state: WarningState,
}

impl WarningThrottler {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            state: WarningState {
                message: None,
                // 负无穷保证首个信号必被接受
                last_emitted_at: f64::NEG_INFINITY,
            },
        }
    }

    /// 接受或丢弃一条信号
    ///
    /// 距上次接受超过窗口时长时覆盖当前警告并返回 true，
    /// 否则静默丢弃并返回 false。被丢弃的信号不会延迟重放。
    pub fn accept(&mut self, signal: &ViolationSignal) -> bool {
        if signal.timestamp - self.state.last_emitted_at <= self.window_ms {
            return false;
        }
        self.state.message = Some(signal.message.to_string());
        self.state.last_emitted_at = signal.timestamp;
        true
    }

    /// 当前展示的警告文案
    pub fn message(&self) -> Option<&str> {
        self.state.message.as_deref()
    }

    pub fn state(&self) -> &WarningState {
        &self.state
    }
}
