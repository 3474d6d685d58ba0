//! 摄像头资源接口
//!
//! 摄像头由生命周期管理器独占持有：启动时获取、停止时释放，
//! 任何其它组件都不得自行打开或关闭。会话的单例性由管理器保证，
//! 实现方只需提供获取与释放两个原语。

use thiserror::Error;

/// 摄像头错误
#[derive(Debug, Error)]
pub enum CameraError {
    /// 用户拒绝了摄像头权限。非致命：监控器转入 Failed 并展示持久警告。
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("camera unavailable: {0}")]
    Unavailable(String),
    #[error("camera release failed: {0}")]
    Release(String),
}

/// 摄像头获取/释放能力
// 单线程事件循环，future 无需 Send 约束
#[allow(async_fn_in_trait)]
pub trait CameraAccess {
    /// 活动会话句柄。每个监控器实例同一时刻至多持有一个。
    type Session;

    /// 请求摄像头访问。挂起点：等待平台权限授予。
    async fn acquire(&self) -> Result<Self::Session, CameraError>;

    /// 释放会话的所有底层轨道。对已停止的会话调用必须是无害的 no-op。
    fn release(&self, session: &Self::Session) -> Result<(), CameraError>;
}

/// 帧就绪度探针：每帧推理前的前置检查数据
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameProbe {
    /// 媒体元素 readyState（HAVE_CURRENT_DATA = 2）
    pub ready_state: u16,
    /// 当前视频宽度，0 表示尚无画面
    pub video_width: u32,
}

impl FrameProbe {
    /// 画面就绪：readyState ≥ 2 且已有非零宽度
    pub fn is_ready(self) -> bool {
        self.ready_state >= 2 && self.video_width > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_requires_ready_state_and_width() {
        assert!(FrameProbe { ready_state: 2, video_width: 320 }.is_ready());
        assert!(FrameProbe { ready_state: 4, video_width: 1 }.is_ready());
        assert!(!FrameProbe { ready_state: 1, video_width: 320 }.is_ready());
        assert!(!FrameProbe { ready_state: 2, video_width: 0 }.is_ready());
        assert!(!FrameProbe { ready_state: 0, video_width: 0 }.is_ready());
    }
}
