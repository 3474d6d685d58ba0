//! 违规信号类型定义
//!
//! 监控器产出的所有警告都以 [`ViolationSignal`] 的形式流经警告限流器。
//! 信号来自两条独立路径：
//! - 帧路径：摄像头帧 → 人脸检测 → 几何分类
//! - 事件路径：浏览器生命周期事件（切换标签页、窗口失焦等）的直接映射

use serde::Serialize;

/// 违规类别
///
/// 每个类别对应一条固定的提示文案，见 [`ViolationKind::message`]。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ViolationKind {
    /// 画面中未检测到人脸
    NoFace,
    /// 画面中出现多张人脸
    MultipleFaces,
    /// 视线偏离屏幕（人脸中心超出安全区域）
    OffScreen,
    /// 低头（人脸中心过低）
    LookingDown,
    /// 摄像头画面不可用（未就绪或被遮挡）
    CameraBlocked,
    /// 切换了标签页
    TabSwitch,
    /// 窗口失去焦点
    WindowBlur,
    /// 退出了全屏模式
    FullscreenExit,
    /// 媒体设备发生变化
    DeviceChange,
    /// 摄像头权限被拒绝
    PermissionDenied,
}

impl ViolationKind {
    /// 该类别对应的提示文案
    pub fn message(self) -> &'static str {
        match self {
            ViolationKind::NoFace => "No face detected. Please stay visible in the camera frame.",
            ViolationKind::MultipleFaces => {
                "Multiple faces detected. Only the candidate may appear on camera."
            }
            ViolationKind::OffScreen => "You appear to be looking away from the screen.",
            ViolationKind::LookingDown => {
                "You appear to be looking down. Keep your eyes on the screen."
            }
            ViolationKind::CameraBlocked => {
                "Camera feed unavailable. Make sure the camera is not blocked."
            }
            ViolationKind::TabSwitch => "Tab switch detected. Stay on the interview tab.",
            ViolationKind::WindowBlur => "Window lost focus. Keep the interview window focused.",
            ViolationKind::FullscreenExit => "Fullscreen exited. Please return to fullscreen mode.",
            ViolationKind::DeviceChange => "A media device change was detected.",
            ViolationKind::PermissionDenied => "Camera permission denied. Monitoring is disabled.",
        }
    }
}

/// 单条违规信号
///
/// 瞬态值：被限流器接受后只保留文案，信号本身不做任何持久化。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViolationSignal {
    pub kind: ViolationKind,
    pub message: &'static str,
    /// 产生时刻（毫秒，performance.now 语义）
    pub timestamp: f64,
}

impl ViolationSignal {
    pub fn new(kind: ViolationKind, timestamp: f64) -> Self {
        Self {
            kind,
            message: kind.message(),
            timestamp,
        }
    }
}

/// 监控器生命周期阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorPhase {
    Idle,
    Starting,
    Active,
    Stopping,
    Stopped,
    /// 终态：摄像头获取失败。监控器保持挂载并展示持久警告，不抛出错误。
    Failed,
}

impl MonitorPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            MonitorPhase::Idle => "idle",
            MonitorPhase::Starting => "starting",
            MonitorPhase::Active => "active",
            MonitorPhase::Stopping => "stopping",
            MonitorPhase::Stopped => "stopped",
            MonitorPhase::Failed => "failed",
        }
    }
}
