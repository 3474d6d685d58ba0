//! 帧采样策略
//!
//! 采样由采集设备自身的帧调度机制驱动（浏览器端是
//! requestVideoFrameCallback），监控器不自建定时器。
//! 每帧推理前先做就绪检查：画面未就绪直接产出 CameraBlocked 并跳过推理；
//! 推理失败的帧静默跳过，下一帧就是天然的重试。

use crate::camera::FrameProbe;
use crate::classify::classify;
use crate::config::MonitorConfig;
use crate::detector::DetectionFrame;
use crate::signal::{ViolationKind, ViolationSignal};

/// 单帧的前置裁决
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameDecision {
    /// 画面未就绪：发出信号，本帧不做推理
    Blocked(ViolationSignal),
    /// 画面就绪：交给检测服务
    Inspect,
}

/// 帧采样器：就绪门控 + 分类委托
pub struct FrameSampler {
    config: MonitorConfig,
}

impl FrameSampler {
    pub fn new(config: MonitorConfig) -> Self {
        Self { config }
    }

    /// 推理前的就绪门控
    pub fn gate(&self, probe: FrameProbe, now: f64) -> FrameDecision {
        if probe.is_ready() {
            FrameDecision::Inspect
        } else {
            FrameDecision::Blocked(ViolationSignal::new(ViolationKind::CameraBlocked, now))
        }
    }

    /// 对检测结果做几何分类
    pub fn evaluate(&self, frame: &DetectionFrame, now: f64) -> Option<ViolationSignal> {
        classify(frame, &self.config, now)
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }
}
