//! 面试诚信监控 WASM 库
//!
//! 本库实现浏览器端的考试诚信监控器：伴随录制中的面试会话持续运行，
//! 在检测到作弊或环境篡改迹象（无人脸、多张人脸、视线偏离、切换标签页、
//! 窗口失焦、退出全屏、摄像头遮挡、设备变化、权限被拒）时给出限流后的
//! 人类可读警告。核心逻辑与平台解耦，可在无浏览器环境下完整测试。
//!
//! ## 模块
//! - `signal`: 违规信号与生命周期阶段定义
//! - `config`: 阈值与限流窗口配置
//! - `classify`: 人脸几何分类（纯函数）
//! - `throttle`: 警告限流器（先到先得、静默丢弃）
//! - `events`: 浏览器生命周期事件扇入
//! - `detector`: 人脸检测服务接口
//! - `camera`: 摄像头资源接口与帧就绪探针
//! - `sampler`: 逐帧采样策略
//! - `monitor`: 生命周期管理器（编排器）
//! - `fixtures`: 脚本化测试替身
//! - `web`: 浏览器平台实现（仅 wasm32）

pub mod camera;
pub mod classify;
pub mod config;
pub mod detector;
pub mod events;
pub mod fixtures;
pub mod monitor;
pub mod sampler;
pub mod signal;
pub mod throttle;

#[cfg(target_arch = "wasm32")]
pub mod web;

// 重新导出核心类型，方便外部使用
pub use camera::{CameraAccess, CameraError, FrameProbe};
pub use classify::classify;
pub use config::MonitorConfig;
pub use detector::{DetectError, DetectionFrame, DetectionService, FaceDetection};
pub use events::{EventSource, LifecycleEvent};
pub use monitor::Proctor;
pub use signal::{MonitorPhase, ViolationKind, ViolationSignal};
pub use throttle::{WarningState, WarningThrottler};
