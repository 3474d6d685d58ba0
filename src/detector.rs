//! 人脸检测服务接口
//!
//! 检测能力是外部黑盒：输入一帧画面，输出一组人脸边界框中心。
//! 通过 [`DetectionService`] 抽象出两种实现：
//! - 浏览器端由模型驱动的实现（`web::JsModelDetector`），首次调用时异步加载模型资产
//! - 测试用的脚本化假实现（`fixtures::ScriptedDetector`），按预定序列返回结果

use serde::Deserialize;
use thiserror::Error;

/// 单个人脸检测结果：归一化的边界框中心，量纲 [0,1]²
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceDetection {
    pub x_center: f64,
    pub y_center: f64,
}

/// 单帧检测结果
///
/// 瞬态值：分类结束后即丢弃，绝不跨帧保留。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionFrame {
    pub faces: Vec<FaceDetection>,
}

impl DetectionFrame {
    pub fn new(faces: Vec<FaceDetection>) -> Self {
        Self { faces }
    }
}

/// 检测服务错误
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("model load failed: {0}")]
    ModelLoad(String),
    #[error("inference failed: {0}")]
    Inference(String),
}

/// 检测能力接口：一帧进、一组检测结果出，可异步、可失败
// 整个监控器运行在单线程事件循环上，future 无需 Send 约束
#[allow(async_fn_in_trait)]
pub trait DetectionService {
    /// 帧的具体载体：浏览器端是 video 元素，测试中是空元组
    type Frame;

    async fn detect(&self, frame: &Self::Frame) -> Result<DetectionFrame, DetectError>;
}
