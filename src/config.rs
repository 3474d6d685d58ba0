//! 监控器配置
//!
//! 所有阈值集中在 [`MonitorConfig`]，默认值即线上行为。
//! 宿主页面可以通过 JS 传入 camelCase 的配置对象覆盖个别字段。

use serde::Deserialize;

/// 监控器配置
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitorConfig {
    /// 警告限流窗口（毫秒）。窗口内后到的信号被静默丢弃。
    pub throttle_ms: f64,
    /// 人脸中心 x 安全区下界，低于视为偏离屏幕
    pub center_x_min: f64,
    /// 人脸中心 x 安全区上界，高于视为偏离屏幕
    pub center_x_max: f64,
    /// 人脸中心 y 安全区下界，低于视为偏离屏幕
    pub center_y_min: f64,
    /// 低头判定阈值：人脸中心 y 高于此值视为低头
    pub looking_down_y: f64,
    /// 摄像头目标采集宽度
    pub capture_width: u32,
    /// 摄像头目标采集高度
    pub capture_height: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            throttle_ms: 3000.0,
            center_x_min: 0.3,
            center_x_max: 0.7,
            center_y_min: 0.3,
            looking_down_y: 0.75,
            capture_width: 320,
            capture_height: 240,
        }
    }
}
