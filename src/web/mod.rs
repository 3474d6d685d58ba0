//! 浏览器平台实现
//!
//! 三种平台能力的 web-sys 实现加一个 `#[wasm_bindgen]` 门面：
//! - [`WebCamera`]: getUserMedia 获取 320×240 视频流
//! - [`DomEventSource`]: 四个 DOM 生命周期监听器
//! - [`JsModelDetector`]: 宿主 JS 提供的人脸检测模型适配器
//! - [`ExamMonitor`]: 暴露给宿主页面的监控器对象

mod camera;
mod detector;
mod events;
mod monitor;

pub use camera::{WebCamera, WebCameraSession};
pub use detector::JsModelDetector;
pub use events::DomEventSource;
pub use monitor::ExamMonitor;

use wasm_bindgen::JsValue;

/// JS 错误值的 name 字段，取不到时为空串
pub(crate) fn js_error_name(err: &JsValue) -> String {
    js_sys::Reflect::get(err, &JsValue::from_str("name"))
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_default()
}

pub(crate) fn describe_js(err: &JsValue) -> String {
    format!("{err:?}")
}
