//! getUserMedia 摄像头实现
//!
//! 只请求视频轨道，分辨率以配置的 320×240 为协商目标。
//! 获取到的流绑定到宿主页面提供的 video 元素上，
//! 帧的实际节奏由采集设备决定。

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlVideoElement, MediaStream, MediaStreamConstraints};

use super::{describe_js, js_error_name};
use crate::camera::{CameraAccess, CameraError, FrameProbe};
use crate::config::MonitorConfig;

/// 活动摄像头会话：持有媒体流
pub struct WebCameraSession {
    stream: MediaStream,
}

/// getUserMedia 摄像头
pub struct WebCamera {
    video: HtmlVideoElement,
    width: u32,
    height: u32,
}

impl WebCamera {
    pub fn new(video: HtmlVideoElement, config: &MonitorConfig) -> Self {
        Self {
            video,
            width: config.capture_width,
            height: config.capture_height,
        }
    }

    /// 当前帧就绪度
    pub fn probe(&self) -> FrameProbe {
        FrameProbe {
            ready_state: self.video.ready_state(),
            video_width: self.video.video_width(),
        }
    }

    fn constraints(&self) -> Result<MediaStreamConstraints, CameraError> {
        let video = js_sys::Object::new();
        let set = |key: &str, value: u32| {
            js_sys::Reflect::set(
                &video,
                &JsValue::from_str(key),
                &JsValue::from_f64(value as f64),
            )
            .map_err(|e| CameraError::Unavailable(describe_js(&e)))
        };
        set("width", self.width)?;
        set("height", self.height)?;

        let constraints = MediaStreamConstraints::new();
        constraints.set_video(&video.into());
        Ok(constraints)
    }
}

fn map_acquire_error(err: JsValue) -> CameraError {
    match js_error_name(&err).as_str() {
        "NotAllowedError" | "PermissionDeniedError" | "SecurityError" => {
            CameraError::PermissionDenied
        }
        _ => CameraError::Unavailable(describe_js(&err)),
    }
}

impl CameraAccess for WebCamera {
    type Session = WebCameraSession;

    async fn acquire(&self) -> Result<WebCameraSession, CameraError> {
        let window =
            web_sys::window().ok_or_else(|| CameraError::Unavailable("no window".into()))?;
        let devices = window
            .navigator()
            .media_devices()
            .map_err(|e| CameraError::Unavailable(describe_js(&e)))?;

        let constraints = self.constraints()?;
        let promise = devices
            .get_user_media_with_constraints(&constraints)
            .map_err(map_acquire_error)?;

        // 挂起点：等待用户响应权限弹窗
        let stream: MediaStream = JsFuture::from(promise)
            .await
            .map_err(map_acquire_error)?
            .unchecked_into();

        self.video.set_src_object(Some(&stream));
        Ok(WebCameraSession { stream })
    }

    fn release(&self, session: &WebCameraSession) -> Result<(), CameraError> {
        // 逐条停止轨道；对已停止的轨道再调 stop 是平台保证的 no-op
        for track in session.stream.get_tracks().iter() {
            match track.dyn_into::<web_sys::MediaStreamTrack>() {
                Ok(track) => track.stop(),
                Err(value) => {
                    tracing::warn!(?value, "non-track entry in media stream");
                }
            }
        }
        self.video.set_src_object(None);
        Ok(())
    }
}
