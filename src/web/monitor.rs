//! 宿主页面门面
//!
//! [`ExamMonitor`] 把编排器包装成 JS 可用的对象。帧循环挂在
//! video 元素的 requestVideoFrameCallback 上：节奏由采集设备决定，
//! 且上一帧的推理完成后才重新武装回调，保证同一时刻至多一次推理在途。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::Function;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::HtmlVideoElement;

use super::{DomEventSource, JsModelDetector, WebCamera};
use crate::camera::FrameProbe;
use crate::config::MonitorConfig;
use crate::monitor::Proctor;
use crate::signal::MonitorPhase;

type WebProctor = Proctor<WebCamera, JsModelDetector, DomEventSource>;

// requestVideoFrameCallback 尚未进入 web-sys 的稳定绑定，
// 通过鸭子类型的导入类型手动声明
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = HTMLVideoElement)]
    type VideoFrameScheduler;

    #[wasm_bindgen(method, structural, js_name = requestVideoFrameCallback)]
    fn request_video_frame_callback(this: &VideoFrameScheduler, callback: &Function) -> u32;

    #[wasm_bindgen(method, structural, js_name = cancelVideoFrameCallback)]
    fn cancel_video_frame_callback(this: &VideoFrameScheduler, handle: u32);
}

fn scheduler(video: &HtmlVideoElement) -> &VideoFrameScheduler {
    video.unchecked_ref()
}

/// rVFC 帧循环
struct FrameLoop {
    video: HtmlVideoElement,
    proctor: Rc<WebProctor>,
    callback: RefCell<Option<Closure<dyn FnMut(f64, JsValue)>>>,
    handle: Cell<Option<u32>>,
}

impl FrameLoop {
    fn new(video: HtmlVideoElement, proctor: Rc<WebProctor>) -> Rc<Self> {
        Rc::new(Self {
            video,
            proctor,
            callback: RefCell::new(None),
            handle: Cell::new(None),
        })
    }

    /// 武装下一帧回调
    ///
    /// 已有待触发的回调时是 no-op：同一帧循环绝不并存两条 rVFC 链。
    /// 回调触发时先清空 handle 再进入处理流程，因此推理完成后的
    /// 重新武装不受此保护影响。
    fn arm(self: &Rc<Self>) {
        if self.handle.get().is_some() {
            return;
        }

        if self.callback.borrow().is_none() {
            let frame_loop = Rc::clone(self);
            let closure = Closure::wrap(Box::new(move |_now: f64, _metadata: JsValue| {
                frame_loop.handle.set(None);
                let frame_loop = Rc::clone(&frame_loop);
                spawn_local(async move {
                    let probe = FrameProbe {
                        ready_state: frame_loop.video.ready_state(),
                        video_width: frame_loop.video.video_width(),
                    };
                    frame_loop
                        .proctor
                        .process_frame(probe, &frame_loop.video)
                        .await;
                    if frame_loop.proctor.phase() == MonitorPhase::Active {
                        frame_loop.arm();
                    }
                });
            }) as Box<dyn FnMut(f64, JsValue)>);
            *self.callback.borrow_mut() = Some(closure);
        }

        if let Some(closure) = self.callback.borrow().as_ref() {
            let id = scheduler(&self.video)
                .request_video_frame_callback(closure.as_ref().unchecked_ref());
            self.handle.set(Some(id));
        }
    }

    /// 取消未触发的回调并释放闭包（同时打破 Rc 循环）
    fn cancel(&self) {
        if let Some(id) = self.handle.take() {
            scheduler(&self.video).cancel_video_frame_callback(id);
        }
        self.callback.borrow_mut().take();
    }
}

/// 面试诚信监控器
///
/// 宿主页面用法：
/// ```js
/// const monitor = new ExamMonitor(videoElement, loadFaceDetector, { throttleMs: 3000 });
/// monitor.setOnWarning((message) => showBanner(message));
/// await monitor.start();
/// // ...面试结束...
/// monitor.stop();
/// ```
#[wasm_bindgen]
pub struct ExamMonitor {
    proctor: Rc<WebProctor>,
    frames: Rc<FrameLoop>,
}

#[wasm_bindgen]
impl ExamMonitor {
    /// 创建监控器
    ///
    /// # 参数
    /// - `video`: 绑定摄像头画面的 video 元素
    /// - `model_loader`: 返回 Promise<检测函数> 的加载器，首次检测时调用
    /// - `config`: 可选的 camelCase 配置对象，缺省使用内置阈值
    #[wasm_bindgen(constructor)]
    pub fn new(
        video: HtmlVideoElement,
        model_loader: Function,
        config: JsValue,
    ) -> Result<ExamMonitor, JsValue> {
        let config: MonitorConfig = if config.is_undefined() || config.is_null() {
            MonitorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("invalid config: {e}")))?
        };

        let camera = WebCamera::new(video.clone(), &config);
        let detector = JsModelDetector::new(model_loader);
        let events = DomEventSource::new();
        let proctor = Rc::new(Proctor::new(
            config,
            camera,
            detector,
            events,
            Rc::new(js_sys::Date::now),
        ));
        let frames = FrameLoop::new(video, Rc::clone(&proctor));

        Ok(ExamMonitor { proctor, frames })
    }

    /// 启动监控，返回 Promise<void>
    ///
    /// 重复调用是无害的 no-op，不会叠加第二条帧循环。
    /// 权限被拒不会 reject：监控器转入 failed 阶段并保留持久警告。
    pub fn start(&self) -> js_sys::Promise {
        let proctor = Rc::clone(&self.proctor);
        let frames = Rc::clone(&self.frames);
        future_to_promise(async move {
            // 只有真正完成启动的那次调用才武装帧循环
            if proctor.start().await {
                frames.arm();
            }
            Ok(JsValue::UNDEFINED)
        })
    }

    /// 停止监控并释放全部资源
    pub fn stop(&self) {
        self.frames.cancel();
        self.proctor.stop();
    }

    /// 当前警告文案，无警告时为 undefined
    pub fn warning(&self) -> Option<String> {
        self.proctor.warning()
    }

    /// 当前生命周期阶段
    pub fn phase(&self) -> String {
        self.proctor.phase().as_str().to_string()
    }

    /// 注册警告回调：每次警告被覆盖时调用
    #[wasm_bindgen(js_name = "setOnWarning")]
    pub fn set_on_warning(&self, callback: Function) {
        self.proctor.set_warning_watcher(move |message| {
            if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(message)) {
                tracing::warn!(?err, "onWarning callback threw");
            }
        });
    }
}
