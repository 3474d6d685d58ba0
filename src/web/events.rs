//! DOM 生命周期监听器
//!
//! 恰好注册四个监听器，各自带事件过滤：
//! - document "visibilitychange"：仅在页面转入隐藏时上报
//! - window "blur"：失焦即上报
//! - document "fullscreenchange"：仅在全屏元素消失时上报
//! - mediaDevices "devicechange"：设备枚举变化即上报
//!
//! 注销时逐个摘除，单个失败只记录日志，不影响其余监听器。

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{EventTarget, VisibilityState};

use crate::events::{EventSource, LifecycleEvent};

struct Registration {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn Fn()>,
}

/// 真实 DOM 事件源
#[derive(Default)]
pub struct DomEventSource {
    registrations: RefCell<Vec<Registration>>,
}

impl DomEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn listen(&self, target: &EventTarget, kind: &'static str, callback: impl Fn() + 'static) {
        let closure = Closure::wrap(Box::new(callback) as Box<dyn Fn()>);
        if let Err(err) =
            target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
        {
            tracing::warn!(event = kind, ?err, "listener registration failed");
            return;
        }
        self.registrations.borrow_mut().push(Registration {
            target: target.clone(),
            kind,
            closure,
        });
    }
}

impl EventSource for DomEventSource {
    fn register(&self, handler: Rc<dyn Fn(LifecycleEvent)>) {
        let Some(window) = web_sys::window() else {
            tracing::warn!("no window object, lifecycle events unavailable");
            return;
        };
        let Some(document) = window.document() else {
            tracing::warn!("no document object, lifecycle events unavailable");
            return;
        };

        {
            let handler = Rc::clone(&handler);
            let document = document.clone();
            self.listen(document.clone().as_ref(), "visibilitychange", move || {
                if document.visibility_state() == VisibilityState::Hidden {
                    handler(LifecycleEvent::DocumentHidden);
                }
            });
        }

        {
            let handler = Rc::clone(&handler);
            self.listen(window.as_ref(), "blur", move || {
                handler(LifecycleEvent::WindowBlur);
            });
        }

        {
            let handler = Rc::clone(&handler);
            let document_for_check = document.clone();
            self.listen(document.as_ref(), "fullscreenchange", move || {
                if document_for_check.fullscreen_element().is_none() {
                    handler(LifecycleEvent::FullscreenExit);
                }
            });
        }

        match window.navigator().media_devices() {
            Ok(devices) => {
                let handler = Rc::clone(&handler);
                self.listen(devices.as_ref(), "devicechange", move || {
                    handler(LifecycleEvent::DeviceChange);
                });
            }
            Err(err) => {
                tracing::warn!(?err, "mediaDevices unavailable, devicechange not monitored");
            }
        }
    }

    fn unregister(&self) {
        for registration in self.registrations.borrow_mut().drain(..) {
            if let Err(err) = registration.target.remove_event_listener_with_callback(
                registration.kind,
                registration.closure.as_ref().unchecked_ref(),
            ) {
                tracing::warn!(event = registration.kind, ?err, "listener removal failed");
            }
        }
    }
}
