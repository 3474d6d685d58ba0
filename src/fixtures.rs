//! 测试替身
//!
//! 三种平台能力的脚本化实现加一个可拨动的时钟，用于在没有浏览器、
//! 摄像头和模型的环境下确定性地驱动监控器。替身内部以 `Rc` 共享状态，
//! clone 一份交给 [`Proctor`](crate::monitor::Proctor)，另一份留在测试里做断言。

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::poll_fn;
use std::rc::Rc;
use std::task::Poll;

use crate::camera::{CameraAccess, CameraError};
use crate::detector::{DetectError, DetectionFrame, DetectionService, FaceDetection};
use crate::events::{EventSource, LifecycleEvent};
use crate::monitor::Clock;

/// 构造检测帧的便捷函数
pub fn faces(centers: &[(f64, f64)]) -> DetectionFrame {
    DetectionFrame::new(
        centers
            .iter()
            .map(|&(x_center, y_center)| FaceDetection { x_center, y_center })
            .collect(),
    )
}

/// 可拨动的毫秒时钟
#[derive(Clone, Default)]
pub struct FakeClock {
    now_ms: Rc<Cell<f64>>,
}

impl FakeClock {
    pub fn new(now_ms: f64) -> Self {
        let clock = Self::default();
        clock.set(now_ms);
        clock
    }

    pub fn set(&self, now_ms: f64) {
        self.now_ms.set(now_ms);
    }

    pub fn advance(&self, delta_ms: f64) {
        self.now_ms.set(self.now_ms.get() + delta_ms);
    }

    pub fn as_clock(&self) -> Clock {
        let now_ms = Rc::clone(&self.now_ms);
        Rc::new(move || now_ms.get())
    }
}

/// 脚本化摄像头会话
#[derive(Debug)]
pub struct StubSession {
    id: usize,
}

struct CameraScript {
    /// 每次 acquire 的结局，耗尽后默认成功
    outcomes: RefCell<VecDeque<Result<(), CameraError>>>,
    /// 关闭时 acquire 挂起，模拟用户迟迟不响应权限弹窗
    gate_open: Cell<bool>,
    fail_release: Cell<bool>,
    acquire_calls: Cell<usize>,
    release_calls: Cell<usize>,
    open_sessions: Cell<usize>,
    next_id: Cell<usize>,
}

/// 脚本化摄像头
#[derive(Clone)]
pub struct ScriptedCamera {
    script: Rc<CameraScript>,
}

impl ScriptedCamera {
    pub fn new() -> Self {
        Self {
            script: Rc::new(CameraScript {
                outcomes: RefCell::new(VecDeque::new()),
                gate_open: Cell::new(true),
                fail_release: Cell::new(false),
                acquire_calls: Cell::new(0),
                release_calls: Cell::new(0),
                open_sessions: Cell::new(0),
                next_id: Cell::new(0),
            }),
        }
    }

    /// 追加一次 acquire 的结局
    pub fn push_outcome(&self, outcome: Result<(), CameraError>) {
        self.script.outcomes.borrow_mut().push_back(outcome);
    }

    /// 关闭闸门：后续 acquire 挂起直到 [`ScriptedCamera::open_gate`]
    pub fn close_gate(&self) {
        self.script.gate_open.set(false);
    }

    pub fn open_gate(&self) {
        self.script.gate_open.set(true);
    }

    /// 让后续 release 返回错误（清理步骤仍会被计数）
    pub fn fail_release(&self) {
        self.script.fail_release.set(true);
    }

    pub fn acquire_calls(&self) -> usize {
        self.script.acquire_calls.get()
    }

    pub fn release_calls(&self) -> usize {
        self.script.release_calls.get()
    }

    /// 当前未释放的会话数
    pub fn open_sessions(&self) -> usize {
        self.script.open_sessions.get()
    }
}

impl Default for ScriptedCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraAccess for ScriptedCamera {
    type Session = StubSession;

    async fn acquire(&self) -> Result<StubSession, CameraError> {
        let script = &self.script;
        script.acquire_calls.set(script.acquire_calls.get() + 1);

        // 闸门关闭时保持 Pending，由测试手动重新 poll
        poll_fn(|_cx| {
            if script.gate_open.get() {
                Poll::Ready(())
            } else {
                Poll::Pending
            }
        })
        .await;

        let outcome = script.outcomes.borrow_mut().pop_front().unwrap_or(Ok(()));
        outcome?;

        script.open_sessions.set(script.open_sessions.get() + 1);
        let id = script.next_id.get();
        script.next_id.set(id + 1);
        Ok(StubSession { id })
    }

    fn release(&self, session: &StubSession) -> Result<(), CameraError> {
        let script = &self.script;
        script.release_calls.set(script.release_calls.get() + 1);
        script.open_sessions.set(script.open_sessions.get().saturating_sub(1));
        if script.fail_release.get() {
            return Err(CameraError::Release(format!(
                "scripted failure for session {}",
                session.id
            )));
        }
        Ok(())
    }
}

struct DetectorScript {
    results: RefCell<VecDeque<Result<DetectionFrame, DetectError>>>,
    gate_open: Cell<bool>,
    detect_calls: Cell<usize>,
}

/// 脚本化检测服务：按预定序列返回检测结果
#[derive(Clone)]
pub struct ScriptedDetector {
    script: Rc<DetectorScript>,
}

impl ScriptedDetector {
    pub fn new() -> Self {
        Self {
            script: Rc::new(DetectorScript {
                results: RefCell::new(VecDeque::new()),
                gate_open: Cell::new(true),
                detect_calls: Cell::new(0),
            }),
        }
    }

    pub fn push_result(&self, result: Result<DetectionFrame, DetectError>) {
        self.script.results.borrow_mut().push_back(result);
    }

    /// 关闭闸门：detect 挂起，模拟慢推理
    pub fn close_gate(&self) {
        self.script.gate_open.set(false);
    }

    pub fn open_gate(&self) {
        self.script.gate_open.set(true);
    }

    pub fn detect_calls(&self) -> usize {
        self.script.detect_calls.get()
    }
}

impl Default for ScriptedDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionService for ScriptedDetector {
    type Frame = ();

    async fn detect(&self, _frame: &()) -> Result<DetectionFrame, DetectError> {
        let script = &self.script;
        script.detect_calls.set(script.detect_calls.get() + 1);

        poll_fn(|_cx| {
            if script.gate_open.get() {
                Poll::Ready(())
            } else {
                Poll::Pending
            }
        })
        .await;

        script
            .results
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(DetectionFrame::default()))
    }
}

struct EventScript {
    handler: RefCell<Option<Rc<dyn Fn(LifecycleEvent)>>>,
    register_calls: Cell<usize>,
    unregister_calls: Cell<usize>,
}

/// 脚本化事件源：测试里可确定性触发每种生命周期事件
#[derive(Clone)]
pub struct ScriptedEventSource {
    script: Rc<EventScript>,
}

impl ScriptedEventSource {
    pub fn new() -> Self {
        Self {
            script: Rc::new(EventScript {
                handler: RefCell::new(None),
                register_calls: Cell::new(0),
                unregister_calls: Cell::new(0),
            }),
        }
    }

    /// 触发一次事件。未注册（或已注销）时静默忽略。
    pub fn fire(&self, event: LifecycleEvent) {
        let handler = self.script.handler.borrow().clone();
        if let Some(handler) = handler {
            handler(event);
        }
    }

    /// 取出处理函数的克隆，用于模拟"摘除失败后仍然迟到触发"的监听器
    pub fn leak_handler(&self) -> Option<Rc<dyn Fn(LifecycleEvent)>> {
        self.script.handler.borrow().clone()
    }

    pub fn is_registered(&self) -> bool {
        self.script.handler.borrow().is_some()
    }

    pub fn register_calls(&self) -> usize {
        self.script.register_calls.get()
    }

    pub fn unregister_calls(&self) -> usize {
        self.script.unregister_calls.get()
    }
}

impl Default for ScriptedEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for ScriptedEventSource {
    fn register(&self, handler: Rc<dyn Fn(LifecycleEvent)>) {
        self.script.register_calls.set(self.script.register_calls.get() + 1);
        *self.script.handler.borrow_mut() = Some(handler);
    }

    fn unregister(&self) {
        self.script.unregister_calls.set(self.script.unregister_calls.get() + 1);
        self.script.handler.borrow_mut().take();
    }
}
