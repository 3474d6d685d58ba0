//! 生命周期管理器
//!
//! [`Proctor`] 把摄像头、检测服务、事件扇入和警告限流器编排为一个整体：
//!
//! ```text
//! Idle ─start→ Starting ─摄像头就绪→ Active ─stop→ Stopping → Stopped
//!                  │
//!                  └─权限被拒→ Failed（终态，持久警告）
//! ```
//!
//! 关键约束：
//! - 每个实例同一时刻至多持有一个摄像头会话，重复 start 是幂等 no-op
//! - Stopping 采用尽力而为的逐步清理：单步失败只记录，不阻断后续步骤
//! - 停止标志在每次帧处理与信号投递前检查，阻止迟到的推理结果
//!   或迟到的监听器回调污染已拆除的状态（check-before-act）

use std::cell::RefCell;
use std::rc::Rc;

use crate::camera::{CameraAccess, CameraError, FrameProbe};
use crate::config::MonitorConfig;
use crate::detector::DetectionService;
use crate::events::EventSource;
use crate::sampler::{FrameDecision, FrameSampler};
use crate::signal::{MonitorPhase, ViolationKind, ViolationSignal};
use crate::throttle::WarningThrottler;

/// 毫秒时钟。浏览器端是 `js_sys::Date::now`，测试中可自由拨动。
pub type Clock = Rc<dyn Fn() -> f64>;

/// 警告观察者回调
pub type WarningWatcher = Rc<dyn Fn(&str)>;

type SharedWatcher = Rc<RefCell<Option<WarningWatcher>>>;

/// 单线程共享的内部状态：阶段、停止标志与限流器
struct MonitorCore {
    phase: MonitorPhase,
    stop_requested: bool,
    throttler: WarningThrottler,
}

impl MonitorCore {
    fn deliver(&mut self, signal: ViolationSignal) -> bool {
        if self.stop_requested {
            return false;
        }
        match self.phase {
            MonitorPhase::Starting | MonitorPhase::Active | MonitorPhase::Failed => {
                self.throttler.accept(&signal)
            }
            _ => false,
        }
    }
}

/// 信号投递的唯一入口：两条路径都从这里过停止检查。
/// 观察者在 core 借用释放后才回调，允许回调内再读监控器状态。
fn dispatch(core: &RefCell<MonitorCore>, watcher: &SharedWatcher, signal: ViolationSignal) {
    let accepted = core.borrow_mut().deliver(signal);
    if accepted {
        let callback = watcher.borrow().clone();
        if let Some(callback) = callback {
            callback(signal.message);
        }
    }
}

/// 监控器编排器
///
/// 泛型参数即三种注入的平台能力；真实浏览器实现见 `web` 模块，
/// 脚本化假实现见 [`fixtures`](crate::fixtures)。
pub struct Proctor<C, D, E>
where
    C: CameraAccess,
    D: DetectionService,
    E: EventSource,
{
    core: Rc<RefCell<MonitorCore>>,
    camera: C,
    detector: D,
    events: E,
    sampler: FrameSampler,
    session: RefCell<Option<C::Session>>,
    clock: Clock,
    watcher: SharedWatcher,
}

impl<C, D, E> Proctor<C, D, E>
where
    C: CameraAccess,
    D: DetectionService,
    E: EventSource,
{
    pub fn new(config: MonitorConfig, camera: C, detector: D, events: E, clock: Clock) -> Self {
        let throttler = WarningThrottler::new(config.throttle_ms);
        Self {
            core: Rc::new(RefCell::new(MonitorCore {
                phase: MonitorPhase::Idle,
                stop_requested: false,
                throttler,
            })),
            camera,
            detector,
            events,
            sampler: FrameSampler::new(config),
            session: RefCell::new(None),
            clock,
            watcher: Rc::new(RefCell::new(None)),
        }
    }

    pub fn phase(&self) -> MonitorPhase {
        self.core.borrow().phase
    }

    /// 当前警告文案
    pub fn warning(&self) -> Option<String> {
        self.core.borrow().throttler.message().map(String::from)
    }

    /// 注册警告观察者：每次警告被覆盖时同步回调
    pub fn set_warning_watcher(&self, watcher: impl Fn(&str) + 'static) {
        *self.watcher.borrow_mut() = Some(Rc::new(watcher));
    }

    /// 启动监控
    ///
    /// 幂等：Starting/Active 阶段的重复调用立即返回，绝不产生第二个会话。
    /// 返回本次调用是否把监控器带入了 Active；幂等返回与失败路径都是 false，
    /// 调用方据此决定是否启动帧循环等后续动作。
    /// 摄像头获取失败不向外传播错误，而是转入 Failed 并留下持久警告。
    pub async fn start(&self) -> bool {
        {
            let mut core = self.core.borrow_mut();
            match core.phase {
                MonitorPhase::Idle | MonitorPhase::Stopped => {}
                // Failed 是终态；Starting/Active 幂等返回
                _ => return false,
            }
            core.phase = MonitorPhase::Starting;
            core.stop_requested = false;
        }

        // 挂起点：等待权限授予。期间可能有 stop() 到来。
        let acquired = self.camera.acquire().await;

        match acquired {
            Ok(session) => {
                if self.core.borrow().stop_requested {
                    // 等待期间被卸载：立即归还刚拿到的会话，不注册任何监听器
                    if let Err(err) = self.camera.release(&session) {
                        tracing::warn!(error = %err, "release of session acquired mid-stop failed");
                    }
                    self.core.borrow_mut().phase = MonitorPhase::Stopped;
                    return false;
                }

                *self.session.borrow_mut() = Some(session);

                let core = Rc::clone(&self.core);
                let watcher = Rc::clone(&self.watcher);
                let clock = Rc::clone(&self.clock);
                self.events.register(Rc::new(move |event| {
                    let signal = ViolationSignal::new(event.violation(), clock());
                    dispatch(&core, &watcher, signal);
                }));

                self.core.borrow_mut().phase = MonitorPhase::Active;
                true
            }
            Err(err) => {
                if self.core.borrow().stop_requested {
                    self.core.borrow_mut().phase = MonitorPhase::Stopped;
                    return false;
                }

                tracing::warn!(error = %err, "camera acquisition failed");
                let kind = match err {
                    CameraError::PermissionDenied => ViolationKind::PermissionDenied,
                    _ => ViolationKind::CameraBlocked,
                };
                let signal = ViolationSignal::new(kind, (self.clock)());
                self.core.borrow_mut().phase = MonitorPhase::Failed;
                dispatch(&self.core, &self.watcher, signal);
                false
            }
        }
    }

    /// 处理一帧
    ///
    /// 由采集设备的帧调度回调驱动，每送达一帧调用一次。
    /// 推理是挂起点：恢复后先重查停止标志，再把结果交给分类器。
    pub async fn process_frame(&self, probe: FrameProbe, frame: &D::Frame) {
        if self.core.borrow().phase != MonitorPhase::Active {
            return;
        }

        let now = (self.clock)();
        match self.sampler.gate(probe, now) {
            FrameDecision::Blocked(signal) => {
                dispatch(&self.core, &self.watcher, signal);
            }
            FrameDecision::Inspect => {
                let result = self.detector.detect(frame).await;

                // 推理期间监控器可能已被停止
                {
                    let core = self.core.borrow();
                    if core.stop_requested || core.phase != MonitorPhase::Active {
                        return;
                    }
                }

                // 推理失败：本帧静默跳过，下一帧自然重试
                let Ok(detections) = result else { return };

                let now = (self.clock)();
                if let Some(signal) = self.sampler.evaluate(&detections, now) {
                    dispatch(&self.core, &self.watcher, signal);
                }
            }
        }
    }

    /// 停止监控
    ///
    /// 对任一阶段调用都安全。清理步骤逐个尝试：释放摄像头轨道、
    /// 注销全部监听器——前一步出错不影响后一步执行。
    pub fn stop(&self) {
        let phase = self.core.borrow().phase;
        match phase {
            MonitorPhase::Idle | MonitorPhase::Stopping | MonitorPhase::Stopped => {}
            MonitorPhase::Starting => {
                // 挂起中的 start 在恢复时负责收尾
                let mut core = self.core.borrow_mut();
                core.stop_requested = true;
                core.phase = MonitorPhase::Stopping;
            }
            MonitorPhase::Active | MonitorPhase::Failed => {
                {
                    let mut core = self.core.borrow_mut();
                    core.stop_requested = true;
                    core.phase = MonitorPhase::Stopping;
                }

                if let Some(session) = self.session.borrow_mut().take() {
                    if let Err(err) = self.camera.release(&session) {
                        tracing::warn!(error = %err, "camera release failed during teardown");
                    }
                }

                // 无论摄像头释放是否成功都注销监听器
                self.events.unregister();

                self.core.borrow_mut().phase = MonitorPhase::Stopped;
            }
        }
    }
}
