//! 集成测试公共设施：监控器装配与手动 future 驱动

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use exam_integrity_wasm::config::MonitorConfig;
use exam_integrity_wasm::fixtures::{
    FakeClock, ScriptedCamera, ScriptedDetector, ScriptedEventSource,
};
use exam_integrity_wasm::monitor::Proctor;

pub type TestProctor = Proctor<ScriptedCamera, ScriptedDetector, ScriptedEventSource>;

pub struct Harness {
    pub camera: ScriptedCamera,
    pub detector: ScriptedDetector,
    pub events: ScriptedEventSource,
    pub clock: FakeClock,
    pub proctor: TestProctor,
}

pub fn harness() -> Harness {
    harness_with(MonitorConfig::default())
}

pub fn harness_with(config: MonitorConfig) -> Harness {
    let camera = ScriptedCamera::new();
    let detector = ScriptedDetector::new();
    let events = ScriptedEventSource::new();
    let clock = FakeClock::new(0.0);
    let proctor = Proctor::new(
        config,
        camera.clone(),
        detector.clone(),
        events.clone(),
        clock.as_clock(),
    );
    Harness {
        camera,
        detector,
        events,
        clock,
        proctor,
    }
}

/// 同步驱动一个立即可完成的 future
pub fn run<F: Future>(future: F) -> F::Output {
    futures::executor::block_on(future)
}

/// 手动 poll 一次，用于构造"挂起中"的中间状态
pub fn poll_once<F: Future + ?Sized>(future: &mut Pin<Box<F>>) -> Poll<F::Output> {
    let waker = futures::task::noop_waker();
    let mut cx = Context::from_waker(&waker);
    future.as_mut().poll(&mut cx)
}
