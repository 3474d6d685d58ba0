//! 生命周期管理器集成测试
//!
//! 覆盖启动幂等、权限拒绝的非致命降级、启动途中卸载、
//! 尽力而为的清理，以及停止后的信号隔离。

mod common;

use common::{harness, poll_once, run};

use exam_integrity_wasm::camera::{CameraError, FrameProbe};
use exam_integrity_wasm::detector::DetectError;
use exam_integrity_wasm::events::LifecycleEvent;
use exam_integrity_wasm::fixtures::faces;
use exam_integrity_wasm::signal::{MonitorPhase, ViolationKind};

fn ready_probe() -> FrameProbe {
    FrameProbe {
        ready_state: 4,
        video_width: 320,
    }
}

#[test]
fn start_transitions_to_active_and_registers_listeners() {
    let h = harness();
    run(h.proctor.start());
    assert_eq!(h.proctor.phase(), MonitorPhase::Active);
    assert_eq!(h.camera.acquire_calls(), 1);
    assert_eq!(h.camera.open_sessions(), 1);
    assert_eq!(h.events.register_calls(), 1);
    assert!(h.events.is_registered());
    assert_eq!(h.proctor.warning(), None);
}

#[test]
fn double_start_does_not_open_second_session() {
    let h = harness();
    assert!(run(h.proctor.start()));
    // 幂等返回必须上报"未启动"，调用方据此不得再次启动帧循环
    assert!(!run(h.proctor.start()));
    assert_eq!(h.camera.acquire_calls(), 1);
    assert_eq!(h.camera.open_sessions(), 1);
    assert_eq!(h.events.register_calls(), 1);
}

#[test]
fn permission_denied_fails_with_persistent_warning() {
    let h = harness();
    h.camera.push_outcome(Err(CameraError::PermissionDenied));
    h.clock.set(100.0);
    run(h.proctor.start());

    assert_eq!(h.proctor.phase(), MonitorPhase::Failed);
    assert_eq!(
        h.proctor.warning().as_deref(),
        Some(ViolationKind::PermissionDenied.message())
    );
    // 失败路径上没有会话、没有监听器
    assert_eq!(h.camera.open_sessions(), 0);
    assert_eq!(h.events.register_calls(), 0);
}

#[test]
fn failed_phase_is_terminal_for_start() {
    let h = harness();
    h.camera.push_outcome(Err(CameraError::PermissionDenied));
    assert!(!run(h.proctor.start()));
    assert_eq!(h.proctor.phase(), MonitorPhase::Failed);

    assert!(!run(h.proctor.start()));
    assert_eq!(h.proctor.phase(), MonitorPhase::Failed);
    assert_eq!(h.camera.acquire_calls(), 1);
}

#[test]
fn other_camera_errors_surface_as_camera_blocked() {
    let h = harness();
    h.camera
        .push_outcome(Err(CameraError::Unavailable("no device".into())));
    run(h.proctor.start());
    assert_eq!(h.proctor.phase(), MonitorPhase::Failed);
    assert_eq!(
        h.proctor.warning().as_deref(),
        Some(ViolationKind::CameraBlocked.message())
    );
}

#[test]
fn stop_before_permission_resolves_leaves_nothing_behind() {
    let h = harness();
    h.camera.close_gate();

    let mut start = Box::pin(h.proctor.start());
    assert!(poll_once(&mut start).is_pending());
    assert_eq!(h.proctor.phase(), MonitorPhase::Starting);

    // 权限弹窗仍未响应时卸载
    h.proctor.stop();
    assert_eq!(h.proctor.phase(), MonitorPhase::Stopping);

    // 之后权限才被授予：拿到的会话必须立即归还，且不得上报"已启动"
    h.camera.open_gate();
    assert_eq!(poll_once(&mut start), std::task::Poll::Ready(false));

    assert_eq!(h.proctor.phase(), MonitorPhase::Stopped);
    assert_eq!(h.camera.open_sessions(), 0);
    assert_eq!(h.camera.release_calls(), 1);
    assert_eq!(h.events.register_calls(), 0);
    assert_eq!(h.proctor.warning(), None);
}

#[test]
fn stop_before_denied_permission_resolves_is_quiet() {
    let h = harness();
    h.camera.close_gate();
    h.camera.push_outcome(Err(CameraError::PermissionDenied));

    let mut start = Box::pin(h.proctor.start());
    assert!(poll_once(&mut start).is_pending());
    h.proctor.stop();
    h.camera.open_gate();
    assert!(poll_once(&mut start).is_ready());

    // 已经在卸载了，不再打扰用户
    assert_eq!(h.proctor.phase(), MonitorPhase::Stopped);
    assert_eq!(h.proctor.warning(), None);
}

#[test]
fn stop_tears_down_camera_and_listeners() {
    let h = harness();
    run(h.proctor.start());
    h.proctor.stop();

    assert_eq!(h.proctor.phase(), MonitorPhase::Stopped);
    assert_eq!(h.camera.open_sessions(), 0);
    assert_eq!(h.camera.release_calls(), 1);
    assert_eq!(h.events.unregister_calls(), 1);
    assert!(!h.events.is_registered());
}

#[test]
fn release_failure_does_not_block_listener_removal() {
    let h = harness();
    h.camera.fail_release();
    run(h.proctor.start());
    h.proctor.stop();

    assert_eq!(h.proctor.phase(), MonitorPhase::Stopped);
    assert_eq!(h.camera.release_calls(), 1);
    // 释放失败被记录后吞掉，监听器照常全部摘除
    assert_eq!(h.events.unregister_calls(), 1);
    assert!(!h.events.is_registered());
}

#[test]
fn stop_is_safe_in_every_phase() {
    let h = harness();
    h.proctor.stop();
    assert_eq!(h.proctor.phase(), MonitorPhase::Idle);

    run(h.proctor.start());
    h.proctor.stop();
    h.proctor.stop();
    assert_eq!(h.proctor.phase(), MonitorPhase::Stopped);
    assert_eq!(h.camera.release_calls(), 1);
    assert_eq!(h.events.unregister_calls(), 1);
}

#[test]
fn restart_after_stop_opens_fresh_session() {
    let h = harness();
    assert!(run(h.proctor.start()));
    h.proctor.stop();
    // 重启是一次全新的启动，再次上报"已启动"
    assert!(run(h.proctor.start()));

    assert_eq!(h.proctor.phase(), MonitorPhase::Active);
    assert_eq!(h.camera.acquire_calls(), 2);
    assert_eq!(h.camera.open_sessions(), 1);
    assert_eq!(h.events.register_calls(), 2);
}

#[test]
fn unready_frame_emits_camera_blocked_without_inference() {
    let h = harness();
    run(h.proctor.start());
    h.clock.set(500.0);
    run(h.proctor.process_frame(
        FrameProbe {
            ready_state: 1,
            video_width: 0,
        },
        &(),
    ));

    assert_eq!(
        h.proctor.warning().as_deref(),
        Some(ViolationKind::CameraBlocked.message())
    );
    assert_eq!(h.detector.detect_calls(), 0);
}

#[test]
fn inference_error_skips_frame_silently() {
    let h = harness();
    run(h.proctor.start());
    h.detector
        .push_result(Err(DetectError::Inference("model crashed".into())));
    run(h.proctor.process_frame(ready_probe(), &()));

    assert_eq!(h.proctor.warning(), None);
    assert_eq!(h.detector.detect_calls(), 1);
}

#[test]
fn frame_pipeline_classifies_detections() {
    let h = harness();
    run(h.proctor.start());
    h.detector.push_result(Ok(faces(&[(0.5, 0.5), (0.6, 0.5)])));
    h.clock.set(1000.0);
    run(h.proctor.process_frame(ready_probe(), &()));

    assert_eq!(
        h.proctor.warning().as_deref(),
        Some(ViolationKind::MultipleFaces.message())
    );
}

#[test]
fn frames_are_ignored_before_start_and_after_stop() {
    let h = harness();
    h.detector.push_result(Ok(faces(&[])));
    run(h.proctor.process_frame(ready_probe(), &()));
    assert_eq!(h.detector.detect_calls(), 0);

    run(h.proctor.start());
    h.proctor.stop();
    run(h.proctor.process_frame(ready_probe(), &()));
    assert_eq!(h.detector.detect_calls(), 0);
    assert_eq!(h.proctor.warning(), None);
}

#[test]
fn in_flight_frame_result_is_discarded_after_stop() {
    let h = harness();
    run(h.proctor.start());

    // 推理尚未返回时停止监控
    h.detector.close_gate();
    h.detector.push_result(Ok(faces(&[])));
    let mut frame = Box::pin(h.proctor.process_frame(ready_probe(), &()));
    assert!(poll_once(&mut frame).is_pending());

    h.proctor.stop();
    h.detector.open_gate();
    assert!(poll_once(&mut frame).is_ready());

    // 迟到的 NoFace 结果不得污染已拆除的状态
    assert_eq!(h.proctor.warning(), None);
}

#[test]
fn late_listener_firing_after_stop_is_discarded() {
    let h = harness();
    run(h.proctor.start());

    // 模拟摘除失败后仍然存活的监听器
    let leaked = h.events.leak_handler().expect("handler registered");
    h.proctor.stop();
    leaked(LifecycleEvent::WindowBlur);

    assert_eq!(h.proctor.warning(), None);
}

#[test]
fn watcher_observes_each_accepted_warning() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let h = harness();
    let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    h.proctor
        .set_warning_watcher(move |message| sink.borrow_mut().push(message.to_string()));

    run(h.proctor.start());
    h.clock.set(1000.0);
    h.events.fire(LifecycleEvent::DocumentHidden);
    h.clock.set(1500.0);
    h.events.fire(LifecycleEvent::WindowBlur); // 窗口内，被丢弃
    h.clock.set(5000.0);
    h.events.fire(LifecycleEvent::FullscreenExit);

    assert_eq!(
        *seen.borrow(),
        vec![
            ViolationKind::TabSwitch.message().to_string(),
            ViolationKind::FullscreenExit.message().to_string(),
        ]
    );
}
