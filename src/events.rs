//! 浏览器生命周期事件扇入
//!
//! 四个相互独立的事件源（页面可见性、窗口焦点、全屏状态、媒体设备枚举）
//! 各自映射到一条固定的违规信号，直接送入警告限流器，不经过几何分类器。
//!
//! 事件源通过 [`EventSource`] 注入：浏览器实现注册真实 DOM 监听器，
//! 测试实现（`fixtures::ScriptedEventSource`）可以确定性地触发每种事件。

use std::rc::Rc;

use crate::signal::ViolationKind;

/// 平台生命周期事件
///
/// 枚举成员即事件源的过滤结果：可见性事件只在页面转入隐藏时产生
/// `DocumentHidden`，全屏事件只在全屏元素消失时产生 `FullscreenExit`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// 页面变为隐藏（切换标签页或最小化）
    DocumentHidden,
    /// 窗口失去焦点
    WindowBlur,
    /// 全屏元素消失
    FullscreenExit,
    /// 媒体设备枚举发生变化
    DeviceChange,
}

impl LifecycleEvent {
    /// 事件到违规类别的固定映射
    pub fn violation(self) -> ViolationKind {
        match self {
            LifecycleEvent::DocumentHidden => ViolationKind::TabSwitch,
            LifecycleEvent::WindowBlur => ViolationKind::WindowBlur,
            LifecycleEvent::FullscreenExit => ViolationKind::FullscreenExit,
            LifecycleEvent::DeviceChange => ViolationKind::DeviceChange,
        }
    }
}

/// 生命周期事件源
///
/// 注册发生在 Starting 阶段，注销发生在 Stopping 阶段且恰好一次。
/// `unregister` 必须逐个尝试摘除每个监听器：单个失败只记录，
/// 不得阻断其余监听器的摘除。
pub trait EventSource {
    fn register(&self, handler: Rc<dyn Fn(LifecycleEvent)>);
    fn unregister(&self);
}
