//! 人脸几何分类器
//!
//! 纯函数：一组检测结果映射到零或一条违规信号。
//! 判定顺序是固定的：
//! 1. 无人脸 → NoFace
//! 2. 多于一张人脸 → MultipleFaces
//! 3. 单张人脸按中心位置判定：先偏离屏幕，再低头
//!
//! 规则 3 的两项检查互斥且顺序固定：同一帧里偏离屏幕会掩盖低头。
//! 这是刻意的优先级约定，调整顺序会改变输出。

use crate::config::MonitorConfig;
use crate::detector::DetectionFrame;
use crate::signal::{ViolationKind, ViolationSignal};

/// 对单帧检测结果进行分类
pub fn classify(
    frame: &DetectionFrame,
    config: &MonitorConfig,
    now: f64,
) -> Option<ViolationSignal> {
    match frame.faces.as_slice() {
        [] => Some(ViolationSignal::new(ViolationKind::NoFace, now)),
        [face] => {
            let (x, y) = (face.x_center, face.y_center);
            if x < config.center_x_min || x > config.center_x_max || y < config.center_y_min {
                Some(ViolationSignal::new(ViolationKind::OffScreen, now))
            } else if y > config.looking_down_y {
                Some(ViolationSignal::new(ViolationKind::LookingDown, now))
            } else {
                None
            }
        }
        _ => Some(ViolationSignal::new(ViolationKind::MultipleFaces, now)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::FaceDetection;

    fn frame(centers: &[(f64, f64)]) -> DetectionFrame {
        DetectionFrame::new(
            centers
                .iter()
                .map(|&(x_center, y_center)| FaceDetection { x_center, y_center })
                .collect(),
        )
    }

    fn kind_of(centers: &[(f64, f64)]) -> Option<ViolationKind> {
        classify(&frame(centers), &MonitorConfig::default(), 0.0).map(|s| s.kind)
    }

    #[test]
    fn empty_frame_is_no_face() {
        assert_eq!(kind_of(&[]), Some(ViolationKind::NoFace));
    }

    #[test]
    fn two_faces_dominate_regardless_of_position() {
        assert_eq!(
            kind_of(&[(0.5, 0.5), (0.5, 0.5)]),
            Some(ViolationKind::MultipleFaces)
        );
        assert_eq!(
            kind_of(&[(0.1, 0.9), (0.9, 0.1)]),
            Some(ViolationKind::MultipleFaces)
        );
    }

    #[test]
    fn centered_face_is_clean() {
        assert_eq!(kind_of(&[(0.5, 0.5)]), None);
    }

    #[test]
    fn face_outside_safe_zone_is_off_screen() {
        assert_eq!(kind_of(&[(0.2, 0.5)]), Some(ViolationKind::OffScreen));
        assert_eq!(kind_of(&[(0.8, 0.5)]), Some(ViolationKind::OffScreen));
        assert_eq!(kind_of(&[(0.5, 0.2)]), Some(ViolationKind::OffScreen));
    }

    #[test]
    fn low_face_is_looking_down() {
        assert_eq!(kind_of(&[(0.5, 0.8)]), Some(ViolationKind::LookingDown));
    }

    #[test]
    fn off_screen_masks_looking_down() {
        // x 越界同时 y 低于低头线：偏离屏幕优先
        assert_eq!(kind_of(&[(0.2, 0.8)]), Some(ViolationKind::OffScreen));
    }

    #[test]
    fn thresholds_are_exclusive_at_boundaries() {
        // 阈值本身不触发：判定全部使用严格不等
        assert_eq!(kind_of(&[(0.3, 0.5)]), None);
        assert_eq!(kind_of(&[(0.7, 0.5)]), None);
        assert_eq!(kind_of(&[(0.5, 0.3)]), None);
        assert_eq!(kind_of(&[(0.5, 0.75)]), None);
    }
}
