//! 模型检测服务适配器
//!
//! 检测模型由宿主 JS 提供：构造时传入一个 loader 函数，
//! 返回 Promise<检测函数>。检测函数签名为
//! `(video: HTMLVideoElement) => Promise<[{boundingBox: {xCenter, yCenter, ...}}]>`。
//! loader 在首次 detect 时执行一次（模型资产懒加载），之后复用缓存的检测函数。

use std::cell::RefCell;

use js_sys::{Function, Promise};
use serde::Deserialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlVideoElement;

use super::describe_js;
use crate::detector::{DetectError, DetectionFrame, DetectionService, FaceDetection};

/// 检测服务的原始输出：只取边界框中心，其余字段忽略
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDetection {
    bounding_box: RawBoundingBox,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBoundingBox {
    x_center: f64,
    y_center: f64,
}

/// JS 模型适配器
pub struct JsModelDetector {
    loader: Function,
    cached: RefCell<Option<Function>>,
}

impl JsModelDetector {
    pub fn new(loader: Function) -> Self {
        Self {
            loader,
            cached: RefCell::new(None),
        }
    }

    async fn ensure_loaded(&self) -> Result<Function, DetectError> {
        let cached = self.cached.borrow().clone();
        if let Some(detect) = cached {
            return Ok(detect);
        }

        let promise: Promise = self
            .loader
            .call0(&JsValue::NULL)
            .map_err(|e| DetectError::ModelLoad(describe_js(&e)))?
            .unchecked_into();
        let loaded = JsFuture::from(promise)
            .await
            .map_err(|e| DetectError::ModelLoad(describe_js(&e)))?;
        let detect: Function = loaded
            .dyn_into()
            .map_err(|_| DetectError::ModelLoad("loader did not return a function".into()))?;

        *self.cached.borrow_mut() = Some(detect.clone());
        Ok(detect)
    }
}

impl DetectionService for JsModelDetector {
    type Frame = HtmlVideoElement;

    async fn detect(&self, frame: &HtmlVideoElement) -> Result<DetectionFrame, DetectError> {
        let detect = self.ensure_loaded().await?;

        let value = detect
            .call1(&JsValue::NULL, frame.as_ref())
            .map_err(|e| DetectError::Inference(describe_js(&e)))?;
        let value = match value.dyn_ref::<Promise>() {
            Some(promise) => JsFuture::from(promise.clone())
                .await
                .map_err(|e| DetectError::Inference(describe_js(&e)))?,
            None => value,
        };

        let raw: Vec<RawDetection> = serde_wasm_bindgen::from_value(value)
            .map_err(|e| DetectError::Inference(e.to_string()))?;

        Ok(DetectionFrame::new(
            raw.into_iter()
                .map(|detection| FaceDetection {
                    x_center: detection.bounding_box.x_center,
                    y_center: detection.bounding_box.y_center,
                })
                .collect(),
        ))
    }
}
