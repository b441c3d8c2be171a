//! # 颜色选择弹出层
//!
//! 点击颜色输入框时打开，在选色器里挑色即更新边框颜色参数，
//! 在弹出层区域外完成一次点击时关闭。
//! 弹出层自带一个不挂回调的区域外点击检测器，关闭动作只由判定结果驱动。

use super::controller::EditorController;
use super::outside_click::{ClickRegion, OutsideClickDetector, PointerEvent};
use super::preview::PreviewStore;
use crate::protocol::EditParameter;

#[derive(Debug, Default)]
pub struct ColorPickerPopover {
    open: bool,
    detector: OutsideClickDetector,
}

impl ColorPickerPopover {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// 颜色输入框被点击。
    pub fn on_input_click(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// 选色器回调：把颜色写回控制器参数。
    pub fn pick<S: PreviewStore>(&self, controller: &mut EditorController<S>, color: &str) {
        if self.open {
            controller.update_parameter(EditParameter::BorderColor, color);
        }
    }

    /// 处理文档级指针事件；区域外点击时关闭弹出层。
    ///
    /// 关闭时也持续跟踪交互起点。返回弹出层是否因此被关闭。
    pub fn dispatch<R: ClickRegion>(&mut self, region: &R, event: PointerEvent<R::Target>) -> bool {
        let outside = self.detector.handle(region, event);
        if outside && self.open {
            self.close();
            return true;
        }
        false
    }
}
