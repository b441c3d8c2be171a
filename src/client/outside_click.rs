//! # 区域外点击检测
//!
//! ## 设计思路
//!
//! 对一个有界区域，记录每次交互的起点（按下 / 触摸开始）是否落在区域内；
//! 随后的点击只有在“起点在外 且 点击也在外”时才触发回调。
//! 交互开始时区域尚未挂载，则该次点击一律忽略（初始状态即视为未挂载）。
//!
//! 与领域状态无关，可复用于任意弹出层。

/// 检测器需要知道的区域能力。
pub trait ClickRegion {
    type Target;

    /// 区域当前是否已挂载。
    fn is_mounted(&self) -> bool;

    /// 目标是否落在区域内（含子元素）。
    fn contains(&self, target: &Self::Target) -> bool;
}

/// 文档级指针事件。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent<T> {
    MouseDown(T),
    TouchStart(T),
    Click(T),
}

/// 区域外点击检测器。
///
/// 缺省类型参数对应不带回调的检测器，调用方只看 `handle` 的返回值。
#[derive(Debug)]
pub struct OutsideClickDetector<F: FnMut() = fn()> {
    started_inside: bool,
    started_when_mounted: bool,
    on_outside_click: F,
}

fn no_callback() {}

impl OutsideClickDetector {
    /// 只做判定、不挂回调的检测器。
    pub fn tracking_only() -> Self {
        Self::new(no_callback as fn())
    }
}

impl Default for OutsideClickDetector {
    fn default() -> Self {
        Self::tracking_only()
    }
}

impl<F: FnMut()> OutsideClickDetector<F> {
    pub fn new(on_outside_click: F) -> Self {
        Self {
            started_inside: false,
            started_when_mounted: false,
            on_outside_click,
        }
    }

    /// 处理一个事件；返回本次是否触发了回调。
    pub fn handle<R: ClickRegion>(&mut self, region: &R, event: PointerEvent<R::Target>) -> bool {
        match event {
            PointerEvent::MouseDown(target) | PointerEvent::TouchStart(target) => {
                self.record_start(region, &target);
                false
            }
            PointerEvent::Click(target) => self.on_click(region, &target),
        }
    }

    fn record_start<R: ClickRegion>(&mut self, region: &R, target: &R::Target) {
        self.started_when_mounted = region.is_mounted();
        self.started_inside = self.started_when_mounted && region.contains(target);
    }

    fn on_click<R: ClickRegion>(&mut self, region: &R, target: &R::Target) -> bool {
        if self.started_inside || !self.started_when_mounted {
            return false;
        }
        if !region.is_mounted() || region.contains(target) {
            return false;
        }

        (self.on_outside_click)();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 一维区间 `[start, end)` 充当区域。
    struct Span {
        mounted: bool,
        start: i32,
        end: i32,
    }

    impl ClickRegion for Span {
        type Target = i32;

        fn is_mounted(&self) -> bool {
            self.mounted
        }

        fn contains(&self, target: &i32) -> bool {
            (self.start..self.end).contains(target)
        }
    }

    #[test]
    fn click_without_prior_press_is_ignored() {
        let mut fired = 0;
        let region = Span { mounted: true, start: 0, end: 10 };
        let mut detector = OutsideClickDetector::new(|| fired += 1);

        assert!(!detector.handle(&region, PointerEvent::Click(50)));
        drop(detector);
        assert_eq!(fired, 0);
    }

    #[test]
    fn press_inside_then_click_outside_does_not_fire() {
        let region = Span { mounted: true, start: 0, end: 10 };
        let mut detector = OutsideClickDetector::new(|| {});

        detector.handle(&region, PointerEvent::MouseDown(5));
        assert!(!detector.handle(&region, PointerEvent::Click(50)));
    }
}
