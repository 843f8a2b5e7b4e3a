//! 缓动装饰器：把叶子动作的线性进度经缓动函数重映射后再写回目标。

use std::time::Duration;

use crate::easing::Easing;
use crate::target::ActionTarget;

use super::interval::IntervalAction;

#[derive(Debug, Clone)]
pub(crate) struct Tween {
    inner: IntervalAction,
    easing: Easing,
}

impl Tween {
    pub(crate) fn new(inner: IntervalAction, easing: Easing) -> Self {
        Self { inner, easing }
    }

    pub(crate) fn inner(&self) -> &IntervalAction {
        &self.inner
    }

    pub(crate) fn init(&mut self, target: &dyn ActionTarget) {
        self.inner.init(target);
    }

    pub(crate) fn advance(&mut self, target: &mut dyn ActionTarget, dt: Duration) -> bool {
        self.inner.advance(target, dt, Some(&self.easing))
    }

    pub(crate) fn reset(&mut self) {
        self.inner.reset();
    }

    pub(crate) fn duplicate(&self) -> Self {
        Self::new(self.inner.duplicate(), self.easing.clone())
    }

    /// 反转内部动作，缓动曲线同时做时间反转
    pub(crate) fn reversed(&self) -> Option<Self> {
        self.inner
            .reversed()
            .map(|inner| Self::new(inner, self.easing.reversed()))
    }
}
