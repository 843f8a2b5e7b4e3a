//! 重复组合：把一个动作重复执行固定次数或无限次。

use std::time::Duration;

use tracing::trace;

use crate::target::ActionTarget;

use super::Action;

/// 无限重复
pub(crate) const REPEAT_FOREVER: i32 = -1;

#[derive(Debug)]
pub(crate) struct Loop {
    inner: Box<Action>,
    /// 负数表示无限
    total: i32,
    done: i32,
}

impl Loop {
    pub(crate) fn new(inner: Action, total: i32) -> Self {
        Self {
            inner: Box::new(inner),
            total,
            done: 0,
        }
    }

    fn is_complete(&self) -> bool {
        self.total >= 0 && self.done >= self.total
    }

    pub(crate) fn init(&mut self, target: &dyn ActionTarget) {
        self.inner.init(target);
    }

    pub(crate) fn advance(&mut self, target: &mut dyn ActionTarget, dt: Duration) -> bool {
        if self.is_complete() {
            return true;
        }

        self.inner.update(target, dt);
        if !self.inner.is_done() {
            return false;
        }

        self.done += 1;
        trace!(action = self.inner.name(), done = self.done, total = self.total, "Loop 完成一轮");
        if self.is_complete() {
            return true;
        }
        self.inner.start();
        false
    }

    pub(crate) fn reset(&mut self) {
        self.inner.start();
        self.done = 0;
    }

    pub(crate) fn duplicate(&self) -> Self {
        Self::new(self.inner.duplicate(), self.total)
    }

    pub(crate) fn reversed(&self) -> Option<Self> {
        self.inner
            .reverse()
            .map(|inner| Self::new(inner, self.total))
    }

    pub(crate) fn duration(&self) -> Option<Duration> {
        if self.total < 0 {
            return None;
        }
        self.inner.duration()?.checked_mul(self.total as u32)
    }
}
