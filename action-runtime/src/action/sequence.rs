//! 顺序组合：子动作按顺序逐个执行，每帧只推进当前子动作。

use std::time::Duration;

use crate::target::ActionTarget;

use super::Action;

#[derive(Debug)]
pub(crate) struct Sequence {
    children: Vec<Action>,
    active: usize,
}

impl Sequence {
    pub(crate) fn new(children: Vec<Action>) -> Self {
        Self {
            children,
            active: 0,
        }
    }

    /// 只初始化第一个子动作，其余在轮到时再初始化
    pub(crate) fn init(&mut self, target: &dyn ActionTarget) {
        if let Some(first) = self.children.first_mut() {
            first.init(target);
        }
    }

    pub(crate) fn advance(&mut self, target: &mut dyn ActionTarget, dt: Duration) -> bool {
        let Some(child) = self.children.get_mut(self.active) else {
            return true;
        };

        child.update(target, dt);
        if !child.is_done() {
            return false;
        }

        self.active += 1;
        match self.children.get_mut(self.active) {
            Some(next) => {
                next.init(target);
                false
            }
            None => true,
        }
    }

    pub(crate) fn reset(&mut self) {
        for child in &mut self.children {
            child.start();
        }
        self.active = 0;
    }

    pub(crate) fn duplicate(&self) -> Self {
        Self::new(self.children.iter().map(Action::duplicate).collect())
    }

    /// 逆序排列各子动作的反转；无法反转的子动作被跳过
    pub(crate) fn reversed(&self) -> Self {
        Self::new(self.children.iter().rev().filter_map(Action::reverse).collect())
    }

    /// 子动作时长之和；任一子动作无限或总和溢出则为 `None`
    pub(crate) fn duration(&self) -> Option<Duration> {
        self.children
            .iter()
            .try_fold(Duration::ZERO, |total, child| total.checked_add(child.duration()?))
    }
}
