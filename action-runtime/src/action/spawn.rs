//! 并行组合：所有子动作同时运行，全部完成时结束。

use std::time::Duration;

use crate::target::ActionTarget;

use super::Action;

#[derive(Debug)]
pub(crate) struct Spawn {
    children: Vec<Action>,
}

impl Spawn {
    pub(crate) fn new(children: Vec<Action>) -> Self {
        Self { children }
    }

    pub(crate) fn init(&mut self, target: &dyn ActionTarget) {
        for child in &mut self.children {
            child.init(target);
        }
    }

    pub(crate) fn advance(&mut self, target: &mut dyn ActionTarget, dt: Duration) -> bool {
        let mut done = 0;
        for child in &mut self.children {
            if !child.is_done() {
                child.update(target, dt);
            }
            if child.is_done() {
                done += 1;
            }
        }
        done == self.children.len()
    }

    pub(crate) fn reset(&mut self) {
        for child in &mut self.children {
            child.start();
        }
    }

    pub(crate) fn duplicate(&self) -> Self {
        Self::new(self.children.iter().map(Action::duplicate).collect())
    }

    pub(crate) fn reversed(&self) -> Self {
        Self::new(self.children.iter().filter_map(Action::reverse).collect())
    }

    /// 最长子动作的时长；任一子动作无限则为 `None`
    pub(crate) fn duration(&self) -> Option<Duration> {
        let durations: Option<Vec<Duration>> = self.children.iter().map(Action::duration).collect();
        durations.map(|d| d.into_iter().max().unwrap_or_default())
    }
}
