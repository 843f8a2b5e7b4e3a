//! # Node 模块
//!
//! 最小的可动画实体：名称 + 变换 + 动作管理器。

use std::time::Duration;

use crate::action::Action;
use crate::manager::{ActionHandle, ActionManager};
use crate::target::Transform;

/// 可动画节点
#[derive(Debug, Default)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    actions: ActionManager,
}

impl Node {
    pub fn new(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
            actions: ActionManager::new(),
        }
    }

    /// 在本节点上运行动作
    pub fn run_action(&mut self, action: impl Into<ActionHandle>) -> ActionHandle {
        self.actions.run_action(action)
    }

    /// 推进一帧；每帧调用且只调用一次
    pub fn tick(&mut self, dt: Duration) {
        let Self {
            transform, actions, ..
        } = self;
        actions.update_actions(transform, dt);
    }

    pub fn actions(&self) -> &ActionManager {
        &self.actions
    }

    pub fn actions_mut(&mut self) -> &mut ActionManager {
        &mut self.actions
    }

    /// 是否还有未清扫的动作
    pub fn is_animating(&self) -> bool {
        !self.actions.is_empty()
    }

    /// 便捷构造：在原点创建节点并立即运行给定动作
    pub fn with_actions(name: impl Into<String>, actions: impl IntoIterator<Item = Action>) -> Self {
        let mut node = Self::new(name, Transform::identity());
        for action in actions {
            node.run_action(action);
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_drives_transform() {
        let mut node = Node::with_actions(
            "hero",
            [
                Action::move_by(Duration::from_secs(1), (10.0, 0.0)),
                Action::fade_out(Duration::from_secs(2)),
            ],
        );
        assert!(node.is_animating());

        node.tick(Duration::from_secs(1));
        assert_eq!(node.transform.position.x, 10.0);
        assert_eq!(node.transform.opacity, 0.5);
        assert_eq!(node.actions().len(), 1);

        node.tick(Duration::from_secs(1));
        assert_eq!(node.transform.opacity, 0.0);
        assert!(!node.is_animating());
    }
}
