//! # Action Runtime
//!
//! 2D 场景的动作调度核心。
//!
//! ## 架构概述
//!
//! `action-runtime` 是纯逻辑核心，不依赖任何 IO 或渲染引擎。
//! 宿主实体实现 [`ActionTarget`]，持有一个 [`ActionManager`]，每帧推进一次：
//!
//! ```text
//! Host (entity)                 ActionManager
//!   │                              │
//!   │──── update_actions(self, dt) ──►│
//!   │                              │ Action::update → 组合动作 → 叶子动作
//!   │◄──── set_position / set_opacity … │
//!   │                              │
//! ```
//!
//! ## 使用示例
//!
//! ```ignore
//! use std::time::Duration;
//! use action_runtime::{Action, ActionManager, EasingFunction, Transform};
//!
//! let secs = Duration::from_secs_f32;
//! let mut sprite = Transform::identity();
//! let mut manager = ActionManager::new();
//!
//! manager.run_action(Action::sequence([
//!     Action::delay(secs(0.5)),
//!     Action::tween(Action::move_by(secs(1.0), (100.0, 0.0)), EasingFunction::EaseOutQuad),
//!     Action::fade_out(secs(0.3)),
//! ]));
//!
//! loop {
//!     manager.update_actions(&mut sprite, frame_dt);
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`easing`]：缓动函数
//! - [`math`]：二维向量
//! - [`target`]：动作目标抽象与默认变换
//! - [`curve`]：按弧长参数化的曲线
//! - [`action`]：动作生命周期、叶子动作与组合
//! - [`manager`]：每个目标的动作管理器
//! - [`node`]：最小可动画节点
//! - [`script`]：声明式 JSON 脚本
//! - [`error`]：错误类型定义

pub mod action;
pub mod curve;
pub mod easing;
pub mod error;
pub mod manager;
pub mod math;
pub mod node;
pub mod script;
pub mod target;

// 重导出核心类型
pub use action::{Action, ActionCallback, ActionStatus};
pub use curve::{CircleArc, CubicBezier, Curve, CurveDef, Polyline};
pub use easing::{EaseMode, Easing, EasingFunction};
pub use error::{ScriptError, ScriptResult};
pub use manager::{ActionHandle, ActionManager};
pub use math::Vec2;
pub use node::Node;
pub use script::{ActionNode, ActionScript, CurveLibrary, NodeScript, SceneScript};
pub use target::{ActionTarget, Transform};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        // 验证所有公共类型都可以正常使用
        let _action = Action::delay(std::time::Duration::ZERO);
        let _manager = ActionManager::new();
        let _target = Transform::identity();
        let _easing = Easing::from(EasingFunction::Linear);
        let _scene = SceneScript::default();
    }
}
