//! # Script 模块
//!
//! 声明式动作脚本（JSON）。
//!
//! ```json
//! {
//!   "curves": { "orbit": { "kind": "arc", "center": [0, 0], "radius": 50, "start_angle": 0, "sweep": 360 } },
//!   "nodes": [
//!     {
//!       "name": "hero",
//!       "transform": { "position": [0, 0] },
//!       "actions": [
//!         { "type": "move_by", "duration": 1.0, "delta": [100, 0], "easing": "ease_out_quad" },
//!         { "type": "path", "duration": 2.0, "curve": "orbit", "rotating": true, "loops": -1 }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! 脚本是严格的：运行时只记录警告的情况（未定义曲线、不支持的反转等）在这里都是错误。

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::curve::{Curve, CurveDef};
use crate::easing::Easing;
use crate::error::{ScriptError, ScriptResult};
use crate::math::Vec2;
use crate::node::Node;
use crate::target::Transform;

/// 已构建的曲线表
pub type CurveLibrary = HashMap<String, Rc<dyn Curve>>;

fn default_path_end() -> f32 {
    1.0
}

/// 动作节点的具体类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionNode {
    MoveBy {
        duration: f32,
        delta: Vec2,
    },
    MoveTo {
        duration: f32,
        position: Vec2,
    },
    JumpBy {
        duration: f32,
        delta: Vec2,
        height: f32,
        jumps: u32,
    },
    JumpTo {
        duration: f32,
        position: Vec2,
        height: f32,
        jumps: u32,
    },
    ScaleBy {
        duration: f32,
        scale: Vec2,
    },
    ScaleTo {
        duration: f32,
        scale: Vec2,
    },
    RotateBy {
        duration: f32,
        angle: f32,
    },
    RotateTo {
        duration: f32,
        angle: f32,
    },
    OpacityBy {
        duration: f32,
        opacity: f32,
    },
    OpacityTo {
        duration: f32,
        opacity: f32,
    },
    FadeIn {
        duration: f32,
    },
    FadeOut {
        duration: f32,
    },
    Delay {
        duration: f32,
    },
    /// 沿 `curves` 中的命名曲线运动
    Path {
        duration: f32,
        curve: String,
        #[serde(default)]
        rotating: bool,
        #[serde(default)]
        start: f32,
        #[serde(default = "default_path_end")]
        end: f32,
    },
    Sequence {
        actions: Vec<ActionScript>,
    },
    Spawn {
        actions: Vec<ActionScript>,
    },
    /// `times = -1` 表示无限
    Repeat {
        action: Box<ActionScript>,
        times: i32,
    },
    Reverse {
        action: Box<ActionScript>,
    },
}

impl ActionNode {
    /// 脚本中的类型名
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::MoveBy { .. } => "move_by",
            Self::MoveTo { .. } => "move_to",
            Self::JumpBy { .. } => "jump_by",
            Self::JumpTo { .. } => "jump_to",
            Self::ScaleBy { .. } => "scale_by",
            Self::ScaleTo { .. } => "scale_to",
            Self::RotateBy { .. } => "rotate_by",
            Self::RotateTo { .. } => "rotate_to",
            Self::OpacityBy { .. } => "opacity_by",
            Self::OpacityTo { .. } => "opacity_to",
            Self::FadeIn { .. } => "fade_in",
            Self::FadeOut { .. } => "fade_out",
            Self::Delay { .. } => "delay",
            Self::Path { .. } => "path",
            Self::Sequence { .. } => "sequence",
            Self::Spawn { .. } => "spawn",
            Self::Repeat { .. } => "repeat",
            Self::Reverse { .. } => "reverse",
        }
    }

    fn is_leaf(&self) -> bool {
        !matches!(
            self,
            Self::Sequence { .. } | Self::Spawn { .. } | Self::Repeat { .. } | Self::Reverse { .. }
        )
    }

    /// 子树中第一个无法反转的叶子（"to" 系列动作）
    fn irreversible_leaf(&self) -> Option<&'static str> {
        match self {
            Self::MoveTo { .. }
            | Self::JumpTo { .. }
            | Self::ScaleTo { .. }
            | Self::RotateTo { .. }
            | Self::OpacityTo { .. }
            | Self::FadeIn { .. }
            | Self::FadeOut { .. } => Some(self.type_name()),
            Self::Sequence { actions } | Self::Spawn { actions } => {
                actions.iter().find_map(|child| child.node.irreversible_leaf())
            }
            Self::Repeat { action, .. } | Self::Reverse { action } => action.node.irreversible_leaf(),
            _ => None,
        }
    }
}

/// 一个动作的脚本描述
///
/// 除了类型相关的字段外，所有动作都可以带 `delay`（秒）、`loops` 和
/// `easing`（仅叶子动作）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionScript {
    #[serde(flatten)]
    pub node: ActionNode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loops: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<Easing>,
}

impl PartialEq for ActionScript {
    /// 自定义缓动无法比较，此处只比较结构
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
            && self.delay == other.delay
            && self.loops == other.loops
            && self.easing.is_some() == other.easing.is_some()
    }
}

impl From<ActionNode> for ActionScript {
    fn from(node: ActionNode) -> Self {
        Self {
            node,
            delay: None,
            loops: None,
            easing: None,
        }
    }
}

/// 秒数转为 `Duration`；负数、非有限值以及超出 `Duration` 范围的值都是错误
fn seconds(action: &ActionNode, field: &'static str, value: f32) -> ScriptResult<Duration> {
    Duration::try_from_secs_f32(value).map_err(|_| ScriptError::InvalidDuration {
        action: action.type_name().to_string(),
        field,
        value,
    })
}

fn check_fraction(action: &ActionNode, param: &'static str, value: f32) -> ScriptResult<f32> {
    if !value.is_finite() {
        return Err(ScriptError::InvalidParameter {
            action: action.type_name().to_string(),
            param,
            message: format!("必须为有限数，实际 {}", value),
        });
    }
    Ok(value)
}

fn check_count(action: &ActionNode, param: &'static str, value: i32) -> ScriptResult<i32> {
    if value < -1 {
        return Err(ScriptError::InvalidParameter {
            action: action.type_name().to_string(),
            param,
            message: format!("必须 >= -1，实际 {}", value),
        });
    }
    Ok(value)
}

impl ActionScript {
    /// 解析单个动作
    pub fn from_json(json: &str) -> ScriptResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 构建可运行的动作
    pub fn build(&self, curves: &CurveLibrary) -> ScriptResult<Action> {
        let node = &self.node;
        let d = |value: f32| seconds(node, "duration", value);

        let mut action = match node {
            ActionNode::MoveBy { duration, delta } => Action::move_by(d(*duration)?, *delta),
            ActionNode::MoveTo { duration, position } => Action::move_to(d(*duration)?, *position),
            ActionNode::JumpBy {
                duration,
                delta,
                height,
                jumps,
            } => Action::jump_by(d(*duration)?, *delta, *height, *jumps),
            ActionNode::JumpTo {
                duration,
                position,
                height,
                jumps,
            } => Action::jump_to(d(*duration)?, *position, *height, *jumps),
            ActionNode::ScaleBy { duration, scale } => Action::scale_by(d(*duration)?, scale.x, scale.y),
            ActionNode::ScaleTo { duration, scale } => Action::scale_to(d(*duration)?, scale.x, scale.y),
            ActionNode::RotateBy { duration, angle } => Action::rotate_by(d(*duration)?, *angle),
            ActionNode::RotateTo { duration, angle } => Action::rotate_to(d(*duration)?, *angle),
            ActionNode::OpacityBy { duration, opacity } => Action::opacity_by(d(*duration)?, *opacity),
            ActionNode::OpacityTo { duration, opacity } => Action::opacity_to(d(*duration)?, *opacity),
            ActionNode::FadeIn { duration } => Action::fade_in(d(*duration)?),
            ActionNode::FadeOut { duration } => Action::fade_out(d(*duration)?),
            ActionNode::Delay { duration } => Action::delay(d(*duration)?),
            ActionNode::Path {
                duration,
                curve,
                rotating,
                start,
                end,
            } => {
                let shape = curves
                    .get(curve)
                    .ok_or_else(|| ScriptError::UnknownCurve { name: curve.clone() })?;
                Action::path(
                    d(*duration)?,
                    Rc::clone(shape),
                    *rotating,
                    check_fraction(node, "start", *start)?,
                    check_fraction(node, "end", *end)?,
                )
            }
            ActionNode::Sequence { actions } => Action::sequence(
                actions
                    .iter()
                    .map(|child| child.build(curves))
                    .collect::<ScriptResult<Vec<_>>>()?,
            ),
            ActionNode::Spawn { actions } => Action::spawn(
                actions
                    .iter()
                    .map(|child| child.build(curves))
                    .collect::<ScriptResult<Vec<_>>>()?,
            ),
            ActionNode::Repeat { action, times } => {
                Action::repeat(action.build(curves)?, check_count(node, "times", *times)?)
            }
            ActionNode::Reverse { action } => {
                // 组合动作在运行时会跳过不可反转的子动作，脚本中直接报错
                if let Some(leaf) = action.node.irreversible_leaf() {
                    return Err(ScriptError::UnsupportedReverse {
                        action: leaf.to_string(),
                    });
                }
                let inner = action.build(curves)?;
                inner.reverse().ok_or_else(|| ScriptError::UnsupportedReverse {
                    action: action.node.type_name().to_string(),
                })?
            }
        };

        if let Some(easing) = &self.easing {
            if !node.is_leaf() {
                return Err(ScriptError::InvalidEasing {
                    action: node.type_name().to_string(),
                    message: "缓动只能用于叶子动作".to_string(),
                });
            }
            if !easing.is_valid() {
                return Err(ScriptError::InvalidEasing {
                    action: node.type_name().to_string(),
                    message: format!("参数必须为有限正数: {:?}", easing),
                });
            }
            action = Action::tween(action, easing.clone());
        }
        if let Some(delay) = self.delay {
            action.set_delay(seconds(node, "delay", delay)?);
        }
        if let Some(loops) = self.loops {
            action.set_loops(check_count(node, "loops", loops)?);
        }
        Ok(action)
    }

    /// 动作树中的节点总数
    pub fn count(&self) -> usize {
        1 + match &self.node {
            ActionNode::Sequence { actions } | ActionNode::Spawn { actions } => {
                actions.iter().map(Self::count).sum()
            }
            ActionNode::Repeat { action, .. } | ActionNode::Reverse { action } => action.count(),
            _ => 0,
        }
    }
}

/// 一个节点的脚本描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeScript {
    pub name: String,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub actions: Vec<ActionScript>,
}

/// 场景脚本：命名曲线 + 节点
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneScript {
    #[serde(default)]
    pub curves: BTreeMap<String, CurveDef>,
    #[serde(default)]
    pub nodes: Vec<NodeScript>,
}

impl SceneScript {
    /// 从 JSON 文本解析
    pub fn from_json(json: &str) -> ScriptResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 构建曲线表
    pub fn build_curves(&self) -> ScriptResult<CurveLibrary> {
        self.curves
            .iter()
            .map(|(name, def)| -> ScriptResult<(String, Rc<dyn Curve>)> {
                def.check().map_err(|message| ScriptError::InvalidCurve {
                    name: name.clone(),
                    message,
                })?;
                let curve: Rc<dyn Curve> = Rc::from(def.build());
                Ok((name.clone(), curve))
            })
            .collect()
    }

    /// 构建节点，每个节点的动作均已启动
    pub fn build_nodes(&self) -> ScriptResult<Vec<Node>> {
        let curves = self.build_curves()?;
        self.nodes
            .iter()
            .map(|script| -> ScriptResult<Node> {
                let mut node = Node::new(script.name.clone(), script.transform);
                for action in &script.actions {
                    node.run_action(action.build(&curves)?);
                }
                Ok(node)
            })
            .collect()
    }

    /// 场景中的动作节点总数
    pub fn action_count(&self) -> usize {
        self.nodes
            .iter()
            .flat_map(|node| &node.actions)
            .map(ActionScript::count)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::EasingFunction;

    #[test]
    fn test_parse_with_common_fields() {
        let script = ActionScript::from_json(
            r#"{"type":"move_by","duration":1,"delta":[10,0],"delay":0.5,"loops":2,"easing":"ease_in_quad"}"#,
        )
        .unwrap();
        assert_eq!(
            script.node,
            ActionNode::MoveBy {
                duration: 1.0,
                delta: Vec2::new(10.0, 0.0),
            }
        );
        assert_eq!(script.delay, Some(0.5));
        assert_eq!(script.loops, Some(2));
        assert!(matches!(
            script.easing,
            Some(Easing::Preset(EasingFunction::EaseInQuad))
        ));

        let action = script.build(&CurveLibrary::new()).unwrap();
        assert_eq!(action.name(), "Tween");
        assert_eq!(action.loops(), 2);
        assert_eq!(action.start_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_parametrized_easing() {
        let script = ActionScript::from_json(
            r#"{"type":"rotate_by","duration":1,"angle":90,"easing":{"mode":"out","rate":3}}"#,
        )
        .unwrap();
        assert!(matches!(script.easing, Some(Easing::Power { rate, .. }) if rate == 3.0));
        assert!(script.build(&CurveLibrary::new()).is_ok());
    }

    #[test]
    fn test_nested_tree() {
        let script = ActionScript::from_json(
            r#"{
                "type": "repeat",
                "times": 2,
                "action": {
                    "type": "sequence",
                    "actions": [
                        { "type": "delay", "duration": 1 },
                        { "type": "fade_out", "duration": 0.5 }
                    ]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(script.count(), 4);
        let action = script.build(&CurveLibrary::new()).unwrap();
        assert_eq!(action.name(), "Loop");
        assert_eq!(action.duration(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_strict_errors() {
        let curves = CurveLibrary::new();

        let unknown = ActionScript::from(ActionNode::Path {
            duration: 1.0,
            curve: "missing".to_string(),
            rotating: false,
            start: 0.0,
            end: 1.0,
        });
        assert_eq!(
            unknown.build(&curves).unwrap_err(),
            ScriptError::UnknownCurve {
                name: "missing".to_string()
            }
        );

        let reverse = ActionScript::from(ActionNode::Reverse {
            action: Box::new(ActionScript::from(ActionNode::FadeIn { duration: 1.0 })),
        });
        assert!(matches!(
            reverse.build(&curves),
            Err(ScriptError::UnsupportedReverse { .. })
        ));

        let negative = ActionScript::from(ActionNode::Delay { duration: -1.0 });
        assert!(matches!(
            negative.build(&curves),
            Err(ScriptError::InvalidDuration { field: "duration", .. })
        ));

        let mut eased_group = ActionScript::from(ActionNode::Spawn { actions: vec![] });
        eased_group.easing = Some(EasingFunction::Linear.into());
        assert!(matches!(
            eased_group.build(&curves),
            Err(ScriptError::InvalidEasing { .. })
        ));

        let bad_loops = ActionScript {
            loops: Some(-5),
            ..ActionScript::from(ActionNode::Delay { duration: 1.0 })
        };
        assert!(matches!(
            bad_loops.build(&curves),
            Err(ScriptError::InvalidParameter { param: "loops", .. })
        ));
    }

    #[test]
    fn test_out_of_range_durations_are_errors() {
        let curves = CurveLibrary::new();

        let huge = ActionScript::from_json(r#"{"type":"delay","duration":1e30}"#).unwrap();
        assert_eq!(
            huge.build(&curves).unwrap_err(),
            ScriptError::InvalidDuration {
                action: "delay".to_string(),
                field: "duration",
                value: 1e30,
            }
        );

        let huge_delay =
            ActionScript::from_json(r#"{"type":"fade_out","duration":1,"delay":1e30}"#).unwrap();
        assert!(matches!(
            huge_delay.build(&curves),
            Err(ScriptError::InvalidDuration { field: "delay", .. })
        ));
    }

    #[test]
    fn test_reverse_rejects_nested_to_actions() {
        let curves = CurveLibrary::new();
        let script = ActionScript::from_json(
            r#"{
                "type": "reverse",
                "action": {
                    "type": "sequence",
                    "actions": [
                        { "type": "move_to", "duration": 1, "position": [10, 0] },
                        { "type": "move_by", "duration": 1, "delta": [10, 0] }
                    ]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(
            script.build(&curves).unwrap_err(),
            ScriptError::UnsupportedReverse {
                action: "move_to".to_string()
            }
        );

        let nested = ActionScript::from_json(
            r#"{
                "type": "reverse",
                "action": {
                    "type": "spawn",
                    "actions": [
                        { "type": "rotate_by", "duration": 1, "angle": 45 },
                        { "type": "repeat", "times": 2, "action": { "type": "fade_in", "duration": 1 } }
                    ]
                }
            }"#,
        )
        .unwrap();
        assert!(matches!(
            nested.build(&curves),
            Err(ScriptError::UnsupportedReverse { .. })
        ));

        let reversible = ActionScript::from_json(
            r#"{
                "type": "reverse",
                "action": {
                    "type": "sequence",
                    "actions": [
                        { "type": "move_by", "duration": 1, "delta": [10, 0] },
                        { "type": "delay", "duration": 0.5 }
                    ]
                }
            }"#,
        )
        .unwrap();
        let action = reversible.build(&curves).unwrap();
        assert_eq!(action.duration(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_path_fractions_must_be_finite() {
        let mut curves = CurveLibrary::new();
        curves.insert(
            "line".to_string(),
            Rc::from(CurveDef::Polyline {
                points: vec![Vec2::ZERO, Vec2::new(10.0, 0.0)],
            }
            .build()),
        );

        let script = ActionScript::from(ActionNode::Path {
            duration: 1.0,
            curve: "line".to_string(),
            rotating: false,
            start: f32::NAN,
            end: 1.0,
        });
        assert!(matches!(
            script.build(&curves),
            Err(ScriptError::InvalidParameter { param: "start", .. })
        ));
    }

    #[test]
    fn test_scene_builds_running_nodes() {
        let scene = SceneScript::from_json(
            r#"{
                "curves": { "line": { "kind": "polyline", "points": [[0, 0], [10, 0]] } },
                "nodes": [
                    {
                        "name": "a",
                        "transform": { "position": [1, 2] },
                        "actions": [{ "type": "path", "duration": 1, "curve": "line" }]
                    },
                    { "name": "b" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(scene.action_count(), 1);

        let mut nodes = scene.build_nodes().unwrap();
        assert_eq!(nodes.len(), 2);
        assert!(nodes[0].is_animating());
        assert!(!nodes[1].is_animating());

        nodes[0].tick(Duration::from_secs(1));
        assert_eq!(nodes[0].transform.position, Vec2::new(11.0, 2.0));
    }

    #[test]
    fn test_invalid_curve_and_json() {
        let scene = SceneScript::from_json(
            r#"{ "curves": { "dot": { "kind": "polyline", "points": [[0, 0]] } } }"#,
        )
        .unwrap();
        assert!(matches!(
            scene.build_nodes(),
            Err(ScriptError::InvalidCurve { ref name, .. }) if name == "dot"
        ));

        assert!(matches!(
            SceneScript::from_json("{ not json"),
            Err(ScriptError::Json { .. })
        ));
    }
}
