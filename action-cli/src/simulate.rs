//! # Simulate 模块
//!
//! 以固定帧率推进场景节点，直到所有动作结束或达到时长上限。

use std::time::Duration;

use action_runtime::{Node, Transform};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{ConfigError, SimulationConfig};

/// 模拟结果
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    /// 推进的帧数
    pub frames: u64,
    /// 模拟的总时间
    pub elapsed: Duration,
    /// 所有动作是否都已结束
    pub finished: bool,
}

/// 节点最终状态（输出用）
#[derive(Debug, Serialize)]
pub struct NodeState<'a> {
    pub name: &'a str,
    pub transform: Transform,
    /// 仍在运行的动作数量
    pub running_actions: usize,
}

impl<'a> From<&'a Node> for NodeState<'a> {
    fn from(node: &'a Node) -> Self {
        Self {
            name: &node.name,
            transform: node.transform,
            running_actions: node.actions().len(),
        }
    }
}

/// 推进节点
///
/// 时长配置无法转换为 `Duration` 时返回错误，不推进任何节点。
pub fn simulate(
    nodes: &mut [Node],
    config: &SimulationConfig,
) -> Result<SimulationReport, ConfigError> {
    if config.fps == 0 {
        return Err(ConfigError::ValidationFailed("fps 必须大于 0".to_string()));
    }
    let dt = Duration::from_secs_f64(1.0 / f64::from(config.fps));
    let limit = config.limit()?;
    let interval = config.trace_every()?;

    let mut report = SimulationReport {
        frames: 0,
        elapsed: Duration::ZERO,
        finished: false,
    };
    let mut next_trace = interval;

    while report.elapsed < limit {
        if !nodes.iter().any(Node::is_animating) {
            report.finished = true;
            break;
        }

        for node in nodes.iter_mut() {
            node.tick(dt);
        }
        report.frames += 1;
        report.elapsed += dt;

        if !interval.is_zero() && report.elapsed >= next_trace {
            for node in nodes.iter() {
                let t = &node.transform;
                info!(
                    time = report.elapsed.as_secs_f32(),
                    node = %node.name,
                    x = t.position.x,
                    y = t.position.y,
                    rotation = t.rotation,
                    opacity = t.opacity,
                    "节点状态"
                );
            }
            next_trace = next_trace.saturating_add(interval);
        }
    }

    if !report.finished {
        report.finished = !nodes.iter().any(Node::is_animating);
    }
    if !report.finished {
        warn!(elapsed = report.elapsed.as_secs_f32(), "达到模拟时长上限，仍有动作在运行");
    }
    Ok(report)
}
