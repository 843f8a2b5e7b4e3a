//! # 脚本集成测试
//!
//! 加载示例场景，按固定帧率推进到结束，检查每个节点的最终状态。

use std::time::Duration;

use action_runtime::{Node, SceneScript, ScriptError, Vec2};

const DEMO_SCENE: &str = include_str!("../../assets/scenes/demo.json");

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-2
}

fn run_to_end(nodes: &mut [Node], fps: u32, limit: Duration) -> Duration {
    let dt = Duration::from_secs_f64(1.0 / fps as f64);
    let mut clock = Duration::ZERO;
    while clock < limit && nodes.iter().any(Node::is_animating) {
        for node in nodes.iter_mut() {
            node.tick(dt);
        }
        clock += dt;
    }
    clock
}

fn find<'a>(nodes: &'a [Node], name: &str) -> &'a Node {
    nodes
        .iter()
        .find(|node| node.name == name)
        .unwrap_or_else(|| panic!("节点 {} 不存在", name))
}

#[test]
fn test_demo_scene_runs_to_completion() {
    let scene = SceneScript::from_json(DEMO_SCENE).unwrap();
    assert_eq!(scene.nodes.len(), 4);
    assert_eq!(scene.action_count(), 13);

    let mut nodes = scene.build_nodes().unwrap();
    let elapsed = run_to_end(&mut nodes, 60, Duration::from_secs(10));
    assert!(elapsed < Duration::from_secs(4));
    assert!(nodes.iter().all(|node| !node.is_animating()));

    let hero = find(&nodes, "hero");
    assert!(approx(hero.transform.position.x, 150.0));
    assert!(approx(hero.transform.position.y, 0.0));
    assert_eq!(hero.transform.rotation, 90.0);

    let ghost = find(&nodes, "ghost");
    assert_eq!(ghost.transform.opacity, 1.0);
    assert!(approx(ghost.transform.scale.x, 2.0));
    assert_eq!(ghost.transform.position, Vec2::new(-50.0, 0.0));

    // 半圆从 (50, 0) 逆时针到 (-50, 0)，终点切线朝 -Y
    let orbiter = find(&nodes, "orbiter");
    assert!(approx(orbiter.transform.position.x, -50.0));
    assert!(approx(orbiter.transform.position.y, 0.0));
    assert!(approx(orbiter.transform.rotation, -90.0));

    // 折线终点 (60, 20)，再接一段首尾位移 (40, 0) 的贝塞尔
    let walker = find(&nodes, "walker");
    assert!(approx(walker.transform.position.x, 100.0));
    assert!(approx(walker.transform.position.y, 20.0));
    assert!(approx(walker.transform.rotation, -45.0));
}

#[test]
fn test_round_trip_preserves_structure() {
    let scene = SceneScript::from_json(DEMO_SCENE).unwrap();
    let json = serde_json::to_string(&scene).unwrap();
    let again = SceneScript::from_json(&json).unwrap();
    assert_eq!(again, scene);
}

#[test]
fn test_broken_scene_reports_first_error() {
    let scene = SceneScript::from_json(
        r#"{
            "nodes": [
                { "name": "a", "actions": [{ "type": "path", "duration": 1, "curve": "nowhere" }] }
            ]
        }"#,
    )
    .unwrap();
    let err = scene.build_nodes().unwrap_err();
    assert_eq!(err.to_string(), "曲线 'nowhere' 未定义");

    let err = SceneScript::from_json(r#"{ "nodes": [{ "name": "a", "actions": [{ "type": "teleport" }] }] }"#)
        .unwrap_err();
    assert!(matches!(err, ScriptError::Json { .. }));
}
