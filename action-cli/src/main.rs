//! # actions
//!
//! 动作脚本命令行工具：无窗口地推进场景、检查脚本、采样缓动曲线。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p action-cli -- run assets/scenes/demo.json
//! cargo run -p action-cli -- run assets/scenes/demo.json --fps 30 --trace-interval 0
//! cargo run -p action-cli -- check assets/scenes/demo.json
//! cargo run -p action-cli -- easing ease_out_bounce --samples 21
//! ```

mod config;
mod simulate;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use action_runtime::{EasingFunction, SceneScript};
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use config::ActionsConfig;
use simulate::{NodeState, simulate};

#[derive(Parser)]
#[command(name = "actions")]
#[command(about = "动作脚本工具 - 无窗口推进场景中的动作")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 配置文件（默认：actions.json）
    #[arg(short, long, default_value = "actions.json", global = true)]
    config: PathBuf,

    /// 日志级别，覆盖配置文件
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// 推进场景直到所有动作结束，输出最终状态
    Run {
        /// 场景脚本路径
        scene: PathBuf,

        /// 每秒帧数
        #[arg(long)]
        fps: Option<u32>,

        /// 最长模拟时间（秒）
        #[arg(long)]
        max_duration: Option<f32>,

        /// 状态输出间隔（秒），0 表示不输出
        #[arg(long)]
        trace_interval: Option<f32>,
    },

    /// 检查场景脚本能否构建
    Check {
        /// 场景脚本路径
        scene: PathBuf,
    },

    /// 采样缓动曲线
    Easing {
        /// 缓动名称，如 ease_in_out_quad
        name: String,

        /// 采样点数量（含两端）
        #[arg(short, long, default_value = "11")]
        samples: usize,
    },
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("❌ {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ActionsConfig::load(&cli.config);
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Commands::Run {
        fps,
        max_duration,
        trace_interval,
        ..
    } = &cli.command
    {
        let sim = &mut config.simulation;
        sim.fps = fps.unwrap_or(sim.fps);
        sim.max_duration = max_duration.unwrap_or(sim.max_duration);
        sim.trace_interval = trace_interval.unwrap_or(sim.trace_interval);
    }
    config.validate()?;

    tracing_subscriber::fmt()
        .with_max_level(config.level_filter()?)
        .with_writer(std::io::stderr)
        .init();
    debug!(?config, "配置已加载");

    match cli.command {
        Commands::Run { scene, .. } => run_scene(&scene, &config),
        Commands::Check { scene } => check_scene(&scene),
        Commands::Easing { name, samples } => sample_easing(&name, samples),
    }
}

fn load_scene(path: &Path) -> anyhow::Result<SceneScript> {
    let content =
        fs::read_to_string(path).with_context(|| format!("无法读取场景: {}", path.display()))?;
    SceneScript::from_json(&content).with_context(|| format!("场景解析失败: {}", path.display()))
}

fn run_scene(path: &Path, config: &ActionsConfig) -> anyhow::Result<()> {
    let scene = load_scene(path)?;
    let mut nodes = scene
        .build_nodes()
        .with_context(|| format!("场景构建失败: {}", path.display()))?;
    info!(scene = %path.display(), nodes = nodes.len(), fps = config.simulation.fps, "开始模拟");

    let report = simulate(&mut nodes, &config.simulation)?;
    info!(
        frames = report.frames,
        elapsed = report.elapsed.as_secs_f32(),
        finished = report.finished,
        "模拟结束"
    );

    let states: Vec<NodeState<'_>> = nodes.iter().map(NodeState::from).collect();
    println!("{}", serde_json::to_string_pretty(&states)?);
    Ok(())
}

fn check_scene(path: &Path) -> anyhow::Result<()> {
    let scene = load_scene(path)?;
    let nodes = scene
        .build_nodes()
        .with_context(|| format!("场景构建失败: {}", path.display()))?;
    println!(
        "✅ {}: {} 个节点, {} 个动作",
        path.display(),
        nodes.len(),
        scene.action_count()
    );
    Ok(())
}

fn sample_easing(name: &str, samples: usize) -> anyhow::Result<()> {
    let Some(easing) = EasingFunction::from_name(name) else {
        let names: Vec<String> = EasingFunction::ALL
            .iter()
            .filter_map(|e| serde_json::to_value(e).ok())
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();
        anyhow::bail!("未知的缓动: {}\n可用: {}", name, names.join(", "));
    };
    if samples < 2 {
        anyhow::bail!("采样点数量至少为 2，实际 {}", samples);
    }

    for i in 0..samples {
        let t = i as f32 / (samples - 1) as f32;
        println!("{:.3}\t{:.5}", t, easing.apply(t));
    }
    Ok(())
}
