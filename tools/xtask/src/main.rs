//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 action-runtime 覆盖率
//! - `cov-workspace`: 运行 workspace 覆盖率
//! - `scene-check`: 检查场景脚本（JSON 格式、曲线、动作参数）

use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use action_runtime::SceneScript;
use walkdir::WalkDir;

/// 默认场景目录（相对于 workspace root）
const SCENES_DIR: &str = "assets/scenes";

fn run(step: &str, cmd: &mut Command) -> anyhow::Result<()> {
    eprintln!("\n==> {step}");
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("{step} failed with {status}");
    }
    Ok(())
}

fn cargo(args: &[&str]) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(args);
    cmd
}

fn ensure_cargo_llvm_cov_available() -> anyhow::Result<()> {
    match cargo(&["llvm-cov", "--version"]).status() {
        Ok(s) if s.success() => Ok(()),
        _ => anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        ),
    }
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => {
            run(
                "cargo fmt --all -- --check",
                &mut cargo(&["fmt", "--all", "--", "--check"]),
            )?;
            run(
                "cargo clippy --workspace --all-targets",
                &mut cargo(&["clippy", "--workspace", "--all-targets"]),
            )?;
            run("cargo test --workspace", &mut cargo(&["test", "--workspace"]))?;
        }
        "cov-runtime" => {
            ensure_cargo_llvm_cov_available()?;
            run(
                "cargo llvm-cov -p action-runtime --all-features --html",
                &mut cargo(&["llvm-cov", "-p", "action-runtime", "--all-features", "--html"]),
            )?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "cov-workspace" => {
            ensure_cargo_llvm_cov_available()?;

            // 排除 xtask，以免稀释信号
            run(
                "cargo llvm-cov --workspace --exclude xtask --all-features --html",
                &mut cargo(&[
                    "llvm-cov",
                    "--workspace",
                    "--exclude",
                    "xtask",
                    "--all-features",
                    "--html",
                ]),
            )?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "scene-check" => {
            let path = args.next();
            scene_check(path.as_deref())?;
        }
        "help" | "-h" | "--help" => {
            print_help();
        }
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all       运行 fmt、clippy、test 门禁检查
  cov-runtime     运行 action-runtime 覆盖率报告
  cov-workspace   运行 workspace 覆盖率报告
  scene-check     检查场景脚本

SCENE-CHECK:
  cargo xtask scene-check [path]

  不带参数：检查 assets/scenes/ 下所有 .json 文件
  带路径参数：检查指定文件或目录

  检查内容：
    - JSON 格式与动作类型
    - 曲线定义是否有效、引用的曲线是否存在
    - 时长、循环次数、缓动参数是否合法
    - reverse 包裹的动作是否可反转
"#
    );
}

//=============================================================================
// scene-check 命令实现
//=============================================================================

/// 单个场景的检查结果
enum SceneOutcome {
    Ok { nodes: usize, actions: usize },
    Failed(String),
}

/// 执行场景检查
fn scene_check(path: Option<&str>) -> anyhow::Result<()> {
    let files = match path {
        Some(p) => {
            let path = PathBuf::from(p);
            if path.is_file() {
                vec![path]
            } else if path.is_dir() {
                collect_scene_files(&path)
            } else {
                anyhow::bail!("路径不存在: {}", p);
            }
        }
        None => {
            let dir = Path::new(SCENES_DIR);
            if !dir.exists() {
                anyhow::bail!(
                    "默认场景目录不存在: {}\n请在 workspace 根目录运行，或指定场景路径",
                    dir.display()
                );
            }
            collect_scene_files(dir)
        }
    };

    if files.is_empty() {
        eprintln!("未找到场景文件（.json）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个场景文件...\n", files.len());

    let mut errors = 0;
    for file in &files {
        match check_scene_file(file) {
            SceneOutcome::Ok { nodes, actions } => {
                eprintln!("[OK] {}: {} 个节点, {} 个动作", file.display(), nodes, actions);
            }
            SceneOutcome::Failed(message) => {
                eprintln!("[ERROR] {}: {}", file.display(), message);
                errors += 1;
            }
        }
    }

    eprintln!("─────────────────────────────────────────────────────");
    if errors > 0 {
        eprintln!("❌ {} 个场景中有 {} 个错误", files.len(), errors);
        anyhow::bail!("场景检查发现错误");
    }
    eprintln!("✅ 检查通过，无错误");
    Ok(())
}

/// 收集目录下的所有场景文件
fn collect_scene_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

/// 检查单个场景文件
fn check_scene_file(file: &Path) -> SceneOutcome {
    let content = match std::fs::read_to_string(file) {
        Ok(c) => c,
        Err(e) => return SceneOutcome::Failed(format!("无法读取文件 - {}", e)),
    };

    let scene = match SceneScript::from_json(&content) {
        Ok(s) => s,
        Err(e) => return SceneOutcome::Failed(e.to_string()),
    };

    match scene.build_nodes() {
        Ok(nodes) => SceneOutcome::Ok {
            nodes: nodes.len(),
            actions: scene.action_count(),
        },
        Err(e) => SceneOutcome::Failed(e.to_string()),
    }
}
