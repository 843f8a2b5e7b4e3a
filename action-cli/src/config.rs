//! # Config 模块
//!
//! 命令行工具的配置管理。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (actions.json)
//! 3. 默认值（最低）

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::level_filters::LevelFilter;

/// 工具配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionsConfig {
    /// 模拟配置
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// 日志级别（trace / debug / info / warn / error / off）
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// 模拟配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// 每秒帧数
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// 最长模拟时间（秒），用于截断无限循环的动作
    #[serde(default = "default_max_duration")]
    pub max_duration: f32,

    /// 输出节点状态的间隔（秒），0 表示不输出
    #[serde(default = "default_trace_interval")]
    pub trace_interval: f32,
}

// 默认值函数
fn default_fps() -> u32 {
    60
}

fn default_max_duration() -> f32 {
    30.0
}

fn default_trace_interval() -> f32 {
    0.5
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            max_duration: default_max_duration(),
            trace_interval: default_trace_interval(),
        }
    }
}

impl SimulationConfig {
    /// 模拟时长上限
    pub fn limit(&self) -> Result<Duration, ConfigError> {
        if self.max_duration <= 0.0 {
            return Err(ConfigError::ValidationFailed(format!(
                "max_duration 必须为正数，实际 {}",
                self.max_duration
            )));
        }
        to_duration("max_duration", self.max_duration)
    }

    /// 状态输出间隔；零表示不输出
    pub fn trace_every(&self) -> Result<Duration, ConfigError> {
        to_duration("trace_interval", self.trace_interval)
    }
}

fn to_duration(field: &str, secs: f32) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f32(secs).map_err(|_| {
        ConfigError::ValidationFailed(format!("{} 必须为有限非负秒数，实际 {}", field, secs))
    })
}

impl ActionsConfig {
    /// 加载配置文件
    ///
    /// 文件不存在时静默使用默认配置；读取或解析失败时打印警告并使用默认配置。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("⚠️ 配置文件解析失败: {}，使用默认配置", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("⚠️ 配置文件读取失败: {}，使用默认配置", e);
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        fs::write(path, json).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// 日志级别
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::ValidationFailed(format!("未知的日志级别: {}", self.log_level)))
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;

        if sim.fps == 0 {
            return Err(ConfigError::ValidationFailed("fps 必须大于 0".to_string()));
        }

        sim.limit()?;
        sim.trace_every()?;

        self.level_filter()?;

        Ok(())
    }
}

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    SerializationFailed(String),
    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    IoError(String),
    /// 验证失败
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}
