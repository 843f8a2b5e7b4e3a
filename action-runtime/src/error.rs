//! # Error 模块
//!
//! 脚本加载与构建中使用的错误类型。
//!
//! 运行时 API 本身不返回错误（失败降级为 `None` 加警告）；
//! 只有解析外部输入的入口才会返回 [`ScriptError`]。

use thiserror::Error;

/// 脚本错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    /// JSON 格式错误
    #[error("脚本解析失败: {message}")]
    Json { message: String },

    /// 引用了未定义的曲线
    #[error("曲线 '{name}' 未定义")]
    UnknownCurve { name: String },

    /// 曲线定义无效
    #[error("曲线 '{name}' 无效 - {message}")]
    InvalidCurve { name: String, message: String },

    /// 时长为负数、非有限值或超出可表示范围
    #[error("动作 '{action}' 的 {field} 无效：{value}")]
    InvalidDuration {
        action: String,
        field: &'static str,
        value: f32,
    },

    /// 参数超出允许范围
    #[error("动作 '{action}' 的参数 '{param}' 无效 - {message}")]
    InvalidParameter {
        action: String,
        param: &'static str,
        message: String,
    },

    /// 请求反转不支持反转的动作
    #[error("动作 '{action}' 不支持反转")]
    UnsupportedReverse { action: String },

    /// 缓动参数无效或用在了非叶子动作上
    #[error("动作 '{action}' 的缓动无效 - {message}")]
    InvalidEasing { action: String, message: String },
}

impl From<serde_json::Error> for ScriptError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
        }
    }
}

/// Result 类型别名
pub type ScriptResult<T> = Result<T, ScriptError>;
