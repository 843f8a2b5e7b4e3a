//! # Easing 模块
//!
//! 缓动函数库，把线性进度 `[0, 1]` 映射为缓动后的进度。
//!
//! - [`EasingFunction`]：预设缓动曲线（无参数），通过只读查找表分发
//! - [`Easing`]：`Tween` 实际持有的缓动值，可以是预设，也可以是带参数的曲线
//!
//! 所有曲线满足 `f(0) = 0`、`f(1) = 1`；Elastic / Back / Bounce 在中途可能越出 `[0, 1]`。

use std::collections::HashMap;
use std::f32::consts::PI;
use std::fmt;
use std::rc::Rc;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Back 曲线默认回弹量
pub const DEFAULT_BACK_OVERSHOOT: f32 = 1.70158;

/// Elastic 曲线默认周期
pub const DEFAULT_ELASTIC_PERIOD: f32 = 0.3;

/// 预设缓动函数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    /// 线性（匀速）
    #[default]
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    EaseInQuint,
    EaseOutQuint,
    EaseInOutQuint,
    EaseInSine,
    EaseOutSine,
    EaseInOutSine,
    EaseInExpo,
    EaseOutExpo,
    EaseInOutExpo,
    /// 弹性缓入
    EaseInElastic,
    /// 弹性缓出
    EaseOutElastic,
    EaseInOutElastic,
    /// 弹跳缓入
    EaseInBounce,
    /// 弹跳缓出
    EaseOutBounce,
    EaseInOutBounce,
    /// 回弹缓入（起步先后退）
    EaseInBack,
    /// 回弹缓出（越过终点再回来）
    EaseOutBack,
    EaseInOutBack,
}

/// 查找表：进程内只构建一次，之后只读
static EASING_TABLE: LazyLock<HashMap<EasingFunction, fn(f32) -> f32>> = LazyLock::new(|| {
    EasingFunction::ALL
        .iter()
        .map(|&easing| (easing, easing.resolve()))
        .collect()
});

impl EasingFunction {
    /// 全部预设
    pub const ALL: [EasingFunction; 28] = [
        Self::Linear,
        Self::EaseInQuad,
        Self::EaseOutQuad,
        Self::EaseInOutQuad,
        Self::EaseInCubic,
        Self::EaseOutCubic,
        Self::EaseInOutCubic,
        Self::EaseInQuart,
        Self::EaseOutQuart,
        Self::EaseInOutQuart,
        Self::EaseInQuint,
        Self::EaseOutQuint,
        Self::EaseInOutQuint,
        Self::EaseInSine,
        Self::EaseOutSine,
        Self::EaseInOutSine,
        Self::EaseInExpo,
        Self::EaseOutExpo,
        Self::EaseInOutExpo,
        Self::EaseInElastic,
        Self::EaseOutElastic,
        Self::EaseInOutElastic,
        Self::EaseInBounce,
        Self::EaseOutBounce,
        Self::EaseInOutBounce,
        Self::EaseInBack,
        Self::EaseOutBack,
        Self::EaseInOutBack,
    ];

    /// 计算缓动值
    ///
    /// # 参数
    /// - `t`: 时间进度 (0.0 - 1.0)，超出范围会被限制
    ///
    /// # 返回
    /// - 缓动后的进度值
    pub fn apply(&self, t: f32) -> f32 {
        let f = EASING_TABLE.get(self).copied().unwrap_or(linear);
        f(t.clamp(0.0, 1.0))
    }

    /// 时间反转后的曲线（In ↔ Out，InOut 与 Linear 不变）
    pub fn reversed(&self) -> Self {
        use EasingFunction::*;
        match self {
            EaseInQuad => EaseOutQuad,
            EaseOutQuad => EaseInQuad,
            EaseInCubic => EaseOutCubic,
            EaseOutCubic => EaseInCubic,
            EaseInQuart => EaseOutQuart,
            EaseOutQuart => EaseInQuart,
            EaseInQuint => EaseOutQuint,
            EaseOutQuint => EaseInQuint,
            EaseInSine => EaseOutSine,
            EaseOutSine => EaseInSine,
            EaseInExpo => EaseOutExpo,
            EaseOutExpo => EaseInExpo,
            EaseInElastic => EaseOutElastic,
            EaseOutElastic => EaseInElastic,
            EaseInBounce => EaseOutBounce,
            EaseOutBounce => EaseInBounce,
            EaseInBack => EaseOutBack,
            EaseOutBack => EaseInBack,
            other => *other,
        }
    }

    /// 按 snake_case 名称查找预设（如 `"ease_in_quad"`）
    pub fn from_name(name: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(name.to_string())).ok()
    }

    fn resolve(self) -> fn(f32) -> f32 {
        use EasingFunction::*;
        match self {
            Linear => linear,
            EaseInQuad => |t| power_in(t, 2.0),
            EaseOutQuad => |t| power_out(t, 2.0),
            EaseInOutQuad => |t| power_in_out(t, 2.0),
            EaseInCubic => |t| power_in(t, 3.0),
            EaseOutCubic => |t| power_out(t, 3.0),
            EaseInOutCubic => |t| power_in_out(t, 3.0),
            EaseInQuart => |t| power_in(t, 4.0),
            EaseOutQuart => |t| power_out(t, 4.0),
            EaseInOutQuart => |t| power_in_out(t, 4.0),
            EaseInQuint => |t| power_in(t, 5.0),
            EaseOutQuint => |t| power_out(t, 5.0),
            EaseInOutQuint => |t| power_in_out(t, 5.0),
            EaseInSine => sine_in,
            EaseOutSine => sine_out,
            EaseInOutSine => sine_in_out,
            EaseInExpo => expo_in,
            EaseOutExpo => expo_out,
            EaseInOutExpo => expo_in_out,
            EaseInElastic => |t| elastic_in(t, DEFAULT_ELASTIC_PERIOD),
            EaseOutElastic => |t| elastic_out(t, DEFAULT_ELASTIC_PERIOD),
            EaseInOutElastic => |t| elastic_in_out(t, DEFAULT_ELASTIC_PERIOD * 1.5),
            EaseInBounce => bounce_in,
            EaseOutBounce => bounce_out,
            EaseInOutBounce => bounce_in_out,
            EaseInBack => |t| back_in(t, DEFAULT_BACK_OVERSHOOT),
            EaseOutBack => |t| back_out(t, DEFAULT_BACK_OVERSHOOT),
            EaseInOutBack => |t| back_in_out(t, DEFAULT_BACK_OVERSHOOT),
        }
    }
}

/// 带参数曲线的方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EaseMode {
    In,
    Out,
    InOut,
}

impl EaseMode {
    fn reversed(self) -> Self {
        match self {
            Self::In => Self::Out,
            Self::Out => Self::In,
            Self::InOut => Self::InOut,
        }
    }
}

/// Tween 使用的缓动值
///
/// 预设直接走查找表；带参数的变体在构造时捕获参数。
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Easing {
    /// 预设曲线
    Preset(EasingFunction),
    /// 指数可配置的幂曲线
    Power { mode: EaseMode, rate: f32 },
    /// 周期可配置的弹性曲线
    Elastic { mode: EaseMode, period: f32 },
    /// 回弹量可配置的 Back 曲线
    Back { mode: EaseMode, overshoot: f32 },
    /// 自定义曲线（不可序列化）
    #[serde(skip)]
    Custom(Rc<dyn Fn(f32) -> f32>),
}

impl Easing {
    /// 幂曲线，`rate = 2` 等价于 Quad
    pub fn power(mode: EaseMode, rate: f32) -> Self {
        Self::Power { mode, rate }
    }

    /// 弹性曲线
    pub fn elastic(mode: EaseMode, period: f32) -> Self {
        Self::Elastic { mode, period }
    }

    /// Back 曲线
    pub fn back(mode: EaseMode, overshoot: f32) -> Self {
        Self::Back { mode, overshoot }
    }

    /// 自定义曲线
    pub fn custom(f: impl Fn(f32) -> f32 + 'static) -> Self {
        Self::Custom(Rc::new(f))
    }

    /// 计算缓动值，输入限制在 `[0, 1]`
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Preset(preset) => preset.apply(t),
            Self::Power { mode, rate } => match mode {
                EaseMode::In => power_in(t, *rate),
                EaseMode::Out => power_out(t, *rate),
                EaseMode::InOut => power_in_out(t, *rate),
            },
            Self::Elastic { mode, period } => match mode {
                EaseMode::In => elastic_in(t, *period),
                EaseMode::Out => elastic_out(t, *period),
                EaseMode::InOut => elastic_in_out(t, *period),
            },
            Self::Back { mode, overshoot } => match mode {
                EaseMode::In => back_in(t, *overshoot),
                EaseMode::Out => back_out(t, *overshoot),
                EaseMode::InOut => back_in_out(t, *overshoot),
            },
            Self::Custom(f) => f(t),
        }
    }

    /// 时间反转：`g(t) = 1 - f(1 - t)`
    pub fn reversed(&self) -> Self {
        match self {
            Self::Preset(preset) => Self::Preset(preset.reversed()),
            Self::Power { mode, rate } => Self::Power {
                mode: mode.reversed(),
                rate: *rate,
            },
            Self::Elastic { mode, period } => Self::Elastic {
                mode: mode.reversed(),
                period: *period,
            },
            Self::Back { mode, overshoot } => Self::Back {
                mode: mode.reversed(),
                overshoot: *overshoot,
            },
            Self::Custom(f) => {
                let f = Rc::clone(f);
                Self::Custom(Rc::new(move |t| 1.0 - f(1.0 - t)))
            }
        }
    }

    /// 参数是否有效（有限且为正）
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Power { rate: p, .. }
            | Self::Elastic { period: p, .. }
            | Self::Back { overshoot: p, .. } => p.is_finite() && *p > 0.0,
            Self::Preset(_) | Self::Custom(_) => true,
        }
    }
}

impl Default for Easing {
    fn default() -> Self {
        Self::Preset(EasingFunction::Linear)
    }
}

impl From<EasingFunction> for Easing {
    fn from(preset: EasingFunction) -> Self {
        Self::Preset(preset)
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preset(preset) => write!(f, "{:?}", preset),
            Self::Power { mode, rate } => write!(f, "Power({:?}, {})", mode, rate),
            Self::Elastic { mode, period } => write!(f, "Elastic({:?}, {})", mode, period),
            Self::Back { mode, overshoot } => write!(f, "Back({:?}, {})", mode, overshoot),
            Self::Custom(_) => write!(f, "Custom"),
        }
    }
}

fn linear(t: f32) -> f32 {
    t
}

fn power_in(t: f32, rate: f32) -> f32 {
    t.powf(rate)
}

fn power_out(t: f32, rate: f32) -> f32 {
    1.0 - (1.0 - t).powf(rate)
}

fn power_in_out(t: f32, rate: f32) -> f32 {
    if t < 0.5 {
        2.0_f32.powf(rate - 1.0) * t.powf(rate)
    } else {
        1.0 - (-2.0 * t + 2.0).powf(rate) / 2.0
    }
}

fn sine_in(t: f32) -> f32 {
    if t >= 1.0 {
        return 1.0;
    }
    1.0 - (t * PI / 2.0).cos()
}

fn sine_out(t: f32) -> f32 {
    (t * PI / 2.0).sin()
}

fn sine_in_out(t: f32) -> f32 {
    -((PI * t).cos() - 1.0) / 2.0
}

fn expo_in(t: f32) -> f32 {
    if t == 0.0 {
        0.0
    } else {
        2.0_f32.powf(10.0 * t - 10.0)
    }
}

fn expo_out(t: f32) -> f32 {
    if t == 1.0 {
        1.0
    } else {
        1.0 - 2.0_f32.powf(-10.0 * t)
    }
}

fn expo_in_out(t: f32) -> f32 {
    if t == 0.0 || t == 1.0 {
        t
    } else if t < 0.5 {
        2.0_f32.powf(20.0 * t - 10.0) / 2.0
    } else {
        (2.0 - 2.0_f32.powf(-20.0 * t + 10.0)) / 2.0
    }
}

fn elastic_in(t: f32, period: f32) -> f32 {
    if t == 0.0 || t == 1.0 {
        return t;
    }
    let s = period / 4.0;
    let t = t - 1.0;
    -(2.0_f32.powf(10.0 * t) * ((t - s) * (2.0 * PI) / period).sin())
}

fn elastic_out(t: f32, period: f32) -> f32 {
    if t == 0.0 || t == 1.0 {
        return t;
    }
    let s = period / 4.0;
    2.0_f32.powf(-10.0 * t) * ((t - s) * (2.0 * PI) / period).sin() + 1.0
}

fn elastic_in_out(t: f32, period: f32) -> f32 {
    if t == 0.0 || t == 1.0 {
        return t;
    }
    let s = period / 4.0;
    let t = t * 2.0 - 1.0;
    if t < 0.0 {
        -0.5 * 2.0_f32.powf(10.0 * t) * ((t - s) * (2.0 * PI) / period).sin()
    } else {
        2.0_f32.powf(-10.0 * t) * ((t - s) * (2.0 * PI) / period).sin() * 0.5 + 1.0
    }
}

fn bounce_out(t: f32) -> f32 {
    let n1 = 7.5625;
    let d1 = 2.75;

    if t < 1.0 / d1 {
        n1 * t * t
    } else if t < 2.0 / d1 {
        let t = t - 1.5 / d1;
        n1 * t * t + 0.75
    } else if t < 2.5 / d1 {
        let t = t - 2.25 / d1;
        n1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / d1;
        n1 * t * t + 0.984375
    }
}

fn bounce_in(t: f32) -> f32 {
    1.0 - bounce_out(1.0 - t)
}

fn bounce_in_out(t: f32) -> f32 {
    if t < 0.5 {
        (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
    } else {
        (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
    }
}

fn back_in(t: f32, overshoot: f32) -> f32 {
    let c3 = overshoot + 1.0;
    c3 * t * t * t - overshoot * t * t
}

fn back_out(t: f32, overshoot: f32) -> f32 {
    let c3 = overshoot + 1.0;
    let t = t - 1.0;
    1.0 + c3 * t * t * t + overshoot * t * t
}

fn back_in_out(t: f32, overshoot: f32) -> f32 {
    let c2 = overshoot * 1.525;
    if t < 0.5 {
        ((2.0 * t).powi(2) * ((c2 + 1.0) * 2.0 * t - c2)) / 2.0
    } else {
        ((2.0 * t - 2.0).powi(2) * ((c2 + 1.0) * (t * 2.0 - 2.0) + c2) + 2.0) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_linear() {
        let easing = EasingFunction::Linear;
        assert_eq!(easing.apply(0.0), 0.0);
        assert_eq!(easing.apply(0.5), 0.5);
        assert_eq!(easing.apply(1.0), 1.0);
    }

    #[test]
    fn test_all_presets_hit_endpoints() {
        for easing in EasingFunction::ALL {
            assert!(approx(easing.apply(0.0), 0.0), "{:?}(0)", easing);
            assert!(approx(easing.apply(1.0), 1.0), "{:?}(1)", easing);
        }
    }

    #[test]
    fn test_clamp() {
        let easing = EasingFunction::Linear;
        // 超出范围应该被限制
        assert_eq!(easing.apply(-0.5), 0.0);
        assert_eq!(easing.apply(1.5), 1.0);
    }

    #[test]
    fn test_in_out_midpoint() {
        for easing in [
            EasingFunction::EaseInOutQuad,
            EasingFunction::EaseInOutCubic,
            EasingFunction::EaseInOutSine,
            EasingFunction::EaseInOutExpo,
        ] {
            assert!(approx(easing.apply(0.5), 0.5), "{:?}", easing);
        }
    }

    #[test]
    fn test_ease_in_is_behind_ease_out_is_ahead() {
        assert!(EasingFunction::EaseInQuad.apply(0.3) < 0.3);
        assert!(EasingFunction::EaseOutQuad.apply(0.3) > 0.3);
    }

    #[test]
    fn test_back_overshoots() {
        // 起步先往回走
        assert!(EasingFunction::EaseInBack.apply(0.2) < 0.0);
        // 越过终点
        assert!(EasingFunction::EaseOutBack.apply(0.8) > 1.0);
    }

    #[test]
    fn test_power_matches_presets() {
        let quad = Easing::power(EaseMode::In, 2.0);
        let cubic_out = Easing::power(EaseMode::Out, 3.0);
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            assert!(approx(quad.apply(t), EasingFunction::EaseInQuad.apply(t)));
            assert!(approx(cubic_out.apply(t), EasingFunction::EaseOutCubic.apply(t)));
        }
    }

    #[test]
    fn test_reversed_is_time_mirror() {
        let easings = [
            Easing::from(EasingFunction::EaseInCubic),
            Easing::from(EasingFunction::EaseOutBounce),
            Easing::from(EasingFunction::EaseInBack),
            Easing::power(EaseMode::In, 2.5),
            Easing::custom(|t| t * t),
        ];
        for easing in &easings {
            let reversed = easing.reversed();
            for i in 0..=10 {
                let t = i as f32 / 10.0;
                let expected = 1.0 - easing.apply(1.0 - t);
                assert!(approx(reversed.apply(t), expected), "{:?} at {}", easing, t);
            }
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(
            EasingFunction::from_name("ease_in_out_quad"),
            Some(EasingFunction::EaseInOutQuad)
        );
        assert_eq!(EasingFunction::from_name("nope"), None);
    }

    #[test]
    fn test_easing_deserialize() {
        let preset: Easing = serde_json::from_str(r#""ease_out_bounce""#).unwrap();
        assert!(matches!(preset, Easing::Preset(EasingFunction::EaseOutBounce)));

        let elastic: Easing = serde_json::from_str(r#"{"mode":"out","period":0.4}"#).unwrap();
        assert!(matches!(elastic, Easing::Elastic { mode: EaseMode::Out, .. }));

        let power: Easing = serde_json::from_str(r#"{"mode":"in_out","rate":2.0}"#).unwrap();
        assert!(matches!(power, Easing::Power { mode: EaseMode::InOut, .. }));
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(!Easing::power(EaseMode::In, 0.0).is_valid());
        assert!(!Easing::elastic(EaseMode::Out, f32::NAN).is_valid());
        assert!(Easing::back(EaseMode::In, DEFAULT_BACK_OVERSHOOT).is_valid());
    }
}
