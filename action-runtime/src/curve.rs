//! # Curve 模块
//!
//! 按弧长参数化的几何曲线，供 Path 动作查询位置与切线。
//!
//! 曲线不可变、可共享（`Rc<dyn Curve>`），动作只持有引用，不拥有曲线。

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// 贝塞尔曲线弧长查找表的采样段数
const BEZIER_SAMPLES: usize = 64;

/// 按弧长参数化的曲线
pub trait Curve: Debug {
    /// 曲线总长度
    fn total_length(&self) -> f32;

    /// 查询弧长 `length` 处的点与单位切线
    ///
    /// `length` 会被限制在 `[0, total_length]`。
    fn point_and_tangent_at_length(&self, length: f32) -> (Vec2, Vec2);
}

/// 退化曲线的默认切线
const DEFAULT_TANGENT: Vec2 = Vec2::new(1.0, 0.0);

/// 折线
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    points: Vec<Vec2>,
    /// `cumulative[i]` = 从起点到 `points[i]` 的弧长
    cumulative: Vec<f32>,
}

impl Polyline {
    /// 由顶点序列创建折线
    pub fn new(points: impl IntoIterator<Item = Vec2>) -> Self {
        let points: Vec<Vec2> = points.into_iter().collect();
        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = 0.0;
        for (i, point) in points.iter().enumerate() {
            if i > 0 {
                total += points[i - 1].distance(*point);
            }
            cumulative.push(total);
        }
        Self { points, cumulative }
    }

    /// 顶点
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }
}

impl Curve for Polyline {
    fn total_length(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    fn point_and_tangent_at_length(&self, length: f32) -> (Vec2, Vec2) {
        match self.points.len() {
            0 => return (Vec2::ZERO, DEFAULT_TANGENT),
            1 => return (self.points[0], DEFAULT_TANGENT),
            _ => {}
        }

        let total = self.total_length();
        if total <= f32::EPSILON {
            return (self.points[0], DEFAULT_TANGENT);
        }
        let length = length.clamp(0.0, total);

        // 第一个累计长度 >= length 的顶点，其前一段即所在线段
        let upper = self
            .cumulative
            .partition_point(|&c| c < length)
            .clamp(1, self.points.len() - 1);
        let (a, b) = (self.points[upper - 1], self.points[upper]);
        let segment = self.cumulative[upper] - self.cumulative[upper - 1];
        if segment <= f32::EPSILON {
            return (b, DEFAULT_TANGENT);
        }
        let t = (length - self.cumulative[upper - 1]) / segment;
        (a.lerp(b, t), (b - a).normalized())
    }
}

/// 三次贝塞尔曲线
///
/// 构造时采样为弧长查找表，查询时在表内插值出参数 `t`。
#[derive(Debug, Clone, PartialEq)]
pub struct CubicBezier {
    p0: Vec2,
    p1: Vec2,
    p2: Vec2,
    p3: Vec2,
    /// `lengths[i]` = 参数 `i / BEZIER_SAMPLES` 处的累计弧长
    lengths: Vec<f32>,
}

impl CubicBezier {
    /// 由四个控制点创建
    pub fn new(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Self {
        let mut curve = Self {
            p0,
            p1,
            p2,
            p3,
            lengths: Vec::with_capacity(BEZIER_SAMPLES + 1),
        };
        let mut total = 0.0;
        let mut prev = p0;
        curve.lengths.push(0.0);
        for i in 1..=BEZIER_SAMPLES {
            let point = curve.point_at(i as f32 / BEZIER_SAMPLES as f32);
            total += prev.distance(point);
            curve.lengths.push(total);
            prev = point;
        }
        curve
    }

    /// 参数 `t` 处的点
    pub fn point_at(&self, t: f32) -> Vec2 {
        let u = 1.0 - t;
        self.p0 * (u * u * u)
            + self.p1 * (3.0 * u * u * t)
            + self.p2 * (3.0 * u * t * t)
            + self.p3 * (t * t * t)
    }

    /// 参数 `t` 处的导数
    fn derivative_at(&self, t: f32) -> Vec2 {
        let u = 1.0 - t;
        (self.p1 - self.p0) * (3.0 * u * u)
            + (self.p2 - self.p1) * (6.0 * u * t)
            + (self.p3 - self.p2) * (3.0 * t * t)
    }

    /// 弧长转参数
    fn parameter_at_length(&self, length: f32) -> f32 {
        let upper = self
            .lengths
            .partition_point(|&l| l < length)
            .clamp(1, BEZIER_SAMPLES);
        let (l0, l1) = (self.lengths[upper - 1], self.lengths[upper]);
        let local = if l1 - l0 <= f32::EPSILON {
            0.0
        } else {
            (length - l0) / (l1 - l0)
        };
        ((upper - 1) as f32 + local) / BEZIER_SAMPLES as f32
    }
}

impl Curve for CubicBezier {
    fn total_length(&self) -> f32 {
        self.lengths[BEZIER_SAMPLES]
    }

    fn point_and_tangent_at_length(&self, length: f32) -> (Vec2, Vec2) {
        let total = self.total_length();
        if total <= f32::EPSILON {
            return (self.p0, DEFAULT_TANGENT);
        }
        let t = self.parameter_at_length(length.clamp(0.0, total));
        let tangent = self.derivative_at(t).normalized();
        let tangent = if tangent.length() <= f32::EPSILON {
            (self.p3 - self.p0).normalized()
        } else {
            tangent
        };
        (self.point_at(t), tangent)
    }
}

/// 圆弧
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleArc {
    /// 圆心
    pub center: Vec2,
    /// 半径
    pub radius: f32,
    /// 起始角（角度制）
    pub start_angle: f32,
    /// 扫过的角度（角度制，负值为顺时针）
    pub sweep: f32,
}

impl CircleArc {
    /// 创建圆弧
    pub fn new(center: Vec2, radius: f32, start_angle: f32, sweep: f32) -> Self {
        Self {
            center,
            radius: radius.abs(),
            start_angle,
            sweep,
        }
    }
}

impl Curve for CircleArc {
    fn total_length(&self) -> f32 {
        self.radius * self.sweep.to_radians().abs()
    }

    fn point_and_tangent_at_length(&self, length: f32) -> (Vec2, Vec2) {
        let total = self.total_length();
        let fraction = if total <= f32::EPSILON {
            0.0
        } else {
            length.clamp(0.0, total) / total
        };
        let angle = self.start_angle + self.sweep * fraction;
        let point = self.center + Vec2::from_angle_degrees(angle) * self.radius;
        let tangent_angle = if self.sweep >= 0.0 {
            angle + 90.0
        } else {
            angle - 90.0
        };
        (point, Vec2::from_angle_degrees(tangent_angle))
    }
}

/// 曲线定义（用于脚本）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurveDef {
    /// 折线
    Polyline { points: Vec<Vec2> },
    /// 三次贝塞尔
    Bezier { points: [Vec2; 4] },
    /// 圆弧
    Arc {
        center: Vec2,
        radius: f32,
        start_angle: f32,
        sweep: f32,
    },
}

impl CurveDef {
    /// 检查定义是否可用，返回错误描述
    pub fn check(&self) -> Result<(), String> {
        match self {
            Self::Polyline { points } if points.len() < 2 => {
                Err(format!("折线至少需要 2 个点，实际 {}", points.len()))
            }
            Self::Arc { radius, .. } if !radius.is_finite() || *radius <= 0.0 => {
                Err(format!("圆弧半径必须为正数，实际 {}", radius))
            }
            _ => Ok(()),
        }
    }

    /// 构造曲线对象
    pub fn build(&self) -> Box<dyn Curve> {
        match self {
            Self::Polyline { points } => Box::new(Polyline::new(points.iter().copied())),
            Self::Bezier { points: [p0, p1, p2, p3] } => {
                Box::new(CubicBezier::new(*p0, *p1, *p2, *p3))
            }
            Self::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => Box::new(CircleArc::new(*center, *radius, *start_angle, *sweep)),
        }
    }
}
