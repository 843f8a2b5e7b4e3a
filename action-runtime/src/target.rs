//! # Target 模块
//!
//! 动作目标抽象。
//!
//! 动作只通过 [`ActionTarget`] 读写目标的四类属性，不假设目标的具体类型；
//! 目标对象由宿主持有，动作从不拥有它。

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// 可被动作驱动的目标
///
/// 旋转使用角度制；透明度范围 `[0, 1]`。
pub trait ActionTarget {
    /// 当前位置
    fn position(&self) -> Vec2;

    /// 设置位置
    fn set_position(&mut self, position: Vec2);

    /// 当前缩放
    fn scale(&self) -> Vec2;

    /// 设置缩放
    fn set_scale(&mut self, scale: Vec2);

    /// 当前旋转（角度制）
    fn rotation(&self) -> f32;

    /// 设置旋转（角度制）
    fn set_rotation(&mut self, degrees: f32);

    /// 当前透明度
    fn opacity(&self) -> f32;

    /// 设置透明度
    fn set_opacity(&mut self, opacity: f32);
}

/// 变换状态
///
/// 表示一个可动画对象的位置、缩放、旋转和透明度，是 [`ActionTarget`] 的默认实现。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    /// 位置
    pub position: Vec2,
    /// 缩放因子
    pub scale: Vec2,
    /// 旋转角度（角度制）
    pub rotation: f32,
    /// 透明度 (0.0 - 1.0)
    pub opacity: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
            opacity: 1.0,
        }
    }
}

impl Transform {
    /// 创建默认变换（原点、无缩放、无旋转、完全不透明）
    pub fn identity() -> Self {
        Self::default()
    }

    /// 创建只有位置的变换
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            ..Self::default()
        }
    }

    /// 创建只有透明度的变换
    pub fn with_opacity(opacity: f32) -> Self {
        Self {
            opacity: opacity.clamp(0.0, 1.0),
            ..Self::default()
        }
    }
}

impl ActionTarget for Transform {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    fn scale(&self) -> Vec2 {
        self.scale
    }

    fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
    }

    fn rotation(&self) -> f32 {
        self.rotation
    }

    fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees;
    }

    fn opacity(&self) -> f32 {
        self.opacity
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_default() {
        let t = Transform::default();
        assert_eq!(t.position, Vec2::ZERO);
        assert_eq!(t.scale, Vec2::ONE);
        assert_eq!(t.rotation, 0.0);
        assert_eq!(t.opacity, 1.0);
    }

    #[test]
    fn test_opacity_clamped() {
        let mut t = Transform::identity();
        t.set_opacity(1.5);
        assert_eq!(t.opacity(), 1.0);
        t.set_opacity(-0.2);
        assert_eq!(t.opacity(), 0.0);
    }

    #[test]
    fn test_partial_deserialize() {
        let t: Transform = serde_json::from_str(r#"{"position":[5.0,6.0],"opacity":0.0}"#).unwrap();
        assert_eq!(t.position, Vec2::new(5.0, 6.0));
        assert_eq!(t.scale, Vec2::ONE);
        assert_eq!(t.opacity, 0.0);
    }
}
