//! 有限时长的叶子动作。
//!
//! 每个叶子在 `init` 时从目标读取起始快照，之后每帧按进度写回目标。
//! By / To 两种变体共用同一份状态：To 变体把 `delta = end - start` 推迟到 `init` 时计算。

use std::ops::{Add, Mul, Neg, Sub};
use std::rc::Rc;
use std::time::Duration;

use crate::curve::Curve;
use crate::easing::Easing;
use crate::math::Vec2;
use crate::target::ActionTarget;

/// 完成判定容差，吸收逐帧累加的浮点误差
pub(crate) const PROGRESS_EPSILON: f32 = 1e-5;

/// 相对量或绝对终值
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Goal<T> {
    By(T),
    To(T),
}

/// 可线性插值的属性值
pub(crate) trait Lerpable:
    Copy + Default + Add<Output = Self> + Sub<Output = Self> + Mul<f32, Output = Self> + Neg<Output = Self>
{
}

impl<T> Lerpable for T where
    T: Copy + Default + Add<Output = T> + Sub<Output = T> + Mul<f32, Output = T> + Neg<Output = T>
{
}

/// 起点 + 增量 的线性插值状态
#[derive(Debug, Clone)]
pub(crate) struct Lerp<T> {
    goal: Goal<T>,
    start: T,
    delta: T,
}

impl<T: Lerpable> Lerp<T> {
    fn new(goal: Goal<T>) -> Self {
        Self {
            goal,
            start: T::default(),
            delta: T::default(),
        }
    }

    fn init(&mut self, start: T) {
        self.start = start;
        self.delta = match self.goal {
            Goal::By(delta) => delta,
            Goal::To(end) => end - start,
        };
    }

    fn value_at(&self, percent: f32) -> T {
        self.start + self.delta * percent
    }

    fn fresh(&self) -> Self {
        Self::new(self.goal)
    }

    /// To 变体无法在不知道目标状态的情况下反转
    fn reversed(&self) -> Option<Self> {
        match self.goal {
            Goal::By(delta) => Some(Self::new(Goal::By(-delta))),
            Goal::To(_) => None,
        }
    }

    fn is_relative(&self) -> bool {
        matches!(self.goal, Goal::By(_))
    }
}

/// 位置插值，带重新锚定
///
/// 每一步先把目标自上一步以来的位移（来自其他动作或外部代码）并入起点，
/// 使多个同时运行的位移动作可以叠加。
#[derive(Debug, Clone)]
pub(crate) struct Motion {
    lerp: Lerp<Vec2>,
    prev: Vec2,
}

impl Motion {
    fn new(goal: Goal<Vec2>) -> Self {
        Self {
            lerp: Lerp::new(goal),
            prev: Vec2::ZERO,
        }
    }

    fn init(&mut self, target: &dyn ActionTarget) {
        let position = target.position();
        self.lerp.init(position);
        self.prev = position;
    }

    fn anchor(&mut self, target: &dyn ActionTarget) {
        let diff = target.position() - self.prev;
        self.lerp.start += diff;
    }

    fn place(&mut self, target: &mut dyn ActionTarget, position: Vec2) {
        target.set_position(position);
        self.prev = position;
    }

    fn fresh(&self) -> Self {
        Self::new(self.lerp.goal)
    }

    fn reversed(&self) -> Option<Self> {
        self.lerp.reversed().map(|lerp| Self {
            lerp,
            prev: Vec2::ZERO,
        })
    }
}

/// 沿曲线运动
#[derive(Debug, Clone)]
pub(crate) struct PathFollow {
    curve: Rc<dyn Curve>,
    rotating: bool,
    start: f32,
    end: f32,
    /// 目标位置 = anchor + 曲线点
    anchor: Vec2,
}

impl PathFollow {
    fn new(curve: Rc<dyn Curve>, rotating: bool, start: f32, end: f32) -> Self {
        Self {
            curve,
            rotating,
            start,
            end,
            anchor: Vec2::ZERO,
        }
    }

    fn sample(&self, fraction: f32) -> (Vec2, Vec2) {
        let length = self.curve.total_length() * fraction.clamp(0.0, 1.0);
        self.curve.point_and_tangent_at_length(length)
    }

    fn init(&mut self, target: &dyn ActionTarget) {
        let (first, _) = self.sample(self.start);
        self.anchor = target.position() - first;
    }

    fn apply(&self, target: &mut dyn ActionTarget, percent: f32) {
        let (point, tangent) = self.sample(self.start + (self.end - self.start) * percent);
        target.set_position(self.anchor + point);
        if self.rotating {
            target.set_rotation(tangent.angle_degrees());
        }
    }

    fn fresh(&self) -> Self {
        Self::new(Rc::clone(&self.curve), self.rotating, self.start, self.end)
    }
}

/// 叶子动作的具体行为
#[derive(Debug, Clone)]
pub(crate) enum Step {
    Move(Motion),
    Jump {
        motion: Motion,
        height: f32,
        jumps: u32,
    },
    Scale(Lerp<Vec2>),
    Rotate(Lerp<f32>),
    Opacity(Lerp<f32>),
    Path(PathFollow),
    Delay,
}

impl Step {
    pub(crate) fn move_to(goal: Goal<Vec2>) -> Self {
        Self::Move(Motion::new(goal))
    }

    pub(crate) fn jump(goal: Goal<Vec2>, height: f32, jumps: u32) -> Self {
        Self::Jump {
            motion: Motion::new(goal),
            height,
            jumps,
        }
    }

    pub(crate) fn scale(goal: Goal<Vec2>) -> Self {
        Self::Scale(Lerp::new(goal))
    }

    pub(crate) fn rotate(goal: Goal<f32>) -> Self {
        Self::Rotate(Lerp::new(goal))
    }

    pub(crate) fn opacity(goal: Goal<f32>) -> Self {
        Self::Opacity(Lerp::new(goal))
    }

    pub(crate) fn path(curve: Rc<dyn Curve>, rotating: bool, start: f32, end: f32) -> Self {
        Self::Path(PathFollow::new(curve, rotating, start, end))
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Move(m) if m.lerp.is_relative() => "MoveBy",
            Self::Move(_) => "MoveTo",
            Self::Jump { motion, .. } if motion.lerp.is_relative() => "JumpBy",
            Self::Jump { .. } => "JumpTo",
            Self::Scale(l) if l.is_relative() => "ScaleBy",
            Self::Scale(_) => "ScaleTo",
            Self::Rotate(l) if l.is_relative() => "RotateBy",
            Self::Rotate(_) => "RotateTo",
            Self::Opacity(l) if l.is_relative() => "OpacityBy",
            Self::Opacity(_) => "OpacityTo",
            Self::Path(_) => "Path",
            Self::Delay => "Delay",
        }
    }

    fn init(&mut self, target: &dyn ActionTarget) {
        match self {
            Self::Move(motion) | Self::Jump { motion, .. } => motion.init(target),
            Self::Scale(lerp) => lerp.init(target.scale()),
            Self::Rotate(lerp) => lerp.init(target.rotation()),
            Self::Opacity(lerp) => lerp.init(target.opacity()),
            Self::Path(follow) => follow.init(target),
            Self::Delay => {}
        }
    }

    fn apply(&mut self, target: &mut dyn ActionTarget, percent: f32) {
        match self {
            Self::Move(motion) => {
                motion.anchor(target);
                let position = motion.lerp.value_at(percent);
                motion.place(target, position);
            }
            Self::Jump {
                motion,
                height,
                jumps,
            } => {
                motion.anchor(target);
                let frac = (percent * *jumps as f32) % 1.0;
                let arc = *height * 4.0 * frac * (1.0 - frac);
                let delta = motion.lerp.delta;
                let offset = Vec2::new(delta.x * percent, delta.y * percent + arc);
                let position = motion.lerp.start + offset;
                motion.place(target, position);
            }
            Self::Scale(lerp) => target.set_scale(lerp.value_at(percent)),
            Self::Rotate(lerp) => target.set_rotation(lerp.value_at(percent)),
            Self::Opacity(lerp) => target.set_opacity(lerp.value_at(percent)),
            Self::Path(follow) => follow.apply(target, percent),
            Self::Delay => {}
        }
    }

    fn fresh(&self) -> Self {
        match self {
            Self::Move(motion) => Self::Move(motion.fresh()),
            Self::Jump {
                motion,
                height,
                jumps,
            } => Self::Jump {
                motion: motion.fresh(),
                height: *height,
                jumps: *jumps,
            },
            Self::Scale(lerp) => Self::Scale(lerp.fresh()),
            Self::Rotate(lerp) => Self::Rotate(lerp.fresh()),
            Self::Opacity(lerp) => Self::Opacity(lerp.fresh()),
            Self::Path(follow) => Self::Path(follow.fresh()),
            Self::Delay => Self::Delay,
        }
    }

    fn reversed(&self) -> Option<Self> {
        Some(match self {
            Self::Move(motion) => Self::Move(motion.reversed()?),
            Self::Jump {
                motion,
                height,
                jumps,
            } => Self::Jump {
                motion: motion.reversed()?,
                height: *height,
                jumps: *jumps,
            },
            Self::Scale(lerp) => Self::Scale(lerp.reversed()?),
            Self::Rotate(lerp) => Self::Rotate(lerp.reversed()?),
            Self::Opacity(lerp) => Self::Opacity(lerp.reversed()?),
            Self::Path(follow) => Self::Path(PathFollow::new(
                Rc::clone(&follow.curve),
                follow.rotating,
                follow.end,
                follow.start,
            )),
            Self::Delay => Self::Delay,
        })
    }
}

/// 有限时长动作
#[derive(Debug, Clone)]
pub(crate) struct IntervalAction {
    duration: Duration,
    elapsed: Duration,
    /// 线性进度，单次运行内单调不减
    process: f32,
    step: Step,
}

impl IntervalAction {
    pub(crate) fn new(duration: Duration, step: Step) -> Self {
        Self {
            duration,
            elapsed: Duration::ZERO,
            process: 0.0,
            step,
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        self.step.name()
    }

    pub(crate) fn duration(&self) -> Duration {
        self.duration
    }

    pub(crate) fn process(&self) -> f32 {
        self.process
    }

    pub(crate) fn init(&mut self, target: &dyn ActionTarget) {
        self.step.init(target);
    }

    pub(crate) fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.process = 0.0;
    }

    /// 推进 `dt`，按（可选缓动后的）进度写回目标
    ///
    /// # 返回
    /// - `true`: 本次运行已完成
    pub(crate) fn advance(
        &mut self,
        target: &mut dyn ActionTarget,
        dt: Duration,
        easing: Option<&Easing>,
    ) -> bool {
        if self.duration.is_zero() {
            self.process = 1.0;
        } else {
            self.elapsed = self.elapsed.saturating_add(dt);
            let raw = self.elapsed.as_secs_f32() / self.duration.as_secs_f32();
            self.process = raw.min(1.0).max(self.process);
        }

        let finished = 1.0 - self.process <= PROGRESS_EPSILON;
        if finished {
            self.process = 1.0;
        }

        let percent = easing.map_or(self.process, |easing| easing.apply(self.process));
        self.step.apply(target, percent);
        finished
    }

    /// 相同配置、全新计时状态的副本
    pub(crate) fn duplicate(&self) -> Self {
        Self::new(self.duration, self.step.fresh())
    }

    pub(crate) fn reversed(&self) -> Option<Self> {
        self.step
            .reversed()
            .map(|step| Self::new(self.duration, step))
    }
}
