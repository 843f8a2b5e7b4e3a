//! # Action 模块
//!
//! 动作的统一生命周期与组合。
//!
//! ## 设计说明
//!
//! - [`Action`] 统一持有生命周期状态（运行标记、延迟、循环、回调），
//!   具体行为由内部的 `ActionKind` 分派：叶子动作、缓动装饰、顺序、并行、重复。
//! - 组合动作独占其子动作（构造时移入），不与任何其他组合或管理器共享。
//! - `init` 每一轮只执行一次，由 `initialized` 标记保护，`reset` 清除。
//!
//! ## 状态机
//!
//! ```text
//! NotStarted → Delayed (delay > 0) → Started → Done → Removeable
//! ```

mod interval;
mod repeat;
mod sequence;
mod spawn;
mod tween;

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::curve::Curve;
use crate::easing::Easing;
use crate::math::Vec2;
use crate::target::ActionTarget;

use interval::{Goal, IntervalAction, Step};
use repeat::{Loop, REPEAT_FOREVER};
use sequence::Sequence;
use spawn::Spawn;
use tween::Tween;

/// 动作状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionStatus {
    /// 尚未启动
    #[default]
    NotStarted,
    /// 已启动，处于起始延迟中
    Delayed,
    /// 正在执行
    Started,
    /// 已完成（自然完成或被停止）
    Done,
    /// 已被管理器清扫，等待移除
    Removeable,
}

impl ActionStatus {
    /// 是否已完成
    pub fn is_done(self) -> bool {
        matches!(self, Self::Done | Self::Removeable)
    }
}

/// 完成回调
pub type ActionCallback = Box<dyn FnMut()>;

/// 动作的具体行为
#[derive(Debug)]
pub(crate) enum ActionKind {
    Interval(IntervalAction),
    Tween(Tween),
    Sequence(Sequence),
    Spawn(Spawn),
    Loop(Loop),
}

impl ActionKind {
    fn name(&self) -> &'static str {
        match self {
            Self::Interval(interval) => interval.name(),
            Self::Tween(_) => "Tween",
            Self::Sequence(_) => "Sequence",
            Self::Spawn(_) => "Spawn",
            Self::Loop(_) => "Loop",
        }
    }

    fn init(&mut self, target: &dyn ActionTarget) {
        match self {
            Self::Interval(interval) => interval.init(target),
            Self::Tween(tween) => tween.init(target),
            Self::Sequence(sequence) => sequence.init(target),
            Self::Spawn(spawn) => spawn.init(target),
            Self::Loop(repeat) => repeat.init(target),
        }
    }

    /// 推进一帧，返回本轮是否完成
    fn advance(&mut self, target: &mut dyn ActionTarget, dt: Duration) -> bool {
        match self {
            Self::Interval(interval) => interval.advance(target, dt, None),
            Self::Tween(tween) => tween.advance(target, dt),
            Self::Sequence(sequence) => sequence.advance(target, dt),
            Self::Spawn(spawn) => spawn.advance(target, dt),
            Self::Loop(repeat) => repeat.advance(target, dt),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Interval(interval) => interval.reset(),
            Self::Tween(tween) => tween.reset(),
            Self::Sequence(sequence) => sequence.reset(),
            Self::Spawn(spawn) => spawn.reset(),
            Self::Loop(repeat) => repeat.reset(),
        }
    }

    fn duplicate(&self) -> Self {
        match self {
            Self::Interval(interval) => Self::Interval(interval.duplicate()),
            Self::Tween(tween) => Self::Tween(tween.duplicate()),
            Self::Sequence(sequence) => Self::Sequence(sequence.duplicate()),
            Self::Spawn(spawn) => Self::Spawn(spawn.duplicate()),
            Self::Loop(repeat) => Self::Loop(repeat.duplicate()),
        }
    }

    fn reversed(&self) -> Option<Self> {
        let reversed = match self {
            Self::Interval(interval) => interval.reversed().map(Self::Interval),
            Self::Tween(tween) => tween.reversed().map(Self::Tween),
            Self::Sequence(sequence) => return Some(Self::Sequence(sequence.reversed())),
            Self::Spawn(spawn) => return Some(Self::Spawn(spawn.reversed())),
            // 内部动作反转失败时已在内部记录
            Self::Loop(repeat) => return repeat.reversed().map(Self::Loop),
        };
        if reversed.is_none() {
            warn!(action = self.name(), "绝对终值动作不支持反转，已忽略");
        }
        reversed
    }

    /// 单轮时长；无限则为 `None`
    fn duration(&self) -> Option<Duration> {
        match self {
            Self::Interval(interval) => Some(interval.duration()),
            Self::Tween(tween) => Some(tween.inner().duration()),
            Self::Sequence(sequence) => sequence.duration(),
            Self::Spawn(spawn) => spawn.duration(),
            Self::Loop(repeat) => repeat.duration(),
        }
    }

    fn process(&self) -> Option<f32> {
        match self {
            Self::Interval(interval) => Some(interval.process()),
            Self::Tween(tween) => Some(tween.inner().process()),
            _ => None,
        }
    }
}

/// 动作
///
/// 独立构造，不绑定任何目标；交给 [`ActionManager`](crate::ActionManager)
/// 或由 [`Action::start`] 启动后，每帧通过 [`Action::update`] 推进。
pub struct Action {
    kind: ActionKind,
    status: ActionStatus,
    running: bool,
    /// 总轮数，-1 表示无限
    loops: i32,
    loops_done: i32,
    delay: Duration,
    /// 自启动以来累计的时间（含延迟）
    elapsed: Duration,
    initialized: bool,
    on_done: Option<ActionCallback>,
    on_loop_done: Option<ActionCallback>,
}

impl Action {
    fn from_kind(kind: ActionKind) -> Self {
        Self {
            kind,
            status: ActionStatus::NotStarted,
            running: false,
            loops: 1,
            loops_done: 0,
            delay: Duration::ZERO,
            elapsed: Duration::ZERO,
            initialized: false,
            on_done: None,
            on_loop_done: None,
        }
    }

    fn interval(duration: Duration, step: Step) -> Self {
        Self::from_kind(ActionKind::Interval(IntervalAction::new(duration, step)))
    }

    // ========== 叶子动作 ==========

    /// 相对位移
    pub fn move_by(duration: Duration, delta: impl Into<Vec2>) -> Self {
        Self::interval(duration, Step::move_to(Goal::By(delta.into())))
    }

    /// 移动到绝对位置
    pub fn move_to(duration: Duration, position: impl Into<Vec2>) -> Self {
        Self::interval(duration, Step::move_to(Goal::To(position.into())))
    }

    /// 相对跳跃：`jumps` 次抛物线弧，弧高 `height`
    pub fn jump_by(duration: Duration, delta: impl Into<Vec2>, height: f32, jumps: u32) -> Self {
        Self::interval(duration, Step::jump(Goal::By(delta.into()), height, jumps))
    }

    /// 跳跃到绝对位置
    pub fn jump_to(duration: Duration, position: impl Into<Vec2>, height: f32, jumps: u32) -> Self {
        Self::interval(duration, Step::jump(Goal::To(position.into()), height, jumps))
    }

    /// 相对缩放（与当前缩放相加）
    pub fn scale_by(duration: Duration, sx: f32, sy: f32) -> Self {
        Self::interval(duration, Step::scale(Goal::By(Vec2::new(sx, sy))))
    }

    /// 缩放到绝对值
    pub fn scale_to(duration: Duration, sx: f32, sy: f32) -> Self {
        Self::interval(duration, Step::scale(Goal::To(Vec2::new(sx, sy))))
    }

    /// 相对旋转（角度制）
    pub fn rotate_by(duration: Duration, angle: f32) -> Self {
        Self::interval(duration, Step::rotate(Goal::By(angle)))
    }

    /// 旋转到绝对角度
    pub fn rotate_to(duration: Duration, angle: f32) -> Self {
        Self::interval(duration, Step::rotate(Goal::To(angle)))
    }

    /// 相对透明度变化；结果由目标钳制到 [0, 1]
    pub fn opacity_by(duration: Duration, opacity: f32) -> Self {
        Self::interval(duration, Step::opacity(Goal::By(opacity)))
    }

    /// 透明度变化到绝对值
    pub fn opacity_to(duration: Duration, opacity: f32) -> Self {
        Self::interval(duration, Step::opacity(Goal::To(opacity)))
    }

    /// 淡入到完全不透明
    pub fn fade_in(duration: Duration) -> Self {
        Self::opacity_to(duration, 1.0)
    }

    /// 淡出到完全透明
    pub fn fade_out(duration: Duration) -> Self {
        Self::opacity_to(duration, 0.0)
    }

    /// 纯计时，不修改目标
    pub fn delay(duration: Duration) -> Self {
        Self::interval(duration, Step::Delay)
    }

    /// 沿曲线运动
    ///
    /// `start` / `end` 为弧长比例；`rotating` 为真时目标旋转跟随切线方向。
    pub fn path(duration: Duration, curve: Rc<dyn Curve>, rotating: bool, start: f32, end: f32) -> Self {
        Self::interval(duration, Step::path(curve, rotating, start, end))
    }

    // ========== 组合 ==========

    /// 顺序执行；`None` 子动作被跳过并记录警告
    pub fn sequence<I, A>(children: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Option<Action>>,
    {
        Self::from_kind(ActionKind::Sequence(Sequence::new(collect_children(
            "Sequence", children,
        ))))
    }

    /// 并行执行；`None` 子动作被跳过并记录警告
    pub fn spawn<I, A>(children: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Option<Action>>,
    {
        Self::from_kind(ActionKind::Spawn(Spawn::new(collect_children("Spawn", children))))
    }

    /// 重复执行 `times` 次，-1 表示无限
    pub fn repeat(action: Action, times: i32) -> Self {
        Self::from_kind(ActionKind::Loop(Loop::new(action, times)))
    }

    pub fn repeat_forever(action: Action) -> Self {
        Self::repeat(action, REPEAT_FOREVER)
    }

    /// 用缓动函数包装叶子动作
    ///
    /// 只有叶子动作可以被包装；其他动作原样返回并记录警告。
    pub fn tween(action: Action, easing: impl Into<Easing>) -> Self {
        match action.kind {
            ActionKind::Interval(inner) => Self {
                kind: ActionKind::Tween(Tween::new(inner, easing.into())),
                ..action
            },
            other => {
                warn!(action = other.name(), "缓动只能包装叶子动作，已忽略");
                Self {
                    kind: other,
                    ..action
                }
            }
        }
    }

    // ========== 配置 ==========

    /// 设置起始延迟（下次启动时生效）
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// 设置总轮数（下次启动时生效），-1 表示无限
    pub fn set_loops(&mut self, loops: i32) {
        self.loops = loops;
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.set_delay(delay);
        self
    }

    pub fn with_loops(mut self, loops: i32) -> Self {
        self.set_loops(loops);
        self
    }

    /// 自然完成时触发一次
    pub fn on_done(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_done = Some(Box::new(callback));
        self
    }

    /// 每完成一轮触发一次
    pub fn on_loop_done(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_loop_done = Some(Box::new(callback));
        self
    }

    // ========== 查询 ==========

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn status(&self) -> ActionStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_done(&self) -> bool {
        self.status.is_done()
    }

    pub fn loops(&self) -> i32 {
        self.loops
    }

    /// 已完成的轮数
    pub fn loops_done(&self) -> i32 {
        self.loops_done
    }

    pub fn start_delay(&self) -> Duration {
        self.delay
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// 叶子动作的线性进度；组合动作没有单一进度
    pub fn process(&self) -> Option<f32> {
        self.kind.process()
    }

    /// 预期总时长（含延迟与循环）；无限或超出 `Duration` 范围时为 `None`
    pub fn duration(&self) -> Option<Duration> {
        if self.loops < 0 {
            return None;
        }
        let pass = self.kind.duration()?;
        pass.checked_mul(self.loops as u32)?.checked_add(self.delay)
    }

    // ========== 生命周期 ==========

    /// 启动：标记为运行并重置
    pub fn start(&mut self) {
        self.running = true;
        self.reset();
    }

    /// 重置计时状态，配置保持不变
    pub fn reset(&mut self) {
        self.status = if self.delay.is_zero() {
            ActionStatus::Started
        } else {
            ActionStatus::Delayed
        };
        self.elapsed = Duration::ZERO;
        self.loops_done = 0;
        self.initialized = false;
        self.kind.reset();
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        self.running = true;
    }

    /// 立即标记为完成，不触发完成回调
    pub fn stop(&mut self) {
        if !self.is_done() {
            self.status = ActionStatus::Done;
        }
    }

    pub(crate) fn mark_removeable(&mut self) {
        self.status = ActionStatus::Removeable;
    }

    /// 从目标捕获起始快照
    pub(crate) fn init(&mut self, target: &dyn ActionTarget) {
        self.kind.init(target);
        self.initialized = true;
    }

    /// 推进 `dt`
    ///
    /// 未启动、已暂停或已完成时不做任何事。
    pub fn update(&mut self, target: &mut dyn ActionTarget, dt: Duration) {
        if !self.running || self.status == ActionStatus::NotStarted || self.is_done() {
            return;
        }

        self.elapsed = self.elapsed.saturating_add(dt);
        let mut dt = dt;
        if self.status == ActionStatus::Delayed {
            if self.elapsed < self.delay {
                return;
            }
            // 超出延迟的部分计入本帧
            dt = self.elapsed - self.delay;
            self.status = ActionStatus::Started;
        }

        if self.loops == 0 {
            self.finish();
            return;
        }

        if !self.initialized {
            self.init(target);
        }

        if self.kind.advance(target, dt) {
            self.complete_pass();
        }
    }

    fn complete_pass(&mut self) {
        self.loops_done += 1;
        if let Some(callback) = self.on_loop_done.as_mut() {
            callback();
        }

        if self.loops >= 0 && self.loops_done >= self.loops {
            self.finish();
        } else {
            // 下一轮重新捕获起始快照，延迟不再生效
            self.kind.reset();
            self.initialized = false;
        }
    }

    fn finish(&mut self) {
        self.status = ActionStatus::Done;
        debug!(action = self.name(), loops_done = self.loops_done, "动作完成");
        if let Some(callback) = self.on_done.as_mut() {
            callback();
        }
    }

    // ========== 派生 ==========

    /// 相同配置、全新运行状态的副本；回调不会被复制
    pub fn duplicate(&self) -> Self {
        Self {
            delay: self.delay,
            loops: self.loops,
            ..Self::from_kind(self.kind.duplicate())
        }
    }

    /// 时间反转的新动作
    ///
    /// 绝对终值动作（`*_to`、淡入淡出）无法反转，返回 `None` 并记录警告。
    pub fn reverse(&self) -> Option<Self> {
        let kind = self.kind.reversed()?;
        Some(Self {
            delay: self.delay,
            loops: self.loops,
            ..Self::from_kind(kind)
        })
    }
}

impl Clone for Action {
    /// 等同于 [`Action::duplicate`]
    fn clone(&self) -> Self {
        self.duplicate()
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("kind", &self.kind)
            .field("status", &self.status)
            .field("running", &self.running)
            .field("loops", &self.loops)
            .field("loops_done", &self.loops_done)
            .field("delay", &self.delay)
            .field("elapsed", &self.elapsed)
            .finish_non_exhaustive()
    }
}

fn collect_children<I, A>(combinator: &'static str, children: I) -> Vec<Action>
where
    I: IntoIterator<Item = A>,
    A: Into<Option<Action>>,
{
    children
        .into_iter()
        .enumerate()
        .filter_map(|(index, child)| {
            let child = child.into();
            if child.is_none() {
                warn!(combinator, index, "子动作为空，已跳过");
            }
            child
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::easing::EasingFunction;
    use crate::target::Transform;

    fn secs(s: f32) -> Duration {
        Duration::from_secs_f32(s)
    }

    #[test]
    fn test_lifecycle_statuses() {
        let mut target = Transform::identity();
        let mut action = Action::move_by(secs(1.0), (10.0, 0.0));
        assert_eq!(action.status(), ActionStatus::NotStarted);

        // 未启动时 update 不生效
        action.update(&mut target, secs(0.5));
        assert_eq!(target.position.x, 0.0);

        action.start();
        assert_eq!(action.status(), ActionStatus::Started);
        assert!(action.is_running());
        action.update(&mut target, secs(1.0));
        assert_eq!(action.status(), ActionStatus::Done);
        assert_eq!(target.position.x, 10.0);
    }

    #[test]
    fn test_delay_carries_overflow() {
        let mut target = Transform::identity();
        let mut action = Action::move_by(secs(1.0), (10.0, 0.0)).with_delay(secs(0.5));
        action.start();
        assert_eq!(action.status(), ActionStatus::Delayed);

        action.update(&mut target, secs(0.25));
        assert_eq!(action.status(), ActionStatus::Delayed);
        assert_eq!(target.position.x, 0.0);

        // 0.5 中有 0.25 用于结束延迟，剩余 0.25 推进动作
        action.update(&mut target, secs(0.5));
        assert_eq!(action.status(), ActionStatus::Started);
        assert!((target.position.x - 2.5).abs() < 1e-4);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut target = Transform::identity();
        let mut action = Action::rotate_by(secs(1.0), 90.0);
        action.start();
        action.pause();
        action.update(&mut target, secs(0.5));
        assert_eq!(target.rotation, 0.0);

        action.resume();
        action.update(&mut target, secs(0.5));
        assert_eq!(target.rotation, 45.0);
    }

    #[test]
    fn test_stop_is_idempotent_and_skips_callback() {
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        let mut action = Action::delay(secs(1.0)).on_done(move || flag.set(true));
        action.start();

        action.stop();
        action.stop();
        assert_eq!(action.status(), ActionStatus::Done);
        assert!(!fired.get());
    }

    #[test]
    fn test_loops_reinit_each_pass() {
        let mut target = Transform::identity();
        let passes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&passes);
        let mut action = Action::move_by(secs(1.0), (10.0, 0.0))
            .with_loops(3)
            .on_loop_done(move || counter.set(counter.get() + 1));
        action.start();

        for _ in 0..3 {
            action.update(&mut target, secs(1.0));
        }
        // 每轮从新的起点再移动 10
        assert_eq!(target.position.x, 30.0);
        assert_eq!(passes.get(), 3);
        assert_eq!(action.loops_done(), 3);
        assert!(action.is_done());
    }

    #[test]
    fn test_zero_loops_finishes_without_mutation() {
        let mut target = Transform::identity();
        let mut action = Action::fade_out(secs(1.0)).with_loops(0);
        action.start();
        action.update(&mut target, secs(0.1));
        assert!(action.is_done());
        assert_eq!(target.opacity, 1.0);
    }

    #[test]
    fn test_duplicate_has_fresh_state() {
        let mut target = Transform::identity();
        let mut action = Action::move_by(secs(2.0), (4.0, 0.0))
            .with_delay(secs(1.0))
            .with_loops(2);
        action.start();
        action.update(&mut target, secs(1.5));

        let copy = action.duplicate();
        assert_eq!(copy.status(), ActionStatus::NotStarted);
        assert!(!copy.is_running());
        assert_eq!(copy.elapsed(), Duration::ZERO);
        assert_eq!(copy.start_delay(), secs(1.0));
        assert_eq!(copy.loops(), 2);
        assert_eq!(copy.process(), Some(0.0));

        // 源动作不受影响
        assert!(action.process().is_some_and(|p| p > 0.0));
    }

    #[test]
    fn test_duration_introspection() {
        let action = Action::delay(secs(1.0)).with_delay(secs(0.5)).with_loops(2);
        assert_eq!(action.duration(), Some(secs(2.5)));

        let forever = Action::repeat_forever(Action::delay(secs(1.0)));
        assert_eq!(forever.duration(), None);

        let looped = Action::delay(secs(1.0)).with_loops(-1);
        assert_eq!(looped.duration(), None);
    }

    #[test]
    fn test_duration_overflow_is_none() {
        let long = Duration::from_secs(10_000_000_000);
        assert_eq!(Action::delay(long).with_loops(i32::MAX).duration(), None);
        assert_eq!(Action::repeat(Action::delay(long), i32::MAX).duration(), None);
        assert_eq!(
            Action::sequence([Action::delay(Duration::MAX), Action::delay(secs(1.0))]).duration(),
            None
        );
        assert_eq!(
            Action::delay(Duration::MAX).with_delay(secs(1.0)).duration(),
            None
        );
        // 溢出的动作仍可正常运行
        let mut target = Transform::identity();
        let mut action = Action::delay(long).with_loops(i32::MAX);
        action.start();
        action.update(&mut target, secs(1.0));
        assert!(!action.is_done());
    }

    #[test]
    fn test_tween_wraps_only_leaves() {
        let eased = Action::tween(Action::rotate_by(secs(1.0), 100.0), EasingFunction::EaseInQuad);
        assert_eq!(eased.name(), "Tween");

        let mut target = Transform::identity();
        let mut eased = eased;
        eased.start();
        eased.update(&mut target, secs(0.5));
        assert!((target.rotation - 25.0).abs() < 1e-4);

        let group = Action::tween(
            Action::sequence([Action::delay(secs(1.0))]).with_loops(2),
            EasingFunction::Linear,
        );
        assert_eq!(group.name(), "Sequence");
        assert_eq!(group.loops(), 2);
    }

    #[test]
    fn test_reverse_keeps_configuration() {
        let action = Action::move_by(secs(1.0), (5.0, 5.0))
            .with_delay(secs(0.5))
            .with_loops(3);
        let reversed = action.reverse().unwrap();
        assert_eq!(reversed.name(), "MoveBy");
        assert_eq!(reversed.start_delay(), secs(0.5));
        assert_eq!(reversed.loops(), 3);

        assert!(Action::fade_in(secs(1.0)).reverse().is_none());
    }

    #[test]
    fn test_none_children_are_skipped() {
        let seq = Action::sequence([Some(Action::delay(secs(1.0))), None, Some(Action::delay(secs(2.0)))]);
        assert_eq!(seq.duration(), Some(secs(3.0)));
    }
}
