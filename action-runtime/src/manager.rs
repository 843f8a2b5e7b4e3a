//! # Manager 模块
//!
//! 单个目标的动作管理器。
//!
//! 每个可动画实体持有一个 [`ActionManager`]，并在每帧调用一次
//! [`ActionManager::update_actions`]：
//! ```rust,ignore
//! let handle = manager.run_action(Action::move_by(secs(1.0), (10.0, 0.0)));
//! manager.update_actions(&mut transform, dt);
//! handle.stop(); // 调用方仍可通过句柄控制动作
//! ```

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::action::{Action, ActionStatus};
use crate::target::ActionTarget;

/// 动作正被更新（例如在回调中操作自身句柄）时暂存的控制请求
#[derive(Default)]
struct Deferred {
    stop: Cell<bool>,
    running: Cell<Option<bool>>,
}

struct Shared {
    name: &'static str,
    action: RefCell<Action>,
    deferred: Deferred,
}

/// 正在运行的动作的共享句柄
///
/// 管理器与调用方共享所有权，调用方可以在动作运行期间暂停或停止它。
/// 在动作自身的回调里调用 `stop`/`pause`/`resume` 也是安全的：
/// 请求会被暂存，当前更新结束后生效。
#[derive(Clone)]
pub struct ActionHandle(Rc<Shared>);

impl ActionHandle {
    pub fn new(action: Action) -> Self {
        Self(Rc::new(Shared {
            name: action.name(),
            action: RefCell::new(action),
            deferred: Deferred::default(),
        }))
    }

    pub fn stop(&self) {
        match self.0.action.try_borrow_mut() {
            Ok(mut action) => action.stop(),
            Err(_) => {
                debug!(action = self.0.name, "动作更新中，停止请求已暂存");
                self.0.deferred.stop.set(true);
            }
        }
    }

    pub fn pause(&self) {
        self.set_running(false);
    }

    pub fn resume(&self) {
        self.set_running(true);
    }

    fn set_running(&self, running: bool) {
        match self.0.action.try_borrow_mut() {
            Ok(mut action) if running => action.resume(),
            Ok(mut action) => action.pause(),
            Err(_) => self.0.deferred.running.set(Some(running)),
        }
    }

    /// 应用暂存的控制请求
    fn apply_deferred(&self, action: &mut Action) {
        match self.0.deferred.running.take() {
            Some(true) => action.resume(),
            Some(false) => action.pause(),
            None => {}
        }
        if self.0.deferred.stop.take() {
            action.stop();
        }
    }

    /// 动作正被更新时，以暂存的停止请求为准
    pub fn is_done(&self) -> bool {
        match self.0.action.try_borrow() {
            Ok(action) => action.is_done(),
            Err(_) => self.0.deferred.stop.get(),
        }
    }

    pub fn is_running(&self) -> bool {
        match self.0.action.try_borrow() {
            Ok(action) => action.is_running(),
            Err(_) => self.0.deferred.running.get().unwrap_or(true),
        }
    }

    /// 动作正被更新时视为 [`ActionStatus::Started`]
    pub fn status(&self) -> ActionStatus {
        match self.0.action.try_borrow() {
            Ok(action) => action.status(),
            Err(_) => ActionStatus::Started,
        }
    }

    pub fn name(&self) -> &'static str {
        self.0.name
    }

    /// 只读借用内部动作
    ///
    /// # Panics
    /// 动作正被可变借用（例如正在更新）时 panic。
    pub fn borrow(&self) -> Ref<'_, Action> {
        self.0.action.borrow()
    }

    /// 可变借用内部动作
    ///
    /// # Panics
    /// 动作已被借用时 panic。
    pub fn borrow_mut(&self) -> RefMut<'_, Action> {
        self.0.action.borrow_mut()
    }

    /// 是否指向同一个动作
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Action> for ActionHandle {
    fn from(action: Action) -> Self {
        Self::new(action)
    }
}

impl fmt::Debug for ActionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.action.try_borrow() {
            Ok(action) => f
                .debug_struct("ActionHandle")
                .field("name", &action.name())
                .field("status", &action.status())
                .finish(),
            Err(_) => f.write_str("ActionHandle(<borrowed>)"),
        }
    }
}

/// 动作管理器
///
/// 按注册顺序驱动动作，并在每帧末尾清扫已完成的动作。
#[derive(Default)]
pub struct ActionManager {
    actions: Vec<ActionHandle>,
}

impl fmt::Debug for ActionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionManager")
            .field("actions", &self.actions.len())
            .finish()
    }
}

impl ActionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 启动并登记动作
    ///
    /// 已登记的同一动作会被忽略。
    ///
    /// # 返回
    /// 动作的句柄
    pub fn run_action(&mut self, action: impl Into<ActionHandle>) -> ActionHandle {
        let handle = action.into();
        if self.actions.iter().any(|existing| existing.ptr_eq(&handle)) {
            return handle;
        }

        {
            let mut action = handle.borrow_mut();
            action.start();
            debug!(action = action.name(), "动作启动");
        }
        self.actions.push(handle.clone());
        handle
    }

    /// 与 [`run_action`](Self::run_action) 相同，`None` 时记录警告并忽略
    pub fn run_optional<A: Into<ActionHandle>>(&mut self, action: Option<A>) -> Option<ActionHandle> {
        match action {
            Some(action) => Some(self.run_action(action)),
            None => {
                warn!("run_action 收到空动作，已忽略");
                None
            }
        }
    }

    /// 推进所有正在运行的动作，随后清扫已完成的动作
    pub fn update_actions(&mut self, target: &mut dyn ActionTarget, dt: Duration) {
        // 先取快照，更新过程中的停止操作不影响本帧的遍历
        let live: Vec<ActionHandle> = self
            .actions
            .iter()
            .filter(|handle| handle.is_running() && !handle.is_done())
            .cloned()
            .collect();

        for handle in live {
            match handle.0.action.try_borrow_mut() {
                Ok(mut action) => {
                    handle.apply_deferred(&mut action);
                    if action.is_running() && !action.is_done() {
                        action.update(target, dt);
                    }
                    // 回调中对自身句柄的操作在这里生效
                    handle.apply_deferred(&mut action);
                }
                Err(_) => warn!(action = handle.name(), "动作正在被借用，本帧跳过"),
            }
        }

        self.actions.retain(|handle| {
            let Ok(mut action) = handle.0.action.try_borrow_mut() else {
                return true;
            };
            handle.apply_deferred(&mut action);
            if !action.is_done() {
                return true;
            }
            action.mark_removeable();
            debug!(action = action.name(), "动作已清扫");
            false
        });
    }

    pub fn pause_all_actions(&mut self) {
        for handle in &self.actions {
            handle.pause();
        }
    }

    pub fn resume_all_actions(&mut self) {
        for handle in &self.actions {
            handle.resume();
        }
    }

    /// 停止所有动作，下一次 `update_actions` 时移除
    pub fn stop_all_actions(&mut self) {
        for handle in &self.actions {
            handle.stop();
        }
    }

    /// 当前登记的动作（注册顺序）
    pub fn get_all_actions(&self) -> &[ActionHandle] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
