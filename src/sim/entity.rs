//! 实体
//!
//! 定义仿真实体接口与引擎侧的实体簿记。实体是被调度的参与者
//! （如 worker、事务提交者、异步刷盘者），行为由 `run` 回调提供。

use super::simulator::Simulator;
use super::time::SimTime;
use super::world::World;
use std::any::Any;

/// 实体句柄：引擎 arena 中的下标。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub usize);

/// 实体行为：到期时由引擎调用 `run`。回调内可以再次
/// enqueue/sleep/wake 任意实体（包括自身）。
pub trait Entity: Any {
    fn run(&mut self, sim: &mut Simulator, world: &mut dyn World, me: EntityId);
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// 实体运行状态。RUNNING 表示在 timeline 或 resched 中等待调度；
/// SLEEPING 表示停在 sleepers 中，等待外部唤醒条件。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    Running,
    Sleeping,
}

/// timeline 内的排序键：先按唤醒时间，相同唤醒时间时后插入者在前。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct TimelineKey {
    pub at: SimTime,
    pub seq: std::cmp::Reverse<u64>,
}

/// 实体当前归属的容器。一个实体同一时刻至多属于一个容器，
/// 该不变式由归属标记在每次插入前先脱离来保证。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Membership {
    Detached,
    Timeline(TimelineKey),
    Resched,
    Sleepers,
}

/// 引擎侧的实体槽位：行为对象 + 虚拟时间簿记。
pub(crate) struct EntitySlot {
    /// 调度期间被临时取出，避免与引擎的可变借用重叠。
    pub behavior: Option<Box<dyn Entity>>,
    pub wake_time: SimTime,
    /// 当前这段等待（排队或睡眠）开始的时刻。
    pub start_time: SimTime,
    /// 累计睡眠虚拟时间。
    pub sleep_time: SimTime,
    /// 累计排队等待虚拟时间。
    pub run_time: SimTime,
    pub state: EntityState,
    pub membership: Membership,
}

impl EntitySlot {
    pub fn new(behavior: Box<dyn Entity>) -> Self {
        Self {
            behavior: Some(behavior),
            wake_time: SimTime::ZERO,
            start_time: SimTime::ZERO,
            sleep_time: SimTime::ZERO,
            run_time: SimTime::ZERO,
            state: EntityState::Running,
            membership: Membership::Detached,
        }
    }
}
