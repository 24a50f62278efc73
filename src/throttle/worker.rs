//! Worker 实体
//!
//! 模拟持续做元数据预留的工作线程：预留成功则按间隔继续，
//! 空间不足则入睡，等待刷盘或提交腾出空间。

use super::fs_state::FsState;
use crate::sim::{Entity, EntityId, SimTime, Simulator, World};
use std::any::Any;
use tracing::trace;

/// 工作线程实体
#[derive(Debug)]
pub struct Worker {
    pub reserve_bytes: u64,
    pub interval: SimTime,
    /// 完成的预留次数
    pub ops: u64,
}

impl Worker {
    pub fn new(reserve_bytes: u64, interval: SimTime) -> Self {
        Self {
            reserve_bytes,
            interval,
            ops: 0,
        }
    }
}

impl Entity for Worker {
    fn run(&mut self, sim: &mut Simulator, world: &mut dyn World, me: EntityId) {
        let fs = world
            .as_any_mut()
            .downcast_mut::<FsState>()
            .expect("fs state world");

        if fs.reserve(self.reserve_bytes) {
            self.ops += 1;
            fs.stats.ops += 1;
            sim.enqueue(me, self.interval);
        } else {
            fs.stats.reserve_fails += 1;
            trace!(id = me.0, free = fs.free, want = self.reserve_bytes, "空间不足，worker 入睡");
            sim.sleep(me);
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// 共享的唤醒谓词：空闲空间足以满足 worker 的预留时以零延迟唤醒。
pub fn space_available(
    _sim: &Simulator,
    world: &mut dyn World,
    entity: &mut dyn Entity,
) -> Option<SimTime> {
    let fs = world
        .as_any_mut()
        .downcast_mut::<FsState>()
        .expect("fs state world");
    let worker = entity.as_any_mut().downcast_mut::<Worker>()?;
    fs.can_reserve(worker.reserve_bytes).then_some(SimTime::ZERO)
}
