//! 异步刷盘实体
//!
//! 周期性地把一批脏字节写回空闲池，并唤醒等待空间的 worker。

use super::fs_state::FsState;
use super::worker::space_available;
use crate::sim::{Entity, EntityId, SimTime, Simulator, World};
use std::any::Any;
use tracing::debug;

/// 后台刷盘实体
#[derive(Debug)]
pub struct Flusher {
    pub batch: u64,
    pub interval: SimTime,
}

impl Flusher {
    pub fn new(batch: u64, interval: SimTime) -> Self {
        Self { batch, interval }
    }
}

impl Entity for Flusher {
    fn run(&mut self, sim: &mut Simulator, world: &mut dyn World, me: EntityId) {
        {
            let fs = world
                .as_any_mut()
                .downcast_mut::<FsState>()
                .expect("fs state world");
            let flushed = fs.flush(self.batch);
            fs.stats.flushes += 1;
            fs.stats.flushed_bytes += flushed;
            debug!(flushed, free = fs.free, "异步刷盘完成");
        }

        sim.wake_scan(world, space_available);
        sim.enqueue(me, self.interval);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
