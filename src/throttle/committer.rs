//! 事务提交实体
//!
//! 周期性提交事务：所有脏字节一次性归还空闲池，然后唤醒等待者。

use super::fs_state::FsState;
use super::worker::space_available;
use crate::sim::{Entity, EntityId, SimTime, Simulator, World};
use std::any::Any;
use tracing::debug;

/// 事务提交实体
#[derive(Debug)]
pub struct Committer {
    pub interval: SimTime,
}

impl Committer {
    pub fn new(interval: SimTime) -> Self {
        Self { interval }
    }
}

impl Entity for Committer {
    fn run(&mut self, sim: &mut Simulator, world: &mut dyn World, me: EntityId) {
        {
            let fs = world
                .as_any_mut()
                .downcast_mut::<FsState>()
                .expect("fs state world");
            let committed = fs.commit();
            fs.stats.commits += 1;
            debug!(committed, now = ?sim.now(), "事务提交");
        }

        sim.wake_scan(world, space_available);
        sim.enqueue(me, self.interval);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
