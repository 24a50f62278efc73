//! 场景装配
//!
//! 根据配置装配文件系统状态与实体，并完成初始排队。

use super::committer::Committer;
use super::flusher::Flusher;
use super::fs_state::FsState;
use super::worker::Worker;
use crate::sim::{EntityId, SimTime, Simulator};
use tracing::info;

/// 节流场景配置选项
#[derive(Debug, Clone)]
pub struct ThrottleOpts {
    pub workers: u32,
    pub reserve_bytes: u64,
    pub work_interval: SimTime,
    pub flush_interval: SimTime,
    pub flush_batch: u64,
    pub commit_interval: SimTime,
    pub total_bytes: u64,
    pub until: SimTime,
}

impl Default for ThrottleOpts {
    fn default() -> Self {
        Self {
            workers: 4,
            reserve_bytes: 16 * 1024,
            work_interval: SimTime::from_micros(50),
            flush_interval: SimTime::from_millis(5),
            flush_batch: 4 * 1024 * 1024,
            commit_interval: SimTime::from_millis(30),
            total_bytes: 8 * 1024 * 1024,
            until: SimTime::from_secs(1),
        }
    }
}

/// 场景中各实体的句柄
#[derive(Debug)]
pub struct ScenarioHandles {
    pub workers: Vec<EntityId>,
    pub flusher: EntityId,
    pub committer: EntityId,
}

/// 装配节流场景：注册 worker、刷盘者与提交者并排队。
/// 返回世界状态与实体句柄。
pub fn build_scenario(sim: &mut Simulator, opts: &ThrottleOpts) -> (FsState, ScenarioHandles) {
    info!(
        workers = opts.workers,
        total_bytes = opts.total_bytes,
        "装配节流场景"
    );

    let fs = FsState::new(opts.total_bytes);

    let mut workers = Vec::with_capacity(opts.workers as usize);
    for _ in 0..opts.workers {
        let id = sim.add_entity(Box::new(Worker::new(opts.reserve_bytes, opts.work_interval)));
        sim.enqueue(id, SimTime::ZERO);
        workers.push(id);
    }

    let flusher = sim.add_entity(Box::new(Flusher::new(opts.flush_batch, opts.flush_interval)));
    sim.enqueue(flusher, opts.flush_interval);

    let committer = sim.add_entity(Box::new(Committer::new(opts.commit_interval)));
    sim.enqueue(committer, opts.commit_interval);

    (
        fs,
        ScenarioHandles {
            workers,
            flusher,
            committer,
        },
    )
}
