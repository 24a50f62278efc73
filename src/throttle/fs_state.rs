//! 文件系统状态
//!
//! 节流场景共享的元数据空间模型：空闲字节、脏字节与统计信息。

use crate::sim::{Simulator, World};
use std::any::Any;
use tracing::trace;

/// 场景统计信息
#[derive(Debug, Default)]
pub struct FsStats {
    pub ops: u64,
    pub reserve_fails: u64,
    pub flushes: u64,
    pub flushed_bytes: u64,
    pub commits: u64,
    pub dispatches: u64,
}

/// 元数据空间状态。预留从 `free` 扣除并计入 `dirty`，
/// 刷盘和事务提交把脏字节归还给 `free`。
#[derive(Debug)]
pub struct FsState {
    pub free: u64,
    pub dirty: u64,
    pub total: u64,
    pub stats: FsStats,
}

impl FsState {
    pub fn new(total: u64) -> Self {
        Self {
            free: total,
            dirty: 0,
            total,
            stats: FsStats::default(),
        }
    }

    /// 尝试预留 `bytes` 字节，成功则变脏。
    pub fn reserve(&mut self, bytes: u64) -> bool {
        if self.free < bytes {
            return false;
        }
        self.free -= bytes;
        self.dirty += bytes;
        true
    }

    /// 预留是否可满足
    pub fn can_reserve(&self, bytes: u64) -> bool {
        self.free >= bytes
    }

    /// 刷掉至多 `batch` 字节脏数据，返回实际刷掉的字节数。
    pub fn flush(&mut self, batch: u64) -> u64 {
        let flushed = batch.min(self.dirty);
        self.dirty -= flushed;
        self.free += flushed;
        trace!(flushed, free = self.free, dirty = self.dirty, "刷盘");
        flushed
    }

    /// 事务提交：所有脏字节归还空闲池，返回提交的字节数。
    pub fn commit(&mut self) -> u64 {
        let committed = self.dirty;
        self.free += committed;
        self.dirty = 0;
        trace!(committed, free = self.free, "事务提交");
        committed
    }
}

impl World for FsState {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn on_tick(&mut self, _sim: &mut Simulator) {
        self.stats.dispatches = self.stats.dispatches.saturating_add(1);
    }
}
