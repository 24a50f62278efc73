//! 结果汇总
//!
//! 一次运行结束后的统计汇总与输出。

use super::fs_state::FsState;
use super::scenario::ScenarioHandles;
use crate::sim::{SimTime, Simulator};
use serde::Serialize;

/// 节流场景运行报告
#[derive(Debug, Serialize)]
pub struct ThrottleReport {
    pub sim_ns: u64,
    pub workers: u32,
    pub ops: u64,
    pub ops_per_sec: f64,
    pub reserve_fails: u64,
    pub flushes: u64,
    pub flushed_bytes: u64,
    pub commits: u64,
    pub dispatches: u64,
    /// 所有 worker 的累计睡眠虚拟时间
    pub worker_sleep_ns: u64,
    /// 所有 worker 的累计排队虚拟时间
    pub worker_queue_ns: u64,
}

/// 从引擎与世界状态汇总报告。
pub fn build_report(sim: &Simulator, fs: &FsState, handles: &ScenarioHandles) -> ThrottleReport {
    let sim_ns = sim.now().as_nanos();
    let worker_sleep_ns: u64 = handles
        .workers
        .iter()
        .map(|&id| sim.sleep_time(id).as_nanos())
        .sum();
    let worker_queue_ns: u64 = handles
        .workers
        .iter()
        .map(|&id| sim.run_time(id).as_nanos())
        .sum();

    let ops_per_sec = if sim_ns == 0 {
        0.0
    } else {
        fs.stats.ops as f64 * 1e9 / sim_ns as f64
    };

    ThrottleReport {
        sim_ns,
        workers: handles.workers.len() as u32,
        ops: fs.stats.ops,
        ops_per_sec,
        reserve_fails: fs.stats.reserve_fails,
        flushes: fs.stats.flushes,
        flushed_bytes: fs.stats.flushed_bytes,
        commits: fs.stats.commits,
        dispatches: fs.stats.dispatches,
        worker_sleep_ns,
        worker_queue_ns,
    }
}

/// 按行打印摘要，便于脚本抓取。
pub fn print_report(report: &ThrottleReport) {
    println!(
        "throttle sim_ms={:.3} workers={} ops={} ops_per_sec={:.1} reserve_fails={} flushes={} commits={} worker_sleep_ms={:.3} worker_queue_ms={:.3}",
        report.sim_ns as f64 / 1e6,
        report.workers,
        report.ops,
        report.ops_per_sec,
        report.reserve_fails,
        report.flushes,
        report.commits,
        report.worker_sleep_ns as f64 / 1e6,
        report.worker_queue_ns as f64 / 1e6,
    );
}

/// worker 的实际吞吐上限：按工作间隔满负荷运转时的每秒预留次数。
pub fn unthrottled_ops_per_sec(interval: SimTime) -> f64 {
    if interval.is_zero() {
        f64::INFINITY
    } else {
        1e9 / interval.as_nanos() as f64
    }
}
