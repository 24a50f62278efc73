//! 节流场景模块
//!
//! 仿真引擎的客户层：worker、异步刷盘者与事务提交实体，
//! 以及场景装配、描述文件解析和结果汇总。

// 子模块声明
mod committer;
mod flusher;
mod fs_state;
mod report;
mod scenario;
mod spec;
mod worker;

// 重新导出公共接口
pub use committer::Committer;
pub use flusher::Flusher;
pub use fs_state::{FsState, FsStats};
pub use report::{ThrottleReport, build_report, print_report, unthrottled_ops_per_sec};
pub use scenario::{ScenarioHandles, ThrottleOpts, build_scenario};
pub use spec::{ScenarioSpec, SpecError};
pub use worker::{Worker, space_available};
