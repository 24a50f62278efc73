//! 节流策略仿真
//!
//! 在虚拟时间上运行元数据节流场景，输出吞吐与等待统计。

use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tsim_rs::sim::{SimTime, Simulator};
use tsim_rs::throttle::{
    ScenarioSpec, ThrottleOpts, build_report, build_scenario, print_report,
    unthrottled_ops_per_sec,
};

#[derive(Debug, Parser)]
#[command(name = "throttle-sim", about = "元数据节流策略仿真：虚拟时间离线调参")]
struct Args {
    /// JSON 场景描述文件；给出时覆盖下面的标志
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// worker 数量
    #[arg(long, default_value_t = 4)]
    workers: u32,
    /// 单次预留大小（KiB）
    #[arg(long, default_value_t = 16)]
    reserve_kib: u64,
    /// worker 两次预留的间隔（微秒）
    #[arg(long, default_value_t = 50)]
    work_interval_us: u64,
    /// 异步刷盘间隔（毫秒）
    #[arg(long, default_value_t = 5)]
    flush_interval_ms: u64,
    /// 单次刷盘批量（MiB）
    #[arg(long, default_value_t = 4)]
    flush_batch_mib: u64,
    /// 事务提交间隔（毫秒）
    #[arg(long, default_value_t = 30)]
    commit_interval_ms: u64,
    /// 元数据空间总量（MiB）
    #[arg(long, default_value_t = 8)]
    total_mib: u64,
    /// 仿真运行多少毫秒，0 表示运行到 timeline 耗尽
    #[arg(long, default_value_t = 1_000)]
    run_ms: u64,

    /// 将 JSON 报告写入该文件
    #[arg(long)]
    json: Option<PathBuf>,
}

fn opts_from_args(args: &Args) -> ThrottleOpts {
    ThrottleOpts {
        workers: args.workers,
        reserve_bytes: args.reserve_kib.saturating_mul(1024),
        work_interval: SimTime::from_micros(args.work_interval_us),
        flush_interval: SimTime::from_millis(args.flush_interval_ms),
        flush_batch: args.flush_batch_mib.saturating_mul(1024 * 1024),
        commit_interval: SimTime::from_millis(args.commit_interval_ms),
        total_bytes: args.total_mib.saturating_mul(1024 * 1024),
        until: SimTime::from_millis(args.run_ms),
    }
}

fn main() {
    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();

    let opts = match &args.scenario {
        Some(path) => {
            let resolved = ScenarioSpec::load(path).and_then(|spec| spec.resolve());
            match resolved {
                Ok(opts) => opts,
                Err(err) => {
                    eprintln!("载入场景失败: {err}");
                    std::process::exit(1);
                }
            }
        }
        None => opts_from_args(&args),
    };

    let mut sim = Simulator::default();
    let (mut world, handles) = build_scenario(&mut sim, &opts);

    sim.run(&mut world, opts.until);

    let report = build_report(&sim, &world, &handles);
    let ceiling = unthrottled_ops_per_sec(opts.work_interval) * opts.workers as f64;
    if ceiling.is_finite() && ceiling > 0.0 {
        info!(
            ops_per_sec = report.ops_per_sec,
            ceiling,
            ratio = report.ops_per_sec / ceiling,
            "节流后的吞吐占无节流上限的比例"
        );
    }
    print_report(&report);

    if let Some(path) = &args.json {
        let json = serde_json::to_string_pretty(&report).expect("serialize report");
        fs::write(path, json).expect("write report json");
        eprintln!("wrote report to {}", path.display());
    }
}
