//! 场景描述文件
//!
//! JSON 场景描述的解析与校验，未给出的字段落回默认配置。

use super::scenario::ThrottleOpts;
use crate::sim::SimTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("读取场景文件失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("解析场景 JSON 失败: {0}")]
    Json(#[from] serde_json::Error),
    #[error("场景至少需要一个 worker")]
    NoWorkers,
    #[error("单次预留 {reserve} 字节超过空间总量 {total} 字节")]
    ReserveTooLarge { reserve: u64, total: u64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    #[serde(default)]
    pub workers: Option<u32>,
    #[serde(default)]
    pub reserve_kib: Option<u64>,
    #[serde(default)]
    pub work_interval_us: Option<u64>,
    #[serde(default)]
    pub flush_interval_ms: Option<u64>,
    #[serde(default)]
    pub flush_batch_mib: Option<u64>,
    #[serde(default)]
    pub commit_interval_ms: Option<u64>,
    #[serde(default)]
    pub total_mib: Option<u64>,
    #[serde(default)]
    pub run_ms: Option<u64>,
}

impl ScenarioSpec {
    pub fn load(path: &Path) -> Result<ScenarioSpec, SpecError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// 以默认配置为底，套用描述文件给出的字段并校验。
    pub fn resolve(&self) -> Result<ThrottleOpts, SpecError> {
        let base = ThrottleOpts::default();
        let opts = ThrottleOpts {
            workers: self.workers.unwrap_or(base.workers),
            reserve_bytes: self
                .reserve_kib
                .map(|k| k.saturating_mul(1024))
                .unwrap_or(base.reserve_bytes),
            work_interval: self
                .work_interval_us
                .map(SimTime::from_micros)
                .unwrap_or(base.work_interval),
            flush_interval: self
                .flush_interval_ms
                .map(SimTime::from_millis)
                .unwrap_or(base.flush_interval),
            flush_batch: self
                .flush_batch_mib
                .map(|m| m.saturating_mul(1024 * 1024))
                .unwrap_or(base.flush_batch),
            commit_interval: self
                .commit_interval_ms
                .map(SimTime::from_millis)
                .unwrap_or(base.commit_interval),
            total_bytes: self
                .total_mib
                .map(|m| m.saturating_mul(1024 * 1024))
                .unwrap_or(base.total_bytes),
            until: self.run_ms.map(SimTime::from_millis).unwrap_or(base.until),
        };

        if opts.workers == 0 {
            return Err(SpecError::NoWorkers);
        }
        if opts.reserve_bytes > opts.total_bytes {
            return Err(SpecError::ReserveTooLarge {
                reserve: opts.reserve_bytes,
                total: opts.total_bytes,
            });
        }
        Ok(opts)
    }
}
