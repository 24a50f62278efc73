//! 仿真核心模块
//!
//! 此模块包含虚拟时间仿真的核心组件：仿真时间、实体、世界和引擎。

// 子模块声明
mod entity;
mod simulator;
mod time;
mod world;

// 重新导出公共接口
pub use entity::{Entity, EntityId, EntityState};
pub use simulator::Simulator;
pub use time::SimTime;
pub use world::{NullWorld, World};
