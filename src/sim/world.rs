//! 世界 trait
//!
//! 定义仿真世界接口，由场景层实现（例如文件系统状态/统计等）。

use super::simulator::Simulator;
use std::any::Any;

/// 仿真世界：实体回调之间共享的场景状态。
pub trait World: Any {
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn on_tick(&mut self, _sim: &mut Simulator) {}
}

/// 空世界，供无共享状态的场景和测试使用。
#[derive(Debug, Default)]
pub struct NullWorld;

impl World for NullWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
