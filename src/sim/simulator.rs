//! 仿真器
//!
//! 事件驱动的虚拟时间引擎：维护虚拟时钟、timeline、延迟重排队列
//! 与睡眠集合，按唤醒时间派发实体并支持空闲时间跳跃。

use super::entity::{Entity, EntityId, EntitySlot, EntityState, Membership, TimelineKey};
use super::time::SimTime;
use super::world::World;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use tracing::{debug, info, trace};

/// 虚拟时间引擎。
///
/// 单线程、协作式：每次恰好执行一个实体回调，运行到完成为止。
/// 实体归属 {timeline, resched, sleepers} 中至多一个容器。
#[derive(Default)]
pub struct Simulator {
    time: SimTime,
    next_seq: u64,
    timeline: BTreeMap<TimelineKey, EntityId>,
    resched: Vec<EntityId>,
    sleepers: Vec<EntityId>,
    running: bool,
    slots: Vec<EntitySlot>,
}

impl Simulator {
    /// 获取当前虚拟时间
    pub fn now(&self) -> SimTime {
        self.time
    }

    /// 注册实体，返回其句柄。实体初始为脱离状态，需 enqueue 后才会被调度。
    pub fn add_entity(&mut self, behavior: Box<dyn Entity>) -> EntityId {
        let id = EntityId(self.slots.len());
        self.slots.push(EntitySlot::new(behavior));
        trace!(id = id.0, "注册实体");
        id
    }

    /// 调度实体在 `delay` 之后到期。
    ///
    /// 引擎正在派发且 delay 为零时，实体进入 resched 而非 timeline：
    /// 同一虚拟时刻的派发轮次必须有界，零延迟重排只在下一轮生效。
    #[tracing::instrument(skip(self), fields(id = id.0, delay = delay.as_nanos()))]
    pub fn enqueue(&mut self, id: EntityId, delay: SimTime) {
        self.detach(id);
        let time = self.time;
        let slot = &mut self.slots[id.0];
        slot.state = EntityState::Running;
        slot.wake_time = time + delay;
        slot.start_time = time;
        if !self.running || !delay.is_zero() {
            self.timeline_insert(id);
        } else {
            self.slots[id.0].membership = Membership::Resched;
            self.resched.push(id);
            trace!("派发中，零延迟重排入 resched");
        }
    }

    /// 使实体进入睡眠。睡眠实体不在 timeline 上，只能经 wake_scan 唤醒。
    pub fn sleep(&mut self, id: EntityId) {
        self.detach(id);
        let time = self.time;
        let slot = &mut self.slots[id.0];
        slot.state = EntityState::Sleeping;
        slot.start_time = time;
        slot.membership = Membership::Sleepers;
        self.sleepers.push(id);
        trace!(id = id.0, now = ?time, "实体入睡");
    }

    /// 扫描睡眠实体，逐个询问唤醒谓词。
    ///
    /// 谓词返回 `None` 表示仍然阻塞，实体原地保留；返回 `Some(delay)`
    /// 则累计睡眠时间并以该延迟重新入队。谓词只在显式调用时被轮询，
    /// 条件可能变化的时机由场景层负责。
    pub fn wake_scan<F>(&mut self, world: &mut dyn World, mut pred: F)
    where
        F: FnMut(&Simulator, &mut dyn World, &mut dyn Entity) -> Option<SimTime>,
    {
        let ids: Vec<EntityId> = self.sleepers.clone();
        for id in ids {
            let mut behavior = self.slots[id.0].behavior.take().expect("entity behavior");
            let verdict = pred(&*self, world, behavior.as_mut());
            self.slots[id.0].behavior = Some(behavior);

            let Some(delay) = verdict else { continue };
            let slept = self.time - self.slots[id.0].start_time;
            self.slots[id.0].sleep_time += slept;
            debug!(id = id.0, slept = slept.as_nanos(), delay = delay.as_nanos(), "唤醒实体");
            self.enqueue(id, delay);
        }
    }

    /// 取消实体：从其当前所在容器移除。已脱离的实体不受影响。
    pub fn cancel(&mut self, id: EntityId) {
        self.detach(id);
    }

    /// 运行直到 timeline 耗尽，或虚拟时间越过 `调用时刻 + duration`。
    /// `duration` 为零表示不设截止时间。
    #[tracing::instrument(skip(self, world), fields(duration = duration.as_nanos()))]
    pub fn run(&mut self, world: &mut dyn World, duration: SimTime) {
        let deadline = (!duration.is_zero()).then(|| self.time + duration);
        info!(now = ?self.time, pending = self.timeline.len(), "▶️  开始运行仿真");

        self.running = true;
        while deadline.is_none_or(|d| self.time <= d) {
            self.run_entities(world);
            let Some((&key, _)) = self.timeline.first_key_value() else {
                break;
            };
            // 直接跳到下一个唤醒事件，不按固定步长推进。
            if key.at > self.time {
                trace!(from = ?self.time, to = ?key.at, "时间跳跃");
                self.time = key.at;
            }
        }
        self.running = false;

        info!(now = ?self.time, pending = self.timeline.len(), "✅ 仿真结束");
    }

    /// 清空 timeline、resched 与 sleepers，时钟归零。
    /// 实体保留在 arena 中，可在下一次运行复用。
    pub fn clear(&mut self) {
        self.timeline.clear();
        self.resched.clear();
        self.sleepers.clear();
        for slot in &mut self.slots {
            slot.membership = Membership::Detached;
        }
        self.time = SimTime::ZERO;
        debug!("仿真器已清空");
    }

    /// 一轮派发：取出所有到期实体执行，再把 resched 中的实体并入 timeline。
    fn run_entities(&mut self, world: &mut dyn World) {
        loop {
            let Some((&key, &id)) = self.timeline.first_key_value() else {
                break;
            };
            if key.at > self.time {
                break;
            }
            self.timeline.remove(&key);
            let slot = &mut self.slots[id.0];
            slot.membership = Membership::Detached;
            let waited = self.time - slot.start_time;
            slot.run_time += waited;

            // 暂时把行为对象取出来，避免 &mut self 与回调的借用重叠。
            let mut behavior = slot.behavior.take().expect("entity behavior");
            debug!(id = id.0, now = ?self.time, waited = waited.as_nanos(), "派发实体");
            behavior.run(self, world, id);
            self.slots[id.0].behavior = Some(behavior);

            world.on_tick(self);
        }

        // 本轮内被延迟的零延迟重排，此时才进入 timeline。
        let held = std::mem::take(&mut self.resched);
        for id in held {
            self.slots[id.0].membership = Membership::Detached;
            self.timeline_insert(id);
        }
    }

    /// 按唤醒时间插入 timeline；相同唤醒时间时后插入者先被派发。
    fn timeline_insert(&mut self, id: EntityId) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        let key = TimelineKey {
            at: self.slots[id.0].wake_time,
            seq: Reverse(seq),
        };
        self.slots[id.0].membership = Membership::Timeline(key);
        self.timeline.insert(key, id);
    }

    /// 把实体从其当前容器中摘除。
    fn detach(&mut self, id: EntityId) {
        match self.slots[id.0].membership {
            Membership::Detached => return,
            Membership::Timeline(key) => {
                self.timeline.remove(&key);
            }
            Membership::Resched => {
                self.resched.retain(|&e| e != id);
            }
            Membership::Sleepers => {
                self.sleepers.retain(|&e| e != id);
            }
        }
        self.slots[id.0].membership = Membership::Detached;
    }

    /// 实体当前运行状态
    pub fn state(&self, id: EntityId) -> EntityState {
        self.slots[id.0].state
    }

    /// 实体当前的唤醒时刻
    pub fn wake_time(&self, id: EntityId) -> SimTime {
        self.slots[id.0].wake_time
    }

    /// 实体累计睡眠虚拟时间
    pub fn sleep_time(&self, id: EntityId) -> SimTime {
        self.slots[id.0].sleep_time
    }

    /// 实体累计排队等待虚拟时间
    pub fn run_time(&self, id: EntityId) -> SimTime {
        self.slots[id.0].run_time
    }

    /// 清零实体的累计时间计数（引擎从不主动清零）。
    pub fn reset_stats(&mut self, id: EntityId) {
        let slot = &mut self.slots[id.0];
        slot.sleep_time = SimTime::ZERO;
        slot.run_time = SimTime::ZERO;
    }

    /// timeline 中待调度的实体数
    pub fn timeline_len(&self) -> usize {
        self.timeline.len()
    }

    /// 睡眠中的实体数
    pub fn sleeper_count(&self) -> usize {
        self.sleepers.len()
    }

    /// timeline 是否为空
    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    /// 注册过的实体总数
    pub fn entity_count(&self) -> usize {
        self.slots.len()
    }
}
