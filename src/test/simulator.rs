use crate::sim::{Entity, EntityId, EntityState, NullWorld, SimTime, Simulator, World};
use std::any::Any;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct TickWorld {
    ticks: usize,
}

impl World for TickWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn on_tick(&mut self, _sim: &mut Simulator) {
        self.ticks = self.ticks.saturating_add(1);
    }
}

struct Push {
    id: u32,
    log: Arc<Mutex<Vec<u32>>>,
}

impl Entity for Push {
    fn run(&mut self, _sim: &mut Simulator, _world: &mut dyn World, _me: EntityId) {
        self.log.lock().expect("log lock").push(self.id);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct Hook {
    f: Box<dyn FnMut(&mut Simulator, &mut dyn World, EntityId)>,
}

impl Entity for Hook {
    fn run(&mut self, sim: &mut Simulator, world: &mut dyn World, me: EntityId) {
        (self.f)(sim, world, me)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn push(sim: &mut Simulator, id: u32, log: &Arc<Mutex<Vec<u32>>>) -> EntityId {
    sim.add_entity(Box::new(Push {
        id,
        log: Arc::clone(log),
    }))
}

#[test]
fn distinct_delays_dispatch_in_wake_time_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();
    let mut world = NullWorld;

    let a = push(&mut sim, 1, &log);
    let b = push(&mut sim, 2, &log);
    let c = push(&mut sim, 3, &log);
    sim.enqueue(a, SimTime(30));
    sim.enqueue(b, SimTime(10));
    sim.enqueue(c, SimTime(20));

    sim.run(&mut world, SimTime::ZERO);

    assert_eq!(&*log.lock().expect("log lock"), &[2, 3, 1]);
    assert_eq!(sim.now(), SimTime(30));
    assert!(sim.is_empty());
}

#[test]
fn ties_dispatch_newest_first() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();
    let mut world = NullWorld;

    let e1 = push(&mut sim, 1, &log);
    let e2 = push(&mut sim, 2, &log);
    let e3 = push(&mut sim, 3, &log);
    let e4 = push(&mut sim, 4, &log);
    sim.enqueue(e1, SimTime(10));
    sim.enqueue(e2, SimTime(10));
    sim.enqueue(e3, SimTime(10));
    sim.enqueue(e4, SimTime(5));

    sim.run(&mut world, SimTime::ZERO);

    assert_eq!(&*log.lock().expect("log lock"), &[4, 3, 2, 1]);
}

#[test]
fn zero_delay_reenqueue_is_deferred_to_next_pass() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();
    let mut world = NullWorld;

    let deferred = push(&mut sim, 3, &log);
    let other = push(&mut sim, 2, &log);
    let first = {
        let log = Arc::clone(&log);
        sim.add_entity(Box::new(Hook {
            f: Box::new(move |sim, _world, _me| {
                log.lock().expect("log lock").push(1);
                sim.enqueue(deferred, SimTime::ZERO);
            }),
        }))
    };
    sim.enqueue(other, SimTime::ZERO);
    sim.enqueue(first, SimTime::ZERO);

    sim.run(&mut world, SimTime::ZERO);

    // 直接插入 timeline 的话，后插入的 deferred 会排在 other 之前；
    // 经 resched 延迟后只能落到下一轮。
    assert_eq!(&*log.lock().expect("log lock"), &[1, 2, 3]);
    assert_eq!(sim.now(), SimTime::ZERO);
}

#[test]
fn zero_delay_self_reenqueue_terminates_each_pass() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();
    let mut world = TickWorld::default();

    let looper = {
        let log = Arc::clone(&log);
        let mut remaining = 3u32;
        sim.add_entity(Box::new(Hook {
            f: Box::new(move |sim, _world, me| {
                log.lock().expect("log lock").push(remaining);
                if remaining > 0 {
                    remaining -= 1;
                    sim.enqueue(me, SimTime::ZERO);
                }
            }),
        }))
    };
    sim.enqueue(looper, SimTime::ZERO);

    sim.run(&mut world, SimTime::ZERO);

    assert_eq!(&*log.lock().expect("log lock"), &[3, 2, 1, 0]);
    assert_eq!(world.ticks, 4);
    assert_eq!(sim.now(), SimTime::ZERO);
}

#[test]
fn sleep_then_wake_scan_still_blocked_keeps_entity_out_of_timeline() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();
    let mut world = NullWorld;

    let sleeper = push(&mut sim, 1, &log);
    sim.enqueue(sleeper, SimTime(5));
    sim.sleep(sleeper);

    assert_eq!(sim.timeline_len(), 0);
    assert_eq!(sim.sleeper_count(), 1);
    assert_eq!(sim.state(sleeper), EntityState::Sleeping);

    sim.wake_scan(&mut world, |_, _, _| None);

    assert_eq!(sim.timeline_len(), 0);
    assert_eq!(sim.sleeper_count(), 1);
    assert_eq!(sim.sleep_time(sleeper), SimTime::ZERO);
}

#[test]
fn wake_scan_reenqueues_and_accumulates_sleep_time() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();
    let mut world = NullWorld;

    let sleeper = push(&mut sim, 1, &log);
    let helper = push(&mut sim, 2, &log);
    sim.sleep(sleeper);
    sim.enqueue(helper, SimTime(7));

    sim.run(&mut world, SimTime::ZERO);
    assert_eq!(sim.now(), SimTime(7));

    sim.wake_scan(&mut world, |_, _, _| Some(SimTime(3)));

    assert_eq!(sim.sleeper_count(), 0);
    assert_eq!(sim.timeline_len(), 1);
    assert_eq!(sim.state(sleeper), EntityState::Running);
    assert_eq!(sim.sleep_time(sleeper), SimTime(7));
    assert_eq!(sim.wake_time(sleeper), SimTime(10));

    sim.run(&mut world, SimTime::ZERO);
    assert_eq!(&*log.lock().expect("log lock"), &[2, 1]);
    assert_eq!(sim.now(), SimTime(10));
}

#[test]
fn run_jumps_clock_with_one_dispatch_per_event() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();
    let mut world = TickWorld::default();

    let a = push(&mut sim, 1, &log);
    let b = push(&mut sim, 2, &log);
    sim.enqueue(a, SimTime::from_secs(1));
    sim.enqueue(b, SimTime::from_secs(5));

    sim.run(&mut world, SimTime::ZERO);

    // 空闲区间被折叠：推进若干秒的虚拟时间只派发两次。
    assert_eq!(world.ticks, 2);
    assert_eq!(sim.now(), SimTime::from_secs(5));
    assert!(sim.is_empty());
}

#[test]
fn deadline_stops_dispatch_and_leaves_later_entities_queued() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();
    let mut world = NullWorld;

    let a = push(&mut sim, 1, &log);
    let b = push(&mut sim, 2, &log);
    let c = push(&mut sim, 3, &log);
    sim.enqueue(a, SimTime(5));
    sim.enqueue(b, SimTime(10));
    sim.enqueue(c, SimTime(30));

    sim.run(&mut world, SimTime(12));

    assert_eq!(&*log.lock().expect("log lock"), &[1, 2]);
    assert_eq!(sim.timeline_len(), 1);
    assert_eq!(sim.wake_time(c), SimTime(30));
}

#[test]
fn entity_exactly_at_deadline_is_dispatched() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();
    let mut world = NullWorld;

    let a = push(&mut sim, 1, &log);
    sim.enqueue(a, SimTime(12));

    sim.run(&mut world, SimTime(12));

    assert_eq!(&*log.lock().expect("log lock"), &[1]);
    assert_eq!(sim.now(), SimTime(12));
}

#[test]
fn run_time_accumulates_queue_wait() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();
    let mut world = NullWorld;

    let a = push(&mut sim, 1, &log);
    sim.enqueue(a, SimTime(10));
    sim.run(&mut world, SimTime::ZERO);

    assert_eq!(sim.run_time(a), SimTime(10));
    assert_eq!(sim.sleep_time(a), SimTime::ZERO);
}

#[test]
fn clear_resets_clock_and_structures_but_keeps_entities() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();
    let mut world = NullWorld;

    let a = push(&mut sim, 1, &log);
    let b = push(&mut sim, 2, &log);
    sim.enqueue(a, SimTime(5));
    sim.enqueue(b, SimTime(9));
    sim.run(&mut world, SimTime::ZERO);
    sim.sleep(b);
    assert_eq!(sim.now(), SimTime(9));

    sim.clear();

    assert_eq!(sim.now(), SimTime::ZERO);
    assert_eq!(sim.timeline_len(), 0);
    assert_eq!(sim.sleeper_count(), 0);
    assert_eq!(sim.entity_count(), 2);
    // 累计计数只由客户端清零
    assert_eq!(sim.run_time(a), SimTime(5));

    sim.reset_stats(a);
    assert_eq!(sim.run_time(a), SimTime::ZERO);

    // 实体可在新一轮运行中复用
    sim.enqueue(a, SimTime(4));
    sim.run(&mut world, SimTime::ZERO);
    assert_eq!(&*log.lock().expect("log lock"), &[1, 2, 1]);
    assert_eq!(sim.now(), SimTime(4));
}

#[test]
fn cancel_removes_from_timeline_and_sleepers() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();
    let mut world = NullWorld;

    let a = push(&mut sim, 1, &log);
    let b = push(&mut sim, 2, &log);
    let c = push(&mut sim, 3, &log);
    sim.enqueue(a, SimTime(5));
    sim.enqueue(b, SimTime(10));
    sim.enqueue(c, SimTime(15));
    sim.cancel(b);

    let d = push(&mut sim, 4, &log);
    sim.sleep(d);
    sim.cancel(d);
    assert_eq!(sim.sleeper_count(), 0);

    sim.run(&mut world, SimTime::ZERO);
    assert_eq!(&*log.lock().expect("log lock"), &[1, 3]);
}

#[test]
fn cancel_removes_from_resched() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();
    let mut world = NullWorld;

    let target = push(&mut sim, 9, &log);
    let actor = {
        let log = Arc::clone(&log);
        sim.add_entity(Box::new(Hook {
            f: Box::new(move |sim, _world, _me| {
                log.lock().expect("log lock").push(1);
                sim.enqueue(target, SimTime::ZERO);
                sim.cancel(target);
            }),
        }))
    };
    sim.enqueue(actor, SimTime::ZERO);

    sim.run(&mut world, SimTime::ZERO);

    assert_eq!(&*log.lock().expect("log lock"), &[1]);
    assert!(sim.is_empty());
}

#[test]
fn reenqueue_moves_entity_to_new_wake_time() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();
    let mut world = NullWorld;

    let a = push(&mut sim, 1, &log);
    sim.enqueue(a, SimTime(10));
    sim.enqueue(a, SimTime(20));
    assert_eq!(sim.timeline_len(), 1);

    sim.run(&mut world, SimTime::ZERO);

    assert_eq!(log.lock().expect("log lock").len(), 1);
    assert_eq!(sim.now(), SimTime(20));
}
