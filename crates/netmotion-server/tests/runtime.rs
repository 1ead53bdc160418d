use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use netmotion_engine::{Engine, MemoryElement, MotionProfile, Vector2};
use netmotion_server::{
    DEFAULT_REARM_DELAY, KEEP_ALIVE_TASK, Listener, ListenerConfig, ListenerState, REARM_TASK,
    Runtime, SUPERVISOR_TASK, TICK_TASK, test_support::ManualScheduler,
};

struct Fixture {
    host: Arc<MemoryElement>,
    scheduler: Arc<ManualScheduler>,
    runtime: Runtime,
}

fn local_config() -> ListenerConfig {
    ListenerConfig {
        address: "127.0.0.1".into(),
        port: 0,
        keep_alive_timeout: Duration::from_secs(8),
        recv_timeout: Duration::from_millis(50),
    }
}

fn fixture() -> Fixture {
    let host = Arc::new(MemoryElement::new(
        Vector2::ZERO,
        Vector2::new(1.0, 1.0),
        Vector2::new(100.0, 100.0),
    ));
    let engine = Engine::new(
        host.clone(),
        vec![MotionProfile::position("Go", Vector2::new(120.0, 0.0), 2)],
        60,
    );
    let listener = Listener::new(local_config(), Arc::new(engine.clone()));
    let scheduler = Arc::new(ManualScheduler::new());
    let runtime = Runtime::new(engine, listener, scheduler.clone());
    Fixture {
        host,
        scheduler,
        runtime,
    }
}

fn wait_for_state(listener: &Listener, state: ListenerState) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if listener.state() == state {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    false
}

#[test]
fn install_starts_listener_and_schedules_tasks() {
    let f = fixture();
    f.runtime.install();

    assert_eq!(f.runtime.listener().state(), ListenerState::Running);
    assert_eq!(
        f.scheduler.interval(TICK_TASK),
        Some(Duration::from_micros(16_666))
    );
    assert_eq!(
        f.scheduler.interval(SUPERVISOR_TASK),
        Some(Duration::from_secs(10))
    );
    assert_eq!(
        f.scheduler.interval(KEEP_ALIVE_TASK),
        Some(Duration::from_secs(7))
    );
    f.runtime.shutdown();
}

#[test]
fn tick_task_drives_the_engine() {
    let f = fixture();
    f.runtime.install();
    assert_eq!(
        f.runtime.engine().route("Go"),
        netmotion_engine::RouteOutcome::Triggered { profile: 0 }
    );

    f.scheduler.fire_n(TICK_TASK, 30);
    let x = f.host.get().unwrap().position.x;
    assert!(x > 0.0 && x < 120.0, "x = {x}");

    f.scheduler.fire_n(TICK_TASK, 200);
    assert_eq!(f.host.get().unwrap().position, Vector2::new(120.0, 0.0));
    assert!(!f.runtime.engine().is_animating());
    f.runtime.shutdown();
}

#[test]
fn reconfigure_reschedules_tick_and_rebinds() {
    let f = fixture();
    f.runtime.install();
    let first_addr = f.runtime.listener().local_addr();
    assert!(first_addr.is_some());

    f.runtime.reconfigure(
        vec![MotionProfile::position("Other", Vector2::new(5.0, 5.0), 1)],
        30,
        ListenerConfig {
            keep_alive_timeout: Duration::from_secs(4),
            ..local_config()
        },
    );

    assert_eq!(
        f.scheduler.interval(TICK_TASK),
        Some(Duration::from_micros(33_333))
    );
    assert_eq!(f.scheduler.delay(REARM_TASK), Some(DEFAULT_REARM_DELAY));
    assert_eq!(
        f.scheduler.interval(KEEP_ALIVE_TASK),
        Some(Duration::from_secs(3))
    );
    assert_eq!(f.runtime.engine().update_rate(), 30);
    assert_eq!(f.runtime.engine().profiles()[0].command, "Other");

    assert!(wait_for_state(f.runtime.listener(), ListenerState::Stopped));
    assert!(f.scheduler.fire(SUPERVISOR_TASK));
    assert_eq!(f.runtime.listener().state(), ListenerState::Running);
    assert_eq!(
        f.runtime.listener().config().keep_alive_timeout,
        Duration::from_secs(4)
    );

    assert!(f.scheduler.fire(REARM_TASK));
    assert!(!f.scheduler.has(REARM_TASK));
    assert_eq!(
        f.scheduler.interval(TICK_TASK),
        Some(Duration::from_micros(33_333))
    );
    f.runtime.shutdown();
}

#[test]
fn animation_keeps_moving_across_reconfigure() {
    let f = fixture();
    f.runtime.install();
    assert_eq!(
        f.runtime.engine().route("Go"),
        netmotion_engine::RouteOutcome::Triggered { profile: 0 }
    );
    f.scheduler.fire_n(TICK_TASK, 10);
    let before = f.host.get().unwrap().position.x;
    assert!(before > 0.0);

    f.runtime.reconfigure(
        f.runtime.engine().profiles(),
        60,
        local_config(),
    );
    assert!(f.runtime.engine().is_animating());
    f.scheduler.fire_n(TICK_TASK, 10);
    let after = f.host.get().unwrap().position.x;
    assert!(after > before, "before = {before}, after = {after}");
    f.runtime.shutdown();
}

#[test]
fn shutdown_cancels_everything() {
    let f = fixture();
    f.runtime.install();
    f.runtime.shutdown();
    assert!(f.scheduler.ids().is_empty());
    assert_eq!(f.runtime.listener().state(), ListenerState::Stopped);
}

#[test]
fn keep_alive_task_refreshes_listener() {
    let f = fixture();
    f.runtime.install();
    assert!(f.scheduler.fire(KEEP_ALIVE_TASK));
    assert!(f.scheduler.has(KEEP_ALIVE_TASK));
    assert_eq!(f.runtime.listener().state(), ListenerState::Running);
    f.runtime.shutdown();
}
