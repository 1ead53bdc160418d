use std::{
    net::UdpSocket,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use netmotion_engine::{Engine, MemoryElement, MotionProfile, Vector2};
use netmotion_server::{CommandSink, Error, Listener, ListenerConfig, ListenerState, Supervisor};
use parking_lot::Mutex;

#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<String>>,
}

impl CommandSink for Recorder {
    fn dispatch(&self, command: &str) {
        self.seen.lock().push(command.to_string());
    }
}

fn local_config(keep_alive: Duration) -> ListenerConfig {
    ListenerConfig {
        address: "127.0.0.1".into(),
        port: 0,
        keep_alive_timeout: keep_alive,
        recv_timeout: Duration::from_millis(50),
    }
}

fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    cond()
}

fn send(listener: &Listener, payload: &[u8]) {
    let addr = listener.local_addr().expect("listener bound");
    let sock = UdpSocket::bind("127.0.0.1:0").unwrap();
    sock.send_to(payload, addr).unwrap();
}

#[test]
fn delivers_each_datagram_as_a_command() {
    let rec = Arc::new(Recorder::default());
    let listener = Listener::new(local_config(Duration::from_secs(30)), rec.clone());
    listener.start().unwrap();
    assert_eq!(listener.state(), ListenerState::Running);

    send(&listener, b"Hello");
    assert!(wait_until(Duration::from_secs(2), || rec.seen.lock().len() == 1));
    send(&listener, b"");
    send(&listener, b"World");
    assert!(wait_until(Duration::from_secs(2), || rec.seen.lock().len() == 2));
    assert_eq!(*rec.seen.lock(), vec!["Hello".to_string(), "World".to_string()]);

    listener.force_stop();
    assert_eq!(listener.state(), ListenerState::Stopped);
    assert_eq!(listener.local_addr(), None);
}

#[test]
fn start_while_running_is_a_noop() {
    let rec = Arc::new(Recorder::default());
    let listener = Listener::new(local_config(Duration::from_secs(30)), rec);
    listener.start().unwrap();
    let addr = listener.local_addr();
    listener.start().unwrap();
    assert_eq!(listener.local_addr(), addr);
    listener.force_stop();
}

#[test]
fn lapsed_keep_alive_closes_listener() {
    let rec = Arc::new(Recorder::default());
    let listener = Listener::new(local_config(Duration::from_millis(300)), rec);
    listener.start().unwrap();
    assert!(wait_until(Duration::from_secs(3), || {
        listener.state() == ListenerState::Stopped
    }));

    let supervisor = Supervisor::new(listener.clone());
    assert!(supervisor.ensure_running().unwrap());
    assert_eq!(listener.state(), ListenerState::Running);
    assert!(!supervisor.ensure_running().unwrap());
    listener.force_stop();
}

#[test]
fn refreshed_keep_alive_keeps_listener_open() {
    let rec = Arc::new(Recorder::default());
    let listener = Listener::new(local_config(Duration::from_millis(300)), rec);
    let supervisor = Supervisor::new(listener.clone());
    supervisor.ensure_running().unwrap();

    let until = Instant::now() + Duration::from_millis(900);
    while Instant::now() < until {
        supervisor.keep_alive();
        thread::sleep(Duration::from_millis(40));
    }
    assert_eq!(listener.state(), ListenerState::Running);
    listener.force_stop();
}

#[test]
fn occupied_port_reports_bind_error() {
    let holder = UdpSocket::bind("127.0.0.1:0").unwrap();
    let port = holder.local_addr().unwrap().port();
    let rec = Arc::new(Recorder::default());
    let listener = Listener::new(
        ListenerConfig {
            port,
            ..local_config(Duration::from_secs(30))
        },
        rec,
    );

    let err = listener.start().unwrap_err();
    assert!(matches!(err, Error::Bind { .. }), "{err}");
    assert_eq!(listener.state(), ListenerState::Stopped);

    drop(holder);
    listener.start().unwrap();
    assert_eq!(listener.state(), ListenerState::Running);
    listener.force_stop();
}

#[test]
fn stop_winds_down_without_blocking() {
    let rec = Arc::new(Recorder::default());
    let listener = Listener::new(local_config(Duration::from_secs(30)), rec);
    listener.start().unwrap();
    listener.stop();
    assert!(wait_until(Duration::from_secs(2), || {
        listener.state() == ListenerState::Stopped
    }));
    listener.start().unwrap();
    assert_eq!(listener.state(), ListenerState::Running);
    listener.force_stop();
}

#[test]
fn force_stop_releases_the_port() {
    let rec = Arc::new(Recorder::default());
    let listener = Listener::new(local_config(Duration::from_secs(30)), rec);
    listener.start().unwrap();
    let addr = listener.local_addr().unwrap();
    listener.force_stop();
    UdpSocket::bind(addr).unwrap();
}

#[test]
fn commands_reach_the_engine() {
    let host = Arc::new(MemoryElement::new(
        Vector2::ZERO,
        Vector2::new(1.0, 1.0),
        Vector2::new(100.0, 100.0),
    ));
    let engine = Engine::new(
        host,
        vec![MotionProfile::position("Go", Vector2::new(50.0, 0.0), 1)],
        60,
    );
    let listener = Listener::new(
        local_config(Duration::from_secs(30)),
        Arc::new(engine.clone()),
    );
    listener.start().unwrap();
    send(&listener, b"Go");
    assert!(wait_until(Duration::from_secs(2), || engine.is_animating()));
    listener.force_stop();
}
