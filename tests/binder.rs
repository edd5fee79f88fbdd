//! Event binder registration lifecycle against a recording reactor.

mod common;

use std::io;
use std::os::fd::RawFd;
use std::time::Duration;

use common::{FakeClient, Shared, script};
use zero_mariadb::raw::types::wait;
use zero_mariadb::{Completion, Conn, Error, EventBinder, Opts, Progress, Reactor, Ready};

#[derive(Default)]
struct RecordingReactor {
    next: u32,
    registered: Vec<(u32, RawFd, Ready, Option<Duration>)>,
    deregistered: Vec<u32>,
    fail: bool,
}

impl Reactor for RecordingReactor {
    type Watch = u32;

    fn register(
        &mut self,
        fd: RawFd,
        interest: Ready,
        timeout: Option<Duration>,
    ) -> io::Result<u32> {
        if self.fail {
            return Err(io::Error::other("reactor is full"));
        }
        let watch = self.next;
        self.next += 1;
        self.registered.push((watch, fd, interest, timeout));
        Ok(watch)
    }

    fn deregister(&mut self, watch: u32) {
        self.deregistered.push(watch);
    }
}

fn connected_conn(script: &Shared) -> Conn<FakeClient> {
    let mut conn = Conn::from_raw(FakeClient::new(script));
    conn.enable_nonblocking().unwrap();
    assert!(conn.start_connect(&Opts::default()).unwrap().is_complete());
    conn
}

#[test]
fn test_same_wait_keeps_registration() {
    let script = script();
    let mut conn = connected_conn(&script);
    script.borrow_mut().waits.extend([wait::READ, wait::READ]);
    let mut reactor = RecordingReactor::default();
    let mut binder = EventBinder::new();

    let progress = conn.start_query("SELECT 1").unwrap();
    assert_eq!(binder.bind(&mut reactor, &conn, progress).unwrap(), None);
    assert!(binder.is_armed());
    assert_eq!(reactor.registered, vec![(0, 7, Ready::READ, None)]);

    assert!(binder
        .fire(&mut reactor, &mut conn, Ready::READ)
        .unwrap()
        .is_pending());
    assert_eq!(reactor.registered.len(), 1);
    assert!(reactor.deregistered.is_empty());

    assert_eq!(
        binder.fire(&mut reactor, &mut conn, Ready::READ).unwrap(),
        Progress::Complete(Completion::QueryAccepted)
    );
    assert!(!binder.is_armed());
    assert_eq!(reactor.deregistered, vec![0]);
}

#[test]
fn test_changed_wait_reregisters() {
    let script = script();
    let mut conn = connected_conn(&script);
    script.borrow_mut().waits.extend([wait::WRITE, wait::READ]);
    let mut reactor = RecordingReactor::default();
    let mut binder = EventBinder::new();

    let progress = conn.start_query("SELECT 1").unwrap();
    binder.bind(&mut reactor, &conn, progress).unwrap();
    assert!(binder
        .fire(&mut reactor, &mut conn, Ready::WRITE)
        .unwrap()
        .is_pending());

    assert_eq!(
        reactor.registered,
        vec![(0, 7, Ready::WRITE, None), (1, 7, Ready::READ, None)]
    );
    assert_eq!(reactor.deregistered, vec![0]);
    assert_eq!(binder.armed_wait().map(|w| w.ready), Some(Ready::READ));
}

#[test]
fn test_timeout_is_registered() {
    let script = script();
    let mut conn = connected_conn(&script);
    script.borrow_mut().waits.push_back(wait::READ | wait::TIMEOUT);
    let mut reactor = RecordingReactor::default();
    let mut binder = EventBinder::new();

    let progress = conn.start_select_db("test").unwrap();
    binder.bind(&mut reactor, &conn, progress).unwrap();
    assert_eq!(
        reactor.registered,
        vec![(0, 7, Ready::READ, Some(Duration::from_millis(1500)))]
    );

    assert_eq!(
        binder.fire(&mut reactor, &mut conn, Ready::TIMEOUT).unwrap(),
        Progress::Complete(Completion::DatabaseSelected)
    );
    assert_eq!(script.borrow().resumed_with, vec![wait::TIMEOUT]);
}

#[test]
fn test_error_deregisters() {
    let script = script();
    let mut conn = connected_conn(&script);
    {
        let mut s = script.borrow_mut();
        s.waits.push_back(wait::READ);
        s.query_ret = 1;
        s.error = "Table 'test.nope' doesn't exist".into();
    }
    let mut reactor = RecordingReactor::default();
    let mut binder = EventBinder::new();

    let progress = conn.start_query("SELECT * FROM nope").unwrap();
    binder.bind(&mut reactor, &conn, progress).unwrap();
    assert!(matches!(
        binder.fire(&mut reactor, &mut conn, Ready::READ),
        Err(Error::Query(_))
    ));
    assert!(!binder.is_armed());
    assert_eq!(reactor.deregistered, vec![0]);
    assert!(!conn.is_pending());
}

#[test]
fn test_complete_progress_passes_through() {
    let script = script();
    let mut conn = connected_conn(&script);
    let mut reactor = RecordingReactor::default();
    let mut binder = EventBinder::new();

    let progress = conn.start_next_result().unwrap();
    assert_eq!(binder.bind(&mut reactor, &conn, progress).unwrap(), Some(false));
    assert!(reactor.registered.is_empty());
}

#[test]
fn test_arm_twice() {
    let script = script();
    let mut conn = connected_conn(&script);
    script.borrow_mut().waits.push_back(wait::READ);
    let mut reactor = RecordingReactor::default();
    let mut binder = EventBinder::new();

    let wait = conn.start_query("SELECT 1").unwrap().wait().unwrap();
    binder.arm(&mut reactor, &conn, wait).unwrap();
    assert!(matches!(
        binder.arm(&mut reactor, &conn, wait),
        Err(Error::InvalidState(_))
    ));

    binder.disarm(&mut reactor);
    binder.disarm(&mut reactor);
    assert_eq!(reactor.deregistered, vec![0]);
}

#[test]
fn test_register_failure() {
    let script = script();
    let mut conn = connected_conn(&script);
    script.borrow_mut().waits.push_back(wait::WRITE);
    let mut reactor = RecordingReactor {
        fail: true,
        ..Default::default()
    };
    let mut binder = EventBinder::new();

    let progress = conn.start_query("SELECT 1").unwrap();
    assert!(matches!(
        binder.bind(&mut reactor, &conn, progress),
        Err(Error::Io(_))
    ));
    assert!(!binder.is_armed());
}

#[test]
fn test_failed_rearm_keeps_old_watch() {
    let script = script();
    let mut conn = connected_conn(&script);
    script.borrow_mut().waits.extend([wait::WRITE, wait::READ]);
    let mut reactor = RecordingReactor::default();
    let mut binder = EventBinder::new();

    let progress = conn.start_query("SELECT 1").unwrap();
    binder.bind(&mut reactor, &conn, progress).unwrap();
    reactor.fail = true;
    assert!(matches!(
        binder.fire(&mut reactor, &mut conn, Ready::WRITE),
        Err(Error::Io(_))
    ));
    assert_eq!(binder.armed_wait().map(|w| w.ready), Some(Ready::WRITE));
    assert!(reactor.deregistered.is_empty());
    assert_eq!(conn.wait().map(|w| w.ready), Some(Ready::READ));

    reactor.fail = false;
    binder.disarm(&mut reactor);
    let wait = conn.wait().unwrap();
    binder.arm(&mut reactor, &conn, wait).unwrap();
    assert_eq!(
        binder.fire(&mut reactor, &mut conn, Ready::READ).unwrap(),
        Progress::Complete(Completion::QueryAccepted)
    );
    assert_eq!(reactor.deregistered, vec![0, 1]);
}
