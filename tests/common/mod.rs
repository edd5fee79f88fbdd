//! Scripted stand-in for the MariaDB client library.
//!
//! Every `*_start` / `*_cont` call pops the next status from `Script::waits`:
//! a popped status is returned as `Step::Wait`, an empty queue completes the
//! call with the scripted output.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::os::fd::RawFd;
use std::rc::Rc;

use zero_mariadb::raw::types::WaitStatus;
use zero_mariadb::raw::{ClientLibrary, RawClient, RawResult, Step};
use zero_mariadb::{ClientOption, Field, FieldType, Opts};

#[derive(Default)]
pub struct Script {
    pub waits: VecDeque<WaitStatus>,
    pub connect_ok: bool,
    pub select_db_ret: i32,
    pub query_ret: i32,
    pub next_result_rets: VecDeque<i32>,
    pub results: VecDeque<FakeResult>,
    pub error: String,
    pub info: Option<String>,
    pub socket: RawFd,
    pub timeout_ms: u32,
    pub more_results: bool,
    pub reject_options: bool,
    pub reject_nonblocking: bool,

    /// Every library call, in order.
    pub calls: Vec<String>,
    /// Status passed to every `*_cont` call.
    pub resumed_with: Vec<WaitStatus>,
    pub options: Vec<ClientOption>,
    pub queries: Vec<Vec<u8>>,
    pub dropped: Vec<&'static str>,
}

pub type Shared = Rc<RefCell<Script>>;

pub fn script() -> Shared {
    Rc::new(RefCell::new(Script {
        connect_ok: true,
        socket: 7,
        timeout_ms: 1500,
        ..Default::default()
    }))
}

fn step<T>(script: &Shared, call: &str, output: impl FnOnce(&mut Script) -> T) -> Step<T> {
    let mut script = script.borrow_mut();
    script.calls.push(call.to_string());
    match script.waits.pop_front() {
        Some(status) => Step::Wait(status),
        None => Step::Done(output(&mut script)),
    }
}

fn resumed(script: &Shared, ready: WaitStatus) {
    script.borrow_mut().resumed_with.push(ready);
}

pub struct FakeLibrary;

impl ClientLibrary for FakeLibrary {
    fn thread_init() -> bool {
        true
    }

    fn thread_end() {}

    fn thread_safe() -> bool {
        true
    }
}

pub struct FakeClient {
    script: Shared,
}

impl FakeClient {
    pub fn new(script: &Shared) -> Self {
        Self {
            script: Rc::clone(script),
        }
    }

    fn take_result(&self, script: &mut Script) -> Option<FakeResult> {
        script.results.pop_front().map(|mut result| {
            result.script = Some(Rc::clone(&self.script));
            result
        })
    }
}

impl Drop for FakeClient {
    fn drop(&mut self) {
        self.script.borrow_mut().dropped.push("client");
    }
}

impl RawClient for FakeClient {
    type Result = FakeResult;

    fn init() -> Option<Self> {
        Some(Self::new(&script()))
    }

    fn set_option(&mut self, option: &ClientOption) -> bool {
        let mut script = self.script.borrow_mut();
        if script.reject_options {
            return false;
        }
        script.options.push(option.clone());
        true
    }

    fn enable_nonblocking(&mut self) -> bool {
        !self.script.borrow().reject_nonblocking
    }

    fn error(&self) -> String {
        self.script.borrow().error.clone()
    }

    fn info(&self) -> Option<String> {
        self.script.borrow().info.clone()
    }

    fn socket(&self) -> RawFd {
        self.script.borrow().socket
    }

    fn timeout_value_ms(&self) -> u32 {
        self.script.borrow().timeout_ms
    }

    fn more_results(&self) -> bool {
        self.script.borrow().more_results
    }

    fn escape_string(&self, from: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(from.len());
        for &byte in from {
            match byte {
                b'\'' | b'"' | b'\\' => out.extend_from_slice(&[b'\\', byte]),
                b'\n' => out.extend_from_slice(b"\\n"),
                0 => out.extend_from_slice(b"\\0"),
                _ => out.push(byte),
            }
        }
        out
    }

    fn connect(&mut self, _opts: &Opts) -> bool {
        let mut script = self.script.borrow_mut();
        script.calls.push("connect".into());
        script.connect_ok
    }

    fn close(&mut self) {
        self.script.borrow_mut().calls.push("close".into());
    }

    fn select_db(&mut self, database: &str) -> i32 {
        let mut script = self.script.borrow_mut();
        script.calls.push(format!("select_db {}", database));
        script.select_db_ret
    }

    fn real_query(&mut self, query: &[u8]) -> i32 {
        let mut script = self.script.borrow_mut();
        script.calls.push("real_query".into());
        script.queries.push(query.to_vec());
        script.query_ret
    }

    fn store_result(&mut self) -> Option<FakeResult> {
        let mut script = self.script.borrow_mut();
        script.calls.push("store_result".into());
        self.take_result(&mut script)
    }

    fn use_result(&mut self) -> Option<FakeResult> {
        let mut script = self.script.borrow_mut();
        script.calls.push("use_result".into());
        self.take_result(&mut script)
    }

    fn next_result(&mut self) -> i32 {
        let mut script = self.script.borrow_mut();
        script.calls.push("next_result".into());
        script.next_result_rets.pop_front().unwrap_or(-1)
    }

    fn connect_start(&mut self, _opts: &Opts) -> Step<bool> {
        step(&self.script, "connect_start", |s| s.connect_ok)
    }

    fn connect_cont(&mut self, ready: WaitStatus) -> Step<bool> {
        resumed(&self.script, ready);
        step(&self.script, "connect_cont", |s| s.connect_ok)
    }

    fn close_start(&mut self) -> Step<()> {
        step(&self.script, "close_start", |_| ())
    }

    fn close_cont(&mut self, ready: WaitStatus) -> Step<()> {
        resumed(&self.script, ready);
        step(&self.script, "close_cont", |_| ())
    }

    fn select_db_start(&mut self, database: &str) -> Step<i32> {
        step(&self.script, &format!("select_db_start {}", database), |s| {
            s.select_db_ret
        })
    }

    fn select_db_cont(&mut self, ready: WaitStatus) -> Step<i32> {
        resumed(&self.script, ready);
        step(&self.script, "select_db_cont", |s| s.select_db_ret)
    }

    fn real_query_start(&mut self, query: &[u8]) -> Step<i32> {
        self.script.borrow_mut().queries.push(query.to_vec());
        step(&self.script, "real_query_start", |s| s.query_ret)
    }

    fn real_query_cont(&mut self, ready: WaitStatus) -> Step<i32> {
        resumed(&self.script, ready);
        step(&self.script, "real_query_cont", |s| s.query_ret)
    }

    fn store_result_start(&mut self) -> Step<Option<FakeResult>> {
        let step = step(&self.script, "store_result_start", |_| ());
        self.finish_store(step)
    }

    fn store_result_cont(&mut self, ready: WaitStatus) -> Step<Option<FakeResult>> {
        resumed(&self.script, ready);
        let step = step(&self.script, "store_result_cont", |_| ());
        self.finish_store(step)
    }

    fn next_result_start(&mut self) -> Step<i32> {
        step(&self.script, "next_result_start", |s| {
            s.next_result_rets.pop_front().unwrap_or(-1)
        })
    }

    fn next_result_cont(&mut self, ready: WaitStatus) -> Step<i32> {
        resumed(&self.script, ready);
        step(&self.script, "next_result_cont", |s| {
            s.next_result_rets.pop_front().unwrap_or(-1)
        })
    }
}

impl FakeClient {
    fn finish_store(&self, step: Step<()>) -> Step<Option<FakeResult>> {
        match step {
            Step::Done(()) => {
                let mut script = self.script.borrow_mut();
                Step::Done(self.take_result(&mut script))
            }
            Step::Wait(status) => Step::Wait(status),
        }
    }
}

pub struct FakeResult {
    script: Option<Shared>,
    fields: Vec<Field>,
    rows: Vec<Vec<Option<Vec<u8>>>>,
    next: usize,
    current: Option<usize>,
}

impl FakeResult {
    pub fn new(fields: Vec<Field>, rows: Vec<Vec<Option<&[u8]>>>) -> Self {
        Self {
            script: None,
            fields,
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|v| v.map(<[u8]>::to_vec)).collect())
                .collect(),
            next: 0,
            current: None,
        }
    }

    /// The result of `SELECT 1`.
    pub fn select_one() -> Self {
        Self::new(
            vec![Field::new("1", FieldType::LongLong)],
            vec![vec![Some(b"1".as_slice())]],
        )
    }

    fn advance(&mut self) -> bool {
        if self.next < self.rows.len() {
            self.current = Some(self.next);
            self.next += 1;
            true
        } else {
            self.current = None;
            false
        }
    }

    fn step(&mut self, call: &str) -> Step<()> {
        match &self.script {
            Some(script) => step(script, call, |_| ()),
            None => Step::Done(()),
        }
    }

    fn resumed(&self, ready: WaitStatus) {
        if let Some(script) = &self.script {
            resumed(script, ready);
        }
    }
}

impl Drop for FakeResult {
    fn drop(&mut self) {
        if let Some(script) = &self.script {
            script.borrow_mut().dropped.push("result");
        }
    }
}

impl RawResult for FakeResult {
    fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn num_rows(&self) -> u64 {
        self.rows.len() as u64
    }

    fn fetch_row(&mut self) -> bool {
        self.advance()
    }

    fn fetch_row_start(&mut self) -> Step<bool> {
        match self.step("fetch_row_start") {
            Step::Done(()) => Step::Done(self.advance()),
            Step::Wait(status) => Step::Wait(status),
        }
    }

    fn fetch_row_cont(&mut self, ready: WaitStatus) -> Step<bool> {
        self.resumed(ready);
        match self.step("fetch_row_cont") {
            Step::Done(()) => Step::Done(self.advance()),
            Step::Wait(status) => Step::Wait(status),
        }
    }

    fn free_start(&mut self) -> Step<()> {
        self.step("free_start")
    }

    fn free_cont(&mut self, ready: WaitStatus) -> Step<()> {
        self.resumed(ready);
        self.step("free_cont")
    }

    fn data_seek(&mut self, row: u64) {
        self.next = row as usize;
        self.current = None;
    }

    fn value(&self, index: usize) -> Option<&[u8]> {
        let row = self.rows.get(self.current?)?;
        row.get(index)?.as_deref()
    }
}
