//! Output capability handed to compiled function units as `env.println`.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

pub trait OutputSink {
    fn println(&mut self, value: i32);
}

/// Writes each value on its own line to standard output.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn println(&mut self, value: i32) {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        if let Err(e) = writeln!(lock, "{}", value) {
            log::warn!("Failed to write program output: {}", e);
        }
    }
}

/// Keeps every printed value in memory.
#[derive(Debug, Default, Clone)]
pub struct BufferSink {
    values: Vec<i32>,
}

impl BufferSink {
    pub fn values(&self) -> &[i32] {
        &self.values
    }
}

impl OutputSink for BufferSink {
    fn println(&mut self, value: i32) {
        self.values.push(value);
    }
}

/// Lets the caller keep a handle on a sink it gave away to a session.
impl<S: OutputSink> OutputSink for Rc<RefCell<S>> {
    fn println(&mut self, value: i32) {
        self.borrow_mut().println(value);
    }
}
