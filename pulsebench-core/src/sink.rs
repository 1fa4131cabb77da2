//! Progress Sink
//!
//! The engine reports one human-readable line per batch plus a few run-level
//! markers (`// IterationCount = N`, `!! Unmeasurable !!`). The sink is an
//! observable side effect, never a control-flow dependency.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

/// Line-oriented sink for progress and result lines.
pub trait ProgressSink {
    /// Emit one line.
    fn line(&mut self, line: &str);
}

/// Sink writing lines to stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn line(&mut self, line: &str) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        // A benchmark run keeps going if stdout goes away
        let _ = writeln!(handle, "{line}");
    }
}

/// Sink collecting lines in memory, for tests.
///
/// Clone the [`handle`](MemorySink::handle) before handing the sink to the
/// engine; the lines remain readable through it after the run.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Rc<RefCell<Vec<String>>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the collected lines.
    pub fn handle(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.lines)
    }
}

impl ProgressSink for MemorySink {
    fn line(&mut self, line: &str) {
        self.lines.borrow_mut().push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_collects_lines() {
        let sink = MemorySink::new();
        let lines = sink.handle();

        let mut sink = sink;
        sink.line("first");
        sink.line("second");

        assert_eq!(*lines.borrow(), vec!["first", "second"]);
    }
}
