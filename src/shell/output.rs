//! Destinations for script output.
//!
//! The executor hands every stdout/stderr line to an [`OutputSink`] as soon
//! as it is read. [`TeeSink`] combines a live sink with a retaining one.

use std::io::Write;

/// Output line from script execution, without its trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    Stdout(String),
    Stderr(String),
}

impl OutputLine {
    pub fn text(&self) -> &str {
        match self {
            OutputLine::Stdout(text) | OutputLine::Stderr(text) => text,
        }
    }
}

/// Receives script output as it is produced.
pub trait OutputSink {
    fn line(&mut self, line: OutputLine);
}

impl<F> OutputSink for F
where
    F: FnMut(OutputLine),
{
    fn line(&mut self, line: OutputLine) {
        self(line)
    }
}

/// Forwards lines to this process's stdout and stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdioSink;

impl OutputSink for StdioSink {
    fn line(&mut self, line: OutputLine) {
        // A closed stdout must not abort the step.
        let _ = match &line {
            OutputLine::Stdout(text) => {
                let mut out = std::io::stdout().lock();
                writeln!(out, "{}", text).and_then(|_| out.flush())
            }
            OutputLine::Stderr(text) => {
                let mut err = std::io::stderr().lock();
                writeln!(err, "{}", text).and_then(|_| err.flush())
            }
        };
    }
}

/// Retains every line in arrival order.
#[derive(Debug, Clone, Default)]
pub struct CaptureSink {
    lines: Vec<OutputLine>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[OutputLine] {
        &self.lines
    }

    /// Captured stdout, newline-terminated lines.
    pub fn stdout(&self) -> String {
        self.collect(|line| matches!(line, OutputLine::Stdout(_)))
    }

    /// Captured stderr, newline-terminated lines.
    pub fn stderr(&self) -> String {
        self.collect(|line| matches!(line, OutputLine::Stderr(_)))
    }

    /// Both streams interleaved in arrival order.
    pub fn transcript(&self) -> String {
        self.collect(|_| true)
    }

    fn collect(&self, keep: impl Fn(&OutputLine) -> bool) -> String {
        self.lines
            .iter()
            .filter(|line| keep(line))
            .fold(String::new(), |mut acc, line| {
                acc.push_str(line.text());
                acc.push('\n');
                acc
            })
    }
}

impl OutputSink for CaptureSink {
    fn line(&mut self, line: OutputLine) {
        self.lines.push(line);
    }
}

/// Sends each line to two sinks.
#[derive(Debug, Clone, Default)]
pub struct TeeSink<A, B> {
    pub first: A,
    pub second: B,
}

impl<A, B> TeeSink<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl TeeSink<StdioSink, CaptureSink> {
    /// Live forwarding plus retention.
    pub fn stdio_capture() -> Self {
        Self::new(StdioSink, CaptureSink::new())
    }

    pub fn captured(&self) -> &CaptureSink {
        &self.second
    }
}

impl<A: OutputSink, B: OutputSink> OutputSink for TeeSink<A, B> {
    fn line(&mut self, line: OutputLine) {
        self.first.line(line.clone());
        self.second.line(line);
    }
}
