//! Script execution and output streaming.

pub mod command;
pub mod output;

pub use command::{execute_script, KillHandle, ScriptOptions, ScriptResult};
pub use output::{CaptureSink, OutputLine, OutputSink, StdioSink, TeeSink};
