//! Diagnostics sinks

pub mod file_sink;

pub use file_sink::FileDiagnosticsSink;
