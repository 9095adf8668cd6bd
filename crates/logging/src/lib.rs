//! Log forwarding: severity classification, message composition, and emission
//! through a pluggable platform sink.
//!
//! Records arrive from the UI layer with their original prefix conventions
//! (`SEVERE:`, `WARNING:`, ...) intact; severity is derived from content here,
//! never supplied by the caller.

pub mod forward;
pub mod severity;
pub mod sink;

pub use {
    forward::{LogForwarder, LogRequest, compose},
    severity::{Severity, classify},
    sink::{EmittedRecord, LogSink, MemorySink, TracingSink},
};
