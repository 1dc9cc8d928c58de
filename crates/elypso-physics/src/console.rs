// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


//! Diagnostic console capability.
//!
//! The world and the component layer never talk to a global logger. They are
//! handed a [`ConsoleSink`] and write user-facing diagnostics through it.

use std::fmt;
use std::sync::Mutex;

/// Subsystem that produced a console message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Caller {
    /// Game-side components and user input handling.
    Input,
    /// The physics world itself.
    Physics,
    /// Scene loading and saving.
    Scene,
}

/// Severity of a console message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageType {
    /// Verbose detail, off by default.
    Debug,
    /// Normal operation.
    Info,
    /// Recoverable misuse.
    Warning,
    /// An operation was aborted.
    Exception,
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Caller::Input => "INPUT",
            Caller::Physics => "PHYSICS",
            Caller::Scene => "SCENE",
        };
        f.write_str(name)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageType::Debug => "DEBUG",
            MessageType::Info => "INFO",
            MessageType::Warning => "WARNING",
            MessageType::Exception => "EXCEPTION",
        };
        f.write_str(name)
    }
}

/// A one-way sink for diagnostic strings.
pub trait ConsoleSink: Send + Sync {
    /// Writes one message.
    fn write(&self, caller: Caller, kind: MessageType, message: &str);
}

/// Forwards console messages to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ConsoleSink for LogSink {
    fn write(&self, caller: Caller, kind: MessageType, message: &str) {
        let level = match kind {
            MessageType::Debug => log::Level::Debug,
            MessageType::Info => log::Level::Info,
            MessageType::Warning => log::Level::Warn,
            MessageType::Exception => log::Level::Error,
        };
        log::log!(level, "[{}] {}", caller, message);
    }
}

/// A message captured by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleMessage {
    /// Producing subsystem.
    pub caller: Caller,
    /// Severity.
    pub kind: MessageType,
    /// Message text.
    pub message: String,
}

/// Keeps every message in memory. Used by tests and tools.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<ConsoleMessage>>,
}

impl RecordingSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything written so far.
    pub fn messages(&self) -> Vec<ConsoleMessage> {
        match self.messages.lock() {
            Ok(messages) => messages.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of messages written so far.
    pub fn len(&self) -> usize {
        match self.messages.lock() {
            Ok(messages) => messages.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops all recorded messages.
    pub fn clear(&self) {
        match self.messages.lock() {
            Ok(mut messages) => messages.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

impl ConsoleSink for RecordingSink {
    fn write(&self, caller: Caller, kind: MessageType, message: &str) {
        let entry = ConsoleMessage {
            caller,
            kind,
            message: message.to_string(),
        };
        match self.messages.lock() {
            Ok(mut messages) => messages.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.write(Caller::Input, MessageType::Info, "first");
        sink.write(Caller::Physics, MessageType::Exception, "second");

        let messages = sink.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].message, "first");
        assert_eq!(messages[1].kind, MessageType::Exception);

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Caller::Input.to_string(), "INPUT");
        assert_eq!(MessageType::Exception.to_string(), "EXCEPTION");
    }
}
