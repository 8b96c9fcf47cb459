//! Leveled message output. The orchestrator is the only writer.

use std::cell::RefCell;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageLevel::Info => write!(f, "INFO"),
            MessageLevel::Warning => write!(f, "WARNING"),
            MessageLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Receives the messages of a build pass; rendering is up to the host.
pub trait MessageSink {
    fn emit(&self, level: MessageLevel, text: &str);
}

/// Forwards messages to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl MessageSink for TracingSink {
    fn emit(&self, level: MessageLevel, text: &str) {
        match level {
            MessageLevel::Info => tracing::info!("{}", text),
            MessageLevel::Warning => tracing::warn!("{}", text),
            MessageLevel::Error => tracing::error!("{}", text),
        }
    }
}

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    messages: RefCell<Vec<(MessageLevel, String)>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(MessageLevel, String)> {
        self.messages.borrow().clone()
    }

    pub fn with_level(&self, level: MessageLevel) -> Vec<String> {
        self.messages
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }
}

impl MessageSink for CollectingSink {
    fn emit(&self, level: MessageLevel, text: &str) {
        self.messages.borrow_mut().push((level, text.to_string()));
    }
}
