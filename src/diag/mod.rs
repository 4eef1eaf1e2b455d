/*!
 * Diagnostics
 * Typed lifecycle events behind a pluggable sink
 *
 * Dispatch and lifecycle paths report through a `DiagnosticSink` so
 * embedders can route events wherever they like; the default sink
 * forwards to the `log` facade. Events are best-effort observability,
 * never part of any operation's contract.
 */

use crate::core::id::{HandleId, ResourceId};
use crate::core::types::InlineString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Event severity for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Severity {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

/// One lifecycle or dispatch event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub severity: Severity,
    /// Logical handle the event belongs to
    pub handle: HandleId,
    pub payload: Payload,
}

impl Event {
    #[inline]
    pub fn new(severity: Severity, handle: HandleId, payload: Payload) -> Self {
        Self {
            severity,
            handle,
            payload,
        }
    }
}

/// Strongly-typed event payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Payload {
    HandleOpened,
    PhysicalObtained,
    PhysicalReleased,
    HandleClosed {
        resources_released: usize,
    },
    ResourceRegistered {
        resource: ResourceId,
        resource_type: InlineString,
    },
    ResourceReleased {
        resource: ResourceId,
        resource_type: InlineString,
    },
    StatementPrepared {
        sql: String,
    },
    Dispatch {
        resource_type: InlineString,
        operation: InlineString,
    },
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::HandleOpened => write!(f, "handle opened"),
            Payload::PhysicalObtained => write!(f, "physical resource obtained"),
            Payload::PhysicalReleased => write!(f, "physical resource released"),
            Payload::HandleClosed {
                resources_released,
            } => write!(f, "handle closed ({resources_released} resources released)"),
            Payload::ResourceRegistered {
                resource,
                resource_type,
            } => write!(f, "{resource_type} {resource} registered"),
            Payload::ResourceReleased {
                resource,
                resource_type,
            } => write!(f, "{resource_type} {resource} released"),
            Payload::StatementPrepared { sql } => write!(f, "preparing: {sql}"),
            Payload::Dispatch {
                resource_type,
                operation,
            } => write!(f, "dispatching {resource_type} operation `{operation}`"),
        }
    }
}

/// Where events go
pub trait DiagnosticSink {
    fn emit(&self, event: Event);
}

/// Default sink: forwards to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, event: Event) {
        let level = match event.severity {
            Severity::Trace => log::Level::Trace,
            Severity::Debug => log::Level::Debug,
            Severity::Info => log::Level::Info,
            Severity::Warn => log::Level::Warn,
            Severity::Error => log::Level::Error,
        };
        log::log!(level, "[handle {}] {}", event.handle, event.payload);
    }
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&self, _event: Event) {}
}
