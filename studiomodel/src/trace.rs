use std::fmt;

use crate::level::{Level, NodePath};

/// A decision taken while walking a vtx, reported to an optional [`TraceSink`].
///
/// `path` names the record that owns the table being read; the root path is
/// the file header.
#[derive(Clone, Debug, PartialEq)]
pub enum TraceEvent {
    CountRead {
        level: Level,
        path: NodePath,
        count: i32,
    },
    AddressResolved {
        level: Level,
        path: NodePath,
        address: i64,
    },
    BoundViolated {
        level: Level,
        path: NodePath,
        address: i64,
        size: i64,
        len: usize,
    },
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::CountRead { level, path, count } => {
                write!(f, "{path}: {count} {level}(s)")
            }
            TraceEvent::AddressResolved {
                level,
                path,
                address,
            } => write!(f, "{path}: {level} table at {address}"),
            TraceEvent::BoundViolated {
                level,
                path,
                address,
                size,
                len,
            } => write!(
                f,
                "{path}: {level} read of {size} bytes at {address} exceeds {len}"
            ),
        }
    }
}

/// Receives [`TraceEvent`]s from a decode. Passed explicitly to the decoder,
/// there is no global sink.
pub trait TraceSink {
    fn event(&mut self, event: &TraceEvent);
}

impl<F: FnMut(&TraceEvent)> TraceSink for F {
    fn event(&mut self, event: &TraceEvent) {
        self(event)
    }
}

/// Forwards every event to `log::trace!`.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogTrace;

impl TraceSink for LogTrace {
    fn event(&mut self, event: &TraceEvent) {
        match event {
            TraceEvent::BoundViolated { .. } => log::debug!("{event}"),
            _ => log::trace!("{event}"),
        }
    }
}

/// Keeps every event in order.
#[derive(Clone, Debug, Default)]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn resolved(&self, level: Level) -> impl Iterator<Item = i64> + '_ {
        self.events.iter().filter_map(move |e| match e {
            TraceEvent::AddressResolved { level: l, address, .. } if *l == level => Some(*address),
            _ => None,
        })
    }
}

impl TraceSink for TraceLog {
    fn event(&mut self, event: &TraceEvent) {
        self.events.push(event.clone());
    }
}
