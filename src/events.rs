//! Change notifications published by the engine after each successful mutation.
//!
//! The engine only knows the [`EventSink`] port; transports (websockets, polling, logs)
//! subscribe on their own.

use crate::models::{ParticipantId, PlayoffRound, TournamentId};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TournamentEvent {
    TournamentCreated { tournament_id: TournamentId },
    TournamentUpdated { tournament_id: TournamentId },
    TournamentDeleted { tournament_id: TournamentId },
    ParticipantsChanged { tournament_id: TournamentId },
    FixturesGenerated { tournament_id: TournamentId, matches: usize },
    StandingsChanged { tournament_id: TournamentId },
    PlayoffsStarted { tournament_id: TournamentId, round: PlayoffRound },
    RoundAdvanced { tournament_id: TournamentId, round: PlayoffRound },
    TournamentCompleted { tournament_id: TournamentId, champion: ParticipantId },
}

pub trait EventSink: Send + Sync {
    fn publish(&self, event: TournamentEvent);
}

/// Discards everything.
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn publish(&self, _event: TournamentEvent) {}
}

/// Forwards events to the `log` facade.
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn publish(&self, event: TournamentEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => log::info!("event {}", json),
            Err(_) => log::info!("event {:?}", event),
        }
    }
}

/// Keeps every event in memory, in publish order. Meant for tests; long-running
/// processes should use [`BufferedEventSink`].
#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<TournamentEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events published so far.
    pub fn events(&self) -> Vec<TournamentEvent> {
        self.events
            .lock()
            .map(|g| g.clone())
            .unwrap_or_default()
    }

    /// Events published after the first `from` ones.
    pub fn since(&self, from: usize) -> Vec<TournamentEvent> {
        self.events
            .lock()
            .map(|g| g.get(from..).map(<[_]>::to_vec).unwrap_or_default())
            .unwrap_or_default()
    }
}

impl EventSink for RecordingEventSink {
    fn publish(&self, event: TournamentEvent) {
        if let Ok(mut g) = self.events.lock() {
            g.push(event);
        }
    }
}

/// Default number of events a [`BufferedEventSink`] keeps.
pub const DEFAULT_EVENT_BUFFER: usize = 1024;

#[derive(Default)]
struct Ring {
    events: VecDeque<TournamentEvent>,
    /// Sequence number of `events[0]`.
    first: usize,
}

/// The most recent events, addressed by an ever-increasing sequence number so polling
/// clients can ask for everything after the last one they saw.
pub struct BufferedEventSink {
    ring: Mutex<Ring>,
    capacity: usize,
}

/// A page of events from [`BufferedEventSink::since`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct EventPage {
    /// Sequence number to pass on the next poll.
    pub next: usize,
    /// `true` when older events the caller had not seen were already dropped.
    pub truncated: bool,
    pub events: Vec<TournamentEvent>,
}

impl BufferedEventSink {
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: Mutex::new(Ring::default()),
            capacity: capacity.max(1),
        }
    }

    /// Events with sequence number `from` or later that are still buffered.
    pub fn since(&self, from: usize) -> EventPage {
        let Ok(ring) = self.ring.lock() else {
            return EventPage {
                next: from,
                truncated: false,
                events: Vec::new(),
            };
        };
        let next = ring.first + ring.events.len();
        let start = from.clamp(ring.first, next);
        EventPage {
            next,
            truncated: from < ring.first,
            events: ring.events.range(start - ring.first..).cloned().collect(),
        }
    }
}

impl Default for BufferedEventSink {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER)
    }
}

impl EventSink for BufferedEventSink {
    fn publish(&self, event: TournamentEvent) {
        if let Ok(mut ring) = self.ring.lock() {
            if ring.events.len() == self.capacity {
                ring.events.pop_front();
                ring.first += 1;
            }
            ring.events.push_back(event);
        }
    }
}
