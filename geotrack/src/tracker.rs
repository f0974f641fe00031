use std::time::{Duration, Instant};

use log::trace;

use crate::{
    buffer::FixedBuffer,
    constants::MAX_LINE_LEN,
    fix::{Applied, CurrentState},
    line::LineParser,
    offline::OfflineBuffer,
    scheduler::{TickOutcome, UploadScheduler},
    sentence::decode,
    status::StatusIndicator,
    transport::Transport,
};

/// Owns the whole pipeline of one device: serial lines in, uploads out.
///
/// The control loop feeds it bytes with [Tracker::ingest] and lets time pass with
/// [Tracker::poll]. Both run on the caller's thread.
pub struct Tracker<T: Transport, S: StatusIndicator> {
    lines: LineParser<FixedBuffer<MAX_LINE_LEN>>,
    state: CurrentState,
    backlog: OfflineBuffer,
    scheduler: UploadScheduler,
    transport: T,
    status: S,
}

impl<T: Transport, S: StatusIndicator> Tracker<T, S> {
    /// The first upload is evaluated one `interval` after `now`.
    pub fn new(transport: T, status: S, interval: Duration, now: Instant) -> Self {
        Self {
            lines: LineParser::new(FixedBuffer::new()),
            state: CurrentState::new(),
            backlog: OfflineBuffer::new(),
            scheduler: UploadScheduler::new(interval, now),
            transport,
            status,
        }
    }

    /// Feeds raw serial bytes. Returns how many recognized sentences they completed.
    pub fn ingest(&mut self, data: &[u8]) -> usize {
        let mut recognized = 0;
        for line in self.lines.consume(data) {
            if apply_line(&mut self.state, &mut self.status, &line) {
                recognized += 1;
            }
        }
        recognized
    }

    /// Applies one complete line, bypassing the line accumulator.
    pub fn ingest_line(&mut self, line: &str) -> bool {
        apply_line(&mut self.state, &mut self.status, line)
    }

    pub fn poll(&mut self, now: Instant) -> TickOutcome {
        self.scheduler.tick(
            now,
            &self.state,
            &mut self.backlog,
            &mut self.transport,
            &mut self.status,
        )
    }

    pub fn state(&self) -> &CurrentState {
        &self.state
    }

    pub fn backlog(&self) -> &OfflineBuffer {
        &self.backlog
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn status(&self) -> &S {
        &self.status
    }
}

fn apply_line<S: StatusIndicator>(state: &mut CurrentState, status: &mut S, line: &str) -> bool {
    trace!("NMEA: {}", line.trim_end());
    let Some(fragment) = decode(line) else {
        return false;
    };
    if let Applied::Position { valid } = state.apply(&fragment) {
        status.set_fix_health(valid);
    }
    true
}
