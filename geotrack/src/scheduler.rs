use std::time::{Duration, Instant};

use log::{info, warn};

use crate::{
    fix::CurrentState, offline::OfflineBuffer, status::StatusIndicator, transport::Transport,
};

/// Result of one scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Interval not elapsed yet
    Waiting,
    /// Current fix has no position, nothing was sent or buffered
    SkippedInvalid,
    /// Transport down, the current fix went to the offline buffer
    Buffered,
    Uploaded { backlog_flushed: bool },
    /// Current fix was rejected and buffered
    UploadFailed { backlog_flushed: bool },
}

/// Time-gated upload policy.
///
/// Idle until `interval` has elapsed since construction or since the previous
/// evaluation, then evaluates once:
/// 1. no valid position: skip;
/// 2. transport down: buffer the current fix, signal degraded, request reconnect;
/// 3. otherwise: try to flush the backlog, then send the current fix whatever the backlog
///    outcome, buffering it on failure.
///
/// The current fix is buffered again on every failing evaluation, duplicates included.
#[derive(Debug, Clone)]
pub struct UploadScheduler {
    interval: Duration,
    last_evaluation: Instant,
}

impl UploadScheduler {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last_evaluation: now,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_evaluation) >= self.interval
    }

    pub fn tick<T, S>(
        &mut self,
        now: Instant,
        current: &CurrentState,
        backlog: &mut OfflineBuffer,
        transport: &mut T,
        status: &mut S,
    ) -> TickOutcome
    where
        T: Transport,
        S: StatusIndicator,
    {
        if !self.is_due(now) {
            return TickOutcome::Waiting;
        }
        self.last_evaluation = now;

        if !current.is_valid() {
            info!("Invalid GPS data. Skipping upload.");
            return TickOutcome::SkippedInvalid;
        }
        let fix = current.fix();

        if !transport.is_available() {
            warn!("Transport not available. Storing fix locally.");
            backlog.enqueue(fix.clone());
            status.set_network_health(false);
            transport.reconnect();
            return TickOutcome::Buffered;
        }

        let backlog_flushed = backlog.drain_if_all_succeed(|queued| transport.send(queued));

        if transport.send(fix) {
            info!("Latest GPS fix uploaded ({} still buffered)", backlog.len());
            status.set_network_health(true);
            TickOutcome::Uploaded { backlog_flushed }
        } else {
            warn!("Failed to upload latest GPS fix. Storing locally.");
            backlog.enqueue(fix.clone());
            status.set_network_health(false);
            TickOutcome::UploadFailed { backlog_flushed }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{fix::Fix, sentence::decode};
    use std::collections::VecDeque;

    /// Scripted transport recording every send
    #[derive(Debug, Default)]
    pub(crate) struct MockTransport {
        pub available: bool,
        /// Outcomes of upcoming sends, `true` once exhausted
        pub results: VecDeque<bool>,
        pub sent: Vec<Fix>,
        pub reconnects: usize,
    }

    impl MockTransport {
        pub fn up() -> Self {
            Self {
                available: true,
                ..Self::default()
            }
        }

        pub fn down() -> Self {
            Self::default()
        }

        pub fn with_results(mut self, results: &[bool]) -> Self {
            self.results = results.iter().copied().collect();
            self
        }
    }

    impl Transport for MockTransport {
        fn is_available(&mut self) -> bool {
            self.available
        }

        fn reconnect(&mut self) {
            self.reconnects += 1;
        }

        fn send(&mut self, fix: &Fix) -> bool {
            self.sent.push(fix.clone());
            self.results.pop_front().unwrap_or(true)
        }
    }

    #[derive(Debug, Default)]
    pub(crate) struct RecordingStatus {
        pub network: Vec<bool>,
        pub fix: Vec<bool>,
    }

    impl StatusIndicator for RecordingStatus {
        fn set_network_health(&mut self, healthy: bool) {
            self.network.push(healthy);
        }

        fn set_fix_health(&mut self, valid: bool) {
            self.fix.push(valid);
        }
    }

    const INTERVAL: Duration = Duration::from_millis(10_000);

    fn valid_state() -> CurrentState {
        let mut state = CurrentState::new();
        state.apply(&decode("$GPGGA,123519,4916.45,N,12311.12,W,1,08,0.9,545.4,M").unwrap());
        state.apply(&decode("$GPRMC,153045,A,,,,,,,020324,,").unwrap());
        state
    }

    fn queued(n: u32) -> Fix {
        Fix {
            latitude: f64::from(n),
            longitude: f64::from(n),
            timestamp: format!("2024-01-01T00:00:{:02}Z", n),
        }
    }

    struct Harness {
        start: Instant,
        scheduler: UploadScheduler,
        backlog: OfflineBuffer,
        transport: MockTransport,
        status: RecordingStatus,
    }

    impl Harness {
        fn new(transport: MockTransport) -> Self {
            let start = Instant::now();
            Self {
                start,
                scheduler: UploadScheduler::new(INTERVAL, start),
                backlog: OfflineBuffer::new(),
                transport,
                status: RecordingStatus::default(),
            }
        }

        fn tick_at(&mut self, after: Duration, state: &CurrentState) -> TickOutcome {
            self.scheduler.tick(
                self.start + after,
                state,
                &mut self.backlog,
                &mut self.transport,
                &mut self.status,
            )
        }
    }

    #[test]
    fn waits_for_interval() {
        let mut h = Harness::new(MockTransport::up());
        let state = valid_state();
        assert_eq!(h.tick_at(Duration::ZERO, &state), TickOutcome::Waiting);
        assert_eq!(
            h.tick_at(Duration::from_millis(9_999), &state),
            TickOutcome::Waiting
        );
        assert!(matches!(
            h.tick_at(INTERVAL, &state),
            TickOutcome::Uploaded { .. }
        ));
        // Next window starts at the last evaluation
        assert_eq!(
            h.tick_at(INTERVAL + Duration::from_millis(5_000), &state),
            TickOutcome::Waiting
        );
        assert!(matches!(
            h.tick_at(INTERVAL * 2, &state),
            TickOutcome::Uploaded { .. }
        ));
        assert_eq!(h.transport.sent.len(), 2);
    }

    #[test]
    fn invalid_fix_sends_nothing() {
        let mut h = Harness::new(MockTransport::up());
        h.backlog.enqueue(queued(1));
        let state = CurrentState::new();

        assert_eq!(h.tick_at(INTERVAL, &state), TickOutcome::SkippedInvalid);
        assert!(h.transport.sent.is_empty());
        assert_eq!(h.backlog.iter().cloned().collect::<Vec<_>>(), vec![queued(1)]);
        assert!(h.status.network.is_empty());
    }

    #[test]
    fn transport_down_buffers_once_per_tick() {
        let mut h = Harness::new(MockTransport::down());
        let state = valid_state();

        assert_eq!(h.tick_at(INTERVAL, &state), TickOutcome::Buffered);
        assert_eq!(h.backlog.len(), 1);
        assert_eq!(h.tick_at(INTERVAL * 2, &state), TickOutcome::Buffered);
        assert_eq!(h.backlog.len(), 2);

        assert!(h.transport.sent.is_empty());
        assert_eq!(h.transport.reconnects, 2);
        assert_eq!(h.status.network, vec![false, false]);
        assert!(h.backlog.iter().all(|f| f == state.fix()));
    }

    #[test]
    fn successful_upload_with_empty_backlog() {
        let mut h = Harness::new(MockTransport::up());
        let state = valid_state();

        assert_eq!(
            h.tick_at(INTERVAL, &state),
            TickOutcome::Uploaded {
                backlog_flushed: true
            }
        );
        assert!(h.backlog.is_empty());
        assert_eq!(h.transport.sent, vec![state.fix().clone()]);
        assert_eq!(h.status.network, vec![true]);
    }

    #[test]
    fn backlog_flushed_before_current_fix() {
        let mut h = Harness::new(MockTransport::up());
        h.backlog.enqueue(queued(1));
        h.backlog.enqueue(queued(2));
        let state = valid_state();

        assert_eq!(
            h.tick_at(INTERVAL, &state),
            TickOutcome::Uploaded {
                backlog_flushed: true
            }
        );
        assert_eq!(
            h.transport.sent,
            vec![queued(1), queued(2), state.fix().clone()]
        );
        assert!(h.backlog.is_empty());
    }

    #[test]
    fn backlog_failure_does_not_block_current_fix() {
        let transport = MockTransport::up().with_results(&[true, false]);
        let mut h = Harness::new(transport);
        for n in 1..=3 {
            h.backlog.enqueue(queued(n));
        }
        let state = valid_state();

        assert_eq!(
            h.tick_at(INTERVAL, &state),
            TickOutcome::Uploaded {
                backlog_flushed: false
            }
        );
        assert_eq!(
            h.transport.sent,
            vec![queued(1), queued(2), state.fix().clone()]
        );
        assert_eq!(
            h.backlog.iter().cloned().collect::<Vec<_>>(),
            vec![queued(1), queued(2), queued(3)]
        );
        assert_eq!(h.status.network, vec![true]);
    }

    #[test]
    fn failed_upload_buffers_current_fix() {
        let transport = MockTransport::up().with_results(&[false]);
        let mut h = Harness::new(transport);
        let state = valid_state();

        assert_eq!(
            h.tick_at(INTERVAL, &state),
            TickOutcome::UploadFailed {
                backlog_flushed: true
            }
        );
        assert_eq!(h.backlog.iter().collect::<Vec<_>>(), vec![state.fix()]);
        assert_eq!(h.status.network, vec![false]);

        // Next cycle resends the buffered copy, then the current fix again
        assert_eq!(
            h.tick_at(INTERVAL * 2, &state),
            TickOutcome::Uploaded {
                backlog_flushed: true
            }
        );
        assert_eq!(h.transport.sent.len(), 3);
        assert!(h.backlog.is_empty());
        assert_eq!(h.status.network, vec![false, true]);
    }

    #[test]
    fn backlog_and_current_fix_both_fail() {
        let transport = MockTransport::up().with_results(&[true, false, false]);
        let mut h = Harness::new(transport);
        for n in 1..=3 {
            h.backlog.enqueue(queued(n));
        }
        let state = valid_state();

        assert_eq!(
            h.tick_at(INTERVAL, &state),
            TickOutcome::UploadFailed {
                backlog_flushed: false
            }
        );
        assert_eq!(
            h.transport.sent,
            vec![queued(1), queued(2), state.fix().clone()]
        );
        // Nothing pruned, the current fix goes behind the old entries
        assert_eq!(
            h.backlog.iter().cloned().collect::<Vec<_>>(),
            vec![queued(1), queued(2), queued(3), state.fix().clone()]
        );
        assert_eq!(h.status.network, vec![false]);
    }
}
