use std::collections::VecDeque;

use log::{debug, warn};

use crate::fix::Fix;

/// In-memory FIFO of fixes that could not be uploaded.
///
/// There is no capacity limit and nothing survives a restart.
#[derive(Debug, Clone, Default)]
pub struct OfflineBuffer {
    entries: VecDeque<Fix>,
}

impl OfflineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, fix: Fix) {
        self.entries.push_back(fix);
        debug!("Offline buffer holds {} fixes", self.entries.len());
    }

    /// Sends every entry oldest first and clears the buffer only if all of them went
    /// through. Returns whether the buffer was flushed.
    ///
    /// Sending stops at the first failure and nothing is removed, including entries the
    /// collector already accepted in this pass. Those are sent again next time, so
    /// delivery is at-least-once.
    pub fn drain_if_all_succeed<F>(&mut self, mut send: F) -> bool
    where
        F: FnMut(&Fix) -> bool,
    {
        for (i, fix) in self.entries.iter().enumerate() {
            if !send(fix) {
                warn!(
                    "Backlog upload stopped at entry {} of {}, keeping all",
                    i + 1,
                    self.entries.len()
                );
                return false;
            }
        }
        if !self.entries.is_empty() {
            debug!("Backlog of {} fixes uploaded", self.entries.len());
        }
        self.entries.clear();
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fix> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fix(n: u32) -> Fix {
        Fix {
            latitude: f64::from(n),
            longitude: -f64::from(n),
            timestamp: format!("2024-03-02T15:30:{:02}Z", n),
        }
    }

    fn buffer_of(fixes: &[Fix]) -> OfflineBuffer {
        let mut buffer = OfflineBuffer::new();
        for f in fixes {
            buffer.enqueue(f.clone());
        }
        buffer
    }

    #[test]
    fn drain_sends_in_fifo_order() {
        let mut buffer = buffer_of(&[fix(1), fix(2), fix(3)]);
        let mut sent = vec![];
        assert!(buffer.drain_if_all_succeed(|f| {
            sent.push(f.clone());
            true
        }));
        assert_eq!(sent, vec![fix(1), fix(2), fix(3)]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn failure_mid_backlog_keeps_everything() {
        let mut buffer = buffer_of(&[fix(1), fix(2), fix(3)]);
        let mut attempts = vec![];
        let flushed = buffer.drain_if_all_succeed(|f| {
            attempts.push(f.clone());
            *f != fix(2)
        });
        assert!(!flushed);
        // F3 is never tried, F1 stays even though it was delivered
        assert_eq!(attempts, vec![fix(1), fix(2)]);
        assert_eq!(
            buffer.iter().cloned().collect::<Vec<_>>(),
            vec![fix(1), fix(2), fix(3)]
        );
    }

    #[test]
    fn redelivery_after_partial_failure() {
        let mut buffer = buffer_of(&[fix(1), fix(2)]);
        assert!(!buffer.drain_if_all_succeed(|f| *f == fix(1)));

        let mut delivered = vec![];
        assert!(buffer.drain_if_all_succeed(|f| {
            delivered.push(f.clone());
            true
        }));
        assert_eq!(delivered, vec![fix(1), fix(2)]);
    }

    #[test]
    fn empty_drain_succeeds_without_sending() {
        let mut buffer = OfflineBuffer::new();
        let mut calls = 0;
        assert!(buffer.drain_if_all_succeed(|_| {
            calls += 1;
            false
        }));
        assert_eq!(calls, 0);
    }

    #[test]
    fn enqueue_appends_duplicates() {
        let mut buffer = OfflineBuffer::new();
        buffer.enqueue(fix(1));
        buffer.enqueue(fix(1));
        assert_eq!(buffer.len(), 2);
    }
}
