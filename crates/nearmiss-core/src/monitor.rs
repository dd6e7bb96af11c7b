//! Periodic tip monitoring.
//!
//! The monitor performs one point read per interval and hands changed tips
//! to a callback. It sleeps on the stop channel, so a stop message or a
//! dropped sender ends the loop without waiting out the interval.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::Result;
use crate::feed::{AggregatorAccount, FeedReader, FeedRound};
use crate::header::BlockTip;

/// Where aggregator accounts are fetched from (an RPC client, a test fixture).
pub trait FeedSource {
    fn fetch(&mut self) -> Result<AggregatorAccount>;
}

/// Counters reported when the monitor stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorSummary {
    pub polls: u64,
    pub changes: u64,
    pub errors: u64,
}

/// Polls a [`FeedSource`] through a [`FeedReader`] at a fixed interval.
pub struct TipMonitor<S> {
    source: S,
    reader: FeedReader,
    interval: Duration,
}

impl<S: FeedSource> TipMonitor<S> {
    pub fn new(source: S, reader: FeedReader, interval: Duration) -> Self {
        TipMonitor { source, reader, interval }
    }

    /// Fetch and authenticate the current round.
    pub fn poll_once(&mut self) -> Result<FeedRound> {
        let account = self.source.fetch()?;
        self.reader.read_round(&account)
    }

    /// Poll until `stop` receives a message or its sender is dropped.
    ///
    /// `on_change` runs for the first round read and for every round whose
    /// tip differs from the previous one. Read failures are logged and the
    /// loop continues.
    pub fn run<F>(&mut self, stop: &Receiver<()>, mut on_change: F) -> MonitorSummary
    where
        F: FnMut(&FeedRound),
    {
        let mut summary = MonitorSummary::default();
        let mut last: Option<BlockTip> = None;

        loop {
            summary.polls += 1;
            match self.poll_once() {
                Ok(round) if last != Some(round.tip) => {
                    debug!(height = round.height, "tip changed");
                    last = Some(round.tip);
                    summary.changes += 1;
                    on_change(&round);
                }
                Ok(_) => {}
                Err(e) => {
                    summary.errors += 1;
                    warn!(error = %e, code = e.code(), "tip poll failed");
                }
            }

            match stop.recv_timeout(self.interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        summary
    }

    pub fn into_source(self) -> S {
        self.source
    }
}
