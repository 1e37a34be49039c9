//! Per-line decode dispatcher: the boundary between the fallible core
//! pipeline and the sinks, which never see an error.
//!
//! Grounded in `examples/original_source/receiver/main.go`'s `DecodeSignal`
//! dispatch function — strip the prefix, run the pipeline, route the
//! resulting typed reading to the right sink, and log (never propagate)
//! anything that goes wrong along the way.

use std::sync::Arc;

use crate::config::Config;
use crate::error::DecodeError;
use crate::metrics::Metrics;
use crate::protocols::{ProtocolRegistry, Reading};
use crate::pulse::{prepare_pulse, sort_signal};
use crate::push::PushHandle;
use crate::serial::strip_prefix;

pub struct Dispatcher {
    registry: ProtocolRegistry,
    metrics: Arc<Metrics>,
    config: Arc<Config>,
    push: PushHandle,
}

impl Dispatcher {
    pub fn new(metrics: Arc<Metrics>, config: Arc<Config>, push: PushHandle) -> Self {
        Self {
            registry: ProtocolRegistry::new(),
            metrics,
            config,
            push,
        }
    }

    /// Decode one raw serial line and route it to a sink. Every failure is
    /// logged at an appropriate level and swallowed — a malformed or
    /// unrecognized line must never take down the decoder task.
    pub async fn handle_line(&self, line: &str) {
        match self.decode(line) {
            Ok(reading) => self.route(reading).await,
            Err(DecodeError::InvalidLine(e)) => {
                tracing::debug!(error = %e, line, "malformed pulse line");
            }
            Err(DecodeError::NoMatch { lengths, seq_len }) => {
                tracing::warn!(?lengths, seq_len, "unknown signal: no protocol matched");
            }
            Err(e) => {
                tracing::warn!(error = %e, line, "decode failed");
            }
        }
    }

    fn decode(&self, line: &str) -> Result<Reading, DecodeError> {
        let line = strip_prefix(line);
        let signal = prepare_pulse(line)?;
        let signal = sort_signal(&signal);

        let protocol = self
            .registry
            .find_match(&signal)
            .ok_or_else(|| DecodeError::NoMatch {
                lengths: signal.lengths.clone(),
                seq_len: signal.seq.chars().count(),
            })?;

        let bits = crate::protocols::convert(&signal.seq, protocol)?;
        (protocol.decode)(&bits)
    }

    async fn route(&self, reading: Reading) {
        match reading {
            Reading::GtWt01(r) => self.metrics.observe_gt_wt01(&r, &self.config),
            Reading::Grube(r) => self.metrics.observe_grube(&r),
            Reading::DoorBell(event) => {
                tracing::info!(old = event.old, "doorbell pressed");
                self.push.notify_doorbell(true).await;
            }
        }
    }
}

/// Drain the receiving end of the decoder channel through `dispatcher`
/// until the channel closes, per SPEC_FULL.md §5's single-consumer model.
/// The decoder task keeps draining whatever is already buffered even after
/// shutdown is requested, so no in-flight line is lost.
pub async fn run(dispatcher: Dispatcher, mut rx: tokio::sync::mpsc::Receiver<String>) {
    while let Some(line) = rx.recv().await {
        dispatcher.handle_line(&line).await;
    }
    tracing::info!("decoder channel closed, dispatcher exiting");
}
