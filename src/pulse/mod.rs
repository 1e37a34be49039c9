//! Pulse parsing and normalization.
//!
//! Aligned with the original receiver's `PreparePulse`/`sortSignal` pair
//! (`examples/original_source/receiver/protocol.go` and its test fixtures in
//! `pulse_test.go`). A [`Signal`] is the canonical in-memory form of one
//! captured pulse burst; everything downstream (matching, bit mapping,
//! payload decoding) operates on a *normalized* signal.

mod signal;

pub use signal::{prepare_pulse, sort_signal, Signal};
