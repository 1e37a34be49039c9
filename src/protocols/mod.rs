//! Protocol registry: the bit-exact table of known pulse-train shapes, the
//! tolerance-based matcher, and the digit-group bit mapper.
//!
//! Grounded in `examples/original_source/receiver/protocol.go`'s `Protocols()`
//! table and `matches`/`convert` functions; the registry shape (a flat `Vec`
//! searched linearly, built once) follows the teacher's own
//! `ProtocolRegistry` in spirit, generalized from `Vec<Box<dyn
//! ProtocolDecoder>>` to a data table since every device kind here shares one
//! decode shape (lengths + mapping + bit layout) rather than needing
//! per-protocol behavior beyond a plain decode function.

mod bits;
mod common;
mod doorbell;
mod grube;
mod gt_wt_01;

pub use common::{DoorBellEvent, GrubeReading, GtWt01Reading, Reading};

use crate::error::{DecodeError, MappingError};
use crate::pulse::Signal;
use std::collections::HashMap;

/// Relative tolerance applied to each pulse-length comparison in [`matches`].
/// Real captures never line up exactly with the nominal widths in the
/// registry table; 30% absorbs clock drift in the receiving microcontroller
/// without collapsing genuinely distinct protocols into each other.
pub const TOLERANCE: f64 = 0.30;

/// Which physical device family a [`Protocol`] entry belongs to. Several
/// registry entries can share one `DeviceKind` (the two `DoorBellOld` pulse
/// length variants both decode to `DoorBellOld`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    GtWt01,
    DoorBell,
    DoorBellOld,
    Grube,
}

/// One entry in the protocol registry: a pulse-train shape plus how to turn
/// a matching sequence into a [`Reading`].
pub struct Protocol {
    pub device_kind: DeviceKind,
    pub name: &'static str,
    pub seq_length: usize,
    pub lengths: Vec<u32>,
    pub mapping: HashMap<&'static str, &'static str>,
    pub group_size: usize,
    pub decode: fn(&str) -> Result<Reading, DecodeError>,
}

fn mapping_of(pairs: &[(&'static str, &'static str)]) -> HashMap<&'static str, &'static str> {
    pairs.iter().copied().collect()
}

/// The complete set of known pulse-train shapes. Built once; the dispatcher
/// owns a single instance for the lifetime of the process.
pub struct ProtocolRegistry {
    protocols: Vec<Protocol>,
}

impl ProtocolRegistry {
    /// Bit-exact per `examples/original_source/receiver/protocol.go`'s
    /// `Protocols()` map — lengths, sequence lengths, and digit-group
    /// mappings are copied verbatim from that table.
    pub fn new() -> Self {
        let protocols = vec![
            Protocol {
                device_kind: DeviceKind::GtWt01,
                name: "GT_WT_01",
                seq_length: 76,
                lengths: vec![496, 2048, 4068, 8960],
                mapping: mapping_of(&[("01", "0"), ("02", "1"), ("03", "")]),
                group_size: 2,
                decode: gt_wt_01::decode,
            },
            Protocol {
                device_kind: DeviceKind::DoorBell,
                name: "doorbell",
                seq_length: 50,
                lengths: vec![336, 996, 10332],
                mapping: mapping_of(&[("0", "0"), ("1", "1"), ("2", "")]),
                group_size: 1,
                decode: doorbell::decode_new,
            },
            Protocol {
                device_kind: DeviceKind::DoorBellOld,
                name: "doorbell-old",
                seq_length: 50,
                lengths: vec![200, 600, 6044],
                mapping: mapping_of(&[("0", "0"), ("1", "1"), ("2", "")]),
                group_size: 1,
                decode: doorbell::decode_old,
            },
            Protocol {
                device_kind: DeviceKind::DoorBellOld,
                name: "doorbell-old-2",
                seq_length: 50,
                lengths: vec![168, 224, 600, 6020],
                mapping: mapping_of(&[("0", "0"), ("1", "1"), ("2", ""), ("3", "")]),
                group_size: 1,
                decode: doorbell::decode_old,
            },
            Protocol {
                device_kind: DeviceKind::Grube,
                name: "grube",
                seq_length: 98,
                lengths: vec![453, 900, 1992, 9300],
                mapping: mapping_of(&[("01", "0"), ("02", "1"), ("03", "")]),
                group_size: 2,
                decode: grube::decode,
            },
        ];
        Self { protocols }
    }

    /// Find the first registry entry whose shape matches `signal`, per
    /// [`matches`]. Registry order is the tie-breaker when a corrupt capture
    /// could ambiguously satisfy more than one entry — not expected in
    /// practice given the distinct length counts below.
    pub fn find_match<'a>(&'a self, signal: &Signal) -> Option<&'a Protocol> {
        self.protocols.iter().find(|p| matches(signal, p))
    }
}

impl Default for ProtocolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A signal matches a protocol when it has the same number of distinct
/// pulse widths, the same sequence length, and each width is within
/// [`TOLERANCE`] of the protocol's nominal width at the same (sorted) index.
///
/// `signal` must already be normalized ([`crate::pulse::sort_signal`]) so
/// that comparing by index is meaningful.
pub fn matches(signal: &Signal, protocol: &Protocol) -> bool {
    if signal.seq.chars().count() != protocol.seq_length {
        return false;
    }
    if signal.lengths.len() != protocol.lengths.len() {
        return false;
    }
    signal
        .lengths
        .iter()
        .zip(protocol.lengths.iter())
        .all(|(&observed, &nominal)| within_tolerance(observed, nominal))
}

fn within_tolerance(observed: u32, nominal: u32) -> bool {
    let nominal = nominal as f64;
    let observed = observed as f64;
    (observed - nominal).abs() <= nominal * TOLERANCE
}

/// Consume `seq` in fixed-width (`protocol.group_size`) digit groups,
/// rewriting each group through `protocol.mapping` into a bit string.
/// Groups that map to `""` are terminators: mapping stops there and whatever
/// has accumulated so far is returned (used by every registry entry to
/// truncate trailing padding groups).
pub fn convert(seq: &str, protocol: &Protocol) -> Result<String, MappingError> {
    let group_size = protocol.group_size;
    if seq.len() % group_size != 0 {
        return Err(MappingError::RaggedSequence {
            protocol: protocol.name,
            len: seq.len(),
            group_size,
        });
    }

    let mut bits = String::new();
    let chars: Vec<char> = seq.chars().collect();
    for (offset, chunk) in chars.chunks(group_size).enumerate() {
        let group: String = chunk.iter().collect();
        match protocol.mapping.get(group.as_str()) {
            Some(&"") => break,
            Some(&mapped) => bits.push_str(mapped),
            None => {
                return Err(MappingError::UnknownGroup {
                    protocol: protocol.name,
                    group,
                    offset: offset * group_size,
                })
            }
        }
    }
    Ok(bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gt_wt_01() -> Protocol {
        ProtocolRegistry::new()
            .protocols
            .into_iter()
            .find(|p| p.name == "GT_WT_01")
            .unwrap()
    }

    #[test]
    fn matches_accepts_exact_lengths() {
        let signal = Signal {
            lengths: vec![496, 2048, 4068, 8960],
            seq: "0".repeat(76),
        };
        assert!(matches(&signal, &gt_wt_01()));
    }

    #[test]
    fn matches_accepts_within_tolerance() {
        let signal = Signal {
            lengths: vec![496 + 100, 2048, 4068, 8960],
            seq: "0".repeat(76),
        };
        assert!(matches(&signal, &gt_wt_01()));
    }

    #[test]
    fn matches_rejects_just_outside_tolerance() {
        // threshold = 496 * 0.30 = 148.8; +150 over nominal just exceeds it.
        let signal = Signal {
            lengths: vec![496 + 150, 2048, 4068, 8960],
            seq: "0".repeat(76),
        };
        assert!(!matches(&signal, &gt_wt_01()));
    }

    #[test]
    fn matches_rejects_wrong_seq_length() {
        let signal = Signal {
            lengths: vec![496, 2048, 4068, 8960],
            seq: "0".repeat(75),
        };
        assert!(!matches(&signal, &gt_wt_01()));
    }

    #[test]
    fn matches_rejects_wrong_length_count() {
        let signal = Signal {
            lengths: vec![496, 2048, 4068],
            seq: "0".repeat(76),
        };
        assert!(!matches(&signal, &gt_wt_01()));
    }

    #[test]
    fn convert_stops_at_terminator_group() {
        let protocol = gt_wt_01();
        let bits = convert("0102030102", &protocol).unwrap();
        assert_eq!(bits, "01");
    }

    #[test]
    fn convert_rejects_unknown_group() {
        let protocol = gt_wt_01();
        let err = convert("0199", &protocol).unwrap_err();
        assert!(matches!(err, MappingError::UnknownGroup { .. }));
    }

    #[test]
    fn convert_rejects_ragged_sequence() {
        let protocol = gt_wt_01();
        let err = convert("010", &protocol).unwrap_err();
        assert!(matches!(err, MappingError::RaggedSequence { .. }));
    }

    #[test]
    fn registry_find_match_picks_gt_wt_01() {
        let registry = ProtocolRegistry::new();
        let signal = Signal {
            lengths: vec![496, 2048, 4068, 8960],
            seq: "0".repeat(76),
        };
        let found = registry.find_match(&signal).unwrap();
        assert_eq!(found.device_kind, DeviceKind::GtWt01);
    }

    #[test]
    fn registry_find_match_returns_none_for_unknown_shape() {
        let registry = ProtocolRegistry::new();
        let signal = Signal {
            lengths: vec![1, 2, 3],
            seq: "0".repeat(5),
        };
        assert!(registry.find_match(&signal).is_none());
    }
}
