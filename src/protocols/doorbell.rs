//! Doorbell payload decoders.
//!
//! A doorbell press carries no payload beyond the protocol match itself —
//! unlike `GT_WT_01`/`grube`, the bit string produced by [`super::convert`]
//! is discarded. Two registry entries (`doorbell-old` and `doorbell-old-2`)
//! share [`decode_old`], matching the Open Question decision in
//! SPEC_FULL.md §9 not to distinguish the legacy pulse-length variants
//! downstream.

use super::common::DoorBellEvent;
use super::Reading;
use crate::error::DecodeError;

pub fn decode_new(_bit_str: &str) -> Result<Reading, DecodeError> {
    Ok(Reading::DoorBell(DoorBellEvent { old: false }))
}

pub fn decode_old(_bit_str: &str) -> Result<Reading, DecodeError> {
    Ok(Reading::DoorBell(DoorBellEvent { old: true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_new_is_not_old() {
        let Reading::DoorBell(event) = decode_new("anything").unwrap() else {
            panic!("expected DoorBell reading");
        };
        assert!(!event.old);
    }

    #[test]
    fn decode_old_is_old() {
        let Reading::DoorBell(event) = decode_old("anything").unwrap() else {
            panic!("expected DoorBell reading");
        };
        assert!(event.old);
    }
}
