//! Grube tank-monitor payload decoder.
//!
//! Field layout bit-exact per
//! `examples/original_source/receiver/protocol.go` `Protocol.Decode` for
//! `grube`: distance = bits[0:16) unsigned, temperature = bits[16:32)
//! signed / 10.0, humidity = bits[32:48) unsigned / 10.0. Identity is fixed
//! (`GrubeReading::ID`/`GrubeReading::NAME`) — there is exactly one physical
//! unit, so the payload carries no device identifier.
//!
//! Unlike `GT_WT_01`, no reasonableness filter is applied here: the original
//! calls `ReasonableData()` only in the `GT_WT_01` case and emits Grube
//! readings unconditionally.

use super::bits;
use super::common::GrubeReading;
use super::Reading;
use crate::error::{DecodeError, PayloadDecodeError};

const PROTOCOL: &str = "grube";

pub fn decode(bit_str: &str) -> Result<Reading, DecodeError> {
    let bits = bits::parse(bit_str);

    let distance_cm = bits::unsigned(&bits, 0, 16).map_err(|reason| payload_err("distance_cm", reason))? as u16;
    let temperature_raw = bits::signed(&bits, 16, 32).map_err(|reason| payload_err("temperature", reason))?;
    let humidity_raw = bits::unsigned(&bits, 32, 48).map_err(|reason| payload_err("humidity", reason))?;

    Ok(Reading::Grube(GrubeReading {
        distance_cm,
        temperature_c: temperature_raw as f64 / 10.0,
        humidity_pct: humidity_raw as f64 / 10.0,
    }))
}

fn payload_err(field: &'static str, reason: String) -> DecodeError {
    DecodeError::Payload(PayloadDecodeError {
        protocol: PROTOCOL,
        field,
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bit_string(distance: u16, temp_raw: i16, humidity_raw: u16) -> String {
        let mut out = String::new();
        for i in (0..16).rev() {
            out.push(if (distance >> i) & 1 == 1 { '1' } else { '0' });
        }
        let temp_bits = temp_raw as u16;
        for i in (0..16).rev() {
            out.push(if (temp_bits >> i) & 1 == 1 { '1' } else { '0' });
        }
        for i in (0..16).rev() {
            out.push(if (humidity_raw >> i) & 1 == 1 { '1' } else { '0' });
        }
        out
    }

    #[test]
    fn decodes_a_plausible_reading() {
        let bit_str = bit_string(120, 223, 455);
        let Reading::Grube(reading) = decode(&bit_str).unwrap() else {
            panic!("expected Grube reading");
        };
        assert_eq!(reading.distance_cm, 120);
        assert!((reading.temperature_c - 22.3).abs() < 1e-9);
        assert!((reading.humidity_pct - 45.5).abs() < 1e-9);
    }

    #[test]
    fn decodes_negative_temperature() {
        let bit_str = bit_string(50, -120, 300);
        let Reading::Grube(reading) = decode(&bit_str).unwrap() else {
            panic!("expected Grube reading");
        };
        assert!((reading.temperature_c - (-12.0)).abs() < 1e-9);
    }

    #[test]
    fn emits_unconditionally_even_outside_gt_wt_01_style_bounds() {
        // Grube has no reasonableness filter; a humidity value that would be
        // rejected for GT_WT_01 (>100%) must still be emitted here.
        let bit_str = bit_string(50, 100, 2000);
        let Reading::Grube(reading) = decode(&bit_str).unwrap() else {
            panic!("expected Grube reading");
        };
        assert!((reading.humidity_pct - 200.0).abs() < 1e-9);
    }

    #[test]
    fn identity_is_fixed() {
        assert_eq!(GrubeReading::ID, "200");
        assert_eq!(GrubeReading::NAME, "Grube");
    }
}
