//! GT-WT-01 (Globaltronics "weather15" family) payload decoder.
//!
//! Field layout bit-exact per `examples/original_source/receiver/protocol.go`
//! `Protocol.Decode` for `GT_WT_01`:
//!   id          = bits[0:12)   unsigned
//!   low_battery = bit[12]
//!   (bit 13 unused/reserved)
//!   channel     = bits[14:16) unsigned + 1
//!   temperature = bits[16:28) signed / 10.0
//!   humidity    = bits[28:36) unsigned

use super::bits;
use super::common::GtWt01Reading;
use super::Reading;
use crate::error::{DecodeError, PayloadDecodeError};

const PROTOCOL: &str = "GT_WT_01";

pub fn decode(bit_str: &str) -> Result<Reading, DecodeError> {
    let bits = bits::parse(bit_str);

    let id = bits::unsigned(&bits, 0, 12)
        .map_err(|reason| payload_err("id", reason))?
        as u16;
    let low_battery = bits::unsigned(&bits, 12, 13).map_err(|reason| payload_err("low_battery", reason))? != 0;
    let channel = bits::unsigned(&bits, 14, 16).map_err(|reason| payload_err("channel", reason))? as u8 + 1;
    let temperature_raw = bits::signed(&bits, 16, 28).map_err(|reason| payload_err("temperature", reason))?;
    let humidity_pct = bits::unsigned(&bits, 28, 36).map_err(|reason| payload_err("humidity", reason))? as u8;

    let reading = GtWt01Reading {
        id,
        channel,
        temperature_c: temperature_raw as f64 / 10.0,
        humidity_pct,
        low_battery,
    };

    if !reading.is_reasonable() {
        return Err(DecodeError::Unreasonable(format!(
            "GT_WT_01 id={id} temperature={}C humidity={humidity_pct}%",
            reading.temperature_c
        )));
    }

    Ok(Reading::GtWt01(reading))
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

    fn bit_string(id: u16, low_battery: bool, channel0: u8, temp_raw: i16, humidity: u8) -> String {
        let mut out = String::new();
        for i in (0..12).rev() {
            out.push(if (id >> i) & 1 == 1 { '1' } else { '0' });
        }
        out.push(if low_battery { '1' } else { '0' });
        out.push('0'); // reserved bit 13
        for i in (0..2).rev() {
            out.push(if (channel0 >> i) & 1 == 1 { '1' } else { '0' });
        }
        let temp_bits = temp_raw as u16 & 0x0FFF;
        for i in (0..12).rev() {
            out.push(if (temp_bits >> i) & 1 == 1 { '1' } else { '0' });
        }
        for i in (0..8).rev() {
            out.push(if (humidity >> i) & 1 == 1 { '1' } else { '0' });
        }
        out
    }

    #[test]
    fn decodes_a_plausible_reading() {
        let bit_str = bit_string(0x0AB, false, 1, 215, 45);
        let Reading::GtWt01(reading) = decode(&bit_str).unwrap() else {
            panic!("expected GtWt01 reading");
        };
        assert_eq!(reading.id, 0x0AB);
        assert_eq!(reading.channel, 2);
        assert!((reading.temperature_c - 21.5).abs() < 1e-9);
        assert_eq!(reading.humidity_pct, 45);
        assert!(!reading.low_battery);
    }

    #[test]
    fn decodes_negative_temperature() {
        let bit_str = bit_string(1, true, 0, -55, 60);
        let Reading::GtWt01(reading) = decode(&bit_str).unwrap() else {
            panic!("expected GtWt01 reading");
        };
        assert!((reading.temperature_c - (-5.5)).abs() < 1e-9);
        assert!(reading.low_battery);
        assert_eq!(reading.channel, 1);
    }

    #[test]
    fn rejects_unreasonable_temperature() {
        let bit_str = bit_string(1, false, 0, 900, 50);
        let err = decode(&bit_str).unwrap_err();
        assert!(matches!(err, DecodeError::Unreasonable(_)));
    }

    #[test]
    fn rejects_too_short_bit_string() {
        let err = decode("0101").unwrap_err();
        assert!(matches!(err, DecodeError::Payload(_)));
    }
}
