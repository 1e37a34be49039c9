//! Typed readings produced by payload decoders, and the reasonableness
//! filter applied to `GT_WT_01` readings before they reach a sink. Grube
//! readings carry no such filter — the original applies `ReasonableData`
//! only in the `GT_WT_01` case, emitting Grube readings unconditionally.

/// A decoded GT-WT-01 (Globaltronics, "weather15") weather sensor reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GtWt01Reading {
    pub id: u16,
    pub channel: u8,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub low_battery: bool,
}

impl GtWt01Reading {
    /// Label used for the `id` dimension of the metrics sink.
    pub fn id_label(&self) -> String {
        self.id.to_string()
    }

    /// Reject readings outside the sensor's physically plausible range.
    /// Applied unconditionally, per SPEC_FULL.md §9 Open Question 3.
    pub fn is_reasonable(&self) -> bool {
        (-40.0..=80.0).contains(&self.temperature_c) && self.humidity_pct <= 100
    }
}

/// A doorbell press. `old` distinguishes the legacy pulse-length variant
/// purely for diagnostics — both variants notify the same sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorBellEvent {
    pub old: bool,
}

/// A decoded Grube tank-monitor reading. This device family has a single
/// physical unit, so identity is fixed rather than extracted from the
/// payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrubeReading {
    pub distance_cm: u16,
    pub temperature_c: f64,
    pub humidity_pct: f64,
}

impl GrubeReading {
    pub const ID: &'static str = "200";
    pub const NAME: &'static str = "Grube";
}

/// Closed sum type over everything the pipeline can decode. Dispatched by
/// `match`, never by `dyn Trait` — the set of device kinds is fixed by the
/// protocol registry.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    GtWt01(GtWt01Reading),
    DoorBell(DoorBellEvent),
    Grube(GrubeReading),
}
