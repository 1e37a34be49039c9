//! Prometheus metrics sink.
//!
//! Metric names and label sets mirror
//! `examples/original_source/receiver/main.go`'s `prometheus/client_golang`
//! registration exactly, per SPEC_FULL.md §6.2.

use axum::{routing::get, Router};
use prometheus::{CounterVec, Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::config::Config;
use crate::protocols::{GrubeReading, GtWt01Reading};

pub struct Metrics {
    registry: Registry,
    temperature: GaugeVec,
    humidity: GaugeVec,
    distance_to_water: GaugeVec,
    location_reporting: CounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let temperature = GaugeVec::new(
            Opts::new("meter_temperature_celsius", "Temperature reported by a sensor"),
            &["id", "location"],
        )?;
        let humidity = GaugeVec::new(
            Opts::new("meter_humidity_percent", "Relative humidity reported by a sensor"),
            &["id", "location"],
        )?;
        let distance_to_water = GaugeVec::new(
            Opts::new(
                "meter_distance_to_water_cm",
                "Distance to water surface reported by the tank monitor",
            ),
            &[] as &[&str],
        )?;
        let location_reporting = CounterVec::new(
            Opts::new("count_location_reporting", "Accepted readings per sensor"),
            &["id", "location"],
        )?;

        registry.register(Box::new(temperature.clone()))?;
        registry.register(Box::new(humidity.clone()))?;
        registry.register(Box::new(distance_to_water.clone()))?;
        registry.register(Box::new(location_reporting.clone()))?;

        Ok(Self {
            registry,
            temperature,
            humidity,
            distance_to_water,
            location_reporting,
        })
    }

    /// Record a GT-WT-01 reading. Per the original's `DecodeSignal`, a
    /// sensor id absent from the configured location table is dropped
    /// rather than reported under an empty label.
    pub fn observe_gt_wt01(&self, reading: &GtWt01Reading, config: &Config) {
        let id = reading.id_label();
        let Some(location) = config.location_for(&id) else {
            tracing::warn!(id, "GT_WT_01 reading from unconfigured sensor id, dropping");
            return;
        };

        self.temperature
            .with_label_values(&[&id, location])
            .set(reading.temperature_c);
        self.humidity
            .with_label_values(&[&id, location])
            .set(reading.humidity_pct as f64);
        self.location_reporting.with_label_values(&[&id, location]).inc();

        if reading.low_battery {
            tracing::warn!(id, location, "GT_WT_01 sensor reports low battery");
        }
    }

    /// Record a Grube reading. Identity is fixed, so there is no
    /// location-lookup drop path — the single physical unit always reports.
    pub fn observe_grube(&self, reading: &GrubeReading) {
        self.distance_to_water
            .with_label_values(&[])
            .set(reading.distance_cm as f64);
        self.temperature
            .with_label_values(&[GrubeReading::ID, GrubeReading::NAME])
            .set(reading.temperature_c);
        self.humidity
            .with_label_values(&[GrubeReading::ID, GrubeReading::NAME])
            .set(reading.humidity_pct);
        self.location_reporting
            .with_label_values(&[GrubeReading::ID, GrubeReading::NAME])
            .inc();
    }

    fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!(error = %e, "failed to encode metrics");
            return String::new();
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

/// Build the `GET /metrics` router served by the axum HTTP server.
pub fn router(metrics: Arc<Metrics>) -> Router {
    Router::new().route(
        "/metrics",
        get(move || {
            let metrics = Arc::clone(&metrics);
            async move { metrics.render() }
        }),
    )
}
