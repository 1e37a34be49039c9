//! gRPC sensor ingestion service.
//!
//! Supplemental ingestion path grounded in
//! `examples/original_source/receiver/main.go`'s `SensorServer.StreamReadings`
//! — a client-streaming call for sensors that report their own decoded
//! readings rather than raw pulse trains. Every streamed reading still runs
//! through the same reasonableness filter as the serial pipeline before
//! reaching the metrics sink (SPEC_FULL.md §6.2).

use std::sync::Arc;

use tonic::{Request, Response, Status, Streaming};

use crate::config::Config;
use crate::metrics::Metrics;
use crate::protocols::GtWt01Reading;

pub mod proto {
    tonic::include_proto!("rfmeterd");
}

use proto::sensor_reporting_service_server::{SensorReportingService, SensorReportingServiceServer};
use proto::{Ack, SensorReading};

pub struct SensorReportingServer {
    metrics: Arc<Metrics>,
    config: Arc<Config>,
}

impl SensorReportingServer {
    pub fn new(metrics: Arc<Metrics>, config: Arc<Config>) -> Self {
        Self { metrics, config }
    }

    pub fn into_service(self) -> SensorReportingServiceServer<Self> {
        SensorReportingServiceServer::new(self)
    }
}

#[tonic::async_trait]
impl SensorReportingService for SensorReportingServer {
    async fn stream_readings(
        &self,
        request: Request<Streaming<SensorReading>>,
    ) -> Result<Response<Ack>, Status> {
        let mut stream = request.into_inner();
        let mut accepted = 0u32;
        let mut rejected = 0u32;

        while let Some(message) = stream.message().await? {
            let humidity_pct = message.humidity_percent.min(255) as u8;
            let id: u16 = message.id.parse().unwrap_or(0);

            let reading = GtWt01Reading {
                id,
                channel: 0,
                temperature_c: message.temperature_celsius,
                humidity_pct,
                low_battery: false,
            };

            if reading.is_reasonable() {
                self.metrics.observe_gt_wt01(&reading, &self.config);
                accepted += 1;
            } else {
                tracing::debug!(id = message.id, "rejected unreasonable gRPC sensor reading");
                rejected += 1;
            }
        }

        Ok(Response::new(Ack { accepted, rejected }))
    }
}
