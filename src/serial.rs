//! Serial line reader.
//!
//! Grounded in `examples/original_source/receiver/arduino.go`'s
//! `Device`/`subscribe` pattern (open the port, scan line by line, forward
//! each line to a channel) — reimplemented as an async task reading from
//! `tokio_serial` instead of the original's blocking `bufio.Scanner`.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_serial::SerialPortBuilderExt;
use tokio_util::sync::CancellationToken;

/// Prefix the original receiver used to distinguish sensor lines from other
/// serial chatter on the same UART.
pub const RECEIVE_PREFIX: &str = "RF receive ";

/// Open `device` at `baud_rate` and forward each line read from it to `tx`
/// until `shutdown` is cancelled or the port errors out. Runs until
/// cancellation; the caller is expected to spawn this as its own task.
pub async fn run(
    device: &str,
    baud_rate: u32,
    tx: mpsc::Sender<String>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let port = tokio_serial::new(device, baud_rate)
        .open_native_async()
        .map_err(|e| anyhow::anyhow!("opening serial device {device}: {e}"))?;

    let mut lines = BufReader::new(port).lines();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("serial reader shutting down");
                return Ok(());
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if tx.send(line).await.is_err() {
                            tracing::warn!("decoder channel closed, stopping serial reader");
                            return Ok(());
                        }
                    }
                    Ok(None) => {
                        tracing::warn!("serial device closed the stream");
                        return Ok(());
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "serial read error");
                        return Err(anyhow::anyhow!("serial read error: {e}"));
                    }
                }
            }
        }
    }
}

/// Strip [`RECEIVE_PREFIX`] from a raw serial line, if present. Lines
/// without the prefix are passed through unchanged — the original did the
/// same, treating the prefix as advisory rather than mandatory.
pub fn strip_prefix(line: &str) -> &str {
    line.strip_prefix(RECEIVE_PREFIX).unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_known_prefix() {
        assert_eq!(strip_prefix("RF receive 100 200 0102"), "100 200 0102");
    }

    #[test]
    fn passes_through_without_prefix() {
        assert_eq!(strip_prefix("100 200 0102"), "100 200 0102");
    }
}
