//! Network client for the Tacview real-time telemetry protocol.
//!

use std::time::Duration;

use eyre::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{info, trace, warn};

use tacview_engine::RecordSink;

use crate::pump::Pump;

const STREAM_PROTOCOL: &str = "XtraLib.Stream.0";
const TACVIEW_PROTOCOL: &str = "Tacview.RealTimeTelemetry.0";
const CLIENT_NAME: &str = "tacviewctl";
const PASSWORD: &str = "0";

/// The NUL-terminated handshake sent right after connecting.
///
fn handshake() -> Vec<u8> {
    format!("{STREAM_PROTOCOL}\n{TACVIEW_PROTOCOL}\n{CLIENT_NAME}\n{PASSWORD}\0").into_bytes()
}

/// Connect, retrying every few seconds until the server shows up.
///
async fn connect(host: &str, port: u16) -> Result<TcpStream> {
    loop {
        info!("Opening connection to {}:{}…", host, port);
        match TcpStream::connect((host, port)).await {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                warn!("Connection attempt failed ({}), retry in 3s…", e);
                tokio::time::sleep(Duration::from_secs(3)).await;
            }
        }
    }
}

/// Stream lines from a live server through the pump until the server goes
/// away or `max_lines` is reached.
///
#[tracing::instrument(skip(pump))]
pub async fn stream_from<S: RecordSink>(
    host: &str,
    port: u16,
    max_lines: Option<usize>,
    pump: &mut Pump<S>,
) -> Result<()> {
    let mut stream = connect(host, port).await?;
    stream.write_all(&handshake()).await?;

    let mut reader = BufReader::new(stream);

    // The server banner is NUL-terminated, not newline-terminated.
    //
    let mut banner = Vec::new();
    reader.read_until(0, &mut banner).await?;
    trace!("server banner, {} bytes", banner.len());

    let mut lines = reader.lines();
    let mut seen = 0usize;
    while let Some(line) = lines.next_line().await? {
        pump.handle(&line)?;
        seen += 1;
        if matches!(max_lines, Some(max) if seen >= max) {
            info!("{} lines read, stopping as requested", seen);
            break;
        }
    }
    Ok(())
}
