//! Stream bridge between a PTY and a remote duplex channel
//!
//! Two independent pumps per session:
//!
//! ```text
//! PTY master ──read──▶ [output task] ──Frame::Binary──▶ remote sink
//! PTY master ◀─write── [caller task] ◀──Frame──────────  remote stream
//! ```
//!
//! When the process side finishes, the output task closes the remote sink.
//! When the remote side finishes, the caller task kills the process. Either
//! way the PTY is closed before [`bridge`] returns.

use crate::attached::AttachedProcess;
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::Deserialize;
use std::fmt::Display;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, warn};

/// How long the output pump may keep draining after the process was killed
const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// How long a process may linger after its PTY closed before it is killed
const EXIT_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// A message on the remote channel.
///
/// The payload is exactly the PTY byte stream; there is no envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Raw bytes (always used for process output)
    Binary(Vec<u8>),
    /// UTF-8 text (accepted as input)
    Text(String),
}

/// Which side ended the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeEnd {
    /// The PTY hit EOF or a read error
    ProcessExited,
    /// The remote stream ended or failed
    RemoteClosed,
}

/// Summary of a finished bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeOutcome {
    /// Which side ended the session
    pub end: BridgeEnd,
    /// Exit code of the process, when it exited normally
    pub exit_code: Option<i32>,
    /// Bytes forwarded from the PTY to the remote side
    pub bytes_out: u64,
    /// Bytes written from the remote side to the PTY
    pub bytes_in: u64,
}

/// Terminal dimensions requested by the remote side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermSize {
    /// Rows
    pub rows: u16,
    /// Columns
    pub cols: u16,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ControlMessage {
    Resize { cols: u16, rows: u16 },
}

/// Recognize a `{"type":"resize","cols":N,"rows":M}` text frame.
#[must_use]
pub fn parse_resize(text: &str) -> Option<TermSize> {
    if !text.trim_start().starts_with('{') {
        return None;
    }
    match serde_json::from_str::<ControlMessage>(text) {
        Ok(ControlMessage::Resize { cols, rows }) if cols > 0 && rows > 0 => {
            Some(TermSize { rows, cols })
        }
        _ => None,
    }
}

/// Pump bytes between `process` and the remote channel until either side
/// closes.
///
/// Output is sent on `sink` as [`Frame::Binary`]; every frame read from
/// `stream` is written to the PTY verbatim, except resize requests. A stream
/// error counts as a disconnect.
pub async fn bridge<Tx, Rx, E>(
    process: AttachedProcess,
    sink: Tx,
    stream: Rx,
    buffer_size: usize,
) -> BridgeOutcome
where
    Tx: Sink<Frame> + Send + 'static,
    Tx::Error: Display + Send,
    Rx: Stream<Item = Result<Frame, E>>,
    E: Display,
{
    let AttachedProcess { mut child, pty } = process;
    let (reader, mut writer) = pty.into_split();

    let mut output = tokio::spawn(pump_output(reader, sink, buffer_size));
    tokio::pin!(stream);

    let mut bytes_in = 0u64;
    let mut pumped = None;

    let end = loop {
        tokio::select! {
            result = &mut output => {
                let result = result.unwrap_or_default();
                let end = if result.remote_failed {
                    BridgeEnd::RemoteClosed
                } else {
                    BridgeEnd::ProcessExited
                };
                pumped = Some(result);
                break end;
            }
            frame = stream.next() => match frame {
                Some(Ok(frame)) => {
                    if let Frame::Text(text) = &frame {
                        if let Some(size) = parse_resize(text) {
                            if let Err(e) = writer.resize(pty_process::Size::new(size.rows, size.cols)) {
                                warn!(error = %e, "Failed to resize PTY");
                            }
                            continue;
                        }
                    }
                    let payload = match frame {
                        Frame::Binary(bytes) => bytes,
                        Frame::Text(text) => text.into_bytes(),
                    };
                    let written = async {
                        writer.write_all(&payload).await?;
                        writer.flush().await
                    };
                    match written.await {
                        Ok(()) => bytes_in += payload.len() as u64,
                        // The output pump sees the same failure and ends the session.
                        Err(e) => debug!(error = %e, "PTY write failed"),
                    }
                }
                Some(Err(e)) => {
                    debug!(error = %e, "Remote read failed");
                    break BridgeEnd::RemoteClosed;
                }
                None => break BridgeEnd::RemoteClosed,
            },
        }
    };

    let exit_code = match end {
        BridgeEnd::RemoteClosed => {
            info!("Remote side disconnected, terminating process");
            terminate(&mut child).await
        }
        BridgeEnd::ProcessExited => {
            match tokio::time::timeout(EXIT_GRACE_PERIOD, child.wait()).await {
                Ok(status) => status.ok().and_then(|s| s.code()),
                Err(_) => {
                    warn!("PTY closed but process still running, terminating");
                    terminate(&mut child).await
                }
            }
        }
    };
    drop(writer);

    let bytes_out = match pumped {
        Some(result) => result.bytes,
        None => match tokio::time::timeout(OUTPUT_DRAIN_TIMEOUT, &mut output).await {
            Ok(result) => result.unwrap_or_default().bytes,
            Err(_) => {
                warn!("Output pump did not finish in time, aborting");
                output.abort();
                0
            }
        },
    };

    info!(?end, ?exit_code, bytes_out, bytes_in, "Bridge finished");
    BridgeOutcome {
        end,
        exit_code,
        bytes_out,
        bytes_in,
    }
}

async fn terminate(child: &mut tokio::process::Child) -> Option<i32> {
    if let Err(e) = child.start_kill() {
        debug!(error = %e, "Process already gone");
    }
    child.wait().await.ok().and_then(|status| status.code())
}

/// Result of the process-to-remote pump
#[derive(Debug, Default)]
pub(crate) struct PumpResult {
    /// Bytes forwarded
    pub bytes: u64,
    /// Whether the pump stopped because the remote sink rejected a frame
    pub remote_failed: bool,
}

/// Forward everything readable from `reader` to `sink`, then close the sink.
pub(crate) async fn pump_output<R, Tx>(reader: R, sink: Tx, buffer_size: usize) -> PumpResult
where
    R: AsyncRead,
    Tx: Sink<Frame>,
    Tx::Error: Display,
{
    tokio::pin!(reader);
    tokio::pin!(sink);

    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut result = PumpResult::default();
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => {
                debug!("PTY reached EOF");
                break;
            }
            Ok(n) => {
                if let Err(e) = sink.send(Frame::Binary(buf[..n].to_vec())).await {
                    debug!(error = %e, "Remote write failed");
                    result.remote_failed = true;
                    break;
                }
                result.bytes += n as u64;
            }
            Err(e) => {
                // Linux reports EIO once the slave side is gone.
                debug!(error = %e, "PTY read ended");
                break;
            }
        }
    }

    if let Err(e) = sink.close().await {
        debug!(error = %e, "Failed to close remote sink");
    }
    result
}
