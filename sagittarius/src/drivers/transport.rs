use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::io::{split, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tokio::time::{timeout_at, Instant};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, error, info, trace, warn};

use super::BusReply;
use crate::commands::*;
use crate::packets::{FrameDecoder, ServoRequest, ServoResponse};
use crate::{ArmError, ExtractInner, ServoCommand, ServoTelemetry, GRIPPER_SERVO_ID, MAX_INDEXED_SERVOS};
use crate::units::radians_to_wire;

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;
type ResponseSlot = Arc<StdMutex<Option<broadcast::Sender<ServoResponse>>>>;

const RESPONSE_CHANNEL_CAPACITY: usize = 64;

/// Framed link to the servo board.
///
/// A background task decodes every incoming frame and broadcasts the
/// replies. A query subscribes before it writes, then waits for the reply
/// whose command and servo id match, up to its timeout. Writes are
/// serialised through one lock so frames never interleave on the bus.
///
/// Cloning shares the same link.
#[derive(Clone)]
pub struct ServoTransport {
    writer: Arc<Mutex<BoxedWriter>>,
    responses: ResponseSlot,
    reader: AbortHandle,
}

fn lock_slot(slot: &ResponseSlot) -> std::sync::MutexGuard<'_, Option<broadcast::Sender<ServoResponse>>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn validate_servo_id(id: u8) -> Result<(), ArmError> {
    if (1..=GRIPPER_SERVO_ID).contains(&id) {
        Ok(())
    } else {
        Err(ArmError::InvalidServoId(id))
    }
}

impl ServoTransport {
    /// Opens the serial device of a physical arm.
    pub fn open_serial(path: &str, baud_rate: u32) -> Result<Self, ArmError> {
        let port = tokio_serial::new(path, baud_rate)
            .open_native_async()
            .map_err(|e| ArmError::SerialOpen(format!("{}: {}", path, e)))?;
        info!(path, baud_rate, "opened servo serial port");
        Ok(Self::from_stream(port))
    }

    /// Connects to a virtual servo bus listening on TCP.
    pub async fn connect_tcp(addr: &str) -> Result<Self, ArmError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| ArmError::SerialOpen(format!("{}: {}", addr, e)))?;
        info!(addr, "connected to virtual servo bus");
        Ok(Self::from_stream(stream))
    }

    /// Adopts any byte stream. Must be called inside a tokio runtime.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read_half, write_half) = split(stream);
        let (tx, _rx) = broadcast::channel(RESPONSE_CHANNEL_CAPACITY);
        let responses: ResponseSlot = Arc::new(StdMutex::new(Some(tx.clone())));

        let slot = responses.clone();
        let task = tokio::spawn(async move {
            read_frames(read_half, tx).await;
            lock_slot(&slot).take();
        });

        Self {
            writer: Arc::new(Mutex::new(Box::new(write_half))),
            responses,
            reader: task.abort_handle(),
        }
    }

    /// False once the board closed the link or [`shutdown`](Self::shutdown) ran.
    pub fn is_connected(&self) -> bool {
        lock_slot(&self.responses).is_some()
    }

    fn subscribe(&self) -> Result<broadcast::Receiver<ServoResponse>, ArmError> {
        lock_slot(&self.responses)
            .as_ref()
            .map(|tx| tx.subscribe())
            .ok_or(ArmError::Disconnected)
    }

    /// Frames and writes one request. No acknowledgment is awaited.
    pub async fn send(&self, request: &ServoRequest) -> Result<(), ArmError> {
        if !self.is_connected() {
            return Err(ArmError::Disconnected);
        }
        let bytes = request.encode()?;
        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.write_all(&bytes).await {
            let err = ArmError::FailedToSend(e.to_string());
            error!("{}", err);
            return Err(err);
        }
        writer
            .flush()
            .await
            .map_err(|e| ArmError::FailedToSend(e.to_string()))?;
        trace!(command = ?request.command(), len = bytes.len(), "sent frame");
        Ok(())
    }

    /// Moves one servo to an angle in radians.
    pub async fn write_servo(&self, command: ServoCommand) -> Result<(), ArmError> {
        self.write_servo_batch(&[command]).await
    }

    /// Moves up to six servos with a single frame.
    pub async fn write_servo_batch(&self, commands: &[ServoCommand]) -> Result<(), ArmError> {
        if commands.len() > MAX_INDEXED_SERVOS {
            return Err(ArmError::TooManyServos {
                max: MAX_INDEXED_SERVOS,
                got: commands.len(),
            });
        }
        let positions = commands
            .iter()
            .map(|c| {
                validate_servo_id(c.id)?;
                Ok(ServoPosition {
                    id: c.id,
                    tenth_degrees: radians_to_wire(c.value),
                })
            })
            .collect::<Result<Vec<_>, ArmError>>()?;
        debug!(servos = positions.len(), "writing servo positions");
        self.send(&ServoRequest::SetPositionsById(SetPositionsById::new(positions)))
            .await
    }

    /// Polls one servo's telemetry.
    pub async fn read_servo_status(
        &self,
        id: u8,
        timeout: Duration,
    ) -> Result<BusReply<ServoTelemetry>, ArmError> {
        validate_servo_id(id)?;
        let reply = self
            .query::<GetServoInfoResponse>(ServoRequest::GetServoInfo(GetServoInfo::new(id)), id, timeout)
            .await?;
        Ok(reply.map(|r| r.telemetry))
    }

    /// Reads one servo's present angle in radians.
    pub async fn read_position(&self, id: u8, timeout: Duration) -> Result<BusReply<f64>, ArmError> {
        validate_servo_id(id)?;
        let reply = self
            .query::<ReadPositionResponse>(ServoRequest::ReadPosition(ReadPosition::new(id)), id, timeout)
            .await?;
        Ok(reply.map(|r| r.radians()))
    }

    async fn query<T>(
        &self,
        request: ServoRequest,
        id: u8,
        timeout: Duration,
    ) -> Result<BusReply<T>, ArmError>
    where
        ServoResponse: ExtractInner<T>,
    {
        let mut rx = self.subscribe()?;
        let deadline = Instant::now() + timeout;
        self.send(&request).await?;

        loop {
            match timeout_at(deadline, rx.recv()).await {
                Err(_) => {
                    debug!(id, command = ?request.command(), ?timeout, "servo did not answer");
                    return Ok(BusReply::TimedOut);
                }
                Ok(Ok(response)) => {
                    if response.id() != id {
                        continue;
                    }
                    if let Some(inner) = response.into_inner() {
                        return Ok(BusReply::Received(inner));
                    }
                }
                Ok(Err(RecvError::Lagged(skipped))) => {
                    warn!(skipped, "response channel lagged");
                }
                Ok(Err(RecvError::Closed)) => return Err(ArmError::Disconnected),
            }
        }
    }

    /// Stops the reader and closes the write side. Later calls fail with `Disconnected`.
    pub async fn shutdown(&self) {
        self.close_reader();
        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.shutdown().await {
            debug!("closing servo link: {}", e);
        }
    }

    pub(crate) fn close_reader(&self) {
        self.reader.abort();
        lock_slot(&self.responses).take();
    }
}

async fn read_frames<R>(mut reader: R, tx: broadcast::Sender<ServoResponse>)
where
    R: AsyncRead + Unpin,
{
    let mut decoder = FrameDecoder::new();
    let mut buf = vec![0; 256];

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => {
                warn!("servo link closed by peer");
                return;
            }
            Ok(n) => n,
            Err(e) => {
                error!("servo link read failed: {}", e);
                return;
            }
        };

        decoder.push(&buf[..n]);
        while let Some(decoded) = decoder.next_frame() {
            match decoded.and_then(|frame| ServoResponse::from_frame(&frame)) {
                Ok(response) => {
                    trace!(?response, "received");
                    // No subscriber means nobody is waiting; the reply is dropped.
                    let _ = tx.send(response);
                }
                Err(e) => warn!("dropping frame: {}", e),
            }
        }
    }
}
