use std::error::Error;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use sagittarius::packets::{FrameDecoder, ServoRequest};

use crate::VirtualArm;

/// Serves one host connection until it closes.
pub async fn serve<S>(mut stream: S, arm: Arc<Mutex<VirtualArm>>) -> Result<(), Box<dyn Error + Send + Sync>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut decoder = FrameDecoder::new();
    let mut buffer = vec![0; 1024];

    loop {
        let n = stream.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        decoder.push(&buffer[..n]);

        while let Some(decoded) = decoder.next_frame() {
            let request = match decoded.and_then(|frame| ServoRequest::from_frame(&frame)) {
                Ok(request) => request,
                Err(e) => {
                    warn!("Failed to decode request: {}", e);
                    arm.lock().await.record_rejected_frame();
                    continue;
                }
            };
            let reply = arm.lock().await.handle(request);
            if let Some(reply) = reply {
                stream.write_all(&reply.encode()?).await?;
            }
        }
    }

    info!("host disconnected");
    Ok(())
}

/// Accepts TCP connections forever, all sharing one virtual arm.
pub async fn run(addr: &str, arm: Arc<Mutex<VirtualArm>>) -> Result<(), Box<dyn Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr, "virtual servo bus listening");

    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Failed to accept connection: {}", e);
                continue;
            }
        };
        info!(%peer, "host connected");

        let arm = Arc::clone(&arm);
        tokio::spawn(async move {
            if let Err(e) = serve(socket, arm).await {
                error!("Error serving host: {:?}", e);
            }
        });
    }
}
