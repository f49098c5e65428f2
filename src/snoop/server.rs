use std::net::SocketAddr;

use color_eyre::Result;
use color_eyre::eyre::eyre;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{REQUEST_LEN, SnoopCommand, SnoopReply};

/// One decoded request plus the channel its reply must be sent down. The
/// polling loop answers between cycles, so a connection never observes a
/// half-built snapshot.
#[derive(Debug)]
pub struct SnoopMessage {
    pub command: SnoopCommand,
    pub reply_tx: oneshot::Sender<SnoopReply>,
}

/// Binds the listener and spawns the accept loop. Returns the bound
/// address (so callers may bind port 0) and the task handle. A bind
/// failure is fatal at startup.
pub async fn start(
    listen: SocketAddr,
    tx: mpsc::Sender<SnoopMessage>,
) -> Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind(listen)
        .await
        .map_err(|err| eyre!("cannot bind snoop listener on {listen}: {err}"))?;
    let local_addr = listener.local_addr()?;
    info!("snoop protocol listening at {local_addr}");

    let task = tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, peer_addr)) => {
                    debug!(%peer_addr, "snoop connection accepted");
                    tokio::spawn(serve_connection(stream, tx.clone()));
                }
                Err(err) => {
                    warn!(%err, "snoop accept failed");
                    break;
                }
            }
        }
    });

    Ok((local_addr, task))
}

async fn serve_connection(mut stream: TcpStream, tx: mpsc::Sender<SnoopMessage>) {
    loop {
        let mut buf = [0u8; REQUEST_LEN];
        if stream.read_exact(&mut buf).await.is_err() {
            // Peer closed the connection; this is the normal end of a session.
            return;
        }

        let reply = match SnoopCommand::decode(buf) {
            Some(command) => {
                let (reply_tx, reply_rx) = oneshot::channel();
                if tx.send(SnoopMessage { command, reply_tx }).await.is_err() {
                    return;
                }
                reply_rx.await.unwrap_or_else(|_| SnoopReply::error())
            }
            None => {
                debug!("malformed snoop request");
                SnoopReply::error()
            }
        };

        if stream.write_all(&reply.encode()).await.is_err() {
            return;
        }
    }
}
