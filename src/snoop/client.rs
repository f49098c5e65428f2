use color_eyre::Result;
use color_eyre::eyre::eyre;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info};

use super::{REPLY_LEN, SnoopCommand, SnoopReply};

/// Connects to a set of running monitor instances and periodically snoops
/// their statistics. All connections are established at startup; an
/// unreachable peer is fatal, as is any transport failure or explicit
/// error reply afterwards.
pub struct PeerCollector {
    peers: Vec<Peer>,
}

struct Peer {
    addr: String,
    stream: TcpStream,
}

/// One peer's answer to a sample round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerSample {
    pub addr: String,
    pub entry_count: u32,
}

impl PeerCollector {
    /// Connects to every peer and resets its statistics so the first
    /// collection round starts from a clean window.
    pub async fn connect(addrs: &[String]) -> Result<Self> {
        let mut peers = Vec::with_capacity(addrs.len());
        for addr in addrs {
            let mut stream = TcpStream::connect(addr)
                .await
                .map_err(|err| eyre!("cannot connect to peer {addr}: {err}"))?;
            info!(%addr, "connected to snoop peer");

            let reply = exchange(&mut stream, SnoopCommand::ResetStatistics).await?;
            if !reply.is_ok() {
                return Err(eyre!("peer {addr} rejected initial statistics reset"));
            }
            peers.push(Peer {
                addr: addr.clone(),
                stream,
            });
        }
        Ok(PeerCollector { peers })
    }

    /// One collection round: for each peer, sample its performance
    /// statistics, then reset them so the next round covers a fresh
    /// window. Each request's reply is read before the next is sent.
    pub async fn collect(&mut self) -> Result<Vec<PeerSample>> {
        let mut samples = Vec::with_capacity(self.peers.len());
        for peer in &mut self.peers {
            let reply = exchange(&mut peer.stream, SnoopCommand::SamplePerformance).await?;
            if !reply.is_ok() {
                return Err(eyre!("peer {} returned an error sampling statistics", peer.addr));
            }
            samples.push(PeerSample {
                addr: peer.addr.clone(),
                entry_count: reply.entry_count,
            });

            let reply = exchange(&mut peer.stream, SnoopCommand::ResetStatistics).await?;
            if !reply.is_ok() {
                return Err(eyre!("peer {} returned an error resetting statistics", peer.addr));
            }
        }
        Ok(samples)
    }

    /// Closes all peer connections.
    pub async fn shutdown(mut self) {
        for peer in &mut self.peers {
            debug!(addr = %peer.addr, "closing snoop peer connection");
            let _ = peer.stream.shutdown().await;
        }
    }
}

async fn exchange(stream: &mut TcpStream, command: SnoopCommand) -> Result<SnoopReply> {
    stream
        .write_all(&command.encode())
        .await
        .map_err(|err| eyre!("error writing snoop request: {err}"))?;

    let mut buf = [0u8; REPLY_LEN];
    stream
        .read_exact(&mut buf)
        .await
        .map_err(|err| eyre!("error reading snoop reply: {err}"))?;

    SnoopReply::decode(buf).ok_or_else(|| eyre!("malformed snoop reply"))
}
