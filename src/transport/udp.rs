//! FINS/UDP transport.
//!
//! Frames travel unwrapped, one per datagram, on a socket bound to an
//! ephemeral local port and connected to the PLC. There is no handshake; node
//! numbers come from configuration.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{lookup_host, UdpSocket};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::{
    purge_wait, read_slice, with_deadline, ReceivedFrame, SendCounts, Transport, MAX_PACKET_SIZE,
};
use crate::command::MIN_RESPONSE_SIZE;
use crate::error::TransportError;
use crate::header::{is_response_marker, NodeIdentity};

/// FINS/UDP transport.
pub struct UdpTransport {
    endpoint: String,
    socket: Option<UdpSocket>,
}

impl UdpTransport {
    /// Creates a transport for `endpoint` (`host:port`). Nothing is opened yet.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            socket: None,
        }
    }

    /// Returns the remote endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the bound local address, if a socket is open.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }

    fn socket(&self) -> Result<&UdpSocket, TransportError> {
        self.socket.as_ref().ok_or(TransportError::NotConnected)
    }
}

impl Transport for UdpTransport {
    async fn connect(
        &mut self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<Option<NodeIdentity>, TransportError> {
        self.teardown();

        let endpoint = self.endpoint.clone();
        let socket = with_deadline(timeout, cancel, TransportError::ConnectTimeout, async move {
            let remote = lookup_host(endpoint.as_str()).await?.next().ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no address found for {endpoint}"),
                )
            })?;
            let local = if remote.is_ipv4() {
                "0.0.0.0:0"
            } else {
                "[::]:0"
            };
            let socket = UdpSocket::bind(local).await?;
            socket.connect(remote).await?;
            Ok::<_, TransportError>(socket)
        })
        .await?;

        debug!(
            endpoint = %self.endpoint,
            local_addr = ?socket.local_addr().ok(),
            "FINS/UDP socket ready"
        );
        self.socket = Some(socket);
        Ok(None)
    }

    async fn send(
        &mut self,
        frame: &[u8],
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<SendCounts, TransportError> {
        let socket = self.socket()?;
        let sent = with_deadline(timeout, cancel, TransportError::SendTimeout, async {
            Ok::<_, TransportError>(socket.send(frame).await?)
        })
        .await?;

        Ok(SendCounts {
            bytes: sent,
            packets: 1,
        })
    }

    async fn receive(
        &mut self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<ReceivedFrame, TransportError> {
        let socket = self.socket()?;
        let deadline = Instant::now() + timeout;
        let mut received = ReceivedFrame {
            frame: Vec::new(),
            bytes: 0,
            packets: 0,
        };
        let mut datagram = [0u8; MAX_PACKET_SIZE];

        while received.frame.len() < MIN_RESPONSE_SIZE {
            let Some(slice) = read_slice(deadline) else {
                return Err(if received.bytes == 0 {
                    TransportError::NoDataReceived
                } else {
                    TransportError::ReceiveTimeout {
                        received: received.bytes,
                        expected: MIN_RESPONSE_SIZE,
                    }
                });
            };

            let read = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TransportError::Cancelled),
                read = tokio::time::timeout(slice, socket.recv(&mut datagram)) => read,
            };

            match read {
                Err(_) => continue,
                Ok(Ok(count)) => {
                    received.frame.extend_from_slice(&datagram[..count]);
                    received.bytes += count;
                    received.packets += 1;
                }
                Ok(Err(e)) => return Err(e.into()),
            }
        }

        if !is_response_marker(received.frame[0]) {
            return Err(TransportError::InvalidFinsHeader(received.frame[0]));
        }

        Ok(received)
    }

    async fn purge(&mut self, budget: Duration, cancel: &CancellationToken) {
        if !purge_wait(budget, cancel).await {
            return;
        }

        if let Some(socket) = &self.socket {
            let mut datagram = [0u8; MAX_PACKET_SIZE];
            let mut discarded = 0usize;
            while let Ok(count) = socket.try_recv(&mut datagram) {
                discarded += count;
            }
            trace!(endpoint = %self.endpoint, discarded, "purged FINS/UDP socket");
        }
    }

    fn teardown(&mut self) {
        self.socket = None;
    }

    fn verifies_service_id(&self) -> bool {
        false
    }
}

impl std::fmt::Debug for UdpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpTransport")
            .field("endpoint", &self.endpoint)
            .field("local_addr", &self.local_addr())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn peer() -> (UdpSocket, String) {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let address = socket.local_addr().unwrap().to_string();
        (socket, address)
    }

    #[tokio::test]
    async fn test_connect_binds_ephemeral_port() {
        let (_plc, address) = peer().await;
        let mut transport = UdpTransport::new(address);
        let nodes = transport
            .connect(Duration::from_secs(1), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(nodes, None);
        assert!(transport.local_addr().is_some());
        assert!(format!("{transport:?}").contains("UdpTransport"));
    }

    #[tokio::test]
    async fn test_send_and_receive_datagram() {
        let (plc, address) = peer().await;
        let cancel = CancellationToken::new();
        let mut transport = UdpTransport::new(address);
        transport.connect(Duration::from_secs(1), &cancel).await.unwrap();

        let sent = transport
            .send(&[0x80, 0x00, 0x02], Duration::from_secs(1), &cancel)
            .await
            .unwrap();
        assert_eq!(sent, SendCounts { bytes: 3, packets: 1 });

        let mut request = [0u8; 64];
        let (length, client) = plc.recv_from(&mut request).await.unwrap();
        assert_eq!(&request[..length], &[0x80, 0x00, 0x02]);

        let reply = [0xC0, 0, 2, 0, 1, 0, 0, 2, 0, 1, 0x07, 0x01, 0, 0, 0x24];
        plc.send_to(&reply, client).await.unwrap();

        let received = transport.receive(Duration::from_secs(1), &cancel).await.unwrap();
        assert_eq!(received.frame, reply.to_vec());
        assert_eq!(received.packets, 1);
    }

    #[tokio::test]
    async fn test_receive_no_data() {
        let (_plc, address) = peer().await;
        let cancel = CancellationToken::new();
        let mut transport = UdpTransport::new(address);
        transport.connect(Duration::from_secs(1), &cancel).await.unwrap();

        let result = transport.receive(Duration::from_millis(120), &cancel).await;
        assert!(matches!(result, Err(TransportError::NoDataReceived)));
    }

    #[tokio::test]
    async fn test_receive_rejects_non_response_marker() {
        let (plc, address) = peer().await;
        let cancel = CancellationToken::new();
        let mut transport = UdpTransport::new(address);
        transport.connect(Duration::from_secs(1), &cancel).await.unwrap();
        transport
            .send(&[0x80], Duration::from_secs(1), &cancel)
            .await
            .unwrap();

        let mut scratch = [0u8; 16];
        let (_, client) = plc.recv_from(&mut scratch).await.unwrap();
        plc.send_to(&[0x80; 14], client).await.unwrap();

        let result = transport.receive(Duration::from_secs(1), &cancel).await;
        assert!(matches!(result, Err(TransportError::InvalidFinsHeader(0x80))));
    }

    #[tokio::test]
    async fn test_purge_discards_pending_datagrams() {
        let (plc, address) = peer().await;
        let cancel = CancellationToken::new();
        let mut transport = UdpTransport::new(address);
        transport.connect(Duration::from_secs(1), &cancel).await.unwrap();
        transport
            .send(&[0x80], Duration::from_secs(1), &cancel)
            .await
            .unwrap();

        let mut scratch = [0u8; 16];
        let (_, client) = plc.recv_from(&mut scratch).await.unwrap();
        plc.send_to(&[0xC0; 14], client).await.unwrap();

        transport.purge(Duration::from_millis(50), &cancel).await;
        let result = transport.receive(Duration::from_millis(100), &cancel).await;
        assert!(matches!(result, Err(TransportError::NoDataReceived)));
    }
}
