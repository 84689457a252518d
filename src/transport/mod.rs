//! Transport layer for FINS communication.
//!
//! A transport moves FINS frames between this client and a PLC. It knows about
//! sockets, envelopes and deadlines, never about FINS commands: the
//! [`Channel`](crate::Channel) encodes requests and decodes responses.
//!
//! Two variants exist:
//!
//! - [`TcpTransport`] wraps every frame in a 16-byte `FINS` envelope and
//!   negotiates node numbers with the PLC when it connects.
//! - [`UdpTransport`] sends frames unwrapped on a datagram socket connected to
//!   the PLC. Node numbers come from configuration.
//!
//! [`EthernetTransport`] selects one of them at runtime from a
//! [`ConnectionMethod`].
//!
//! # Deadlines
//!
//! Every receive call computes one deadline and re-checks the remaining time
//! before each socket read. No read is issued once less than
//! [`MIN_READ_SLICE`] remains. A receive that got nothing at all reports
//! [`TransportError::NoDataReceived`]; one that got some but not enough bytes
//! reports [`TransportError::ReceiveTimeout`].
//!
//! # Cancellation
//!
//! Every suspending call takes a [`CancellationToken`]. When it fires the call
//! returns [`TransportError::Cancelled`] and the connection must be considered
//! unusable.

mod tcp;
mod udp;

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::TransportError;
use crate::header::NodeIdentity;

pub use tcp::TcpTransport;
pub use udp::UdpTransport;

/// Default FINS port for both TCP and UDP.
pub const DEFAULT_FINS_PORT: u16 = 9600;

/// Default timeout for one connect, send or receive.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

/// Smallest remaining time for which a socket read is still issued.
pub const MIN_READ_SLICE: Duration = Duration::from_millis(50);

/// Maximum datagram size read by the UDP transport.
pub const MAX_PACKET_SIZE: usize = 2048;

/// Selects the transport variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConnectionMethod {
    /// FINS/TCP with envelope and node negotiation.
    #[default]
    Tcp,
    /// FINS/UDP, unframed datagrams.
    Udp,
}

impl std::fmt::Display for ConnectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionMethod::Tcp => write!(f, "TCP"),
            ConnectionMethod::Udp => write!(f, "UDP"),
        }
    }
}

/// Byte and packet counts of one send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SendCounts {
    /// Bytes written to the socket.
    pub bytes: usize,
    /// Packets written to the socket.
    pub packets: usize,
}

/// A received FINS frame and the socket activity needed to assemble it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedFrame {
    /// FINS bytes, starting with the response header.
    pub frame: Vec<u8>,
    /// Bytes read from the socket, envelope included.
    pub bytes: usize,
    /// Socket reads that returned data.
    pub packets: usize,
}

/// Capability set a [`Channel`](crate::Channel) needs from a connection.
///
/// Implementations own at most one live socket. `connect` always starts from
/// a clean state, tearing down any previous socket first.
pub trait Transport: Send {
    /// Opens the connection.
    ///
    /// Returns the node numbers assigned by the PLC, or `None` when the
    /// transport does not negotiate them.
    fn connect(
        &mut self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Option<NodeIdentity>, TransportError>> + Send;

    /// Sends one FINS frame.
    fn send(
        &mut self,
        frame: &[u8],
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<SendCounts, TransportError>> + Send;

    /// Receives one FINS frame.
    fn receive(
        &mut self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<ReceivedFrame, TransportError>> + Send;

    /// Waits up to `budget`, then discards anything left unread.
    ///
    /// Best effort: failures and cancellation end the purge silently.
    fn purge(
        &mut self,
        budget: Duration,
        cancel: &CancellationToken,
    ) -> impl Future<Output = ()> + Send;

    /// Closes the socket and forgets any buffered data.
    fn teardown(&mut self);

    /// Whether responses echo the request's service ID reliably.
    fn verifies_service_id(&self) -> bool;
}

/// Transport chosen at runtime from a [`ConnectionMethod`].
#[derive(Debug)]
pub enum EthernetTransport {
    /// FINS/TCP.
    Tcp(TcpTransport),
    /// FINS/UDP.
    Udp(UdpTransport),
}

impl EthernetTransport {
    /// Creates the transport for `method`, targeting `endpoint` (`host:port`).
    ///
    /// No socket is opened until [`Transport::connect`].
    pub fn new(method: ConnectionMethod, endpoint: impl Into<String>) -> Self {
        match method {
            ConnectionMethod::Tcp => Self::Tcp(TcpTransport::new(endpoint)),
            ConnectionMethod::Udp => Self::Udp(UdpTransport::new(endpoint)),
        }
    }

    /// Returns the variant's connection method.
    pub fn method(&self) -> ConnectionMethod {
        match self {
            Self::Tcp(_) => ConnectionMethod::Tcp,
            Self::Udp(_) => ConnectionMethod::Udp,
        }
    }
}

impl Transport for EthernetTransport {
    async fn connect(
        &mut self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<Option<NodeIdentity>, TransportError> {
        match self {
            Self::Tcp(tcp) => tcp.connect(timeout, cancel).await,
            Self::Udp(udp) => udp.connect(timeout, cancel).await,
        }
    }

    async fn send(
        &mut self,
        frame: &[u8],
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<SendCounts, TransportError> {
        match self {
            Self::Tcp(tcp) => tcp.send(frame, timeout, cancel).await,
            Self::Udp(udp) => udp.send(frame, timeout, cancel).await,
        }
    }

    async fn receive(
        &mut self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<ReceivedFrame, TransportError> {
        match self {
            Self::Tcp(tcp) => tcp.receive(timeout, cancel).await,
            Self::Udp(udp) => udp.receive(timeout, cancel).await,
        }
    }

    async fn purge(&mut self, budget: Duration, cancel: &CancellationToken) {
        match self {
            Self::Tcp(tcp) => tcp.purge(budget, cancel).await,
            Self::Udp(udp) => udp.purge(budget, cancel).await,
        }
    }

    fn teardown(&mut self) {
        match self {
            Self::Tcp(tcp) => tcp.teardown(),
            Self::Udp(udp) => udp.teardown(),
        }
    }

    fn verifies_service_id(&self) -> bool {
        match self {
            Self::Tcp(tcp) => tcp.verifies_service_id(),
            Self::Udp(udp) => udp.verifies_service_id(),
        }
    }
}

/// Time left before `deadline`, or `None` once it drops below [`MIN_READ_SLICE`].
pub(crate) fn read_slice(deadline: Instant) -> Option<Duration> {
    let remaining = deadline.saturating_duration_since(Instant::now());
    (remaining >= MIN_READ_SLICE).then_some(remaining)
}

/// Runs `operation` with a timeout, aborting early if `cancel` fires.
pub(crate) async fn with_deadline<T, F>(
    timeout: Duration,
    cancel: &CancellationToken,
    elapsed: TransportError,
    operation: F,
) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(TransportError::Cancelled),
        result = tokio::time::timeout(timeout, operation) => match result {
            Ok(inner) => inner,
            Err(_) => Err(elapsed),
        },
    }
}

/// Sleeps for `budget` unless cancelled first.
pub(crate) async fn purge_wait(budget: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(budget) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_FINS_PORT, 9600);
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(2));
        assert_eq!(MIN_READ_SLICE, Duration::from_millis(50));
    }

    #[test]
    fn test_ethernet_transport_variant() {
        let tcp = EthernetTransport::new(ConnectionMethod::Tcp, "127.0.0.1:9600");
        assert_eq!(tcp.method(), ConnectionMethod::Tcp);
        assert!(tcp.verifies_service_id());

        let udp = EthernetTransport::new(ConnectionMethod::Udp, "127.0.0.1:9600");
        assert_eq!(udp.method(), ConnectionMethod::Udp);
        assert!(!udp.verifies_service_id());
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_slice_stops_near_deadline() {
        let deadline = Instant::now() + Duration::from_millis(120);
        assert!(read_slice(deadline).is_some());

        tokio::time::advance(Duration::from_millis(80)).await;
        assert!(read_slice(deadline).is_none());
    }

    #[tokio::test]
    async fn test_with_deadline_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result: Result<(), _> = with_deadline(
            Duration::from_secs(1),
            &cancel,
            TransportError::SendTimeout,
            std::future::pending(),
        )
        .await;
        assert!(matches!(result, Err(TransportError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_deadline_elapsed() {
        let cancel = CancellationToken::new();
        let result: Result<(), _> = with_deadline(
            Duration::from_millis(10),
            &cancel,
            TransportError::ConnectTimeout,
            std::future::pending(),
        )
        .await;
        assert!(matches!(result, Err(TransportError::ConnectTimeout)));
    }
}
