//! Request execution over one PLC connection.
//!
//! A [`Channel`] owns a single [`Transport`] and runs one request at a time on
//! it. Each attempt holds the channel lock for its whole
//! reconnect-send-receive-decode cycle, so concurrent callers never interleave
//! bytes on the wire. Requests are admitted in lock order.
//!
//! # Retry
//!
//! `execute` makes at most `retries + 1` attempts. Every attempt after the
//! first starts by tearing down and re-opening the connection, which on TCP
//! also renegotiates node numbers. Transport and protocol faults are both
//! retried. Cancellation is not: it ends the call immediately.
//!
//! A response whose service ID does not match the request triggers a short
//! best-effort purge of the receive side before the fault is handled, so the
//! next attempt starts from a clean stream.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use omron_fins_channel::{
//!     Channel, ConnectionMethod, EthernetTransport, FinsRequest, MemoryArea, NodeIdentity,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> omron_fins_channel::Result<()> {
//! let endpoint = "192.168.1.10:9600";
//! let transport = EthernetTransport::new(ConnectionMethod::Tcp, endpoint);
//! let channel = Channel::new(endpoint, transport, NodeIdentity::new(1, 10));
//!
//! let cancel = CancellationToken::new();
//! channel.initialize(Duration::from_secs(2), &cancel).await?;
//!
//! let request = FinsRequest::read_words(MemoryArea::DM, 100, 10);
//! let processed = channel
//!     .execute(&request, Duration::from_secs(2), 1, &cancel)
//!     .await?;
//! println!("{} bytes received", processed.stats.bytes_received);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::FinsRequest;
use crate::error::{FinsError, ProtocolError, Result, TransportError};
use crate::header::NodeIdentity;
use crate::response::FinsResponse;
use crate::transport::{EthernetTransport, Transport};

/// Lifecycle state of a [`Channel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelState {
    /// `initialize` has not completed yet.
    Uninitialized,
    /// The last operation left a usable connection.
    Connected,
    /// A retry tore the connection down and has not finished re-opening it.
    /// Only observable when an `execute` future is dropped mid-reconnect; the
    /// next call reconnects again.
    Reconnecting,
    /// The last attempt failed at the transport level; the next one reconnects.
    Faulted,
    /// `dispose` was called. Terminal.
    Disposed,
}

/// Cumulative socket activity and elapsed time of one `execute` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferStats {
    /// Bytes written, envelopes included.
    pub bytes_sent: usize,
    /// Packets written.
    pub packets_sent: usize,
    /// Bytes read, envelopes included.
    pub bytes_received: usize,
    /// Socket reads that returned data.
    pub packets_received: usize,
    /// Wall-clock time across all attempts.
    pub duration: Duration,
}

/// A successful `execute` result.
#[derive(Debug, Clone)]
pub struct ProcessedRequest {
    /// Decoded response.
    pub response: FinsResponse,
    /// Transfer statistics across all attempts.
    pub stats: TransferStats,
}

/// Fault raised by one attempt, before it is attributed to an endpoint.
#[derive(Debug)]
enum Fault {
    Transport(TransportError),
    Protocol(ProtocolError),
}

impl From<TransportError> for Fault {
    fn from(e: TransportError) -> Self {
        Fault::Transport(e)
    }
}

impl From<ProtocolError> for Fault {
    fn from(e: ProtocolError) -> Self {
        Fault::Protocol(e)
    }
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fault::Transport(e) => e.fmt(f),
            Fault::Protocol(e) => e.fmt(f),
        }
    }
}

impl Fault {
    fn is_cancelled(&self) -> bool {
        matches!(self, Fault::Transport(TransportError::Cancelled))
    }
}

struct ChannelInner<T> {
    transport: T,
    configured_nodes: NodeIdentity,
    nodes: Option<NodeIdentity>,
    state: ChannelState,
    service_id: u8,
}

impl<T: Transport> ChannelInner<T> {
    async fn reconnect(
        &mut self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> std::result::Result<NodeIdentity, TransportError> {
        self.transport.teardown();
        self.nodes = None;
        let negotiated = self.transport.connect(timeout, cancel).await?;
        let nodes = negotiated.unwrap_or(self.configured_nodes);
        self.nodes = Some(nodes);
        Ok(nodes)
    }

    fn next_service_id(&mut self) -> u8 {
        self.service_id = self.service_id.wrapping_add(1);
        self.service_id
    }
}

/// A serialized request pipeline over one PLC connection.
///
/// The default transport type selects TCP or UDP at runtime; tests and custom
/// integrations can plug in any [`Transport`].
pub struct Channel<T: Transport = EthernetTransport> {
    endpoint: String,
    inner: Mutex<ChannelInner<T>>,
}

impl<T: Transport> Channel<T> {
    /// Creates an uninitialized channel.
    ///
    /// `nodes` is used when the transport does not negotiate node numbers.
    pub fn new(endpoint: impl Into<String>, transport: T, nodes: NodeIdentity) -> Self {
        Self {
            endpoint: endpoint.into(),
            inner: Mutex::new(ChannelInner {
                transport,
                configured_nodes: nodes,
                nodes: None,
                state: ChannelState::Uninitialized,
                service_id: 0,
            }),
        }
    }

    /// Returns the remote endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the current state. Waits for any in-flight request.
    pub async fn state(&self) -> ChannelState {
        self.inner.lock().await.state
    }

    /// Returns the node numbers of the current connection, if any.
    pub async fn node_identity(&self) -> Option<NodeIdentity> {
        self.inner.lock().await.nodes
    }

    async fn lock(
        &self,
        operation: &str,
        cancel: &CancellationToken,
    ) -> Result<MutexGuard<'_, ChannelInner<T>>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(self.cancelled(operation)),
            guard = self.inner.lock() => Ok(guard),
        }
    }

    fn cancelled(&self, operation: &str) -> FinsError {
        FinsError::Cancelled {
            endpoint: self.endpoint.clone(),
            operation: operation.to_string(),
        }
    }

    fn attribute(&self, operation: &str, fault: Fault, stats: TransferStats) -> FinsError {
        match fault {
            Fault::Transport(TransportError::Cancelled) => self.cancelled(operation),
            Fault::Transport(source) => FinsError::Connectivity {
                endpoint: self.endpoint.clone(),
                operation: operation.to_string(),
                source,
                stats,
            },
            Fault::Protocol(source) => FinsError::Protocol {
                endpoint: self.endpoint.clone(),
                operation: operation.to_string(),
                source,
                stats,
            },
        }
    }

    /// Opens the connection. Calling it again reconnects.
    ///
    /// # Errors
    ///
    /// - [`FinsError::Disposed`] after [`dispose`](Self::dispose).
    /// - [`FinsError::Connectivity`] if the connection or handshake fails.
    /// - [`FinsError::Cancelled`] if `cancel` fires.
    pub async fn initialize(&self, timeout: Duration, cancel: &CancellationToken) -> Result<()> {
        const OPERATION: &str = "Initialize";

        let mut inner = self.lock(OPERATION, cancel).await?;
        if inner.state == ChannelState::Disposed {
            return Err(FinsError::Disposed {
                endpoint: self.endpoint.clone(),
            });
        }

        match inner.reconnect(timeout, cancel).await {
            Ok(nodes) => {
                inner.state = ChannelState::Connected;
                info!(
                    endpoint = %self.endpoint,
                    local_node = nodes.local,
                    remote_node = nodes.remote,
                    "channel initialized"
                );
                Ok(())
            }
            Err(e) => {
                inner.transport.teardown();
                Err(self.attribute(OPERATION, e.into(), TransferStats::default()))
            }
        }
    }

    /// Sends `request` and waits for its response, retrying up to `retries` times.
    ///
    /// Each attempt gets a fresh `timeout` for its connect, send and receive.
    ///
    /// # Errors
    ///
    /// - [`FinsError::NotInitialized`] / [`FinsError::Disposed`] on lifecycle misuse.
    /// - [`FinsError::Connectivity`] or [`FinsError::Protocol`] with the last
    ///   attempt's fault once the attempts are exhausted. The error carries the
    ///   statistics of every attempt, see [`FinsError::transfer_stats`].
    /// - [`FinsError::Cancelled`] as soon as `cancel` fires.
    pub async fn execute(
        &self,
        request: &FinsRequest,
        timeout: Duration,
        retries: u32,
        cancel: &CancellationToken,
    ) -> Result<ProcessedRequest> {
        let operation = request.name();
        let started = Instant::now();
        let mut stats = TransferStats::default();
        let mut attempt: u32 = 0;

        loop {
            let mut inner = self.lock(operation, cancel).await?;
            match inner.state {
                ChannelState::Uninitialized => {
                    return Err(FinsError::NotInitialized {
                        endpoint: self.endpoint.clone(),
                    })
                }
                ChannelState::Disposed => {
                    return Err(FinsError::Disposed {
                        endpoint: self.endpoint.clone(),
                    })
                }
                ChannelState::Connected | ChannelState::Reconnecting | ChannelState::Faulted => {}
            }

            let outcome = Self::attempt(&mut inner, request, attempt, timeout, cancel, &mut stats).await;

            let fault = match outcome {
                Ok(response) => {
                    inner.state = ChannelState::Connected;
                    stats.duration = started.elapsed();
                    return Ok(ProcessedRequest { response, stats });
                }
                Err(fault) => fault,
            };

            if let Fault::Transport(_) = fault {
                inner.transport.teardown();
                inner.state = ChannelState::Faulted;
            }

            if fault.is_cancelled() {
                return Err(self.attribute(operation, fault, stats));
            }

            if let Fault::Protocol(ProtocolError::CorrelationMismatch { .. }) = fault {
                inner.transport.purge(timeout / 4, cancel).await;
            }

            if attempt >= retries {
                stats.duration = started.elapsed();
                warn!(
                    endpoint = %self.endpoint,
                    operation,
                    attempts = attempt + 1,
                    bytes_sent = stats.bytes_sent,
                    packets_sent = stats.packets_sent,
                    bytes_received = stats.bytes_received,
                    packets_received = stats.packets_received,
                    duration_ms = stats.duration.as_millis() as u64,
                    error = %fault,
                    "request failed after all attempts"
                );
                return Err(self.attribute(operation, fault, stats));
            }

            debug!(
                endpoint = %self.endpoint,
                operation,
                attempt = attempt + 1,
                error = %fault,
                "attempt failed, retrying"
            );
            drop(inner);
            attempt += 1;
        }
    }

    async fn attempt(
        inner: &mut ChannelInner<T>,
        request: &FinsRequest,
        attempt: u32,
        timeout: Duration,
        cancel: &CancellationToken,
        stats: &mut TransferStats,
    ) -> std::result::Result<FinsResponse, Fault> {
        let nodes = match inner.nodes {
            Some(nodes) if attempt == 0 && inner.state == ChannelState::Connected => nodes,
            _ => {
                inner.state = ChannelState::Reconnecting;
                let nodes = inner.reconnect(timeout, cancel).await?;
                inner.state = ChannelState::Connected;
                nodes
            }
        };

        let sid = inner.next_service_id();
        let frame = request.to_bytes(nodes, sid);

        let sent = inner.transport.send(&frame, timeout, cancel).await?;
        stats.bytes_sent += sent.bytes;
        stats.packets_sent += sent.packets;

        let received = inner.transport.receive(timeout, cancel).await?;
        stats.bytes_received += received.bytes;
        stats.packets_received += received.packets;

        let expected_sid = inner.transport.verifies_service_id().then_some(sid);
        Ok(FinsResponse::decode(&received.frame, request, expected_sid)?)
    }

    /// Closes the connection for good. Safe to call more than once.
    pub async fn dispose(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state != ChannelState::Disposed {
            inner.transport.teardown();
            inner.nodes = None;
            inner.state = ChannelState::Disposed;
            debug!(endpoint = %self.endpoint, "channel disposed");
        }
    }
}

impl<T: Transport> std::fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}
