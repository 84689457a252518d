//! FINS/TCP transport.
//!
//! # Envelope
//!
//! Every FINS frame on a TCP connection is preceded by a 16-byte header:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | ASCII `FINS` |
//! | 4 | 4 | Length of everything after this field (8 + payload), big-endian |
//! | 8 | 4 | Command: 0 = node address to PLC, 1 = node address from PLC, 2 = frame, 3 = error |
//! | 12 | 4 | Error code, 0 on send |
//!
//! Right after connecting the client sends command 0 with a zero client node,
//! and the PLC answers with command 1 carrying the assigned client node
//! (byte 3) and its own node (byte 7).

use std::time::Duration;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::{purge_wait, read_slice, with_deadline, ReceivedFrame, SendCounts, Transport};
use crate::command::MIN_RESPONSE_SIZE;
use crate::error::{EnvelopeError, TransportError};
use crate::header::{is_response_marker, NodeIdentity};

const MAGIC: &[u8; 4] = b"FINS";

/// Envelope header size in bytes.
pub(crate) const ENVELOPE_SIZE: usize = 16;

/// Length of the command and error code fields counted by the length field.
const ENVELOPE_FIELDS_SIZE: i64 = 8;

const MAX_ENVELOPE_PAYLOAD: i64 = 32767;

pub(crate) const CMD_NODE_ADDRESS_TO_PLC: u8 = 0;
pub(crate) const CMD_NODE_ADDRESS_FROM_PLC: u8 = 1;
pub(crate) const CMD_FRAME: u8 = 2;
pub(crate) const CMD_ERROR: u8 = 3;

const NODE_ADDRESS_BODY_SIZE: usize = 8;

/// Wraps `payload` in a FINS/TCP envelope.
pub(crate) fn encode_envelope(command: u8, payload: &[u8]) -> Vec<u8> {
    let length = payload.len() as u32 + ENVELOPE_FIELDS_SIZE as u32;
    let mut bytes = Vec::with_capacity(ENVELOPE_SIZE + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&length.to_be_bytes());
    bytes.extend_from_slice(&u32::from(command).to_be_bytes());
    bytes.extend_from_slice(&0u32.to_be_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

/// Validates an envelope header and returns the payload length that follows.
pub(crate) fn parse_envelope_header(
    header: &[u8],
    expected_command: u8,
) -> Result<usize, TransportError> {
    if header.len() < ENVELOPE_SIZE {
        return Err(TransportError::ReceiveTimeout {
            received: header.len(),
            expected: ENVELOPE_SIZE,
        });
    }

    if &header[0..4] != MAGIC {
        return Err(TransportError::InvalidMagic);
    }

    // Length is checked before the error code, so an error envelope with a
    // bogus length reports the length.
    let declared = i64::from(i32::from_be_bytes([
        header[4], header[5], header[6], header[7],
    ]));
    let payload_length = declared - ENVELOPE_FIELDS_SIZE;
    if payload_length <= 0 || payload_length > MAX_ENVELOPE_PAYLOAD {
        return Err(TransportError::InvalidEnvelopeLength(declared));
    }

    if header[11] == CMD_ERROR || header[15] != 0 {
        return Err(EnvelopeError::from_code(header[15]).into());
    }

    if header[8..11] != [0, 0, 0] || header[11] != expected_command {
        return Err(TransportError::CommandMismatch {
            expected: expected_command,
            received: header[11],
        });
    }

    let payload_length = payload_length as usize;
    if expected_command == CMD_FRAME && payload_length < MIN_RESPONSE_SIZE {
        return Err(TransportError::FrameTooShort(payload_length));
    }

    Ok(payload_length)
}

/// FINS/TCP transport.
#[derive(Debug)]
pub struct TcpTransport {
    endpoint: String,
    stream: Option<TcpStream>,
    buffer: BytesMut,
}

impl TcpTransport {
    /// Creates a transport for `endpoint` (`host:port`). Nothing is opened yet.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            stream: None,
            buffer: BytesMut::with_capacity(1024),
        }
    }

    /// Returns the remote endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns whether a socket is open.
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn write_envelope(
        &mut self,
        command: u8,
        payload: &[u8],
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<SendCounts, TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;
        let bytes = encode_envelope(command, payload);
        let length = bytes.len();

        with_deadline(timeout, cancel, TransportError::SendTimeout, async move {
            stream.write_all(&bytes).await?;
            Ok::<_, TransportError>(())
        })
        .await?;

        Ok(SendCounts {
            bytes: length,
            packets: 1,
        })
    }

    async fn read_envelope(
        &mut self,
        expected_command: u8,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<ReceivedFrame, TransportError> {
        let mut deadline = Instant::now() + timeout;
        let mut received = ReceivedFrame {
            frame: Vec::new(),
            bytes: 0,
            packets: 0,
        };

        self.fill_buffer(ENVELOPE_SIZE, deadline, cancel, &mut received)
            .await?;
        let payload_length =
            parse_envelope_header(&self.buffer[..ENVELOPE_SIZE], expected_command)?;
        self.buffer.advance(ENVELOPE_SIZE);

        // The payload gets its own timeout once the header is in.
        if self.buffer.len() < payload_length {
            deadline = Instant::now() + timeout;
        }
        self.fill_buffer(payload_length, deadline, cancel, &mut received)
            .await?;
        let payload = self.buffer.split_to(payload_length);

        if expected_command == CMD_FRAME && !is_response_marker(payload[0]) {
            return Err(TransportError::InvalidFinsHeader(payload[0]));
        }

        received.frame = payload.to_vec();
        Ok(received)
    }

    /// Reads until at least `needed` bytes are buffered or the deadline passes.
    async fn fill_buffer(
        &mut self,
        needed: usize,
        deadline: Instant,
        cancel: &CancellationToken,
        received: &mut ReceivedFrame,
    ) -> Result<(), TransportError> {
        let Self { stream, buffer, .. } = self;
        let stream = stream.as_mut().ok_or(TransportError::NotConnected)?;

        while buffer.len() < needed {
            let Some(slice) = read_slice(deadline) else {
                return Err(if received.bytes == 0 && buffer.is_empty() {
                    TransportError::NoDataReceived
                } else {
                    TransportError::ReceiveTimeout {
                        received: buffer.len(),
                        expected: needed,
                    }
                });
            };

            buffer.reserve(needed - buffer.len());
            let read = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TransportError::Cancelled),
                read = tokio::time::timeout(slice, stream.read_buf(&mut *buffer)) => read,
            };

            match read {
                Err(_) => continue,
                Ok(Ok(0)) => return Err(TransportError::ConnectionClosed),
                Ok(Ok(count)) => {
                    received.bytes += count;
                    received.packets += 1;
                }
                Ok(Err(e)) => return Err(e.into()),
            }
        }

        Ok(())
    }

    async fn negotiate_nodes(
        &mut self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<NodeIdentity, TransportError> {
        self.write_envelope(CMD_NODE_ADDRESS_TO_PLC, &[0, 0, 0, 0], timeout, cancel)
            .await?;
        let reply = self
            .read_envelope(CMD_NODE_ADDRESS_FROM_PLC, timeout, cancel)
            .await?;

        let body = reply.frame;
        if body.len() < NODE_ADDRESS_BODY_SIZE {
            return Err(TransportError::Handshake(format!(
                "node address reply of {} bytes is too short",
                body.len()
            )));
        }

        let nodes = NodeIdentity::new(body[3], body[7]);
        if !NodeIdentity::is_valid_node(nodes.local) {
            return Err(TransportError::Handshake(format!(
                "invalid local node {}",
                nodes.local
            )));
        }
        if !NodeIdentity::is_valid_node(nodes.remote) {
            return Err(TransportError::Handshake(format!(
                "invalid remote node {}",
                nodes.remote
            )));
        }

        Ok(nodes)
    }
}

impl Transport for TcpTransport {
    async fn connect(
        &mut self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<Option<NodeIdentity>, TransportError> {
        self.teardown();

        let endpoint = self.endpoint.clone();
        let stream = with_deadline(timeout, cancel, TransportError::ConnectTimeout, async move {
            Ok::<_, TransportError>(TcpStream::connect(endpoint.as_str()).await?)
        })
        .await?;
        stream.set_nodelay(true)?;
        self.stream = Some(stream);

        match self.negotiate_nodes(timeout, cancel).await {
            Ok(nodes) => {
                debug!(
                    endpoint = %self.endpoint,
                    local_node = nodes.local,
                    remote_node = nodes.remote,
                    "FINS/TCP node addresses negotiated"
                );
                Ok(Some(nodes))
            }
            Err(e) => {
                self.teardown();
                Err(e)
            }
        }
    }

    async fn send(
        &mut self,
        frame: &[u8],
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<SendCounts, TransportError> {
        self.write_envelope(CMD_FRAME, frame, timeout, cancel).await
    }

    async fn receive(
        &mut self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<ReceivedFrame, TransportError> {
        self.read_envelope(CMD_FRAME, timeout, cancel).await
    }

    async fn purge(&mut self, budget: Duration, cancel: &CancellationToken) {
        if !purge_wait(budget, cancel).await {
            return;
        }

        let mut discarded = self.buffer.len();
        self.buffer.clear();
        if let Some(stream) = &self.stream {
            let mut scratch = [0u8; 512];
            while let Ok(count) = stream.try_read(&mut scratch) {
                if count == 0 {
                    break;
                }
                discarded += count;
            }
        }
        trace!(endpoint = %self.endpoint, discarded, "purged FINS/TCP receive buffer");
    }

    fn teardown(&mut self) {
        self.stream = None;
        self.buffer.clear();
    }

    fn verifies_service_id(&self) -> bool {
        true
    }
}
