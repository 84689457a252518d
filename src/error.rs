//! Error types for FINS communication.
//!
//! Faults are split into three layers:
//!
//! - [`TransportError`]: socket, framing and timeout faults raised by a transport,
//!   including the stream envelope error catalog ([`EnvelopeError`]).
//! - [`ProtocolError`]: faults found while decoding a FINS response.
//! - [`FinsError`]: the single error type returned by the public API. It names
//!   the remote endpoint and the operation and chains the lower-level cause.

use std::io;
use thiserror::Error;

use crate::bcd::BcdError;
use crate::channel::TransferStats;
use crate::command::sub_function_name;
use crate::end_code::EndCode;

/// Result type alias for FINS operations.
pub type Result<T> = std::result::Result<T, FinsError>;

/// Errors returned by the public API.
#[derive(Debug, Error)]
pub enum FinsError {
    /// A transport fault persisted after the retry budget was exhausted.
    #[error("Failed to communicate with Omron PLC '{endpoint}' during {operation}: {source}")]
    Connectivity {
        /// Remote endpoint (`host:port`).
        endpoint: String,
        /// Operation that was attempted.
        operation: String,
        /// Underlying transport fault.
        #[source]
        source: TransportError,
        /// Socket activity and elapsed time across every attempt made.
        stats: TransferStats,
    },

    /// The controller answered with a response that could not be accepted.
    #[error("FINS protocol error from Omron PLC '{endpoint}' during {operation}: {source}")]
    Protocol {
        /// Remote endpoint (`host:port`).
        endpoint: String,
        /// Operation that was attempted.
        operation: String,
        /// Underlying protocol fault.
        #[source]
        source: ProtocolError,
        /// Socket activity and elapsed time across every attempt made.
        stats: TransferStats,
    },

    /// The cancellation token fired while the operation was suspended.
    #[error("{operation} on Omron PLC '{endpoint}' was cancelled")]
    Cancelled {
        /// Remote endpoint (`host:port`).
        endpoint: String,
        /// Operation that was attempted.
        operation: String,
    },

    /// The channel was used before `initialize` completed.
    #[error("Channel to Omron PLC '{endpoint}' has not been initialized")]
    NotInitialized {
        /// Remote endpoint (`host:port`).
        endpoint: String,
    },

    /// The channel was used after `dispose`.
    #[error("Channel to Omron PLC '{endpoint}' has been disposed")]
    Disposed {
        /// Remote endpoint (`host:port`).
        endpoint: String,
    },

    /// Invalid memory addressing.
    #[error("Invalid addressing: {reason}")]
    InvalidAddressing {
        /// Description of the addressing error.
        reason: String,
    },

    /// Invalid parameter provided.
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// Name of the invalid parameter.
        parameter: String,
        /// Description of why the parameter is invalid.
        reason: String,
    },

    /// The connected controller family does not support the operation.
    #[error("{operation} is not supported on {family} PLCs")]
    UnsupportedOperation {
        /// Operation that was requested.
        operation: String,
        /// Controller family name.
        family: String,
    },

    /// BCD conversion failed.
    #[error(transparent)]
    Bcd(#[from] BcdError),
}

impl FinsError {
    /// Creates a new `InvalidAddressing` error.
    ///
    /// # Example
    ///
    /// ```
    /// use omron_fins_channel::FinsError;
    ///
    /// let err = FinsError::invalid_addressing("CP1 does not support DM bit access");
    /// ```
    pub fn invalid_addressing(reason: impl Into<String>) -> Self {
        Self::InvalidAddressing {
            reason: reason.into(),
        }
    }

    /// Creates a new `InvalidParameter` error.
    ///
    /// # Example
    ///
    /// ```
    /// use omron_fins_channel::FinsError;
    ///
    /// let err = FinsError::invalid_parameter("length", "must be greater than 0");
    /// ```
    pub fn invalid_parameter(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Returns the protocol fault, if this is a protocol error.
    pub fn protocol_error(&self) -> Option<&ProtocolError> {
        match self {
            Self::Protocol { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Returns the transport fault, if this is a connectivity error.
    pub fn transport_error(&self) -> Option<&TransportError> {
        match self {
            Self::Connectivity { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Returns the transfer statistics carried by a connectivity or protocol error.
    pub fn transfer_stats(&self) -> Option<&TransferStats> {
        match self {
            Self::Connectivity { stats, .. } | Self::Protocol { stats, .. } => Some(stats),
            _ => None,
        }
    }

    /// Returns whether the operation was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Faults raised by a transport during connect, send, receive or handshake.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport has no live connection.
    #[error("not connected")]
    NotConnected,

    /// The connection could not be established before the deadline.
    #[error("connect timed out")]
    ConnectTimeout,

    /// The message could not be written before the deadline.
    #[error("send timed out")]
    SendTimeout,

    /// Nothing at all arrived before the deadline.
    #[error("no data was received")]
    NoDataReceived,

    /// Some data arrived but not enough before the deadline.
    #[error("timed out after receiving {received} of {expected} bytes")]
    ReceiveTimeout {
        /// Bytes buffered when the deadline expired.
        received: usize,
        /// Bytes required.
        expected: usize,
    },

    /// The remote closed the connection.
    #[error("connection closed by remote")]
    ConnectionClosed,

    /// The stream envelope did not start with `FINS`.
    #[error("invalid envelope identifier")]
    InvalidMagic,

    /// The stream envelope declared an unusable length.
    #[error("invalid envelope length {0}")]
    InvalidEnvelopeLength(i64),

    /// The stream envelope carried a different command than expected.
    #[error("envelope command {received} did not match expected command {expected}")]
    CommandMismatch {
        /// Expected envelope command code.
        expected: u8,
        /// Received envelope command code.
        received: u8,
    },

    /// The stream envelope is too short to carry a FINS frame.
    #[error("envelope length {0} is too short for a FINS frame")]
    FrameTooShort(usize),

    /// The first FINS byte was not a response information control field.
    #[error("invalid FINS header marker 0x{0:02X}")]
    InvalidFinsHeader(u8),

    /// Node address negotiation failed.
    #[error("node address negotiation failed: {0}")]
    Handshake(String),

    /// The remote reported an envelope-level error.
    #[error("remote error: {0}")]
    Envelope(#[from] EnvelopeError),

    /// The cancellation token fired.
    #[error("operation cancelled")]
    Cancelled,

    /// Underlying socket failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Envelope error codes reported by the remote on the stream transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// The FINS identifier (ASCII code) was invalid.
    #[error("the FINS identifier (ASCII code) was invalid")]
    InvalidIdentifier,
    /// The data length is too long.
    #[error("the data length is too long")]
    DataTooLong,
    /// The command is not supported.
    #[error("the command is not supported")]
    UnsupportedCommand,
    /// All connections are in use.
    #[error("all connections are in use")]
    ConnectionTableFull,
    /// The specified node is already connected.
    #[error("the specified node is already connected")]
    DuplicateNode,
    /// Attempt to access a protected node from an unspecified IP address.
    #[error("attempt to access a protected node from an unspecified IP address")]
    ProtectedNodeAccess,
    /// The client FINS node address is out of range.
    #[error("the client FINS node address is out of range")]
    NodeOutOfRange,
    /// The same FINS node address is used by the client and server.
    #[error("the same FINS node address is being used by the client and server")]
    DuplicateNodeUsage,
    /// All node addresses available for allocation have been used.
    #[error("all the node addresses available for allocation have been used")]
    NodePoolExhausted,
    /// Any other code.
    #[error("unknown code {0}")]
    Unknown(u8),
}

impl EnvelopeError {
    /// Maps the envelope error byte to a named failure.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::InvalidIdentifier,
            2 => Self::DataTooLong,
            3 => Self::UnsupportedCommand,
            20 => Self::ConnectionTableFull,
            21 => Self::DuplicateNode,
            22 => Self::ProtectedNodeAccess,
            23 => Self::NodeOutOfRange,
            24 => Self::DuplicateNodeUsage,
            25 => Self::NodePoolExhausted,
            other => Self::Unknown(other),
        }
    }
}

/// Faults found while decoding a FINS response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The message is shorter than header + command + response code.
    #[error("response too short: expected at least {expected} bytes, got {actual}")]
    TooShort {
        /// Minimum length.
        expected: usize,
        /// Received length.
        actual: usize,
    },

    /// The function code is not in the catalog.
    #[error("invalid function code 0x{0:02X}")]
    UnknownFunctionCode(u8),

    /// The function code differs from the request's.
    #[error("unexpected function code 0x{received:02X}, expecting 0x{expected:02X}")]
    UnexpectedFunctionCode {
        /// Request function code.
        expected: u8,
        /// Response function code.
        received: u8,
    },

    /// The sub-function code is not in the catalog for its function code.
    #[error("invalid sub function code 0x{sub_function_code:02X} for function code 0x{function_code:02X}")]
    UnknownSubFunctionCode {
        /// Response function code.
        function_code: u8,
        /// Response sub-function code.
        sub_function_code: u8,
    },

    /// The sub-function code differs from the request's.
    #[error(
        "unexpected sub function code '{}', expecting '{}'",
        sub_function_name(*function_code, *received),
        sub_function_name(*function_code, *expected)
    )]
    UnexpectedSubFunctionCode {
        /// Shared function code.
        function_code: u8,
        /// Request sub-function code.
        expected: u8,
        /// Response sub-function code.
        received: u8,
    },

    /// Bit 7 of the main response code was set.
    #[error("network relay error (main 0x{main:02X}, sub 0x{sub:02X})")]
    NetworkRelayError {
        /// Masked main response code.
        main: u8,
        /// Masked sub response code.
        sub: u8,
    },

    /// Bit 7 of the sub response code was set with an otherwise clean end code.
    #[error("fatal CPU unit error reported by the PLC")]
    FatalCpuUnitError,

    /// A known end code.
    #[error("{code} (main 0x{main:02X}, sub 0x{sub:02X})")]
    EndCode {
        /// Decoded end code.
        code: EndCode,
        /// Masked main response code.
        main: u8,
        /// Masked sub response code.
        sub: u8,
    },

    /// An end code with no entry in the table.
    #[error("unknown end code (main 0x{main:02X}, sub 0x{sub:02X})")]
    UnknownEndCode {
        /// Masked main response code.
        main: u8,
        /// Masked sub response code.
        sub: u8,
    },

    /// The response's service ID does not match the request's.
    #[error("service ID mismatch: expected 0x{expected:02X}, received 0x{received:02X}")]
    CorrelationMismatch {
        /// Service ID assigned to the request.
        expected: u8,
        /// Service ID echoed in the response.
        received: u8,
    },

    /// The payload is shorter than the operation requires.
    #[error("response data length {actual} was too short, expecting {expected}")]
    PayloadTooShort {
        /// Required length.
        expected: usize,
        /// Received length.
        actual: usize,
    },

    /// The clock bytes do not form a valid date and time.
    #[error("invalid date/time values received from the PLC clock")]
    InvalidClock,

    /// BCD field could not be decoded.
    #[error(transparent)]
    Bcd(#[from] BcdError),
}

impl ProtocolError {
    /// Returns the decoded end code, if this fault came from one.
    pub fn end_code(&self) -> Option<EndCode> {
        match self {
            Self::EndCode { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_addressing_display() {
        let err = FinsError::invalid_addressing("AR area is not supported on this PLC");
        assert_eq!(
            err.to_string(),
            "Invalid addressing: AR area is not supported on this PLC"
        );
    }

    #[test]
    fn test_invalid_parameter_display() {
        let err = FinsError::invalid_parameter("length", "must be greater than 0");
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'length': must be greater than 0"
        );
    }

    #[test]
    fn test_connectivity_names_endpoint_and_cause() {
        let err = FinsError::Connectivity {
            endpoint: "10.0.0.5:9600".to_string(),
            operation: "Memory Area Read".to_string(),
            source: TransportError::NoDataReceived,
            stats: TransferStats {
                bytes_sent: 18,
                packets_sent: 1,
                ..TransferStats::default()
            },
        };
        let text = err.to_string();
        assert!(text.contains("10.0.0.5:9600"));
        assert!(text.contains("Memory Area Read"));
        assert!(text.contains("no data was received"));
        assert!(matches!(
            err.transport_error(),
            Some(TransportError::NoDataReceived)
        ));
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.transfer_stats().map(|s| s.bytes_sent), Some(18));
        assert!(FinsError::invalid_parameter("length", "zero")
            .transfer_stats()
            .is_none());
    }

    #[test]
    fn test_envelope_codes() {
        assert_eq!(EnvelopeError::from_code(1), EnvelopeError::InvalidIdentifier);
        assert_eq!(EnvelopeError::from_code(20), EnvelopeError::ConnectionTableFull);
        assert_eq!(EnvelopeError::from_code(25), EnvelopeError::NodePoolExhausted);
        assert_eq!(EnvelopeError::from_code(99), EnvelopeError::Unknown(99));
    }

    #[test]
    fn test_correlation_mismatch_display() {
        let err = ProtocolError::CorrelationMismatch {
            expected: 0x01,
            received: 0x02,
        };
        assert_eq!(
            err.to_string(),
            "service ID mismatch: expected 0x01, received 0x02"
        );
    }

    #[test]
    fn test_unexpected_sub_function_uses_catalog_names() {
        let err = ProtocolError::UnexpectedSubFunctionCode {
            function_code: 0x01,
            expected: 0x01,
            received: 0x02,
        };
        assert_eq!(
            err.to_string(),
            "unexpected sub function code 'Memory Area Write', expecting 'Memory Area Read'"
        );
    }

    #[test]
    fn test_end_code_accessor() {
        let err = ProtocolError::EndCode {
            code: EndCode::AddressRangeError,
            main: 0x11,
            sub: 0x03,
        };
        assert_eq!(err.end_code(), Some(EndCode::AddressRangeError));
        assert_eq!(ProtocolError::InvalidClock.end_code(), None);
    }
}
