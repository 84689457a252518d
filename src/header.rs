//! FINS header structures and node addressing.
//!
//! # FINS Header Structure
//!
//! The FINS header is a 10-byte structure that precedes every FINS command and response:
//!
//! | Byte | Field | Description |
//! |------|-------|-------------|
//! | 0 | ICF | Information Control Field |
//! | 1 | RSV | Reserved (always 0x00) |
//! | 2 | GCT | Gateway Count |
//! | 3 | DNA | Destination Network Address |
//! | 4 | DA1 | Destination Node Address |
//! | 5 | DA2 | Destination Unit Address |
//! | 6 | SNA | Source Network Address |
//! | 7 | SA1 | Source Node Address |
//! | 8 | SA2 | Source Unit Address |
//! | 9 | SID | Service ID |
//!
//! Commands are always addressed to the CPU unit (unit 0) on the local
//! network (network 0); only the node numbers vary.
//!
//! # Example
//!
//! ```
//! use omron_fins_channel::{FinsHeader, NodeIdentity};
//!
//! let nodes = NodeIdentity::new(1, 10);
//! let header = FinsHeader::new_command(nodes, 0x01);
//! assert_eq!(
//!     header.to_bytes(),
//!     [0x80, 0x00, 0x02, 0x00, 0x0A, 0x00, 0x00, 0x01, 0x00, 0x01]
//! );
//! ```

use crate::error::ProtocolError;

/// FINS header size in bytes.
pub const FINS_HEADER_SIZE: usize = 10;

/// Information control field of a command that requires a response.
pub const ICF_COMMAND: u8 = 0x80;

/// Gateway count placed in every command.
pub const GATEWAY_COUNT: u8 = 0x02;

/// Returns whether `icf` marks a FINS response frame (0xC0 or 0xC1).
#[inline]
pub fn is_response_marker(icf: u8) -> bool {
    icf == 0xC0 || icf == 0xC1
}

/// Local and remote node numbers used on a connection.
///
/// Valid node numbers are 1-254. On the stream transport both are assigned
/// by the controller during the connection handshake; on the datagram
/// transport they come from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIdentity {
    /// Node number of this client.
    pub local: u8,
    /// Node number of the controller.
    pub remote: u8,
}

impl NodeIdentity {
    /// Creates a node identity.
    pub fn new(local: u8, remote: u8) -> Self {
        Self { local, remote }
    }

    /// Returns whether `node` can be used as a FINS node number.
    #[inline]
    pub fn is_valid_node(node: u8) -> bool {
        node != 0 && node != 255
    }
}

/// FINS command/response header (10 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinsHeader {
    /// Information Control Field.
    /// - For commands: 0x80
    /// - For responses: 0xC0 or 0xC1
    pub icf: u8,
    /// Reserved byte (always 0x00).
    pub rsv: u8,
    /// Gateway Count.
    pub gct: u8,
    /// Destination Network Address.
    pub dna: u8,
    /// Destination Node Address.
    pub da1: u8,
    /// Destination Unit Address.
    pub da2: u8,
    /// Source Network Address.
    pub sna: u8,
    /// Source Node Address.
    pub sa1: u8,
    /// Source Unit Address.
    pub sa2: u8,
    /// Service ID (used to match responses with requests).
    pub sid: u8,
}

impl FinsHeader {
    /// Creates a command header from `nodes.local` to the CPU unit of `nodes.remote`.
    pub fn new_command(nodes: NodeIdentity, sid: u8) -> Self {
        Self {
            icf: ICF_COMMAND,
            rsv: 0x00,
            gct: GATEWAY_COUNT,
            dna: 0x00,
            da1: nodes.remote,
            da2: 0x00,
            sna: 0x00,
            sa1: nodes.local,
            sa2: 0x00,
            sid,
        }
    }

    /// Serializes the header to bytes.
    pub fn to_bytes(self) -> [u8; FINS_HEADER_SIZE] {
        [
            self.icf, self.rsv, self.gct, self.dna, self.da1, self.da2, self.sna, self.sa1,
            self.sa2, self.sid,
        ]
    }

    /// Parses a header from bytes.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::TooShort` if the slice is shorter than 10 bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use omron_fins_channel::FinsHeader;
    ///
    /// let bytes = [0xC0, 0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0x0A, 0x00, 0x01];
    /// let header = FinsHeader::from_bytes(&bytes).unwrap();
    /// assert_eq!(header.sa1, 0x0A);
    /// assert_eq!(header.sid, 0x01);
    /// ```
    pub fn from_bytes(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() < FINS_HEADER_SIZE {
            return Err(ProtocolError::TooShort {
                expected: FINS_HEADER_SIZE,
                actual: data.len(),
            });
        }

        Ok(Self {
            icf: data[0],
            rsv: data[1],
            gct: data[2],
            dna: data[3],
            da1: data[4],
            da2: data[5],
            sna: data[6],
            sa1: data[7],
            sa2: data[8],
            sid: data[9],
        })
    }
}
