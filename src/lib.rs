//! # Omron FINS Channel
//!
//! An async Rust library for communicating with Omron PLCs using the FINS
//! (Factory Interface Network Service) protocol over TCP or UDP.
//!
//! ## Features
//!
//! - **Two transports**: FINS/TCP with node-address negotiation, FINS/UDP with configured nodes
//! - **One request in flight**: requests on a channel are serialized, so frames never interleave
//! - **Retry and reconnect**: failed attempts tear the connection down and try again
//! - **Cancellation**: every suspend point honours a [`CancellationToken`](tokio_util::sync::CancellationToken)
//! - **Statistics**: every result carries bytes, packets and duration in [`TransferStats`]
//! - **Controller aware**: request limits and memory areas follow the detected [`ControllerFamily`]
//! - **No panics**: all errors returned as `Result<T, FinsError>`
//!
//! ## Quick Start
//!
//! ```no_run
//! use omron_fins_channel::{Client, ClientConfig, ConnectionMethod, MemoryArea};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> omron_fins_channel::Result<()> {
//!     let config = ClientConfig::new("192.168.1.250", ConnectionMethod::Tcp);
//!     let mut client = Client::new(config)?;
//!     let cancel = CancellationToken::new();
//!
//!     client.initialize(&cancel).await?;
//!     println!("Connected to a {} PLC", client.family());
//!
//!     // Read D1
//!     let d1 = client.read_word(MemoryArea::DM, 1, &cancel).await?;
//!     println!("D1 = {}", d1.value);
//!
//!     // Write values to DM200
//!     client.write_words(MemoryArea::DM, 200, &[0x1234, 0x5678], &cancel).await?;
//!
//!     // Read CIO 0.05
//!     let bit = client.read_bit(MemoryArea::CIO, 0, 5, &cancel).await?;
//!     println!("CIO 0.05 = {}", bit.value);
//!
//!     client.dispose().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Memory Areas
//!
//! | Area | Description | Word Access | Bit Access |
//! |------|-------------|:-----------:|:----------:|
//! | [`MemoryArea::CIO`] | Core I/O - inputs, outputs, internal relays | ✓ | ✓ |
//! | [`MemoryArea::WR`] | Work area - temporary work bits/words | ✓ | ✓ |
//! | [`MemoryArea::HR`] | Holding area - retentive bits/words | ✓ | ✓ |
//! | [`MemoryArea::DM`] | Data Memory - numeric data storage | ✓ | not on CP1 |
//! | [`MemoryArea::AR`] | Auxiliary Relay - system status/control | not on NJ/NX/NY | not on NJ/NX/NY |
//!
//! ## Layers
//!
//! - [`Client`]: validated, typed operations (words, bits, clock, cycle time).
//! - [`Channel`]: one connection, request serialization, service IDs, retries.
//! - [`Transport`]: raw frame I/O. [`TcpTransport`] wraps frames in the FINS/TCP
//!   envelope; [`UdpTransport`] sends them as datagrams.
//! - [`FinsRequest`] / [`FinsResponse`]: frame encoding and decoding.
//!
//! A [`Channel`] can drive any [`FinsRequest`], including ones built with
//! [`FinsRequest::new`] for commands the client does not wrap:
//!
//! ```
//! use omron_fins_channel::command::sub_function_name;
//!
//! assert_eq!(sub_function_name(0x01, 0x01), "Memory Area Read");
//! assert_eq!(sub_function_name(0x07, 0x01), "Clock Read");
//! ```
//!
//! ## Error Handling
//!
//! ```no_run
//! use omron_fins_channel::{Client, ClientConfig, ConnectionMethod, FinsError, MemoryArea};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo(client: &Client) {
//! let cancel = CancellationToken::new();
//! match client.read_words(MemoryArea::DM, 100, 10, &cancel).await {
//!     Ok(data) => println!("Data: {:?}", data.value),
//!     Err(FinsError::Connectivity { source, .. }) => println!("Link down: {source}"),
//!     Err(FinsError::Protocol { source, .. }) => println!("PLC refused: {source}"),
//!     Err(FinsError::InvalidAddressing { reason }) => println!("Bad address: {reason}"),
//!     Err(e) => println!("Error: {e}"),
//! }
//! # }
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events: connection and retry events at
//! `info`/`warn`, per-request frame details at `debug`/`trace`. Install any
//! subscriber to see them.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod bcd;
mod channel;
mod client;
pub mod command;
mod controller;
mod end_code;
mod error;
mod header;
mod memory;
mod response;
mod transport;

// Public re-exports
pub use channel::{Channel, ChannelState, ProcessedRequest, TransferStats};
pub use client::{Client, ClientConfig, Transfer, DEFAULT_RETRIES};
pub use command::{FinsRequest, FunctionCode};
pub use controller::ControllerFamily;
pub use end_code::EndCode;
pub use error::{EnvelopeError, FinsError, ProtocolError, Result, TransportError};
pub use header::{FinsHeader, NodeIdentity, FINS_HEADER_SIZE};
pub use memory::MemoryArea;
pub use response::{ClockReading, CpuUnitData, CycleTime, FinsResponse};
pub use transport::{
    ConnectionMethod, EthernetTransport, ReceivedFrame, SendCounts, TcpTransport, Transport,
    UdpTransport, DEFAULT_FINS_PORT, DEFAULT_TIMEOUT, MAX_PACKET_SIZE,
};
