//! High-level FINS client for communicating with Omron PLCs.
//!
//! This module provides the [`Client`] struct, which is the primary interface
//! for communicating with Omron PLCs using the FINS protocol over TCP or UDP.
//!
//! # Overview
//!
//! The client:
//! - Opens a [`Channel`] with the configured transport and, on TCP, negotiates
//!   node numbers
//! - Reads the CPU unit model once and derives the [`ControllerFamily`]
//! - Validates every request against the family's limits before sending it
//! - Returns each value together with its [`TransferStats`]
//!
//! # Example
//!
//! ```no_run
//! use omron_fins_channel::{Client, ClientConfig, ConnectionMethod, MemoryArea};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> omron_fins_channel::Result<()> {
//! let config = ClientConfig::new("192.168.1.250", ConnectionMethod::Tcp);
//! let mut client = Client::new(config)?;
//! let cancel = CancellationToken::new();
//!
//! client.initialize(&cancel).await?;
//!
//! // Read 10 words from DM100
//! let words = client.read_words(MemoryArea::DM, 100, 10, &cancel).await?;
//! println!("{:?} in {:?}", words.value, words.stats.duration);
//!
//! // Set CIO 0.05
//! client.write_bit(MemoryArea::CIO, 0, 5, true, &cancel).await?;
//!
//! client.dispose().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! [`ClientConfig`] covers the PLC host and port, the transport, the per
//! attempt timeout, the retry count and, for UDP, the node numbers.
//!
//! # Concurrency
//!
//! All request methods take `&self`; a `Client` can be shared between tasks
//! behind an `Arc`. Requests are serialized by the channel.

use std::time::Duration;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::channel::{Channel, ProcessedRequest, TransferStats};
use crate::command::FinsRequest;
use crate::controller::ControllerFamily;
use crate::error::{FinsError, ProtocolError, Result};
use crate::header::NodeIdentity;
use crate::memory::MemoryArea;
use crate::response::{ClockReading, CpuUnitData, CycleTime};
use crate::transport::{ConnectionMethod, EthernetTransport, DEFAULT_FINS_PORT, DEFAULT_TIMEOUT};

/// Default number of retries after a failed attempt.
pub const DEFAULT_RETRIES: u32 = 1;

/// Configuration for creating a FINS client.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClientConfig {
    /// PLC IP address or hostname.
    pub host: String,
    /// PLC port.
    pub port: u16,
    /// Transport variant.
    pub method: ConnectionMethod,
    /// Timeout of each connect, send and receive.
    pub timeout: Duration,
    /// Retries after a failed attempt.
    pub retries: u32,
    /// Node number of this client. UDP only.
    pub local_node: u8,
    /// Node number of the PLC. UDP only.
    pub remote_node: u8,
}

impl ClientConfig {
    /// Creates a configuration with default port, timeout and retries.
    ///
    /// UDP configurations must also call [`with_nodes`](Self::with_nodes).
    ///
    /// # Example
    ///
    /// ```
    /// use omron_fins_channel::{ClientConfig, ConnectionMethod};
    ///
    /// let config = ClientConfig::new("192.168.1.250", ConnectionMethod::Tcp);
    /// assert_eq!(config.endpoint(), "192.168.1.250:9600");
    /// ```
    pub fn new(host: impl Into<String>, method: ConnectionMethod) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_FINS_PORT,
            method,
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            local_node: 0,
            remote_node: 0,
        }
    }

    /// Sets a custom PLC port (default is 9600).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets a custom timeout (default is 2 seconds).
    ///
    /// # Example
    ///
    /// ```
    /// use omron_fins_channel::{ClientConfig, ConnectionMethod};
    /// use std::time::Duration;
    ///
    /// let config = ClientConfig::new("192.168.1.250", ConnectionMethod::Udp)
    ///     .with_timeout(Duration::from_millis(500))
    ///     .with_retries(3)
    ///     .with_nodes(1, 250);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry count (default is 1).
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Sets the local and remote node numbers used on UDP.
    ///
    /// TCP negotiates node numbers with the PLC and ignores these.
    pub fn with_nodes(mut self, local_node: u8, remote_node: u8) -> Self {
        self.local_node = local_node;
        self.remote_node = remote_node;
        self
    }

    /// Returns `host:port`, bracketing IPv6 literals.
    pub fn endpoint(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Returns the configured node pair.
    pub fn nodes(&self) -> NodeIdentity {
        NodeIdentity::new(self.local_node, self.remote_node)
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FinsError::InvalidParameter`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(FinsError::invalid_parameter("host", "cannot be empty"));
        }
        if self.port == 0 {
            return Err(FinsError::invalid_parameter("port", "cannot be zero"));
        }
        if self.timeout.is_zero() {
            return Err(FinsError::invalid_parameter("timeout", "cannot be zero"));
        }

        if self.method == ConnectionMethod::Udp {
            if !NodeIdentity::is_valid_node(self.local_node) {
                return Err(FinsError::invalid_parameter(
                    "local_node",
                    "must be between 1 and 254",
                ));
            }
            if !NodeIdentity::is_valid_node(self.remote_node) {
                return Err(FinsError::invalid_parameter(
                    "remote_node",
                    "must be between 1 and 254",
                ));
            }
            if self.local_node == self.remote_node {
                return Err(FinsError::invalid_parameter(
                    "remote_node",
                    "cannot be the same as the local node",
                ));
            }
        }

        Ok(())
    }
}

/// A value returned by the PLC together with the transfer statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer<T> {
    /// Extracted value.
    pub value: T,
    /// Socket activity and duration of the request.
    pub stats: TransferStats,
}

impl<T> Transfer<T> {
    fn map<U>(self, f: impl FnOnce(T) -> U) -> Transfer<U> {
        Transfer {
            value: f(self.value),
            stats: self.stats,
        }
    }
}

/// Earliest date and time the PLC clock accepts.
fn min_clock() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1998, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

/// Latest date and time the PLC clock accepts.
fn max_clock() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2069, 12, 31)
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .unwrap_or(NaiveDateTime::MAX)
}

/// FINS client for communicating with Omron PLCs.
///
/// # Example
///
/// ```no_run
/// use omron_fins_channel::{Client, ClientConfig, ConnectionMethod};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn demo() -> omron_fins_channel::Result<()> {
/// let config = ClientConfig::new("10.0.0.5", ConnectionMethod::Udp).with_nodes(1, 5);
/// let mut client = Client::new(config)?;
/// let cancel = CancellationToken::new();
/// client.initialize(&cancel).await?;
///
/// let clock = client.read_clock(&cancel).await?;
/// println!("PLC time: {}", clock.value.date_time);
/// # Ok(())
/// # }
/// ```
pub struct Client {
    config: ClientConfig,
    channel: Option<Channel>,
    cpu_unit: Option<CpuUnitData>,
    family: ControllerFamily,
}

impl Client {
    /// Creates a client. No connection is made until [`initialize`](Self::initialize).
    ///
    /// # Errors
    ///
    /// Returns [`FinsError::InvalidParameter`] if the configuration is invalid.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            channel: None,
            cpu_unit: None,
            family: ControllerFamily::Unknown,
        })
    }

    /// Connects, then reads the CPU unit data to identify the controller.
    ///
    /// Does nothing if already initialized.
    ///
    /// # Errors
    ///
    /// Returns the channel's error if the connection, handshake or CPU unit
    /// data read fails. The client stays uninitialized.
    pub async fn initialize(&mut self, cancel: &CancellationToken) -> Result<()> {
        if self.channel.is_some() {
            return Ok(());
        }

        let endpoint = self.config.endpoint();
        let transport = EthernetTransport::new(self.config.method, endpoint.clone());
        let channel = Channel::new(endpoint, transport, self.config.nodes());
        channel.initialize(self.config.timeout, cancel).await?;

        let request = FinsRequest::read_cpu_unit_data();
        let unit = match channel
            .execute(&request, self.config.timeout, self.config.retries, cancel)
            .await
            .and_then(|processed| {
                processed
                    .response
                    .to_cpu_unit_data()
                    .map_err(|e| protocol_error(channel.endpoint(), &request, processed.stats, e))
            }) {
            Ok(unit) => unit,
            Err(e) => {
                channel.dispose().await;
                return Err(e);
            }
        };

        self.family = ControllerFamily::from_model(&unit.model);
        info!(
            endpoint = %channel.endpoint(),
            method = %self.config.method,
            model = %unit.model,
            version = %unit.version,
            family = %self.family,
            "connected to Omron PLC"
        );
        self.cpu_unit = Some(unit);
        self.channel = Some(channel);
        Ok(())
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns whether [`initialize`](Self::initialize) has completed.
    pub fn is_initialized(&self) -> bool {
        self.channel.is_some()
    }

    /// Returns the controller family detected at initialization.
    pub fn family(&self) -> ControllerFamily {
        self.family
    }

    /// Returns the CPU unit data read at initialization.
    pub fn cpu_unit(&self) -> Option<&CpuUnitData> {
        self.cpu_unit.as_ref()
    }

    fn channel(&self) -> Result<&Channel> {
        self.channel.as_ref().ok_or_else(|| FinsError::NotInitialized {
            endpoint: self.config.endpoint(),
        })
    }

    async fn execute<T>(
        &self,
        request: FinsRequest,
        cancel: &CancellationToken,
        extract: impl FnOnce(&ProcessedRequest) -> std::result::Result<T, ProtocolError>,
    ) -> Result<Transfer<T>> {
        let channel = self.channel()?;
        let processed = channel
            .execute(&request, self.config.timeout, self.config.retries, cancel)
            .await?;
        let value = extract(&processed)
            .map_err(|e| protocol_error(channel.endpoint(), &request, processed.stats, e))?;
        Ok(Transfer {
            value,
            stats: processed.stats,
        })
    }

    /// Reads `length` consecutive bits starting at `address.start_bit`.
    ///
    /// # Errors
    ///
    /// - [`FinsError::InvalidParameter`] if `start_bit > 15`, `length == 0`
    ///   or the bits run past bit 15.
    /// - [`FinsError::InvalidAddressing`] if the area or address is not
    ///   available on this controller.
    pub async fn read_bits(
        &self,
        area: MemoryArea,
        address: u16,
        start_bit: u8,
        length: u8,
        cancel: &CancellationToken,
    ) -> Result<Transfer<Vec<bool>>> {
        self.family
            .validate_bit_access(area, address, start_bit, usize::from(length))?;
        let request = FinsRequest::read_bits(area, address, start_bit, u16::from(length));
        self.execute(request, cancel, |p| p.response.to_bits(usize::from(length)))
            .await
    }

    /// Reads a single bit.
    pub async fn read_bit(
        &self,
        area: MemoryArea,
        address: u16,
        bit: u8,
        cancel: &CancellationToken,
    ) -> Result<Transfer<bool>> {
        let bits = self.read_bits(area, address, bit, 1, cancel).await?;
        Ok(bits.map(|values| values.first().copied().unwrap_or(false)))
    }

    /// Reads `length` words starting at `start`.
    ///
    /// # Errors
    ///
    /// - [`FinsError::InvalidParameter`] if `length` is zero or above the
    ///   family's maximum (999, CP1: 499).
    /// - [`FinsError::InvalidAddressing`] if the area or range is not
    ///   available on this controller.
    pub async fn read_words(
        &self,
        area: MemoryArea,
        start: u16,
        length: u16,
        cancel: &CancellationToken,
    ) -> Result<Transfer<Vec<i16>>> {
        self.family
            .validate_word_access(area, start, usize::from(length), false)?;
        let request = FinsRequest::read_words(area, start, length);
        self.execute(request, cancel, |p| p.response.to_words(usize::from(length)))
            .await
    }

    /// Reads a single word.
    pub async fn read_word(
        &self,
        area: MemoryArea,
        address: u16,
        cancel: &CancellationToken,
    ) -> Result<Transfer<i16>> {
        let words = self.read_words(area, address, 1, cancel).await?;
        Ok(words.map(|values| values.first().copied().unwrap_or_default()))
    }

    /// Writes `values` to consecutive bits starting at `address.start_bit`.
    pub async fn write_bits(
        &self,
        area: MemoryArea,
        address: u16,
        start_bit: u8,
        values: &[bool],
        cancel: &CancellationToken,
    ) -> Result<Transfer<()>> {
        self.family
            .validate_bit_access(area, address, start_bit, values.len())?;
        let request = FinsRequest::write_bits(area, address, start_bit, values);
        self.execute(request, cancel, |_| Ok(())).await
    }

    /// Writes a single bit.
    pub async fn write_bit(
        &self,
        area: MemoryArea,
        address: u16,
        bit: u8,
        value: bool,
        cancel: &CancellationToken,
    ) -> Result<Transfer<()>> {
        self.write_bits(area, address, bit, &[value], cancel).await
    }

    /// Writes `values` to consecutive words starting at `start`.
    ///
    /// # Errors
    ///
    /// Same as [`read_words`](Self::read_words), with a maximum of 996 words
    /// (CP1: 496).
    pub async fn write_words(
        &self,
        area: MemoryArea,
        start: u16,
        values: &[i16],
        cancel: &CancellationToken,
    ) -> Result<Transfer<()>> {
        self.family
            .validate_word_access(area, start, values.len(), true)?;
        let request = FinsRequest::write_words(area, start, values);
        self.execute(request, cancel, |_| Ok(())).await
    }

    /// Writes a single word.
    pub async fn write_word(
        &self,
        area: MemoryArea,
        address: u16,
        value: i16,
        cancel: &CancellationToken,
    ) -> Result<Transfer<()>> {
        self.write_words(area, address, &[value], cancel).await
    }

    /// Reads the PLC clock.
    pub async fn read_clock(&self, cancel: &CancellationToken) -> Result<Transfer<ClockReading>> {
        self.execute(FinsRequest::read_clock(), cancel, |p| p.response.to_clock())
            .await
    }

    /// Sets the PLC clock, deriving the day of week from `date_time`.
    pub async fn write_clock(
        &self,
        date_time: NaiveDateTime,
        cancel: &CancellationToken,
    ) -> Result<Transfer<()>> {
        let day_of_week = date_time.weekday().num_days_from_sunday() as u8;
        self.write_clock_with_day(date_time, day_of_week, cancel)
            .await
    }

    /// Sets the PLC clock with an explicit day of week (0 = Sunday).
    ///
    /// # Errors
    ///
    /// Returns [`FinsError::InvalidParameter`] if `date_time` is outside
    /// 1998-01-01 00:00:00 ..= 2069-12-31 23:59:59 or `day_of_week > 6`.
    pub async fn write_clock_with_day(
        &self,
        date_time: NaiveDateTime,
        day_of_week: u8,
        cancel: &CancellationToken,
    ) -> Result<Transfer<()>> {
        if date_time < min_clock() || date_time > max_clock() {
            return Err(FinsError::invalid_parameter(
                "date_time",
                "must be between 1998-01-01 00:00:00 and 2069-12-31 23:59:59",
            ));
        }
        if day_of_week > 6 {
            return Err(FinsError::invalid_parameter(
                "day_of_week",
                "must be between 0 and 6",
            ));
        }

        let request = FinsRequest::write_clock(date_time, day_of_week);
        self.execute(request, cancel, |_| Ok(())).await
    }

    /// Reads the average, maximum and minimum cycle times.
    ///
    /// # Errors
    ///
    /// Returns [`FinsError::UnsupportedOperation`] on NX/NY controllers other
    /// than NJ101, NJ301 and NJ501.
    pub async fn read_cycle_time(&self, cancel: &CancellationToken) -> Result<Transfer<CycleTime>> {
        let request = FinsRequest::read_cycle_time();
        if !self.family.supports_cycle_time() {
            return Err(FinsError::UnsupportedOperation {
                operation: request.name().to_string(),
                family: self.family.to_string(),
            });
        }
        self.execute(request, cancel, |p| p.response.to_cycle_time())
            .await
    }

    /// Closes the connection. The client can be initialized again afterwards.
    pub async fn dispose(&mut self) {
        if let Some(channel) = self.channel.take() {
            channel.dispose().await;
        }
        self.cpu_unit = None;
        self.family = ControllerFamily::Unknown;
    }
}

fn protocol_error(
    endpoint: &str,
    request: &FinsRequest,
    stats: TransferStats,
    source: ProtocolError,
) -> FinsError {
    FinsError::Protocol {
        endpoint: endpoint.to_string(),
        operation: request.name().to_string(),
        source,
        stats,
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.config.endpoint())
            .field("method", &self.config.method)
            .field("family", &self.family)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
