//! FINS command catalog and request construction.
//!
//! The catalog lists every function / sub-function code pair this client can
//! recognise in a response, with a human-readable name for diagnostics. The
//! request builders produce a [`FinsRequest`] for the operations the client
//! actually issues: memory area access, clock, cycle time and CPU unit data.
//!
//! # Example
//!
//! ```
//! use omron_fins_channel::{FinsRequest, MemoryArea, NodeIdentity};
//!
//! let request = FinsRequest::read_words(MemoryArea::DM, 100, 1);
//! assert_eq!(request.payload(), &[0x82, 0x00, 0x64, 0x00, 0x00, 0x01]);
//!
//! let frame = request.to_bytes(NodeIdentity::new(1, 10), 0x07);
//! assert_eq!(frame.len(), 10 + 2 + 6);
//! assert_eq!(frame[9], 0x07);
//! ```

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::bcd;
use crate::header::{FinsHeader, NodeIdentity, FINS_HEADER_SIZE};
use crate::memory::MemoryArea;

/// Length of the function + sub-function command code.
pub const COMMAND_SIZE: usize = 2;

/// Length of the main + sub response code.
pub const RESPONSE_CODE_SIZE: usize = 2;

/// Minimum length of a FINS response: header + command + response code.
pub const MIN_RESPONSE_SIZE: usize = FINS_HEADER_SIZE + COMMAND_SIZE + RESPONSE_CODE_SIZE;

/// FINS main function codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FunctionCode {
    /// Memory area access.
    MemoryArea = 0x01,
    /// Parameter area access.
    ParameterArea = 0x02,
    /// Program area access.
    ProgramArea = 0x03,
    /// Operating mode changes.
    OperatingMode = 0x04,
    /// Machine configuration reading.
    MachineConfiguration = 0x05,
    /// Status reading.
    Status = 0x06,
    /// Time data access.
    TimeData = 0x07,
    /// Message display.
    MessageDisplay = 0x09,
    /// Access rights.
    AccessRights = 0x0C,
    /// Error log and FINS write log.
    ErrorLog = 0x21,
    /// File memory.
    FileMemory = 0x22,
    /// Debugging.
    Debugging = 0x23,
    /// Serial gateway.
    SerialGateway = 0x28,
}

impl FunctionCode {
    /// Looks up a function code.
    pub fn from_u8(code: u8) -> Option<Self> {
        Some(match code {
            0x01 => Self::MemoryArea,
            0x02 => Self::ParameterArea,
            0x03 => Self::ProgramArea,
            0x04 => Self::OperatingMode,
            0x05 => Self::MachineConfiguration,
            0x06 => Self::Status,
            0x07 => Self::TimeData,
            0x09 => Self::MessageDisplay,
            0x0C => Self::AccessRights,
            0x21 => Self::ErrorLog,
            0x22 => Self::FileMemory,
            0x23 => Self::Debugging,
            0x28 => Self::SerialGateway,
            _ => return None,
        })
    }

    /// Returns the wire value.
    pub fn code(self) -> u8 {
        self as u8
    }

    fn sub_functions(self) -> &'static [(u8, &'static str)] {
        match self {
            Self::MemoryArea => &[
                (0x01, "Memory Area Read"),
                (0x02, "Memory Area Write"),
                (0x03, "Memory Area Fill"),
                (0x04, "Multiple Memory Area Read"),
                (0x05, "Memory Area Transfer"),
            ],
            Self::ParameterArea => &[
                (0x01, "Parameter Area Read"),
                (0x02, "Parameter Area Write"),
                (0x03, "Parameter Area Clear"),
            ],
            Self::ProgramArea => &[
                (0x06, "Program Area Read"),
                (0x07, "Program Area Write"),
                (0x08, "Program Area Clear"),
            ],
            Self::OperatingMode => &[(0x01, "Run"), (0x02, "Stop")],
            Self::MachineConfiguration => &[
                (0x01, "CPU Unit Data Read"),
                (0x02, "Connection Data Read"),
            ],
            Self::Status => &[(0x01, "CPU Unit Status Read"), (0x20, "Cycle Time Read")],
            Self::TimeData => &[(0x01, "Clock Read"), (0x02, "Clock Write")],
            Self::MessageDisplay => &[(0x20, "Message Read")],
            Self::AccessRights => &[
                (0x01, "Access Right Acquire"),
                (0x02, "Access Right Forced Acquire"),
                (0x03, "Access Right Release"),
            ],
            Self::ErrorLog => &[
                (0x01, "Error Clear"),
                (0x02, "Error Log Read"),
                (0x03, "Error Log Clear"),
                (0x40, "FINS Write Access Log Read"),
                (0x41, "FINS Write Access Log Clear"),
            ],
            Self::FileMemory => &[
                (0x01, "File Name Read"),
                (0x02, "Single File Read"),
                (0x03, "Single File Write"),
                (0x04, "File Memory Format"),
                (0x05, "File Delete"),
                (0x07, "File Copy"),
                (0x08, "File Name Change"),
                (0x0A, "Memory Area File Transfer"),
                (0x0B, "Parameter Area File Transfer"),
                (0x0C, "Program Area File Transfer"),
                (0x15, "Create/Delete Directory"),
            ],
            Self::Debugging => &[(0x01, "Forced Set/Reset"), (0x02, "Forced Set/Reset Cancel")],
            Self::SerialGateway => &[
                (0x03, "Convert to CompoWay/F Command"),
                (0x04, "Convert to Modbus-RTU Command"),
                (0x05, "Convert to Modbus-ASCII Command"),
            ],
        }
    }
}

/// Returns whether `sub_function_code` is defined for `function_code`.
pub fn is_known_sub_function(function_code: u8, sub_function_code: u8) -> bool {
    FunctionCode::from_u8(function_code)
        .map(|fc| fc.sub_functions().iter().any(|(code, _)| *code == sub_function_code))
        .unwrap_or(false)
}

/// Returns the catalog name of a command, or `"Unknown"`.
///
/// ```
/// use omron_fins_channel::command::sub_function_name;
///
/// assert_eq!(sub_function_name(0x07, 0x01), "Clock Read");
/// assert_eq!(sub_function_name(0x07, 0x7F), "Unknown");
/// ```
pub fn sub_function_name(function_code: u8, sub_function_code: u8) -> &'static str {
    FunctionCode::from_u8(function_code)
        .and_then(|fc| {
            fc.sub_functions()
                .iter()
                .find(|(code, _)| *code == sub_function_code)
                .map(|(_, name)| *name)
        })
        .unwrap_or("Unknown")
}

// Sub-function codes issued by this client.
pub(crate) const SFC_MEMORY_AREA_READ: u8 = 0x01;
pub(crate) const SFC_MEMORY_AREA_WRITE: u8 = 0x02;
pub(crate) const SFC_CPU_UNIT_DATA_READ: u8 = 0x01;
pub(crate) const SFC_CYCLE_TIME_READ: u8 = 0x20;
pub(crate) const SFC_CLOCK_READ: u8 = 0x01;
pub(crate) const SFC_CLOCK_WRITE: u8 = 0x02;

/// An outbound FINS request: command code plus operation payload.
///
/// The service ID and node numbers are supplied at encode time by the
/// channel, so a request can be re-sent unchanged on every retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinsRequest {
    function_code: u8,
    sub_function_code: u8,
    payload: Vec<u8>,
}

impl FinsRequest {
    /// Creates a request from raw codes and payload.
    pub fn new(function_code: u8, sub_function_code: u8, payload: Vec<u8>) -> Self {
        Self {
            function_code,
            sub_function_code,
            payload,
        }
    }

    /// Memory Area Read of `length` words starting at `start`.
    pub fn read_words(area: MemoryArea, start: u16, length: u16) -> Self {
        let mut payload = Vec::with_capacity(6);
        payload.push(area.word_code());
        payload.extend_from_slice(&start.to_be_bytes());
        payload.push(0x00);
        payload.extend_from_slice(&length.to_be_bytes());
        Self::new(
            FunctionCode::MemoryArea.code(),
            SFC_MEMORY_AREA_READ,
            payload,
        )
    }

    /// Memory Area Read of `length` bits starting at `address.start_bit`.
    pub fn read_bits(area: MemoryArea, address: u16, start_bit: u8, length: u16) -> Self {
        let mut payload = Vec::with_capacity(6);
        payload.push(area.bit_code());
        payload.extend_from_slice(&address.to_be_bytes());
        payload.push(start_bit);
        payload.extend_from_slice(&length.to_be_bytes());
        Self::new(
            FunctionCode::MemoryArea.code(),
            SFC_MEMORY_AREA_READ,
            payload,
        )
    }

    /// Memory Area Write of `values` starting at `start`.
    pub fn write_words(area: MemoryArea, start: u16, values: &[i16]) -> Self {
        let mut payload = Vec::with_capacity(6 + values.len() * 2);
        payload.push(area.word_code());
        payload.extend_from_slice(&start.to_be_bytes());
        payload.push(0x00);
        payload.extend_from_slice(&(values.len() as u16).to_be_bytes());
        for value in values {
            payload.extend_from_slice(&value.to_be_bytes());
        }
        Self::new(
            FunctionCode::MemoryArea.code(),
            SFC_MEMORY_AREA_WRITE,
            payload,
        )
    }

    /// Memory Area Write of `values` (one byte per bit) starting at `address.start_bit`.
    pub fn write_bits(area: MemoryArea, address: u16, start_bit: u8, values: &[bool]) -> Self {
        let mut payload = Vec::with_capacity(6 + values.len());
        payload.push(area.bit_code());
        payload.extend_from_slice(&address.to_be_bytes());
        payload.push(start_bit);
        payload.extend_from_slice(&(values.len() as u16).to_be_bytes());
        payload.extend(values.iter().map(|&value| u8::from(value)));
        Self::new(
            FunctionCode::MemoryArea.code(),
            SFC_MEMORY_AREA_WRITE,
            payload,
        )
    }

    /// Clock Read.
    pub fn read_clock() -> Self {
        Self::new(FunctionCode::TimeData.code(), SFC_CLOCK_READ, Vec::new())
    }

    /// Clock Write: YY MM DD hh mm ss dow, all BCD.
    pub fn write_clock(date_time: NaiveDateTime, day_of_week: u8) -> Self {
        let payload = vec![
            bcd::encode_byte((date_time.year().rem_euclid(100)) as u8),
            bcd::encode_byte(date_time.month() as u8),
            bcd::encode_byte(date_time.day() as u8),
            bcd::encode_byte(date_time.hour() as u8),
            bcd::encode_byte(date_time.minute() as u8),
            bcd::encode_byte(date_time.second() as u8),
            bcd::encode_byte(day_of_week),
        ];
        Self::new(FunctionCode::TimeData.code(), SFC_CLOCK_WRITE, payload)
    }

    /// Cycle Time Read.
    pub fn read_cycle_time() -> Self {
        Self::new(FunctionCode::Status.code(), SFC_CYCLE_TIME_READ, vec![0x01])
    }

    /// CPU Unit Data Read.
    pub fn read_cpu_unit_data() -> Self {
        Self::new(
            FunctionCode::MachineConfiguration.code(),
            SFC_CPU_UNIT_DATA_READ,
            vec![0x00],
        )
    }

    /// Returns the main function code.
    pub fn function_code(&self) -> u8 {
        self.function_code
    }

    /// Returns the sub-function code.
    pub fn sub_function_code(&self) -> u8 {
        self.sub_function_code
    }

    /// Returns the operation payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Returns the catalog name of this request's command.
    pub fn name(&self) -> &'static str {
        sub_function_name(self.function_code, self.sub_function_code)
    }

    /// Serializes header, command and payload for transmission.
    pub fn to_bytes(&self, nodes: NodeIdentity, sid: u8) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(FINS_HEADER_SIZE + COMMAND_SIZE + self.payload.len());
        bytes.extend_from_slice(&FinsHeader::new_command(nodes, sid).to_bytes());
        bytes.push(self.function_code);
        bytes.push(self.sub_function_code);
        bytes.extend_from_slice(&self.payload);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn nodes() -> NodeIdentity {
        NodeIdentity::new(1, 10)
    }

    #[test]
    fn test_read_words_payload() {
        let request = FinsRequest::read_words(MemoryArea::DM, 100, 1);
        assert_eq!(request.function_code(), 0x01);
        assert_eq!(request.sub_function_code(), 0x01);
        assert_eq!(request.payload(), &[0x82, 0x00, 0x64, 0x00, 0x00, 0x01]);
        assert_eq!(request.name(), "Memory Area Read");
    }

    #[test]
    fn test_read_bits_payload() {
        let request = FinsRequest::read_bits(MemoryArea::CIO, 0x0102, 5, 3);
        assert_eq!(request.payload(), &[0x30, 0x01, 0x02, 0x05, 0x00, 0x03]);
    }

    #[test]
    fn test_write_words_payload() {
        let request = FinsRequest::write_words(MemoryArea::HR, 10, &[0x1234, -1]);
        assert_eq!(request.sub_function_code(), 0x02);
        assert_eq!(
            request.payload(),
            &[0xB2, 0x00, 0x0A, 0x00, 0x00, 0x02, 0x12, 0x34, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_write_bits_payload() {
        let request = FinsRequest::write_bits(MemoryArea::WR, 2, 14, &[true, false]);
        assert_eq!(
            request.payload(),
            &[0x31, 0x00, 0x02, 0x0E, 0x00, 0x02, 0x01, 0x00]
        );
    }

    #[test]
    fn test_write_clock_payload() {
        let date_time = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(17, 45, 2)
            .unwrap();
        let request = FinsRequest::write_clock(date_time, 6);
        assert_eq!(request.name(), "Clock Write");
        assert_eq!(
            request.payload(),
            &[0x24, 0x03, 0x09, 0x17, 0x45, 0x02, 0x06]
        );
    }

    #[test]
    fn test_status_and_configuration_requests() {
        let cycle = FinsRequest::read_cycle_time();
        assert_eq!((cycle.function_code(), cycle.sub_function_code()), (0x06, 0x20));
        assert_eq!(cycle.payload(), &[0x01]);

        let cpu = FinsRequest::read_cpu_unit_data();
        assert_eq!((cpu.function_code(), cpu.sub_function_code()), (0x05, 0x01));
        assert_eq!(cpu.payload(), &[0x00]);

        assert!(FinsRequest::read_clock().payload().is_empty());
    }

    #[test]
    fn test_to_bytes_layout() {
        let frame = FinsRequest::read_words(MemoryArea::DM, 100, 1).to_bytes(nodes(), 0x2A);
        assert_eq!(
            frame,
            vec![
                0x80, 0x00, 0x02, 0x00, 0x0A, 0x00, 0x00, 0x01, 0x00, 0x2A, // header
                0x01, 0x01, // command
                0x82, 0x00, 0x64, 0x00, 0x00, 0x01, // payload
            ]
        );
    }

    #[test]
    fn test_catalog_lookup() {
        assert!(is_known_sub_function(0x01, 0x05));
        assert!(!is_known_sub_function(0x01, 0x06));
        assert!(is_known_sub_function(0x21, 0x41));
        assert!(!is_known_sub_function(0x08, 0x01));
        assert_eq!(FunctionCode::from_u8(0x28), Some(FunctionCode::SerialGateway));
        assert_eq!(FunctionCode::from_u8(0x08), None);
        assert_eq!(sub_function_name(0x06, 0x20), "Cycle Time Read");
    }
}
