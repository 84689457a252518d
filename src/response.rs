//! FINS response decoding and data extraction.
//!
//! # Response Structure
//!
//! | Component | Size | Description |
//! |-----------|------|-------------|
//! | Header | 10 bytes | FINS header, ICF 0xC0/0xC1 |
//! | FC / SFC | 2 bytes | Function and sub-function code echoed from the request |
//! | Main / Sub code | 2 bytes | Response (end) code |
//! | Data | Variable | Operation-specific payload |
//!
//! # Response codes
//!
//! - Bit 7 of the main code flags a network relay error.
//! - Bit 7 of the sub code flags a fatal CPU unit error, bit 6 a non-fatal one.
//! - The remaining bits are looked up in the [`EndCode`](crate::EndCode) table.
//!
//! A response whose masked codes are zero succeeds; the non-fatal flag is kept
//! on the response as an advisory (for example a low battery) and never fails
//! the call.
//!
//! # Example
//!
//! ```
//! use omron_fins_channel::{FinsRequest, FinsResponse, MemoryArea};
//!
//! let request = FinsRequest::read_words(MemoryArea::DM, 100, 2);
//! let bytes = [
//!     0xC0, 0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0x0A, 0x00, 0x01, // header
//!     0x01, 0x01, // command
//!     0x00, 0x00, // response code
//!     0x12, 0x34, 0x56, 0x78, // data
//! ];
//!
//! let response = FinsResponse::decode(&bytes, &request, Some(0x01)).unwrap();
//! assert_eq!(response.to_words(2).unwrap(), vec![0x1234, 0x5678]);
//! ```

use chrono::NaiveDate;
use tracing::warn;

use crate::bcd;
use crate::command::{is_known_sub_function, FinsRequest, FunctionCode, MIN_RESPONSE_SIZE};
use crate::end_code::EndCode;
use crate::error::ProtocolError;
use crate::header::{FinsHeader, FINS_HEADER_SIZE};

const RELAY_ERROR_BIT: u8 = 0x80;
const FATAL_CPU_ERROR_BIT: u8 = 0x80;
const NON_FATAL_CPU_ERROR_BIT: u8 = 0x40;

const CLOCK_LENGTH: usize = 7;
const CYCLE_TIME_ITEM_LENGTH: usize = 4;
const MODEL_LENGTH: usize = 20;
const VERSION_LENGTH: usize = 20;
const SYSTEM_RESERVED_LENGTH: usize = 40;
const AREA_DATA_LENGTH: usize = 12;

/// A decoded and validated FINS response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinsResponse {
    header: FinsHeader,
    function_code: u8,
    sub_function_code: u8,
    main_code: u8,
    sub_code: u8,
    non_fatal_cpu_error: bool,
    payload: Vec<u8>,
}

impl FinsResponse {
    /// Decodes `raw` as the response to `request`.
    ///
    /// `expected_sid` is the service ID assigned to the request; pass `None`
    /// when the transport does not echo service IDs reliably.
    ///
    /// # Errors
    ///
    /// Returns the first [`ProtocolError`] found, checking in order: length,
    /// function code, sub-function code, response code, service ID.
    pub fn decode(
        raw: &[u8],
        request: &FinsRequest,
        expected_sid: Option<u8>,
    ) -> Result<Self, ProtocolError> {
        if raw.len() < MIN_RESPONSE_SIZE {
            return Err(ProtocolError::TooShort {
                expected: MIN_RESPONSE_SIZE,
                actual: raw.len(),
            });
        }

        let header = FinsHeader::from_bytes(raw)?;
        let function_code = raw[FINS_HEADER_SIZE];
        let sub_function_code = raw[FINS_HEADER_SIZE + 1];

        if FunctionCode::from_u8(function_code).is_none() {
            return Err(ProtocolError::UnknownFunctionCode(function_code));
        }
        if function_code != request.function_code() {
            return Err(ProtocolError::UnexpectedFunctionCode {
                expected: request.function_code(),
                received: function_code,
            });
        }

        if !is_known_sub_function(function_code, sub_function_code) {
            return Err(ProtocolError::UnknownSubFunctionCode {
                function_code,
                sub_function_code,
            });
        }
        if sub_function_code != request.sub_function_code() {
            return Err(ProtocolError::UnexpectedSubFunctionCode {
                function_code,
                expected: request.sub_function_code(),
                received: sub_function_code,
            });
        }

        let (main_code, sub_code, non_fatal_cpu_error) =
            check_response_code(raw[FINS_HEADER_SIZE + 2], raw[FINS_HEADER_SIZE + 3])?;

        if let Some(expected) = expected_sid {
            if header.sid != expected {
                return Err(ProtocolError::CorrelationMismatch {
                    expected,
                    received: header.sid,
                });
            }
        }

        if non_fatal_cpu_error {
            warn!(
                command = request.name(),
                "PLC reported a non-fatal CPU unit error"
            );
        }

        Ok(Self {
            header,
            function_code,
            sub_function_code,
            main_code,
            sub_code,
            non_fatal_cpu_error,
            payload: raw[MIN_RESPONSE_SIZE..].to_vec(),
        })
    }

    /// Returns the response header, with the PLC as source node.
    pub fn header(&self) -> FinsHeader {
        self.header
    }

    /// Returns the function code.
    pub fn function_code(&self) -> u8 {
        self.function_code
    }

    /// Returns the sub-function code.
    pub fn sub_function_code(&self) -> u8 {
        self.sub_function_code
    }

    /// Returns the masked main response code.
    pub fn main_code(&self) -> u8 {
        self.main_code
    }

    /// Returns the masked sub response code.
    pub fn sub_code(&self) -> u8 {
        self.sub_code
    }

    /// Returns the service ID echoed by the PLC.
    pub fn service_id(&self) -> u8 {
        self.header.sid
    }

    /// Returns whether the PLC flagged a non-fatal CPU unit error.
    pub fn non_fatal_cpu_error(&self) -> bool {
        self.non_fatal_cpu_error
    }

    /// Returns the payload following the response code.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    fn require(&self, expected: usize) -> Result<(), ProtocolError> {
        if self.payload.len() < expected {
            return Err(ProtocolError::PayloadTooShort {
                expected,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    /// Extracts `length` big-endian words.
    pub fn to_words(&self, length: usize) -> Result<Vec<i16>, ProtocolError> {
        self.require(length * 2)?;
        Ok(self.payload[..length * 2]
            .chunks_exact(2)
            .map(|pair| i16::from_be_bytes([pair[0], pair[1]]))
            .collect())
    }

    /// Extracts `length` bits, one byte each.
    pub fn to_bits(&self, length: usize) -> Result<Vec<bool>, ProtocolError> {
        self.require(length)?;
        Ok(self.payload[..length].iter().map(|&b| b != 0).collect())
    }

    /// Extracts the PLC clock.
    pub fn to_clock(&self) -> Result<ClockReading, ProtocolError> {
        self.require(CLOCK_LENGTH)?;
        let fields: Vec<u32> = self.payload[..CLOCK_LENGTH]
            .iter()
            .map(|&b| u32::from(bcd::decode_byte(b)))
            .collect();

        let year = match fields[0] {
            y if y < 70 => 2000 + y,
            y if y < 100 => 1900 + y,
            _ => return Err(ProtocolError::InvalidClock),
        };

        let date_time = NaiveDate::from_ymd_opt(year as i32, fields[1], fields[2])
            .and_then(|date| date.and_hms_opt(fields[3], fields[4], fields[5]))
            .ok_or(ProtocolError::InvalidClock)?;

        Ok(ClockReading {
            date_time,
            day_of_week: fields[6] as u8,
        })
    }

    /// Extracts average, maximum and minimum cycle times.
    pub fn to_cycle_time(&self) -> Result<CycleTime, ProtocolError> {
        self.require(CYCLE_TIME_ITEM_LENGTH * 3)?;
        let item = |index: usize| -> Result<f64, ProtocolError> {
            let start = index * CYCLE_TIME_ITEM_LENGTH;
            let mut bytes = [0u8; CYCLE_TIME_ITEM_LENGTH];
            bytes.copy_from_slice(&self.payload[start..start + CYCLE_TIME_ITEM_LENGTH]);
            // Sent most significant digit pair first.
            bytes.reverse();
            Ok(f64::from(bcd::decode(&bytes)?) / 10.0)
        };

        Ok(CycleTime {
            average_ms: item(0)?,
            maximum_ms: item(1)?,
            minimum_ms: item(2)?,
        })
    }

    /// Extracts the CPU unit model, version and DM size.
    pub fn to_cpu_unit_data(&self) -> Result<CpuUnitData, ProtocolError> {
        let area_offset = MODEL_LENGTH + VERSION_LENGTH + SYSTEM_RESERVED_LENGTH;
        self.require(area_offset + AREA_DATA_LENGTH)?;

        let area = &self.payload[area_offset..area_offset + AREA_DATA_LENGTH];
        Ok(CpuUnitData {
            model: ascii_field(&self.payload[..MODEL_LENGTH]),
            version: ascii_field(&self.payload[MODEL_LENGTH..MODEL_LENGTH + VERSION_LENGTH]),
            dm_word_count: u16::from_be_bytes([area[3], area[4]]),
        })
    }
}

fn ascii_field(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_matches(|c: char| c.is_whitespace() || c == '\0')
        .to_string()
}

/// Splits and checks the two response code bytes.
///
/// Returns the masked main and sub codes plus the non-fatal flag.
fn check_response_code(main: u8, sub: u8) -> Result<(u8, u8, bool), ProtocolError> {
    let masked_main = main & !RELAY_ERROR_BIT;
    let masked_sub = sub & !(FATAL_CPU_ERROR_BIT | NON_FATAL_CPU_ERROR_BIT);

    if main & RELAY_ERROR_BIT != 0 {
        return Err(ProtocolError::NetworkRelayError {
            main: masked_main,
            sub: masked_sub,
        });
    }

    if masked_main != 0 || masked_sub != 0 {
        return Err(match EndCode::from_codes(masked_main, masked_sub) {
            Some(code) => ProtocolError::EndCode {
                code,
                main: masked_main,
                sub: masked_sub,
            },
            None => ProtocolError::UnknownEndCode {
                main: masked_main,
                sub: masked_sub,
            },
        });
    }

    if sub & FATAL_CPU_ERROR_BIT != 0 {
        return Err(ProtocolError::FatalCpuUnitError);
    }

    Ok((masked_main, masked_sub, sub & NON_FATAL_CPU_ERROR_BIT != 0))
}

/// PLC clock value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    /// Date and time.
    pub date_time: chrono::NaiveDateTime,
    /// Day of week, 0 = Sunday.
    pub day_of_week: u8,
}

/// Cycle time statistics in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleTime {
    /// Average cycle time.
    pub average_ms: f64,
    /// Maximum cycle time.
    pub maximum_ms: f64,
    /// Minimum cycle time.
    pub minimum_ms: f64,
}

/// CPU unit identification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuUnitData {
    /// Controller model, e.g. `CJ2M-CPU31`.
    pub model: String,
    /// Controller firmware version.
    pub version: String,
    /// Number of words in the DM area.
    pub dm_word_count: u16,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::NodeIdentity;
    use crate::memory::MemoryArea;
    use proptest::prelude::*;

    fn make_response(request: &FinsRequest, sid: u8, code: [u8; 2], data: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0xC0, 0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0x0A, 0x00, sid];
        bytes.push(request.function_code());
        bytes.push(request.sub_function_code());
        bytes.extend_from_slice(&code);
        bytes.extend_from_slice(data);
        bytes
    }

    #[test]
    fn test_decode_success_with_data() {
        let request = FinsRequest::read_words(MemoryArea::DM, 0, 2);
        let raw = make_response(&request, 7, [0, 0], &[0x12, 0x34, 0xFF, 0xFE]);
        let response = FinsResponse::decode(&raw, &request, Some(7)).unwrap();

        assert_eq!(response.service_id(), 7);
        assert!(!response.non_fatal_cpu_error());
        assert_eq!(response.to_words(2).unwrap(), vec![0x1234, -2]);
    }

    #[test]
    fn test_decode_too_short() {
        let request = FinsRequest::read_clock();
        let err = FinsResponse::decode(&[0xC0; 13], &request, None).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::TooShort {
                expected: 14,
                actual: 13
            }
        );
    }

    #[test]
    fn test_decode_function_code_checks() {
        let request = FinsRequest::read_clock();

        let mut raw = make_response(&request, 1, [0, 0], &[]);
        raw[10] = 0x08;
        assert_eq!(
            FinsResponse::decode(&raw, &request, None).unwrap_err(),
            ProtocolError::UnknownFunctionCode(0x08)
        );

        raw[10] = 0x01;
        assert_eq!(
            FinsResponse::decode(&raw, &request, None).unwrap_err(),
            ProtocolError::UnexpectedFunctionCode {
                expected: 0x07,
                received: 0x01
            }
        );
    }

    #[test]
    fn test_decode_sub_function_code_checks() {
        let request = FinsRequest::read_clock();

        let mut raw = make_response(&request, 1, [0, 0], &[]);
        raw[11] = 0x09;
        assert_eq!(
            FinsResponse::decode(&raw, &request, None).unwrap_err(),
            ProtocolError::UnknownSubFunctionCode {
                function_code: 0x07,
                sub_function_code: 0x09
            }
        );

        raw[11] = 0x02;
        assert!(matches!(
            FinsResponse::decode(&raw, &request, None).unwrap_err(),
            ProtocolError::UnexpectedSubFunctionCode { received: 0x02, .. }
        ));
    }

    #[test]
    fn test_decode_address_range_error() {
        let request = FinsRequest::read_words(MemoryArea::DM, 40000, 1);
        let raw = make_response(&request, 1, [0x11, 0x03], &[]);
        let err = FinsResponse::decode(&raw, &request, Some(1)).unwrap_err();
        assert_eq!(err.end_code(), Some(EndCode::AddressRangeError));
    }

    #[test]
    fn test_decode_unknown_end_code() {
        let request = FinsRequest::read_clock();
        let raw = make_response(&request, 1, [0x7E, 0x3E], &[]);
        assert_eq!(
            FinsResponse::decode(&raw, &request, None).unwrap_err(),
            ProtocolError::UnknownEndCode {
                main: 0x7E,
                sub: 0x3E
            }
        );
    }

    #[test]
    fn test_decode_relay_error() {
        let request = FinsRequest::read_clock();
        let raw = make_response(&request, 1, [0x81, 0x01], &[]);
        assert_eq!(
            FinsResponse::decode(&raw, &request, None).unwrap_err(),
            ProtocolError::NetworkRelayError { main: 1, sub: 1 }
        );
    }

    #[test]
    fn test_decode_cpu_error_flags() {
        let request = FinsRequest::read_clock();

        let raw = make_response(&request, 1, [0x00, 0x40], &[]);
        let response = FinsResponse::decode(&raw, &request, None).unwrap();
        assert!(response.non_fatal_cpu_error());
        assert_eq!(response.sub_code(), 0);

        let raw = make_response(&request, 1, [0x00, 0x80], &[]);
        assert_eq!(
            FinsResponse::decode(&raw, &request, None).unwrap_err(),
            ProtocolError::FatalCpuUnitError
        );
    }

    #[test]
    fn test_decode_correlation() {
        let request = FinsRequest::read_clock();
        let raw = make_response(&request, 5, [0, 0], &[]);

        assert_eq!(
            FinsResponse::decode(&raw, &request, Some(6)).unwrap_err(),
            ProtocolError::CorrelationMismatch {
                expected: 6,
                received: 5
            }
        );
        assert!(FinsResponse::decode(&raw, &request, None).is_ok());
    }

    /// Builds the reply a PLC sends to `sent`: response ICF, node bytes
    /// swapped, same service ID, clean end code.
    fn echo_of(sent: &[u8]) -> Vec<u8> {
        let mut raw = sent[..12].to_vec();
        raw[0] = 0xC0;
        raw.swap(4, 7);
        raw.extend_from_slice(&[0x00, 0x00]);
        raw
    }

    fn build_request(kind: u8, area: usize, address: u16, bit: u8, count: u16) -> FinsRequest {
        let area = MemoryArea::ALL[area % MemoryArea::ALL.len()];
        match kind % 8 {
            0 => FinsRequest::read_words(area, address, count),
            1 => FinsRequest::read_bits(area, address, bit, count),
            2 => FinsRequest::write_words(area, address, &vec![address as i16; count as usize]),
            3 => FinsRequest::write_bits(area, address, bit, &vec![true; count as usize]),
            4 => FinsRequest::read_clock(),
            5 => {
                let date_time = NaiveDate::from_ymd_opt(2024, 2, 29)
                    .unwrap()
                    .and_hms_opt(12, 30, 45)
                    .unwrap();
                FinsRequest::write_clock(date_time, 4)
            }
            6 => FinsRequest::read_cycle_time(),
            _ => FinsRequest::read_cpu_unit_data(),
        }
    }

    #[test]
    fn test_encoded_request_sid_echo() {
        let request = FinsRequest::read_cycle_time();
        let sent = request.to_bytes(NodeIdentity::new(3, 9), 0xAB);
        let response = FinsResponse::decode(&echo_of(&sent), &request, Some(0xAB)).unwrap();

        assert_eq!(response.service_id(), 0xAB);
        let header = response.header();
        assert_eq!(header.icf, 0xC0);
        assert_eq!(header.sa1, 9);
        assert_eq!(header.da1, 3);
    }

    proptest! {
        #[test]
        fn test_every_request_and_sid_correlates(
            kind in 0u8..8,
            area in 0usize..5,
            address in any::<u16>(),
            bit in 0u8..16,
            count in 1u16..100,
            local in 1u8..=254,
            remote in 1u8..=254,
            sid in any::<u8>(),
        ) {
            let request = build_request(kind, area, address, bit, count);
            let sent = request.to_bytes(NodeIdentity::new(local, remote), sid);
            prop_assert_eq!(sent[9], sid);
            let raw = echo_of(&sent);

            let response = FinsResponse::decode(&raw, &request, Some(sid)).unwrap();
            prop_assert_eq!(response.service_id(), sid);
            prop_assert_eq!(response.function_code(), request.function_code());
            prop_assert_eq!(response.header().sa1, remote);

            let wrong = sid.wrapping_add(1);
            prop_assert_eq!(
                FinsResponse::decode(&raw, &request, Some(wrong)).unwrap_err(),
                ProtocolError::CorrelationMismatch {
                    expected: wrong,
                    received: sid,
                }
            );
            prop_assert!(FinsResponse::decode(&raw, &request, None).is_ok());
        }
    }

    #[test]
    fn test_decode_every_response_code_pair() {
        let request = FinsRequest::read_clock();
        let mut successes = Vec::new();
        let mut relay = 0;
        let mut fatal = 0;
        let mut end_codes = 0;

        for main in 0..=0xFFu8 {
            for sub in 0..=0xFFu8 {
                let raw = make_response(&request, 1, [main, sub], &[]);
                let masked = (main & 0x7F, sub & 0x3F);
                let result = FinsResponse::decode(&raw, &request, Some(1));
                assert_eq!(result, FinsResponse::decode(&raw, &request, Some(1)));

                match result {
                    Ok(response) => {
                        assert_eq!(response.non_fatal_cpu_error(), sub & 0x40 != 0);
                        successes.push((main, sub));
                    }
                    Err(ProtocolError::NetworkRelayError { main: m, sub: s }) => {
                        assert_ne!(main & 0x80, 0);
                        assert_eq!((m, s), masked);
                        relay += 1;
                    }
                    Err(ProtocolError::EndCode { code, main: m, sub: s }) => {
                        assert_eq!(main & 0x80, 0);
                        assert_ne!(masked, (0, 0));
                        assert_eq!((m, s), masked);
                        assert_eq!(EndCode::from_codes(m, s), Some(code));
                        end_codes += 1;
                    }
                    Err(ProtocolError::UnknownEndCode { main: m, sub: s }) => {
                        assert_eq!(main & 0x80, 0);
                        assert_ne!(masked, (0, 0));
                        assert_eq!((m, s), masked);
                        assert_eq!(EndCode::from_codes(m, s), None);
                        end_codes += 1;
                    }
                    Err(ProtocolError::FatalCpuUnitError) => {
                        assert_eq!(masked, (0, 0));
                        assert_eq!(main, 0);
                        assert_ne!(sub & 0x80, 0);
                        fatal += 1;
                    }
                    Err(other) => panic!("unexpected fault for {main:#04X}/{sub:#04X}: {other:?}"),
                }
            }
        }

        assert_eq!(successes, vec![(0x00, 0x00), (0x00, 0x40)]);
        assert_eq!(relay, 128 * 256);
        assert_eq!(fatal, 2);
        assert_eq!(end_codes, 65536 - 128 * 256 - 2 - 2);
    }

    #[test]
    fn test_payload_too_short() {
        let request = FinsRequest::read_words(MemoryArea::DM, 0, 3);
        let raw = make_response(&request, 1, [0, 0], &[0x00, 0x01]);
        let response = FinsResponse::decode(&raw, &request, None).unwrap();
        assert_eq!(
            response.to_words(3).unwrap_err(),
            ProtocolError::PayloadTooShort {
                expected: 6,
                actual: 2
            }
        );
    }

    #[test]
    fn test_to_bits() {
        let request = FinsRequest::read_bits(MemoryArea::CIO, 0, 0, 3);
        let raw = make_response(&request, 1, [0, 0], &[0x01, 0x00, 0x05]);
        let response = FinsResponse::decode(&raw, &request, None).unwrap();
        assert_eq!(response.to_bits(3).unwrap(), vec![true, false, true]);
    }

    #[test]
    fn test_to_clock() {
        let request = FinsRequest::read_clock();
        let raw = make_response(
            &request,
            1,
            [0, 0],
            &[0x24, 0x03, 0x09, 0x17, 0x45, 0x02, 0x06],
        );
        let clock = FinsResponse::decode(&raw, &request, None)
            .unwrap()
            .to_clock()
            .unwrap();
        assert_eq!(clock.date_time.to_string(), "2024-03-09 17:45:02");
        assert_eq!(clock.day_of_week, 6);

        let raw = make_response(
            &request,
            1,
            [0, 0],
            &[0x98, 0x12, 0x31, 0x23, 0x59, 0x59, 0x04],
        );
        let clock = FinsResponse::decode(&raw, &request, None)
            .unwrap()
            .to_clock()
            .unwrap();
        assert_eq!(clock.date_time.to_string(), "1998-12-31 23:59:59");
    }

    #[test]
    fn test_to_clock_invalid_date() {
        let request = FinsRequest::read_clock();
        let raw = make_response(
            &request,
            1,
            [0, 0],
            &[0x23, 0x02, 0x30, 0x00, 0x00, 0x00, 0x00],
        );
        let response = FinsResponse::decode(&raw, &request, None).unwrap();
        assert_eq!(response.to_clock(), Err(ProtocolError::InvalidClock));
    }

    #[test]
    fn test_to_cycle_time() {
        let request = FinsRequest::read_cycle_time();
        let data = hex::decode("000000250000012000000008").unwrap();
        let raw = make_response(&request, 1, [0, 0], &data);
        let cycle = FinsResponse::decode(&raw, &request, None)
            .unwrap()
            .to_cycle_time()
            .unwrap();
        assert_eq!(cycle.average_ms, 2.5);
        assert_eq!(cycle.maximum_ms, 12.0);
        assert_eq!(cycle.minimum_ms, 0.8);
    }

    #[test]
    fn test_to_cpu_unit_data() {
        let request = FinsRequest::read_cpu_unit_data();
        let mut data = Vec::new();
        data.extend_from_slice(b"CJ2M-CPU31          ");
        data.extend_from_slice(b"02.01               ");
        data.extend_from_slice(&[0u8; 40]);
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x80, 0x00, 0, 0, 0, 0, 0, 0, 0]);
        let raw = make_response(&request, 1, [0, 0], &data);

        let unit = FinsResponse::decode(&raw, &request, None)
            .unwrap()
            .to_cpu_unit_data()
            .unwrap();
        assert_eq!(unit.model, "CJ2M-CPU31");
        assert_eq!(unit.version, "02.01");
        assert_eq!(unit.dm_word_count, 0x8000);
    }
}
