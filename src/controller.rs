//! Controller families and their addressing limits.
//!
//! The family is derived from the model string reported by CPU Unit Data Read
//! and decides which memory areas, address ranges and request sizes the
//! [`Client`](crate::Client) accepts before anything is sent.
//!
//! | Area | Limit (exclusive) | Exceptions |
//! |------|-------------------|------------|
//! | DM | 32768 | NX1P2: 16000; no bit access on CP1 |
//! | CIO | 6144 | |
//! | WR | 512 | |
//! | HR | 1536 | |
//! | AR | 960 | CJ2: 11536; not available on NJ/NX/NY |
//!
//! # Example
//!
//! ```
//! use omron_fins_channel::{ControllerFamily, MemoryArea};
//!
//! let family = ControllerFamily::from_model("CP1L-EM40DT-D");
//! assert_eq!(family, ControllerFamily::CP1);
//! assert_eq!(family.max_read_words(), 499);
//! assert!(!family.supports_bit_area(MemoryArea::DM));
//! ```

use crate::error::{FinsError, Result};
use crate::memory::MemoryArea;

/// Maximum number of bits in one bit request.
pub const BITS_PER_WORD: u16 = 16;

/// Omron controller family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControllerFamily {
    /// NJ101 machine automation controller.
    NJ101,
    /// NJ301 machine automation controller.
    NJ301,
    /// NJ501 machine automation controller.
    NJ501,
    /// NX1P2 machine automation controller.
    NX1P2,
    /// NX102 machine automation controller.
    NX102,
    /// NX701 machine automation controller.
    NX701,
    /// NY512 industrial PC.
    NY512,
    /// NY532 industrial PC.
    NY532,
    /// Any other NJ, NX or NY model.
    NjNxNySeries,
    /// CJ2 series.
    CJ2,
    /// CP1 series.
    CP1,
    /// Any other C series model.
    CSeries,
    /// Model not reported or not recognised.
    #[default]
    Unknown,
}

impl ControllerFamily {
    /// Derives the family from a CPU unit model string.
    pub fn from_model(model: &str) -> Self {
        const PREFIXES: [(&str, ControllerFamily); 8] = [
            ("NJ101", ControllerFamily::NJ101),
            ("NJ301", ControllerFamily::NJ301),
            ("NJ501", ControllerFamily::NJ501),
            ("NX1P2", ControllerFamily::NX1P2),
            ("NX102", ControllerFamily::NX102),
            ("NX701", ControllerFamily::NX701),
            ("NY512", ControllerFamily::NY512),
            ("NY532", ControllerFamily::NY532),
        ];

        let model = model.trim();
        if let Some((_, family)) = PREFIXES.iter().find(|(prefix, _)| model.starts_with(*prefix)) {
            return *family;
        }

        if ["NJ", "NX", "NY"].iter().any(|prefix| model.starts_with(*prefix)) {
            Self::NjNxNySeries
        } else if model.starts_with("CJ2") {
            Self::CJ2
        } else if model.starts_with("CP1") {
            Self::CP1
        } else if model.starts_with('C') {
            Self::CSeries
        } else {
            Self::Unknown
        }
    }

    /// Returns whether this is an NJ, NX or NY controller.
    pub fn is_n_series(self) -> bool {
        matches!(
            self,
            Self::NJ101
                | Self::NJ301
                | Self::NJ501
                | Self::NX1P2
                | Self::NX102
                | Self::NX701
                | Self::NY512
                | Self::NY532
                | Self::NjNxNySeries
        )
    }

    /// Returns whether this is a C series controller.
    pub fn is_c_series(self) -> bool {
        matches!(self, Self::CJ2 | Self::CP1 | Self::CSeries)
    }

    /// Largest word count for one Memory Area Read.
    pub fn max_read_words(self) -> u16 {
        if self == Self::CP1 {
            499
        } else {
            999
        }
    }

    /// Largest word count for one Memory Area Write.
    pub fn max_write_words(self) -> u16 {
        if self == Self::CP1 {
            496
        } else {
            996
        }
    }

    /// Whether bit access to `area` is available.
    pub fn supports_bit_area(self, area: MemoryArea) -> bool {
        match area {
            MemoryArea::DM => self != Self::CP1,
            MemoryArea::AR => !self.is_n_series(),
            MemoryArea::CIO | MemoryArea::WR | MemoryArea::HR => true,
        }
    }

    /// Whether word access to `area` is available.
    pub fn supports_word_area(self, area: MemoryArea) -> bool {
        match area {
            MemoryArea::AR => !self.is_n_series(),
            _ => true,
        }
    }

    /// First word address past the end of `area`.
    pub fn address_limit(self, area: MemoryArea) -> u32 {
        match area {
            MemoryArea::DM if self == Self::NX1P2 => 16000,
            MemoryArea::DM => 32768,
            MemoryArea::CIO => 6144,
            MemoryArea::WR => 512,
            MemoryArea::HR => 1536,
            MemoryArea::AR if self == Self::CJ2 => 11536,
            MemoryArea::AR => 960,
        }
    }

    /// Whether Cycle Time Read is available.
    pub fn supports_cycle_time(self) -> bool {
        !self.is_n_series() || matches!(self, Self::NJ101 | Self::NJ301 | Self::NJ501)
    }

    /// Checks a bit request of `length` bits at `address.start_bit`.
    pub fn validate_bit_access(
        self,
        area: MemoryArea,
        address: u16,
        start_bit: u8,
        length: usize,
    ) -> Result<()> {
        if u16::from(start_bit) >= BITS_PER_WORD {
            return Err(FinsError::invalid_parameter(
                "start_bit",
                "cannot be greater than 15",
            ));
        }
        if length == 0 {
            return Err(FinsError::invalid_parameter("length", "cannot be zero"));
        }
        if usize::from(start_bit) + length > usize::from(BITS_PER_WORD) {
            return Err(FinsError::invalid_parameter(
                "length",
                "start bit and length combined exceed 16 bits",
            ));
        }
        if !self.supports_bit_area(area) {
            return Err(FinsError::invalid_addressing(format!(
                "{area} bit access is not supported on {self} PLCs"
            )));
        }
        if u32::from(address) >= self.address_limit(area) {
            return Err(FinsError::invalid_addressing(format!(
                "address {address} is beyond the end of the {area} area ({})",
                self.address_limit(area)
            )));
        }
        Ok(())
    }

    /// Checks a word request of `length` words starting at `start`.
    pub fn validate_word_access(
        self,
        area: MemoryArea,
        start: u16,
        length: usize,
        write: bool,
    ) -> Result<()> {
        let (parameter, maximum) = if write {
            ("values", self.max_write_words())
        } else {
            ("length", self.max_read_words())
        };

        if length == 0 {
            return Err(FinsError::invalid_parameter(parameter, "cannot be zero"));
        }
        if length > usize::from(maximum) {
            return Err(FinsError::invalid_parameter(
                parameter,
                format!("cannot be greater than {maximum} words"),
            ));
        }
        if !self.supports_word_area(area) {
            return Err(FinsError::invalid_addressing(format!(
                "{area} word access is not supported on {self} PLCs"
            )));
        }
        let last = u32::from(start) + length as u32 - 1;
        if last >= self.address_limit(area) {
            return Err(FinsError::invalid_addressing(format!(
                "words {start}..={last} run past the end of the {area} area ({})",
                self.address_limit(area)
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for ControllerFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::NJ101 => "NJ101",
            Self::NJ301 => "NJ301",
            Self::NJ501 => "NJ501",
            Self::NX1P2 => "NX1P2",
            Self::NX102 => "NX102",
            Self::NX701 => "NX701",
            Self::NY512 => "NY512",
            Self::NY532 => "NY532",
            Self::NjNxNySeries => "NJ/NX/NY series",
            Self::CJ2 => "CJ2",
            Self::CP1 => "CP1",
            Self::CSeries => "C series",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_model() {
        assert_eq!(ControllerFamily::from_model("NJ501-1300"), ControllerFamily::NJ501);
        assert_eq!(ControllerFamily::from_model("NX1P2-9024DT"), ControllerFamily::NX1P2);
        assert_eq!(ControllerFamily::from_model("NY532-1500"), ControllerFamily::NY532);
        assert_eq!(
            ControllerFamily::from_model("NX502-1300"),
            ControllerFamily::NjNxNySeries
        );
        assert_eq!(ControllerFamily::from_model("CJ2M-CPU31"), ControllerFamily::CJ2);
        assert_eq!(ControllerFamily::from_model("CP1H-XA40DR"), ControllerFamily::CP1);
        assert_eq!(ControllerFamily::from_model("CS1G-CPU42H"), ControllerFamily::CSeries);
        assert_eq!(ControllerFamily::from_model(""), ControllerFamily::Unknown);
        assert_eq!(ControllerFamily::from_model("XYZ"), ControllerFamily::Unknown);
    }

    #[test]
    fn test_word_limits() {
        assert_eq!(ControllerFamily::CP1.max_read_words(), 499);
        assert_eq!(ControllerFamily::CP1.max_write_words(), 496);
        assert_eq!(ControllerFamily::CJ2.max_read_words(), 999);
        assert_eq!(ControllerFamily::Unknown.max_write_words(), 996);
    }

    #[test]
    fn test_area_support() {
        assert!(!ControllerFamily::NX102.supports_word_area(MemoryArea::AR));
        assert!(!ControllerFamily::NjNxNySeries.supports_bit_area(MemoryArea::AR));
        assert!(ControllerFamily::CJ2.supports_bit_area(MemoryArea::AR));
        assert!(!ControllerFamily::CP1.supports_bit_area(MemoryArea::DM));
        assert!(ControllerFamily::CP1.supports_word_area(MemoryArea::DM));
    }

    #[test]
    fn test_address_limits() {
        assert_eq!(ControllerFamily::NX1P2.address_limit(MemoryArea::DM), 16000);
        assert_eq!(ControllerFamily::NJ501.address_limit(MemoryArea::DM), 32768);
        assert_eq!(ControllerFamily::CJ2.address_limit(MemoryArea::AR), 11536);
        assert_eq!(ControllerFamily::CSeries.address_limit(MemoryArea::AR), 960);
        assert_eq!(ControllerFamily::Unknown.address_limit(MemoryArea::CIO), 6144);
    }

    #[test]
    fn test_cycle_time_support() {
        assert!(ControllerFamily::NJ301.supports_cycle_time());
        assert!(!ControllerFamily::NX701.supports_cycle_time());
        assert!(!ControllerFamily::NY512.supports_cycle_time());
        assert!(ControllerFamily::CJ2.supports_cycle_time());
        assert!(ControllerFamily::Unknown.supports_cycle_time());
    }

    #[test]
    fn test_validate_bit_access() {
        let family = ControllerFamily::CJ2;
        assert!(family.validate_bit_access(MemoryArea::CIO, 0, 15, 1).is_ok());
        assert!(matches!(
            family.validate_bit_access(MemoryArea::CIO, 0, 16, 1),
            Err(FinsError::InvalidParameter { .. })
        ));
        assert!(matches!(
            family.validate_bit_access(MemoryArea::CIO, 0, 0, 0),
            Err(FinsError::InvalidParameter { .. })
        ));
        assert!(matches!(
            family.validate_bit_access(MemoryArea::CIO, 0, 10, 7),
            Err(FinsError::InvalidParameter { .. })
        ));
        assert!(matches!(
            family.validate_bit_access(MemoryArea::WR, 512, 0, 1),
            Err(FinsError::InvalidAddressing { .. })
        ));
        assert!(matches!(
            ControllerFamily::CP1.validate_bit_access(MemoryArea::DM, 0, 0, 1),
            Err(FinsError::InvalidAddressing { .. })
        ));
    }

    #[test]
    fn test_validate_word_access() {
        let family = ControllerFamily::NX1P2;
        assert!(family.validate_word_access(MemoryArea::DM, 15990, 10, false).is_ok());
        assert!(matches!(
            family.validate_word_access(MemoryArea::DM, 15991, 10, false),
            Err(FinsError::InvalidAddressing { .. })
        ));
        assert!(matches!(
            family.validate_word_access(MemoryArea::DM, 0, 1000, false),
            Err(FinsError::InvalidParameter { .. })
        ));
        assert!(family.validate_word_access(MemoryArea::DM, 0, 996, true).is_ok());
        assert!(matches!(
            family.validate_word_access(MemoryArea::DM, 0, 997, true),
            Err(FinsError::InvalidParameter { .. })
        ));
        assert!(matches!(
            family.validate_word_access(MemoryArea::AR, 0, 1, false),
            Err(FinsError::InvalidAddressing { .. })
        ));
    }
}
