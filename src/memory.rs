//! PLC memory areas and their FINS area codes.
//!
//! | Area | Word | Bit | Also parsed from |
//! |------|:----:|:---:|------------------|
//! | CIO | 0xB0 | 0x30 | `CIO`, `C` |
//! | WR | 0xB1 | 0x31 | `WR`, `W` |
//! | HR | 0xB2 | 0x32 | `HR`, `H` |
//! | DM | 0x82 | 0x02 | `DM`, `D` |
//! | AR | 0xB3 | 0x33 | `AR`, `A` |
//!
//! Which areas a controller accepts depends on its family; see
//! [`ControllerFamily`](crate::ControllerFamily).
//!
//! ```
//! use omron_fins_channel::MemoryArea;
//!
//! let area: MemoryArea = "d".parse().unwrap();
//! assert_eq!(area, MemoryArea::DM);
//! assert_eq!(area.word_code(), 0x82);
//! assert_eq!(area.bit_code(), 0x02);
//! ```

use std::str::FromStr;

use crate::error::FinsError;

/// Memory areas available in Omron PLCs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MemoryArea {
    /// Core I/O: inputs, outputs and internal relays.
    CIO,
    /// Work bits/words, cleared at power-up.
    WR,
    /// Holding bits/words, retained across power cycles.
    HR,
    /// Data memory.
    DM,
    /// Auxiliary relays: system status and control.
    AR,
}

impl MemoryArea {
    /// Every area, in FINS documentation order.
    pub const ALL: [MemoryArea; 5] = [Self::CIO, Self::WR, Self::HR, Self::DM, Self::AR];

    /// Area code used for word access.
    pub fn word_code(self) -> u8 {
        match self {
            Self::CIO => 0xB0,
            Self::WR => 0xB1,
            Self::HR => 0xB2,
            Self::DM => 0x82,
            Self::AR => 0xB3,
        }
    }

    /// Area code used for bit access.
    pub fn bit_code(self) -> u8 {
        match self {
            Self::CIO => 0x30,
            Self::WR => 0x31,
            Self::HR => 0x32,
            Self::DM => 0x02,
            Self::AR => 0x33,
        }
    }

    /// Short mnemonic, as printed in PLC programming tools.
    pub fn name(self) -> &'static str {
        match self {
            Self::CIO => "CIO",
            Self::WR => "WR",
            Self::HR => "HR",
            Self::DM => "DM",
            Self::AR => "AR",
        }
    }
}

impl std::fmt::Display for MemoryArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MemoryArea {
    type Err = FinsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CIO" | "C" => Ok(Self::CIO),
            "WR" | "W" => Ok(Self::WR),
            "HR" | "H" => Ok(Self::HR),
            "DM" | "D" => Ok(Self::DM),
            "AR" | "A" => Ok(Self::AR),
            _ => Err(FinsError::invalid_parameter(
                "area",
                format!("unknown memory area '{s}'"),
            )),
        }
    }
}
