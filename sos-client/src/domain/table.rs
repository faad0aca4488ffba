use std::fmt;
use std::str::FromStr;

use super::ParseError;

/// Reading table selector, one per code namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ReadingTable {
    /// 11 kV feeders.
    Ht,
    /// 110 kV feeders.
    Eht,
    /// Power transformers.
    Tf,
}

impl ReadingTable {
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Ht => "sosht",
            Self::Eht => "soseht",
            Self::Tf => "sostf",
        }
    }

    pub fn code_column(&self) -> &'static str {
        match self {
            Self::Ht | Self::Eht => "feedercode",
            Self::Tf => "tfcode",
        }
    }

    /// Master table holding the display order of this table's codes.
    pub fn master_table(&self) -> &'static str {
        match self {
            Self::Ht => "feeder11kvmaster",
            Self::Eht => "feederehtmaster",
            Self::Tf => "tfmaster",
        }
    }

    pub fn master_code_column(&self) -> &'static str {
        match self {
            Self::Ht => "feedercode_11",
            Self::Eht => "feedercode",
            Self::Tf => "tfcode",
        }
    }

    pub fn master_rank_column(&self) -> &'static str {
        match self {
            Self::Ht | Self::Eht => "feederorder",
            Self::Tf => "tforder",
        }
    }
}

impl fmt::Display for ReadingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ht => write!(f, "ht"),
            Self::Eht => write!(f, "eht"),
            Self::Tf => write!(f, "tf"),
        }
    }
}

impl FromStr for ReadingTable {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ht" | "sosht" => Ok(Self::Ht),
            "eht" | "soseht" => Ok(Self::Eht),
            "tf" | "sostf" => Ok(Self::Tf),
            _ => Err(ParseError::Table(s.to_string())),
        }
    }
}

/// Feeder class tag carried by interruption records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FeederType {
    #[cfg_attr(feature = "serde", serde(rename = "HTs"))]
    Ht,
    #[cfg_attr(feature = "serde", serde(rename = "EHTs"))]
    Eht,
    #[cfg_attr(feature = "serde", serde(rename = "TFs"))]
    Tf,
}

impl FeederType {
    /// Value of the `fdrtype` column.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Ht => "HTs",
            Self::Eht => "EHTs",
            Self::Tf => "TFs",
        }
    }
}

impl fmt::Display for FeederType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for FeederType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hts" | "ht" => Ok(Self::Ht),
            "ehts" | "eht" => Ok(Self::Eht),
            "tfs" | "tf" => Ok(Self::Tf),
            _ => Err(ParseError::FeederType(s.to_string())),
        }
    }
}
