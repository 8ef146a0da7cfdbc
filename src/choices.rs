//! Closed sets of EDM property values.
//!
//! Each choice converts from the raw representation EDM uses (color index,
//! lowercase keyword) and fails loudly on anything outside the set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EdlError, Result};

/// Colors from the default EDM color list, keyed by palette index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    White,
    Grey,
    Black,
    Green,
    Red,
    Blue,
    Cyan,
    Yellow,
    Brown,
    Purple,
    #[serde(rename = "amo")]
    Amo,
    #[serde(rename = "mec")]
    Mec,
    #[serde(rename = "xcs")]
    Xcs,
    #[serde(rename = "sxr")]
    Sxr,
    #[serde(rename = "xpp")]
    Xpp,
    #[serde(rename = "cxi")]
    Cxi,
    #[serde(rename = "mfx")]
    Mfx,
}

impl ColorChoice {
    pub const ALL: [ColorChoice; 17] = [
        Self::White,
        Self::Grey,
        Self::Black,
        Self::Green,
        Self::Red,
        Self::Blue,
        Self::Cyan,
        Self::Yellow,
        Self::Brown,
        Self::Purple,
        Self::Amo,
        Self::Mec,
        Self::Xcs,
        Self::Sxr,
        Self::Xpp,
        Self::Cxi,
        Self::Mfx,
    ];

    /// Palette index written as `index N` in EDL files.
    pub const fn index(self) -> u8 {
        match self {
            Self::White => 0,
            Self::Grey => 4,
            Self::Black => 14,
            Self::Green => 16,
            Self::Red => 21,
            Self::Blue => 26,
            Self::Cyan => 31,
            Self::Yellow => 36,
            Self::Brown => 43,
            Self::Purple => 47,
            Self::Amo => 90,
            Self::Mec => 83,
            Self::Xcs => 84,
            Self::Sxr => 85,
            Self::Xpp => 91,
            Self::Cxi => 92,
            Self::Mfx => 93,
        }
    }

    pub fn from_index(index: i64) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|color| i64::from(color.index()) == index)
            .ok_or_else(|| EdlError::validation("color", format!("no EDM color with index {index}")))
    }

    pub const fn keyword(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Grey => "grey",
            Self::Black => "black",
            Self::Green => "green",
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Cyan => "cyan",
            Self::Yellow => "yellow",
            Self::Brown => "brown",
            Self::Purple => "purple",
            Self::Amo => "amo",
            Self::Mec => "mec",
            Self::Xcs => "xcs",
            Self::Sxr => "sxr",
            Self::Xpp => "xpp",
            Self::Cxi => "cxi",
            Self::Mfx => "mfx",
        }
    }
}

impl FromStr for ColorChoice {
    type Err = EdlError;

    fn from_str(raw: &str) -> Result<Self> {
        let needle = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|color| color.keyword() == needle)
            .ok_or_else(|| EdlError::validation("color", format!("unknown color `{raw}`")))
    }
}

impl fmt::Display for ColorChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Alignment keywords shared by layouts and text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentChoice {
    Left,
    Center,
    Right,
    Bottom,
    Top,
}

impl AlignmentChoice {
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Top => "top",
        }
    }

    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

impl FromStr for AlignmentChoice {
    type Err = EdlError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            "bottom" => Ok(Self::Bottom),
            "top" => Ok(Self::Top),
            _ => Err(EdlError::validation(
                "alignment",
                format!("unknown alignment `{raw}`"),
            )),
        }
    }
}

impl fmt::Display for AlignmentChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Font families available in EDM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontChoice {
    #[default]
    Helvetica,
    Utopia,
    #[serde(rename = "new century schoolbook")]
    NewCenturySchoolbook,
    Times,
    Courier,
}

impl FontChoice {
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Helvetica => "helvetica",
            Self::Utopia => "utopia",
            Self::NewCenturySchoolbook => "new century schoolbook",
            Self::Times => "times",
            Self::Courier => "courier",
        }
    }
}

impl FromStr for FontChoice {
    type Err = EdlError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "helvetica" => Ok(Self::Helvetica),
            "utopia" => Ok(Self::Utopia),
            "new century schoolbook" => Ok(Self::NewCenturySchoolbook),
            "times" => Ok(Self::Times),
            "courier" => Ok(Self::Courier),
            _ => Err(EdlError::validation("font", format!("unknown font `{raw}`"))),
        }
    }
}

impl fmt::Display for FontChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
