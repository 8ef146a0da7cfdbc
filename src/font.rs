use serde::{Deserialize, Serialize};

use crate::choices::FontChoice;

/// Point sizes EDM ships fonts for.
pub const FONT_SIZES: [u8; 9] = [8, 10, 12, 14, 18, 24, 32, 48, 72];

/// EDM font specification, rendered as `family-weight-slant-size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Font {
    pub family: FontChoice,
    size: u8,
    pub bold: bool,
    pub italic: bool,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: FontChoice::Helvetica,
            size: 18,
            bold: false,
            italic: false,
        }
    }
}

impl Font {
    pub fn new(family: FontChoice, size: u32) -> Self {
        Self {
            family,
            size: nearest_size(size),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.set_size(size);
        self
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    /// Sizes EDM does not ship are snapped to the nearest available one.
    pub fn set_size(&mut self, size: u32) {
        self.size = nearest_size(size);
    }

    pub fn tag(&self) -> String {
        let weight = if self.bold { "bold" } else { "medium" };
        let slant = if self.italic { "i" } else { "r" };
        format!(
            "{}-{}-{}-{:.1}",
            self.family.keyword(),
            weight,
            slant,
            f32::from(self.size)
        )
    }
}

fn nearest_size(size: u32) -> u8 {
    FONT_SIZES
        .into_iter()
        .min_by_key(|candidate| u32::from(*candidate).abs_diff(size))
        .unwrap_or(18)
}
